//! Placeholder discovery in rendered page markup.
//!
//! Page HTML is rarely well-formed XML, so the scan is tolerant: end names are
//! not checked, void elements do not open a scope, valueless attributes are
//! accepted, and a parse error ends the scan with whatever was found so far.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quill_diagrams::{DiagramBlock, Dialect, RenderStrategy, ServiceUrl};

use crate::placeholder::{Backend, Placeholder};

/// Class tokens that mark an element as a diagram placeholder.
const PLACEHOLDER_CLASSES: [&str; 3] = ["mermaid", "plantuml", "kroki-diagram"];

/// Class of the container a decorated diagram already sits in.
const WRAPPER_CLASS: &str = "diagram-wrapper";

/// HTML elements that never have content or an end tag.
const VOID_ELEMENTS: &[&[u8]] = &[
    b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta",
    b"source", b"track", b"wbr",
];

/// A placeholder element being read.
struct Capture {
    id: Option<String>,
    class: String,
    dialect: Option<String>,
    rendered: bool,
    /// Inside a `.diagram-wrapper` element.
    wrapped: bool,
    depth: usize,
    /// Byte offset where the element's content starts.
    inner_start: usize,
    text: String,
    img_src: Option<String>,
}

/// Scan state shared across placeholders.
struct Scan<'a> {
    service: &'a ServiceUrl,
    /// For each open element outside a placeholder, whether it is a wrapper.
    open: Vec<bool>,
    /// Occurrences of each synthetic id so far.
    synthetic: HashMap<String, usize>,
}

/// Find every diagram placeholder in `html`, in document order.
///
/// Elements without an `id` get one derived from their dialect and content,
/// so repeated scans of a growing page name them the same way. Remote
/// placeholders that carry source text instead of an image get their image
/// URL from `service`. Placeholders the page already marked as rendered keep
/// their markup, and any enclosing control wrapper.
#[must_use]
pub fn discover(html: &str, service: &ServiceUrl) -> Vec<Placeholder> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut scan = Scan {
        service,
        open: Vec::new(),
        synthetic: HashMap::new(),
    };
    let mut found = Vec::new();
    let mut current: Option<Capture> = None;

    loop {
        let before = offset(reader.buffer_position());
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    position = reader.buffer_position(),
                    error = %e,
                    "Stopping placeholder scan at malformed markup"
                );
                break;
            }
        };

        match event {
            Event::Start(e) => match current.as_mut() {
                Some(capture) => {
                    if !is_void(&e) {
                        capture.depth += 1;
                    }
                    capture_img(capture, &e);
                }
                None if !is_void(&e) => match begin_capture(&e) {
                    Some(mut capture) => {
                        capture.wrapped = scan.open.iter().any(|&wrapper| wrapper);
                        capture.inner_start = offset(reader.buffer_position());
                        current = Some(capture);
                    }
                    None => scan.open.push(has_class(&e, WRAPPER_CLASS)),
                },
                None => {}
            },
            Event::Empty(e) => {
                if let Some(capture) = current.as_mut() {
                    capture_img(capture, &e);
                }
            }
            Event::Text(e) => {
                if let Some(capture) = current.as_mut() {
                    let text = reader.decoder().decode(&e).map_or_else(
                        |_| String::from_utf8_lossy(&e).into_owned(),
                        std::borrow::Cow::into_owned,
                    );
                    capture.text.push_str(&text);
                }
            }
            Event::GeneralRef(e) => {
                if let Some(capture) = current.as_mut() {
                    let entity = String::from_utf8_lossy(&e).into_owned();
                    capture.text.push_str(&decode_entity(&entity));
                }
            }
            Event::CData(e) => {
                if let Some(capture) = current.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => match current.as_mut() {
                Some(capture) => {
                    capture.depth -= 1;
                    if capture.depth == 0
                        && let Some(capture) = current.take()
                    {
                        let inner = html.get(capture.inner_start..before).unwrap_or_default();
                        if let Some(placeholder) = scan.finish(capture, inner) {
                            found.push(placeholder);
                        }
                    }
                }
                None => {
                    scan.open.pop();
                }
            },
            Event::Eof => break,
            Event::Comment(_)
            | Event::Decl(_)
            | Event::PI(_)
            | Event::DocType(_) => {}
        }
    }

    tracing::debug!(count = found.len(), "Discovered diagram placeholders");
    found
}

fn offset(position: u64) -> usize {
    usize::try_from(position).unwrap_or(usize::MAX)
}

pub(crate) fn is_void(e: &BytesStart<'_>) -> bool {
    let name = e.local_name();
    VOID_ELEMENTS
        .iter()
        .any(|void| name.as_ref().eq_ignore_ascii_case(void))
}

pub(crate) fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.html_attributes()
        .flatten()
        .find(|a| a.key.as_ref().eq_ignore_ascii_case(name))
        .map(|a| {
            a.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&a.value).into_owned(),
                std::borrow::Cow::into_owned,
            )
        })
}

pub(crate) fn has_class(e: &BytesStart<'_>, class: &str) -> bool {
    attribute(e, b"class").is_some_and(|c| c.split_whitespace().any(|token| token == class))
}

fn begin_capture(e: &BytesStart<'_>) -> Option<Capture> {
    let class = attribute(e, b"class")?;
    let marker = class
        .split_whitespace()
        .find(|token| PLACEHOLDER_CLASSES.contains(token))?
        .to_owned();

    Some(Capture {
        id: attribute(e, b"id").filter(|id| !id.is_empty()),
        class: marker,
        dialect: attribute(e, b"data-dialect"),
        rendered: attribute(e, b"data-rendered").is_some_and(|v| v == "true"),
        wrapped: false,
        depth: 1,
        inner_start: 0,
        text: String::new(),
        img_src: None,
    })
}

fn capture_img(capture: &mut Capture, e: &BytesStart<'_>) {
    if capture.img_src.is_none() && e.local_name().as_ref().eq_ignore_ascii_case(b"img") {
        capture.img_src = attribute(e, b"src");
    }
}

impl Scan<'_> {
    fn finish(&mut self, capture: Capture, inner: &str) -> Option<Placeholder> {
        let Some(dialect) = capture_dialect(&capture) else {
            tracing::warn!(id = ?capture.id, "Skipping placeholder with unknown dialect");
            return None;
        };

        let backend = match dialect.strategy() {
            RenderStrategy::Local => Backend::Local {
                source: capture.text.trim().to_owned(),
            },
            RenderStrategy::Remote => match capture.img_src {
                Some(src) => Backend::Remote { src },
                None => {
                    let block = DiagramBlock::new(dialect, capture.text.trim());
                    Backend::Remote {
                        src: self.service.diagram_url(&block),
                    }
                }
            },
        };

        let element_id = match capture.id {
            Some(id) => id,
            None => self.synthetic_id(dialect, &backend),
        };

        let mut placeholder = Placeholder::new(element_id, dialect, backend);
        if capture.rendered {
            placeholder = placeholder.already_rendered(inner.trim());
        }
        if capture.wrapped {
            placeholder = placeholder.already_wrapped();
        }
        Some(placeholder)
    }

    /// `<prefix>-<endpoint>-<hash>` from the content, with `-<n>` appended
    /// for the n-th repeat of identical content.
    fn synthetic_id(&mut self, dialect: Dialect, backend: &Backend) -> String {
        let key = match backend {
            Backend::Local { source } => source,
            Backend::Remote { src } => src,
        };
        let base = DiagramBlock::new(dialect, key.as_str()).dom_id();
        let seen = self.synthetic.entry(base.clone()).or_insert(0);
        *seen += 1;
        if *seen == 1 {
            base
        } else {
            format!("{base}-{seen}")
        }
    }
}

/// Dialect from `data-dialect`, else the marker class, else (for
/// `kroki-diagram`) the image URL path or a `kroki-<dialect>-<hash>` id.
fn capture_dialect(capture: &Capture) -> Option<Dialect> {
    if let Some(name) = capture.dialect.as_deref() {
        return Dialect::parse(name);
    }
    match capture.class.as_str() {
        "mermaid" => Some(Dialect::Mermaid),
        "plantuml" => Some(Dialect::PlantUml),
        _ => capture
            .img_src
            .as_deref()
            .and_then(dialect_from_src)
            .or_else(|| capture.id.as_deref().and_then(dialect_from_id)),
    }
}

/// `.../<dialect>/svg/<token>`.
fn dialect_from_src(src: &str) -> Option<Dialect> {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let mut segments = path.rsplit('/');
    segments.next()?;
    if segments.next()? != "svg" {
        return None;
    }
    Dialect::parse(segments.next()?)
}

/// `kroki-<dialect>-<hash>`.
fn dialect_from_id(id: &str) -> Option<Dialect> {
    let (dialect, _hash) = id.strip_prefix("kroki-")?.rsplit_once('-')?;
    Dialect::parse(dialect)
}

/// Resolve an entity reference name (without `&` and `;`).
pub(crate) fn decode_entity(entity: &str) -> String {
    let resolved = match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => entity.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };
    resolved.map_or_else(|| format!("&{entity};"), String::from)
}
