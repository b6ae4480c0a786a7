//! Theme-dependent recoloring of rendered diagram text.
//!
//! Rewrites the inline style of every SVG `<text>` element so diagram labels
//! stay legible on light and dark backgrounds. Note text (a `<text>` whose
//! class mentions `note`, or any text inside an element of class `note`) gets
//! its own color and a smaller font. Existing style declarations are merged,
//! so running the pass twice yields the same markup as running it once.

use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quill_config::PaletteConfig;

/// Font weight forced on all diagram text.
const TEXT_WEIGHT: &str = "500";

/// Font size forced on note text.
const NOTE_SIZE: &str = "12px";

/// Fill colors for one color scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub text: String,
    pub note: String,
}

impl From<&PaletteConfig> for Palette {
    fn from(config: &PaletteConfig) -> Self {
        Self {
            text: config.text.clone(),
            note: config.note.clone(),
        }
    }
}

/// Recolor all `<text>` elements in `markup`.
///
/// Markup that cannot be parsed is returned unchanged.
#[must_use]
pub fn recolor_svg(markup: &str, palette: &Palette) -> String {
    match try_recolor(markup, palette) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Leaving diagram colors untouched");
            markup.to_owned()
        }
    }
}

fn try_recolor(markup: &str, palette: &Palette) -> Result<String, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut writer = Writer::new(Vec::with_capacity(markup.len()));
    // Whether each open element sits inside a note group
    let mut note_scope: Vec<bool> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let in_note = note_scope.last().copied().unwrap_or(false);
                if is_text(&e) {
                    let styled = style_text(&e, palette, in_note || class_mentions_note(&e));
                    writer.write_event(Event::Start(styled))?;
                } else {
                    writer.write_event(Event::Start(e.borrow()))?;
                }
                note_scope.push(in_note || has_note_class(&e));
            }
            Event::Empty(e) => {
                let in_note = note_scope.last().copied().unwrap_or(false);
                if is_text(&e) {
                    let styled = style_text(&e, palette, in_note || class_mentions_note(&e));
                    writer.write_event(Event::Empty(styled))?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                note_scope.pop();
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

fn is_text(e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref() == b"text"
}

fn class_value(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"class")
        .map(|a| attribute_text(&a))
}

/// Attribute value with entities resolved.
fn attribute_text(attr: &Attribute<'_>) -> String {
    attr.unescape_value().map_or_else(
        |_| String::from_utf8_lossy(&attr.value).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

/// `.note` selector semantics: one of the class tokens is exactly `note`.
fn has_note_class(e: &BytesStart<'_>) -> bool {
    class_value(e).is_some_and(|c| c.split_whitespace().any(|token| token == "note"))
}

/// `[class*="note"]` selector semantics.
fn class_mentions_note(e: &BytesStart<'_>) -> bool {
    class_value(e).is_some_and(|c| c.contains("note"))
}

/// Copy of a `<text>` start tag with the palette merged into its style.
fn style_text(e: &BytesStart<'_>, palette: &Palette, note: bool) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut styled = BytesStart::new(name);
    let mut existing = String::new();

    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"style" {
            existing = attribute_text(&attr);
        } else {
            styled.push_attribute(attr);
        }
    }

    let mut overrides = vec![
        ("fill", palette.text.as_str()),
        ("font-weight", TEXT_WEIGHT),
    ];
    if note {
        overrides[0].1 = palette.note.as_str();
        overrides.push(("font-size", NOTE_SIZE));
    }

    let style = merge_style(&existing, &overrides);
    styled.push_attribute(("style", style.as_str()));
    styled.into_owned()
}

/// Merge CSS declarations, replacing properties named in `overrides`.
///
/// `existing` is the decoded attribute text; the caller escapes the result.
fn merge_style(existing: &str, overrides: &[(&str, &str)]) -> String {
    let mut declarations: Vec<(String, String)> = split_declarations(existing)
        .into_iter()
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            (!prop.is_empty()).then(|| (prop.to_ascii_lowercase(), value.trim().to_owned()))
        })
        .collect();

    for (prop, value) in overrides {
        match declarations.iter_mut().find(|(p, _)| p == prop) {
            Some(decl) => (*value).clone_into(&mut decl.1),
            None => declarations.push(((*prop).to_owned(), (*value).to_owned())),
        }
    }

    declarations
        .iter()
        .map(|(p, v)| format!("{p}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Split on `;` outside quoted strings and parentheses.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut parens = 0usize;
    let mut start = 0;

    for (i, c) in style.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => parens += 1,
            (None, ')') => parens = parens.saturating_sub(1),
            (None, ';') if parens == 0 => {
                parts.push(&style[start..i]);
                start = i + 1;
            }
            (None, _) => {}
        }
    }
    parts.push(&style[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn light() -> Palette {
        Palette {
            text: "#1f2937".to_owned(),
            note: "#374151".to_owned(),
        }
    }

    fn dark() -> Palette {
        Palette {
            text: "#f9fafb".to_owned(),
            note: "#e5e7eb".to_owned(),
        }
    }

    #[test]
    fn test_text_gets_fill_and_weight() {
        let svg = r#"<svg><text x="1">Alice</text></svg>"#;
        assert_eq!(
            recolor_svg(svg, &light()),
            r##"<svg><text x="1" style="fill: #1f2937; font-weight: 500">Alice</text></svg>"##
        );
    }

    #[test]
    fn test_note_group_text() {
        let svg = r#"<svg><g class="note"><rect/><text>remember</text></g><text>plain</text></svg>"#;
        let out = recolor_svg(svg, &dark());

        assert!(out.contains(
            r##"<text style="fill: #e5e7eb; font-weight: 500; font-size: 12px">remember</text>"##
        ));
        assert!(out.contains(r##"<text style="fill: #f9fafb; font-weight: 500">plain</text>"##));
    }

    #[test]
    fn test_note_class_on_text() {
        let svg = r#"<svg><text class="noteText">n</text></svg>"#;
        let out = recolor_svg(svg, &light());

        assert!(out.contains("fill: #374151"));
        assert!(out.contains("font-size: 12px"));
    }

    #[test]
    fn test_existing_style_is_merged() {
        let svg = r#"<svg><text style="font-family: Roboto; fill:red">x</text></svg>"#;
        let out = recolor_svg(svg, &light());

        assert!(out.contains(
            r##"style="font-family: Roboto; fill: #1f2937; font-weight: 500""##
        ));
    }

    #[test]
    fn test_recolor_is_idempotent() {
        let svg = r#"<svg><g class="note"><text>a</text></g><text>b</text></svg>"#;
        let once = recolor_svg(svg, &dark());
        let twice = recolor_svg(&once, &dark());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_switching_palette_replaces_fill() {
        let svg = r#"<svg><text>b</text></svg>"#;
        let dark_out = recolor_svg(svg, &dark());
        let light_out = recolor_svg(&dark_out, &light());

        assert_eq!(light_out, recolor_svg(svg, &light()));
    }

    #[test]
    fn test_non_text_untouched() {
        let svg = r#"<svg viewBox="0 0 10 10"><rect width="5"/><!-- c --><path d="M0 0"/></svg>"#;
        assert_eq!(recolor_svg(svg, &light()), svg);
    }

    #[test]
    fn test_unparseable_markup_returned_unchanged() {
        let broken = r#"<svg><text x="1>oops"#;
        assert_eq!(recolor_svg(broken, &light()), broken);
    }

    #[test]
    fn test_quoted_font_family_survives_repeated_passes() {
        let svg = r#"<svg><text style="font-family: &quot;trebuchet ms&quot;, verdana">A</text></svg>"#;
        let once = recolor_svg(svg, &light());
        let twice = recolor_svg(&once, &light());

        assert_eq!(
            once,
            r##"<svg><text style="font-family: &quot;trebuchet ms&quot;, verdana; fill: #1f2937; font-weight: 500">A</text></svg>"##
        );
        assert_eq!(once, twice);

        let toggled = recolor_svg(&recolor_svg(&once, &dark()), &light());
        assert_eq!(toggled, once);
    }

    #[test]
    fn test_split_declarations_respects_quotes() {
        assert_eq!(
            split_declarations(r#"content: "a;b"; fill: url(data:x;y); stroke: red"#),
            [r#"content: "a;b""#, " fill: url(data:x;y)", " stroke: red"]
        );
    }

    #[test]
    fn test_merge_style() {
        assert_eq!(
            merge_style("", &[("fill", "#000")]),
            "fill: #000"
        );
        assert_eq!(
            merge_style("FILL: red;; stroke: blue;", &[("fill", "#000")]),
            "fill: #000; stroke: blue"
        );
    }
}
