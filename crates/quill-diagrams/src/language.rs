//! Diagram dialects and how each one is rendered.
//!
//! A dialect is selected once, when a template tag or placeholder is first
//! seen, and carries its [`RenderStrategy`] with it from then on.

use std::fmt;

/// Supported diagram dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    PlantUml,
    C4PlantUml,
    Mermaid,
    GraphViz,
    Ditaa,
    BlockDiag,
    SeqDiag,
    ActDiag,
    NwDiag,
    Erd,
    Nomnoml,
    Svgbob,
    Vega,
    VegaLite,
    WaveDrom,
}

/// Where a dialect gets turned into an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// The build phase embeds an image URL pointing at the rendering service.
    Remote,
    /// The raw source is shipped to the page and rendered by an in-page library.
    Local,
}

impl Dialect {
    /// Every dialect, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::PlantUml,
        Self::C4PlantUml,
        Self::Mermaid,
        Self::GraphViz,
        Self::Ditaa,
        Self::BlockDiag,
        Self::SeqDiag,
        Self::ActDiag,
        Self::NwDiag,
        Self::Erd,
        Self::Nomnoml,
        Self::Svgbob,
        Self::Vega,
        Self::VegaLite,
        Self::WaveDrom,
    ];

    /// Parse a dialect name as it appears in a template tag argument.
    ///
    /// Accepts both the bare name (`graphviz`) and the `kroki-` prefixed form
    /// (`kroki-graphviz`). Matching is case-insensitive.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("kroki-").unwrap_or(&lower);

        match name {
            "plantuml" => Some(Self::PlantUml),
            "c4plantuml" => Some(Self::C4PlantUml),
            "mermaid" => Some(Self::Mermaid),
            "graphviz" | "dot" => Some(Self::GraphViz),
            "ditaa" => Some(Self::Ditaa),
            "blockdiag" => Some(Self::BlockDiag),
            "seqdiag" => Some(Self::SeqDiag),
            "actdiag" => Some(Self::ActDiag),
            "nwdiag" => Some(Self::NwDiag),
            "erd" => Some(Self::Erd),
            "nomnoml" => Some(Self::Nomnoml),
            "svgbob" => Some(Self::Svgbob),
            "vega" => Some(Self::Vega),
            "vegalite" => Some(Self::VegaLite),
            "wavedrom" => Some(Self::WaveDrom),
            _ => None,
        }
    }

    /// Path segment used by the rendering service for this dialect.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::PlantUml => "plantuml",
            Self::C4PlantUml => "c4plantuml",
            Self::Mermaid => "mermaid",
            Self::GraphViz => "graphviz",
            Self::Ditaa => "ditaa",
            Self::BlockDiag => "blockdiag",
            Self::SeqDiag => "seqdiag",
            Self::ActDiag => "actdiag",
            Self::NwDiag => "nwdiag",
            Self::Erd => "erd",
            Self::Nomnoml => "nomnoml",
            Self::Svgbob => "svgbob",
            Self::Vega => "vega",
            Self::VegaLite => "vegalite",
            Self::WaveDrom => "wavedrom",
        }
    }

    /// Human-readable name, used in image alt text and error titles.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PlantUml => "PlantUML",
            Self::C4PlantUml => "C4-PlantUML",
            Self::Mermaid => "Mermaid",
            Self::GraphViz => "Graphviz",
            Self::Ditaa => "Ditaa",
            Self::BlockDiag => "BlockDiag",
            Self::SeqDiag => "SeqDiag",
            Self::ActDiag => "ActDiag",
            Self::NwDiag => "NwDiag",
            Self::Erd => "Erd",
            Self::Nomnoml => "Nomnoml",
            Self::Svgbob => "Svgbob",
            Self::Vega => "Vega",
            Self::VegaLite => "Vega-Lite",
            Self::WaveDrom => "WaveDrom",
        }
    }

    #[must_use]
    pub fn strategy(self) -> RenderStrategy {
        match self {
            Self::Mermaid => RenderStrategy::Local,
            _ => RenderStrategy::Remote,
        }
    }

    /// Begin/end markers that must surround the source before encoding.
    ///
    /// `PlantUML` and `C4-PlantUML` sources are only valid inside an
    /// `@startuml`/`@enduml` pair.
    #[must_use]
    pub fn markers(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::PlantUml | Self::C4PlantUml => Some(("@startuml", "@enduml")),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}
