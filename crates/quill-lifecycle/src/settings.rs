//! Initialization options for the local diagram library.

use serde::Serialize;

/// Options passed to the local renderer's `initialize` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MermaidSettings {
    /// Rendering is driven by the lifecycle manager, never on page load.
    pub start_on_load: bool,
    pub theme: String,
    pub security_level: String,
    pub theme_variables: ThemeVariables,
    pub flowchart: FlowchartSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeVariables {
    pub primary_color: String,
    pub primary_text_color: String,
    pub primary_border_color: String,
    pub line_color: String,
    pub secondary_color: String,
    pub tertiary_color: String,
    pub background: String,
    pub main_bkg: String,
    pub secondary_bkg: String,
    pub tertiary_bkg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowchartSettings {
    pub html_labels: bool,
    pub curve: String,
    pub padding: u32,
}

impl Default for MermaidSettings {
    fn default() -> Self {
        Self {
            start_on_load: false,
            theme: "default".to_owned(),
            security_level: "loose".to_owned(),
            theme_variables: ThemeVariables {
                primary_color: "#667eea".to_owned(),
                primary_text_color: "#1f2937".to_owned(),
                primary_border_color: "#667eea".to_owned(),
                line_color: "#6b7280".to_owned(),
                secondary_color: "#764ba2".to_owned(),
                tertiary_color: "#f59e0b".to_owned(),
                background: "#ffffff".to_owned(),
                main_bkg: "#f9fafb".to_owned(),
                secondary_bkg: "#e5e7eb".to_owned(),
                tertiary_bkg: "#f3f4f6".to_owned(),
            },
            flowchart: FlowchartSettings {
                html_labels: true,
                curve: "basis".to_owned(),
                padding: 10,
            },
        }
    }
}

impl MermaidSettings {
    /// JSON object for the renderer's `initialize` call.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing plain strings, bools and integers cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
