//! `quill settings` command implementation.

use std::path::Path;

use clap::Args;
use quill_config::Config;
use quill_lifecycle::{LifecycleConfig, MermaidSettings};
use serde_json::json;

use crate::error::CliError;
use crate::output::emit;

/// Arguments for the settings command.
#[derive(Args)]
pub(crate) struct SettingsArgs {
    /// Print compact JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,
}

impl SettingsArgs {
    /// Print the page-side settings as JSON: renderer initialization,
    /// lazy-loading observer options and text palettes.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let config = Config::load(config_path, None)?;
        let settings = page_settings(&LifecycleConfig::from(&config));

        let text = if self.compact {
            settings.to_string()
        } else {
            serde_json::to_string_pretty(&settings)
                .map_err(|e| CliError::Validation(e.to_string()))?
        };
        emit(&text)?;
        Ok(())
    }
}

fn page_settings(config: &LifecycleConfig) -> serde_json::Value {
    json!({
        "mermaid": MermaidSettings::default().to_json(),
        "observer": {
            "rootMargin": config.observer.root_margin(),
            "threshold": config.observer.threshold,
        },
        "serviceUrl": config.service.base(),
        "palette": {
            "light": { "text": config.light.text, "note": config.light.note },
            "dark": { "text": config.dark.text, "note": config.dark.note },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_settings() {
        let settings = page_settings(&LifecycleConfig::default());

        assert_eq!(settings["mermaid"]["securityLevel"], "loose");
        assert_eq!(settings["observer"]["rootMargin"], "50px 0px");
        assert_eq!(settings["serviceUrl"], "https://kroki.io");
        assert_eq!(settings["palette"]["dark"]["note"], "#e5e7eb");
    }
}
