//! `quill check` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_diagrams::{ProbeRequest, ServiceUrl, TagProcessor, create_agent, probe_all};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to the markdown post.
    input: PathBuf,

    /// Diagram service URL (overrides config).
    #[arg(long, env = "KROKI_URL")]
    kroki_url: Option<String>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if any remote diagram fails to render.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            kroki_url: self.kroki_url,
            ..Default::default()
        };
        let config = Config::load(config_path, Some(&cli_settings))?;
        let content = std::fs::read_to_string(&self.input)?;

        let service = ServiceUrl::new(config.diagrams.kroki_url.as_str());
        let mut processor = TagProcessor::new(service.clone());
        processor.expand(&content);
        for warning in processor.warnings() {
            output.warning(&format!("Warning: {warning}"));
        }

        let requests = ProbeRequest::for_blocks(&service, processor.blocks());
        if requests.is_empty() {
            output.info("No remotely rendered diagrams found");
            return Ok(());
        }

        output.info(&format!(
            "Checking {} diagram(s) against {}...",
            requests.len(),
            service.base()
        ));
        let agent = create_agent(config.diagrams.timeout());
        let results = probe_all(&agent, &requests);

        let mut failed = 0usize;
        for result in &results {
            match result {
                Ok(success) => {
                    output.success(&format!("  ok    {} ({} bytes)", success.dom_id, success.bytes));
                }
                Err(e) => {
                    failed += 1;
                    output.error(&format!("  fail  {} ({})", e.dom_id, e.kind));
                }
            }
        }

        tracing::info!(checked = results.len(), failed, "Checked diagrams");
        if failed > 0 {
            return Err(CliError::Validation(format!(
                "{failed} of {} diagram(s) failed to render",
                results.len()
            )));
        }
        output.success("All diagrams rendered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_post_without_remote_diagrams_passes_offline() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("post.md");
        std::fs::write(&input, "# Local only\n\n{% mermaid %}\ngraph TD; A-->B\n{% endmermaid %}\n").unwrap();

        CheckArgs {
            input,
            kroki_url: None,
        }
        .execute(None)
        .unwrap();
    }
}
