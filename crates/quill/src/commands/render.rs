//! `quill render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_diagrams::ServiceUrl;
use quill_lifecycle::decorate_post;
use quill_post::PostRenderer;

use crate::error::CliError;
use crate::output::{Output, emit};

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the markdown post.
    input: PathBuf,

    /// Write HTML here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Diagram service URL (overrides config).
    #[arg(long, env = "KROKI_URL")]
    kroki_url: Option<String>,

    /// Prepend the table of contents as a `<nav>` element.
    #[arg(long)]
    toc: bool,

    /// Keep emoji in the output.
    #[arg(long)]
    keep_emoji: bool,

    /// Add a copy button to every code block.
    #[arg(long)]
    copy_buttons: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or a file cannot be read
    /// or written.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            kroki_url: self.kroki_url,
            ..Default::default()
        };
        let config = Config::load(config_path, Some(&cli_settings))?;

        tracing::info!(input = %self.input.display(), "Rendering post");
        let markdown = std::fs::read_to_string(&self.input)?;
        let renderer = PostRenderer::new(ServiceUrl::new(config.diagrams.kroki_url.as_str()))
            .with_emoji(self.keep_emoji);
        let post = renderer.render(&markdown);

        for warning in &post.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        let body = if self.copy_buttons {
            decorate_post(&post.html)
        } else {
            post.html.clone()
        };
        let html = if self.toc && !post.toc.is_empty() {
            format!(
                "<nav class=\"toc\" id=\"toc-nav\">{}</nav>\n{body}",
                post.toc_html()
            )
        } else {
            body
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => emit(&html)?,
        }

        output.detail(&format!(
            "{} diagram(s), {} heading(s), {} min read",
            post.diagrams.len(),
            post.toc.len(),
            post.reading_minutes
        ));
        Ok(())
    }
}
