//! `quill new` command implementation.

use std::path::Path;
use std::process::Command;

use chrono::Local;
use clap::Args;
use quill_config::{CliSettings, Config};
use quill_post::{PostOptions, ScaffoldError, Scaffolder};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the new command.
#[derive(Args)]
pub(crate) struct NewArgs {
    /// Post title (required).
    #[arg(short, long)]
    title: Option<String>,

    /// Categories (comma-separated).
    #[arg(short, long)]
    categories: Option<String>,

    /// Tags (comma-separated).
    #[arg(short = 'g', long)]
    tags: Option<String>,

    /// Author name (overrides config).
    #[arg(short, long)]
    author: Option<String>,

    /// Template name from the templates directory (default, technical, tutorial, review).
    #[arg(short = 'T', long)]
    template: Option<String>,

    /// Do not open the new post in $EDITOR.
    #[arg(long)]
    no_editor: bool,
}

impl NewArgs {
    /// Execute the new command.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is missing, the post already exists, or
    /// the file cannot be written.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let Some(title) = self.title.filter(|t| !t.trim().is_empty()) else {
            output.info("Usage: quill new --title 'My New Post'");
            return Err(ScaffoldError::MissingTitle.into());
        };

        let cli_settings = CliSettings {
            author: self.author,
            ..Default::default()
        };
        let config = Config::load(config_path, Some(&cli_settings))?;
        let posts = &config.posts_resolved;

        let categories = self
            .categories
            .as_deref()
            .map(PostOptions::parse_list)
            .unwrap_or_default();
        let tags = self
            .tags
            .as_deref()
            .map(PostOptions::parse_list)
            .unwrap_or_default();
        let options = PostOptions::new(title, posts.author.as_str())
            .with_categories(categories)
            .with_tags(tags)
            .with_template(self.template.unwrap_or_else(|| posts.template.clone()));

        let path = Scaffolder::from_config(posts).create(&options, Local::now().date_naive())?;

        output.success(&format!("Created new post: {}", path.display()));
        output.info(&format!("Title: {}", options.title));
        if !options.categories.is_empty() {
            output.info(&format!("Categories: {}", options.categories.join(", ")));
        }
        if !options.tags.is_empty() {
            output.info(&format!("Tags: {}", options.tags.join(", ")));
        }

        if !self.no_editor
            && let Some(editor) = std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty())
        {
            open_editor(&editor, &path, &output);
        }

        Ok(())
    }
}

/// Run `$EDITOR <path>`. The editor value may carry its own arguments.
fn open_editor(editor: &str, path: &Path, output: &Output) {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        return;
    };
    tracing::debug!(program, path = %path.display(), "Opening editor");

    match Command::new(program).args(parts).arg(path).status() {
        Ok(status) if status.success() => {}
        Ok(status) => output.warning(&format!("Editor exited with {status}")),
        Err(e) => output.warning(&format!("Failed to launch editor '{program}': {e}")),
    }
}
