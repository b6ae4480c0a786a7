//! `quill encode` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use quill_config::Config;
use quill_diagrams::{DiagramBlock, Dialect, ServiceUrl};

use crate::error::CliError;
use crate::output::emit;

/// Arguments for the encode command.
#[derive(Args)]
pub(crate) struct EncodeArgs {
    /// Diagram source file (reads stdin when omitted).
    file: Option<PathBuf>,

    /// Diagram dialect (plantuml, graphviz, svgbob, mermaid, ...).
    #[arg(short, long, default_value = "plantuml")]
    dialect: String,
}

impl EncodeArgs {
    /// Execute the encode command.
    ///
    /// Prints the token, then the service URL that renders it.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown dialect or unreadable input.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let dialect = parse_dialect(&self.dialect)?;
        let config = Config::load(config_path, None)?;

        let source = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        let block = DiagramBlock::new(dialect, source.trim());
        let url = ServiceUrl::new(config.diagrams.kroki_url.as_str()).diagram_url(&block);
        emit(&format!("{}\n{url}", block.token()))?;
        Ok(())
    }
}

pub(crate) fn parse_dialect(name: &str) -> Result<Dialect, CliError> {
    Dialect::parse(name).ok_or_else(|| {
        let known: Vec<&str> = Dialect::ALL.iter().map(|d| d.endpoint()).collect();
        CliError::Validation(format!(
            "Unknown diagram dialect '{name}' (expected one of: {})",
            known.join(", ")
        ))
    })
}
