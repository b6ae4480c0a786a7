//! `quill decode` command implementation.

use clap::Args;
use quill_diagrams::decode;

use crate::error::CliError;
use crate::output::emit;

/// Arguments for the decode command.
#[derive(Args)]
pub(crate) struct DecodeArgs {
    /// Encoded token, or a full diagram URL ending in one.
    token: String,
}

impl DecodeArgs {
    /// Execute the decode command.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not valid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let source = decode(token_of(&self.token))?;
        emit(&source)?;
        Ok(())
    }
}

/// The token part of a diagram URL, or the input itself.
fn token_of(input: &str) -> &str {
    let input = input.trim();
    input.rsplit('/').next().unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_of() {
        assert_eq!(token_of("eNpLTEoGAAJNASU"), "eNpLTEoGAAJNASU");
        assert_eq!(token_of("https://kroki.io/svgbob/svg/eNpLTEoGAAJNASU\n"), "eNpLTEoGAAJNASU");
    }
}
