//! Intake CLI library.
//!
//! Wires configuration, the Gemini oracle, the Redis conversation log and
//! the pipeline together for the `intake` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;

pub use cli::{Cli, CliFormat};
pub use config::{Config, OutputFormat};
pub use error::{CliError, Result};
pub use input::resolve_input;
pub use output::Formatter;

use intake_llm::GeminiProvider;
use intake_pipeline::{IntentClassifier, Orchestrator, PdfExtractSource};
use intake_store::{RedisBackend, SharedLog};
use tracing::warn;

/// Process the input named on the command line and render the result.
///
/// `api_key` is the raw `GEMINI_API_KEY` value, if set. Only startup
/// problems (bad configuration, missing credential) are errors; any
/// classification outcome renders normally.
pub fn run(cli: Cli, api_key: Option<String>) -> Result<String> {
    let config = Config::load(cli.config.as_deref())?;
    let api_key = config::api_key(api_key)?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let formatter = Formatter::new(format, !cli.no_color && config.settings.color);

    let classifier = IntentClassifier::from_result(
        GeminiProvider::new(api_key, config.oracle.clone()),
        config.pipeline.max_prompt_chars,
    );

    let log = match RedisBackend::open(&config.redis_settings()) {
        Ok(backend) => SharedLog::connect(backend),
        Err(e) => {
            warn!(error = %e, "Invalid Redis settings, conversation logging disabled");
            SharedLog::disabled()
        }
    };

    let orchestrator = Orchestrator::new(classifier, log, PdfExtractSource, config.pipeline);
    let result = orchestrator.process(resolve_input(&cli.input));

    formatter.format_result(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli_with_config(config_path: &std::path::Path) -> Cli {
        Cli::try_parse_from([
            "intake",
            "--config",
            config_path.to_str().unwrap(),
            "some text",
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_credential_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli_with_config(&dir.path().join("config.toml"));

        let err = run(cli, None).unwrap_err();
        assert!(matches!(err, CliError::MissingCredential(_)));
        assert!(err.to_string().starts_with("GEMINI_API_KEY not found"));
    }

    #[test]
    fn test_invalid_config_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[pipeline]\nsnippet_chars = 0\n").unwrap();

        let err = run(cli_with_config(&config_path), Some("key".to_string())).unwrap_err();
        assert!(matches!(err, CliError::Pipeline(_)));
    }
}
