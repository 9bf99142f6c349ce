//! CLI argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Classify a document by format and business intent, then extract its key fields.
#[derive(Debug, Parser)]
#[command(name = "intake")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File path (e.g. 'samples/invoice.pdf') or raw text content
    pub input: String,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.intake/config.toml)
    #[arg(short, long, env = "INTAKE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Summary table (default)
    Table,
    /// Full result as JSON
    Json,
    /// Conversation id only
    Quiet,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => Self::Table,
            CliFormat::Json => Self::Json,
            CliFormat::Quiet => Self::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_input() {
        let cli = Cli::try_parse_from(["intake", "hello world"]).unwrap();
        assert_eq!(cli.input, "hello world");
        assert!(cli.format.is_none());
        assert!(!cli.no_color);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["intake", "--format", "json", "--no-color", "in.txt"]).unwrap();
        assert_eq!(cli.format, Some(CliFormat::Json));
        assert!(cli.no_color);
        assert_eq!(cli.input, "in.txt");
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["intake"]).is_err());
    }
}
