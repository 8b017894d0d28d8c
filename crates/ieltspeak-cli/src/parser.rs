//! Main CLI parser and top-level argument handling.

use clap::Parser;
use ieltspeak_core::settings::{ENV_API_URL, ENV_TIMEOUT_SECS};

use crate::commands::Commands;

/// IELTS speaking practice from the terminal.
#[derive(Debug, Parser)]
#[command(name = "ieltspeak")]
#[command(about = "Practise the IELTS speaking test from the terminal")]
#[command(version)]
pub struct Cli {
    /// Base URL of the practice service
    #[arg(long = "api-url", global = true, env = ENV_API_URL)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout", global = true, env = ENV_TIMEOUT_SECS)]
    pub timeout_secs: Option<u64>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ieltspeak_core::{Category, PracticeSelection};

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "ieltspeak",
            "--verbose",
            "--api-url",
            "http://practice.test/api",
            "tips",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("http://practice.test/api"));
        assert!(matches!(cli.command, Some(Commands::Tips)));
    }

    #[test]
    fn test_category_spellings() {
        let cli = Cli::parse_from(["ieltspeak", "questions", "--category", "part-2"]);
        let Some(Commands::Questions { category }) = cli.command else {
            panic!("expected questions command");
        };
        assert_eq!(category, Category::Part2);
    }

    #[test]
    fn test_practice_defaults_to_part1() {
        let cli = Cli::parse_from(["ieltspeak", "practice"]);
        let Some(Commands::Practice(args)) = cli.command else {
            panic!("expected practice command");
        };
        assert_eq!(args.category, PracticeSelection::Part(Category::Part1));
        assert!(!args.offline);
        assert!(!args.duplex);
    }

    #[test]
    fn test_practice_full_test_offline() {
        let cli = Cli::parse_from([
            "ieltspeak",
            "practice",
            "--category",
            "full",
            "--offline",
            "--advance-delay-ms",
            "250",
        ]);
        let Some(Commands::Practice(args)) = cli.command else {
            panic!("expected practice command");
        };
        assert_eq!(args.category, PracticeSelection::FullTest);
        assert!(args.offline);
        assert_eq!(args.advance_delay_ms, Some(250));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result = Cli::try_parse_from(["ieltspeak", "topics", "--category", "part4"]);
        assert!(result.is_err());
    }
}
