//! CLI bootstrap - the composition root.
//!
//! This module is the only place where infrastructure is wired together
//! for the terminal front-end:
//! - Settings from the environment, overridden by flags
//! - The practice service client (via ieltspeak-api)
//!
//! The audio device is opened by the practice handler, since only that
//! command needs it.

use std::sync::Arc;

use ieltspeak_api::{DefaultPracticeClient, PracticeApiConfig};
use ieltspeak_core::{Settings, validate_settings};

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub settings: Settings,
}

impl CliConfig {
    /// Settings from the environment with flag overrides applied.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let settings = Settings::from_env()?;
        Self::with_overrides(settings, cli)
    }

    /// Apply the global flags on top of `settings` and validate the result.
    pub fn with_overrides(mut settings: Settings, cli: &Cli) -> Result<Self, CliError> {
        if let Some(url) = &cli.api_url {
            settings.api_base_url = Some(url.clone());
        }
        if let Some(secs) = cli.timeout_secs {
            settings.request_timeout_secs = Some(secs);
        }
        validate_settings(&settings)?;
        Ok(Self { settings })
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub settings: Settings,
    /// Client for the practice service; also the question source and the
    /// synthesizer of online sessions.
    pub client: Arc<DefaultPracticeClient>,
}

impl CliContext {
    pub fn client(&self) -> &Arc<DefaultPracticeClient> {
        &self.client
    }
}

/// Build the HTTP client from the resolved settings.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let api_config = PracticeApiConfig::from_settings(&config.settings);
    let client = Arc::new(DefaultPracticeClient::new(&api_config)?);
    tracing::debug!(base_url = client.base_url(), "CLI context ready");

    Ok(CliContext {
        settings: config.settings,
        client,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from([
            "ieltspeak",
            "--api-url",
            "https://practice.test/api/v1",
            "--timeout",
            "5",
            "tips",
        ]);
        let env = Settings::from_vars([("IELTSPEAK_API_URL", "http://from-env:4300")]).unwrap();

        let config = CliConfig::with_overrides(env, &cli).unwrap();
        assert_eq!(
            config.settings.effective_api_base_url(),
            "https://practice.test/api/v1"
        );
        assert_eq!(config.settings.request_timeout_secs, Some(5));
    }

    #[test]
    fn environment_kept_without_flags() {
        let cli = Cli::parse_from(["ieltspeak", "tips"]);
        let env = Settings::from_vars([("IELTSPEAK_ADVANCE_DELAY_MS", "1500")]).unwrap();

        let config = CliConfig::with_overrides(env, &cli).unwrap();
        assert_eq!(config.settings.advance_delay_ms, Some(1500));
    }

    #[test]
    fn invalid_override_rejected() {
        let cli = Cli::parse_from(["ieltspeak", "--timeout", "0", "tips"]);
        let err = CliConfig::with_overrides(Settings::default(), &cli).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn bootstrap_builds_client() {
        let config = CliConfig {
            settings: Settings::with_defaults(),
        };
        let ctx = bootstrap(config).unwrap();
        assert!(ctx.client().base_url().starts_with("http://localhost:4300/api/v1"));
    }
}
