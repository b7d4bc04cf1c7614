//
//  apigee-cli
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod auth;
mod config;
mod kvm;
mod proxy;

pub use auth::AuthCommand;
pub use config::ConfigCommand;
pub use kvm::KvmCommand;
pub use proxy::ProxyCommand;

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::api::settings::Settings;
use crate::api::ApigeeClient;
use crate::auth::{Credentials, KeyringStore};
use crate::config::Config;

/// Apigee CLI - Drive the Apigee Edge Management API from build pipelines
#[derive(Parser, Debug)]
#[command(
    name = "apigee",
    version,
    about = "Drive the Apigee Edge Management API from build pipelines",
    long_about = "apigee imports, deploys and cleans up Apigee API proxies and manages key value maps.\n\n\
                  Every command is a single step that fails with a non-zero exit code, so it can be\n\
                  chained from any build script.",
    propagate_version = true,
    after_help = "Use 'apigee <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Apigee organization
    #[arg(long, short = 'o', global = true, env = "APIGEE_ORG")]
    pub org: Option<String>,

    /// Username for Basic authentication
    #[arg(long, short = 'u', global = true, env = "APIGEE_USERNAME")]
    pub username: Option<String>,

    /// Password for Basic authentication (falls back to the keyring)
    #[arg(long, global = true, env = "APIGEE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Management API base URL
    #[arg(long, global = true, env = "APIGEE_BASE_URL")]
    pub base_url: Option<String>,

    /// Log every response body
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import, deploy and clean up API proxies
    #[command(visible_alias = "p")]
    Proxy(ProxyCommand),

    /// Manage key value maps
    Kvm(KvmCommand),

    /// Store or remove the Apigee password
    #[command(visible_alias = "login")]
    Auth(AuthCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Print version information
    Version,
}

/// Everything a command needs to talk to Apigee.
pub(crate) struct Session {
    pub client: ApigeeClient,
    pub config: Config,
    pub org: String,
    pub settings: Settings,
}

impl Session {
    /// Resolves client, organization and credentials from flags, environment
    /// and the configuration file, in that order of precedence.
    pub fn resolve(global: &GlobalOptions) -> Result<Self> {
        Self::resolve_from(global, &Config::config_path()?)
    }

    /// Like [`Session::resolve`], reading the configuration from `path`.
    ///
    /// A missing file means defaults; a file that cannot be parsed is an error.
    pub fn resolve_from(global: &GlobalOptions, path: &Path) -> Result<Self> {
        let mut config = Config::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        if let Some(base_url) = &global.base_url {
            config.base_url = base_url.clone();
        }

        let client = ApigeeClient::from_config(&config)?;

        let Some(org) = global.org.clone().or_else(|| config.organization.clone()) else {
            bail!("No organization given. Pass --org or run 'apigee config set organization <name>'.");
        };

        let credentials = resolve_credentials(global, &config);

        Ok(Self {
            client,
            config,
            org,
            settings: Settings {
                credentials,
                debug: global.debug,
            },
        })
    }

    /// Picks the environment from the argument or the configured default.
    pub fn environment(&self, explicit: Option<&str>) -> Result<String> {
        match explicit.or(self.config.default_environment.as_deref()) {
            Some(env) => Ok(env.to_string()),
            None => bail!(
                "No environment given. Pass --env or run 'apigee config set default_environment <name>'."
            ),
        }
    }
}

/// Username from flags or config; password from flags or the keyring.
///
/// Returns `None` without a username, which sends requests unauthenticated.
pub(crate) fn resolve_credentials(global: &GlobalOptions, config: &Config) -> Option<Credentials> {
    let username = global
        .username
        .clone()
        .or_else(|| config.username.clone())
        .filter(|u| !u.is_empty())?;

    let password = match &global.password {
        Some(password) => password.clone(),
        None => config
            .host()
            .and_then(|host| {
                KeyringStore::new()
                    .get(&KeyringStore::account(&username, &host))
                    .unwrap_or_else(|e| {
                        warn!("Could not read password from keyring: {}", e);
                        None
                    })
            })
            .unwrap_or_default(),
    };

    Some(Credentials::new(username, password))
}

/// Starts a spinner on stderr for long-running steps.
///
/// Returns `None` for JSON output or when stderr is not a terminal.
pub(crate) fn spinner(message: impl Into<String>, global: &GlobalOptions) -> Option<ProgressBar> {
    if global.json || !console::Term::stderr().is_term() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Clears a spinner started with [`spinner`].
pub(crate) fn finish(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_deploy() {
        let cli = Cli::try_parse_from([
            "apigee", "--org", "myorg", "proxy", "deploy", "weatherapi", "3", "--env", "test",
        ])
        .unwrap();
        assert_eq!(cli.global.org.as_deref(), Some("myorg"));
        assert!(matches!(cli.command, Commands::Proxy(_)));
    }

    fn global_with_org() -> GlobalOptions {
        GlobalOptions {
            org: Some("myorg".to_string()),
            username: Some("ci@example.com".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_session_rejects_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"https://apigee.internal.example.com\"\ntimeout_secs = \"soon\"\n",
        )
        .unwrap();

        let err = match Session::resolve_from(&global_with_org(), &path) {
            Ok(session) => panic!("resolved against {}", session.client.base_url()),
            Err(e) => e,
        };
        assert!(err.to_string().contains("config.toml"), "{}", err);
    }

    #[test]
    fn test_session_uses_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"https://apigee.internal.example.com\"\ndefault_environment = \"test\"\n",
        )
        .unwrap();

        let session = Session::resolve_from(&global_with_org(), &path).unwrap();
        assert_eq!(session.client.base_url(), "https://apigee.internal.example.com");
        assert_eq!(session.org, "myorg");
        assert_eq!(session.environment(None).unwrap(), "test");
        assert_eq!(session.environment(Some("prod")).unwrap(), "prod");
    }

    #[test]
    fn test_session_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::resolve_from(&global_with_org(), &dir.path().join("absent.toml")).unwrap();
        assert_eq!(session.client.base_url(), crate::config::DEFAULT_BASE_URL);
        assert!(session.environment(None).is_err());
    }

    #[test]
    fn test_credentials_need_username() {
        let global = GlobalOptions {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(resolve_credentials(&global, &Config::default()).is_none());
    }

    #[test]
    fn test_credentials_prefer_flags_over_config() {
        let global = GlobalOptions {
            username: Some("flag@example.com".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        };
        let config = Config {
            username: Some("config@example.com".to_string()),
            ..Default::default()
        };
        let credentials = resolve_credentials(&global, &config).unwrap();
        assert_eq!(credentials, Credentials::new("flag@example.com", "secret"));
    }
}
