//
//  apigee-cli
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Apigee CLI Library
//!
//! A client for the Apigee Edge Management API, built for build pipelines
//! that import, deploy and clean up API proxies and manage key value maps.
//!
//! ## Overview
//!
//! Every operation is one HTTP exchange (or a small fan-out of them) with
//! the management API. Operations are stateless: each call takes the
//! organization and per-operation settings, including credentials.
//!
//! ## Module Structure
//!
//! - [`api`]: [`ApigeeClient`], payload types, settings and errors
//! - [`auth`]: Basic authentication credentials and keyring storage
//! - [`config`]: Configuration file management
//! - [`cli`]: Command-line interface definitions using clap
//! - [`output`]: Output formatting (Table, JSON)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use apigee_cli::api::settings::{DeployProxySettings, ImportProxySettings, Settings};
//! use apigee_cli::auth::Credentials;
//! use apigee_cli::ApigeeClient;
//!
//! # async fn release() -> Result<(), apigee_cli::api::ApiError> {
//! let client = ApigeeClient::new()?;
//! let common = Settings::default().with_credentials(Credentials::new("ci@example.com", "secret"));
//!
//! let import = ImportProxySettings { common: common.clone(), ..Default::default() };
//! let imported = client.import_proxy("myorg", "weatherapi", "target/weatherapi.zip", &import).await?;
//!
//! let deploy = DeployProxySettings { common, ..Default::default() };
//! client.deploy_imported_proxy("myorg", "test", &imported, &deploy).await?;
//! # Ok(())
//! # }
//! ```

/// API client for the Apigee Edge Management API.
///
/// Request construction, status handling, payload decoding and every
/// proxy and key value map operation.
pub mod api;

/// Authentication and credential management.
///
/// Basic authentication credentials and password storage in the system
/// keyring.
pub mod auth;

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Configuration file management.
///
/// Handles loading and saving the TOML configuration file.
pub mod config;

/// Output formatting.
///
/// Renders results as tables or JSON.
pub mod output;

/// Re-export of the main CLI struct for convenient access.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use apigee_cli::Cli;
///
/// let cli = Cli::parse();
/// // Handle cli.command...
/// ```
pub use cli::Cli;

/// Re-export of the configuration struct.
///
/// # Example
///
/// ```rust,no_run
/// use apigee_cli::Config;
///
/// let config = Config::load().expect("Failed to load config");
/// if let Some(org) = config.get("organization") {
///     println!("Default organization: {}", org);
/// }
/// ```
pub use config::Config;

/// Re-export of the management API client.
pub use api::ApigeeClient;

/// Application name constant.
///
/// The name of the CLI binary, used for display purposes and configuration paths.
pub const APP_NAME: &str = "apigee";

/// Application version constant, derived from Cargo.toml at compile time.
///
/// ```rust
/// use apigee_cli::VERSION;
///
/// println!("apigee version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// Scripts can tell a rejected login or a missing proxy apart from other
/// failures.
///
/// - `0`: Success
/// - `1`: General error
/// - `2`: Invalid usage (reported by clap)
/// - `4`: Apigee rejected the credentials (401 or 403)
/// - `8`: Apigee reported the resource as missing (404)
pub mod exit_codes {
    use crate::api::ApiError;
    use reqwest::StatusCode;

    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// Authentication required or failed.
    ///
    /// Run `apigee auth login` to store a password.
    pub const AUTH_ERROR: i32 = 4;

    /// Resource not found.
    pub const NOT_FOUND: i32 = 8;

    /// Picks the exit code for a failed command.
    ///
    /// ```rust
    /// use apigee_cli::exit_codes;
    ///
    /// let err = anyhow::anyhow!("No organization given");
    /// assert_eq!(exit_codes::for_error(&err), exit_codes::ERROR);
    /// ```
    pub fn for_error(err: &anyhow::Error) -> i32 {
        match err.downcast_ref::<ApiError>().and_then(ApiError::status) {
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => AUTH_ERROR,
            Some(StatusCode::NOT_FOUND) => NOT_FOUND,
            _ => ERROR,
        }
    }

}
