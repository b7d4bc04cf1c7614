//
//  apigee-cli
//  api/settings.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Per-operation settings.
//!
//! Every operation takes a settings value. All of them carry the common
//! [`Settings`] (credentials and the debug flag); some add operation specific
//! options. `Default` gives the behaviour a build script gets when it passes
//! no settings at all.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use apigee_cli::api::settings::DeployProxySettings;
//! use apigee_cli::auth::Credentials;
//!
//! let settings = DeployProxySettings {
//!     delay: Some(Duration::from_secs(30)),
//!     ..Default::default()
//! }
//! .with_credentials(Credentials::new("user@example.com", "secret"));
//!
//! assert_eq!(settings.r#override, Some(true));
//! ```

use std::time::Duration;

use crate::api::keyvaluemaps::KeyValueMapScope;
use crate::auth::Credentials;

/// Default delay Apigee waits before undeploying the previous revision.
pub const DEFAULT_DEPLOY_DELAY: Duration = Duration::from_secs(15);

/// Settings shared by every operation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Basic auth credentials. Omitted or empty username means no
    /// Authorization header.
    pub credentials: Option<Credentials>,

    /// Log method, URL and body of every successful response.
    pub debug: bool,
}

impl Settings {
    /// Sets the credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the debug flag.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Settings for importing a proxy bundle.
#[derive(Debug, Clone, Default)]
pub struct ImportProxySettings {
    pub common: Settings,

    /// Sent as the `validate` query parameter when set. Left unset, the
    /// parameter is omitted and Apigee applies its own default.
    pub validate: Option<bool>,
}

/// Settings for deploying a proxy revision.
#[derive(Debug, Clone)]
pub struct DeployProxySettings {
    pub common: Settings,

    /// Replace the currently deployed revision (`override=True`).
    /// The parameter is sent only when this is `Some(true)`.
    pub r#override: Option<bool>,

    /// Grace period before the previous revision is undeployed.
    /// Sent in seconds, fractional when needed.
    pub delay: Option<Duration>,
}

impl Default for DeployProxySettings {
    fn default() -> Self {
        Self {
            common: Settings::default(),
            r#override: Some(true),
            delay: Some(DEFAULT_DEPLOY_DELAY),
        }
    }
}

/// Settings for key value map operations.
#[derive(Debug, Clone, Default)]
pub struct KeyValueMapSettings {
    pub common: Settings,

    /// Environment that scopes the map. `None` means organization scope.
    pub environment: Option<String>,
}

impl KeyValueMapSettings {
    /// The scope these settings address.
    pub fn scope(&self) -> KeyValueMapScope {
        KeyValueMapScope::from_environment(self.environment.as_deref())
    }
}

macro_rules! common_settings {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Sets the credentials.
                pub fn with_credentials(mut self, credentials: Credentials) -> Self {
                    self.common = self.common.with_credentials(credentials);
                    self
                }

                /// Sets the debug flag.
                pub fn with_debug(mut self, debug: bool) -> Self {
                    self.common = self.common.with_debug(debug);
                    self
                }
            }
        )*
    };
}

common_settings!(ImportProxySettings, DeployProxySettings, KeyValueMapSettings);
