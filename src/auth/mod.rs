//
//  apigee-cli
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! The Apigee management API authenticates with HTTP Basic authentication.
//! [`Credentials`] holds the username and password and builds the
//! `Authorization` header; [`KeyringStore`] keeps passwords in the system
//! keyring between runs.
//!
//! Some on-premises Apigee installations trust network-level authentication.
//! For those, leave the username empty and no header is sent at all.
//!
//! ## Example
//!
//! ```rust
//! use apigee_cli::auth::Credentials;
//!
//! let credentials = Credentials::new("testUser", "testPassword");
//! assert_eq!(
//!     credentials.authorization_header().as_deref(),
//!     Some("Basic dGVzdFVzZXI6dGVzdFBhc3N3b3Jk")
//! );
//!
//! assert_eq!(Credentials::default().authorization_header(), None);
//! ```

mod keyring;

pub use keyring::*;

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

/// Username and password for HTTP Basic authentication.
///
/// The `Debug` output never includes the password.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// The Apigee username, usually an email address.
    pub username: String,
    /// The password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether these credentials produce an Authorization header.
    ///
    /// Only a non-empty username counts; the password may be empty.
    pub fn is_present(&self) -> bool {
        !self.username.is_empty()
    }

    /// Returns the `Authorization` header value, `Basic base64(username:password)`.
    ///
    /// Returns `None` when the username is empty.
    pub fn authorization_header(&self) -> Option<String> {
        if !self.is_present() {
            return None;
        }

        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        Some(format!("Basic {}", token))
    }

    /// Applies the Authorization header to a request, if there is one.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self.authorization_header() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
