//
//  apigee-cli
//  auth/keyring.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Secure Password Storage
//!
//! Stores Apigee passwords in the platform's native keyring so build
//! machines and developer laptops do not need them in plain text:
//!
//! - **macOS**: Keychain Services
//! - **Linux**: Secret Service API (GNOME Keyring, KWallet)
//! - **Windows**: Windows Credential Manager
//!
//! Entries are keyed by `username@host`, where `host` is the host of the
//! management API base URL. See [`KeyringStore::account`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use apigee_cli::auth::KeyringStore;
//!
//! fn remember() -> anyhow::Result<()> {
//!     let store = KeyringStore::new();
//!     let account = KeyringStore::account("ci@example.com", "api.enterprise.apigee.com");
//!
//!     store.store(&account, "secret")?;
//!     assert_eq!(store.get(&account)?.as_deref(), Some("secret"));
//!     store.delete(&account)?;
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use keyring::Entry;

/// The service name used to identify this application in the system keyring.
const SERVICE_NAME: &str = "apigee-cli";

/// Password storage backed by the system keyring.
///
/// # Notes
///
/// - The keyring may require user interaction on first access.
/// - On Linux, a secret service daemon (GNOME Keyring, KWallet) must be running.
///   Headless CI agents should pass the password through `APIGEE_PASSWORD` instead.
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringStore {
    /// Creates a keyring store with the default service name.
    ///
    /// No keyring access occurs during construction.
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Builds the keyring account name for a user on a host.
    ///
    /// ```rust
    /// use apigee_cli::auth::KeyringStore;
    ///
    /// assert_eq!(
    ///     KeyringStore::account("ci@example.com", "api.enterprise.apigee.com"),
    ///     "ci@example.com@api.enterprise.apigee.com"
    /// );
    /// ```
    pub fn account(username: &str, host: &str) -> String {
        format!("{}@{}", username, host)
    }

    /// Stores a password, replacing any existing entry for the account.
    pub fn store(&self, account: &str, password: &str) -> Result<()> {
        let entry = Entry::new(&self.service, account)?;
        entry.set_password(password)?;
        Ok(())
    }

    /// Retrieves a password.
    ///
    /// Returns `Ok(None)` when no entry exists for the account.
    pub fn get(&self, account: &str) -> Result<Option<String>> {
        let entry = Entry::new(&self.service, account)?;
        match entry.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a password. Deleting a missing entry succeeds.
    pub fn delete(&self, account: &str) -> Result<()> {
        let entry = Entry::new(&self.service, account)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(e.into()),
        }
    }
}
