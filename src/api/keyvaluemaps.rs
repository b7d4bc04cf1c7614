//
//  apigee-cli
//  api/keyvaluemaps.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Key value map types.
//!
//! A key value map (KVM) is a small persistent store that proxies read
//! configuration from. A map lives either at the organization level or inside
//! a single environment, see [`KeyValueMapScope`].
//!
//! # Example
//!
//! ```rust
//! use apigee_cli::api::keyvaluemaps::KeyValueMap;
//!
//! let kvm = KeyValueMap::new("settings")
//!     .with_entry("backend", "https://backend.example.com")
//!     .with_entry("timeout", "30");
//!
//! let json = serde_json::to_string(&kvm).unwrap();
//! assert!(json.contains(r#""encrypted":false"#));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A key value map and its entries.
///
/// Entry names are expected to be unique within a map. Apigee enforces this,
/// the client does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueMap {
    /// Map name.
    pub name: String,

    /// Whether values are stored encrypted.
    #[serde(default)]
    pub encrypted: bool,

    /// Entries, in order.
    #[serde(default)]
    pub entry: Vec<KeyValueMapEntry>,
}

impl KeyValueMap {
    /// Creates an empty, unencrypted map.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encrypted: false,
            entry: Vec::new(),
        }
    }

    /// Sets the encrypted flag.
    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Appends an entry.
    pub fn with_entry(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entry.push(KeyValueMapEntry {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Looks up the value of an entry by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }
}

/// A single key value map entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueMapEntry {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Where a key value map lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyValueMapScope {
    /// Shared by the whole organization.
    #[default]
    Organization,
    /// Visible only inside the named environment.
    Environment(String),
}

impl KeyValueMapScope {
    /// Builds a scope from an optional environment name.
    ///
    /// `None` and the empty string both mean organization scope.
    pub fn from_environment(environment: Option<&str>) -> Self {
        match environment {
            Some(env) if !env.is_empty() => Self::Environment(env.to_string()),
            _ => Self::Organization,
        }
    }

    /// Returns the collection path for this scope.
    ///
    /// ```rust
    /// use apigee_cli::api::keyvaluemaps::KeyValueMapScope;
    ///
    /// assert_eq!(
    ///     KeyValueMapScope::Organization.collection_path("org"),
    ///     "/v1/organizations/org/keyvaluemaps"
    /// );
    /// assert_eq!(
    ///     KeyValueMapScope::Environment("dev".into()).collection_path("org"),
    ///     "/v1/organizations/org/environments/dev/keyvaluemaps"
    /// );
    /// ```
    pub fn collection_path(&self, org: &str) -> String {
        match self {
            Self::Organization => format!("/v1/organizations/{}/keyvaluemaps", org),
            Self::Environment(env) => {
                format!("/v1/organizations/{}/environments/{}/keyvaluemaps", org, env)
            }
        }
    }
}

impl fmt::Display for KeyValueMapScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization => write!(f, "organization"),
            Self::Environment(env) => write!(f, "environment {}", env),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_and_keeps_entry_order() {
        let kvm = KeyValueMap::new("settings")
            .encrypted(true)
            .with_entry("b", "2")
            .with_entry("a", "1");

        let value = serde_json::to_value(&kvm).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "settings",
                "encrypted": true,
                "entry": [
                    {"name": "b", "value": "2"},
                    {"name": "a", "value": "1"}
                ]
            })
        );
    }

    #[test]
    fn test_echoed_map_preserves_fields() {
        let sent = KeyValueMap::new("settings")
            .encrypted(true)
            .with_entry("first", "1")
            .with_entry("second", "2")
            .with_entry("third", "3");

        let echoed: KeyValueMap =
            serde_json::from_str(&serde_json::to_string(&sent).unwrap()).unwrap();
        assert_eq!(echoed, sent);
        assert_eq!(echoed.get("second"), Some("2"));
        assert_eq!(echoed.get("missing"), None);
    }

    #[test]
    fn test_missing_fields_default() {
        let kvm: KeyValueMap = serde_json::from_str(r#"{"name":"empty"}"#).unwrap();
        assert!(!kvm.encrypted);
        assert!(kvm.entry.is_empty());
    }

    #[test]
    fn test_scope_from_environment() {
        assert_eq!(KeyValueMapScope::from_environment(None), KeyValueMapScope::Organization);
        assert_eq!(KeyValueMapScope::from_environment(Some("")), KeyValueMapScope::Organization);
        assert_eq!(
            KeyValueMapScope::from_environment(Some("prod")),
            KeyValueMapScope::Environment("prod".to_string())
        );
        assert_eq!(KeyValueMapScope::Environment("prod".into()).to_string(), "environment prod");
    }
}
