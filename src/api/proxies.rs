//
//  apigee-cli
//  api/proxies.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! API proxy types and data structures.
//!
//! This module provides the payloads exchanged with the Apigee proxy
//! endpoints: importing a bundle, deploying a revision, installing Node.js
//! modules, and reading or deleting proxies and revisions.
//!
//! # Proxy Lifecycle
//!
//! ```text
//! import (new revision) -> npm install (optional) -> deploy -> ... -> delete undeployed revisions
//! ```
//!
//! # Notes
//!
//! - Revision identifiers are strings on the wire and stay strings here.
//!   They are never parsed as integers.
//! - All payloads use camelCase field names.

use std::slice;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State reported by Apigee for a live deployment.
pub const DEPLOYED: &str = "deployed";

/// An Apigee API proxy with its revision list.
///
/// # Example
///
/// ```rust
/// use apigee_cli::api::proxies::ApiProxy;
///
/// let json = r#"{"name":"weatherapi","revision":["1","2","3"]}"#;
/// let proxy: ApiProxy = serde_json::from_str(json).unwrap();
/// assert_eq!(proxy.revision.last().map(String::as_str), Some("3"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProxy {
    /// Proxy name.
    pub name: String,

    /// Revision identifiers, in the order Apigee lists them.
    #[serde(default)]
    pub revision: Vec<String>,

    /// Creation and modification details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<ApiProxyMetadata>,
}

/// Creation and modification details of a proxy.
///
/// Timestamps are epoch integers in microseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProxyMetadata {
    /// When the proxy was created.
    #[serde(default, with = "chrono::serde::ts_microseconds_option")]
    pub created_at: Option<DateTime<Utc>>,

    /// Who created the proxy.
    #[serde(default)]
    pub created_by: Option<String>,

    /// When the proxy was last modified.
    #[serde(default, with = "chrono::serde::ts_microseconds_option")]
    pub last_modified_at: Option<DateTime<Utc>>,

    /// Who last modified the proxy.
    #[serde(default)]
    pub last_modified_by: Option<String>,

    /// Proxy sub type, e.g. `Proxy` or `NodeScript`.
    #[serde(default)]
    pub sub_type: Option<String>,
}

/// A single proxy revision as returned by the revision endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProxyRevision {
    /// Proxy name.
    pub name: String,

    /// Revision identifier.
    pub revision: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, with = "chrono::serde::ts_microseconds_option")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_by: Option<String>,

    #[serde(default, with = "chrono::serde::ts_microseconds_option")]
    pub last_modified_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_modified_by: Option<String>,

    #[serde(default)]
    pub configuration_version: Option<ConfigurationVersion>,
}

/// Bundle configuration version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationVersion {
    pub major_version: u32,
    pub minor_version: u32,
}

/// Result of importing a proxy bundle.
///
/// Every import creates a new revision, so importing is not safe to retry
/// blindly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProxyResult {
    /// Proxy name.
    pub name: String,

    /// The revision created by the import.
    pub revision: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_version: Option<ConfigurationVersion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Result of deploying a proxy revision.
///
/// The first deployment of a proxy reports `state: "deployed"` directly.
/// Redeployments with `override` report the environments instead, either as
/// a single object or as an array. See [`DeployEnvironments`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployProxyResult {
    /// Proxy name, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Organization, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Revision, when reported at the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Deployment state (`"deployed"` or other).
    #[serde(default)]
    pub state: String,

    /// Environment details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<DeployEnvironments>,
}

impl DeployProxyResult {
    /// Whether this result confirms `revision` as deployed to `environment`.
    ///
    /// A top-level `state` of `"deployed"` confirms the deployment on its own.
    /// Otherwise some environment entry must match the revision, the
    /// environment name and the `"deployed"` state.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apigee_cli::api::proxies::DeployProxyResult;
    ///
    /// let json = r#"{"environment":[{"environment":"dev","revision":"2","state":"deployed"}]}"#;
    /// let result: DeployProxyResult = serde_json::from_str(json).unwrap();
    /// assert!(result.is_deployed_to("dev", "2"));
    /// assert!(!result.is_deployed_to("prod", "2"));
    /// ```
    pub fn is_deployed_to(&self, environment: &str, revision: &str) -> bool {
        if self.state == DEPLOYED {
            return true;
        }

        self.environments().iter().any(|env| {
            env.revision == revision && env.state == DEPLOYED && env.environment == environment
        })
    }

    /// Environment entries reported by Apigee, empty when none were reported.
    pub fn environments(&self) -> &[DeployEnvironment] {
        self.environment
            .as_ref()
            .map(DeployEnvironments::as_slice)
            .unwrap_or_default()
    }
}

/// The `environment` field of a deploy result.
///
/// Apigee sends a single object when one environment is affected and an
/// array when several are. The first deployment of a proxy reports only the
/// environment name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeployEnvironments {
    /// Bare environment name.
    Name(String),
    /// A single environment entry.
    One(DeployEnvironment),
    /// Several environment entries.
    Many(Vec<DeployEnvironment>),
}

impl DeployEnvironments {
    /// Environment entries as a slice. A bare name carries no entries.
    pub fn as_slice(&self) -> &[DeployEnvironment] {
        match self {
            Self::Name(_) => &[],
            Self::One(env) => slice::from_ref(env),
            Self::Many(envs) => envs,
        }
    }
}

/// One environment entry of a deploy result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployEnvironment {
    /// Environment name.
    pub environment: String,

    /// Revision deployed to it.
    #[serde(default)]
    pub revision: String,

    /// Deployment state.
    #[serde(default)]
    pub state: String,
}

/// A Node.js module installed into a proxy revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePackagedModule {
    /// Module name.
    pub name: String,

    /// Installed version.
    #[serde(default)]
    pub version: String,
}
