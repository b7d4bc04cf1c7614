//
//  apigee-cli
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the client for the Apigee Edge Management REST API.
//!
//! ## Architecture
//!
//! - [`client`]: [`ApigeeClient`] with the request contract and every operation
//! - [`proxies`]: proxy, import, deployment and npm payloads
//! - [`keyvaluemaps`]: key value map payloads and scopes
//! - [`settings`]: per-operation settings (credentials, debug, options)
//! - [`common`]: errors and shared outcome types
//!
//! ## Operations
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | [`import_proxy`](ApigeeClient::import_proxy) | `POST /v1/organizations/{org}/apis?action=import` |
//! | [`deploy_proxy`](ApigeeClient::deploy_proxy) | `POST /v1/o/{org}/environments/{env}/apis/{proxy}/revisions/{rev}/deployments` |
//! | [`install_node_packaged_modules`](ApigeeClient::install_node_packaged_modules) | `POST .../revisions/{rev}/npm` |
//! | [`get_api_proxy`](ApigeeClient::get_api_proxy) | `GET /v1/organizations/{org}/apis/{proxy}` |
//! | [`delete_api_proxy_revision`](ApigeeClient::delete_api_proxy_revision) | `DELETE .../revisions/{rev}` |
//! | [`delete_all_undeployed_revisions`](ApigeeClient::delete_all_undeployed_revisions) | `GET` proxy, then `DELETE` each revision |
//! | [`create_key_value_map`](ApigeeClient::create_key_value_map) | `POST .../keyvaluemaps` |
//! | [`delete_key_value_map`](ApigeeClient::delete_key_value_map) | `DELETE .../keyvaluemaps/{name}` |
//! | [`list_key_value_maps`](ApigeeClient::list_key_value_maps) | `GET .../keyvaluemaps` |
//!
//! ## Error Handling
//!
//! Every operation returns [`ApiError`] on failure:
//!
//! - `Transport`: connection, DNS or timeout failures
//! - `RemoteStatus`: non-success status, with method and URL
//! - `DeploymentNotConfirmed`: deploy accepted but not confirmed
//! - `Decode`: unexpected response body

/// Core HTTP client for the management API.
pub mod client;

/// Shared error and outcome types.
pub mod common;

/// Key value map payloads.
pub mod keyvaluemaps;

/// Proxy payloads.
pub mod proxies;

/// Per-operation settings.
pub mod settings;

pub use client::ApigeeClient;
pub use common::ApiError;
