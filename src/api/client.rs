//
//  apigee-cli
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client for the Apigee Management API
//!
//! This module provides [`ApigeeClient`], which turns each management
//! operation into one HTTP exchange (or, for
//! [`ApigeeClient::delete_all_undeployed_revisions`], many) and decodes the
//! response into typed results.
//!
//! ## Request Contract
//!
//! Every request:
//!
//! - carries `Accept: application/json`
//! - carries `Authorization: Basic ...` when the settings hold credentials
//!   with a non-empty username
//! - fails with [`ApiError::RemoteStatus`] on a non-success status, after
//!   logging the response body
//! - logs method, URL and body of the response when `debug` is set
//! - decodes the body as camelCase JSON
//!
//! Nothing is retried. The client keeps no state between calls and is cheap
//! to clone; clones share the underlying connection pool.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use url::Url;

use crate::api::common::{ApiError, ErrorResult, RevisionCleanup, RevisionDeletion};
use crate::api::keyvaluemaps::{KeyValueMap, KeyValueMapScope};
use crate::api::proxies::{
    ApiProxy, ApiProxyRevision, DeployProxyResult, ImportProxyResult, NodePackagedModule,
};
use crate::api::settings::{DeployProxySettings, ImportProxySettings, KeyValueMapSettings, Settings};
use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

type Result<T> = std::result::Result<T, ApiError>;

/// Renders a delay in seconds, keeping any fractional part (`15`, `0.5`).
fn delay_seconds(delay: Duration) -> String {
    if delay.subsec_nanos() == 0 {
        delay.as_secs().to_string()
    } else {
        delay.as_secs_f64().to_string()
    }
}

/// A completed HTTP exchange whose body has been read.
struct Exchange {
    method: Method,
    url: String,
    status: StatusCode,
    body: String,
}

/// The client for the Apigee Edge Management API.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use std::time::Duration;
/// use apigee_cli::api::ApigeeClient;
///
/// // Apigee Edge cloud with the default five minute timeout
/// let client = ApigeeClient::new()?;
///
/// // An on-premises management server
/// let on_prem = ApigeeClient::with_options("http://apigee-ms.internal:8080", Duration::from_secs(600))?;
/// # Ok::<(), apigee_cli::api::ApiError>(())
/// ```
///
/// # Deploying a Bundle
///
/// ```rust,no_run
/// use apigee_cli::api::ApigeeClient;
/// use apigee_cli::api::settings::{DeployProxySettings, ImportProxySettings};
/// use apigee_cli::auth::Credentials;
///
/// # async fn example() -> Result<(), apigee_cli::api::ApiError> {
/// let client = ApigeeClient::new()?;
/// let credentials = Credentials::new("ci@example.com", "secret");
///
/// let imported = client
///     .import_proxy(
///         "myorg",
///         "weatherapi",
///         "target/weatherapi.zip",
///         &ImportProxySettings::default().with_credentials(credentials.clone()),
///     )
///     .await?;
///
/// client
///     .deploy_imported_proxy(
///         "myorg",
///         "test",
///         &imported,
///         &DeployProxySettings::default().with_credentials(credentials),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApigeeClient {
    /// The underlying HTTP client
    http: Client,
    /// Base URL without trailing slash, e.g. `https://api.enterprise.apigee.com`
    base_url: String,
}

impl ApigeeClient {
    /// Creates a client for Apigee Edge cloud with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client for the given base URL with the default timeout.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client for the given base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// URL, or [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn with_options(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("apigee/{}", crate::VERSION))
            .timeout(timeout)
            .build()?;
        Self::with_http_client(http, base_url)
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_http_client(http: Client, base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from the CLI configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_options(&config.base_url, config.timeout())
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // URL construction

    /// URL of the bundle import endpoint.
    ///
    /// ```rust
    /// use apigee_cli::api::ApigeeClient;
    ///
    /// let client = ApigeeClient::new()?;
    /// assert_eq!(
    ///     client.import_url("org", "proxy", None),
    ///     "https://api.enterprise.apigee.com/v1/organizations/org/apis?action=import&name=proxy"
    /// );
    /// assert!(client.import_url("org", "proxy", Some(true)).ends_with("&validate=true"));
    /// # Ok::<(), apigee_cli::api::ApiError>(())
    /// ```
    pub fn import_url(&self, org: &str, proxy: &str, validate: Option<bool>) -> String {
        let mut url = format!(
            "{}/v1/organizations/{}/apis?action=import&name={}",
            self.base_url, org, proxy
        );
        if let Some(validate) = validate {
            url.push_str(&format!("&validate={}", validate));
        }
        url
    }

    /// URL of the deployment endpoint, with `override` and `delay` query
    /// parameters when the settings ask for them.
    ///
    /// ```rust
    /// use apigee_cli::api::ApigeeClient;
    /// use apigee_cli::api::settings::DeployProxySettings;
    ///
    /// let client = ApigeeClient::new()?;
    /// assert_eq!(
    ///     client.deploy_url("org", "dev", "apiName", "1", &DeployProxySettings::default()),
    ///     "https://api.enterprise.apigee.com/v1/o/org/environments/dev/apis/apiName/revisions/1/deployments?override=True&delay=15"
    /// );
    /// # Ok::<(), apigee_cli::api::ApiError>(())
    /// ```
    pub fn deploy_url(
        &self,
        org: &str,
        env: &str,
        proxy: &str,
        revision: &str,
        settings: &DeployProxySettings,
    ) -> String {
        let mut url = format!(
            "{}/v1/o/{}/environments/{}/apis/{}/revisions/{}/deployments",
            self.base_url, org, env, proxy, revision
        );

        let mut params = Vec::new();
        if settings.r#override == Some(true) {
            params.push("override=True".to_string());
        }
        if let Some(delay) = settings.delay {
            params.push(format!("delay={}", delay_seconds(delay)));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    /// URL of a proxy.
    pub fn proxy_url(&self, org: &str, proxy: &str) -> String {
        format!("{}/v1/organizations/{}/apis/{}", self.base_url, org, proxy)
    }

    /// URL of a proxy revision.
    pub fn revision_url(&self, org: &str, proxy: &str, revision: &str) -> String {
        format!("{}/revisions/{}", self.proxy_url(org, proxy), revision)
    }

    /// URL of the npm endpoint of a proxy revision.
    pub fn npm_url(&self, org: &str, proxy: &str, revision: &str) -> String {
        format!("{}/npm", self.revision_url(org, proxy, revision))
    }

    /// URL of the key value map collection for a scope.
    pub fn kvm_collection_url(&self, org: &str, scope: &KeyValueMapScope) -> String {
        format!("{}{}", self.base_url, scope.collection_path(org))
    }

    /// URL of a single key value map.
    pub fn kvm_url(&self, org: &str, scope: &KeyValueMapScope, name: &str) -> String {
        format!("{}/{}", self.kvm_collection_url(org, scope), name)
    }

    // Operations

    /// Imports a proxy bundle (zip) and creates a new revision.
    ///
    /// The file is sent as multipart form data under the field `file`.
    /// Each call creates a new revision, so this is not safe to retry blindly.
    ///
    /// # Errors
    ///
    /// [`ApiError::Io`] if the bundle cannot be read, otherwise the usual
    /// transport, status and decode errors.
    pub async fn import_proxy(
        &self,
        org: &str,
        proxy: &str,
        bundle: impl AsRef<Path>,
        settings: &ImportProxySettings,
    ) -> Result<ImportProxyResult> {
        let bundle = bundle.as_ref();
        info!("Importing Apigee proxy {} from {}", proxy, bundle.display());

        let content = tokio::fs::read(bundle).await?;
        let file_name = bundle
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.zip", proxy));
        let form = Form::new().part("file", Part::bytes(content).file_name(file_name));

        let url = self.import_url(org, proxy, settings.validate);
        let request = self
            .request(Method::POST, &url, &settings.common)
            .multipart(form);
        self.send(request, &settings.common).await
    }

    /// Deploys a proxy revision to an environment.
    ///
    /// Succeeds only when the response confirms the deployment: either the
    /// top-level state is `"deployed"`, or one of the reported environments
    /// matches this revision and environment with state `"deployed"`.
    ///
    /// # Errors
    ///
    /// [`ApiError::DeploymentNotConfirmed`] when Apigee accepted the request
    /// but did not report a successful deployment.
    pub async fn deploy_proxy(
        &self,
        org: &str,
        env: &str,
        proxy: &str,
        revision: &str,
        settings: &DeployProxySettings,
    ) -> Result<DeployProxyResult> {
        info!("Deploying {} to Apigee environment {}", proxy, env);

        let url = self.deploy_url(org, env, proxy, revision, settings);
        let request = self
            .request(Method::POST, &url, &settings.common)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("");
        let result: DeployProxyResult = self.send(request, &settings.common).await?;

        if !result.is_deployed_to(env, revision) {
            return Err(ApiError::DeploymentNotConfirmed {
                proxy: proxy.to_string(),
                revision: revision.to_string(),
                environment: env.to_string(),
            });
        }

        Ok(result)
    }

    /// Deploys the revision created by an import.
    pub async fn deploy_imported_proxy(
        &self,
        org: &str,
        env: &str,
        imported: &ImportProxyResult,
        settings: &DeployProxySettings,
    ) -> Result<DeployProxyResult> {
        self.deploy_proxy(org, env, &imported.name, &imported.revision, settings)
            .await
    }

    /// Runs `npm install` for a proxy revision.
    ///
    /// Returns the installed modules and logs each name and version.
    pub async fn install_node_packaged_modules(
        &self,
        org: &str,
        proxy: &str,
        revision: &str,
        settings: &Settings,
    ) -> Result<Vec<NodePackagedModule>> {
        info!(
            "Installing Node Packaged Modules (npm) in Apigee for revision {} of {}",
            revision, proxy
        );

        let url = self.npm_url(org, proxy, revision);
        let request = self
            .request(Method::POST, &url, settings)
            .form(&[("command", "install")]);
        let modules: Vec<NodePackagedModule> = self.send(request, settings).await?;

        for module in &modules {
            info!("{} {}", module.name, module.version);
        }

        Ok(modules)
    }

    /// Runs `npm install` for the revision created by an import.
    pub async fn install_node_packaged_modules_for_import(
        &self,
        org: &str,
        imported: &ImportProxyResult,
        settings: &Settings,
    ) -> Result<Vec<NodePackagedModule>> {
        self.install_node_packaged_modules(org, &imported.name, &imported.revision, settings)
            .await
    }

    /// Fetches a proxy with its revision list.
    pub async fn get_api_proxy(&self, org: &str, proxy: &str, settings: &Settings) -> Result<ApiProxy> {
        let url = self.proxy_url(org, proxy);
        let request = self.request(Method::GET, &url, settings);
        self.send(request, settings).await
    }

    /// Deletes a proxy revision.
    ///
    /// Fails with [`ApiError::RemoteStatus`] for any non-success status,
    /// including a deployed revision. Use
    /// [`delete_all_undeployed_revisions`](Self::delete_all_undeployed_revisions)
    /// to clean up without caring which revisions are deployed.
    pub async fn delete_api_proxy_revision(
        &self,
        org: &str,
        proxy: &str,
        revision: &str,
        settings: &Settings,
    ) -> Result<ApiProxyRevision> {
        info!("Deleting revision {} of {}", revision, proxy);

        let url = self.revision_url(org, proxy, revision);
        let request = self.request(Method::DELETE, &url, settings);
        self.send(request, settings).await
    }

    /// Attempts to delete a revision, treating "still deployed" as a normal
    /// outcome.
    ///
    /// # Returns
    ///
    /// - [`RevisionDeletion::Deleted`] on a success status
    /// - [`RevisionDeletion::Retained`] on `400` with the Apigee error code
    ///   `distribution.ApplicationCanNotBeDeleted`
    ///
    /// # Errors
    ///
    /// [`ApiError::UnexpectedDeleteStatus`] for any other status.
    pub async fn try_delete_revision(
        &self,
        org: &str,
        proxy: &str,
        revision: &str,
        settings: &Settings,
    ) -> Result<RevisionDeletion> {
        let url = self.revision_url(org, proxy, revision);
        let exchange = self
            .exchange(self.request(Method::DELETE, &url, settings))
            .await?;

        if exchange.status.is_success() {
            debug!("Deleted revision {} of {}", revision, proxy);
            return Ok(RevisionDeletion::Deleted);
        }

        if exchange.status == StatusCode::BAD_REQUEST
            && ErrorResult::parse(&exchange.body).is_some_and(|e| e.is_deployed_revision())
        {
            debug!("Revision {} of {} is deployed, not deleted", revision, proxy);
            return Ok(RevisionDeletion::Retained);
        }

        error!(
            "Apigee status {} returned for {} {}: {}",
            exchange.status, exchange.method, exchange.url, exchange.body
        );
        Err(ApiError::UnexpectedDeleteStatus {
            status: exchange.status,
            method: exchange.method,
            revision: revision.to_string(),
        })
    }

    /// Deletes every revision of a proxy that is not deployed.
    ///
    /// Fetches the proxy, then attempts to delete all of its revisions
    /// concurrently with [`try_delete_revision`](Self::try_delete_revision).
    /// Every attempt runs to completion before failures are reported; a
    /// deployed revision is not a failure.
    ///
    /// # Errors
    ///
    /// The first error if exactly one attempt failed, [`ApiError::Multiple`]
    /// if several did.
    pub async fn delete_all_undeployed_revisions(
        &self,
        org: &str,
        proxy: &str,
        settings: &Settings,
    ) -> Result<RevisionCleanup> {
        info!("Deleting undeployed revisions of {}", proxy);

        let api_proxy = self.get_api_proxy(org, proxy, settings).await?;

        let tasks: Vec<_> = api_proxy
            .revision
            .into_iter()
            .map(|revision| {
                let client = self.clone();
                let org = org.to_string();
                let proxy = proxy.to_string();
                let settings = settings.clone();
                tokio::spawn(async move {
                    let outcome = client
                        .try_delete_revision(&org, &proxy, &revision, &settings)
                        .await;
                    (revision, outcome)
                })
            })
            .collect();

        let mut cleanup = RevisionCleanup {
            proxy: proxy.to_string(),
            ..Default::default()
        };
        let mut errors = Vec::new();

        for task in tasks {
            match task.await {
                Ok((revision, Ok(outcome))) => cleanup.record(revision, outcome),
                Ok((_, Err(e))) => errors.push(e),
                Err(e) => errors.push(ApiError::Task(e)),
            }
        }

        match ApiError::aggregate(errors) {
            Some(e) => Err(e),
            None => {
                info!(
                    "Deleted {} revision(s) of {}, {} still deployed",
                    cleanup.deleted.len(),
                    proxy,
                    cleanup.retained.len()
                );
                Ok(cleanup)
            }
        }
    }

    /// Creates a key value map at organization or environment scope.
    ///
    /// Returns the map as stored by Apigee.
    pub async fn create_key_value_map(
        &self,
        org: &str,
        kvm: &KeyValueMap,
        settings: &KeyValueMapSettings,
    ) -> Result<KeyValueMap> {
        let scope = settings.scope();
        info!("Creating key value map {} in {}", kvm.name, scope);

        let url = self.kvm_collection_url(org, &scope);
        let request = self
            .request(Method::POST, &url, &settings.common)
            .json(kvm);
        self.send(request, &settings.common).await
    }

    /// Deletes a key value map and returns its last contents.
    pub async fn delete_key_value_map(
        &self,
        org: &str,
        name: &str,
        settings: &KeyValueMapSettings,
    ) -> Result<KeyValueMap> {
        let scope = settings.scope();
        info!("Deleting key value map {} from {}", name, scope);

        let url = self.kvm_url(org, &scope, name);
        let request = self.request(Method::DELETE, &url, &settings.common);
        self.send(request, &settings.common).await
    }

    /// Lists the names of the key value maps in a scope.
    pub async fn list_key_value_maps(
        &self,
        org: &str,
        settings: &KeyValueMapSettings,
    ) -> Result<Vec<String>> {
        let url = self.kvm_collection_url(org, &settings.scope());
        let request = self.request(Method::GET, &url, &settings.common);
        self.send(request, &settings.common).await
    }

    // Plumbing

    /// Starts a request with the headers every call carries.
    fn request(&self, method: Method, url: &str, settings: &Settings) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        if let Some(credentials) = &settings.credentials {
            request = credentials.apply_to_request(request);
        }

        request
    }

    /// Sends a request and reads the whole body, whatever the status.
    async fn exchange(&self, request: RequestBuilder) -> Result<Exchange> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().to_string();

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(Exchange {
            method,
            url,
            status,
            body,
        })
    }

    /// Sends a request and decodes a successful JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, settings: &Settings) -> Result<T> {
        let exchange = self.exchange(request).await?;

        if !exchange.status.is_success() {
            error!("Apigee status {} returned: {}", exchange.status, exchange.body);
            return Err(ApiError::RemoteStatus {
                status: exchange.status,
                method: exchange.method,
                url: exchange.url,
            });
        }

        if settings.debug {
            info!(
                "RESPONSE from {} {}\n{}",
                exchange.method, exchange.url, exchange.body
            );
        }

        Ok(serde_json::from_str(&exchange.body)?)
    }
}
