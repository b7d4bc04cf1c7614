//
//  apigee-cli
//  tests/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Exercises `ApigeeClient` against a local mock of the management API.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use apigee_cli::api::common::ApiError;
use apigee_cli::api::keyvaluemaps::KeyValueMap;
use apigee_cli::api::settings::{
    DeployProxySettings, ImportProxySettings, KeyValueMapSettings, Settings,
};
use apigee_cli::auth::Credentials;
use apigee_cli::ApigeeClient;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const ORG: &str = "org";
const BASIC_AUTH: &str = "Basic dGVzdFVzZXI6dGVzdFBhc3N3b3Jk";

fn client(server: &ServerGuard) -> ApigeeClient {
    ApigeeClient::with_options(&server.url(), Duration::from_secs(5)).unwrap()
}

fn credentials() -> Credentials {
    Credentials::new("testUser", "testPassword")
}

/// Log lines written by the client while a test runs.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Installs a subscriber for the current thread that records to `logs`.
fn capture_logs(logs: &CapturedLogs) -> tracing::subscriber::DefaultGuard {
    let logs = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || logs.clone())
        .finish();
    tracing::subscriber::set_default(subscriber)
}

fn bundle() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
    file.write_all(b"PK\x03\x04bundle").unwrap();
    file
}

#[tokio::test]
async fn test_get_api_proxy_sends_basic_auth() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/organizations/org/apis/weatherapi")
        .match_header("authorization", BASIC_AUTH)
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"name":"weatherapi","revision":["1","2"],
                "metaData":{"createdAt":1454000000000000,"createdBy":"ci@example.com","subType":"Proxy"}}"#,
        )
        .create_async()
        .await;

    let proxy = client(&server)
        .get_api_proxy(ORG, "weatherapi", &Settings::default().with_credentials(credentials()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(proxy.revision, vec!["1", "2"]);
    let meta = proxy.meta_data.unwrap();
    assert_eq!(meta.created_at.unwrap().timestamp(), 1_454_000_000);
    assert_eq!(meta.sub_type.as_deref(), Some("Proxy"));
}

#[tokio::test]
async fn test_debug_logs_successful_response() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/organizations/org/apis/weatherapi")
        .with_status(200)
        .with_body(r#"{"name":"weatherapi","revision":["7"]}"#)
        .expect(2)
        .create_async()
        .await;
    let c = client(&server);

    let quiet = CapturedLogs::default();
    {
        let _guard = capture_logs(&quiet);
        c.get_api_proxy(ORG, "weatherapi", &Settings::default())
            .await
            .unwrap();
    }
    assert!(!quiet.contents().contains("RESPONSE from"), "{}", quiet.contents());

    let verbose = CapturedLogs::default();
    {
        let _guard = capture_logs(&verbose);
        c.get_api_proxy(ORG, "weatherapi", &Settings::default().with_debug(true))
            .await
            .unwrap();
    }
    let logged = verbose.contents();
    assert!(logged.contains("RESPONSE from GET"), "{}", logged);
    assert!(logged.contains("/v1/organizations/org/apis/weatherapi"), "{}", logged);
    assert!(logged.contains(r#""revision":["7"]"#), "{}", logged);
}

#[tokio::test]
async fn test_requests_without_username_are_unauthenticated() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/organizations/org/apis/weatherapi")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"name":"weatherapi","revision":[]}"#)
        .create_async()
        .await;

    let settings = Settings::default().with_credentials(Credentials::new("", "ignored"));
    client(&server)
        .get_api_proxy(ORG, "weatherapi", &settings)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_import_proxy_uploads_bundle() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/organizations/org/apis")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "import".into()),
            Matcher::UrlEncoded("name".into(), "weatherapi".into()),
            Matcher::UrlEncoded("validate".into(), "true".into()),
        ]))
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::Regex(r#"name="file""#.to_string()))
        .with_status(201)
        .with_body(r#"{"name":"weatherapi","revision":"4","configurationVersion":{"majorVersion":4,"minorVersion":0}}"#)
        .create_async()
        .await;

    let file = bundle();
    let settings = ImportProxySettings {
        validate: Some(true),
        ..Default::default()
    };
    let imported = client(&server)
        .import_proxy(ORG, "weatherapi", file.path(), &settings)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(imported.name, "weatherapi");
    assert_eq!(imported.revision, "4");
}

#[tokio::test]
async fn test_import_proxy_missing_bundle_is_io_error() {
    let server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let err = client(&server)
        .import_proxy(ORG, "weatherapi", dir.path().join("absent.zip"), &ImportProxySettings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Io(_)));
}

#[tokio::test]
async fn test_deploy_proxy_with_default_settings() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/o/org/environments/test/apis/weatherapi/revisions/3/deployments")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("override".into(), "True".into()),
            Matcher::UrlEncoded("delay".into(), "15".into()),
        ]))
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_header("authorization", BASIC_AUTH)
        .with_status(200)
        .with_body(
            r#"{"name":"weatherapi","organization":"org",
                "environment":{"environment":"test","revision":"3","state":"deployed"}}"#,
        )
        .create_async()
        .await;

    let settings = DeployProxySettings::default().with_credentials(credentials());
    let result = client(&server)
        .deploy_proxy(ORG, "test", "weatherapi", "3", &settings)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.environments().len(), 1);
}

#[tokio::test]
async fn test_first_deployment_reports_top_level_state() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/o/org/environments/test/apis/weatherapi/revisions/1/deployments")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"name":"weatherapi","revision":"1","environment":"test","state":"deployed"}"#)
        .create_async()
        .await;

    let result = client(&server)
        .deploy_proxy(ORG, "test", "weatherapi", "1", &DeployProxySettings::default())
        .await;

    assert!(result.is_ok(), "{:?}", result);
}

#[tokio::test]
async fn test_deploy_proxy_unconfirmed_deployment_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/o/org/environments/test/apis/weatherapi/revisions/3/deployments")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"environment":[
                {"environment":"prod","revision":"3","state":"deployed"},
                {"environment":"test","revision":"2","state":"deployed"},
                {"environment":"test","revision":"3","state":"undeployed"}]}"#,
        )
        .create_async()
        .await;

    let err = client(&server)
        .deploy_proxy(ORG, "test", "weatherapi", "3", &DeployProxySettings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::DeploymentNotConfirmed { .. }));
    assert!(err.to_string().starts_with("Did not find a successful deployment"));
}

#[tokio::test]
async fn test_remote_status_reports_status_method_and_url() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/o/org/environments/test/apis/weatherapi/revisions/3/deployments")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":"messaging.config.beans.InvalidBundle","message":"Bundle is invalid"}"#)
        .create_async()
        .await;

    let err = client(&server)
        .deploy_proxy(ORG, "test", "weatherapi", "3", &DeployProxySettings::default())
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    let message = err.to_string();
    assert!(message.contains("400"), "{}", message);
    assert!(message.contains("POST"), "{}", message);
    assert!(message.contains("/revisions/3/deployments"), "{}", message);
}

#[tokio::test]
async fn test_delete_all_undeployed_revisions_deletes_each_revision() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/organizations/org/apis/weatherapi")
        .with_status(200)
        .with_body(r#"{"name":"weatherapi","revision":["1","2","3","4","5","6","7","8","9"]}"#)
        .create_async()
        .await;
    let deletes = server
        .mock(
            "DELETE",
            Matcher::Regex(r"^/v1/organizations/org/apis/weatherapi/revisions/[1-9]$".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"name":"weatherapi","revision":"1"}"#)
        .expect(9)
        .create_async()
        .await;

    let cleanup = client(&server)
        .delete_all_undeployed_revisions(ORG, "weatherapi", &Settings::default())
        .await
        .unwrap();

    deletes.assert_async().await;
    assert_eq!(cleanup.deleted.len(), 9);
    assert!(cleanup.retained.is_empty());
    assert_eq!(cleanup.deleted.first().map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_delete_all_undeployed_revisions_keeps_deployed_revision() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/organizations/org/apis/weatherapi")
        .with_status(200)
        .with_body(r#"{"name":"weatherapi","revision":["1","2","3"]}"#)
        .create_async()
        .await;
    server
        .mock(
            "DELETE",
            Matcher::Regex(r"^/v1/organizations/org/apis/weatherapi/revisions/[12]$".to_string()),
        )
        .with_status(200)
        .with_body("{}")
        .expect(2)
        .create_async()
        .await;
    server
        .mock("DELETE", "/v1/organizations/org/apis/weatherapi/revisions/3")
        .with_status(400)
        .with_body(
            r#"{"code":"distribution.ApplicationCanNotBeDeleted",
                "message":"Application weatherapi revision 3 is deployed","contexts":[]}"#,
        )
        .create_async()
        .await;

    let cleanup = client(&server)
        .delete_all_undeployed_revisions(ORG, "weatherapi", &Settings::default())
        .await
        .unwrap();

    assert_eq!(cleanup.deleted, vec!["1", "2"]);
    assert_eq!(cleanup.retained, vec!["3"]);
}

#[tokio::test]
async fn test_delete_all_undeployed_revisions_reports_unexpected_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/organizations/org/apis/weatherapi")
        .with_status(200)
        .with_body(r#"{"name":"weatherapi","revision":["1","2"]}"#)
        .create_async()
        .await;
    server
        .mock("DELETE", "/v1/organizations/org/apis/weatherapi/revisions/1")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let failing = server
        .mock("DELETE", "/v1/organizations/org/apis/weatherapi/revisions/2")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = client(&server)
        .delete_all_undeployed_revisions(ORG, "weatherapi", &Settings::default())
        .await
        .unwrap_err();

    failing.assert_async().await;
    assert!(matches!(err, ApiError::UnexpectedDeleteStatus { ref revision, .. } if revision == "2"));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_delete_all_undeployed_revisions_aggregates_failures() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/organizations/org/apis/weatherapi")
        .with_status(200)
        .with_body(r#"{"name":"weatherapi","revision":["1","2"]}"#)
        .create_async()
        .await;
    server
        .mock(
            "DELETE",
            Matcher::Regex(r"^/v1/organizations/org/apis/weatherapi/revisions/[12]$".to_string()),
        )
        .with_status(403)
        .with_body("forbidden")
        .expect(2)
        .create_async()
        .await;

    let err = client(&server)
        .delete_all_undeployed_revisions(ORG, "weatherapi", &Settings::default())
        .await
        .unwrap_err();

    let ApiError::Multiple(errors) = &err else {
        panic!("expected multiple errors, got {:?}", err);
    };
    assert_eq!(errors.len(), 2);
    assert!(err.to_string().contains("; "));
}

#[tokio::test]
async fn test_delete_api_proxy_revision_is_strict() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/v1/organizations/org/apis/weatherapi/revisions/3")
        .with_status(400)
        .with_body(r#"{"code":"distribution.ApplicationCanNotBeDeleted","message":"deployed"}"#)
        .create_async()
        .await;

    let err = client(&server)
        .delete_api_proxy_revision(ORG, "weatherapi", "3", &Settings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::RemoteStatus { .. }));
}

#[tokio::test]
async fn test_install_node_packaged_modules() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/organizations/org/apis/weatherapi/revisions/4/npm")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body("command=install")
        .with_status(200)
        .with_body(r#"[{"name":"express","version":"4.17.1"},{"name":"request","version":"2.88.2"}]"#)
        .create_async()
        .await;

    let modules = client(&server)
        .install_node_packaged_modules(ORG, "weatherapi", "4", &Settings::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0].name, "express");
}

#[tokio::test]
async fn test_create_key_value_map_round_trips() {
    let kvm = KeyValueMap::new("settings")
        .encrypted(true)
        .with_entry("region", "eu")
        .with_entry("tier", "gold");
    let body = serde_json::to_string(&kvm).unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/organizations/org/keyvaluemaps")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "name": "settings",
            "encrypted": true,
            "entry": [
                {"name": "region", "value": "eu"},
                {"name": "tier", "value": "gold"}
            ]
        })))
        .with_status(201)
        .with_body(body)
        .create_async()
        .await;

    let created = client(&server)
        .create_key_value_map(ORG, &kvm, &KeyValueMapSettings::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(created, kvm);
}

#[tokio::test]
async fn test_key_value_maps_in_environment_scope() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/v1/organizations/org/environments/dev/keyvaluemaps")
        .with_status(200)
        .with_body(r#"["settings","flags"]"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/v1/organizations/org/environments/dev/keyvaluemaps/flags")
        .with_status(200)
        .with_body(r#"{"name":"flags","encrypted":false,"entry":[{"name":"beta","value":"on"}]}"#)
        .create_async()
        .await;

    let settings = KeyValueMapSettings {
        environment: Some("dev".to_string()),
        ..Default::default()
    };
    let c = client(&server);

    let names = c.list_key_value_maps(ORG, &settings).await.unwrap();
    assert_eq!(names, vec!["settings", "flags"]);

    let deleted = c.delete_key_value_map(ORG, "flags", &settings).await.unwrap();
    assert_eq!(deleted.get("beta"), Some("on"));

    list.assert_async().await;
    delete.assert_async().await;
}
