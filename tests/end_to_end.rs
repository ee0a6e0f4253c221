//! End-to-end runs against a mock portal, using the bundled templates and
//! the file error-log sink.

use std::path::PathBuf;

use portal_api::logging::error_log_layer;
use portal_api::{ClientConfig, LoginCredentials, PortalClient};
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::layer::SubscriberExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Serialize)]
struct Company<'a> {
    name: &'a str,
    city: &'a str,
    country: &'a str,
}

fn template_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("json")
}

fn credentials() -> LoginCredentials {
    LoginCredentials::new(json!({"login": "ops", "password": "hunter2"})).unwrap()
}

fn envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ResultInfos": {"Success": true, "ErrorNumber": 0, "ErrorMessage": ""},
        "ResultData": data
    }))
}

fn rows(count: usize, offset: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| json!({"FileId": offset + i, "Name": format!("Company {}", offset + i)}))
            .collect(),
    )
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/Authenticate/Token"))
        .and(body_partial_json(json!({"login": "ops"})))
        .respond_with(envelope(json!({"Token": "session-xyz"})))
        .expect(1)
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> PortalClient {
    PortalClient::connect(
        &credentials(),
        ClientConfig::builder().with_base_url(server.uri()).build(),
    )
    .await
    .unwrap()
    .with_template_dir(template_dir())
}

#[tokio::test]
async fn test_list_companies_walks_every_page() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    for (num_page, count) in [(1, 50), (2, 50), (3, 37)] {
        Mock::given(method("POST"))
            .and(path("/Search/Companies"))
            .and(header("x-auth", "session-xyz"))
            .and(body_partial_json(json!({"RowsPerPage": 50, "NumPage": num_page})))
            .respond_with(envelope(json!({"Rows": rows(count, (num_page - 1) * 50)})))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = connect(&mock_server).await;
    assert!(client.is_authenticated());

    let companies = client.list_companies().await.unwrap();
    assert_eq!(companies.len(), 137);
    assert_eq!(companies[0]["Name"], "Company 0");
    assert_eq!(companies[136]["FileId"], 136);
}

#[tokio::test]
async fn test_insert_then_update_company() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/CUD/Company"))
        .and(body_partial_json(json!({
            "Fields": {"Name": "Acme", "City": "Lyon", "Country": "FR"}
        })))
        .respond_with(envelope(json!({"FileId": 42})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/CUD/Company/42"))
        .and(body_partial_json(json!({"Fields": {"Name": "Acme &amp; Co", "City": "Paris"}})))
        .respond_with(envelope(json!({"FileId": "42"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = connect(&mock_server).await;

    let id = client
        .upsert_company(
            &Company {
                name: "Acme",
                city: "Lyon",
                country: "FR",
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(id.as_str(), "42");

    let updated = client
        .upsert_company(
            &Company {
                name: "Acme & Co",
                city: "Paris",
                country: "FR",
            },
            Some(id.as_str()),
        )
        .await
        .unwrap();
    assert_eq!(updated, id);
}

#[tokio::test]
async fn test_failures_reach_the_error_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("error.log");
    let subscriber = tracing_subscriber::registry().with(error_log_layer(&log_path).unwrap());
    let _guard = tracing::subscriber::set_default(subscriber);

    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/CUD/Company"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ResultInfos": {"Success": false, "ErrorNumber": 23, "ErrorMessage": "Name is mandatory"},
            "ResultData": null
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Search/Companies"))
        .respond_with(ResponseTemplate::new(500).set_body_string("search backend down"))
        .mount(&mock_server)
        .await;

    let client = connect(&mock_server).await;

    let err = client
        .upsert_company(
            &Company {
                name: "",
                city: "Lyon",
                country: "FR",
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(err.is_api_reported());

    let err = client.list_companies().await.unwrap_err();
    assert!(err.is_transport());

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let api_lines: Vec<&str> = contents.lines().filter(|l| l.contains("API:")).collect();
    assert_eq!(api_lines.len(), 1, "{contents}");
    assert!(api_lines[0].ends_with("API: 23 : Name is mandatory"));
    assert!(contents.contains("REQUEST: POST Search/Companies HTTP/1.1"), "{contents}");
    assert!(contents.contains("x-auth: [REDACTED]"), "{contents}");
    assert!(contents.contains("search backend down"), "{contents}");
    assert!(!contents.contains("session-xyz"), "{contents}");
}

#[tokio::test]
async fn test_rejected_login_leaves_client_unauthenticated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Authenticate/Token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ResultInfos": {"Success": false, "ErrorNumber": 401, "ErrorMessage": "Invalid login"},
            "ResultData": null
        })))
        .mount(&mock_server)
        .await;

    let client = connect(&mock_server).await;
    assert!(!client.is_authenticated());

    let err = client
        .upsert_company(
            &Company {
                name: "Acme",
                city: "Lyon",
                country: "FR",
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(err.is_auth_error());
}
