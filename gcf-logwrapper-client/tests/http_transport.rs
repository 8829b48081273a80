//! The blocking client runs on the test thread; the mock server lives on its
//! own tokio runtime so it keeps serving while the test thread blocks.

use gcf_logwrapper_client::{
    ClientConfig, EntryWriter, LogEntry, LoggingClient, LoggingError, Severity,
    WriteEntriesRequest,
    auth::{MetadataServerToken, TokenError, TokenSource},
    http::HttpEntryWriter,
};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

fn start_server() -> (Runtime, MockServer) {
    let runtime = Runtime::new().expect("tokio runtime");
    let server = runtime.block_on(MockServer::start());
    (runtime, server)
}

fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "expires_in": 3599,
        "token_type": "Bearer"
    }))
}

fn static_token_client(server: &MockServer) -> LoggingClient {
    LoggingClient::new(
        "my-project",
        ClientConfig::default()
            .with_endpoint(server.uri())
            .with_access_token("ya29.static"),
    )
    .expect("client")
}

#[test]
fn flush_posts_entries_with_bearer_token() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/v2/entries:write"))
            .and(header("authorization", "Bearer ya29.static"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "logName": "projects/my-project/logs/orders",
                "partialSuccess": false,
                "entries": [{"severity": "INFO", "textPayload": "order received"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server),
    );

    let logger = static_token_client(&server).logger("orders").expect("logger");
    logger.log(LogEntry::new(Severity::Info, "order received".into()));
    logger.flush().expect("write accepted");

    runtime.block_on(server.verify());
}

#[test]
fn rejected_write_reports_status_and_body() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/v2/entries:write"))
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .expect(1)
            .mount(&server),
    );

    let logger = static_token_client(&server).logger("orders").expect("logger");
    logger.log(LogEntry::new(Severity::Error, "payment failed".into()));
    let error = logger.flush().expect_err("403");

    match error {
        LoggingError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "permission denied");
        }
        other => panic!("unexpected error: {other}"),
    }
    runtime.block_on(server.verify());
}

#[test]
fn metadata_token_is_fetched_once_and_cached() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("GET"))
            .and(path(METADATA_TOKEN_PATH))
            .and(header("metadata-flavor", "Google"))
            .respond_with(token_response("ya29.metadata"))
            .expect(1)
            .mount(&server),
    );

    let tokens = MetadataServerToken::with_base_url(reqwest::blocking::Client::new(), server.uri());
    assert_eq!(tokens.token().expect("first token"), "ya29.metadata");
    assert_eq!(tokens.token().expect("cached token"), "ya29.metadata");

    runtime.block_on(server.verify());
}

#[test]
fn writer_authenticates_with_metadata_token() {
    let (runtime, server) = start_server();
    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path(METADATA_TOKEN_PATH))
            .and(header("metadata-flavor", "Google"))
            .respond_with(token_response("ya29.metadata"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/entries:write"))
            .and(header("authorization", "Bearer ya29.metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(2)
            .mount(&server)
            .await;
    });

    let http_client = reqwest::blocking::Client::new();
    let writer = HttpEntryWriter::with_token_source(
        http_client.clone(),
        &server.uri(),
        Box::new(MetadataServerToken::with_base_url(http_client, server.uri())),
    );
    let request = WriteEntriesRequest {
        log_name: "projects/p/logs/app".to_string(),
        entries: vec![LogEntry::new(Severity::Info, "hello".into())],
        partial_success: false,
    };
    writer.write_entries(&request).expect("first write");
    writer.write_entries(&request).expect("second write");

    runtime.block_on(server.verify());
}

#[test]
fn metadata_server_errors() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("GET"))
            .and(path(METADATA_TOKEN_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server),
    );
    let tokens = MetadataServerToken::with_base_url(reqwest::blocking::Client::new(), server.uri());
    assert!(matches!(
        tokens.token(),
        Err(TokenError::Status { status: 404 })
    ));

    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("GET"))
            .and(path(METADATA_TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a token</html>"))
            .mount(&server),
    );
    let tokens = MetadataServerToken::with_base_url(reqwest::blocking::Client::new(), server.uri());
    let error = tokens.token().expect_err("malformed body");
    assert!(matches!(error, TokenError::Decode(_)));
    assert!(
        error
            .to_string()
            .starts_with("malformed token response from metadata server")
    );
}
