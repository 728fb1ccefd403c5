//! Integration tests for the HTTP query API client.

use querydesk::api::{ApiClient, ApiClientConfig, QueryApi};
use querydesk::db::Dialect;
use querydesk::error::QueryDeskError;
use querydesk::persistence::ConnectionConfig;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the test server.
struct Captured {
    head: String,
    body: String,
}

/// Serves exactly one canned response and hands back the request it received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let (head, request_body) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let head = text[..split].to_string();
                let length = head
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                let body = text[split + 4..].to_string();
                if body.len() >= length || n == 0 {
                    break (head, body);
                }
            }
            if n == 0 {
                break (text, String::new());
            }
        };

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        Captured {
            head,
            body: request_body,
        }
    });

    (format!("http://{addr}"), handle)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiClientConfig::new(base_url).with_timeout(5)).unwrap()
}

fn users_config() -> ConnectionConfig {
    ConnectionConfig {
        dialect: Dialect::Postgres,
        connection_url: "postgresql://app:secret@db:5432/shop".to_string(),
        table_name: "users".to_string(),
    }
}

#[tokio::test]
async fn test_execute_posts_expected_request() {
    let (base, server) = serve_once("200 OK", r#"{"data":[{"id":1}]}"#).await;

    let body = client(&base)
        .execute("SELECT * FROM {table_name}", &users_config(), true)
        .await
        .unwrap();
    assert_eq!(body, json!({"data": [{"id": 1}]}));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /api/queries/execute HTTP/1.1"));
    let head = captured.head.to_lowercase();
    assert!(head.contains("content-type: application/json"));
    assert!(head.contains("accept: application/json"));

    let sent: Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(
        sent,
        json!({
            "query": "SELECT * FROM \"users\"",
            "dbConfig": {
                "type": "postgres",
                "url": "postgresql://app:secret@db:5432/shop",
                "tableName": "users"
            },
            "readOnly": true
        })
    );
}

#[tokio::test]
async fn test_mysql_query_sent_verbatim() {
    let (base, server) = serve_once("200 OK", "[]").await;
    let config = ConnectionConfig {
        dialect: Dialect::Mysql,
        ..users_config()
    };

    client(&base)
        .execute("SELECT * FROM {table_name}", &config, false)
        .await
        .unwrap();

    let sent: Value = serde_json::from_str(&server.await.unwrap().body).unwrap();
    assert_eq!(sent["query"], "SELECT * FROM {table_name}");
    assert_eq!(sent["readOnly"], false);
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let (base, server) =
        serve_once("500 Internal Server Error", r#"{"error":"relation does not exist"}"#).await;

    let err = client(&base)
        .execute("SELECT * FROM userz", &users_config(), true)
        .await
        .unwrap_err();
    server.await.unwrap();

    match err {
        QueryDeskError::ApiStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, r#"{"error":"relation does not exist"}"#);
        }
        other => panic!("expected ApiStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_other_2xx_statuses_are_errors() {
    for (status, body, code) in [
        ("201 Created", r#"[{"id":1}]"#, 201),
        ("202 Accepted", r#"{"data":[]}"#, 202),
        ("204 No Content", "", 204),
    ] {
        let (base, server) = serve_once(status, body).await;

        let err = client(&base)
            .execute("INSERT INTO t VALUES (1)", &users_config(), false)
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            QueryDeskError::ApiStatus { status, body: sent } => {
                assert_eq!(status, code);
                assert_eq!(sent, body);
            }
            other => panic!("expected ApiStatus for {code}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_non_json_success_body_is_response_error() {
    let (base, server) = serve_once("200 OK", "<html>gateway</html>").await;

    let err = client(&base).run_diagnostic().await.unwrap_err();
    server.await.unwrap();
    assert_eq!(err.category(), "Response Error");
}

#[tokio::test]
async fn test_diagnostic_sends_blank_config() {
    let (base, server) = serve_once("200 OK", r#"{"data":[{"test":1}]}"#).await;

    let body = client(&base).run_diagnostic().await.unwrap();
    assert_eq!(body["data"][0]["test"], 1);

    let sent: Value = serde_json::from_str(&server.await.unwrap().body).unwrap();
    assert_eq!(
        sent,
        json!({
            "query": "SELECT 1 as test",
            "dbConfig": {"type": "postgres", "url": "", "tableName": ""},
            "readOnly": true
        })
    );
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .run_diagnostic()
        .await
        .unwrap_err();
    assert!(matches!(err, QueryDeskError::ApiConnection(_)));
    assert!(err.is_api());
}
