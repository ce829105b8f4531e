//! API client against a loopback echo server.

use std::convert::Infallible;
use std::net::SocketAddr;

use apiprobe_client::{ApiClient, ApiClientOptions, ClientError, ResponseData};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Echoes the request as JSON, except `/v1/text` which answers in plain text.
async fn echo(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let path = req
        .uri()
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);
    let headers: serde_json::Map<String, Value> = req
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                Value::String(v.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();
    let body = req
        .into_body()
        .collect()
        .await
        .map(|b| b.to_bytes())
        .unwrap_or_default();

    if path == "/v1/text" {
        let mut response = Response::new(Full::new(Bytes::from_static(b"plain body")));
        response
            .headers_mut()
            .insert("content-type", HeaderValue::from_static("text/plain"));
        return Ok(response);
    }

    let status = if path.starts_with("/v1/missing") {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    let payload = json!({
        "method": method,
        "path": path,
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    });
    let mut response = Response::new(Full::new(Bytes::from(payload.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert("content-type", HeaderValue::from_static("application/json"));
    Ok(response)
}

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                continue;
            };
            tokio::spawn(async move {
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service_fn(echo))
                    .await;
            });
        }
    });

    addr
}

async fn client() -> ApiClient {
    let addr = spawn_server().await;
    ApiClient::new(ApiClientOptions::default().with_base_url(format!("http://{addr}")))
}

fn echoed(data: &ResponseData) -> &Value {
    data.as_json().expect("echo server answers with JSON")
}

#[tokio::test]
async fn get_builds_versioned_url() {
    let client = client().await;
    let response = client.get("/items?category=electronics", &HeaderMap::new()).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let json = echoed(&response.data);
    assert_eq!(json["method"], "GET");
    assert_eq!(json["path"], "/v1/items?category=electronics");
    assert_eq!(json["headers"]["accept"], "application/json");
    assert_eq!(json["body"], "");
}

#[tokio::test]
async fn post_sends_json_body() {
    let client = client().await;
    let order = json!({"items": [{"productId": "p-1", "quantity": 2}]});
    let response = client.post("orders", &order, &HeaderMap::new()).await.unwrap();

    let json = echoed(&response.data);
    assert_eq!(json["method"], "POST");
    assert_eq!(json["headers"]["content-type"], "application/json");
    let sent: Value = serde_json::from_str(json["body"].as_str().unwrap()).unwrap();
    assert_eq!(sent, order);
}

#[tokio::test]
async fn put_and_patch_send_bodies() {
    let client = client().await;
    let update = json!({"name": "Updated"});

    for response in [
        client.put("profile", &update, &HeaderMap::new()).await.unwrap(),
        client.patch("profile", &update, &HeaderMap::new()).await.unwrap(),
    ] {
        let json = echoed(&response.data);
        assert_eq!(json["body"], update.to_string());
    }
}

#[tokio::test]
async fn get_and_delete_never_send_a_body() {
    let client = client().await;
    let data = json!({"ignored": true});

    let response = client
        .request(Method::DELETE, "orders/1", Some(&data), &HeaderMap::new())
        .await
        .unwrap();
    assert_eq!(echoed(&response.data)["body"], "");

    let response = client
        .request(Method::GET, "orders/1", Some(&data), &HeaderMap::new())
        .await
        .unwrap();
    assert_eq!(echoed(&response.data)["body"], "");
}

#[tokio::test]
async fn empty_payloads_send_no_body() {
    let client = client().await;

    for data in [Value::Null, json!(false), json!(0), json!("")] {
        let response = client
            .request(Method::POST, "orders", Some(&data), &HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(echoed(&response.data)["body"], "", "payload {data}");
    }
}

#[tokio::test]
async fn auth_token_slot_applies_to_later_calls() {
    let mut client = client().await;

    client.set_auth_token("token-1").unwrap();
    let response = client.get("profile", &HeaderMap::new()).await.unwrap();
    assert_eq!(echoed(&response.data)["headers"]["authorization"], "Bearer token-1");

    client.clear_auth_token();
    let response = client.get("profile", &HeaderMap::new()).await.unwrap();
    assert!(echoed(&response.data)["headers"].get("authorization").is_none());
}

#[tokio::test]
async fn custom_headers_win() {
    let mut client = client().await;
    client.set_auth_token("default").unwrap();

    let mut custom = HeaderMap::new();
    custom.insert("authorization", HeaderValue::from_static("Bearer custom"));
    custom.insert("x-request-id", HeaderValue::from_static("42"));

    let response = client.get("profile", &custom).await.unwrap();
    let headers = &echoed(&response.data)["headers"];
    assert_eq!(headers["authorization"], "Bearer custom");
    assert_eq!(headers["x-request-id"], "42");
}

#[tokio::test]
async fn non_json_response_is_text() {
    let client = client().await;
    let response = client.get("text", &HeaderMap::new()).await.unwrap();

    assert_eq!(response.data, ResponseData::Text("plain body".to_string()));
}

#[tokio::test]
async fn error_statuses_are_values() {
    let client = client().await;
    let response = client.get("missing", &HeaderMap::new()).await.unwrap();

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(!response.is_success());
}

#[tokio::test]
async fn transport_failure_is_returned() {
    // Bind then drop so the port is very likely closed.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = ApiClient::new(ApiClientOptions::default().with_base_url(format!("http://{addr}")));

    let err = client.get("health", &HeaderMap::new()).await.unwrap_err();
    assert!(err.is_transport());
    match err {
        ClientError::Transport { method, url, .. } => {
            assert_eq!(method, Method::GET);
            assert_eq!(url, format!("http://{addr}/v1/health"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
