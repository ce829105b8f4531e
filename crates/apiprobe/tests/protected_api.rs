//! Protected endpoints of the reference API.
//!
//! Each scenario runs in-process and against a loopback server so the
//! authenticated wrapper is exercised over both transports.

use std::time::Duration;

use apiprobe::prelude::*;
use apiprobe::telemetry::init_test_logging;
use apiprobe::testing::AuthenticatedRequest;
use serde_json::{json, Value};

const SECRET: &str = "protected_secret";

fn tokens() -> TokenService {
    TokenService::new(SECRET, Duration::from_secs(3600))
}

fn mock() -> MockApi {
    init_test_logging();
    MockApi::new(tokens())
}

fn authenticated(target: Target) -> AuthenticatedRequest {
    create_authenticated_request(target, &tokens(), AuthOptions::default()).unwrap()
}

fn order_data() -> Value {
    json!({
        "items": [
            {"productId": "product-1", "quantity": 2},
            {"productId": "product-2", "quantity": 1}
        ],
        "shippingAddress": {
            "street": "123 Test St",
            "city": "Test City",
            "zipCode": "12345"
        }
    })
}

async fn check_profile(target: Target) {
    let request = create_request(target.clone());
    let response = request.get("/profile").send().await;
    assertions::unauthorized(&response);

    let AuthenticatedRequest { request, user, .. } = authenticated(target);
    let response = request.get("/profile").send().await;
    assertions::success(&response)
        .assert_json_field("id", &json!(user.id))
        .assert_json_field("email", &json!(user.email));
}

async fn check_orders(target: Target) {
    let request = create_request(target.clone());
    let response = request.post("/orders").json(&order_data()).send().await;
    assertions::unauthorized(&response);

    let auth = authenticated(target);
    let response = auth.request.post("/orders").json(&order_data()).send().await;
    assertions::created(&response)
        .assert_json_has("id")
        .assert_json_field("userId", &json!(auth.user.id))
        .assert_json_array_len("items", 2);

    let response = auth
        .request
        .post("/orders")
        .json(&json!({"items": []}))
        .send()
        .await;
    response.assert_status_code(400).assert_json_has("error");
}

async fn check_profile_update(target: Target) {
    let auth = authenticated(target);
    let updates = json!({"name": "Updated Name", "phoneNumber": "555-123-4567"});

    let response = auth.request.put("/profile").json(&updates).send().await;
    assertions::success(&response)
        .assert_json_field("name", &json!("Updated Name"))
        .assert_json_field("phoneNumber", &json!("555-123-4567"));
}

#[tokio::test]
async fn profile_in_process() {
    check_profile(mock().target()).await;
}

#[tokio::test]
async fn profile_over_tcp() {
    let server = mock().spawn().await.unwrap();
    check_profile(server.target().unwrap()).await;
}

#[tokio::test]
async fn orders_in_process() {
    check_orders(mock().target()).await;
}

#[tokio::test]
async fn orders_over_tcp() {
    let server = mock().spawn().await.unwrap();
    check_orders(server.target().unwrap()).await;
}

#[tokio::test]
async fn profile_update_in_process() {
    check_profile_update(mock().target()).await;
}

#[tokio::test]
async fn profile_update_over_tcp() {
    let server = mock().spawn().await.unwrap();
    check_profile_update(server.target().unwrap()).await;
}

#[tokio::test]
async fn custom_user_is_reflected_in_profile() {
    let auth = create_authenticated_request(
        mock().target(),
        &tokens(),
        AuthOptions::with_user(json!({"id": "user-42", "email": "ada@example.com"})),
    )
    .unwrap();

    let response = auth.request.get("/profile").send().await;
    assertions::success(&response)
        .assert_json_field("id", &json!("user-42"))
        .assert_json_field("email", &json!("ada@example.com"));
}

#[tokio::test]
async fn caller_cannot_replace_the_credential() {
    let auth = authenticated(mock().target());

    let response = auth
        .request
        .get("/profile")
        .set("Authorization", "Bearer forged")
        .send()
        .await;
    assertions::success(&response);
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let foreign = TokenService::new("someone_elses_secret", Duration::from_secs(3600));
    let auth = create_authenticated_request(mock().target(), &foreign, AuthOptions::default())
        .unwrap();

    let response = auth.request.get("/profile").send().await;
    assertions::unauthorized(&response);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let tokens = tokens();
    let now = chrono::Utc::now().timestamp();
    let token = tokens
        .sign_claims(&apiprobe::auth::TokenClaims {
            user_id: "test-user-id".to_string(),
            email: "test@example.com".to_string(),
            iat: now - 120,
            exp: now - 60,
        })
        .unwrap();

    let response = create_request(mock().target())
        .get("/profile")
        .bearer_token(token)
        .send()
        .await;
    assertions::unauthorized(&response);
}

#[tokio::test]
async fn harness_drives_the_mock() {
    let mut config = HarnessConfig::default();
    config.jwt_secret = SECRET.to_string();
    config.log_level = "warn".to_string();

    let harness = Harness::new(config).unwrap().with_target(mock().target());
    let auth = harness.authenticated_request(AuthOptions::default()).unwrap();

    assertions::unauthorized(&harness.request().get("/profile").send().await);
    assertions::success(&auth.request.get("/profile").send().await);
}
