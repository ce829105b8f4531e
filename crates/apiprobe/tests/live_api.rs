//! Suites against a deployed API.
//!
//! Ignored by default. Point `API_URL`, `JWT_SECRET` and friends at the
//! deployment (in `.env` or the environment) and run
//! `cargo test -p apiprobe --test live_api -- --ignored`.

use apiprobe::prelude::*;
use serde_json::{json, Value};

fn harness() -> Harness {
    let harness = Harness::from_env().expect("configuration should load");
    harness
        .config()
        .validate()
        .expect("required variables should be set for live runs");
    harness
}

#[tokio::test]
#[ignore = "requires a running API"]
async fn health() {
    let response = harness().request().get("/health").send().await;

    assertions::success(&response)
        .assert_json_field("status", &json!("ok"))
        .assert_json_has("version");
}

#[tokio::test]
#[ignore = "requires a running API"]
async fn items_by_category() {
    let response = harness()
        .request()
        .get("/items?category=electronics")
        .send()
        .await;

    assertions::success(&response);
    let items: Vec<Value> = response.json().unwrap();
    for item in &items {
        assert_eq!(item["category"], "electronics");
    }
}

#[tokio::test]
#[ignore = "requires a running API"]
async fn profile_requires_token() {
    let harness = harness();
    assertions::unauthorized(&harness.request().get("/profile").send().await);

    let auth = harness.authenticated_request(AuthOptions::default()).unwrap();
    let response = auth.request.get("/profile").send().await;
    assertions::success(&response)
        .assert_json_field("id", &json!(auth.user.id))
        .assert_json_field("email", &json!(auth.user.email));
}

#[tokio::test]
#[ignore = "requires a running API"]
async fn orders() {
    let harness = harness();
    let auth = harness.authenticated_request(AuthOptions::default()).unwrap();
    let order = json!({
        "items": [
            {"productId": "product-1", "quantity": 2},
            {"productId": "product-2", "quantity": 1}
        ],
        "shippingAddress": {"street": "123 Test St", "city": "Test City", "zipCode": "12345"}
    });

    let response = auth.request.post("/orders").json(&order).send().await;
    assertions::created(&response)
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

#[tokio::test]
#[ignore = "requires a running API"]
async fn profile_update() {
    let auth = harness()
        .authenticated_request(AuthOptions::default())
        .unwrap();
    let updates = json!({"name": "Updated Name", "phoneNumber": "555-123-4567"});

    let response = auth.request.put("/profile").json(&updates).send().await;
    assertions::success(&response)
        .assert_json_field("name", &json!("Updated Name"))
        .assert_json_field("phoneNumber", &json!("555-123-4567"));
}
