#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stockroom_api::{ApiClient, Error, ImageUpload, ProductForm};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn token() -> SecretString {
    SecretString::from("tok-123".to_string())
}

fn chair() -> serde_json::Value {
    json!({
        "_id": "1",
        "sku": "CH1",
        "name": "Chair",
        "description": "Oak",
        "price": 49.99,
        "quantity": 4,
        "thumbnail": "uploads/chair.png",
        "images": ["uploads/chair.png", "uploads/chair-side.png"]
    })
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_returns_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "a@b.c", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
        .mount(&server)
        .await;

    let secret: SecretString = "pw".to_string().into();
    let token = client.login("a@b.c", &secret).await.unwrap();
    assert_eq!(token.expose_secret(), "abc");
}

#[tokio::test]
async fn test_login_failure_carries_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let secret: SecretString = "wrong".to_string().into();
    let result = client.login("a@b.c", &secret).await;

    match result {
        Err(Error::Authentication { message }) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_register_sends_name() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(
            json!({ "name": "Ada", "email": "ada@x.io", "password": "pw" }),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "new" })))
        .mount(&server)
        .await;

    let secret: SecretString = "pw".to_string().into();
    let token = client.register("Ada", "ada@x.io", &secret).await.unwrap();
    assert_eq!(token.expose_secret(), "new");
}

// ── Product tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_products() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            chair(),
            { "_id": "2", "sku": "TB1", "name": "Table", "price": "120" }
        ])))
        .mount(&server)
        .await;

    let products = client.list_products().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Chair");
    assert_eq!(products[0].price, Decimal::new(4999, 2));
    assert_eq!(products[0].images.len(), 2);
    assert_eq!(products[1].quantity, 0);
    assert_eq!(products[1].price, Decimal::from(120));
}

#[tokio::test]
async fn test_get_product_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Product not found" })),
        )
        .mount(&server)
        .await;

    let err = client.get_product("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Product not found"));
}

#[tokio::test]
async fn test_create_product_sends_multipart() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/products"))
        .and(body_string_contains("name=\"sku\""))
        .and(body_string_contains("CH1"))
        .and(body_string_contains("filename=\"chair.png\""))
        .and(body_string_contains("image/png"))
        .respond_with(ResponseTemplate::new(201).set_body_json(chair()))
        .mount(&server)
        .await;

    let form = ProductForm {
        sku: "CH1".into(),
        name: "Chair".into(),
        description: "Oak".into(),
        price: Decimal::new(4999, 2),
        quantity: 4,
        thumbnail: None,
        images: vec![ImageUpload::new("chair.png", b"not-really-a-png".to_vec())],
    };

    let created = client.create_product(&form).await.unwrap();
    assert_eq!(created.id, "1");
}

#[tokio::test]
async fn test_update_product_sends_thumbnail() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/products/1"))
        .and(body_string_contains("name=\"thumbnail\""))
        .and(body_string_contains("uploads/chair-side.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chair()))
        .mount(&server)
        .await;

    let form = ProductForm {
        sku: "CH1".into(),
        name: "Chair".into(),
        price: Decimal::new(4999, 2),
        quantity: 4,
        thumbnail: Some("uploads/chair-side.png".into()),
        ..ProductForm::default()
    };

    let updated = client.update_product("1", &form).await.unwrap();
    assert_eq!(updated.sku, "CH1");
}

#[tokio::test]
async fn test_delete_product() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/products/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_product("2").await.unwrap();
}

#[tokio::test]
async fn test_server_error_without_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.list_products().await.unwrap_err();
    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 500);
            assert!(message.starts_with("HTTP 500"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { ref body, .. } if body.contains("oops")));
}

// ── Favorites tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_get_favorites_sends_bearer() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([chair(), "2"])))
        .mount(&server)
        .await;

    let entries = client.get_favorites(&token()).await.unwrap();
    let ids: Vec<&str> = entries.iter().map(|e| e.id()).collect();
    assert_eq!(ids, ["1", "2"]);
}

#[tokio::test]
async fn test_get_favorites_rejected_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(&server)
        .await;

    let err = client.get_favorites(&token()).await.unwrap_err();
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_replace_favorites_posts_ids() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/favorites/update"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_json(json!({ "productIds": ["1", "2"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .replace_favorites(&token(), &["1".to_string(), "2".to_string()])
        .await
        .unwrap();
}
