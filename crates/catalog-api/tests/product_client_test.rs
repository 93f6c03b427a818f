// Integration tests for `ProductClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_api::{Envelope, Error, ProductClient, ProductDto};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ProductClient) {
    let server = MockServer::start().await;
    let base = format!("{}/bp/products", server.uri());
    let client = ProductClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    (server, client)
}

fn product_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": "Tarjeta de consumo",
        "logo": "https://example.com/logo.png",
        "date_release": "2025-01-01T00:00:00.000Z",
        "date_revision": "2026-01-01T00:00:00.000Z"
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_products_bare_array() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([product_json("1", "Card"), product_json("2", "Loan")])),
        )
        .mount(&server)
        .await;

    let listing = client.list_products().await.unwrap();
    assert!(matches!(listing, Envelope::Bare(_)));

    let products = listing.into_inner();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id.as_deref(), Some("1"));
    assert_eq!(products[1].name.as_deref(), Some("Loan"));
}

#[tokio::test]
async fn test_list_products_data_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [product_json("1", "Card")] })),
        )
        .mount(&server)
        .await;

    let products = client.list_products().await.unwrap().into_inner();
    assert_eq!(products.len(), 1);
    assert_eq!(
        products[0].date_release.as_deref(),
        Some("2025-01-01T00:00:00.000Z")
    );
}

#[tokio::test]
async fn test_create_product_posts_body() {
    let (server, client) = setup().await;

    let dto: ProductDto = serde_json::from_value(product_json("abc", "Card")).unwrap();

    Mock::given(method("POST"))
        .and(path("/bp/products"))
        .and(body_json(product_json("abc", "Card")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "message": "Product added successfully",
                "data": product_json("abc", "Card")
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create_product(&dto).await.unwrap().into_inner();
    assert_eq!(created, dto);
}

#[tokio::test]
async fn test_update_product_uses_item_path() {
    let (server, client) = setup().await;

    let dto: ProductDto = serde_json::from_value(product_json("abc", "Renamed")).unwrap();

    Mock::given(method("PUT"))
        .and(path("/bp/products/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json("abc", "Renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client.update_product("abc", &dto).await.unwrap().into_inner();
    assert_eq!(updated.name.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn test_delete_product() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/bp/products/abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_product("abc").await.unwrap();
}

#[tokio::test]
async fn test_verify_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/bp/products/verification/taken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bp/products/verification/free"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    assert!(client.verify_id("taken").await.unwrap());
    assert!(!client.verify_id("free").await.unwrap());
}

#[tokio::test]
async fn test_ids_are_percent_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/bp/products/a%2Fb"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_product("a/b").await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_400_uses_message_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Duplicate identifier" })),
        )
        .mount(&server)
        .await;

    let err = client.create_product(&ProductDto::default()).await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Duplicate identifier");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_404_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.delete_product("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_error_500_plain_text_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client.list_products().await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, Error::Api { message, .. } if message == "upstream exploded"));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { body, .. } if body == "not json"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client =
        ProductClient::from_reqwest("http://127.0.0.1:1/bp/products", reqwest::Client::new())
            .unwrap();

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_transient());
}

#[test]
fn test_cannot_be_a_base_url_is_rejected() {
    let result = ProductClient::from_reqwest("mailto:someone@example.com", reqwest::Client::new());
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}
