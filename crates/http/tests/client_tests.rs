//! Integration tests for the Luxe HTTP client

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use luxe_http::types::{ListQuery, LoginRequest};
use luxe_http::{
    ApiTarget, ClientError, CredentialStore, LuxeClient, MemoryCredentialStore, RefreshError,
};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const REFRESH_DELAY: Duration = Duration::from_millis(300);

fn client_with_token(server: &MockServer, token: &str) -> (LuxeClient, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::with_token(token));
    let client = LuxeClient::builder()
        .base_url(server.uri())
        .credentials(store.clone())
        .build()
        .unwrap();
    (client, store)
}

/// Answer 200 for `bearer`, 401 for anything else
async fn mount_guarded(server: &MockServer, verb: &str, route: &str, bearer: &str, data: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .and(header("authorization", format!("Bearer {bearer}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
        )
        .mount(server)
        .await;
}

fn refresh_ok(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"data": {"accessToken": token}}))
        .set_delay(REFRESH_DELAY)
}

fn requests_to<'a>(requests: &'a [Request], route: &'a str) -> impl Iterator<Item = &'a Request> {
    requests.iter().filter(move |r| r.url.path() == route)
}

#[tokio::test]
async fn test_client_builder() {
    let client = LuxeClient::builder()
        .base_url("http://localhost:5001/api/v1")
        .build();

    assert!(client.is_ok());
    assert_eq!(client.unwrap().base_url(), "http://localhost:5001/api/v1");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = LuxeClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_client_builder_uses_target() {
    let client = LuxeClient::builder()
        .target(ApiTarget::default())
        .build()
        .unwrap();
    assert_eq!(client.base_url(), "http://localhost:5001/api/v1");
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "services": [{"_id": "s1", "name": "Knotless braids", "basePrice": 85000}],
                "pagination": {"page": 1, "limit": 12, "total": 1, "pages": 1}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with_token(&server, "t1");
    let list = client.services(&ListQuery::default()).await.unwrap();

    assert_eq!(list.services.len(), 1);
    assert_eq!(list.services[0].display_price(), 85000);
    assert_eq!(list.pagination.total, 1);
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"products": []}})))
        .mount(&server)
        .await;

    let client = LuxeClient::new(server.uri()).unwrap();
    let list = client
        .products(&ListQuery::default().with_category(Some("Hair")))
        .await
        .unwrap();
    assert!(list.products.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(requests[0].url.query(), Some("category=hair"));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;

    mount_guarded(&server, "GET", "/bookings/my", "T2", json!({"bookings": []})).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(refresh_ok("T2"))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_token(&server, "T1");
    let query = ListQuery::default();
    let calls = (0..5).map(|_| client.my_bookings(&query));
    let results = join_all(calls).await;

    for result in results {
        assert!(result.unwrap().bookings.is_empty());
    }
    assert_eq!(store.load().as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_queued_requests_replay_with_new_token() {
    let server = MockServer::start().await;

    mount_guarded(&server, "GET", "/orders/my", "T2", json!({"orders": []})).await;
    mount_guarded(&server, "GET", "/cart", "T2", json!({"items": []})).await;
    mount_guarded(&server, "GET", "/favourites", "T2", json!({"favourites": ["s1"]})).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(refresh_ok("T2"))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with_token(&server, "T1");
    let (orders, cart, favourites) =
        tokio::join!(client.my_orders(), client.cart(), client.favourites());

    assert!(orders.unwrap().orders.is_empty());
    assert_eq!(cart.unwrap().count(), 0);
    assert_eq!(favourites.unwrap().favourites[0].id(), "s1");

    let requests = server.received_requests().await.unwrap();
    for route in ["/orders/my", "/cart", "/favourites"] {
        let replayed = requests_to(&requests, route)
            .filter(|r| {
                r.headers
                    .get("authorization")
                    .is_some_and(|v| v.as_bytes() == b"Bearer T2")
            })
            .count();
        assert_eq!(replayed, 1, "{route} should be reissued exactly once");
    }
}

#[tokio::test]
async fn test_refresh_failure_reaches_every_waiter() {
    let server = MockServer::start().await;

    mount_guarded(&server, "GET", "/orders/my", "never", json!({})).await;
    mount_guarded(&server, "GET", "/cart", "never", json!({})).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Invalid refresh token"}))
                .set_delay(REFRESH_DELAY),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_token(&server, "T1");
    let (orders, cart) = tokio::join!(client.my_orders(), client.cart());

    let expected = RefreshError::Rejected {
        status: 401,
        message: "Invalid refresh token".into(),
    };
    for err in [orders.unwrap_err(), cart.unwrap_err()] {
        assert!(err.requires_sign_in());
        assert!(matches!(err, ClientError::Refresh(ref e) if *e == expected));
    }
    assert!(store.load().is_none());
}

#[tokio::test]
async fn test_second_401_after_retry_is_returned() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages/unread"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Not allowed"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(refresh_ok("T2"))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_token(&server, "T1");
    let err = client.unread_count().await.unwrap_err();

    assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m == "Not allowed"));
    assert_eq!(store.load().as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_later_expiry_triggers_new_refresh() {
    let server = MockServer::start().await;

    mount_guarded(&server, "GET", "/cart", "T2", json!({"items": []})).await;
    mount_guarded(&server, "GET", "/orders/my", "T3", json!({"orders": []})).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"accessToken": "T2"}})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"accessToken": "T3"}})))
        .mount(&server)
        .await;

    let (client, store) = client_with_token(&server, "T1");

    client.cart().await.unwrap();
    assert_eq!(store.load().as_deref(), Some("T2"));

    client.my_orders().await.unwrap();
    assert_eq!(store.load().as_deref(), Some("T3"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests_to(&requests, "/auth/refresh").count(), 2);
}

#[tokio::test]
async fn test_next_request_after_failed_refresh_is_anonymous() {
    let server = MockServer::start().await;

    mount_guarded(&server, "GET", "/orders/my", "never", json!({})).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"services": []}})))
        .mount(&server)
        .await;

    let (client, _) = client_with_token(&server, "T1");
    assert!(client.my_orders().await.unwrap_err().requires_sign_in());
    client.services(&ListQuery::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let services: Vec<_> = requests_to(&requests, "/services").collect();
    assert_eq!(services.len(), 1);
    assert!(services[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_refresh_endpoint_sends_no_bearer() {
    let server = MockServer::start().await;

    mount_guarded(&server, "GET", "/cart", "T2", json!({"items": []})).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(refresh_ok("T2"))
        .mount(&server)
        .await;

    let (client, _) = client_with_token(&server, "T1");
    client.cart().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let refresh: Vec<_> = requests_to(&requests, "/auth/refresh").collect();
    assert_eq!(refresh.len(), 1);
    assert!(refresh[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_error_message_extraction() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Product not found"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = LuxeClient::new(server.uri()).unwrap();

    let err = client.product("missing").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref m) if m == "Product not found"));

    let err = client.product("broken").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::ServerError { status: 500, ref message } if message == "upstream exploded"
    ));
}

#[tokio::test]
async fn test_login_stores_customer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "user": {"_id": "u1", "name": "Thandi Nkosi", "email": "t@example.com", "role": "customer"},
                "accessToken": "T1"
            }
        })))
        .mount(&server)
        .await;

    let client = LuxeClient::new(server.uri()).unwrap();
    let response = client
        .login(&LoginRequest {
            email: "t@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();

    assert_eq!(response.user.first_name(), "Thandi");
    assert_eq!(client.credentials().load().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_login_rejects_staff_accounts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "user": {"_id": "u2", "name": "Stylist", "email": "s@example.com", "role": "service_person"},
                "accessToken": "staff-token"
            }
        })))
        .mount(&server)
        .await;

    let client = LuxeClient::new(server.uri()).unwrap();
    let err = client
        .login(&LoginRequest {
            email: "s@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(client.credentials().load().is_none());
}

#[tokio::test]
async fn test_wrong_password_does_not_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(refresh_ok("T2"))
        .expect(0)
        .mount(&server)
        .await;

    let client = LuxeClient::new(server.uri()).unwrap();
    let err = client
        .login(&LoginRequest {
            email: "t@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m == "Invalid credentials"));
}

#[tokio::test]
async fn test_logout_clears_token_before_calling_backend() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_token(&server, "T1");
    client.logout().await.unwrap();

    assert!(store.load().is_none());
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_adjust_cart_below_one_removes_line() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"items": [{"product": "p1", "quantity": 1, "priceAtTime": 12000}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/cart/items/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"items": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with_token(&server, "T1");
    assert_eq!(client.adjust_cart_item("p1", -1).await.unwrap(), 0);
}

#[tokio::test]
async fn test_adjust_cart_updates_quantity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"items": [{"product": "p1", "quantity": 2}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/cart/items/p1"))
        .and(wiremock::matchers::body_json(json!({"quantity": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with_token(&server, "T1");
    assert_eq!(client.adjust_cart_item("p1", 1).await.unwrap(), 3);
}

#[tokio::test]
async fn test_adjust_cart_rejects_overflowing_step() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"items": [{"product": "p1", "quantity": 2}]}
        })))
        .mount(&server)
        .await;
    for verb in ["PUT", "DELETE"] {
        Mock::given(method(verb))
            .and(path("/cart/items/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(0)
            .mount(&server)
            .await;
    }

    let (client, _) = client_with_token(&server, "T1");
    let err = client.adjust_cart_item("p1", i64::MAX).await.unwrap_err();
    assert!(matches!(err, ClientError::BadRequest(_)));
}

#[tokio::test]
async fn test_checkout_returns_payment_intent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders/checkout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"clientSecret": "pi_1_secret_2", "totalAmount": 24000}
        })))
        .mount(&server)
        .await;

    let (client, _) = client_with_token(&server, "T1");
    let intent = client.checkout().await.unwrap();

    assert_eq!(intent.client_secret, "pi_1_secret_2");
    assert_eq!(intent.amount, 24000);
}
