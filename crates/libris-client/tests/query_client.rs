//! QueryClient behavior against a recording mock backend

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use libris_client::models::{Book, Booking, Category};
use libris_client::{
    ApiClient, ApiError, HttpRequest, HttpResponse, ListParams, Method, QueryClient,
    StaticCredentials, Transport,
};
use libris_core::ClientConfig;
use serde_json::{json, Value};

/// Answers by `METHOD path` (query string ignored) and records every request
#[derive(Clone, Default)]
struct MockBackend {
    routes: Rc<RefCell<HashMap<String, HttpResponse>>>,
    sent: Rc<RefCell<Vec<HttpRequest>>>,
}

impl MockBackend {
    fn route(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes.borrow_mut().insert(
            format!("{} {}", method, path),
            HttpResponse::json(status, &body),
        );
    }

    fn calls(&self, method: Method, path: &str) -> usize {
        let url = format!("http://api.local/api{}", path);
        self.sent
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url.split('?').next() == Some(url.as_str()))
            .count()
    }
}

#[async_trait(?Send)]
impl Transport for MockBackend {
    async fn send(&self, request: HttpRequest) -> libris_client::Result<HttpResponse> {
        tokio::task::yield_now().await;
        let path = request
            .url
            .trim_start_matches("http://api.local/api")
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        let key = format!("{} {}", request.method, path);
        self.sent.borrow_mut().push(request);
        Ok(self
            .routes
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| HttpResponse::json(404, &json!({"message": "Not found"}))))
    }
}

fn setup() -> (QueryClient, MockBackend) {
    let backend = MockBackend::default();
    let api = ApiClient::new(
        ClientConfig::new().with_api_base_url("http://api.local"),
        backend.clone(),
    )
    .with_credentials(StaticCredentials(Some("jwt".into())));
    (QueryClient::new(api), backend)
}

#[tokio::test]
async fn test_list_decodes_nested_envelope() {
    let (client, backend) = setup();
    backend.route(
        Method::Get,
        "/books",
        200,
        json!({"data": {"data": [{"id": 1, "title": "Boburnoma", "author": "Bobur"}], "totalElements": 31}}),
    );

    let page = client
        .list::<Book>(&ListParams::new().page(1, 10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.items[0].title, "Boburnoma");
    assert_eq!(page.total_elements, 31);

    let sent = backend.sent.borrow();
    assert_eq!(sent[0].url, "http://api.local/api/books?page=0&size=10");
    assert_eq!(sent[0].header_value("Authorization"), Some("Bearer jwt"));
}

#[tokio::test]
async fn test_create_invalidates_and_refetches() {
    let (client, backend) = setup();
    backend.route(Method::Get, "/categories", 200, json!({"data": [{"id": 1, "name": "Roman"}]}));
    backend.route(Method::Post, "/categories", 201, json!({"data": {"id": 2, "name": "She'riyat"}}));

    let params = ListParams::new();
    client.list::<Category>(&params).await.unwrap();
    client.list::<Category>(&params).await.unwrap();
    assert_eq!(backend.calls(Method::Get, "/categories"), 1);

    let notified = Rc::new(RefCell::new(Vec::new()));
    let sink = notified.clone();
    client.subscribe(move |key| sink.borrow_mut().push(key.entity().to_string()));

    let created = client
        .create::<Category, _>(&json!({"name": "She'riyat"}))
        .await
        .unwrap();
    assert_eq!(created["id"], 2);
    assert_eq!(*notified.borrow(), vec!["categories".to_string()]);

    client.list::<Category>(&params).await.unwrap();
    assert_eq!(backend.calls(Method::Get, "/categories"), 2);
}

#[tokio::test]
async fn test_failed_mutation_keeps_cache() {
    let (client, backend) = setup();
    backend.route(Method::Get, "/categories", 200, json!([]));
    backend.route(Method::Delete, "/categories/9", 409, json!({"message": "Category has books"}));

    client.list::<Category>(&ListParams::new()).await.unwrap();
    let err = client.delete::<Category>(9).await.unwrap_err();
    assert_eq!(err.to_string(), "Category has books");

    client.list::<Category>(&ListParams::new()).await.unwrap();
    assert_eq!(backend.calls(Method::Get, "/categories"), 1);
}

#[tokio::test]
async fn test_booking_return_invalidates_related_entities() {
    let (client, backend) = setup();
    backend.route(Method::Get, "/book-copies", 200, json!([]));
    backend.route(Method::Get, "/bookings", 200, json!({"data": []}));
    backend.route(Method::Patch, "/bookings/4/return", 200, json!({"data": {"id": 4}}));

    client.copies_of(1).await.unwrap();
    client.list::<Booking>(&ListParams::new()).await.unwrap();

    client.return_booking(4).await.unwrap();

    client.copies_of(1).await.unwrap();
    client.list::<Booking>(&ListParams::new()).await.unwrap();
    assert_eq!(backend.calls(Method::Get, "/book-copies"), 2);
    assert_eq!(backend.calls(Method::Get, "/bookings"), 2);
}

#[tokio::test]
async fn test_item_read_and_update_wire_format() {
    let (client, backend) = setup();
    backend.route(Method::Get, "/books/5", 200, json!({"data": {"id": 5, "title": "Boburnoma"}}));
    backend.route(Method::Patch, "/books/5", 200, json!({"data": {"id": 5, "title": "Boburnoma"}}));

    let book = client.get::<Book>(5).await.unwrap().unwrap();
    assert_eq!(book.title, "Boburnoma");
    client
        .update::<Book, _>(5, &json!({"title": "Boburnoma"}))
        .await
        .unwrap();

    let sent = backend.sent.borrow();
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[0].url, "http://api.local/api/books/5");
    assert_eq!(sent[1].method, Method::Patch);
    assert_eq!(sent[1].url, "http://api.local/api/books/5");
}

#[tokio::test]
async fn test_profile_update_is_patch() {
    let (client, backend) = setup();
    backend.route(
        Method::Patch,
        "/auth/me",
        200,
        json!({"data": {"id": 3, "fullName": "Dilnoza", "role": "ADMIN"}}),
    );

    let user = client
        .update_profile(&json!({"fullName": "Dilnoza"}))
        .await
        .unwrap();
    assert_eq!(user.full_name, "Dilnoza");
    assert_eq!(backend.calls(Method::Patch, "/auth/me"), 1);
}

#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let (client, backend) = setup();
    backend.route(Method::Get, "/categories", 200, json!([{"id": 1, "name": "Roman"}]));

    let params = ListParams::new();
    let (a, b) = tokio::join!(
        client.list::<Category>(&params),
        client.list::<Category>(&params)
    );
    let results = [a.unwrap(), b.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_some()).count(), 1);
    assert_eq!(backend.calls(Method::Get, "/categories"), 1);
}

#[tokio::test]
async fn test_unauthorized_profile_check() {
    let (client, backend) = setup();
    backend.route(Method::Get, "/auth/me", 401, json!({}));
    assert_eq!(client.me().await.unwrap_err(), ApiError::Unauthorized);
}

#[tokio::test]
async fn test_login_and_logout() {
    let (client, backend) = setup();
    backend.route(
        Method::Post,
        "/auth/login",
        200,
        json!({"data": {"token": "t1", "user": {"id": 1, "fullName": "Admin", "role": "SUPER_ADMIN"}}}),
    );
    backend.route(Method::Post, "/auth/logout", 200, json!({}));
    backend.route(Method::Get, "/categories", 200, json!([]));

    let login = client.login("+998901234567", "secret").await.unwrap();
    assert_eq!(login.token, "t1");
    assert_eq!(login.user.full_name, "Admin");

    client.list::<Category>(&ListParams::new()).await.unwrap();
    client.logout().await.unwrap();
    client.list::<Category>(&ListParams::new()).await.unwrap();
    assert_eq!(backend.calls(Method::Get, "/categories"), 2);
}

#[tokio::test]
async fn test_file_url_resolution() {
    let (client, _) = setup();
    assert_eq!(
        client.file_url("uploads/boburnoma.pdf").unwrap(),
        "http://api.local/uploads/boburnoma.pdf"
    );
}
