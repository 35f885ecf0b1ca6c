use std::rc::Rc;

use libris_core::{envelope, ClientConfig, QueryKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::transport::{Body, CredentialSource, FilePart, HttpRequest, Method, StaticCredentials, Transport};
use crate::{ApiError, Result};

/// REST client for the Libris backend
///
/// Every request carries `Accept: application/json`, a JSON content type for
/// JSON bodies, and `Authorization: Bearer <token>` when the credential source
/// has a token. Error bodies keep the backend's message.
#[derive(Clone)]
pub struct ApiClient {
    config: Rc<ClientConfig>,
    transport: Rc<dyn Transport>,
    credentials: Rc<dyn CredentialSource>,
}

impl ApiClient {
    /// Create a client without credentials
    pub fn new(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Rc::new(config),
            transport: Rc::new(transport),
            credentials: Rc::new(StaticCredentials::default()),
        }
    }

    /// Attach a credential source consulted on every request
    pub fn with_credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.credentials = Rc::new(credentials);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `<base>/api`
    pub fn base_url(&self) -> String {
        self.config.api_url()
    }

    /// Full URL of `path` with the key's parameters as the query string
    pub fn url(&self, path: &str, query: Option<&QueryKey>) -> String {
        let url = self.config.endpoint(path);
        match query.map(QueryKey::query_string) {
            Some(qs) if !qs.is_empty() => format!("{}?{}", url, qs),
            _ => url,
        }
    }

    fn build(&self, method: Method, url: String, body: Body) -> HttpRequest {
        let mut request = HttpRequest::new(method, url).header("Accept", "application/json");
        if matches!(body, Body::Json(_)) {
            request = request.header("Content-Type", "application/json");
        }
        if let Some(token) = self.credentials.token() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request.body(body)
    }

    /// Send a request and return the JSON body of a success response
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&QueryKey>,
        body: Body,
    ) -> Result<Value> {
        let request = self.build(method, self.url(path, query), body);
        debug!(method = %method, url = %request.url, "API request");

        let response = self.transport.send(request).await?;
        if response.status == 401 {
            warn!(path, "Request rejected as unauthorized");
            return Err(ApiError::Unauthorized);
        }
        if !response.ok() {
            let message = response
                .value()
                .ok()
                .as_ref()
                .and_then(envelope::error_message)
                .unwrap_or_else(|| format!("HTTP error: {}", response.status));
            warn!(path, status = response.status, %message, "API error");
            return Err(ApiError::Http {
                status: response.status,
                message,
            });
        }
        response.value()
    }

    pub async fn get(&self, path: &str, query: Option<&QueryKey>) -> Result<Value> {
        self.request(Method::Get, path, query, Body::Empty).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.request(Method::Post, path, None, Body::Json(serde_json::to_value(body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.request(Method::Patch, path, None, Body::Json(serde_json::to_value(body)?))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::Delete, path, None, Body::Empty).await
    }

    /// Multipart upload; the backend answers with the stored path
    pub async fn upload(&self, path: &str, file: FilePart) -> Result<String> {
        let value = self.request(Method::Post, path, None, Body::Multipart(file)).await?;
        match envelope::unwrap_item(value) {
            Value::String(stored) => Ok(stored),
            Value::Object(map) => ["path", "url", "fileName", "filename"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(str::to_string)
                .ok_or_else(|| ApiError::Envelope("upload response carries no path".into())),
            other => Err(ApiError::Envelope(format!("unexpected upload response: {}", other))),
        }
    }

    /// GET and decode a single item through the envelope
    pub async fn get_item<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path, None).await?;
        Ok(envelope::decode_item(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::RefCell;

    struct Recorder {
        sent: Rc<RefCell<Vec<HttpRequest>>>,
        reply: HttpResponse,
    }

    #[async_trait(?Send)]
    impl Transport for Recorder {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.sent.borrow_mut().push(request);
            Ok(self.reply.clone())
        }
    }

    fn mock_client(reply: HttpResponse) -> (ApiClient, Rc<RefCell<Vec<HttpRequest>>>) {
        let sent = Rc::new(RefCell::new(Vec::new()));
        let config = ClientConfig::new().with_api_base_url("http://api.local");
        let client = ApiClient::new(
            config,
            Recorder {
                sent: sent.clone(),
                reply,
            },
        );
        (client, sent)
    }

    #[tokio::test]
    async fn test_bearer_and_content_type() {
        let (client, sent) = mock_client(HttpResponse::json(200, &json!({"data": {"id": 1}})));
        let client = client.with_credentials(StaticCredentials(Some("jwt".into())));

        client.post("/books", &json!({"title": "X"})).await.unwrap();
        let request = sent.borrow()[0].clone();
        assert_eq!(request.url, "http://api.local/api/books");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header_value("Authorization"), Some("Bearer jwt"));
        assert_eq!(request.header_value("Content-Type"), Some("application/json"));
        assert_eq!(request.body, Body::Json(json!({"title": "X"})));
    }

    #[tokio::test]
    async fn test_no_token_no_authorization_header() {
        let (client, sent) = mock_client(HttpResponse::json(200, &json!([])));
        client.get("/categories", None).await.unwrap();
        let request = sent.borrow()[0].clone();
        assert_eq!(request.header_value("Authorization"), None);
        assert_eq!(request.header_value("Content-Type"), None);
    }

    #[tokio::test]
    async fn test_query_string_from_key() {
        let (client, sent) = mock_client(HttpResponse::json(200, &json!([])));
        let key = QueryKey::new("books").param("page", 0).param("search", "o'tkan kunlar");
        client.get("/books", Some(&key)).await.unwrap();
        assert_eq!(
            sent.borrow()[0].url,
            "http://api.local/api/books?page=0&search=o%27tkan%20kunlar"
        );
    }

    #[tokio::test]
    async fn test_backend_message_is_kept() {
        let (client, _) = mock_client(HttpResponse::json(400, &json!({"message": "Phone already used"})));
        let err = client.post("/students", &json!({})).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 400,
                message: "Phone already used".into()
            }
        );

        let (client, _) = mock_client(HttpResponse::new(502, "<html>bad gateway</html>"));
        let err = client.get("/books", None).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error: 502");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (client, _) = mock_client(HttpResponse::new(401, ""));
        assert!(client.get("/auth/me", None).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_upload_returns_path() {
        let (client, sent) = mock_client(HttpResponse::json(200, &json!({"data": "uploads/cover.png"})));
        let file = FilePart {
            field: "file".into(),
            file_name: "cover.png".into(),
            mime: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let path = client.upload("/files/upload/image", file).await.unwrap();
        assert_eq!(path, "uploads/cover.png");
        assert_eq!(sent.borrow()[0].header_value("Content-Type"), None);

        let (client, _) = mock_client(HttpResponse::json(200, &json!({"data": {"path": "a.pdf"}})));
        let file = FilePart {
            field: "file".into(),
            file_name: "a.pdf".into(),
            mime: "application/pdf".into(),
            bytes: vec![],
        };
        assert_eq!(client.upload("/files/upload/pdf", file).await.unwrap(), "a.pdf");
    }
}
