//! HTTP seam between the client and the platform
//!
//! [`ApiClient`](crate::ApiClient) builds [`HttpRequest`]s and hands them to a
//! [`Transport`]. The browser build uses the Fetch API; tests use a recording
//! mock.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file to send as one multipart part
#[derive(Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(FilePart),
}

impl From<FilePart> for Body {
    fn from(part: FilePart) -> Self {
        Body::Multipart(part)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as JSON; an empty body is `null`
    pub fn value(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends one request and returns the raw response
///
/// Only transport failures are errors here; status handling is the client's.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Supplies the bearer credential for each request
pub trait CredentialSource {
    fn token(&self) -> Option<String>;
}

/// Fixed credential, or none
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(pub Option<String>);

impl CredentialSource for StaticCredentials {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<F: Fn() -> Option<String>> CredentialSource for F {
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Value of one cookie from a `document.cookie` string
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| {
            urlencoding::decode(v)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| v.to_string())
        })
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let cookies = "theme=dark; token=abc.def%3D; lang=uz";
        assert_eq!(cookie_value(cookies, "token").as_deref(), Some("abc.def="));
        assert_eq!(cookie_value(cookies, "missing"), None);
        assert_eq!(cookie_value("token=", "token"), None);
    }

    #[test]
    fn test_response_value() {
        assert_eq!(HttpResponse::new(204, "").value().unwrap(), Value::Null);
        assert!(HttpResponse::new(200, "{oops").value().is_err());
        assert!(HttpResponse::new(201, "{}").ok());
        assert!(!HttpResponse::new(404, "{}").ok());
    }

    #[test]
    fn test_header_lookup() {
        let req = HttpRequest::new(Method::Get, "http://x").header("Authorization", "Bearer t");
        assert_eq!(req.header_value("authorization"), Some("Bearer t"));
    }

    #[test]
    fn test_closure_credentials() {
        let source = || Some("t".to_string());
        assert_eq!(source.token().as_deref(), Some("t"));
        assert_eq!(StaticCredentials(None).token(), None);
    }
}
