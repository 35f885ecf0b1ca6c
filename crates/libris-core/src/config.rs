use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::locale::Locale;
use crate::{Error, Result};

/// Fallback backend address when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Path prefix of every REST endpoint
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Configuration for the Libris console and its REST client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Backend origin, without the API prefix
    #[validate(url)]
    pub api_base_url: String,

    /// Prefix joined between the origin and endpoint paths
    pub api_prefix: String,

    /// Origin that serves uploaded images and PDFs
    #[validate(url)]
    pub public_base_url: String,

    /// Hosts allowed as image sources besides the public origin
    pub image_hosts: Vec<String>,

    /// Origins allowed during development
    pub dev_origins: Vec<String>,

    /// Page size for list screens
    #[validate(range(min = 1, max = 100))]
    pub default_page_size: usize,

    /// Locale used when the path carries none
    pub default_locale: Locale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base = option_env!("LIBRIS_API_URL")
            .unwrap_or(DEFAULT_API_BASE_URL)
            .to_string();
        Self {
            public_base_url: base.clone(),
            api_base_url: base,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            image_hosts: Vec::new(),
            dev_origins: vec!["http://localhost:3000".to_string()],
            default_page_size: 10,
            default_locale: Locale::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend origin; the public origin follows unless set separately
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if self.public_base_url == self.api_base_url {
            self.public_base_url = url.clone();
        }
        self.api_base_url = url;
        self
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }

    pub fn with_image_host(mut self, host: impl Into<String>) -> Self {
        self.image_hosts.push(host.into());
        self
    }

    pub fn with_dev_origin(mut self, origin: impl Into<String>) -> Self {
        self.dev_origins.push(origin.into());
        self
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Validate field constraints
    pub fn validated(self) -> Result<Self> {
        self.validate()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(self)
    }

    /// `<base>/api`
    pub fn api_url(&self) -> String {
        let prefix = self.api_prefix.trim_matches('/');
        let base = self.api_base_url.trim_end_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        }
    }

    /// Full URL of an endpoint path such as `/books/3`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url(), path.trim_start_matches('/'))
    }

    /// Resolve an uploaded file path against the public origin
    ///
    /// Absolute URLs are returned unchanged.
    pub fn public_url(&self, path: &str) -> Result<String> {
        if let Ok(absolute) = Url::parse(path) {
            return Ok(absolute.to_string());
        }
        let mut base = Url::parse(&self.public_base_url)
            .map_err(|e| Error::InvalidConfig(format!("public_base_url: {}", e)))?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        base.join(path.trim_start_matches('/'))
            .map(|u| u.to_string())
            .map_err(|e| Error::InvalidConfig(format!("invalid file path {}: {}", path, e)))
    }

    /// Whether an image URL may be rendered directly
    pub fn is_allowed_image(&self, src: &str) -> bool {
        let host = match Url::parse(src) {
            Ok(url) => url.host_str().map(str::to_string),
            // Relative paths resolve against the public origin
            Err(_) => return true,
        };
        let Some(host) = host else {
            return false;
        };
        let public_host = Url::parse(&self.public_base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        public_host.as_deref() == Some(host.as_str()) || self.image_hosts.iter().any(|h| *h == host)
    }

    /// Whether an origin is an allowed development origin
    pub fn is_dev_origin(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.dev_origins
            .iter()
            .any(|o| o.trim_end_matches('/') == origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.default_locale, Locale::Uz);
        assert_eq!(config.api_base_url, config.public_base_url);
        assert!(config.clone().validated().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new()
            .with_api_base_url("https://library.example.uz/")
            .with_image_host("cdn.example.uz")
            .with_default_page_size(20)
            .with_default_locale(Locale::Ru);

        assert_eq!(config.api_url(), "https://library.example.uz/api");
        assert_eq!(config.public_base_url, "https://library.example.uz/");
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.image_hosts, vec!["cdn.example.uz".to_string()]);
    }

    #[test]
    fn test_endpoint_joining() {
        let config = ClientConfig::new().with_api_base_url("http://api.local:8080");
        assert_eq!(config.endpoint("/books"), "http://api.local:8080/api/books");
        assert_eq!(config.endpoint("books/3"), "http://api.local:8080/api/books/3");

        let bare = config.with_api_prefix("");
        assert_eq!(bare.endpoint("/books"), "http://api.local:8080/books");
    }

    #[test]
    fn test_public_url() {
        let config = ClientConfig::new()
            .with_api_base_url("http://api.local")
            .with_public_base_url("http://files.local/static");
        assert_eq!(
            config.public_url("/uploads/cover.png").unwrap(),
            "http://files.local/static/uploads/cover.png"
        );
        assert_eq!(
            config.public_url("https://cdn.example.uz/a.png").unwrap(),
            "https://cdn.example.uz/a.png"
        );
    }

    #[test]
    fn test_image_allow_list() {
        let config = ClientConfig::new()
            .with_api_base_url("http://files.local")
            .with_image_host("cdn.example.uz");
        assert!(config.is_allowed_image("http://files.local/uploads/a.png"));
        assert!(config.is_allowed_image("https://cdn.example.uz/a.png"));
        assert!(config.is_allowed_image("uploads/a.png"));
        assert!(!config.is_allowed_image("https://evil.example.com/a.png"));
    }

    #[test]
    fn test_validation() {
        let bad_url = ClientConfig::new().with_api_base_url("not a url");
        assert!(matches!(bad_url.validated(), Err(Error::InvalidConfig(_))));

        let bad_size = ClientConfig::new().with_default_page_size(0);
        assert!(bad_size.validated().is_err());
        let bad_size = ClientConfig::new().with_default_page_size(500);
        assert!(bad_size.validated().is_err());
    }

    #[test]
    fn test_dev_origins() {
        let config = ClientConfig::new().with_dev_origin("http://127.0.0.1:5173/");
        assert!(config.is_dev_origin("http://localhost:3000"));
        assert!(config.is_dev_origin("http://127.0.0.1:5173"));
        assert!(!config.is_dev_origin("http://example.com"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"apiBaseUrl":"http://x.local","defaultLocale":"en"}"#).unwrap();
        assert_eq!(config.api_base_url, "http://x.local");
        assert_eq!(config.default_locale, Locale::En);
        assert_eq!(config.api_prefix, "/api");
    }
}
