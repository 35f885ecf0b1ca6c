//! Console configuration
//!
//! The hosting page can inject settings via `<meta>` tags or a global object,
//! so one build serves any backend.

use libris_core::{ClientConfig, Locale};
use wasm_bindgen::JsCast;

const META_API_URL: &str = "libris:api-url";
const META_PUBLIC_URL: &str = "libris:public-url";
const META_VERSION: &str = "libris:version";
const WINDOW_CONFIG: &str = "__LIBRIS_CONFIG__";

/// Console configuration
#[derive(Debug, Clone, Default)]
pub struct ConsoleConfig {
    pub client: ClientConfig,
    /// Build or deployment version shown in the sidebar footer
    pub version: Option<String>,
}

impl ConsoleConfig {
    /// Load configuration from various sources (priority order):
    /// 1. `<meta name="libris:api-url">` tag (server-injected)
    /// 2. `window.__LIBRIS_CONFIG__` object (JavaScript injection)
    /// 3. `LIBRIS_API_URL` at compile time, else `http://localhost:8080`
    ///
    /// Invalid injected values are logged and the defaults kept.
    pub fn load() -> Self {
        let mut client = ClientConfig::default();
        let mut version = None;
        let document = web_sys::window().and_then(|w| w.document());

        let api_url = document
            .as_ref()
            .and_then(|d| get_meta_content(d, META_API_URL))
            .filter(|u| !u.is_empty())
            .or_else(|| get_js_config("apiUrl"));
        if let Some(url) = api_url {
            client = client.with_api_base_url(url);
        }

        let public_url = document
            .as_ref()
            .and_then(|d| get_meta_content(d, META_PUBLIC_URL))
            .filter(|u| !u.is_empty())
            .or_else(|| get_js_config("publicUrl"));
        if let Some(url) = public_url {
            client = client.with_public_base_url(url);
        }

        if let Some(locale) = get_js_config("defaultLocale").and_then(|c| Locale::from_code(&c)) {
            client = client.with_default_locale(locale);
        }

        if let Some(doc) = &document {
            version = get_meta_content(doc, META_VERSION).filter(|v| !v.is_empty());
        }

        let client = match client.clone().validated() {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid injected configuration");
                ClientConfig::default()
            }
        };

        Self { client, version }
    }
}

/// Get content from a <meta name="..."> tag
fn get_meta_content(document: &web_sys::Document, name: &str) -> Option<String> {
    let selector = format!("meta[name=\"{}\"]", name);
    document
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web_sys::HtmlMetaElement>().ok())
        .map(|meta| meta.content())
}

/// Get a value from window.__LIBRIS_CONFIG__
fn get_js_config(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let config = js_sys::Reflect::get(&window, &WINDOW_CONFIG.into()).ok()?;

    if config.is_undefined() || config.is_null() {
        return None;
    }

    let value = js_sys::Reflect::get(&config, &key.into()).ok()?;
    value.as_string().filter(|v| !v.is_empty())
}
