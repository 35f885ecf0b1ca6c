//! Fetch API transport and cookie credentials

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, FormData, HtmlDocument};

use crate::transport::{cookie_value, Body, CredentialSource, FilePart, HttpRequest, HttpResponse, Method, Transport};
use crate::{ApiError, Result};

/// Name of the cookie that carries the bearer token
pub const TOKEN_COOKIE: &str = "token";

/// Transport over `window.fetch` via gloo-net
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTransport;

fn js_error(e: wasm_bindgen::JsValue) -> ApiError {
    ApiError::Network(format!("{:?}", e))
}

fn form_data(part: &FilePart) -> Result<FormData> {
    let bytes = js_sys::Uint8Array::from(part.bytes.as_slice());
    let options = BlobPropertyBag::new();
    options.set_type(&part.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&js_sys::Array::of1(&bytes), &options)
        .map_err(js_error)?;
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename(&part.field, &blob, &part.file_name)
        .map_err(js_error)?;
    Ok(form)
}

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder: RequestBuilder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Patch => Request::patch(&request.url),
            Method::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let prepared = match &request.body {
            Body::Empty => builder.build()?,
            Body::Json(value) => builder.body(value.to_string())?,
            Body::Multipart(part) => builder.body(form_data(part)?)?,
        };

        let response = prepared.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Reads the bearer token from `document.cookie`
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieCredentials;

impl CookieCredentials {
    fn document() -> Option<HtmlDocument> {
        web_sys::window()?.document()?.dyn_into::<HtmlDocument>().ok()
    }

    /// Store the token cookie for the whole site
    pub fn store(token: &str) {
        if let Some(doc) = Self::document() {
            let cookie = format!(
                "{}={}; path=/; SameSite=Lax",
                TOKEN_COOKIE,
                urlencoding::encode(token)
            );
            if doc.set_cookie(&cookie).is_err() {
                tracing::warn!("Failed to store token cookie");
            }
        }
    }

    /// Expire the token cookie
    pub fn clear() {
        if let Some(doc) = Self::document() {
            let cookie = format!("{}=; path=/; max-age=0", TOKEN_COOKIE);
            if doc.set_cookie(&cookie).is_err() {
                tracing::warn!("Failed to clear token cookie");
            }
        }
    }
}

impl CredentialSource for CookieCredentials {
    fn token(&self) -> Option<String> {
        let cookies = Self::document()?.cookie().ok()?;
        cookie_value(&cookies, TOKEN_COOKIE)
    }
}
