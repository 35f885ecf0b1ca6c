//! REST client for the Libris backend
//!
//! - [`ApiClient`]: one configured client, bearer credential on every call
//! - [`QueryClient`]: cache-aware reads and invalidating writes
//! - [`models`] and [`resources`]: typed entities and their endpoints
//!
//! The Fetch API transport is behind the `browser` feature; everything else
//! runs natively against any [`Transport`].

pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod resources;
pub mod transport;

#[cfg(feature = "browser")]
pub mod browser;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use query::{Fetched, Mutation, QueryClient, SubscriptionId};
pub use resources::{file_part, ListParams, Resource};
pub use transport::{
    cookie_value, Body, CredentialSource, FilePart, HttpRequest, HttpResponse, Method,
    StaticCredentials, Transport,
};

#[cfg(feature = "browser")]
pub use browser::{CookieCredentials, GlooTransport, TOKEN_COOKIE};
