//! Target-independent core of the Libris library console
//!
//! Everything here compiles and tests natively; the browser crate only adds
//! rendering and I/O on top.

pub mod config;
pub mod envelope;
pub mod error;
pub mod form;
pub mod locale;
pub mod query;
pub mod record;
pub mod session;
pub mod storage;
pub mod table;

pub use config::{ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_API_PREFIX};
pub use envelope::{decode_item, decode_list, error_message, normalize_list, unwrap_item, Paged};
pub use error::{Error, Result};
pub use locale::{Locale, Message, Theme};
pub use query::{CacheEntry, QueryCache, QueryKey, QueryStatus};
pub use record::{display_text, to_record, KeyPath, Record};
pub use session::{Area, Role, Session, SessionStore, SessionUser, SESSION_STORAGE_KEY};
pub use storage::{KeyValueStore, MemoryStore};
