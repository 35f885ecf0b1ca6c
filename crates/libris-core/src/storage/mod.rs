//! Key-value persistence used for the session and form drafts

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::KeyValueStore;
