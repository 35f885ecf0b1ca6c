//! Browser storage adapters

use libris_core::{Error, KeyValueStore, Result};

/// `window.localStorage` as a [`KeyValueStore`]
///
/// When storage is unavailable (private mode, sandboxed frames) reads return
/// nothing and writes fail with a storage error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

fn storage_error(e: wasm_bindgen::JsValue) -> Error {
    Error::StorageError(format!("{:?}", e))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let storage =
            Self::storage().ok_or_else(|| Error::StorageError("localStorage unavailable".into()))?;
        storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> Result<()> {
        match Self::storage() {
            Some(storage) => storage.remove_item(key).map_err(storage_error),
            None => Ok(()),
        }
    }
}
