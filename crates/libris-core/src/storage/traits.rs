use serde::de::DeserializeOwned;
use serde::Serialize;

/// String key-value persistence (browser local storage, or memory in tests)
///
/// Methods take `&self`; implementations use interior mutability the way the
/// browser's storage object does.
pub trait KeyValueStore {
    /// Read a raw value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a raw value
    fn set(&self, key: &str, value: &str) -> crate::Result<()>;

    /// Delete a value; missing keys are not an error
    fn remove(&self, key: &str) -> crate::Result<()>;

    /// Read and decode a JSON value
    ///
    /// Entries that no longer decode are treated as absent.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T>
    where
        Self: Sized,
    {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable stored value");
                None
            }
        }
    }

    /// Encode and write a JSON value
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> crate::Result<()>
    where
        Self: Sized,
    {
        self.set(key, &serde_json::to_string(value)?)
    }
}
