//! Key/value persistence
//!
//! LocalStorage on the web. Native builds have no backing store and report
//! [`StorageError::Unavailable`] so callers fall back to defaults.

use crate::error::StorageError;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or(StorageError::Unavailable)
}

/// Read the raw string stored under `key`
#[cfg(target_arch = "wasm32")]
pub fn read(key: &'static str) -> Result<Option<String>, StorageError> {
    local_storage()?
        .get_item(key)
        .map_err(|_| StorageError::Access { key })
}

/// Store `value` under `key`
#[cfg(target_arch = "wasm32")]
pub fn write(key: &'static str, value: &str) -> Result<(), StorageError> {
    local_storage()?
        .set_item(key, value)
        .map_err(|_| StorageError::Access { key })
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn read(_key: &'static str) -> Result<Option<String>, StorageError> {
    Err(StorageError::Unavailable)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write(_key: &'static str, _value: &str) -> Result<(), StorageError> {
    Err(StorageError::Unavailable)
}

/// Load a JSON value, falling back to `T::default()` on any failure
pub fn load_or_default<T>(key: &'static str, what: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match read(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => {
                log::info!("Loaded {} from storage", what);
                value
            }
            Err(e) => {
                log::warn!("Discarding stored {}: {}", what, StorageError::from(e));
                T::default()
            }
        },
        Ok(None) => {
            log::info!("No stored {}, using defaults", what);
            T::default()
        }
        Err(StorageError::Unavailable) => {
            log::debug!("No storage for {}, using defaults", what);
            T::default()
        }
        Err(e) => {
            log::warn!("Could not read {}: {}", what, e);
            T::default()
        }
    }
}

/// Serialize `value` as JSON under `key`
pub fn save_json<T: serde::Serialize>(key: &'static str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    write(key, &json)
}
