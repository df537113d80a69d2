//! `sessionStorage`-backed state, so components survive a reload.

use miniapp::{Error, KvStorage, Result};
use serde_json::Value;
use web_sys::Storage;

use crate::host::{stringify_js_error, window};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStorage;

impl SessionStorage {
    fn storage() -> Result<Storage> {
        window()?
            .session_storage()
            .map_err(|err| Error::Storage(stringify_js_error(err)))?
            .ok_or_else(|| Error::Storage("sessionStorage is not available".to_string()))
    }
}

impl KvStorage for SessionStorage {
    fn load(&self, key: &str) -> Option<Value> {
        let raw = Self::storage().ok()?.get_item(key).ok()??;
        serde_json::from_str(&raw).ok()
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        Self::storage()?
            .set_item(key, &serde_json::to_string(value)?)
            .map_err(|err| Error::Storage(stringify_js_error(err)))
    }
}
