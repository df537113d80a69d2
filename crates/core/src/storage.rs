//! Synchronous key/value persistence.
//!
//! Components keep their state here so it survives a page reload within the
//! same session. The browser adapter backs this with `sessionStorage`; the
//! CLI and tests use [`MemoryStorage`] or [`JsonFileStorage`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::Result;

/// A synchronous JSON key/value store.
pub trait KvStorage: Send + Sync {
	/// Stored value for `key`. Missing or unreadable entries are `None`.
	fn load(&self, key: &str) -> Option<Value>;

	fn save(&self, key: &str, value: &Value) -> Result<()>;
}

/// In-process storage, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn keys(&self) -> Vec<String> {
		let mut keys: Vec<_> = self.entries.lock().keys().cloned().collect();
		keys.sort();
		keys
	}
}

impl KvStorage for MemoryStorage {
	fn load(&self, key: &str) -> Option<Value> {
		self.entries.lock().get(key).cloned()
	}

	fn save(&self, key: &str, value: &Value) -> Result<()> {
		self.entries.lock().insert(key.to_string(), value.clone());
		Ok(())
	}
}

/// Storage kept as a single JSON object on disk.
///
/// A missing or corrupt file starts empty. Every save rewrites the file.
#[derive(Debug)]
pub struct JsonFileStorage {
	path: PathBuf,
	entries: Mutex<Map<String, Value>>,
}

impl JsonFileStorage {
	pub fn open(path: impl Into<PathBuf>) -> Self {
		let path = path.into();
		let entries = fs::read_to_string(&path)
			.ok()
			.and_then(|content| serde_json::from_str(&content).ok())
			.unwrap_or_default();

		Self {
			path,
			entries: Mutex::new(entries),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn write(&self, entries: &Map<String, Value>) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}

		let json = serde_json::to_string_pretty(entries)?;
		fs::write(&self.path, json)?;
		Ok(())
	}
}

impl KvStorage for JsonFileStorage {
	fn load(&self, key: &str) -> Option<Value> {
		self.entries.lock().get(key).cloned()
	}

	fn save(&self, key: &str, value: &Value) -> Result<()> {
		let mut entries = self.entries.lock();
		entries.insert(key.to_string(), value.clone());
		self.write(&entries)
	}
}
