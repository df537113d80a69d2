//! Persisted component state.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::storage::KvStorage;

/// Prefix of every state key in [`KvStorage`].
pub const STATE_KEY_PREFIX: &str = "__MiniApp__State__";

/// Hook run before a changed value is stored: `(new, old) -> new'`.
///
/// Returning an error vetoes the change.
pub type BeforeChange<T> = Box<dyn Fn(T, &T) -> Result<T> + Send + Sync>;

/// A value persisted under `__MiniApp__State__<name>`, cached after first load.
pub struct State<T> {
	key: String,
	storage: Arc<dyn KvStorage>,
	initial: Box<dyn Fn() -> T + Send + Sync>,
	cached: Mutex<Option<T>>,
	before_change: Option<BeforeChange<T>>,
}

impl<T> State<T>
where
	T: Clone + PartialEq + Serialize + DeserializeOwned + Send,
{
	pub fn new<F>(storage: Arc<dyn KvStorage>, name: &str, initial: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
	{
		Self {
			key: format!("{STATE_KEY_PREFIX}{name}"),
			storage,
			initial: Box::new(initial),
			cached: Mutex::new(None),
			before_change: None,
		}
	}

	/// Installs the hook run when [`State::save`] changes the value.
	pub fn with_before_change<F>(mut self, hook: F) -> Self
	where
		F: Fn(T, &T) -> Result<T> + Send + Sync + 'static,
	{
		self.before_change = Some(Box::new(hook));
		self
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Current value: cached, else stored, else the initial value.
	pub fn load(&self) -> T {
		let mut cached = self.cached.lock();
		if let Some(value) = cached.as_ref() {
			return value.clone();
		}

		let value = self
			.storage
			.load(&self.key)
			.and_then(|stored| match serde_json::from_value(stored) {
				Ok(value) => Some(value),
				Err(err) => {
					tracing::debug!(key = %self.key, %err, "discarding unreadable stored state");
					None
				}
			})
			.unwrap_or_else(|| (self.initial)());
		*cached = Some(value.clone());
		value
	}

	/// Stores `new`, running the before-change hook first if the value differs.
	pub fn save(&self, new: T) -> Result<T> {
		let old = self.load();
		let new = match &self.before_change {
			Some(hook) if new != old => hook(new, &old)?,
			_ => new,
		};

		self.storage.save(&self.key, &serde_json::to_value(&new)?)?;
		*self.cached.lock() = Some(new.clone());
		Ok(new)
	}

	/// Applies `change` to a copy of the current value and saves it.
	pub fn update<F>(&self, change: F) -> Result<T>
	where
		F: FnOnce(&mut T),
	{
		let mut next = self.load();
		change(&mut next);
		self.save(next)
	}
}
