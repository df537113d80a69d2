//! Click callback storage shared by the button components.
//!
//! Callbacks live in an [`IndexMap`] so they run in registration order and
//! can be removed in O(1) through their [`CallbackSubscription`].

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use miniapp_runtime::registry::{HandlerId, next_handler_id};
use parking_lot::Mutex;

/// A click callback.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

type CallbackMap = Mutex<IndexMap<HandlerId, Callback>>;

/// Ordered set of click callbacks.
#[derive(Clone, Default)]
pub struct Callbacks {
	map: Arc<CallbackMap>,
}

impl Callbacks {
	/// Adds `callback` and returns the handle that removes it.
	pub fn add<F>(&self, callback: F) -> CallbackSubscription
	where
		F: Fn() + Send + Sync + 'static,
	{
		let id = next_handler_id();
		self.map.lock().insert(id, Arc::new(callback));
		CallbackSubscription {
			id,
			map: Some(Arc::downgrade(&self.map)),
		}
	}

	/// Runs every callback in registration order.
	///
	/// The set is snapshotted first, so callbacks may add or remove others.
	pub fn trigger(&self) {
		let callbacks: Vec<Callback> = self.map.lock().values().cloned().collect();
		for callback in callbacks {
			callback();
		}
	}

	pub fn len(&self) -> usize {
		self.map.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.lock().is_empty()
	}
}

/// RAII handle that removes a click callback on drop.
#[must_use = "dropping a CallbackSubscription removes its callback; call `detach` to keep it"]
pub struct CallbackSubscription {
	id: HandlerId,
	map: Option<Weak<CallbackMap>>,
}

impl CallbackSubscription {
	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// Explicitly removes the callback. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	/// Keeps the callback for the lifetime of the component.
	pub fn detach(mut self) {
		self.map = None;
	}

	fn release(&mut self) {
		if let Some(map) = self.map.take().and_then(|weak| weak.upgrade()) {
			map.lock().shift_remove(&self.id);
		}
	}
}

impl Drop for CallbackSubscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl std::fmt::Debug for CallbackSubscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CallbackSubscription")
			.field("id", &self.id)
			.field("active", &self.map.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	#[test]
	fn test_trigger_runs_in_order() {
		let callbacks = Callbacks::default();
		let order = Arc::new(Mutex::new(Vec::new()));
		let subs: Vec<_> = [1, 2, 3]
			.into_iter()
			.map(|n| {
				let order = Arc::clone(&order);
				callbacks.add(move || order.lock().push(n))
			})
			.collect();

		callbacks.trigger();
		assert_eq!(*order.lock(), vec![1, 2, 3]);
		drop(subs);
		assert!(callbacks.is_empty());
	}

	#[test]
	fn test_unsubscribe_removes_only_its_callback() {
		let callbacks = Callbacks::default();
		let calls = Arc::new(AtomicUsize::new(0));
		let make = |calls: &Arc<AtomicUsize>| {
			let calls = Arc::clone(calls);
			move || {
				calls.fetch_add(1, Ordering::SeqCst);
			}
		};

		let first = callbacks.add(make(&calls));
		callbacks.add(make(&calls)).detach();
		first.unsubscribe();

		callbacks.trigger();
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(callbacks.len(), 1);
	}

	#[test]
	fn test_subscription_outliving_callbacks() {
		let callbacks = Callbacks::default();
		let sub = callbacks.add(|| {});
		drop(callbacks);
		drop(sub);
	}
}
