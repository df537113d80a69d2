//! Listener registry for incoming events.
//!
//! Listeners are stored per event in an [`IndexMap`] keyed by [`HandlerId`],
//! which keeps insertion order for dispatch and gives O(1) removal.
//!
//! Two registration styles are supported:
//! - [`ListenerRegistry::insert`] always appends, so the same listener can be
//!   registered more than once; the caller removes it through the
//!   [`Subscription`] it got back.
//! - [`ListenerRegistry::insert_unique`] skips a listener that is already
//!   registered (same `Arc`), and [`ListenerRegistry::remove_listener`]
//!   removes by that identity.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use miniapp_protocol::IncomingEvent;
use parking_lot::Mutex;
use serde_json::Value;

/// Unique identifier for a registered listener.
pub type HandlerId = u64;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a new globally-unique handler ID.
pub fn next_handler_id() -> HandlerId {
	NEXT_HANDLER_ID.fetch_add(1, Ordering::SeqCst)
}

/// Callback receiving the raw `eventData` of an incoming event.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Wraps a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
	F: Fn(&Value) + Send + Sync + 'static,
{
	Arc::new(f)
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
	std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Ordered listeners per incoming event.
#[derive(Default)]
pub struct ListenerRegistry {
	listeners: HashMap<IncomingEvent, IndexMap<HandlerId, Listener>>,
}

/// Registry shared between the bridge and its subscriptions.
pub type SharedRegistry = Arc<Mutex<ListenerRegistry>>;

impl ListenerRegistry {
	/// Appends a listener and returns its id.
	pub fn insert(&mut self, event: IncomingEvent, listener: Listener) -> HandlerId {
		let id = next_handler_id();
		self.listeners.entry(event).or_default().insert(id, listener);
		id
	}

	/// Appends a listener unless the same `Arc` is already registered for `event`.
	///
	/// Returns `false` if it was already present.
	pub fn insert_unique(&mut self, event: IncomingEvent, listener: &Listener) -> bool {
		let entries = self.listeners.entry(event).or_default();
		if entries.values().any(|existing| same_listener(existing, listener)) {
			return false;
		}
		entries.insert(next_handler_id(), Arc::clone(listener));
		true
	}

	/// Removes the entry with the given id.
	pub fn remove(&mut self, event: IncomingEvent, id: HandlerId) -> bool {
		self.listeners
			.get_mut(&event)
			.is_some_and(|entries| entries.shift_remove(&id).is_some())
	}

	/// Removes the first entry holding `listener`. Absent listeners are ignored.
	pub fn remove_listener(&mut self, event: IncomingEvent, listener: &Listener) -> bool {
		let Some(entries) = self.listeners.get_mut(&event) else {
			return false;
		};
		let found = entries
			.iter()
			.find(|(_, existing)| same_listener(existing, listener))
			.map(|(id, _)| *id);
		match found {
			Some(id) => entries.shift_remove(&id).is_some(),
			None => false,
		}
	}

	/// Listeners for `event` in insertion order.
	pub fn snapshot(&self, event: IncomingEvent) -> Vec<Listener> {
		self.listeners
			.get(&event)
			.map(|entries| entries.values().cloned().collect())
			.unwrap_or_default()
	}

	pub fn len(&self, event: IncomingEvent) -> usize {
		self.listeners.get(&event).map_or(0, IndexMap::len)
	}
}

/// Runs one listener, containing any panic so the rest still run.
pub(crate) fn invoke_isolated(event: IncomingEvent, listener: &Listener, data: &Value) {
	if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(data))) {
		let reason = panic
			.downcast_ref::<&str>()
			.map(|s| s.to_string())
			.or_else(|| panic.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "<non-string panic>".to_string());
		tracing::warn!(%event, reason = %reason, "listener panicked, skipping it");
	}
}

/// RAII handle that unregisters a listener on drop.
///
/// Holds a weak reference to the registry, so dropping it after the bridge
/// is gone is a no-op.
#[must_use = "dropping a Subscription unregisters its listener; call `detach` to keep it"]
pub struct Subscription {
	event: IncomingEvent,
	id: HandlerId,
	registry: Option<Weak<Mutex<ListenerRegistry>>>,
}

impl Subscription {
	pub(crate) fn new(event: IncomingEvent, id: HandlerId, registry: &SharedRegistry) -> Self {
		Self {
			event,
			id,
			registry: Some(Arc::downgrade(registry)),
		}
	}

	/// Returns this subscription's handler ID.
	pub fn id(&self) -> HandlerId {
		self.id
	}

	pub fn event(&self) -> IncomingEvent {
		self.event
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	/// Keeps the listener registered for the lifetime of the bridge.
	pub fn detach(mut self) {
		self.registry = None;
	}

	fn release(&mut self) {
		if let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) {
			registry.lock().remove(self.event, self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("event", &self.event)
			.field("id", &self.id)
			.field("active", &self.registry.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use super::*;

	const EVENT: IncomingEvent = IncomingEvent::MainButtonPressed;

	fn counting(counter: &Arc<AtomicUsize>) -> Listener {
		let counter = Arc::clone(counter);
		listener(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
		})
	}

	#[test]
	fn test_handler_id_increments() {
		let id1 = next_handler_id();
		let id2 = next_handler_id();
		assert!(id2 > id1);
	}

	#[test]
	fn test_insert_accumulates_same_listener() {
		let mut registry = ListenerRegistry::default();
		let calls = Arc::new(AtomicUsize::new(0));
		let l = counting(&calls);

		registry.insert(EVENT, Arc::clone(&l));
		registry.insert(EVENT, Arc::clone(&l));
		assert_eq!(registry.len(EVENT), 2);
	}

	#[test]
	fn test_insert_unique_deduplicates() {
		let mut registry = ListenerRegistry::default();
		let calls = Arc::new(AtomicUsize::new(0));
		let l = counting(&calls);

		assert!(registry.insert_unique(EVENT, &l));
		assert!(!registry.insert_unique(EVENT, &l));
		assert_eq!(registry.len(EVENT), 1);

		// Same listener under a different event is a separate registration.
		assert!(registry.insert_unique(IncomingEvent::BackButtonPressed, &l));
	}

	#[test]
	fn test_remove_listener_by_identity() {
		let mut registry = ListenerRegistry::default();
		let calls = Arc::new(AtomicUsize::new(0));
		let first = counting(&calls);
		let second = counting(&calls);

		registry.insert_unique(EVENT, &first);
		registry.insert_unique(EVENT, &second);

		assert!(registry.remove_listener(EVENT, &first));
		assert!(!registry.remove_listener(EVENT, &first));
		let remaining = registry.snapshot(EVENT);
		assert_eq!(remaining.len(), 1);
		assert!(same_listener(&remaining[0], &second));
	}

	#[test]
	fn test_remove_absent_is_noop() {
		let mut registry = ListenerRegistry::default();
		let calls = Arc::new(AtomicUsize::new(0));
		assert!(!registry.remove_listener(EVENT, &counting(&calls)));
		assert!(!registry.remove(EVENT, 12345));
	}

	#[test]
	fn test_snapshot_preserves_order() {
		let order = Arc::new(Mutex::new(Vec::new()));
		let mut registry = ListenerRegistry::default();
		for tag in ["a", "b", "c"] {
			let order = Arc::clone(&order);
			registry.insert(EVENT, listener(move |_| order.lock().push(tag)));
		}

		for l in registry.snapshot(EVENT) {
			l(&Value::Null);
		}
		assert_eq!(*order.lock(), vec!["a", "b", "c"]);
	}

	#[test]
	fn test_subscription_drop_unregisters() {
		let registry: SharedRegistry = Arc::new(Mutex::new(ListenerRegistry::default()));
		let calls = Arc::new(AtomicUsize::new(0));
		let id = registry.lock().insert(EVENT, counting(&calls));

		{
			let _sub = Subscription::new(EVENT, id, &registry);
			assert_eq!(registry.lock().len(EVENT), 1);
		}
		assert_eq!(registry.lock().len(EVENT), 0);
	}

	#[test]
	fn test_subscription_detach_keeps_listener() {
		let registry: SharedRegistry = Arc::new(Mutex::new(ListenerRegistry::default()));
		let calls = Arc::new(AtomicUsize::new(0));
		let id = registry.lock().insert(EVENT, counting(&calls));

		Subscription::new(EVENT, id, &registry).detach();
		assert_eq!(registry.lock().len(EVENT), 1);
	}

	#[test]
	fn test_subscription_weak_reference() {
		let registry: SharedRegistry = Arc::new(Mutex::new(ListenerRegistry::default()));
		let calls = Arc::new(AtomicUsize::new(0));
		let id = registry.lock().insert(EVENT, counting(&calls));
		let sub = Subscription::new(EVENT, id, &registry);

		drop(registry);

		// Dropping subscription should not panic (weak ref is dead)
		drop(sub);
	}

	#[test]
	fn test_invoke_isolated_contains_panic() {
		let boom = listener(|_| panic!("listener failure"));
		invoke_isolated(EVENT, &boom, &Value::Null);
	}
}
