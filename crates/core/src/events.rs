//! Awaiting a single incoming event.

use miniapp_protocol::IncomingEvent;
use miniapp_runtime::{Bridge, Subscription};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Resolves with the next decodable payload of one event.
///
/// Subscribe before sending the request that triggers the event, so a
/// synchronous reply is not missed.
pub(crate) struct NextEvent<T> {
	rx: oneshot::Receiver<T>,
	subscription: Subscription,
}

impl<T> NextEvent<T>
where
	T: DeserializeOwned + Send + 'static,
{
	pub(crate) fn subscribe(bridge: &Bridge, event: IncomingEvent) -> Self {
		let (tx, rx) = oneshot::channel();
		let tx = Mutex::new(Some(tx));
		let subscription = bridge.on_event_typed(event, move |payload: T| {
			if let Some(tx) = tx.lock().take() {
				let _ = tx.send(payload);
			}
		});
		Self { rx, subscription }
	}

	pub(crate) async fn recv(self) -> Result<T> {
		let Self { rx, subscription } = self;
		let payload = rx.await.map_err(|_| Error::ChannelClosed);
		subscription.unsubscribe();
		payload
	}
}
