//! Correlation of custom-method requests with their replies.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use miniapp_protocol::CustomMethodInvoked;
use parking_lot::Mutex;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Characters a request id is drawn from.
pub const REQUEST_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated request id.
pub const REQUEST_ID_LENGTH: usize = 16;

/// Draws made before giving up on finding an unused id.
pub const MAX_REQUEST_ID_ATTEMPTS: usize = 100;

/// Source of request ids. Swap in a deterministic one for tests.
pub trait RequestIdGenerator: Send + Sync {
	fn next_id(&self) -> String;
}

/// Random alphanumeric ids of [`REQUEST_ID_LENGTH`] characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRequestIds;

impl RequestIdGenerator for RandomRequestIds {
	fn next_id(&self) -> String {
		let mut rng = rand::thread_rng();
		(0..REQUEST_ID_LENGTH)
			.map(|_| REQUEST_ID_ALPHABET[rng.gen_range(0..REQUEST_ID_ALPHABET.len())] as char)
			.collect()
	}
}

impl<F> RequestIdGenerator for F
where
	F: Fn() -> String + Send + Sync,
{
	fn next_id(&self) -> String {
		self()
	}
}

struct PendingRequest {
	method: String,
	tx: oneshot::Sender<Result<Value>>,
}

type PendingMap = Arc<Mutex<HashMap<String, PendingRequest>>>;

/// Outstanding custom-method requests keyed by request id.
#[derive(Default)]
pub(crate) struct PendingRequests {
	map: PendingMap,
}

impl PendingRequests {
	/// Reserves a fresh id for `method` and returns the call awaiting its reply.
	pub(crate) fn allocate(&self, method: &str, ids: &dyn RequestIdGenerator) -> Result<PendingCall> {
		let mut map = self.map.lock();
		for _ in 0..MAX_REQUEST_ID_ATTEMPTS {
			let req_id = ids.next_id();
			if map.contains_key(&req_id) {
				continue;
			}

			let (tx, rx) = oneshot::channel();
			map.insert(
				req_id.clone(),
				PendingRequest {
					method: method.to_string(),
					tx,
				},
			);
			return Ok(PendingCall {
				guard: CancelGuard {
					req_id: req_id.clone(),
					map: Arc::downgrade(&self.map),
					completed: false,
				},
				req_id,
				rx,
			});
		}

		Err(Error::RequestIdExhausted {
			attempts: MAX_REQUEST_ID_ATTEMPTS,
		})
	}

	/// Settles the request named by `reply`. Unknown or already-settled ids are ignored.
	pub(crate) fn resolve(&self, reply: CustomMethodInvoked) {
		let Some(pending) = self.map.lock().remove(&reply.req_id) else {
			tracing::debug!(req_id = %reply.req_id, "no pending request for reply");
			return;
		};

		let outcome = match reply.error_message() {
			Some(message) => Err(Error::CustomMethodFailed {
				method: pending.method,
				message,
			}),
			None => Ok(reply.result.unwrap_or(Value::Null)),
		};

		// The caller may have stopped waiting; that is fine.
		let _ = pending.tx.send(outcome);
	}

	pub(crate) fn len(&self) -> usize {
		self.map.lock().len()
	}
}

/// Removes the pending entry when a call is dropped before it settles.
struct CancelGuard {
	req_id: String,
	map: Weak<Mutex<HashMap<String, PendingRequest>>>,
	completed: bool,
}

impl Drop for CancelGuard {
	fn drop(&mut self) {
		if self.completed {
			return;
		}
		let Some(map) = self.map.upgrade() else {
			return;
		};
		if map.lock().remove(&self.req_id).is_some() {
			tracing::debug!(req_id = %self.req_id, "removed orphaned request");
		}
	}
}

/// Reply to a custom-method invocation.
///
/// The request is already on the wire when this is returned. Dropping it
/// forgets the request; a reply arriving later is ignored.
#[must_use = "the reply is lost unless the call is awaited"]
pub struct PendingCall {
	req_id: String,
	rx: oneshot::Receiver<Result<Value>>,
	guard: CancelGuard,
}

impl PendingCall {
	pub fn req_id(&self) -> &str {
		&self.req_id
	}

	/// Awaits the reply and deserializes its result.
	pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
		let value = self.await?;
		serde_json::from_value(value).map_err(|err| Error::Protocol(format!("unexpected result: {err}")))
	}
}

impl Future for PendingCall {
	type Output = Result<Value>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match Pin::new(&mut self.rx).poll(cx) {
			Poll::Ready(result) => {
				self.guard.completed = true;
				Poll::Ready(result.map_err(|_| Error::ChannelClosed).and_then(|r| r))
			}
			Poll::Pending => Poll::Pending,
		}
	}
}

impl std::fmt::Debug for PendingCall {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PendingCall").field("req_id", &self.req_id).finish()
	}
}
