//! Rust SDK for Telegram-style Mini Apps.
//!
//! A Mini App is a web page hosted inside a messaging client. It talks to
//! the client over the bridge in `miniapp-runtime`; this crate layers the
//! user-facing components on top: buttons, theming, popups, permissions,
//! cloud storage, and launch parameters.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use miniapp::{BridgeOptions, MemoryStorage, MiniApp};
//!
//! let app = MiniApp::init(&host, Arc::new(MemoryStorage::new()), fragment, BridgeOptions::default())?;
//! app.ready()?;
//! app.main_button().set_text("CLOSE")?;
//! app.main_button().show()?;
//! let _click = app.main_button().on_click(|| tracing::info!("clicked"));
//! ```

pub mod app;
pub mod cloud_storage;
pub mod components;
pub mod error;
mod events;
pub mod handlers;
pub mod launch_params;
pub mod state;
pub mod storage;

pub use app::MiniApp;
pub use cloud_storage::CloudStorage;
pub use components::{
	BackButton, ClosingBehavior, Context, Haptics, MainButton, MainButtonState, Permissions, Popups,
	SettingsButton, ThemeColors, Theming, Viewport, ViewportState,
};
pub use error::{Error, Result};
pub use handlers::{CallbackSubscription, Callbacks};
pub use miniapp_protocol as protocol;
pub use miniapp_runtime::{Bridge, BridgeOptions, HostEnvironment, Subscription};
pub use state::State;
pub use storage::{JsonFileStorage, KvStorage, MemoryStorage};
