//! UI and platform components built on the bridge.
//!
//! Each component talks to the host only through [`Bridge::post_event`],
//! [`Bridge::on_event`], and [`Bridge::invoke_custom_method`], and keeps
//! whatever state must survive a reload in [`KvStorage`].

mod buttons;
mod closing_behavior;
mod haptics;
mod main_button;
mod permissions;
mod popups;
mod theming;
mod viewport;

use std::sync::Arc;

use miniapp_protocol::LaunchParams;
use miniapp_runtime::Bridge;

pub use buttons::{BackButton, SettingsButton};
pub use closing_behavior::ClosingBehavior;
pub use haptics::Haptics;
pub use main_button::{MainButton, MainButtonState};
pub use permissions::Permissions;
pub use popups::{
	MAX_POPUP_BUTTONS, MAX_POPUP_BUTTON_TEXT, MAX_POPUP_MESSAGE, MAX_POPUP_TITLE, Popups, validate_popup,
};
pub use theming::{ThemeColors, Theming};
pub use viewport::{Viewport, ViewportState};

use crate::storage::KvStorage;

/// What every component is built from.
#[derive(Clone)]
pub struct Context {
	pub bridge: Bridge,
	pub storage: Arc<dyn KvStorage>,
	pub launch_params: Arc<LaunchParams>,
}

impl Context {
	pub fn new(bridge: Bridge, storage: Arc<dyn KvStorage>, launch_params: LaunchParams) -> Self {
		Self {
			bridge,
			storage,
			launch_params: Arc::new(launch_params),
		}
	}
}
