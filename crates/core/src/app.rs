//! [`MiniApp`]: every component wired to one bridge.

use std::sync::Arc;

use miniapp_protocol::{InitData, LaunchParams, OutgoingEvent};
use miniapp_runtime::{Bridge, BridgeOptions, HostEnvironment};

use crate::cloud_storage::CloudStorage;
use crate::components::{
	BackButton, ClosingBehavior, Context, Haptics, MainButton, Permissions, Popups, SettingsButton, Theming,
	Viewport,
};
use crate::error::Result;
use crate::launch_params;
use crate::storage::KvStorage;

/// A running Mini App.
///
/// Dropping it unregisters every component listener; the bridge itself lives
/// on while any clone of it does.
pub struct MiniApp {
	context: Context,
	theming: Theming,
	main_button: MainButton,
	back_button: BackButton,
	settings_button: SettingsButton,
	closing_behavior: ClosingBehavior,
	viewport: Viewport,
	haptics: Haptics,
	popups: Popups,
	permissions: Permissions,
	cloud_storage: CloudStorage,
}

impl MiniApp {
	/// Connects to the host and builds every component.
	///
	/// Launch parameters come from `fragment`, or from `storage` if the
	/// fragment carries none (after a reload).
	pub fn init(
		host: &dyn HostEnvironment,
		storage: Arc<dyn KvStorage>,
		fragment: &str,
		options: BridgeOptions,
	) -> Result<Self> {
		let bridge = Bridge::new(host, options)?;
		let launch_params = launch_params::load_and_store(fragment, storage.as_ref())?;
		tracing::debug!(
			transport = %bridge.transport_kind(),
			version = launch_params.version.as_deref().unwrap_or("unknown"),
			platform = launch_params.platform.as_deref().unwrap_or("unknown"),
			"mini app initialized"
		);
		Ok(Self::with_bridge(bridge, storage, launch_params))
	}

	/// Builds the components on an existing bridge.
	pub fn with_bridge(bridge: Bridge, storage: Arc<dyn KvStorage>, launch_params: LaunchParams) -> Self {
		let context = Context::new(bridge, storage, launch_params);
		let theming = Theming::new(&context);

		Self {
			main_button: MainButton::new(&context, theming.clone()),
			back_button: BackButton::new(&context),
			settings_button: SettingsButton::new(&context),
			closing_behavior: ClosingBehavior::new(&context),
			viewport: Viewport::new(&context),
			haptics: Haptics::new(&context),
			popups: Popups::new(&context),
			permissions: Permissions::new(&context),
			cloud_storage: CloudStorage::new(context.bridge.clone()),
			theming,
			context,
		}
	}

	/// Tells the host the Mini App is ready to be shown.
	pub fn ready(&self) -> Result<()> {
		Ok(self.context.bridge.post_event(&OutgoingEvent::WebAppReady)?)
	}

	pub fn expand(&self) -> Result<()> {
		self.viewport.expand()
	}

	pub fn close(&self) -> Result<()> {
		Ok(self.context.bridge.post_event(&OutgoingEvent::WebAppClose)?)
	}

	pub fn bridge(&self) -> &Bridge {
		&self.context.bridge
	}

	pub fn launch_params(&self) -> &LaunchParams {
		&self.context.launch_params
	}

	pub fn version(&self) -> Option<&str> {
		self.context.launch_params.version.as_deref()
	}

	pub fn platform(&self) -> Option<&str> {
		self.context.launch_params.platform.as_deref()
	}

	pub fn init_data(&self) -> Option<&InitData> {
		self.context.launch_params.init_data.as_ref()
	}

	pub fn init_data_raw(&self) -> Option<&str> {
		self.context.launch_params.init_data_raw.as_deref()
	}

	pub fn theme(&self) -> &Theming {
		&self.theming
	}

	pub fn main_button(&self) -> &MainButton {
		&self.main_button
	}

	pub fn back_button(&self) -> &BackButton {
		&self.back_button
	}

	pub fn settings_button(&self) -> &SettingsButton {
		&self.settings_button
	}

	pub fn closing_behavior(&self) -> &ClosingBehavior {
		&self.closing_behavior
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn haptics(&self) -> &Haptics {
		&self.haptics
	}

	pub fn popups(&self) -> &Popups {
		&self.popups
	}

	pub fn permissions(&self) -> &Permissions {
		&self.permissions
	}

	pub fn cloud_storage(&self) -> &CloudStorage {
		&self.cloud_storage
	}
}
