//! `miniapp launch-params`: decode what the host put in the page URL.

use std::path::Path;

use miniapp::launch_params::{fragment_of, load_and_store, parse, parse_raw};
use miniapp::protocol::LaunchParams;
use miniapp::JsonFileStorage;
use url::Url;

use crate::error::{CliError, Result};

/// Fragment part of a page URL, or the input itself when it is not a URL.
pub fn fragment(input: &str) -> String {
	match Url::parse(input) {
		Ok(url) => url.fragment().unwrap_or_default().to_string(),
		Err(_) => fragment_of(input).to_string(),
	}
}

pub fn execute(input: &str, store: Option<&Path>) -> Result<LaunchParams> {
	let fragment = fragment(input);
	let params = match store {
		Some(path) => {
			let storage = JsonFileStorage::open(path);
			load_and_store(&fragment, &storage)?
		}
		None => parse(&parse_raw(&fragment)),
	};

	if params == LaunchParams::default() {
		return Err(CliError::NoLaunchParams(input.to_string()));
	}
	tracing::info!(
		version = params.version.as_deref().unwrap_or("unknown"),
		platform = params.platform.as_deref().unwrap_or("unknown"),
		has_init_data = params.init_data.is_some(),
		"parsed launch params"
	);
	Ok(params)
}
