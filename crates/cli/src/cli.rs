use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::styles::cli_styles;

#[derive(Parser, Debug)]
#[command(name = "miniapp")]
#[command(about = "Mini App developer tool: inspect launch parameters, simulate a host")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Parse launch parameters from a page URL or its fragment and print them as JSON
	#[command(alias = "lp")]
	LaunchParams {
		/// Page URL (`https://...#tgWebAppVersion=...`) or bare fragment
		input: String,

		/// Keep the parsed parameters in this JSON file and fall back to it
		/// when the input carries none, the way a reloaded page does
		#[arg(long, value_name = "FILE")]
		store: Option<PathBuf>,
	},

	/// Run a scripted Mini App session against a simulated host
	#[command(alias = "sim")]
	Simulate {
		/// Host mechanism the page should detect
		#[arg(long, value_enum, default_value_t = TransportArg::Native)]
		transport: TransportArg,

		/// Target origin for parent-frame messages (iframe transport only)
		#[arg(long, value_name = "ORIGIN")]
		target_origin: Option<String>,

		/// Launch fragment handed to the page
		#[arg(long, default_value = crate::commands::simulate::DEFAULT_FRAGMENT)]
		fragment: String,
	},
}

/// Host capability the simulator exposes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
	/// `window.TelegramWebviewProxy.postEvent`
	#[default]
	Native,
	/// `window.external.notify`
	External,
	/// `window.parent.postMessage` from an embedded frame
	Iframe,
}
