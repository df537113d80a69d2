pub mod launch_params;
pub mod simulate;

use crate::cli::{Cli, Commands};
use crate::error::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	match cli.command {
		Commands::LaunchParams { input, store } => {
			let params = launch_params::execute(&input, store.as_deref())?;
			println!("{}", serde_json::to_string_pretty(&params)?);
		}
		Commands::Simulate {
			transport,
			target_origin,
			fragment,
		} => {
			let report = simulate::execute(transport, target_origin, &fragment).await?;
			for envelope in &report.outbound {
				println!("{}", serde_json::to_string(envelope)?);
			}
			tracing::info!(
				transport = %report.transport,
				sent = report.outbound.len(),
				clicks = report.main_button_clicks,
				confirmed = report.confirmed,
				"simulation finished"
			);
		}
	}
	Ok(())
}
