use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("no launch parameters in {0:?} and none stored")]
	NoLaunchParams(String),

	#[error(transparent)]
	Sdk(#[from] miniapp::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
