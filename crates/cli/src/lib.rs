//! `miniapp` developer tool.
//!
//! Inspects launch parameters and runs a scripted Mini App session against
//! an in-process host, printing everything the page sends.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod styles;
