//! Logging utilities.
//!
//! Everything logs through the `log` facade. This module installs the
//! backend: `env_logger` on native targets, the browser console on wasm32.

mod init;

pub use init::{init_logging, LoggingConfig};

#[cfg(not(target_arch = "wasm32"))]
pub use init::WriteStyle;
