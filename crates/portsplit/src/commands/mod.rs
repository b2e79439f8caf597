//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod preview;
pub mod reconcile;
mod util;
