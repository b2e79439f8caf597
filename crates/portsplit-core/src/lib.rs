//! Splitting of CloudVision reconcile configlets into port automation configlets.
//!
//! - **[`parse`]**: splits an EOS-style running-config excerpt into
//!   interface blocks and residual lines, dropping reserved breakout lanes.
//! - **[`classify`]**: assigns each interface to the tap, tool, or shutdown
//!   category from its configuration lines.
//! - **[`render`]**: re-templates each category into configlet text.
//! - **[`Plan`]**: the pure pipeline over all three.
//! - **[`Reconciler`]**: executes a plan against a CVP server through
//!   `portsplit-api`.

pub mod classify;
pub mod config;
pub mod error;
pub mod parse;
pub mod plan;
pub mod reconcile;
pub mod render;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::{Classified, PortCategory, classify_block};
pub use config::{AuthCredentials, ConnectionConfig, TlsVerification};
pub use error::CoreError;
pub use parse::{InterfaceBlocks, Span, SplitConfig, split};
pub use plan::{Disposition, InterfaceOutcome, Plan, PlanOptions};
pub use reconcile::{ReconcileOptions, ReconcileReport, Reconciler};
pub use render::{render_category, render_residual};
