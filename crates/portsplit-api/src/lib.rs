// portsplit-api: Async Rust client for the CloudVision Portal provisioning API

pub mod auth;
pub mod client;
pub mod configlets;
pub mod error;
pub mod inventory;
pub mod models;
pub mod session;
pub mod transport;

pub use auth::Credentials;
pub use client::CvpClient;
pub use error::Error;
pub use models::{Configlet, CvpInfo, Device, UpdateResponse};
pub use transport::{TlsMode, TransportConfig};
