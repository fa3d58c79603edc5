// nautobot-api: Async Rust client for the Nautobot REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::Credential;
pub use client::{HttpResponse, NautobotClient};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{Field, ListManufacturersParams, Manufacturer, PageEnvelope};
