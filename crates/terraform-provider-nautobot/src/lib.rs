//! Nautobot provider plugin.
//!
//! [`NautobotProvider`] implements the host contract from
//! `nautobot-core`: it resolves the provider block through
//! `nautobot-config`, exports one shared client, and registers the
//! `nautobot_manufacturers` data source. The `terraform-provider-nautobot`
//! binary drives the same provider from the command line.

pub mod provider;

pub use provider::NautobotProvider;
