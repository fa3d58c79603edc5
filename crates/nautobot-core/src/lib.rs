//! Typed read pipeline between `nautobot-api` and the provider host.
//!
//! This crate owns the pieces where upstream JSON, the host's attribute
//! model, and the domain model meet:
//!
//! - **[`Attr`] / [`AttributeValue`]**: three-state leaves (`Null`,
//!   `Unknown`, `Known`) so null and "not yet computed" never collapse
//!   into a zero value.
//! - **[`Schema`]**: attribute declarations with `Required` / `Optional` /
//!   `Computed` dispositions, plus conformance checking of lifted trees.
//! - **[`lift`]**: per-field conversion of presence-aware wire values into
//!   schema-conformant attribute trees.
//! - **[`read`]**: the `Idle → Fetching → Decoding → Lifting → Published | Failed`
//!   read machine with pagination and cancellation.
//! - **[`DataSource`] / [`Provider`]**: the host-facing contracts.
//! - **[`ApiClient`]**: the immutable, reference-shared upstream handle
//!   built once per `Configure`.

pub mod attr;
pub mod client;
pub mod config;
pub mod data_source;
pub mod diag;
pub mod error;
pub mod lift;
pub mod path;
pub mod provider;
pub mod read;
pub mod schema;

// ── Primary re-exports ──────────────────────────────────────────────
pub use attr::{Attr, AttributeValue, KnownValue};
pub use client::ApiClient;
pub use config::{ClientConfig, PagingConfig, TlsVerification};
pub use data_source::{
    DataSource, DataSourceFactory, ManufacturerListing, ManufacturersDataSource,
};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::CoreError;
pub use lift::{Lift, LiftError};
pub use path::AttributePath;
pub use provider::{
    ConfigureResponse, HostConfig, Provider, ProviderMetadata, Resource, ResourceFactory,
};
pub use read::{Listing, ReadPhase, ReadRequest, ReadResponse, read_list};
pub use schema::{AttrType, Attribute, Disposition, NullPolicy, ObjectSchema, Schema};
