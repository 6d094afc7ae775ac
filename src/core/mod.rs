//! Core components of the `insider-digest` pipeline.
//!
//! This module contains the foundational building blocks, including:
//! - The paced HTTP [`FilingClient`] and its builder.
//! - The primary [`DigestError`] type.
//! - The run [`Config`].
//! - Shared data models like [`PurchaseRecord`] and [`DocumentHandle`].

/// The HTTP client (`FilingClient`), builder and request pacing.
pub mod client;
/// Run configuration read from the environment.
pub mod config;
/// The primary error type (`DigestError`) for the crate.
pub mod error;
/// Shared data models used across the pipeline stages.
pub mod models;
/// Lookback window and date helpers.
pub mod window;

#[cfg(feature = "test-mode")]
pub(crate) mod fixtures;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::FilingClient`
pub use client::{FilingClient, FilingClientBuilder};
pub use config::{Config, SourceKind};
pub use error::DigestError;
pub use models::{
    Accession, DocumentHandle, DocumentShape, FilingReference, Insider, Issuer, Provenance,
    PurchaseLine, PurchaseRecord, Resolved,
};
pub use window::LookbackWindow;
