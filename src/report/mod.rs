//! Digest rendering and delivery.

mod render;
mod smtp;

pub use render::DigestRenderer;
pub use smtp::EmailReporter;

use std::future::Future;
use std::pin::Pin;

use crate::core::{DigestError, PurchaseRecord};

pub type DeliverFuture<'a> = Pin<Box<dyn Future<Output = Result<(), DigestError>> + Send + 'a>>;

/// Consumer of the final record set.
///
/// Rendering never filters or reorders; records arrive already ranked.
pub trait Reporter: Send + Sync {
    /// Format `records` for delivery. An empty slice renders a "nothing found" digest.
    fn render(&self, records: &[PurchaseRecord], label: &str) -> String;

    /// Send rendered content; `label` names the run (e.g. `October 18, 2026`).
    fn deliver<'a>(&'a self, content: &'a str, label: &'a str) -> DeliverFuture<'a>;
}
