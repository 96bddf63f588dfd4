//! Service layer for auditlog
//!
//! Read-side services on top of the storage layer: argument validation,
//! access checks, paging, and live updates.

pub mod args;
pub mod feed;
pub mod query;

pub use args::PageArgs;
pub use feed::{Feed, Subscription};
pub use query::{QueryLimits, QueryService};
