//! Reference host for monitored collections
//!
//! An in-memory document collection with MongoDB-style modifiers, for tests
//! and for embedders that have no database of their own.

pub mod collection;
pub mod modifier;

pub use collection::Collection;
pub use modifier::apply_modifier;
