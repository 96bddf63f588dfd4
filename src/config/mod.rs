//! Configuration module for auditlog
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence (paging limits, log level)

pub mod paths;
pub mod settings;

pub use paths::AuditPaths;
pub use settings::Settings;
