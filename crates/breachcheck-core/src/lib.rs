//! Breachcheck Core - Foundation crate for the breachcheck exposure checker.
//!
//! This crate provides the shared report vocabulary, error handling and
//! configuration management that the scanner and the driver binary depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Report types (`CandidateEmail`, `ExposureState`, `ReportEntry`, `BatchReport`)
//!
//! # Example
//!
//! ```rust
//! use breachcheck_core::{AppConfig, CandidateEmail};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.lookup.timeout_secs, 10);
//!
//! let email = CandidateEmail::from_field("  alice@example.com ").expect("non-empty");
//! assert_eq!(email.as_str(), "alice@example.com");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, LookupConfig, ThrottleConfig};
pub use error::{BreachCheckError, ConfigError, ConfigResult, Result};
pub use types::{
    BatchReport, BatchSummary, CandidateEmail, ExposureState, FailureKind, ReportEntry,
    SourceDescriptor,
};
