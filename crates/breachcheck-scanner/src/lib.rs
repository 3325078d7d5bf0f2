//! Breachcheck Scanner - Batch exposure-check pipeline.
//!
//! This crate turns an uploaded list of email addresses into a per-email
//! exposure report by querying a remote breach lookup service. It handles
//! CSV ingestion, a polite request cadence, tolerant response classification
//! and partial failure: only unparseable input aborts a batch.
//!
//! # Pipeline
//!
//! ```text
//! raw bytes → RecordParser → candidate emails
//!                              ↓ (one at a time, in order)
//!          RateLimiter::throttle → LookupClient::lookup → classify
//!                              ↓
//!                         BatchReport
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use breachcheck_core::AppConfig;
//! use breachcheck_scanner::{BatchRunner, HttpLookupClient, RateLimiter};
//! use std::sync::Arc;
//!
//! let config = AppConfig::default();
//! let client = HttpLookupClient::new(&config.lookup)?;
//! let runner = BatchRunner::new(Arc::new(client), RateLimiter::new(config.throttle.interval()));
//!
//! let report = runner.run(b"alice@example.com\nbob@example.com\n").await;
//! println!("{:?}", report.summary());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod classifier;
pub mod error;
pub mod lookup;
#[allow(missing_docs)]
pub mod parser;
pub mod runner;
#[allow(missing_docs)]
pub mod throttle;

// Re-export commonly used types
pub use classifier::{classify, Exposure, ExposureResponse};
pub use error::{IngestionError, LookupError, Result};
pub use lookup::{HttpLookupClient, LookupClient, LookupOutcome};
pub use parser::{InputRecord, RecordParser};
pub use runner::BatchRunner;
pub use throttle::RateLimiter;

// Re-exported for callers of `BatchRunner::run_with_cancellation`
pub use tokio_util::sync::CancellationToken;
