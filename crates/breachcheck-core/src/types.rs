//! Report types shared across breachcheck.
//!
//! This module defines the candidate email newtype, the closed set of
//! exposure states and the per-email report entries a batch produces.

use crate::error::BreachCheckError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque breach-source descriptor as returned by the lookup service.
///
/// The service does not guarantee a shape (names, objects with dates, ...),
/// so descriptors are carried through untouched.
pub type SourceDescriptor = serde_json::Value;

/// Newtype for a trimmed, non-empty email candidate.
///
/// No deliverability or syntax validation is applied beyond trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateEmail(String);

impl CandidateEmail {
    /// Create a new `CandidateEmail`, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns error if nothing remains after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, BreachCheckError> {
        Self::from_field(raw.as_ref()).ok_or_else(|| {
            BreachCheckError::Validation("email candidate is empty after trimming".to_string())
        })
    }

    /// Derive a candidate from a raw input field, `None` when blank.
    #[must_use]
    pub fn from_field(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verdict for a single email.
///
/// `Unknown` only ever means the lookup itself failed; a well-formed
/// "not found" answer is `Safe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureState {
    /// Service confirmed no known breaches
    Safe,
    /// Service reported at least one breach
    Breached,
    /// Exposure could not be determined
    Unknown,
}

impl ExposureState {
    /// Short lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Breached => "breached",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExposureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a lookup could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transport failure: connection refused, timeout, DNS
    Network,
    /// The service answered with a non-success status
    Http,
    /// The body could not be decoded as the expected structure
    MalformedResponse,
    /// Any other fault while handling the record
    Processing,
}

impl FailureKind {
    /// Whether the failure came from talking to the service (as opposed to
    /// handling what it sent back).
    #[must_use]
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Network | Self::Http)
    }

    /// Message prefix used in report entries.
    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.is_api_error() {
            "API error"
        } else {
            "Processing error"
        }
    }
}

/// One line of the batch report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// The email that was checked
    pub email: CandidateEmail,
    /// Exposure verdict
    pub state: ExposureState,
    /// Number of breaches reported (0 unless breached)
    pub breach_count: u64,
    /// Breach sources exactly as the service returned them
    pub sources: Vec<SourceDescriptor>,
    /// Human-readable summary
    pub message: String,
    /// Failure tag, set only when `state` is `Unknown`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl ReportEntry {
    /// Entry for an email with no known breaches.
    #[must_use]
    pub fn safe(email: CandidateEmail) -> Self {
        Self {
            email,
            state: ExposureState::Safe,
            breach_count: 0,
            sources: Vec::new(),
            message: "Safe — no breaches found".to_string(),
            failure: None,
        }
    }

    /// Entry for an email found in `breach_count` breaches.
    #[must_use]
    pub fn breached(
        email: CandidateEmail,
        breach_count: u64,
        sources: Vec<SourceDescriptor>,
    ) -> Self {
        Self {
            email,
            state: ExposureState::Breached,
            breach_count,
            sources,
            message: format!("Breached — {breach_count} breach(es)"),
            failure: None,
        }
    }

    /// Entry for an email whose lookup failed.
    #[must_use]
    pub fn unknown(email: CandidateEmail, kind: FailureKind, detail: &str) -> Self {
        Self {
            email,
            state: ExposureState::Unknown,
            breach_count: 0,
            sources: Vec::new(),
            message: format!("{}: {detail}", kind.label()),
            failure: Some(kind),
        }
    }
}

/// Counts per exposure state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total entries
    pub total: usize,
    /// Entries confirmed safe
    pub safe: usize,
    /// Entries confirmed breached
    pub breached: usize,
    /// Entries that could not be determined
    pub unknown: usize,
}

/// Ordered report of a whole batch run.
///
/// Entries are append-only and keep input order. When `ingestion_error`
/// is set the entry list is always empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    entries: Vec<ReportEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ingestion_error: Option<String>,
    #[serde(default)]
    cancelled: bool,
}

impl BatchReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report for input that could not be ingested at all.
    #[must_use]
    pub fn ingestion_failed(error: impl fmt::Display) -> Self {
        Self {
            entries: Vec::new(),
            ingestion_error: Some(error.to_string()),
            cancelled: false,
        }
    }

    /// Append an entry.
    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// Flag the run as stopped before all records were processed.
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Entries in input order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Top-level ingestion error, if the input could not be parsed.
    #[must_use]
    pub fn ingestion_error(&self) -> Option<&str> {
        self.ingestion_error.as_deref()
    }

    /// Whether the run was cancelled part way.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries per exposure state.
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        self.entries
            .iter()
            .fold(BatchSummary::default(), |mut summary, entry| {
                summary.total += 1;
                match entry.state {
                    ExposureState::Safe => summary.safe += 1,
                    ExposureState::Breached => summary.breached += 1,
                    ExposureState::Unknown => summary.unknown += 1,
                }
                summary
            })
    }
}
