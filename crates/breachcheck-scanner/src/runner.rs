//! Batch runner for exposure checks.
//!
//! This module provides the `BatchRunner` which drives one throttled lookup
//! per candidate email, strictly in input order, and folds every outcome
//! (including failures) into a `BatchReport`.

use crate::lookup::{LookupClient, LookupOutcome};
use crate::parser::{InputRecord, RecordParser};
use crate::throttle::RateLimiter;
use breachcheck_core::{BatchReport, CandidateEmail, FailureKind, ReportEntry};
use std::sync::Arc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Runs a whole batch: parse, then for each candidate throttle, look up and classify.
///
/// Each run is independent: the rate limiter history starts empty every time.
pub struct BatchRunner {
    /// Lookup service client
    client: Arc<dyn LookupClient>,
    /// Template limiter; every run uses a fresh copy
    rate_limiter: RateLimiter,
    /// Input decoder
    parser: RecordParser,
}

impl BatchRunner {
    /// Create a new batch runner.
    #[must_use]
    pub fn new(client: Arc<dyn LookupClient>, rate_limiter: RateLimiter) -> Self {
        Self {
            client,
            rate_limiter,
            parser: RecordParser::new(),
        }
    }

    /// Use a differently configured parser.
    #[must_use]
    pub fn with_parser(mut self, parser: RecordParser) -> Self {
        self.parser = parser;
        self
    }

    /// Run a batch to completion.
    pub async fn run(&self, input: &[u8]) -> BatchReport {
        self.run_with_cancellation(input, &CancellationToken::new())
            .await
    }

    /// Run a batch, stopping early if `cancel` fires.
    ///
    /// Cancellation is observed while throttling and while a lookup is in
    /// flight. Entries collected before that point are kept and the report
    /// is flagged as cancelled.
    pub async fn run_with_cancellation(
        &self,
        input: &[u8],
        cancel: &CancellationToken,
    ) -> BatchReport {
        let records = match self.parser.parse(input) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Input could not be ingested: {}", e);
                return BatchReport::ingestion_failed(e);
            }
        };

        let candidates: Vec<CandidateEmail> =
            records.iter().filter_map(InputRecord::candidate).collect();

        let total = candidates.len();
        tracing::info!(
            "Checking {} candidate emails ({} rows read)",
            total,
            records.len()
        );

        let mut limiter = self.rate_limiter.fresh();
        let mut report = BatchReport::new();

        for email in candidates {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    report.mark_cancelled();
                    break;
                }
                () = limiter.throttle() => {}
            }

            let client = Arc::clone(&self.client);
            let lookup_email = email.clone();
            let mut task = tokio::spawn(async move { client.lookup(&lookup_email).await });

            let joined = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    task.abort();
                    report.mark_cancelled();
                    break;
                }
                joined = &mut task => joined,
            };

            report.push(Self::to_entry(email, joined));
        }

        let summary = report.summary();
        if report.is_cancelled() {
            tracing::warn!(
                "Batch cancelled after {} of {} lookups",
                summary.total,
                total
            );
        }
        tracing::info!(
            "Batch finished: {} safe, {} breached, {} unknown",
            summary.safe,
            summary.breached,
            summary.unknown
        );

        report
    }

    /// Turn one lookup result into a report entry. Never fails.
    fn to_entry(email: CandidateEmail, joined: Result<LookupOutcome, JoinError>) -> ReportEntry {
        match joined {
            Ok(Ok(exposure)) => {
                tracing::debug!("{}: {}", email, exposure.state());
                exposure.into_entry(email)
            }
            Ok(Err(e)) => {
                tracing::warn!("Lookup failed for row: {}", e);
                ReportEntry::unknown(email, e.kind(), &e.to_string())
            }
            Err(e) => {
                tracing::warn!("Lookup task failed: {}", e);
                ReportEntry::unknown(
                    email,
                    FailureKind::Processing,
                    &format!("lookup task failed: {e}"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Exposure;
    use crate::error::LookupError;
    use breachcheck_core::ExposureState;

    fn email(s: &str) -> CandidateEmail {
        CandidateEmail::new(s).expect("valid candidate")
    }

    #[test]
    fn test_to_entry_success() {
        let outcome = Ok(Ok(Exposure {
            exposed: true,
            breach_count: 2,
            sources: vec![serde_json::json!("a"), serde_json::json!("b")],
        }));
        let entry = BatchRunner::to_entry(email("a@example.com"), outcome);
        assert_eq!(entry.state, ExposureState::Breached);
        assert_eq!(entry.breach_count, 2);
    }

    #[test]
    fn test_to_entry_tags_failures() {
        let outcome = Ok(Err(LookupError::Http {
            status: 503,
            body: "unavailable".to_string(),
        }));
        let entry = BatchRunner::to_entry(email("a@example.com"), outcome);
        assert_eq!(entry.state, ExposureState::Unknown);
        assert_eq!(entry.failure, Some(FailureKind::Http));
        assert_eq!(entry.message, "API error: HTTP 503: unavailable");

        let outcome = Ok(Err(LookupError::MalformedResponse {
            detail: "expected a JSON object, got an array".to_string(),
        }));
        let entry = BatchRunner::to_entry(email("a@example.com"), outcome);
        assert_eq!(entry.failure, Some(FailureKind::MalformedResponse));
        assert!(entry.message.starts_with("Processing error: "));
    }
}
