use async_trait::async_trait;
use breachcheck_core::{BatchReport, CandidateEmail, ExposureState, FailureKind};
use breachcheck_scanner::{
    classify, BatchRunner, CancellationToken, ExposureResponse, LookupClient, LookupError,
    LookupOutcome, RateLimiter,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Canned behaviour for one email address
#[derive(Debug, Clone)]
enum Canned {
    Body(&'static str),
    Timeout,
    Status(u16),
    Panic,
    CancelThenBody(&'static str),
}

/// Lookup client that replays canned outcomes and records every call
struct StubLookupClient {
    canned: HashMap<String, Canned>,
    calls: Mutex<Vec<(String, Instant)>>,
    cancel: CancellationToken,
}

impl StubLookupClient {
    fn new(canned: &[(&str, Canned)]) -> Self {
        Self {
            canned: canned
                .iter()
                .map(|(email, c)| ((*email).to_string(), c.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
            cancel: CancellationToken::new(),
        }
    }

    fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn called_emails(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("lock calls")
            .iter()
            .map(|(email, _)| email.clone())
            .collect()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .expect("lock calls")
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl LookupClient for StubLookupClient {
    async fn lookup(&self, email: &CandidateEmail) -> LookupOutcome {
        self.calls
            .lock()
            .expect("lock calls")
            .push((email.as_str().to_string(), Instant::now()));

        let canned = self
            .canned
            .get(email.as_str())
            .cloned()
            .unwrap_or(Canned::Body(r#"{"found": 0}"#));

        match canned {
            Canned::Body(body) => Ok(classify(&ExposureResponse::from_json(body)?)),
            Canned::Timeout => Err(LookupError::Network {
                detail: "operation timed out".to_string(),
            }),
            Canned::Status(status) => Err(LookupError::Http {
                status,
                body: "upstream unavailable".to_string(),
            }),
            Canned::Panic => panic!("stub lookup blew up"),
            Canned::CancelThenBody(body) => {
                self.cancel.cancel();
                Ok(classify(&ExposureResponse::from_json(body)?))
            }
        }
    }
}

fn runner(client: &Arc<StubLookupClient>, interval: Duration) -> BatchRunner {
    BatchRunner::new(client.clone(), RateLimiter::new(interval))
}

fn emails(report: &BatchReport) -> Vec<&str> {
    report.entries().iter().map(|e| e.email.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_order_preserved_and_blank_candidates_skipped() {
    let client = Arc::new(StubLookupClient::new(&[]));
    let input = b"a@example.com\n   \n,only-second-column\n b@example.com \na@example.com\n";

    let report = runner(&client, Duration::from_secs(1)).run(input).await;

    assert!(report.ingestion_error().is_none());
    // No deduplication, no reordering
    assert_eq!(
        emails(&report),
        vec!["a@example.com", "b@example.com", "a@example.com"]
    );
    assert_eq!(
        client.called_emails(),
        vec!["a@example.com", "b@example.com", "a@example.com"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_classification_flows_into_entries() {
    let client = Arc::new(StubLookupClient::new(&[
        (
            "safe@example.com",
            Canned::Body(r#"{"found": 0, "sources": ["ignored"]}"#),
        ),
        (
            "pwned@example.com",
            Canned::Body(r#"{"found": 3, "sources": ["a", "b", "c"]}"#),
        ),
    ]));

    let report = runner(&client, Duration::from_secs(1))
        .run(b"safe@example.com\npwned@example.com\n")
        .await;

    let safe = &report.entries()[0];
    assert_eq!(safe.state, ExposureState::Safe);
    assert_eq!(safe.breach_count, 0);
    assert!(safe.sources.is_empty());
    assert_eq!(safe.message, "Safe — no breaches found");

    let pwned = &report.entries()[1];
    assert_eq!(pwned.state, ExposureState::Breached);
    assert_eq!(pwned.breach_count, 3);
    assert_eq!(pwned.sources.len(), 3);
    assert_eq!(pwned.message, "Breached — 3 breach(es)");
}

#[tokio::test(start_paused = true)]
async fn test_per_record_failures_do_not_abort_batch() {
    let client = Arc::new(StubLookupClient::new(&[
        ("timeout@example.com", Canned::Timeout),
        ("down@example.com", Canned::Status(502)),
        ("garbled@example.com", Canned::Body("<html>oops</html>")),
        ("last@example.com", Canned::Body(r#"{"found": 1, "sources": ["x"]}"#)),
    ]));

    let report = runner(&client, Duration::from_secs(1))
        .run(b"timeout@example.com\ndown@example.com\ngarbled@example.com\nlast@example.com\n")
        .await;

    assert_eq!(report.len(), 4);

    let timeout = &report.entries()[0];
    assert_eq!(timeout.state, ExposureState::Unknown);
    assert_eq!(timeout.failure, Some(FailureKind::Network));
    assert!(timeout.message.starts_with("API error: "));
    assert!(timeout.message.contains("timed out"));

    let down = &report.entries()[1];
    assert_eq!(down.failure, Some(FailureKind::Http));
    assert!(down.message.contains("502"));

    let garbled = &report.entries()[2];
    assert_eq!(garbled.state, ExposureState::Unknown);
    assert_eq!(garbled.failure, Some(FailureKind::MalformedResponse));
    assert!(garbled.message.starts_with("Processing error: "));

    let last = &report.entries()[3];
    assert_eq!(last.state, ExposureState::Breached);
    assert_eq!(last.breach_count, 1);

    let summary = report.summary();
    assert_eq!(summary.unknown, 3);
    assert_eq!(summary.breached, 1);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_lookup_becomes_processing_error() {
    let client = Arc::new(StubLookupClient::new(&[
        ("boom@example.com", Canned::Panic),
        ("after@example.com", Canned::Body(r#"{"found": 0}"#)),
    ]));

    let report = runner(&client, Duration::from_secs(1))
        .run(b"boom@example.com\nafter@example.com\n")
        .await;

    assert_eq!(report.len(), 2);
    assert_eq!(report.entries()[0].state, ExposureState::Unknown);
    assert_eq!(report.entries()[0].failure, Some(FailureKind::Processing));
    assert_eq!(report.entries()[1].state, ExposureState::Safe);
}

#[tokio::test(start_paused = true)]
async fn test_unparseable_input_yields_ingestion_error() {
    let client = Arc::new(StubLookupClient::new(&[]));

    let report = runner(&client, Duration::from_secs(1))
        .run(&[0xc3, 0x28, b'\n'])
        .await;

    assert!(report.is_empty());
    assert!(report
        .ingestion_error()
        .is_some_and(|e| e.contains("UTF-8")));
    assert!(client.called_emails().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_yields_ingestion_error() {
    let client = Arc::new(StubLookupClient::new(&[]));

    let report = runner(&client, Duration::from_secs(1)).run(b"").await;

    assert!(report.is_empty());
    assert!(report.ingestion_error().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_lookups_respect_cadence() {
    let client = Arc::new(StubLookupClient::new(&[]));
    let start = Instant::now();

    runner(&client, Duration::from_secs(1))
        .run(b"a@example.com\n\n  \nb@example.com\nc@example.com\n")
        .await;

    let times = client.call_times();
    assert_eq!(times.len(), 3);
    // First lookup is not delayed
    assert_eq!(times[0] - start, Duration::ZERO);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(1));
    }
    // Blank rows did not add extra waits
    assert!(times[2] - start < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_each_run_starts_with_fresh_limiter() {
    let client = Arc::new(StubLookupClient::new(&[]));
    let runner = runner(&client, Duration::from_secs(5));

    runner.run(b"a@example.com\n").await;
    let second_start = Instant::now();
    runner.run(b"b@example.com\n").await;

    let times = client.call_times();
    assert_eq!(times[1] - second_start, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_rerun_produces_identical_report() {
    let canned = [
        ("a@example.com", Canned::Body(r#"{"found": 2, "sources": [{"name": "x"}, {"name": "y"}]}"#)),
        ("b@example.com", Canned::Timeout),
        ("c@example.com", Canned::Body(r#"{"found": 0}"#)),
    ];
    let input = b"a@example.com\nb@example.com\nc@example.com\n";

    let first_client = Arc::new(StubLookupClient::new(&canned));
    let first = runner(&first_client, Duration::from_secs(1)).run(input).await;

    let second_client = Arc::new(StubLookupClient::new(&canned));
    let second = runner(&second_client, Duration::from_secs(1)).run(input).await;

    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_lookup_keeps_collected_entries() {
    let cancel = CancellationToken::new();
    let client = Arc::new(
        StubLookupClient::new(&[("stop@example.com", Canned::CancelThenBody(r#"{"found": 0}"#))])
            .with_cancel(cancel.clone()),
    );

    let report = runner(&client, Duration::from_secs(1))
        .run_with_cancellation(b"a@example.com\nstop@example.com\nc@example.com\n", &cancel)
        .await;

    assert!(report.is_cancelled());
    assert_eq!(emails(&report), vec!["a@example.com"]);
    assert_eq!(
        client.called_emails(),
        vec!["a@example.com", "stop@example.com"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_throttle() {
    let cancel = CancellationToken::new();
    let client = Arc::new(StubLookupClient::new(&[]));

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let report = runner(&client, Duration::from_secs(10))
        .run_with_cancellation(b"a@example.com\nb@example.com\n", &cancel)
        .await;

    assert!(report.is_cancelled());
    assert_eq!(emails(&report), vec!["a@example.com"]);
    assert_eq!(client.called_emails(), vec!["a@example.com"]);
}

#[tokio::test]
async fn test_already_cancelled_token_does_no_work() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let client = Arc::new(StubLookupClient::new(&[]));

    let report = runner(&client, Duration::from_millis(10))
        .run_with_cancellation(b"a@example.com\n", &cancel)
        .await;

    assert!(report.is_cancelled());
    assert!(report.is_empty());
    assert!(report.ingestion_error().is_none());
    assert!(client.called_emails().is_empty());
}
