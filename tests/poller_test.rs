//! Integration tests for the client-side proposal poller: activation rules,
//! settle-and-stand-down, early refresh after creation.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use propgen::client::poller::{FetchError, PollerConfig, ProposalFetcher, ProposalPoller};
use propgen::models::proposal::{AutomationStatus, Proposal, ProposalStatus};
use uuid::Uuid;

fn proposal(version: i64, automation_status: AutomationStatus) -> Proposal {
    let now = Utc::now();
    Proposal {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        user_id: "tester".to_string(),
        version,
        title: format!("Demo - Proposal v{version}"),
        content: serde_json::json!({}),
        status: ProposalStatus::Draft,
        automation_status,
        automation_data: None,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory stand-in for the HTTP API. Tests mutate the served list to play
/// the server side of the conversation.
struct ScriptedFetcher {
    served: Mutex<Vec<Proposal>>,
    calls: AtomicUsize,
    failures: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(served: Vec<Proposal>) -> Arc<Self> {
        Arc::new(ScriptedFetcher {
            served: Mutex::new(served),
            calls: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        })
    }

    fn serve(&self, proposals: Vec<Proposal>) {
        *self.served.lock().unwrap() = proposals;
    }

    fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fail the next `n` fetches with a 500.
    fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProposalFetcher for ScriptedFetcher {
    async fn list_proposals(&self, _project_id: Uuid) -> Result<Vec<Proposal>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(FetchError::Status(500));
        }
        Ok(self.served.lock().unwrap().clone())
    }
}

fn fast_config() -> PollerConfig {
    PollerConfig {
        interval: Duration::from_millis(40),
        creation_refresh_delay: Duration::from_millis(40),
    }
}

/// Wait until `check` passes, or panic after two seconds.
async fn wait_until(what: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..80 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("{what} not reached within 2s");
}

#[tokio::test]
async fn test_settled_list_is_never_polled() {
    let fetcher = ScriptedFetcher::new(Vec::new());
    let initial = vec![
        proposal(2, AutomationStatus::Completed),
        proposal(1, AutomationStatus::Failed),
    ];
    let poller = ProposalPoller::with_config(
        fetcher.clone(),
        Uuid::new_v4(),
        initial,
        fast_config(),
    );

    assert!(!poller.is_polling());
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(fetcher.fetch_count(), 0, "terminal-only list must not be polled");

    println!("[PASS] test_settled_list_is_never_polled");
}

#[tokio::test]
async fn test_empty_list_is_never_polled() {
    let fetcher = ScriptedFetcher::new(Vec::new());
    let poller =
        ProposalPoller::with_config(fetcher.clone(), Uuid::new_v4(), Vec::new(), fast_config());

    assert!(!poller.is_polling());
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(fetcher.fetch_count(), 0);

    println!("[PASS] test_empty_list_is_never_polled");
}

#[tokio::test]
async fn test_polls_until_list_settles() {
    let in_flight = proposal(1, AutomationStatus::Processing);
    let fetcher = ScriptedFetcher::new(vec![in_flight.clone()]);
    let poller = ProposalPoller::with_config(
        fetcher.clone(),
        in_flight.project_id,
        vec![in_flight.clone()],
        fast_config(),
    );
    assert!(poller.is_polling());

    // Let a few fetches of still-processing data go by
    wait_until("repeated polling", || fetcher.fetch_count() >= 2).await;

    // Server finishes the run; the poller merges it and stands down
    let mut finished = in_flight.clone();
    finished.automation_status = AutomationStatus::Completed;
    finished.content = serde_json::json!({ "link": "doc-1" });
    fetcher.serve(vec![finished]);

    wait_until("merged terminal state", || {
        poller
            .snapshot()
            .first()
            .is_some_and(|p| p.automation_status == AutomationStatus::Completed)
    })
    .await;
    wait_until("poller stand-down", || !poller.is_polling()).await;

    // Stand-down is real: the fetch count stops moving
    let settled_count = fetcher.fetch_count();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fetcher.fetch_count(), settled_count);

    let local = poller.snapshot();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].content["link"], "doc-1");

    println!("[PASS] test_polls_until_list_settles");
}

#[tokio::test]
async fn test_fetch_failures_do_not_stop_polling() {
    let in_flight = proposal(1, AutomationStatus::Processing);
    let fetcher = ScriptedFetcher::new(vec![in_flight.clone()]);
    fetcher.fail_next(2);

    let poller = ProposalPoller::with_config(
        fetcher.clone(),
        in_flight.project_id,
        vec![in_flight.clone()],
        fast_config(),
    );

    // Outlive the failures, then settle normally
    wait_until("retries past failures", || fetcher.fetch_count() >= 3).await;

    let mut finished = in_flight.clone();
    finished.automation_status = AutomationStatus::Failed;
    fetcher.serve(vec![finished]);

    wait_until("merged terminal state", || {
        poller
            .snapshot()
            .first()
            .is_some_and(|p| p.automation_status == AutomationStatus::Failed)
    })
    .await;

    println!("[PASS] test_fetch_failures_do_not_stop_polling");
}

#[tokio::test]
async fn test_created_proposal_is_refreshed_early() {
    let settled = proposal(1, AutomationStatus::Completed);
    let created = proposal(2, AutomationStatus::Pending);

    // The server has already moved the new proposal on
    let mut server_copy = created.clone();
    server_copy.automation_status = AutomationStatus::Processing;
    let fetcher = ScriptedFetcher::new(vec![server_copy, settled.clone()]);

    // Interval far out of reach, so only the creation refresh can fetch
    let poller = ProposalPoller::with_config(
        fetcher.clone(),
        created.project_id,
        vec![settled],
        PollerConfig {
            interval: Duration::from_secs(600),
            creation_refresh_delay: Duration::from_millis(40),
        },
    );
    assert!(!poller.is_polling());
    assert_eq!(fetcher.fetch_count(), 0);

    poller.track_created(created.clone());

    // New proposal is visible immediately, at the front
    let local = poller.snapshot();
    assert_eq!(local.len(), 2);
    assert_eq!(local[0].id, created.id);
    assert_eq!(local[0].automation_status, AutomationStatus::Pending);

    // Creation also rearms the interval loop
    assert!(poller.is_polling());

    wait_until("early refresh", || {
        poller
            .snapshot()
            .first()
            .is_some_and(|p| p.automation_status == AutomationStatus::Processing)
    })
    .await;
    assert!(fetcher.fetch_count() >= 1);

    println!("[PASS] test_created_proposal_is_refreshed_early");
}

#[tokio::test]
async fn test_dropped_poller_stops_fetching() {
    let in_flight = proposal(1, AutomationStatus::Processing);
    let fetcher = ScriptedFetcher::new(vec![in_flight.clone()]);
    let poller = ProposalPoller::with_config(
        fetcher.clone(),
        in_flight.project_id,
        vec![in_flight],
        fast_config(),
    );

    wait_until("polling underway", || fetcher.fetch_count() >= 2).await;

    drop(poller);
    let count_after_drop = fetcher.fetch_count();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fetcher.fetch_count(), count_after_drop);

    println!("[PASS] test_dropped_poller_stops_fetching");
}
