use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::proposal::Proposal;

#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status(u16),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "HTTP error: {e}"),
            FetchError::Status(code) => write!(f, "Server returned status {code}"),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(e)
    }
}

/// Source the poller refreshes the proposal list from.
#[async_trait]
pub trait ProposalFetcher: Send + Sync {
    async fn list_proposals(&self, project_id: Uuid) -> Result<Vec<Proposal>, FetchError>;
}

/// Timing knobs. The defaults match production behavior; tests inject
/// millisecond-scale values.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed delay between full re-fetches while something is in flight.
    pub interval: Duration,
    /// Delay before the one-shot refresh after a creation, sized to catch
    /// the pending -> processing flip.
    pub creation_refresh_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            interval: Duration::from_secs(30),
            creation_refresh_delay: Duration::from_secs(2),
        }
    }
}

struct PollerInner {
    fetcher: Arc<dyn ProposalFetcher>,
    project_id: Uuid,
    proposals: RwLock<Vec<Proposal>>,
}

#[derive(Default)]
struct Tasks {
    interval: Option<JoinHandle<()>>,
    refresh: Option<JoinHandle<()>>,
}

/// Client-side refresh loop for one project's proposal list.
///
/// Polls only while at least one local proposal is non-terminal and stands
/// down as soon as everything settled; a project with nothing in flight is
/// never polled at all. Dropping the poller aborts its tasks.
///
/// Must be created inside a tokio runtime.
pub struct ProposalPoller {
    inner: Arc<PollerInner>,
    config: PollerConfig,
    tasks: Mutex<Tasks>,
}

impl ProposalPoller {
    pub fn new(
        fetcher: Arc<dyn ProposalFetcher>,
        project_id: Uuid,
        initial: Vec<Proposal>,
    ) -> Self {
        Self::with_config(fetcher, project_id, initial, PollerConfig::default())
    }

    pub fn with_config(
        fetcher: Arc<dyn ProposalFetcher>,
        project_id: Uuid,
        initial: Vec<Proposal>,
        config: PollerConfig,
    ) -> Self {
        let poller = ProposalPoller {
            inner: Arc::new(PollerInner {
                fetcher,
                project_id,
                proposals: RwLock::new(initial),
            }),
            config,
            tasks: Mutex::new(Tasks::default()),
        };
        poller.ensure_polling();
        poller
    }

    /// Current local view of the list.
    pub fn snapshot(&self) -> Vec<Proposal> {
        self.inner.proposals.read().unwrap().clone()
    }

    /// Whether the interval loop is live right now.
    pub fn is_polling(&self) -> bool {
        let tasks = self.tasks.lock().unwrap();
        tasks
            .interval
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Record a proposal created through this client: it goes to the front
    /// of the list, a one-shot early refresh is scheduled to catch its first
    /// status flip, and interval polling resumes if it had stood down.
    pub fn track_created(&self, proposal: Proposal) {
        {
            let mut proposals = self.inner.proposals.write().unwrap();
            proposals.insert(0, proposal);
        }

        let inner = Arc::clone(&self.inner);
        let delay = self.config.creation_refresh_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            refresh(&inner).await;
        });

        {
            let mut tasks = self.tasks.lock().unwrap();
            if let Some(stale) = tasks.refresh.replace(handle) {
                stale.abort();
            }
        }

        self.ensure_polling();
    }

    /// Start the interval loop unless it is already live or nothing in the
    /// local list needs watching.
    fn ensure_polling(&self) {
        let mut tasks = self.tasks.lock().unwrap();
        let running = tasks
            .interval
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        if running {
            return;
        }

        let watching = {
            let proposals = self.inner.proposals.read().unwrap();
            has_unsettled(&proposals)
        };
        if !watching {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let period = self.config.interval;
        tasks.interval = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately; consume it so the first
            // re-fetch happens one full period after activation.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !refresh(&inner).await {
                    break;
                }
            }
        }));
    }

    pub fn stop(&self) {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(handle) = tasks.interval.take() {
            handle.abort();
        }
        if let Some(handle) = tasks.refresh.take() {
            handle.abort();
        }
    }
}

impl Drop for ProposalPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One fetch-and-merge pass. Returns whether polling should continue.
async fn refresh(inner: &PollerInner) -> bool {
    match inner.fetcher.list_proposals(inner.project_id).await {
        Ok(latest) => {
            let mut proposals = inner.proposals.write().unwrap();
            merge_by_id(&mut proposals, latest);
            has_unsettled(&proposals)
        }
        Err(err) => {
            // Transient by assumption; the next tick tries again.
            log::error!("Proposal poll failed: {err}");
            true
        }
    }
}

/// Replace local records the server returned fresh copies of. Local records
/// missing from the response are left untouched, and response records with
/// no local counterpart are ignored.
fn merge_by_id(local: &mut Vec<Proposal>, fetched: Vec<Proposal>) {
    let mut by_id: HashMap<Uuid, Proposal> =
        fetched.into_iter().map(|p| (p.id, p)).collect();
    for slot in local.iter_mut() {
        if let Some(update) = by_id.remove(&slot.id) {
            *slot = update;
        }
    }
}

fn has_unsettled(proposals: &[Proposal]) -> bool {
    proposals
        .iter()
        .any(|p| !p.automation_status.is_terminal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::proposal::{AutomationStatus, ProposalStatus};
    use chrono::Utc;

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

    #[test]
    fn merge_replaces_matching_records_only() {
        let mut local = vec![
            proposal(2, AutomationStatus::Processing),
            proposal(1, AutomationStatus::Completed),
        ];
        let mut updated = local[0].clone();
        updated.automation_status = AutomationStatus::Completed;

        let unknown = proposal(9, AutomationStatus::Processing);
        merge_by_id(&mut local, vec![updated, unknown.clone()]);

        assert_eq!(local.len(), 2);
        assert_eq!(local[0].automation_status, AutomationStatus::Completed);
        assert!(local.iter().all(|p| p.id != unknown.id));
    }

    #[test]
    fn unsettled_means_any_non_terminal() {
        assert!(!has_unsettled(&[]));
        assert!(!has_unsettled(&[proposal(1, AutomationStatus::Completed)]));
        assert!(!has_unsettled(&[proposal(1, AutomationStatus::Failed)]));
        assert!(has_unsettled(&[
            proposal(1, AutomationStatus::Completed),
            proposal(2, AutomationStatus::Pending),
        ]));
        assert!(has_unsettled(&[proposal(1, AutomationStatus::Processing)]));
    }
}
