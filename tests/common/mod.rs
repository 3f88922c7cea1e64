//! Shared test infrastructure for model and pipeline tests.
//!
//! This module provides common utilities for setting up test databases and
//! scripted automation doubles.
//!
//! # Test Database Setup
//! - `setup_test_db()` - Temp-file SQLite database with the full schema
//! - `seed_project()` / `seed_entry()` / `seed_file()` - Owned fixture rows
//!
//! # Automation Doubles
//! - `RecordingTrigger` - Scripted [`WorkflowTrigger`] that records every call

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use uuid::Uuid;

use propgen::automation::AutomationError;
use propgen::automation::gateway::{DispatchOutcome, ProjectSnapshot, WorkflowTrigger};
use propgen::db::{self, DbPool};
use propgen::models::entry::{self, CreateEntryData, Entry};
use propgen::models::file::{self, ProjectFile, RegisterFileData};
use propgen::models::project::{self, CreateProjectData, Project};
use propgen::models::proposal::{self, AutomationStatus, Proposal};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const TEST_USER: &str = "user-1";
pub const OTHER_USER: &str = "user-2";

// ============================================================================
// DATABASE SETUP
// ============================================================================

/// A migrated test database. The TempDir must stay alive for the pool to
/// remain valid, so it rides along in the struct.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Setup a test database with the full schema.
///
/// Creates a temporary SQLite database file and runs migrations. This is the
/// standard setup for all model-layer and pipeline tests.
pub async fn setup_test_db() -> TestDb {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");

    let pool = db::init_pool(&db_path).await.expect("Failed to open test DB");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    TestDb { pool, _dir: dir }
}

// ============================================================================
// SEED HELPERS
// ============================================================================

pub async fn seed_project(pool: &DbPool, user_id: &str, name: &str) -> Project {
    project::create(
        pool,
        user_id,
        &CreateProjectData {
            name: name.to_string(),
            description: Some("Seeded test project".to_string()),
            client_name: None,
            client_email: None,
        },
    )
    .await
    .expect("Failed to seed project")
}

pub async fn seed_entry(pool: &DbPool, project_id: Uuid, user_id: &str, title: &str) -> Entry {
    entry::create(
        pool,
        project_id,
        user_id,
        &CreateEntryData {
            title: title.to_string(),
            body: "Seeded entry body".to_string(),
            entry_type: None,
            metadata: None,
        },
    )
    .await
    .expect("Failed to seed entry")
}

pub async fn seed_file(pool: &DbPool, project_id: Uuid, user_id: &str, name: &str) -> ProjectFile {
    file::create(
        pool,
        project_id,
        user_id,
        &RegisterFileData {
            name: name.to_string(),
            original_name: None,
            file_type: None,
            mime_type: "application/pdf".to_string(),
            file_size: 1024,
            storage_path: format!("/uploads/{name}"),
            folder_path: None,
            tags: None,
            metadata: None,
        },
    )
    .await
    .expect("Failed to seed file")
}

/// A proposal sitting in `processing`, as if a workflow run were in flight.
pub async fn seed_processing_proposal(pool: &DbPool, project: &Project) -> Proposal {
    let version = proposal::next_version(pool, project.id)
        .await
        .expect("Failed to read version counter");
    let title = format!("{} - Proposal v{}", project.name, version);
    let created = proposal::create(pool, project.id, &project.user_id, version, &title)
        .await
        .expect("Failed to seed proposal");
    proposal::set_automation_status(pool, created.id, AutomationStatus::Processing)
        .await
        .expect("Failed to move proposal to processing");
    proposal::find_by_id(pool, created.id)
        .await
        .expect("Failed to re-read proposal")
        .expect("Seeded proposal vanished")
}

// ============================================================================
// AUTOMATION DOUBLES
// ============================================================================

/// What a [`RecordingTrigger`] does when invoked.
pub enum TriggerBehavior {
    /// Report success immediately.
    Succeed,
    /// Fail with the given upstream HTTP status.
    Fail(u16),
    /// Sleep for the duration, then report success.
    Slow(Duration),
    /// Report that nothing was dispatched.
    Skip,
}

/// One recorded `trigger_workflow` invocation.
pub struct TriggerCall {
    pub project_id: Uuid,
    pub proposal_id: Uuid,
    pub entry_count: usize,
    pub file_count: usize,
}

/// Scripted workflow trigger standing in for the HTTP gateway. Records every
/// call so tests can assert on the snapshot that was dispatched.
pub struct RecordingTrigger {
    behavior: TriggerBehavior,
    calls: Mutex<Vec<TriggerCall>>,
}

impl RecordingTrigger {
    pub fn succeed() -> Arc<Self> {
        Arc::new(RecordingTrigger {
            behavior: TriggerBehavior::Succeed,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn fail(status: u16) -> Arc<Self> {
        Arc::new(RecordingTrigger {
            behavior: TriggerBehavior::Fail(status),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(RecordingTrigger {
            behavior: TriggerBehavior::Slow(delay),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn skip() -> Arc<Self> {
        Arc::new(RecordingTrigger {
            behavior: TriggerBehavior::Skip,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Run `f` over the recorded calls.
    pub fn with_calls<T>(&self, f: impl FnOnce(&[TriggerCall]) -> T) -> T {
        f(&self.calls.lock().unwrap())
    }
}

#[async_trait]
impl WorkflowTrigger for RecordingTrigger {
    async fn trigger_workflow(
        &self,
        project_id: Uuid,
        proposal_id: Uuid,
        snapshot: &ProjectSnapshot,
    ) -> Result<DispatchOutcome, AutomationError> {
        self.calls.lock().unwrap().push(TriggerCall {
            project_id,
            proposal_id,
            entry_count: snapshot.entries.len(),
            file_count: snapshot.files.len(),
        });

        match &self.behavior {
            TriggerBehavior::Succeed => Ok(DispatchOutcome::Triggered),
            TriggerBehavior::Fail(status) => Err(AutomationError::Dispatch(*status)),
            TriggerBehavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(DispatchOutcome::Triggered)
            }
            TriggerBehavior::Skip => Ok(DispatchOutcome::Skipped),
        }
    }
}

// ============================================================================
// WAIT HELPERS
// ============================================================================

/// Poll the proposal until it reaches the wanted automation status.
///
/// Detached dispatch runs on its own task, so tests observe it the same way
/// clients do. Panics if the status is not reached within two seconds.
pub async fn wait_for_automation_status(
    pool: &DbPool,
    proposal_id: Uuid,
    status: AutomationStatus,
) -> Proposal {
    for _ in 0..80 {
        let found = proposal::find_by_id(pool, proposal_id)
            .await
            .expect("Failed to read proposal");
        if let Some(found) = found {
            if found.automation_status == status {
                return found;
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("Proposal {proposal_id} did not reach {status:?} within 2s");
}
