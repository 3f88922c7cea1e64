use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::gateway::{DispatchOutcome, ProjectSnapshot, WorkflowTrigger};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::project::Project;
use crate::models::proposal::{self, AutomationStatus, Proposal};
use crate::models::{entry, file};

/// Retries when a concurrent generation stole the version slot between the
/// counter read and the insert.
const VERSION_RETRY_ATTEMPTS: u32 = 3;

/// Create the next proposal version for a project and kick off automated
/// content generation.
///
/// Returns as soon as the draft row exists, with `automation_status` still
/// `pending`. The workflow dispatch runs detached; its outcome is only ever
/// visible through later reads of the proposal.
pub async fn generate(
    pool: &DbPool,
    trigger: Arc<dyn WorkflowTrigger>,
    project: &Project,
) -> Result<Proposal, AppError> {
    let entries = entry::find_all_for_project(pool, project.id).await?;
    let files = file::find_all_for_project(pool, project.id).await?;
    let snapshot = ProjectSnapshot {
        project: project.clone(),
        entries,
        files,
        generated_at: Utc::now(),
    };

    let proposal = insert_next_version(pool, project).await?;
    log::info!(
        "Created proposal {} (v{}) for project {}",
        proposal.id,
        proposal.version,
        project.id
    );

    spawn_dispatch(pool.clone(), trigger, project.id, proposal.id, snapshot);

    Ok(proposal)
}

/// Allocate a version and insert the draft, retrying on version conflicts.
/// Versions only ever move forward; a lost race re-reads the counter.
async fn insert_next_version(pool: &DbPool, project: &Project) -> Result<Proposal, AppError> {
    let mut attempts = 0;
    loop {
        let version = proposal::next_version(pool, project.id).await?;
        let title = format!("{} - Proposal v{}", project.name, version);

        match proposal::create(pool, project.id, &project.user_id, version, &title).await {
            Ok(proposal) => return Ok(proposal),
            Err(err) if proposal::is_version_conflict(&err) && attempts < VERSION_RETRY_ATTEMPTS => {
                attempts += 1;
                log::warn!(
                    "Version {version} of project {} taken by a concurrent writer, retrying",
                    project.id
                );
            }
            Err(err) => return Err(err),
        }
    }
}

/// Fire-and-forget half of generation. Every failure in here is recorded on
/// the proposal row; the HTTP response that created the proposal has already
/// gone out.
fn spawn_dispatch(
    pool: DbPool,
    trigger: Arc<dyn WorkflowTrigger>,
    project_id: Uuid,
    proposal_id: Uuid,
    snapshot: ProjectSnapshot,
) {
    tokio::spawn(async move {
        if let Err(err) = run_dispatch(&pool, trigger.as_ref(), project_id, proposal_id, &snapshot).await
        {
            log::error!("Workflow dispatch for proposal {proposal_id} failed: {err}");
            if let Err(mark_err) = proposal::mark_failed(&pool, proposal_id, &err.to_string()).await
            {
                // The row keeps saying processing; surfacing that is all we can do.
                log::error!(
                    "Could not record dispatch failure on proposal {proposal_id}: {mark_err}"
                );
            }
        }
    });
}

async fn run_dispatch(
    pool: &DbPool,
    trigger: &dyn WorkflowTrigger,
    project_id: Uuid,
    proposal_id: Uuid,
    snapshot: &ProjectSnapshot,
) -> Result<(), AppError> {
    proposal::set_automation_status(pool, proposal_id, AutomationStatus::Processing).await?;

    match trigger.trigger_workflow(project_id, proposal_id, snapshot).await? {
        DispatchOutcome::Triggered => {
            log::debug!("Proposal {proposal_id} awaiting automation callback");
        }
        DispatchOutcome::Skipped => {
            // No secret configured. The proposal stays in processing; there
            // is no callback coming to finish it.
        }
    }
    Ok(())
}
