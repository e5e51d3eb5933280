//! Dependent Record Purge
//!
//! Deletes every row a captain owns, table by table, before the auth account
//! goes. Failures are logged and recorded but never stop the sequence: the
//! auth account is deleted either way, and the report shows which tables may
//! still hold orphaned rows.

use plank_common::{DependentTable, UserId};

use crate::upstream::PrivilegedStoreClient;

/// Outcome of a single table delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The store accepted the delete (zero rows counts).
    Completed,
    /// The store call failed; rows may remain.
    Failed(String),
}

/// One entry of the purge ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeStep {
    pub table: DependentTable,
    pub outcome: StepOutcome,
}

/// Ledger of a purge run, in the order the deletes were issued.
#[derive(Debug, Clone)]
pub struct PurgeReport {
    pub user_id: UserId,
    pub steps: Vec<PurgeStep>,
}

impl PurgeReport {
    /// Tables whose delete went through.
    pub fn completed(&self) -> impl Iterator<Item = DependentTable> + '_ {
        self.steps
            .iter()
            .filter(|step| step.outcome == StepOutcome::Completed)
            .map(|step| step.table)
    }

    /// Tables whose delete failed.
    pub fn failed(&self) -> impl Iterator<Item = DependentTable> + '_ {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, StepOutcome::Failed(_)))
            .map(|step| step.table)
    }

    /// Whether every table delete went through.
    pub fn is_clean(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Emit one summary line for the run.
    pub fn log(&self) {
        let completed: Vec<&str> = self.completed().map(DependentTable::table).collect();
        let failed: Vec<&str> = self.failed().map(DependentTable::table).collect();

        if failed.is_empty() {
            tracing::info!(
                user_id = %self.user_id,
                tables = completed.len(),
                "Dependent records purged"
            );
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                completed = ?completed,
                failed = ?failed,
                "Dependent records partially purged, rows may be orphaned"
            );
        }
    }
}

/// Delete the captain's rows from every dependent table, in
/// [`DependentTable::PURGE_ORDER`], one call at a time.
pub async fn purge_dependent_records(
    store: &dyn PrivilegedStoreClient,
    user_id: &UserId,
) -> PurgeReport {
    let mut steps = Vec::with_capacity(DependentTable::PURGE_ORDER.len());

    for table in DependentTable::PURGE_ORDER {
        let outcome = match store.delete_where(table, user_id).await {
            Ok(()) => {
                tracing::debug!(user_id = %user_id, table = table.table(), "Deleted owned rows");
                StepOutcome::Completed
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    table = table.table(),
                    error = %e,
                    "Failed to delete owned rows during account deletion"
                );
                StepOutcome::Failed(e.to_string())
            }
        };

        steps.push(PurgeStep { table, outcome });
    }

    PurgeReport {
        user_id: user_id.clone(),
        steps,
    }
}
