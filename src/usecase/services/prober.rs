use std::sync::Arc;

use thiserror::Error;

use crate::domain::entities::owner::{OwnerMap, ProbeState};
use crate::domain::entities::query::RowsQuery;
use crate::domain::entities::table::TableName;
use crate::usecase::ports::backend::{BackendError, TableBackend, STATUS_UNPROCESSABLE};

pub const DEFAULT_COLLABORATOR_TABLE: &str = "users";
pub const DEFAULT_PROBE_PAGE_SIZES: [u32; 6] = [2000, 1000, 500, 200, 100, 50];
const EXHAUSTED: &str = "no successful response";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("owner resolution is already running")]
    AlreadyRunning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub state: ProbeState,
    pub owners: Option<OwnerMap>,
}

/// Bulk-loads the collaborator table at the largest page size the backend accepts.
pub struct OwnerProber {
    backend: Arc<dyn TableBackend>,
    collaborator: TableName,
    page_sizes: Vec<u32>,
}

impl OwnerProber {
    #[cfg(test)]
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self::with_candidates(
            backend,
            TableName::from(DEFAULT_COLLABORATOR_TABLE),
            DEFAULT_PROBE_PAGE_SIZES.to_vec(),
        )
    }

    /// `page_sizes` must be strictly decreasing; config validation enforces it.
    pub fn with_candidates(
        backend: Arc<dyn TableBackend>,
        collaborator: TableName,
        page_sizes: Vec<u32>,
    ) -> Self {
        Self {
            backend,
            collaborator,
            page_sizes,
        }
    }

    /// Tries each candidate page size in turn. 422 and status-less failures
    /// move on to the next smaller size; any other HTTP status aborts.
    /// `on_progress` sees every intermediate state.
    pub async fn probe<F>(&self, known_tables: &[TableName], mut on_progress: F) -> ProbeOutcome
    where
        F: FnMut(&ProbeState),
    {
        if !known_tables.contains(&self.collaborator) {
            let reason = format!(
                "table '{}' is not exposed by the backend",
                self.collaborator
            );
            tracing::warn!(table = %self.collaborator, "owner probe skipped: {reason}");
            return ProbeOutcome {
                state: ProbeState::failed(None, reason, None),
                owners: None,
            };
        }

        on_progress(&ProbeState::loading());

        for &page_size in &self.page_sizes {
            let query = RowsQuery::page_of(1, page_size);
            match self.backend.get_rows(&self.collaborator, &query).await {
                Ok(page) => {
                    let owners = OwnerMap::from_rows(&page.rows);
                    tracing::info!(
                        page_size,
                        rows = page.rows.len(),
                        owners = owners.len(),
                        "owner probe succeeded"
                    );
                    return ProbeOutcome {
                        state: ProbeState::loaded(page_size, page.rows.len(), &owners),
                        owners: Some(owners),
                    };
                }
                Err(err) if is_retryable(&err) => {
                    tracing::debug!(page_size, error = %err, "page size rejected, trying smaller");
                    on_progress(&ProbeState::retrying(page_size));
                }
                Err(err) => {
                    tracing::warn!(page_size, error = %err, "owner probe aborted");
                    return ProbeOutcome {
                        state: ProbeState::failed(Some(page_size), err.to_string(), err.status()),
                        owners: None,
                    };
                }
            }
        }

        tracing::warn!("owner probe exhausted every page size");
        ProbeOutcome {
            state: ProbeState::failed(self.page_sizes.last().copied(), EXHAUSTED.to_string(), None),
            owners: None,
        }
    }
}

fn is_retryable(err: &BackendError) -> bool {
    match err.status() {
        None => true,
        Some(status) => status == STATUS_UNPROCESSABLE,
    }
}

/// Owner map plus probe diagnostics for one open view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerDirectory {
    owners: OwnerMap,
    state: ProbeState,
}

impl OwnerDirectory {
    pub fn owners(&self) -> &OwnerMap {
        &self.owners
    }

    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    pub fn try_begin(&mut self) -> Result<(), ProbeError> {
        if self.state.is_loading() {
            return Err(ProbeError::AlreadyRunning);
        }
        self.state = ProbeState::loading();
        Ok(())
    }

    pub fn observe(&mut self, progress: &ProbeState) {
        self.state = progress.clone();
    }

    /// A failed probe keeps the last good owner map.
    pub fn finish(&mut self, outcome: ProbeOutcome) {
        if let Some(owners) = outcome.owners {
            self.owners = owners;
        }
        self.state = outcome.state;
    }
}
