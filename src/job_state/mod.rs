//! The transactional job state machine.
//!
//! `JobStateStore` owns the five job column families and exposes the
//! lifecycle, query, and iteration APIs, split across submodules:
//!
//! - `lifecycle`: state transitions (`create`, `activate`, `fail`, ...)
//! - `queries`: point lookups (`exists`, `get_state`, `get_job`)
//! - `iterate`: ordered scans over the secondary indexes
//!
//! Every operation runs inside a transaction provided by the caller; the
//! five column families only ever change together, atomically. The store
//! itself holds no lock: one command processor per partition owns it.

mod iterate;
mod lifecycle;
mod queries;

use thiserror::Error;

use crate::codec::CodecError;
use crate::column_family::{ColumnFamilyHandle, ColumnFamilyId};
use crate::job::{JobRecord, JobRecordView, JobState};
use crate::keys::{self, KeyError};
use crate::metrics::JobMetrics;
use crate::notify::{JobsAvailableCallback, JobsAvailableNotifier};
use crate::store::{EngineError, StoreTransaction};

#[derive(Debug, Error)]
pub enum JobStateError {
    /// The operation was rejected before any mutation reached the
    /// transaction; the caller must not commit.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// The job state core of one partition.
pub struct JobStateStore {
    jobs: ColumnFamilyHandle,
    states: ColumnFamilyHandle,
    activatable: ColumnFamilyHandle,
    deadlines: ColumnFamilyHandle,
    backoff: ColumnFamilyHandle,
    notifier: JobsAvailableNotifier,
    metrics: JobMetrics,
}

impl JobStateStore {
    pub fn new(metrics: JobMetrics) -> Self {
        Self {
            jobs: ColumnFamilyHandle::new(ColumnFamilyId::Jobs),
            states: ColumnFamilyHandle::new(ColumnFamilyId::JobStates),
            activatable: ColumnFamilyHandle::new(ColumnFamilyId::JobActivatable),
            deadlines: ColumnFamilyHandle::new(ColumnFamilyId::JobDeadlines),
            backoff: ColumnFamilyHandle::new(ColumnFamilyId::JobBackoff),
            notifier: JobsAvailableNotifier::new(),
            metrics,
        }
    }

    /// Register the single jobs-available listener. Only the most recently
    /// registered callback is used; `None` disables notifications.
    pub fn set_jobs_available_callback(&mut self, callback: Option<JobsAvailableCallback>) {
        self.notifier.set_callback(callback);
    }

    pub fn metrics(&self) -> &JobMetrics {
        &self.metrics
    }

    // ------------------------------------------------------------------
    // Shared write-path helpers
    // ------------------------------------------------------------------

    /// Write the primary record with variables stripped; variables are
    /// never persisted in the job state.
    pub(crate) fn write_record_without_variables(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        let stripped = record.without_variables();
        let value = crate::codec::encode_job_record(&stripped)?;
        self.jobs.put(txn, &keys::job_key(key), &value)?;
        Ok(())
    }

    pub(crate) fn update_state(
        &self,
        txn: &StoreTransaction,
        key: u64,
        state: JobState,
    ) -> Result<(), JobStateError> {
        self.states
            .put(txn, &keys::job_key(key), &crate::codec::encode_job_state(state))?;
        Ok(())
    }

    /// Insert the job into the activatable index and notify, every time.
    pub(crate) fn make_activatable(
        &self,
        txn: &StoreTransaction,
        job_type: &str,
        key: u64,
    ) -> Result<(), JobStateError> {
        debug_assert!(!job_type.is_empty(), "callers validate the job type");
        self.activatable
            .put(txn, &keys::type_job_key(job_type.as_bytes(), key), &[])?;
        self.notifier.notify(job_type);
        Ok(())
    }

    pub(crate) fn remove_activatable(
        &self,
        txn: &StoreTransaction,
        job_type: &str,
        key: u64,
    ) -> Result<(), JobStateError> {
        self.activatable
            .delete(txn, &keys::type_job_key(job_type.as_bytes(), key))?;
        Ok(())
    }

    pub(crate) fn remove_deadline(
        &self,
        txn: &StoreTransaction,
        deadline_ms: u64,
        key: u64,
    ) -> Result<(), JobStateError> {
        self.deadlines
            .delete(txn, &keys::due_time_job_key(deadline_ms, key))?;
        Ok(())
    }

    /// Overwrite the record, move to `new_state`, and keep the activatable
    /// and deadline indexes in step. Callers have already validated the
    /// record for the transition they perform.
    pub(crate) fn update_job(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
        new_state: JobState,
    ) -> Result<(), JobStateError> {
        self.write_record_without_variables(txn, key, record)?;
        self.update_state(txn, key, new_state)?;
        if new_state == JobState::Activatable {
            self.make_activatable(txn, &record.job_type, key)?;
        }
        if record.deadline_ms > 0 {
            self.remove_deadline(txn, record.deadline_ms, key)?;
        }
        Ok(())
    }

    /// Fetch the primary record as a zero-copy view.
    pub(crate) fn load_job(
        &self,
        txn: &StoreTransaction,
        key: u64,
    ) -> Result<Option<JobRecordView>, JobStateError> {
        match self.jobs.get(txn, &keys::job_key(key))? {
            Some(raw) => Ok(Some(crate::codec::decode_job_record(&raw)?)),
            None => Ok(None),
        }
    }

    /// Debug-build check that a transition starts from an expected state.
    /// Illegal transitions are the command processor's bug, not the
    /// store's; release builds do not pay for the lookup.
    pub(crate) fn debug_assert_state_in(
        &self,
        txn: &StoreTransaction,
        key: u64,
        allowed: &[JobState],
    ) {
        #[cfg(debug_assertions)]
        {
            if let Ok(current) = self.get_state(txn, key) {
                debug_assert!(
                    allowed.contains(&current),
                    "job {}: transition not allowed from {:?} (expected one of {:?})",
                    key,
                    current,
                    allowed
                );
            }
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = (txn, key, allowed);
        }
    }
}

pub(crate) fn ensure_job_type(record: &JobRecord) -> Result<(), JobStateError> {
    if record.job_type.is_empty() {
        return Err(JobStateError::InvalidArgument("job type must not be empty"));
    }
    Ok(())
}

pub(crate) fn ensure_deadline(record: &JobRecord) -> Result<(), JobStateError> {
    if record.deadline_ms == 0 {
        return Err(JobStateError::InvalidArgument("deadline must be positive"));
    }
    Ok(())
}
