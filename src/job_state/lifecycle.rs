//! Lifecycle transitions.
//!
//! Each operation validates its arguments before touching the transaction,
//! then rewrites the primary record (variables stripped), the state entry,
//! and whichever secondary indexes the transition moves the job between.
//! Atomicity across all five column families comes from the caller's
//! transaction.

use crate::job::{JobRecord, JobState};
use crate::keys;
use crate::store::StoreTransaction;

use super::{ensure_deadline, ensure_job_type, JobStateError, JobStateStore};

impl JobStateStore {
    /// Create a job in the ACTIVATABLE state and notify its type.
    pub fn create(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        ensure_job_type(record)?;
        self.debug_assert_state_in(txn, key, &[JobState::NotFound]);
        self.create_job(txn, key, record)?;
        self.metrics().job_created();
        Ok(())
    }

    /// Hand the job to a worker: state ACTIVATED, out of the activatable
    /// index, into the deadline index.
    ///
    /// Note: the persisted record loses its variables. Write the record to
    /// the log before updating it in the state.
    pub fn activate(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        ensure_job_type(record)?;
        ensure_deadline(record)?;
        self.debug_assert_state_in(txn, key, &[JobState::Activatable]);

        self.write_record_without_variables(txn, key, record)?;
        self.update_state(txn, key, JobState::Activated)?;
        self.remove_activatable(txn, &record.job_type, key)?;
        self.deadlines
            .put(txn, &keys::due_time_job_key(record.deadline_ms, key), &[])?;

        self.metrics().job_activated();
        Ok(())
    }

    /// Return a job to ACTIVATABLE after its activation deadline expired.
    /// Equivalent to `create` plus removal of the expired deadline entry.
    pub fn timeout(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        ensure_job_type(record)?;
        ensure_deadline(record)?;
        self.debug_assert_state_in(txn, key, &[JobState::NotFound, JobState::Activated]);

        self.create_job(txn, key, record)?;
        self.remove_deadline(txn, record.deadline_ms, key)?;

        self.metrics().job_timed_out();
        Ok(())
    }

    /// Complete a job, purging it from all column families.
    pub fn complete(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        self.delete_job(txn, key, record)?;
        self.metrics().job_completed();
        Ok(())
    }

    /// Cancel a job, purging it from all column families.
    pub fn cancel(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        self.delete_job(txn, key, record)
    }

    /// Purge a job. Idempotent: deleting an absent job changes nothing.
    pub fn delete(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        self.delete_job(txn, key, record)
    }

    /// Take a job out of circulation without retries: state FAILED, removed
    /// from the activatable index.
    pub fn disable(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        ensure_job_type(record)?;
        self.debug_assert_state_in(txn, key, &[JobState::Activatable]);
        self.update_job(txn, key, record, JobState::Failed)?;
        self.remove_activatable(txn, &record.job_type, key)?;
        Ok(())
    }

    /// Record a business error thrown by the worker: state ERROR_THROWN,
    /// removed from the activatable index.
    pub fn throw_error(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        ensure_job_type(record)?;
        self.debug_assert_state_in(txn, key, &[JobState::Activatable]);
        self.update_job(txn, key, record, JobState::ErrorThrown)?;
        self.remove_activatable(txn, &record.job_type, key)?;
        Ok(())
    }

    /// Report a failed activation.
    ///
    /// With retries left and a positive backoff the job sleeps in the
    /// backoff index; with retries left and no backoff it goes straight
    /// back to ACTIVATABLE (and notifies); with no retries left it stays
    /// FAILED until an operator resolves it.
    pub fn fail(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        ensure_job_type(record)?;
        self.debug_assert_state_in(txn, key, &[JobState::Activated]);

        if record.retries > 0 {
            if record.retry_backoff_ms > 0 {
                self.backoff.put(
                    txn,
                    &keys::due_time_job_key(record.recurring_time_ms, key),
                    &[],
                )?;
                self.update_job(txn, key, record, JobState::Failed)?;
            } else {
                self.update_job(txn, key, record, JobState::Activatable)?;
            }
        } else {
            self.update_job(txn, key, record, JobState::Failed)?;
        }

        self.metrics().job_failed();
        Ok(())
    }

    /// Resolve a failed or error-thrown job back to ACTIVATABLE.
    pub fn resolve(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        ensure_job_type(record)?;
        self.debug_assert_state_in(txn, key, &[JobState::Failed, JobState::ErrorThrown]);
        self.update_job(txn, key, record, JobState::Activatable)
    }

    /// Wake a backed-off job: back to ACTIVATABLE, out of the backoff index.
    pub fn recur_after_backoff(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        ensure_job_type(record)?;
        self.debug_assert_state_in(txn, key, &[JobState::Failed]);
        self.update_job(txn, key, record, JobState::Activatable)?;
        self.backoff
            .delete(txn, &keys::due_time_job_key(record.recurring_time_ms, key))?;
        Ok(())
    }

    /// Set the retry count on the stored record and return the updated
    /// record, or `None` when the job does not exist. Does not touch the
    /// state machine; a FAILED job with fresh retries still needs an
    /// explicit `resolve`.
    pub fn update_job_retries(
        &self,
        txn: &StoreTransaction,
        key: u64,
        retries: i32,
    ) -> Result<Option<JobRecord>, JobStateError> {
        let Some(view) = self.load_job(txn, key)? else {
            return Ok(None);
        };
        let mut record = view.to_record();
        record.retries = retries;
        self.write_record_without_variables(txn, key, &record)?;
        Ok(Some(record))
    }

    fn create_job(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        self.write_record_without_variables(txn, key, record)?;
        self.update_state(txn, key, JobState::Activatable)?;
        self.make_activatable(txn, &record.job_type, key)?;
        Ok(())
    }

    fn delete_job(
        &self,
        txn: &StoreTransaction,
        key: u64,
        record: &JobRecord,
    ) -> Result<(), JobStateError> {
        self.jobs.delete(txn, &keys::job_key(key))?;
        self.states.delete(txn, &keys::job_key(key))?;
        // An empty type cannot have been indexed, so there is nothing to
        // remove and no reason to reject the purge.
        if !record.job_type.is_empty() {
            self.remove_activatable(txn, &record.job_type, key)?;
        }
        self.remove_deadline(txn, record.deadline_ms, key)?;
        Ok(())
    }
}
