//! Point lookups against the primary and state column families.

use crate::codec;
use crate::job::{JobRecord, JobState};
use crate::keys;
use crate::store::StoreTransaction;

use super::{JobStateError, JobStateStore};

impl JobStateStore {
    /// Whether a primary record exists for this key.
    pub fn exists(&self, txn: &StoreTransaction, key: u64) -> Result<bool, JobStateError> {
        Ok(self.jobs.exists(txn, &keys::job_key(key))?)
    }

    /// The job's lifecycle state, or `NotFound` when absent.
    pub fn get_state(&self, txn: &StoreTransaction, key: u64) -> Result<JobState, JobStateError> {
        match self.states.get(txn, &keys::job_key(key))? {
            Some(raw) => Ok(codec::decode_job_state(&raw)?),
            None => Ok(JobState::NotFound),
        }
    }

    pub fn is_in_state(
        &self,
        txn: &StoreTransaction,
        key: u64,
        state: JobState,
    ) -> Result<bool, JobStateError> {
        Ok(self.get_state(txn, key)? == state)
    }

    /// The stored record (always without variables), or `None` when absent.
    pub fn get_job(
        &self,
        txn: &StoreTransaction,
        key: u64,
    ) -> Result<Option<JobRecord>, JobStateError> {
        Ok(self.load_job(txn, key)?.map(|view| view.to_record()))
    }
}
