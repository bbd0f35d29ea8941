//! Ordered scans over the secondary indexes.
//!
//! Each scan may discover index entries whose primary record is gone (the
//! leftovers of a crash between index and record writes, or of a purge that
//! raced an index insert). Those entries are logged, repaired, and skipped;
//! the visitor never sees them. Repairs are buffered while the iterator is
//! live and flushed through the same transaction right after the scan, so
//! the traversal neither skips nor revisits entries.

use crate::column_family::{ColumnFamilyHandle, ScanControl};
use crate::job::JobRecordView;
use crate::keys;
use crate::store::StoreTransaction;

use super::{JobStateError, JobStateStore};

impl JobStateStore {
    /// Visit every activatable job of one type, in job key order, until the
    /// visitor returns `false` or the type is exhausted.
    pub fn for_each_activatable<F>(
        &self,
        txn: &StoreTransaction,
        job_type: &str,
        mut visitor: F,
    ) -> Result<(), JobStateError>
    where
        F: FnMut(u64, &JobRecordView) -> bool,
    {
        let prefix = keys::type_prefix(job_type.as_bytes());
        let mut repairs = Vec::new();

        self.activatable
            .scan_prefix::<JobStateError, _>(txn, &prefix, |key, _value| {
                let (_, job_key) = keys::parse_type_job_key(key)?;
                match self.load_job(txn, job_key)? {
                    Some(record) => Ok(scan_control(visitor(job_key, &record))),
                    None => {
                        tracing::error!(
                            job_key,
                            job_type,
                            "activatable index entry without a job record, repairing"
                        );
                        repairs.push(key.to_vec());
                        Ok(ScanControl::Continue)
                    }
                }
            })?;

        self.flush_repairs(txn, &self.activatable, repairs)
    }

    /// Visit every activated job whose deadline lies before `upper_bound`,
    /// in ascending deadline order. Stops at the first entry at or past the
    /// bound, or when the visitor returns `false`.
    pub fn for_each_timed_out<F>(
        &self,
        txn: &StoreTransaction,
        upper_bound_ms: u64,
        mut visitor: F,
    ) -> Result<(), JobStateError>
    where
        F: FnMut(u64, &JobRecordView) -> bool,
    {
        let mut repairs = Vec::new();

        self.deadlines.scan_all::<JobStateError, _>(txn, |key, _value| {
            let (deadline_ms, job_key) = keys::parse_due_time_job_key(key)?;
            if deadline_ms >= upper_bound_ms {
                return Ok(ScanControl::Stop);
            }
            match self.load_job(txn, job_key)? {
                Some(record) => Ok(scan_control(visitor(job_key, &record))),
                None => {
                    tracing::error!(
                        job_key,
                        deadline_ms,
                        "deadline index entry without a job record, repairing"
                    );
                    repairs.push(key.to_vec());
                    Ok(ScanControl::Continue)
                }
            }
        })?;

        self.flush_repairs(txn, &self.deadlines, repairs)
    }

    /// Offer every backed-off job due at or before `now` to the predicate,
    /// in ascending due-time order. The predicate returns `false` to pause
    /// the scan without consuming the entry.
    ///
    /// Returns the due time of the first entry the predicate did not
    /// consume (the nearest wake-up the caller should schedule), or `-1`
    /// when nothing is left waiting.
    pub fn find_backed_off_jobs<F>(
        &self,
        txn: &StoreTransaction,
        now_ms: u64,
        mut predicate: F,
    ) -> Result<i64, JobStateError>
    where
        F: FnMut(u64, &JobRecordView) -> bool,
    {
        let mut next_due_ms: i64 = -1;
        let mut repairs = Vec::new();

        self.backoff.scan_all::<JobStateError, _>(txn, |key, _value| {
            let (due_time_ms, job_key) = keys::parse_due_time_job_key(key)?;
            let mut consumed = false;
            if due_time_ms <= now_ms {
                match self.load_job(txn, job_key)? {
                    Some(record) => consumed = predicate(job_key, &record),
                    None => {
                        tracing::error!(
                            job_key,
                            due_time_ms,
                            "backoff index entry without a job record, repairing"
                        );
                        repairs.push(key.to_vec());
                        consumed = true;
                    }
                }
            }
            if !consumed {
                next_due_ms = due_time_ms as i64;
            }
            Ok(scan_control(consumed))
        })?;

        self.flush_repairs(txn, &self.backoff, repairs)?;
        Ok(next_due_ms)
    }

    /// Delete dangling index entries collected during a scan.
    fn flush_repairs(
        &self,
        txn: &StoreTransaction,
        column_family: &ColumnFamilyHandle,
        repairs: Vec<Vec<u8>>,
    ) -> Result<(), JobStateError> {
        for key in repairs {
            column_family.delete(txn, &key)?;
        }
        Ok(())
    }
}

fn scan_control(keep_going: bool) -> ScanControl {
    if keep_going {
        ScanControl::Continue
    } else {
        ScanControl::Stop
    }
}
