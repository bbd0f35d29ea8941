//! Typed views over the store's logical keyspaces.
//!
//! The engine holds a single physical keyspace; each logical column family
//! claims a slice of it by prepending its 16-bit big-endian discriminator to
//! every key. The discriminator doubles as the fixed-length prefix the
//! engine's prefix extractor and bloom filters are tuned for.

use crate::keys::U16_LEN;
use crate::store::{EngineError, StoreTransaction};

/// The complete, compile-time-fixed enumeration of column families.
///
/// Discriminators are the enum values; reordering or removing a variant
/// changes the on-disk layout of every existing partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ColumnFamilyId {
    /// `job_key -> JobRecord` (variables stripped). The primary record.
    Jobs = 0,
    /// `job_key -> JobState`.
    JobStates = 1,
    /// `(type, job_key) -> ()`. Jobs offerable to workers, per type.
    JobActivatable = 2,
    /// `(deadline, job_key) -> ()`. Activation deadlines, ascending.
    JobDeadlines = 3,
    /// `(recurring_time, job_key) -> ()`. Sleeping jobs by wake-up time.
    JobBackoff = 4,
}

impl ColumnFamilyId {
    pub const ALL: [ColumnFamilyId; 5] = [
        ColumnFamilyId::Jobs,
        ColumnFamilyId::JobStates,
        ColumnFamilyId::JobActivatable,
        ColumnFamilyId::JobDeadlines,
        ColumnFamilyId::JobBackoff,
    ];

    pub fn discriminator(self) -> u16 {
        self as u16
    }

    /// The physical key prefix for this column family.
    pub fn prefix(self) -> [u8; U16_LEN] {
        (self as u16).to_be_bytes()
    }
}

/// Whether a scan visitor wants the next entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// A get/put/delete/scan view over one column family.
///
/// All operations run against the caller's transaction; nothing is visible
/// outside it until the transaction commits.
#[derive(Debug, Clone, Copy)]
pub struct ColumnFamilyHandle {
    id: ColumnFamilyId,
}

impl ColumnFamilyHandle {
    pub fn new(id: ColumnFamilyId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ColumnFamilyId {
        self.id
    }

    /// Prepend the discriminator to a logical key.
    fn qualified(&self, key: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(U16_LEN + key.len());
        out.extend_from_slice(&self.id.prefix());
        out.extend_from_slice(key);
        out
    }

    pub fn get(
        &self,
        txn: &StoreTransaction,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, EngineError> {
        txn.inner().get(self.qualified(key)).map_err(EngineError)
    }

    pub fn put(
        &self,
        txn: &StoreTransaction,
        key: &[u8],
        value: &[u8],
    ) -> Result<(), EngineError> {
        txn.inner()
            .put(self.qualified(key), value)
            .map_err(EngineError)
    }

    /// Idempotent: deleting an absent key is not an error.
    pub fn delete(&self, txn: &StoreTransaction, key: &[u8]) -> Result<(), EngineError> {
        txn.inner().delete(self.qualified(key)).map_err(EngineError)
    }

    pub fn exists(&self, txn: &StoreTransaction, key: &[u8]) -> Result<bool, EngineError> {
        Ok(txn
            .inner()
            .get_pinned(self.qualified(key))
            .map_err(EngineError)?
            .is_some())
    }

    /// Visit every `(key, value)` whose logical key starts with `prefix`,
    /// in key order, until the visitor returns `Stop` or the prefix is
    /// exhausted. Keys are yielded without the discriminator.
    ///
    /// The iterator reflects the transaction's writes as of the moment the
    /// scan starts. Deletes the visitor wants to issue against this family
    /// must be buffered and applied after the scan returns, so the traversal
    /// neither skips nor revisits entries.
    pub fn scan_prefix<E, F>(
        &self,
        txn: &StoreTransaction,
        prefix: &[u8],
        mut visitor: F,
    ) -> Result<(), E>
    where
        E: From<EngineError>,
        F: FnMut(&[u8], &[u8]) -> Result<ScanControl, E>,
    {
        let qualified_prefix = self.qualified(prefix);
        let mut iter = txn.inner().raw_iterator();
        iter.seek(&qualified_prefix);
        while iter.valid() {
            let key = iter
                .key()
                .expect("valid iterator position yields a key");
            if !key.starts_with(&qualified_prefix) {
                break;
            }
            let value = iter
                .value()
                .expect("valid iterator position yields a value");
            match visitor(&key[U16_LEN..], value)? {
                ScanControl::Continue => {}
                ScanControl::Stop => return Ok(()),
            }
            iter.next();
        }
        iter.status().map_err(|e| E::from(EngineError(e)))
    }

    /// Visit every entry of this column family in key order. The key itself
    /// carries the ordering (e.g. deadline-ordered scans).
    pub fn scan_all<E, F>(&self, txn: &StoreTransaction, visitor: F) -> Result<(), E>
    where
        E: From<EngineError>,
        F: FnMut(&[u8], &[u8]) -> Result<ScanControl, E>,
    {
        self.scan_prefix(txn, &[], visitor)
    }
}
