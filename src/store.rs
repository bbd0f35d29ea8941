//! Partition store lifecycle: opening, tuning, and closing the engine.
//!
//! One directory-backed RocksDB instance per partition, using optimistic
//! transactions so every lifecycle operation can read its own uncommitted
//! writes. All column families share the default physical keyspace behind a
//! 16-bit discriminator prefix, which lets us tune the engine once with a
//! fixed-length prefix extractor instead of once per family.

use std::path::{Path, PathBuf};

use rocksdb::{
    BlockBasedIndexType, BlockBasedOptions, Cache, DBCompactionStyle, DBCompressionType, Options,
    OptimisticTransactionDB, SliceTransform, Transaction,
};
use thiserror::Error;

use crate::column_family::ColumnFamilyId;
use crate::keys::U16_LEN;
use crate::settings::StoreSettings;

/// Any failure surfaced by the underlying engine (I/O, commit conflict).
#[derive(Debug, Error)]
#[error("engine error: {0}")]
pub struct EngineError(#[from] pub rocksdb::Error);

/// The engine could not be opened for a partition.
#[derive(Debug, Error)]
pub enum StoreOpenError {
    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to open job state store at {path}: {source}")]
    Open {
        path: String,
        source: rocksdb::Error,
    },
}

/// An exclusively-owned partition database.
///
/// The partition's single command processor owns this handle; queries from
/// other threads must go through a snapshot reader, not through here.
pub struct PartitionStore {
    db: OptimisticTransactionDB,
    partition_id: u32,
    path: PathBuf,
}

impl PartitionStore {
    /// Open (or create) the partition database under `path`.
    ///
    /// The full column family enumeration is fixed at compile time; opening
    /// logs it so a partition directory can be matched to the layout that
    /// produced it. If the engine open fails, the options and cache handles
    /// acquired up to that point are released before the error is returned.
    pub fn open(
        settings: &StoreSettings,
        path: &Path,
        partition_id: u32,
    ) -> Result<Self, StoreOpenError> {
        std::fs::create_dir_all(path).map_err(|source| StoreOpenError::CreateDir {
            path: path.display().to_string(),
            source,
        })?;

        let options = db_options(settings);
        let db = OptimisticTransactionDB::open(&options, path).map_err(|source| {
            StoreOpenError::Open {
                path: path.display().to_string(),
                source,
            }
        })?;

        tracing::debug!(
            partition = partition_id,
            path = %path.display(),
            column_families = ?ColumnFamilyId::ALL,
            "opened job state store"
        );

        Ok(Self {
            db,
            partition_id,
            path: path.to_path_buf(),
        })
    }

    /// Start a transaction. All mutations of a single command must go
    /// through one transaction so the five column families commit atomically.
    pub fn begin(&self) -> StoreTransaction<'_> {
        StoreTransaction {
            inner: self.db.transaction(),
        }
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the store, releasing engine handles in reverse acquisition
    /// order (RAII drop order). Outstanding transactions must be finished
    /// first; the borrow on `self` enforces that.
    pub fn close(self) {
        tracing::debug!(
            partition = self.partition_id,
            path = %self.path.display(),
            "closing job state store"
        );
        drop(self);
    }
}

/// A single ACID transaction over the partition store, with
/// read-your-own-writes semantics.
pub struct StoreTransaction<'db> {
    inner: Transaction<'db, OptimisticTransactionDB>,
}

impl<'db> StoreTransaction<'db> {
    pub(crate) fn inner(&self) -> &Transaction<'db, OptimisticTransactionDB> {
        &self.inner
    }

    /// Commit every buffered mutation atomically.
    pub fn commit(self) -> Result<(), EngineError> {
        self.inner.commit().map_err(EngineError)
    }

    /// Discard every buffered mutation.
    pub fn rollback(&self) -> Result<(), EngineError> {
        self.inner.rollback().map_err(EngineError)
    }
}

/// Engine tuning for prefix-scan-heavy workloads.
///
/// The memory budget splits one third into the shared block cache; the rest
/// is divided across the concurrent write buffers, each of which reserves a
/// quarter of its share for the memtable prefix bloom filter.
fn db_options(settings: &StoreSettings) -> Options {
    let block_cache_bytes = settings.memory_budget_bytes / 3;
    let max_write_buffers = settings.max_write_buffers as i32;
    let memtable_prefix_bloom_ratio = 0.25;
    let write_buffer_bytes = (((settings.memory_budget_bytes - block_cache_bytes) as f64
        / settings.max_write_buffers as f64)
        * (1.0 - memtable_prefix_bloom_ratio))
        .round() as usize;

    let mut options = Options::default();
    options.create_if_missing(true);
    options.set_paranoid_checks(true);
    // Iteration-heavy workload over buffered I/O; keep the OS read-ahead.
    options.set_advise_random_on_open(false);
    // fsync asynchronously once at least 1 MiB has accumulated.
    options.set_bytes_per_sync(1024 * 1024);
    // The manifest logs every file operation and grows unbounded otherwise.
    options.set_max_manifest_file_size(256 * 1024 * 1024);

    // Every key starts with the 16-bit column family discriminator, so all
    // prefix seeks share a fixed-length extractor.
    options.set_prefix_extractor(SliceTransform::create_fixed_prefix(U16_LEN));
    options.set_memtable_prefix_bloom_ratio(memtable_prefix_bloom_ratio);

    options.set_write_buffer_size(write_buffer_bytes);
    options.set_max_write_buffer_number(max_write_buffers);
    // Merge at least two memtables per L0 file so flushes do not produce a
    // file per memtable.
    options.set_min_write_buffer_number_to_merge(max_write_buffers.min(2));

    options.set_compaction_style(DBCompactionStyle::Level);
    options.set_level_compaction_dynamic_level_bytes(true);
    options.set_target_file_size_base(8 * 1024 * 1024);
    options.set_level_zero_file_num_compaction_trigger(max_write_buffers);
    options.set_level_zero_slowdown_writes_trigger(max_write_buffers + max_write_buffers / 2);
    options.set_level_zero_stop_writes_trigger(max_write_buffers * 2);
    // Four levels: L1 = 32 MiB, then x10 per level. The top two levels stay
    // uncompressed so hot blocks land in the LRU cache as-is; the lower
    // levels use a CPU-cheap compression.
    options.set_num_levels(4);
    options.set_max_bytes_for_level_base(32 * 1024 * 1024);
    options.set_max_bytes_for_level_multiplier(10.0);
    options.set_compression_per_level(&[
        DBCompressionType::None,
        DBCompressionType::None,
        DBCompressionType::Lz4,
        DBCompressionType::Lz4,
    ]);

    let cache = Cache::new_lru_cache(block_cache_bytes);
    let mut block_options = BlockBasedOptions::default();
    block_options.set_block_cache(&cache);
    block_options.set_bloom_filter(10.0, false);
    block_options.set_block_size(32 * 1024);
    // Pinning index and filter blocks keeps seeks fast when many memtables
    // are in flight; all scans are prefix based, which suits hash indexing.
    block_options.set_cache_index_and_filter_blocks(true);
    block_options.set_pin_l0_filter_and_index_blocks_in_cache(true);
    block_options.set_index_type(BlockBasedIndexType::HashSearch);
    options.set_block_based_table_factory(&block_options);

    options
}
