//! Granary: the transactional job state store of a workflow engine
//! partition.
//!
//! The store is the authoritative index of which jobs exist, which
//! lifecycle state each is in, which are offerable to workers of a given
//! type, which have activation deadlines pending, and which are sleeping on
//! a retry backoff. Command processors drive it through engine
//! transactions; every operation keeps the primary record, the state entry
//! and the three waiting indexes consistent under one atomic commit.
//!
//! Layout:
//!
//! - [`keys`]: big-endian, order-preserving key encoding
//! - [`column_family`]: typed views over the logical keyspaces
//! - [`store`] / [`factory`] / [`settings`]: engine lifecycle and tuning
//! - [`job`] / [`codec`]: the persisted record and its serialization
//! - [`job_state`]: the lifecycle state machine and iteration APIs
//! - [`notify`]: the jobs-available side channel
//! - [`metrics`]: per-partition lifecycle counters

pub mod codec;
pub mod column_family;
pub mod factory;
pub mod job;
pub mod job_state;
pub mod keys;
pub mod metrics;
pub mod notify;
pub mod settings;
pub mod store;

pub use codec::CodecError;
pub use column_family::{ColumnFamilyHandle, ColumnFamilyId, ScanControl};
pub use factory::StoreFactory;
pub use job::{JobRecord, JobRecordView, JobState};
pub use job_state::{JobStateError, JobStateStore};
pub use keys::KeyError;
pub use metrics::JobMetrics;
pub use notify::{JobsAvailableCallback, JobsAvailableNotifier};
pub use settings::{SettingsError, StoreSettings};
pub use store::{EngineError, PartitionStore, StoreOpenError, StoreTransaction};
