//! Value serialization for the store's column families.
//!
//! Job records are rkyv-archived; lifecycle states are a single byte. Both
//! formats are deterministic, so a record written twice from the same input
//! produces identical bytes.

use rkyv::AlignedVec;
use thiserror::Error;

use crate::job::{JobRecord, JobRecordView, JobState};

/// Error type for codec operations.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error("corrupt value: {0}")]
    CorruptValue(String),
}

/// Serialize a job record. The caller is responsible for stripping
/// variables first; see `JobRecord::without_variables`.
pub fn encode_job_record(record: &JobRecord) -> Result<AlignedVec, CodecError> {
    rkyv::to_bytes::<_, 512>(record).map_err(|e| CodecError::Serialize(e.to_string()))
}

/// Validate raw engine bytes and wrap them in a zero-copy view.
pub fn decode_job_record(raw: &[u8]) -> Result<JobRecordView, CodecError> {
    JobRecordView::new(raw)
}

pub fn encode_job_state(state: JobState) -> [u8; 1] {
    let discriminant: u8 = match state {
        JobState::Activatable => 0,
        JobState::Activated => 1,
        JobState::Failed => 2,
        JobState::ErrorThrown => 3,
        // Query-only pseudo-state; the core never persists it.
        JobState::NotFound => unreachable!("NotFound is never stored"),
    };
    [discriminant]
}

pub fn decode_job_state(raw: &[u8]) -> Result<JobState, CodecError> {
    match raw {
        [0] => Ok(JobState::Activatable),
        [1] => Ok(JobState::Activated),
        [2] => Ok(JobState::Failed),
        [3] => Ok(JobState::ErrorThrown),
        [d] => Err(CodecError::CorruptValue(format!(
            "unknown job state discriminant {}",
            d
        ))),
        _ => Err(CodecError::CorruptValue(format!(
            "job state must be exactly one byte, found {}",
            raw.len()
        ))),
    }
}
