use rkyv::{AlignedVec, Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};

use crate::codec::CodecError;

/// Lifecycle state of a job.
///
/// `NotFound` is a query-only pseudo-state returned for absent keys; it is
/// never written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Activatable,
    Activated,
    Failed,
    ErrorThrown,
    NotFound,
}

/// The job record persisted in the primary column family.
///
/// `variables` is carried by incoming records but is stripped before every
/// write; the persisted copy is always empty. Serialization must stay
/// deterministic and round-trip stable, which rkyv's derived format gives us.
#[derive(Debug, Clone, PartialEq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct JobRecord {
    pub job_type: String,
    pub worker: String,
    pub retries: i32,
    /// Retry backoff in milliseconds; zero means retry immediately.
    pub retry_backoff_ms: u64,
    /// Absolute time (epoch millis) at which a backed-off job wakes up.
    pub recurring_time_ms: u64,
    /// Absolute time (epoch millis) by which an activated job must complete.
    pub deadline_ms: u64,
    pub error_message: String,
    pub error_code: String,
    /// Opaque header blob, passed through untouched.
    pub custom_headers: Vec<u8>,
    /// Never persisted; see `without_variables`.
    pub variables: Vec<u8>,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            job_type: String::new(),
            worker: String::new(),
            retries: 0,
            retry_backoff_ms: 0,
            recurring_time_ms: 0,
            deadline_ms: 0,
            error_message: String::new(),
            error_code: String::new(),
            custom_headers: Vec::new(),
            variables: Vec::new(),
        }
    }
}

impl JobRecord {
    /// Copy of this record with every field populated except `variables`.
    pub fn without_variables(&self) -> JobRecord {
        JobRecord {
            variables: Vec::new(),
            ..self.clone()
        }
    }
}

/// Zero-copy view over an archived `JobRecord`.
///
/// Validated once at construction; accessors read the archived bytes
/// directly without deserializing. The raw engine buffer is copied into an
/// aligned buffer because archived access needs the alignment the engine
/// does not guarantee.
#[derive(Debug)]
pub struct JobRecordView {
    bytes: AlignedVec,
}

impl JobRecordView {
    pub(crate) fn new(raw: &[u8]) -> Result<Self, CodecError> {
        let mut bytes = AlignedVec::with_capacity(raw.len());
        bytes.extend_from_slice(raw);
        rkyv::check_archived_root::<JobRecord>(&bytes)
            .map_err(|e| CodecError::CorruptValue(format!("job record: {}", e)))?;
        Ok(Self { bytes })
    }

    fn archived(&self) -> &ArchivedJobRecord {
        // Validated in new() and the buffer is owned by self.
        unsafe { rkyv::archived_root::<JobRecord>(&self.bytes) }
    }

    pub fn job_type(&self) -> &str {
        self.archived().job_type.as_str()
    }

    pub fn worker(&self) -> &str {
        self.archived().worker.as_str()
    }

    pub fn retries(&self) -> i32 {
        self.archived().retries
    }

    pub fn retry_backoff_ms(&self) -> u64 {
        self.archived().retry_backoff_ms
    }

    pub fn recurring_time_ms(&self) -> u64 {
        self.archived().recurring_time_ms
    }

    pub fn deadline_ms(&self) -> u64 {
        self.archived().deadline_ms
    }

    pub fn error_message(&self) -> &str {
        self.archived().error_message.as_str()
    }

    pub fn error_code(&self) -> &str {
        self.archived().error_code.as_str()
    }

    pub fn custom_headers(&self) -> &[u8] {
        self.archived().custom_headers.as_slice()
    }

    pub fn variables(&self) -> &[u8] {
        self.archived().variables.as_slice()
    }

    /// Deserialize into an owned record, e.g. before mutating it.
    pub fn to_record(&self) -> JobRecord {
        let mut des = rkyv::Infallible;
        RkyvDeserialize::deserialize(self.archived(), &mut des)
            .unwrap_or_else(|_| unreachable!("infallible deserialization for JobRecord"))
    }
}
