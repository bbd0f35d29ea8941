use std::panic::{catch_unwind, AssertUnwindSafe};

/// Listener invoked with a job type whenever a new job of that type becomes
/// activatable.
pub type JobsAvailableCallback = Box<dyn Fn(&str) + Send>;

/// Fire-and-forget signal that a type has new activatable work.
///
/// Holds at most one callback; registering replaces the previous one and
/// `None` disables notification. The callback runs synchronously on the
/// transaction-applying thread, every time, with no de-duplication; the
/// consumer coalesces. A panicking callback is contained and logged so it
/// cannot poison the partition.
#[derive(Default)]
pub struct JobsAvailableNotifier {
    callback: Option<JobsAvailableCallback>,
}

impl JobsAvailableNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&mut self, callback: Option<JobsAvailableCallback>) {
        self.callback = callback;
    }

    pub(crate) fn notify(&self, job_type: &str) {
        if let Some(callback) = &self.callback {
            if catch_unwind(AssertUnwindSafe(|| callback(job_type))).is_err() {
                tracing::warn!(job_type, "jobs-available callback panicked");
            }
        }
    }
}
