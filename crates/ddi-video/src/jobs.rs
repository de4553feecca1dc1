//! In-flight render bookkeeping, keyed by idempotency key.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

/// State of a render job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Running { job_id: String },
    Done(String),
    Failed(String),
}

/// What a new request for a key should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStart {
    /// No usable job existed; the caller must run this one.
    Started { job_id: String },
    /// Another request is already rendering this key.
    InProgress { job_id: String },
    /// A previous render finished.
    Done(String),
    /// A previous render failed; the failure is now cleared.
    Failed(String),
}

/// Tracks renders so duplicate requests share one job.
#[derive(Default)]
pub struct JobTable {
    jobs: Mutex<HashMap<String, JobState>>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` or report the state of the existing job.
    pub fn begin(&self, key: &str) -> JobStart {
        let mut jobs = self.lock();
        match jobs.get(key).cloned() {
            Some(JobState::Running { job_id }) => JobStart::InProgress { job_id },
            Some(JobState::Done(url)) => JobStart::Done(url),
            Some(JobState::Failed(msg)) => {
                jobs.remove(key);
                JobStart::Failed(msg)
            }
            None => {
                let job_id = Uuid::new_v4().to_string();
                jobs.insert(
                    key.to_string(),
                    JobState::Running {
                        job_id: job_id.clone(),
                    },
                );
                JobStart::Started { job_id }
            }
        }
    }

    /// Record the result of a render.
    pub fn finish(&self, key: &str, result: Result<String, String>) {
        let state = match result {
            Ok(url) => JobState::Done(url),
            Err(msg) => JobState::Failed(msg),
        };
        self.lock().insert(key.to_string(), state);
    }

    /// Remove a failed job after its failure has been reported.
    pub fn clear_failure(&self, key: &str) {
        let mut jobs = self.lock();
        if matches!(jobs.get(key), Some(JobState::Failed(_))) {
            jobs.remove(key);
        }
    }

    pub fn state(&self, key: &str) -> Option<JobState> {
        self.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, JobState>> {
        // The map holds plain values, so a poisoned guard is still consistent
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_requests_share_job() {
        let table = JobTable::new();
        let JobStart::Started { job_id } = table.begin("k") else {
            panic!("expected a new job");
        };
        assert_eq!(table.begin("k"), JobStart::InProgress { job_id });
    }

    #[test]
    fn test_done_is_reused() {
        let table = JobTable::new();
        table.begin("k");
        table.finish("k", Ok("http://x/v.mp4".into()));
        assert_eq!(table.begin("k"), JobStart::Done("http://x/v.mp4".into()));
    }

    #[test]
    fn test_failure_reported_once_then_retried() {
        let table = JobTable::new();
        table.begin("k");
        table.finish("k", Err("render failed".into()));

        assert_eq!(table.begin("k"), JobStart::Failed("render failed".into()));
        assert!(table.state("k").is_none());
        assert!(matches!(table.begin("k"), JobStart::Started { .. }));
    }

    #[test]
    fn test_clear_failure_keeps_other_states() {
        let table = JobTable::new();
        table.begin("a");
        table.finish("a", Ok("url".into()));
        table.begin("b");
        table.finish("b", Err("boom".into()));

        table.clear_failure("a");
        table.clear_failure("b");
        assert_eq!(table.state("a"), Some(JobState::Done("url".into())));
        assert!(table.state("b").is_none());
        assert_eq!(table.len(), 1);
    }
}
