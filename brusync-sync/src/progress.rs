//! Progress reporting for per-service syncs.

use std::fmt;

use brusync_core::ServiceAcronym;

/// Lifecycle step of a single-service sync, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Starting,
    Cleaning,
    Importing,
    InjectingAuth,
    UpdatingTimestamps,
    Complete,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Starting => "Starting...",
            Stage::Cleaning => "Cleaning...",
            Stage::Importing => "Importing...",
            Stage::InjectingAuth => "Injecting auth...",
            Stage::UpdatingTimestamps => "Updating timestamps...",
            Stage::Complete => "Complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives `(service, status)` notifications.
///
/// Called synchronously from inside the sync; implementations must return
/// quickly. A panic inside `on_progress` is caught and does not change the
/// outcome of the sync.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, service: &ServiceAcronym, status: &str);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _service: &ServiceAcronym, _status: &str) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&ServiceAcronym, &str) + Send + Sync,
{
    fn on_progress(&self, service: &ServiceAcronym, status: &str) {
        self(service, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |svc: &ServiceAcronym, status: &str| {
            seen.lock().unwrap().push(format!("[{svc}] {status}"));
        };
        sink.on_progress(&"iam".into(), Stage::Importing.label());
        NoopProgress.on_progress(&"iam".into(), "ignored");
        assert_eq!(*seen.lock().unwrap(), vec!["[iam] Importing...".to_string()]);
    }
}
