use serde::Serialize;
use std::sync::Mutex;

/// Counts analyses that completed or failed during a run.
pub struct RunMetrics {
    inner: Mutex<Counts>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub models: usize,
    pub completed: usize,
    pub failed: usize,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counts::default()),
        }
    }

    pub fn record_model(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.models += 1;
        }
    }

    pub fn record_completed(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.completed += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.failed += 1;
        }
    }

    pub fn snapshot(&self) -> Counts {
        self.inner
            .lock()
            .map(|counts| *counts)
            .unwrap_or_default()
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let metrics = RunMetrics::new();
        metrics.record_model();
        metrics.record_completed();
        metrics.record_completed();
        metrics.record_failed();
        assert_eq!(
            metrics.snapshot(),
            Counts {
                models: 1,
                completed: 2,
                failed: 1
            }
        );
    }
}
