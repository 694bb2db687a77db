// src/progress.rs
//
// Advisory progress reporting for the kernel integration. The integrator
// reports a monotonically increasing row count against a fixed total;
// rendering (or ignoring) it is entirely the caller's business. Reporting
// must never influence the numerical result.

use std::sync::atomic::{AtomicUsize, Ordering};

pub trait Progress: Sync {
    /// Integration is about to start; `total` is the number of rows.
    fn begin(&self, total: usize);

    /// `done` rows finished so far. Monotonically increasing, `done <= total`.
    fn update(&self, done: usize);

    /// Integration finished.
    fn finish(&self) {}
}

/// Discards all reports.
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn begin(&self, _total: usize) {}
    fn update(&self, _done: usize) {}
}

/// Logs coarse percentage milestones via `log::info!`.
///
/// The milestone bookkeeping uses relaxed atomics: a lost race between two
/// updates can at worst skip a log line, never corrupt the kernel.
pub struct LogProgress {
    total: AtomicUsize,
    last_percent: AtomicUsize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self {
            total: AtomicUsize::new(1),
            last_percent: AtomicUsize::new(0),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for LogProgress {
    fn begin(&self, total: usize) {
        self.total.store(total.max(1), Ordering::Relaxed);
        self.last_percent.store(0, Ordering::Relaxed);
        log::info!("calculating demag kernel ...");
    }

    fn update(&self, done: usize) {
        let total = self.total.load(Ordering::Relaxed);
        let percent = (done * 100) / total;
        let last = self.last_percent.load(Ordering::Relaxed);
        if percent >= last + 10 {
            self.last_percent.store(percent, Ordering::Relaxed);
            log::info!("calculating demag kernel: {}%", percent.min(100));
        }
    }

    fn finish(&self) {
        log::info!("calculating demag kernel: done");
    }
}
