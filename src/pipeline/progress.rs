use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Shared view of how far a run has got. The processed counter only moves
/// forward; readers may poll it from other tasks while the run is in flight.
#[derive(Debug, Default)]
pub struct Progress {
    started: AtomicBool,
    finished: AtomicBool,
    total: AtomicUsize,
    processed: AtomicUsize,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.processed.store(0, Ordering::SeqCst);
        self.started.store(true, Ordering::SeqCst);
    }

    pub fn advance(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// 0-100. A finished run always reads 100, even with nothing to process.
    pub fn percent(&self) -> f64 {
        if self.is_finished() {
            return 100.0;
        }
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.processed().min(total) as f64 / total as f64) * 100.0
    }
}
