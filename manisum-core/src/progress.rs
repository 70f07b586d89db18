use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::thread;
use std::time::{Duration, Instant};

/// Shared progress counters for a hashing run.
///
/// Cloning is cheap; all clones observe the same counters. When enabled,
/// [`Progress::start`] spawns a reporter that logs a line every `interval`.
#[derive(Clone)]
pub struct Progress {
    enabled: bool,
    interval: Duration,
    pub stage: Arc<Mutex<String>>,
    pub files_done: Arc<AtomicUsize>,
    pub files_total: Arc<AtomicUsize>,
    pub bytes_done: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            interval: Duration::from_secs(5),
            stage: Arc::new(Mutex::new(String::new())),
            files_done: Arc::new(AtomicUsize::new(0)),
            files_total: Arc::new(AtomicUsize::new(0)),
            bytes_done: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn set_stage(&self, s: &str) {
        if let Ok(mut stage) = self.stage.lock() {
            *stage = s.to_string();
        }
    }
    pub fn add_files_total(&self, n: usize) {
        self.files_total.fetch_add(n, Ordering::Relaxed);
    }
    pub fn inc_file(&self, bytes: u64) {
        self.files_done.fetch_add(1, Ordering::Relaxed);
        self.bytes_done.fetch_add(bytes, Ordering::Relaxed);
    }
    pub fn files_done(&self) -> usize {
        self.files_done.load(Ordering::Relaxed)
    }
    pub fn bytes_done(&self) -> u64 {
        self.bytes_done.load(Ordering::Relaxed)
    }

    pub fn start(&self) {
        if !self.enabled {
            return;
        }
        self.running.store(true, Ordering::Relaxed);
        let this = self.clone();
        thread::spawn(move || {
            let t0 = Instant::now();
            while this.running.load(Ordering::Relaxed) {
                thread::sleep(this.interval);
                if !this.running.load(Ordering::Relaxed) {
                    break;
                }
                let stage = this.stage.lock().map(|s| s.clone()).unwrap_or_default();
                tracing::info!(
                    "[{:>4}s] {} | files {}/{} | {} bytes",
                    t0.elapsed().as_secs(),
                    stage,
                    this.files_done(),
                    this.files_total.load(Ordering::Relaxed),
                    this.bytes_done(),
                );
            }
        });
    }
    pub fn stop(&self) {
        if self.enabled {
            self.running.store(false, Ordering::Relaxed);
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counters() {
        let p = Progress::disabled();
        let q = p.clone();
        q.add_files_total(3);
        q.inc_file(10);
        q.inc_file(5);
        assert_eq!(p.files_done(), 2);
        assert_eq!(p.bytes_done(), 15);
        assert_eq!(p.files_total.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn enabled_reporter_stops() {
        let p = Progress::new(true).with_interval(Duration::from_millis(5));
        p.set_stage("Hashing");
        p.start();
        thread::sleep(Duration::from_millis(20));
        p.stop();
        assert!(!p.running.load(Ordering::Relaxed));
    }
}
