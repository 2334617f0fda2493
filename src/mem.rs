use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessExt, System, SystemExt};

const REFRESH_EVERY: Duration = Duration::from_millis(250);

/// Rate-limited peak resident-memory tracker for the current process.
/// - Refreshes at most every `REFRESH_EVERY`, so it is cheap to call per line.
/// - `None` from `peak_bytes` means the platform gave no reading.
pub struct PeakMemory {
    sys: System,
    pid: Option<Pid>,
    last_check: Option<Instant>,
    peak: Option<u64>,
}

impl PeakMemory {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid().ok();
        let mut me = Self { sys: System::new(), pid, last_check: None, peak: None };
        me.sample_now();
        me
    }

    /// Sample if the last reading is older than the refresh interval.
    #[inline]
    pub fn sample(&mut self) {
        match self.last_check {
            Some(t) if t.elapsed() < REFRESH_EVERY => {}
            _ => self.sample_now(),
        }
    }

    pub fn sample_now(&mut self) {
        self.last_check = Some(Instant::now());
        let Some(pid) = self.pid else { return };
        if !self.sys.refresh_process(pid) {
            return;
        }
        if let Some(p) = self.sys.process(pid) {
            let rss = p.memory();
            self.peak = Some(self.peak.map_or(rss, |cur| cur.max(rss)));
        }
    }

    pub fn peak_bytes(&self) -> Option<u64> {
        self.peak
    }
}

impl Default for PeakMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable byte count (MiB with two decimals).
pub fn format_mib(bytes: u64) -> String {
    format!("{:.2} MiB", bytes as f64 / (1024.0 * 1024.0))
}
