//! Run statistics.

use std::fmt;

/// Counters accumulated over one scrape run.
///
/// `successful + failed + skipped` equals the number of items visited;
/// `service_extracted + browser_fallback` partitions the successful ones by
/// which extraction stage produced their payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub service_extracted: usize,
    pub browser_fallback: usize,
}

impl RunStats {
    pub fn visited(&self) -> usize {
        self.successful + self.failed + self.skipped
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} visited: {} successful ({} via service, {} via browser), {} failed, {} skipped",
            self.visited(),
            self.successful,
            self.service_extracted,
            self.browser_fallback,
            self.failed,
            self.skipped
        )
    }
}
