//! Runtime counters shared between threads

use parking_lot::RwLock;
use std::sync::Arc;

/// Runtime state that is not persisted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeStats {
    /// Whether frames are currently being delivered
    pub is_capturing: bool,
    /// Frames pulled from the source
    pub frames_seen: u64,
    /// Frames the source could not read or decode
    pub frames_failed: u64,
    /// Delivery rate measured over the last window of frames
    pub fps: f64,
    /// Frames the detector actually ran on
    pub detector_runs: u64,
    /// Frames skipped by the detection cooldown
    pub throttled: u64,
    /// Detection cycles that reached the result view
    pub cycles_shown: u64,
    /// Last error message (if any)
    pub last_error: Option<String>,
}

impl RuntimeStats {
    /// Clear any error state
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Set an error message
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }
}

/// Handle to runtime stats shared across threads
pub type SharedStats = Arc<RwLock<RuntimeStats>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_set_and_clear() {
        let stats: SharedStats = Arc::new(RwLock::new(RuntimeStats::default()));
        stats.write().set_error("camera unplugged");
        assert_eq!(stats.read().last_error.as_deref(), Some("camera unplugged"));

        stats.write().clear_error();
        assert!(stats.read().last_error.is_none());
    }
}
