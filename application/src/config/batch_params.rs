//! Batch driver parameters.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const MAX_WORKERS_LIMIT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchParams {
    /// Concurrent captures. Always within `1..=MAX_WORKERS_LIMIT`.
    max_workers: usize,
}

impl Default for BatchParams {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl BatchParams {
    /// Out-of-range values are clamped, not rejected.
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.clamp(1, MAX_WORKERS_LIMIT),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped() {
        assert_eq!(BatchParams::new(0).max_workers(), 1);
        assert_eq!(BatchParams::new(8).max_workers(), 8);
        assert_eq!(BatchParams::new(64).max_workers(), MAX_WORKERS_LIMIT);
        assert_eq!(BatchParams::default().max_workers(), 4);
    }
}
