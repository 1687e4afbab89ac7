/// Progress reached once metadata is resolved and the transfer starts.
pub const TRANSFER_BASELINE: u8 = 10;
/// Share of the bar covered by the byte transfer itself.
pub const TRANSFER_SPAN: u8 = 80;
/// Points added per chunk when the backend sends no Content-Length.
pub const CHUNK_INCREMENT: u8 = 2;

const TRANSFER_CEILING: u8 = TRANSFER_BASELINE + TRANSFER_SPAN;

/// Heuristic mapping from bytes received to a displayed percentage.
///
/// Setup owns 0..10, the transfer 10..90 and finalization the rest; 100 is
/// only reported by the orchestrator once the artifact is saved. Values
/// returned by [`ProgressEstimator::on_chunk`] never decrease.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    total_size: Option<u64>,
    received: u64,
    current: u8,
}

impl ProgressEstimator {
    pub fn new(total_size: Option<u64>) -> Self {
        Self {
            // zero is as good as no hint
            total_size: total_size.filter(|&t| t > 0),
            received: 0,
            current: TRANSFER_BASELINE,
        }
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    /// Account for a chunk of `len` bytes and return the new estimate.
    pub fn on_chunk(&mut self, len: usize) -> u8 {
        self.received = self.received.saturating_add(len as u64);

        let estimate = match self.total_size {
            Some(total) => {
                let ratio = self.received as f64 / total as f64;
                let value = (TRANSFER_BASELINE as f64 + ratio * TRANSFER_SPAN as f64).floor();
                value.clamp(TRANSFER_BASELINE as f64, TRANSFER_CEILING as f64) as u8
            }
            None => self
                .current
                .saturating_add(CHUNK_INCREMENT)
                .min(TRANSFER_CEILING),
        };

        self.current = self.current.max(estimate);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_baseline() {
        assert_eq!(ProgressEstimator::new(Some(100)).current(), TRANSFER_BASELINE);
    }

    #[test]
    fn test_known_size_maps_into_transfer_span() {
        let mut estimator = ProgressEstimator::new(Some(1_000));
        assert_eq!(estimator.on_chunk(250), 30);
        assert_eq!(estimator.on_chunk(250), 50);
        assert_eq!(estimator.on_chunk(500), 90);
        assert_eq!(estimator.received(), 1_000);
    }

    #[test]
    fn test_known_size_is_clamped_when_hint_is_too_small() {
        let mut estimator = ProgressEstimator::new(Some(100));
        assert_eq!(estimator.on_chunk(1_000), 90);
    }

    #[test]
    fn test_floor_of_partial_progress() {
        let mut estimator = ProgressEstimator::new(Some(1_000_000));
        // 10 + 0.0999 * 80 = 17.992
        assert_eq!(estimator.on_chunk(99_900), 17);
    }

    #[test]
    fn test_unknown_size_increments_and_caps() {
        let mut estimator = ProgressEstimator::new(None);
        assert_eq!(estimator.on_chunk(10), 12);
        assert_eq!(estimator.on_chunk(10), 14);
        for _ in 0..100 {
            estimator.on_chunk(10);
        }
        assert_eq!(estimator.current(), 90);
    }

    #[test]
    fn test_zero_hint_treated_as_unknown() {
        let mut estimator = ProgressEstimator::new(Some(0));
        assert_eq!(estimator.on_chunk(10), 12);
    }

    #[test]
    fn test_monotonic_for_any_chunk_sequence() {
        let mut estimator = ProgressEstimator::new(Some(10_000));
        let mut last = estimator.current();
        for len in [0, 1, 7, 0, 4_000, 3, 9_999, 0] {
            let next = estimator.on_chunk(len);
            assert!(next >= last);
            last = next;
        }
    }
}
