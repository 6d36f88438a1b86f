//! Scroll event correlator
//!
//! Turns the host's raw scroll samples into index candidates. Live samples
//! use the rounding estimate; once scrolling is at rest the threshold
//! resolver has the final word.

use crate::geometry::{nearest_index, resolve_with_threshold, Viewport};

/// Offsets closer than this are considered aligned
pub(crate) const ALIGN_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct ScrollCorrelator {
    last_offset: Option<f64>,
}

impl ScrollCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the most recent usable sample
    pub fn last_offset(&self) -> Option<f64> {
        self.last_offset
    }

    /// Per-frame candidate for a live sample.
    ///
    /// Samples that cannot be interpreted (NaN offset, unusable geometry)
    /// are dropped and return `None` so the caller keeps its index.
    pub fn on_sample(&mut self, offset: f64, viewport: Viewport, item_count: usize) -> Option<usize> {
        if offset.is_nan() || !viewport.is_valid() {
            return None;
        }
        self.last_offset = Some(offset);
        nearest_index(offset, viewport, item_count)
    }

    /// Authoritative index once motion has stopped at `offset`
    pub fn settle(
        &mut self,
        offset: f64,
        viewport: Viewport,
        item_count: usize,
        threshold: f64,
    ) -> Option<usize> {
        if offset.is_nan() || !viewport.is_valid() {
            return None;
        }
        self.last_offset = Some(offset);
        resolve_with_threshold(offset, viewport, item_count, threshold)
    }

    /// Whether the last sample already sits on `target`
    pub fn is_aligned_with(&self, target: f64) -> bool {
        self.last_offset
            .map(|offset| (offset - target).abs() < ALIGN_EPSILON)
            .unwrap_or(true)
    }

    pub fn reset(&mut self) {
        self.last_offset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{resolve, DEFAULT_THRESHOLD};

    #[test]
    fn test_live_samples_round() {
        let viewport = Viewport::new(300.0, 300.0);
        let mut correlator = ScrollCorrelator::new();
        assert_eq!(correlator.on_sample(0.0, viewport, 5), Some(0));
        assert_eq!(correlator.on_sample(149.0, viewport, 5), Some(0));
        assert_eq!(correlator.on_sample(151.0, viewport, 5), Some(1));
        assert_eq!(correlator.last_offset(), Some(151.0));
    }

    #[test]
    fn test_unusable_samples_dropped() {
        let mut correlator = ScrollCorrelator::new();
        correlator.on_sample(300.0, Viewport::new(300.0, 300.0), 5);

        assert_eq!(correlator.on_sample(600.0, Viewport::new(0.0, 300.0), 5), None);
        assert_eq!(correlator.on_sample(f64::NAN, Viewport::new(300.0, 300.0), 5), None);
        assert_eq!(correlator.last_offset(), Some(300.0));
    }

    #[test]
    fn test_settle_matches_resolver() {
        // Wide window: rounding and threshold disagree mid-scroll
        let viewport = Viewport::new(600.0, 300.0);
        let mut correlator = ScrollCorrelator::new();
        assert_eq!(correlator.on_sample(140.0, viewport, 5), Some(0));
        assert_eq!(
            correlator.settle(140.0, viewport, 5, DEFAULT_THRESHOLD),
            resolve(140.0, viewport, 5)
        );
        assert_eq!(correlator.settle(140.0, viewport, 5, DEFAULT_THRESHOLD), Some(1));
    }

    #[test]
    fn test_alignment() {
        let mut correlator = ScrollCorrelator::new();
        assert!(correlator.is_aligned_with(300.0));
        correlator.on_sample(299.8, Viewport::new(300.0, 300.0), 5);
        assert!(correlator.is_aligned_with(300.0));
        assert!(!correlator.is_aligned_with(600.0));
        correlator.reset();
        assert_eq!(correlator.last_offset(), None);
    }
}
