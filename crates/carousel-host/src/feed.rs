//! Feed-level visibility policy
//!
//! A vertical feed may contain several carousels. Only one of them is
//! allowed to auto-advance; the coordinator decides which and the host
//! forwards the result to each runtime as `HostEvent::SetVisible`.

use carousel_core::geometry::visibility_ratio;

/// Visibility flip for one carousel in the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub carousel: usize,
    pub visible: bool,
}

/// Vertical placement of a carousel row inside the feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSpan {
    pub y: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct FeedCoordinator {
    threshold: f64,
    active: Option<usize>,
}

impl FeedCoordinator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            active: None,
        }
    }

    /// The carousel currently allowed to auto-advance
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Pick the lowest-index carousel whose on-screen ratio reaches the threshold
    pub fn update(&mut self, ratios: &[f64]) -> Vec<VisibilityChange> {
        let next = ratios.iter().position(|&ratio| ratio >= self.threshold);
        if next == self.active {
            return Vec::new();
        }

        let mut changes = Vec::with_capacity(2);
        if let Some(previous) = self.active {
            changes.push(VisibilityChange {
                carousel: previous,
                visible: false,
            });
        }
        if let Some(carousel) = next {
            changes.push(VisibilityChange {
                carousel,
                visible: true,
            });
        }
        tracing::debug!(from = ?self.active, to = ?next, "Feed active carousel changed");
        self.active = next;
        changes
    }

    /// Compute ratios from the feed's vertical scroll position and update
    pub fn update_from_layout(
        &mut self,
        scroll_y: f64,
        viewport_height: f64,
        rows: &[RowSpan],
    ) -> Vec<VisibilityChange> {
        let ratios: Vec<f64> = rows
            .iter()
            .map(|row| visibility_ratio(row.y, row.height, scroll_y, viewport_height))
            .collect();
        self.update(&ratios)
    }
}
