//! Geometry and visibility resolution
//!
//! Pure functions that map a horizontal scroll offset to the single active
//! item, plus the per-index geometry table the controller keeps for layout
//! measurements reported by the host.

/// Fraction of an item that must be on screen for it to be active
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Horizontal geometry shared by every item in a carousel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width of the visible window
    pub container_width: f64,
    /// Width of one item (uniform)
    pub item_width: f64,
}

impl Viewport {
    pub fn new(container_width: f64, item_width: f64) -> Self {
        Self {
            container_width,
            item_width,
        }
    }

    /// Both widths are finite and positive
    #[inline]
    pub fn is_valid(&self) -> bool {
        is_positive(self.container_width) && is_positive(self.item_width)
    }

    /// Largest reachable scroll offset for `item_count` items
    pub fn max_offset(&self, item_count: usize) -> f64 {
        (item_count as f64 * self.item_width - self.container_width).max(0.0)
    }

    /// Clamp a raw offset into `[0, max_offset]`; NaN maps to 0
    pub fn clamp_offset(&self, offset: f64, item_count: usize) -> f64 {
        if offset.is_nan() {
            return 0.0;
        }
        offset.clamp(0.0, self.max_offset(item_count))
    }

    /// Scroll offset that aligns item `index` with the left edge
    #[inline]
    pub fn offset_of(&self, index: usize) -> f64 {
        index as f64 * self.item_width
    }
}

#[inline]
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Fraction of the span `[start, start + width)` inside `[window, window + window_width)`
#[inline]
pub fn visibility_ratio(start: f64, width: f64, window: f64, window_width: f64) -> f64 {
    if !is_positive(width) {
        return 0.0;
    }
    let overlap = (start + width).min(window + window_width) - start.max(window);
    (overlap.max(0.0) / width).clamp(0.0, 1.0)
}

/// Resolve the active index using the default 0.8 threshold
pub fn resolve(offset: f64, viewport: Viewport, item_count: usize) -> Option<usize> {
    resolve_with_threshold(offset, viewport, item_count, DEFAULT_THRESHOLD)
}

/// Resolve the active index for a scroll offset.
///
/// Returns the lowest index whose visibility ratio is at least `threshold`.
/// When no item qualifies (mid-fling) the rounding fallback of
/// [`nearest_index`] is used. `None` for an empty list or when the geometry
/// cannot determine visibility.
pub fn resolve_with_threshold(
    offset: f64,
    viewport: Viewport,
    item_count: usize,
    threshold: f64,
) -> Option<usize> {
    if item_count == 0 || !viewport.is_valid() {
        return None;
    }
    if item_count == 1 {
        return Some(0);
    }

    let threshold = if threshold.is_nan() {
        DEFAULT_THRESHOLD
    } else {
        threshold.clamp(f64::EPSILON, 1.0)
    };
    let offset = viewport.clamp_offset(offset, item_count);
    let window_end = offset + viewport.container_width;

    // Items ending at or before `offset` have no overlap, start from the first one that might
    let first = ((offset / viewport.item_width).floor() as usize).min(item_count - 1);
    for index in first..item_count {
        let start = viewport.offset_of(index);
        if start >= window_end {
            break;
        }
        let ratio = visibility_ratio(start, viewport.item_width, offset, viewport.container_width);
        if ratio >= threshold {
            return Some(index);
        }
    }

    nearest_index(offset, viewport, item_count)
}

/// Cheap per-frame estimate: `round(offset / item_width)` clamped into range
pub fn nearest_index(offset: f64, viewport: Viewport, item_count: usize) -> Option<usize> {
    if item_count == 0 || !viewport.is_valid() {
        return None;
    }
    let offset = viewport.clamp_offset(offset, item_count);
    let index = (offset / viewport.item_width).round() as usize;
    Some(index.min(item_count - 1))
}

/// Measured placement of one item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemGeometry {
    pub x: f64,
    pub width: f64,
}

/// Geometry records indexed by item position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryTable {
    records: Vec<ItemGeometry>,
}

impl GeometryTable {
    /// Seed one record per item from uniform geometry
    pub fn uniform(item_count: usize, item_width: f64) -> Self {
        let width = if is_positive(item_width) { item_width } else { 0.0 };
        let records = (0..item_count)
            .map(|index| ItemGeometry {
                x: index as f64 * width,
                width,
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ItemGeometry> {
        self.records.get(index)
    }

    /// Store a layout measurement for `index`.
    ///
    /// Zero or invalid widths are transient layout passes and are dropped,
    /// keeping the previous record. Returns whether the record was updated.
    pub fn record(&mut self, index: usize, x: f64, width: f64) -> bool {
        if !is_positive(width) || !x.is_finite() {
            tracing::warn!(index, x, width, "Ignoring unusable item measurement");
            return false;
        }
        match self.records.get_mut(index) {
            Some(slot) => {
                *slot = ItemGeometry { x, width };
                true
            }
            None => {
                tracing::warn!(index, len = self.records.len(), "Measurement for unknown item");
                false
            }
        }
    }

    /// Scroll offset that brings item `index` to the left edge
    pub fn offset_of(&self, index: usize) -> Option<f64> {
        self.records.get(index).map(|g| g.x)
    }

    /// Visibility ratio of item `index` for a window starting at `offset`
    pub fn visibility(&self, index: usize, offset: f64, container_width: f64) -> f64 {
        self.records
            .get(index)
            .map(|g| visibility_ratio(g.x, g.width, offset, container_width))
            .unwrap_or(0.0)
    }
}
