//! Carousel controller
//!
//! Owns the active index and composes the correlator, interruption gate and
//! scheduler. The controller is sans-IO: the host feeds it scroll samples,
//! drag signals and the current time, and executes the [`ScrollCommand`]s it
//! hands back.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CarouselConfig;
use crate::correlator::{ScrollCorrelator, ALIGN_EPSILON};
use crate::gate::InterruptionGate;
use crate::geometry::{resolve_with_threshold, GeometryTable, Viewport};
use crate::scheduler::{advance, Scheduler, SchedulerState, Tick};

/// One entry of the carousel. Its position in the list is its index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselItem {
    pub id: String,
    /// Opaque reference to the media shown by the host
    #[serde(default)]
    pub media_ref: String,
}

impl CarouselItem {
    pub fn new(id: impl Into<String>, media_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_ref: media_ref.into(),
        }
    }
}

/// Fire-and-forget request for the host to scroll its view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollCommand {
    /// Item the scroll lands on
    pub index: usize,
    /// Target horizontal offset
    pub offset: f64,
    pub animated: bool,
}

#[derive(Debug, Clone)]
pub struct CarouselController {
    items: Vec<CarouselItem>,
    config: CarouselConfig,
    geometry: GeometryTable,
    correlator: ScrollCorrelator,
    gate: InterruptionGate,
    scheduler: Scheduler,
    visible: bool,
    current: Option<usize>,
    /// Index of the last scroll this controller issued, until the user moves the view
    resting: Option<usize>,
    shut_down: bool,
}

impl CarouselController {
    /// Create a controller; the timer arms immediately when eligible
    pub fn new(
        items: Vec<CarouselItem>,
        config: CarouselConfig,
        visible: bool,
        now: Instant,
    ) -> Self {
        let geometry = GeometryTable::uniform(items.len(), config.item_width);
        let interval = config.interval().unwrap_or(Duration::ZERO);
        let current = if items.is_empty() { None } else { Some(0) };
        let mut controller = Self {
            items,
            config,
            geometry,
            correlator: ScrollCorrelator::new(),
            gate: InterruptionGate::new(),
            scheduler: Scheduler::new(interval),
            visible,
            current,
            resting: None,
            shut_down: false,
        };
        controller.rearm(now);
        controller
    }

    // --- Queries ---

    /// The single active item, absent when there are no items
    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn active_item(&self) -> Option<&CarouselItem> {
        self.current.and_then(|index| self.items.get(index))
    }

    /// Whether item `index` may play right now
    pub fn is_active(&self, index: usize) -> bool {
        self.current == Some(index)
    }

    pub fn items(&self) -> &[CarouselItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.config.viewport()
    }

    pub fn geometry(&self) -> &GeometryTable {
        &self.geometry
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// When the host should next call [`poll`](Self::poll)
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    pub fn is_dragging(&self) -> bool {
        self.gate.is_dragging()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Threshold-based answer for "which item is active at `offset`"
    pub fn resolve_at(&self, offset: f64) -> Option<usize> {
        resolve_with_threshold(
            offset,
            self.viewport(),
            self.items.len(),
            self.config.visibility_threshold,
        )
    }

    /// Visibility ratio of one item for a window starting at `offset`
    pub fn item_visibility(&self, index: usize, offset: f64) -> f64 {
        self.geometry
            .visibility(index, offset, self.config.container_width)
    }

    // --- Scroll input ---

    /// Live scroll sample. Returns the new index when it changed.
    pub fn on_scroll_sample(&mut self, offset: f64) -> Option<usize> {
        if self.shut_down {
            return None;
        }
        let candidate = self
            .correlator
            .on_sample(offset, self.viewport(), self.items.len())?;
        self.resting = None;
        self.set_current(candidate)
    }

    /// Scrolling came to rest at `offset`. Returns the new index when it changed.
    ///
    /// A view resting where the controller's own scroll put it keeps the
    /// commanded item. Trailing items whose left edge lies beyond the last
    /// reachable offset share that offset with an earlier item, so the
    /// resolver alone would hand the index back to the earlier one.
    pub fn on_scroll_settled(&mut self, offset: f64) -> Option<usize> {
        if self.shut_down {
            return None;
        }
        let resolved = self.correlator.settle(
            offset,
            self.viewport(),
            self.items.len(),
            self.config.visibility_threshold,
        )?;
        if let Some(index) = self.resting {
            let at_rest = self.viewport().clamp_offset(offset, self.items.len());
            let on_target = self
                .target_of(index)
                .is_some_and(|target| (target - at_rest).abs() < ALIGN_EPSILON);
            if on_target && self.current == Some(index) {
                return None;
            }
            self.resting = None;
        }
        self.set_current(resolved)
    }

    /// Container width reported by a layout pass; zero-width passes are ignored
    pub fn on_layout(&mut self, container_width: f64, now: Instant) {
        if !container_width.is_finite() || container_width <= 0.0 {
            warn!(container_width, "Ignoring layout sample without width");
            return;
        }
        if container_width == self.config.container_width {
            return;
        }
        self.config.container_width = container_width;
        self.rearm(now);
    }

    /// Per-item placement reported by the host
    pub fn on_item_measured(&mut self, index: usize, x: f64, width: f64) -> bool {
        self.geometry.record(index, x, width)
    }

    // --- Drag input ---

    pub fn on_drag_start(&mut self) {
        if self.shut_down || !self.gate.begin_drag() {
            return;
        }
        debug!(current = ?self.current, "Drag started");
        self.resting = None;
        self.scheduler.suspend();
    }

    /// Ends a drag and restarts the timer from a full interval.
    ///
    /// With `snap_on_release`, returns a command aligning the view to the
    /// active item if the drag left it between items.
    pub fn on_drag_end(&mut self, now: Instant) -> Option<ScrollCommand> {
        if self.shut_down || !self.gate.end_drag() {
            return None;
        }
        debug!(current = ?self.current, "Drag ended");
        self.scheduler.resume(now);

        if !self.config.snap_on_release {
            return None;
        }
        let index = self.current?;
        let offset = self.target_of(index)?;
        if self.correlator.is_aligned_with(offset) {
            return None;
        }
        self.resting = Some(index);
        Some(ScrollCommand {
            index,
            offset,
            animated: true,
        })
    }

    // --- Timer ---

    /// Advance if a tick is due at `now`
    pub fn poll(&mut self, now: Instant) -> Option<ScrollCommand> {
        if self.shut_down {
            return None;
        }
        let tick = self.scheduler.poll(now)?;
        self.apply_tick(tick)
    }

    /// Apply a tick produced by this controller's scheduler.
    ///
    /// Ticks from an earlier epoch (before a drag, cancel or reconfiguration)
    /// are dropped.
    pub fn apply_tick(&mut self, tick: Tick) -> Option<ScrollCommand> {
        if self.shut_down || !self.scheduler.accept(&tick) {
            debug!(epoch = tick.epoch, "Dropping stale tick");
            return None;
        }
        let current = self.current?;
        let next = advance(current, self.items.len())?;
        let offset = self.target_of(next)?;
        self.current = Some(next);
        self.resting = Some(next);
        debug!(from = current, to = next, offset, "Auto-advance");
        Some(ScrollCommand {
            index: next,
            offset,
            animated: self.config.animated,
        })
    }

    // --- Host commands ---

    /// Jump to an item; the running interval is left untouched.
    ///
    /// `None` when the index is out of range or the geometry is unusable.
    pub fn scroll_to_index(&mut self, index: usize, animated: bool) -> Option<ScrollCommand> {
        if self.shut_down {
            return None;
        }
        let offset = self.target_of(index)?;
        self.set_current(index);
        self.resting = Some(index);
        Some(ScrollCommand {
            index,
            offset,
            animated,
        })
    }

    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.rearm(now);
    }

    /// Replace the item list, clamping the active index into the new range
    pub fn set_items(&mut self, items: Vec<CarouselItem>, now: Instant) {
        self.current = match (self.current, items.len()) {
            (_, 0) => None,
            (Some(index), len) => Some(index.min(len - 1)),
            (None, _) => Some(0),
        };
        self.geometry = GeometryTable::uniform(items.len(), self.config.item_width);
        self.items = items;
        self.rearm(now);
    }

    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.config.interval_ms = interval.as_millis() as u64;
        self.rearm(now);
    }

    pub fn set_geometry(&mut self, viewport: Viewport, now: Instant) {
        let item_width_changed = viewport.item_width != self.config.item_width;
        self.config.container_width = viewport.container_width;
        self.config.item_width = viewport.item_width;
        if item_width_changed {
            self.geometry = GeometryTable::uniform(self.items.len(), viewport.item_width);
        }
        self.rearm(now);
    }

    /// Replace the whole configuration
    pub fn set_config(&mut self, config: CarouselConfig, now: Instant) {
        if config.item_width != self.config.item_width {
            self.geometry = GeometryTable::uniform(self.items.len(), config.item_width);
        }
        self.config = config;
        self.rearm(now);
    }

    /// Cancel the timer for good. Nothing fires or re-arms afterwards.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.scheduler.cancel();
        self.shut_down = true;
        info!(items = self.items.len(), "Carousel controller shut down");
    }

    fn can_advance(&self) -> bool {
        !self.shut_down
            && self.visible
            && self.items.len() > 1
            && self.viewport().is_valid()
            && self.config.interval().is_some()
    }

    /// Drop the running timer, then start a fresh one if still eligible
    fn rearm(&mut self, now: Instant) {
        let before = self.scheduler.state();
        self.scheduler.cancel();

        if let Some(interval) = self.config.interval() {
            self.scheduler.set_interval(interval);
        }
        if self.can_advance() {
            self.scheduler.arm(now);
            if self.gate.is_dragging() {
                self.scheduler.suspend();
            }
        } else if self.visible && self.items.len() > 1 && !self.viewport().is_valid() {
            warn!(
                item_width = self.config.item_width,
                container_width = self.config.container_width,
                "Carousel geometry unusable; auto-advance idle"
            );
        }

        let after = self.scheduler.state();
        if before != after {
            debug!(?before, ?after, "Scheduler state changed");
        }
    }

    /// Reachable offset that brings item `index` into view
    fn target_of(&self, index: usize) -> Option<f64> {
        let viewport = self.viewport();
        if !viewport.is_valid() {
            return None;
        }
        let x = self.geometry.offset_of(index)?;
        Some(viewport.clamp_offset(x, self.items.len()))
    }

    fn set_current(&mut self, index: usize) -> Option<usize> {
        if self.current == Some(index) {
            return None;
        }
        debug!(from = ?self.current, to = index, "Active item changed");
        self.current = Some(index);
        Some(index)
    }
}
