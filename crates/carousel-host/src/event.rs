use carousel_core::{CarouselItem, SchedulerState, ScrollCommand};
use serde::{Deserialize, Serialize};

/// Input delivered to the runtime by the host UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    /// User-driven scroll position
    Sample { offset: f64 },
    /// Finger down on the carousel
    DragStart,
    /// Finger up
    DragEnd,
    /// Feed-level visibility gate
    SetVisible { visible: bool },
    /// Replace the item list
    SetItems { items: Vec<CarouselItem> },
    /// Change the auto-advance period (0 disables)
    SetInterval { interval_ms: u64 },
    /// Container width from a layout pass
    Layout { container_width: f64 },
    /// Jump to an item, e.g. after tapping an indicator
    ScrollToIndex {
        index: usize,
        #[serde(default = "default_animated")]
        animated: bool,
    },
}

fn default_animated() -> bool {
    true
}

/// Notifications emitted by the runtime.
/// `at_ms` is measured from the moment the runtime started.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RuntimeEvent {
    /// A different item became active
    ActiveChanged {
        at_ms: u64,
        index: usize,
        item_count: usize,
    },
    /// The controller asked the view to scroll
    ScrollIssued { at_ms: u64, command: ScrollCommand },
    /// Auto-advance scheduler moved between Idle, Armed and Suspended
    StateChanged { at_ms: u64, state: SchedulerState },
    /// The runtime exited and the controller was shut down
    Stopped { at_ms: u64, current: Option<usize> },
}
