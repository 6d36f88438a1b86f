mod state;

pub use state::{advance, Scheduler, SchedulerState, Tick};
