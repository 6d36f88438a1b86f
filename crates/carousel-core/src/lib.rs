pub mod config;
pub mod controller;
pub mod correlator;
pub mod error;
pub mod gate;
pub mod geometry;
pub mod scheduler;

pub use config::{AppConfig, CarouselConfig, EasingType, ScrollConfig};
pub use controller::{CarouselController, CarouselItem, ScrollCommand};
pub use error::{Error, Result};
pub use geometry::{resolve, resolve_with_threshold, Viewport};
pub use scheduler::{Scheduler, SchedulerState};
