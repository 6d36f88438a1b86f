pub mod event;
pub mod feed;
pub mod indicators;
pub mod runtime;
pub mod scenario;
pub mod scroll;

pub use event::{HostEvent, RuntimeEvent};
pub use feed::FeedCoordinator;
pub use indicators::render_indicators;
pub use runtime::CarouselRuntime;
pub use scenario::Scenario;
