//! Scroll animation for the reference host
//!
//! Executes the controller's scroll commands over continuous offsets and
//! reports where each one comes to rest.
//!
//! # Layers
//!
//! - `timing` - Progress, easing curves and interpolation
//! - `animation` - Animator driving the simulated view
//!
//! # Usage
//!
//! ```ignore
//! use carousel_host::scroll::{animation::Frame, ScrollAnimator};
//!
//! let mut animator = ScrollAnimator::with_defaults();
//! if let Some(offset) = animator.execute(command, max_offset, Instant::now()) {
//!     controller.on_scroll_settled(offset);
//! }
//!
//! // Every `animator.frame_interval()`:
//! if let Some(Frame::Settled(offset)) = animator.update(Instant::now()) {
//!     controller.on_scroll_settled(offset);
//! }
//! ```

pub mod timing;

pub mod animation;

pub use animation::ScrollAnimator;
pub use carousel_core::{EasingType, ScrollConfig};
pub use timing::ease;
