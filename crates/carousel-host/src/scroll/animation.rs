//! Scroll animation controller
//!
//! Executes [`ScrollCommand`]s against a simulated horizontal scroll view.

use std::time::{Duration, Instant};

use carousel_core::ScrollCommand;

use super::timing::{ease, is_complete, lerp, progress};
use super::{EasingType, ScrollConfig};

/// Frame rate used when the configured one is zero
const FALLBACK_FPS: u32 = 60;

#[derive(Debug, Clone)]
struct ActiveAnimation {
    start: Instant,
    from: f64,
    to: f64,
    duration: Duration,
    easing: EasingType,
}

/// Result of advancing the animation by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// Still travelling; the offset is a live sample
    Moving(f64),
    /// Reached the target and stopped
    Settled(f64),
}

impl Frame {
    pub fn offset(&self) -> f64 {
        match *self {
            Frame::Moving(offset) | Frame::Settled(offset) => offset,
        }
    }
}

/// Owns the simulated scroll offset.
///
/// Call [`execute`](Self::execute) with a controller command, then
/// [`update`](Self::update) once per frame while [`is_animating`](Self::is_animating).
#[derive(Debug, Clone, Default)]
pub struct ScrollAnimator {
    animation: Option<ActiveAnimation>,
    config: ScrollConfig,
    offset: f64,
}

impl ScrollAnimator {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            animation: None,
            config,
            offset: 0.0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn set_config(&mut self, config: ScrollConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Time between frames while an animation runs
    pub fn frame_interval(&self) -> Duration {
        let fps = match self.config.animation_fps {
            0 => FALLBACK_FPS,
            fps => fps,
        };
        Duration::from_millis(1000 / u64::from(fps))
    }

    /// Whether animated commands actually glide
    fn glides(&self) -> bool {
        self.config.smooth_enabled && self.config.animation_duration_ms > 0
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Current (possibly mid-animation) offset
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Where the view ends up once the running animation completes
    pub fn target_offset(&self) -> f64 {
        self.animation.as_ref().map(|a| a.to).unwrap_or(self.offset)
    }

    /// Move the view directly (user drag); any animation is dropped
    pub fn set_offset(&mut self, offset: f64, max_offset: f64) {
        self.animation = None;
        self.offset = offset.clamp(0.0, max_offset.max(0.0));
    }

    /// Start executing a scroll command.
    ///
    /// Returns the settled offset when the command completes immediately
    /// (not animated, smoothing disabled, or already there).
    pub fn execute(&mut self, command: ScrollCommand, max_offset: f64, now: Instant) -> Option<f64> {
        let target = command.offset.clamp(0.0, max_offset.max(0.0));

        if !command.animated || !self.glides() || target == self.offset {
            self.animation = None;
            self.offset = target;
            return Some(target);
        }

        self.animation = Some(ActiveAnimation {
            start: now,
            from: self.offset,
            to: target,
            duration: Duration::from_millis(self.config.animation_duration_ms),
            easing: self.config.easing,
        });
        None
    }

    /// Advance to `now`. `None` when nothing is animating.
    pub fn update(&mut self, now: Instant) -> Option<Frame> {
        let anim = self.animation.as_ref()?;

        if is_complete(anim.start, anim.duration, now) {
            self.offset = anim.to;
            self.animation = None;
            return Some(Frame::Settled(self.offset));
        }

        let t = ease(anim.easing, progress(anim.start, anim.duration, now));
        self.offset = lerp(anim.from, anim.to, t);
        Some(Frame::Moving(self.offset))
    }

    /// Stop where the view currently is
    pub fn cancel(&mut self) {
        self.animation = None;
    }

    pub fn reset(&mut self) {
        self.animation = None;
        self.offset = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(offset: f64, animated: bool) -> ScrollCommand {
        ScrollCommand {
            index: (offset / 300.0) as usize,
            offset,
            animated,
        }
    }

    #[test]
    fn test_instant_when_not_animated() {
        let mut animator = ScrollAnimator::with_defaults();
        let settled = animator.execute(command(600.0, false), 1200.0, Instant::now());
        assert_eq!(settled, Some(600.0));
        assert_eq!(animator.offset(), 600.0);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_instant_when_smoothing_disabled() {
        let mut animator = ScrollAnimator::new(ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        });
        assert_eq!(animator.execute(command(300.0, true), 1200.0, Instant::now()), Some(300.0));
    }

    #[test]
    fn test_animation_runs_to_target() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::new(ScrollConfig {
            animation_duration_ms: 100,
            easing: EasingType::Linear,
            ..Default::default()
        });
        assert_eq!(animator.execute(command(300.0, true), 1200.0, t0), None);
        assert!(animator.is_animating());
        assert_eq!(animator.target_offset(), 300.0);

        let frame = animator.update(t0 + Duration::from_millis(50)).unwrap();
        assert!(matches!(frame, Frame::Moving(o) if (o - 150.0).abs() < 1e-6));

        let frame = animator.update(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(frame, Frame::Settled(300.0));
        assert!(animator.update(t0 + Duration::from_millis(120)).is_none());
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut animator = ScrollAnimator::new(ScrollConfig {
            animation_duration_ms: 0,
            ..Default::default()
        });
        assert_eq!(animator.execute(command(600.0, true), 1200.0, Instant::now()), Some(600.0));
    }

    #[test]
    fn test_frame_interval() {
        let mut animator = ScrollAnimator::with_defaults();
        assert_eq!(animator.frame_interval(), Duration::from_millis(16));

        animator.set_config(ScrollConfig {
            animation_fps: 20,
            ..Default::default()
        });
        assert_eq!(animator.frame_interval(), Duration::from_millis(50));

        animator.set_config(ScrollConfig {
            animation_fps: 0,
            ..Default::default()
        });
        assert_eq!(animator.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_target_clamped() {
        let mut animator = ScrollAnimator::with_defaults();
        animator.execute(command(5000.0, false), 1200.0, Instant::now());
        assert_eq!(animator.offset(), 1200.0);
    }

    #[test]
    fn test_drag_cancels_animation() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::with_defaults();
        animator.execute(command(300.0, true), 1200.0, t0);
        animator.set_offset(120.0, 1200.0);
        assert!(!animator.is_animating());
        assert_eq!(animator.offset(), 120.0);
        assert!(animator.update(t0 + Duration::from_secs(1)).is_none());
    }
}
