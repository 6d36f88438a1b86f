//! Time and curve helpers for scroll animations

use std::time::{Duration, Instant};

use carousel_core::EasingType;

/// Linear progress in [0.0, 1.0] at `now`
#[inline]
pub fn progress(start: Instant, duration: Duration, now: Instant) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[inline]
pub fn is_complete(start: Instant, duration: Duration, now: Instant) -> bool {
    now.saturating_duration_since(start) >= duration
}

/// Map linear progress through an easing curve; both ends are fixed at 0 and 1
pub fn ease(easing: EasingType, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let remaining = 1.0 - t;
    match easing {
        EasingType::None => {
            if t < 1.0 {
                0.0
            } else {
                1.0
            }
        }
        EasingType::Linear => t,
        EasingType::Cubic => 1.0 - remaining.powi(3),
        EasingType::Quintic => 1.0 - remaining.powi(5),
        EasingType::EaseOut if t >= 1.0 => 1.0,
        EasingType::EaseOut => 1.0 - 2.0_f64.powf(-10.0 * t),
    }
}

#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
