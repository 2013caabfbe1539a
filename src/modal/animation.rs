//! Linear slide animation, advanced by explicit time steps so the modal state
//! machine needs no real clock.

use std::time::Duration;

/// Interpolates from `from` to `to` over a fixed duration with linear easing.
#[derive(Clone, Debug, PartialEq)]
pub struct SlideAnimation {
    from: f64,
    to: f64,
    duration: Duration,
    elapsed: Duration,
}

impl SlideAnimation {
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Step the animation forward. Saturates at the end value.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    /// Current interpolated value.
    pub fn value(&self) -> f64 {
        if self.finished() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * t
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> f64 {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_midpoint() {
        let mut anim = SlideAnimation::new(100.0, 0.0, Duration::from_millis(200));
        anim.advance(Duration::from_millis(100));
        assert!((anim.value() - 50.0).abs() < f64::EPSILON);
        assert!(!anim.finished());
    }

    #[test]
    fn test_advance_saturates_at_target() {
        let mut anim = SlideAnimation::new(0.0, 300.0, Duration::from_millis(200));
        anim.advance(Duration::from_secs(5));
        assert!(anim.finished());
        assert_eq!(anim.value(), 300.0);
        anim.advance(Duration::from_secs(1));
        assert_eq!(anim.value(), 300.0);
    }

    #[test]
    fn test_zero_duration_is_immediately_finished() {
        let anim = SlideAnimation::new(10.0, 20.0, Duration::ZERO);
        assert!(anim.finished());
        assert_eq!(anim.value(), 20.0);
    }
}
