//! Question-section speed deceleration.
//!
//! Armed when a question section's start row is raised: the scroll eases
//! from full speed down to a dead stop across the remaining section length,
//! holding zero until the stage returns to free running.

use crate::extensions::easing::pow_in;

/// Progress beyond which the factor snaps to zero. The ease tail is
/// asymptotic; without the snap the scroll creeps toward the window end
/// forever and the full stop never arrives.
const STOP_PROGRESS: f32 = 0.999;

#[derive(Debug, Clone)]
pub struct Decelerator {
    power: f32,
    window: Option<(f32, f32)>,
}

impl Decelerator {
    pub fn new(power: f32) -> Self {
        Self {
            power,
            window: None,
        }
    }

    /// Arm the deceleration window in scroll-position space.
    pub fn arm(&mut self, start_z: f32, end_z: f32) {
        debug_assert!(end_z > start_z, "degenerate deceleration window");
        self.window = Some((start_z, end_z));
    }

    /// Disarm; the next `factor` call returns full speed.
    pub fn reset(&mut self) {
        self.window = None;
    }

    pub fn is_armed(&self) -> bool {
        self.window.is_some()
    }

    /// Speed multiplier for the current scroll position: 1 before the
    /// window, `1 - p^power` inside it, 0 from the end onward.
    pub fn factor(&self, scroll_pos: f32) -> f32 {
        match self.window {
            None => 1.0,
            Some((start, end)) => {
                let p = ((scroll_pos - start) / (end - start)).clamp(0.0, 1.0);
                if p >= STOP_PROGRESS {
                    0.0
                } else {
                    1.0 - pow_in(p, self.power)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unarmed_is_full_speed() {
        let decel = Decelerator::new(6.0);
        assert_eq!(decel.factor(0.0), 1.0);
        assert_eq!(decel.factor(1000.0), 1.0);
    }

    #[test]
    fn curve_matches_power_ease() {
        let mut decel = Decelerator::new(6.0);
        decel.arm(0.0, 10.0);
        for i in 0..=10 {
            let z = i as f32;
            let expected = 1.0 - (z / 10.0).powi(6);
            assert!(
                (decel.factor(z) - expected).abs() < 1e-5,
                "z = {}: {} vs {}",
                z,
                decel.factor(z),
                expected
            );
        }
    }

    #[test]
    fn curve_is_strictly_decreasing() {
        let mut decel = Decelerator::new(6.0);
        decel.arm(0.0, 10.0);
        let mut prev = decel.factor(0.0);
        assert_eq!(prev, 1.0);
        for i in 1..=10 {
            let cur = decel.factor(i as f32);
            assert!(cur < prev, "not decreasing at {}", i);
            prev = cur;
        }
        assert_eq!(prev, 0.0);
    }

    #[test]
    fn holds_zero_past_window_until_reset() {
        let mut decel = Decelerator::new(6.0);
        decel.arm(5.0, 15.0);
        assert_eq!(decel.factor(4.0), 1.0);
        assert_eq!(decel.factor(15.0), 0.0);
        assert_eq!(decel.factor(50.0), 0.0);
        decel.reset();
        assert_eq!(decel.factor(50.0), 1.0);
    }
}
