//! Idle bobbing of a pack resting in the pool.

use bevy_ecs::prelude::Component;

/// Sinusoidal vertical float applied while the pack is at rest.
///
/// `active` is the only bobbing switch. It starts from the pool layout and is
/// flipped through [`BobbingState::set_active`]; the interaction system
/// additionally ignores the bob whenever the pack is not idle or hovered.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct BobbingState {
    pub base_y: f32,
    pub phase_offset: f32,
    pub amplitude: f32,
    pub speed: f32,
    pub active: bool,
}

impl BobbingState {
    pub fn new(base_y: f32, phase_offset: f32, amplitude: f32, speed: f32) -> Self {
        Self {
            base_y,
            phase_offset,
            amplitude,
            speed,
            active: true,
        }
    }

    /// Switch the bob on or off. Returns `false` when nothing changed.
    ///
    /// Turning it back on reinitializes the wave from `base_y` and
    /// `phase_offset`.
    pub fn set_active(&mut self, active: bool, base_y: f32, phase_offset: f32) -> bool {
        if self.active == active {
            return false;
        }
        self.active = active;
        if active {
            self.base_y = base_y;
            self.phase_offset = phase_offset;
        }
        true
    }

    /// `base_y + amplitude · sin(elapsed · speed + phase_offset)`, or `None` when inactive.
    pub fn height(&self, elapsed: f32) -> Option<f32> {
        self.active.then(|| {
            self.base_y + self.amplitude * (elapsed * self.speed + self.phase_offset).sin()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_height_follows_sine() {
        let bob = BobbingState::new(1.0, 0.0, 0.5, 2.0);
        assert!(approx_eq(bob.height(0.0).unwrap(), 1.0));
        let quarter = std::f32::consts::FRAC_PI_2 / 2.0;
        assert!(approx_eq(bob.height(quarter).unwrap(), 1.5));
    }

    #[test]
    fn test_phase_offset_shifts_wave() {
        let bob = BobbingState::new(0.0, std::f32::consts::FRAC_PI_2, 0.25, 1.0);
        assert!(approx_eq(bob.height(0.0).unwrap(), 0.25));
    }

    // ==================== TOGGLING ====================

    #[test]
    fn test_reenabling_reseeds_the_wave() {
        let mut bob = BobbingState::new(1.0, 0.3, 0.5, 2.0);
        assert!(bob.set_active(false, 9.0, 9.0));
        // switching off keeps the old seed
        assert!(approx_eq(bob.base_y, 1.0));
        assert!(!bob.set_active(false, 9.0, 9.0));

        assert!(bob.set_active(true, -2.0, std::f32::consts::FRAC_PI_2));
        assert!(approx_eq(bob.base_y, -2.0));
        assert!(approx_eq(bob.height(0.0).unwrap(), -1.5));
        assert!(!bob.set_active(true, 5.0, 0.0));
        assert!(approx_eq(bob.base_y, -2.0));
    }

    #[test]
    fn test_inactive_has_no_height() {
        let mut bob = BobbingState::new(0.0, 0.0, 1.0, 1.0);
        bob.active = false;
        assert!(bob.height(3.0).is_none());
    }
}
