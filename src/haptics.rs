//! Haptic feedback routing.
//!
//! The emulation core asks for rumble on a [`Vibrator`] it resolved through a
//! [`VibratorManager`](crate::vibrator::VibratorManager); [`vibrate`] turns
//! that into one named effect at a fixed intensity.

use crate::error::Result;
use crate::vibrator::{Amplitude, Vibrator};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Effect played for every rumble request.
pub const RUMBLE_EFFECT: HapticEffect = HapticEffect::Spin;

/// Intensity used for every rumble request.
// TODO: expose a rumble intensity setting once the mapping UI has a slider for it.
pub const RUMBLE_INTENSITY: f32 = 0.5;

/// Named haptic effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HapticEffect {
    Click,
    Thud,
    Spin,
    QuickRise,
    SlowRise,
    QuickFall,
    Tick,
    LowTick,
}

impl HapticEffect {
    /// Length of the one-shot pulse used when the primitive is unavailable.
    pub fn fallback_duration(&self) -> Duration {
        let ms = match self {
            HapticEffect::Click => 20,
            HapticEffect::Thud => 50,
            HapticEffect::Spin => 100,
            HapticEffect::QuickRise => 40,
            HapticEffect::SlowRise => 120,
            HapticEffect::QuickFall => 40,
            HapticEffect::Tick => 10,
            HapticEffect::LowTick => 15,
        };
        Duration::from_millis(ms)
    }
}

/// Plays named effects on one vibrator.
pub struct HapticsProvider<'a> {
    vibrator: &'a dyn Vibrator,
}

impl<'a> HapticsProvider<'a> {
    pub fn new(vibrator: &'a dyn Vibrator) -> Self {
        Self { vibrator }
    }

    /// Play `effect` at `intensity` (clamped to `0.0..=1.0`).
    ///
    /// Uses the composition primitive when the vibrator supports it, and a
    /// one-shot pulse of [`HapticEffect::fallback_duration`] otherwise. Does
    /// nothing if no motor is present or the intensity is zero.
    pub fn provide_feedback(&self, effect: HapticEffect, intensity: f32) -> Result<()> {
        if !self.vibrator.has_vibrator() {
            log::debug!("no vibrator present, skipping {:?}", effect);
            return Ok(());
        }

        let scale = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
        if scale == 0.0 {
            return Ok(());
        }

        if self.vibrator.supports_primitive(effect) {
            return self.vibrator.compose(effect, scale);
        }

        let amplitude = if self.vibrator.has_amplitude_control() {
            Amplitude::Level(((scale * 255.0).round() as u8).max(1))
        } else {
            Amplitude::Default
        };
        self.vibrator
            .one_shot(effect.fallback_duration(), amplitude)
    }
}

/// Issue one rumble pulse on `vibrator`.
///
/// Fire-and-forget: platform failures are logged, not returned.
pub fn vibrate(vibrator: &dyn Vibrator) {
    if let Err(e) = HapticsProvider::new(vibrator).provide_feedback(RUMBLE_EFFECT, RUMBLE_INTENSITY)
    {
        log::warn!("rumble request failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::{Feedback, MemoryVibrator};

    #[test]
    fn test_vibrate_plays_spin_at_half_intensity() {
        let vibrator = MemoryVibrator::new();
        vibrate(&vibrator);
        assert_eq!(
            vibrator.played(),
            vec![Feedback::Primitive {
                effect: HapticEffect::Spin,
                scale: 0.5
            }]
        );
    }

    #[test]
    fn test_fallback_one_shot_scales_amplitude() {
        let vibrator = MemoryVibrator::basic().with_amplitude_control(true);
        HapticsProvider::new(&vibrator)
            .provide_feedback(HapticEffect::Spin, 0.5)
            .unwrap();
        assert_eq!(
            vibrator.played(),
            vec![Feedback::OneShot {
                duration: Duration::from_millis(100),
                amplitude: Amplitude::Level(128),
            }]
        );
    }

    #[test]
    fn test_fallback_without_amplitude_control_uses_default() {
        let vibrator = MemoryVibrator::basic();
        HapticsProvider::new(&vibrator)
            .provide_feedback(HapticEffect::Tick, 1.0)
            .unwrap();
        assert_eq!(
            vibrator.played(),
            vec![Feedback::OneShot {
                duration: Duration::from_millis(10),
                amplitude: Amplitude::Default,
            }]
        );
    }

    #[test]
    fn test_missing_motor_is_skipped() {
        let vibrator = MemoryVibrator::absent();
        vibrate(&vibrator);
        assert!(vibrator.played().is_empty());
    }

    #[test]
    fn test_intensity_is_clamped() {
        let vibrator = MemoryVibrator::new();
        let provider = HapticsProvider::new(&vibrator);
        provider.provide_feedback(HapticEffect::Click, 3.0).unwrap();
        provider.provide_feedback(HapticEffect::Click, -1.0).unwrap();
        assert_eq!(
            vibrator.played(),
            vec![Feedback::Primitive {
                effect: HapticEffect::Click,
                scale: 1.0
            }]
        );
    }

    #[test]
    fn test_vibrate_swallows_platform_failure() {
        let vibrator = MemoryVibrator::new().failing();
        vibrate(&vibrator);
        assert!(vibrator.played().is_empty());
    }
}
