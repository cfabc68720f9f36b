//! Vibration capability adapter.
//!
//! Platforms expose vibration hardware either as a single [`Vibrator`] or as a
//! [`VibratorManager`] grouping several. Routing code only ever sees the
//! manager form; single vibrators are wrapped in a [`CompatVibratorManager`].

use crate::device::Device;
use crate::error::{Error, Result};
use crate::haptics::HapticEffect;
use crate::platform::InputPlatform;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Strength of a one-shot vibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amplitude {
    /// Whatever the hardware considers its default strength.
    Default,
    /// Explicit strength, `1..=255`.
    Level(u8),
}

/// One physical vibration motor.
pub trait Vibrator: Send + Sync {
    /// Whether a motor is actually present.
    fn has_vibrator(&self) -> bool;

    /// Whether [`Amplitude::Level`] is honored.
    fn has_amplitude_control(&self) -> bool {
        false
    }

    /// Whether `effect` can be played as a composition primitive.
    fn supports_primitive(&self, _effect: HapticEffect) -> bool {
        false
    }

    /// Play `effect` as a composition primitive scaled by `scale` (`0.0..=1.0`).
    fn compose(&self, effect: HapticEffect, _scale: f32) -> Result<()> {
        Err(Error::NotSupported(format!(
            "haptic primitive {effect:?} is not supported by this vibrator"
        )))
    }

    /// Vibrate once for `duration`.
    fn one_shot(&self, duration: Duration, amplitude: Amplitude) -> Result<()>;

    /// Stop any vibration in progress.
    fn cancel(&self) -> Result<()> {
        Ok(())
    }
}

/// A group of vibrators addressed by id.
pub trait VibratorManager: Send + Sync {
    /// Ids of the vibrators present. Empty when there are none.
    fn vibrator_ids(&self) -> Vec<i32>;

    /// Look up one vibrator.
    fn vibrator(&self, id: i32) -> Option<Arc<dyn Vibrator>>;
}

/// Vibration hardware as reported by a platform.
#[derive(Clone)]
pub enum VibrationSource {
    /// A single motor.
    Vibrator(Arc<dyn Vibrator>),
    /// A native vibrator manager.
    Manager(Arc<dyn VibratorManager>),
}

impl VibrationSource {
    /// Resolve to the manager form.
    pub fn manager(&self) -> Arc<dyn VibratorManager> {
        match self {
            VibrationSource::Vibrator(vibrator) => {
                Arc::new(CompatVibratorManager::new(vibrator.clone()))
            }
            VibrationSource::Manager(manager) => manager.clone(),
        }
    }
}

impl fmt::Debug for VibrationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VibrationSource::Vibrator(_) => f.write_str("VibrationSource::Vibrator"),
            VibrationSource::Manager(manager) => f
                .debug_struct("VibrationSource::Manager")
                .field("ids", &manager.vibrator_ids())
                .finish(),
        }
    }
}

/// Presents a lone [`Vibrator`] as a manager with id `0`.
pub struct CompatVibratorManager {
    vibrator: Arc<dyn Vibrator>,
}

impl CompatVibratorManager {
    pub fn new(vibrator: Arc<dyn Vibrator>) -> Self {
        Self { vibrator }
    }
}

impl VibratorManager for CompatVibratorManager {
    fn vibrator_ids(&self) -> Vec<i32> {
        if self.vibrator.has_vibrator() {
            vec![0]
        } else {
            Vec::new()
        }
    }

    fn vibrator(&self, id: i32) -> Option<Arc<dyn Vibrator>> {
        (id == 0 && self.vibrator.has_vibrator()).then(|| self.vibrator.clone())
    }
}

/// Vibration capability scoped to one device, or `None` when it has none.
pub fn device_vibrator_manager(device: &Device) -> Option<Arc<dyn VibratorManager>> {
    device.vibration().map(VibrationSource::manager)
}

/// The platform's system-wide vibration capability, or `None` when absent.
pub fn system_vibrator_manager(platform: &dyn InputPlatform) -> Option<Arc<dyn VibratorManager>> {
    platform.system_vibration().map(|source| source.manager())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::MemoryVibrator;

    #[test]
    fn test_compat_manager_exposes_single_vibrator() {
        let manager = CompatVibratorManager::new(Arc::new(MemoryVibrator::new()));
        assert_eq!(manager.vibrator_ids(), vec![0]);
        assert!(manager.vibrator(0).is_some());
        assert!(manager.vibrator(1).is_none());
    }

    #[test]
    fn test_compat_manager_hides_missing_motor() {
        let manager = CompatVibratorManager::new(Arc::new(MemoryVibrator::absent()));
        assert!(manager.vibrator_ids().is_empty());
        assert!(manager.vibrator(0).is_none());
    }

    #[test]
    fn test_default_compose_is_not_supported() {
        struct Buzzer;
        impl Vibrator for Buzzer {
            fn has_vibrator(&self) -> bool {
                true
            }
            fn one_shot(&self, _duration: Duration, _amplitude: Amplitude) -> Result<()> {
                Ok(())
            }
        }

        assert!(!Buzzer.supports_primitive(HapticEffect::Spin));
        assert!(matches!(
            Buzzer.compose(HapticEffect::Spin, 0.5),
            Err(Error::NotSupported(_))
        ));
    }
}
