//! Force-feedback rumble on evdev devices.

use crate::error::{Error, Result};
use crate::vibrator::{Amplitude, Vibrator};
use evdev::{Device, FFEffect, FFEffectData, FFEffectKind, FFReplay, FFTrigger};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Magnitude used for [`Amplitude::Default`].
const DEFAULT_MAGNITUDE: u16 = 0xC000;

struct RumbleState {
    device: Device,
    // Kept alive while playing; dropping an effect removes it from the device.
    effect: Option<FFEffect>,
}

/// Rumble motor of one evdev device.
pub struct EvdevVibrator {
    path: PathBuf,
    state: Mutex<RumbleState>,
}

impl EvdevVibrator {
    pub(crate) fn new(path: PathBuf, device: Device) -> Self {
        Self {
            path,
            state: Mutex::new(RumbleState {
                device,
                effect: None,
            }),
        }
    }

    /// Event node the vibrator belongs to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, RumbleState>> {
        self.state
            .lock()
            .map_err(|_| Error::ThreadError("rumble mutex poisoned".into()))
    }
}

impl Vibrator for EvdevVibrator {
    fn has_vibrator(&self) -> bool {
        true
    }

    fn has_amplitude_control(&self) -> bool {
        true
    }

    fn one_shot(&self, duration: Duration, amplitude: Amplitude) -> Result<()> {
        let magnitude = match amplitude {
            Amplitude::Default => DEFAULT_MAGNITUDE,
            Amplitude::Level(level) => u16::from(level) * 257,
        };
        let data = FFEffectData {
            direction: 0,
            trigger: FFTrigger {
                button: 0,
                interval: 0,
            },
            replay: FFReplay {
                length: duration.as_millis().min(u16::MAX as u128) as u16,
                delay: 0,
            },
            kind: FFEffectKind::Rumble {
                strong_magnitude: magnitude,
                weak_magnitude: magnitude,
            },
        };

        let mut state = self.lock()?;
        state.effect = None;
        let mut effect = state.device.upload_ff_effect(data)?;
        effect.play(1)?;
        state.effect = Some(effect);
        log::debug!(
            "rumble {:?} at {} on {}",
            duration,
            magnitude,
            self.path.display()
        );
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        if let Some(effect) = self.lock()?.effect.as_mut() {
            effect.stop()?;
        }
        Ok(())
    }
}
