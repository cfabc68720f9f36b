//! Host platform capability interface.
//!
//! The host's raw input subsystem is consumed only through [`InputPlatform`].
//! Two implementations ship with the crate:
//!
//! - [`memory::MemoryPlatform`]: in-process devices driven by the caller.
//! - `linux::EvdevPlatform` (feature `evdev`, Linux only): `/dev/input` devices
//!   with directory-watch hotplug and force-feedback rumble.

use crate::device::{AxisName, DeviceDescriptor};
use crate::error::Result;
use crate::vibrator::VibrationSource;
use std::sync::Arc;

pub mod memory;

#[cfg(all(feature = "evdev", target_os = "linux"))]
pub mod linux;

/// Token returned when a device listener is attached.
pub type ListenerId = u64;

/// Receives hotplug notifications from the platform.
///
/// Callbacks may arrive on any platform thread.
pub trait InputDeviceListener: Send + Sync {
    fn on_input_device_added(&self, device_id: i32);
    fn on_input_device_removed(&self, device_id: i32);
    fn on_input_device_changed(&self, device_id: i32);
}

/// The host's input and vibration facilities.
pub trait InputPlatform: Send + Sync {
    /// Describe every currently attached input device.
    fn input_devices(&self) -> Result<Vec<DeviceDescriptor>>;

    /// Start delivering hotplug callbacks to `listener`.
    fn register_device_listener(&self, listener: Arc<dyn InputDeviceListener>) -> Result<ListenerId>;

    /// Stop delivering callbacks to a listener and release it.
    fn unregister_device_listener(&self, id: ListenerId) -> Result<()>;

    /// System-wide vibration hardware, if any.
    fn system_vibration(&self) -> Option<VibrationSource> {
        None
    }

    /// Stop (`true`) or resume (`false`) delivering samples for `axes` of `device`.
    fn set_sensor_suspended(&self, _device: &str, _axes: &[AxisName], _suspended: bool) {}
}
