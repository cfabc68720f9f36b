//! The emulation core as seen from this layer.

use crate::device::{AxisName, DeviceHandle};
use crate::event::{KeyEvent, MotionEvent};
use crate::registry::RegistrySnapshot;

/// Controller backend of the emulation core.
///
/// The core owns all mapping logic; this layer only asks it whether an event
/// matters. Every method is called synchronously and must not block.
pub trait ControllerBackend: Send + Sync {
    /// Handle a key event. Return `true` if the core consumed it.
    ///
    /// `device` is `None` when the event's source is not in the registry.
    fn key_event(&self, device: Option<&DeviceHandle>, event: &KeyEvent) -> bool;

    /// Handle a generic motion event. Return `true` if the core consumed it.
    fn motion_event(&self, device: Option<&DeviceHandle>, event: &MotionEvent) -> bool;

    /// Handle one sensor axis sample. Return `true` if any mapped control
    /// depends on it; `false` lets the platform suspend the sensor.
    fn sensor_event(&self, device: &str, axis: &str, value: f32) -> bool;

    /// Sampling for an axis group was suspended or resumed.
    fn sensor_suspended_state(&self, _device: &str, _axes: &[AxisName], _suspended: bool) {}

    /// The registry was rebuilt.
    ///
    /// Calls arrive one at a time in generation order. Rescanning from here
    /// deadlocks.
    fn devices_changed(&self, _snapshot: &RegistrySnapshot) {}
}

/// Backend that is never interested in anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl ControllerBackend for NullBackend {
    fn key_event(&self, _device: Option<&DeviceHandle>, _event: &KeyEvent) -> bool {
        false
    }

    fn motion_event(&self, _device: Option<&DeviceHandle>, _event: &MotionEvent) -> bool {
        false
    }

    fn sensor_event(&self, _device: &str, _axis: &str, _value: f32) -> bool {
        false
    }
}
