//! In-memory platform.
//!
//! Devices are attached and detached by calling methods on
//! [`MemoryPlatform`]; registered listeners are notified synchronously on the
//! calling thread, the same way a host platform would post callbacks.
//! Useful for tests, demos and hosts that push device lists themselves.

use crate::device::{AxisName, DeviceDescriptor};
use crate::error::{Error, Result};
use crate::haptics::HapticEffect;
use crate::platform::{InputDeviceListener, InputPlatform, ListenerId};
use crate::vibrator::{Amplitude, VibrationSource, Vibrator};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct MemoryState {
    devices: BTreeMap<i32, DeviceDescriptor>,
    listeners: BTreeMap<ListenerId, Arc<dyn InputDeviceListener>>,
    next_listener_id: ListenerId,
    system_vibration: Option<VibrationSource>,
    suspended: HashMap<String, HashSet<AxisName>>,
    unavailable: bool,
    enumerations: usize,
}

/// Platform whose devices live in memory.
#[derive(Default)]
pub struct MemoryPlatform {
    state: Mutex<MemoryState>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify<F>(&self, callback: F)
    where
        F: Fn(&dyn InputDeviceListener),
    {
        // Listeners run without the state lock so they may call back in.
        let listeners: Vec<_> = self.lock().listeners.values().cloned().collect();
        for listener in listeners {
            callback(listener.as_ref());
        }
    }

    /// Attach a device and fire `on_input_device_added`.
    pub fn attach(&self, descriptor: DeviceDescriptor) {
        let id = descriptor.platform_id;
        self.lock().devices.insert(id, descriptor);
        self.notify(|listener| listener.on_input_device_added(id));
    }

    /// Detach a device and fire `on_input_device_removed`.
    pub fn detach(&self, platform_id: i32) -> Option<DeviceDescriptor> {
        let removed = self.lock().devices.remove(&platform_id);
        if removed.is_some() {
            self.notify(|listener| listener.on_input_device_removed(platform_id));
        }
        removed
    }

    /// Replace an attached device's descriptor and fire `on_input_device_changed`.
    pub fn change(&self, descriptor: DeviceDescriptor) {
        let id = descriptor.platform_id;
        self.lock().devices.insert(id, descriptor);
        self.notify(|listener| listener.on_input_device_changed(id));
    }

    /// Set or clear the system-wide vibrator.
    pub fn set_system_vibration(&self, vibration: Option<VibrationSource>) {
        self.lock().system_vibration = vibration;
    }

    /// Make enumeration fail with [`Error::ServiceUnavailable`].
    pub fn set_available(&self, available: bool) {
        self.lock().unavailable = !available;
    }

    /// Number of attached hotplug listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// How many times devices were enumerated.
    pub fn enumeration_count(&self) -> usize {
        self.lock().enumerations
    }

    /// Whether samples for `axis` of `device` are currently delivered.
    pub fn is_delivering(&self, device: &str, axis: &str) -> bool {
        self.lock()
            .suspended
            .get(device)
            .is_none_or(|axes| !axes.contains(&AxisName::from(axis)))
    }

    /// Suspended axes of `device`, sorted.
    pub fn suspended_axes(&self, device: &str) -> Vec<AxisName> {
        let mut axes: Vec<AxisName> = self
            .lock()
            .suspended
            .get(device)
            .map(|axes| axes.iter().cloned().collect())
            .unwrap_or_default();
        axes.sort();
        axes
    }
}

impl InputPlatform for MemoryPlatform {
    fn input_devices(&self) -> Result<Vec<DeviceDescriptor>> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(Error::ServiceUnavailable("memory platform is offline".into()));
        }
        state.enumerations += 1;
        Ok(state.devices.values().cloned().collect())
    }

    fn register_device_listener(&self, listener: Arc<dyn InputDeviceListener>) -> Result<ListenerId> {
        let mut state = self.lock();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.insert(id, listener);
        Ok(id)
    }

    fn unregister_device_listener(&self, id: ListenerId) -> Result<()> {
        self.lock().listeners.remove(&id);
        Ok(())
    }

    fn system_vibration(&self) -> Option<VibrationSource> {
        self.lock().system_vibration.clone()
    }

    fn set_sensor_suspended(&self, device: &str, axes: &[AxisName], suspended: bool) {
        let mut state = self.lock();
        if suspended {
            state
                .suspended
                .entry(device.to_string())
                .or_default()
                .extend(axes.iter().cloned());
        } else if let Some(set) = state.suspended.get_mut(device) {
            for axis in axes {
                set.remove(axis);
            }
            if set.is_empty() {
                state.suspended.remove(device);
            }
        }
    }
}

/// A request recorded by [`MemoryVibrator`].
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    Primitive { effect: HapticEffect, scale: f32 },
    OneShot { duration: Duration, amplitude: Amplitude },
    Cancel,
}

/// Vibrator that records what it was asked to play.
#[derive(Debug)]
pub struct MemoryVibrator {
    present: bool,
    primitives: bool,
    amplitude_control: bool,
    failing: bool,
    played: Mutex<Vec<Feedback>>,
}

impl MemoryVibrator {
    /// A motor with primitive and amplitude support.
    pub fn new() -> Self {
        Self {
            present: true,
            primitives: true,
            amplitude_control: true,
            failing: false,
            played: Mutex::new(Vec::new()),
        }
    }

    /// A motor that can only do plain one-shot pulses.
    pub fn basic() -> Self {
        Self {
            primitives: false,
            amplitude_control: false,
            ..Self::new()
        }
    }

    /// A vibrator object with no motor behind it.
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::basic()
        }
    }

    pub fn with_amplitude_control(mut self, enabled: bool) -> Self {
        self.amplitude_control = enabled;
        self
    }

    /// Reject every request with a platform error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Requests recorded so far.
    pub fn played(&self) -> Vec<Feedback> {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, feedback: Feedback) -> Result<()> {
        if self.failing {
            return Err(Error::Platform("vibrator rejected the request".into()));
        }
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(feedback);
        Ok(())
    }
}

impl Default for MemoryVibrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Vibrator for MemoryVibrator {
    fn has_vibrator(&self) -> bool {
        self.present
    }

    fn has_amplitude_control(&self) -> bool {
        self.amplitude_control
    }

    fn supports_primitive(&self, _effect: HapticEffect) -> bool {
        self.primitives
    }

    fn compose(&self, effect: HapticEffect, scale: f32) -> Result<()> {
        if !self.primitives {
            return Err(Error::NotSupported(format!("primitive {effect:?}")));
        }
        self.record(Feedback::Primitive { effect, scale })
    }

    fn one_shot(&self, duration: Duration, amplitude: Amplitude) -> Result<()> {
        self.record(Feedback::OneShot {
            duration,
            amplitude,
        })
    }

    fn cancel(&self) -> Result<()> {
        self.record(Feedback::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        added: AtomicUsize,
        removed: AtomicUsize,
        changed: AtomicUsize,
    }

    impl InputDeviceListener for Counting {
        fn on_input_device_added(&self, _device_id: i32) {
            self.added.fetch_add(1, Ordering::SeqCst);
        }
        fn on_input_device_removed(&self, _device_id: i32) {
            self.removed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_input_device_changed(&self, _device_id: i32) {
            self.changed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_callbacks_follow_device_changes() {
        let platform = MemoryPlatform::new();
        let listener = Arc::new(Counting::default());
        let id = platform.register_device_listener(listener.clone()).unwrap();

        platform.attach(DeviceDescriptor::new(1, "Mock", "Pad"));
        platform.change(DeviceDescriptor::new(1, "Mock", "Pad"));
        assert!(platform.detach(1).is_some());
        assert!(platform.detach(1).is_none());

        assert_eq!(listener.added.load(Ordering::SeqCst), 1);
        assert_eq!(listener.changed.load(Ordering::SeqCst), 1);
        assert_eq!(listener.removed.load(Ordering::SeqCst), 1);

        platform.unregister_device_listener(id).unwrap();
        platform.attach(DeviceDescriptor::new(2, "Mock", "Pad"));
        assert_eq!(listener.added.load(Ordering::SeqCst), 1);
        assert_eq!(platform.listener_count(), 0);
    }

    #[test]
    fn test_offline_platform_fails_enumeration() {
        let platform = MemoryPlatform::new();
        platform.set_available(false);
        assert!(matches!(
            platform.input_devices(),
            Err(Error::ServiceUnavailable(_))
        ));
        platform.set_available(true);
        assert!(platform.input_devices().unwrap().is_empty());
        assert_eq!(platform.enumeration_count(), 1);
    }

    #[test]
    fn test_sensor_suspension_tracking() {
        let platform = MemoryPlatform::new();
        let axes = [AxisName::from("x"), AxisName::from("y")];

        platform.set_sensor_suspended("phone", &axes, true);
        assert!(!platform.is_delivering("phone", "x"));
        assert!(platform.is_delivering("phone", "z"));
        assert_eq!(platform.suspended_axes("phone"), axes.to_vec());

        platform.set_sensor_suspended("phone", &axes, false);
        assert!(platform.is_delivering("phone", "x"));
        assert!(platform.suspended_axes("phone").is_empty());
    }
}
