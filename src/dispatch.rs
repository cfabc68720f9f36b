//! Foreground event dispatch.
//!
//! Each entry point reads the current registry snapshot (one `Arc` clone),
//! forwards the event to the core and returns its decision: `true` means the
//! caller must swallow the event, `false` means it should fall through to the
//! platform's default handling.

use crate::backend::ControllerBackend;
use crate::event::{KeyEvent, MotionEvent};
use crate::registry::Registry;
use std::sync::Arc;

/// Cheap-to-clone handle for the foreground thread.
#[derive(Clone)]
pub struct EventDispatcher {
    registry: Arc<Registry>,
    backend: Arc<dyn ControllerBackend>,
}

impl EventDispatcher {
    pub fn new(registry: Arc<Registry>, backend: Arc<dyn ControllerBackend>) -> Self {
        Self { registry, backend }
    }

    pub fn dispatch_key_event(&self, event: &KeyEvent) -> bool {
        let snapshot = self.registry.snapshot();
        let device = snapshot.get_by_platform_id(event.device_id);
        let consumed = self.backend.key_event(device, event);
        log::trace!(
            "key {} {:?} from device {} -> {}",
            event.key_code,
            event.action,
            event.device_id,
            consumed
        );
        consumed
    }

    pub fn dispatch_generic_motion_event(&self, event: &MotionEvent) -> bool {
        let snapshot = self.registry.snapshot();
        let device = snapshot.get_by_platform_id(event.device_id);
        let consumed = self.backend.motion_event(device, event);
        log::trace!(
            "motion ({} axes) from device {} -> {}",
            event.axes.len(),
            event.device_id,
            consumed
        );
        consumed
    }

    /// `false` tells the platform it may suspend this sensor.
    pub fn dispatch_sensor_event(&self, device: &str, axis: &str, value: f32) -> bool {
        let interested = self.backend.sensor_event(device, axis, value);
        log::trace!("sensor {} {} = {} -> {}", device, axis, value, interested);
        interested
    }
}
