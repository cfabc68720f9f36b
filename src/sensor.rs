//! Sensor suspension notifications.

use crate::backend::ControllerBackend;
use crate::device::AxisName;
use crate::platform::InputPlatform;
use std::sync::Arc;

/// Relays "this axis group is (no longer) sampled" to both sides.
///
/// Nothing here interprets the state; the core decides when to suspend and
/// the platform decides how to stop delivering samples.
#[derive(Clone)]
pub struct SensorSuspensionNotifier {
    platform: Arc<dyn InputPlatform>,
    backend: Arc<dyn ControllerBackend>,
}

impl SensorSuspensionNotifier {
    pub fn new(platform: Arc<dyn InputPlatform>, backend: Arc<dyn ControllerBackend>) -> Self {
        Self { platform, backend }
    }

    pub fn notify(&self, device: &str, axes: &[AxisName], suspended: bool) {
        log::debug!(
            "sensor axes {:?} of {} {}",
            axes,
            device,
            if suspended { "suspended" } else { "resumed" }
        );
        self.backend.sensor_suspended_state(device, axes, suspended);
        self.platform.set_sensor_suspended(device, axes, suspended);
    }
}
