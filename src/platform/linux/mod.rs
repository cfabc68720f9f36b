//! Linux evdev platform.
//!
//! Devices are read from `/dev/input/event*` through the `evdev` crate. The
//! platform id of a device is the number of its event node, so `event7` is
//! device `7`. Hotplug is detected by watching the input directory through
//! `notify`.
//!
//! ## Permissions
//!
//! To access input devices, the process must either:
//! - Run as root (not recommended)
//! - Run as a user in the `input` group (recommended)
//!
//! To add yourself to the input group:
//! ```bash
//! sudo usermod -aG input $USER
//! # Then log out and back in
//! ```

mod rumble;
mod watcher;

pub use rumble::EvdevVibrator;

use crate::device::{Capabilities, DeviceDescriptor};
use crate::error::{Error, Result};
use crate::platform::{InputDeviceListener, InputPlatform, ListenerId};
use crate::vibrator::VibrationSource;
use evdev::{AbsoluteAxisType, Device, FFEffectType, PropType};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use watcher::DirectoryWatcher;

/// Directory holding the event device nodes.
pub const DEFAULT_INPUT_DIR: &str = "/dev/input";

/// Qualifier source for evdev devices.
pub const SOURCE: &str = "evdev";

/// Absolute axes reported as sensor axes on accelerometer devices.
const SENSOR_AXES: [(AbsoluteAxisType, &str); 6] = [
    (AbsoluteAxisType::ABS_X, "x"),
    (AbsoluteAxisType::ABS_Y, "y"),
    (AbsoluteAxisType::ABS_Z, "z"),
    (AbsoluteAxisType::ABS_RX, "rx"),
    (AbsoluteAxisType::ABS_RY, "ry"),
    (AbsoluteAxisType::ABS_RZ, "rz"),
];

/// Input devices under `/dev/input`.
pub struct EvdevPlatform {
    input_dir: PathBuf,
    watchers: Mutex<HashMap<ListenerId, DirectoryWatcher>>,
    next_listener_id: AtomicU64,
}

impl EvdevPlatform {
    pub fn new() -> Self {
        Self::with_input_dir(DEFAULT_INPUT_DIR)
    }

    /// Watch a different directory of event nodes.
    pub fn with_input_dir(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            watchers: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(0),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    fn watchers(&self) -> Result<MutexGuard<'_, HashMap<ListenerId, DirectoryWatcher>>> {
        self.watchers
            .lock()
            .map_err(|_| Error::ThreadError("evdev watcher mutex poisoned".into()))
    }
}

impl Default for EvdevPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPlatform for EvdevPlatform {
    fn input_devices(&self) -> Result<Vec<DeviceDescriptor>> {
        let dir = fs::read_dir(&self.input_dir)
            .map_err(|e| access_error(&self.input_dir, e))?;

        let mut descriptors = Vec::new();
        for entry in dir.flatten() {
            let path = entry.path();
            let Some(id) = path
                .file_name()
                .and_then(|name| event_number(&name.to_string_lossy()))
            else {
                continue;
            };

            match Device::open(&path) {
                Ok(device) => descriptors.push(describe(id, &path, device)),
                Err(e) => {
                    log::debug!("Failed to open {}: {}", path.display(), e);
                }
            }
        }

        descriptors.sort_by_key(|descriptor| descriptor.platform_id);
        Ok(descriptors)
    }

    fn register_device_listener(&self, listener: Arc<dyn InputDeviceListener>) -> Result<ListenerId> {
        let watcher = DirectoryWatcher::spawn(&self.input_dir, listener)?;
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.watchers()?.insert(id, watcher);
        Ok(id)
    }

    fn unregister_device_listener(&self, id: ListenerId) -> Result<()> {
        if let Some(watcher) = self.watchers()?.remove(&id) {
            watcher.stop();
        }
        Ok(())
    }
}

impl Drop for EvdevPlatform {
    fn drop(&mut self) {
        if let Ok(mut watchers) = self.watchers.lock() {
            for (_, watcher) in watchers.drain() {
                watcher.stop();
            }
        }
    }
}

/// Platform id for an event node name such as `event7`.
fn event_number(file_name: &str) -> Option<i32> {
    file_name.strip_prefix("event")?.parse().ok()
}

fn access_error(path: &Path, e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::NotFound => {
            Error::ServiceUnavailable(format!("{} does not exist", path.display()))
        }
        io::ErrorKind::PermissionDenied => Error::PermissionDenied(format!(
            "Cannot access {}: {}. Make sure you're in the 'input' group.",
            path.display(),
            e
        )),
        _ => Error::Io(e),
    }
}

fn sensor_axis_name(axis: AbsoluteAxisType) -> Option<&'static str> {
    SENSOR_AXES
        .iter()
        .find(|(candidate, _)| *candidate == axis)
        .map(|(_, name)| *name)
}

fn describe(id: i32, path: &Path, device: Device) -> DeviceDescriptor {
    let name = device.name().unwrap_or("unknown").to_string();

    let mut capabilities = Capabilities::empty();
    if device
        .supported_keys()
        .is_some_and(|keys| keys.iter().next().is_some())
    {
        capabilities.insert(Capabilities::KEYS);
    }

    let axes: Vec<AbsoluteAxisType> = device
        .supported_absolute_axes()
        .map(|axes| axes.iter().collect())
        .unwrap_or_default();
    let accelerometer = device.properties().contains(PropType::ACCELEROMETER);
    if !accelerometer && !axes.is_empty() {
        capabilities.insert(Capabilities::MOTION);
    }

    let mut descriptor = DeviceDescriptor::new(id, SOURCE, name).with_capabilities(capabilities);
    if accelerometer {
        descriptor = descriptor.with_sensor_axes(
            axes.iter()
                .filter_map(|axis| sensor_axis_name(*axis)),
        );
    }

    let rumble = device
        .supported_ff()
        .is_some_and(|effects| effects.contains(FFEffectType::FF_RUMBLE));
    if rumble {
        let vibrator = EvdevVibrator::new(path.to_path_buf(), device);
        descriptor = descriptor.with_vibration(VibrationSource::Vibrator(Arc::new(vibrator)));
    }

    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_number() {
        assert_eq!(event_number("event0"), Some(0));
        assert_eq!(event_number("event17"), Some(17));
        assert_eq!(event_number("mouse0"), None);
        assert_eq!(event_number("event"), None);
        assert_eq!(event_number("by-id"), None);
    }

    #[test]
    fn test_sensor_axis_names() {
        assert_eq!(sensor_axis_name(AbsoluteAxisType::ABS_X), Some("x"));
        assert_eq!(sensor_axis_name(AbsoluteAxisType::ABS_RZ), Some("rz"));
        assert_eq!(sensor_axis_name(AbsoluteAxisType::ABS_HAT0X), None);
    }

    #[test]
    fn test_missing_directory_is_service_unavailable() {
        let platform = EvdevPlatform::with_input_dir("/nonexistent/inputbridge/input");
        assert!(matches!(
            platform.input_devices(),
            Err(Error::ServiceUnavailable(_))
        ));
    }

    #[test]
    fn test_directory_without_event_nodes_is_empty() {
        let dir = std::env::temp_dir().join(format!("inputbridge-evdev-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("js0"), b"").unwrap();

        let platform = EvdevPlatform::with_input_dir(&dir);
        assert!(platform.input_devices().unwrap().is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }
}
