//! Device descriptors, qualifiers and capability masks.
//!
//! A [`DeviceDescriptor`] is what a platform reports for one attached device.
//! The registry turns descriptors into [`Device`]s by assigning each one a
//! [`DeviceQualifier`], the string the emulation core uses to address it.

use crate::error::{Error, Result};
use crate::vibrator::VibrationSource;
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shared handle to a registered device.
pub type DeviceHandle = Arc<Device>;

/// Stable identifier of one physical device, rendered as `source/id/name`.
///
/// `id` distinguishes devices that share a source and a name. The registry
/// keeps a device's qualifier for as long as the platform keeps reporting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceQualifier {
    source: String,
    id: u32,
    name: String,
}

impl DeviceQualifier {
    /// Create a qualifier from its parts.
    pub fn new(source: impl Into<String>, id: u32, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            id,
            name: name.into(),
        }
    }

    /// Backend that reported the device (e.g. `"Android"`, `"evdev"`).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Index among devices with the same source and name.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Device name as reported by the platform.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DeviceQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.source, self.id, self.name)
    }
}

impl FromStr for DeviceQualifier {
    type Err = Error;

    /// Parse `source/id/name`. The name may itself contain `/`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, '/');
        let (Some(source), Some(id), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidQualifier(s.to_string()));
        };
        if source.is_empty() {
            return Err(Error::InvalidQualifier(s.to_string()));
        }
        let id = id
            .parse::<u32>()
            .map_err(|_| Error::InvalidQualifier(s.to_string()))?;
        Ok(Self::new(source, id, name))
    }
}

/// Name of one logical sensor axis, e.g. `"Accel Right"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisName(String);

impl AxisName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AxisName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AxisName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AxisName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Set of things a device can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Capabilities(u32);

impl Capabilities {
    /// Emits key events.
    pub const KEYS: Capabilities = Capabilities(1 << 0);
    /// Emits generic motion events (sticks, triggers, touch).
    pub const MOTION: Capabilities = Capabilities(1 << 1);
    /// Emits sensor samples (accelerometer, gyroscope).
    pub const SENSORS: Capabilities = Capabilities(1 << 2);
    /// Has at least one vibrator.
    pub const VIBRATION: Capabilities = Capabilities(1 << 3);

    /// No capabilities.
    pub const fn empty() -> Self {
        Capabilities(0)
    }

    /// Raw bit mask.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check whether every bit of `other` is set.
    pub const fn contains(&self, other: Capabilities) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn insert(&mut self, other: Capabilities) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Capabilities) {
        self.0 &= !other.0;
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        Capabilities(self.0 | rhs.0)
    }
}

/// What a platform reports for one attached device.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    /// Platform device id. Stable while the device stays attached.
    pub platform_id: i32,
    /// Backend name used as the qualifier's source.
    pub source: String,
    /// Human-readable device name.
    pub name: String,
    /// What the device can do.
    pub capabilities: Capabilities,
    /// Sensor axes, when the device has sensors.
    pub sensor_axes: Vec<AxisName>,
    /// Vibration hardware owned by this device, if any.
    pub vibration: Option<VibrationSource>,
}

impl DeviceDescriptor {
    /// Create a descriptor with no capabilities.
    pub fn new(platform_id: i32, source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            platform_id,
            source: source.into(),
            name: name.into(),
            capabilities: Capabilities::empty(),
            sensor_axes: Vec::new(),
            vibration: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities.insert(capabilities);
        self
    }

    /// Add sensor axes; also marks the device as sensor-capable.
    pub fn with_sensor_axes<I, A>(mut self, axes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AxisName>,
    {
        self.sensor_axes.extend(axes.into_iter().map(Into::into));
        self.capabilities.insert(Capabilities::SENSORS);
        self
    }

    /// Attach vibration hardware; also marks the device as vibration-capable.
    pub fn with_vibration(mut self, vibration: VibrationSource) -> Self {
        self.vibration = Some(vibration);
        self.capabilities.insert(Capabilities::VIBRATION);
        self
    }
}

/// A registered device: a descriptor plus its assigned qualifier.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Device {
    qualifier: DeviceQualifier,
    platform_id: i32,
    capabilities: Capabilities,
    sensor_axes: Vec<AxisName>,
    #[cfg_attr(feature = "serde", serde(skip))]
    vibration: Option<VibrationSource>,
}

impl Device {
    pub(crate) fn from_descriptor(descriptor: DeviceDescriptor, qualifier: DeviceQualifier) -> Self {
        Self {
            qualifier,
            platform_id: descriptor.platform_id,
            capabilities: descriptor.capabilities,
            sensor_axes: descriptor.sensor_axes,
            vibration: descriptor.vibration,
        }
    }

    pub fn qualifier(&self) -> &DeviceQualifier {
        &self.qualifier
    }

    pub fn name(&self) -> &str {
        self.qualifier.name()
    }

    pub fn platform_id(&self) -> i32 {
        self.platform_id
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn sensor_axes(&self) -> &[AxisName] {
        &self.sensor_axes
    }

    /// Vibration hardware owned by this device.
    pub fn vibration(&self) -> Option<&VibrationSource> {
        self.vibration.as_ref()
    }
}
