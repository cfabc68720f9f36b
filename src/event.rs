//! Platform input events handed to the dispatcher.

use std::time::SystemTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KeyAction {
    /// The key went down (or auto-repeated, see `repeat_count`).
    Down,
    /// The key went up.
    Up,
    /// Several repeats collapsed into one event.
    Multiple,
}

/// Class of hardware a motion event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InputSource {
    Gamepad,
    Joystick,
    Touchscreen,
    Mouse,
    Keyboard,
    /// Source the platform did not classify.
    Unknown(u32),
}

/// A key or button event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyEvent {
    /// Platform id of the originating device.
    pub device_id: i32,
    /// Platform key code.
    pub key_code: u32,
    pub action: KeyAction,
    /// Auto-repeat count; `0` for the initial press.
    pub repeat_count: u32,
    /// Platform modifier bits.
    pub meta_state: u32,
    pub time: SystemTime,
}

impl KeyEvent {
    pub fn new(device_id: i32, key_code: u32, action: KeyAction) -> Self {
        Self {
            device_id,
            key_code,
            action,
            repeat_count: 0,
            meta_state: 0,
            time: SystemTime::now(),
        }
    }

    /// Create a key-down event.
    pub fn key_down(device_id: i32, key_code: u32) -> Self {
        Self::new(device_id, key_code, KeyAction::Down)
    }

    /// Create a key-up event.
    pub fn key_up(device_id: i32, key_code: u32) -> Self {
        Self::new(device_id, key_code, KeyAction::Up)
    }
}

/// Value of one motion axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisValue {
    /// Platform axis code.
    pub axis: u32,
    pub value: f32,
}

/// A generic motion event (sticks, triggers, hats, touch).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionEvent {
    /// Platform id of the originating device.
    pub device_id: i32,
    pub source: InputSource,
    pub axes: Vec<AxisValue>,
    pub time: SystemTime,
}

impl MotionEvent {
    pub fn new(device_id: i32, source: InputSource) -> Self {
        Self {
            device_id,
            source,
            axes: Vec::new(),
            time: SystemTime::now(),
        }
    }

    /// Add an axis value.
    pub fn with_axis(mut self, axis: u32, value: f32) -> Self {
        self.axes.push(AxisValue { axis, value });
        self
    }

    /// Value reported for `axis`, if present.
    pub fn axis_value(&self, axis: u32) -> Option<f32> {
        self.axes.iter().find(|a| a.axis == axis).map(|a| a.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_constructors() {
        let down = KeyEvent::key_down(3, 96);
        assert_eq!(down.action, KeyAction::Down);
        assert_eq!(down.device_id, 3);
        assert_eq!(down.repeat_count, 0);

        let up = KeyEvent::key_up(3, 96);
        assert_eq!(up.action, KeyAction::Up);
    }

    #[test]
    fn test_motion_axis_lookup() {
        let event = MotionEvent::new(5, InputSource::Joystick)
            .with_axis(0, 0.25)
            .with_axis(1, -1.0);
        assert_eq!(event.axis_value(1), Some(-1.0));
        assert_eq!(event.axis_value(11), None);
    }
}
