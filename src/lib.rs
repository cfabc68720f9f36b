//! # inputbridge
//!
//! Input device routing between a host platform and an emulation core.
//!
//! ## Features
//!
//! - Live registry of input devices with stable `source/id/name` qualifiers
//! - Hotplug detection on a dedicated background thread
//! - Key, motion and sensor event dispatch with a consumed/ignored decision
//! - Haptic feedback routed to per-device or system vibrators
//! - Sensor suspension notifications to both the core and the platform
//! - In-memory platform for tests, evdev platform on Linux (`evdev` feature)
//!
//! ## Quick Start
//!
//! ```no_run
//! use inputbridge::platform::memory::MemoryPlatform;
//! use inputbridge::{DeviceDescriptor, InputContext, KeyEvent, NullBackend};
//! use std::sync::Arc;
//!
//! let platform = Arc::new(MemoryPlatform::new());
//! let context = InputContext::new(platform.clone(), Arc::new(NullBackend));
//! context.register_input_device_listener().expect("Failed to register listener");
//!
//! platform.attach(DeviceDescriptor::new(5, "Mock", "gamepad-1"));
//!
//! for qualifier in context.all_device_strings() {
//!     println!("{}", qualifier);
//! }
//!
//! let consumed = context.dispatch_key_event(&KeyEvent::key_down(5, 96));
//! println!("consumed: {}", consumed);
//! ```
//!
//! ## Architecture
//!
//! The registry is rebuilt on the hotplug thread and published as an
//! immutable [`RegistrySnapshot`]; dispatch on the foreground thread only ever
//! clones the current snapshot `Arc`, so it never waits on a rescan.

pub mod backend;
pub mod config;
pub mod context;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod haptics;
pub mod hotplug;
pub mod platform;
pub mod registry;
pub mod sensor;
pub mod vibrator;

// Re-exports
pub use backend::{ControllerBackend, NullBackend};
pub use config::ContextConfig;
pub use context::InputContext;
pub use device::{
    AxisName, Capabilities, Device, DeviceDescriptor, DeviceHandle, DeviceQualifier,
};
pub use dispatch::EventDispatcher;
pub use error::{Error, Result};
pub use event::{AxisValue, InputSource, KeyAction, KeyEvent, MotionEvent};
pub use haptics::{HapticEffect, HapticsProvider};
pub use hotplug::{HotplugListener, RescanHandler};
pub use platform::{InputDeviceListener, InputPlatform, ListenerId};
pub use registry::{Registry, RegistrySnapshot};
pub use sensor::SensorSuspensionNotifier;
pub use vibrator::{Amplitude, CompatVibratorManager, VibrationSource, Vibrator, VibratorManager};
