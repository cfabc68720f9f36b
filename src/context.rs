//! Process-scoped input context.
//!
//! [`InputContext`] owns the registry, the hotplug listener and the routing
//! components, and wires them to one platform and one emulation core. Create
//! one per process and share it by reference; all methods take `&self`.
//!
//! # Lifecycle
//!
//! - The registry starts empty and is first populated when the hotplug
//!   listener registers (unless [`ContextConfig::refresh_on_register`] is off).
//! - Unregistering stops the hotplug thread; the registry keeps its last
//!   snapshot until the next [`InputContext::refresh_devices`].
//! - Dropping the context unregisters the listener.

use crate::backend::ControllerBackend;
use crate::config::ContextConfig;
use crate::device::{AxisName, Device, DeviceHandle};
use crate::dispatch::EventDispatcher;
use crate::error::Result;
use crate::event::{KeyEvent, MotionEvent};
use crate::haptics;
use crate::hotplug::HotplugListener;
use crate::platform::InputPlatform;
use crate::registry::{Registry, RegistrySnapshot};
use crate::sensor::SensorSuspensionNotifier;
use crate::vibrator::{self, Vibrator, VibratorManager};
use std::sync::Arc;
use std::thread::ThreadId;

/// State shared with the hotplug thread.
struct Shared {
    platform: Arc<dyn InputPlatform>,
    backend: Arc<dyn ControllerBackend>,
    registry: Arc<Registry>,
    #[cfg(feature = "tokio")]
    generation: tokio::sync::watch::Sender<u64>,
}

impl Shared {
    // Observers are told inside the rescan so they see generations in order.
    fn refresh_devices(&self) -> Result<()> {
        self.registry
            .refresh_with(self.platform.as_ref(), |snapshot| {
                self.backend.devices_changed(snapshot);

                #[cfg(feature = "tokio")]
                self.generation.send_replace(snapshot.generation());
            })?;
        Ok(())
    }
}

/// Input routing context between a platform and an emulation core.
pub struct InputContext {
    config: ContextConfig,
    shared: Arc<Shared>,
    dispatcher: EventDispatcher,
    notifier: SensorSuspensionNotifier,
    listener: HotplugListener,
}

impl InputContext {
    /// Create a context with default configuration.
    pub fn new(platform: Arc<dyn InputPlatform>, backend: Arc<dyn ControllerBackend>) -> Self {
        Self::with_config(platform, backend, ContextConfig::default())
    }

    /// Create a context with explicit configuration.
    pub fn with_config(
        platform: Arc<dyn InputPlatform>,
        backend: Arc<dyn ControllerBackend>,
        config: ContextConfig,
    ) -> Self {
        let registry = Arc::new(Registry::new());
        let shared = Arc::new(Shared {
            platform: platform.clone(),
            backend: backend.clone(),
            registry: registry.clone(),
            #[cfg(feature = "tokio")]
            generation: tokio::sync::watch::Sender::new(0),
        });

        Self {
            dispatcher: EventDispatcher::new(registry, backend.clone()),
            notifier: SensorSuspensionNotifier::new(platform.clone(), backend),
            listener: HotplugListener::new(platform, config.hotplug_thread_name.clone()),
            shared,
            config,
        }
    }

    /// Configuration the context was created with.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------------

    /// Forward a key event to the core. `true` if it consumed the event.
    pub fn dispatch_key_event(&self, event: &KeyEvent) -> bool {
        self.dispatcher.dispatch_key_event(event)
    }

    /// Forward a motion event to the core. `true` if it consumed the event.
    pub fn dispatch_generic_motion_event(&self, event: &MotionEvent) -> bool {
        self.dispatcher.dispatch_generic_motion_event(event)
    }

    /// Forward one sensor axis sample. `false` means the sensor can be
    /// suspended to save battery.
    pub fn dispatch_sensor_event(&self, device: &str, axis: &str, value: f32) -> bool {
        self.dispatcher.dispatch_sensor_event(device, axis, value)
    }

    /// Handle for dispatching from another thread.
    pub fn dispatcher(&self) -> EventDispatcher {
        self.dispatcher.clone()
    }

    /// Report that sampling for `axes` of `device` was suspended or resumed.
    pub fn notify_sensor_suspended_state(&self, device: &str, axes: &[AxisName], suspended: bool) {
        self.notifier.notify(device, axes, suspended);
    }

    // ------------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------------

    /// Rescan the platform and rebuild the registry.
    pub fn refresh_devices(&self) -> Result<()> {
        self.shared.refresh_devices()
    }

    /// Qualifiers of all registered devices, sorted.
    pub fn all_device_strings(&self) -> Vec<String> {
        self.shared.registry.qualifiers()
    }

    /// Look up a device. `None` if it is not (or no longer) registered.
    pub fn device(&self, qualifier: &str) -> Option<DeviceHandle> {
        self.shared.registry.device(qualifier)
    }

    /// Current registry snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.shared.registry.snapshot()
    }

    /// Receiver for the registry generation, updated after every rescan.
    #[cfg(feature = "tokio")]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<u64> {
        self.shared.generation.subscribe()
    }

    // ------------------------------------------------------------------------
    // Hotplug
    // ------------------------------------------------------------------------

    /// Start watching for hotplug events. No-op if already registered.
    ///
    /// The initial rescan runs on the calling thread; its error is returned
    /// with the listener left registered, so later hotplug events still
    /// trigger rescans.
    pub fn register_input_device_listener(&self) -> Result<()> {
        let shared = self.shared.clone();
        let registered = self
            .listener
            .register(move || shared.refresh_devices())?;

        if registered && self.config.refresh_on_register {
            self.refresh_devices()?;
        }
        Ok(())
    }

    /// Stop watching for hotplug events. No-op if not registered.
    pub fn unregister_input_device_listener(&self) -> Result<()> {
        self.listener.unregister().map(|_| ())
    }

    /// Whether the hotplug listener is registered.
    pub fn is_listener_registered(&self) -> bool {
        self.listener.is_registered()
    }

    /// Id of the hotplug thread while the listener is registered.
    pub fn hotplug_thread_id(&self) -> Option<ThreadId> {
        self.listener.thread_id()
    }

    // ------------------------------------------------------------------------
    // Haptics
    // ------------------------------------------------------------------------

    /// Vibration capability of one device.
    pub fn device_vibrator_manager(&self, device: &Device) -> Option<Arc<dyn VibratorManager>> {
        vibrator::device_vibrator_manager(device)
    }

    /// System-wide vibration capability.
    pub fn system_vibrator_manager(&self) -> Option<Arc<dyn VibratorManager>> {
        vibrator::system_vibrator_manager(self.shared.platform.as_ref())
    }

    /// Play one rumble pulse on `vibrator`.
    pub fn vibrate(&self, vibrator: &dyn Vibrator) {
        haptics::vibrate(vibrator);
    }
}
