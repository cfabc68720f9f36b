//! Hotplug example - watch an in-memory platform rebuild the registry.
//!
//! Run with: cargo run --example hotplug

use inputbridge::platform::memory::{MemoryPlatform, MemoryVibrator};
use inputbridge::{
    Capabilities, ControllerBackend, DeviceDescriptor, DeviceHandle, InputContext, KeyEvent,
    MotionEvent, RegistrySnapshot, VibrationSource,
};
use std::sync::Arc;
use std::time::Duration;

/// Consumes everything coming from a registered device.
struct PrintingBackend;

impl ControllerBackend for PrintingBackend {
    fn key_event(&self, device: Option<&DeviceHandle>, event: &KeyEvent) -> bool {
        match device {
            Some(device) => {
                println!("  key {} {:?} from {}", event.key_code, event.action, device.qualifier());
                true
            }
            None => false,
        }
    }

    fn motion_event(&self, device: Option<&DeviceHandle>, _event: &MotionEvent) -> bool {
        device.is_some()
    }

    fn sensor_event(&self, _device: &str, _axis: &str, _value: f32) -> bool {
        false
    }

    fn devices_changed(&self, snapshot: &RegistrySnapshot) {
        println!(
            "Registry generation {}: {:?}",
            snapshot.generation(),
            snapshot.qualifiers()
        );
    }
}

fn main() -> inputbridge::Result<()> {
    let platform = Arc::new(MemoryPlatform::new());
    let context = InputContext::new(platform.clone(), Arc::new(PrintingBackend));
    context.register_input_device_listener()?;

    let motor = Arc::new(MemoryVibrator::new());
    platform.attach(
        DeviceDescriptor::new(5, "Mock", "gamepad-1")
            .with_capabilities(Capabilities::KEYS | Capabilities::MOTION)
            .with_vibration(VibrationSource::Vibrator(motor.clone())),
    );
    platform.attach(DeviceDescriptor::new(8, "Mock", "gamepad-1"));
    std::thread::sleep(Duration::from_millis(100));

    println!("Dispatching key events:");
    let consumed = context.dispatch_key_event(&KeyEvent::key_down(5, 96));
    println!("  consumed: {}", consumed);
    let consumed = context.dispatch_key_event(&KeyEvent::key_down(42, 96));
    println!("  unknown device consumed: {}", consumed);

    if let Some(device) = context.device("Mock/0/gamepad-1") {
        if let Some(vibrator) = context
            .device_vibrator_manager(&device)
            .and_then(|manager| manager.vibrator(0))
        {
            context.vibrate(vibrator.as_ref());
            println!("Rumble played: {:?}", motor.played());
        }
    }

    platform.detach(5);
    std::thread::sleep(Duration::from_millis(100));

    context.unregister_input_device_listener()?;
    println!("Done");
    Ok(())
}
