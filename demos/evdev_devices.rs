//! Evdev example - list /dev/input devices and follow hotplug.
//!
//! Usage:
//!   cargo run --example evdev_devices --features evdev
//!
//! Press Ctrl+C to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(target_os = "linux")]
use inputbridge::platform::linux::EvdevPlatform;
#[cfg(target_os = "linux")]
use inputbridge::{ControllerBackend, DeviceHandle, InputContext, KeyEvent, MotionEvent, RegistrySnapshot};

#[cfg(target_os = "linux")]
struct ListingBackend;

#[cfg(target_os = "linux")]
impl ControllerBackend for ListingBackend {
    fn key_event(&self, _device: Option<&DeviceHandle>, _event: &KeyEvent) -> bool {
        false
    }

    fn motion_event(&self, _device: Option<&DeviceHandle>, _event: &MotionEvent) -> bool {
        false
    }

    fn sensor_event(&self, _device: &str, _axis: &str, _value: f32) -> bool {
        false
    }

    fn devices_changed(&self, snapshot: &RegistrySnapshot) {
        println!("--- {} device(s) ---", snapshot.len());
        for qualifier in snapshot.qualifiers() {
            if let Some(device) = snapshot.get(&qualifier) {
                println!("{:<48} {:?}", qualifier, device.capabilities());
            }
        }
    }
}

fn main() -> inputbridge::Result<()> {
    #[cfg(not(target_os = "linux"))]
    {
        eprintln!("This example only runs on Linux.");
        std::process::exit(1);
    }

    #[cfg(target_os = "linux")]
    {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();

        // Handle Ctrl+C
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
            println!("\nStopping...");
        })
        .expect("Error setting Ctrl-C handler");

        let context = InputContext::new(Arc::new(EvdevPlatform::new()), Arc::new(ListingBackend));
        context.register_input_device_listener()?;

        println!("Plug or unplug a controller to see the registry change.");
        println!("Press Ctrl+C to stop.\n");

        while running.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(200));
        }

        context.unregister_input_device_listener()?;
    }

    Ok(())
}
