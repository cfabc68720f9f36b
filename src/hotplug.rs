//! Hotplug listener and its background thread.
//!
//! [`HotplugListener`] moves between two states, unregistered and registered.
//! Registering spawns one dedicated thread draining a message queue and hands
//! the platform a listener object that posts onto that queue. Every
//! attach/remove/change callback posts the same rescan request. The thread
//! collapses queued requests and runs the [`RescanHandler`] once for them.

use crate::error::{Error, Result};
use crate::platform::{InputDeviceListener, InputPlatform, ListenerId};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle, ThreadId};

/// Default name of the hotplug thread.
pub const DEFAULT_THREAD_NAME: &str = "Hotplug thread";

/// Which platform callback caused a rescan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotplugKind {
    Added,
    Removed,
    Changed,
}

/// Work run on the hotplug thread for every rescan request.
pub trait RescanHandler: Send + Sync {
    fn rescan(&self) -> Result<()>;
}

/// Implement RescanHandler for closures.
impl<F> RescanHandler for F
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn rescan(&self) -> Result<()> {
        self()
    }
}

enum Message {
    Rescan(HotplugKind, i32),
    Quit,
}

/// Listener object handed to the platform.
struct QueueListener {
    sender: Sender<Message>,
}

impl QueueListener {
    fn post(&self, kind: HotplugKind, device_id: i32) {
        if self.sender.send(Message::Rescan(kind, device_id)).is_err() {
            log::debug!("hotplug thread gone, dropping {:?} for device {}", kind, device_id);
        }
    }
}

impl InputDeviceListener for QueueListener {
    fn on_input_device_added(&self, device_id: i32) {
        self.post(HotplugKind::Added, device_id);
    }

    fn on_input_device_removed(&self, device_id: i32) {
        self.post(HotplugKind::Removed, device_id);
    }

    fn on_input_device_changed(&self, device_id: i32) {
        self.post(HotplugKind::Changed, device_id);
    }
}

struct Registration {
    platform_listener: ListenerId,
    sender: Sender<Message>,
    thread: JoinHandle<()>,
}

/// Watches the platform for device attach/remove/change.
pub struct HotplugListener {
    platform: Arc<dyn InputPlatform>,
    thread_name: String,
    registration: Mutex<Option<Registration>>,
}

impl HotplugListener {
    pub fn new(platform: Arc<dyn InputPlatform>, thread_name: impl Into<String>) -> Self {
        Self {
            platform,
            thread_name: thread_name.into(),
            registration: Mutex::new(None),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Registration>>> {
        self.registration
            .lock()
            .map_err(|_| Error::ThreadError("hotplug registration mutex poisoned".into()))
    }

    /// Start the hotplug thread and attach to the platform.
    ///
    /// Returns `Ok(false)` without doing anything if already registered.
    pub fn register<H: RescanHandler + 'static>(&self, handler: H) -> Result<bool> {
        let mut registration = self.lock()?;
        if registration.is_some() {
            log::debug!("hotplug listener already registered");
            return Ok(false);
        }

        let (sender, receiver) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || run_loop(receiver, handler))
            .map_err(|e| Error::ThreadError(format!("failed to spawn hotplug thread: {}", e)))?;

        let listener = Arc::new(QueueListener {
            sender: sender.clone(),
        });
        let platform_listener = match self.platform.register_device_listener(listener) {
            Ok(id) => id,
            Err(e) => {
                stop_thread(&sender, thread)?;
                return Err(e);
            }
        };

        *registration = Some(Registration {
            platform_listener,
            sender,
            thread,
        });
        log::info!("hotplug listener registered on '{}'", self.thread_name);
        Ok(true)
    }

    /// Detach from the platform and stop the hotplug thread.
    ///
    /// Returns `Ok(false)` without doing anything if not registered. A
    /// platform failure while detaching is returned after the thread stops.
    pub fn unregister(&self) -> Result<bool> {
        let Some(registration) = self.lock()?.take() else {
            return Ok(false);
        };

        let detached = self
            .platform
            .unregister_device_listener(registration.platform_listener);
        stop_thread(&registration.sender, registration.thread)?;
        detached?;

        log::info!("hotplug listener unregistered");
        Ok(true)
    }

    pub fn is_registered(&self) -> bool {
        self.lock().map(|r| r.is_some()).unwrap_or(false)
    }

    /// Id of the running hotplug thread.
    pub fn thread_id(&self) -> Option<ThreadId> {
        self.lock()
            .ok()?
            .as_ref()
            .map(|registration| registration.thread.thread().id())
    }
}

impl Drop for HotplugListener {
    fn drop(&mut self) {
        if self.is_registered() {
            let _ = self.unregister();
        }
    }
}

fn stop_thread(sender: &Sender<Message>, thread: JoinHandle<()>) -> Result<()> {
    let _ = sender.send(Message::Quit);
    thread
        .join()
        .map_err(|_| Error::ThreadError("failed to join hotplug thread".into()))
}

fn run_loop<H: RescanHandler>(receiver: Receiver<Message>, handler: H) {
    while let Ok(message) = receiver.recv() {
        let Message::Rescan(kind, device_id) = message else {
            break;
        };
        log::debug!("hotplug {:?} for device {}", kind, device_id);

        // One rebuild covers every request already queued.
        let mut quit = false;
        while let Ok(pending) = receiver.try_recv() {
            if matches!(pending, Message::Quit) {
                quit = true;
                break;
            }
        }
        if quit {
            break;
        }

        if let Err(e) = handler.rescan() {
            log::error!("device rescan failed: {}", e);
        }
    }
    log::debug!("hotplug thread exiting");
}
