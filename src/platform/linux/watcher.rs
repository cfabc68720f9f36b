//! Hotplug detection by watching the input directory.

use super::event_number;
use crate::error::{Error, Result};
use crate::hotplug::HotplugKind;
use crate::platform::InputDeviceListener;
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Directory watch forwarding event node changes to a listener.
pub(super) struct DirectoryWatcher {
    active: Arc<AtomicBool>,
    _watcher: RecommendedWatcher,
}

impl DirectoryWatcher {
    pub(super) fn spawn(dir: &Path, listener: Arc<dyn InputDeviceListener>) -> Result<Self> {
        let active = Arc::new(AtomicBool::new(true));
        let callback_active = active.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // The backend thread may still deliver after a stop.
                if !callback_active.load(Ordering::SeqCst) {
                    return;
                }
                match res {
                    Ok(event) => forward(&event, listener.as_ref()),
                    Err(e) => log::warn!("input directory watch error: {}", e),
                }
            },
            Config::default(),
        )
        .map_err(|e| watch_error(dir, e))?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| watch_error(dir, e))?;

        log::debug!("watching {} for input devices", dir.display());
        Ok(Self {
            active,
            _watcher: watcher,
        })
    }

    /// Stop forwarding; the watch itself ends when `self` drops.
    pub(super) fn stop(self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

fn forward(event: &Event, listener: &dyn InputDeviceListener) {
    let Some(kind) = classify(&event.kind) else {
        return;
    };

    for path in &event.paths {
        let Some(id) = path
            .file_name()
            .and_then(|name| event_number(&name.to_string_lossy()))
        else {
            continue;
        };
        match kind {
            HotplugKind::Added => listener.on_input_device_added(id),
            HotplugKind::Removed => listener.on_input_device_removed(id),
            HotplugKind::Changed => listener.on_input_device_changed(id),
        }
    }
}

fn classify(kind: &EventKind) -> Option<HotplugKind> {
    match kind {
        EventKind::Create(_) => Some(HotplugKind::Added),
        EventKind::Remove(_) => Some(HotplugKind::Removed),
        // Permissions usually change right after creation.
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(HotplugKind::Changed),
        _ => None,
    }
}

fn watch_error(dir: &Path, e: notify::Error) -> Error {
    let message = e.to_string();
    match e.kind {
        notify::ErrorKind::PathNotFound => {
            Error::ServiceUnavailable(format!("{} does not exist", dir.display()))
        }
        notify::ErrorKind::Io(io) => super::access_error(dir, io),
        _ => Error::Platform(format!("cannot watch {}: {}", dir.display(), message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(HotplugKind, i32)>>,
    }

    impl InputDeviceListener for Recording {
        fn on_input_device_added(&self, device_id: i32) {
            self.calls.lock().unwrap().push((HotplugKind::Added, device_id));
        }
        fn on_input_device_removed(&self, device_id: i32) {
            self.calls.lock().unwrap().push((HotplugKind::Removed, device_id));
        }
        fn on_input_device_changed(&self, device_id: i32) {
            self.calls.lock().unwrap().push((HotplugKind::Changed, device_id));
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&EventKind::Create(CreateKind::File)),
            Some(HotplugKind::Added)
        );
        assert_eq!(
            classify(&EventKind::Remove(RemoveKind::File)),
            Some(HotplugKind::Removed)
        );
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))),
            Some(HotplugKind::Changed)
        );
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Data(DataChange::Any))),
            None
        );
    }

    #[test]
    fn test_forward_skips_non_event_nodes() {
        let listener = Recording::default();
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/dev/input/event3"))
            .add_path(PathBuf::from("/dev/input/js0"));

        forward(&event, &listener);
        assert_eq!(*listener.calls.lock().unwrap(), vec![(HotplugKind::Added, 3)]);
    }

    #[test]
    fn test_missing_directory_is_service_unavailable() {
        let listener: Arc<dyn InputDeviceListener> = Arc::new(Recording::default());
        let result = DirectoryWatcher::spawn(Path::new("/nonexistent/inputbridge/input"), listener);
        assert!(matches!(result, Err(Error::ServiceUnavailable(_))));
    }

    #[test]
    fn test_watcher_reports_new_event_node() {
        let dir = std::env::temp_dir().join(format!("inputbridge-watch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let listener = Arc::new(Recording::default());
        let watcher = DirectoryWatcher::spawn(&dir, listener.clone()).unwrap();
        std::fs::write(dir.join("event42"), b"").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while listener.calls.lock().unwrap().is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }

        watcher.stop();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(listener.calls.lock().unwrap()[0], (HotplugKind::Added, 42));
    }
}
