//! Device registry with rebuild-then-swap snapshots.
//!
//! The registry maps qualifier strings to [`DeviceHandle`]s. Every rescan
//! builds a complete new [`RegistrySnapshot`] from the platform's device list
//! and swaps it in atomically; readers hold an `Arc` to whichever snapshot
//! was current when they asked and never see a half-built table.
//!
//! ## Qualifier assignment
//!
//! - A device whose platform id, source and name are unchanged since the
//!   previous snapshot keeps its qualifier.
//! - A new device gets the lowest `id` for its `source/name` pair that is not
//!   held by any device of the previous snapshot. Qualifiers of devices that
//!   disappeared in this rescan are therefore only reused on a later rescan,
//!   so a stale qualifier never points at a different physical device.

use crate::device::{Device, DeviceDescriptor, DeviceHandle, DeviceQualifier};
use crate::error::Result;
use crate::platform::InputPlatform;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Immutable view of the registry at one point in time.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    devices: HashMap<String, DeviceHandle>,
    by_platform_id: HashMap<i32, String>,
    generation: u64,
}

impl RegistrySnapshot {
    /// Look up a device by qualifier string.
    pub fn get(&self, qualifier: &str) -> Option<&DeviceHandle> {
        self.devices.get(qualifier)
    }

    /// Look up a device by the platform's device id.
    pub fn get_by_platform_id(&self, platform_id: i32) -> Option<&DeviceHandle> {
        self.by_platform_id
            .get(&platform_id)
            .and_then(|qualifier| self.devices.get(qualifier))
    }

    pub fn contains(&self, qualifier: &str) -> bool {
        self.devices.contains_key(qualifier)
    }

    /// All qualifier strings, sorted.
    pub fn qualifiers(&self) -> Vec<String> {
        let mut out: Vec<String> = self.devices.keys().cloned().collect();
        out.sort();
        out
    }

    /// Iterate over registered devices in no particular order.
    pub fn devices(&self) -> impl Iterator<Item = &DeviceHandle> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Number of rescans that produced this snapshot; `0` before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Render the registered devices as pretty-printed JSON, sorted by qualifier.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        let mut devices: Vec<(String, &Device)> = self
            .devices
            .iter()
            .map(|(qualifier, device)| (qualifier.clone(), device.as_ref()))
            .collect();
        devices.sort_by(|a, b| a.0.cmp(&b.0));
        let devices: Vec<&Device> = devices.into_iter().map(|(_, device)| device).collect();
        serde_json::to_string_pretty(&devices)
            .map_err(|e| crate::error::Error::Other(format!("Failed to serialize registry: {}", e)))
    }
}

/// Process-lifetime device registry.
#[derive(Debug, Default)]
pub struct Registry {
    current: RwLock<Arc<RegistrySnapshot>>,
    writer: Mutex<()>,
}

impl Registry {
    /// Create an empty registry (generation `0`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. The read lock is held only to clone the `Arc`.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up a device in the current snapshot.
    pub fn device(&self, qualifier: &str) -> Option<DeviceHandle> {
        self.snapshot().get(qualifier).cloned()
    }

    /// Qualifiers of the current snapshot, sorted.
    pub fn qualifiers(&self) -> Vec<String> {
        self.snapshot().qualifiers()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }

    /// Rescan `platform` and swap in the rebuilt snapshot.
    ///
    /// Concurrent calls are serialized. If enumeration fails the current
    /// snapshot stays in place and the error is returned.
    pub fn refresh(&self, platform: &dyn InputPlatform) -> Result<Arc<RegistrySnapshot>> {
        self.refresh_with(platform, |_| {})
    }

    /// Rescan `platform`, swap in the rebuilt snapshot and run `installed`
    /// on it before the next rescan may start.
    ///
    /// Observers notified from `installed` therefore see snapshots in
    /// generation order. `installed` must not rescan this registry.
    pub fn refresh_with<F>(
        &self,
        platform: &dyn InputPlatform,
        installed: F,
    ) -> Result<Arc<RegistrySnapshot>>
    where
        F: FnOnce(&RegistrySnapshot),
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let descriptors = platform.input_devices()?;
        let snapshot = self.install(descriptors);
        installed(&snapshot);
        Ok(snapshot)
    }

    /// Rebuild from an explicit device list.
    pub fn rebuild(&self, descriptors: Vec<DeviceDescriptor>) -> Arc<RegistrySnapshot> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.install(descriptors)
    }

    // Caller holds `writer`.
    fn install(&self, descriptors: Vec<DeviceDescriptor>) -> Arc<RegistrySnapshot> {
        let previous = self.snapshot();
        let next = Arc::new(build_snapshot(&previous, descriptors));
        log_changes(&previous, &next);

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        log::debug!(
            "registry rebuilt: generation {}, {} device(s)",
            next.generation(),
            next.len()
        );
        next
    }
}

fn build_snapshot(previous: &RegistrySnapshot, descriptors: Vec<DeviceDescriptor>) -> RegistrySnapshot {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut fresh = Vec::new();

    for descriptor in descriptors {
        if !seen.insert(descriptor.platform_id) {
            log::warn!(
                "platform reported device id {} twice, ignoring '{}'",
                descriptor.platform_id,
                descriptor.name
            );
            continue;
        }

        match previous.get_by_platform_id(descriptor.platform_id) {
            Some(device)
                if device.qualifier().source() == descriptor.source
                    && device.qualifier().name() == descriptor.name =>
            {
                let qualifier = device.qualifier().clone();
                kept.push((descriptor, qualifier));
            }
            _ => fresh.push(descriptor),
        }
    }

    let mut taken: HashSet<DeviceQualifier> = previous
        .devices()
        .map(|device| device.qualifier().clone())
        .collect();

    fresh.sort_by_key(|descriptor| descriptor.platform_id);
    let fresh = fresh.into_iter().map(|descriptor| {
        let qualifier = lowest_free_qualifier(&taken, &descriptor.source, &descriptor.name);
        taken.insert(qualifier.clone());
        (descriptor, qualifier)
    });
    let assigned: Vec<_> = kept.into_iter().chain(fresh.collect::<Vec<_>>()).collect();

    let mut snapshot = RegistrySnapshot {
        generation: previous.generation + 1,
        ..RegistrySnapshot::default()
    };
    for (descriptor, qualifier) in assigned {
        let key = qualifier.to_string();
        snapshot
            .by_platform_id
            .insert(descriptor.platform_id, key.clone());
        snapshot
            .devices
            .insert(key, Arc::new(Device::from_descriptor(descriptor, qualifier)));
    }
    snapshot
}

fn lowest_free_qualifier(taken: &HashSet<DeviceQualifier>, source: &str, name: &str) -> DeviceQualifier {
    let mut id = 0;
    loop {
        let candidate = DeviceQualifier::new(source, id, name);
        if !taken.contains(&candidate) {
            return candidate;
        }
        id += 1;
    }
}

fn log_changes(previous: &RegistrySnapshot, next: &RegistrySnapshot) {
    for qualifier in next.devices.keys() {
        if !previous.contains(qualifier) {
            log::info!("device attached: {}", qualifier);
        }
    }
    for qualifier in previous.devices.keys() {
        if !next.contains(qualifier) {
            log::info!("device detached: {}", qualifier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Capabilities;
    use crate::platform::memory::MemoryPlatform;

    fn pad(platform_id: i32, name: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(platform_id, "Mock", name)
            .with_capabilities(Capabilities::KEYS | Capabilities::MOTION)
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert_eq!(registry.generation(), 0);
        assert!(registry.qualifiers().is_empty());
        assert!(registry.device("Mock/0/Pad").is_none());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let registry = Registry::new();
        let first = registry.rebuild(vec![pad(1, "Pad"), pad(2, "Stick")]);
        let second = registry.rebuild(vec![pad(1, "Pad"), pad(2, "Stick")]);

        assert_eq!(first.qualifiers(), second.qualifiers());
        assert_eq!(second.qualifiers(), vec!["Mock/0/Pad", "Mock/0/Stick"]);
        assert_eq!(second.generation(), 2);
    }

    #[test]
    fn test_same_name_devices_get_distinct_ids() {
        let registry = Registry::new();
        let snapshot = registry.rebuild(vec![pad(4, "Pad"), pad(3, "Pad")]);
        assert_eq!(snapshot.qualifiers(), vec!["Mock/0/Pad", "Mock/1/Pad"]);
        assert_eq!(snapshot.get_by_platform_id(3).unwrap().qualifier().id(), 0);
        assert_eq!(snapshot.get_by_platform_id(4).unwrap().qualifier().id(), 1);
    }

    #[test]
    fn test_surviving_device_keeps_qualifier() {
        let registry = Registry::new();
        registry.rebuild(vec![pad(1, "Pad"), pad(2, "Pad")]);

        // The first pad goes away; the second must not be renumbered.
        let snapshot = registry.rebuild(vec![pad(2, "Pad")]);
        assert_eq!(snapshot.qualifiers(), vec!["Mock/1/Pad"]);
    }

    #[test]
    fn test_freed_qualifier_reused_only_after_next_rescan() {
        let registry = Registry::new();
        registry.rebuild(vec![pad(1, "Pad")]);

        let snapshot = registry.rebuild(vec![pad(2, "Pad")]);
        assert_eq!(snapshot.qualifiers(), vec!["Mock/1/Pad"]);
        assert!(snapshot.get("Mock/0/Pad").is_none());

        let snapshot = registry.rebuild(vec![pad(2, "Pad"), pad(3, "Pad")]);
        assert_eq!(snapshot.qualifiers(), vec!["Mock/0/Pad", "Mock/1/Pad"]);
        assert_eq!(snapshot.get("Mock/0/Pad").unwrap().platform_id(), 3);
    }

    #[test]
    fn test_renamed_device_gets_new_qualifier() {
        let registry = Registry::new();
        registry.rebuild(vec![pad(1, "Pad")]);
        let snapshot = registry.rebuild(vec![pad(1, "Pad (BT)")]);
        assert_eq!(snapshot.qualifiers(), vec!["Mock/0/Pad (BT)"]);
    }

    #[test]
    fn test_duplicate_platform_id_is_ignored() {
        let registry = Registry::new();
        let snapshot = registry.rebuild(vec![pad(1, "Pad"), pad(1, "Ghost")]);
        assert_eq!(snapshot.qualifiers(), vec!["Mock/0/Pad"]);
    }

    #[test]
    fn test_old_snapshot_is_unaffected_by_rebuild() {
        let registry = Registry::new();
        registry.rebuild(vec![pad(1, "Pad")]);
        let held = registry.snapshot();

        registry.rebuild(Vec::new());

        assert!(held.get("Mock/0/Pad").is_some());
        assert!(registry.device("Mock/0/Pad").is_none());
    }

    #[test]
    fn test_concurrent_rebuilds_serialize() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry.rebuild(vec![pad(1, "Pad"), pad(2, "Pad")]);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.generation(), 8);
        assert_eq!(registry.qualifiers(), vec!["Mock/0/Pad", "Mock/1/Pad"]);
    }

    #[test]
    fn test_refresh_with_runs_callbacks_in_generation_order() {
        let platform = Arc::new(MemoryPlatform::new());
        platform.attach(pad(1, "Pad"));
        let registry = Arc::new(Registry::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let platform = platform.clone();
                let seen = seen.clone();
                std::thread::spawn(move || {
                    registry
                        .refresh_with(platform.as_ref(), |snapshot| {
                            std::thread::sleep(std::time::Duration::from_millis(2));
                            seen.lock().unwrap().push(snapshot.generation());
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), (1..=8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_failed_refresh_skips_callback() {
        let platform = MemoryPlatform::new();
        platform.set_available(false);
        let registry = Registry::new();
        let mut called = false;

        assert!(registry.refresh_with(&platform, |_| called = true).is_err());
        assert!(!called);
        assert_eq!(registry.generation(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_to_json_uses_rendered_qualifier_order() {
        let registry = Registry::new();
        let descriptors = (0..11).map(|i| pad(i, "Pad")).collect();
        let snapshot = registry.rebuild(descriptors);

        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let ids: Vec<u64> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|device| device["qualifier"]["id"].as_u64().unwrap())
            .collect();
        let from_strings: Vec<u64> = snapshot
            .qualifiers()
            .iter()
            .map(|q| q.parse::<DeviceQualifier>().unwrap().id() as u64)
            .collect();
        assert_eq!(ids, from_strings);
        assert_eq!(ids[..3], [0, 1, 10]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_to_json_lists_devices_in_qualifier_order() {
        let registry = Registry::new();
        let snapshot = registry.rebuild(vec![pad(2, "Stick"), pad(1, "Pad")]);

        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let devices = value.as_array().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0]["qualifier"]["name"], "Pad");
        assert_eq!(devices[1]["platform_id"], 2);
        assert!(devices[0].get("vibration").is_none());
    }
}
