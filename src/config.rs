//! Context configuration.

use crate::hotplug::DEFAULT_THREAD_NAME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for an [`InputContext`](crate::InputContext).
///
/// Rumble effect and intensity are deliberately not part of this; see
/// [`RUMBLE_EFFECT`](crate::haptics::RUMBLE_EFFECT).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContextConfig {
    /// Name given to the hotplug thread.
    pub hotplug_thread_name: String,

    /// Rescan devices as soon as the hotplug listener is registered.
    pub refresh_on_register: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            hotplug_thread_name: DEFAULT_THREAD_NAME.to_string(),
            refresh_on_register: true,
        }
    }
}

impl ContextConfig {
    pub fn with_hotplug_thread_name(mut self, name: impl Into<String>) -> Self {
        self.hotplug_thread_name = name.into();
        self
    }

    pub fn with_refresh_on_register(mut self, enabled: bool) -> Self {
        self.refresh_on_register = enabled;
        self
    }
}
