/// Provider-side output device
use serde::{Deserialize, Serialize};

/// The device the provider is currently playing on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Provider device id, used to target control calls
    pub id: Option<String>,

    /// Display name (e.g., "Kitchen speaker")
    pub name: Option<String>,

    /// Provider device category (e.g., "Computer", "Smartphone")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,

    /// Volume in percent, if the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_percent: Option<u8>,

    /// Whether this is the active device
    #[serde(default)]
    pub is_active: bool,
}

impl Device {
    /// Create a device with an id and display name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            device_type: None,
            volume_percent: None,
            is_active: true,
        }
    }

    /// Device id if non-blank
    pub fn control_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}
