use crate::model::{Device, DeviceConfig};

impl Device {
    /// Name shown to the user. Devices without a config have no name and render as `""`.
    pub fn display_name(&self) -> &str {
        self.config
            .as_ref()
            .map(|config| config.name.as_str())
            .unwrap_or_default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Vec::new(),
            config: Some(DeviceConfig { name: name.into() }),
        }
    }
}
