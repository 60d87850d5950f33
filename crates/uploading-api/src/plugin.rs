//! Plugin manifest as registered with the host platform.

use async_graphql::SimpleObject;
use serde::Serialize;
use uploading_core::constants::{PLUGIN_DESCRIPTION, PLUGIN_ID, PLUGIN_NAME};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
#[graphql(name = "Plugin")]
pub struct PluginManifest {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Active without any per-channel setup.
    pub default_active: bool,
    pub configuration_per_channel: bool,
}

impl PluginManifest {
    pub fn uploading() -> Self {
        Self {
            id: PLUGIN_ID.to_string(),
            name: PLUGIN_NAME.to_string(),
            description: PLUGIN_DESCRIPTION.to_string(),
            default_active: true,
            configuration_per_channel: false,
        }
    }

    pub fn matches(&self, id: &str) -> bool {
        self.id == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploading_manifest() {
        let manifest = PluginManifest::uploading();
        assert_eq!(manifest.id, "uploading");
        assert_eq!(manifest.description, "Plugin for S3 storage links");
        assert!(manifest.default_active);
        assert!(!manifest.configuration_per_channel);
        assert!(manifest.matches("uploading"));
        assert!(!manifest.matches("mirumee.payments.stripe"));
    }
}
