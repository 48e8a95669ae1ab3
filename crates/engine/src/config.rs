//! Engine configuration supplied once at session initialization.

use serde::{Deserialize, Serialize};

/// Capability modules the engine can be asked to load.
///
/// Only barcode capture is used in this system, but the configuration carries
/// the set explicitly so deployments stay data-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityModule {
    BarcodeCapture,
}

/// Immutable engine configuration: license, asset location, capability set.
///
/// Supplied once when the session initializes and never mutated afterwards.
/// Serde-derived so deployment presets can live in JSON config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfiguration {
    /// License key validated by the engine during configuration.
    pub license_key: String,
    /// Base URL the engine resolves its assets against.
    pub asset_base_url: String,
    /// Capability modules to load.
    pub capability_modules: Vec<CapabilityModule>,
}

impl EngineConfiguration {
    /// Creates a configuration with the barcode capture module enabled.
    pub fn new(license_key: impl Into<String>, asset_base_url: impl Into<String>) -> Self {
        Self {
            license_key: license_key.into(),
            asset_base_url: asset_base_url.into(),
            capability_modules: vec![CapabilityModule::BarcodeCapture],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_enables_barcode_capture() {
        let config = EngineConfiguration::new("KEY", "library/engine/");
        assert_eq!(config.capability_modules, vec![CapabilityModule::BarcodeCapture]);
    }

    #[test]
    fn deserializes_from_deployment_json() {
        let config: EngineConfiguration = serde_json::from_str(
            r#"{
                "license_key": "KEY",
                "asset_base_url": "library/engine/",
                "capability_modules": ["barcode-capture"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.license_key, "KEY");
        assert_eq!(config.capability_modules, vec![CapabilityModule::BarcodeCapture]);
    }
}
