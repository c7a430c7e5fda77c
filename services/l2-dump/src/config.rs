//! Configuration file loading.
//!
//! The file is YAML holding the decode options plus dump settings:
//!
//! ```yaml
//! unpack: true
//! fields:
//!   Data_1Hz: [Lat_1Hz, Lon_1Hz]
//!   Data_20Hz: [Lat, Lon, Elev_1, days_J2k]
//! preview: 3
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use l2_parser::DecodeOptions;
use serde::Deserialize;

/// Number of valid samples shown per column when not configured.
pub const DEFAULT_PREVIEW: usize = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DumpConfig {
    #[serde(flatten)]
    pub options: DecodeOptions,

    /// Valid samples listed per column in the summary.
    #[serde(default = "default_preview")]
    pub preview: usize,
}

fn default_preview() -> usize {
    DEFAULT_PREVIEW
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            options: DecodeOptions::default(),
            preview: DEFAULT_PREVIEW,
        }
    }
}

impl DumpConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: DumpConfig =
            serde_yaml::from_str(content).with_context(|| "Failed to parse dump config YAML")?;
        validate(&config)?;
        Ok(config)
    }
}

/// Load and parse a dump configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DumpConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read dump config from {:?}", path.as_ref()))?;
    DumpConfig::from_yaml(&content)
        .with_context(|| format!("Invalid dump config {:?}", path.as_ref()))
}

fn validate(config: &DumpConfig) -> Result<()> {
    if let Some(fields) = &config.options.fields {
        anyhow::ensure!(!fields.is_empty(), "Field selection cannot be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use l2_parser::{Baseline, FieldSelection};

    #[test]
    fn test_full_config() {
        let config = DumpConfig::from_yaml(
            "unpack: true\nfields:\n  Data_20Hz: [Lat, Lon]\npreview: 2\n",
        )
        .unwrap();
        assert!(config.options.unpack);
        assert_eq!(config.preview, 2);
        assert_eq!(
            config.options.selection(Baseline::C),
            FieldSelection::new().with_group("Data_20Hz", ["Lat", "Lon"])
        );
    }

    #[test]
    fn test_defaults() {
        let config = DumpConfig::from_yaml("{}").unwrap();
        assert_eq!(config, DumpConfig::default());
        assert_eq!(
            config.options.selection(Baseline::A),
            FieldSelection::default_for(Baseline::A)
        );
    }

    #[test]
    fn test_empty_selection_rejected() {
        assert!(DumpConfig::from_yaml("fields: {}\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = test_utils::temp_test_dir();
        let path = dir.path().join("dump.yaml");
        fs::write(&path, "unpack: false\n").unwrap();
        assert!(!load_config(&path).unwrap().options.unpack);
        assert!(load_config(dir.path().join("absent.yaml")).is_err());
    }
}
