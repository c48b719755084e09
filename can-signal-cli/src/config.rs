//! Configuration loading and parsing
//!
//! One TOML file carries the codec policy, the signal table and the live
//! output frame buffers.

use anyhow::{bail, Context, Result};
use can_signal_codec::{
    CanFrame, CodecConfig, FrameBuffers, SignalDescriptor, SignalTable, SignalType,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from signals.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub signals: Vec<SignalEntry>,
    #[serde(default)]
    pub frames: Vec<FrameEntry>,
}

/// One row of the signal table as written in the config file
///
/// `type` stays a string here so that a single unsupported entry can be
/// skipped instead of failing the whole file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignalEntry {
    pub frame_id: u32,
    pub signal_id: u32,
    pub name: String,
    pub start_bit: u8,
    pub end_bit: u8,
    pub min: u32,
    pub max: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Initial contents of a live output buffer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameEntry {
    pub id: u32,
    pub dlc: u8,
    #[serde(default)]
    pub data: Vec<u8>,
}

impl AppConfig {
    /// Build the validated signal table, skipping entries of unsupported type
    pub fn build_table(&self) -> Result<SignalTable> {
        let mut descriptors = Vec::with_capacity(self.signals.len());

        for entry in &self.signals {
            let signal_type = match entry.kind.parse::<SignalType>() {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("{}({}): {}, entry skipped", entry.name, entry.signal_id, e);
                    continue;
                }
            };

            descriptors.push(SignalDescriptor {
                frame_id: entry.frame_id,
                signal_id: entry.signal_id,
                name: entry.name.clone(),
                start_bit: entry.start_bit,
                end_bit: entry.end_bit,
                min: entry.min,
                max: entry.max,
                signal_type,
            });
        }

        SignalTable::with_config(descriptors, &self.codec).context("Invalid signal table")
    }

    /// Build the live output buffers from the `[[frames]]` entries
    pub fn build_buffers(&self) -> Result<FrameBuffers> {
        let mut frames = Vec::with_capacity(self.frames.len());

        for entry in &self.frames {
            if entry.data.len() > 8 {
                bail!(
                    "Output frame 0x{:X} has {} data bytes, at most 8 allowed",
                    entry.id,
                    entry.data.len()
                );
            }
            let mut data = [0u8; 8];
            data[..entry.data.len()].copy_from_slice(&entry.data);
            frames.push(CanFrame::new(entry.id, entry.dlc, data));
        }

        FrameBuffers::new(frames).context("Invalid output frame buffers")
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    log::debug!(
        "Config {:?}: {} signals, {} output frames",
        path,
        config.signals.len(),
        config.frames.len()
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_signal_codec::TypeCheckPolicy;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [codec]
        type_check = "legacy-uint8"

        [[signals]]
        frame_id = 0x100
        signal_id = 1
        name = "DoorOpen"
        start_bit = 0
        end_bit = 0
        min = 0
        max = 1
        type = "bool"

        [[signals]]
        frame_id = 0x100
        signal_id = 2
        name = "Pressure"
        start_bit = 8
        end_bit = 15
        min = 0
        max = 100
        type = "float"

        [[frames]]
        id = 0x100
        dlc = 2
        data = [0x00, 0xFF]
    "#;

    #[test]
    fn test_config_deserialization() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.signals.len(), 2);
        assert_eq!(config.frames[0].id, 0x100);
        assert_eq!(config.codec.type_check, TypeCheckPolicy::LegacyUInt8);
        assert!(config.codec.require_unique_names);
    }

    #[test]
    fn test_unsupported_type_is_skipped() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        let table = config.build_table().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.find_by_name("Pressure").is_none());
    }

    #[test]
    fn test_build_buffers() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        let buffers = config.build_buffers().unwrap();
        assert_eq!(buffers.get(0x100).unwrap().payload(), &[0x00, 0xFF]);
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let config: AppConfig = toml::from_str(
            r#"
            [[frames]]
            id = 0x10
            dlc = 8
            data = [0, 0, 0, 0, 0, 0, 0, 0, 0]
        "#,
        )
        .unwrap();
        assert!(config.build_buffers().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.signals[0].name, "DoorOpen");
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("absent.toml"));
        assert!(result.is_err());
    }
}
