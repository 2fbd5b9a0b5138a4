use draft_common::CommonError;
use extrude::{ExportConfig, ExtrudeError};
use vectorize::{DetectedShape, TraceConfig, TraceError};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DraftKitError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Extrude(#[from] ExtrudeError),
    #[error(transparent)]
    Document(#[from] CommonError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Tracing and export settings, loadable from TOML or JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct DraftConfig {
    pub trace: TraceConfig,
    pub export: ExportConfig,
    pub building: BuildingSection,
}

/// Building parameters applied to documents created by `trace` and `run`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct BuildingSection {
    /// Wall height per floor, in millimeters
    #[schemars(range(min = 1.0))]
    pub wall_height: f64,
    #[schemars(range(min = 1))]
    pub floor_count: u32,
}

impl Default for BuildingSection {
    fn default() -> Self {
        Self {
            wall_height: 120.0,
            floor_count: 1,
        }
    }
}

impl BuildingSection {
    pub fn apply(&self, document: &mut draft_common::Document) {
        document.wall_height = self.wall_height;
        document.floor_count = self.floor_count;
    }
}

impl DraftConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, DraftKitError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, DraftKitError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DraftKitError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DraftKitError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DraftKitError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DraftKitError::UnsupportedFileFormat),
        }
    }

    /// Save to a file, choosing TOML or JSON by extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DraftKitError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml_file(path),
            Some("json") => self.to_json_file(path),
            _ => Err(DraftKitError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DraftKitError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, DraftKitError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DraftKitError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, DraftKitError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// JSON schema of the whole configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DraftConfig)
    }
}

/// Shapes produced by an external detector, replayed into a trace
pub fn load_shapes<P: AsRef<Path>>(path: P) -> Result<Vec<DetectedShape>, DraftKitError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
