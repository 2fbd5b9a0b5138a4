use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{CommonError, Polyline, Result};

/// The drawing document: an ordered list of polylines plus the building
/// parameters used when extruding them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Document {
    pub paths: Vec<Polyline>,
    /// Wall height per floor, in millimeters
    pub wall_height: f64,
    pub floor_count: u32,
    /// Stroke width used for newly drawn walls
    pub wall_thickness: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            wall_height: 120.0,
            floor_count: 1,
            wall_thickness: 6.0,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total extrusion height across all floors (at least one floor)
    pub fn extrusion_depth(&self) -> f64 {
        self.wall_height * f64::from(self.floor_count.max(1))
    }

    /// Append a finished stroke
    pub fn push_path(&mut self, path: Polyline) {
        self.paths.push(path);
    }

    /// Remove the most recent stroke, if any
    pub fn undo(&mut self) -> Option<Polyline> {
        self.paths.pop()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Hand-off point for a completed trace: appends all traced polylines at once.
    pub fn apply_trace(&mut self, traced: Vec<Polyline>) {
        self.paths.extend(traced);
    }

    /// Owned copy of the current polylines, decoupled from later edits
    pub fn snapshot(&self) -> Vec<Polyline> {
        self.paths.clone()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a document from a `.json` file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            other => Err(CommonError::UnsupportedFormat {
                format: other.unwrap_or_default().to_string(),
            }),
        }
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
