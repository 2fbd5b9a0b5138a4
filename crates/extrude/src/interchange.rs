use std::path::Path;

use draft_common::{Point3D, Polyline};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::Result,
    obj::parent_dir,
    staging::StagedFiles,
};

pub const INTERCHANGE_VERSION: &str = "1.0";
pub const INTERCHANGE_TYPE: &str = "draftkit_export";

/// Grasshopper-friendly path dump: every polyline as planar 3D points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Interchange {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub paths: Vec<InterchangePath>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InterchangePath {
    pub id: usize,
    pub points: Vec<Point3D>,
    pub closed: bool,
}

impl Interchange {
    pub fn from_polylines(polylines: &[Polyline]) -> Self {
        let paths = polylines
            .iter()
            .enumerate()
            .map(|(id, polyline)| InterchangePath {
                id,
                points: polyline
                    .points
                    .iter()
                    .map(|&p| Point3D::from_planar(p, 0.0))
                    .collect(),
                closed: false,
            })
            .collect();

        Self {
            version: INTERCHANGE_VERSION.to_string(),
            kind: INTERCHANGE_TYPE.to_string(),
            paths,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Atomically write the pretty-printed JSON to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut files = StagedFiles::new(parent_dir(path));
        self.stage(&mut files, path)?;
        files.commit()?;
        info!(path = %path.display(), paths = self.paths.len(), "wrote interchange JSON");
        Ok(())
    }

    pub(crate) fn stage(&self, files: &mut StagedFiles, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        files.stage(path, |file| {
            use std::io::Write;
            file.write_all(json.as_bytes())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draft_common::{DrawingTool, Point2D, StrokeColor};

    #[test]
    fn test_interchange_shape() {
        let polyline = Polyline::new(
            vec![Point2D::new(1.0, 2.0), Point2D::new(3.0, 4.0)],
            StrokeColor::RED,
            1.5,
            DrawingTool::Line,
        );
        let json = Interchange::from_polylines(&[polyline])
            .to_json()
            .expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["type"], "draftkit_export");
        assert_eq!(value["paths"][0]["id"], 0);
        assert_eq!(value["paths"][0]["closed"], false);
        assert_eq!(value["paths"][0]["points"][1]["x"], 3.0);
        assert_eq!(value["paths"][0]["points"][1]["z"], 0.0);
    }
}
