use std::path::{Path, PathBuf};

use draft_common::{Document, Polyline};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{ExtrudeError, Result},
    interchange::Interchange,
    obj::{export_obj, parent_dir, stage_obj, ObjExport},
    staging::StagedFiles,
};

/// How a document is turned into files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExportConfig {
    /// Extrusion depth in millimeters; the document's wall height times its
    /// floor count when unset
    pub depth: Option<f64>,
    /// Also write the Grasshopper JSON next to the OBJ
    pub write_interchange: bool,
}

impl ExportConfig {
    pub fn resolve_depth(&self, document: &Document) -> f64 {
        self.depth.unwrap_or_else(|| document.extrusion_depth())
    }
}

/// Everything written by `export_document`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub obj: ObjExport,
    pub interchange_path: Option<PathBuf>,
}

/// Export a document snapshot as OBJ (+ README), and optionally as
/// interchange JSON sharing the OBJ's file stem.
///
/// All files are committed together: on failure none of them change.
pub fn export_document<P: AsRef<Path>>(document: &Document, config: &ExportConfig, path: P) -> Result<ExportReport> {
    let path = path.as_ref();
    let paths = document.snapshot();
    let mut files = StagedFiles::new(parent_dir(path));
    let obj = stage_obj(&mut files, &paths, config.resolve_depth(document), path)?;

    let interchange_path = if config.write_interchange {
        let json_path = path.with_extension("json");
        Interchange::from_polylines(&paths).stage(&mut files, &json_path)?;
        Some(json_path)
    } else {
        None
    };

    files.commit()?;
    info!(
        path = %path.display(),
        faces = obj.face_count,
        interchange = interchange_path.is_some(),
        "exported document"
    );
    Ok(ExportReport { obj, interchange_path })
}

/// Run `export_obj` on the blocking pool with an owned snapshot of the paths
pub async fn export_snapshot(paths: Vec<Polyline>, depth: f64, path: PathBuf) -> Result<ObjExport> {
    tokio::task::spawn_blocking(move || export_obj(&paths, depth, &path))
        .await
        .map_err(|error| ExtrudeError::Task(error.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use draft_common::{DrawingTool, Point2D, StrokeColor};

    fn document() -> Document {
        let mut document = Document::new();
        document.floor_count = 2;
        document.push_path(Polyline::new(
            vec![Point2D::new(0.0, 0.0), Point2D::new(40.0, 0.0), Point2D::new(40.0, 30.0)],
            StrokeColor::BLACK,
            2.0,
            DrawingTool::Pencil,
        ));
        document
    }

    #[test]
    fn test_depth_falls_back_to_document() {
        let document = document();
        assert_eq!(ExportConfig::default().resolve_depth(&document), 240.0);

        let config = ExportConfig {
            depth: Some(15.0),
            ..Default::default()
        };
        assert_eq!(config.resolve_depth(&document), 15.0);
    }

    #[test]
    fn test_export_document_with_interchange() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = ExportConfig {
            depth: None,
            write_interchange: true,
        };
        let report = export_document(&document(), &config, dir.path().join("plan.obj")).expect("export succeeds");

        assert!(report.obj.obj_path.exists());
        assert!(report.obj.readme_path.exists());
        let json_path = report.interchange_path.expect("interchange requested");
        assert_eq!(json_path, dir.path().join("plan.json"));
        assert!(json_path.exists());
    }

    #[tokio::test]
    async fn test_export_snapshot_runs_off_thread() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("snapshot.obj");
        let export = export_snapshot(document().snapshot(), 10.0, path.clone())
            .await
            .expect("export succeeds");

        assert_eq!(export.obj_path, path);
        assert_eq!(export.vertex_count, 6);
        assert_eq!(export.face_count, 5);
    }

    #[test]
    fn test_failed_interchange_writes_no_mesh() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("plan.json");
        std::fs::create_dir(&blocker).expect("create blocker");
        std::fs::write(blocker.join("keep"), b"x").expect("fill blocker");
        let config = ExportConfig {
            depth: Some(10.0),
            write_interchange: true,
        };

        let result = export_document(&document(), &config, dir.path().join("plan.obj"));
        assert!(matches!(result, Err(ExtrudeError::Persist(_))));
        assert!(!dir.path().join("plan.obj").exists());
        assert!(!dir.path().join(crate::README_FILE_NAME).exists());
        assert_eq!(std::fs::read_dir(dir.path()).expect("list dir").count(), 1);
    }
}
