//! # Polyline Extrusion and OBJ Export
//!
//! Extrudes 2D polylines into prisms and writes them as Wavefront OBJ with
//! a README of import instructions beside the mesh.
//!
//! ```rust,no_run
//! use draft_common::Document;
//! use extrude::{export_document, ExportConfig};
//!
//! let document = Document::from_json_file("plan.json")?;
//! let report = export_document(&document, &ExportConfig::default(), "plan.obj")?;
//! println!("{} faces", report.obj.face_count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod mesh;
pub mod obj;
pub mod interchange;
pub mod export;
pub mod staging;

pub use error::{ExtrudeError, Result};
pub use mesh::{extrude, Face, Mesh, MeshExtruder, MeshGroup};
pub use obj::{export_obj, to_obj_string, write_obj, ObjDocument, ObjExport, README_FILE_NAME, README_TEXT};
pub use interchange::{Interchange, InterchangePath};
pub use export::{export_document, export_snapshot, ExportConfig, ExportReport};
pub use staging::StagedFiles;
