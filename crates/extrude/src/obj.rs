use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use draft_common::{Point3D, Polyline};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{ExtrudeError, Result},
    mesh::{Face, Mesh, MeshExtruder},
    staging::StagedFiles,
};

pub const README_FILE_NAME: &str = "README.txt";

/// Import instructions placed next to every exported mesh
pub const README_TEXT: &str = "\
draftkit 3D Export

This file contains a 3D model exported from draftkit.

Import Instructions:
1. Open Rhino 3D
2. File > Import > Select the .obj file
3. The model will be imported as a mesh
4. Use 'MeshToNURB' command to convert to NURBS surfaces if needed

For Grasshopper:
1. Use the 'File Path' component to reference this .obj file
2. Use 'Import 3DM' or mesh import components
3. Process as needed in your Grasshopper definition

Technical Details:
- Format: Wavefront OBJ
- Units: Millimeters (adjust scale in Rhino as needed)
- Coordinate System: Right-handed
";

/// Serialize `mesh` as Wavefront OBJ with 1-based face indices
pub fn write_obj<W: Write>(mut writer: W, mesh: &Mesh) -> std::io::Result<()> {
    writeln!(writer, "# draftkit export")?;
    writeln!(writer, "# Compatible with Rhino 3D and Grasshopper")?;
    writeln!(writer)?;

    for group in &mesh.groups {
        writeln!(writer, "# Path {}", group.source + 1)?;
        for v in mesh.group_vertices(group) {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for face in mesh.group_faces(group) {
            write!(writer, "f")?;
            for index in face.indices() {
                write!(writer, " {}", index + 1)?;
            }
            writeln!(writer)?;
        }
        writeln!(writer)?;
    }

    writer.flush()
}

pub fn to_obj_string(mesh: &Mesh) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_obj(&mut buffer, mesh);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Files produced by a successful export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjExport {
    pub obj_path: PathBuf,
    pub readme_path: PathBuf,
    pub vertex_count: usize,
    pub face_count: usize,
}

/// Extrude `polylines` and write the OBJ to `path` plus a README beside it.
///
/// Both files are staged in the destination directory and moved into place
/// together. A failed export leaves any earlier files at those paths as
/// they were.
pub fn export_obj<P: AsRef<Path>>(polylines: &[Polyline], depth: f64, path: P) -> Result<ObjExport> {
    let path = path.as_ref();
    let mut files = StagedFiles::new(parent_dir(path));
    let export = stage_obj(&mut files, polylines, depth, path)?;
    files.commit()?;

    info!(
        path = %path.display(),
        vertices = export.vertex_count,
        faces = export.face_count,
        "exported OBJ"
    );
    Ok(export)
}

/// Extrude and stage the OBJ and README without touching the destination
pub(crate) fn stage_obj(files: &mut StagedFiles, polylines: &[Polyline], depth: f64, path: &Path) -> Result<ObjExport> {
    let mesh = MeshExtruder::new(depth)?.extrude(polylines);
    let readme_path = parent_dir(path).join(README_FILE_NAME);

    files.stage(path, |file| write_obj(BufWriter::new(file), &mesh))?;
    files.stage(&readme_path, |file| file.write_all(README_TEXT.as_bytes()))?;

    Ok(ObjExport {
        obj_path: path.to_path_buf(),
        readme_path,
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
    })
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Minimal OBJ reader for the subset this crate writes: `v`, `f` and comments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjDocument {
    pub vertices: Vec<Point3D>,
    /// Faces with 0-based indices
    pub faces: Vec<Face>,
    pub comments: Vec<String>,
}

impl ObjDocument {
    pub fn parse(content: &str) -> Result<Self> {
        let mut document = Self::default();

        for (number, raw) in content.lines().enumerate() {
            let line = number + 1;
            let text = raw.trim();
            if text.is_empty() {
                continue;
            }
            if let Some(comment) = text.strip_prefix('#') {
                document.comments.push(comment.trim().to_string());
                continue;
            }

            let mut tokens = text.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let coords = tokens
                        .map(|t| t.parse::<f64>())
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map_err(|e| parse_error(line, e.to_string()))?;
                    let [x, y, z] = coords[..] else {
                        return Err(parse_error(line, format!("expected 3 coordinates, got {}", coords.len())));
                    };
                    document.vertices.push(Point3D::new(x, y, z));
                }
                Some("f") => {
                    let indices = tokens
                        .map(|t| face_index(t, line))
                        .collect::<Result<Vec<_>>>()?;
                    if indices.len() < 2 {
                        return Err(parse_error(line, "face needs at least two vertices"));
                    }
                    document.faces.push(Face(indices));
                }
                Some(other) => return Err(parse_error(line, format!("unsupported statement '{other}'"))),
                None => {}
            }
        }

        if let Some(bad) = document
            .faces
            .iter()
            .flat_map(|f| f.indices())
            .find(|&&i| i >= document.vertices.len())
        {
            return Err(parse_error(0, format!("face index {} out of range", bad + 1)));
        }

        Ok(document)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }
}

/// 1-based `v`, `v/vt` or `v/vt/vn` token to a 0-based vertex index
fn face_index(token: &str, line: usize) -> Result<usize> {
    let vertex = token.split('/').next().unwrap_or(token);
    match vertex.parse::<usize>() {
        Ok(index) if index >= 1 => Ok(index - 1),
        _ => Err(parse_error(line, format!("invalid face index '{token}'"))),
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ExtrudeError {
    ExtrudeError::Parse {
        line,
        message: message.into(),
    }
}
