use std::ops::Range;

use draft_common::{Point2D, Point3D, Polyline};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ExtrudeError, Result};

/// Polygon as 0-based indices into `Mesh::vertices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face(pub Vec<usize>);

impl Face {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The slice of a mesh produced by one polyline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshGroup {
    /// Index of the source polyline in the extruder input
    pub source: usize,
    pub vertices: Range<usize>,
    pub faces: Range<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point3D>,
    pub faces: Vec<Face>,
    pub groups: Vec<MeshGroup>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_vertices(&self, group: &MeshGroup) -> &[Point3D] {
        &self.vertices[group.vertices.clone()]
    }

    pub fn group_faces(&self, group: &MeshGroup) -> &[Face] {
        &self.faces[group.faces.clone()]
    }
}

/// Straight extrusion of 2D polylines along +z.
///
/// Each polyline becomes a prism: a bottom ring at z = 0, a top ring at
/// z = depth, one quad per ring edge (the last edge wraps to the first
/// vertex), a bottom cap in path order and a top cap in reverse order.
/// Every input point becomes a vertex, including an explicit closing
/// point; two-point paths get two-index caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshExtruder {
    depth: f64,
}

impl MeshExtruder {
    pub fn new(depth: f64) -> Result<Self> {
        if !(depth.is_finite() && depth > 0.0) {
            return Err(ExtrudeError::InvalidDepth(depth));
        }
        Ok(Self { depth })
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn extrude(&self, polylines: &[Polyline]) -> Mesh {
        let mut mesh = Mesh::default();
        for (source, polyline) in polylines.iter().enumerate() {
            if !polyline.is_extrudable() {
                trace!(source, points = polyline.points.len(), "skipping degenerate polyline");
                continue;
            }
            self.extrude_ring(&mut mesh, source, &polyline.points);
        }
        debug!(
            groups = mesh.groups.len(),
            vertices = mesh.vertices.len(),
            faces = mesh.faces.len(),
            "extruded mesh"
        );
        mesh
    }

    fn extrude_ring(&self, mesh: &mut Mesh, source: usize, ring: &[Point2D]) {
        let n = ring.len();
        let base = mesh.vertices.len();
        let first_face = mesh.faces.len();
        let bottom = |i: usize| base + i;
        let top = |i: usize| base + n + i;

        mesh.vertices.extend(ring.iter().map(|&p| Point3D::from_planar(p, 0.0)));
        mesh.vertices.extend(ring.iter().map(|&p| Point3D::from_planar(p, self.depth)));

        for i in 0..n {
            let next = (i + 1) % n;
            mesh.faces.push(Face(vec![bottom(i), bottom(next), top(next), top(i)]));
        }

        mesh.faces.push(Face((0..n).map(bottom).collect()));
        mesh.faces.push(Face((0..n).rev().map(top).collect()));

        mesh.groups.push(MeshGroup {
            source,
            vertices: base..mesh.vertices.len(),
            faces: first_face..mesh.faces.len(),
        });
    }
}

/// Extrude `polylines` to `depth`, validating the depth first
pub fn extrude(polylines: &[Polyline], depth: f64) -> Result<Mesh> {
    Ok(MeshExtruder::new(depth)?.extrude(polylines))
}
