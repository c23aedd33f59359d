//! Mesh representation for 3D models
//!
//! A `Mesh` is pure geometry data: vertices, triangle indices and an optional
//! cached bounding box. Bounds are only available after
//! [`Mesh::compute_bounding_box`] has run; asking for them earlier is a
//! [`GeometryError::NotReady`] rather than a silent assumption.

use super::bounds::BoundingBox;
use crate::foundation::math::{Mat4, Point3, Vec3};
use thiserror::Error;

/// Errors for geometry-dependent operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Geometry or its derived data has not been computed yet
    #[error("Geometry not ready: {0}")]
    NotReady(&'static str),
}

/// 3D vertex with position and normal
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Create a vertex with a zero normal, to be filled by `compute_vertex_normals`
    pub fn at(position: Vec3) -> Self {
        Self::new(position.into(), [0.0; 3])
    }

    /// Position as a vector
    pub fn pos(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Normal as a vector
    pub fn norm(&self) -> Vec3 {
        Vec3::from(self.normal)
    }
}

/// 3D mesh containing vertices and indices for rendering
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Index data for triangles
    pub indices: Vec<u32>,

    bounding_box: Option<BoundingBox>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            bounding_box: None,
        }
    }

    /// Create a mesh from an unindexed triangle list (every three vertices form a face)
    pub fn from_triangle_soup(vertices: Vec<Vertex>) -> Self {
        let indices = (0..vertices.len() as u32).collect();
        Self::new(vertices, indices)
    }

    /// Flat plane of `width` × `height` in the XY plane at `z = 0`, facing +Z
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let front = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex::new([-hw, hh, 0.0], front),
            Vertex::new([-hw, -hh, 0.0], front),
            Vertex::new([hw, -hh, 0.0], front),
            Vertex::new([hw, hh, 0.0], front),
        ];
        Self::new(vertices, vec![0, 1, 2, 2, 3, 0])
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as vertex triples
    pub fn triangles(&self) -> impl Iterator<Item = [&Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                &self.vertices[tri[0] as usize],
                &self.vertices[tri[1] as usize],
                &self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Recompute smooth vertex normals by accumulating face normals
    ///
    /// Vertices shared between faces get the normalized sum of the face
    /// normals around them; an unindexed soup therefore gets flat normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![Vec3::zeros(); self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let (pa, pb, pc) = (self.vertices[a].pos(), self.vertices[b].pos(), self.vertices[c].pos());
            let face = (pc - pb).cross(&(pa - pb));
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }

        for (vertex, normal) in self.vertices.iter_mut().zip(accum) {
            let normal = normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);
            vertex.normal = normal.into();
        }
    }

    /// Compute and cache the axis-aligned bounding box
    pub fn compute_bounding_box(&mut self) -> BoundingBox {
        let bounds = self.vertices.iter().fold(BoundingBox::empty(), |mut b, v| {
            b.expand_by_point(&v.pos());
            b
        });
        self.bounding_box = Some(bounds);
        bounds
    }

    /// Cached bounding box, if [`Mesh::compute_bounding_box`] has run
    pub fn bounding_box(&self) -> Result<BoundingBox, GeometryError> {
        self.bounding_box.ok_or(GeometryError::NotReady("bounding box not computed"))
    }

    /// Translate every vertex; a cached bounding box is kept in sync
    pub fn translate(&mut self, offset: Vec3) {
        for vertex in &mut self.vertices {
            vertex.position = (vertex.pos() + offset).into();
        }
        if let Some(bounds) = self.bounding_box.as_mut() {
            *bounds = bounds.translated(offset);
        }
    }

    /// Apply an affine transform to positions and normals
    pub fn apply_matrix(&mut self, matrix: &Mat4) {
        let normal_matrix = matrix
            .fixed_view::<3, 3>(0, 0)
            .into_owned()
            .try_inverse()
            .map(|m| m.transpose());

        for vertex in &mut self.vertices {
            let p = matrix.transform_point(&Point3::from(vertex.pos()));
            vertex.position = p.coords.into();
            if let Some(nm) = &normal_matrix {
                let n = (nm * vertex.norm()).try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);
                vertex.normal = n.into();
            }
        }
        if self.bounding_box.is_some() {
            self.compute_bounding_box();
        }
    }
}
