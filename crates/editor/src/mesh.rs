//! Imported-mesh decoding
//!
//! The store keeps mesh sources as opaque text; only the export builder
//! decodes them, through a [`MeshCodec`].

use std::fmt::Write as _;

use crate::error::MeshError;

/// CPU-side triangle mesh: 3 floats per vertex, 3 indices per triangle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Min/max corners, `None` for an empty mesh
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut chunks = self.vertices.chunks_exact(3);
        let first = chunks.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for v in chunks {
            for i in 0..3 {
                min[i] = min[i].min(v[i]);
                max[i] = max[i].max(v[i]);
            }
        }
        Some((min, max))
    }
}

/// Converts between mesh source text and in-memory meshes
pub trait MeshCodec {
    fn decode(&self, source: &str) -> Result<MeshData, MeshError>;

    fn encode(&self, mesh: &MeshData) -> String;
}

/// Wavefront OBJ, geometry only. Decoding goes through `tobj`; material
/// libraries are never resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjCodec;

impl ObjCodec {
    fn load_options() -> tobj::LoadOptions {
        tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        }
    }
}

impl MeshCodec for ObjCodec {
    fn decode(&self, source: &str) -> Result<MeshData, MeshError> {
        let (models, _materials) = tobj::load_obj_buf(
            &mut source.as_bytes(),
            &Self::load_options(),
            |_| Err(tobj::LoadError::OpenFileFailed),
        )
        .map_err(|e| MeshError::Obj(e.to_string()))?;

        // objects and groups come back as separate models with local indices
        let mut mesh = MeshData::default();
        for model in models {
            let base = mesh.vertex_count() as u32;
            mesh.vertices.extend_from_slice(&model.mesh.positions);
            mesh.indices.extend(model.mesh.indices.iter().map(|i| base + i));
        }

        if mesh.indices.is_empty() {
            return Err(MeshError::Empty);
        }
        Ok(mesh)
    }

    fn encode(&self, mesh: &MeshData) -> String {
        let mut out = String::new();
        for v in mesh.vertices.chunks_exact(3) {
            let _ = writeln!(out, "v {} {} {}", v[0], v[1], v[2]);
        }
        for t in mesh.indices.chunks_exact(3) {
            let _ = writeln!(out, "f {} {} {}", t[0] + 1, t[1] + 1, t[2] + 1);
        }
        out
    }
}
