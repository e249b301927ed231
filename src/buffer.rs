use ilattice::glam::{Vec2, Vec3};
use log::warn;

use crate::{AxisGroup, Error, Palette, Quad, Result};

/// The most vertices a single mesh may hold. Renderers with 16-bit index buffers cannot address more.
pub const MAX_VERTICES: usize = 65_000;

/// Spread of a quad's UVs around its tile center. Small enough that every corner samples the same atlas texel, so a
/// quad of any size shows one flat color.
pub const UV_EPSILON: f32 = 0.000_000_1;

/// How quads are turned into vertex data.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshConfig {
    /// Edge length of one voxel in mesh units.
    pub voxel_size: f32,
    /// Finalizing a mesh with more vertices than this fails with [`Error::MeshTooLarge`].
    pub vertex_limit: usize,
    /// Maps materials to atlas tiles for UVs.
    pub palette: Palette,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            voxel_size: 1.0,
            vertex_limit: MAX_VERTICES,
            palette: Palette::default(),
        }
    }
}

/// Vertex buffers for the faces of one [`AxisGroup`], ready for upload.
///
/// Every quad contributes 4 consecutive vertices sharing one normal, and the 6 indices `[i, i+1, i+2, i, i+2, i+3]`
/// where `i = 4 * quad_index`.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub group: AxisGroup,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub quad_count: usize,
}

impl MeshData {
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quad_count == 0
    }
}

/// Append-only vertex buffers filled one quad at a time.
pub struct MeshAccumulator<'a> {
    group: AxisGroup,
    config: &'a MeshConfig,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    quad_count: u32,
}

impl<'a> MeshAccumulator<'a> {
    pub fn new(group: AxisGroup, config: &'a MeshConfig) -> Self {
        Self {
            group,
            config,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            quad_count: 0,
        }
    }

    pub fn push_quad(&mut self, quad: &Quad) {
        let positions = quad.face.quad_mesh_positions(quad, self.config.voxel_size);
        let [v0, v1, _, v3] = positions.map(Vec3::from);
        let normal = (v1 - v0).cross(v3 - v0).normalize().to_array();

        let uv = self.config.palette.tile_center_uv(quad.material);
        let uvs = [
            uv,
            uv + Vec2::new(0.0, UV_EPSILON),
            uv + Vec2::new(UV_EPSILON, UV_EPSILON),
            uv + Vec2::new(UV_EPSILON, 0.0),
        ];

        let start = self.quad_count * 4;
        self.positions.extend_from_slice(&positions);
        self.normals.extend_from_slice(&[normal; 4]);
        self.uvs.extend(uvs.map(|uv| uv.to_array()));
        self.indices
            .extend_from_slice(&[start, start + 1, start + 2, start, start + 2, start + 3]);
        self.quad_count += 1;
    }

    #[inline]
    pub fn num_quads(&self) -> usize {
        self.quad_count as usize
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
        self.indices.clear();
        self.quad_count = 0;
    }

    /// Hands over the buffers, or drops them all if they exceed the vertex limit.
    pub fn finish(self) -> Result<MeshData> {
        let vertices = self.positions.len();
        let limit = self.config.vertex_limit;
        if vertices > limit {
            warn!(
                "{}: {vertices} vertices are too many for one mesh (max {limit})",
                self.group
            );
            return Err(Error::MeshTooLarge { vertices, limit });
        }

        Ok(MeshData {
            group: self.group,
            positions: self.positions,
            normals: self.normals,
            uvs: self.uvs,
            indices: self.indices,
            quad_count: self.quad_count as usize,
        })
    }
}
