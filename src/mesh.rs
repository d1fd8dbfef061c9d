//! Triangle meshes: vertex/index buffers, topology, world transform and
//! the per-vertex output buffer the vertex stage fills every frame.

use std::path::Path;

use crate::color::ColorRgb;
use crate::error::LoadError;
use crate::math::mat4::Mat4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::texture::Texture;
use crate::transform::Transform;

/// A mesh-local vertex as supplied by a loader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub color: ColorRgb,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: ColorRgb::WHITE,
            uv: Vec2::ZERO,
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
        }
    }
}

/// A vertex after the vertex stage.
///
/// `position.xyz` is in NDC (after the perspective divide) and `position.w`
/// keeps the clip-space w (view depth) for perspective-correct
/// interpolation. Shading attributes are in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexOut {
    pub position: Vec4,
    pub color: ColorRgb,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
    /// Normalized direction from the camera to the vertex.
    pub view_direction: Vec3,
}

/// How the index buffer is walked into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// Every 3 indices form one triangle.
    #[default]
    TriangleList,
    /// Every index after the second forms a triangle with the two before it.
    TriangleStrip,
}

/// The up-to-four texture maps a mesh samples during shading.
///
/// A missing color map falls back to the interpolated vertex color; a missing
/// normal map disables normal mapping for the mesh; missing specular/gloss
/// maps fall back to constants from the lighting config.
#[derive(Debug, Clone, Default)]
pub struct MeshTextures {
    pub color: Option<Texture>,
    pub normal: Option<Texture>,
    pub specular: Option<Texture>,
    pub gloss: Option<Texture>,
}

impl MeshTextures {
    /// Loads every map whose path is given. Fails on the first unreadable file.
    pub fn from_files(
        color: Option<&Path>,
        normal: Option<&Path>,
        specular: Option<&Path>,
        gloss: Option<&Path>,
    ) -> Result<Self, LoadError> {
        let load = |path: Option<&Path>| path.map(Texture::from_file).transpose();
        Ok(Self {
            color: load(color)?,
            normal: load(normal)?,
            specular: load(specular)?,
            gloss: load(gloss)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.normal.is_none() && self.specular.is_none() && self.gloss.is_none()
    }
}

/// A triangle mesh with its own world transform and textures.
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    topology: Topology,
    transform: Transform,
    textures: MeshTextures,
    /// Written by the vertex stage, read by the rasterizer. Sized to
    /// `vertices` once and reused every frame.
    pub(crate) vertices_out: Vec<VertexOut>,
}

impl Mesh {
    /// Creates a mesh from already-validated buffers. Indices that point past
    /// the vertex buffer are skipped at assembly time.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        topology: Topology,
    ) -> Self {
        let vertices_out = vec![VertexOut::default(); vertices.len()];
        Self {
            name: name.into(),
            vertices,
            indices,
            topology,
            transform: Transform::default(),
            textures: MeshTextures::default(),
            vertices_out,
        }
    }

    /// Loads every object in an OBJ file into a single triangle-list mesh.
    ///
    /// UV V is flipped to the top-left texture origin. With
    /// `flip_axis_and_winding`, Z is negated and triangle winding reversed to
    /// convert right-handed assets to this left-handed space. Models without
    /// normals get them generated from face normals of the converted
    /// geometry. Tangents are always generated from UVs.
    pub fn from_obj<P: AsRef<Path>>(path: P, flip_axis_and_winding: bool) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, materials) = tobj::load_obj(path, &options).map_err(|source| LoadError::Obj {
            path: path.to_path_buf(),
            source,
        })?;
        if let Err(err) = materials {
            log::warn!("ignoring materials of {}: {err}", path.display());
        }

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let base = vertices.len();
            let z_sign = if flip_axis_and_winding { -1.0 } else { 1.0 };

            for i in 0..mesh.positions.len() / 3 {
                let vec3_at = |data: &[f32]| Vec3::new(data[3 * i], data[3 * i + 1], data[3 * i + 2]);
                let flip_z = |v: Vec3| Vec3::new(v.x, v.y, v.z * z_sign);
                vertices.push(Vertex {
                    position: flip_z(vec3_at(&mesh.positions)),
                    color: if mesh.vertex_color.is_empty() {
                        ColorRgb::WHITE
                    } else {
                        let c = vec3_at(&mesh.vertex_color);
                        ColorRgb::new(c.x, c.y, c.z)
                    },
                    uv: if mesh.texcoords.is_empty() {
                        Vec2::ZERO
                    } else {
                        Vec2::new(mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1])
                    },
                    normal: if mesh.normals.is_empty() {
                        Vec3::ZERO
                    } else {
                        flip_z(vec3_at(&mesh.normals)).normalize()
                    },
                    tangent: Vec3::ZERO,
                });
            }

            let local: Vec<u32> = mesh
                .indices
                .chunks_exact(3)
                .flat_map(|t| {
                    if flip_axis_and_winding {
                        [t[0], t[2], t[1]]
                    } else {
                        [t[0], t[1], t[2]]
                    }
                })
                .collect();

            // Normals come from the final geometry, one model at a time, so
            // authored normals of other models are left alone.
            if mesh.normals.is_empty() {
                generate_normals(&mut vertices[base..], &local);
            }
            indices.extend(local.iter().map(|&i| i + base as u32));
        }

        if indices.is_empty() {
            return Err(LoadError::EmptyObj(path.to_path_buf()));
        }
        generate_tangents(&mut vertices, &indices);

        let name = path
            .file_stem()
            .map_or_else(String::new, |stem| stem.to_string_lossy().into_owned());
        log::info!(
            "loaded mesh {name} from {} ({} vertices, {} triangles)",
            path.display(),
            vertices.len(),
            indices.len() / 3
        );
        Ok(Self::new(name, vertices, indices, Topology::TriangleList))
    }

    pub fn with_textures(mut self, textures: MeshTextures) -> Self {
        self.set_textures(textures);
        self
    }

    pub fn set_textures(&mut self, textures: MeshTextures) {
        if textures.is_empty() {
            log::warn!("mesh {} has no textures; shading uses vertex colors", self.name);
        }
        self.textures = textures;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn textures(&self) -> &MeshTextures {
        &self.textures
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// Output of the most recent vertex stage, parallel to [`vertices`](Self::vertices).
    pub fn vertices_out(&self) -> &[VertexOut] {
        &self.vertices_out
    }

    /// Input vertices alongside the output buffer the vertex stage writes.
    pub(crate) fn stage_buffers(&mut self) -> (&[Vertex], &mut [VertexOut]) {
        (&self.vertices, &mut self.vertices_out)
    }
}

/// Replaces every vertex normal with the normalized sum of the (area
/// weighted) face normals of the triangles that use it.
pub fn generate_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for vertex in vertices.iter_mut() {
        vertex.normal = Vec3::ZERO;
    }
    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let edge0 = vertices[i1].position - vertices[i0].position;
        let edge1 = vertices[i2].position - vertices[i0].position;
        let face_normal = edge0.cross(edge1);
        for i in [i0, i1, i2] {
            vertices[i].normal += face_normal;
        }
    }
    for vertex in vertices.iter_mut() {
        vertex.normal = normalize_or(vertex.normal, Vec3::UP);
    }
}

/// Generates per-vertex tangents for a triangle list from UV gradients.
///
/// Per-triangle tangents are accumulated on their vertices, then made
/// orthogonal to the vertex normal and normalized. Vertices whose UVs give
/// no usable gradient get an arbitrary tangent perpendicular to the normal.
pub fn generate_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    for vertex in vertices.iter_mut() {
        vertex.tangent = Vec3::ZERO;
    }
    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let (v0, v1, v2) = (&vertices[i0], &vertices[i1], &vertices[i2]);

        let uv_dx = Vec2::new(v1.uv.x - v0.uv.x, v2.uv.x - v0.uv.x);
        let uv_dy = Vec2::new(v1.uv.y - v0.uv.y, v2.uv.y - v0.uv.y);
        let cross = uv_dx.cross(uv_dy);
        let inv_cross = if cross != 0.0 { 1.0 / cross } else { 0.0 };

        let edge0 = v1.position - v0.position;
        let edge1 = v2.position - v0.position;
        let tangent = (edge0 * uv_dy.y - edge1 * uv_dy.x) * inv_cross;

        for i in [i0, i1, i2] {
            vertices[i].tangent += tangent;
        }
    }
    for vertex in vertices.iter_mut() {
        let fallback = perpendicular(vertex.normal);
        vertex.tangent = normalize_or(vertex.tangent.reject(vertex.normal), fallback);
    }
}

fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let magnitude = v.magnitude();
    if magnitude > f32::EPSILON {
        v / magnitude
    } else {
        fallback
    }
}

/// Some unit vector perpendicular to `normal`.
fn perpendicular(normal: Vec3) -> Vec3 {
    let helper = if normal.x.abs() < 0.9 { Vec3::RIGHT } else { Vec3::UP };
    normalize_or(helper.reject(normal), Vec3::RIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> (Vec<Vertex>, Vec<u32>) {
        let corners = [
            (Vec3::new(-1.0, 1.0, 0.0), Vec2::new(0.0, 0.0)),
            (Vec3::new(1.0, 1.0, 0.0), Vec2::new(1.0, 0.0)),
            (Vec3::new(1.0, -1.0, 0.0), Vec2::new(1.0, 1.0)),
            (Vec3::new(-1.0, -1.0, 0.0), Vec2::new(0.0, 1.0)),
        ];
        let vertices = corners
            .iter()
            .map(|&(position, uv)| Vertex {
                position,
                uv,
                normal: Vec3::new(0.0, 0.0, -1.0),
                ..Vertex::default()
            })
            .collect();
        (vertices, vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn output_buffer_matches_vertex_count() {
        let (vertices, indices) = quad();
        let mesh = Mesh::new("quad", vertices, indices, Topology::TriangleList);
        assert_eq!(mesh.vertices_out().len(), 4);
        assert_eq!(mesh.world_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn tangents_follow_u_direction() {
        let (mut vertices, indices) = quad();
        generate_tangents(&mut vertices, &indices);
        for vertex in &vertices {
            assert_relative_eq!(vertex.tangent.x, 1.0, epsilon = 1e-5);
            assert_relative_eq!(vertex.tangent.dot(vertex.normal), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn tangents_without_uvs_stay_perpendicular() {
        let (mut vertices, indices) = quad();
        for vertex in &mut vertices {
            vertex.uv = Vec2::ZERO;
        }
        generate_tangents(&mut vertices, &indices);
        for vertex in &vertices {
            assert_relative_eq!(vertex.tangent.magnitude(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(vertex.tangent.dot(vertex.normal), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn generated_normals_face_winding() {
        let (mut vertices, indices) = quad();
        generate_normals(&mut vertices, &indices);
        // clockwise seen from -Z in a left-handed space faces -Z
        for vertex in &vertices {
            assert_relative_eq!(vertex.normal.z, -1.0, epsilon = 1e-5);
        }
    }

    /// Writes `source` to a per-test temp file and loads it.
    fn load_obj_source(tag: &str, source: &str, flip_axis_and_winding: bool) -> Mesh {
        let path = std::env::temp_dir().join(format!("softlight-{tag}-{}.obj", std::process::id()));
        std::fs::write(&path, source).unwrap();
        let mesh = Mesh::from_obj(&path, flip_axis_and_winding);
        std::fs::remove_file(&path).ok();
        mesh.unwrap()
    }

    fn face_normal(mesh: &Mesh, triangle: usize) -> Vec3 {
        let [a, b, c] =
            [0, 1, 2].map(|k| mesh.vertices()[mesh.indices()[3 * triangle + k] as usize].position);
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn loads_obj_with_flipped_axis() {
        let mesh = load_obj_source(
            "flipped",
            "v 0 0 1\nv 1 0 1\nv 0 1 1\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\n",
            true,
        );

        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.indices(), &[0, 2, 1]);
        assert_eq!(mesh.topology(), Topology::TriangleList);
        let v = &mesh.vertices()[0];
        assert_eq!(v.position.z, -1.0);
        assert_eq!(v.normal.z, -1.0);
        // V is flipped to a top-left origin
        assert_eq!(v.uv, Vec2::new(0.0, 1.0));
        assert_relative_eq!(v.tangent.magnitude(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn generated_normals_follow_flipped_geometry() {
        let mesh = load_obj_source("no-normals", "v 0 0 1\nv 1 0 1\nv 0 1 1\nf 1 2 3\n", true);

        let face = face_normal(&mesh, 0);
        assert_relative_eq!(face.z, -1.0, epsilon = 1e-5);
        for vertex in mesh.vertices() {
            assert_relative_eq!(vertex.normal.dot(face), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn generated_normals_match_unflipped_geometry() {
        let mesh = load_obj_source("no-normals-rh", "v 0 0 1\nv 1 0 1\nv 0 1 1\nf 1 2 3\n", false);

        let face = face_normal(&mesh, 0);
        for vertex in mesh.vertices() {
            assert_relative_eq!(vertex.normal.dot(face), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn authored_normals_survive_normal_less_models() {
        // the authored normal is deliberately not the face normal
        let mesh = load_obj_source(
            "two-models",
            "o authored\nv 0 0 1\nv 1 0 1\nv 0 1 1\nvn 0 1 0\nf 1//1 2//1 3//1\n\
             o generated\nv 0 0 2\nv 1 0 2\nv 0 1 2\nf 4 5 6\n",
            false,
        );
        assert_eq!(mesh.vertices().len(), 6);
        assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);

        for vertex in &mesh.vertices()[..3] {
            assert_relative_eq!(vertex.normal.y, 1.0, epsilon = 1e-5);
        }
        let face = face_normal(&mesh, 1);
        for vertex in &mesh.vertices()[3..] {
            assert_relative_eq!(vertex.normal.dot(face), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn missing_obj_is_an_error() {
        let err = Mesh::from_obj("/nonexistent/softlight.obj", false).unwrap_err();
        assert!(matches!(err, LoadError::Obj { .. }));
    }
}
