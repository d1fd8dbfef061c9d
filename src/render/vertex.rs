//! Vertex stage: mesh-local vertices to world-space shading attributes and
//! NDC positions.

use crate::camera::Camera;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::mesh::{Mesh, Vertex, VertexOut};

/// Transforms a single vertex.
///
/// Normals and tangents go through the world matrix with translation
/// ignored and are renormalized. The position goes through
/// `world_view_projection` and is divided by w, keeping w for
/// perspective-correct interpolation.
#[inline]
pub fn transform_vertex(
    vertex: &Vertex,
    world: &Mat4,
    world_view_projection: &Mat4,
    camera_origin: Vec3,
) -> VertexOut {
    let world_position = world.transform_point(vertex.position);
    let clip = *world_view_projection * Vec4::point(vertex.position);

    VertexOut {
        position: clip.perspective_divide(),
        color: vertex.color,
        uv: vertex.uv,
        normal: world.transform_vector(vertex.normal).normalize(),
        tangent: world.transform_vector(vertex.tangent).normalize(),
        view_direction: (world_position - camera_origin).normalize(),
    }
}

/// Runs the vertex stage for every vertex of `mesh`, overwriting its
/// output buffer.
pub fn transform_mesh(mesh: &mut Mesh, camera: &Camera) {
    let world = mesh.world_matrix();
    let world_view_projection = camera.view_projection_matrix() * world;
    let origin = camera.origin();

    let (vertices, vertices_out) = mesh.stage_buffers();
    for (vertex, out) in vertices.iter().zip(vertices_out.iter_mut()) {
        *out = transform_vertex(vertex, &world, &world_view_projection, origin);
    }
}
