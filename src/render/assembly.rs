//! Primitive assembly: index buffer to triangles, with whole-triangle
//! frustum rejection.
//!
//! There is no clipping. A triangle survives only if all three of its
//! vertices lie inside the NDC volume `x, y ∈ [-1, 1]`, `z ∈ [0, 1]`;
//! triangles crossing a frustum plane are dropped entirely.

use crate::math::vec4::Vec4;
use crate::mesh::{Topology, VertexOut};

/// Yields the vertex-index triples of `indices` under `topology`.
///
/// For strips, every odd triangle swaps its second and third vertex so all
/// triangles keep the winding of the first. Fewer than three indices yield
/// nothing.
pub fn triangle_indices(indices: &[u32], topology: Topology) -> impl Iterator<Item = [u32; 3]> + '_ {
    let (step, count) = match topology {
        Topology::TriangleList => (3, indices.len() / 3),
        Topology::TriangleStrip => (1, indices.len().saturating_sub(2)),
    };

    (0..count).map(move |i| {
        let start = i * step;
        let [a, b, c] = [indices[start], indices[start + 1], indices[start + 2]];
        if topology == Topology::TriangleStrip && i % 2 == 1 {
            [a, c, b]
        } else {
            [a, b, c]
        }
    })
}

/// Whether an NDC position lies inside the view volume (bounds inclusive).
///
/// NaN coordinates are outside.
#[inline]
pub fn is_in_frustum(position: &Vec4) -> bool {
    (-1.0..=1.0).contains(&position.x)
        && (-1.0..=1.0).contains(&position.y)
        && (0.0..=1.0).contains(&position.z)
}

/// Assembles the triangles of one mesh from its vertex-stage output.
///
/// Triples referencing a vertex past the end of `vertices` are skipped, as
/// are triangles with any vertex outside the frustum.
pub fn assemble<'a>(
    vertices: &'a [VertexOut],
    indices: &'a [u32],
    topology: Topology,
) -> impl Iterator<Item = [&'a VertexOut; 3]> + 'a {
    triangle_indices(indices, topology).filter_map(move |[a, b, c]| {
        let triangle = [
            vertices.get(a as usize)?,
            vertices.get(b as usize)?,
            vertices.get(c as usize)?,
        ];
        triangle
            .iter()
            .all(|v| is_in_frustum(&v.position))
            .then_some(triangle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32, z: f32) -> VertexOut {
        VertexOut {
            position: Vec4::new(x, y, z, 1.0),
            ..VertexOut::default()
        }
    }

    #[test]
    fn list_groups_by_three_and_drops_remainder() {
        let tris: Vec<_> = triangle_indices(&[0, 1, 2, 3, 4, 5, 6], Topology::TriangleList).collect();
        assert_eq!(tris, vec![[0, 1, 2], [3, 4, 5]]);
    }

    #[test]
    fn strip_alternates_winding() {
        let tris: Vec<_> = triangle_indices(&[0, 1, 2, 3, 4], Topology::TriangleStrip).collect();
        assert_eq!(tris, vec![[0, 1, 2], [1, 3, 2], [2, 3, 4]]);
    }

    #[test]
    fn short_index_buffers_yield_nothing() {
        assert_eq!(triangle_indices(&[0, 1], Topology::TriangleStrip).count(), 0);
        assert_eq!(triangle_indices(&[], Topology::TriangleList).count(), 0);
    }

    #[test]
    fn frustum_bounds_are_inclusive() {
        assert!(is_in_frustum(&Vec4::new(1.0, -1.0, 0.0, 1.0)));
        assert!(is_in_frustum(&Vec4::new(0.0, 0.0, 1.0, 1.0)));
        assert!(!is_in_frustum(&Vec4::new(1.0001, 0.0, 0.5, 1.0)));
        assert!(!is_in_frustum(&Vec4::new(0.0, 0.0, -0.01, 1.0)));
        assert!(!is_in_frustum(&Vec4::new(f32::NAN, 0.0, 0.5, 1.0)));
    }

    #[test]
    fn triangle_partly_outside_is_rejected_whole() {
        let vertices = [at(0.0, 0.0, 0.5), at(0.5, 0.0, 0.5), at(0.0, 1.5, 0.5), at(0.0, 0.5, 0.5)];
        let kept: Vec<_> = assemble(&vertices, &[0, 1, 2, 0, 1, 3], Topology::TriangleList).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0][2].position.y, 0.5);
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let vertices = [at(0.0, 0.0, 0.5), at(0.5, 0.0, 0.5), at(0.0, 0.5, 0.5)];
        let kept = assemble(&vertices, &[0, 1, 9, 0, 1, 2], Topology::TriangleList).count();
        assert_eq!(kept, 1);
    }
}
