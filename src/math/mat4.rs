//! 4x4 transformation matrix using column-major convention.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - The four columns are the basis: x-axis, y-axis, z-axis, translation
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//!
//! # Example
//! ```ignore
//! let world = Mat4::translation(t) * Mat4::rotation_y(yaw) * Mat4::scaling(s);
//! let p = world.transform_point(vertex.position);
//! ```

use std::ops::Mul;

use super::vec3::Vec3;
use super::vec4::Vec4;

/// Determinants at or below this magnitude are treated as singular.
const SINGULAR_EPSILON: f32 = 1e-14;

/// 4x4 matrix stored as `data[row][col]` with column-major convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self::new([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const fn new(data: [[f32; 4]; 4]) -> Self {
        Mat4 { data }
    }

    /// Builds an affine matrix from its three axis columns and a translation column.
    pub fn from_axes(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3, translation: Vec3) -> Self {
        Mat4::new([
            [x_axis.x, y_axis.x, z_axis.x, translation.x],
            [x_axis.y, y_axis.y, z_axis.y, translation.y],
            [x_axis.z, y_axis.z, z_axis.z, translation.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a translation matrix.
    ///
    /// Translation is stored in the last column (column-major convention).
    pub fn translation(offset: Vec3) -> Self {
        Self::from_axes(Vec3::RIGHT, Vec3::UP, Vec3::FORWARD, offset)
    }

    /// Creates a scale matrix.
    pub fn scaling(scale: Vec3) -> Self {
        Mat4::new([
            [scale.x, 0.0, 0.0, 0.0],
            [0.0, scale.y, 0.0, 0.0],
            [0.0, 0.0, scale.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation around the X axis. Positive angles tip +Z toward -Y.
    pub fn rotation_x(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation around the Y axis. Positive angles turn +Z toward +X.
    pub fn rotation_y(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Mat4::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation around the Z axis.
    pub fn rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Mat4::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Left-handed perspective projection with a `[0, 1]` depth range.
    ///
    /// `z' = z * zf/(zf-zn) - zn*zf/(zf-zn)` and `w' = z`, so after the divide
    /// the near plane maps to 0 and the far plane to 1.
    pub fn perspective_fov_lh(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        let y_scale = 1.0 / (fov_y / 2.0).tan();
        let x_scale = y_scale / aspect_ratio;
        let depth_scale = z_far / (z_far - z_near);
        Mat4::new([
            [x_scale, 0.0, 0.0, 0.0],
            [0.0, y_scale, 0.0, 0.0],
            [0.0, 0.0, depth_scale, -z_near * depth_scale],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Column `index` as a Vec3 (0 = x-axis, 1 = y-axis, 2 = z-axis, 3 = translation).
    pub fn axis(&self, index: usize) -> Vec3 {
        Vec3::new(
            self.data[0][index],
            self.data[1][index],
            self.data[2][index],
        )
    }

    /// Inverse of an affine (3x4) transform, or `None` if it is singular.
    ///
    /// Closed form from cofactors: the rows of the inverse rotation/scale
    /// block are the pairwise cross products of the axis columns divided by
    /// the determinant. The bottom row is assumed to be `[0, 0, 0, 1]`; this
    /// is not a general 4x4 inverse and must not be used on projections.
    pub fn try_inverse(&self) -> Option<Mat4> {
        let a = self.axis(0);
        let b = self.axis(1);
        let c = self.axis(2);
        let t = self.axis(3);

        let bc = b.cross(c);
        let ca = c.cross(a);
        let ab = a.cross(b);
        let det = a.dot(bc);
        if det.abs() <= SINGULAR_EPSILON || !det.is_finite() {
            return None;
        }

        let inv_det = 1.0 / det;
        let r0 = bc * inv_det;
        let r1 = ca * inv_det;
        let r2 = ab * inv_det;

        Some(Mat4::new([
            [r0.x, r0.y, r0.z, -r0.dot(t)],
            [r1.x, r1.y, r1.z, -r1.dot(t)],
            [r2.x, r2.y, r2.z, -r2.dot(t)],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Inverse of an affine transform.
    ///
    /// # Panics
    /// Panics if the determinant is ~0. A singular camera or mesh transform
    /// is a programming error, not a recoverable condition.
    pub fn inverse(&self) -> Mat4 {
        match self.try_inverse() {
            Some(inverse) => inverse,
            None => panic!("matrix is singular (determinant ~0); no inverse exists"),
        }
    }

    /// Transforms a point (implicit w = 1), ignoring the projective row.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform_vector(p) + self.axis(3)
    }

    /// Transforms a direction (implicit w = 0); translation does not apply.
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.data;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }
}

/// Matrix multiplication: Mat4 * Mat4.
///
/// For column-major convention, `A * B * v` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 4];

        for (row, values) in result.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = self.data[row][0] * rhs.data[0][col]
                    + self.data[row][1] * rhs.data[1][col]
                    + self.data[row][2] * rhs.data[2][col]
                    + self.data[row][3] * rhs.data[3][col];
            }
        }

        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: usize| Vec4::new(self.data[r][0], self.data[r][1], self.data[r][2], self.data[r][3]);
        Vec4::new(row(0).dot(v), row(1).dot(v), row(2).dot(v), row(3).dot(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn assert_mat_eq(a: &Mat4, b: &Mat4) {
        for row in 0..4 {
            for col in 0..4 {
                assert_relative_eq!(a.get(row, col), b.get(row, col), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::rotation_y(0.3);
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::IDENTITY * m, m);
    }

    #[test]
    fn rotation_matches_vector_rotation() {
        let v = Vec3::new(0.3, -1.2, 2.0);
        let angle = 0.7;
        let by_matrix = Mat4::rotation_y(angle).transform_vector(v);
        let by_vector = v.rotate_y(angle);
        assert_relative_eq!(by_matrix.x, by_vector.x, epsilon = 1e-6);
        assert_relative_eq!(by_matrix.z, by_vector.z, epsilon = 1e-6);

        let by_matrix = Mat4::rotation_x(angle).transform_vector(v);
        let by_vector = v.rotate_x(angle);
        assert_relative_eq!(by_matrix.y, by_vector.y, epsilon = 1e-6);
        assert_relative_eq!(by_matrix.z, by_vector.z, epsilon = 1e-6);
    }

    #[test]
    fn positive_yaw_turns_forward_to_right() {
        let forward = Mat4::rotation_y(FRAC_PI_2).transform_vector(Vec3::FORWARD);
        assert_relative_eq!(forward.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn affine_inverse_round_trips() {
        let m = Mat4::translation(Vec3::new(4.0, -2.0, 7.5))
            * Mat4::rotation_y(0.4)
            * Mat4::rotation_x(-1.1)
            * Mat4::scaling(Vec3::new(2.0, 0.5, 3.0));
        assert_mat_eq(&(m * m.inverse()), &Mat4::IDENTITY);
        assert_mat_eq(&(m.inverse() * m), &Mat4::IDENTITY);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let flat = Mat4::scaling(Vec3::new(1.0, 0.0, 1.0));
        assert!(flat.try_inverse().is_none());
    }

    #[test]
    #[should_panic(expected = "singular")]
    fn inverse_of_singular_matrix_panics() {
        Mat4::scaling(Vec3::ZERO).inverse();
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let proj = Mat4::perspective_fov_lh(FRAC_PI_2, 1.0, 0.1, 100.0);
        let near = (proj * Vec4::new(0.0, 0.0, 0.1, 1.0)).perspective_divide();
        let far = (proj * Vec4::new(0.0, 0.0, 100.0, 1.0)).perspective_divide();
        assert_relative_eq!(near.z, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-5);
        assert_relative_eq!(far.w, 100.0);
    }

    #[test]
    fn transform_vector_ignores_translation() {
        let m = Mat4::translation(Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(m.transform_vector(Vec3::UP), Vec3::UP);
        assert_eq!(m.transform_point(Vec3::UP), Vec3::new(5.0, 6.0, 5.0));
    }
}
