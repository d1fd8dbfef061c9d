//! Perspective projection parameters.
//!
//! The [`Projection`] struct is the single source of truth for all perspective
//! projection parameters (FOV, aspect ratio, near/far planes) and generates the
//! left-handed projection matrix with a `[0, 1]` depth range.

use std::f32::consts::PI;

use crate::math::mat4::Mat4;

/// Smallest distance (radians) the FOV may come to 0° or 180°.
const FOV_MARGIN: f32 = 1e-4;

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians, always inside (0, π).
    fov_y: f32,
    /// Aspect ratio (width / height).
    aspect_ratio: f32,
    /// Near clipping plane distance.
    z_near: f32,
    /// Far clipping plane distance.
    z_far: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians, clamped into (0, π)
    /// * `aspect_ratio` - Width divided by height
    /// * `z_near` - Near clipping plane distance (must be > 0)
    /// * `z_far` - Far clipping plane distance (must be > z_near)
    pub fn new(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y: clamp_fov(fov_y),
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    /// Creates a projection from degrees instead of radians.
    pub fn from_degrees(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self::new(fov_y_degrees.to_radians(), aspect_ratio, z_near, z_far)
    }

    /// Returns the vertical field of view in radians.
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Sets the vertical field of view, clamped into (0, π).
    pub fn set_fov_y(&mut self, fov_y: f32) {
        self.fov_y = clamp_fov(fov_y);
    }

    /// Returns the aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Updates the aspect ratio (typically called on window resize).
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Generates the left-handed perspective projection matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_fov_lh(self.fov_y, self.aspect_ratio, self.z_near, self.z_far)
    }
}

fn clamp_fov(fov_y: f32) -> f32 {
    fov_y.clamp(FOV_MARGIN, PI - FOV_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn from_degrees_converts_correctly() {
        let proj = Projection::from_degrees(45.0, 1.0, 0.1, 100.0);
        assert_relative_eq!(proj.fov_y(), FRAC_PI_4, epsilon = 1e-6);
    }

    #[test]
    fn fov_is_clamped_open_interval() {
        let mut proj = Projection::new(0.0, 1.0, 0.1, 100.0);
        assert!(proj.fov_y() > 0.0);
        proj.set_fov_y(4.0);
        assert!(proj.fov_y() < PI);
        proj.set_fov_y(-1.0);
        assert!(proj.fov_y() > 0.0);
    }

    #[test]
    fn wider_aspect_shrinks_x_scale() {
        let square = Projection::new(FRAC_PI_4, 1.0, 0.1, 100.0).matrix();
        let wide = Projection::new(FRAC_PI_4, 2.0, 0.1, 100.0).matrix();
        assert_relative_eq!(wide.get(0, 0) * 2.0, square.get(0, 0), epsilon = 1e-6);
        assert_relative_eq!(wide.get(1, 1), square.get(1, 1));
    }
}
