//! World transform of a mesh.
//!
//! Provides a [`Transform`] struct with a fluent API for managing position,
//! rotation (Euler angles), and scale, composed as `T · R · S`.

use crate::math::{mat4::Mat4, vec3::Vec3};

/// A 3D transform with position, rotation (Euler angles), and scale.
///
/// Mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// mesh.transform_mut()
///     .set_position(Vec3::new(0.0, 0.0, 50.0))
///     .set_yaw(std::f32::consts::FRAC_PI_2)
///     .set_scale_uniform(2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    position: Vec3,
    /// Euler angles in radians: x = pitch, y = yaw, z = roll.
    rotation: Vec3,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.rotation = rotation;
        self
    }

    /// Sets the rotation around the Y axis, keeping pitch and roll.
    pub fn set_yaw(&mut self, yaw: f32) -> &mut Self {
        self.rotation.y = yaw;
        self
    }

    /// Adds to the rotation around the Y axis, wrapped into [0, 2π).
    pub fn rotate_yaw(&mut self, delta: f32) -> &mut Self {
        self.rotation.y = (self.rotation.y + delta).rem_euclid(std::f32::consts::TAU);
        self
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.scale = Vec3::new(s, s, s);
        self
    }

    /// Generate the world matrix.
    ///
    /// Order: Translation * RotationY * RotationX * RotationZ * Scale
    /// (scale applied first, then roll, pitch, yaw, then translation).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.position)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::scaling(self.scale)
    }
}
