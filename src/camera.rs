//! Free-look perspective camera.
//!
//! # Coordinate System
//!
//! Uses a **left-handed** coordinate system:
//! - X: positive right
//! - Y: positive up
//! - Z: positive forward (into screen)
//!
//! # Orientation
//!
//! Orientation is accumulated as yaw/pitch angles. The orthonormal basis is
//! rebuilt from them on every change:
//!
//! ```text
//! forward = RotY(yaw) * RotX(pitch) * +Z
//! right   = normalize(world_up × forward)
//! up      = normalize(forward × right)
//! ```
//!
//! - **Yaw**: positive = look right
//! - **Pitch**: positive = look down, clamped short of ±90° so `forward`
//!   never becomes parallel to world up

use std::f32::consts::FRAC_PI_2;

use crate::config::CameraConfig;
use crate::math::mat4::Mat4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::projection::Projection;

/// Margin (radians) kept between |pitch| and 90°.
const PITCH_MARGIN: f32 = 1e-3;

/// Largest allowed |pitch|, in radians.
pub const MAX_PITCH: f32 = FRAC_PI_2 - PITCH_MARGIN;

/// Perspective camera driven by movement and look deltas.
///
/// The inverse-view and projection matrices are cached and only rebuilt when
/// the state they depend on changes.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    total_pitch: f32,
    total_yaw: f32,

    projection: Projection,
    inverse_view_matrix: Mat4,
    projection_matrix: Mat4,

    movement_speed: f32,
    look_sensitivity: f32,
    reference_fov: f32,
}

impl Camera {
    /// Creates a camera at `config.origin` looking along +Z.
    pub fn new(config: &CameraConfig, aspect_ratio: f32) -> Self {
        let projection = Projection::from_degrees(
            config.fov_degrees,
            aspect_ratio,
            config.z_near,
            config.z_far,
        );
        let mut camera = Self {
            origin: config.origin,
            forward: Vec3::FORWARD,
            right: Vec3::RIGHT,
            up: Vec3::UP,
            total_pitch: 0.0,
            total_yaw: 0.0,
            projection,
            inverse_view_matrix: Mat4::IDENTITY,
            projection_matrix: projection.matrix(),
            movement_speed: config.movement_speed,
            look_sensitivity: config.look_sensitivity_degrees.to_radians(),
            reference_fov: config.reference_fov_degrees.to_radians(),
        };
        camera.update_inverse_view_matrix();
        camera
    }

    /// Applies one frame of input.
    ///
    /// * `movement` - camera-local direction (x = right, y = up, z = forward),
    ///   scaled by the movement speed and `delta_time`
    /// * `look` - yaw (x) and pitch (y) delta in input units, scaled by the
    ///   look sensitivity and by `min(fov / reference_fov, 1)` so narrow
    ///   fields of view turn more slowly
    pub fn update(&mut self, movement: Vec3, look: Vec2, delta_time: f32) {
        let mut changed = false;

        if look != Vec2::ZERO {
            let fov_scalar = (self.projection.fov_y() / self.reference_fov).min(1.0);
            let scale = self.look_sensitivity * fov_scalar;
            self.total_yaw = (self.total_yaw + look.x * scale).rem_euclid(std::f32::consts::TAU);
            self.total_pitch = (self.total_pitch + look.y * scale).clamp(-MAX_PITCH, MAX_PITCH);
            self.update_basis();
            changed = true;
        }

        if movement != Vec3::ZERO {
            let step = self.movement_speed * delta_time;
            self.origin += (self.right * movement.x + self.up * movement.y + self.forward * movement.z)
                * step;
            changed = true;
        }

        if changed {
            self.update_inverse_view_matrix();
        }
    }

    /// World-to-camera matrix (inverse of [`camera_matrix`](Self::camera_matrix)).
    pub fn inverse_view_matrix(&self) -> &Mat4 {
        &self.inverse_view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// `projection * inverse_view`: world space straight to clip space.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.inverse_view_matrix
    }

    /// Camera-to-world matrix: columns right, up, forward, origin.
    pub fn camera_matrix(&self) -> Mat4 {
        Mat4::from_axes(self.right, self.up, self.forward, self.origin)
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Accumulated pitch in radians, always within ±[`MAX_PITCH`].
    pub fn pitch(&self) -> f32 {
        self.total_pitch
    }

    /// Accumulated yaw in radians, wrapped into [0, 2π).
    pub fn yaw(&self) -> f32 {
        self.total_yaw
    }

    pub fn fov(&self) -> f32 {
        self.projection.fov_y()
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
        self.update_inverse_view_matrix();
    }

    /// Sets the vertical FOV in radians, clamped into (0°, 180°).
    pub fn set_fov(&mut self, fov: f32) {
        self.projection.set_fov_y(fov);
        self.projection_matrix = self.projection.matrix();
    }

    pub fn increment_fov(&mut self, delta: f32) {
        self.set_fov(self.projection.fov_y() + delta);
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.projection.set_aspect_ratio(aspect_ratio);
        self.projection_matrix = self.projection.matrix();
    }

    fn update_basis(&mut self) {
        self.forward = (Mat4::rotation_y(self.total_yaw) * Mat4::rotation_x(self.total_pitch))
            .transform_vector(Vec3::FORWARD);
        self.right = Vec3::UP.cross(self.forward).normalize();
        self.up = self.forward.cross(self.right).normalize();
    }

    fn update_inverse_view_matrix(&mut self) {
        self.inverse_view_matrix = self.camera_matrix().inverse();
    }
}
