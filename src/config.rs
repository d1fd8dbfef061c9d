//! Render configuration.
//!
//! Every tunable constant of the pipeline lives here as a named field so that
//! callers (and tests) can vary it. All structs deserialize from RON with
//! per-field defaults, so a config file only needs the fields it overrides:
//!
//! ```text
//! (
//!     camera: (fov_degrees: 45.0),
//!     lighting: (shininess: 10.0),
//!     worker_threads: 0,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{self, ColorRgb};
use crate::error::ConfigError;
use crate::light::DirectionalLight;
use crate::math::vec3::Vec3;

/// Camera construction and input-response parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial world-space position.
    pub origin: Vec3,
    /// Initial vertical field of view.
    pub fov_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// World units per second for a unit movement delta.
    pub movement_speed: f32,
    /// Degrees of yaw/pitch per unit of look delta at the reference FOV.
    pub look_sensitivity_degrees: f32,
    /// Below this FOV, look sensitivity scales down proportionally.
    pub reference_fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 0.0, -10.0),
            fov_degrees: 60.0,
            z_near: 0.1,
            z_far: 100.0,
            movement_speed: 15.0,
            look_sensitivity_degrees: 0.25,
            reference_fov_degrees: 45.0,
        }
    }
}

/// Constants of the Phong lighting model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub light: DirectionalLight,
    /// Phong exponent multiplier; the gloss map scales it per pixel.
    pub shininess: f32,
    /// Added to the selected terms before the observed-area factor.
    pub ambient: ColorRgb,
    pub diffuse_reflectance: f32,
    /// Specular reflectance used when a mesh has no specular map.
    pub fallback_specular: f32,
    /// Gloss used when a mesh has no gloss map.
    pub fallback_gloss: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            light: DirectionalLight::default(),
            shininess: 25.0,
            ambient: ColorRgb::splat(0.025),
            diffuse_reflectance: 1.0,
            fallback_specular: 0.5,
            fallback_gloss: 1.0,
        }
    }
}

/// Top-level configuration handed to [`Engine::new`](crate::Engine::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    /// Packed `0xAARRGGBB` color written to every pixel on clear.
    pub clear_color: u32,
    /// Yaw speed (radians per second) applied to meshes while rotation is on.
    pub mesh_rotation_speed: f32,
    /// Worker threads for rasterization; 1 renders serially, 0 uses all cores.
    pub worker_threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            clear_color: color::BACKGROUND,
            mesh_rotation_speed: std::f32::consts::FRAC_PI_4,
            worker_threads: 1,
        }
    }
}

impl RenderConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_ron_str(&std::fs::read_to_string(path)?)?;
        log::info!("loaded render config from {}", path.display());
        Ok(config)
    }

    /// Number of worker threads to rasterize with, resolving 0 to the
    /// available parallelism.
    pub fn resolved_worker_threads(&self) -> usize {
        match self.worker_threads {
            0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = RenderConfig::from_ron_str("()").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = RenderConfig::from_ron_str(
            "(camera: (fov_degrees: 90.0), lighting: (shininess: 10.0), worker_threads: 4)",
        )
        .unwrap();
        assert_eq!(config.camera.fov_degrees, 90.0);
        assert_eq!(config.camera.z_far, 100.0);
        assert_eq!(config.lighting.shininess, 10.0);
        assert_eq!(config.lighting.ambient, ColorRgb::splat(0.025));
        assert_eq!(config.resolved_worker_threads(), 4);
    }

    #[test]
    fn nested_vector_fields_parse() {
        let config =
            RenderConfig::from_ron_str("(camera: (origin: (x: 1.0, y: 2.0, z: -3.0)))").unwrap();
        assert_eq!(config.camera.origin, Vec3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let err = RenderConfig::from_ron_str("(camera: 12)").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn auto_worker_count_is_positive() {
        let config = RenderConfig {
            worker_threads: 0,
            ..RenderConfig::default()
        };
        assert!(config.resolved_worker_threads() >= 1);
    }
}
