//! A CPU software rasterizer.
//!
//! Triangle meshes are transformed through a free-look perspective camera,
//! rejected against the view frustum, rasterized with edge functions and
//! perspective-correct interpolation, depth tested and shaded with textured
//! Phong lighting under a single directional light. All rendering is done on
//! the CPU into owned buffers; SDL2 (behind the `window` feature) is only
//! used to show them.
//!
//! # Quick Start
//!
//! ```ignore
//! use softlight::prelude::*;
//!
//! let mut engine = Engine::new(640, 480, RenderConfig::default());
//! engine.add_mesh(Mesh::from_obj("resources/vehicle.obj", true)?);
//! engine.render();
//! let pixels: &[u32] = engine.frame_buffer();
//! ```

// Public API - exposed to library consumers
pub mod camera;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod light;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod texture;
pub mod transform;
#[cfg(feature = "window")]
pub mod window;

// Internal modules - used within the crate only
pub(crate) mod render;

// Re-export commonly needed types at crate root for convenience
pub use engine::Engine;
pub use error::{ConfigError, LoadError};
pub use mesh::{Mesh, MeshTextures, Topology, Vertex};
pub use render::LightingMode;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use softlight::prelude::*;
/// ```
pub mod prelude {
    // Camera
    pub use crate::camera::Camera;

    // Config
    pub use crate::config::{CameraConfig, LightingConfig, RenderConfig};

    // Engine
    pub use crate::engine::Engine;
    pub use crate::render::LightingMode;

    // Scene
    pub use crate::color::ColorRgb;
    pub use crate::error::{ConfigError, LoadError};
    pub use crate::light::DirectionalLight;
    pub use crate::mesh::{Mesh, MeshTextures, Topology, Vertex};
    pub use crate::projection::Projection;
    pub use crate::texture::Texture;
    pub use crate::transform::Transform;

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Window & Input
    #[cfg(feature = "window")]
    pub use crate::window::{
        FpsCounter, FrameInput, FrameLimiter, Window, WindowEvent, WINDOW_HEIGHT, WINDOW_WIDTH,
    };
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::mesh::VertexOut;
    pub use crate::render::{
        assembly, vertex, EdgeFunctionRasterizer, FrameBuffer, Fragment, PhongShader, PixelShader,
        Renderer,
    };
}
