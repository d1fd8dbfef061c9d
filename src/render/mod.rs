//! The per-frame pipeline: vertex stage, primitive assembly, rasterization
//! and shading into owned color/depth buffers.

pub mod assembly;
pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;
pub mod shader;
pub mod vertex;

pub use framebuffer::FrameBuffer;
pub use rasterizer::EdgeFunctionRasterizer;
pub use renderer::Renderer;
pub use shader::{DepthShader, Fragment, LightingMode, PhongShader, PixelShader};
