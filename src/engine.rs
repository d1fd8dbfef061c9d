//! Core rendering engine.
//!
//! The [`Engine`] struct is the main entry point for the renderer. It owns the
//! camera, the meshes, the frame buffers and the display toggles, and runs
//! the per-frame pipeline: vertex stage, primitive assembly, rasterization
//! and shading.

use log::{debug, info};

use crate::camera::Camera;
use crate::config::{LightingConfig, RenderConfig};
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::mesh::Mesh;
use crate::render::{
    assembly, vertex, DepthShader, EdgeFunctionRasterizer, FrameBuffer, LightingMode, PhongShader,
    PixelShader, Renderer,
};

/// Display switches that change how pixels are shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShadingState {
    lighting_mode: LightingMode,
    bilinear: bool,
    normal_mapping: bool,
    depth_view: bool,
}

impl Default for ShadingState {
    fn default() -> Self {
        Self {
            lighting_mode: LightingMode::default(),
            bilinear: false,
            normal_mapping: true,
            depth_view: false,
        }
    }
}

/// Read-only state of one frame's raster pass, shared by every band.
struct FramePass<'a> {
    meshes: &'a [Mesh],
    lighting: &'a LightingConfig,
    rasterizer: EdgeFunctionRasterizer,
    state: ShadingState,
    z_near: f32,
    z_far: f32,
}

impl FramePass<'_> {
    /// Draws every mesh in submission order into `buffer`.
    fn draw(&self, buffer: &mut FrameBuffer) {
        let state = self.state;
        for mesh in self.meshes {
            if state.depth_view {
                self.draw_mesh(mesh, buffer, &DepthShader::new(self.z_near, self.z_far));
            } else {
                let shader = PhongShader::new(
                    mesh.textures(),
                    self.lighting,
                    state.lighting_mode,
                    state.normal_mapping,
                    state.bilinear,
                );
                self.draw_mesh(mesh, buffer, &shader);
            }
        }
    }

    fn draw_mesh<S: PixelShader>(&self, mesh: &Mesh, buffer: &mut FrameBuffer, shader: &S) {
        for triangle in assembly::assemble(mesh.vertices_out(), mesh.indices(), mesh.topology()) {
            self.rasterizer.fill_triangle(triangle, buffer, shader);
        }
    }
}

pub struct Engine {
    renderer: Renderer,
    rasterizer: EdgeFunctionRasterizer,
    camera: Camera,
    meshes: Vec<Mesh>,
    config: RenderConfig,
    worker_threads: usize,
    shading: ShadingState,
    rotate_meshes: bool,
}

impl Engine {
    pub fn new(width: u32, height: u32, config: RenderConfig) -> Self {
        let worker_threads = config.resolved_worker_threads();
        info!("engine {width}x{height}, {worker_threads} raster thread(s)");

        Self {
            renderer: Renderer::new(width, height, config.clear_color),
            rasterizer: EdgeFunctionRasterizer::new(),
            camera: Camera::new(&config.camera, aspect_ratio(width, height)),
            meshes: Vec::new(),
            config,
            worker_threads,
            shading: ShadingState::default(),
            rotate_meshes: true,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height, self.config.clear_color);
        self.camera.set_aspect_ratio(aspect_ratio(width, height));
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Adds a mesh to the scene and returns its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        info!(
            "added mesh {} ({} vertices, {} indices)",
            mesh.name(),
            mesh.vertices().len(),
            mesh.indices().len()
        );
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Advances the scene by `delta_time` seconds: moves the camera and, while
    /// rotation is enabled, yaws every mesh.
    pub fn update(&mut self, movement: Vec3, look: Vec2, delta_time: f32) {
        self.camera.update(movement, look, delta_time);
        if self.rotate_meshes {
            let step = self.config.mesh_rotation_speed * delta_time;
            for mesh in &mut self.meshes {
                mesh.transform_mut().rotate_yaw(step);
            }
        }
    }

    /// Widens (positive) or narrows (negative) the field of view, in radians.
    pub fn increment_fov(&mut self, delta: f32) {
        self.camera.increment_fov(delta);
        debug!("fov {:.1} degrees", self.camera.fov().to_degrees());
    }

    // ── Toggles ──────────────────────────────────────────────────────────

    pub fn lighting_mode(&self) -> LightingMode {
        self.shading.lighting_mode
    }

    pub fn set_lighting_mode(&mut self, mode: LightingMode) {
        self.shading.lighting_mode = mode;
        debug!("lighting mode: {mode}");
    }

    pub fn cycle_lighting_mode(&mut self) -> LightingMode {
        self.set_lighting_mode(self.shading.lighting_mode.next());
        self.shading.lighting_mode
    }

    pub fn bilinear(&self) -> bool {
        self.shading.bilinear
    }

    pub fn toggle_bilinear(&mut self) -> bool {
        self.shading.bilinear = !self.shading.bilinear;
        debug!("bilinear filtering: {}", on_off(self.shading.bilinear));
        self.shading.bilinear
    }

    pub fn depth_view(&self) -> bool {
        self.shading.depth_view
    }

    pub fn toggle_depth_view(&mut self) -> bool {
        self.shading.depth_view = !self.shading.depth_view;
        debug!("depth buffer view: {}", on_off(self.shading.depth_view));
        self.shading.depth_view
    }

    pub fn normal_mapping(&self) -> bool {
        self.shading.normal_mapping
    }

    pub fn toggle_normal_mapping(&mut self) -> bool {
        self.shading.normal_mapping = !self.shading.normal_mapping;
        debug!("normal mapping: {}", on_off(self.shading.normal_mapping));
        self.shading.normal_mapping
    }

    pub fn rotation(&self) -> bool {
        self.rotate_meshes
    }

    pub fn toggle_rotation(&mut self) -> bool {
        self.rotate_meshes = !self.rotate_meshes;
        debug!("mesh rotation: {}", on_off(self.rotate_meshes));
        self.rotate_meshes
    }

    // ── Frame ────────────────────────────────────────────────────────────

    /// Renders one frame into the owned buffers.
    ///
    /// With more than one worker thread the frame is split into horizontal
    /// bands, one per thread. Every band rasterizes every triangle in
    /// submission order, clipped to its own rows, so the result is identical
    /// to the single-threaded path.
    pub fn render(&mut self) {
        self.renderer.clear(self.config.clear_color);

        for mesh in &mut self.meshes {
            vertex::transform_mesh(mesh, &self.camera);
        }

        let projection = self.camera.projection();
        let pass = FramePass {
            meshes: &self.meshes,
            lighting: &self.config.lighting,
            rasterizer: self.rasterizer,
            state: self.shading,
            z_near: projection.z_near(),
            z_far: projection.z_far(),
        };

        if self.worker_threads > 1 {
            let bands = self.renderer.bands(self.worker_threads);
            let pass = &pass;
            std::thread::scope(|scope| {
                for mut band in bands {
                    scope.spawn(move || pass.draw(&mut band));
                }
            });
        } else {
            pass.draw(&mut self.renderer.as_framebuffer());
        }
    }

    /// The last rendered frame, one `0xAARRGGBB` word per pixel, row-major.
    pub fn frame_buffer(&self) -> &[u32] {
        self.renderer.color_buffer()
    }

    /// Returns the rendered frame as bytes (ARGB8888 format)
    pub fn frame_bytes(&self) -> &[u8] {
        self.renderer.as_bytes()
    }

    /// View depth per pixel; `+inf` where nothing was drawn.
    pub fn depth_buffer(&self) -> &[f32] {
        self.renderer.depth_buffer()
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
