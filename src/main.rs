//! Interactive viewer.
//!
//! ```text
//! softlight [MESH.obj] [CONFIG.ron]
//! ```
//!
//! Textures are picked up next to the mesh as `<stem>_diffuse.png`,
//! `<stem>_normal.png`, `<stem>_specular.png` and `<stem>_gloss.png`.

use std::error::Error;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use softlight::prelude::*;

const TITLE: &str = "softlight";
const SCREENSHOT_PATH: &str = "softlight_color_buffer.bmp";

const CONTROLS: &str = "\
controls:
  WASD / Space / LShift  move
  mouse                  look
  wheel                  field of view
  F3                     toggle bilinear filtering
  F4                     toggle depth buffer view
  F5                     toggle rotation
  F6                     toggle normal mapping
  F7                     cycle lighting mode
  X                      screenshot
  Esc                    quit";

fn load_mesh(path: &Path) -> Result<Mesh, LoadError> {
    let sibling = |suffix: &str| -> Option<PathBuf> {
        let stem = path.file_stem()?.to_string_lossy();
        let candidate = path.with_file_name(format!("{stem}_{suffix}.png"));
        candidate.exists().then_some(candidate)
    };
    let color = sibling("diffuse");
    let normal = sibling("normal");
    let specular = sibling("specular");
    let gloss = sibling("gloss");

    let textures = MeshTextures::from_files(
        color.as_deref(),
        normal.as_deref(),
        specular.as_deref(),
        gloss.as_deref(),
    )?;

    let mut mesh = Mesh::from_obj(path, true)?.with_textures(textures);
    mesh.transform_mut().set_position(Vec3::new(0.0, 0.0, 40.0));
    Ok(mesh)
}

fn save_screenshot(engine: &Engine) -> Result<(), image::ImageError> {
    let rgb: Vec<u8> = engine
        .frame_buffer()
        .iter()
        .flat_map(|&argb| {
            let [_, r, g, b] = argb.to_be_bytes();
            [r, g, b]
        })
        .collect();
    image::save_buffer_with_format(
        SCREENSHOT_PATH,
        &rgb,
        engine.width(),
        engine.height(),
        image::ColorType::Rgb8,
        image::ImageFormat::Bmp,
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let mut args = std::env::args().skip(1);
    let mesh_path = PathBuf::from(args.next().unwrap_or_else(|| "resources/vehicle.obj".into()));
    let config = match args.next() {
        Some(path) => RenderConfig::from_file(path)?,
        None => RenderConfig::default(),
    };

    let mut window = Window::new(TITLE, WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let mut engine = Engine::new(window.width(), window.height(), config);
    match load_mesh(&mesh_path) {
        Ok(mesh) => {
            engine.add_mesh(mesh);
        }
        Err(err) => warn!("no mesh loaded: {err}"),
    }

    println!("{CONTROLS}");

    let mut limiter = FrameLimiter::new(&window);
    let mut fps = FpsCounter::new();

    'running: loop {
        for event in window.poll_events() {
            match event {
                WindowEvent::Quit => break 'running,
                WindowEvent::Resize(w, h) => {
                    window.resize(w, h)?;
                    engine.resize(w, h);
                }
                WindowEvent::ToggleBilinear => {
                    engine.toggle_bilinear();
                }
                WindowEvent::ToggleDepthView => {
                    engine.toggle_depth_view();
                }
                WindowEvent::ToggleRotation => {
                    engine.toggle_rotation();
                }
                WindowEvent::ToggleNormalMapping => {
                    engine.toggle_normal_mapping();
                }
                WindowEvent::CycleLightingMode => {
                    let mode = engine.cycle_lighting_mode();
                    info!("lighting mode: {mode}");
                }
                WindowEvent::Zoom(delta) => engine.increment_fov(delta),
                WindowEvent::Screenshot => match save_screenshot(&engine) {
                    Ok(()) => info!("screenshot saved to {SCREENSHOT_PATH}"),
                    Err(err) => error!("screenshot failed: {err}"),
                },
            }
        }

        let delta_time = limiter.wait_and_get_delta(&window);
        let input = window.frame_input();
        engine.update(input.movement, input.look, delta_time);
        engine.render();
        window.present(engine.frame_bytes())?;

        if let Some(rate) = fps.tick(delta_time) {
            window.set_title(&format!("{TITLE} - {rate:.0} fps - {}", engine.lighting_mode()))?;
        }
    }

    Ok(())
}
