//! SDL2 presentation and input translation.
//!
//! The renderer itself never touches SDL. This module blits finished frames
//! to a window and turns raw SDL events into the movement/look deltas and
//! discrete toggles the [`Engine`](crate::Engine) understands.

use sdl2::event::Event;
use sdl2::keyboard::Scancode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;

pub const WINDOW_WIDTH: u32 = 640;
pub const WINDOW_HEIGHT: u32 = 480;
pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

/// Radians of FOV per mouse-wheel notch.
const FOV_PER_WHEEL_STEP: f32 = 1.0 / 20.0;

/// A discrete event for the application loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    Quit,
    Resize(u32, u32),
    ToggleBilinear,
    ToggleDepthView,
    ToggleRotation,
    ToggleNormalMapping,
    CycleLightingMode,
    Screenshot,
    /// FOV change in radians; wheel up narrows the view.
    Zoom(f32),
}

/// Continuous input gathered over one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Camera-local movement direction (x = right, y = up, z = forward).
    pub movement: Vec3,
    /// Mouse motion since the previous frame (x = yaw, y = pitch).
    pub look: Vec2,
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the time elapsed
    /// since the previous call, in seconds.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> f32 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < FRAME_TARGET_TIME as u64 {
            let time_to_wait = FRAME_TARGET_TIME as u64 - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time as f32 / 1000.0
    }
}

/// Counts frames and reports the rate about once per second.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame; returns the frame rate whenever a full second has
    /// accumulated.
    pub fn tick(&mut self, delta_time: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta_time;
        if self.elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}

pub struct Window {
    // Field order matters: `texture` borrows from `texture_creator` and must
    // be dropped first.
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
    look: Vec2,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;
        sdl_context.mouse().set_relative_mouse_mode(true);

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;
        let texture = Self::create_texture(&texture_creator, width, height)?;

        Ok(Self {
            texture,
            texture_creator,
            canvas,
            event_pump,
            timer_subsystem,
            width,
            height,
            look: Vec2::ZERO,
        })
    }

    fn create_texture(
        texture_creator: &sdl2::render::TextureCreator<sdl2::video::WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<sdl2::render::Texture<'static>, String> {
        // SAFETY: the creator is boxed, so its address is stable, and it is
        // owned by the same Window as the texture, which is dropped first.
        let texture_creator: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator as *const _) };
        texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())
    }

    /// Drains the SDL queue into application events. Mouse motion is
    /// accumulated for the next [`frame_input`](Self::frame_input) call.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => events.push(WindowEvent::Quit),
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => events.push(WindowEvent::Resize(w as u32, h as u32)),
                Event::KeyUp {
                    scancode: Some(scancode),
                    ..
                } => {
                    let mapped = match scancode {
                        Scancode::X => Some(WindowEvent::Screenshot),
                        Scancode::F3 => Some(WindowEvent::ToggleBilinear),
                        Scancode::F4 => Some(WindowEvent::ToggleDepthView),
                        Scancode::F5 => Some(WindowEvent::ToggleRotation),
                        Scancode::F6 => Some(WindowEvent::ToggleNormalMapping),
                        Scancode::F7 => Some(WindowEvent::CycleLightingMode),
                        _ => None,
                    };
                    events.extend(mapped);
                }
                Event::MouseWheel { y, .. } => {
                    events.push(WindowEvent::Zoom(-(y as f32) * FOV_PER_WHEEL_STEP));
                }
                Event::MouseMotion { xrel, yrel, .. } => {
                    self.look.x += xrel as f32;
                    self.look.y += yrel as f32;
                }
                _ => {}
            }
        }
        events
    }

    /// Held keys and accumulated mouse motion since the last call.
    ///
    /// WASD moves in the camera plane, Space/LShift move up/down.
    pub fn frame_input(&mut self) -> FrameInput {
        let keys = self.event_pump.keyboard_state();
        let axis = |positive: Scancode, negative: Scancode| {
            keys.is_scancode_pressed(positive) as i32 as f32
                - keys.is_scancode_pressed(negative) as i32 as f32
        };
        let movement = Vec3::new(
            axis(Scancode::D, Scancode::A),
            axis(Scancode::Space, Scancode::LShift),
            axis(Scancode::W, Scancode::S),
        );
        let look = std::mem::replace(&mut self.look, Vec2::ZERO);
        FrameInput { movement, look }
    }

    /// Uploads a frame of `width * height` ARGB8888 pixels and shows it.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.width = width;
        self.height = height;
        self.texture = Self::create_texture(&self.texture_creator, width, height)?;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), String> {
        self.canvas
            .window_mut()
            .set_title(title)
            .map_err(|e| e.to_string())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
