//! Owned per-frame buffers.
//!
//! Provides the [`Renderer`] struct which owns the color and depth buffers,
//! resets them every frame and hands out [`FrameBuffer`] views for the
//! rasterizer to write through.

use super::framebuffer::FrameBuffer;

pub struct Renderer {
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(width: u32, height: u32, clear_color: u32) -> Self {
        let size = pixel_count(width, height);
        Self {
            color_buffer: vec![clear_color; size],
            depth_buffer: vec![f32::INFINITY; size],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32, clear_color: u32) {
        *self = Self::new(width, height, clear_color);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resets every pixel to `color` and every depth to `+inf`.
    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
        self.depth_buffer.fill(f32::INFINITY);
    }

    /// One packed `0xAARRGGBB` word per pixel, row-major from the top-left.
    pub fn color_buffer(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// The color buffer as bytes (ARGB8888 in native endianness).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color_buffer)
    }

    /// A view over the whole frame.
    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
            0..self.height,
        )
    }

    /// Splits the frame into at most `count` disjoint bands of whole rows.
    pub fn bands(&mut self, count: usize) -> Vec<FrameBuffer<'_>> {
        let width = self.width;
        let height = self.height;
        if width == 0 || height == 0 {
            return Vec::new();
        }
        let rows_per_band = height.div_ceil(count.max(1) as u32);
        let chunk = pixel_count(width, rows_per_band);

        self.color_buffer
            .chunks_mut(chunk)
            .zip(self.depth_buffer.chunks_mut(chunk))
            .enumerate()
            .map(|(i, (color, depth))| {
                let start = i as u32 * rows_per_band;
                let end = (start + rows_per_band).min(height);
                FrameBuffer::new(color, depth, width, height, start..end)
            })
            .collect()
    }
}

/// `width * height`, widened before multiplying.
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_color_and_depth() {
        let mut renderer = Renderer::new(4, 3, 0);
        renderer.as_framebuffer().set_pixel_with_depth(1, 1, 2.0, 0xFFFFFFFF);
        renderer.clear(0xFF112233);
        assert!(renderer.color_buffer().iter().all(|&c| c == 0xFF112233));
        assert!(renderer.depth_buffer().iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn bands_cover_every_row_once() {
        let mut renderer = Renderer::new(5, 7, 0);
        let bands = renderer.bands(3);
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].rows(), 0..3);
        assert_eq!(bands[1].rows(), 3..6);
        assert_eq!(bands[2].rows(), 6..7);
    }

    #[test]
    fn more_bands_than_rows() {
        let mut renderer = Renderer::new(2, 2, 0);
        let bands = renderer.bands(8);
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[1].rows(), 1..2);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn pixel_count_does_not_wrap_in_u32() {
        assert_eq!(pixel_count(70_000, 70_000), 4_900_000_000);
        assert_eq!(pixel_count(u32::MAX, 2), 2 * u32::MAX as usize);
    }

    #[test]
    fn byte_view_is_four_bytes_per_pixel() {
        let renderer = Renderer::new(3, 2, 0xFF000000);
        assert_eq!(renderer.as_bytes().len(), 24);
    }
}
