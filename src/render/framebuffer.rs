//! Frame buffer abstraction for 2D pixel access.
//!
//! Provides a borrowed view into a horizontal band of the color and depth
//! buffers. A full-frame view is just a band covering every row; parallel
//! rendering hands each worker a disjoint band so no two threads ever touch
//! the same pixel.

use std::ops::Range;

/// A view into a band of rows of the color and depth buffers.
///
/// Coordinates passed to the accessors are always frame coordinates, not
/// band-relative. The depth buffer stores view depth (interpolated clip w);
/// smaller is nearer, and cleared cells hold `+inf`.
#[derive(Debug)]
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    depth_buffer: &'a mut [f32],
    width: u32,
    height: u32,
    rows: Range<u32>,
}

impl<'a> FrameBuffer<'a> {
    /// Create a view over rows `rows` of a `width` x `height` frame.
    ///
    /// # Panics
    /// Panics (in debug builds) if the slice lengths don't match the band size.
    pub fn new(
        color_buffer: &'a mut [u32],
        depth_buffer: &'a mut [f32],
        width: u32,
        height: u32,
        rows: Range<u32>,
    ) -> Self {
        let band_len = (rows.end - rows.start) as usize * width as usize;
        debug_assert_eq!(color_buffer.len(), band_len, "color buffer size doesn't match band");
        debug_assert_eq!(depth_buffer.len(), band_len, "depth buffer size doesn't match band");
        debug_assert!(rows.end <= height);
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
            rows,
        }
    }

    /// Width of the whole frame.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the whole frame (not of this band).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rows of the frame this view may write.
    pub fn rows(&self) -> Range<u32> {
        self.rows.clone()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && self.rows.contains(&y) {
            Some(((y - self.rows.start) * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Stored depth at (x, y), or `None` outside this band.
    #[inline]
    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth_buffer[i])
    }

    /// Whether a fragment at `depth` would pass the depth test at (x, y).
    ///
    /// Only strictly nearer fragments pass; on a tie the stored fragment wins.
    #[inline]
    pub fn passes_depth_test(&self, x: u32, y: u32, depth: f32) -> bool {
        self.depth(x, y).is_some_and(|stored| depth < stored)
    }

    /// Depth-tested write. Returns whether the fragment was written.
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: u32, y: u32, depth: f32, color: u32) -> bool {
        match self.index(x, y) {
            Some(i) if depth < self.depth_buffer[i] => {
                self.depth_buffer[i] = depth;
                self.color_buffer[i] = color;
                true
            }
            _ => false,
        }
    }

    /// Color at (x, y), or `None` outside this band.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| self.color_buffer[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearer_fragment_wins_in_either_order() {
        let mut color = vec![0u32; 4];
        let mut depth = vec![f32::INFINITY; 4];
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 2, 2, 0..2);

        // far then near
        assert!(fb.set_pixel_with_depth(1, 1, 5.0, 0xFF0000FF));
        assert!(fb.set_pixel_with_depth(1, 1, 2.0, 0xFFFF0000));
        assert_eq!(fb.get_pixel(1, 1), Some(0xFFFF0000));

        // near then far
        assert!(fb.set_pixel_with_depth(0, 0, 2.0, 0xFFFF0000));
        assert!(!fb.set_pixel_with_depth(0, 0, 5.0, 0xFF0000FF));
        assert_eq!(fb.get_pixel(0, 0), Some(0xFFFF0000));
    }

    #[test]
    fn equal_depth_keeps_existing_fragment() {
        let mut color = vec![0u32; 1];
        let mut depth = vec![f32::INFINITY; 1];
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 1, 1, 0..1);
        fb.set_pixel_with_depth(0, 0, 3.0, 1);
        assert!(!fb.set_pixel_with_depth(0, 0, 3.0, 2));
        assert_eq!(fb.get_pixel(0, 0), Some(1));
    }

    #[test]
    fn band_uses_frame_coordinates() {
        let mut color = vec![0u32; 6];
        let mut depth = vec![f32::INFINITY; 6];
        // rows 2..4 of a 3x5 frame
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 3, 5, 2..4);
        assert!(!fb.set_pixel_with_depth(0, 1, 1.0, 7));
        assert!(fb.set_pixel_with_depth(2, 3, 1.0, 7));
        assert_eq!(fb.get_pixel(2, 3), Some(7));
        assert_eq!(fb.get_pixel(2, 4), None);
        assert_eq!(color[5], 7);
    }
}
