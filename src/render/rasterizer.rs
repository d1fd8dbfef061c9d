//! Edge function triangle rasterization with perspective-correct
//! interpolation and depth testing.
//!
//! # Edge Function
//!
//! For an edge from A to B, the edge function at P is the 2D cross product
//!
//! ```text
//! E(P) = (B - A) × (P - A) = (B.x - A.x) * (P.y - A.y) - (B.y - A.y) * (P.x - A.x)
//! ```
//!
//! In raster space (y down) it is positive when P lies to the right of AB,
//! so a triangle wound clockwise on screen has positive area
//! `E_v0v1(v2)` and positive edge values everywhere inside it. Those are the
//! front faces; anything else is culled.
//!
//! # Perspective-Correct Weights
//!
//! Screen-space barycentrics `λ_i = E_i / area` are linear on screen but not
//! in the world. With `W_i` the clip w (view depth) of each vertex:
//!
//! ```text
//! depth = 1 / Σ (λ_i / W_i)
//! w_i   = (λ_i / W_i) * depth
//! ```
//!
//! `depth` is the view depth stored in the depth buffer, and any vertex
//! attribute `a` interpolates as `Σ a_i * w_i`.

use super::framebuffer::FrameBuffer;
use super::shader::{Fragment, PixelShader};
use crate::color::ColorRgb;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::mesh::VertexOut;

/// Maps an NDC position to raster coordinates: origin top-left, y down,
/// pixel (x, y) covering `[x, x+1) × [y, y+1)`.
#[inline]
pub fn to_raster(ndc: Vec4, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
    )
}

/// Perspective-correct weights and view depth from screen-space
/// barycentrics and per-vertex clip w. All `w` must be positive.
#[inline]
pub fn perspective_weights(lambda: [f32; 3], w: [f32; 3]) -> ([f32; 3], f32) {
    let scaled = [lambda[0] / w[0], lambda[1] / w[1], lambda[2] / w[2]];
    let depth = 1.0 / (scaled[0] + scaled[1] + scaled[2]);
    ([scaled[0] * depth, scaled[1] * depth, scaled[2] * depth], depth)
}

/// Blends three vertex outputs with perspective-correct `weights`.
///
/// Direction attributes are renormalized. `position` becomes the pixel
/// center, the screen-linear NDC z and the view depth.
#[inline]
pub fn interpolate(
    triangle: [&VertexOut; 3],
    lambda: [f32; 3],
    weights: [f32; 3],
    pixel: Vec2,
    depth: f32,
) -> VertexOut {
    let [a, b, c] = triangle;
    let ndc_z = a.position.z * lambda[0] + b.position.z * lambda[1] + c.position.z * lambda[2];

    VertexOut {
        position: Vec4::new(pixel.x, pixel.y, ndc_z, depth),
        color: ColorRgb::weighted(a.color, b.color, c.color, weights),
        uv: a.uv * weights[0] + b.uv * weights[1] + c.uv * weights[2],
        normal: Vec3::weighted(a.normal, b.normal, c.normal, weights).normalize(),
        tangent: Vec3::weighted(a.tangent, b.tangent, c.tangent, weights).normalize(),
        view_direction: Vec3::weighted(
            a.view_direction,
            b.view_direction,
            c.view_direction,
            weights,
        )
        .normalize(),
    }
}

/// Triangle rasterizer using the edge function algorithm.
///
/// Iterates the triangle's bounding box (clipped to the frame buffer's
/// band), tests pixel centers against the three edges, depth-tests covered
/// pixels and only then runs the pixel shader.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeFunctionRasterizer;

impl EdgeFunctionRasterizer {
    pub fn new() -> Self {
        EdgeFunctionRasterizer
    }

    /// Computes the edge function value for point P relative to edge (A -> B).
    #[inline]
    pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
        (b - a).cross(p - a)
    }

    /// Rasterizes one assembled triangle (NDC positions with clip w).
    ///
    /// Triangles with zero or negative screen area are skipped. A pixel is
    /// covered when all three edge values at its center are `>= 0`, and is
    /// written only if its depth is strictly less than the stored one.
    pub fn fill_triangle<S: PixelShader>(
        &self,
        triangle: [&VertexOut; 3],
        buffer: &mut FrameBuffer,
        shader: &S,
    ) {
        let width = buffer.width();
        let height = buffer.height();
        let rows = buffer.rows();
        if width == 0 || rows.is_empty() {
            return;
        }

        let [v0, v1, v2] = triangle.map(|v| to_raster(v.position, width, height));
        let w = triangle.map(|v| v.position.w);

        let area = Self::edge_function(v0, v1, v2);
        if area <= 0.0 {
            return;
        }
        let inv_area = 1.0 / area;

        // Bounding box, clipped to the band
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i64).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i64).min(width as i64 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i64).max(rows.start as i64);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i64).min(rows.end as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

                let w0 = Self::edge_function(v1, v2, p);
                let w1 = Self::edge_function(v2, v0, p);
                let w2 = Self::edge_function(v0, v1, p);
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let lambda = [w0 * inv_area, w1 * inv_area, w2 * inv_area];
                let (weights, depth) = perspective_weights(lambda, w);

                let (x, y) = (x as u32, y as u32);
                if !buffer.passes_depth_test(x, y, depth) {
                    continue;
                }

                let fragment = Fragment {
                    x,
                    y,
                    depth,
                    attributes: interpolate(triangle, lambda, weights, p, depth),
                };
                let color = shader.shade(&fragment);
                buffer.set_pixel_with_depth(x, y, depth, color.to_argb());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Solid(ColorRgb);

    impl PixelShader for Solid {
        fn shade(&self, _fragment: &Fragment) -> ColorRgb {
            self.0
        }
    }

    /// Shades with the interpolated vertex color.
    struct VertexColor;

    impl PixelShader for VertexColor {
        fn shade(&self, fragment: &Fragment) -> ColorRgb {
            fragment.attributes.color
        }
    }

    fn ndc(x: f32, y: f32, w: f32) -> VertexOut {
        VertexOut {
            position: Vec4::new(x, y, 0.5, w),
            color: ColorRgb::WHITE,
            normal: Vec3::FORWARD,
            tangent: Vec3::RIGHT,
            view_direction: Vec3::FORWARD,
            ..VertexOut::default()
        }
    }

    /// Screen-clockwise triangle covering most of the frame.
    fn big_triangle(w: f32) -> [VertexOut; 3] {
        [ndc(0.0, 0.9, w), ndc(0.9, -0.9, w), ndc(-0.9, -0.9, w)]
    }

    fn draw<S: PixelShader>(
        color: &mut [u32],
        depth: &mut [f32],
        size: u32,
        triangle: &[VertexOut; 3],
        shader: &S,
    ) {
        let mut fb = FrameBuffer::new(color, depth, size, size, 0..size);
        let [a, b, c] = triangle;
        EdgeFunctionRasterizer::new().fill_triangle([a, b, c], &mut fb, shader);
    }

    #[test]
    fn edge_values_sum_to_twice_the_area() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(9.0, 3.0);
        let c = Vec2::new(4.0, 8.0);
        let area = EdgeFunctionRasterizer::edge_function(a, b, c);
        for p in [Vec2::new(4.0, 4.0), Vec2::new(-7.0, 2.5), Vec2::new(100.0, -3.0)] {
            let sum = EdgeFunctionRasterizer::edge_function(b, c, p)
                + EdgeFunctionRasterizer::edge_function(c, a, p)
                + EdgeFunctionRasterizer::edge_function(a, b, p);
            assert_relative_eq!(sum, area, epsilon = 1e-3);
        }
        // (1,1) -> (9,3) -> (4,8) turns clockwise on a y-down screen
        assert!(area > 0.0);
    }

    #[test]
    fn perspective_weights_sum_to_one() {
        let (weights, depth) = perspective_weights([0.2, 0.3, 0.5], [1.0, 4.0, 9.0]);
        assert_relative_eq!(weights.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert!(depth >= 1.0 && depth <= 9.0);
        // nearer vertices pull harder than their screen share
        assert!(weights[0] > 0.2);
    }

    #[test]
    fn equal_w_reduces_to_screen_weights() {
        let lambda = [0.1, 0.6, 0.3];
        let (weights, depth) = perspective_weights(lambda, [3.0, 3.0, 3.0]);
        for (w, l) in weights.iter().zip(lambda) {
            assert_relative_eq!(*w, l, epsilon = 1e-6);
        }
        assert_relative_eq!(depth, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn constant_attribute_stays_constant() {
        let mut triangle = [ndc(0.0, 0.9, 1.0), ndc(0.9, -0.9, 7.0), ndc(-0.9, -0.9, 30.0)];
        for v in &mut triangle {
            v.color = ColorRgb::new(0.2, 0.4, 0.8);
        }
        let mut color = vec![0u32; 32 * 32];
        let mut depth = vec![f32::INFINITY; 32 * 32];
        draw(&mut color, &mut depth, 32, &triangle, &VertexColor);

        let expected = ColorRgb::new(0.2, 0.4, 0.8).to_argb();
        let covered: Vec<_> = color.iter().filter(|&&c| c != 0).collect();
        assert!(!covered.is_empty());
        assert!(covered.iter().all(|&&c| c == expected));
    }

    #[test]
    fn counter_clockwise_triangle_is_culled() {
        let [a, b, c] = big_triangle(2.0);
        let mut color = vec![0u32; 16 * 16];
        let mut depth = vec![f32::INFINITY; 16 * 16];
        draw(&mut color, &mut depth, 16, &[a, c, b], &Solid(ColorRgb::WHITE));
        assert!(color.iter().all(|&c| c == 0));
    }

    #[test]
    fn degenerate_triangle_is_skipped() {
        let line = [ndc(-0.5, -0.5, 1.0), ndc(0.0, 0.0, 1.0), ndc(0.5, 0.5, 1.0)];
        let mut color = vec![0u32; 16 * 16];
        let mut depth = vec![f32::INFINITY; 16 * 16];
        draw(&mut color, &mut depth, 16, &line, &Solid(ColorRgb::WHITE));
        assert!(color.iter().all(|&c| c == 0));
        assert!(depth.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn stores_view_depth() {
        let mut color = vec![0u32; 16 * 16];
        let mut depth = vec![f32::INFINITY; 16 * 16];
        draw(&mut color, &mut depth, 16, &big_triangle(4.0), &Solid(ColorRgb::WHITE));
        let center = depth[8 * 16 + 8];
        assert_relative_eq!(center, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn nearer_triangle_wins_in_either_order() {
        let near = big_triangle(2.0);
        let far = big_triangle(6.0);
        let red = Solid(ColorRgb::new(1.0, 0.0, 0.0));
        let blue = Solid(ColorRgb::new(0.0, 0.0, 1.0));

        for near_first in [true, false] {
            let mut color = vec![0u32; 16 * 16];
            let mut depth = vec![f32::INFINITY; 16 * 16];
            if near_first {
                draw(&mut color, &mut depth, 16, &near, &red);
                draw(&mut color, &mut depth, 16, &far, &blue);
            } else {
                draw(&mut color, &mut depth, 16, &far, &blue);
                draw(&mut color, &mut depth, 16, &near, &red);
            }
            assert_eq!(color[8 * 16 + 8], 0xFFFF0000);
        }
    }

    #[test]
    fn bands_match_full_frame() {
        let triangle = big_triangle(3.0);
        let shader = Solid(ColorRgb::GRAY);
        let rasterizer = EdgeFunctionRasterizer::new();
        let [a, b, c] = &triangle;

        let mut full_color = vec![0u32; 20 * 20];
        let mut full_depth = vec![f32::INFINITY; 20 * 20];
        draw(&mut full_color, &mut full_depth, 20, &triangle, &shader);

        let mut band_color = vec![0u32; 20 * 20];
        let mut band_depth = vec![f32::INFINITY; 20 * 20];
        let (top_color, bottom_color) = band_color.split_at_mut(7 * 20);
        let (top_depth, bottom_depth) = band_depth.split_at_mut(7 * 20);
        let mut top = FrameBuffer::new(top_color, top_depth, 20, 20, 0..7);
        let mut bottom = FrameBuffer::new(bottom_color, bottom_depth, 20, 20, 7..20);
        rasterizer.fill_triangle([a, b, c], &mut top, &shader);
        rasterizer.fill_triangle([a, b, c], &mut bottom, &shader);

        assert_eq!(full_color, band_color);
    }
}
