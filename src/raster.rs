//! Hard-edged stroke rasterization onto RGBA buffers.
//!
//! A stroke is first stamped into a coverage mask one segment at a time,
//! each segment only visiting the pixels of its own padded bounds. The
//! stroke color is then blended once per covered pixel, so a stroke that
//! crosses itself never darkens its own overlap.

use egui::{Color32, Pos2};
use image::{Rgba, RgbaImage};

use crate::composite::blend_over;
use crate::stroke::Stroke;

/// Thinnest radius a stroke is drawn with, so hairlines still cover their pixel
pub const MIN_STROKE_RADIUS: f32 = 0.5;

/// Straight-alpha RGBA for an egui color
pub fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Pixels touched by one stroke, over a rectangular region of the canvas
pub struct CoverageMask {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    covered: Vec<bool>,
}

// First pixel whose center can be within `radius` of `lo`
fn first_pixel(lo: f32, radius: f32) -> u32 {
    (lo - radius - 0.5).floor().max(0.0) as u32
}

// One past the last pixel whose center can be within `radius` of `hi`
fn past_pixel(hi: f32, radius: f32, limit: u32) -> u32 {
    ((hi + radius).ceil().max(0.0) as u32).min(limit)
}

impl CoverageMask {
    /// Mask over the canvas rectangle starting at `(left, top)`
    pub fn for_region(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            covered: vec![false; width as usize * height as usize],
        }
    }

    /// Mask over a whole `width` x `height` canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self::for_region(0, 0, width, height)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y - self.top) as usize * self.width as usize + (x - self.left) as usize
    }

    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        x >= self.left
            && y >= self.top
            && x < self.left + self.width
            && y < self.top + self.height
            && self.covered[self.index(x, y)]
    }

    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|covered| **covered).count()
    }

    /// Mark every pixel whose center lies within `radius` of the segment `a`..`b`.
    /// `a == b` stamps a round dot. Only the segment's own padded bounds are visited.
    pub fn stamp_segment(&mut self, a: Pos2, b: Pos2, radius: f32) {
        let (right, bottom) = (self.left + self.width, self.top + self.height);
        let x0 = first_pixel(a.x.min(b.x), radius).max(self.left);
        let x1 = past_pixel(a.x.max(b.x), radius, right);
        let y0 = first_pixel(a.y.min(b.y), radius).max(self.top);
        let y1 = past_pixel(a.y.max(b.y), radius, bottom);

        let along = b - a;
        let length_sq = along.length_sq();
        let radius_sq = radius * radius;

        for y in y0..y1 {
            for x in x0..x1 {
                // Pixel (x, y) is sampled at its center
                let offset = Pos2::new(x as f32 + 0.5, y as f32 + 0.5) - a;
                let t = if length_sq > 0.0 {
                    (offset.dot(along) / length_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                if (offset - along * t).length_sq() <= radius_sq {
                    let index = self.index(x, y);
                    self.covered[index] = true;
                }
            }
        }
    }

    /// Coverage of a whole stroke on a `width` x `height` canvas. The mask
    /// only spans the stroke's bounds clipped to the canvas; every consecutive
    /// pair of points is a segment.
    pub fn from_stroke(stroke: &Stroke, width: u32, height: u32) -> Self {
        let radius = (stroke.thickness() / 2.0).max(MIN_STROKE_RADIUS);
        let points = stroke.points();
        if points.is_empty() {
            return Self::for_region(0, 0, 0, 0);
        }

        let (mut min, mut max) = (points[0], points[0]);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }
        let left = first_pixel(min.x, radius).min(width);
        let top = first_pixel(min.y, radius).min(height);
        let right = past_pixel(max.x, radius, width).max(left);
        let bottom = past_pixel(max.y, radius, height).max(top);

        let mut mask = Self::for_region(left, top, right - left, bottom - top);
        if mask.width == 0 || mask.height == 0 {
            return mask;
        }
        match points {
            [only] => mask.stamp_segment(*only, *only, radius),
            _ => {
                for segment in points.windows(2) {
                    mask.stamp_segment(segment[0], segment[1], radius);
                }
            }
        }
        mask
    }
}

/// Blend `stroke` source-over onto `canvas`, once per covered pixel.
/// Points outside the canvas are clipped.
pub fn rasterize_stroke(canvas: &mut RgbaImage, stroke: &Stroke) {
    let mask = CoverageMask::from_stroke(stroke, canvas.width(), canvas.height());
    let color = to_rgba(stroke.color());
    for y in mask.top..mask.top + mask.height {
        for x in mask.left..mask.left + mask.width {
            if mask.covered[mask.index(x, y)] {
                let pixel = canvas.get_pixel_mut(x, y);
                *pixel = blend_over(*pixel, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transparent(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]))
    }

    #[test]
    fn test_horizontal_line_covers_its_row_only() {
        let mut canvas = transparent(20, 10);
        let stroke = Stroke::new(
            Color32::RED,
            2.0,
            vec![Pos2::new(2.0, 5.0), Pos2::new(17.0, 5.0)],
        );
        rasterize_stroke(&mut canvas, &stroke);

        assert_eq!(*canvas.get_pixel(10, 4), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(10, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(10, 7)[3], 0);
        assert_eq!(canvas.get_pixel(10, 2)[3], 0);
        assert_eq!(canvas.get_pixel(19, 5)[3], 0);
    }

    #[test]
    fn test_segment_end_is_rounded() {
        let mut mask = CoverageMask::new(20, 20);
        mask.stamp_segment(Pos2::new(5.0, 10.0), Pos2::new(12.0, 10.0), 3.0);

        // Past the end, within the radius of the endpoint
        assert!(mask.is_covered(13, 10));
        // Corner of the bounding box is farther than the radius
        assert!(!mask.is_covered(14, 12));
    }

    #[test]
    fn test_single_point_draws_a_dot() {
        let mut canvas = transparent(10, 10);
        let stroke = Stroke::new(Color32::BLACK, 4.0, vec![Pos2::new(5.0, 5.0)]);
        rasterize_stroke(&mut canvas, &stroke);

        assert_eq!(canvas.get_pixel(5, 5)[3], 255);
        assert_eq!(canvas.get_pixel(4, 4)[3], 255);
        assert_eq!(canvas.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_offscreen_points_are_clipped() {
        let mut canvas = transparent(8, 8);
        let stroke = Stroke::new(
            Color32::BLUE,
            2.0,
            vec![Pos2::new(-50.0, 4.0), Pos2::new(50.0, 4.0)],
        );
        rasterize_stroke(&mut canvas, &stroke);

        for x in 0..8 {
            assert_eq!(*canvas.get_pixel(x, 3), Rgba([0, 0, 255, 255]));
        }
    }

    #[test]
    fn test_stroke_entirely_offscreen_covers_nothing() {
        let stroke = Stroke::new(
            Color32::BLUE,
            6.0,
            vec![Pos2::new(-40.0, -40.0), Pos2::new(-20.0, -10.0)],
        );
        assert_eq!(CoverageMask::from_stroke(&stroke, 16, 16).covered_count(), 0);
    }

    #[test]
    fn test_mask_spans_only_stroke_bounds() {
        let stroke = Stroke::new(
            Color32::BLACK,
            2.0,
            vec![Pos2::new(30.0, 40.0), Pos2::new(50.0, 40.0)],
        );
        let mask = CoverageMask::from_stroke(&stroke, 800, 600);
        assert!(mask.covered.len() < 30 * 10);
        assert!(mask.is_covered(40, 39));
        assert!(!mask.is_covered(0, 0));
        assert!(!mask.is_covered(799, 599));
    }

    #[test]
    fn test_self_overlap_blends_once() {
        let mut canvas = transparent(10, 10);
        let half_red = Color32::from_rgba_unmultiplied(255, 0, 0, 128);
        // Back and forth over the same pixels
        let stroke = Stroke::new(
            half_red,
            2.0,
            vec![Pos2::new(1.0, 5.0), Pos2::new(8.0, 5.0), Pos2::new(1.0, 5.0)],
        );
        rasterize_stroke(&mut canvas, &stroke);

        assert_eq!(canvas.get_pixel(4, 5)[3], 128);
    }

    #[test]
    fn test_long_scribble_covers_canvas_quickly() {
        // Zig-zag spanning the whole canvas, bounding box equals the canvas
        let points: Vec<Pos2> = (0..1500)
            .map(|i| {
                let x = (i as f32 * 0.53) % 800.0;
                let y = if i % 2 == 0 { 0.0 } else { 599.0 };
                Pos2::new(x, y)
            })
            .collect();
        let stroke = Stroke::new(Color32::BLACK, 4.0, points);

        let start = std::time::Instant::now();
        let mut canvas = transparent(800, 600);
        rasterize_stroke(&mut canvas, &stroke);
        let elapsed = start.elapsed();

        assert!(
            elapsed < std::time::Duration::from_secs(10),
            "rasterizing took {:?}",
            elapsed
        );
        assert_eq!(canvas.get_pixel(0, 0)[3], 255);
        assert!(canvas.pixels().any(|p| p[3] == 0));
    }
}
