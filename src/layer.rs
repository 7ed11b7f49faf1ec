use std::path::Path;

use egui::{Color32, Pos2};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::composite::apply_opacity;
use crate::error::{PaintError, PaintResult};
use crate::raster::rasterize_stroke;
use crate::stroke::{MutableStroke, StrokeRef};

/// Brush width a layer starts with
pub const DEFAULT_BRUSH_WIDTH: f32 = 2.0;

/// A drawing surface: an ordered list of strokes plus the brush and
/// compositing settings that belong to it.
///
/// Visibility and opacity never touch the stored strokes; they are only
/// applied when the layer is rendered.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Display name of the layer
    pub name: String,
    strokes: Vec<StrokeRef>,
    /// Stroke of the drag currently in progress, if any
    current_stroke: Option<MutableStroke>,
    visible: bool,
    opacity: f32,
    color: Color32,
    brush_width: f32,
    /// Bumped whenever the rendered pixels may change
    revision: u64,
}

impl Layer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            strokes: Vec::new(),
            current_stroke: None,
            visible: true,
            opacity: 1.0,
            color: Color32::BLACK,
            brush_width: DEFAULT_BRUSH_WIDTH,
            revision: 0,
        }
    }

    /// Start a new stroke at `point` using the current color and brush width.
    /// A stroke still in progress is committed first.
    pub fn begin_stroke(&mut self, point: Pos2) {
        self.end_stroke();
        log::debug!("{}: begin stroke at {:?}", self.name, point);
        self.current_stroke = Some(MutableStroke::begin(self.color, self.brush_width, point));
        self.revision += 1;
    }

    /// Append a point to the stroke in progress. Ignored when no stroke is active.
    pub fn extend_stroke(&mut self, point: Pos2) {
        if let Some(stroke) = &mut self.current_stroke {
            stroke.add_point(point);
            self.revision += 1;
        }
    }

    /// Commit the stroke in progress, making it immutable
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.current_stroke.take() {
            log::debug!("{}: end stroke with {} points", self.name, stroke.points().len());
            self.strokes.push(stroke.finish());
        }
    }

    /// Changes whenever [`Layer::render`] may produce different pixels
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_drawing(&self) -> bool {
        self.current_stroke.is_some()
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.strokes
    }

    pub fn current_stroke(&self) -> Option<&MutableStroke> {
        self.current_stroke.as_ref()
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    /// Color for strokes started from now on
    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    /// Width for strokes started from now on. Non-positive or non-finite widths are ignored.
    pub fn set_brush_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.brush_width = width;
        } else {
            log::warn!("{}: ignoring brush width {}", self.name, width);
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the layer opacity, clamped to [0, 1]
    pub fn set_opacity(&mut self, opacity: f32) {
        if opacity.is_nan() {
            log::warn!("{}: ignoring NaN opacity", self.name);
            return;
        }
        self.opacity = opacity.clamp(0.0, 1.0);
        self.revision += 1;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.revision += 1;
    }

    /// Remove every stroke, including one still being drawn
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current_stroke = None;
        self.revision += 1;
    }

    /// Rasterize what this layer currently shows: all strokes (including the
    /// one in progress) with the layer opacity applied. A hidden layer renders
    /// fully transparent.
    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        if !self.visible {
            return image;
        }

        for stroke in &self.strokes {
            rasterize_stroke(&mut image, stroke);
        }
        if let Some(current) = &self.current_stroke {
            rasterize_stroke(&mut image, &current.to_stroke());
        }

        apply_opacity(&mut image, self.opacity);
        image
    }

    /// Write [`Layer::render`] to `path` as a PNG file
    pub fn export_to_image(&self, path: &Path, width: u32, height: u32) -> PaintResult<()> {
        if width == 0 || height == 0 {
            return Err(PaintError::EmptyCanvas { width, height });
        }
        self.render(width, height).save_with_format(path, ImageFormat::Png)?;
        log::debug!("{}: exported to {}", self.name, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_line(layer: &mut Layer, from: Pos2, to: Pos2) {
        layer.begin_stroke(from);
        layer.extend_stroke(to);
        layer.end_stroke();
    }

    #[test]
    fn test_stroke_lifecycle() {
        let mut layer = Layer::new("Layer 0");
        assert!(!layer.is_drawing());

        layer.begin_stroke(Pos2::new(1.0, 1.0));
        layer.extend_stroke(Pos2::new(2.0, 2.0));
        layer.extend_stroke(Pos2::new(3.0, 3.0));
        assert!(layer.is_drawing());
        assert!(layer.strokes().is_empty());

        layer.end_stroke();
        assert!(!layer.is_drawing());
        assert_eq!(layer.strokes().len(), 1);
        assert_eq!(layer.strokes()[0].points().len(), 3);
    }

    #[test]
    fn test_extend_without_begin_is_ignored() {
        let mut layer = Layer::new("Layer 0");
        layer.extend_stroke(Pos2::new(1.0, 1.0));
        layer.end_stroke();
        assert!(layer.strokes().is_empty());
    }

    #[test]
    fn test_stroke_keeps_settings_from_its_start() {
        let mut layer = Layer::new("Layer 0");
        layer.set_color(Color32::RED);
        layer.set_brush_width(6.0);
        layer.begin_stroke(Pos2::new(0.0, 0.0));

        // Changing the brush mid-drag does not affect the stroke
        layer.set_color(Color32::GREEN);
        layer.set_brush_width(1.0);
        layer.extend_stroke(Pos2::new(4.0, 4.0));
        layer.end_stroke();

        let stroke = &layer.strokes()[0];
        assert_eq!(stroke.color(), Color32::RED);
        assert_eq!(stroke.thickness(), 6.0);
        assert_eq!(layer.color(), Color32::GREEN);
    }

    #[test]
    fn test_begin_commits_unfinished_stroke() {
        let mut layer = Layer::new("Layer 0");
        layer.begin_stroke(Pos2::new(0.0, 0.0));
        layer.begin_stroke(Pos2::new(5.0, 5.0));
        assert_eq!(layer.strokes().len(), 1);
        assert!(layer.is_drawing());
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut layer = Layer::new("Layer 0");
        layer.set_opacity(1.7);
        assert_eq!(layer.opacity(), 1.0);
        layer.set_opacity(-0.3);
        assert_eq!(layer.opacity(), 0.0);
        layer.set_opacity(f32::NAN);
        assert_eq!(layer.opacity(), 0.0);
    }

    #[test]
    fn test_invalid_brush_width_is_ignored() {
        let mut layer = Layer::new("Layer 0");
        layer.set_brush_width(0.0);
        layer.set_brush_width(f32::INFINITY);
        assert_eq!(layer.brush_width(), DEFAULT_BRUSH_WIDTH);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut layer = Layer::new("Layer 0");
        draw_line(&mut layer, Pos2::new(0.0, 0.0), Pos2::new(5.0, 5.0));
        layer.begin_stroke(Pos2::new(1.0, 1.0));

        layer.clear();
        assert!(layer.strokes().is_empty());
        assert!(!layer.is_drawing());
        assert!(layer.render(8, 8).pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_render_applies_opacity_without_touching_strokes() {
        let mut layer = Layer::new("Layer 0");
        draw_line(&mut layer, Pos2::new(0.0, 4.0), Pos2::new(10.0, 4.0));
        layer.set_opacity(0.5);

        let image = layer.render(10, 10);
        assert_eq!(*image.get_pixel(5, 4), Rgba([0, 0, 0, 128]));
        assert_eq!(layer.strokes()[0].color(), Color32::BLACK);
    }

    #[test]
    fn test_hidden_layer_renders_transparent() {
        let mut layer = Layer::new("Layer 0");
        draw_line(&mut layer, Pos2::new(0.0, 4.0), Pos2::new(10.0, 4.0));
        layer.set_visible(false);

        assert!(layer.render(10, 10).pixels().all(|p| p[3] == 0));
        assert_eq!(layer.strokes().len(), 1);
    }

    #[test]
    fn test_revision_tracks_pixel_changes() {
        let mut layer = Layer::new("Layer 0");
        let start = layer.revision();

        // Brush settings only affect future strokes
        layer.set_color(Color32::RED);
        layer.set_brush_width(5.0);
        assert_eq!(layer.revision(), start);

        layer.begin_stroke(Pos2::new(1.0, 1.0));
        let drawing = layer.revision();
        assert!(drawing > start);
        layer.extend_stroke(Pos2::new(4.0, 4.0));
        assert!(layer.revision() > drawing);

        let before = layer.revision();
        layer.set_opacity(0.5);
        layer.set_visible(false);
        layer.clear();
        assert_eq!(layer.revision(), before + 3);
    }

    #[test]
    fn test_export_rejects_empty_canvas() {
        let layer = Layer::new("Layer 0");
        let result = layer.export_to_image(Path::new("unused.png"), 0, 10);
        assert!(matches!(result, Err(PaintError::EmptyCanvas { .. })));
    }
}
