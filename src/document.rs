use image::RgbaImage;

use crate::composite;
use crate::config::PaintConfig;
use crate::error::{PaintError, PaintResult};
use crate::layer::Layer;

/// The layer stack: a fixed, ordered set of layers (index 0 at the bottom)
/// and the index of the layer that receives input.
#[derive(Debug, Clone)]
pub struct Document {
    layers: Vec<Layer>,
    active_layer: usize,
}

impl Document {
    /// Create `count` empty layers named `Layer 0`, `Layer 1`, ...
    /// At least one layer is always created.
    pub fn new(count: usize) -> Self {
        let layers = (0..count.max(1))
            .map(|index| Layer::new(&format!("Layer {}", index)))
            .collect();
        Self {
            layers,
            active_layer: 0,
        }
    }

    /// Create the stack described by `config`, applying its brush defaults to every layer
    pub fn from_config(config: &PaintConfig) -> Self {
        let mut document = Self::new(config.layer_count);
        for layer in &mut document.layers {
            layer.set_color(config.default_color);
            layer.set_brush_width(config.clamp_brush_width(config.default_brush_width));
        }
        document
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> PaintResult<&Layer> {
        let count = self.layers.len();
        self.layers
            .get(index)
            .ok_or(PaintError::InvalidLayer { index, count })
    }

    pub fn layer_mut(&mut self, index: usize) -> PaintResult<&mut Layer> {
        let count = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or(PaintError::InvalidLayer { index, count })
    }

    pub fn active_index(&self) -> usize {
        self.active_layer
    }

    pub fn active_layer(&self) -> &Layer {
        &self.layers[self.active_layer]
    }

    pub fn active_layer_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.active_layer]
    }

    /// Make `index` the active layer. Out-of-range indices are rejected and
    /// the active layer stays unchanged.
    pub fn set_active(&mut self, index: usize) -> PaintResult<()> {
        if index >= self.layers.len() {
            return Err(PaintError::InvalidLayer {
                index,
                count: self.layers.len(),
            });
        }
        if index != self.active_layer {
            // Don't leave a half-drawn stroke dangling on the old layer
            self.active_layer_mut().end_stroke();
            self.active_layer = index;
        }
        Ok(())
    }

    /// Composite every visible layer into one bitmap
    pub fn flatten(&self, width: u32, height: u32) -> RgbaImage {
        composite::flatten(&self.layers, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, Pos2};

    #[test]
    fn test_new_names_layers_in_order() {
        let document = Document::new(3);
        let names: Vec<&str> = document.layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Layer 0", "Layer 1", "Layer 2"]);
        assert_eq!(document.active_index(), 0);
    }

    #[test]
    fn test_zero_layers_still_creates_one() {
        let document = Document::new(0);
        assert_eq!(document.layer_count(), 1);
    }

    #[test]
    fn test_set_active_rejects_out_of_range() {
        let mut document = Document::new(3);
        document.set_active(2).unwrap();
        assert_eq!(document.active_index(), 2);

        let err = document.set_active(3).unwrap_err();
        assert!(matches!(err, PaintError::InvalidLayer { index: 3, count: 3 }));
        assert_eq!(document.active_index(), 2);
    }

    #[test]
    fn test_switching_layers_commits_stroke() {
        let mut document = Document::new(2);
        document.active_layer_mut().begin_stroke(Pos2::new(1.0, 1.0));
        document.set_active(1).unwrap();

        let bottom = document.layer(0).unwrap();
        assert!(!bottom.is_drawing());
        assert_eq!(bottom.strokes().len(), 1);
    }

    #[test]
    fn test_from_config_applies_brush_defaults() {
        let config = PaintConfig {
            layer_count: 4,
            default_brush_width: 50.0,
            default_color: Color32::RED,
            ..PaintConfig::default()
        };
        let document = Document::from_config(&config);
        assert_eq!(document.layer_count(), 4);
        for layer in document.layers() {
            assert_eq!(layer.color(), Color32::RED);
            assert_eq!(layer.brush_width(), 20.0);
        }
    }
}
