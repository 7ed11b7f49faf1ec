use std::collections::HashMap;

use egui::{Color32, Painter, Rect, TextureHandle, TextureOptions};
use image::GrayImage;

use crate::document::Document;
use crate::layer::Layer;

/// Paper color behind the layers
pub const CANVAS_BACKGROUND: Color32 = Color32::WHITE;

/// A layer's last upload, valid while the layer revision and canvas size match
struct CachedLayer {
    revision: u64,
    size: [u32; 2],
    texture: TextureHandle,
}

/// Draws the layer stack into the canvas widget and uploads preview textures.
///
/// Each layer is shown through a texture of [`Layer::render`], so the screen
/// shows exactly the pixels that AI Ink and Save write.
pub struct Renderer {
    ctx: egui::Context,
    layer_textures: HashMap<usize, CachedLayer>,
}

// Custom Debug implementation since TextureHandle carries GPU state
impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("cached_layers", &self.layer_textures.len())
            .finish()
    }
}

impl Renderer {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            layer_textures: HashMap::new(),
        }
    }

    /// Draw the visible layers, bottom to top, into `rect`, which shows a
    /// canvas of `size` pixels.
    pub fn render(&mut self, painter: &Painter, rect: Rect, document: &Document, size: [u32; 2]) {
        painter.rect_filled(rect, 0.0, CANVAS_BACKGROUND);
        if size[0] == 0 || size[1] == 0 {
            return;
        }

        let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        for (index, layer) in document.layers().iter().enumerate() {
            if !layer.is_visible() {
                continue;
            }
            let texture = self.layer_texture(index, layer, size);
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
    }

    /// Texture of `layer`, re-rendered only when the layer changed since the last upload
    fn layer_texture(&mut self, index: usize, layer: &Layer, size: [u32; 2]) -> TextureHandle {
        if let Some(cached) = self.layer_textures.get(&index) {
            if cached.revision == layer.revision() && cached.size == size {
                return cached.texture.clone();
            }
        }

        let rendered = layer.render(size[0], size[1]);
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [size[0] as usize, size[1] as usize],
            rendered.as_raw(),
        );
        let texture = match self.layer_textures.remove(&index) {
            Some(mut cached) => {
                cached.texture.set(image, TextureOptions::NEAREST);
                cached.texture
            }
            None => self
                .ctx
                .load_texture(format!("layer_{}", index), image, TextureOptions::NEAREST),
        };

        self.layer_textures.insert(
            index,
            CachedLayer {
                revision: layer.revision(),
                size,
                texture: texture.clone(),
            },
        );
        texture
    }

    /// Upload an inked result as a texture for the preview window
    pub fn create_preview_texture(&self, image: &GrayImage, name: &str) -> TextureHandle {
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_gray(size, image.as_raw());
        self.ctx.load_texture(name, color_image, TextureOptions::default())
    }

    #[cfg(test)]
    fn cached_revision(&self, index: usize) -> Option<u64> {
        self.layer_textures.get(&index).map(|cached| cached.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    fn painter(ctx: &egui::Context, rect: Rect) -> Painter {
        egui::Painter::new(ctx.clone(), egui::LayerId::background(), rect)
    }

    #[test]
    fn test_render_basics() {
        let ctx = egui::Context::default();
        let mut renderer = Renderer::new(ctx.clone());
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 100.0));

        let mut document = Document::new(2);
        document.active_layer_mut().begin_stroke(Pos2::new(10.0, 10.0));
        document.active_layer_mut().extend_stroke(Pos2::new(50.0, 50.0));
        renderer.render(&painter(&ctx, rect), rect, &document, [100, 100]);

        assert!(renderer.cached_revision(0).is_some());
        assert!(renderer.cached_revision(1).is_some());
    }

    #[test]
    fn test_layer_textures_follow_revisions() {
        let ctx = egui::Context::default();
        let mut renderer = Renderer::new(ctx.clone());
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(40.0, 30.0));
        let mut document = Document::new(2);

        renderer.render(&painter(&ctx, rect), rect, &document, [40, 30]);
        let first = renderer.cached_revision(0);

        // Unchanged layers keep their upload
        renderer.render(&painter(&ctx, rect), rect, &document, [40, 30]);
        assert_eq!(renderer.cached_revision(0), first);

        document.active_layer_mut().begin_stroke(Pos2::new(5.0, 5.0));
        renderer.render(&painter(&ctx, rect), rect, &document, [40, 30]);
        assert_eq!(renderer.cached_revision(0), Some(document.layers()[0].revision()));
        assert_ne!(renderer.cached_revision(0), first);
    }

    #[test]
    fn test_hidden_layers_are_not_uploaded() {
        let ctx = egui::Context::default();
        let mut renderer = Renderer::new(ctx.clone());
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(20.0, 20.0));
        let mut document = Document::new(2);
        document.layer_mut(1).unwrap().set_visible(false);

        renderer.render(&painter(&ctx, rect), rect, &document, [20, 20]);
        assert!(renderer.cached_revision(0).is_some());
        assert!(renderer.cached_revision(1).is_none());
    }

    #[test]
    fn test_preview_texture_has_image_size() {
        let ctx = egui::Context::default();
        let renderer = Renderer::new(ctx);
        let image = GrayImage::new(16, 9);
        let texture = renderer.create_preview_texture(&image, "inked_preview");
        assert_eq!(texture.size(), [16, 9]);
    }
}
