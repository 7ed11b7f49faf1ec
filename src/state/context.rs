//! The application context handed to every UI handler.
//!
//! `EditorContext` owns the layer stack and the configuration. The toolbar,
//! the layer rows and the canvas never touch a [`Layer`](crate::layer::Layer)
//! directly; they call the methods here, which route brush settings to the
//! active layer and per-layer settings to the layer they name.

use egui::{Color32, Pos2};

use crate::config::PaintConfig;
use crate::document::Document;
use crate::error::PaintResult;
use crate::ink::{self, InkOutput};
use crate::project::{ProjectExporter, SavedProject};

#[derive(Debug)]
pub struct EditorContext {
    /// The layer stack being edited
    document: Document,
    config: PaintConfig,
}

impl EditorContext {
    /// `config` is sanitized first, so a damaged stored configuration cannot
    /// leave the editor with an unusable brush range or layer count.
    pub fn new(config: PaintConfig) -> Self {
        let config = config.sanitized();
        Self {
            document: Document::from_config(&config),
            config,
        }
    }

    /// Read-only view of the layer stack
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &PaintConfig {
        &self.config
    }

    pub fn canvas_size(&self) -> [u32; 2] {
        [self.config.canvas_width, self.config.canvas_height]
    }

    pub fn begin_stroke(&mut self, point: Pos2) {
        self.document.active_layer_mut().begin_stroke(point);
    }

    pub fn extend_stroke(&mut self, point: Pos2) {
        self.document.active_layer_mut().extend_stroke(point);
    }

    pub fn end_stroke(&mut self) {
        self.document.active_layer_mut().end_stroke();
    }

    /// Brush color of the active layer
    pub fn color(&self) -> Color32 {
        self.document.active_layer().color()
    }

    pub fn set_color(&mut self, color: Color32) {
        self.document.active_layer_mut().set_color(color);
    }

    /// Brush width of the active layer
    pub fn brush_width(&self) -> f32 {
        self.document.active_layer().brush_width()
    }

    /// Set the active layer's brush width, clamped to the configured range
    pub fn set_brush_width(&mut self, width: f32) {
        let width = self.config.clamp_brush_width(width);
        self.document.active_layer_mut().set_brush_width(width);
    }

    pub fn select_layer(&mut self, index: usize) -> PaintResult<()> {
        self.document.set_active(index)?;
        log::debug!("Active layer is now {}", index);
        Ok(())
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> PaintResult<()> {
        self.document.layer_mut(index)?.set_visible(visible);
        Ok(())
    }

    pub fn set_layer_opacity(&mut self, index: usize, opacity: f32) -> PaintResult<()> {
        self.document.layer_mut(index)?.set_opacity(opacity);
        Ok(())
    }

    pub fn clear_active_layer(&mut self) {
        let layer = self.document.active_layer_mut();
        layer.clear();
        log::info!("Cleared {}", layer.name);
    }

    /// Run the AI Ink pass over the visible layers
    pub fn stylize(&self) -> PaintResult<InkOutput> {
        ink::stylize(&self.document, &self.config)
    }

    /// Write every layer, the metadata and the archive to the save directory
    pub fn save_project(&self) -> PaintResult<SavedProject> {
        ProjectExporter::new(&self.config).save(&self.document)
    }
}
