use egui::TextureHandle;

use crate::config::PaintConfig;
use crate::panels;
use crate::renderer::Renderer;
use crate::state::EditorContext;

/// Message shown at the end of the toolbar
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The inked image shown in the modal preview
pub struct InkPreview {
    pub texture: TextureHandle,
}

pub struct PaintApp {
    context: EditorContext,
    renderer: Renderer,
    show_color_picker: bool,
    preview: Option<InkPreview>,
    status: Option<Status>,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous settings (if any).
        let config: PaintConfig = cc
            .storage
            .and_then(|storage| eframe::get_value::<PaintConfig>(storage, eframe::APP_KEY))
            .unwrap_or_default()
            .sanitized();
        log::info!(
            "Starting with {} layers on a {}x{} canvas",
            config.layer_count,
            config.canvas_width,
            config.canvas_height
        );
        Self::with_config(cc.egui_ctx.clone(), config)
    }

    pub fn with_config(ctx: egui::Context, config: PaintConfig) -> Self {
        Self {
            context: EditorContext::new(config),
            renderer: Renderer::new(ctx),
            show_color_picker: false,
            preview: None,
            status: None,
        }
    }

    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.context
    }

    /// Draw the document into the canvas widget
    pub fn render_canvas(&mut self, painter: &egui::Painter, rect: egui::Rect) {
        let size = self.context.canvas_size();
        self.renderer.render(painter, rect, self.context.document(), size);
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn show_color_picker(&self) -> bool {
        self.show_color_picker
    }

    pub fn toggle_color_picker(&mut self) {
        self.show_color_picker = !self.show_color_picker;
    }

    pub fn preview(&self) -> Option<&InkPreview> {
        self.preview.as_ref()
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    /// Run the AI Ink pass and open the preview. Failures end up in the status line.
    pub fn run_stylize(&mut self) {
        match self.context.stylize() {
            Ok(output) => {
                let texture = self.renderer.create_preview_texture(&output.inked, "inked_preview");
                self.preview = Some(InkPreview { texture });
                self.status = Some(Status::Info(format!(
                    "Inked image written to {}",
                    output.inked_path.display()
                )));
            }
            Err(err) => {
                log::error!("AI Ink failed: {}", err);
                self.status = Some(Status::Error(format!("AI Ink failed: {}", err)));
            }
        }
    }

    pub fn save_project(&mut self) {
        match self.context.save_project() {
            Ok(saved) => {
                self.status = Some(Status::Info(format!(
                    "Saved {}",
                    saved.archive_file.display()
                )));
            }
            Err(err) => {
                log::error!("Save failed: {}", err);
                self.status = Some(Status::Error(format!("Save failed: {}", err)));
            }
        }
    }

    pub fn clear_active_layer(&mut self) {
        self.context.clear_active_layer();
    }

    /// Report a failed layer-row action without interrupting the frame
    pub fn report(&mut self, result: crate::error::PaintResult<()>) {
        if let Err(err) = result {
            log::warn!("{}", err);
            self.status = Some(Status::Error(err.to_string()));
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save settings before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self.context.config());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::toolbar(self, ctx);
        panels::layers_panel(self, ctx);
        panels::central_panel(self, ctx);
        panels::ink_preview(self, ctx);
    }
}
