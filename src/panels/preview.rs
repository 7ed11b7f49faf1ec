use crate::PaintApp;

/// Modal window with the last AI Ink result
pub fn ink_preview(app: &mut PaintApp, ctx: &egui::Context) {
    let Some(texture) = app.preview().map(|preview| preview.texture.clone()) else {
        return;
    };

    let max_size = ctx.screen_rect().size() * 0.8;
    let mut open = true;
    egui::Window::new("AI Inked Preview")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.add(egui::Image::new(&texture).max_size(max_size).maintain_aspect_ratio(true));
        });

    if !open {
        app.close_preview();
    }
}
