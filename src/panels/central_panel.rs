use crate::PaintApp;
use crate::input::{InputHandler, PointerSample};

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::both().show(ui, |ui| {
            let [width, height] = app.context().canvas_size();
            let size = egui::vec2(width as f32, height as f32);
            let (response, painter) = ui.allocate_painter(size, egui::Sense::drag());
            let canvas_rect = response.rect;

            let handler = InputHandler::new(canvas_rect);
            let events = handler.events(PointerSample::from_response(&response));
            InputHandler::apply(&events, app.context_mut());

            app.render_canvas(&painter, canvas_rect);
        });
    });
}
