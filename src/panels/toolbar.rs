use crate::PaintApp;
use crate::app::Status;

pub fn toolbar(app: &mut PaintApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            if ui.selectable_label(app.show_color_picker(), "Color").clicked() {
                app.toggle_color_picker();
            }

            ui.separator();

            ui.label("Brush Size");
            let range = app.context().config().brush_range();
            let mut width = app.context().brush_width();
            if ui.add(egui::Slider::new(&mut width, range)).changed() {
                app.context_mut().set_brush_width(width);
            }

            ui.separator();

            if ui.button("Clear Layer").clicked() {
                app.clear_active_layer();
            }
            if ui.button("AI Ink").clicked() {
                app.run_stylize();
            }
            if ui.button("Save").clicked() {
                app.save_project();
            }

            match app.status() {
                Some(Status::Info(message)) => {
                    ui.label(message);
                }
                Some(Status::Error(message)) => {
                    ui.colored_label(ui.visuals().error_fg_color, message);
                }
                None => {}
            }
        });

        if app.show_color_picker() {
            ui.separator();
            let mut color = app.context().color();
            if egui::color_picker::color_picker_color32(
                ui,
                &mut color,
                egui::color_picker::Alpha::OnlyBlend,
            ) {
                app.context_mut().set_color(color);
            }
        }
    });
}
