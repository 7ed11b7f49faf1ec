use crate::PaintApp;

/// One row per layer, top of the stack first: active selector, visibility
/// toggle and opacity slider
pub fn layers_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("layers_panel")
        .resizable(true)
        .default_height(120.0)
        .show(ctx, |ui| {
            ui.heading("Layers");
            egui::ScrollArea::vertical().show(ui, |ui| {
                let count = app.context().document().layer_count();
                for index in (0..count).rev() {
                    layer_row(app, ui, index);
                }
            });
        });
}

fn layer_row(app: &mut PaintApp, ui: &mut egui::Ui, index: usize) {
    let active = app.context().document().active_index() == index;
    let Ok(layer) = app.context().document().layer(index) else {
        return;
    };
    let name = layer.name.clone();
    let mut visible = layer.is_visible();
    let mut opacity = layer.opacity();

    ui.horizontal(|ui| {
        if ui.radio(active, name).clicked() && !active {
            let result = app.context_mut().select_layer(index);
            app.report(result);
        }
        if ui.checkbox(&mut visible, "Visible").changed() {
            let result = app.context_mut().set_layer_visible(index, visible);
            app.report(result);
        }
        let slider = egui::Slider::new(&mut opacity, 0.0..=1.0)
            .step_by(0.05)
            .text("Opacity");
        if ui.add(slider).changed() {
            let result = app.context_mut().set_layer_opacity(index, opacity);
            app.report(result);
        }
    });
}
