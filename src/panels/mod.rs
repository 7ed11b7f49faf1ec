mod central_panel;
mod layers_panel;
mod preview;
mod toolbar;

pub use central_panel::central_panel;
pub use layers_panel::layers_panel;
pub use preview::ink_preview;
pub use toolbar::toolbar;
