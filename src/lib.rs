#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod composite;
pub mod config;
pub mod document;
pub mod error;
pub mod ink;
pub mod input;
pub mod layer;
pub mod panels;
pub mod project;
pub mod raster;
pub mod renderer;
pub mod state;
pub mod stroke;

pub use app::PaintApp;
pub use config::{InkSettings, PaintConfig};
pub use document::Document;
pub use error::{PaintError, PaintResult};
pub use ink::{InkOutput, InkPipeline};
pub use input::{InputEvent, InputHandler};
pub use layer::Layer;
pub use project::{ProjectExporter, ProjectMetadata, SavedProject};
pub use renderer::Renderer;
pub use state::EditorContext;
pub use stroke::Stroke;
