use std::ops::RangeInclusive;
use std::path::PathBuf;

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Fixed constants of the stylize filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkSettings {
    /// Side of the square Gaussian blur kernel (odd)
    pub blur_kernel: usize,
    /// Side of the neighbourhood used for the adaptive threshold mean (odd)
    pub block_size: usize,
    /// Constant subtracted from the neighbourhood mean
    pub threshold_c: f32,
}

impl Default for InkSettings {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            block_size: 11,
            threshold_c: 2.0,
        }
    }
}

/// Application settings, restored from eframe storage between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PaintConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Number of layers created at startup
    pub layer_count: usize,
    pub default_brush_width: f32,
    pub min_brush_width: f32,
    pub max_brush_width: f32,
    pub default_color: Color32,
    /// Where the stylize routine writes `layer_<i>.png`, `merged.png` and `inked.png`
    pub work_dir: PathBuf,
    /// Where Save writes the project
    pub save_dir: PathBuf,
    pub metadata_file: String,
    pub archive_file: String,
    pub ink: InkSettings,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            layer_count: 3,
            default_brush_width: 2.0,
            min_brush_width: 1.0,
            max_brush_width: 20.0,
            default_color: Color32::BLACK,
            work_dir: PathBuf::from("."),
            save_dir: PathBuf::from("saved"),
            metadata_file: "layers_metadata.json".to_owned(),
            archive_file: "my_project.zip".to_owned(),
            ink: InkSettings::default(),
        }
    }
}

/// Most layers a stored configuration may ask for
pub const MAX_LAYERS: usize = 32;
/// Largest canvas side a stored configuration may ask for
pub const MAX_CANVAS_SIDE: u32 = 8192;
/// Largest blur or threshold neighbourhood a stored configuration may ask for
pub const MAX_FILTER_SIZE: usize = 99;

impl PaintConfig {
    /// Repair values a stored configuration may carry that the editor cannot
    /// work with: an inverted or non-finite brush range, zero or huge layer
    /// counts and canvas sizes, out-of-range filter constants.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let range_ok = self.min_brush_width.is_finite()
            && self.max_brush_width.is_finite()
            && self.min_brush_width > 0.0
            && self.min_brush_width <= self.max_brush_width;
        if !range_ok {
            log::warn!(
                "Invalid brush range {}..={}, using defaults",
                self.min_brush_width,
                self.max_brush_width
            );
            self.min_brush_width = defaults.min_brush_width;
            self.max_brush_width = defaults.max_brush_width;
        }
        if !self.default_brush_width.is_finite() {
            self.default_brush_width = defaults.default_brush_width;
        }
        self.default_brush_width = self.clamp_brush_width(self.default_brush_width);

        self.layer_count = self.layer_count.clamp(1, MAX_LAYERS);
        self.canvas_width = self.canvas_width.clamp(1, MAX_CANVAS_SIDE);
        self.canvas_height = self.canvas_height.clamp(1, MAX_CANVAS_SIDE);

        self.ink.blur_kernel = self.ink.blur_kernel.clamp(1, MAX_FILTER_SIZE);
        self.ink.block_size = self.ink.block_size.clamp(3, MAX_FILTER_SIZE);
        if !self.ink.threshold_c.is_finite() {
            self.ink.threshold_c = defaults.ink.threshold_c;
        }
        self
    }

    pub fn brush_range(&self) -> RangeInclusive<f32> {
        self.min_brush_width..=self.max_brush_width
    }

    /// Clamp a brush width into the configured range
    pub fn clamp_brush_width(&self, width: f32) -> f32 {
        // max/min instead of clamp: never panics on an inverted range
        width.max(self.min_brush_width).min(self.max_brush_width)
    }

    /// Same configuration with every output directory moved under `root`
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.save_dir = root.join(&self.save_dir);
        self.work_dir = root;
        self
    }
}
