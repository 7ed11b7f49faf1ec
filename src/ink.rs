//! The "AI Ink" stylize pass: flatten the visible layers, then turn the
//! result into binary line art with grayscale, Gaussian blur and an inverted
//! Gaussian adaptive threshold.

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma, RgbImage, RgbaImage};

use crate::composite::{FLATTEN_BACKGROUND, alpha_composite};
use crate::config::{InkSettings, PaintConfig};
use crate::document::Document;
use crate::error::{PaintError, PaintResult};

/// Output value of a pixel classified as line art
pub const LINE: u8 = 255;
/// Output value of everything else
pub const BACKGROUND: u8 = 0;

pub const MERGED_FILE: &str = "merged.png";
pub const INKED_FILE: &str = "inked.png";

/// How pixels outside the image are sampled during convolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// `gfedcb|abcdefgh|gfedcba`
    Reflect101,
    /// `aaaaaa|abcdefgh|hhhhhhh`
    Replicate,
}

fn border_index(index: isize, len: usize, mode: BorderMode) -> usize {
    let last = len as isize - 1;
    match mode {
        BorderMode::Replicate => index.clamp(0, last) as usize,
        BorderMode::Reflect101 => {
            if len == 1 {
                return 0;
            }
            let mut i = index;
            while i < 0 || i > last {
                i = if i < 0 { -i } else { 2 * last - i };
            }
            i as usize
        }
    }
}

fn odd_at_least(size: usize, min: usize) -> usize {
    let size = size.max(min);
    if size % 2 == 0 { size + 1 } else { size }
}

/// 1D Gaussian weights summing to 1. A non-positive `sigma` is derived from
/// the kernel size, with the usual fixed binomial taps for sizes up to 7.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let size = odd_at_least(size, 1);
    if sigma <= 0.0 {
        match size {
            1 => return vec![1.0],
            3 => return vec![0.25, 0.5, 0.25],
            5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
            7 => return vec![0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
            _ => {}
        }
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (size / 2) as f32;
    let mut weights: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - center;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for weight in &mut weights {
        *weight /= sum;
    }
    weights
}

/// Separable Gaussian blur of a single-channel image
pub fn gaussian_blur(image: &GrayImage, size: usize, sigma: f32, border: BorderMode) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(size, sigma);
    let radius = (kernel.len() / 2) as isize;
    let (w, h) = (width as usize, height as usize);
    let source = image.as_raw();

    // Horizontal pass, kept in floating point for the vertical pass
    let mut horizontal = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &source[y * w..(y + 1) * w];
        for x in 0..w {
            horizontal[y * w + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sx = border_index(x as isize + k as isize - radius, w, border);
                    row[sx] as f32 * weight
                })
                .sum();
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..h {
        for x in 0..w {
            let value: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sy = border_index(y as isize + k as isize - radius, h, border);
                    horizontal[sy * w + x] * weight
                })
                .sum();
            out.put_pixel(x as u32, y as u32, Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Luma with ITU-R BT.601 weights: `0.299 R + 0.587 G + 0.114 B`
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000;
        Luma([luma as u8])
    })
}

/// Inverted binary adaptive threshold against a Gaussian-weighted local mean.
/// A pixel becomes [`LINE`] when it is at least `c` darker than its
/// neighbourhood, [`BACKGROUND`] otherwise.
pub fn adaptive_threshold_inv(image: &GrayImage, block_size: usize, c: f32) -> GrayImage {
    let block_size = odd_at_least(block_size, 3);
    let mean = gaussian_blur(image, block_size, 0.0, BorderMode::Replicate);
    let delta = c.floor() as i32;

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let diff = image.get_pixel(x, y)[0] as i32 - mean.get_pixel(x, y)[0] as i32;
        Luma([if diff <= -delta { LINE } else { BACKGROUND }])
    })
}

/// The fixed four-step filter: grayscale, blur, adaptive threshold
#[derive(Debug, Clone, Copy, Default)]
pub struct InkPipeline {
    settings: InkSettings,
}

impl InkPipeline {
    pub fn new(settings: InkSettings) -> Self {
        Self { settings }
    }

    pub fn apply(&self, image: &RgbImage) -> GrayImage {
        let gray = to_grayscale(image);
        let blurred = gaussian_blur(&gray, self.settings.blur_kernel, 0.0, BorderMode::Reflect101);
        adaptive_threshold_inv(&blurred, self.settings.block_size, self.settings.threshold_c)
    }
}

/// Number of pixels classified as line art
pub fn line_pixel_count(inked: &GrayImage) -> usize {
    inked.pixels().filter(|p| p[0] == LINE).count()
}

/// Files and pixels produced by [`stylize`]
#[derive(Debug)]
pub struct InkOutput {
    pub layer_paths: Vec<PathBuf>,
    pub merged_path: PathBuf,
    pub inked_path: PathBuf,
    pub inked: GrayImage,
}

fn layer_file_name(index: usize) -> String {
    format!("layer_{}.png", index)
}

/// Flatten the visible layers of `document` into `config.work_dir`, then run
/// the ink pipeline on the written `merged.png` and write `inked.png`.
pub fn stylize(document: &Document, config: &PaintConfig) -> PaintResult<InkOutput> {
    let (width, height) = (config.canvas_width, config.canvas_height);
    if width == 0 || height == 0 {
        return Err(PaintError::EmptyCanvas { width, height });
    }
    fs::create_dir_all(&config.work_dir)?;

    let mut merged = RgbaImage::from_pixel(width, height, FLATTEN_BACKGROUND);
    let mut layer_paths = Vec::new();
    for (index, layer) in document.layers().iter().enumerate() {
        if !layer.is_visible() {
            continue;
        }
        let rendered = layer.render(width, height);
        let path = config.work_dir.join(layer_file_name(index));
        rendered.save_with_format(&path, ImageFormat::Png)?;
        alpha_composite(&mut merged, &rendered);
        layer_paths.push(path);
    }

    let merged_path = config.work_dir.join(MERGED_FILE);
    merged.save_with_format(&merged_path, ImageFormat::Png)?;

    let inked = ink_file(&merged_path, &InkPipeline::new(config.ink))?;
    let inked_path = config.work_dir.join(INKED_FILE);
    inked.save_with_format(&inked_path, ImageFormat::Png)?;

    log::info!(
        "Inked {} visible layers into {} ({} line pixels)",
        layer_paths.len(),
        inked_path.display(),
        line_pixel_count(&inked)
    );

    Ok(InkOutput {
        layer_paths,
        merged_path,
        inked_path,
        inked,
    })
}

/// Load an image file, dropping any alpha channel, and ink it
pub fn ink_file(path: &Path, pipeline: &InkPipeline) -> PaintResult<GrayImage> {
    let rgb = image::open(path)?.to_rgb8();
    Ok(pipeline.apply(&rgb))
}
