//! Straight-alpha compositing and layer flattening.

use image::{Rgba, RgbaImage};

use crate::layer::Layer;

/// Canvas color the flatten starts from: white, fully transparent
pub const FLATTEN_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Porter-Duff "over" for straight (non-premultiplied) alpha.
/// A fully transparent source leaves the destination untouched.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let src_a = src[3] as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let value = (src[channel] as f32 * src_a + dst[channel] as f32 * dst_a * (1.0 - src_a)) / out_a;
        out[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Composite `src` over `dst` in place. Both images must have the same size.
pub fn alpha_composite(dst: &mut RgbaImage, src: &RgbaImage) {
    debug_assert_eq!(dst.dimensions(), src.dimensions());
    for (dst_pixel, src_pixel) in dst.pixels_mut().zip(src.pixels()) {
        *dst_pixel = blend_over(*dst_pixel, *src_pixel);
    }
}

/// Scale every pixel's alpha by `opacity` (clamped to [0, 1])
pub fn apply_opacity(image: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity >= 1.0 {
        return;
    }
    for pixel in image.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
    }
}

/// Composite the visible layers bottom-to-top into one bitmap
pub fn flatten(layers: &[Layer], width: u32, height: u32) -> RgbaImage {
    let mut merged = RgbaImage::from_pixel(width, height, FLATTEN_BACKGROUND);
    for layer in layers.iter().filter(|layer| layer.is_visible()) {
        alpha_composite(&mut merged, &layer.render(width, height));
    }
    merged
}
