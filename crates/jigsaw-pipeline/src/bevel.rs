//! Simulated 3D bevel.
//!
//! The piece coverage mask is softened with a Gaussian blur and sampled
//! at a diagonal offset. Where the pixel diagonally below-right is
//! outside the piece, the pixel is on the bottom-right inner rim and gets
//! darkened; where the pixel diagonally above-left is outside, it is on
//! the top-left rim and gets lightened. Effects are composited
//! source-atop: color changes, alpha never does.

use image::{GrayImage, Luma};

use crate::types::{BevelStyle, RgbaImage};

/// Gaussian blur of a coverage mask.
///
/// Non-positive sigma values return the mask unchanged, since
/// `imageproc`'s underlying function panics on `sigma <= 0.0`.
#[must_use = "returns the blurred mask"]
pub fn soften(coverage: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return coverage.clone();
    }
    imageproc::filter::gaussian_blur_f32(coverage, sigma)
}

/// Per-pixel shadow and highlight strengths in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rims {
    width: u32,
    shadow: Vec<f32>,
    highlight: Vec<f32>,
}

impl Rims {
    /// Shadow strength at `(x, y)`.
    #[must_use]
    pub fn shadow(&self, x: u32, y: u32) -> f32 {
        self.shadow[self.index(x, y)]
    }

    /// Highlight strength at `(x, y)`.
    #[must_use]
    pub fn highlight(&self, x: u32, y: u32) -> f32 {
        self.highlight[self.index(x, y)]
    }

    const fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Compute the bevel rims for a coverage mask.
///
/// `shadow(p) = A(p) * (1 - B(p + o))` and
/// `highlight(p) = A(p) * (1 - B(p - o))`, where `A` is the coverage,
/// `B` the softened coverage and `o` the diagonal offset rounded to whole
/// pixels. Samples outside the canvas count as uncovered.
#[must_use]
pub fn rims(coverage: &GrayImage, offset: f32, softness: f32) -> Rims {
    let blurred = soften(coverage, softness);
    let (width, height) = coverage.dimensions();
    #[allow(clippy::cast_possible_truncation)]
    let o = offset.round() as i64;

    let sample = |x: i64, y: i64| -> f32 {
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            return 0.0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let Luma([v]) = *blurred.get_pixel(x as u32, y as u32);
        f32::from(v) / 255.0
    };

    let len = width as usize * height as usize;
    let mut shadow = Vec::with_capacity(len);
    let mut highlight = Vec::with_capacity(len);
    for (x, y, Luma([a])) in coverage.enumerate_pixels() {
        let a = f32::from(*a) / 255.0;
        let (x, y) = (i64::from(x), i64::from(y));
        shadow.push(a * (1.0 - sample(x + o, y + o)));
        highlight.push(a * (1.0 - sample(x - o, y - o)));
    }

    Rims {
        width,
        shadow,
        highlight,
    }
}

/// Darken the bottom-right rim and lighten the top-left rim of `image`.
///
/// `coverage` must have the same dimensions as `image`. Alpha is left
/// untouched.
pub fn apply(image: &mut RgbaImage, coverage: &GrayImage, style: &BevelStyle) {
    if !style.enabled {
        return;
    }
    let rims = rims(coverage, style.offset, style.softness);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let shade = rims.shadow(x, y) * style.shadow_opacity;
        let light = rims.highlight(x, y) * style.highlight_opacity;
        if shade <= 0.0 && light <= 0.0 {
            continue;
        }
        for channel in &mut pixel.0[..3] {
            let darkened = f32::from(*channel) * (1.0 - shade);
            let lit = (255.0 - darkened).mul_add(light, darkened);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *channel = lit.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
