//! Pixel primitives backing the red heuristic: HSV conversion, Gaussian
//! smoothing and grayscale morphology.
//!
//! Conventions follow the common 8-bit computer-vision scales so detector
//! output stays compatible with peers tuned against them: hue on 0-180
//! (degrees halved), saturation and value on 0-255.

/// Smoothing kernel size (9x9, applied separably).
pub(crate) const BLUR_KSIZE: usize = 9;

/// Structuring element size for the morphological opening (5x5, all ones).
pub(crate) const MORPH_KSIZE: usize = 5;

/// Convert one BGR pixel to HSV on the 8-bit scales above.
pub(crate) fn bgr_to_hsv(b: u8, g: u8, r: u8) -> (u8, u8, u8) {
    let b = f32::from(b);
    let g = f32::from(g);
    let r = f32::from(r);

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = v - min;

    let s = if v > 0.0 { 255.0 * delta / v } else { 0.0 };

    let h_deg = if delta == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / delta
    } else if v == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h_deg = if h_deg < 0.0 { h_deg + 360.0 } else { h_deg };

    (
        (h_deg / 2.0).round().min(180.0) as u8,
        s.round() as u8,
        v.round() as u8,
    )
}

/// Separable Gaussian blur with sigma derived from the kernel size
/// (0.3 * ((k - 1) / 2 - 1) + 0.8), mirrored borders.
pub(crate) fn gaussian_blur(src: &[u8], width: usize, height: usize) -> Vec<u8> {
    let kernel = gaussian_kernel();
    let radius = (BLUR_KSIZE / 2) as i64;

    // Horizontal pass.
    let mut mid = vec![0f32; src.len()];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0f32;
            for (i, w) in kernel.iter().enumerate() {
                let sx = reflect(x as i64 + i as i64 - radius, width as i64);
                acc += w * f32::from(row[sx]);
            }
            mid[y * width + x] = acc;
        }
    }

    // Vertical pass.
    let mut out = vec![0u8; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0f32;
            for (i, w) in kernel.iter().enumerate() {
                let sy = reflect(y as i64 + i as i64 - radius, height as i64);
                acc += w * mid[sy * width + x];
            }
            out[y * width + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Morphological opening: erosion followed by dilation, both over a
/// MORPH_KSIZE square window clamped at the borders. Removes small isolated
/// responses while preserving larger connected regions.
pub(crate) fn morph_open(src: &[u8], width: usize, height: usize) -> Vec<u8> {
    let eroded = window_filter(src, width, height, u8::min, u8::MAX);
    window_filter(&eroded, width, height, u8::max, u8::MIN)
}

fn window_filter(
    src: &[u8],
    width: usize,
    height: usize,
    fold: fn(u8, u8) -> u8,
    init: u8,
) -> Vec<u8> {
    let radius = MORPH_KSIZE / 2;
    let mut out = vec![0u8; src.len()];
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius).min(height - 1);
        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius).min(width - 1);
            let mut acc = init;
            for wy in y0..=y1 {
                for wx in x0..=x1 {
                    acc = fold(acc, src[wy * width + wx]);
                }
            }
            out[y * width + x] = acc;
        }
    }
    out
}

fn gaussian_kernel() -> [f32; BLUR_KSIZE] {
    let sigma = 0.3 * ((BLUR_KSIZE as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (BLUR_KSIZE / 2) as i32;
    let mut kernel = [0f32; BLUR_KSIZE];
    let mut sum = 0f32;
    for (i, w) in kernel.iter_mut().enumerate() {
        let d = (i as i32 - radius) as f32;
        *w = (-(d * d) / (2.0 * sigma * sigma)).exp();
        sum += *w;
    }
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Mirror an out-of-range coordinate back into [0, len), edge pixel not
/// duplicated. Falls back to clamping for grids smaller than the kernel.
fn reflect(idx: i64, len: i64) -> usize {
    let mut i = idx;
    if i < 0 {
        i = -i;
    }
    if i >= len {
        i = 2 * len - 2 - i;
    }
    i.clamp(0, len - 1) as usize
}
