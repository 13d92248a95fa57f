//! Red-region detector.
//!
//! Fixed colour-segmentation heuristic, kept bit-for-bit faithful to the
//! peer's tuning:
//!
//! 1. Convert the BGR frame to HSV (hue 0-180, saturation/value 0-255).
//! 2. Mark pixels inside H [0,10] or [170,180], S [120,255], V [70,255];
//!    the two hue bands cover red across the wrap-around boundary.
//! 3. Smooth the mask with a 9x9 Gaussian blur to suppress speckle.
//! 4. Apply a morphological opening with a 5x5 all-ones element.
//! 5. Compare the nonzero ratio of the processed mask against the
//!    configured threshold (inclusive).

mod ops;

use crate::frame::{Frame, Mask};
use ops::{bgr_to_hsv, gaussian_blur, morph_open};

const HUE_LOW_MAX: u8 = 10;
const HUE_HIGH_MIN: u8 = 170;
const HUE_HIGH_MAX: u8 = 180;
const SAT_MIN: u8 = 120;
const VAL_MIN: u8 = 70;

/// Outcome of running the heuristic on one frame.
#[derive(Clone, Debug)]
pub struct Detection {
    /// True when the red-area ratio reaches the configured threshold.
    pub has_red: bool,
    /// Fraction of mask pixels left nonzero after smoothing and opening.
    pub red_ratio: f64,
    /// Processed mask, kept only for visualization.
    pub mask: Mask,
}

/// Detector configured with the minimum red-area ratio.
#[derive(Clone, Debug)]
pub struct RedDetector {
    min_red_ratio: f64,
}

impl RedDetector {
    pub fn new(min_red_ratio: f64) -> Self {
        Self { min_red_ratio }
    }

    /// Run the heuristic. Never fails: the codec guarantees the frame is a
    /// well-formed, non-empty grid before it reaches this stage.
    pub fn detect(&self, frame: &Frame) -> Detection {
        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let mut mask = vec![0u8; frame.pixel_count()];
        for (masked, pixel) in mask.iter_mut().zip(frame.bgr_data().chunks_exact(3)) {
            let (h, s, v) = bgr_to_hsv(pixel[0], pixel[1], pixel[2]);
            if in_red_range(h, s, v) {
                *masked = 255;
            }
        }

        let mask = gaussian_blur(&mask, width, height);
        let mask = morph_open(&mask, width, height);
        let mask = Mask::from_raw(mask, frame.width(), frame.height());

        let red_ratio = mask.nonzero_ratio();
        Detection {
            has_red: red_ratio >= self.min_red_ratio,
            red_ratio,
            mask,
        }
    }
}

fn in_red_range(h: u8, s: u8, v: u8) -> bool {
    let hue_matches = h <= HUE_LOW_MAX || (HUE_HIGH_MIN..=HUE_HIGH_MAX).contains(&h);
    hue_matches && s >= SAT_MIN && v >= VAL_MIN
}
