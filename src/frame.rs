//! Pixel-grid types shared by the codec, the detector and the debug sinks.
//!
//! A `Frame` is one decoded image: interleaved 8-bit BGR, owned by the
//! current session-loop iteration and discarded when the cycle completes.
//! A `Mask` is the single-channel grid the detector produces alongside its
//! boolean signal.

/// One decoded image as an interleaved BGR pixel grid.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Build a frame from interleaved BGR bytes.
    ///
    /// Returns `None` when the grid is zero-sized or `data` does not hold
    /// exactly `width * height * 3` bytes.
    pub fn from_bgr(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if data.len() != width as usize * height as usize * 3 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Interleaved BGR bytes, row-major.
    pub fn bgr_data(&self) -> &[u8] {
        &self.data
    }
}

/// Single-channel grid with the same geometry as the frame it was derived
/// from. Nonzero values mark pixels matching the red heuristic.
#[derive(Clone, Debug)]
pub struct Mask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Mask {
    /// Wrap a raw single-channel buffer. Caller guarantees the geometry.
    pub(crate) fn from_raw(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Fraction of nonzero pixels in [0, 1].
    pub fn nonzero_ratio(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let nonzero = self.data.iter().filter(|&&v| v != 0).count();
        nonzero as f64 / self.data.len() as f64
    }
}
