//! Debug visualization sinks.
//!
//! The visualize step is an injected capability: the session loop renders
//! through the [`Visualizer`] trait and never branches on a display flag
//! itself. Headless operation uses [`NullVisualizer`]; debugging uses
//! [`SnapshotVisualizer`], which writes one blended PNG per processed frame.
//! Sink failures are reported to the caller but must never abort a session.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::frame::{Frame, Mask};
use crate::protocol::Command;

/// Weight of the original frame in the debug blend.
const FRAME_WEIGHT: f32 = 0.8;
/// Weight of the colourised mask in the debug blend.
const MASK_WEIGHT: f32 = 0.2;

/// Side-effect sink for processed frames. No feedback into the protocol.
pub trait Visualizer {
    fn render(&mut self, frame: &Frame, mask: &Mask, command: Command) -> Result<()>;
}

/// Sink for headless operation. Does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullVisualizer;

impl Visualizer for NullVisualizer {
    fn render(&mut self, _frame: &Frame, _mask: &Mask, _command: Command) -> Result<()> {
        Ok(())
    }
}

/// Writes each processed frame, blended with its detection mask, as a PNG
/// into a directory. The chosen command is embedded in the file name.
#[derive(Debug)]
pub struct SnapshotVisualizer {
    dir: PathBuf,
    frame_index: u64,
}

impl SnapshotVisualizer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frame_index: 0,
        }
    }
}

impl Visualizer for SnapshotVisualizer {
    fn render(&mut self, frame: &Frame, mask: &Mask, command: Command) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create debug frame directory {}", self.dir.display()))?;

        let rgb = blend_rgb(frame, mask);
        let img = image::RgbImage::from_raw(frame.width(), frame.height(), rgb)
            .ok_or_else(|| anyhow!("blended frame has inconsistent geometry"))?;

        let path = self
            .dir
            .join(format!("frame_{:06}_{}.png", self.frame_index, command));
        img.save(&path)
            .with_context(|| format!("write debug frame {}", path.display()))?;
        self.frame_index += 1;
        Ok(())
    }
}

/// Weighted blend of the frame with its mask spread across all channels,
/// returned in RGB order for encoding.
fn blend_rgb(frame: &Frame, mask: &Mask) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.bgr_data().len());
    for (pixel, &m) in frame.bgr_data().chunks_exact(3).zip(mask.data()) {
        let m = f32::from(m) * MASK_WEIGHT;
        let blend = |c: u8| (f32::from(c) * FRAME_WEIGHT + m).round().min(255.0) as u8;
        out.push(blend(pixel[2]));
        out.push(blend(pixel[1]));
        out.push(blend(pixel[0]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_weights_frame_and_mask() {
        let frame = Frame::from_bgr(vec![0, 0, 100, 0, 0, 100], 2, 1).unwrap();
        let mask = Mask::from_raw(vec![255, 0], 2, 1);
        let rgb = blend_rgb(&frame, &mask);
        // Masked pixel: 0.8 * channel + 0.2 * 255.
        assert_eq!(&rgb[..3], &[131, 51, 51]);
        // Unmasked pixel: 0.8 * channel only.
        assert_eq!(&rgb[3..], &[80, 0, 0]);
    }

    #[test]
    fn null_visualizer_always_succeeds() {
        let frame = Frame::from_bgr(vec![0; 3], 1, 1).unwrap();
        let mask = Mask::from_raw(vec![0], 1, 1);
        assert!(NullVisualizer
            .render(&frame, &mask, Command::Idle)
            .is_ok());
    }
}
