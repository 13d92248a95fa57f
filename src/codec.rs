//! Compressed payload to pixel grid.
//!
//! Wraps the `image` decoders so that any malformed payload surfaces as a
//! [`DecodeError`] value rather than a panic or an unrelated fault.

use image::GenericImageView;
use thiserror::Error;

use crate::frame::Frame;

/// Errors raised while decoding a frame payload. Distinct from transport
/// errors: the message arrived intact but its content is not a usable image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty frame payload")]
    EmptyPayload,

    #[error("unsupported or corrupt image payload: {0}")]
    Malformed(#[from] image::ImageError),

    #[error("decoded image has no pixels")]
    ZeroArea,
}

/// Decode a compressed still image (JPEG or PNG) into a BGR frame.
pub fn decode_frame(payload: &[u8]) -> Result<Frame, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let image = image::load_from_memory(payload)?;
    let (width, height) = image.dimensions();

    let rgb = image.into_rgb8();
    let mut data = rgb.into_raw();
    // image hands back RGB; the detector works on BGR ordering.
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }

    Frame::from_bgr(data, width, height).ok_or(DecodeError::ZeroArea)
}
