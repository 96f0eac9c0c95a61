use std::sync::Arc;

use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

/// Largest width or height the CPU rasterizer accepts for a frame.
pub const MAX_FRAME_DIMENSION: u32 = u16::MAX as u32;

/// A decoded frame in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct DecodedFrame {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedFrame {
    /// Check that the frame can be painted: non-zero size within [`MAX_FRAME_DIMENSION`] and a
    /// pixel buffer matching its dimensions.
    pub fn check_drawable(&self) -> ScrollSeqResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ScrollSeqError::decode("image has zero natural size"));
        }
        if self.width > MAX_FRAME_DIMENSION || self.height > MAX_FRAME_DIMENSION {
            return Err(ScrollSeqError::decode(format!(
                "image is {}x{}, larger than the {MAX_FRAME_DIMENSION}px limit",
                self.width, self.height
            )));
        }
        if self.rgba8_premul.len() != self.width as usize * self.height as usize * 4 {
            return Err(ScrollSeqError::decode("decoded frame byte length mismatch"));
        }
        Ok(())
    }
}

/// Decode encoded image bytes (any format enabled in `image`) into a [`DecodedFrame`].
pub fn decode_frame(bytes: &[u8]) -> ScrollSeqResult<DecodedFrame> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ScrollSeqError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    let frame = DecodedFrame {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    };
    frame.check_drawable()?;
    Ok(frame)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
