use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::DecodedFrame;
use crate::foundation::core::{Affine, FrameIndex, Rect, Rgba8Premul, SurfaceSize, Vec2};
use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

/// A snapshot of the surface as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Convert to straight alpha when the data is premultiplied.
    pub fn into_straight(mut self) -> Self {
        if self.premultiplied {
            unpremultiply_in_place(&mut self.data);
            self.premultiplied = false;
        }
        self
    }
}

/// Placement of an image scaled to cover a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the image.
    pub scale: f64,
    /// Top-left corner of the scaled image in surface space.
    pub offset: Vec2,
}

impl CoverFit {
    /// Scale by `max(sw/iw, sh/ih)` and center, so the image fills the surface and overflow is
    /// cropped evenly on both sides.
    pub fn compute(surface: SurfaceSize, image_width: u32, image_height: u32) -> Option<Self> {
        if surface.is_empty() || image_width == 0 || image_height == 0 {
            return None;
        }
        let (sw, sh) = (f64::from(surface.width), f64::from(surface.height));
        let (iw, ih) = (f64::from(image_width), f64::from(image_height));
        let scale = (sw / iw).max(sh / ih);
        let offset = Vec2::new((sw - iw * scale) / 2.0, (sh - ih * scale) / 2.0);
        Some(Self { scale, offset })
    }

    /// Image-space to surface-space transform.
    pub fn transform(self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Destination rectangle of the scaled image in surface space.
    pub fn dest_rect(self, image_width: u32, image_height: u32) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.offset.x + f64::from(image_width) * self.scale,
            self.offset.y + f64::from(image_height) * self.scale,
        )
    }
}

/// CPU drawing surface sized to the host container's rendered box.
///
/// A zero-area surface holds no pixmap and every draw on it is a no-op.
pub struct Surface {
    size: SurfaceSize,
    pixmap: Option<vello_cpu::Pixmap>,
    clear_rgba: [u8; 4],
    paint_cache: HashMap<FrameIndex, vello_cpu::Image>,
    last_drawn: Option<FrameIndex>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("size", &self.size)
            .field("has_pixmap", &self.pixmap.is_some())
            .field("cached_paints", &self.paint_cache.len())
            .field("last_drawn", &self.last_drawn)
            .finish()
    }
}

impl Surface {
    /// Create an unsized surface that clears to the straight-alpha colour `clear_rgba`.
    pub fn new(clear_rgba: [u8; 4]) -> Self {
        Self {
            size: SurfaceSize::default(),
            pixmap: None,
            clear_rgba,
            paint_cache: HashMap::new(),
            last_drawn: None,
        }
    }

    /// Current pixel size.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Frame most recently painted, if any.
    pub fn last_drawn(&self) -> Option<FrameIndex> {
        self.last_drawn
    }

    /// Match the surface to `size`. Reallocation discards the pixels, so the caller repaints.
    ///
    /// Returns `true` when the size changed.
    pub fn resize(&mut self, size: SurfaceSize) -> ScrollSeqResult<bool> {
        if size == self.size && (self.pixmap.is_some() || size.is_empty()) {
            return Ok(false);
        }
        if size.is_empty() {
            self.pixmap = None;
        } else {
            let (w, h) = surface_dims_u16(size)?;
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            clear_pixmap(&mut pixmap, self.clear_premul());
            self.pixmap = Some(pixmap);
        }
        tracing::debug!(width = size.width, height = size.height, "surface resized");
        self.size = size;
        Ok(true)
    }

    /// Clear and paint `frame` cover-fit. Returns `false` when the surface has no area.
    pub fn draw(&mut self, index: FrameIndex, frame: &DecodedFrame) -> ScrollSeqResult<bool> {
        let Some(fit) = CoverFit::compute(self.size, frame.width, frame.height) else {
            return Ok(false);
        };
        let paint = self.paint_for(index, frame)?;
        let clear = self.clear_premul();
        let [r, g, b, a] = self.clear_rgba;
        let Some(pixmap) = self.pixmap.as_mut() else {
            return Ok(false);
        };
        let (w, h) = (pixmap.width(), pixmap.height());

        clear_pixmap(pixmap, clear);
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        ctx.set_transform(affine_to_cpu(fit.transform()));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(frame.width),
            f64::from(frame.height),
        ));
        ctx.flush();
        ctx.render_to_pixmap(pixmap);

        self.last_drawn = Some(index);
        Ok(true)
    }

    /// Premultiplied RGBA8 of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let pixmap = self.pixmap.as_ref()?;
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = (y as usize * self.size.width as usize + x as usize) * 4;
        let data = pixmap.data_as_u8_slice();
        Some([data[i], data[i + 1], data[i + 2], data[i + 3]])
    }

    /// Copy of the current pixels, `None` for a zero-area surface.
    pub fn snapshot(&self) -> Option<FrameRGBA> {
        let pixmap = self.pixmap.as_ref()?;
        Some(FrameRGBA {
            width: self.size.width,
            height: self.size.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    /// Drop the pixmap and every cached paint.
    pub fn release(&mut self) {
        self.pixmap = None;
        self.paint_cache.clear();
        self.size = SurfaceSize::default();
        self.last_drawn = None;
    }

    fn clear_premul(&self) -> [u8; 4] {
        let [r, g, b, a] = self.clear_rgba;
        Rgba8Premul::from_straight_rgba(r, g, b, a).to_array()
    }

    fn paint_for(
        &mut self,
        index: FrameIndex,
        frame: &DecodedFrame,
    ) -> ScrollSeqResult<vello_cpu::Image> {
        if let Some(paint) = self.paint_cache.get(&index) {
            return Ok(paint.clone());
        }
        let pixmap =
            image_premul_bytes_to_pixmap(frame.rgba8_premul.as_slice(), frame.width, frame.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.paint_cache.insert(index, paint.clone());
        Ok(paint)
    }
}

fn surface_dims_u16(size: SurfaceSize) -> ScrollSeqResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| ScrollSeqError::render("surface width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| ScrollSeqError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ScrollSeqResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ScrollSeqError::render("frame width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ScrollSeqError::render("frame height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ScrollSeqError::render("decoded frame byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
