use std::sync::Arc;

use crate::{
    composite::{PremulRgba8, premultiply_rgba8_in_place},
    core::Color,
    error::{PostweaveError, PostweaveResult},
};

/// A decoded raster image: dimensions plus premultiplied RGBA8 pixels.
/// Cheap to clone; the engine only ever reads it.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Builds an image from straight-alpha RGBA8 bytes (premultiplies).
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> PostweaveResult<Self> {
        if width == 0 || height == 0 {
            return Err(PostweaveError::geometry("image width/height must be > 0"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| PostweaveError::geometry("image buffer size overflow"))?;
        if rgba.len() != expected {
            return Err(PostweaveError::validation(
                "image buffer length must be width*height*4",
            ));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// A single-color image. Handy for placeholders and tests.
    pub fn solid(width: u32, height: u32, color: Color) -> PostweaveResult<Self> {
        let px = [color.r, color.g, color.b, color.a];
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| PostweaveError::geometry("image buffer size overflow"))?;
        Self::from_rgba8(width, height, px.repeat(count))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Clamped pixel fetch, used by the samplers.
    pub(crate) fn fetch(&self, x: i64, y: i64) -> PremulRgba8 {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let idx = (y * self.width as usize + x) * 4;
        let p = &self.rgba8_premul[idx..idx + 4];
        [p[0], p[1], p[2], p[3]]
    }
}

/// A caller-owned image plus the id the caller addresses it by (slot
/// assignments, comparison pickers).
#[derive(Clone, Debug)]
pub struct ImageAsset {
    pub id: String,
    pub image: DecodedImage,
}

impl ImageAsset {
    pub fn new(id: impl Into<String>, image: DecodedImage) -> Self {
        Self {
            id: id.into(),
            image,
        }
    }
}

pub fn find_image<'a>(assets: &'a [ImageAsset], id: &str) -> Option<&'a DecodedImage> {
    assets.iter().find(|a| a.id == id).map(|a| &a.image)
}

/// Decodes raw image bytes (PNG/JPEG/WEBP/...) into a [`DecodedImage`].
pub fn decode_image(bytes: &[u8]) -> PostweaveResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PostweaveError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_rgba8(width, height, rgba.into_raw())
}
