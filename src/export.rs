//! Still-image export: a rendered surface to encoded bytes, format
//! selected by the caller.

use std::io::Cursor;

use crate::{
    error::{PostweaveError, PostweaveResult},
    events::EventSink,
    surface::Surface,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
        }
    }
}

/// Encodes the surface and notifies the event sink on success.
#[tracing::instrument(skip(surface, events))]
pub fn encode_surface(
    surface: &Surface,
    format: ExportFormat,
    events: &mut dyn EventSink,
) -> PostweaveResult<Vec<u8>> {
    let rgba = surface.to_rgba_image()?;
    let mut bytes = Vec::new();

    let result = match format {
        ExportFormat::Png => image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png),
        ExportFormat::Jpeg => {
            // JPEG carries no alpha; flatten via the straight RGB values.
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            image::DynamicImage::ImageRgb8(rgb)
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        }
        ExportFormat::Webp => image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::WebP),
    };
    result.map_err(|e| PostweaveError::encode(format!("encode {}: {e}", format.extension())))?;

    events.on_export_complete(format);
    Ok(bytes)
}
