//! The output surface: a premultiplied RGBA8 pixel buffer with the
//! handful of drawing operations the compositors need.

use crate::{
    assets::DecodedImage,
    composite::{self, PremulRgba8},
    core::{Color, Rect},
    error::{PostweaveError, PostweaveResult},
    geometry::CoverFit,
};

#[derive(Clone, Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> PostweaveResult<Self> {
        if width == 0 || height == 0 {
            return Err(PostweaveError::geometry("surface width/height must be > 0"));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| PostweaveError::geometry("surface size overflow"))?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        debug_assert!(x < self.width && y < self.height);
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.data[idx..idx + 4];
        [p[0], p[1], p[2], p[3]]
    }

    pub(crate) fn put_pixel(&mut self, x: u32, y: u32, px: PremulRgba8) {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&px);
    }

    /// Over-blends `src` at (x, y); out-of-bounds coordinates are skipped.
    pub(crate) fn blend_pixel(&mut self, x: i64, y: i64, src: PremulRgba8, opacity: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let out = composite::over(self.pixel(x, y), src, opacity);
        self.put_pixel(x, y, out);
    }

    pub fn fill(&mut self, color: Color) {
        let px = color.to_premul();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let px = color.to_premul();
        let opaque = color.a == 255;
        self.for_each_covered(rect, |surface, x, y| {
            if opaque {
                surface.put_pixel(x, y, px);
            } else {
                let out = composite::over(surface.pixel(x, y), px, 1.0);
                surface.put_pixel(x, y, out);
            }
        });
    }

    /// Strokes a border just inside `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, width: f64, color: Color) {
        if width <= 0.0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let w = width.min(rect.width() / 2.0).min(rect.height() / 2.0);
        self.fill_rect(Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + w), color);
        self.fill_rect(Rect::new(rect.x0, rect.y1 - w, rect.x1, rect.y1), color);
        self.fill_rect(Rect::new(rect.x0, rect.y0 + w, rect.x0 + w, rect.y1 - w), color);
        self.fill_rect(Rect::new(rect.x1 - w, rect.y0 + w, rect.x1, rect.y1 - w), color);
    }

    /// Draws `source_rect` of the image into `dest_rect`, bilinear-sampled,
    /// over-blended with a global opacity.
    pub fn draw_image(
        &mut self,
        img: &DecodedImage,
        source_rect: Rect,
        dest_rect: Rect,
        opacity: f32,
    ) {
        self.blit(img, source_rect, dest_rect, None, opacity);
    }

    /// [`Surface::draw_image`] restricted to `clip` (wipe reveals, split
    /// comparisons).
    pub fn draw_image_clipped(
        &mut self,
        img: &DecodedImage,
        source_rect: Rect,
        dest_rect: Rect,
        clip: Rect,
        opacity: f32,
    ) {
        self.blit(img, source_rect, dest_rect, Some(clip), opacity);
    }

    /// Convenience for the ubiquitous cover-fit draw.
    pub fn draw_cover(&mut self, img: &DecodedImage, fit: &CoverFit, opacity: f32) {
        self.draw_image(img, fit.source_rect, fit.dest_rect, opacity);
    }

    fn blit(
        &mut self,
        img: &DecodedImage,
        source_rect: Rect,
        dest_rect: Rect,
        clip: Option<Rect>,
        opacity: f32,
    ) {
        if opacity <= 0.0 || dest_rect.width() <= 0.0 || dest_rect.height() <= 0.0 {
            return;
        }
        if source_rect.width() <= 0.0 || source_rect.height() <= 0.0 {
            return;
        }

        let mut region = dest_rect.intersect(self.bounds());
        if let Some(c) = clip {
            region = region.intersect(c);
        }
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return;
        }

        let sx_per_px = source_rect.width() / dest_rect.width();
        let sy_per_px = source_rect.height() / dest_rect.height();

        let y_start = region.y0.floor() as i64;
        let y_end = region.y1.ceil() as i64;
        let x_start = region.x0.floor() as i64;
        let x_end = region.x1.ceil() as i64;

        for py in y_start..y_end {
            let cy = py as f64 + 0.5;
            if cy < region.y0 || cy > region.y1 {
                continue;
            }
            let v = source_rect.y0 + (cy - dest_rect.y0) * sy_per_px;
            for px in x_start..x_end {
                let cx = px as f64 + 0.5;
                if cx < region.x0 || cx > region.x1 {
                    continue;
                }
                let u = source_rect.x0 + (cx - dest_rect.x0) * sx_per_px;
                let sample = sample_bilinear(img, u, v);
                self.blend_pixel(px, py, sample, opacity);
            }
        }
    }

    fn for_each_covered(&mut self, rect: Rect, mut f: impl FnMut(&mut Self, u32, u32)) {
        let region = rect.intersect(self.bounds());
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return;
        }
        let y_start = region.y0.floor().max(0.0) as u32;
        let y_end = (region.y1.ceil() as i64).clamp(0, i64::from(self.height)) as u32;
        let x_start = region.x0.floor().max(0.0) as u32;
        let x_end = (region.x1.ceil() as i64).clamp(0, i64::from(self.width)) as u32;

        for y in y_start..y_end {
            let cy = f64::from(y) + 0.5;
            if cy < region.y0 || cy > region.y1 {
                continue;
            }
            for x in x_start..x_end {
                let cx = f64::from(x) + 0.5;
                if cx < region.x0 || cx > region.x1 {
                    continue;
                }
                f(self, x, y);
            }
        }
    }

    /// Over-composites an equally-sized surface onto this one.
    pub fn over_surface(&mut self, src: &Surface, opacity: f32) -> PostweaveResult<()> {
        if src.width != self.width || src.height != self.height {
            return Err(PostweaveError::geometry(
                "over_surface expects equal surface dimensions",
            ));
        }
        for (d, s) in self
            .data
            .chunks_exact_mut(4)
            .zip(src.data.chunks_exact(4))
        {
            let out = composite::over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
            d.copy_from_slice(&out);
        }
        Ok(())
    }

    /// Straight-alpha copy for the export adapters.
    pub fn to_rgba_image(&self) -> PostweaveResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        for px in straight.chunks_exact_mut(4) {
            let out = composite::unpremultiply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| PostweaveError::encode("surface buffer length mismatch"))
    }
}

/// Bilinear sample at pixel-space coordinates (u, v), edge-clamped.
fn sample_bilinear(img: &DecodedImage, u: f64, v: f64) -> PremulRgba8 {
    let su = u - 0.5;
    let sv = v - 0.5;
    let x0 = su.floor();
    let y0 = sv.floor();
    let fx = (su - x0) as f32;
    let fy = (sv - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = img.fetch(x0, y0);
    let p10 = img.fetch(x0 + 1, y0);
    let p01 = img.fetch(x0, y0 + 1);
    let p11 = img.fetch(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f32::from(p00[c]) * (1.0 - fx) + f32::from(p10[c]) * fx;
        let bot = f32::from(p01[c]) * (1.0 - fx) + f32::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bot * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::cover_fit_into;

    #[test]
    fn new_rejects_zero_dims() {
        assert!(Surface::new(0, 10).is_err());
        assert!(Surface::new(10, 0).is_err());
    }

    #[test]
    fn fill_and_pixel_roundtrip() {
        let mut s = Surface::new(4, 4).unwrap();
        s.fill(Color::opaque(10, 20, 30));
        assert_eq!(s.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(s.pixel(3, 3), [10, 20, 30, 255]);
    }

    #[test]
    fn fill_rect_covers_only_its_pixels() {
        let mut s = Surface::new(4, 4).unwrap();
        s.fill(Color::BLACK);
        s.fill_rect(Rect::new(1.0, 1.0, 3.0, 3.0), Color::WHITE);
        assert_eq!(s.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(s.pixel(1, 1), [255, 255, 255, 255]);
        assert_eq!(s.pixel(2, 2), [255, 255, 255, 255]);
        assert_eq!(s.pixel(3, 3), [0, 0, 0, 255]);
    }

    #[test]
    fn draw_image_fills_dest_with_solid_color() {
        let img = DecodedImage::solid(10, 10, Color::opaque(200, 0, 0)).unwrap();
        let mut s = Surface::new(8, 8).unwrap();
        s.fill(Color::BLACK);
        let fit = cover_fit_into(10.0, 10.0, Rect::new(2.0, 2.0, 6.0, 6.0)).unwrap();
        s.draw_cover(&img, &fit, 1.0);
        assert_eq!(s.pixel(4, 4), [200, 0, 0, 255]);
        assert_eq!(s.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(s.pixel(7, 7), [0, 0, 0, 255]);
    }

    #[test]
    fn clipped_draw_stays_inside_clip() {
        let img = DecodedImage::solid(10, 10, Color::opaque(0, 200, 0)).unwrap();
        let mut s = Surface::new(10, 10).unwrap();
        s.fill(Color::BLACK);
        s.draw_image_clipped(
            &img,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 5.0, 10.0),
            1.0,
        );
        assert_eq!(s.pixel(2, 5), [0, 200, 0, 255]);
        assert_eq!(s.pixel(7, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn offscreen_dest_is_clipped_not_wrapped() {
        let img = DecodedImage::solid(4, 4, Color::WHITE).unwrap();
        let mut s = Surface::new(4, 4).unwrap();
        s.fill(Color::BLACK);
        // Mostly off the left edge.
        s.draw_image(
            &img,
            Rect::new(0.0, 0.0, 4.0, 4.0),
            Rect::new(-3.0, 0.0, 1.0, 4.0),
            1.0,
        );
        assert_eq!(s.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(s.pixel(1, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn stroke_rect_leaves_interior_untouched() {
        let mut s = Surface::new(10, 10).unwrap();
        s.fill(Color::BLACK);
        s.stroke_rect(Rect::new(1.0, 1.0, 9.0, 9.0), 2.0, Color::WHITE);
        assert_eq!(s.pixel(1, 1), [255, 255, 255, 255]);
        assert_eq!(s.pixel(2, 5), [255, 255, 255, 255]);
        assert_eq!(s.pixel(5, 5), [0, 0, 0, 255]);
        assert_eq!(s.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn to_rgba_image_unpremultiplies() {
        let mut s = Surface::new(1, 1).unwrap();
        s.put_pixel(0, 0, [128, 0, 128, 128]);
        let img = s.to_rgba_image().unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 255, 128]);
    }
}
