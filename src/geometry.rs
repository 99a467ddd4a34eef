//! Pure cover/contain fit math shared by every drawing path.

use crate::{
    core::Rect,
    error::{PostweaveError, PostweaveResult},
};

/// Result of [`cover_fit`]: a centered crop of the source whose aspect
/// ratio matches the destination box, plus the box itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub source_rect: Rect,
    pub dest_rect: Rect,
}

/// Result of [`contain_fit`]: the largest centered rectangle inside the
/// destination box that preserves the source aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainFit {
    pub dest_rect: Rect,
}

/// Scale + centered crop so the source fully fills `dst_w × dst_h`.
///
/// If the source is proportionally wider than the box, the crop removes
/// equal amounts from the left and right; otherwise from top and bottom.
pub fn cover_fit(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> PostweaveResult<CoverFit> {
    check_dims(src_w, src_h, dst_w, dst_h)?;

    let src_aspect = src_w / src_h;
    let dst_aspect = dst_w / dst_h;

    let (sx, sy, sw, sh) = if src_aspect > dst_aspect {
        let sh = src_h;
        let sw = src_h * dst_aspect;
        ((src_w - sw) / 2.0, 0.0, sw, sh)
    } else {
        let sw = src_w;
        let sh = src_w / dst_aspect;
        (0.0, (src_h - sh) / 2.0, sw, sh)
    };

    Ok(CoverFit {
        source_rect: Rect::new(sx, sy, sx + sw, sy + sh),
        dest_rect: Rect::new(0.0, 0.0, dst_w, dst_h),
    })
}

/// Like [`cover_fit`], but with the destination box placed at an
/// arbitrary position (a collage slot, a translated transition frame).
pub fn cover_fit_into(src_w: f64, src_h: f64, dest: Rect) -> PostweaveResult<CoverFit> {
    let fit = cover_fit(src_w, src_h, dest.width(), dest.height())?;
    Ok(CoverFit {
        source_rect: fit.source_rect,
        dest_rect: dest,
    })
}

/// Scale so the source fits entirely inside `dst_w × dst_h`, centered on
/// the slack axis. Exactly one axis is fully filled.
pub fn contain_fit(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> PostweaveResult<ContainFit> {
    check_dims(src_w, src_h, dst_w, dst_h)?;

    let src_aspect = src_w / src_h;
    let dst_aspect = dst_w / dst_h;

    let (ox, oy, dw, dh) = if src_aspect > dst_aspect {
        let dw = dst_w;
        let dh = dst_w / src_aspect;
        (0.0, (dst_h - dh) / 2.0, dw, dh)
    } else {
        let dh = dst_h;
        let dw = dst_h * src_aspect;
        ((dst_w - dw) / 2.0, 0.0, dw, dh)
    };

    Ok(ContainFit {
        dest_rect: Rect::new(ox, oy, ox + dw, oy + dh),
    })
}

fn check_dims(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> PostweaveResult<()> {
    for (name, v) in [
        ("src width", src_w),
        ("src height", src_h),
        ("dst width", dst_w),
        ("dst height", dst_h),
    ] {
        if !v.is_finite() || v <= 0.0 {
            return Err(PostweaveError::geometry(format!(
                "{name} must be finite and > 0, got {v}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn cover_crop_matches_dst_aspect_and_is_centered() {
        for (sw, sh, dw, dh) in [
            (4000.0, 3000.0, 1080.0, 1080.0),
            (3000.0, 4000.0, 1080.0, 1080.0),
            (1920.0, 1080.0, 1080.0, 1920.0),
            (100.0, 100.0, 535.0, 530.0),
        ] {
            let fit = cover_fit(sw, sh, dw, dh).unwrap();
            let crop = fit.source_rect;
            assert!(
                (crop.width() / crop.height() - dw / dh).abs() < 1e-6,
                "crop aspect must equal dst aspect"
            );
            // Equal margins on both excluded sides.
            assert!((crop.x0 - (sw - crop.x1)).abs() < EPS);
            assert!((crop.y0 - (sh - crop.y1)).abs() < EPS);
            assert_eq!(fit.dest_rect, Rect::new(0.0, 0.0, dw, dh));
        }
    }

    #[test]
    fn cover_wider_source_crops_sides() {
        let fit = cover_fit(200.0, 100.0, 100.0, 100.0).unwrap();
        assert!((fit.source_rect.x0 - 50.0).abs() < EPS);
        assert!((fit.source_rect.y0 - 0.0).abs() < EPS);
        assert!((fit.source_rect.height() - 100.0).abs() < EPS);
    }

    #[test]
    fn contain_never_exceeds_box_and_fills_one_axis() {
        for (sw, sh, dw, dh) in [
            (4000.0, 3000.0, 1080.0, 1920.0),
            (3000.0, 4000.0, 1200.0, 630.0),
            (500.0, 500.0, 1080.0, 1080.0),
        ] {
            let fit = contain_fit(sw, sh, dw, dh).unwrap();
            let d = fit.dest_rect;
            assert!(d.x0 >= -EPS && d.y0 >= -EPS);
            assert!(d.x1 <= dw + EPS && d.y1 <= dh + EPS);
            let fills_w = (d.width() - dw).abs() < EPS;
            let fills_h = (d.height() - dh).abs() < EPS;
            assert!(fills_w || fills_h);
            // Centered on the slack axis.
            assert!((d.x0 - (dw - d.x1)).abs() < EPS);
            assert!((d.y0 - (dh - d.y1)).abs() < EPS);
        }
    }

    #[test]
    fn contain_wider_source_is_width_bound() {
        let fit = contain_fit(200.0, 100.0, 100.0, 100.0).unwrap();
        assert!((fit.dest_rect.width() - 100.0).abs() < EPS);
        assert!((fit.dest_rect.height() - 50.0).abs() < EPS);
        assert!((fit.dest_rect.y0 - 25.0).abs() < EPS);
    }

    #[test]
    fn degenerate_inputs_fail_instead_of_dividing_by_zero() {
        assert!(cover_fit(0.0, 100.0, 100.0, 100.0).is_err());
        assert!(cover_fit(100.0, 100.0, 100.0, 0.0).is_err());
        assert!(cover_fit(-1.0, 100.0, 100.0, 100.0).is_err());
        assert!(contain_fit(100.0, 0.0, 100.0, 100.0).is_err());
        assert!(contain_fit(100.0, 100.0, f64::NAN, 100.0).is_err());
    }
}
