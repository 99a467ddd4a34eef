//! Separable gaussian blur over premultiplied RGBA8, fixed-point Q16
//! weights so results are deterministic across platforms.

use crate::{
    error::{PostweaveError, PostweaveResult},
    surface::Surface,
};

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

pub fn gaussian_blur(surface: &mut Surface, radius: u32, sigma: f32) -> PostweaveResult<()> {
    if radius == 0 {
        return Ok(());
    }
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let (w, h) = (surface.width(), surface.height());
    let mut tmp = vec![0u8; surface.data().len()];

    blur_pass(surface.data(), &mut tmp, w, h, &kernel, Axis::Horizontal);
    let mut out = vec![0u8; surface.data().len()];
    blur_pass(&tmp, &mut out, w, h, &kernel, Axis::Vertical);

    surface.data_mut().copy_from_slice(&out);
    Ok(())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> PostweaveResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PostweaveError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;

    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }

    // Push rounding slack onto the center tap so the kernel sums to 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn blur_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i32 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + d).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + d).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    (((acc + 32768) >> 16).min(255)) as u8
}
