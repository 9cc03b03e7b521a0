use ndarray::{Array2, ArrayView2};

/// Catmull-Rom kernel (cubic convolution, a = -0.5)
fn cubic(t: f64) -> f64 {
    let t = t.abs();
    if t <= 1. {
        (1.5 * t - 2.5) * t * t + 1.
    } else if t < 2. {
        ((-0.5 * t + 2.5) * t - 4.) * t + 2.
    } else {
        0.
    }
}

/// Resample an image to `shape` by separable cubic convolution with clamped
/// edges
///
/// This is the high-order interpolation that maps measured fields onto the
/// network training resolution. A same-shape call is the identity.
pub fn zoom(image: &ArrayView2<f32>, shape: (usize, usize)) -> Array2<f32> {
    if image.dim() == shape {
        return image.to_owned();
    }
    let (in_rows, in_cols) = image.dim();
    let (out_rows, out_cols) = shape;
    let scale_r = in_rows as f64 / out_rows as f64;
    let scale_c = in_cols as f64 / out_cols as f64;
    let clamp = |v: i64, n: usize| v.clamp(0, n as i64 - 1) as usize;
    Array2::from_shape_fn(shape, |(r, c)| {
        let src_r = (r as f64 + 0.5) * scale_r - 0.5;
        let src_c = (c as f64 + 0.5) * scale_c - 0.5;
        let (base_r, base_c) = (src_r.floor() as i64, src_c.floor() as i64);
        let mut acc = 0.;
        let mut weight = 0.;
        for dr in -1..=2i64 {
            let wr = cubic(src_r - (base_r + dr) as f64);
            for dc in -1..=2i64 {
                let wc = cubic(src_c - (base_c + dc) as f64);
                let value =
                    image[[clamp(base_r + dr, in_rows), clamp(base_c + dc, in_cols)]] as f64;
                acc += wr * wc * value;
                weight += wr * wc;
            }
        }
        (acc / weight) as f32
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_shape_is_identity() {
        let image = Array2::from_shape_fn((17, 9), |(r, c)| (r * 9 + c) as f32);
        assert_eq!(zoom(&image.view(), (17, 9)), image);
    }

    #[test]
    fn constant_image_stays_constant() {
        let image = Array2::from_elem((32, 48), 2.5);
        let zoomed = zoom(&image.view(), (256, 256));
        for &v in zoomed.iter() {
            assert!((v - 2.5).abs() < 1e-5);
        }
    }

    #[test]
    fn linear_ramp_is_preserved_away_from_edges() {
        let image = Array2::from_shape_fn((64, 64), |(r, _)| r as f32);
        let zoomed = zoom(&image.view(), (128, 128));
        // interior of a doubled linear ramp advances by half steps
        for r in 8..120 {
            let expected = (r as f32 + 0.5) * 0.5 - 0.5;
            assert!(
                (zoomed[[r, 64]] - expected).abs() < 1e-3,
                "row {}: {} vs {}",
                r,
                zoomed[[r, 64]],
                expected
            );
        }
    }

    #[test]
    fn downsampling_keeps_the_range() {
        let image = Array2::from_shape_fn((128, 128), |(r, c)| ((r + c) % 17) as f32);
        let zoomed = zoom(&image.view(), (32, 32));
        let min = zoomed.fold(f32::INFINITY, |m, &v| m.min(v));
        let max = zoomed.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        assert!(min >= -2. && max <= 18.);
    }
}
