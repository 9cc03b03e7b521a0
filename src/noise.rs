use ndarray::{Array2, ArrayView2};
use num_complex::Complex32;
use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson, Uniform};

use crate::{Error, Result, Sampler};

/// Detector noise model: Poisson shot noise scaled by `0.75 * poisson_lambda`
/// plus Gaussian readout noise of standard deviation `normal_sigma`, both
/// added to the real part of the field only.
///
/// Only the amplitude channel is photon-noise limited on the cameras, so the
/// imaginary part goes through untouched.
pub fn shot_noise(
    beam: &ArrayView2<Complex32>,
    poisson_lambda: f64,
    normal_sigma: f64,
    sampler: &mut Sampler,
) -> Result<Array2<Complex32>> {
    let poisson =
        Poisson::new(poisson_lambda).map_err(|e| Error::NoiseParameter(e.to_string()))?;
    let normal = Normal::new(0., normal_sigma).map_err(|e| Error::NoiseParameter(e.to_string()))?;
    let mut noisy = beam.to_owned();
    // one full array per distribution, in this order, to keep the stream
    // layout reproducible
    for e in noisy.iter_mut() {
        e.re += (poisson.sample(sampler) * poisson_lambda * 0.75) as f32;
    }
    for e in noisy.iter_mut() {
        e.re += normal.sample(sampler) as f32;
    }
    Ok(noisy)
}

/// Overlay a sinusoidal fringe pattern rotated by `angle_degrees`, with
/// exactly `num_lines` full periods along the image diagonal.
///
/// Emulates the interference fringes an imperfect optical setup leaves on
/// measured images and that clean synthetic data lacks.
pub fn line_fringes(
    image: &ArrayView2<f32>,
    num_lines: u32,
    amplitude: f32,
    angle_degrees: f32,
) -> Array2<f32> {
    let (height, width) = image.dim();
    let angle = (angle_degrees as f64).to_radians();
    let (sin, cos) = angle.sin_cos();
    let diagonal = ((width * width + height * height) as f64).sqrt();
    let frequency = num_lines as f64 * 2. * std::f64::consts::PI / diagonal;
    Array2::from_shape_fn((height, width), |(y, x)| {
        let rotated = x as f64 * cos + y as f64 * sin;
        image[[y, x]] + amplitude * (rotated * frequency).sin() as f32
    })
}

/// Randomized elastic warp + salt-and-pepper transform
///
/// Every [`WarpSpeckle::randomized`] call draws a fresh parameterization so
/// repeated calls diversify the augmented copies: the Gaussian smoothing
/// sigma comes from {35, 37, 39, 41} per axis and the impulse density from
/// [0.01, 0.11). The warp fires with probability 0.5 and the speckle with
/// probability 0.2.
#[derive(Debug, Clone)]
pub struct WarpSpeckle {
    kernel_size: usize,
    sigma: (f64, f64),
    alpha: (f64, f64),
    warp_probability: f64,
    speckle_amount: f64,
    speckle_probability: f64,
}

impl WarpSpeckle {
    pub fn randomized(sampler: &mut Sampler) -> Self {
        let sigma = (
            (35 + 2 * sampler.gen_range(0..4usize)) as f64,
            (35 + 2 * sampler.gen_range(0..4usize)) as f64,
        );
        let speckle_amount = Uniform::new(0.01, 0.11).sample(sampler);
        Self {
            kernel_size: 51,
            sigma,
            alpha: (1., 1.),
            warp_probability: 0.5,
            speckle_amount,
            speckle_probability: 0.2,
        }
    }
    pub fn sigma(&self) -> (f64, f64) {
        self.sigma
    }
    pub fn speckle_amount(&self) -> f64 {
        self.speckle_amount
    }
    /// Apply the transform; the warp and speckle branches each draw their own
    /// gate from the sampler, in that order
    pub fn apply(&self, image: &ArrayView2<f32>, sampler: &mut Sampler) -> Array2<f32> {
        let mut out = image.to_owned();
        if sampler.gen::<f64>() < self.warp_probability {
            let warped = self.elastic(&out.view(), sampler);
            out = warped;
        }
        if sampler.gen::<f64>() < self.speckle_probability {
            self.speckle(&mut out, sampler);
        }
        out
    }
    /// Local nonlinear warp: a uniform random displacement field smoothed by
    /// a Gaussian kernel, scaled in half-image units, bilinearly resampled
    /// with zero padding
    fn elastic(&self, image: &ArrayView2<f32>, sampler: &mut Sampler) -> Array2<f32> {
        let (height, width) = image.dim();
        let uniform = Uniform::new_inclusive(-1., 1.);
        let mut dy = Array2::zeros((height, width));
        for d in dy.iter_mut() {
            *d = uniform.sample(sampler);
        }
        let mut dx = Array2::zeros((height, width));
        for d in dx.iter_mut() {
            *d = uniform.sample(sampler);
        }
        let dy = gaussian_blur(&dy.view(), self.kernel_size, self.sigma.0);
        let dx = gaussian_blur(&dx.view(), self.kernel_size, self.sigma.1);
        let scale_y = self.alpha.0 * (height.saturating_sub(1)) as f64 / 2.;
        let scale_x = self.alpha.1 * (width.saturating_sub(1)) as f64 / 2.;
        Array2::from_shape_fn((height, width), |(y, x)| {
            let src_y = y as f64 + dy[[y, x]] * scale_y;
            let src_x = x as f64 + dx[[y, x]] * scale_x;
            bilinear(image, src_y, src_x)
        })
    }
    /// Impulse noise: each pixel is replaced by 1 (salt) or 0 (pepper) with
    /// equal odds at the drawn density
    fn speckle(&self, image: &mut Array2<f32>, sampler: &mut Sampler) {
        for v in image.iter_mut() {
            if sampler.gen::<f64>() < self.speckle_amount {
                *v = if sampler.gen_bool(0.5) { 1. } else { 0. };
            }
        }
    }
}

fn bilinear(image: &ArrayView2<f32>, y: f64, x: f64) -> f32 {
    let (height, width) = image.dim();
    let at = |r: i64, c: i64| -> f64 {
        if r < 0 || c < 0 || r >= height as i64 || c >= width as i64 {
            0.
        } else {
            image[[r as usize, c as usize]] as f64
        }
    };
    let (y0, x0) = (y.floor(), x.floor());
    let (fy, fx) = (y - y0, x - x0);
    let (r, c) = (y0 as i64, x0 as i64);
    let top = at(r, c) * (1. - fx) + at(r, c + 1) * fx;
    let bottom = at(r + 1, c) * (1. - fx) + at(r + 1, c + 1) * fx;
    (top * (1. - fy) + bottom * fy) as f32
}

/// Separable Gaussian blur with replicated borders
fn gaussian_blur(image: &ArrayView2<f64>, kernel_size: usize, sigma: f64) -> Array2<f64> {
    let half = (kernel_size / 2) as i64;
    let kernel: Vec<f64> = (-half..=half)
        .map(|k| (-(k * k) as f64 / (2. * sigma * sigma)).exp())
        .collect();
    let weight: f64 = kernel.iter().sum();
    let (height, width) = image.dim();
    let clamp = |v: i64, n: usize| v.clamp(0, n as i64 - 1) as usize;
    let mut rows = Array2::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.;
            for (i, k) in kernel.iter().enumerate() {
                acc += k * image[[y, clamp(x as i64 + i as i64 - half, width)]];
            }
            rows[[y, x]] = acc / weight;
        }
    }
    let mut out = Array2::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.;
            for (i, k) in kernel.iter().enumerate() {
                acc += k * rows[[clamp(y as i64 + i as i64 - half, height), x]];
            }
            out[[y, x]] = acc / weight;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn shot_noise_leaves_imaginary_part_untouched() {
        let beam = Array2::from_elem((16, 16), Complex32::new(1., -0.5));
        let mut sampler = Sampler::from_seed(10);
        let noisy = shot_noise(&beam.view(), 0.1, 0.01, &mut sampler).unwrap();
        for (clean, dirty) in beam.iter().zip(noisy.iter()) {
            assert_eq!(clean.im, dirty.im);
        }
        let perturbed = beam
            .iter()
            .zip(noisy.iter())
            .filter(|(clean, dirty)| clean.re != dirty.re)
            .count();
        assert!(perturbed > beam.len() / 2);
    }

    #[test]
    fn shot_noise_is_reproducible() {
        let beam = Array2::from_elem((8, 8), Complex32::new(2., 0.));
        let a = shot_noise(&beam.view(), 0.5, 0.05, &mut Sampler::from_seed(10)).unwrap();
        let b = shot_noise(&beam.view(), 0.5, 0.05, &mut Sampler::from_seed(10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn shot_noise_rejects_bad_lambda() {
        let beam = Array2::from_elem((2, 2), Complex32::new(1., 0.));
        let mut sampler = Sampler::from_seed(10);
        assert!(matches!(
            shot_noise(&beam.view(), -1., 0.01, &mut sampler),
            Err(Error::NoiseParameter(_))
        ));
    }

    fn row_zero_crossings(num_lines: u32, size: usize) -> usize {
        let image = Array2::zeros((size, size));
        let fringed = line_fringes(&image.view(), num_lines, 1., 0.);
        fringed
            .row(0)
            .windows(2)
            .into_iter()
            .filter(|pair| pair[0] * pair[1] < 0.)
            .count()
    }

    #[test]
    fn fringe_periods_span_the_diagonal() {
        // at angle 0 the pattern along a row is sin(x * 2 pi k / diagonal);
        // over the row it crosses zero k * sqrt(2) * (size - 1) / size times
        let size = 256usize;
        for k in [1u32, 50, 100] {
            let crossings = row_zero_crossings(k, size) as f64;
            let expected = k as f64 * (size - 1) as f64 * 2.
                / ((2 * size * size) as f64).sqrt();
            assert!(
                (crossings - expected).abs() <= 2.,
                "k = {}: {} crossings, expected about {:.1}",
                k,
                crossings,
                expected
            );
        }
    }

    #[test]
    fn fringes_average_to_the_input() {
        let image = Array2::from_elem((64, 64), 3.);
        let fringed = line_fringes(&image.view(), 10, 0.5, 30.);
        let mean = fringed.sum() / fringed.len() as f32;
        assert!((mean - 3.).abs() < 0.05);
        let max = fringed.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        assert!(max <= 3.5 + 1e-6);
    }

    #[test]
    fn randomized_parameters_stay_in_bounds() {
        let mut sampler = Sampler::from_seed(10);
        for _ in 0..64 {
            let transform = WarpSpeckle::randomized(&mut sampler);
            let (sy, sx) = transform.sigma();
            for s in [sy, sx] {
                assert!([35., 37., 39., 41.].contains(&s));
            }
            assert!(transform.speckle_amount() >= 0.01);
            assert!(transform.speckle_amount() < 0.11);
        }
    }

    #[test]
    fn repeated_draws_differ() {
        let mut sampler = Sampler::from_seed(10);
        let a = WarpSpeckle::randomized(&mut sampler);
        let draws: Vec<f64> = (0..16)
            .map(|_| WarpSpeckle::randomized(&mut sampler).speckle_amount())
            .collect();
        assert!(draws.iter().any(|&d| d != a.speckle_amount()));
    }

    #[test]
    fn apply_is_reproducible() {
        let image = Array2::from_shape_fn((32, 32), |(y, x)| (y * 32 + x) as f32 / 1024.);
        let run = |seed: u64| {
            let mut sampler = Sampler::from_seed(seed);
            let transform = WarpSpeckle::randomized(&mut sampler);
            transform.apply(&image.view(), &mut sampler)
        };
        assert_eq!(run(10), run(10));
    }
}
