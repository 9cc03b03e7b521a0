use ndarray::{s, Array1, Array4};

use crate::{Error, Result};

/// One partition of the sample axis with its aligned labels
#[derive(Debug, Clone)]
pub struct Subset {
    pub data: Array4<f32>,
    pub n2: Array1<f32>,
    pub isat: Array1<f32>,
    pub alpha: Array1<f32>,
}

impl Subset {
    pub fn len(&self) -> usize {
        self.data.shape()[0]
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn section(
    data: &Array4<f32>,
    n2: &Array1<f32>,
    isat: &Array1<f32>,
    alpha: &Array1<f32>,
    range: std::ops::Range<usize>,
) -> Subset {
    Subset {
        data: data.slice(s![range.clone(), .., .., ..]).to_owned(),
        n2: n2.slice(s![range.clone()]).to_owned(),
        isat: isat.slice(s![range.clone()]).to_owned(),
        alpha: alpha.slice(s![range]).to_owned(),
    }
}

/// Deterministic contiguous train/validation/test partition
///
/// The three ratios must sum to 1. Cut points are `floor(N * train_ratio)`
/// and `floor(N * (train_ratio + validation_ratio))`; the slices are
/// order-preserving and disjoint and cover the sample axis exactly once.
/// Nothing is shuffled here: randomize beforehand (see [`crate::augment`])
/// if an unbiased split is wanted.
#[allow(clippy::too_many_arguments)]
pub fn split(
    data: &Array4<f32>,
    n2: &Array1<f32>,
    isat: &Array1<f32>,
    alpha: &Array1<f32>,
    train_ratio: f64,
    validation_ratio: f64,
    test_ratio: f64,
) -> Result<(Subset, Subset, Subset)> {
    let total = train_ratio + validation_ratio + test_ratio;
    if (total - 1.).abs() > 1e-6 {
        return Err(Error::RatioSum(total));
    }
    let samples = data.shape()[0];
    let train_index = (samples as f64 * train_ratio) as usize;
    let validation_index = (samples as f64 * (train_ratio + validation_ratio)) as usize;
    Ok((
        section(data, n2, isat, alpha, 0..train_index),
        section(data, n2, isat, alpha, train_index..validation_index),
        section(data, n2, isat, alpha, validation_index..samples),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{concatenate, Axis};

    fn dataset(n: usize) -> (Array4<f32>, Array1<f32>, Array1<f32>, Array1<f32>) {
        (
            Array4::from_shape_fn((n, 1, 2, 2), |(s, ..)| s as f32),
            Array1::from_shape_fn(n, |i| i as f32),
            Array1::from_shape_fn(n, |i| (i * 2) as f32),
            Array1::from_shape_fn(n, |i| (i * 3) as f32),
        )
    }

    #[test]
    fn sizes_sum_to_the_sample_count() {
        let (data, n2, isat, alpha) = dataset(103);
        let (train, validation, test) =
            split(&data, &n2, &isat, &alpha, 0.8, 0.1, 0.1).unwrap();
        assert_eq!(train.len(), 82);
        assert_eq!(train.len() + validation.len() + test.len(), 103);
    }

    #[test]
    fn concatenation_reconstructs_the_input() {
        let (data, n2, isat, alpha) = dataset(40);
        let (train, validation, test) =
            split(&data, &n2, &isat, &alpha, 0.5, 0.25, 0.25).unwrap();
        let rebuilt = concatenate(
            Axis(0),
            &[train.data.view(), validation.data.view(), test.data.view()],
        )
        .unwrap();
        assert_eq!(rebuilt, data);
        let labels = concatenate(Axis(0), &[train.n2.view(), validation.n2.view(), test.n2.view()])
            .unwrap();
        assert_eq!(labels, n2);
    }

    #[test]
    fn labels_stay_aligned() {
        let (data, n2, isat, alpha) = dataset(20);
        let (_, validation, _) = split(&data, &n2, &isat, &alpha, 0.8, 0.1, 0.1).unwrap();
        for i in 0..validation.len() {
            let sample = validation.data[[i, 0, 0, 0]];
            assert_eq!(validation.n2[i], sample);
            assert_eq!(validation.isat[i], sample * 2.);
            assert_eq!(validation.alpha[i], sample * 3.);
        }
    }

    #[test]
    fn bad_ratios_are_rejected() {
        let (data, n2, isat, alpha) = dataset(10);
        assert!(matches!(
            split(&data, &n2, &isat, &alpha, 0.8, 0.1, 0.2),
            Err(Error::RatioSum(_))
        ));
    }

    #[test]
    fn order_is_preserved_without_shuffling() {
        let (data, n2, isat, alpha) = dataset(10);
        let (train, ..) = split(&data, &n2, &isat, &alpha, 0.8, 0.1, 0.1).unwrap();
        for i in 0..train.len() {
            assert_eq!(train.n2[i], i as f32);
        }
    }
}
