use ndarray::{Array4, Axis};
use rand::seq::SliceRandom;

use crate::{Labels, Sampler};

/// Per-sample replication multiplier of the augmentation stage
pub const AUGMENTATION_FACTOR: usize = 16;

/// Shuffle the dataset and replicate every sample [`AUGMENTATION_FACTOR`]
/// times
///
/// A single joint permutation reorders the samples and all three label arrays
/// identically, then each sample and each label value is repeated
/// contiguously. Alignment between a field image and its (n2, Isat, alpha)
/// labels is preserved through both steps; the `*_levels` counts pass through
/// untouched. The per-copy noise (fringes at random rotations, warp, shot
/// noise) is applied by the generation loop that consumes this output, one
/// [`crate::noise`] draw per replicated copy.
///
/// Panics if the label arrays are shorter than the dataset leading axis; a
/// dataset/label length mismatch is a corrupt input, not a recoverable state.
pub fn augment(dataset: Array4<f32>, labels: Labels, sampler: &mut Sampler) -> (Array4<f32>, Labels) {
    let mut indices: Vec<usize> = (0..labels.len()).collect();
    indices.shuffle(sampler);

    let replicated: Vec<usize> = indices
        .iter()
        .flat_map(|&index| std::iter::repeat(index).take(AUGMENTATION_FACTOR))
        .collect();

    let augmented = dataset.select(Axis(0), &replicated);
    let labels = Labels {
        n2_levels: labels.n2_levels,
        n2: labels.n2.select(Axis(0), &replicated),
        isat_levels: labels.isat_levels,
        isat: labels.isat.select(Axis(0), &replicated),
        alpha_levels: labels.alpha_levels,
        alpha: labels.alpha.select(Axis(0), &replicated),
    };
    (augmented, labels)
}
