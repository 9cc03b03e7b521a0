use ndarray::{Array2, Array3, Array4, ArrayViewMut2, Axis};

/// Rescale one spatial slice to [0, 1] in place: subtract the minimum, then
/// divide by the maximum of the shifted values.
///
/// A zero-range slice divides by zero and floods the slice with non-finite
/// values; the network was trained against unguarded tensors so this stays a
/// caller precondition.
fn rescale(mut slab: ArrayViewMut2<f32>) {
    let min = slab.fold(f32::INFINITY, |m, &v| m.min(v));
    slab.mapv_inplace(|v| v - min);
    let max = slab.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    slab.mapv_inplace(|v| v / max);
}

/// Rescale a single image to [0, 1]
pub fn normalize(mut image: Array2<f32>) -> Array2<f32> {
    rescale(image.view_mut());
    image
}

/// Rescale a batch of images to [0, 1], one frame at a time
pub fn normalize_frames(mut frames: Array3<f32>) -> Array3<f32> {
    for frame in frames.axis_iter_mut(Axis(0)) {
        rescale(frame);
    }
    frames
}

/// Rescale a (N, C, H, W) stack to [0, 1], one (sample, channel) slice at a
/// time
pub fn normalize_stack(mut stack: Array4<f32>) -> Array4<f32> {
    for mut sample in stack.axis_iter_mut(Axis(0)) {
        for channel in sample.axis_iter_mut(Axis(0)) {
            rescale(channel);
        }
    }
    stack
}

/// Resolve the sign ambiguity left by the upstream phase unwrapping.
///
/// When the center of the map sits above the corner the whole map is shifted
/// down by its maximum; when the center is negative it is shifted up by its
/// minimum; the absolute value is taken last. An exact center/corner tie
/// skips the shift on purpose.
pub fn rectify_phase_sign(mut phase: Array2<f32>) -> Array2<f32> {
    let (height, width) = phase.dim();
    let center = phase[[height / 2, width / 2]];
    let corner = phase[[0, 0]];
    if center > corner {
        let max = phase.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        phase.mapv_inplace(|v| v - max);
    } else if center < 0. {
        let min = phase.fold(f32::INFINITY, |m, &v| m.min(v));
        phase.mapv_inplace(|v| v - min);
    }
    phase.mapv_inplace(f32::abs);
    phase
}
