use itertools::iproduct;
use ndarray::{Array1, Array2, Array3, ArrayView2};

/// Histogram-of-oriented-gradients geometry
///
/// The training convention is fixed: 8 orientation bins over [0, 180)
/// degrees, 6x6 pixel cells and 2x2 cell blocks.
#[derive(Debug, Clone, Copy)]
pub struct HogParams {
    pub orientations: usize,
    pub cell: (usize, usize),
    pub block: (usize, usize),
}

impl Default for HogParams {
    fn default() -> Self {
        Self {
            orientations: 8,
            cell: (6, 6),
            block: (2, 2),
        }
    }
}

/// Dense gradient-orientation descriptor of a single-channel image
///
/// Returns the block-normalized feature vector and a same-size visualization
/// image in which each cell renders its orientation histogram as line
/// segments through the cell center. The visualization image is what gets
/// stacked as a tensor channel. Deterministic: no randomness anywhere.
pub fn hog(image: &ArrayView2<f32>, params: &HogParams) -> (Array1<f32>, Array2<f32>) {
    let histogram = orientation_histogram(image, params);
    let features = block_normalize(&histogram, params);
    let rendered = render(&histogram, image.dim(), params);
    (features, rendered)
}

/// Central-difference gradients with zeroed borders, row direction
fn gradient_rows(image: &ArrayView2<f32>) -> Array2<f32> {
    let (height, width) = image.dim();
    let mut g = Array2::zeros((height, width));
    for y in 1..height.saturating_sub(1) {
        for x in 0..width {
            g[[y, x]] = image[[y + 1, x]] - image[[y - 1, x]];
        }
    }
    g
}

fn gradient_cols(image: &ArrayView2<f32>) -> Array2<f32> {
    let (height, width) = image.dim();
    let mut g = Array2::zeros((height, width));
    for y in 0..height {
        for x in 1..width.saturating_sub(1) {
            g[[y, x]] = image[[y, x + 1]] - image[[y, x - 1]];
        }
    }
    g
}

/// Mean gradient magnitude per cell and orientation bin, orientation folded
/// to [0, 180) degrees
fn orientation_histogram(image: &ArrayView2<f32>, params: &HogParams) -> Array3<f32> {
    let g_row = gradient_rows(image);
    let g_col = gradient_cols(image);
    let (height, width) = image.dim();
    let (c_row, c_col) = params.cell;
    let (n_rows, n_cols) = (height / c_row, width / c_col);
    let bin_width = 180. / params.orientations as f32;
    let mut histogram = Array3::zeros((n_rows, n_cols, params.orientations));
    for (y, x) in iproduct!(0..n_rows * c_row, 0..n_cols * c_col) {
        let magnitude = g_row[[y, x]].hypot(g_col[[y, x]]);
        let orientation = g_row[[y, x]]
            .atan2(g_col[[y, x]])
            .to_degrees()
            .rem_euclid(180.);
        let bin = ((orientation / bin_width) as usize).min(params.orientations - 1);
        histogram[[y / c_row, x / c_col, bin]] += magnitude;
    }
    histogram /= (c_row * c_col) as f32;
    histogram
}

/// L2-Hys block normalization over sliding cell blocks
fn block_normalize(histogram: &Array3<f32>, params: &HogParams) -> Array1<f32> {
    const EPS: f32 = 1e-5;
    const CLIP: f32 = 0.2;
    let (n_rows, n_cols, orientations) = histogram.dim();
    let (b_row, b_col) = params.block;
    if n_rows < b_row || n_cols < b_col {
        return Array1::zeros(0);
    }
    let mut features = Vec::new();
    for (r, c) in iproduct!(0..n_rows + 1 - b_row, 0..n_cols + 1 - b_col) {
        let mut block: Vec<f32> = iproduct!(0..b_row, 0..b_col)
            .flat_map(|(dr, dc)| {
                (0..orientations).map(move |o| histogram[[r + dr, c + dc, o]])
            })
            .collect();
        let norm = (block.iter().map(|v| v * v).sum::<f32>() + EPS * EPS).sqrt();
        for v in block.iter_mut() {
            *v = (*v / norm).min(CLIP);
        }
        let norm = (block.iter().map(|v| v * v).sum::<f32>() + EPS * EPS).sqrt();
        for v in block.iter_mut() {
            *v /= norm;
        }
        features.extend(block);
    }
    Array1::from(features)
}

/// Draw each cell histogram as oriented segments through the cell center
fn render(histogram: &Array3<f32>, shape: (usize, usize), params: &HogParams) -> Array2<f32> {
    let (n_rows, n_cols, orientations) = histogram.dim();
    let (c_row, c_col) = params.cell;
    let radius = (c_row.min(c_col) / 2).saturating_sub(1) as f64;
    let mut rendered = Array2::zeros(shape);
    for (r, c, o) in iproduct!(0..n_rows, 0..n_cols, 0..orientations) {
        let midpoint = std::f64::consts::PI * (o as f64 + 0.5) / orientations as f64;
        let dr = radius * midpoint.sin();
        let dc = radius * midpoint.cos();
        let center = ((r * c_row + c_row / 2) as f64, (c * c_col + c_col / 2) as f64);
        for (y, x) in line(
            (center.0 - dc) as i64,
            (center.1 + dr) as i64,
            (center.0 + dc) as i64,
            (center.1 - dr) as i64,
        ) {
            if y >= 0 && x >= 0 && (y as usize) < shape.0 && (x as usize) < shape.1 {
                rendered[[y as usize, x as usize]] += histogram[[r, c, o]];
            }
        }
    }
    rendered
}

/// Bresenham segment, endpoints included
fn line(r0: i64, c0: i64, r1: i64, c1: i64) -> Vec<(i64, i64)> {
    let (dr, dc) = ((r1 - r0).abs(), (c1 - c0).abs());
    let (step_r, step_c) = ((r1 - r0).signum(), (c1 - c0).signum());
    let mut err = dc - dr;
    let (mut r, mut c) = (r0, c0);
    let mut points = Vec::with_capacity((dr.max(dc) + 1) as usize);
    loop {
        points.push((r, c));
        if r == r1 && c == c1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dr {
            err -= dr;
            c += step_c;
        }
        if e2 < dc {
            err += dc;
            r += step_r;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn uniform_image_has_no_descriptor_energy() {
        let image = Array2::from_elem((36, 36), 0.7);
        let (features, rendered) = hog(&image.view(), &HogParams::default());
        assert!(features.iter().all(|&v| v == 0.));
        assert!(rendered.iter().all(|&v| v == 0.));
    }

    #[test]
    fn visualization_matches_the_input_size() {
        let image = Array2::from_shape_fn((60, 48), |(y, x)| (y as f32).sin() + x as f32);
        let (_, rendered) = hog(&image.view(), &HogParams::default());
        assert_eq!(rendered.dim(), (60, 48));
    }

    #[test]
    fn descriptor_is_deterministic() {
        let image = Array2::from_shape_fn((36, 36), |(y, x)| ((y * 36 + x) as f32).cos());
        let params = HogParams::default();
        let (fa, ra) = hog(&image.view(), &params);
        let (fb, rb) = hog(&image.view(), &params);
        assert_eq!(fa, fb);
        assert_eq!(ra, rb);
    }

    #[test]
    fn horizontal_edge_energy_lands_in_one_bin() {
        // a pure horizontal gradient has vertical edges: orientation 90 deg
        let image = Array2::from_shape_fn((36, 36), |(y, _)| y as f32);
        let params = HogParams::default();
        let histogram = orientation_histogram(&image.view(), &params);
        let bin_90 = (90. / (180. / params.orientations as f32)) as usize;
        for (r, c, o) in iproduct!(1..5, 0..6, 0..params.orientations) {
            if o == bin_90 {
                assert!(histogram[[r, c, o]] > 0.);
            } else {
                assert_eq!(histogram[[r, c, o]], 0.);
            }
        }
    }

    #[test]
    fn feature_vector_length_follows_the_geometry() {
        let image = Array2::from_shape_fn((36, 30), |(y, x)| (y + x) as f32);
        let params = HogParams::default();
        let (features, _) = hog(&image.view(), &params);
        // (6 - 1) x (5 - 1) blocks of 2 x 2 cells x 8 orientations
        assert_eq!(features.len(), 5 * 4 * 2 * 2 * 8);
    }

    #[test]
    fn features_are_clipped_by_normalization() {
        let image = Array2::from_shape_fn((24, 24), |(y, x)| ((y / 6 + x / 6) % 2) as f32 * 10.);
        let (features, _) = hog(&image.view(), &HogParams::default());
        let limit = 0.2 / (0.2f32 * 0.2).sqrt();
        assert!(features.iter().all(|&v| v <= limit + 1e-6));
    }
}
