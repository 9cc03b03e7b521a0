use std::{fs::File, path::Path};

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_pickle as pickle;

use crate::Result;

/// Pickled layout written by the synthetic generator:
/// `(number_of_n2, n2_labels, number_of_isat, isat_labels, number_of_alpha, alpha_labels)`
#[derive(Debug, Serialize, Deserialize)]
struct Record(usize, Vec<f32>, usize, Vec<f32>, usize, Vec<f32>);

/// Physical parameter labels, one value per sample
///
/// The `*_levels` fields hold the number of distinct discretized levels each
/// parameter takes across the synthetic grid; they describe label cardinality,
/// not sample count, and are never touched by augmentation. The three value
/// arrays and the dataset leading axis must always agree in length.
#[derive(Debug, Clone)]
pub struct Labels {
    pub n2_levels: usize,
    pub n2: Array1<f32>,
    pub isat_levels: usize,
    pub isat: Array1<f32>,
    pub alpha_levels: usize,
    pub alpha: Array1<f32>,
}

impl Labels {
    /// Load the label tuple from a pickle archive
    pub fn from_pickle<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let record: Record = pickle::from_reader(&mut file, Default::default())?;
        Ok(record.into())
    }
    /// Number of labelled samples
    pub fn len(&self) -> usize {
        self.n2.len()
    }
    pub fn is_empty(&self) -> bool {
        self.n2.is_empty()
    }
    /// True when all three value arrays have one entry per sample
    pub fn is_aligned_with(&self, n_samples: usize) -> bool {
        self.n2.len() == n_samples
            && self.isat.len() == n_samples
            && self.alpha.len() == n_samples
    }
}

impl From<Record> for Labels {
    fn from(record: Record) -> Self {
        let Record(n2_levels, n2, isat_levels, isat, alpha_levels, alpha) = record;
        Self {
            n2_levels,
            n2: Array1::from(n2),
            isat_levels,
            isat: Array1::from(isat),
            alpha_levels,
            alpha: Array1::from(alpha),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickle_round_trip() {
        let record = Record(
            2,
            vec![-1e-9, -1e-10, -1e-9, -1e-10],
            2,
            vec![1e4, 1e4, 1e6, 1e6],
            1,
            vec![10., 10., 10., 10.],
        );
        let bytes = pickle::to_vec(&record, Default::default()).unwrap();
        let path = std::env::temp_dir().join("nlse_params_labels.pkl");
        std::fs::write(&path, bytes).unwrap();

        let labels = Labels::from_pickle(&path).unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels.n2_levels, 2);
        assert_eq!(labels.isat_levels, 2);
        assert_eq!(labels.alpha_levels, 1);
        assert_eq!(labels.n2[0], -1e-9);
        assert_eq!(labels.isat[2], 1e6);
        assert!(labels.is_aligned_with(4));
        assert!(!labels.is_aligned_with(3));
    }
}
