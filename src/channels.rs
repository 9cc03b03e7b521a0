use indicatif::ParallelProgressIterator;
use ndarray::{s, Array2, Array3, Array4, ArrayView3, ArrayView4, Axis};
use rayon::prelude::*;
use strum_macros::{Display, EnumIter};

use crate::{
    hog::{hog, HogParams},
    Error, Result,
};

/// Tensor channel vocabulary
///
/// Training tensors carry all four channels in declaration order; partial
/// feature experiments select subsets by label instead of slicing by
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Channel {
    #[strum(serialize = "density")]
    Density,
    #[strum(serialize = "density_hog")]
    DensityHog,
    #[strum(serialize = "phase")]
    Phase,
    #[strum(serialize = "phase_hog")]
    PhaseHog,
}

/// A (N, C, H, W) tensor with named channels
pub struct ChannelStack {
    data: Array4<f32>,
    channels: Vec<Channel>,
}

impl ChannelStack {
    /// Wrap an existing tensor; the channel list length must match axis 1
    pub fn new(data: Array4<f32>, channels: Vec<Channel>) -> Result<Self> {
        if data.shape()[1] != channels.len() {
            return Err(Error::StackShape(
                data.shape().iter().map(|&d| d as u64).collect(),
            ));
        }
        Ok(Self { data, channels })
    }
    /// Build the training tensor from per-sample density and phase maps
    ///
    /// Descriptor images are computed per sample on the rayon pool; the
    /// extraction is deterministic so scheduling order cannot change the
    /// result. Inputs are expected already normalized to [0, 1].
    pub fn training(density: &Array3<f32>, phase: &Array3<f32>, params: &HogParams) -> Self {
        let samples = density.shape()[0];
        let (height, width) = (density.shape()[1], density.shape()[2]);
        let descriptors: Vec<(Array2<f32>, Array2<f32>)> = (0..samples)
            .into_par_iter()
            .progress_count(samples as u64)
            .map(|i| {
                let (_, density_hog) = hog(&density.index_axis(Axis(0), i), params);
                let (_, phase_hog) = hog(&phase.index_axis(Axis(0), i), params);
                (density_hog, phase_hog)
            })
            .collect();
        let mut data = Array4::zeros((samples, 4, height, width));
        for (i, (density_hog, phase_hog)) in descriptors.into_iter().enumerate() {
            data.slice_mut(s![i, 0, .., ..])
                .assign(&density.index_axis(Axis(0), i));
            data.slice_mut(s![i, 1, .., ..]).assign(&density_hog);
            data.slice_mut(s![i, 2, .., ..])
                .assign(&phase.index_axis(Axis(0), i));
            data.slice_mut(s![i, 3, .., ..]).assign(&phase_hog);
        }
        Self {
            data,
            channels: vec![
                Channel::Density,
                Channel::DensityHog,
                Channel::Phase,
                Channel::PhaseHog,
            ],
        }
    }
    /// Build the single-sample tensor the inference driver feeds the network
    pub fn experimental(density: Array2<f32>, phase: Array2<f32>, params: &HogParams) -> Self {
        let density = density.insert_axis(Axis(0));
        let phase = phase.insert_axis(Axis(0));
        Self::training(&density, &phase, params)
    }
    pub fn data(&self) -> ArrayView4<f32> {
        self.data.view()
    }
    pub fn into_inner(self) -> Array4<f32> {
        self.data
    }
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
    /// View of one channel across all samples
    pub fn get(&self, channel: Channel) -> Result<ArrayView3<f32>> {
        let index = self
            .channels
            .iter()
            .position(|&c| c == channel)
            .ok_or(Error::ChannelMissing(channel))?;
        Ok(self.data.index_axis(Axis(1), index))
    }
    /// New stack restricted to the given channels, in the given order
    pub fn select(&self, channels: &[Channel]) -> Result<Self> {
        let indices = channels
            .iter()
            .map(|&channel| {
                self.channels
                    .iter()
                    .position(|&c| c == channel)
                    .ok_or(Error::ChannelMissing(channel))
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(Self {
            data: self.data.select(Axis(1), &indices),
            channels: channels.to_vec(),
        })
    }
}
