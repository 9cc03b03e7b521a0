use std::{
    collections::BTreeMap,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
};

use ndarray::ArrayView4;

use crate::{
    channels::ChannelStack,
    field::Field,
    hog::HogParams,
    normalize::normalize,
    resample::zoom,
    settings::{Cameras, NlseSettings, Numbers},
    Error, Result,
};

/// Per-sample outputs of the parameter network, in normalized output space
#[derive(Debug, Clone)]
pub struct Outputs {
    pub n2: Vec<f32>,
    pub isat: Vec<f32>,
    pub alpha: Vec<f32>,
}

/// The pretrained multi-output network behind its only contract: a
/// (N, C, H, W) tensor in, three normalized scalars per sample out
///
/// Implementations own their device management; tensors must be moved onto
/// the accelerator before the forward pass and back before returning.
pub trait Regressor {
    fn infer(&self, input: ArrayView4<f32>) -> Result<Outputs>;
}

type Constructor = Box<dyn Fn() -> Box<dyn Regressor>>;

/// Network variant registry, resolved once at startup
#[derive(Default)]
pub struct RegressorRegistry(BTreeMap<String, Constructor>);

impl RegressorRegistry {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn register<S, F>(&mut self, variant: S, constructor: F)
    where
        S: Into<String>,
        F: Fn() -> Box<dyn Regressor> + 'static,
    {
        self.0.insert(variant.into(), Box::new(constructor));
    }
    pub fn resolve(&self, variant: &str) -> Result<Box<dyn Regressor>> {
        self.0
            .get(variant)
            .map(|constructor| constructor())
            .ok_or_else(|| Error::UnknownVariant(variant.into()))
    }
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Locates the trained weights artifact from the training grid and
/// resolution it was produced with
pub struct WeightsLocator {
    saving_path: PathBuf,
    resolution: usize,
}

impl Default for WeightsLocator {
    fn default() -> Self {
        Self {
            saving_path: PathBuf::from("."),
            resolution: 256,
        }
    }
}

impl WeightsLocator {
    pub fn saving_path<P: AsRef<Path>>(self, saving_path: P) -> Self {
        Self {
            saving_path: saving_path.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn resolution(self, resolution: usize) -> Self {
        Self { resolution, ..self }
    }
    /// Artifact path for the given training grid, whether or not it exists
    pub fn artifact_path(&self, settings: &NlseSettings) -> PathBuf {
        let directory = format!(
            "training_n2{}_isat{}_alpha{}_power{:.2}",
            settings.n2_levels(),
            settings.isat_levels(),
            settings.alpha_levels(),
            settings.input_power,
        );
        let artifact = format!(
            "n2_net_w{}_n2{}_isat{}_alpha{}_power{:.2}.pth",
            self.resolution,
            settings.n2_levels(),
            settings.isat_levels(),
            settings.alpha_levels(),
            settings.input_power,
        );
        self.saving_path.join(directory).join(artifact)
    }
    /// Same as [`WeightsLocator::artifact_path`] but fails when the artifact
    /// is not on disk
    pub fn locate(&self, settings: &NlseSettings) -> Result<PathBuf> {
        let path = self.artifact_path(settings);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::MissingWeights(path))
        }
    }
}

/// Physical-unit parameter estimate of a measured field
#[derive(Debug, Clone, Copy)]
pub struct Estimate {
    /// Nonlinear refractive index [m^2/W]
    pub n2: f64,
    /// Saturation intensity [W/m^2]
    pub isat: f64,
    /// Absorption coefficient [m^-1]
    pub alpha: f64,
}

impl Estimate {
    /// The 8-tuple the plotting/regeneration collaborator consumes
    pub fn numbers(&self, settings: &NlseSettings) -> Numbers {
        (
            self.n2,
            settings.input_power,
            self.alpha,
            self.isat,
            settings.waist,
            settings.nl_length,
            settings.delta_z,
            settings.length,
        )
    }
}

/// Estimate the medium parameters from a field file
///
/// Loads the field, square-crops it, and hands it to
/// [`estimate_field`].
pub fn estimate<P, R>(
    path: P,
    model: &R,
    settings: &NlseSettings,
    cameras: &Cameras,
) -> Result<Estimate>
where
    P: AsRef<Path>,
    R: Regressor + ?Sized,
{
    let field = Field::from_path(path)?.square_crop();
    estimate_field(&field, model, settings, cameras)
}

/// Estimate the medium parameters from a loaded field
///
/// Amplitude and phase are resampled to the training resolution and
/// normalized, their gradient-orientation descriptors computed, and the
/// resulting 4-channel tensor run through the network. The normalized
/// outputs are scaled back to physical units by the training grid extrema:
/// n2 by its minimum, Isat and alpha by their maxima. The three values are
/// printed on the way out.
pub fn estimate_field<R>(
    field: &Field,
    model: &R,
    settings: &NlseSettings,
    cameras: &Cameras,
) -> Result<Estimate>
where
    R: Regressor + ?Sized,
{
    let resolution = cameras.resolution_training;
    let density = normalize(zoom(&field.amplitude().view(), (resolution, resolution)));
    let phase = normalize(zoom(&field.phase().view(), (resolution, resolution)));
    let stack = ChannelStack::experimental(density, phase, &HogParams::default());

    let outputs = model.infer(stack.data())?;

    let estimate = Estimate {
        n2: outputs.n2[0] as f64 * settings.min_n2(),
        isat: outputs.isat[0] as f64 * settings.max_isat(),
        alpha: outputs.alpha[0] as f64 * settings.max_alpha(),
    };
    println!("n2 = {} m^2/W", estimate.n2);
    println!("Isat = {} W/m^2", estimate.isat);
    println!("alpha = {} m^-1", estimate.alpha);
    Ok(estimate)
}

/// Estimates collected over repeated acquisitions of the same medium
#[derive(Debug, Default)]
pub struct EstimateSeries(Vec<Estimate>);

impl Deref for EstimateSeries {
    type Target = Vec<Estimate>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for EstimateSeries {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl EstimateSeries {
    pub fn new() -> Self {
        Default::default()
    }
    /// Mean estimate, `None` when the series is empty
    pub fn mean(&self) -> Option<Estimate> {
        if self.0.is_empty() {
            return None;
        }
        let n = self.0.len() as f64;
        Some(Estimate {
            n2: self.iter().map(|e| e.n2).sum::<f64>() / n,
            isat: self.iter().map(|e| e.isat).sum::<f64>() / n,
            alpha: self.iter().map(|e| e.alpha).sum::<f64>() / n,
        })
    }
    pub fn summary(&self) {
        let stats = |x: &[f64]| {
            let n = x.len() as f64;
            let mean = x.iter().sum::<f64>() / n;
            let std = (x.iter().map(|x| x - mean).fold(0f64, |s, x| s + x * x) / n).sqrt();
            (mean, std)
        };
        println!("SUMMARY:");
        println!(" - # of estimates: {}", self.len());
        if self.is_empty() {
            return;
        }
        let n2: Vec<f64> = self.iter().map(|e| e.n2).collect();
        let isat: Vec<f64> = self.iter().map(|e| e.isat).collect();
        let alpha: Vec<f64> = self.iter().map(|e| e.alpha).collect();
        println!("    {:^8}: ({:^12}, {:^12})", "PARAM", "MEAN", "STD");
        println!("  - {:8}: {:?}", "n2", stats(&n2));
        println!("  - {:8}: {:?}", "Isat", stats(&isat));
        println!("  - {:8}: {:?}", "alpha", stats(&alpha));
    }
}
