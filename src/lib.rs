/*!
# NLSE parameter estimation pipeline

This library prepares the data that a multi-output regression network consumes
to estimate three physical parameters of a nonlinear optical medium: the
nonlinear refractive index `n2`, the saturation intensity `Isat` and the
absorption coefficient `alpha`.

## Key Components

- [`Sampler`] - Seedable random source shared by every randomized stage
- [`Field`] - Complex optical field with amplitude/density/phase views
- [`Labels`] - Per-sample physical parameter labels
- [`augment::augment`] - Shuffle and replicate a base synthetic dataset
- [`ChannelStack`] - Named 4-channel tensor fed to the network
- [`inference::estimate`] - Experimental field to physical parameters

## Usage

```rust,no_run
use nlse_params::{
    inference::{estimate, Regressor},
    settings::{Cameras, NlseSettings},
};

# fn run(model: &dyn Regressor, settings: &NlseSettings, cameras: &Cameras) -> nlse_params::Result<()> {
let params = estimate("exp_data/field.npy", model, settings, cameras)?;
println!("n2 = {} m^2/W", params.n2);
# Ok(())
# }
```
*/

pub mod augment;
pub mod channels;
pub mod field;
pub mod hog;
pub mod inference;
pub mod labels;
pub mod noise;
pub mod normalize;
pub mod resample;
pub mod sampler;
pub mod settings;
pub mod split;

pub use channels::{Channel, ChannelStack};
pub use field::Field;
pub use labels::Labels;
pub use sampler::Sampler;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read the array file")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize the labels archive")]
    Pickle(#[from] serde_pickle::Error),
    #[error("failed to reshape the array data")]
    Shape(#[from] ndarray::ShapeError),
    #[error("expected a 2D field, got shape {0:?}")]
    FieldShape(Vec<u64>),
    #[error("expected a (N, C, H, W) stack, got shape {0:?}")]
    StackShape(Vec<u64>),
    #[error("no array found in the archive {0}")]
    EmptyArchive(String),
    #[error("invalid noise parameter: {0}")]
    NoiseParameter(String),
    #[error("train/validation/test ratios sum to {0}, expected 1")]
    RatioSum(f64),
    #[error("missing weights artifact {0:?}")]
    MissingWeights(std::path::PathBuf),
    #[error("channel {0} is not part of the stack")]
    ChannelMissing(Channel),
    #[error("unknown regressor variant {0}")]
    UnknownVariant(String),
    #[error(transparent)]
    Regressor(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, Error>;
