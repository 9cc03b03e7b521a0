use std::{
    fs::File,
    io::{BufReader, Read},
    ops::Deref,
    path::Path,
    time::Instant,
};

use flate2::read::GzDecoder;
use ndarray::{s, Array2, Array4};
use npyz::npz::NpzArchive;
use num_complex::Complex32;

use crate::{Error, Result};

/// A measured or simulated optical field
///
/// The wrapped array is the complex envelope sampled on the camera grid.
/// Files are expected in numpy `complex64` precision, the precision the
/// synthetic generator writes.
pub struct Field(Array2<Complex32>);

impl Deref for Field {
    type Target = Array2<Complex32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Field {
    pub fn new(data: Array2<Complex32>) -> Self {
        Self(data)
    }
    /// Load a field from a `.npy`, `.npy.gz` or `.npz` file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading {:?}...", path);
        let now = Instant::now();
        let (shape, data) = match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => {
                let mut contents = Vec::new();
                let mut gz = GzDecoder::new(BufReader::new(File::open(path)?));
                gz.read_to_end(&mut contents)?;
                let npy = npyz::NpyFile::new(&contents[..])?;
                (npy.shape().to_vec(), npy.into_vec::<Complex32>()?)
            }
            Some("npz") => {
                let mut npz = NpzArchive::open(path)?;
                let name = npz
                    .array_names()
                    .next()
                    .map(str::to_owned)
                    .ok_or_else(|| Error::EmptyArchive(path.display().to_string()))?;
                let npy = npz
                    .by_name(&name)?
                    .ok_or_else(|| Error::EmptyArchive(path.display().to_string()))?;
                (npy.shape().to_vec(), npy.into_vec::<Complex32>()?)
            }
            _ => {
                let npy = npyz::NpyFile::new(BufReader::new(File::open(path)?))?;
                (npy.shape().to_vec(), npy.into_vec::<Complex32>()?)
            }
        };
        log::info!("... loaded in {}ms", now.elapsed().as_millis());
        let [height, width] = shape[..] else {
            return Err(Error::FieldShape(shape));
        };
        Ok(Self(Array2::from_shape_vec(
            (height as usize, width as usize),
            data,
        )?))
    }
    /// Amplitude map |E|
    pub fn amplitude(&self) -> Array2<f32> {
        self.0.mapv(|e| e.norm())
    }
    /// Density (intensity) map |E|^2
    pub fn density(&self) -> Array2<f32> {
        self.0.mapv(|e| e.norm_sqr())
    }
    /// Phase map arg(E), wrapped to (-pi, pi]
    pub fn phase(&self) -> Array2<f32> {
        self.0.mapv(|e| e.arg())
    }
    /// Center-crop the longer axis down to the shorter one
    ///
    /// An odd size difference leaves one extra row or column, as the
    /// acquisition cameras do.
    pub fn square_crop(self) -> Self {
        let (height, width) = self.0.dim();
        if width > height {
            let cut = (width - height) / 2;
            Self(self.0.slice(s![.., cut..width - cut]).to_owned())
        } else if height > width {
            let cut = (height - width) / 2;
            Self(self.0.slice(s![cut..height - cut, ..]).to_owned())
        } else {
            self
        }
    }
}

/// Load a real-valued synthetic field batch of shape (N, C, H, W)
pub fn load_stack<P: AsRef<Path>>(path: P) -> Result<Array4<f32>> {
    let path = path.as_ref();
    log::info!("Loading {:?}...", path);
    let now = Instant::now();
    let npy = npyz::NpyFile::new(BufReader::new(File::open(path)?))?;
    let shape = npy.shape().to_vec();
    let [samples, channels, height, width] = shape[..] else {
        return Err(Error::StackShape(shape));
    };
    let data = npy.into_vec::<f32>()?;
    log::info!("... loaded in {}ms", now.elapsed().as_millis());
    Ok(Array4::from_shape_vec(
        (
            samples as usize,
            channels as usize,
            height as usize,
            width as usize,
        ),
        data,
    )?)
}
