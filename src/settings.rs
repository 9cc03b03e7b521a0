use ndarray::Array1;

/// NLSE generation settings: the discretized parameter grids the synthetic
/// corpus spans and the propagation constants the generator used
///
/// The grid extrema double as the denormalization scales of the network
/// outputs: training targets are ratios to min(n2), max(Isat) and
/// max(alpha), so the same extrema convert normalized outputs back to
/// physical units.
#[derive(Debug, Clone)]
pub struct NlseSettings {
    /// Nonlinear refractive index grid [m^2/W], negative for defocusing media
    pub n2: Array1<f64>,
    /// Input beam power [W]
    pub input_power: f64,
    /// Absorption coefficient grid [m^-1]
    pub alpha: Array1<f64>,
    /// Saturation intensity grid [W/m^2]
    pub isat: Array1<f64>,
    /// Beam waist [m]
    pub waist: f64,
    /// Nonlinear length [m]
    pub nl_length: f64,
    /// Propagation step [m]
    pub delta_z: f64,
    /// Cell length [m]
    pub length: f64,
}

impl NlseSettings {
    pub fn n2_levels(&self) -> usize {
        self.n2.len()
    }
    pub fn isat_levels(&self) -> usize {
        self.isat.len()
    }
    pub fn alpha_levels(&self) -> usize {
        self.alpha.len()
    }
    pub fn min_n2(&self) -> f64 {
        self.n2.fold(f64::INFINITY, |m, &v| m.min(v))
    }
    pub fn max_isat(&self) -> f64 {
        self.isat.fold(f64::NEG_INFINITY, |m, &v| m.max(v))
    }
    pub fn max_alpha(&self) -> f64 {
        self.alpha.fold(f64::NEG_INFINITY, |m, &v| m.max(v))
    }
}

/// Acquisition and training window geometry
///
/// Only `resolution_training` matters to the tensor pipeline; the windows
/// and input resolution belong to the plotting collaborator's axes.
#[derive(Debug, Clone, Copy)]
pub struct Cameras {
    /// Input window size [m]
    pub window_input: f64,
    /// Output window size [m]
    pub window_output: f64,
    /// Camera resolution [pixel]
    pub resolution_input: usize,
    /// Network training resolution [pixel]
    pub resolution_training: usize,
}

/// The fixed 8-tuple handed to the plotting/regeneration collaborator:
/// `(n2, power, alpha, isat, waist, nl_length, delta_z, length)`
pub type Numbers = (f64, f64, f64, f64, f64, f64, f64, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn extrema_follow_the_grids() {
        let settings = NlseSettings {
            n2: array![-1e-9, -5e-10, -1e-10],
            input_power: 0.5,
            alpha: array![5., 10., 15.],
            isat: array![1e4, 5e5, 1e6],
            waist: 1.7e-3,
            nl_length: 0.,
            delta_z: 1e-4,
            length: 20e-2,
        };
        assert_eq!(settings.min_n2(), -1e-9);
        assert_eq!(settings.max_isat(), 1e6);
        assert_eq!(settings.max_alpha(), 15.);
        assert_eq!(settings.n2_levels(), 3);
        assert_eq!(settings.isat_levels(), 3);
        assert_eq!(settings.alpha_levels(), 3);
    }
}
