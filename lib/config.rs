//! Run configuration, read from TOML.
//!
//! ```
//! use splitstep::config::ProjectConfig;
//!
//! let config = ProjectConfig::from_toml(r#"
//!     [grid]
//!     x_min = -50.0
//!     x_max = 50.0
//!     points = 1024
//!
//!     [IM]
//!     dt = 0.05
//!     max_steps = 2000
//!     state_accuracy = 1e-12
//!
//!     [RE]
//!     dt = 0.05
//! "#).unwrap();
//! assert_eq!(config.imag().unwrap().max_steps, Some(2000));
//! assert_eq!(config.output.interval, 1);
//! ```

use std::{ fs, path::Path };
use serde::Deserialize;
use crate::{
    error::ConfigError,
    field::Pulse,
    rep::Mode,
    units,
};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Step size, step budget, and convergence threshold for one propagation
/// mode.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct PropagatorConfig {
    /// Fixed step size.
    pub dt: f64,
    /// Step budget. Required in imaginary time; derived from the pulse
    /// duration in real time if absent.
    #[serde(default)]
    pub max_steps: Option<usize>,
    /// Convergence threshold on the energy difference in imaginary time.
    #[serde(default)]
    pub state_accuracy: f64,
}

impl PropagatorConfig {
    /// Create a new configuration with an explicit step budget.
    pub fn new(dt: f64, max_steps: usize, state_accuracy: f64) -> Self {
        Self { dt, max_steps: Some(max_steps), state_accuracy }
    }

    /// Check that the configuration is usable in `mode`.
    pub fn validate(&self, mode: Mode) -> ConfigResult<()> {
        ConfigError::check_dt(self.dt)?;
        ConfigError::check_accuracy(self.state_accuracy)?;
        if mode == Mode::Imag && self.max_steps.is_none() {
            return Err(ConfigError::MissingMaxSteps);
        }
        Ok(())
    }
}

/// Periodic position grid.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct GridConfig {
    /// Left edge (included).
    pub x_min: f64,
    /// Right edge (excluded).
    pub x_max: f64,
    /// Number of points.
    pub points: usize,
}

/// Laser pulse, either in atomic units or in laboratory units.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldConfig {
    /// Atomic units throughout.
    Atomic {
        /// Peak field amplitude.
        amplitude: f64,
        /// Carrier angular frequency.
        omega: f64,
        /// Number of carrier cycles under the envelope.
        cycles: f64,
        /// Carrier-envelope phase.
        #[serde(default)]
        phase: f64,
    },
    /// Wavelength in nanometers and peak intensity in W/cm².
    Lab {
        /// Carrier wavelength (nm).
        wavelength_nm: f64,
        /// Peak intensity (W/cm²).
        intensity_wcm2: f64,
        /// Number of carrier cycles under the envelope.
        cycles: f64,
        /// Carrier-envelope phase.
        #[serde(default)]
        phase: f64,
    },
}

impl FieldConfig {
    /// Check that every parameter is finite, and that the carrier, intensity
    /// and cycle count are positive.
    pub fn validate(&self) -> ConfigResult<()> {
        match *self {
            Self::Atomic { amplitude, omega, cycles, phase } => {
                ConfigError::check_finite("amplitude", amplitude)?;
                ConfigError::check_positive("omega", omega)?;
                ConfigError::check_positive("cycles", cycles)?;
                ConfigError::check_finite("phase", phase)?;
            },
            Self::Lab { wavelength_nm, intensity_wcm2, cycles, phase } => {
                ConfigError::check_positive("wavelength_nm", wavelength_nm)?;
                ConfigError::check_positive("intensity_wcm2", intensity_wcm2)?;
                ConfigError::check_positive("cycles", cycles)?;
                ConfigError::check_finite("phase", phase)?;
            },
        }
        Ok(())
    }

    /// Build the described pulse.
    pub fn pulse(&self) -> Pulse {
        match *self {
            Self::Atomic { amplitude, omega, cycles, phase } =>
                Pulse::new(amplitude, omega, cycles, phase),
            Self::Lab { wavelength_nm, intensity_wcm2, cycles, phase } =>
                Pulse::new(
                    units::field_from_intensity(intensity_wcm2),
                    units::omega_from_wavelength(wavelength_nm),
                    cycles,
                    phase,
                ),
        }
    }
}

/// Output sampling.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct OutputConfig {
    /// Persist every `interval`-th `During` window.
    #[serde(default = "default_interval")]
    pub interval: usize,
}

fn default_interval() -> usize { 1 }

impl Default for OutputConfig {
    fn default() -> Self { Self { interval: default_interval() } }
}

/// Full project configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProjectConfig {
    /// Position grid.
    pub grid: GridConfig,
    /// Imaginary-time propagation.
    #[serde(rename = "IM", default)]
    pub im: Option<PropagatorConfig>,
    /// Real-time propagation.
    #[serde(rename = "RE", default)]
    pub re: Option<PropagatorConfig>,
    /// Laser pulse for real-time propagation.
    #[serde(default)]
    pub field: Option<FieldConfig>,
    /// Output sampling.
    #[serde(default)]
    pub output: OutputConfig,
}

impl ProjectConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(s: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a configuration file.
    pub fn load<P>(path: P) -> ConfigResult<Self>
    where P: AsRef<Path>
    {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    fn validate(&self) -> ConfigResult<()> {
        if let Some(im) = &self.im { im.validate(Mode::Imag)?; }
        if let Some(re) = &self.re { re.validate(Mode::Real)?; }
        if let Some(field) = &self.field { field.validate()?; }
        if self.output.interval == 0 { return Err(ConfigError::BadInterval); }
        Ok(())
    }

    /// Return the section for `mode`.
    pub fn section(&self, mode: Mode) -> ConfigResult<&PropagatorConfig> {
        match mode {
            Mode::Imag => self.im.as_ref().ok_or(ConfigError::MissingSection("IM")),
            Mode::Real => self.re.as_ref().ok_or(ConfigError::MissingSection("RE")),
        }
    }

    /// Return the imaginary-time section.
    pub fn imag(&self) -> ConfigResult<&PropagatorConfig> { self.section(Mode::Imag) }

    /// Return the real-time section.
    pub fn real(&self) -> ConfigResult<&PropagatorConfig> { self.section(Mode::Real) }
}
