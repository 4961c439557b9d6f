//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! Every error here is a construction-time defect: once a
//! [`SplitPropagator`][crate::propagator::SplitPropagator] exists, running it
//! cannot fail.
//!
//! [anyhow]: https://crates.io/crates/anyhow

use thiserror::Error;
use crate::rep::Rep;

/// Returned when a position/momentum grid is built with an incompatible
/// number of points or invalid bounds.
#[derive(Debug, Error)]
pub enum GridError {
    /// Returned when fewer than 2 grid points are requested.
    #[error("grids must have at least 2 points; got {0}")]
    TooFewPoints(usize),

    /// Returned when the grid bounds are not strictly increasing.
    #[error("grid bounds must satisfy x_min < x_max; got ({0}, {1})")]
    BadBounds(f64, f64),

    /// Returned when a supplied state or potential has the wrong length.
    #[error("encountered arrays with incompatible lengths; got {0} and {1}")]
    Length(usize, usize),
}

/// Returned when a [`SplitScheme`][crate::scheme::SplitScheme] is malformed.
#[derive(Debug, Error)]
pub enum SchemeError {
    /// Returned when a scheme has no chains.
    #[error("split schemes must contain at least one chain")]
    NoChains,

    /// Returned when a chain has no sub-steps.
    #[error("chain {0} contains no sub-steps")]
    EmptyChain(usize),

    /// Returned when a sub-step is not tagged with a concrete basis.
    #[error("chain {chain}, sub-step {sub}: sub-steps must act in Pos or Mom; got {rep:?}")]
    BadRep { chain: usize, sub: usize, rep: Rep },

    /// Returned when a multiplier or weight is NaN or infinite.
    #[error("chain {chain}: encountered non-finite coefficient {value}")]
    NonFinite { chain: usize, value: f64 },

    /// Returned when the multipliers in a chain do not add up to a full step
    /// for each representation.
    #[error("chain {chain}: {rep:?} multipliers sum to {total}, expected 1")]
    InconsistentTotal { chain: usize, rep: Rep, total: f64 },

    /// Returned when the weights of a multi-chain scheme do not sum to 1.
    #[error("chain weights sum to {0}, expected 1")]
    BadWeights(f64),
}

/// Returned when an [`ObservableSet`][crate::observable::ObservableSet] is
/// declared inconsistently.
#[derive(Debug, Error)]
pub enum ObsError {
    /// Returned when a Sum or Change refers to an expression that is not
    /// declared before it.
    #[error("expression {at} ({label}) refers to expression {target}, which is not declared before it")]
    ForwardReference { at: usize, label: String, target: usize },

    /// Returned when a Sum or Change refers to an expression that stores no
    /// value.
    #[error("expression {at} ({label}) refers to expression {target}, which stores no value")]
    NoValue { at: usize, label: String, target: usize },

    /// Returned when a Sum has no terms.
    #[error("expression {at} ({label}) sums over no terms")]
    EmptySum { at: usize, label: String },

    /// Returned when energy accounting refers to an expression that does not
    /// exist or stores no value.
    #[error("energy accounting refers to expression {target}, which does not exist or stores no value")]
    BadEnergy { target: usize },
}

/// Returned when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the configuration file cannot be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when the configuration cannot be parsed.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Returned when a section required for the requested mode is absent.
    #[error("missing configuration section [{0}]")]
    MissingSection(&'static str),

    /// Returned when a non-positive or non-finite timestep is encountered.
    #[error("timestep dt must be positive and finite; got {0}")]
    BadTimestep(f64),

    /// Returned when a relaxation run is configured without a step budget.
    #[error("imaginary-time propagation requires max_steps")]
    MissingMaxSteps,

    /// Returned when a negative convergence threshold is encountered.
    #[error("state_accuracy must be non-negative; got {0}")]
    BadAccuracy(f64),

    /// Returned when a pulse parameter is out of range.
    #[error("invalid pulse parameter {name}: {value}")]
    BadPulse { name: &'static str, value: f64 },

    /// Returned when a real-time step budget cannot be derived from the
    /// model's pulse duration.
    #[error("cannot derive max_steps from pulse duration {0}")]
    BadDuration(f64),

    /// Returned when the output interval is zero.
    #[error("output interval must be greater than 0")]
    BadInterval,
}

/// Top-level error for building a propagation run.
#[derive(Debug, Error)]
pub enum PropError {
    /// [`GridError`]
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// [`SchemeError`]
    #[error("scheme error: {0}")]
    Scheme(#[from] SchemeError),

    /// [`ObsError`]
    #[error("observable error: {0}")]
    Obs(#[from] ObsError),

    /// [`ConfigError`]
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl ConfigError {
    pub(crate) fn check_dt(dt: f64) -> Result<(), Self> {
        (dt > 0.0 && dt.is_finite()).then_some(()).ok_or(Self::BadTimestep(dt))
    }

    pub(crate) fn check_accuracy(acc: f64) -> Result<(), Self> {
        (acc >= 0.0).then_some(()).ok_or(Self::BadAccuracy(acc))
    }

    pub(crate) fn check_positive(name: &'static str, value: f64)
        -> Result<(), Self>
    {
        (value > 0.0 && value.is_finite()).then_some(())
            .ok_or(Self::BadPulse { name, value })
    }

    pub(crate) fn check_finite(name: &'static str, value: f64)
        -> Result<(), Self>
    {
        value.is_finite().then_some(()).ok_or(Self::BadPulse { name, value })
    }
}

impl GridError {
    pub(crate) fn check_len(a: usize, b: usize) -> Result<(), Self> {
        (a == b).then_some(()).ok_or(Self::Length(a, b))
    }
}
