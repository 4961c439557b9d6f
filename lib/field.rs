//! Time-dependent external fields and their coupling to the Hamiltonian.

use std::f64::consts::PI;
use crate::rep::Rep;

/// A linearly polarized pulse with a sin² envelope, defined through its
/// vector potential
/// ```text
/// A(t) = -(E₀/ω) sin²(π t / T) sin(ω t + φ),    0 ≤ t ≤ T
/// ```
/// with `T` spanning a whole number of carrier cycles, and `E(t) = -dA/dt`.
/// Both vanish outside `[0, T]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pulse {
    /// Peak field amplitude `E₀`.
    pub amplitude: f64,
    /// Carrier angular frequency `ω`.
    pub omega: f64,
    /// Number of carrier cycles under the envelope.
    pub cycles: f64,
    /// Carrier-envelope phase `φ`.
    pub phase: f64,
}

impl Pulse {
    /// Create a new pulse.
    pub fn new(amplitude: f64, omega: f64, cycles: f64, phase: f64) -> Self {
        Self { amplitude, omega, cycles, phase }
    }

    /// Total duration `T`.
    pub fn duration(&self) -> f64 { 2.0 * PI * self.cycles / self.omega }

    fn active(&self, t: f64) -> bool { (0.0..=self.duration()).contains(&t) }

    /// Vector potential at time `t`.
    pub fn vector_potential(&self, t: f64) -> f64 {
        if !self.active(t) { return 0.0; }
        let env = (PI * t / self.duration()).sin().powi(2);
        -self.amplitude / self.omega * env * (self.omega * t + self.phase).sin()
    }

    /// Electric field at time `t`.
    pub fn field(&self, t: f64) -> f64 {
        if !self.active(t) { return 0.0; }
        let T = self.duration();
        let arg = self.omega * t + self.phase;
        let env = (PI * t / T).sin().powi(2);
        let denv = PI / T * (2.0 * PI * t / T).sin();
        self.amplitude / self.omega
            * (denv * arg.sin() + self.omega * env * arg.cos())
    }
}

/// Coupling of a model to its time-dependent influence.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Coupling {
    /// No time dependence.
    Static,
    /// Dipole coupling in the length gauge, `x E(t)`; acts in position space.
    LengthGauge(Pulse),
    /// Dipole coupling in the velocity gauge, `(p + A(t))² / 2`; acts in
    /// momentum space.
    VelocityGauge(Pulse),
}

impl Coupling {
    /// Representation in which the coupling acts.
    pub fn couples_in_rep(&self) -> Rep {
        match self {
            Self::Static | Self::LengthGauge(_) => Rep::Pos,
            Self::VelocityGauge(_) => Rep::Mom,
        }
    }

    /// Duration of the pulse, or zero.
    pub fn max_pulse_duration(&self) -> f64 {
        match self {
            Self::Static => 0.0,
            Self::LengthGauge(p) | Self::VelocityGauge(p) => p.duration(),
        }
    }

    /// Electric field at time `t`.
    pub fn field(&self, t: f64) -> f64 {
        match self {
            Self::Static => 0.0,
            Self::LengthGauge(p) | Self::VelocityGauge(p) => p.field(t),
        }
    }

    /// Vector potential at time `t`.
    pub fn vector_potential(&self, t: f64) -> f64 {
        match self {
            Self::Static => 0.0,
            Self::LengthGauge(p) | Self::VelocityGauge(p) => p.vector_potential(t),
        }
    }
}
