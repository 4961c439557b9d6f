//! A one-dimensional, periodic, pseudo-spectral wavefunction model.
//!
//! The state is sampled on an evenly spaced, periodic position grid and moved
//! to momentum space with the FFT. In atomic units the Hamiltonian is
//! ```text
//! H(t) = (p + A(t))² / 2 + V(x) + x E(t)
//! ```
//! where at most one of the two coupling terms is present (see [`Coupling`]).
//! Each representation's part is diagonal in its own basis, so every
//! sub-step is a pointwise multiplication by `exp(-i H dt)` (real time) or
//! `exp(-H dt)` (imaginary time).

use std::borrow::Cow;
use std::f64::consts::TAU;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    config::GridConfig,
    error::GridError,
    field::Coupling,
    model::WaveFunction,
    observable::{ Action, Quantity },
    rep::{ Mode, Rep },
    utils::{ fft_freq, wf_norm, FftPair },
};

pub type GridResult<T> = Result<T, GridError>;

/// Wavefunction on a periodic one-dimensional grid.
#[derive(Clone, Debug)]
pub struct Grid1D {
    x: nd::Array1<f64>,
    k: nd::Array1<f64>,
    dx: f64,
    V: nd::Array1<f64>,
    coupling: Coupling,
    psi: nd::Array1<C64>,
    rep: Rep,
    plan: FftPair,
    pos_energy: nd::Array1<f64>,
    mom_energy: nd::Array1<f64>,
    backup: Option<(nd::Array1<C64>, Rep)>,
    composite: Option<nd::Array1<C64>>,
}

// Σ w |s|² / Σ |s|²
fn weighted<S, T>(s: &nd::ArrayBase<S, nd::Ix1>, w: &nd::ArrayBase<T, nd::Ix1>)
    -> f64
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    let (num, den)
        = s.iter().zip(w)
        .fold((0.0, 0.0), |(num, den), (sk, wk)| {
            let p = sk.norm_sqr();
            (num + wk * p, den + p)
        });
    num / den
}

impl Grid1D {
    /// Create a new grid of `n` points covering `[x_min, x_max)` with a
    /// static potential `V` and an external coupling.
    ///
    /// The state is initialized to a unit-norm Gaussian centered on the grid
    /// with a width of a tenth of the grid length.
    pub fn new_linspace<F>(
        xargs: (f64, f64, usize),
        mut V: F,
        coupling: Coupling,
    ) -> GridResult<Self>
    where F: FnMut(f64) -> f64
    {
        let (x_min, x_max, n) = xargs;
        if n < 2 { return Err(GridError::TooFewPoints(n)); }
        if x_min >= x_max { return Err(GridError::BadBounds(x_min, x_max)); }
        let dx = (x_max - x_min) / n as f64;
        let x: nd::Array1<f64>
            = (0..n).map(|i| x_min + i as f64 * dx).collect();
        let k: nd::Array1<f64> = fft_freq(n, dx) * TAU;
        let V: nd::Array1<f64> = x.mapv(&mut V);
        let mut new = Self {
            pos_energy: V.clone(),
            mom_energy: k.mapv(|kk| 0.5 * kk * kk),
            x,
            k,
            dx,
            V,
            coupling,
            psi: nd::Array1::zeros(n),
            rep: Rep::Pos,
            plan: FftPair::new(n),
            backup: None,
            composite: None,
        };
        let center = 0.5 * (x_min + x_max);
        new.set_gaussian(center, 0.1 * (x_max - x_min), 0.0);
        new.precalc(Rep::Pos, 0.0);
        new.precalc(Rep::Mom, 0.0);
        Ok(new)
    }

    /// Like [`Self::new_linspace`], taking grid parameters from
    /// configuration.
    pub fn from_config<F>(config: &GridConfig, V: F, coupling: Coupling)
        -> GridResult<Self>
    where F: FnMut(f64) -> f64
    {
        Self::new_linspace(
            (config.x_min, config.x_max, config.points), V, coupling)
    }

    /// Replace the state with a unit-norm Gaussian wavepacket centered at
    /// `x0` with width `sigma` and mean momentum `k0`, in position space.
    pub fn set_gaussian(&mut self, x0: f64, sigma: f64, k0: f64) {
        self.psi
            = self.x.mapv(|xk| {
                let u = (xk - x0) / sigma;
                C64::cis(k0 * xk) * (-0.5 * u * u).exp()
            });
        self.rep = Rep::Pos;
        let norm = self.norm().sqrt();
        self.psi.map_inplace(|q| { *q /= norm; });
    }

    /// Replace the state with `psi`, given in position space.
    ///
    /// Fails if `psi` does not match the grid length.
    pub fn set_state<S>(&mut self, psi: &nd::ArrayBase<S, nd::Ix1>)
        -> GridResult<()>
    where S: nd::Data<Elem = C64>
    {
        GridError::check_len(self.x.len(), psi.len())?;
        self.psi = psi.iter().copied().collect();
        self.rep = Rep::Pos;
        Ok(())
    }

    /// Return the position coordinates.
    pub fn get_x(&self) -> &nd::Array1<f64> { &self.x }

    /// Return the momentum coordinates, in FFT order.
    pub fn get_k(&self) -> &nd::Array1<f64> { &self.k }

    /// Return the static potential.
    pub fn get_V(&self) -> &nd::Array1<f64> { &self.V }

    /// Return the grid spacing.
    pub fn get_dx(&self) -> f64 { self.dx }

    /// Return the coupling.
    pub fn get_coupling(&self) -> &Coupling { &self.coupling }

    /// Return the current representation.
    pub fn get_rep(&self) -> Rep { self.rep }

    /// Return the state in its current representation.
    pub fn get_psi(&self) -> &nd::Array1<C64> { &self.psi }

    /// Return the number of grid points.
    pub fn len(&self) -> usize { self.x.len() }

    /// Return `true` if the grid has no points.
    pub fn is_empty(&self) -> bool { self.x.is_empty() }

    /// Return the state in `rep`, transforming a copy if needed.
    pub fn state_in(&self, rep: Rep) -> Cow<'_, nd::Array1<C64>> {
        match (self.rep, rep) {
            (Rep::Pos, Rep::Mom) => Cow::Owned(self.plan.fft(&self.psi)),
            (Rep::Mom, Rep::Pos) => Cow::Owned(self.plan.ifft(&self.psi)),
            _ => Cow::Borrowed(&self.psi),
        }
    }

    /// Return the norm of the state.
    pub fn norm(&self) -> f64 {
        match self.rep {
            Rep::Mom => wf_norm(&self.psi, self.dx) / self.len() as f64,
            _ => wf_norm(&self.psi, self.dx),
        }
    }

    fn renormalize(&mut self) {
        let norm = self.norm().sqrt();
        self.psi.map_inplace(|q| { *q /= norm; });
    }

    fn discard_phase(&mut self) {
        let peak
            = self.psi.iter()
            .max_by(|l, r| {
                l.norm_sqr().partial_cmp(&r.norm_sqr())
                    .unwrap_or(std::cmp::Ordering::Less)
            })
            .copied();
        if let Some(peak) = peak {
            if peak.norm() > 0.0 {
                let phase = peak.conj() / peak.norm();
                self.psi.map_inplace(|q| { *q *= phase; });
            }
        }
    }

    fn potential_energy(&self) -> f64 {
        weighted(&*self.state_in(Rep::Pos), &self.pos_energy)
    }

    fn kinetic_energy(&self) -> f64 {
        weighted(&*self.state_in(Rep::Mom), &self.mom_energy)
    }
}

impl WaveFunction for Grid1D {
    fn couples_in_rep(&self) -> Rep { self.coupling.couples_in_rep() }

    fn max_pulse_duration(&self) -> f64 { self.coupling.max_pulse_duration() }

    fn init_helpers(&mut self) {
        self.backup = Some((nd::Array1::zeros(self.len()), self.rep));
        self.composite = Some(nd::Array1::zeros(self.len()));
    }

    fn fourier(&mut self, rep: Rep) {
        match (self.rep, rep) {
            (Rep::Pos, Rep::Mom) => self.plan.fft_inplace(&mut self.psi),
            (Rep::Mom, Rep::Pos) => self.plan.ifft_inplace(&mut self.psi),
            _ => { return; },
        }
        self.rep = rep;
    }

    fn precalc(&mut self, rep: Rep, time: f64) {
        match rep {
            Rep::Pos => {
                let E = match self.coupling {
                    Coupling::LengthGauge(p) => p.field(time),
                    _ => 0.0,
                };
                nd::Zip::from(&mut self.pos_energy).and(&self.V).and(&self.x)
                    .for_each(|en, Vk, xk| { *en = Vk + xk * E; });
            },
            Rep::Mom => {
                let A = match self.coupling {
                    Coupling::VelocityGauge(p) => p.vector_potential(time),
                    _ => 0.0,
                };
                nd::Zip::from(&mut self.mom_energy).and(&self.k)
                    .for_each(|en, kk| { *en = 0.5 * (kk + A).powi(2); });
            },
            _ => { },
        }
    }

    fn evolve(&mut self, mode: Mode, rep: Rep, dt: f64) {
        debug_assert_eq!(rep, self.rep, "evolving in the wrong representation");
        let en = match rep {
            Rep::Pos => &self.pos_energy,
            Rep::Mom => &self.mom_energy,
            _ => { return; },
        };
        match mode {
            Mode::Real => {
                nd::Zip::from(&mut self.psi).and(en)
                    .for_each(|q, e| { *q *= C64::cis(-e * dt); });
            },
            Mode::Imag => {
                nd::Zip::from(&mut self.psi).and(en)
                    .for_each(|q, e| { *q *= (-e * dt).exp(); });
            },
        }
    }

    fn backup(&mut self) {
        match self.backup.as_mut() {
            Some((buf, rep)) => {
                buf.assign(&self.psi);
                *rep = self.rep;
            },
            None => { self.backup = Some((self.psi.clone(), self.rep)); },
        }
    }

    fn restore(&mut self) {
        if let Some((buf, rep)) = self.backup.as_ref() {
            self.psi.assign(buf);
            self.rep = *rep;
        }
    }

    fn accumulate(&mut self, weight: f64) {
        let n = self.len();
        let acc = self.composite.get_or_insert_with(|| nd::Array1::zeros(n));
        acc.scaled_add(C64::from(weight), &self.psi);
    }

    fn collect(&mut self, weight: f64) {
        self.psi.map_inplace(|q| { *q *= weight; });
        if let Some(acc) = self.composite.as_mut() {
            self.psi += &*acc;
            acc.fill(C64::from(0.0));
        }
    }

    fn post_step(&mut self, mode: Mode) {
        if mode == Mode::Imag { self.renormalize(); }
    }

    fn average(&self, rep: Rep, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Norm => self.norm(),
            Quantity::Position => weighted(&*self.state_in(Rep::Pos), &self.x),
            Quantity::Momentum => weighted(&*self.state_in(Rep::Mom), &self.k),
            Quantity::PotentialEnergy => self.potential_energy(),
            Quantity::KineticEnergy => self.kinetic_energy(),
            Quantity::Energy => match rep {
                Rep::Pos => self.potential_energy(),
                Rep::Mom => self.kinetic_energy(),
                _ => self.potential_energy() + self.kinetic_energy(),
            },
        }
    }

    fn operation(&mut self, _mode: Mode, _rep: Rep, action: Action) {
        match action {
            Action::Normalize => self.renormalize(),
            Action::DiscardPhase => self.discard_phase(),
        }
    }

    fn value(&self, key: &str, time: f64) -> Option<f64> {
        match key {
            "efield" => Some(self.coupling.field(time)),
            "afield" => Some(self.coupling.vector_potential(time)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Pulse;

    fn harmonic() -> Grid1D {
        Grid1D::new_linspace((-10.0, 10.0, 128), |x| 0.5 * x * x, Coupling::Static)
            .unwrap()
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(matches!(
            Grid1D::new_linspace((0.0, 1.0, 1), |_| 0.0, Coupling::Static),
            Err(GridError::TooFewPoints(1)),
        ));
        assert!(matches!(
            Grid1D::new_linspace((1.0, 1.0, 8), |_| 0.0, Coupling::Static),
            Err(GridError::BadBounds(..)),
        ));
        let mut grid = harmonic();
        let short: nd::Array1<C64> = nd::Array1::zeros(3);
        assert!(matches!(grid.set_state(&short), Err(GridError::Length(128, 3))));
    }

    #[test]
    fn norm_is_representation_independent() {
        let mut grid = harmonic();
        grid.set_gaussian(1.0, 0.8, 2.0);
        let n_pos = grid.norm();
        grid.fourier(Rep::Mom);
        assert_eq!(grid.get_rep(), Rep::Mom);
        let n_mom = grid.norm();
        assert!((n_pos - 1.0).abs() < 1e-12);
        assert!((n_mom - 1.0).abs() < 1e-12);
        grid.fourier(Rep::Pos);
        assert!((grid.average(Rep::Pos, Quantity::Position) - 1.0).abs() < 1e-8);
    }

    #[test]
    fn gaussian_averages() {
        let mut grid = harmonic();
        grid.set_gaussian(0.0, 1.0, 1.5);
        // harmonic ground state width with a momentum kick
        assert!((grid.average(Rep::Mom, Quantity::Momentum) - 1.5).abs() < 1e-8);
        let kin = grid.average(Rep::Mom, Quantity::KineticEnergy);
        assert!((kin - (0.25 + 0.5 * 1.5 * 1.5)).abs() < 1e-8);
        let pot = grid.average(Rep::Pos, Quantity::PotentialEnergy);
        assert!((pot - 0.25).abs() < 1e-8);
        let e_pos = grid.average(Rep::Pos, Quantity::Energy);
        let e_mom = grid.average(Rep::Mom, Quantity::Energy);
        assert!((e_pos + e_mom - grid.average(Rep::None, Quantity::Energy)).abs() < 1e-12);
    }

    #[test]
    fn real_time_preserves_norm() {
        let mut grid = harmonic();
        grid.set_gaussian(2.0, 1.0, 0.0);
        for _ in 0..10 {
            grid.evolve(Mode::Real, Rep::Pos, 0.025);
            grid.fourier(Rep::Mom);
            grid.evolve(Mode::Real, Rep::Mom, 0.05);
            grid.fourier(Rep::Pos);
            grid.evolve(Mode::Real, Rep::Pos, 0.025);
        }
        assert!((grid.norm() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn accumulate_and_collect_combine_weighted() {
        let mut grid = harmonic();
        grid.init_helpers();
        let psi0 = grid.get_psi().clone();
        grid.backup();
        grid.psi.map_inplace(|q| { *q *= 3.0; });
        grid.accumulate(0.25);
        grid.restore();
        grid.collect(0.75);
        // 0.25 * 3 psi0 + 0.75 psi0
        grid.get_psi().iter().zip(&psi0)
            .for_each(|(q, q0)| assert!((*q - *q0 * 1.5).norm() < 1e-14));
        // the composite is cleared by collect
        grid.restore();
        grid.collect(1.0);
        grid.get_psi().iter().zip(&psi0)
            .for_each(|(q, q0)| assert!((*q - *q0).norm() < 1e-14));
    }

    #[test]
    fn discard_phase_makes_peak_real() {
        let mut grid = harmonic();
        grid.psi.map_inplace(|q| { *q *= C64::cis(0.7); });
        grid.operation(Mode::Imag, Rep::None, Action::DiscardPhase);
        let peak = grid.get_psi()[64];
        assert!(peak.im.abs() < 1e-14);
        assert!(peak.re > 0.0);
    }

    #[test]
    fn length_gauge_precalc() {
        let pulse = Pulse::new(0.1, 0.5, 2.0, 0.0);
        let mut grid
            = Grid1D::new_linspace((-5.0, 5.0, 16), |_| 0.0, Coupling::LengthGauge(pulse))
            .unwrap();
        let t = 0.3 * pulse.duration();
        grid.precalc(Rep::Pos, t);
        let E = pulse.field(t);
        grid.pos_energy.iter().zip(grid.get_x())
            .for_each(|(en, x)| assert!((en - x * E).abs() < 1e-14));
        assert_eq!(grid.value("efield", t), Some(E));
        assert_eq!(grid.value("bogus", t), None);
    }
}
