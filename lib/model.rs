//! Interface to the wavefunction model driven by the propagator.
//!
//! The model owns the wavefunction buffer, its current representation, the
//! Hamiltonian, and any coupling to an external time-dependent influence. The
//! propagator decides only when and in which order the operations below are
//! invoked; every call blocks until complete.

use crate::{
    observable::{ Action, Quantity },
    rep::{ Mode, Rep },
};

/// Operations consumed by [`SplitPropagator`][crate::SplitPropagator].
pub trait WaveFunction {
    /// Representation in which the time-dependent coupling acts.
    ///
    /// Determines how the clock is advanced across sub-steps: `Both` advances
    /// by half of every sub-step, a concrete representation advances by the
    /// full multiplier of the sub-steps in that representation only, and
    /// `None` never advances the clock.
    fn couples_in_rep(&self) -> Rep;

    /// Duration of the time-dependent influence, used to derive the step
    /// budget of real-time runs.
    fn max_pulse_duration(&self) -> f64 { 0.0 }

    /// One-time setup of backup/accumulation buffers; called only for
    /// schemes with more than one chain.
    fn init_helpers(&mut self);

    /// Convert the state to the basis `rep`.
    fn fourier(&mut self, rep: Rep);

    /// Prepare the operator acting in `rep` at simulated time `time`.
    fn precalc(&mut self, rep: Rep, time: f64);

    /// Apply the operator acting in `rep` for a (scaled) time step `dt`.
    fn evolve(&mut self, mode: Mode, rep: Rep, dt: f64);

    /// Store a copy of the full mutable state. Single slot.
    fn backup(&mut self);

    /// Overwrite the state from the backup slot.
    fn restore(&mut self);

    /// Add `weight` times the current state to a running composite.
    fn accumulate(&mut self, weight: f64);

    /// Make the running composite plus `weight` times the current state the
    /// authoritative state, and clear the composite.
    fn collect(&mut self, weight: f64);

    /// Hook invoked once after every completed step.
    fn post_step(&mut self, mode: Mode);

    /// Compute the expectation of `quantity` using the part expressible in
    /// `rep`. The state is in `rep` when this is called, except for
    /// `Rep::None`, which means "whatever the current representation is".
    fn average(&self, rep: Rep, quantity: Quantity) -> f64;

    /// Apply a side-effecting action to the state while it is in `rep`.
    fn operation(&mut self, mode: Mode, rep: Rep, action: Action);

    /// Look up a model-exposed scalar at simulated time `time`.
    fn value(&self, key: &str, time: f64) -> Option<f64> {
        let _ = (key, time);
        None
    }
}
