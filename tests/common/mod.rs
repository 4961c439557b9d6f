#![allow(dead_code)]

use std::cell::{ Cell, RefCell };
use splitstep::{
    config::PropagatorConfig,
    observable::{ Action, Quantity },
    rep::{ Mode, Rep },
    WaveFunction,
};

/// Every model operation the propagator can invoke.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Call {
    InitHelpers,
    Fourier(Rep),
    Precalc(Rep, f64),
    Evolve(Rep, f64),
    Backup,
    Restore,
    Accumulate(f64),
    Collect(f64),
    PostStep,
    Average(Rep, Quantity),
    Operation(Rep, Action),
}

/// Model that performs no physics, recording every call instead.
///
/// Potential energy is read from `potential` in sequence, one entry per
/// query (the last entry repeats). Kinetic energy is the constant `kinetic`.
/// An `Energy` query returns 1 for its position part and 2 for its momentum
/// part.
#[derive(Debug)]
pub struct Recorder {
    pub couples: Rep,
    pub duration: f64,
    pub potential: Vec<f64>,
    pub kinetic: f64,
    rep: Rep,
    backup_rep: Option<Rep>,
    calls: RefCell<Vec<Call>>,
    queries: Cell<usize>,
    mismatched: Cell<bool>,
}

impl Recorder {
    pub fn new(couples: Rep) -> Self {
        Self {
            couples,
            duration: 0.0,
            potential: vec![0.0],
            kinetic: 0.0,
            rep: Rep::Pos,
            backup_rep: None,
            calls: RefCell::new(Vec::new()),
            queries: Cell::new(0),
            mismatched: Cell::new(false),
        }
    }

    pub fn with_potential(mut self, potential: &[f64]) -> Self {
        self.potential = potential.to_vec();
        self
    }

    pub fn with_kinetic(mut self, kinetic: f64) -> Self {
        self.kinetic = kinetic;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn starting_in(mut self, rep: Rep) -> Self {
        self.rep = rep;
        self
    }

    pub fn rep(&self) -> Rep { self.rep }

    pub fn calls(&self) -> Vec<Call> { self.calls.borrow().clone() }

    pub fn clear(&self) { self.calls.borrow_mut().clear(); }

    /// `true` if any operation was asked to act in a representation other
    /// than the one the state was in.
    pub fn mismatched(&self) -> bool { self.mismatched.get() }

    pub fn count<F>(&self, f: F) -> usize
    where F: Fn(&Call) -> bool
    {
        self.calls.borrow().iter().filter(|c| f(c)).count()
    }

    pub fn precalc_times(&self) -> Vec<f64> {
        self.calls.borrow().iter()
            .filter_map(|c| match c {
                Call::Precalc(_, t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) { self.calls.borrow_mut().push(call); }

    fn check_rep(&self, rep: Rep) {
        if rep.is_concrete() && rep != self.rep { self.mismatched.set(true); }
    }
}

impl WaveFunction for Recorder {
    fn couples_in_rep(&self) -> Rep { self.couples }

    fn max_pulse_duration(&self) -> f64 { self.duration }

    fn init_helpers(&mut self) { self.record(Call::InitHelpers); }

    fn fourier(&mut self, rep: Rep) {
        self.record(Call::Fourier(rep));
        self.rep = rep;
    }

    fn precalc(&mut self, rep: Rep, time: f64) {
        self.record(Call::Precalc(rep, time));
    }

    fn evolve(&mut self, _mode: Mode, rep: Rep, dt: f64) {
        self.check_rep(rep);
        self.record(Call::Evolve(rep, dt));
    }

    fn backup(&mut self) {
        self.record(Call::Backup);
        self.backup_rep = Some(self.rep);
    }

    fn restore(&mut self) {
        self.record(Call::Restore);
        if let Some(rep) = self.backup_rep { self.rep = rep; }
    }

    fn accumulate(&mut self, weight: f64) { self.record(Call::Accumulate(weight)); }

    fn collect(&mut self, weight: f64) { self.record(Call::Collect(weight)); }

    fn post_step(&mut self, _mode: Mode) { self.record(Call::PostStep); }

    fn average(&self, rep: Rep, quantity: Quantity) -> f64 {
        self.check_rep(rep);
        self.record(Call::Average(rep, quantity));
        match quantity {
            Quantity::PotentialEnergy => {
                let k = self.queries.get();
                self.queries.set(k + 1);
                self.potential[k.min(self.potential.len() - 1)]
            },
            Quantity::KineticEnergy => self.kinetic,
            Quantity::Energy => match rep {
                Rep::Pos => 1.0,
                Rep::Mom => 2.0,
                _ => 3.0,
            },
            Quantity::Norm => 1.0,
            Quantity::Position | Quantity::Momentum => 0.0,
        }
    }

    fn operation(&mut self, _mode: Mode, rep: Rep, action: Action) {
        self.record(Call::Operation(rep, action));
    }

    fn value(&self, key: &str, time: f64) -> Option<f64> {
        (key == "twice_time").then_some(2.0 * time)
    }
}

pub fn config(dt: f64, max_steps: usize, state_accuracy: f64) -> PropagatorConfig {
    PropagatorConfig::new(dt, max_steps, state_accuracy)
}
