//! The split-operator evolution loop and run state machine.
//!
//! A [`SplitPropagator`] owns a [`WaveFunction`] model, a validated
//! [`SplitScheme`], a [`Clock`], and an observable [`Pipeline`]. A call to
//! [`SplitPropagator::run`] produces one `AtStart` window, one `During` window
//! after every step of the main loop, and, after the loop exits, one terminal
//! step reported as `AtEnd`.

use tracing::{ debug, info };
use crate::{
    clock::Clock,
    config::PropagatorConfig,
    error::{ ConfigError, PropError },
    model::WaveFunction,
    observable::ObservableSet,
    output::OutputSink,
    pipeline::Pipeline,
    rep::{ Mode, Rep, When },
    scheme::SplitScheme,
};

pub type PropResult<T> = Result<T, PropError>;

// chain-level diagnostics are only logged on this step
const DIAGNOSTIC_STEP: usize = 4;

// real-time step budget covering a pulse of the given duration
fn pulse_budget(duration: f64, dt: f64) -> Result<usize, ConfigError> {
    let steps = duration / dt;
    (steps.is_finite() && steps >= 0.0 && steps < usize::MAX as f64)
        .then(|| steps as usize)
        .and_then(|n| n.checked_add(1))
        .ok_or(ConfigError::BadDuration(duration))
}

/// Most recent energy accounting, as read from the observable pipeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Energy {
    /// Total energy.
    pub total: f64,
    /// Change in total energy since the previous window.
    pub difference: f64,
}

impl Default for Energy {
    fn default() -> Self { Self { total: 0.0, difference: f64::INFINITY } }
}

/// Drives a wavefunction model through a split-operator scheme.
pub struct SplitPropagator<W> {
    mode: Mode,
    scheme: SplitScheme,
    clock: Clock,
    wf: W,
    pipeline: Pipeline,
    energy: Energy,
    rep: Rep,
}

impl<W> SplitPropagator<W>
where W: WaveFunction
{
    /// Create a new propagator.
    ///
    /// In real-time mode, a missing `max_steps` is derived from the model's
    /// pulse duration as `duration / dt + 1`, which must be finite and
    /// representable. In imaginary-time mode, `max_steps` is required. The
    /// model is moved to the scheme's default representation.
    ///
    /// Fails if the configuration is invalid or the observable set is
    /// declared inconsistently.
    pub fn new(
        mode: Mode,
        config: &PropagatorConfig,
        scheme: SplitScheme,
        mut wf: W,
        observables: ObservableSet,
    ) -> PropResult<Self>
    {
        info!("split propagator init: mode {}, scheme {}", mode, scheme.name());
        ConfigError::check_dt(config.dt)?;
        ConfigError::check_accuracy(config.state_accuracy)?;
        let max_steps = match (mode, config.max_steps) {
            (_, Some(max_steps)) => max_steps,
            (Mode::Real, None) => {
                let duration = wf.max_pulse_duration();
                let max_steps = pulse_budget(duration, config.dt)?;
                info!(
                    "maxPulseDuration: {}, dt: {} => max_steps: {}",
                    duration, config.dt, max_steps,
                );
                max_steps
            },
            (Mode::Imag, None) => {
                return Err(ConfigError::MissingMaxSteps.into());
            },
        };
        let pipeline = Pipeline::new(observables, scheme.first_rep())?;
        if scheme.is_composite() { wf.init_helpers(); }
        wf.fourier(scheme.first_rep());
        info!("dt {}, max_steps {}", config.dt, max_steps);
        let rep = scheme.first_rep();
        Ok(Self {
            mode,
            scheme,
            clock: Clock::new(config.dt, max_steps, config.state_accuracy),
            wf,
            pipeline,
            energy: Energy::default(),
            rep,
        })
    }

    /// Return the propagation mode.
    pub fn mode(&self) -> Mode { self.mode }

    /// Return the split scheme.
    pub fn scheme(&self) -> &SplitScheme { &self.scheme }

    /// Return the clock.
    pub fn clock(&self) -> &Clock { &self.clock }

    /// Return the model.
    pub fn wf(&self) -> &W { &self.wf }

    /// Return the observable pipeline.
    pub fn pipeline(&self) -> &Pipeline { &self.pipeline }

    /// Return the most recent energy accounting.
    pub fn energy(&self) -> Energy { self.energy }

    /// Consume `self`, returning the model.
    pub fn into_wf(self) -> W { self.wf }

    /// Zero the clock, clear the energy accounting and stored observable
    /// values, so that another pass may be run.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.energy = Energy::default();
        self.pipeline.reset();
    }

    /// Return `true` if the main loop should take another step.
    ///
    /// In real time, the loop continues while the step counter has not passed
    /// `max_steps`, so `max_steps + 1` steps are taken in the main loop. In
    /// imaginary time, it continues while the magnitude of
    /// the energy difference exceeds `state_accuracy` and the step budget is
    /// not exhausted.
    pub fn still_evolving(&self) -> bool {
        match self.mode {
            Mode::Real => self.clock.step <= self.clock.max_steps,
            Mode::Imag => {
                self.energy.difference.abs() > self.clock.state_accuracy
                    && self.clock.step != self.clock.max_steps
            },
        }
    }

    fn fourier(&mut self, rep: Rep) {
        if rep != self.rep {
            self.wf.fourier(rep);
            self.rep = rep;
        }
    }

    fn chain_backup(&mut self) {
        if !self.scheme.is_composite() { return; }
        if self.clock.step == DIAGNOSTIC_STEP {
            debug!(
                "group backup because chain count = {}",
                self.scheme.chain_count(),
            );
        }
        self.wf.backup();
        self.clock.checkpoint();
    }

    fn chain_restore(&mut self, k: usize) {
        if k == 0 { return; }
        if self.clock.step == DIAGNOSTIC_STEP { debug!("group {} restore", k); }
        self.clock.rollback();
        self.wf.restore();
        self.rep = self.scheme.first_rep();
    }

    fn chain_evolve(&mut self, k: usize) {
        let couples = self.wf.couples_in_rep();
        for i in 0..self.scheme.chains()[k].len() {
            let sub = self.scheme.chains()[k].subs()[i];
            self.fourier(sub.rep);
            self.wf.precalc(sub.rep, self.clock.timer);
            self.wf.evolve(self.mode, sub.rep, self.clock.dt * sub.mult);
            if self.clock.step == DIAGNOSTIC_STEP {
                debug!(
                    "split group {} evolving in {:?} with delta = {}",
                    k, sub.rep, sub.mult,
                );
            }
            if couples == Rep::Both {
                self.clock.advance(sub.mult * 0.5);
            } else if couples == sub.rep {
                self.clock.advance(sub.mult);
            }
        }
    }

    fn chain_complete(&mut self, k: usize) {
        if !self.scheme.is_composite() { return; }
        // combine states in a common basis
        self.fourier(self.scheme.first_rep());
        let value = self.scheme.chains()[k].value();
        if self.clock.step == DIAGNOSTIC_STEP {
            debug!("group {} complete, applying coeff = {}", k, value);
        }
        if k == self.scheme.chain_count() - 1 {
            self.wf.collect(value);
        } else {
            self.wf.accumulate(value);
        }
    }

    /// Advance the model by one full step.
    ///
    /// For composite schemes, the model and clock are backed up once before
    /// the first chain, every later chain starts from the restored backup, and
    /// chain results are accumulated with their weights, the last chain
    /// collecting the composite. The model is left in the default
    /// representation.
    pub fn make_step(&mut self) {
        self.chain_backup();
        for k in 0..self.scheme.chain_count() {
            self.chain_restore(k);
            self.chain_evolve(k);
            self.chain_complete(k);
        }
        self.fourier(self.scheme.first_rep());
        self.clock.step += 1;
    }

    /// Evaluate all observables for one reporting window and update the
    /// energy accounting.
    pub fn compute_each<O>(&mut self, when: When, pass: usize, outputs: &mut O)
    where O: OutputSink + ?Sized
    {
        self.pipeline.compute_each(
            &mut self.wf, self.mode, when, &self.clock, pass, outputs);
        if let Some(total) = self.pipeline.total_energy() {
            self.energy.total = total;
        }
        if let Some(difference) = self.pipeline.energy_difference() {
            self.energy.difference = difference;
        }
    }

    /// Run a full propagation.
    ///
    /// `worker` is called with the phase, the step count, the pass index, and
    /// the model after every reporting window.
    pub fn run<O, F>(&mut self, outputs: &mut O, mut worker: F, pass: usize)
    where
        O: OutputSink + ?Sized,
        F: FnMut(When, usize, usize, &W),
    {
        outputs.init(
            self.mode, self.scheme.name(), pass, self.pipeline.columns());
        worker(When::AtStart, self.clock.step, pass, &self.wf);
        self.compute_each(When::AtStart, pass, outputs);
        while self.still_evolving() {
            self.make_step();
            self.compute_each(When::During, pass, outputs);
            self.wf.post_step(self.mode);
            worker(When::During, self.clock.step, pass, &self.wf);
        }

        self.make_step();
        self.compute_each(When::AtEnd, pass, outputs);
        self.wf.post_step(self.mode);
        worker(When::AtEnd, self.clock.step, pass, &self.wf);
        info!(
            "split propagation done: {} steps, t = {}, energy = {}",
            self.clock.step, self.clock.timer, self.energy.total,
        );
    }

    /// Like [`Self::run`], but with no per-step callback.
    pub fn run_quiet<O>(&mut self, outputs: &mut O, pass: usize)
    where O: OutputSink + ?Sized
    {
        self.run(outputs, |_, _, _, _| { }, pass);
    }
}
