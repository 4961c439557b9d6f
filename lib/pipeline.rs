//! Evaluation of an [`ObservableSet`] once per reporting window.
//!
//! A window is evaluated in up to three passes:
//! 1. expressions with no representation preference or with an affinity for
//!    the default representation;
//! 2. if anything needs it, a single transform into the inverse
//!    representation, the expressions with an affinity for it, and a single
//!    transform back;
//! 3. expressions flagged late.
//!
//! Within a pass, expressions are evaluated in declaration order. Averages with
//! a [`Rep::Both`] affinity are evaluated in both of the first two passes and
//! their contributions summed. Sums and Changes are evaluated exactly once, in
//! the earliest pass in which all of their dependencies are complete.

use tracing::warn;
use crate::{
    clock::Clock,
    error::ObsError,
    model::WaveFunction,
    observable::{ EnergyIds, Expr, ObsId, ObservableSet, ValueSource },
    output::{ OutputSink, Record },
    rep::{ Mode, Rep, When },
};

pub type ObsResult<T> = Result<T, ObsError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Slot {
    first: bool,
    inverse: bool,
    late: bool,
}

/// Runtime state for evaluating an [`ObservableSet`]: the evaluation plan, the
/// most recently stored value of every expression, and the one-value history
/// of every Change.
#[derive(Clone, Debug)]
pub struct Pipeline {
    set: ObservableSet,
    first: Rep,
    inv: Rep,
    plan: Vec<Slot>,
    needs_inverse: bool,
    columns: Vec<String>,
    last: Vec<f64>,
    window: Vec<Option<f64>>,
    change_prev: Vec<f64>,
    missing_warned: Vec<bool>,
}

impl Pipeline {
    /// Validate `set` and build an evaluation plan for a scheme whose default
    /// representation is `first`.
    ///
    /// Fails if a Sum or Change refers to an expression not declared before
    /// it (including itself), refers to an Operation, or if a Sum has no
    /// terms.
    pub fn new(set: ObservableSet, first: Rep) -> ObsResult<Self> {
        Self::validate(&set)?;
        let inv = first.inverse();
        let plan: Vec<Slot>
            = (0..set.len())
            .map(|k| Self::slot(&set, ObsId(k), first, inv))
            .collect();
        let needs_inverse = plan.iter().any(|slot| slot.inverse);
        let columns: Vec<String>
            = set.entries().iter()
            .filter(|entry| entry.expr.stores())
            .map(|entry| entry.label.clone())
            .collect();
        let n = set.len();
        Ok(Self {
            set,
            first,
            inv,
            plan,
            needs_inverse,
            columns,
            last: vec![0.0; n],
            window: vec![None; n],
            change_prev: vec![0.0; n],
            missing_warned: vec![false; n],
        })
    }

    fn validate(set: &ObservableSet) -> ObsResult<()> {
        let entries = set.entries();
        for (at, entry) in entries.iter().enumerate() {
            if let Expr::Sum(terms) = &entry.expr {
                if terms.is_empty() {
                    return Err(ObsError::EmptySum {
                        at, label: entry.label.clone() });
                }
            }
            for dep in entry.expr.deps() {
                if dep.0 >= at {
                    return Err(ObsError::ForwardReference {
                        at, label: entry.label.clone(), target: dep.0 });
                }
                if !entries[dep.0].expr.stores() {
                    return Err(ObsError::NoValue {
                        at, label: entry.label.clone(), target: dep.0 });
                }
            }
        }
        if let Some(ids) = set.energy() {
            for target in [ids.total.0, ids.difference.0] {
                entries.get(target)
                    .is_some_and(|entry| entry.expr.stores())
                    .then_some(())
                    .ok_or(ObsError::BadEnergy { target })?;
            }
        }
        Ok(())
    }

    // decide in which pass(es) an expression is evaluated
    fn slot(set: &ObservableSet, id: ObsId, first: Rep, inv: Rep) -> Slot {
        if set.is_late(id) {
            return Slot { first: false, inverse: false, late: true };
        }
        let rep = set.rep(id);
        let entry = &set.entries()[id.0];
        if entry.expr.is_derived() {
            let inverse = rep.intersects(inv);
            Slot { first: !inverse, inverse, late: false }
        } else {
            Slot {
                first: rep == Rep::None || rep.intersects(first),
                inverse: rep.intersects(inv),
                late: false,
            }
        }
    }

    /// Return the default representation.
    pub fn first_rep(&self) -> Rep { self.first }

    /// Return the inverse representation.
    pub fn inv_rep(&self) -> Rep { self.inv }

    /// Return `true` if any expression requires the inverse representation.
    pub fn needs_inverse(&self) -> bool { self.needs_inverse }

    /// Return the labels of all value-storing expressions, in declaration
    /// order.
    pub fn columns(&self) -> &[String] { &self.columns }

    /// Return the underlying set.
    pub fn set(&self) -> &ObservableSet { &self.set }

    /// Return the most recently stored value of `id`.
    ///
    /// *Panics if `id` is out of bounds*.
    pub fn last_value(&self, id: ObsId) -> f64 { self.last[id.0] }

    /// Return the ids used for energy accounting, if any.
    pub fn energy(&self) -> Option<EnergyIds> { self.set.energy() }

    /// Return the most recent total energy, if tracked.
    pub fn total_energy(&self) -> Option<f64> {
        self.set.energy().map(|ids| self.last[ids.total.0])
    }

    /// Return the most recent change in total energy, if tracked.
    pub fn energy_difference(&self) -> Option<f64> {
        self.set.energy().map(|ids| self.last[ids.difference.0])
    }

    /// Clear all stored values and Change histories.
    pub fn reset(&mut self) {
        self.last.iter_mut().for_each(|v| { *v = 0.0; });
        self.window.iter_mut().for_each(|v| { *v = None; });
        self.change_prev.iter_mut().for_each(|v| { *v = 0.0; });
    }

    fn store(&mut self, id: usize, val: f64) {
        self.last[id] = val;
        self.window[id] = Some(val);
    }

    fn compute<W>(
        &mut self,
        wf: &mut W,
        mode: Mode,
        rep: Rep,
        clock: &Clock,
        id: usize,
    )
    where W: WaveFunction
    {
        let val = match &self.set.entries()[id].expr {
            Expr::Value(ValueSource::Time) => Some(clock.timer),
            Expr::Value(ValueSource::Step) => Some(clock.step as f64),
            Expr::Value(ValueSource::Model(key)) => {
                let val = wf.value(key, clock.timer);
                if val.is_none() && !self.missing_warned[id] {
                    warn!("model exposes no value for key {:?}", key);
                    self.missing_warned[id] = true;
                }
                Some(val.unwrap_or(f64::NAN))
            },
            Expr::Average(q) => {
                let part = wf.average(rep, *q);
                // second contribution of a Both average
                match self.window[id] {
                    Some(prev) if rep == self.inv => Some(prev + part),
                    _ => Some(part),
                }
            },
            Expr::Operation(action) => {
                wf.operation(mode, rep, *action);
                None
            },
            Expr::Sum(terms) =>
                Some(terms.iter().map(|t| self.last[t.0]).sum::<f64>()),
            Expr::Change(of) => {
                let curr = self.last[of.0];
                let val = curr - self.change_prev[id];
                self.change_prev[id] = curr;
                Some(val)
            },
        };
        if let Some(val) = val { self.store(id, val); }
    }

    /// Evaluate every expression for one reporting window and hand the result
    /// to `sink`.
    ///
    /// The model must be in the default representation on entry; it is in the
    /// default representation on return.
    pub fn compute_each<W, O>(
        &mut self,
        wf: &mut W,
        mode: Mode,
        when: When,
        clock: &Clock,
        pass: usize,
        sink: &mut O,
    )
    where
        W: WaveFunction,
        O: OutputSink + ?Sized,
    {
        self.window.iter_mut().for_each(|v| { *v = None; });
        let n = self.plan.len();

        for id in 0..n {
            if self.plan[id].first {
                let rep = self.pass_rep(id, self.first);
                self.compute(wf, mode, rep, clock, id);
            }
        }

        if self.needs_inverse {
            wf.fourier(self.inv);
            for id in 0..n {
                if self.plan[id].inverse {
                    let rep = self.pass_rep(id, self.inv);
                    self.compute(wf, mode, rep, clock, id);
                }
            }
            wf.fourier(self.first);
        } else if clock.step < 1 {
            warn!(
                "computations do not require a transform to {:?}; export the \
                wavefunction explicitly if it is needed in that representation",
                self.inv,
            );
        }

        for id in 0..n {
            if self.plan[id].late {
                let rep = self.pass_rep(id, self.first);
                self.compute(wf, mode, rep, clock, id);
            }
        }

        let values: Vec<f64>
            = self.set.entries().iter().zip(&self.last)
            .filter(|(entry, _)| entry.expr.stores())
            .map(|(_, val)| *val)
            .collect();
        let record = Record { pass, when, step: clock.step, time: clock.timer, values };
        sink.log_or_pass(mode, &record);
    }

    // representation passed to the model for an expression evaluated while
    // the state is in `current`
    fn pass_rep(&self, id: usize, current: Rep) -> Rep {
        if self.set.rep(ObsId(id)) == Rep::None { Rep::None } else { current }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::Quantity;

    #[test]
    fn plan_places_derived_after_dependencies() {
        let set = ObservableSet::with_energy();
        let ids = set.energy().unwrap();
        let pipe = Pipeline::new(set, Rep::Pos).unwrap();
        // potential in the first pass, kinetic in the inverse pass
        assert_eq!(pipe.plan[0], Slot { first: true, inverse: false, late: false });
        assert_eq!(pipe.plan[1], Slot { first: false, inverse: true, late: false });
        assert_eq!(
            pipe.plan[ids.total.0],
            Slot { first: false, inverse: true, late: false },
        );
        assert_eq!(
            pipe.plan[ids.difference.0],
            Slot { first: false, inverse: true, late: false },
        );
        assert!(pipe.needs_inverse());
    }

    #[test]
    fn plan_both_average() {
        let mut set = ObservableSet::new();
        set.average("energy", Quantity::Energy);
        let pipe = Pipeline::new(set, Rep::Mom).unwrap();
        assert_eq!(pipe.plan[0], Slot { first: true, inverse: true, late: false });
    }

    #[test]
    fn plan_first_only() {
        let mut set = ObservableSet::new();
        let t = set.value("time", ValueSource::Time);
        let x = set.average("x", Quantity::Position);
        set.sum("t + x", &[t, x]);
        let pipe = Pipeline::new(set, Rep::Pos).unwrap();
        assert!(!pipe.needs_inverse());
        assert!(pipe.plan.iter().all(|slot| slot.first && !slot.inverse));
    }

    #[test]
    fn late_propagates_to_dependents() {
        let mut set = ObservableSet::new();
        let n = set.push_late("norm", Expr::Average(Quantity::Norm));
        set.change("norm_change", n);
        let pipe = Pipeline::new(set, Rep::Pos).unwrap();
        assert!(pipe.plan.iter().all(|slot| slot.late));
    }

    #[test]
    fn rejects_forward_reference() {
        let mut set = ObservableSet::new();
        set.change("self", ObsId(0));
        assert!(matches!(
            Pipeline::new(set, Rep::Pos),
            Err(ObsError::ForwardReference { at: 0, target: 0, .. }),
        ));
        let mut set = ObservableSet::new();
        set.sum("ahead", &[ObsId(1)]);
        set.value("time", ValueSource::Time);
        assert!(matches!(
            Pipeline::new(set, Rep::Pos),
            Err(ObsError::ForwardReference { at: 0, target: 1, .. }),
        ));
    }

    #[test]
    fn rejects_operation_dependency() {
        let mut set = ObservableSet::new();
        let op = set.operation("normalize", crate::observable::Action::Normalize);
        set.change("op_change", op);
        assert!(matches!(
            Pipeline::new(set, Rep::Pos),
            Err(ObsError::NoValue { at: 1, target: 0, .. }),
        ));
    }

    #[test]
    fn rejects_empty_sum() {
        let mut set = ObservableSet::new();
        set.sum("nothing", &[]);
        assert!(matches!(
            Pipeline::new(set, Rep::Pos),
            Err(ObsError::EmptySum { at: 0, .. }),
        ));
    }

    #[test]
    fn rejects_bad_energy_ids() {
        let mut set = ObservableSet::new();
        set.value("time", ValueSource::Time);
        set.track_energy(ObsId(5), ObsId(6));
        assert!(matches!(
            Pipeline::new(set, Rep::Pos),
            Err(ObsError::BadEnergy { target: 5 }),
        ));

        let mut set = ObservableSet::new();
        let e = set.average("energy", Quantity::Energy);
        let op = set.operation("normalize", crate::observable::Action::Normalize);
        set.track_energy(e, op);
        assert!(matches!(
            Pipeline::new(set, Rep::Pos),
            Err(ObsError::BadEnergy { target: 1 }),
        ));
    }

    #[test]
    fn columns_skip_operations() {
        let mut set = ObservableSet::new();
        set.value("time", ValueSource::Time);
        set.operation("normalize", crate::observable::Action::Normalize);
        set.average("norm", Quantity::Norm);
        let pipe = Pipeline::new(set, Rep::Pos).unwrap();
        assert_eq!(pipe.columns(), &["time".to_string(), "norm".to_string()]);
    }
}
