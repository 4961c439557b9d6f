//! Declarative observable expressions.
//!
//! An [`ObservableSet`] is an ordered list of labeled [`Expr`]s. Each
//! expression is identified by the [`ObsId`] returned when it is declared, and
//! derived expressions ([`Expr::Sum`], [`Expr::Change`]) refer to earlier
//! expressions through these ids. The set is fixed once a propagator is built;
//! evaluation is handled by [`Pipeline`][crate::pipeline::Pipeline].

use crate::rep::Rep;

/// Expectation values a model can compute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// ⟨ψ|ψ⟩
    Norm,
    /// ⟨x⟩
    Position,
    /// ⟨p⟩
    Momentum,
    /// ⟨V⟩, including any position-space coupling.
    PotentialEnergy,
    /// ⟨T⟩, including any momentum-space coupling.
    KineticEnergy,
    /// ⟨T + V⟩, assembled from one contribution per representation.
    Energy,
}

impl Quantity {
    /// Representation affinity.
    pub fn rep(self) -> Rep {
        match self {
            Self::Norm => Rep::None,
            Self::Position | Self::PotentialEnergy => Rep::Pos,
            Self::Momentum | Self::KineticEnergy => Rep::Mom,
            Self::Energy => Rep::Both,
        }
    }

    /// Default label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Norm => "norm",
            Self::Position => "position",
            Self::Momentum => "momentum",
            Self::PotentialEnergy => "potential_energy",
            Self::KineticEnergy => "kinetic_energy",
            Self::Energy => "energy",
        }
    }
}

/// Side-effecting actions a model can apply to its state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Rescale the state to unit norm.
    Normalize,
    /// Remove the global phase so that the largest-amplitude component is
    /// real and positive.
    DiscardPhase,
}

impl Action {
    /// Representation affinity.
    pub fn rep(self) -> Rep { Rep::None }
}

/// Sources for instantaneous values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// Elapsed simulated time.
    Time,
    /// Number of completed steps.
    Step,
    /// A scalar exposed by the model under a key.
    Model(String),
}

/// Identity of an expression within an [`ObservableSet`]: its index in
/// declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObsId(pub usize);

impl ObsId {
    /// Return the declaration index.
    pub fn index(self) -> usize { self.0 }
}

/// A single observable expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// An instantaneous value read from the clock or the model.
    Value(ValueSource),
    /// An expectation value read from the model state.
    Average(Quantity),
    /// An action applied to the model state; stores nothing.
    Operation(Action),
    /// The sum of the most recently stored values of earlier expressions.
    Sum(Vec<ObsId>),
    /// The difference between the current and the previously stored value of
    /// an earlier expression.
    Change(ObsId),
}

impl Expr {
    /// Return `true` if evaluating the expression stores a value.
    pub fn stores(&self) -> bool { !matches!(self, Self::Operation(_)) }

    /// Return `true` if the expression reads other expressions.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Sum(_) | Self::Change(_))
    }

    /// Return the expressions read by `self`.
    pub fn deps(&self) -> &[ObsId] {
        match self {
            Self::Sum(terms) => terms,
            Self::Change(of) => std::slice::from_ref(of),
            _ => &[],
        }
    }
}

/// An expression with its label and timing flag.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// Column label.
    pub label: String,
    /// The expression.
    pub expr: Expr,
    /// Evaluate only after the inverse-representation pass.
    pub late: bool,
}

/// Ids of the expressions tracking the total energy and its frame-to-frame
/// change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EnergyIds {
    /// Total energy.
    pub total: ObsId,
    /// Change in total energy.
    pub difference: ObsId,
}

/// An ordered set of observable expressions.
///
/// ```
/// use splitstep::{ ObservableSet, Quantity, ValueSource };
///
/// let mut obs = ObservableSet::with_energy();
/// let t = obs.value("time", ValueSource::Time);
/// let x = obs.average("position", Quantity::Position);
/// let dx = obs.change("position_change", x);
/// assert_eq!(obs.len(), 7);
/// assert!(t < x && x < dx);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservableSet {
    entries: Vec<Entry>,
    energy: Option<EnergyIds>,
}

impl ObservableSet {
    /// Create a new, empty set.
    pub fn new() -> Self { Self::default() }

    /// Create a new set pre-populated with potential, kinetic, and total
    /// energy and the change in total energy, registered as the energy
    /// accounting used for imaginary-time convergence.
    pub fn with_energy() -> Self {
        let mut new = Self::new();
        let pot = new.average(
            Quantity::PotentialEnergy.label(), Quantity::PotentialEnergy);
        let kin = new.average(
            Quantity::KineticEnergy.label(), Quantity::KineticEnergy);
        let total = new.sum("total_energy", &[pot, kin]);
        let difference = new.change("energy_difference", total);
        new.energy = Some(EnergyIds { total, difference });
        new
    }

    /// Declare an expression, returning its id.
    pub fn push<S>(&mut self, label: S, expr: Expr) -> ObsId
    where S: Into<String>
    {
        self.entries.push(Entry { label: label.into(), expr, late: false });
        ObsId(self.entries.len() - 1)
    }

    /// Declare an expression evaluated only after the inverse-representation
    /// pass, returning its id. Late expressions see the model in the default
    /// representation.
    pub fn push_late<S>(&mut self, label: S, expr: Expr) -> ObsId
    where S: Into<String>
    {
        self.entries.push(Entry { label: label.into(), expr, late: true });
        ObsId(self.entries.len() - 1)
    }

    /// Declare an [`Expr::Value`].
    pub fn value<S>(&mut self, label: S, source: ValueSource) -> ObsId
    where S: Into<String>
    {
        self.push(label, Expr::Value(source))
    }

    /// Declare an [`Expr::Average`].
    pub fn average<S>(&mut self, label: S, quantity: Quantity) -> ObsId
    where S: Into<String>
    {
        self.push(label, Expr::Average(quantity))
    }

    /// Declare an [`Expr::Operation`].
    pub fn operation<S>(&mut self, label: S, action: Action) -> ObsId
    where S: Into<String>
    {
        self.push(label, Expr::Operation(action))
    }

    /// Declare an [`Expr::Sum`].
    pub fn sum<S>(&mut self, label: S, terms: &[ObsId]) -> ObsId
    where S: Into<String>
    {
        self.push(label, Expr::Sum(terms.to_vec()))
    }

    /// Declare an [`Expr::Change`].
    pub fn change<S>(&mut self, label: S, of: ObsId) -> ObsId
    where S: Into<String>
    {
        self.push(label, Expr::Change(of))
    }

    /// Register the expressions used for energy accounting. Both must exist
    /// and store a value when the pipeline is built.
    pub fn track_energy(&mut self, total: ObsId, difference: ObsId) {
        self.energy = Some(EnergyIds { total, difference });
    }

    /// Return the ids registered for energy accounting, if any.
    pub fn energy(&self) -> Option<EnergyIds> { self.energy }

    /// Return the declared entries in order.
    pub fn entries(&self) -> &[Entry] { &self.entries }

    /// Return the number of declared expressions.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Return `true` if no expressions are declared.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Return the representation affinity of the expression at `id`.
    ///
    /// Derived expressions take the union of their dependencies' affinities.
    ///
    /// *Panics if `id` is out of bounds*.
    pub fn rep(&self, id: ObsId) -> Rep {
        match &self.entries[id.0].expr {
            Expr::Value(_) => Rep::None,
            Expr::Average(q) => q.rep(),
            Expr::Operation(a) => a.rep(),
            Expr::Sum(terms) => {
                terms.iter()
                    .filter(|t| t.0 < id.0)
                    .fold(Rep::None, |acc, t| acc.union(self.rep(*t)))
            },
            Expr::Change(of) if of.0 < id.0 => self.rep(*of),
            Expr::Change(_) => Rep::None,
        }
    }

    /// Return `true` if the expression at `id`, or anything it depends on, is
    /// flagged late.
    ///
    /// *Panics if `id` is out of bounds*.
    pub fn is_late(&self, id: ObsId) -> bool {
        let entry = &self.entries[id.0];
        entry.late
            || entry.expr.deps().iter()
                .filter(|d| d.0 < id.0)
                .any(|d| self.is_late(*d))
    }
}
