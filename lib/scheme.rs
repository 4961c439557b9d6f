//! Operator-splitting schemes.
//!
//! A [`SplitScheme`] decomposes one time step into one or more [`Chain`]s,
//! each an ordered sequence of [`SubStep`]s acting in a single representation
//! for a fraction of the step. Multi-chain schemes evolve every chain from the
//! same initial state and combine the results with per-chain weights; see
//! [`docs`][crate::docs#composite-schemes].
//!
//! Schemes are validated once, on construction, and are immutable afterward.

use crate::{
    error::SchemeError,
    rep::Rep,
    DEF_EPSILON,
};

pub type SchemeResult<T> = Result<T, SchemeError>;

/// A single operator application: evolve in `rep` for `mult * dt`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SubStep {
    /// Representation in which the operator acts.
    pub rep: Rep,
    /// Signed multiplier on the time step.
    pub mult: f64,
}

impl SubStep {
    /// Create a new sub-step.
    pub fn new(rep: Rep, mult: f64) -> Self { Self { rep, mult } }
}

impl From<(Rep, f64)> for SubStep {
    fn from(rm: (Rep, f64)) -> Self { Self::new(rm.0, rm.1) }
}

/// An ordered sequence of sub-steps with a combination weight.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    subs: Vec<SubStep>,
    value: f64,
}

impl Chain {
    /// Create a new chain. The weight `value` is only used in schemes with
    /// more than one chain.
    pub fn new<I, S>(value: f64, subs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubStep>,
    {
        Self { subs: subs.into_iter().map(Into::into).collect(), value }
    }

    /// Return the sub-steps in order.
    pub fn subs(&self) -> &[SubStep] { &self.subs }

    /// Return the combination weight.
    pub fn value(&self) -> f64 { self.value }

    /// Return the number of sub-steps.
    pub fn len(&self) -> usize { self.subs.len() }

    /// Return `true` if the chain has no sub-steps.
    pub fn is_empty(&self) -> bool { self.subs.is_empty() }

    /// Return the representation of the first sub-step.
    ///
    /// *Panics if the chain is empty*.
    pub fn first_rep(&self) -> Rep { self.subs[0].rep }

    /// Return the representation of the last sub-step.
    ///
    /// *Panics if the chain is empty*.
    pub fn last_rep(&self) -> Rep { self.subs[self.subs.len() - 1].rep }

    /// Return the sum of multipliers over all sub-steps in `rep`.
    pub fn total(&self, rep: Rep) -> f64 {
        self.subs.iter()
            .filter(|sub| sub.rep == rep)
            .map(|sub| sub.mult)
            .sum()
    }

    fn validate(&self, k: usize) -> SchemeResult<()> {
        if self.subs.is_empty() { return Err(SchemeError::EmptyChain(k)); }
        if !self.value.is_finite() {
            return Err(SchemeError::NonFinite { chain: k, value: self.value });
        }
        for (i, sub) in self.subs.iter().enumerate() {
            if !sub.rep.is_concrete() {
                return Err(
                    SchemeError::BadRep { chain: k, sub: i, rep: sub.rep });
            }
            if !sub.mult.is_finite() {
                return Err(
                    SchemeError::NonFinite { chain: k, value: sub.mult });
            }
        }
        for rep in [Rep::Pos, Rep::Mom] {
            let total = self.total(rep);
            if (total - 1.0).abs() > DEF_EPSILON {
                return Err(
                    SchemeError::InconsistentTotal { chain: k, rep, total });
            }
        }
        Ok(())
    }
}

/// An ordered, validated set of chains describing one time step.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitScheme {
    name: String,
    chains: Vec<Chain>,
}

impl SplitScheme {
    /// Create a new scheme from a set of chains.
    ///
    /// Fails if there are no chains, if any chain is empty, if any sub-step
    /// does not act in a concrete representation, if any coefficient is
    /// non-finite, if a chain's multipliers do not add to a full step in each
    /// representation, or if the weights of a multi-chain scheme do not sum
    /// to 1.
    pub fn new<S>(name: S, chains: Vec<Chain>) -> SchemeResult<Self>
    where S: Into<String>
    {
        if chains.is_empty() { return Err(SchemeError::NoChains); }
        chains.iter().enumerate()
            .try_for_each(|(k, chain)| chain.validate(k))?;
        if chains.len() > 1 {
            let weights: f64 = chains.iter().map(Chain::value).sum();
            if (weights - 1.0).abs() > DEF_EPSILON {
                return Err(SchemeError::BadWeights(weights));
            }
        }
        Ok(Self { name: name.into(), chains })
    }

    /// First-order Lie-Trotter splitting, `A(dt) B(dt)`.
    pub fn lie(first: Rep) -> Self {
        let second = first.inverse();
        Self::new("lie", vec![Chain::new(1.0, [(first, 1.0), (second, 1.0)])])
            .expect("lie scheme is well-formed")
    }

    /// Second-order symmetric Strang splitting, `A(dt/2) B(dt) A(dt/2)`.
    ///
    /// ```
    /// use splitstep::{ Rep, SplitScheme };
    /// let scheme = SplitScheme::strang(Rep::Pos);
    /// assert_eq!(scheme.chain_count(), 1);
    /// assert_eq!(scheme.first_rep(), Rep::Pos);
    /// assert_eq!(scheme.inv_rep(), Rep::Mom);
    /// ```
    pub fn strang(first: Rep) -> Self {
        let second = first.inverse();
        Self::new(
            "strang",
            vec![Chain::new(1.0, [(first, 0.5), (second, 1.0), (first, 0.5)])],
        )
        .expect("strang scheme is well-formed")
    }

    /// Fourth-order Forest-Ruth splitting: three Strang steps of lengths
    /// `x₁ dt`, `x₀ dt`, `x₁ dt` with `x₀ = 1 - 2 x₁`.
    ///
    /// The middle step runs backward in time, which makes this scheme
    /// unsuitable for imaginary-time propagation.
    pub fn forest_ruth(first: Rep) -> Self {
        let second = first.inverse();
        let cbrt2 = 2.0_f64.cbrt();
        let x1 = (2.0 - cbrt2).recip();
        let x0 = -cbrt2 * x1;
        Self::new(
            "forest_ruth",
            vec![Chain::new(1.0, [
                (first, 0.5 * x1),
                (second, x1),
                (first, 0.5 * (x1 + x0)),
                (second, x0),
                (first, 0.5 * (x0 + x1)),
                (second, x1),
                (first, 0.5 * x1),
            ])],
        )
        .expect("forest-ruth scheme is well-formed")
    }

    /// Second-order symmetrically weighted sequential splitting,
    /// `½ A(dt) B(dt) + ½ B(dt) A(dt)`.
    pub fn symmetrized_lie(first: Rep) -> Self {
        let second = first.inverse();
        Self::new(
            "symmetrized_lie",
            vec![
                Chain::new(0.5, [(first, 1.0), (second, 1.0)]),
                Chain::new(0.5, [(second, 1.0), (first, 1.0)]),
            ],
        )
        .expect("symmetrized lie scheme is well-formed")
    }

    /// Fourth-order Richardson extrapolation of Strang splitting,
    /// `(4 S(dt/2)² - S(dt)) / 3`.
    pub fn extrapolated_strang(first: Rep) -> Self {
        let second = first.inverse();
        Self::new(
            "extrapolated_strang",
            vec![
                Chain::new(
                    -1.0 / 3.0,
                    [(first, 0.5), (second, 1.0), (first, 0.5)],
                ),
                Chain::new(
                    4.0 / 3.0,
                    [
                        (first, 0.25),
                        (second, 0.5),
                        (first, 0.5),
                        (second, 0.5),
                        (first, 0.25),
                    ],
                ),
            ],
        )
        .expect("extrapolated strang scheme is well-formed")
    }

    /// Return the name of the scheme.
    pub fn name(&self) -> &str { &self.name }

    /// Return the chains in order.
    pub fn chains(&self) -> &[Chain] { &self.chains }

    /// Return the number of chains.
    pub fn chain_count(&self) -> usize { self.chains.len() }

    /// Return `true` if results of separate chains are combined.
    pub fn is_composite(&self) -> bool { self.chains.len() > 1 }

    /// Return the default representation, in which every step starts and
    /// ends.
    pub fn first_rep(&self) -> Rep { self.chains[0].first_rep() }

    /// Return the complement of [`Self::first_rep`].
    pub fn inv_rep(&self) -> Rep { self.first_rep().inverse() }
}
