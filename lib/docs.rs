//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Composite schemes](#composite-schemes)
//! - [Representations](#representations)
//! - [Imaginary time](#imaginary-time)
//! - [Observables](#observables)
//! - [Units](#units)
//!
//! # Background
//! The time-dependent Schrödinger equation
//! ```text
//!   ∂ψ
//! i -- = H(t) ψ
//!   ∂t
//! ```
//! is solved here for Hamiltonians that split into a part diagonal in position
//! space and a part diagonal in momentum space,
//! ```text
//! H = H_x + H_p
//!
//! H_x = V(x)
//! H_p = p² / 2
//! ```
//! The exact propagator over a step *dt* is exp(-*i* *H* *dt*), which cannot
//! be applied directly because *H*<sub>*x*</sub> and *H*<sub>*p*</sub> do not
//! commute. Each of the two exponentials on its own is trivial, however: in
//! its own basis it is a pointwise multiplication by a phase factor, and the
//! two bases are related by the (fast) Fourier transform. By the
//! Baker-Campbell-Hausdorff formula,
//! ```text
//!  -i H dt    -i H_x dt  -i H_p dt
//! e        = e          e          + O(dt²)
//! ```
//! which is the first-order Lie-Trotter splitting. Placing the
//! *H*<sub>*p*</sub> term between two half-steps of *H*<sub>*x*</sub> cancels
//! the leading commutator and gives Strang splitting, with a local error of
//! *O*(*dt*³):
//! ```text
//!  -i H dt    -i H_x dt/2  -i H_p dt  -i H_x dt/2
//! e        = e            e          e            + O(dt³)
//! ```
//! In general, a step is a product of sub-steps exp(-*i* *H*<sub>*r*</sub>
//! *c*<sub>*j*</sub> *dt*), where *r* alternates between the two bases and the
//! multipliers *c*<sub>*j*</sub> acting in each basis sum to 1. Higher-order
//! products exist (e.g. Forest-Ruth) but require negative multipliers, i.e.
//! steps backward in time.
//!
//! When *H* depends explicitly on time, each sub-step is evaluated with the
//! time-dependent part taken at the current value of the clock, and the clock
//! is advanced only across the sub-steps in which the time dependence acts.
//! This makes the effective sampling times of the coupling follow the
//! splitting: for Strang splitting with a coupling in position space, the
//! coupling is sampled at *t* and *t* + *dt*/2.
//!
//! # Composite schemes
//! Instead of building a single, longer product, one can take a linear
//! combination of several short products evolved from the same initial state:
//! ```text
//! ψ(t + dt) ≈ Σ_k w_k S_k(dt) ψ(t),    Σ_k w_k = 1
//! ```
//! Each *S*<sub>*k*</sub> is called a *chain*. For example, averaging the two
//! orderings of Lie-Trotter splitting,
//! ```text
//! ψ(t + dt) ≈ ½ e^{-i H_x dt} e^{-i H_p dt} ψ(t)
//!           + ½ e^{-i H_p dt} e^{-i H_x dt} ψ(t)
//! ```
//! cancels the first-order error, and Richardson extrapolation of Strang
//! splitting,
//! ```text
//! ψ(t + dt) ≈ (4/3) S(dt/2) S(dt/2) ψ(t) - (1/3) S(dt) ψ(t)
//! ```
//! cancels the third-order error. Weights may be negative. Note that a linear
//! combination of unitary evolutions is not unitary in general, so the norm is
//! conserved only up to the order of the scheme.
//!
//! Evaluating a composite scheme needs two extra buffers: one holding the
//! initial state (and the initial value of the clock), so that every chain can
//! start from it, and one holding the running weighted sum. Every chain
//! but the last adds its weighted result to the running sum. The last chain
//! combines its own weighted result with the running sum to give the new
//! state. For single-chain schemes none of this is needed and the weight is
//! ignored.
//!
//! # Representations
//! The wavefunction is always held in exactly one basis, position or momentum,
//! and is transformed only when a sub-step or an observable requires the other
//! one. Between steps, the wavefunction is kept in the *default*
//! representation, which is the basis of the first sub-step of the first
//! chain. The other basis is called the *inverse* representation.
//!
//! Since the FFT is the dominant cost of a step, consecutive sub-steps in the
//! same basis are not separated by a transform, and the observable pipeline
//! uses at most one round trip into the inverse representation per reporting
//! window.
//!
//! # Imaginary time
//! Substituting *t* → -*i* *τ* turns every phase factor exp(-*i* *E* *dt*)
//! into a decay factor exp(-*E* *dτ*). Expanding the initial state in
//! eigenstates of *H*, every component decays at a rate set by its energy, so
//! that after renormalization the state converges to the lowest eigenstate
//! with non-zero overlap with the initial state. The norm must be restored
//! after every step.
//!
//! Convergence is measured by the change in the total energy between
//! successive steps: relaxation stops once its magnitude falls below a
//! threshold or the step budget is exhausted.
//!
//! # Observables
//! Quantities are evaluated once per reporting window from a declarative list
//! of expressions. Each expression has an *affinity*: the basis (or bases) in
//! which its value can be computed cheaply. For instance, ⟨*V*⟩ has an
//! affinity for position space, ⟨*p*²/2⟩ for momentum space, and the norm has
//! none. The total energy ⟨*H*⟩ has an affinity for both: its potential part
//! is computed in position space and its kinetic part in momentum space, and
//! the two contributions are added.
//!
//! Sums and differences between windows are derived from values computed
//! earlier, so they carry the combined affinity of what they refer to and are
//! computed after all of their inputs.
//!
//! # Units
//! All propagation is done in atomic units, where
//! ```text
//! ħ = mₑ = e = 4πε₀ = 1
//! ```
//! so that the kinetic term is *p*²/2 and energies are in Hartree. The
//! coupling to a linearly polarized laser field in the dipole approximation
//! can be written in either the length gauge,
//! ```text
//! H(t) = p² / 2 + V(x) + x E(t)
//! ```
//! which acts in position space, or the velocity gauge,
//! ```text
//! H(t) = (p + A(t))² / 2 + V(x)
//! ```
//! which acts in momentum space, with *E*(*t*) = -*dA*/*dt*. Items in
//! [`units`][crate::units] convert laboratory quantities (wavelength,
//! intensity, femtoseconds, electronvolts) to and from atomic units.
