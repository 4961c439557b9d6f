#![allow(dead_code, non_snake_case)]

//! Provides a split-operator propagation engine for the time-dependent
//! Schrödinger equation, driving both relaxation to an eigenstate in
//! imaginary time and real-time evolution under a time-dependent coupling.
//!
//! The engine is organized around the following pieces:
//! - [`clock`]: simulated time, step count, and a single-slot time checkpoint
//! - [`scheme`]: composite (multi-chain) operator-splitting schemes
//! - [`observable`]: declarative observables evaluated once per reporting
//!   window, with representation bookkeeping
//! - [`pipeline`]: evaluation plan for an observable set
//! - [`propagator`]: the evolution loop and runner state machine
//! - [`output`]: sinks deciding which reporting windows are persisted
//!
//! The physical model is abstracted behind [`model::WaveFunction`];
//! [`grid::Grid1D`] provides a one-dimensional, FFT-based implementation.
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod rep;
pub mod clock;
pub mod scheme;
pub mod model;
pub mod observable;
pub mod pipeline;
pub mod output;
pub mod propagator;
pub mod config;
pub mod field;
pub mod grid;
pub mod units;
pub mod utils;

pub mod docs;

pub(crate) const DEF_EPSILON: f64 = 1e-9;

pub use crate::{
    clock::Clock,
    error::PropError,
    model::WaveFunction,
    observable::{ Action, Expr, ObsId, ObservableSet, Quantity, ValueSource },
    output::{ MemorySink, OutputSink, Record, TableSink },
    pipeline::Pipeline,
    propagator::SplitPropagator,
    rep::{ Mode, Rep, When },
    scheme::{ Chain, SplitScheme, SubStep },
};
