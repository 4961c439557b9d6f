use splitstep::{
    config::PropagatorConfig,
    field::{ Coupling, Pulse },
    grid::Grid1D,
    observable::{ ObservableSet, Quantity, ValueSource },
    output::MemorySink,
    propagator::SplitPropagator,
    rep::{ Mode, Rep, When },
    scheme::SplitScheme,
};

fn harmonic(coupling: Coupling) -> Grid1D {
    Grid1D::new_linspace((-10.0, 10.0, 128), |x| 0.5 * x * x, coupling).unwrap()
}

#[test]
fn relaxes_to_ground_state() {
    // starts twice as wide as the ground state
    let mut wf = harmonic(Coupling::Static);
    wf.set_gaussian(0.0, 2.0, 0.0);
    let mut prop = SplitPropagator::new(
        Mode::Imag,
        &PropagatorConfig::new(0.05, 5000, 1e-12),
        SplitScheme::strang(Rep::Pos),
        wf,
        ObservableSet::with_energy(),
    ).unwrap();
    let mut sink = MemorySink::new(100);
    prop.run_quiet(&mut sink, 0);
    assert!(prop.clock().step < 1000);
    assert!((prop.energy().total - 0.5).abs() < 1e-4);
    assert!(prop.energy().difference.abs() <= 1e-12);
    assert!((prop.wf().norm() - 1.0).abs() < 1e-12);
    let energies = sink.column("total_energy").unwrap();
    assert!(energies.windows(2).all(|w| w[1] <= w[0] + 1e-12));
}

fn oscillate(scheme: SplitScheme) -> (f64, f64) {
    let mut wf = harmonic(Coupling::Static);
    wf.set_gaussian(2.0, 1.0, 0.0);
    let mut obs = ObservableSet::new();
    obs.value("time", ValueSource::Time);
    obs.average("position", Quantity::Position);
    obs.average("norm", Quantity::Norm);
    let mut prop = SplitPropagator::new(
        Mode::Real,
        &PropagatorConfig::new(0.1, 18, 0.0),
        scheme,
        wf,
        obs,
    ).unwrap();
    let mut sink = MemorySink::default();
    prop.run_quiet(&mut sink, 0);
    let last = sink.records().last().unwrap();
    assert_eq!((last.when, last.step), (When::AtEnd, 20));
    let t = last.values[0];
    assert!((t - 2.0).abs() < 1e-12);
    let err = (last.values[1] - 2.0 * t.cos()).abs();
    let drift = (last.values[2] - 1.0).abs();
    (err, drift)
}

#[test]
fn strang_conserves_norm() {
    let (err, drift) = oscillate(SplitScheme::strang(Rep::Pos));
    assert!(drift < 1e-10);
    assert!(err < 1e-2);
}

#[test]
fn composite_schemes_improve_accuracy() {
    let (lie, _) = oscillate(SplitScheme::lie(Rep::Pos));
    let (sym, _) = oscillate(SplitScheme::symmetrized_lie(Rep::Pos));
    let (strang, _) = oscillate(SplitScheme::strang(Rep::Pos));
    let (extrap, drift) = oscillate(SplitScheme::extrapolated_strang(Rep::Pos));
    assert!(sym < 0.2 * lie);
    assert!(extrap < 1e-2 * strang);
    assert!(extrap < 1e-5);
    // weighted combinations are only approximately unitary
    assert!(drift < 1e-5);
}

#[test]
fn gauges_agree_after_pulse() {
    let pulse = Pulse::new(0.05, 1.0, 2.0, 0.0);
    let run = |coupling: Coupling| {
        let mut wf = harmonic(coupling);
        wf.set_gaussian(0.0, 1.0, 0.0);
        let mut obs = ObservableSet::with_energy();
        obs.value("efield", ValueSource::Model("efield".into()));
        let conf = PropagatorConfig { dt: 0.05, max_steps: None, state_accuracy: 0.0 };
        let mut prop = SplitPropagator::new(
            Mode::Real, &conf, SplitScheme::strang(Rep::Pos), wf, obs,
        ).unwrap();
        assert_eq!(prop.clock().max_steps, (pulse.duration() / 0.05) as usize + 1);
        let mut sink = MemorySink::new(10);
        prop.run_quiet(&mut sink, 0);
        assert!(prop.clock().timer > pulse.duration());
        assert_eq!(sink.last("efield"), Some(0.0));
        (prop.energy().total, prop.wf().norm())
    };
    let (e_len, n_len) = run(Coupling::LengthGauge(pulse));
    let (e_vel, n_vel) = run(Coupling::VelocityGauge(pulse));
    // resonant driving pumps energy into the oscillator
    assert!(e_len > 0.505);
    assert!((e_len - e_vel).abs() < 1e-4);
    assert!((n_len - 1.0).abs() < 1e-10);
    assert!((n_vel - 1.0).abs() < 1e-10);
}

#[test]
fn momentum_first_matches_position_first() {
    let run = |first: Rep| {
        let mut wf = harmonic(Coupling::Static);
        wf.set_gaussian(1.0, 1.0, 0.5);
        let mut obs = ObservableSet::new();
        obs.average("energy", Quantity::Energy);
        let mut prop = SplitPropagator::new(
            Mode::Real,
            &PropagatorConfig::new(0.01, 50, 0.0),
            SplitScheme::strang(first),
            wf,
            obs,
        ).unwrap();
        let mut sink = MemorySink::default();
        prop.run_quiet(&mut sink, 0);
        assert_eq!(prop.wf().get_rep(), first);
        sink.column("energy").unwrap()
    };
    let pos = run(Rep::Pos);
    let mom = run(Rep::Mom);
    // E = (σ² + 1/σ²)/4 + x₀²/2 + k₀²/2 for a Gaussian in a unit harmonic well
    assert!((pos[0] - 1.125).abs() < 1e-8);
    assert!((mom[0] - 1.125).abs() < 1e-8);
    // both conserve the energy up to the splitting error
    assert!(pos.iter().all(|e| (e - 1.125).abs() < 1e-3));
    assert!(mom.iter().all(|e| (e - 1.125).abs() < 1e-3));
}
