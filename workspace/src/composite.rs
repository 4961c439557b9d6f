use splitstep::{
    config::PropagatorConfig,
    field::Coupling,
    grid::Grid1D,
    observable::{ ObservableSet, Quantity },
    output::MemorySink,
    propagator::SplitPropagator,
    rep::{ Mode, Rep },
    scheme::SplitScheme,
};
use tracing::info;

const SHIFT: f64 = 2.0;
const T_FINAL: f64 = 4.0;

// error in <x>(T_FINAL) and in the norm for a coherent state in a harmonic
// trap, which has <x>(t) = SHIFT cos(t) exactly
fn errors(scheme: SplitScheme, dt: f64) -> anyhow::Result<(f64, f64)> {
    let mut wf = Grid1D::new_linspace((-12.0, 12.0, 256), |x| 0.5 * x * x, Coupling::Static)?;
    wf.set_gaussian(SHIFT, 1.0, 0.0);
    let mut obs = ObservableSet::new();
    obs.average("position", Quantity::Position);
    obs.average("norm", Quantity::Norm);
    // the loop runs through step max_steps + 1 and the terminal step adds one
    let steps = (T_FINAL / dt).round() as usize;
    let mut prop = SplitPropagator::new(
        Mode::Real,
        &PropagatorConfig::new(dt, steps - 2, 0.0),
        scheme,
        wf,
        obs,
    )?;
    let mut sink = MemorySink::new(usize::MAX);
    prop.run_quiet(&mut sink, 0);
    let t = prop.clock().timer;
    let x = sink.last("position").unwrap_or(f64::NAN);
    let norm = sink.last("norm").unwrap_or(f64::NAN);
    Ok(((x - SHIFT * t.cos()).abs(), (norm - 1.0).abs()))
}

fn main() -> anyhow::Result<()> {
    lib::init_logging();
    let presets: [fn(Rep) -> SplitScheme; 5] = [
        SplitScheme::lie,
        SplitScheme::symmetrized_lie,
        SplitScheme::strang,
        SplitScheme::extrapolated_strang,
        SplitScheme::forest_ruth,
    ];
    let dts = [0.2, 0.1, 0.05, 0.025];
    println!("# {:>20} {:>8} {:>14} {:>14}", "scheme", "dt", "x error", "norm error");
    for make in presets {
        let mut prev: Option<f64> = None;
        for dt in dts {
            let scheme = make(Rep::Pos);
            let name = scheme.name().to_string();
            let (err, drift) = errors(scheme, dt)?;
            println!("  {:>20} {:>8.4} {:>14.6e} {:>14.6e}", name, dt, err, drift);
            if let Some(p) = prev {
                info!("{}: observed order {:.2} at dt = {}", name, (p / err).log2(), dt);
            }
            prev = Some(err);
        }
    }
    Ok(())
}
