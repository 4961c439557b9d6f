use std::io::Write;
use splitstep::{
    field::Coupling,
    grid::Grid1D,
    observable::{ Action, ObservableSet, Quantity, ValueSource },
    propagator::SplitPropagator,
    rep::{ Mode, Rep },
    scheme::SplitScheme,
    units,
};
use tracing::info;

const DEFAULT_CONFIG: &str = r#"
[grid]
x_min = -150.0
x_max = 150.0
points = 4096

[IM]
dt = 0.02
max_steps = 50000
state_accuracy = 1e-13

[RE]
dt = 0.02

[field]
wavelength_nm = 800.0
intensity_wcm2 = 1e14
cycles = 3.0

[output]
interval = 50
"#;

// soft-core Coulomb potential with a ground state energy of -0.5
fn soft_core(x: f64) -> f64 { -1.0 / (x * x + 2.0).sqrt() }

fn main() -> anyhow::Result<()> {
    lib::init_logging();
    let config = lib::load_config(DEFAULT_CONFIG)?;
    let pulse
        = config.field
        .ok_or_else(|| anyhow::anyhow!("missing configuration section [field]"))?
        .pulse();
    info!(
        "pulse: E0 = {:.5}, omega = {:.5}, duration = {:.3} fs",
        pulse.amplitude, pulse.omega, units::au_to_fs(pulse.duration()),
    );

    let wf = Grid1D::from_config(&config.grid, soft_core, Coupling::Static)?;
    let mut obs = ObservableSet::with_energy();
    obs.operation("normalize", Action::Normalize);
    let mut relax = SplitPropagator::new(
        Mode::Imag,
        config.imag()?,
        SplitScheme::strang(Rep::Pos),
        wf,
        obs,
    )?;
    let mut out = lib::table("pulse_im", config.output.interval)?;
    relax.run_quiet(&mut out, 0);
    out.into_inner().flush()?;
    info!(
        "ground state energy {:.8} Eh ({:.5} eV)",
        relax.energy().total, units::au_to_ev(relax.energy().total),
    );
    let gs = relax.into_wf().get_psi().clone();

    let gauges = [
        ("pulse_length", Coupling::LengthGauge(pulse)),
        ("pulse_velocity", Coupling::VelocityGauge(pulse)),
    ];
    for (pass, (name, coupling)) in gauges.into_iter().enumerate() {
        let mut wf = Grid1D::from_config(&config.grid, soft_core, coupling)?;
        wf.set_state(&gs)?;
        let mut obs = ObservableSet::with_energy();
        obs.value("time", ValueSource::Time);
        obs.value("efield", ValueSource::Model("efield".into()));
        obs.value("afield", ValueSource::Model("afield".into()));
        obs.average("position", Quantity::Position);
        obs.average("momentum", Quantity::Momentum);
        obs.push_late("norm", splitstep::Expr::Average(Quantity::Norm));
        let mut prop = SplitPropagator::new(
            Mode::Real,
            config.real()?,
            SplitScheme::strang(Rep::Pos),
            wf,
            obs,
        )?;
        let mut out = lib::table(name, config.output.interval)?;
        prop.run_quiet(&mut out, pass);
        out.into_inner().flush()?;
        info!(
            "{}: final energy {:.8} Eh, norm {:.10}",
            name, prop.energy().total, prop.wf().norm(),
        );
    }
    Ok(())
}
