//! CLI driver: loads a `RunConfig`, seeds the initial spectrum, and steps the
//! integrator to completion, periodically writing snapshots (`spec.md` §6,
//! `SPEC_FULL.md` §7.1/§7.2).

use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use dynamics::{Integrator, TimeState};
use field::Field;
use spectre::{FileSnapshotSink, RunConfig, SnapshotSink, ThermalSpectrum, VacuumSpectrum};

#[derive(Debug, Parser)]
#[command(name = "spectre-run", about = "Lattice reheating simulation driver", version)]
struct Cli {
    /// Path to a TOML run configuration.
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Overrides the configured step count.
    #[arg(long)]
    steps: Option<u64>,

    /// Overrides the configured snapshot cadence.
    #[arg(long)]
    snapshot_every: Option<u64>,

    /// Overrides the configured output directory.
    #[arg(long)]
    output_dir: Option<String>,

    /// Overrides the configured RNG seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        error!(%err, "run aborted");
        std::process::exit(1);
    }
}

fn run() -> spectre::Result<()> {
    let cli = Cli::parse();
    let mut config = RunConfig::load(&cli.config)?;
    if let Some(steps) = cli.steps {
        config.steps = steps;
    }
    if let Some(every) = cli.snapshot_every {
        config.snapshot_every = every;
    }
    if let Some(dir) = cli.output_dir.clone() {
        config.output_dir = dir;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let params = config.to_model_params()?;
    let n = params.n;
    info!(n, l = params.l, steps = config.steps, "starting run");

    let time = TimeState::new(0.0, config.a0, config.adot0, config.dt)?;
    let mut integrator = Integrator::new(params, time);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut phi = Field::zeros(n);
    let mut phidot = Field::zeros(n);
    #[cfg(feature = "two-field")]
    let mut chi = Field::zeros(n);
    #[cfg(feature = "two-field")]
    let mut chidot = Field::zeros(n);

    match config.temperature {
        Some(temperature) => {
            let spectrum = ThermalSpectrum { temperature };
            spectrum.seed_phi(&mut rng, &params, config.len0, &mut phi, &mut phidot)?;
            #[cfg(feature = "two-field")]
            spectrum.seed_chi(&mut rng, &params, config.len0, &mut chi, &mut chidot)?;
        }
        None => {
            VacuumSpectrum.seed_phi(&mut rng, &params, config.len0, &mut phi, &mut phidot)?;
            #[cfg(feature = "two-field")]
            VacuumSpectrum.seed_chi(&mut rng, &params, config.len0, &mut chi, &mut chidot)?;
        }
    }

    #[cfg(feature = "two-field")]
    integrator.initialize(&mut phi, &mut chi, &mut phidot, &mut chidot)?;
    #[cfg(not(feature = "two-field"))]
    integrator.initialize(&mut phi, &mut phidot)?;

    std::fs::create_dir_all(&config.output_dir)?;
    let mut sink = FileSnapshotSink::new(&config.output_dir);
    let mut snap_plan = field::FftPlan::new(n);

    let progress = ProgressBar::new(config.steps);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} steps ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for step in 0..config.steps {
        #[cfg(feature = "two-field")]
        let step_result = integrator.step(&mut phi, &mut chi, &mut phidot, &mut chidot);
        #[cfg(not(feature = "two-field"))]
        let step_result = integrator.step(&mut phi, &mut phidot);

        if let Err(err) = step_result {
            error!(step, %err, "numerical blow-up, aborting run");
            return Err(err.into());
        }

        if config.snapshot_every != 0 && step % config.snapshot_every == 0 {
            if let Err(err) = write_snapshot(&mut sink, &mut snap_plan, &mut phi, step as u32, &params) {
                warn!(step, %err, "snapshot write failed, continuing run");
            }
        }

        progress.inc(1);
    }
    progress.finish_with_message("done");

    let final_time = integrator.time();
    info!(a = final_time.a, t = final_time.t, physical_time = final_time.physical_time, "run complete");
    Ok(())
}

fn write_snapshot(
    sink: &mut dyn SnapshotSink,
    plan: &mut field::FftPlan,
    phi: &mut Field,
    index: u32,
    params: &grid::ModelParams,
) -> spectre::Result<()> {
    phi.switch_state(field::Representation::Position, plan)?;
    let result = spectre::dump_field(sink, "phi", index, phi, params);
    phi.switch_state(field::Representation::Momentum, plan)?;
    result
}
