use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vof_sweep::{
    fill_face_velocity, fill_ghost_cells, split_step, sphere_fraction, MacVelocity3, Plic,
    ProblemType, SimConfig, VofState, VofWorkspace, VolumeSummary,
};

/// Advects a sphere through the reversible deformation flow and reports how
/// well volume and shape are recovered.
#[derive(Parser)]
#[command(name = "vof_sweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Split Lagrangian VOF advection benchmark", long_about = None)]
struct Cli {
    /// JSON run configuration; command-line values override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cells per axis
    #[arg(long)]
    cells: Option<usize>,

    #[arg(long)]
    dt: Option<f64>,

    #[arg(long)]
    end_time: Option<f64>,

    /// Velocity selector (1 = deformation)
    #[arg(long)]
    problem: Option<i32>,

    /// Clamp the volume fraction to [0, 1] after every sweep
    #[arg(long)]
    clamp: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write the run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(n) = cli.cells {
        config.cells = [n; 3];
    }
    if let Some(dt) = cli.dt {
        config.dt = dt;
    }
    if let Some(end_time) = cli.end_time {
        config.end_time = end_time;
    }
    if let Some(problem) = cli.problem {
        config.problem = problem;
    }
    config.clamp_volume_fraction |= cli.clamp;
    config.validate().context("invalid run configuration")?;
    Ok(config)
}

fn init_state(config: &SimConfig, problem: ProblemType) -> VofState {
    let grid = config.grid();
    let mut fraction = sphere_fraction(
        &grid,
        grid.ghost_box(),
        config.sphere_center,
        config.sphere_radius,
        config.init_samples,
    );
    fill_ghost_cells(&mut fraction, grid.cell_box());
    let mut velocity = MacVelocity3::new(grid.ghost_box(), [0.0; 3]);
    fill_face_velocity(&mut velocity, &grid, 0.0, problem);
    VofState::new(grid, fraction, velocity)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;
    let problem = config.problem()?;
    let mut state = init_state(&config, problem);
    let initial = state.fraction.clone();
    let mut workspace = VofWorkspace::new(state.grid);
    let geometry = Plic::default();
    let steps = config.step_count();
    info!(
        cells = ?config.cells,
        dt = config.dt,
        end_time = config.end_time,
        steps,
        volume = state.volume(),
        "starting advection"
    );

    let mut params = config.to_params();
    let mut max_cfl = 0.0_f64;
    let report_every = (steps / 10).max(1);
    for _ in 0..steps {
        params.dt = config.dt.min(config.end_time - state.time);
        if params.dt <= 0.0 {
            break;
        }
        fill_face_velocity(
            &mut state.velocity,
            &state.grid,
            state.time + 0.5 * params.dt,
            problem,
        );
        let report = split_step(&mut state, params, &geometry, &mut workspace);
        max_cfl = max_cfl.max(report.max_cfl);
        if report.step % report_every == 0 {
            info!(
                step = report.step,
                time = report.time,
                volume = report.volume_after,
                min = report.min_fraction,
                max = report.max_fraction,
                "progress"
            );
        }
    }

    let summary = VolumeSummary::new(&initial, &state, max_cfl);
    info!(
        steps = summary.steps,
        time = summary.time,
        relative_drift = summary.relative_drift,
        shape_error = summary.shape_error,
        "finished"
    );
    if summary.min_fraction < 0.0 || summary.max_fraction > 1.0 {
        warn!(
            min = summary.min_fraction,
            max = summary.max_fraction,
            "volume fraction left [0, 1]"
        );
    }
    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing summary {}", path.display()))?;
    }
    Ok(())
}
