use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};

use geosphere::geometry::validation::validate;
use geosphere::sim::{
    initial, InitialConditions, Simulation, SimulationConfig, SimulationRunner, DEFAULT_GRAVITY,
    DEFAULT_MINIMUM_FACES, DEFAULT_RADIUS, DEFAULT_RELAXATION_ITERATIONS,
    DEFAULT_ROTATION_FREQUENCY, DEFAULT_SEED, DEFAULT_TIMESTEP,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Flat surface at rest
    Still,
    /// Random depth perturbations at rest
    Noise,
    /// Single bump of fluid released at rest
    Bell,
    /// Solid-body zonal flow over a flat surface
    Zonal,
}

impl Scenario {
    fn initial_conditions(self) -> InitialConditions {
        match self {
            Scenario::Still => InitialConditions::still_water(),
            Scenario::Noise => InitialConditions::default(),
            Scenario::Bell => InitialConditions {
                height: initial::cosine_bell(),
                velocity: initial::zero_velocity(),
                tracer: initial::latitude_bands(6),
            },
            Scenario::Zonal => InitialConditions {
                height: initial::constant_height(),
                velocity: initial::zonal_velocity(),
                tracer: initial::latitude_bands(6),
            },
        }
    }
}

/// Geosphere - shallow water on a geodesic sphere
#[derive(Parser, Debug)]
#[command(name = "geosphere", version, about)]
struct Cli {
    /// Sphere radius
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    radius: f64,

    /// Minimum number of faces; the next refinement tier up is used
    #[arg(long, default_value_t = DEFAULT_MINIMUM_FACES, allow_negative_numbers = true)]
    min_faces: i64,

    /// Number of steps to run
    #[arg(long, default_value_t = 100)]
    steps: u64,

    /// Random seed for initial conditions
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    #[arg(long, default_value_t = DEFAULT_TIMESTEP)]
    timestep: f64,

    #[arg(long, default_value_t = DEFAULT_GRAVITY)]
    gravity: f64,

    /// Rotation frequency in cycles per unit time
    #[arg(long, default_value_t = DEFAULT_ROTATION_FREQUENCY)]
    rotation: f64,

    /// Relaxation sweeps per streamfunction solve
    #[arg(long, default_value_t = DEFAULT_RELAXATION_ITERATIONS)]
    relaxation_iterations: usize,

    /// Initial state
    #[arg(long, value_enum, default_value_t = Scenario::Bell)]
    scenario: Scenario,

    /// Height perturbation (bump height or noise amplitude)
    #[arg(long)]
    height_deviation: Option<f64>,

    /// Equatorial wind speed for the zonal scenario
    #[arg(long)]
    wind: Option<f64>,

    /// Do not advect the passive tracer
    #[arg(long)]
    no_tracer: bool,

    /// Run on the background worker instead of stepping inline
    #[arg(long)]
    background: bool,

    /// Print a mesh validation report before running
    #[arg(long)]
    validate: bool,

    /// Print diagnostics every N steps (0 = only at the end)
    #[arg(long, default_value_t = 10)]
    report_every: u64,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.mesh.radius = self.radius;
        config.mesh.minimum_faces = self.min_faces;
        config.dynamics.timestep = self.timestep;
        config.dynamics.gravity = self.gravity;
        config.dynamics.rotation_frequency = self.rotation;
        config.dynamics.relaxation_iterations = self.relaxation_iterations;
        config.dynamics.advect_tracer = !self.no_tracer;
        config.initial.seed = self.seed;
        if let Some(deviation) = self.height_deviation {
            config.initial.height_deviation = deviation;
        }
        if let Some(wind) = self.wind {
            config.initial.velocity_average = wind;
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let simulation = match Simulation::new(cli.config(), cli.scenario.initial_conditions()) {
        Ok(simulation) => simulation,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Geodesic sphere: radius {}, {} faces, {} vertices, {} edges",
        cli.radius,
        simulation.mesh().num_faces(),
        simulation.mesh().num_vertices(),
        simulation.mesh().num_edges()
    );

    if cli.validate {
        let report = validate(simulation.mesh());
        report.log_summary();
        println!(
            "Validation: {} (Euler {}, {} issues)",
            if report.is_valid() { "ok" } else { "FAILED" },
            report.euler_v as i64 - report.euler_e as i64 + report.euler_f as i64,
            report.issue_count()
        );
    }

    let result = if cli.background {
        run_background(simulation, cli.steps)
    } else {
        run_inline(simulation, cli.steps, cli.report_every);
        Ok(())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_diagnostics(simulation: &Simulation) {
    let d = simulation.diagnostics();
    println!(
        "step {:>6}  t {:>10.1}  mass {:.6e}  energy {:.6e}  max speed {:.4}  tracer {:.6e}",
        d.step, d.time, d.mass, d.energy, d.max_speed, d.tracer
    );
}

fn run_inline(mut simulation: Simulation, steps: u64, report_every: u64) {
    print_diagnostics(&simulation);
    let start = Instant::now();
    for _ in 0..steps {
        simulation.step();
        if report_every > 0 && simulation.step_count() % report_every == 0 {
            print_diagnostics(&simulation);
        }
    }
    let elapsed = start.elapsed();
    print_diagnostics(&simulation);
    println!(
        "{} steps in {:.1}ms ({:.2}ms/step)",
        steps,
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1000.0 / steps.max(1) as f64
    );
}

fn run_background(simulation: Simulation, steps: u64) -> geosphere::Result<()> {
    print_diagnostics(&simulation);
    let mut runner = SimulationRunner::new(simulation);
    runner.start(false)?;

    let start = Instant::now();
    while !runner.wait_for_step(steps, Duration::from_secs(1)) {
        println!("step {}", runner.current().step);
    }
    let simulation = runner.terminate()?;
    print_diagnostics(&simulation);
    println!(
        "Background worker reached step {} in {:.1}ms",
        simulation.step_count(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
