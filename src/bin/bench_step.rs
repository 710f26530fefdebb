//! Benchmark mesh construction and simulation steps per refinement tier.
//!
//! Run with: cargo run --release --bin bench_step
//!
//! Usage:
//!   bench_step                 Default tiers (642, 2562, 10242 faces)
//!   bench_step 100 40k         Smallest tiers with at least these face counts
//!   bench_step -n 50           Time 50 steps per tier

use clap::Parser;
use geosphere::geometry::GeodesicSphere;
use geosphere::numerics::{MeshTables, Operators};
use geosphere::sim::{InitialConditions, MeshConfig, Simulation, SimulationConfig};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

fn parse_count(s: &str) -> Result<i64, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if let Some(rest) = s.strip_suffix('m') {
        (rest, 1_000_000)
    } else if let Some(rest) = s.strip_suffix('k') {
        (rest, 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as i64)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[derive(Parser, Debug)]
#[command(name = "bench_step", about = "Time mesh builds and simulation steps")]
struct Args {
    /// Minimum face counts (accepts k/m suffixes)
    #[arg(value_parser = parse_count)]
    sizes: Vec<i64>,

    /// Steps to time per tier
    #[arg(short = 'n', long, default_value_t = 20)]
    steps: usize,

    /// Sphere radius
    #[arg(long, default_value_t = 6000.0)]
    radius: f64,
}

fn bench_tier(minimum_faces: i64, steps: usize, radius: f64) -> geosphere::Result<()> {
    print!("  mesh {:>8}... ", minimum_faces);
    io::stdout().flush().ok();
    let start = Instant::now();
    let sphere = GeodesicSphere::build(radius, minimum_faces)?;
    let mesh_ms = start.elapsed().as_secs_f64() * 1000.0;

    let start = Instant::now();
    let tables = Arc::new(MeshTables::new(Arc::new(sphere.mesh.clone())));
    let _ops = Operators::new(tables);
    let tables_ms = start.elapsed().as_secs_f64() * 1000.0;
    println!(
        "{} faces: mesh {:.1}ms, tables+operators {:.1}ms",
        sphere.mesh.num_faces(),
        mesh_ms,
        tables_ms
    );

    let config = SimulationConfig {
        mesh: MeshConfig {
            radius,
            minimum_faces,
        },
        ..Default::default()
    };
    let mut simulation = Simulation::new(config, InitialConditions::default())?;
    let start = Instant::now();
    for _ in 0..steps {
        simulation.step();
    }
    let elapsed = start.elapsed().as_secs_f64() * 1000.0;
    let d = simulation.diagnostics();
    println!(
        "    {} steps: {:.1}ms ({:.3}ms/step), mass {:.6e}, energy {:.6e}",
        steps,
        elapsed,
        elapsed / steps.max(1) as f64,
        d.mass,
        d.energy
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let sizes = if args.sizes.is_empty() {
        vec![642, 2562, 10242]
    } else {
        args.sizes.clone()
    };

    println!("bench_step: {} tiers, {} steps each", sizes.len(), args.steps);
    for size in sizes {
        if let Err(err) = bench_tier(size, args.steps, args.radius) {
            eprintln!("  {}: {}", size, err);
        }
    }
}
