//! End-to-end tests: mesh pipeline, operators and the simulation driver
//! through the public API.

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use geosphere::fields::{edit, FaceScalar};
use geosphere::geometry::validation::validate;
use geosphere::geometry::GeodesicSphere;
use geosphere::numerics::{MeshTables, Operators, PoissonSolver};
use geosphere::sim::{
    InitialConditions, MeshConfig, RunState, Simulation, SimulationConfig, SimulationRunner,
};
use geosphere::SimulationError;
use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn config(minimum_faces: i64) -> SimulationConfig {
    SimulationConfig {
        mesh: MeshConfig {
            radius: 6000.0,
            minimum_faces,
        },
        ..Default::default()
    }
}

#[test]
fn test_geodesic_sphere_composition() {
    let sphere = GeodesicSphere::build(6000.0, 400).expect("sphere builds");
    let mesh = &sphere.mesh;
    assert_eq!(mesh.num_faces(), 642);
    assert_eq!(mesh.euler_characteristic(), 2);

    let report = validate(mesh);
    assert!(report.is_valid(), "{} issues", report.issue_count());
    assert!(report.is_geodesic());
    assert_eq!(report.face_degrees.get(&5), Some(&12));
    assert_eq!(report.face_degrees.get(&6), Some(&630));

    for v in mesh.vertex_ids() {
        assert_eq!(mesh.vertex_faces(v).len(), 3);
        assert_eq!(mesh.vertex_edges(v).len(), 3);
    }
}

#[test]
fn test_still_water_one_step() {
    let mut sim = Simulation::new(config(400), InitialConditions::still_water())
        .expect("simulation builds");
    assert_eq!(sim.mesh().num_faces(), 642);

    let before = sim.current();
    let mass = sim.diagnostics().mass;
    let after = sim.step();

    let average = sim.config().initial.height_average;
    for h in after.height.iter() {
        assert_relative_eq!(h, average, max_relative = 1e-12);
    }
    assert_eq!(before.height, after.height);
    assert_relative_eq!(sim.diagnostics().mass, mass, max_relative = 1e-12);
}

#[test]
fn test_poisson_round_trip_improves_with_iterations() {
    let sphere = GeodesicSphere::build(6000.0, 162).expect("sphere builds");
    let tables = Arc::new(MeshTables::new(Arc::new(sphere.mesh)));
    let ops = Operators::new(Arc::clone(&tables));

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let values = (0..tables.num_faces()).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let potential = FaceScalar::from_values(tables.mesh(), values).expect("one value per face");
    let rhs = ops.laplacian.apply(&potential);

    let mut previous = f64::INFINITY;
    for iterations in [5, 50, 500] {
        let solver = PoissonSolver::new(Arc::clone(&tables), iterations);
        let solution = solver.solve(&rhs, None);
        let recovered = ops.laplacian.apply(&solution);
        let error = recovered.sub(&rhs).rms() / rhs.rms();
        assert!(error < previous, "{iterations}: {error} !< {previous}");
        previous = error;
    }
    assert!(previous < 1e-3, "final error {previous}");
}

#[test]
fn test_edit_fed_back_through_runner() {
    let sim = Simulation::new(config(42), InitialConditions::still_water())
        .expect("simulation builds");
    let tables = Arc::clone(sim.tables());
    let mut runner = SimulationRunner::new(sim);
    runner.start(true).expect("worker starts");
    assert_eq!(runner.state(), RunState::Paused);

    let snapshot = runner.current();
    let raised = edit::add_bump(&snapshot.height, &tables, DVec3::Y, 2500.0, 1.0);
    runner.replace_height(raised.clone()).expect("queued");

    // The original snapshot is untouched by the edit
    assert!(snapshot.height.iter().all(|h| h == snapshot.height.at(0)));

    runner.resume().expect("resumes");
    assert!(runner.wait_for_step(5, Duration::from_secs(30)));
    let sim = runner.terminate().expect("terminates");

    assert_relative_eq!(
        sim.diagnostics().mass,
        tables.integrate_faces(&raised),
        max_relative = 1e-10
    );
    assert!(matches!(runner.pause(), Err(SimulationError::Terminated)));
}
