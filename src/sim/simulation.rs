use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::constants::DERIVATIVE_HISTORY;
use super::{InitialConditions, SimulationConfig};
use crate::error::FieldError;
use crate::fields::{Derivatives, FaceScalar, PrognosticFields, VertexVector};
use crate::geometry::{GeodesicSphere, Polyhedron};
use crate::numerics::{integrator, MeshTables, Operators, PoissonSolver, Scheme};
use crate::util::Timed;

/// Extra warm-started solves used to settle the initial streamfunction.
const INITIAL_RELAXATION_PASSES: usize = 10;

/// Global quantities of one snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepDiagnostics {
    pub step: u64,
    pub time: f64,
    /// Area integral of height.
    pub mass: f64,
    /// Area integral of `g h^2 / 2 + h |u|^2 / 2`.
    pub energy: f64,
    /// Largest vertex speed.
    pub max_speed: f64,
    /// Area integral of the tracer.
    pub tracer: f64,
}

/// Shallow-water model on a geodesic sphere.
///
/// Owns the mesh tables, operators and the current state. Each call to
/// [`Simulation::step`] produces and publishes a new immutable
/// [`PrognosticFields`]; previously returned snapshots stay valid.
pub struct Simulation {
    config: SimulationConfig,
    sphere: GeodesicSphere,
    operators: Operators,
    poisson: PoissonSolver,
    /// Coriolis parameter on faces.
    coriolis: FaceScalar,
    /// Unit vertex normals as a field, for tangent projection.
    up: VertexVector,
    initial: InitialConditions,
    rng: ChaCha8Rng,
    current: Arc<PrognosticFields>,
    /// Derivatives from earlier steps, newest first.
    history: VecDeque<Arc<Derivatives>>,
}

impl Simulation {
    /// Build the mesh and operators and generate the initial state.
    pub fn new(config: SimulationConfig, initial: InitialConditions) -> crate::Result<Self> {
        config.validate()?;
        let _t = Timed::info("Simulation setup");

        let sphere = GeodesicSphere::build(config.mesh.radius, config.mesh.minimum_faces)?;
        let tables = Arc::new(MeshTables::new(Arc::new(sphere.mesh.clone())));
        let operators = Operators::new(Arc::clone(&tables));
        let poisson =
            PoissonSolver::new(Arc::clone(&tables), config.dynamics.relaxation_iterations);
        let coriolis = tables.coriolis_parameter(config.dynamics.rotation_frequency);
        let up = VertexVector::from_raw(tables.mesh_id(), tables.vertex_normals.clone());
        let rng = ChaCha8Rng::seed_from_u64(config.initial.seed);

        // Placeholder until the generators run below
        let current = Arc::new(PrognosticFields {
            step: 0,
            time: 0.0,
            height: tables.zeros(),
            velocity: VertexVector::from_raw(
                tables.mesh_id(),
                vec![Default::default(); tables.num_vertices()],
            ),
            tracer: tables.zeros(),
            vorticity: tables.zeros(),
            streamfunction: tables.zeros(),
            tendencies: None,
        });

        let mut sim = Self {
            config,
            sphere,
            operators,
            poisson,
            coriolis,
            up,
            initial,
            rng,
            current,
            history: VecDeque::with_capacity(DERIVATIVE_HISTORY),
        };
        sim.current = Arc::new(sim.initial_state());
        log::info!(
            "Simulation ready: {} faces, {} vertices, dt {}",
            sim.tables().num_faces(),
            sim.tables().num_vertices(),
            sim.config.dynamics.timestep
        );
        Ok(sim)
    }

    /// Default configuration and initial conditions.
    pub fn with_defaults() -> crate::Result<Self> {
        Self::new(SimulationConfig::default(), InitialConditions::default())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn sphere(&self) -> &GeodesicSphere {
        &self.sphere
    }

    pub fn mesh(&self) -> &Polyhedron {
        self.operators.tables.mesh()
    }

    pub fn tables(&self) -> &Arc<MeshTables> {
        &self.operators.tables
    }

    pub fn operators(&self) -> &Operators {
        &self.operators
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Arc<PrognosticFields> {
        Arc::clone(&self.current)
    }

    pub fn step_count(&self) -> u64 {
        self.current.step
    }

    /// Scheme the next call to [`Simulation::step`] will use.
    pub fn next_scheme(&self) -> Scheme {
        Scheme::for_history(self.history.len())
    }

    /// Advance one timestep and publish the result.
    pub fn step(&mut self) -> Arc<PrognosticFields> {
        let _t = Timed::debug("Simulation step");
        let state = Arc::clone(&self.current);
        let dt = self.config.dynamics.timestep;
        let d0 = Arc::new(self.derivatives(&state));
        let scheme = self.next_scheme();

        let heights: Vec<&FaceScalar> = self.history.iter().map(|d| &d.height).collect();
        let velocities: Vec<&VertexVector> = self.history.iter().map(|d| &d.velocity).collect();
        let tracers: Vec<&FaceScalar> = self.history.iter().map(|d| &d.tracer).collect();

        let height = integrator::advance(&state.height, &d0.height, &heights, dt);
        let velocity =
            self.tangent(&integrator::advance(&state.velocity, &d0.velocity, &velocities, dt));
        let tracer = integrator::advance(&state.tracer, &d0.tracer, &tracers, dt);

        let vorticity = self.operators.curl.vorticity(&velocity);
        let streamfunction = self.poisson.solve(&vorticity, Some(&state.streamfunction));

        let next = Arc::new(PrognosticFields {
            step: state.step + 1,
            time: state.time + dt,
            height,
            velocity,
            tracer,
            vorticity,
            streamfunction,
            tendencies: Some(Arc::clone(&d0)),
        });

        self.history.push_front(d0);
        self.history.truncate(DERIVATIVE_HISTORY);
        self.current = Arc::clone(&next);

        log::trace!("step {} ({scheme})", next.step);
        next.log_summary();
        next
    }

    /// Time derivatives of every prognostic field at `state`.
    ///
    /// ```text
    /// dh/dt = -div(h u)
    /// du/dt = -grad(g h + K) - (f + zeta) n x u
    /// dc/dt = -J(psi, c)
    /// ```
    pub fn derivatives(&self, state: &PrognosticFields) -> Derivatives {
        let ops = &self.operators;
        let dynamics = &self.config.dynamics;
        let h = &state.height;
        let u = &state.velocity;

        let height = ops.flux_divergence.apply(u, h).neg();

        let bernoulli = h.scale(dynamics.gravity).add(&ops.kinetic_energy.apply(u));
        let pressure = ops.gradient.apply(&bernoulli);
        let absolute_vorticity = self.coriolis.add(&ops.curl.vorticity(u));
        let q = ops.vertex_average.apply(&absolute_vorticity);
        let rotation = self.up.cross(u).scale_by(&q);
        let velocity = self.tangent(&pressure.add(&rotation).neg());

        let tracer = if dynamics.advect_tracer {
            ops.jacobian.apply(&state.streamfunction, &state.tracer).neg()
        } else {
            self.tables().zeros()
        };

        Derivatives {
            height,
            velocity,
            tracer,
        }
    }

    /// Regenerate the initial state from the configured seed and clear history.
    pub fn reset(&mut self) {
        log::info!("Resetting simulation at step {}", self.current.step);
        self.rng = ChaCha8Rng::seed_from_u64(self.config.initial.seed);
        self.history.clear();
        self.current = Arc::new(self.initial_state());
    }

    /// Publish a copy of the current state with `height` swapped in.
    ///
    /// The derivative history no longer matches the state afterwards, so it is
    /// dropped and the next step restarts with Euler.
    pub fn replace_height(&mut self, height: FaceScalar) -> Result<(), FieldError> {
        self.current.height.ensure_same_mesh(&height)?;
        let mut next = (*self.current).clone();
        next.height = height;
        next.tendencies = None;
        self.history.clear();
        self.current = Arc::new(next);
        Ok(())
    }

    /// Global quantities of the current snapshot.
    pub fn diagnostics(&self) -> StepDiagnostics {
        let t = self.tables();
        let s = &self.current;
        let g = self.config.dynamics.gravity;
        let ke = self.operators.kinetic_energy.apply(&s.velocity);
        let energy_density = s.height.zip_map(&ke, |h, k| 0.5 * g * h * h + h * k);
        StepDiagnostics {
            step: s.step,
            time: s.time,
            mass: t.integrate_faces(&s.height),
            energy: t.integrate_faces(&energy_density),
            max_speed: s.velocity.max_norm(),
            tracer: t.integrate_faces(&s.tracer),
        }
    }

    fn initial_state(&mut self) -> PrognosticFields {
        let _t = Timed::debug("Initial conditions");
        let tables = Arc::clone(self.tables());
        let init = &self.config.initial;

        let height = (self.initial.height)(
            &tables,
            init.height_average,
            init.height_deviation,
            &mut self.rng,
        );
        let velocity = (self.initial.velocity)(
            &tables,
            init.velocity_average,
            init.velocity_deviation,
            &mut self.rng,
        );
        let velocity = self.tangent(&velocity);
        let tracer = (self.initial.tracer)(&tables, 0.5, 0.5, &mut self.rng);

        let vorticity = self.operators.curl.vorticity(&velocity);
        let mut streamfunction = self.poisson.solve(&vorticity, None);
        for _ in 1..INITIAL_RELAXATION_PASSES {
            streamfunction = self.poisson.solve(&vorticity, Some(&streamfunction));
        }

        let state = PrognosticFields {
            step: 0,
            time: 0.0,
            height,
            velocity,
            tracer,
            vorticity,
            streamfunction,
            tendencies: None,
        };
        state.log_summary();
        state
    }

    /// Remove the radial component at every vertex.
    fn tangent(&self, v: &VertexVector) -> VertexVector {
        let radial = self.up.scale_by(&v.dot(&self.up));
        v.sub(&radial)
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("faces", &self.tables().num_faces())
            .field("step", &self.current.step)
            .field("history", &self.history.len())
            .finish()
    }
}
