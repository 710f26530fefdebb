//! Explicit time stepping over any [`Field`].

use std::fmt;

use crate::fields::Field;

/// Which scheme advanced a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// First order; used until enough history exists.
    Euler,
    /// Third-order Adams-Bashforth, using the current and two previous derivatives.
    AdamsBashforth3,
}

impl Scheme {
    /// Scheme available with `previous` earlier derivative snapshots on hand.
    pub fn for_history(previous: usize) -> Self {
        if previous >= 2 {
            Scheme::AdamsBashforth3
        } else {
            Scheme::Euler
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Euler => write!(f, "Euler"),
            Scheme::AdamsBashforth3 => write!(f, "AB3"),
        }
    }
}

/// `state + dt * derivative`.
pub fn euler<F: Field>(state: &F, derivative: &F, dt: f64) -> F {
    debug_assert_eq!(state.mesh_id(), derivative.mesh_id());
    state.add_scaled(derivative, dt)
}

/// `state + dt * (23 d0 - 16 d1 + 5 d2) / 12`, with `d0` the newest derivative.
pub fn adams_bashforth3<F: Field>(state: &F, d0: &F, d1: &F, d2: &F, dt: f64) -> F {
    debug_assert_eq!(state.mesh_id(), d0.mesh_id());
    debug_assert_eq!(d0.mesh_id(), d1.mesh_id());
    debug_assert_eq!(d1.mesh_id(), d2.mesh_id());
    let k = dt / 12.0;
    state
        .add_scaled(d0, 23.0 * k)
        .add_scaled(d1, -16.0 * k)
        .add_scaled(d2, 5.0 * k)
}

/// Advance one step. `previous` holds earlier derivatives, newest first;
/// Euler is used until it has at least two entries.
pub fn advance<F: Field>(state: &F, current: &F, previous: &[&F], dt: f64) -> F {
    match (Scheme::for_history(previous.len()), previous) {
        (Scheme::AdamsBashforth3, [d1, d2, ..]) => adams_bashforth3(state, current, d1, d2, dt),
        _ => euler(state, current, dt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MeshId;

    #[derive(Clone, Debug)]
    struct Value(f64);

    impl Field for Value {
        fn mesh_id(&self) -> MeshId {
            MeshId(0)
        }

        fn add_scaled(&self, other: &Self, k: f64) -> Self {
            Value(self.0 + k * other.0)
        }

        fn scale(&self, k: f64) -> Self {
            Value(self.0 * k)
        }
    }

    /// Integrate dy/dt = -y from y = 1 to t = 1.
    fn decay(steps: usize, multistep: bool) -> f64 {
        let dt = 1.0 / steps as f64;
        let mut y = Value(1.0);
        let mut history: Vec<Value> = Vec::new();
        for _ in 0..steps {
            let d = y.scale(-1.0);
            let previous: Vec<&Value> = if multistep {
                history.iter().rev().take(2).collect()
            } else {
                Vec::new()
            };
            y = advance(&y, &d, &previous, dt);
            history.push(d);
        }
        y.0
    }

    #[test]
    fn test_scheme_selection() {
        assert_eq!(Scheme::for_history(0), Scheme::Euler);
        assert_eq!(Scheme::for_history(1), Scheme::Euler);
        assert_eq!(Scheme::for_history(2), Scheme::AdamsBashforth3);
        assert_eq!(Scheme::for_history(5), Scheme::AdamsBashforth3);
    }

    #[test]
    fn test_euler_and_ab3_coefficients() {
        let y = Value(1.0);
        assert_eq!(euler(&y, &Value(2.0), 0.5).0, 2.0);
        let next = adams_bashforth3(&y, &Value(12.0), &Value(12.0), &Value(12.0), 1.0);
        // Constant derivative: weights sum to one
        assert!((next.0 - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_multistep_is_more_accurate() {
        let exact = (-1.0f64).exp();
        let euler_error = (decay(50, false) - exact).abs();
        let ab3_error = (decay(50, true) - exact).abs();
        assert!(ab3_error < euler_error / 10.0, "{ab3_error} vs {euler_error}");
    }
}
