//! Parallel parameter sweeps
//!
//! A sweep binds one symbolic circuit against many parameter sets and
//! executes every point independently. Points run on the rayon pool;
//! results come back in sweep order, and a seeded engine gives each
//! point a derived seed so the outcome does not depend on scheduling.

use rayon::prelude::*;

use qevo_core::{Bindings, Circuit, QevoResult};

use crate::engine::EvolutionEngine;
use crate::result::ExecutionResult;

/// Execute `circuit` once per binding set, in parallel
///
/// Every point gets a fresh all-zeros state. The first error at any
/// point aborts the sweep; a shared cancellation token on the engine
/// stops all points.
pub fn execute_sweep(
    engine: &EvolutionEngine,
    circuit: &Circuit,
    sweep: &[Bindings],
) -> QevoResult<Vec<ExecutionResult>> {
    sweep
        .par_iter()
        .enumerate()
        .map(|(point, bindings)| {
            let bound = circuit.bind(bindings)?;
            engine.derive(point as u64).execute(&bound, None)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CancelToken;
    use approx::assert_relative_eq;
    use qevo_backend::PauliString;
    use qevo_core::{CircuitBuilder, QevoError};
    use std::f64::consts::PI;

    fn rotation_sweep(angles: &[f64]) -> Vec<Bindings> {
        angles
            .iter()
            .map(|&theta| {
                let mut bindings = Bindings::new();
                bindings.insert("theta".to_string(), theta);
                bindings
            })
            .collect()
    }

    #[test]
    fn test_sweep_traces_rotation_curve() {
        let circuit = CircuitBuilder::new(1).rx_sym(0, "theta").build();
        let sweep = rotation_sweep(&[0.0, PI / 2.0, PI]);
        let engine = EvolutionEngine::with_defaults().with_seed(7);

        let results = execute_sweep(&engine, &circuit, &sweep).unwrap();
        assert_eq!(results.len(), 3);

        // Rx(θ)|0⟩ puts sin²(θ/2) on |1⟩
        let expected = [0.0, 0.5, 1.0];
        for (result, &p1) in results.iter().zip(expected.iter()) {
            let probs = result.state().probabilities(&[0]).unwrap();
            assert_relative_eq!(probs[1], p1, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sweep_preserves_point_order() {
        let circuit = CircuitBuilder::new(1).rx_sym(0, "theta").build();
        let angles: Vec<f64> = (0..32).map(|i| i as f64 * 0.1).collect();
        let engine = EvolutionEngine::with_defaults();

        let results = execute_sweep(&engine, &circuit, &rotation_sweep(&angles)).unwrap();
        let observable = PauliString::parse("Z").unwrap();
        for (result, &theta) in results.iter().zip(angles.iter()) {
            // ⟨Z⟩ = cos θ under Rx(θ)
            let value = result.expectation(&observable).unwrap();
            assert_relative_eq!(value, theta.cos(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sweep_missing_binding_fails() {
        let circuit = CircuitBuilder::new(1).rx_sym(0, "theta").build();
        let sweep = vec![Bindings::new()];
        let err = execute_sweep(&EvolutionEngine::with_defaults(), &circuit, &sweep).unwrap_err();
        assert_eq!(err, QevoError::UnboundParameter("theta".to_string()));
    }

    #[test]
    fn test_sweep_empty_is_empty() {
        let circuit = CircuitBuilder::new(1).rx_sym(0, "theta").build();
        let results = execute_sweep(&EvolutionEngine::with_defaults(), &circuit, &[]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_sweep_cancellation_stops_points() {
        let token = CancelToken::new();
        token.cancel();
        let engine = EvolutionEngine::with_defaults().with_cancel_token(token);
        let circuit = CircuitBuilder::new(1).rx_sym(0, "theta").build();
        let err = execute_sweep(&engine, &circuit, &rotation_sweep(&[0.1, 0.2])).unwrap_err();
        assert!(err.is_cancellation());
    }
}
