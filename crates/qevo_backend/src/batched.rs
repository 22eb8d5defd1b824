//! Rayon-parallel dense backend

use qevo_core::{Operation, QevoResult, QubitId};

use crate::backend::Backend;
use crate::config::{BackendConfig, BackendKind};
use crate::kernels;
use crate::observable::PauliString;
use crate::state::{State, StateKind};

/// Dense backend that splits kernel work across the rayon pool
///
/// Semantics are identical to [`crate::dense::DenseBackend`]; only
/// kernel scheduling differs, and only for registers at or above the
/// configured threshold. Smaller states run sequentially, where the
/// fork overhead would dominate.
#[derive(Debug, Clone)]
pub struct BatchedBackend {
    config: BackendConfig,
}

impl BatchedBackend {
    /// Build from a configuration
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    /// Build with default settings
    pub fn with_defaults() -> Self {
        Self::new(BackendConfig::new().with_kind(BackendKind::Batched))
    }

    /// The configuration this backend was built with
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn parallel_for(&self, state: &State) -> bool {
        state.num_qubits() >= self.config.parallel_threshold
    }
}

impl Default for BatchedBackend {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Backend for BatchedBackend {
    fn name(&self) -> &str {
        "batched"
    }

    fn supports(&self, _kind: StateKind) -> bool {
        true
    }

    fn allocate_state(&self, num_qubits: usize, kind: StateKind) -> QevoResult<State> {
        State::zero(num_qubits, kind)
    }

    fn apply_operation(&self, state: &mut State, op: &Operation) -> QevoResult<()> {
        let parallel = self.parallel_for(state);
        kernels::apply_operation(state, op, parallel)
    }

    fn collapse_measure(
        &self,
        state: &mut State,
        qubits: &[QubitId],
        outcome: usize,
    ) -> QevoResult<f64> {
        kernels::collapse(state, qubits, outcome)
    }

    fn expectation(&self, state: &State, observable: &PauliString) -> QevoResult<f64> {
        kernels::expectation(state, observable)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseBackend;
    use qevo_core::CircuitBuilder;

    /// Layered circuit mixing single-qubit rotations and entanglers
    fn layered_circuit(num_qubits: usize, layers: usize) -> qevo_core::Circuit {
        let mut builder = CircuitBuilder::new(num_qubits);
        for layer in 0..layers {
            for q in 0..num_qubits {
                builder = builder
                    .ry(q, 0.17 * (layer * num_qubits + q + 1) as f64)
                    .rz(q, 0.29 * (q + 1) as f64);
            }
            for q in 0..num_qubits - 1 {
                builder = builder.cnot(q, q + 1);
            }
        }
        builder.build()
    }

    #[test]
    fn test_agrees_with_dense_backend() {
        let dense = DenseBackend::with_defaults();
        // threshold 0 forces the parallel code paths even on small states
        let batched = BatchedBackend::new(
            BackendConfig::new()
                .with_kind(BackendKind::Batched)
                .with_parallel_threshold(0),
        );
        let circuit = layered_circuit(5, 4);

        let mut a = dense.allocate_state(5, StateKind::Vector).unwrap();
        let mut b = batched.allocate_state(5, StateKind::Vector).unwrap();
        for op in circuit.ops() {
            dense.apply_operation(&mut a, op).unwrap();
            batched.apply_operation(&mut b, op).unwrap();
        }

        let va = a.vector().unwrap();
        let vb = b.vector().unwrap();
        assert!(va.max_abs_diff(vb) < 1e-6);
    }

    #[test]
    fn test_agrees_with_dense_on_density() {
        let dense = DenseBackend::with_defaults();
        let batched = BatchedBackend::new(
            BackendConfig::new()
                .with_kind(BackendKind::Batched)
                .with_parallel_threshold(0),
        );
        let noisy = qevo_noise::NoiseModel::depolarizing(0.01, 0.02)
            .unwrap()
            .apply(&layered_circuit(3, 2))
            .unwrap();

        let mut a = dense.allocate_state(3, StateKind::Density).unwrap();
        let mut b = batched.allocate_state(3, StateKind::Density).unwrap();
        for op in noisy.ops() {
            dense.apply_operation(&mut a, op).unwrap();
            batched.apply_operation(&mut b, op).unwrap();
        }

        let da = a.density().unwrap();
        let db = b.density().unwrap();
        assert!(da.max_abs_diff(db) < 1e-6);
    }

    #[test]
    fn test_small_states_stay_sequential() {
        let backend = BatchedBackend::with_defaults();
        let state = backend.allocate_state(3, StateKind::Vector).unwrap();
        assert!(!backend.parallel_for(&state));
    }
}
