//! Sequential dense backend

use qevo_core::{Operation, QevoResult, QubitId};

use crate::backend::Backend;
use crate::config::BackendConfig;
use crate::kernels;
use crate::observable::PauliString;
use crate::state::{State, StateKind};

/// Dense CPU backend walking amplitudes on a single thread
///
/// The reference implementation: every other backend must agree with
/// it within 1e-6 relative error.
#[derive(Debug, Clone)]
pub struct DenseBackend {
    config: BackendConfig,
}

impl DenseBackend {
    /// Build from a configuration
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    /// Build with default settings
    pub fn with_defaults() -> Self {
        Self::new(BackendConfig::dense())
    }

    /// The configuration this backend was built with
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

impl Default for DenseBackend {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Backend for DenseBackend {
    fn name(&self) -> &str {
        "dense"
    }

    fn supports(&self, _kind: StateKind) -> bool {
        true
    }

    fn allocate_state(&self, num_qubits: usize, kind: StateKind) -> QevoResult<State> {
        State::zero(num_qubits, kind)
    }

    fn apply_operation(&self, state: &mut State, op: &Operation) -> QevoResult<()> {
        kernels::apply_operation(state, op, false)
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
