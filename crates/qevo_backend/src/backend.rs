//! Backend capability trait and construction
//!
//! A backend turns abstract operations into concrete linear algebra on
//! a `State`. Handles are built once from a `BackendConfig` and shared
//! read-only across executions.

use std::sync::Arc;

use qevo_core::{Operation, QevoResult, QubitId};

use crate::batched::BatchedBackend;
use crate::config::{BackendConfig, BackendKind};
use crate::dense::DenseBackend;
use crate::observable::PauliString;
use crate::state::{State, StateKind};
use crate::symbolic::SymbolicBackend;

// ============================================================================
// Backend Trait
// ============================================================================

/// Uniform dispatch surface for state evolution
///
/// Implementations are sharable (`Send + Sync`) and hold no per-run
/// state; everything mutable lives in the `State` they are handed.
pub trait Backend: Send + Sync {
    /// Short name recorded in logs and execution metadata
    fn name(&self) -> &str;

    /// Whether this backend can evolve the given representation
    fn supports(&self, kind: StateKind) -> bool;

    /// Fresh all-zeros state in the requested representation
    fn allocate_state(&self, num_qubits: usize, kind: StateKind) -> QevoResult<State>;

    /// Apply one gate or channel in place
    ///
    /// Measurements are not handled here; the evolution engine routes
    /// them through the sampler and [`Backend::collapse_measure`].
    /// Classical conditions are the engine's concern and ignored.
    fn apply_operation(&self, state: &mut State, op: &Operation) -> QevoResult<()>;

    /// Project `qubits` onto a drawn outcome and renormalize
    ///
    /// Bit `j` of `outcome` is the measured value of `qubits[j]`.
    /// Returns the probability the outcome had before the collapse.
    fn collapse_measure(
        &self,
        state: &mut State,
        qubits: &[QubitId],
        outcome: usize,
    ) -> QevoResult<f64>;

    /// Expectation value of a Pauli-string observable
    fn expectation(&self, state: &State, observable: &PauliString) -> QevoResult<f64>;
}

// ============================================================================
// Construction
// ============================================================================

/// Preference order used when no kind is requested explicitly
pub const DEFAULT_ORDER: &[BackendKind] = &[BackendKind::Batched, BackendKind::Dense];

/// Build a backend handle from a configuration
pub fn construct_backend(config: &BackendConfig) -> Arc<dyn Backend> {
    let backend: Arc<dyn Backend> = match config.kind {
        BackendKind::Dense => Arc::new(DenseBackend::new(config.clone())),
        BackendKind::Batched => Arc::new(BatchedBackend::new(config.clone())),
        BackendKind::Symbolic => {
            let inner = Arc::new(BatchedBackend::new(config.clone()));
            Arc::new(SymbolicBackend::new(inner))
        }
    };
    log::info!(
        "Using {} backend ({} precision)",
        backend.name(),
        config.precision
    );
    backend
}

/// Build the first available backend in the default preference order
pub fn default_backend() -> Arc<dyn Backend> {
    for &kind in DEFAULT_ORDER {
        if kind.is_available() {
            return construct_backend(&BackendConfig::new().with_kind(kind));
        }
    }
    construct_backend(&BackendConfig::dense())
}

// ============================================================================
// Tests
// ============================================================================
