//! Symbolic placeholder backend

use std::sync::Arc;

use qevo_core::{OpKind, Operation, QevoError, QevoResult, QubitId};

use crate::backend::Backend;
use crate::observable::PauliString;
use crate::state::{State, StateKind};

/// Guard backend for circuits that may still carry unbound parameters
///
/// Numerical work is delegated to an inner backend; any operation with
/// an unbound symbol is refused with `UnboundParameter` instead of
/// being contracted into garbage.
pub struct SymbolicBackend {
    inner: Arc<dyn Backend>,
    name: String,
}

impl SymbolicBackend {
    /// Wrap a concrete backend
    pub fn new(inner: Arc<dyn Backend>) -> Self {
        let name = format!("symbolic+{}", inner.name());
        Self { inner, name }
    }

    /// The delegate doing the numerical work
    pub fn inner(&self) -> &Arc<dyn Backend> {
        &self.inner
    }

    fn first_symbol(op: &Operation) -> String {
        match op.kind() {
            OpKind::Gate(generator) => generator
                .symbols()
                .first()
                .map(|s| s.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

impl Backend for SymbolicBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, kind: StateKind) -> bool {
        self.inner.supports(kind)
    }

    fn allocate_state(&self, num_qubits: usize, kind: StateKind) -> QevoResult<State> {
        self.inner.allocate_state(num_qubits, kind)
    }

    fn apply_operation(&self, state: &mut State, op: &Operation) -> QevoResult<()> {
        if op.is_parametrized() {
            return Err(QevoError::UnboundParameter(Self::first_symbol(op)));
        }
        self.inner.apply_operation(state, op)
    }

    fn collapse_measure(
        &self,
        state: &mut State,
        qubits: &[QubitId],
        outcome: usize,
    ) -> QevoResult<f64> {
        self.inner.collapse_measure(state, qubits, outcome)
    }

    fn expectation(&self, state: &State, observable: &PauliString) -> QevoResult<f64> {
        self.inner.expectation(state, observable)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseBackend;
    use approx::assert_relative_eq;
    use qevo_core::{Bindings, CircuitBuilder, QevoError};

    fn symbolic() -> SymbolicBackend {
        SymbolicBackend::new(Arc::new(DenseBackend::with_defaults()))
    }

    #[test]
    fn test_refuses_unbound_operations() {
        let backend = symbolic();
        let circuit = CircuitBuilder::new(1).rx_sym(0, "theta").build();
        let mut state = backend.allocate_state(1, StateKind::Vector).unwrap();

        let err = backend
            .apply_operation(&mut state, &circuit.ops()[0])
            .unwrap_err();
        assert_eq!(err, QevoError::UnboundParameter("theta".to_string()));
    }

    #[test]
    fn test_delegates_bound_operations() {
        let backend = symbolic();
        let circuit = CircuitBuilder::new(1).rx_sym(0, "theta").build();

        let mut bindings = Bindings::new();
        bindings.insert("theta".to_string(), std::f64::consts::PI);
        let bound = circuit.bind(&bindings).unwrap();

        let mut state = backend.allocate_state(1, StateKind::Vector).unwrap();
        backend
            .apply_operation(&mut state, &bound.ops()[0])
            .unwrap();

        // Rx(pi)|0> = -i|1>
        let probs = state.probabilities(&[0]).unwrap();
        assert_relative_eq!(probs[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_name_reflects_delegate() {
        let backend = symbolic();
        assert_eq!(backend.name(), "symbolic+dense");
        assert!(backend.supports(StateKind::Density));
    }
}
