//! # QEVO Backend
//!
//! State representations and numerical backends for the QEVO
//! quantum-circuit execution engine: state vectors and density
//! matrices, dense contraction kernels (sequential and rayon-parallel),
//! the `Backend` capability trait, and Pauli-string observables.
//!
//! ## Quick Start
//!
//! ```rust
//! use qevo_backend::prelude::*;
//! use qevo_core::CircuitBuilder;
//!
//! let backend = construct_backend(&BackendConfig::dense());
//! let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
//!
//! let mut state = backend.allocate_state(2, StateKind::Vector).unwrap();
//! for op in circuit.ops() {
//!     backend.apply_operation(&mut state, op).unwrap();
//! }
//!
//! let probs = state.probabilities(&[0, 1]).unwrap();
//! assert!((probs[0b00] - 0.5).abs() < 1e-9);
//! assert!((probs[0b11] - 0.5).abs() < 1e-9);
//! ```
//!
//! ## Observables
//!
//! ```rust
//! use qevo_backend::prelude::*;
//!
//! let backend = default_backend();
//! let state = backend.allocate_state(2, StateKind::Vector).unwrap();
//!
//! let z = PauliString::parse("IZ").unwrap();
//! let value = backend.expectation(&state, &z).unwrap();
//! assert!((value - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Backend trait and construction
pub mod backend;

/// Rayon-parallel dense backend
pub mod batched;

/// Backend configuration: kind, precision, tolerances
pub mod config;

/// Sequential dense backend
pub mod dense;

/// Pauli-string observables
pub mod observable;

/// State vectors and density matrices
pub mod state;

/// Symbolic placeholder backend
pub mod symbolic;

mod kernels;

// ============================================================================
// Re-exports
// ============================================================================

pub use backend::{construct_backend, default_backend, Backend, DEFAULT_ORDER};
pub use batched::BatchedBackend;
pub use config::{
    BackendConfig, BackendKind, Precision, Tolerances, DEFAULT_PARALLEL_THRESHOLD,
};
pub use dense::DenseBackend;
pub use observable::{Pauli, PauliString};
pub use state::{
    DensityMatrix, State, StateKind, StateVector, MAX_DENSITY_QUBITS, MAX_VECTOR_QUBITS,
};
pub use symbolic::SymbolicBackend;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qevo_backend::prelude::*;
    //! ```

    pub use crate::backend::{construct_backend, default_backend, Backend, DEFAULT_ORDER};
    pub use crate::batched::BatchedBackend;
    pub use crate::config::{BackendConfig, BackendKind, Precision, Tolerances};
    pub use crate::dense::DenseBackend;
    pub use crate::observable::{Pauli, PauliString};
    pub use crate::state::{DensityMatrix, State, StateKind, StateVector};
    pub use crate::symbolic::SymbolicBackend;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::{NAME, VERSION};
    use approx::assert_relative_eq;
    use qevo_core::{fuse, CircuitBuilder, FusionConfig};

    fn run(backend: &dyn Backend, circuit: &qevo_core::Circuit, kind: StateKind) -> State {
        let mut state = backend
            .allocate_state(circuit.num_qubits(), kind)
            .unwrap();
        for op in circuit.ops() {
            backend.apply_operation(&mut state, op).unwrap();
        }
        state
    }

    #[test]
    fn test_ghz_state() {
        let backend = default_backend();
        let circuit = CircuitBuilder::new(3).h(0).cx_chain().build();
        let state = run(backend.as_ref(), &circuit, StateKind::Vector);

        let probs = state.probabilities(&[0, 1, 2]).unwrap();
        assert_relative_eq!(probs[0b000], 0.5, epsilon = 1e-9);
        assert_relative_eq!(probs[0b111], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_vector_density_equivalence() {
        let backend = DenseBackend::with_defaults();
        let mut builder = CircuitBuilder::new(3);
        for q in 0..3 {
            builder = builder.h(q).rz(q, 0.21 * (q + 1) as f64);
        }
        let circuit = builder.cnot(0, 1).cnot(1, 2).ry(2, 1.1).build();

        let vector = run(&backend, &circuit, StateKind::Vector);
        let density = run(&backend, &circuit, StateKind::Density);

        let pv = vector.probabilities(&[0, 1, 2]).unwrap();
        let pd = density.probabilities(&[0, 1, 2]).unwrap();
        for (a, b) in pv.iter().zip(pd.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_fusion_transparency() {
        let backend = DenseBackend::with_defaults();
        let circuit = CircuitBuilder::new(2)
            .h(0)
            .t(0)
            .h(1)
            .cnot(0, 1)
            .cz(0, 1)
            .sx(1)
            .build();
        let fused = fuse(&circuit, &FusionConfig::new()).unwrap();
        assert!(fused.len() < circuit.len());

        let plain = run(&backend, &circuit, StateKind::Vector);
        let through = run(&backend, &fused, StateKind::Vector);
        let diff = plain
            .vector()
            .unwrap()
            .max_abs_diff(through.vector().unwrap());
        assert!(diff < 1e-9, "fusion changed the state by {}", diff);
    }

    #[test]
    fn test_fully_depolarizing_yields_maximally_mixed() {
        let backend = DenseBackend::with_defaults();
        let mut state = backend.allocate_state(1, StateKind::Density).unwrap();
        let h = qevo_core::Operation::gate(qevo_core::Generator::H, vec![0]).unwrap();
        backend.apply_operation(&mut state, &h).unwrap();

        // p = (4^n - 1) / 4^n erases all information
        let channel = qevo_noise::channels::depolarizing(0.75).unwrap();
        let op = qevo_core::Operation::channel(channel, vec![0]).unwrap();
        backend.apply_operation(&mut state, &op).unwrap();

        let rho = state.density().unwrap();
        assert_relative_eq!(rho.purity(), 0.5, epsilon = 1e-10);
        assert_relative_eq!(rho.get(0, 0).re, 0.5, epsilon = 1e-10);
        assert_relative_eq!(rho.get(0, 1).norm(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_symbolic_construction_guards() {
        let backend = construct_backend(&BackendConfig::new().with_kind(BackendKind::Symbolic));
        let circuit = CircuitBuilder::new(1).ry_sym(0, "a").build();
        let mut state = backend.allocate_state(1, StateKind::Vector).unwrap();
        assert!(backend
            .apply_operation(&mut state, &circuit.ops()[0])
            .is_err());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "qevo_backend");
    }
}
