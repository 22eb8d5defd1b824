//! # QEVO Core
//!
//! Circuit representation for the QEVO quantum-circuit execution engine:
//! operations (gates, measurements, Kraus channels), validated complex
//! matrices, circuits with composition and parameter binding, a fluent
//! builder, and the gate fusion pass.
//!
//! ## Quick Start
//!
//! ```rust
//! use qevo_core::prelude::*;
//!
//! // Build a Bell circuit
//! let circuit = CircuitBuilder::new(2)
//!     .h(0)
//!     .cnot(0, 1)
//!     .measure_all()
//!     .build();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.count_gates(), 2);
//! assert!(!circuit.has_mid_circuit_measurement());
//! ```
//!
//! ## Symbolic Parameters
//!
//! ```rust
//! use qevo_core::prelude::*;
//!
//! let circuit = CircuitBuilder::new(1)
//!     .ry_sym(0, "theta")
//!     .build_validated()
//!     .unwrap();
//! assert!(circuit.is_parametrized());
//!
//! let mut bindings = Bindings::new();
//! bindings.insert("theta".to_string(), 0.25);
//! let bound = circuit.bind(&bindings).unwrap();
//! assert!(!bound.is_parametrized());
//! ```
//!
//! ## Gate Fusion
//!
//! ```rust
//! use qevo_core::prelude::*;
//!
//! let circuit = CircuitBuilder::new(1).h(0).x(0).h(0).build();
//! let fused = fuse(&circuit, &FusionConfig::new()).unwrap();
//! assert_eq!(fused.len(), 1);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Fluent circuit builder
pub mod builder;

/// Circuit container: composition, remapping, binding, analysis
pub mod circuit;

/// Numerical tolerance defaults
pub mod constants;

/// Error enum shared across the workspace
pub mod error;

/// Gate fusion pass
pub mod fusion;

/// Kraus operator sets for noise channels
pub mod kraus;

/// Dense complex square matrices
pub mod matrix;

/// Operations: gates, measurements, channels, parameters
pub mod operation;

/// Core type aliases and validated wrappers
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{CircuitBuilder, DEFAULT_REGISTER};
pub use circuit::Circuit;
pub use constants::{tol, tol_single};
pub use error::{QevoError, QevoResult};
pub use fusion::{fuse, FusionConfig};
pub use kraus::KrausSet;
pub use matrix::SquareMatrix;
pub use operation::{Condition, Generator, OpKind, Operation, Param};
pub use types::{Angle, Bindings, Bitstring, Counts, Probability, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qevo_core::prelude::*;
    //! ```

    pub use crate::builder::{CircuitBuilder, DEFAULT_REGISTER};
    pub use crate::circuit::Circuit;
    pub use crate::constants::{tol, tol_single};
    pub use crate::error::{QevoError, QevoResult};
    pub use crate::fusion::{fuse, FusionConfig};
    pub use crate::kraus::KrausSet;
    pub use crate::matrix::SquareMatrix;
    pub use crate::operation::{Condition, Generator, OpKind, Operation, Param};
    pub use crate::types::{Angle, Bindings, Bitstring, Counts, Probability, QubitId};
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
