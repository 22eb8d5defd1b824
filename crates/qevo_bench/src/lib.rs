//! # QEVO Bench
//!
//! Circuit generators and a small benchmark suite for the QEVO
//! quantum-circuit execution engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use qevo_bench::prelude::*;
//!
//! let mut suite = BenchSuite::with_seed(42).with_shots(256);
//! let results = suite.run_quick().unwrap();
//!
//! let report = Reporter::to_markdown(&results);
//! assert!(report.contains("ghz_3q"));
//! ```
//!
//! ## Circuit Generation
//!
//! ```rust
//! use qevo_bench::prelude::*;
//!
//! let gen = CircuitGenerator::with_seed(42);
//!
//! let bell = gen.bell();
//! let ghz = gen.ghz(5);
//! let qft = gen.qft(4);
//! let random = gen.random(5, 3);
//!
//! assert_eq!(ghz.num_qubits(), 5);
//! assert_eq!(qft.num_qubits(), 4);
//! ```
//!
//! ## Random Test States
//!
//! ```rust
//! use qevo_bench::{random_density_matrix, random_statevector, random_unitary};
//!
//! let psi = random_statevector(3, 7).unwrap();
//! assert!((psi.squared_norm() - 1.0).abs() < 1e-12);
//!
//! let rho = random_density_matrix(2, 7).unwrap();
//! assert!((rho.trace() - 1.0).abs() < 1e-12);
//!
//! let u = random_unitary(1, 7).unwrap();
//! assert!(u.is_unitary(1e-9));
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Circuit generators and random test-state tooling
pub mod generators;

/// Benchmark reporting
pub mod reporter;

/// Benchmark suite
pub mod suite;

// ============================================================================
// Re-exports
// ============================================================================

pub use generators::{
    random_density_matrix, random_statevector, random_unitary, CircuitGenerator,
};
pub use reporter::{ReportFormat, Reporter};
pub use suite::{BenchSuite, BenchmarkResult, BenchmarkStatistics};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qevo_bench::prelude::*;
    //! ```

    pub use crate::generators::CircuitGenerator;
    pub use crate::reporter::{ReportFormat, Reporter};
    pub use crate::suite::{BenchSuite, BenchmarkResult, BenchmarkStatistics};
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
