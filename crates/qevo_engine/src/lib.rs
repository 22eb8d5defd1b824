//! # QEVO Engine
//!
//! Circuit execution for the QEVO quantum simulator: the evolution
//! engine with classical registers, conditioned operations and
//! mid-circuit measurement, Born-rule shot sampling with alias tables,
//! parallel parameter sweeps, and cooperative cancellation.
//!
//! ## Quick Start
//!
//! ```rust
//! use qevo_engine::prelude::*;
//! use qevo_core::CircuitBuilder;
//!
//! let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).measure_all().build();
//! let engine = EvolutionEngine::with_defaults().with_seed(42);
//!
//! let counts = engine.run_shots(&circuit, 1000).unwrap();
//! let total: u64 = counts.values().sum();
//! assert_eq!(total, 1000);
//! assert!(counts.keys().all(|k| k == "00" || k == "11"));
//! ```
//!
//! ## Parameter Sweeps
//!
//! ```rust
//! use qevo_engine::prelude::*;
//! use qevo_core::{Bindings, CircuitBuilder};
//!
//! let circuit = CircuitBuilder::new(1).rx_sym(0, "theta").build();
//! let sweep: Vec<Bindings> = [0.0, std::f64::consts::PI]
//!     .iter()
//!     .map(|&theta| {
//!         let mut bindings = Bindings::new();
//!         bindings.insert("theta".to_string(), theta);
//!         bindings
//!     })
//!     .collect();
//!
//! let engine = EvolutionEngine::with_defaults().with_seed(7);
//! let results = execute_sweep(&engine, &circuit, &sweep).unwrap();
//! assert_eq!(results.len(), 2);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Evolution engine and cancellation
pub mod engine;

/// Execution results, classical registers, run metadata
pub mod result;

/// Outcome sampling and counts statistics
pub mod sampler;

/// Parallel parameter sweeps
pub mod sweep;

// ============================================================================
// Re-exports
// ============================================================================

pub use engine::{CancelToken, EvolutionEngine};
pub use result::{ClassicalRegisters, ExecutionMetadata, ExecutionResult, RegisterSlot};
pub use sampler::{counts_entropy, most_frequent, sample, sample_once, shannon_entropy, AliasTable};
pub use sweep::execute_sweep;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qevo_engine::prelude::*;
    //! ```

    pub use crate::engine::{CancelToken, EvolutionEngine};
    pub use crate::result::{ClassicalRegisters, ExecutionMetadata, ExecutionResult};
    pub use crate::sampler::{counts_entropy, most_frequent, shannon_entropy};
    pub use crate::sweep::execute_sweep;
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
    use super::*;
    use approx::assert_relative_eq;
    use qevo_backend::PauliString;
    use qevo_core::CircuitBuilder;

    #[test]
    fn test_bell_counts_split_evenly() {
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).measure_all().build();
        let engine = EvolutionEngine::with_defaults().with_seed(1234);

        let counts = engine.run_shots(&circuit, 10_000).unwrap();
        let zeros = counts.get("00").copied().unwrap_or(0);
        let ones = counts.get("11").copied().unwrap_or(0);
        assert_eq!(zeros + ones, 10_000, "leaked outcomes: {:?}", counts);
        assert!(zeros > 4600 && zeros < 5400, "skewed split: {}", zeros);
    }

    #[test]
    fn test_full_bit_flip_is_deterministic() {
        let flip = qevo_noise::channels::bit_flip(1.0).unwrap();
        let circuit = CircuitBuilder::new(1)
            .channel(flip, vec![0])
            .measure_all()
            .build();
        let engine = EvolutionEngine::with_defaults().with_seed(5);

        let counts = engine.run_shots(&circuit, 1000).unwrap();
        assert_eq!(counts.get("1"), Some(&1000));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_noisy_bell_conserves_shots() {
        let noise = qevo_noise::NoiseModel::depolarizing(0.05, 0.1).unwrap();
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).measure_all().build();
        let noisy = noise.apply(&circuit).unwrap();
        assert!(noisy.requires_density());

        let engine = EvolutionEngine::with_defaults().with_seed(8);
        let counts = engine.run_shots(&noisy, 4000).unwrap();
        let total: u64 = counts.values().sum();
        assert_eq!(total, 4000);

        // correlated outcomes still dominate under mild noise
        let agree = counts.get("00").copied().unwrap_or(0) + counts.get("11").copied().unwrap_or(0);
        assert!(agree > 3000, "noise washed out the Bell pair: {:?}", counts);
    }

    #[test]
    fn test_terminal_sampling_reproducible() {
        let circuit = CircuitBuilder::new(3)
            .h_layer()
            .cx_chain()
            .measure_all()
            .build();
        let a = EvolutionEngine::with_defaults()
            .with_seed(99)
            .run_shots(&circuit, 2000)
            .unwrap();
        let b = EvolutionEngine::with_defaults()
            .with_seed(99)
            .run_shots(&circuit, 2000)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_uniform_superposition_entropy() {
        let circuit = CircuitBuilder::new(2).h_layer().measure_all().build();
        let engine = EvolutionEngine::with_defaults().with_seed(31);

        let counts = engine.run_shots(&circuit, 8192).unwrap();
        let entropy = counts_entropy(&counts).unwrap();
        assert!(
            (entropy - 2.0).abs() < 0.05,
            "expected ~2 bits, got {}",
            entropy
        );

        let deterministic = CircuitBuilder::new(2).x(0).measure_all().build();
        let counts = engine.run_shots(&deterministic, 1024).unwrap();
        assert_relative_eq!(counts_entropy(&counts).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_result_expectation_pipeline() {
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
        let result = EvolutionEngine::with_defaults()
            .execute(&circuit, None)
            .unwrap();

        let zz = result.expectation(&PauliString::parse("ZZ").unwrap()).unwrap();
        let xx = result.expectation(&PauliString::parse("XX").unwrap()).unwrap();
        let zi = result.expectation(&PauliString::parse("ZI").unwrap()).unwrap();
        assert_relative_eq!(zz, 1.0, epsilon = 1e-12);
        assert_relative_eq!(xx, 1.0, epsilon = 1e-12);
        assert_relative_eq!(zi, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_most_frequent_outcome() {
        let circuit = CircuitBuilder::new(2).x(1).measure_all().build();
        let counts = EvolutionEngine::with_defaults()
            .with_seed(2)
            .run_shots(&circuit, 64)
            .unwrap();
        assert_eq!(most_frequent(&counts), Some(("10", 64)));
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "qevo_engine");
    }
}
