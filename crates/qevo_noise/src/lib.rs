//! # QEVO Noise
//!
//! Standard Kraus channels and circuit-level noise models.
//!
//! ## Quick Start
//!
//! ```rust
//! use qevo_noise::prelude::*;
//! use qevo_core::CircuitBuilder;
//!
//! // Attach depolarizing noise after every gate
//! let model = NoiseModel::depolarizing(0.001, 0.01).unwrap();
//! let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
//! let noisy = model.apply(&circuit).unwrap();
//!
//! assert_eq!(noisy.count_channels(), 2);
//! assert!(noisy.requires_density());
//! ```
//!
//! ## Individual Channels
//!
//! ```rust
//! use qevo_noise::channels;
//!
//! let damping = channels::amplitude_damping(0.1).unwrap();
//! assert_eq!(damping.len(), 2);
//!
//! // Kraus completeness is validated at construction
//! assert!(channels::bit_flip(1.2).is_err());
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Standard channel constructors (bit flip, depolarizing, damping, ...)
pub mod channels;

/// Circuit-level noise model
pub mod model;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::NoiseModel;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qevo_noise::prelude::*;
    //! ```

    pub use crate::channels;
    pub use crate::model::NoiseModel;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qevo_core::{CircuitBuilder, QevoError};

    #[test]
    fn test_noisy_ghz_pipeline() {
        let model = NoiseModel::ideal()
            .with_gate_error(1, channels::depolarizing(0.01).unwrap())
            .unwrap()
            .with_gate_error(2, channels::depolarizing_n(2, 0.05).unwrap())
            .unwrap();

        let ghz = CircuitBuilder::new(3).h(0).cx_chain().measure_all().build();
        let noisy = model.apply(&ghz).unwrap();

        // one channel per gate, none after the measurement
        assert_eq!(noisy.count_gates(), 3);
        assert_eq!(noisy.count_channels(), 3);
        assert_eq!(noisy.count_measurements(), 1);
        assert!(noisy.requires_density());
        // rewrite is pure
        assert!(!ghz.requires_density());
    }

    #[test]
    fn test_channel_validation_propagates() {
        assert!(matches!(
            channels::pauli_channel(0.6, 0.6, 0.0).unwrap_err(),
            QevoError::InvalidProbability(_)
        ));
        assert!(matches!(
            channels::depolarizing(-0.2).unwrap_err(),
            QevoError::InvalidProbability(_)
        ));
    }

    #[test]
    fn test_model_serde_roundtrip() {
        let model = NoiseModel::depolarizing(0.001, 0.01).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: NoiseModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model, back);
    }
}
