//! Error types for QEVO
//!
//! One error enum shared by every crate in the workspace. Construction-time
//! errors (shape, unitarity, index validation) surface when an operation or
//! circuit is built; execution-time errors abort the run that raised them.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QEVO
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QevoError {
    // ========================================================================
    // Construction / Validation Errors
    // ========================================================================
    /// Matrix dimension does not match the qubit count it should act on
    #[error("Shape mismatch: expected dimension {expected}, got {actual}")]
    Shape { expected: usize, actual: usize },

    /// Matrix failed a unitarity or Kraus-completeness check
    #[error("Unitarity violation: deviation {deviation:.3e} exceeds tolerance {tolerance:.3e}")]
    Unitarity { deviation: f64, tolerance: f64 },

    /// Qubit index out of range
    #[error("Qubit {qubit} out of range: circuit has {num_qubits} qubits")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },

    /// Same qubit listed twice in a target or control set
    #[error("Duplicate qubit {0} in operation")]
    DuplicateQubit(usize),

    /// Control qubit also appears as a target
    #[error("Qubit {0} appears as both control and target")]
    OverlappingControls(usize),

    /// Circuits with different qubit counts cannot be composed
    #[error("Qubit count mismatch: {left} vs {right}")]
    QubitCountMismatch { left: usize, right: usize },

    /// Probability value out of range [0, 1]
    #[error("Invalid probability {0}: must be in range [0, 1]")]
    InvalidProbability(f64),

    /// Invalid bitstring format
    #[error("Invalid bitstring '{0}': must contain only '0' and '1'")]
    InvalidBitstring(String),

    /// Invalid Pauli character
    #[error("Invalid Pauli '{0}': must be I, X, Y, or Z")]
    InvalidPauli(String),

    /// Empty circuit where at least one operation is required
    #[error("Circuit is empty")]
    EmptyCircuit,

    /// Empty Kraus operator set
    #[error("Channel must contain at least one Kraus operator")]
    EmptyKrausSet,

    // ========================================================================
    // Parameter Errors
    // ========================================================================
    /// Symbolic parameter reached execution without a bound value
    #[error("Unbound parameter '{0}'")]
    UnboundParameter(String),

    /// Parameter value is not a finite number
    #[error("Invalid parameter value {0}: must be finite")]
    InvalidParameterValue(f64),

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// NaN/Inf or normalization drift detected during evolution
    #[error("Numerical instability at operation {step}: {detail}")]
    NumericalInstability { step: usize, detail: String },

    /// Backend lacks a capability required by an operation
    #[error("Backend '{backend}' does not support {what}")]
    Unsupported { backend: String, what: String },

    /// Execution aborted by an external cancellation signal
    #[error("Execution cancelled")]
    Cancelled,

    /// State failed shape or norm validation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Classical register referenced before any measurement wrote it
    #[error("Unknown classical register '{0}'")]
    UnknownRegister(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(String),

    /// File I/O error
    #[error("File error: {0}")]
    Io(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for QEVO operations
pub type QevoResult<T> = Result<T, QevoError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QevoError {
    fn from(err: serde_json::Error) -> Self {
        QevoError::Json(err.to_string())
    }
}

impl From<std::io::Error> for QevoError {
    fn from(err: std::io::Error) -> Self {
        QevoError::Io(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QevoError {
    /// Check if error was raised while building an operation or circuit
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            QevoError::Shape { .. }
                | QevoError::Unitarity { .. }
                | QevoError::QubitOutOfRange { .. }
                | QevoError::DuplicateQubit(_)
                | QevoError::OverlappingControls(_)
                | QevoError::QubitCountMismatch { .. }
                | QevoError::InvalidProbability(_)
                | QevoError::InvalidBitstring(_)
                | QevoError::InvalidPauli(_)
                | QevoError::EmptyKrausSet
                | QevoError::InvalidParameterValue(_)
        )
    }

    /// Check if error was raised during circuit execution
    pub fn is_execution_error(&self) -> bool {
        matches!(
            self,
            QevoError::NumericalInstability { .. }
                | QevoError::Unsupported { .. }
                | QevoError::Cancelled
                | QevoError::InvalidState(_)
                | QevoError::UnknownRegister(_)
                | QevoError::UnboundParameter(_)
                | QevoError::EmptyCircuit
        )
    }

    /// Check if error was an external cancellation rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, QevoError::Cancelled)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QevoError::Shape {
            expected: 4,
            actual: 2,
        };
        assert!(err.to_string().contains('4'));
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_unitarity_display() {
        let err = QevoError::Unitarity {
            deviation: 0.5,
            tolerance: 1e-8,
        };
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn test_is_construction_error() {
        let shape = QevoError::Shape {
            expected: 2,
            actual: 4,
        };
        assert!(shape.is_construction_error());
        assert!(!shape.is_execution_error());

        let nan = QevoError::NumericalInstability {
            step: 3,
            detail: "NaN amplitude".into(),
        };
        assert!(nan.is_execution_error());
        assert!(!nan.is_construction_error());
    }

    #[test]
    fn test_is_cancellation() {
        assert!(QevoError::Cancelled.is_cancellation());
        assert!(!QevoError::EmptyCircuit.is_cancellation());
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: QevoError = json_err.into();
        assert!(matches!(err, QevoError::Json(_)));
    }
}
