//! Execution results and metadata

use std::collections::HashMap;
use std::fmt;

use qevo_backend::{PauliString, State};
use qevo_backend::Precision;
use qevo_core::{Bitstring, Counts, QevoResult, QubitId};
use serde::{Deserialize, Serialize};

use crate::sampler;

// ============================================================================
// Classical Registers
// ============================================================================

/// One named register: the outcome of its most recent measurement
///
/// Bit `j` of `value` is the measured value of the j-th qubit listed
/// by the measurement that wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSlot {
    /// Recorded outcome, little-endian over the measured qubits
    pub value: u64,
    /// Number of qubits recorded
    pub width: usize,
}

/// The classical register file owned by an execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassicalRegisters {
    slots: HashMap<String, RegisterSlot>,
}

impl ClassicalRegisters {
    /// Empty register file
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measurement outcome, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: u64, width: usize) {
        self.slots.insert(name.into(), RegisterSlot { value, width });
    }

    /// Current value of a register
    pub fn get(&self, name: &str) -> Option<u64> {
        self.slots.get(name).map(|slot| slot.value)
    }

    /// Full slot including its width
    pub fn slot(&self, name: &str) -> Option<RegisterSlot> {
        self.slots.get(name).copied()
    }

    /// Register value rendered as a bitstring, most significant bit first
    pub fn bitstring(&self, name: &str) -> Option<String> {
        self.slots
            .get(name)
            .map(|slot| Bitstring::from_index(slot.value as usize, slot.width).to_string())
    }

    /// Register names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registers written so far
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True before any measurement has been recorded
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ============================================================================
// Execution Metadata
// ============================================================================

/// Diagnostics recorded alongside every execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Name of the backend that ran the circuit
    pub backend: String,
    /// Precision profile the engine ran under
    pub precision: Precision,
    /// Wall-clock execution time in milliseconds
    pub elapsed_ms: f64,
    /// Operations actually applied (skipped conditionals excluded)
    pub applied_ops: usize,
    /// Largest norm / trace drift from 1 observed during evolution
    pub norm_drift: f64,
    /// Seed the run was started with, if any
    pub seed: Option<u64>,
}

impl fmt::Display for ExecutionMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} backend, {} precision: {} ops in {:.3} ms (drift {:.2e})",
            self.backend, self.precision, self.applied_ops, self.elapsed_ms, self.norm_drift
        )
    }
}

// ============================================================================
// Execution Result
// ============================================================================

/// Immutable outcome of one circuit execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    state: State,
    registers: ClassicalRegisters,
    metadata: ExecutionMetadata,
}

impl ExecutionResult {
    pub(crate) fn new(
        state: State,
        registers: ClassicalRegisters,
        metadata: ExecutionMetadata,
    ) -> Self {
        Self {
            state,
            registers,
            metadata,
        }
    }

    /// Final state, tagged by representation
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Classical register contents
    pub fn registers(&self) -> &ClassicalRegisters {
        &self.registers
    }

    /// Execution diagnostics
    pub fn metadata(&self) -> &ExecutionMetadata {
        &self.metadata
    }

    /// Take ownership of the final state
    pub fn into_state(self) -> State {
        self.state
    }

    /// Shorthand for a register value
    pub fn register(&self, name: &str) -> Option<u64> {
        self.registers.get(name)
    }

    /// Sample outcome counts for a qubit subset from the final state
    pub fn sample(&self, qubits: &[QubitId], shots: u64, seed: u64) -> QevoResult<Counts> {
        sampler::sample(&self.state, qubits, shots, seed)
    }

    /// Sample outcome counts over the full register
    pub fn sample_all(&self, shots: u64, seed: u64) -> QevoResult<Counts> {
        let qubits: Vec<QubitId> = (0..self.state.num_qubits()).collect();
        sampler::sample(&self.state, &qubits, shots, seed)
    }

    /// Expectation value of a Pauli-string observable on the final state
    pub fn expectation(&self, observable: &PauliString) -> QevoResult<f64> {
        self.state.expectation(observable)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qevo_backend::StateKind;

    fn metadata() -> ExecutionMetadata {
        ExecutionMetadata {
            backend: "dense".to_string(),
            precision: Precision::Double,
            elapsed_ms: 1.25,
            applied_ops: 4,
            norm_drift: 1e-14,
            seed: Some(7),
        }
    }

    #[test]
    fn test_registers_record_latest_value() {
        let mut registers = ClassicalRegisters::new();
        registers.set("m", 0b01, 2);
        registers.set("m", 0b10, 2);
        registers.set("flag", 1, 1);

        assert_eq!(registers.get("m"), Some(0b10));
        assert_eq!(registers.get("flag"), Some(1));
        assert_eq!(registers.get("missing"), None);
        assert_eq!(registers.len(), 2);
        assert_eq!(registers.names(), vec!["flag", "m"]);
    }

    #[test]
    fn test_register_bitstring_is_msb_first() {
        let mut registers = ClassicalRegisters::new();
        // bit 0 = first measured qubit
        registers.set("m", 0b001, 3);
        assert_eq!(registers.bitstring("m"), Some("001".to_string()));
        registers.set("m", 0b100, 3);
        assert_eq!(registers.bitstring("m"), Some("100".to_string()));
    }

    #[test]
    fn test_result_accessors() {
        let state = State::zero(2, StateKind::Vector).unwrap();
        let result = ExecutionResult::new(state, ClassicalRegisters::new(), metadata());

        assert_eq!(result.state().num_qubits(), 2);
        assert!(result.registers().is_empty());
        assert_eq!(result.metadata().applied_ops, 4);
        assert_eq!(result.register("m"), None);

        let z = PauliString::parse("ZZ").unwrap();
        let value = result.expectation(&z).unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_all_on_basis_state() {
        let state = State::zero(2, StateKind::Vector).unwrap();
        let result = ExecutionResult::new(state, ClassicalRegisters::new(), metadata());
        let counts = result.sample_all(100, 42).unwrap();
        assert_eq!(counts.get("00"), Some(&100));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_metadata_serde_roundtrip() {
        let meta = metadata();
        let json = serde_json::to_string(&meta).unwrap();
        let back: ExecutionMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
        assert!(meta.to_string().contains("dense"));
    }
}
