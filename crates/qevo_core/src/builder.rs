//! Circuit builder
//!
//! Fluent builder (consuming self) for constructing circuits. Invalid
//! operations do not panic mid-chain: the first error is stored and
//! surfaced by `build_validated()`, while `build()` returns whatever
//! was accepted up to that point.

use crate::circuit::Circuit;
use crate::error::{QevoError, QevoResult};
use crate::kraus::KrausSet;
use crate::matrix::SquareMatrix;
use crate::operation::{Generator, Operation, Param};
use crate::types::{Angle, QubitId};

/// Default classical register name for measurements
pub const DEFAULT_REGISTER: &str = "c";

// ============================================================================
// CircuitBuilder
// ============================================================================

/// Fluent circuit builder (consuming self pattern)
#[derive(Debug, Clone)]
pub struct CircuitBuilder {
    circuit: Circuit,
    error: Option<QevoError>,
}

impl CircuitBuilder {
    /// Create a builder for a circuit over `num_qubits` qubits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
            error: None,
        }
    }

    fn push(mut self, op: QevoResult<Operation>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match op {
            Ok(op) => {
                if let Err(e) = self.circuit.push(op) {
                    self.error = Some(e);
                }
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Hadamard gate
    pub fn h(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::H, vec![qubit]))
    }

    /// Pauli X gate
    pub fn x(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::X, vec![qubit]))
    }

    /// Pauli Y gate
    pub fn y(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::Y, vec![qubit]))
    }

    /// Pauli Z gate
    pub fn z(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::Z, vec![qubit]))
    }

    /// S gate (√Z)
    pub fn s(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::S, vec![qubit]))
    }

    /// S-dagger gate
    pub fn sdg(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::Sdg, vec![qubit]))
    }

    /// T gate
    pub fn t(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::T, vec![qubit]))
    }

    /// T-dagger gate
    pub fn tdg(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::Tdg, vec![qubit]))
    }

    /// √X gate
    pub fn sx(self, qubit: QubitId) -> Self {
        self.push(Operation::gate(Generator::SqrtX, vec![qubit]))
    }

    // ========================================================================
    // Rotations
    // ========================================================================

    /// X-axis rotation
    pub fn rx(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Operation::gate(Generator::Rx(angle.into()), vec![qubit]))
    }

    /// Y-axis rotation
    pub fn ry(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Operation::gate(Generator::Ry(angle.into()), vec![qubit]))
    }

    /// Z-axis rotation
    pub fn rz(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Operation::gate(Generator::Rz(angle.into()), vec![qubit]))
    }

    /// Phase gate diag(1, e^{iλ})
    pub fn phase(self, qubit: QubitId, lambda: Angle) -> Self {
        self.push(Operation::gate(Generator::Phase(lambda.into()), vec![qubit]))
    }

    /// General single-qubit unitary U(θ, φ, λ)
    pub fn u(self, qubit: QubitId, theta: Angle, phi: Angle, lambda: Angle) -> Self {
        self.push(Operation::gate(
            Generator::U {
                theta: theta.into(),
                phi: phi.into(),
                lambda: lambda.into(),
            },
            vec![qubit],
        ))
    }

    /// Symbolic X-axis rotation, bound later by name
    pub fn rx_sym(self, qubit: QubitId, name: &str) -> Self {
        self.push(Operation::gate(
            Generator::Rx(Param::symbol(name)),
            vec![qubit],
        ))
    }

    /// Symbolic Y-axis rotation, bound later by name
    pub fn ry_sym(self, qubit: QubitId, name: &str) -> Self {
        self.push(Operation::gate(
            Generator::Ry(Param::symbol(name)),
            vec![qubit],
        ))
    }

    /// Symbolic Z-axis rotation, bound later by name
    pub fn rz_sym(self, qubit: QubitId, name: &str) -> Self {
        self.push(Operation::gate(
            Generator::Rz(Param::symbol(name)),
            vec![qubit],
        ))
    }

    // ========================================================================
    // Two-Qubit and Controlled Gates
    // ========================================================================

    /// Controlled-X (CNOT)
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.push(Operation::controlled(Generator::X, vec![control], vec![target]))
    }

    /// Controlled-Z
    pub fn cz(self, control: QubitId, target: QubitId) -> Self {
        self.push(Operation::controlled(Generator::Z, vec![control], vec![target]))
    }

    /// Swap two qubits
    pub fn swap(self, qubit1: QubitId, qubit2: QubitId) -> Self {
        self.push(Operation::gate(Generator::Swap, vec![qubit1, qubit2]))
    }

    /// Controlled phase rotation
    pub fn cphase(self, control: QubitId, target: QubitId, lambda: Angle) -> Self {
        self.push(Operation::controlled(
            Generator::Phase(lambda.into()),
            vec![control],
            vec![target],
        ))
    }

    /// Controlled Z-axis rotation
    pub fn crz(self, control: QubitId, target: QubitId, angle: Angle) -> Self {
        self.push(Operation::controlled(
            Generator::Rz(angle.into()),
            vec![control],
            vec![target],
        ))
    }

    /// Toffoli (controlled-controlled-X)
    pub fn ccx(self, control1: QubitId, control2: QubitId, target: QubitId) -> Self {
        self.push(Operation::controlled(
            Generator::X,
            vec![control1, control2],
            vec![target],
        ))
    }

    // ========================================================================
    // Generic Operations
    // ========================================================================

    /// Append a prebuilt operation
    pub fn op(self, operation: Operation) -> Self {
        self.push(Ok(operation))
    }

    /// Append a gate from a generator and target list
    pub fn gate(self, generator: Generator, targets: Vec<QubitId>) -> Self {
        self.push(Operation::gate(generator, targets))
    }

    /// Append a controlled gate
    pub fn controlled(
        self,
        generator: Generator,
        controls: Vec<QubitId>,
        targets: Vec<QubitId>,
    ) -> Self {
        self.push(Operation::controlled(generator, controls, targets))
    }

    /// Append an explicit unitary matrix
    pub fn unitary(self, matrix: SquareMatrix, targets: Vec<QubitId>) -> Self {
        self.push(Operation::unitary(matrix, targets))
    }

    /// Append a Kraus channel
    pub fn channel(self, kraus: KrausSet, targets: Vec<QubitId>) -> Self {
        self.push(Operation::channel(kraus, targets))
    }

    /// Reset a qubit to |0⟩ (forces density-matrix evolution)
    pub fn reset(self, qubit: QubitId) -> Self {
        self.push(Operation::reset(qubit))
    }

    // ========================================================================
    // Measurements
    // ========================================================================

    /// Measure one qubit into the default register
    pub fn measure(self, qubit: QubitId) -> Self {
        self.push(Operation::measure(vec![qubit], DEFAULT_REGISTER))
    }

    /// Measure qubits into a named register
    pub fn measure_into(self, qubits: Vec<QubitId>, register: &str) -> Self {
        self.push(Operation::measure(qubits, register))
    }

    /// Measure every qubit into the default register
    pub fn measure_all(self) -> Self {
        let all: Vec<QubitId> = (0..self.circuit.num_qubits()).collect();
        self.push(Operation::measure(all, DEFAULT_REGISTER))
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Hadamard on every qubit
    pub fn h_layer(mut self) -> Self {
        for q in 0..self.circuit.num_qubits() {
            self = self.h(q);
        }
        self
    }

    /// CNOT chain 0→1→2→… across the register
    pub fn cx_chain(mut self) -> Self {
        for q in 0..self.circuit.num_qubits().saturating_sub(1) {
            self = self.cnot(q, q + 1);
        }
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Finish building; operations after the first error are dropped
    pub fn build(self) -> Circuit {
        self.circuit
    }

    /// Finish building, surfacing the first construction error and
    /// rejecting empty circuits
    pub fn build_validated(self) -> QevoResult<Circuit> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.circuit.is_empty() {
            return Err(QevoError::EmptyCircuit);
        }
        Ok(self.circuit)
    }
}

// ============================================================================
// Tests
// ============================================================================
