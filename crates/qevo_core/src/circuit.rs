//! Quantum circuit representation
//!
//! A circuit is a fixed qubit count plus an ordered operation sequence.
//! Appending validates qubit indices; composition, index remapping, and
//! parameter binding all derive new circuits instead of mutating.

use crate::error::{QevoError, QevoResult};
use crate::operation::Operation;
use crate::types::{Bindings, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Circuit
// ============================================================================

/// Ordered operation sequence over a fixed qubit register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    num_qubits: usize,
    ops: Vec<Operation>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            ops: Vec::new(),
        }
    }

    /// Append an operation, validating its qubit indices
    pub fn push(&mut self, op: Operation) -> QevoResult<()> {
        if let Some(q) = op.max_qubit() {
            if q >= self.num_qubits {
                return Err(QevoError::QubitOutOfRange {
                    qubit: q,
                    num_qubits: self.num_qubits,
                });
            }
        }
        self.ops.push(op);
        Ok(())
    }

    /// Number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Operations in application order
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the circuit contains no operations
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    // ========================================================================
    // Derivation
    // ========================================================================

    /// Concatenate with another circuit of the same width
    pub fn then(&self, other: &Circuit) -> QevoResult<Circuit> {
        if self.num_qubits != other.num_qubits {
            return Err(QevoError::QubitCountMismatch {
                left: self.num_qubits,
                right: other.num_qubits,
            });
        }
        let mut ops = self.ops.clone();
        ops.extend(other.ops.iter().cloned());
        Ok(Circuit {
            num_qubits: self.num_qubits,
            ops,
        })
    }

    /// Remap this circuit onto qubits of a wider register
    ///
    /// `mapping[q]` gives the new index of local qubit `q`; indices must
    /// be distinct and lie in `[0, num_qubits)`.
    pub fn on_qubits(&self, mapping: &[QubitId], num_qubits: usize) -> QevoResult<Circuit> {
        if mapping.len() != self.num_qubits {
            return Err(QevoError::QubitCountMismatch {
                left: mapping.len(),
                right: self.num_qubits,
            });
        }
        for (i, &q) in mapping.iter().enumerate() {
            if q >= num_qubits {
                return Err(QevoError::QubitOutOfRange {
                    qubit: q,
                    num_qubits,
                });
            }
            if mapping[i + 1..].contains(&q) {
                return Err(QevoError::DuplicateQubit(q));
            }
        }
        let ops = self.ops.iter().map(|op| op.remapped(mapping)).collect();
        Ok(Circuit { num_qubits, ops })
    }

    /// Substitute symbolic parameters, producing a new circuit
    ///
    /// Symbols missing from the map stay unbound; binding values must be
    /// finite.
    pub fn bind(&self, bindings: &Bindings) -> QevoResult<Circuit> {
        for &value in bindings.values() {
            if !value.is_finite() {
                return Err(QevoError::InvalidParameterValue(value));
            }
        }
        let ops = self.ops.iter().map(|op| op.bind(bindings)).collect();
        Ok(Circuit {
            num_qubits: self.num_qubits,
            ops,
        })
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Names of all unbound symbolic parameters, sorted and deduplicated
    pub fn parameters(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for op in &self.ops {
            if let crate::operation::OpKind::Gate(g) = op.kind() {
                for s in g.symbols() {
                    names.insert(s.to_string());
                }
            }
        }
        names.into_iter().collect()
    }

    /// Whether any operation carries unbound symbolic parameters
    pub fn is_parametrized(&self) -> bool {
        self.ops.iter().any(|op| op.is_parametrized())
    }

    /// Circuit depth: longest chain of operations per qubit
    pub fn depth(&self) -> usize {
        let mut qubit_depth = vec![0usize; self.num_qubits];
        let mut depth = 0;
        for op in &self.ops {
            let qubits = op.qubits();
            let layer = qubits
                .iter()
                .map(|&q| qubit_depth[q])
                .max()
                .unwrap_or(0)
                + 1;
            for &q in &qubits {
                qubit_depth[q] = layer;
            }
            depth = depth.max(layer);
        }
        depth
    }

    /// Number of gate operations
    pub fn count_gates(&self) -> usize {
        self.ops.iter().filter(|op| op.is_gate()).count()
    }

    /// Number of measurement operations
    pub fn count_measurements(&self) -> usize {
        self.ops.iter().filter(|op| op.is_measurement()).count()
    }

    /// Number of channel operations
    pub fn count_channels(&self) -> usize {
        self.ops.iter().filter(|op| op.is_channel()).count()
    }

    /// Number of gates spanning exactly one qubit (controls included)
    pub fn count_1q_gates(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.is_gate() && op.qubits().len() == 1)
            .count()
    }

    /// Number of gates spanning exactly two qubits (controls included)
    pub fn count_2q_gates(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.is_gate() && op.qubits().len() == 2)
            .count()
    }

    /// Qubits touched by at least one operation, ascending
    pub fn used_qubits(&self) -> Vec<QubitId> {
        let mut used = BTreeSet::new();
        for op in &self.ops {
            used.extend(op.qubits());
        }
        used.into_iter().collect()
    }

    /// Qubits measured by at least one operation, ascending
    pub fn measured_qubits(&self) -> Vec<QubitId> {
        let mut measured = BTreeSet::new();
        for op in &self.ops {
            if op.is_measurement() {
                measured.extend(op.targets().iter().copied());
            }
        }
        measured.into_iter().collect()
    }

    /// Whether execution needs density-matrix state from the start
    ///
    /// True as soon as any channel is present. A construction-time
    /// property, never a runtime branch.
    pub fn requires_density(&self) -> bool {
        self.ops.iter().any(|op| op.is_channel())
    }

    /// Whether a measurement is followed by further quantum evolution
    ///
    /// Circuits with mid-circuit measurement must be re-executed per
    /// shot; measure-only suffixes can be sampled from one final state.
    pub fn has_mid_circuit_measurement(&self) -> bool {
        let mut seen_measure = false;
        for op in &self.ops {
            if op.is_measurement() {
                seen_measure = true;
            } else if seen_measure {
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize to a JSON string
    pub fn to_json(&self) -> QevoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> QevoResult<Circuit> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit({} qubits, {} ops, depth {})",
            self.num_qubits,
            self.ops.len(),
            self.depth()
        )?;
        for op in &self.ops {
            writeln!(f, "  {}", op)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
