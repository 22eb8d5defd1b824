//! Circuit-level noise model
//!
//! A `NoiseModel` maps gates to noise channels and rewrites a circuit by
//! inserting a channel operation after every matching gate. The rewrite
//! is pure: a new circuit is produced, measurements and classically
//! conditioned operations are left untouched.

use crate::channels;
use qevo_core::{Circuit, KrausSet, Operation, QevoError, QevoResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// NoiseModel
// ============================================================================

/// Per-gate channel attachment for noisy simulation
///
/// Channels attach either by gate name ("h", "cx" runs under "x" with a
/// control, so names refer to generator names) or by the number of
/// qubits a gate spans. Name attachments win over arity attachments.
/// A single-qubit channel attached to a wider gate is applied to each
/// involved qubit; otherwise the channel width must match the gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    by_name: HashMap<String, KrausSet>,
    by_arity: HashMap<usize, KrausSet>,
}

impl NoiseModel {
    /// Noise-free model: `apply` is the identity transformation
    pub fn ideal() -> Self {
        Self::default()
    }

    /// Uniform depolarizing model: probability `p1` after single-qubit
    /// gates, `p2` after two-qubit gates
    pub fn depolarizing(p1: f64, p2: f64) -> QevoResult<Self> {
        Ok(Self::ideal()
            .with_gate_error(1, channels::depolarizing(p1)?)?
            .with_gate_error(2, channels::depolarizing_n(2, p2)?)?)
    }

    /// Attach a channel to every gate spanning `arity` qubits
    ///
    /// The channel must act on one qubit (applied per involved qubit) or
    /// on exactly `arity` qubits.
    pub fn with_gate_error(mut self, arity: usize, kraus: KrausSet) -> QevoResult<Self> {
        if kraus.num_qubits() != 1 && kraus.num_qubits() != arity {
            return Err(QevoError::Shape {
                expected: 1 << arity,
                actual: kraus.dim(),
            });
        }
        self.by_arity.insert(arity, kraus);
        Ok(self)
    }

    /// Attach a channel to every gate with the given generator name
    ///
    /// Width compatibility is checked when the model is applied, since
    /// a name does not pin the gate width.
    pub fn with_named_error(mut self, gate_name: impl Into<String>, kraus: KrausSet) -> Self {
        self.by_name.insert(gate_name.into(), kraus);
        self
    }

    /// Whether the model attaches no channels at all
    pub fn is_ideal(&self) -> bool {
        self.by_name.is_empty() && self.by_arity.is_empty()
    }

    /// Rewrite a circuit, inserting one channel after each matching gate
    pub fn apply(&self, circuit: &Circuit) -> QevoResult<Circuit> {
        let mut out = Circuit::new(circuit.num_qubits());
        for op in circuit.ops() {
            out.push(op.clone())?;
            if !op.is_gate() || op.condition().is_some() {
                continue;
            }
            let qubits = op.qubits();
            let kraus = self
                .by_name
                .get(op.name())
                .or_else(|| self.by_arity.get(&qubits.len()));
            let kraus = match kraus {
                Some(k) => k,
                None => continue,
            };
            if kraus.num_qubits() == qubits.len() {
                out.push(Operation::channel(kraus.clone(), qubits)?)?;
            } else if kraus.num_qubits() == 1 {
                for &q in &qubits {
                    out.push(Operation::channel(kraus.clone(), vec![q])?)?;
                }
            } else {
                return Err(QevoError::Shape {
                    expected: 1 << qubits.len(),
                    actual: kraus.dim(),
                });
            }
        }
        Ok(out)
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ideal() {
            return write!(f, "NoiseModel(ideal)");
        }
        write!(
            f,
            "NoiseModel({} named, {} arity attachments)",
            self.by_name.len(),
            self.by_arity.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
