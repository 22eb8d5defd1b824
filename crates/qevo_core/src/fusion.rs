//! Gate fusion pass
//!
//! Pre-multiplies runs of adjacent gates acting on an identical small
//! qubit set into a single explicit unitary, reducing backend calls.
//! Fusion is a pure transformation: the input circuit is left untouched
//! and ordering semantics are preserved exactly. Runs never cross
//! measurements, channels, classically conditioned operations, or
//! unbound parametrized operations.

use crate::circuit::Circuit;
use crate::error::{QevoError, QevoResult};
use crate::matrix::SquareMatrix;
use crate::operation::{OpKind, Operation};
use crate::types::QubitId;
use num_complex::Complex64;

// ============================================================================
// FusionConfig
// ============================================================================

/// Size limits for the fusion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionConfig {
    /// Largest qubit set (targets plus controls) a fused run may span
    pub max_fused_qubits: usize,
    /// Minimum run length worth replacing with one unitary
    pub min_run_length: usize,
}

impl FusionConfig {
    /// Default limits: fuse up to two-qubit runs of length two or more
    pub fn new() -> Self {
        Self {
            max_fused_qubits: 2,
            min_run_length: 2,
        }
    }

    /// Set the largest fusable qubit set
    pub fn with_max_fused_qubits(mut self, max: usize) -> Self {
        self.max_fused_qubits = max;
        self
    }

    /// Set the minimum run length
    pub fn with_min_run_length(mut self, min: usize) -> Self {
        self.min_run_length = min.max(1);
        self
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Fusion Pass
// ============================================================================

/// Fuse adjacent same-support gate runs into explicit unitaries
pub fn fuse(circuit: &Circuit, config: &FusionConfig) -> QevoResult<Circuit> {
    let mut out = Circuit::new(circuit.num_qubits());
    let mut run: Vec<Operation> = Vec::new();
    let mut run_set: Vec<QubitId> = Vec::new();

    for op in circuit.ops() {
        let fusible = op.is_gate()
            && op.condition().is_none()
            && !op.is_parametrized()
            && op.qubits().len() <= config.max_fused_qubits;

        if !fusible {
            flush_run(&mut out, &mut run, &run_set, config)?;
            run_set.clear();
            out.push(op.clone())?;
            continue;
        }

        let mut set = op.qubits();
        set.sort_unstable();
        if !run.is_empty() && set != run_set {
            flush_run(&mut out, &mut run, &run_set, config)?;
        }
        if run.is_empty() {
            run_set = set;
        }
        run.push(op.clone());
    }
    flush_run(&mut out, &mut run, &run_set, config)?;
    Ok(out)
}

/// Emit a pending run, either fused or as-is when too short
fn flush_run(
    out: &mut Circuit,
    run: &mut Vec<Operation>,
    set: &[QubitId],
    config: &FusionConfig,
) -> QevoResult<()> {
    if run.len() < config.min_run_length {
        for op in run.drain(..) {
            out.push(op)?;
        }
        return Ok(());
    }

    let dim = 1usize << set.len();
    let mut total = SquareMatrix::identity(dim);
    for op in run.iter() {
        // later operations multiply from the left
        total = embed(op, set)?.matmul(&total)?;
    }
    run.clear();
    out.push(Operation::unitary(total, set.to_vec())?)
}

/// Expand a gate's matrix over a sorted qubit set containing its
/// targets and controls
///
/// Qubit `set[j]` maps to bit `j` of the expanded matrix index. Control
/// qubits are folded in: columns with any control bit unset are
/// identity columns.
fn embed(op: &Operation, set: &[QubitId]) -> QevoResult<SquareMatrix> {
    let generator = match op.kind() {
        OpKind::Gate(g) => g,
        _ => {
            return Err(QevoError::Internal(
                "fusion run contains a non-gate operation".to_string(),
            ))
        }
    };
    let base = generator.matrix()?;

    let position = |q: QubitId| -> QevoResult<usize> {
        set.iter()
            .position(|&s| s == q)
            .ok_or_else(|| QevoError::Internal(format!("qubit {} missing from fusion set", q)))
    };
    let mut target_pos = Vec::with_capacity(op.targets().len());
    for &q in op.targets() {
        target_pos.push(position(q)?);
    }
    let mut control_mask = 0usize;
    for &q in op.controls() {
        control_mask |= 1usize << position(q)?;
    }

    let dim = 1usize << set.len();
    let sub_dim = base.dim();
    let mut full = SquareMatrix::zeros(dim);
    for col in 0..dim {
        if col & control_mask != control_mask {
            full.set(col, col, Complex64::new(1.0, 0.0));
            continue;
        }
        let mut sub_col = 0usize;
        let mut cleared = col;
        for (j, &tp) in target_pos.iter().enumerate() {
            sub_col |= ((col >> tp) & 1) << j;
            cleared &= !(1usize << tp);
        }
        for sub_row in 0..sub_dim {
            let mut row = cleared;
            for (j, &tp) in target_pos.iter().enumerate() {
                row |= ((sub_row >> j) & 1) << tp;
            }
            let value = base.get(sub_row, sub_col);
            if value.norm_sqr() != 0.0 {
                full.set(row, col, value);
            }
        }
    }
    Ok(full)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CircuitBuilder;
    use crate::operation::Generator;

    fn fused_matrix(circuit: &Circuit, config: &FusionConfig) -> SquareMatrix {
        let fused = fuse(circuit, config).unwrap();
        assert_eq!(fused.len(), 1, "expected a single fused operation");
        match fused.ops()[0].kind() {
            OpKind::Gate(Generator::Unitary(m)) => m.clone(),
            other => panic!("expected fused unitary, got {:?}", other),
        }
    }

    #[test]
    fn test_double_hadamard_fuses_to_identity() {
        let c = CircuitBuilder::new(1).h(0).h(0).build();
        let m = fused_matrix(&c, &FusionConfig::new());
        assert!(m.max_abs_diff(&SquareMatrix::identity(2)) < 1e-12);
    }

    #[test]
    fn test_fusion_preserves_order() {
        // H then X must give X·H, not H·X
        let c = CircuitBuilder::new(1).h(0).x(0).build();
        let m = fused_matrix(&c, &FusionConfig::new());
        let expected = Generator::X
            .matrix()
            .unwrap()
            .matmul(&Generator::H.matrix().unwrap())
            .unwrap();
        assert!(m.max_abs_diff(&expected) < 1e-12);
    }

    #[test]
    fn test_embed_cnot_layout() {
        // control bit 0, target bit 1: columns 1 and 3 swap
        let op = Operation::controlled(Generator::X, vec![0], vec![1]).unwrap();
        let m = embed(&op, &[0, 1]).unwrap();
        assert!((m.get(0, 0).re - 1.0).abs() < 1e-12);
        assert!((m.get(3, 1).re - 1.0).abs() < 1e-12);
        assert!((m.get(2, 2).re - 1.0).abs() < 1e-12);
        assert!((m.get(1, 3).re - 1.0).abs() < 1e-12);
        assert!(m.is_unitary(1e-12));
    }

    #[test]
    fn test_double_cnot_fuses_to_identity() {
        let c = CircuitBuilder::new(2).cnot(0, 1).cnot(0, 1).build();
        let m = fused_matrix(&c, &FusionConfig::new());
        assert!(m.max_abs_diff(&SquareMatrix::identity(4)) < 1e-12);
    }

    #[test]
    fn test_fusion_never_crosses_measurement() {
        let c = CircuitBuilder::new(1).h(0).measure(0).h(0).build();
        let fused = fuse(&c, &FusionConfig::new()).unwrap();
        assert_eq!(fused.len(), 3);
        assert!(fused.ops()[1].is_measurement());
    }

    #[test]
    fn test_fusion_never_crosses_condition() {
        let conditional = Operation::gate(Generator::X, vec![0])
            .unwrap()
            .with_condition("c", 1);
        let c = CircuitBuilder::new(1).h(0).op(conditional).h(0).build();
        let fused = fuse(&c, &FusionConfig::new()).unwrap();
        assert_eq!(fused.len(), 3);
    }

    #[test]
    fn test_unbound_parameter_blocks_fusion() {
        let c = CircuitBuilder::new(1).h(0).rx_sym(0, "t").h(0).build();
        let fused = fuse(&c, &FusionConfig::new()).unwrap();
        assert_eq!(fused.len(), 3);

        // once bound, the whole run fuses
        let mut bindings = crate::types::Bindings::new();
        bindings.insert("t".to_string(), 0.3);
        let bound = c.bind(&bindings).unwrap();
        let fused = fuse(&bound, &FusionConfig::new()).unwrap();
        assert_eq!(fused.len(), 1);
    }

    #[test]
    fn test_different_supports_split_runs() {
        let c = CircuitBuilder::new(2).h(0).h(1).build();
        let fused = fuse(&c, &FusionConfig::new()).unwrap();
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn test_max_fused_qubits_limit() {
        let c = CircuitBuilder::new(3).ccx(0, 1, 2).ccx(0, 1, 2).build();
        let narrow = fuse(&c, &FusionConfig::new()).unwrap();
        assert_eq!(narrow.len(), 2);

        let wide_config = FusionConfig::new().with_max_fused_qubits(3);
        let wide = fuse(&c, &wide_config).unwrap();
        assert_eq!(wide.len(), 1);
        let m = fused_matrix(&c, &wide_config);
        assert!(m.max_abs_diff(&SquareMatrix::identity(8)) < 1e-12);
    }

    #[test]
    fn test_short_runs_left_alone() {
        let c = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
        let fused = fuse(&c, &FusionConfig::new()).unwrap();
        // supports differ, each run has length 1
        assert_eq!(fused.len(), 2);
        assert_eq!(fused.ops()[0].name(), "h");
    }

    #[test]
    fn test_mixed_run_with_controls() {
        // cz then swapped-order cnot, both on {0,1}
        let c = CircuitBuilder::new(2).cz(0, 1).cnot(1, 0).cnot(1, 0).build();
        let fused = fuse(&c, &FusionConfig::new()).unwrap();
        assert_eq!(fused.len(), 1);
        let m = fused_matrix(&c, &FusionConfig::new());
        // double cnot cancels, leaving cz
        let cz = embed(
            &Operation::controlled(Generator::Z, vec![0], vec![1]).unwrap(),
            &[0, 1],
        )
        .unwrap();
        assert!(m.max_abs_diff(&cz) < 1e-12);
    }
}
