//! Operations: gates, measurements, and noise channels
//!
//! An `Operation` is an immutable description of one step of a circuit:
//! a matrix generator with target and control qubits, a measurement into
//! a named classical register, or a Kraus channel. Constructors validate
//! index distinctness and matrix shape so malformed operations never
//! reach a backend.

use crate::error::{QevoError, QevoResult};
use crate::kraus::KrausSet;
use crate::matrix::SquareMatrix;
use crate::types::{Bindings, QubitId};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};
use std::fmt;

// ============================================================================
// Param
// ============================================================================

/// Real scalar parameter, either a concrete value or a named symbol
/// resolved by `bind` before execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Param {
    /// Concrete bound value
    Value(f64),
    /// Named symbol awaiting binding
    Symbol(String),
}

impl Param {
    /// Create a symbolic parameter
    pub fn symbol(name: impl Into<String>) -> Self {
        Param::Symbol(name.into())
    }

    /// Concrete value, or `UnboundParameter` if still symbolic
    pub fn value(&self) -> QevoResult<f64> {
        match self {
            Param::Value(v) => Ok(*v),
            Param::Symbol(name) => Err(QevoError::UnboundParameter(name.clone())),
        }
    }

    /// Whether a concrete value is available
    pub fn is_bound(&self) -> bool {
        matches!(self, Param::Value(_))
    }

    /// Resolve against a name→value map; unresolved symbols stay symbolic
    pub fn bind(&self, bindings: &Bindings) -> Self {
        match self {
            Param::Value(v) => Param::Value(*v),
            Param::Symbol(name) => match bindings.get(name) {
                Some(v) => Param::Value(*v),
                None => Param::Symbol(name.clone()),
            },
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Value(value)
    }
}

impl From<&str> for Param {
    fn from(name: &str) -> Self {
        Param::Symbol(name.to_string())
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(v) => write!(f, "{:.4}", v),
            Param::Symbol(name) => write!(f, "{}", name),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Matrix generator of a unitary operation
///
/// Fixed single-qubit gates, parameterized rotations, the two-qubit swap
/// permutation, and general k-qubit unitaries. `matrix()` produces the
/// concrete matrix; it fails on unbound symbolic parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Generator {
    /// Hadamard
    H,
    /// Pauli X (bit flip)
    X,
    /// Pauli Y
    Y,
    /// Pauli Z (phase flip)
    Z,
    /// Phase gate S = √Z
    S,
    /// S-dagger
    Sdg,
    /// T gate (π/8)
    T,
    /// T-dagger
    Tdg,
    /// Square root of X
    SqrtX,
    /// Rotation about the X axis
    Rx(Param),
    /// Rotation about the Y axis
    Ry(Param),
    /// Rotation about the Z axis
    Rz(Param),
    /// Phase rotation diag(1, e^{iλ})
    Phase(Param),
    /// General single-qubit unitary U(θ, φ, λ)
    U {
        /// Polar rotation angle
        theta: Param,
        /// Phase applied to |1⟩ component of the column space
        phi: Param,
        /// Phase applied to |1⟩ component of the row space
        lambda: Param,
    },
    /// Two-qubit swap permutation
    Swap,
    /// General k-qubit unitary given explicitly as a matrix
    Unitary(SquareMatrix),
}

impl Generator {
    /// Wrap an explicit matrix, validating that its dimension is a power
    /// of two covering at least one qubit
    pub fn unitary(matrix: SquareMatrix) -> QevoResult<Self> {
        if matrix.num_qubits().is_none() {
            return Err(QevoError::Shape {
                expected: 2,
                actual: matrix.dim(),
            });
        }
        Ok(Generator::Unitary(matrix))
    }

    /// Lowercase gate name
    pub fn name(&self) -> &'static str {
        match self {
            Generator::H => "h",
            Generator::X => "x",
            Generator::Y => "y",
            Generator::Z => "z",
            Generator::S => "s",
            Generator::Sdg => "sdg",
            Generator::T => "t",
            Generator::Tdg => "tdg",
            Generator::SqrtX => "sx",
            Generator::Rx(_) => "rx",
            Generator::Ry(_) => "ry",
            Generator::Rz(_) => "rz",
            Generator::Phase(_) => "p",
            Generator::U { .. } => "u",
            Generator::Swap => "swap",
            Generator::Unitary(_) => "unitary",
        }
    }

    /// Number of target qubits the generated matrix spans
    pub fn num_targets(&self) -> usize {
        match self {
            Generator::Swap => 2,
            Generator::Unitary(m) => m.num_qubits().unwrap_or(0),
            _ => 1,
        }
    }

    /// Matrix dimension (2^num_targets for well-formed generators)
    pub fn dim(&self) -> usize {
        match self {
            Generator::Unitary(m) => m.dim(),
            _ => 1 << self.num_targets(),
        }
    }

    /// Whether the generator acts on exactly one qubit
    pub fn is_single_qubit(&self) -> bool {
        self.num_targets() == 1
    }

    /// Whether any parameter is still an unbound symbol
    pub fn is_parametrized(&self) -> bool {
        match self {
            Generator::Rx(p) | Generator::Ry(p) | Generator::Rz(p) | Generator::Phase(p) => {
                !p.is_bound()
            }
            Generator::U { theta, phi, lambda } => {
                !theta.is_bound() || !phi.is_bound() || !lambda.is_bound()
            }
            _ => false,
        }
    }

    /// Names of the unbound symbols, in parameter order
    pub fn symbols<'a>(&'a self) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut push = |p: &'a Param| {
            if let Param::Symbol(name) = p {
                out.push(name.as_str());
            }
        };
        match self {
            Generator::Rx(p) | Generator::Ry(p) | Generator::Rz(p) | Generator::Phase(p) => {
                push(p)
            }
            Generator::U { theta, phi, lambda } => {
                push(theta);
                push(phi);
                push(lambda);
            }
            _ => {}
        }
        out
    }

    /// Resolve symbolic parameters against a binding map
    pub fn bind(&self, bindings: &Bindings) -> Self {
        match self {
            Generator::Rx(p) => Generator::Rx(p.bind(bindings)),
            Generator::Ry(p) => Generator::Ry(p.bind(bindings)),
            Generator::Rz(p) => Generator::Rz(p.bind(bindings)),
            Generator::Phase(p) => Generator::Phase(p.bind(bindings)),
            Generator::U { theta, phi, lambda } => Generator::U {
                theta: theta.bind(bindings),
                phi: phi.bind(bindings),
                lambda: lambda.bind(bindings),
            },
            other => other.clone(),
        }
    }

    /// Concrete matrix of the generator
    ///
    /// Fails with `UnboundParameter` on symbolic parameters and
    /// `InvalidParameterValue` on non-finite bound values.
    pub fn matrix(&self) -> QevoResult<SquareMatrix> {
        let c = Complex64::new;
        match self {
            Generator::H => {
                let h = FRAC_1_SQRT_2;
                SquareMatrix::from_vec(2, vec![c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)])
            }
            Generator::X => {
                SquareMatrix::from_vec(2, vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)])
            }
            Generator::Y => SquareMatrix::from_vec(
                2,
                vec![c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)],
            ),
            Generator::Z => SquareMatrix::from_vec(
                2,
                vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)],
            ),
            Generator::S => SquareMatrix::from_vec(
                2,
                vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 1.0)],
            ),
            Generator::Sdg => SquareMatrix::from_vec(
                2,
                vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, -1.0)],
            ),
            Generator::T => SquareMatrix::from_vec(
                2,
                vec![
                    c(1.0, 0.0),
                    c(0.0, 0.0),
                    c(0.0, 0.0),
                    Complex64::from_polar(1.0, FRAC_PI_4),
                ],
            ),
            Generator::Tdg => SquareMatrix::from_vec(
                2,
                vec![
                    c(1.0, 0.0),
                    c(0.0, 0.0),
                    c(0.0, 0.0),
                    Complex64::from_polar(1.0, -FRAC_PI_4),
                ],
            ),
            Generator::SqrtX => SquareMatrix::from_vec(
                2,
                vec![c(0.5, 0.5), c(0.5, -0.5), c(0.5, -0.5), c(0.5, 0.5)],
            ),
            Generator::Rx(p) => {
                let half = checked_value(p)? / 2.0;
                SquareMatrix::from_vec(
                    2,
                    vec![
                        c(half.cos(), 0.0),
                        c(0.0, -half.sin()),
                        c(0.0, -half.sin()),
                        c(half.cos(), 0.0),
                    ],
                )
            }
            Generator::Ry(p) => {
                let half = checked_value(p)? / 2.0;
                SquareMatrix::from_vec(
                    2,
                    vec![
                        c(half.cos(), 0.0),
                        c(-half.sin(), 0.0),
                        c(half.sin(), 0.0),
                        c(half.cos(), 0.0),
                    ],
                )
            }
            Generator::Rz(p) => {
                let half = checked_value(p)? / 2.0;
                SquareMatrix::from_vec(
                    2,
                    vec![
                        Complex64::from_polar(1.0, -half),
                        c(0.0, 0.0),
                        c(0.0, 0.0),
                        Complex64::from_polar(1.0, half),
                    ],
                )
            }
            Generator::Phase(p) => {
                let lambda = checked_value(p)?;
                SquareMatrix::from_vec(
                    2,
                    vec![
                        c(1.0, 0.0),
                        c(0.0, 0.0),
                        c(0.0, 0.0),
                        Complex64::from_polar(1.0, lambda),
                    ],
                )
            }
            Generator::U { theta, phi, lambda } => {
                let t = checked_value(theta)? / 2.0;
                let p = checked_value(phi)?;
                let l = checked_value(lambda)?;
                SquareMatrix::from_vec(
                    2,
                    vec![
                        c(t.cos(), 0.0),
                        -Complex64::from_polar(t.sin(), l),
                        Complex64::from_polar(t.sin(), p),
                        Complex64::from_polar(t.cos(), p + l),
                    ],
                )
            }
            Generator::Swap => {
                let mut m = SquareMatrix::zeros(4);
                m.set(0, 0, c(1.0, 0.0));
                m.set(1, 2, c(1.0, 0.0));
                m.set(2, 1, c(1.0, 0.0));
                m.set(3, 3, c(1.0, 0.0));
                Ok(m)
            }
            Generator::Unitary(m) => Ok(m.clone()),
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generator::Rx(p) | Generator::Ry(p) | Generator::Rz(p) | Generator::Phase(p) => {
                write!(f, "{}({})", self.name(), p)
            }
            Generator::U { theta, phi, lambda } => {
                write!(f, "u({}, {}, {})", theta, phi, lambda)
            }
            other => write!(f, "{}", other.name()),
        }
    }
}

fn checked_value(p: &Param) -> QevoResult<f64> {
    let v = p.value()?;
    if !v.is_finite() {
        return Err(QevoError::InvalidParameterValue(v));
    }
    Ok(v)
}

// ============================================================================
// Condition
// ============================================================================

/// Classical condition: run the operation only when a register holds
/// the given value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Register name to test
    pub register: String,
    /// Required register value (bits read little-endian in record order)
    pub value: u64,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {}", self.register, self.value)
    }
}

// ============================================================================
// Operation
// ============================================================================

/// Operation kind: unitary gate, measurement, or noise channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpKind {
    /// Unitary gate with a matrix generator
    Gate(Generator),
    /// Projective measurement recording into a classical register
    Measure {
        /// Destination register name
        register: String,
    },
    /// Kraus noise channel
    Channel(KrausSet),
}

/// One step of a circuit: kind, target qubits, optional controls, and
/// an optional classical condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    kind: OpKind,
    targets: Vec<QubitId>,
    controls: Vec<QubitId>,
    condition: Option<Condition>,
}

impl Operation {
    /// Uncontrolled gate operation
    pub fn gate(generator: Generator, targets: Vec<QubitId>) -> QevoResult<Self> {
        Self::controlled(generator, vec![], targets)
    }

    /// Controlled gate operation; controls must be disjoint from targets
    pub fn controlled(
        generator: Generator,
        controls: Vec<QubitId>,
        targets: Vec<QubitId>,
    ) -> QevoResult<Self> {
        validate_targets(&targets)?;
        validate_distinct(&controls)?;
        for &c in &controls {
            if targets.contains(&c) {
                return Err(QevoError::OverlappingControls(c));
            }
        }
        let expected = 1usize << targets.len();
        if generator.dim() != expected {
            return Err(QevoError::Shape {
                expected,
                actual: generator.dim(),
            });
        }
        Ok(Self {
            kind: OpKind::Gate(generator),
            targets,
            controls,
            condition: None,
        })
    }

    /// Gate from an explicit unitary matrix
    pub fn unitary(matrix: SquareMatrix, targets: Vec<QubitId>) -> QevoResult<Self> {
        Self::gate(Generator::unitary(matrix)?, targets)
    }

    /// Gate from an explicit matrix with a full unitarity check
    pub fn unitary_checked(
        matrix: SquareMatrix,
        targets: Vec<QubitId>,
        tolerance: f64,
    ) -> QevoResult<Self> {
        matrix.check_unitary(tolerance)?;
        Self::unitary(matrix, targets)
    }

    /// Measurement of the given qubits into a named classical register
    ///
    /// Outcome bits are recorded per target, in target order.
    pub fn measure(targets: Vec<QubitId>, register: impl Into<String>) -> QevoResult<Self> {
        validate_targets(&targets)?;
        Ok(Self {
            kind: OpKind::Measure {
                register: register.into(),
            },
            targets,
            controls: vec![],
            condition: None,
        })
    }

    /// Noise channel on the given qubits
    pub fn channel(kraus: KrausSet, targets: Vec<QubitId>) -> QevoResult<Self> {
        validate_targets(&targets)?;
        let expected = 1usize << targets.len();
        if kraus.dim() != expected {
            return Err(QevoError::Shape {
                expected,
                actual: kraus.dim(),
            });
        }
        Ok(Self {
            kind: OpKind::Channel(kraus),
            targets,
            controls: vec![],
            condition: None,
        })
    }

    /// Reset a qubit to |0⟩
    ///
    /// Non-unitary: realized as the γ=1 amplitude-damping channel, so
    /// circuits containing resets evolve as density matrices.
    pub fn reset(qubit: QubitId) -> QevoResult<Self> {
        let mut keep = SquareMatrix::zeros(2);
        keep.set(0, 0, Complex64::new(1.0, 0.0));
        let mut lower = SquareMatrix::zeros(2);
        lower.set(0, 1, Complex64::new(1.0, 0.0));
        let kraus = KrausSet::new("reset", vec![keep, lower])?;
        Self::channel(kraus, vec![qubit])
    }

    /// Attach a classical condition (consuming builder style)
    pub fn with_condition(mut self, register: impl Into<String>, value: u64) -> Self {
        self.condition = Some(Condition {
            register: register.into(),
            value,
        });
        self
    }

    /// Operation kind
    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// Target qubits, in declared order
    pub fn targets(&self) -> &[QubitId] {
        &self.targets
    }

    /// Control qubits (empty for measurements and channels)
    pub fn controls(&self) -> &[QubitId] {
        &self.controls
    }

    /// Classical condition, if any
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// All involved qubits: controls first, then targets
    pub fn qubits(&self) -> Vec<QubitId> {
        self.controls
            .iter()
            .chain(self.targets.iter())
            .copied()
            .collect()
    }

    /// Highest involved qubit index
    pub fn max_qubit(&self) -> Option<QubitId> {
        self.qubits().into_iter().max()
    }

    /// Lowercase operation name (gate name, "measure", or channel label)
    pub fn name(&self) -> &str {
        match &self.kind {
            OpKind::Gate(g) => g.name(),
            OpKind::Measure { .. } => "measure",
            OpKind::Channel(k) => k.label(),
        }
    }

    /// Whether this is a unitary gate
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, OpKind::Gate(_))
    }

    /// Whether this is a measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self.kind, OpKind::Measure { .. })
    }

    /// Whether this is a noise channel
    pub fn is_channel(&self) -> bool {
        matches!(self.kind, OpKind::Channel(_))
    }

    /// Whether the operation carries unbound symbolic parameters
    pub fn is_parametrized(&self) -> bool {
        match &self.kind {
            OpKind::Gate(g) => g.is_parametrized(),
            _ => false,
        }
    }

    /// Resolve symbolic parameters against a binding map
    pub fn bind(&self, bindings: &Bindings) -> Self {
        let kind = match &self.kind {
            OpKind::Gate(g) => OpKind::Gate(g.bind(bindings)),
            other => other.clone(),
        };
        Self {
            kind,
            targets: self.targets.clone(),
            controls: self.controls.clone(),
            condition: self.condition.clone(),
        }
    }

    /// Remap all qubit indices through a lookup table
    ///
    /// The table must cover every index the operation uses; callers
    /// validate coverage at the circuit level.
    pub(crate) fn remapped(&self, map: &[QubitId]) -> Self {
        Self {
            kind: self.kind.clone(),
            targets: self.targets.iter().map(|&q| map[q]).collect(),
            controls: self.controls.iter().map(|&q| map[q]).collect(),
            condition: self.condition.clone(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets = self
            .targets
            .iter()
            .map(|q| q.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match &self.kind {
            OpKind::Gate(g) => write!(f, "{}({})", g, targets)?,
            OpKind::Measure { register } => write!(f, "measure({}) -> {}", targets, register)?,
            OpKind::Channel(k) => write!(f, "{}({})", k.label(), targets)?,
        }
        if !self.controls.is_empty() {
            let controls = self
                .controls
                .iter()
                .map(|q| q.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " ctrl({})", controls)?;
        }
        if let Some(cond) = &self.condition {
            write!(f, " if {}", cond)?;
        }
        Ok(())
    }
}

fn validate_targets(targets: &[QubitId]) -> QevoResult<()> {
    if targets.is_empty() {
        return Err(QevoError::Shape {
            expected: 2,
            actual: 1,
        });
    }
    validate_distinct(targets)
}

fn validate_distinct(qubits: &[QubitId]) -> QevoResult<()> {
    for (i, &q) in qubits.iter().enumerate() {
        if qubits[i + 1..].contains(&q) {
            return Err(QevoError::DuplicateQubit(q));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_hadamard_matrix() {
        let h = Generator::H.matrix().unwrap();
        assert_abs_diff_eq!(h.get(0, 0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(h.get(1, 1).re, -FRAC_1_SQRT_2, epsilon = 1e-12);
        assert!(h.is_unitary(1e-12));
    }

    #[test]
    fn test_all_fixed_generators_unitary() {
        let gens = [
            Generator::H,
            Generator::X,
            Generator::Y,
            Generator::Z,
            Generator::S,
            Generator::Sdg,
            Generator::T,
            Generator::Tdg,
            Generator::SqrtX,
            Generator::Swap,
        ];
        for g in gens {
            assert!(
                g.matrix().unwrap().is_unitary(1e-12),
                "{} is not unitary",
                g.name()
            );
        }
    }

    #[test]
    fn test_sqrt_x_squares_to_x() {
        let sx = Generator::SqrtX.matrix().unwrap();
        let x = Generator::X.matrix().unwrap();
        let sq = sx.matmul(&sx).unwrap();
        assert!(sq.max_abs_diff(&x) < 1e-12);
    }

    #[test]
    fn test_rx_pi_is_minus_i_x() {
        let rx = Generator::Rx(Param::Value(PI)).matrix().unwrap();
        // Rx(π) = -i X
        assert_abs_diff_eq!(rx.get(0, 1).im, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rx.get(1, 0).im, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rx.get(0, 0).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_u_reduces_to_ry() {
        let u = Generator::U {
            theta: Param::Value(0.7),
            phi: Param::Value(0.0),
            lambda: Param::Value(0.0),
        }
        .matrix()
        .unwrap();
        let ry = Generator::Ry(Param::Value(0.7)).matrix().unwrap();
        assert!(u.max_abs_diff(&ry) < 1e-12);
    }

    #[test]
    fn test_phase_gate() {
        let p = Generator::Phase(Param::Value(PI / 2.0)).matrix().unwrap();
        let s = Generator::S.matrix().unwrap();
        assert!(p.max_abs_diff(&s) < 1e-12);
    }

    #[test]
    fn test_unbound_parameter_errors() {
        let g = Generator::Rx(Param::symbol("theta"));
        assert!(g.is_parametrized());
        assert_eq!(g.symbols(), vec!["theta"]);
        let err = g.matrix().unwrap_err();
        assert!(matches!(err, QevoError::UnboundParameter(name) if name == "theta"));
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let g = Generator::Rz(Param::Value(f64::NAN));
        let err = g.matrix().unwrap_err();
        assert!(matches!(err, QevoError::InvalidParameterValue(_)));
    }

    #[test]
    fn test_bind_resolves_symbols() {
        let g = Generator::U {
            theta: Param::symbol("a"),
            phi: Param::Value(0.0),
            lambda: Param::symbol("b"),
        };
        let mut bindings = Bindings::new();
        bindings.insert("a".to_string(), 1.0);
        let partial = g.bind(&bindings);
        assert!(partial.is_parametrized());
        assert_eq!(partial.symbols(), vec!["b"]);

        bindings.insert("b".to_string(), 2.0);
        let full = g.bind(&bindings);
        assert!(!full.is_parametrized());
        assert!(full.matrix().is_ok());
    }

    #[test]
    fn test_operation_validation() {
        assert!(Operation::gate(Generator::H, vec![0]).is_ok());
        assert!(Operation::gate(Generator::Swap, vec![0, 1]).is_ok());

        // duplicate target
        let err = Operation::gate(Generator::Swap, vec![1, 1]).unwrap_err();
        assert!(matches!(err, QevoError::DuplicateQubit(1)));

        // control overlaps target
        let err = Operation::controlled(Generator::X, vec![0], vec![0]).unwrap_err();
        assert!(matches!(err, QevoError::OverlappingControls(0)));

        // shape mismatch: single-qubit generator on two targets
        let err = Operation::gate(Generator::H, vec![0, 1]).unwrap_err();
        assert!(matches!(err, QevoError::Shape { expected: 4, actual: 2 }));
    }

    #[test]
    fn test_unitary_operation_shape() {
        let m = SquareMatrix::identity(4);
        let op = Operation::unitary(m.clone(), vec![0, 2]).unwrap();
        assert_eq!(op.targets(), &[0, 2]);

        let err = Operation::unitary(m, vec![0]).unwrap_err();
        assert!(matches!(err, QevoError::Shape { expected: 2, actual: 4 }));
    }

    #[test]
    fn test_unitary_checked() {
        let stretched = SquareMatrix::identity(2).scale(Complex64::new(2.0, 0.0));
        let err = Operation::unitary_checked(stretched, vec![0], 1e-8).unwrap_err();
        assert!(matches!(err, QevoError::Unitarity { .. }));
    }

    #[test]
    fn test_qubits_order_and_max() {
        let op = Operation::controlled(Generator::X, vec![3], vec![1]).unwrap();
        assert_eq!(op.qubits(), vec![3, 1]);
        assert_eq!(op.max_qubit(), Some(3));
    }

    #[test]
    fn test_condition() {
        let op = Operation::gate(Generator::X, vec![1])
            .unwrap()
            .with_condition("c", 1);
        let cond = op.condition().unwrap();
        assert_eq!(cond.register, "c");
        assert_eq!(cond.value, 1);
        assert!(op.to_string().contains("if c == 1"));
    }

    #[test]
    fn test_measure_operation() {
        let op = Operation::measure(vec![0, 2], "c").unwrap();
        assert!(op.is_measurement());
        assert_eq!(op.name(), "measure");
        assert_eq!(op.targets(), &[0, 2]);
    }

    #[test]
    fn test_reset_is_complete_channel() {
        let op = Operation::reset(1).unwrap();
        assert!(op.is_channel());
        assert_eq!(op.targets(), &[1]);

        // K0 pins |0⟩, K1 lowers |1⟩
        if let OpKind::Channel(kraus) = op.kind() {
            assert_eq!(kraus.len(), 2);
            assert_abs_diff_eq!(kraus.operators()[0].get(0, 0).re, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(kraus.operators()[1].get(0, 1).re, 1.0, epsilon = 1e-12);
        } else {
            panic!("reset must be a channel");
        }
    }

    #[test]
    fn test_display() {
        let op = Operation::controlled(Generator::X, vec![0], vec![1]).unwrap();
        assert_eq!(op.to_string(), "x(1) ctrl(0)");

        let rz = Operation::gate(Generator::Rz(Param::symbol("t")), vec![2]).unwrap();
        assert_eq!(rz.to_string(), "rz(t)(2)");
    }
}
