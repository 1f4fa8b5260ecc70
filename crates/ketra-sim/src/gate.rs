//! Gate set and gate application records.
//!
//! The simulator supports a closed gate set: Hadamard, the three Paulis,
//! CNOT, CZ and the three axis rotations. Callers describe gates either with a
//! typed [`Gate`] or with a loosely-typed [`GateRequest`] (the form that arrives
//! from configuration files or JSON payloads), which is validated against the
//! register width by [`Gate::from_request`].

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// A 2×2 complex matrix in row-major order.
pub type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Pauli-X matrix.
pub const PAULI_X: Matrix2 = [[ZERO, ONE], [ONE, ZERO]];
/// Pauli-Y matrix.
pub const PAULI_Y: Matrix2 = [[ZERO, Complex64::new(0.0, -1.0)], [I, ZERO]];
/// Pauli-Z matrix.
pub const PAULI_Z: Matrix2 = [[ONE, ZERO], [ZERO, Complex64::new(-1.0, 0.0)]];

/// The kinds of gate the simulator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// Rotation around X axis.
    Rx,
    /// Rotation around Y axis.
    Ry,
    /// Rotation around Z axis.
    Rz,
}

impl GateKind {
    /// Every supported gate kind.
    pub const ALL: [GateKind; 9] = [
        GateKind::H,
        GateKind::X,
        GateKind::Y,
        GateKind::Z,
        GateKind::CX,
        GateKind::CZ,
        GateKind::Rx,
        GateKind::Ry,
        GateKind::Rz,
    ];

    /// Get the canonical name of this gate.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::CX => "cx",
            GateKind::CZ => "cz",
            GateKind::Rx => "rx",
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(self) -> u32 {
        match self {
            GateKind::CX | GateKind::CZ => 2,
            _ => 1,
        }
    }

    /// Check if this gate takes an angle.
    #[inline]
    pub fn is_parameterized(self) -> bool {
        matches!(self, GateKind::Rx | GateKind::Ry | GateKind::Rz)
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GateKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "h" | "hadamard" => Ok(GateKind::H),
            "x" | "paulix" | "not" => Ok(GateKind::X),
            "y" | "pauliy" => Ok(GateKind::Y),
            "z" | "pauliz" => Ok(GateKind::Z),
            "cx" | "cnot" => Ok(GateKind::CX),
            "cz" | "controlledz" => Ok(GateKind::CZ),
            "rx" | "rotatex" => Ok(GateKind::Rx),
            "ry" | "rotatey" => Ok(GateKind::Ry),
            "rz" | "rotatez" => Ok(GateKind::Rz),
            _ => Err(SimError::UnknownGateKind(s.to_string())),
        }
    }
}

/// An unvalidated gate application record.
///
/// Qubit indices are signed so that negative values supplied by callers are
/// reported as [`SimError::InvalidQubitIndex`] rather than wrapping.
/// For two-qubit gates the first index is the control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRequest {
    /// Gate name, e.g. `"h"`, `"cnot"`, `"rx"`.
    pub gate: String,
    /// Qubit indices; `[control, target]` for two-qubit gates.
    pub qubits: Vec<i64>,
    /// Rotation angle in radians (rotation gates only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

impl GateRequest {
    /// Create a new request without an angle.
    pub fn new(gate: impl Into<String>, qubits: impl IntoIterator<Item = i64>) -> Self {
        Self {
            gate: gate.into(),
            qubits: qubits.into_iter().collect(),
            angle: None,
        }
    }

    /// Attach a rotation angle.
    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }
}

impl From<Gate> for GateRequest {
    fn from(gate: Gate) -> Self {
        let qubits = gate.qubits().into_iter().map(|q| q as i64).collect();
        Self {
            gate: gate.kind().name().to_string(),
            qubits,
            angle: gate.angle(),
        }
    }
}

/// A validated gate bound to concrete qubits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Hadamard on a qubit.
    H(usize),
    /// Pauli-X on a qubit.
    X(usize),
    /// Pauli-Y on a qubit.
    Y(usize),
    /// Pauli-Z on a qubit.
    Z(usize),
    /// CNOT.
    CX {
        /// Control qubit.
        control: usize,
        /// Target qubit.
        target: usize,
    },
    /// Controlled-Z.
    CZ {
        /// Control qubit.
        control: usize,
        /// Target qubit.
        target: usize,
    },
    /// RX(θ) on a qubit.
    Rx(usize, f64),
    /// RY(θ) on a qubit.
    Ry(usize, f64),
    /// RZ(θ) on a qubit.
    Rz(usize, f64),
}

impl Gate {
    /// CNOT with the given control and target.
    pub fn cx(control: usize, target: usize) -> Self {
        Gate::CX { control, target }
    }

    /// CZ with the given control and target.
    pub fn cz(control: usize, target: usize) -> Self {
        Gate::CZ { control, target }
    }

    /// Validate a [`GateRequest`] against a register of `num_qubits` qubits.
    pub fn from_request(request: &GateRequest, num_qubits: u32) -> SimResult<Self> {
        let kind: GateKind = request.gate.parse()?;

        let expected = kind.num_qubits();
        if request.qubits.len() != expected as usize {
            return Err(SimError::QubitCountMismatch {
                gate: kind.name().to_string(),
                expected,
                got: request.qubits.len(),
            });
        }

        let mut qubits = [0usize; 2];
        for (slot, &raw) in qubits.iter_mut().zip(&request.qubits) {
            if raw < 0 || raw >= i64::from(num_qubits) {
                return Err(SimError::InvalidQubitIndex {
                    qubit: raw,
                    num_qubits,
                    gate: kind.name().to_string(),
                });
            }
            *slot = raw as usize;
        }

        let angle = if kind.is_parameterized() {
            match request.angle {
                Some(theta) if theta.is_finite() => theta,
                other => {
                    return Err(SimError::InvalidAngle {
                        gate: kind.name().to_string(),
                        angle: other,
                    });
                }
            }
        } else {
            0.0
        };

        let gate = match kind {
            GateKind::H => Gate::H(qubits[0]),
            GateKind::X => Gate::X(qubits[0]),
            GateKind::Y => Gate::Y(qubits[0]),
            GateKind::Z => Gate::Z(qubits[0]),
            GateKind::CX => Gate::cx(qubits[0], qubits[1]),
            GateKind::CZ => Gate::cz(qubits[0], qubits[1]),
            GateKind::Rx => Gate::Rx(qubits[0], angle),
            GateKind::Ry => Gate::Ry(qubits[0], angle),
            GateKind::Rz => Gate::Rz(qubits[0], angle),
        };
        gate.validate(num_qubits)?;
        Ok(gate)
    }

    /// Get the kind of this gate.
    pub fn kind(&self) -> GateKind {
        match self {
            Gate::H(_) => GateKind::H,
            Gate::X(_) => GateKind::X,
            Gate::Y(_) => GateKind::Y,
            Gate::Z(_) => GateKind::Z,
            Gate::CX { .. } => GateKind::CX,
            Gate::CZ { .. } => GateKind::CZ,
            Gate::Rx(..) => GateKind::Rx,
            Gate::Ry(..) => GateKind::Ry,
            Gate::Rz(..) => GateKind::Rz,
        }
    }

    /// Qubits this gate acts on; control first for two-qubit gates.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Gate::H(q) | Gate::X(q) | Gate::Y(q) | Gate::Z(q) => vec![q],
            Gate::Rx(q, _) | Gate::Ry(q, _) | Gate::Rz(q, _) => vec![q],
            Gate::CX { control, target } | Gate::CZ { control, target } => vec![control, target],
        }
    }

    /// Rotation angle, if any.
    pub fn angle(&self) -> Option<f64> {
        match *self {
            Gate::Rx(_, theta) | Gate::Ry(_, theta) | Gate::Rz(_, theta) => Some(theta),
            _ => None,
        }
    }

    /// Check qubit indices, distinctness and angle finiteness.
    pub fn validate(&self, num_qubits: u32) -> SimResult<()> {
        let qubits = self.qubits();
        for &q in &qubits {
            if q >= num_qubits as usize {
                return Err(SimError::InvalidQubitIndex {
                    qubit: q as i64,
                    num_qubits,
                    gate: self.kind().name().to_string(),
                });
            }
        }
        if let [control, target] = qubits[..] {
            if control == target {
                return Err(SimError::DuplicateQubit {
                    qubit: control,
                    gate: self.kind().name().to_string(),
                });
            }
        }
        if let Some(theta) = self.angle() {
            if !theta.is_finite() {
                return Err(SimError::InvalidAngle {
                    gate: self.kind().name().to_string(),
                    angle: Some(theta),
                });
            }
        }
        Ok(())
    }

    /// The 2×2 unitary applied to the target qubit.
    ///
    /// For controlled gates this is the matrix applied when the control is 1.
    pub fn unitary(&self) -> Matrix2 {
        match *self {
            Gate::H(_) => {
                let h = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::X(_) | Gate::CX { .. } => PAULI_X,
            Gate::Y(_) => PAULI_Y,
            Gate::Z(_) | Gate::CZ { .. } => PAULI_Z,
            // RX(θ) = cos(θ/2)·I − i·sin(θ/2)·X
            Gate::Rx(_, theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(theta / 2.0).sin());
                [[c, s], [s, c]]
            }
            // RY(θ) = cos(θ/2)·I − i·sin(θ/2)·Y
            Gate::Ry(_, theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new((theta / 2.0).sin(), 0.0);
                [[c, -s], [s, c]]
            }
            // RZ(θ) = cos(θ/2)·I − i·sin(θ/2)·Z
            Gate::Rz(_, theta) => [
                [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
                [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
            ],
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Gate::H(q) | Gate::X(q) | Gate::Y(q) | Gate::Z(q) => {
                write!(f, "{} q[{q}]", self.kind())
            }
            Gate::Rx(q, theta) | Gate::Ry(q, theta) | Gate::Rz(q, theta) => {
                write!(f, "{}({theta}) q[{q}]", self.kind())
            }
            Gate::CX { control, target } | Gate::CZ { control, target } => {
                write!(f, "{} q[{control}], q[{target}]", self.kind())
            }
        }
    }
}
