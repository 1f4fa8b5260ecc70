//! Error types for the simulator crate.

use thiserror::Error;

/// Errors produced while building or mutating a statevector.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SimError {
    /// Requested register width is outside the supported range.
    #[error("Invalid qubit count {requested}: must be between 1 and {max}")]
    InvalidQubitCount {
        /// The requested number of qubits.
        requested: u32,
        /// The largest accepted number of qubits.
        max: u32,
    },

    /// A gate referenced a qubit outside `[0, num_qubits)`.
    #[error("Qubit index {qubit} out of range for {num_qubits}-qubit register (gate: {gate})")]
    InvalidQubitIndex {
        /// The offending index as supplied by the caller.
        qubit: i64,
        /// Width of the register.
        num_qubits: u32,
        /// Name of the gate being applied.
        gate: String,
    },

    /// Gate name is not part of the supported gate set.
    #[error("Unknown gate kind '{0}'")]
    UnknownGateKind(String),

    /// Gate was given the wrong number of qubits.
    #[error("Gate '{gate}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Control and target of a two-qubit gate coincide.
    #[error("Duplicate qubit {qubit} in gate '{gate}'")]
    DuplicateQubit {
        /// The repeated qubit index.
        qubit: usize,
        /// Name of the gate.
        gate: String,
    },

    /// Rotation gate is missing its angle or the angle is not finite.
    #[error("Gate '{gate}' requires a finite angle, got {angle:?}")]
    InvalidAngle {
        /// Name of the gate.
        gate: String,
        /// The angle as supplied.
        angle: Option<f64>,
    },

    /// The amplitude buffer could not be allocated.
    #[error("Failed to allocate {bytes} bytes for a {num_qubits}-qubit statevector")]
    AllocationFailed {
        /// Register width.
        num_qubits: u32,
        /// Requested buffer size in bytes.
        bytes: u64,
    },
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
