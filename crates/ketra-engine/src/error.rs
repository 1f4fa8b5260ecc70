//! Error types for the engine.
//!
//! Simulator and explorer errors are re-tagged with the circuit id they
//! occurred on, so every message names both the circuit and the bad value.

use ketra_explore::ExploreError;
use ketra_sim::SimError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by engine operations.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EngineError {
    /// Requested qubit count is outside `[1, max_qubits]`.
    #[error("Circuit '{id}': invalid qubit count {requested}, must be between 1 and {max}")]
    InvalidQubitCount {
        /// Circuit id.
        id: String,
        /// The requested number of qubits.
        requested: u32,
        /// The configured ceiling.
        max: u32,
    },

    /// No circuit is registered under this id.
    #[error("Unknown circuit '{0}'")]
    UnknownCircuit(String),

    /// A gate targeted a qubit outside `[0, num_qubits)`.
    #[error("Circuit '{id}': qubit index {qubit} out of range for {num_qubits} qubits (gate: {gate})")]
    InvalidQubitIndex {
        /// Circuit id.
        id: String,
        /// The offending index.
        qubit: i64,
        /// Width of the circuit.
        num_qubits: u32,
        /// Name of the gate.
        gate: String,
    },

    /// Gate name is not in the supported gate set.
    #[error("Circuit '{id}': unknown gate kind '{gate}'")]
    UnknownGateKind {
        /// Circuit id.
        id: String,
        /// The gate name as supplied.
        gate: String,
    },

    /// Gate arity, duplicate operands or angle are wrong.
    #[error("Circuit '{id}': invalid gate arguments: {reason}")]
    InvalidGateArguments {
        /// Circuit id.
        id: String,
        /// What was wrong.
        reason: String,
    },

    /// A bitstring does not address a basis state of the circuit.
    #[error("Circuit '{id}': invalid bitstring '{bitstring}'")]
    InvalidBitstring {
        /// Circuit id.
        id: String,
        /// The bitstring as supplied.
        bitstring: String,
    },

    /// The amplitude buffer could not be allocated.
    #[error("Circuit '{id}': failed to allocate {bytes} bytes for {num_qubits} qubits")]
    AllocationFailed {
        /// Circuit id.
        id: String,
        /// Register width.
        num_qubits: u32,
        /// Requested size in bytes.
        bytes: u64,
    },

    /// The registry already holds the maximum number of circuits.
    #[error("Cannot create circuit '{id}': registry is full ({limit} circuits)")]
    RegistryFull {
        /// Circuit id.
        id: String,
        /// Configured circuit limit.
        limit: usize,
    },

    /// Creating the circuit would exceed the memory budget.
    #[error(
        "Cannot create circuit '{id}': needs {requested} bytes, {in_use} of {budget} bytes in use"
    )]
    MemoryBudgetExceeded {
        /// Circuit id.
        id: String,
        /// Bytes the new circuit needs.
        requested: u64,
        /// Bytes held by other live circuits.
        in_use: u64,
        /// Configured budget.
        budget: u64,
    },

    /// Exploration was called with no options.
    #[error("Option set is empty: nothing to explore")]
    EmptyOptionSet,

    /// An option carries a non-finite score.
    #[error("Option '{option}' has non-finite score {score}")]
    InvalidScore {
        /// The offending option.
        option: String,
        /// The score as supplied.
        score: f64,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Attach a circuit id to a simulator error.
    pub fn from_sim(id: &str, err: SimError) -> Self {
        let id = id.to_string();
        match err {
            SimError::InvalidQubitCount { requested, max } => {
                EngineError::InvalidQubitCount { id, requested, max }
            }
            SimError::InvalidQubitIndex {
                qubit,
                num_qubits,
                gate,
            } => EngineError::InvalidQubitIndex {
                id,
                qubit,
                num_qubits,
                gate,
            },
            SimError::UnknownGateKind(gate) => EngineError::UnknownGateKind { id, gate },
            SimError::AllocationFailed { num_qubits, bytes } => EngineError::AllocationFailed {
                id,
                num_qubits,
                bytes,
            },
            other => EngineError::InvalidGateArguments {
                id,
                reason: other.to_string(),
            },
        }
    }
}

impl From<ExploreError> for EngineError {
    fn from(err: ExploreError) -> Self {
        match err {
            ExploreError::EmptyOptionSet => EngineError::EmptyOptionSet,
            ExploreError::InvalidScore { option, score } => {
                EngineError::InvalidScore { option, score }
            }
            other => EngineError::Config(ConfigError::ValidationError(other.to_string())),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_errors_carry_circuit_id() {
        let err = EngineError::from_sim(
            "bell",
            SimError::InvalidQubitIndex {
                qubit: 2,
                num_qubits: 2,
                gate: "cx".into(),
            },
        );
        assert_eq!(
            err,
            EngineError::InvalidQubitIndex {
                id: "bell".into(),
                qubit: 2,
                num_qubits: 2,
                gate: "cx".into(),
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("bell"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_argument_errors_collapse() {
        let err = EngineError::from_sim(
            "c",
            SimError::DuplicateQubit {
                qubit: 0,
                gate: "cz".into(),
            },
        );
        assert!(matches!(err, EngineError::InvalidGateArguments { ref id, .. } if id == "c"));
    }

    #[test]
    fn test_explore_errors_convert() {
        assert_eq!(
            EngineError::from(ExploreError::EmptyOptionSet),
            EngineError::EmptyOptionSet
        );
    }
}
