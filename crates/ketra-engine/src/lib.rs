//! Ketra Engine
//!
//! The synchronous call surface over the statevector simulator and the
//! design explorer: a registry of named circuits with configurable limits,
//! gate application from plain records, sampling, state inspection and
//! option exploration.
//!
//! Errors from every layer are reported as [`EngineError`], tagged with the
//! circuit id they concern.
//!
//! # Example
//!
//! ```rust
//! use ketra_engine::{Engine, EngineConfig, GateRequest};
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! engine.create_circuit("ghz3", 3).unwrap();
//! engine
//!     .apply_gates(
//!         "ghz3",
//!         &[
//!             GateRequest::new("h", [0]),
//!             GateRequest::new("cnot", [0, 1]),
//!             GateRequest::new("cnot", [0, 2]),
//!         ],
//!     )
//!     .unwrap();
//!
//! let state = engine.get_state("ghz3", 2).unwrap();
//! assert_eq!(state[0].bitstring, "000");
//! assert_eq!(state[1].bitstring, "111");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod registry;

pub use config::{ConfigError, EngineConfig, RegistryConfig};
pub use engine::{BasisProbability, Engine};
pub use error::{EngineError, EngineResult};
pub use registry::{Circuit, CircuitInfo, CircuitRegistry};

pub use ketra_explore::{ExplorationResult, ExplorerConfig};
pub use ketra_sim::{Counts, Gate, GateKind, GateRequest};
