//! Ketra Statevector Simulator
//!
//! Exact simulation of small quantum registers using a dense vector of
//! `2^n` complex amplitudes.
//!
//! # Features
//!
//! - **Closed gate set**: H, X, Y, Z, CX, CZ, RX, RY, RZ
//! - **Bit-masked kernels**: gates update amplitude pairs in place; no
//!   `2^n × 2^n` matrix is ever built
//! - **Non-destructive sampling**: measurement draws from `|amplitude|²`
//!   without collapsing the state
//! - **Drift diagnostics**: the state is never renormalised; use
//!   [`Statevector::norm_deviation`] to check numerical health
//!
//! # Memory
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | 16 KiB |
//! | 20 | 16 MiB |
//! | 25 | 512 MiB |
//! | 30 | 16 GiB |
//!
//! # Example
//!
//! ```rust
//! use ketra_sim::{Gate, Statevector};
//!
//! let mut sv = Statevector::new(2).unwrap();
//! sv.apply(&Gate::H(0)).unwrap();
//! sv.apply(&Gate::cx(0, 1)).unwrap();
//!
//! let top = sv.top_states(4);
//! assert_eq!(top.len(), 2);
//! assert_eq!(sv.outcome_to_bitstring(top[0].0), "00");
//! assert_eq!(sv.outcome_to_bitstring(top[1].0), "11");
//! ```

pub mod counts;
pub mod error;
pub mod gate;
pub mod sampling;
pub mod statevector;

pub use counts::Counts;
pub use error::{SimError, SimResult};
pub use gate::{Gate, GateKind, GateRequest, Matrix2};
pub use statevector::{
    ABSOLUTE_MAX_QUBITS, BYTES_PER_AMPLITUDE, NEGLIGIBLE_PROBABILITY, Statevector, memory_bytes,
};
