//! Property-based tests for unitarity of the gate kernels.
//!
//! Random gate sequences must keep the squared norm at 1, and undoing a
//! sequence with its inverse must restore the initial amplitudes.

use ketra_sim::{Gate, Statevector};
use proptest::prelude::*;

/// Generate a gate valid on an `n`-qubit register (n ≥ 2).
fn arb_gate(n: usize) -> impl Strategy<Value = Gate> {
    let angle = -10.0f64..10.0;
    prop_oneof![
        (0..n).prop_map(Gate::H),
        (0..n).prop_map(Gate::X),
        (0..n).prop_map(Gate::Y),
        (0..n).prop_map(Gate::Z),
        (0..n, angle.clone()).prop_map(|(q, t)| Gate::Rx(q, t)),
        (0..n, angle.clone()).prop_map(|(q, t)| Gate::Ry(q, t)),
        (0..n, angle).prop_map(|(q, t)| Gate::Rz(q, t)),
        (0..n, 1..n).prop_map(move |(c, off)| Gate::cx(c, (c + off) % n)),
        (0..n, 1..n).prop_map(move |(c, off)| Gate::cz(c, (c + off) % n)),
    ]
}

fn arb_program() -> impl Strategy<Value = (u32, Vec<Gate>)> {
    (2_u32..=6).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec(arb_gate(n as usize), 1..=60),
        )
    })
}

/// Inverse of a single gate.
fn inverse(gate: Gate) -> Gate {
    match gate {
        Gate::Rx(q, t) => Gate::Rx(q, -t),
        Gate::Ry(q, t) => Gate::Ry(q, -t),
        Gate::Rz(q, t) => Gate::Rz(q, -t),
        // The remaining gates are Hermitian.
        other => other,
    }
}

proptest! {
    #[test]
    fn norm_is_preserved((n, gates) in arb_program()) {
        let mut sv = Statevector::new(n).unwrap();
        sv.apply_all(&gates).unwrap();
        prop_assert!(sv.norm_deviation() < 1e-9);
    }

    #[test]
    fn inverse_sequence_restores_ground_state((n, gates) in arb_program()) {
        let mut sv = Statevector::new(n).unwrap();
        sv.apply_all(&gates).unwrap();
        for gate in gates.iter().rev() {
            sv.apply(&inverse(*gate)).unwrap();
        }
        let ground = Statevector::new(n).unwrap();
        for (a, b) in sv.amplitudes().iter().zip(ground.amplitudes()) {
            prop_assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn double_hadamard_is_identity((n, gates) in arb_program(), q in 0usize..2) {
        let mut sv = Statevector::new(n).unwrap();
        sv.apply_all(&gates).unwrap();
        let before = sv.clone();
        sv.apply(&Gate::H(q)).unwrap();
        sv.apply(&Gate::H(q)).unwrap();
        for (a, b) in sv.amplitudes().iter().zip(before.amplitudes()) {
            prop_assert!((a - b).norm() < 1e-9);
        }
    }
}
