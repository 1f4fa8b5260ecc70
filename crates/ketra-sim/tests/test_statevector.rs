//! Gate-level correctness tests for the statevector simulator.

use rand::SeedableRng;
use rand::rngs::StdRng;

use ketra_sim::{Gate, GateRequest, SimError, Statevector};

fn ghz(n: u32) -> Statevector {
    let mut sv = Statevector::new(n).unwrap();
    sv.apply(&Gate::H(0)).unwrap();
    for k in 1..n as usize {
        sv.apply(&Gate::cx(0, k)).unwrap();
    }
    sv
}

// ---------------------------------------------------------------------------
// Entangled fixtures
// ---------------------------------------------------------------------------

#[test]
fn ghz_has_two_equal_branches() {
    for n in 2..=8 {
        let sv = ghz(n);
        let top = sv.top_states(1 << n);
        assert_eq!(top.len(), 2, "n = {n}");

        let all_ones = (1usize << n) - 1;
        assert_eq!(top[0].0, 0);
        assert_eq!(top[1].0, all_ones);
        for (_, p) in top {
            assert!((p - 0.5).abs() < 1e-9);
        }
        assert_eq!(sv.outcome_to_bitstring(all_ones), "1".repeat(n as usize));
    }
}

#[test]
fn bell_measurements_are_correlated() {
    let sv = ghz(2);
    let mut rng = StdRng::seed_from_u64(2024);

    let mut zeros = 0;
    for _ in 0..1000 {
        let bits = sv.measure(&mut rng);
        assert!(bits == [0, 0] || bits == [1, 1], "uncorrelated outcome {bits:?}");
        if bits == [0, 0] {
            zeros += 1;
        }
    }
    assert!((450..=550).contains(&zeros), "zeros = {zeros}");
}

#[test]
fn sampling_does_not_collapse() {
    let sv = ghz(3);
    let before = sv.clone();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        sv.measure(&mut rng);
    }
    assert_eq!(sv, before);
}

// ---------------------------------------------------------------------------
// Algebraic identities
// ---------------------------------------------------------------------------

#[test]
fn hadamard_is_self_inverse() {
    let mut sv = Statevector::new(3).unwrap();
    sv.apply(&Gate::Ry(1, 0.7)).unwrap();
    sv.apply(&Gate::cx(1, 2)).unwrap();
    let before = sv.clone();

    sv.apply(&Gate::H(2)).unwrap();
    sv.apply(&Gate::H(2)).unwrap();

    for (a, b) in sv.amplitudes().iter().zip(before.amplitudes()) {
        assert!((a - b).norm() < 1e-12);
    }
}

#[test]
fn rotation_by_two_pi_is_minus_identity() {
    let mut sv = Statevector::new(1).unwrap();
    sv.apply(&Gate::H(0)).unwrap();
    let before = sv.clone();
    sv.apply(&Gate::Rx(0, 2.0 * std::f64::consts::PI)).unwrap();

    for (a, b) in sv.amplitudes().iter().zip(before.amplitudes()) {
        assert!((a + b).norm() < 1e-12);
    }
}

#[test]
fn cz_is_symmetric_in_its_qubits() {
    let mut a = Statevector::new(2).unwrap();
    let mut b = Statevector::new(2).unwrap();
    for sv in [&mut a, &mut b] {
        sv.apply(&Gate::H(0)).unwrap();
        sv.apply(&Gate::Ry(1, 1.1)).unwrap();
    }
    a.apply(&Gate::cz(0, 1)).unwrap();
    b.apply(&Gate::cz(1, 0)).unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn request_with_index_equal_to_width_is_rejected() {
    let req = GateRequest::new("cx", [0, 3]);
    let err = Gate::from_request(&req, 3).unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidQubitIndex { qubit: 3, num_qubits: 3, .. }
    ));
}

#[test]
fn norm_stays_one_after_long_sequence() {
    let mut sv = Statevector::new(5).unwrap();
    for step in 0..2000usize {
        let q = step % 5;
        let gate = match step % 6 {
            0 => Gate::H(q),
            1 => Gate::Rx(q, 0.1 * step as f64),
            2 => Gate::cx(q, (q + 1) % 5),
            3 => Gate::Ry(q, -0.37),
            4 => Gate::cz(q, (q + 2) % 5),
            _ => Gate::Rz(q, 1.9),
        };
        sv.apply(&gate).unwrap();
    }
    assert!(sv.norm_deviation() < 1e-9, "drift {}", sv.norm_deviation());
}
