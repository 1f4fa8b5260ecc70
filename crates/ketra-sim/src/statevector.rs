//! Statevector simulation engine.
//!
//! Amplitudes are stored densely, one `Complex64` (16 bytes) per basis state,
//! so an `n`-qubit register costs `16 × 2^n` bytes.
//!
//! # Bit ordering
//!
//! Qubit `k` is bit `k` of the basis index (qubit 0 is the least significant
//! bit). Bitstrings are rendered with qubit 0 as the *leftmost* character, so
//! index `0b001` on three qubits is `"100"`. Measurement bit vectors follow the
//! same order: element `k` is the value of qubit `k`.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use num_complex::Complex64;
use rand::Rng;
use tracing::{debug, trace};

use crate::counts::Counts;
use crate::error::{SimError, SimResult};
use crate::gate::{Gate, Matrix2};
use crate::sampling::inverse_cdf;

/// Largest register the dense layout can address on a 64-bit host.
pub const ABSOLUTE_MAX_QUBITS: u32 = 40;

/// Size of one amplitude in bytes.
pub const BYTES_PER_AMPLITUDE: u64 = 16;

/// Probabilities at or below this are treated as zero when listing states.
pub const NEGLIGIBLE_PROBABILITY: f64 = 1e-12;

/// Memory needed by the amplitude buffer of an `num_qubits`-qubit register.
pub fn memory_bytes(num_qubits: u32) -> u64 {
    1u64.checked_shl(num_qubits)
        .and_then(|n| n.checked_mul(BYTES_PER_AMPLITUDE))
        .unwrap_or(u64::MAX)
}

/// Insert a zero bit at position `bit`, shifting higher bits up by one.
#[inline]
fn insert_zero_bit(value: usize, bit: usize) -> usize {
    let low = value & ((1 << bit) - 1);
    let high = (value >> bit) << (bit + 1);
    high | low
}

/// Base indices of a `len`-sized register with both `q1` and `q2` cleared.
fn pair_bases(len: usize, q1: usize, q2: usize) -> impl Iterator<Item = usize> {
    let (lo, hi) = if q1 < q2 { (q1, q2) } else { (q2, q1) };
    (0..len >> 2).map(move |k| insert_zero_bit(insert_zero_bit(k, lo), hi))
}

/// A statevector representing a quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: u32,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    ///
    /// Fails with [`SimError::InvalidQubitCount`] outside
    /// `1..=ABSOLUTE_MAX_QUBITS` and with [`SimError::AllocationFailed`] if the
    /// buffer cannot be reserved.
    pub fn new(num_qubits: u32) -> SimResult<Self> {
        if num_qubits == 0 || num_qubits > ABSOLUTE_MAX_QUBITS {
            return Err(SimError::InvalidQubitCount {
                requested: num_qubits,
                max: ABSOLUTE_MAX_QUBITS,
            });
        }

        let bytes = memory_bytes(num_qubits);
        let alloc_failed = || SimError::AllocationFailed { num_qubits, bytes };
        let size = 1usize.checked_shl(num_qubits).ok_or_else(alloc_failed)?;

        debug!(num_qubits, bytes, "allocating statevector");
        let mut amplitudes = Vec::new();
        amplitudes
            .try_reserve_exact(size)
            .map_err(|_| alloc_failed())?;
        amplitudes.resize(size, Complex64::new(0.0, 0.0));
        amplitudes[0] = Complex64::new(1.0, 0.0);

        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of basis states (2^n).
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Read-only view of the amplitudes, indexed by basis state.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Bytes held by the amplitude buffer.
    pub fn memory_bytes(&self) -> u64 {
        memory_bytes(self.num_qubits)
    }

    /// Return to |0...0⟩ without reallocating.
    pub fn reset(&mut self) {
        self.amplitudes.fill(Complex64::new(0.0, 0.0));
        self.amplitudes[0] = Complex64::new(1.0, 0.0);
    }

    /// Apply a gate. The state is left untouched if validation fails.
    pub fn apply(&mut self, gate: &Gate) -> SimResult<()> {
        gate.validate(self.num_qubits)?;
        trace!(%gate, "applying gate");

        match *gate {
            Gate::H(q) | Gate::X(q) | Gate::Y(q) | Gate::Z(q) => {
                self.apply_single(q, &gate.unitary());
            }
            Gate::Rx(q, _) | Gate::Ry(q, _) | Gate::Rz(q, _) => {
                self.apply_single(q, &gate.unitary());
            }
            Gate::CX { control, target } => self.apply_cx(control, target),
            Gate::CZ { control, target } => self.apply_cz(control, target),
        }
        Ok(())
    }

    /// Apply a sequence of gates after validating all of them.
    pub fn apply_all(&mut self, gates: &[Gate]) -> SimResult<()> {
        for gate in gates {
            gate.validate(self.num_qubits)?;
        }
        for gate in gates {
            self.apply(gate)?;
        }
        Ok(())
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    /// Apply a 2×2 unitary to every amplitude pair differing only in `target`.
    fn apply_single(&mut self, target: usize, m: &Matrix2) {
        let mask = 1 << target;
        let half = self.amplitudes.len() >> 1;
        for k in 0..half {
            let i = insert_zero_bit(k, target);
            let j = i | mask;
            let a = self.amplitudes[i];
            let b = self.amplitudes[j];
            self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
            self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for base in pair_bases(self.amplitudes.len(), control, target) {
            let i = base | ctrl_mask;
            self.amplitudes.swap(i, i | tgt_mask);
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let both = (1 << control) | (1 << target);
        for base in pair_bases(self.amplitudes.len(), control, target) {
            let i = base | both;
            self.amplitudes[i] = -self.amplitudes[i];
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Sum of `|amplitude|²`; 1 for a valid state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Absolute distance of the squared norm from 1.
    ///
    /// Gates are unitary, so this only grows through floating-point error.
    /// The state is never renormalised; callers decide what drift is acceptable.
    pub fn norm_deviation(&self) -> f64 {
        (self.norm_sqr() - 1.0).abs()
    }

    /// Probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Probability of one basis index, `None` if out of range.
    pub fn probability(&self, index: usize) -> Option<f64> {
        self.amplitudes.get(index).map(Complex64::norm_sqr)
    }

    /// Marginal probability that `qubit` reads 1.
    pub fn qubit_probability(&self, qubit: usize) -> SimResult<f64> {
        if qubit >= self.num_qubits as usize {
            return Err(SimError::InvalidQubitIndex {
                qubit: qubit as i64,
                num_qubits: self.num_qubits,
                gate: "measure".to_string(),
            });
        }
        let mask = 1 << qubit;
        Ok(self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum())
    }

    /// The `top_n` most probable basis states as `(index, probability)`.
    ///
    /// Sorted by descending probability, ties broken by ascending index.
    /// States with negligible probability are omitted.
    pub fn top_states(&self, top_n: usize) -> Vec<(usize, f64)> {
        if top_n == 0 {
            return Vec::new();
        }

        // Min-heap of the best `top_n` seen so far; the root is the weakest.
        let mut heap = BinaryHeap::with_capacity(top_n.saturating_add(1).min(self.dimension()));
        for (index, amp) in self.amplitudes.iter().enumerate() {
            let probability = amp.norm_sqr();
            if probability <= NEGLIGIBLE_PROBABILITY {
                continue;
            }
            heap.push(Reverse(Ranked { probability, index }));
            if heap.len() > top_n {
                heap.pop();
            }
        }

        // Ascending `Reverse<Ranked>` is descending rank.
        heap.into_sorted_vec()
            .into_iter()
            .map(|Reverse(r)| (r.index, r.probability))
            .collect()
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Sample a measurement outcome without collapsing the state.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let total = self.norm_sqr();
        inverse_cdf(self.amplitudes.iter().map(Complex64::norm_sqr), total, rng).unwrap_or(0)
    }

    /// Sample an outcome and return it as one bit per qubit (qubit 0 first).
    pub fn measure<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u8> {
        let outcome = self.sample(rng);
        self.outcome_to_bits(outcome)
    }

    /// Sample `shots` independent outcomes into a histogram.
    pub fn sample_counts<R: Rng + ?Sized>(&self, shots: u64, rng: &mut R) -> Counts {
        let mut counts = Counts::new();
        if shots == 0 {
            return counts;
        }

        let cdf: Vec<f64> = self
            .amplitudes
            .iter()
            .scan(0.0, |acc, a| {
                *acc += a.norm_sqr();
                Some(*acc)
            })
            .collect();
        let total = cdf.last().copied().unwrap_or(0.0);
        let last_nonzero = self
            .amplitudes
            .iter()
            .rposition(|a| a.norm_sqr() > 0.0)
            .unwrap_or(0);

        for _ in 0..shots {
            let r: f64 = rng.r#gen::<f64>() * total;
            let outcome = cdf.partition_point(|&c| c <= r).min(last_nonzero);
            counts.insert(self.outcome_to_bitstring(outcome), 1);
        }
        counts
    }

    /// Convert measurement outcome to bits, qubit 0 first.
    pub fn outcome_to_bits(&self, outcome: usize) -> Vec<u8> {
        (0..self.num_qubits as usize)
            .map(|q| ((outcome >> q) & 1) as u8)
            .collect()
    }

    /// Convert measurement outcome to bitstring, qubit 0 leftmost.
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        format!("{:0width$b}", outcome, width = self.num_qubits as usize)
            .chars()
            .rev()
            .collect()
    }

    /// Parse a bitstring (qubit 0 leftmost) back into a basis index.
    pub fn bitstring_to_outcome(&self, bitstring: &str) -> Option<usize> {
        if bitstring.len() != self.num_qubits as usize {
            return None;
        }
        bitstring
            .bytes()
            .enumerate()
            .try_fold(0usize, |acc, (q, b)| match b {
                b'0' => Some(acc),
                b'1' => Some(acc | (1 << q)),
                _ => None,
            })
    }
}

/// Ordering key for [`Statevector::top_states`]: higher probability ranks
/// higher, and among equal probabilities the lower index ranks higher.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ranked {
    probability: f64,
    index: usize,
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.probability
            .total_cmp(&other.probability)
            .then_with(|| other.index.cmp(&self.index))
    }
}
