//! Categorical sampling by inverse CDF.
//!
//! Shared by measurement (weights are `|amplitude|²`) and by the design
//! explorer (weights are adjusted option scores). Entries with non-positive
//! weight are never selected.

use rand::Rng;

/// Draw an index from `weights` whose sum is `total`.
///
/// Returns `None` when `total` is not a positive finite number or no weight is
/// positive. If floating-point drift leaves the draw past the last cumulative
/// bucket, the last positive index is returned.
pub fn inverse_cdf<I, R>(weights: I, total: f64, rng: &mut R) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
    R: Rng + ?Sized,
{
    if !(total.is_finite() && total > 0.0) {
        return None;
    }

    let r: f64 = rng.r#gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, w) in weights.into_iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if r < cumulative {
            return Some(i);
        }
    }
    last_positive
}

/// Draw an index from an unnormalised weight slice.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    inverse_cdf(weights.iter().copied(), total, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_zero_weights_never_drawn() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = [0.0, 0.5, 0.0, 0.5];
        for _ in 0..1000 {
            let idx = sample_index(&weights, &mut rng).unwrap();
            assert!(idx == 1 || idx == 3);
        }
    }

    #[test]
    fn test_degenerate_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(sample_index(&[], &mut rng), None);
        assert_eq!(sample_index(&[0.0, 0.0], &mut rng), None);
        assert_eq!(sample_index(&[0.0, 2.0], &mut rng), Some(1));
        assert_eq!(inverse_cdf([1.0], f64::NAN, &mut rng), None);
    }

    #[test]
    fn test_frequencies_follow_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let weights = [1.0, 3.0];
        let hits = (0..10_000)
            .filter(|_| sample_index(&weights, &mut rng) == Some(1))
            .count();
        let freq = hits as f64 / 10_000.0;
        assert!((freq - 0.75).abs() < 0.03, "frequency {freq}");
    }
}
