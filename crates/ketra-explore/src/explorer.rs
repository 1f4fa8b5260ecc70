//! Stochastic design explorer.
//!
//! Algorithm (k options with scores s_i):
//!   z_i  = (s_i - min s) / (max s - min s)      (all 1 when scores are equal)
//!   w_i  = exp(β · (z_i - 1))                   superposition weights
//!   a_i  = sqrt(w_i)                            amplitudes
//!   Bucket z into B = ceil(sqrt(k)) bins. For option i in bin b:
//!     N_i  = A_b + (A_{b-1} + A_{b+1}) / 2      neighbourhood amplitude
//!     w'_i = w_i · (1 + γ · N_i / Σa)           interference
//!   Isolated options (alone in their bin and both neighbours) scoring in the
//!   lower half are damped by 1 / (1 + γ) instead.
//!   With probability p draw from w'^(1/τ) (tunneling), otherwise from w'.
//!   confidence = w'_chosen / Σ w'
//!
//! Options are ordered by id before any of this, so a seeded explorer picks
//! the same option for equal maps whatever order they iterate in. Apart from
//! that sort every step is a single pass over the options.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ketra_sim::sampling::sample_index;

use crate::error::{ExploreError, ExploreResult};

/// Adjusted weights at or below this are not counted as reachable.
const REACHABLE_EPSILON: f64 = 1e-12;

/// Tuning knobs for [`DesignExplorer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Inverse temperature β of the softmax over normalised scores.
    #[serde(default = "default_sharpness")]
    pub sharpness: f64,

    /// Gain γ of the interference pass; 0 disables it.
    #[serde(default = "default_interference_strength")]
    pub interference_strength: f64,

    /// Probability p that a call samples the flattened distribution.
    #[serde(default = "default_tunneling_probability")]
    pub tunneling_probability: f64,

    /// Flattening divisor τ applied to log-weights when tunneling.
    #[serde(default = "default_tunneling_temperature")]
    pub tunneling_temperature: f64,

    /// Seed for deterministic exploration.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sharpness() -> f64 {
    100.0
}

fn default_interference_strength() -> f64 {
    0.5
}

fn default_tunneling_probability() -> f64 {
    0.1
}

fn default_tunneling_temperature() -> f64 {
    2.0
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            sharpness: default_sharpness(),
            interference_strength: default_interference_strength(),
            tunneling_probability: default_tunneling_probability(),
            tunneling_temperature: default_tunneling_temperature(),
            seed: None,
        }
    }
}

impl ExplorerConfig {
    /// Validate parameter ranges.
    pub fn validate(&self) -> ExploreResult<()> {
        if !(self.sharpness.is_finite() && self.sharpness > 0.0) {
            return Err(ExploreError::InvalidConfig(format!(
                "sharpness must be positive, got {}",
                self.sharpness
            )));
        }
        if !(self.interference_strength.is_finite() && self.interference_strength >= 0.0) {
            return Err(ExploreError::InvalidConfig(format!(
                "interference_strength must be non-negative, got {}",
                self.interference_strength
            )));
        }
        if !(0.0..=1.0).contains(&self.tunneling_probability) {
            return Err(ExploreError::InvalidConfig(format!(
                "tunneling_probability must be in [0, 1], got {}",
                self.tunneling_probability
            )));
        }
        if !(self.tunneling_temperature.is_finite() && self.tunneling_temperature > 0.0) {
            return Err(ExploreError::InvalidConfig(format!(
                "tunneling_temperature must be positive, got {}",
                self.tunneling_temperature
            )));
        }
        Ok(())
    }
}

/// Outcome of one exploration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationResult {
    /// The selected option.
    pub best_option: String,
    /// Post-interference share of the selected option, in `[0, 1]`.
    pub confidence: f64,
    /// Options with non-negligible adjusted weight.
    pub reachable_configurations: usize,
    /// Whether the draw came from the flattened distribution.
    pub tunneled: bool,
}

/// Option ids and scores, ordered by id.
struct Candidates<'a> {
    ids: Vec<&'a str>,
    scores: Vec<f64>,
}

impl<'a> Candidates<'a> {
    fn collect<I>(options: I) -> ExploreResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        let iter = options.into_iter();
        let (lower, _) = iter.size_hint();

        let mut pairs: Vec<(&'a str, f64)> = Vec::with_capacity(lower);
        for (id, &score) in iter {
            if !score.is_finite() {
                return Err(ExploreError::InvalidScore {
                    option: id.clone(),
                    score,
                });
            }
            pairs.push((id.as_str(), score));
        }

        if pairs.is_empty() {
            return Err(ExploreError::EmptyOptionSet);
        }
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        let (ids, scores) = pairs.into_iter().unzip();
        Ok(Self { ids, scores })
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    /// Scores rescaled to `[0, 1]`; all ones when every score is equal.
    fn normalized_scores(&self) -> Vec<f64> {
        let (min, max) = self
            .scores
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        if max <= min {
            return vec![1.0; self.scores.len()];
        }
        let range = max - min;
        if range.is_finite() {
            self.scores.iter().map(|s| (s - min) / range).collect()
        } else {
            // Spread wider than f64::MAX: rescale by halves.
            let half_range = 0.5 * max - 0.5 * min;
            self.scores
                .iter()
                .map(|s| ((0.5 * s - 0.5 * min) / half_range).clamp(0.0, 1.0))
                .collect()
        }
    }
}

/// Quantum-inspired selector over scored options.
///
/// Thread-safe: a seeded explorer serialises calls on its RNG, an unseeded one
/// uses the thread-local RNG.
pub struct DesignExplorer {
    config: ExplorerConfig,
    rng: Option<Mutex<StdRng>>,
}

impl DesignExplorer {
    /// Create an explorer from a validated configuration.
    pub fn new(config: ExplorerConfig) -> ExploreResult<Self> {
        config.validate()?;
        let rng = config.seed.map(|seed| Mutex::new(StdRng::seed_from_u64(seed)));
        Ok(Self { config, rng })
    }

    /// Default parameters with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: ExplorerConfig {
                seed: Some(seed),
                ..ExplorerConfig::default()
            },
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Select an option using the explorer's own RNG.
    pub fn explore<'a, I>(&self, options: I) -> ExploreResult<ExplorationResult>
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                self.explore_with_rng(options, &mut *rng)
            }
            None => self.explore_with_rng(options, &mut rand::thread_rng()),
        }
    }

    /// Select an option using the given random number generator.
    pub fn explore_with_rng<'a, I, R>(
        &self,
        options: I,
        rng: &mut R,
    ) -> ExploreResult<ExplorationResult>
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
        R: Rng + ?Sized,
    {
        let candidates = Candidates::collect(options)?;

        if candidates.len() == 1 {
            return Ok(ExplorationResult {
                best_option: candidates.ids[0].to_string(),
                confidence: 1.0,
                reachable_configurations: 1,
                tunneled: false,
            });
        }

        let adjusted = self.adjusted_weights(&candidates);
        let total: f64 = adjusted.iter().sum();
        let argmax = argmax(&adjusted);

        let tunneled = rng.gen_bool(self.config.tunneling_probability);
        let chosen = if tunneled {
            let flattened = flatten(&adjusted, self.config.tunneling_temperature);
            sample_index(&flattened, rng)
        } else {
            sample_index(&adjusted, rng)
        }
        .unwrap_or(argmax);

        let reachable_configurations = adjusted
            .iter()
            .filter(|&&w| w / total > REACHABLE_EPSILON)
            .count();
        let confidence = (adjusted[chosen] / total).clamp(0.0, 1.0);

        debug!(
            options = candidates.len(),
            reachable_configurations,
            tunneled,
            confidence,
            best = candidates.ids[chosen],
            "exploration complete"
        );

        Ok(ExplorationResult {
            best_option: candidates.ids[chosen].to_string(),
            confidence,
            reachable_configurations,
            tunneled,
        })
    }

    /// The normalised post-interference distribution, ordered by option id.
    ///
    /// Deterministic: this is the distribution [`explore`](Self::explore)
    /// collapses when it does not tunnel.
    pub fn distribution<'a, I>(&self, options: I) -> ExploreResult<Vec<(&'a str, f64)>>
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        let candidates = Candidates::collect(options)?;
        let adjusted = self.adjusted_weights(&candidates);
        let total: f64 = adjusted.iter().sum();
        Ok(candidates
            .ids
            .into_iter()
            .zip(adjusted)
            .map(|(id, w)| (id, w / total))
            .collect())
    }

    fn adjusted_weights(&self, candidates: &Candidates<'_>) -> Vec<f64> {
        let z = candidates.normalized_scores();
        let weights = superpose(&z, self.config.sharpness);
        interfere(&z, &weights, self.config.interference_strength)
    }
}

impl Default for DesignExplorer {
    fn default() -> Self {
        Self {
            config: ExplorerConfig::default(),
            rng: None,
        }
    }
}

/// Softmax over normalised scores, anchored so the best option weighs 1.
fn superpose(z: &[f64], sharpness: f64) -> Vec<f64> {
    z.iter().map(|zi| (sharpness * (zi - 1.0)).exp()).collect()
}

/// Amplify options in dense, high-amplitude score neighbourhoods.
fn interfere(z: &[f64], weights: &[f64], strength: f64) -> Vec<f64> {
    let k = z.len();
    if k < 2 || strength == 0.0 {
        return weights.to_vec();
    }

    let n_buckets = (k as f64).sqrt().ceil() as usize;
    let bucket_of = |zi: f64| ((zi * n_buckets as f64) as usize).min(n_buckets - 1);

    let mut bucket_amp = vec![0.0; n_buckets];
    let mut bucket_pop = vec![0usize; n_buckets];
    let mut total_amp = 0.0;
    for (&zi, &w) in z.iter().zip(weights) {
        let b = bucket_of(zi);
        let a = w.sqrt();
        bucket_amp[b] += a;
        bucket_pop[b] += 1;
        total_amp += a;
    }

    let neighbour = |b: usize, offset: isize| -> (f64, usize) {
        let idx = b as isize + offset;
        if idx < 0 || idx as usize >= n_buckets {
            (0.0, 0)
        } else {
            (bucket_amp[idx as usize], bucket_pop[idx as usize])
        }
    };

    z.iter()
        .zip(weights)
        .map(|(&zi, &w)| {
            let b = bucket_of(zi);
            let (left_amp, left_pop) = neighbour(b, -1);
            let (right_amp, right_pop) = neighbour(b, 1);

            let isolated = bucket_pop[b] == 1 && left_pop == 0 && right_pop == 0;
            if isolated && zi < 0.5 {
                return w / (1.0 + strength);
            }

            let neighbourhood = bucket_amp[b] + 0.5 * (left_amp + right_amp);
            let share = if total_amp > 0.0 {
                (neighbourhood / total_amp).min(1.0)
            } else {
                0.0
            };
            w * (1.0 + strength * share)
        })
        .collect()
}

/// Raise weights to the power 1/τ.
fn flatten(weights: &[f64], temperature: f64) -> Vec<f64> {
    let exponent = 1.0 / temperature;
    weights.iter().map(|w| w.powf(exponent)).collect()
}

/// Index of the largest weight; first wins on ties.
fn argmax(weights: &[f64]) -> usize {
    weights
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bw), (i, &w)| {
            if w > bw { (i, w) } else { (bi, bw) }
        })
        .0
}
