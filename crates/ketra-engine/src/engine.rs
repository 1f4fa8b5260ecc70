//! Operation surface over the circuit registry and the design explorer.

use ketra_explore::{DesignExplorer, ExplorationResult};
use ketra_sim::{Counts, Gate, GateRequest, SimResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::registry::{Circuit, CircuitInfo, CircuitRegistry};

/// One entry of [`Engine::get_state`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisProbability {
    /// Basis state, qubit 0 leftmost.
    pub bitstring: String,
    /// `|amplitude|²` of the basis state.
    pub probability: f64,
}

/// The engine: a circuit registry plus a design explorer.
///
/// All operations are synchronous and take `&self`; an `Engine` can be
/// shared across threads behind an `Arc`.
pub struct Engine {
    config: EngineConfig,
    registry: CircuitRegistry,
    explorer: DesignExplorer,
}

impl Engine {
    /// Create an engine from a configuration.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let explorer = DesignExplorer::new(config.explorer.clone())?;
        let registry = CircuitRegistry::new(config.registry.clone());
        debug!(
            max_qubits = config.registry.max_qubits,
            max_circuits = ?config.registry.max_circuits,
            seeded = config.explorer.seed.is_some(),
            "engine created"
        );
        Ok(Self {
            config,
            registry,
            explorer,
        })
    }

    /// Create an engine from an optional YAML file, `.env` and `KETRA_*`
    /// environment variables.
    pub fn load(config_file: Option<&str>) -> EngineResult<Self> {
        Self::new(EngineConfig::load(config_file)?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the circuit registry.
    pub fn registry(&self) -> &CircuitRegistry {
        &self.registry
    }

    // =========================================================================
    // Circuits
    // =========================================================================

    /// Create a circuit in |0…0⟩, replacing any circuit with the same id.
    #[instrument(skip(self))]
    pub fn create_circuit(&self, id: &str, num_qubits: u32) -> EngineResult<CircuitInfo> {
        self.registry.create(id, num_qubits)
    }

    /// Apply an ordered batch of gate records.
    ///
    /// The whole batch is validated before any gate is applied: on error the
    /// circuit is unchanged. Returns the number of gates applied.
    #[instrument(skip(self, gates), fields(gates = gates.len()))]
    pub fn apply_gates(&self, id: &str, gates: &[GateRequest]) -> EngineResult<usize> {
        self.registry
            .with_circuit_mut(id, |circuit| -> SimResult<usize> {
                let num_qubits = circuit.num_qubits();
                let typed = gates
                    .iter()
                    .map(|request| Gate::from_request(request, num_qubits))
                    .collect::<Result<Vec<_>, _>>()?;
                circuit.apply(&typed)?;
                self.check_drift(circuit);
                Ok(typed.len())
            })?
            .map_err(|e| EngineError::from_sim(id, e))
    }

    /// Apply already-typed gates.
    #[instrument(skip(self, gates), fields(gates = gates.len()))]
    pub fn apply(&self, id: &str, gates: &[Gate]) -> EngineResult<usize> {
        self.registry
            .with_circuit_mut(id, |circuit| -> SimResult<usize> {
                circuit.apply(gates)?;
                self.check_drift(circuit);
                Ok(gates.len())
            })?
            .map_err(|e| EngineError::from_sim(id, e))
    }

    /// Sample one outcome, one bit per qubit with qubit 0 first.
    ///
    /// Sampling does not collapse the state: repeated calls draw independently
    /// from the same distribution.
    pub fn measure(&self, id: &str) -> EngineResult<Vec<u8>> {
        self.measure_with_rng(id, &mut rand::thread_rng())
    }

    /// [`measure`](Self::measure) with a caller-supplied RNG.
    #[instrument(skip(self, rng))]
    pub fn measure_with_rng<R: Rng + ?Sized>(
        &self,
        id: &str,
        rng: &mut R,
    ) -> EngineResult<Vec<u8>> {
        self.registry.with_circuit(id, |c| c.state().measure(rng))
    }

    /// Sample `shots` outcomes into a bitstring histogram.
    pub fn sample_counts(&self, id: &str, shots: u64) -> EngineResult<Counts> {
        self.sample_counts_with_rng(id, shots, &mut rand::thread_rng())
    }

    /// [`sample_counts`](Self::sample_counts) with a caller-supplied RNG.
    #[instrument(skip(self, rng))]
    pub fn sample_counts_with_rng<R: Rng + ?Sized>(
        &self,
        id: &str,
        shots: u64,
        rng: &mut R,
    ) -> EngineResult<Counts> {
        self.registry.with_circuit(id, |c| c.state().sample_counts(shots, rng))
    }

    /// The `top_n` most probable basis states.
    ///
    /// Sorted by descending probability, ties by ascending basis index.
    /// States with negligible probability are omitted.
    #[instrument(skip(self))]
    pub fn get_state(&self, id: &str, top_n: usize) -> EngineResult<Vec<BasisProbability>> {
        self.registry.with_circuit(id, |c| {
            let state = c.state();
            state
                .top_states(top_n)
                .into_iter()
                .map(|(index, probability)| BasisProbability {
                    bitstring: state.outcome_to_bitstring(index),
                    probability,
                })
                .collect()
        })
    }

    /// Probability of one basis state given as a bitstring (qubit 0 leftmost).
    pub fn probability_of(&self, id: &str, bitstring: &str) -> EngineResult<f64> {
        self.registry
            .with_circuit(id, |c| {
                let state = c.state();
                state
                    .bitstring_to_outcome(bitstring)
                    .and_then(|index| state.probability(index))
            })?
            .ok_or_else(|| EngineError::InvalidBitstring {
                id: id.to_string(),
                bitstring: bitstring.to_string(),
            })
    }

    /// `|‖ψ‖² − 1|` for the circuit.
    pub fn norm_deviation(&self, id: &str) -> EngineResult<f64> {
        self.registry.with_circuit(id, |c| c.state().norm_deviation())
    }

    /// Metadata for a circuit.
    pub fn circuit_info(&self, id: &str) -> EngineResult<CircuitInfo> {
        self.registry.with_circuit(id, Circuit::info)
    }

    /// Return a circuit to |0…0⟩ without reallocating.
    #[instrument(skip(self))]
    pub fn reset_circuit(&self, id: &str) -> EngineResult<CircuitInfo> {
        self.registry.with_circuit_mut(id, |c| {
            c.reset();
            c.info()
        })
    }

    /// Remove a circuit and free its memory.
    #[instrument(skip(self))]
    pub fn remove_circuit(&self, id: &str) -> EngineResult<CircuitInfo> {
        self.registry.remove(id)
    }

    /// Ids of all live circuits, sorted.
    pub fn circuit_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Create the Bell state (|00⟩ + |11⟩)/√2: H on qubit 0, then CX(0, 1).
    #[instrument(skip(self))]
    pub fn create_bell_state(&self, id: &str) -> EngineResult<CircuitInfo> {
        self.create_circuit(id, 2)?;
        self.apply_gates(
            id,
            &[GateRequest::new("h", [0]), GateRequest::new("cx", [0, 1])],
        )?;
        self.circuit_info(id)
    }

    /// Create the `n`-qubit GHZ state: H on qubit 0, then CX(0, k) for
    /// k in 1..n.
    #[instrument(skip(self))]
    pub fn create_ghz_state(&self, id: &str, num_qubits: u32) -> EngineResult<CircuitInfo> {
        self.create_circuit(id, num_qubits)?;
        let gates: Vec<GateRequest> = std::iter::once(GateRequest::new("h", [0]))
            .chain((1..i64::from(num_qubits)).map(|k| GateRequest::new("cx", [0, k])))
            .collect();
        self.apply_gates(id, &gates)?;
        self.circuit_info(id)
    }

    // =========================================================================
    // Design exploration
    // =========================================================================

    /// Select a high-quality option from a scored option set.
    #[instrument(skip(self, options))]
    pub fn explore_designs<'a, I>(&self, options: I) -> EngineResult<ExplorationResult>
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        Ok(self.explorer.explore(options)?)
    }

    /// The explorer used by [`explore_designs`](Self::explore_designs).
    pub fn explorer(&self) -> &DesignExplorer {
        &self.explorer
    }

    fn check_drift(&self, circuit: &Circuit) {
        let registry = &self.config.registry;
        if !registry.check_drift {
            return;
        }
        let deviation = circuit.state().norm_deviation();
        if deviation > registry.drift_tolerance {
            warn!(
                circuit = circuit.id(),
                deviation,
                tolerance = registry.drift_tolerance,
                gates_applied = circuit.gates_applied(),
                "norm drift exceeds tolerance"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;

    fn engine() -> Engine {
        Engine::new(EngineConfig {
            registry: RegistryConfig {
                max_qubits: 12,
                check_drift: true,
                ..RegistryConfig::default()
            },
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_bell_preset_gate_count() {
        let engine = engine();
        let info = engine.create_bell_state("bell").unwrap();
        assert_eq!(info.num_qubits, 2);
        assert_eq!(info.gates_applied, 2);
    }

    #[test]
    fn test_ghz_preset_gate_count() {
        let engine = engine();
        let info = engine.create_ghz_state("ghz", 5).unwrap();
        assert_eq!(info.gates_applied, 5);

        // One qubit: just H.
        let info = engine.create_ghz_state("one", 1).unwrap();
        assert_eq!(info.gates_applied, 1);
    }

    #[test]
    fn test_failed_batch_leaves_circuit_untouched() {
        let engine = engine();
        engine.create_circuit("c", 2).unwrap();
        let err = engine
            .apply_gates(
                "c",
                &[GateRequest::new("x", [0]), GateRequest::new("x", [2])],
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidQubitIndex { qubit: 2, .. }));
        assert_eq!(engine.probability_of("c", "00").unwrap(), 1.0);
        assert_eq!(engine.circuit_info("c").unwrap().gates_applied, 0);
    }

    #[test]
    fn test_invalid_bitstring() {
        let engine = engine();
        engine.create_circuit("c", 2).unwrap();
        for bad in ["0", "000", "0a"] {
            assert!(matches!(
                engine.probability_of("c", bad),
                Err(EngineError::InvalidBitstring { .. })
            ));
        }
    }

    #[test]
    fn test_state_serializes() {
        let engine = engine();
        engine.create_bell_state("bell").unwrap();
        let json = serde_json::to_value(engine.get_state("bell", 2).unwrap()).unwrap();
        assert_eq!(json[0]["bitstring"], "00");
        assert_eq!(json[1]["bitstring"], "11");

        let info = serde_json::to_value(engine.circuit_info("bell").unwrap()).unwrap();
        assert_eq!(info["num_qubits"], 2);
        assert_eq!(info["gates_applied"], 2);
        assert!(info["created_at"].is_string());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.registry.max_qubits = 0;
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }
}
