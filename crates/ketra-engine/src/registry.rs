//! Named circuit registry.
//!
//! The map itself sits behind an `RwLock`; every circuit sits behind its own
//! `Mutex`. Lookups take the read lock only long enough to clone the circuit
//! handle, so callers working on distinct ids never wait on each other while
//! gates are being applied, and callers on the same id are serialised.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use ketra_sim::{Gate, SimResult, Statevector, memory_bytes};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{EngineError, EngineResult};

/// A registered circuit: its statevector plus bookkeeping.
#[derive(Debug)]
pub struct Circuit {
    id: String,
    state: Statevector,
    created_at: DateTime<Utc>,
    gates_applied: u64,
}

impl Circuit {
    fn new(id: String, state: Statevector) -> Self {
        Self {
            id,
            state,
            created_at: Utc::now(),
            gates_applied: 0,
        }
    }

    /// Circuit id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read-only view of the statevector.
    pub fn state(&self) -> &Statevector {
        &self.state
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.state.num_qubits()
    }

    /// Gates applied since creation or the last reset.
    pub fn gates_applied(&self) -> u64 {
        self.gates_applied
    }

    /// Apply a batch of gates. Nothing is applied if any gate is invalid.
    pub fn apply(&mut self, gates: &[Gate]) -> SimResult<()> {
        self.state.apply_all(gates)?;
        self.gates_applied += gates.len() as u64;
        Ok(())
    }

    /// Return to |0…0⟩ in place.
    pub fn reset(&mut self) {
        self.state.reset();
        self.gates_applied = 0;
    }

    /// Snapshot of the circuit metadata.
    pub fn info(&self) -> CircuitInfo {
        CircuitInfo {
            id: self.id.clone(),
            num_qubits: self.state.num_qubits(),
            created_at: self.created_at,
            gates_applied: self.gates_applied,
            memory_bytes: self.state.memory_bytes(),
        }
    }
}

/// Metadata describing a registered circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitInfo {
    /// Circuit id.
    pub id: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Gates applied since creation or the last reset.
    pub gates_applied: u64,
    /// Size of the amplitude buffer.
    pub memory_bytes: u64,
}

struct Entry {
    num_qubits: u32,
    circuit: Arc<Mutex<Circuit>>,
}

/// Capacity held by creates whose buffers are still being allocated.
#[derive(Debug, Default)]
struct Pending {
    circuits: usize,
    bytes: u64,
}

#[derive(Default)]
struct Circuits {
    entries: FxHashMap<String, Entry>,
    pending: Pending,
}

/// Capacity reserved for one in-flight create, returned on drop unless
/// settled into the map.
struct Reservation<'a> {
    registry: &'a CircuitRegistry,
    bytes: u64,
    settled: bool,
}

impl Reservation<'_> {
    fn settle(mut self, circuits: &mut Circuits) {
        circuits.pending.circuits -= 1;
        circuits.pending.bytes -= self.bytes;
        self.settled = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let mut circuits = self.registry.write();
            circuits.pending.circuits -= 1;
            circuits.pending.bytes -= self.bytes;
        }
    }
}

/// Thread-safe map from circuit id to circuit.
pub struct CircuitRegistry {
    config: RegistryConfig,
    circuits: RwLock<Circuits>,
}

impl CircuitRegistry {
    /// Create an empty registry with the given limits.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            circuits: RwLock::new(Circuits::default()),
        }
    }

    /// Registry limits.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a circuit in |0…0⟩, replacing any circuit with the same id.
    ///
    /// The replaced circuit does not count against the circuit or memory
    /// limits. Capacity is reserved under the map lock before the amplitude
    /// buffer is allocated outside it, so concurrent creates cannot overshoot
    /// the limits together.
    ///
    /// The memory budget bounds live circuits plus in-flight allocations. A
    /// replaced circuit stays alive until its successor is inserted, so an
    /// overwrite briefly holds both buffers.
    pub fn create(&self, id: &str, num_qubits: u32) -> EngineResult<CircuitInfo> {
        if num_qubits == 0 || num_qubits > self.config.max_qubits {
            return Err(EngineError::InvalidQubitCount {
                id: id.to_string(),
                requested: num_qubits,
                max: self.config.max_qubits,
            });
        }

        let reservation = self.reserve(id, num_qubits)?;

        let state = Statevector::new(num_qubits).map_err(|e| EngineError::from_sim(id, e))?;
        let circuit = Circuit::new(id.to_string(), state);
        let info = circuit.info();

        let mut circuits = self.write();
        reservation.settle(&mut circuits);
        let replaced = circuits
            .entries
            .insert(
                id.to_string(),
                Entry {
                    num_qubits,
                    circuit: Arc::new(Mutex::new(circuit)),
                },
            )
            .is_some();

        debug!(
            circuit = id,
            num_qubits,
            memory_bytes = info.memory_bytes,
            replaced,
            "circuit created"
        );
        Ok(info)
    }

    /// Remove a circuit, returning its final metadata.
    pub fn remove(&self, id: &str) -> EngineResult<CircuitInfo> {
        let entry = self
            .write()
            .entries
            .remove(id)
            .ok_or_else(|| EngineError::UnknownCircuit(id.to_string()))?;
        let info = lock(&entry.circuit).info();
        debug!(circuit = id, "circuit removed");
        Ok(info)
    }

    /// Run `f` with shared access to a circuit.
    pub fn with_circuit<T>(&self, id: &str, f: impl FnOnce(&Circuit) -> T) -> EngineResult<T> {
        let handle = self.handle(id)?;
        let circuit = lock(&handle);
        Ok(f(&circuit))
    }

    /// Run `f` with exclusive access to a circuit.
    pub fn with_circuit_mut<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Circuit) -> T,
    ) -> EngineResult<T> {
        let handle = self.handle(id)?;
        let mut circuit = lock(&handle);
        Ok(f(&mut circuit))
    }

    /// Check whether a circuit is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains_key(id)
    }

    /// Number of live circuits.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Ids of all live circuits, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().entries.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Summed amplitude memory of all live circuits.
    pub fn memory_in_use(&self) -> u64 {
        self.read()
            .entries
            .values()
            .map(|e| memory_bytes(e.num_qubits))
            .fold(0u64, u64::saturating_add)
    }

    /// Drop every circuit.
    pub fn clear(&self) {
        let mut circuits = self.write();
        let dropped = circuits.entries.len();
        circuits.entries.clear();
        debug!(dropped, "registry cleared");
    }

    fn handle(&self, id: &str) -> EngineResult<Arc<Mutex<Circuit>>> {
        self.read()
            .entries
            .get(id)
            .map(|e| Arc::clone(&e.circuit))
            .ok_or_else(|| EngineError::UnknownCircuit(id.to_string()))
    }

    fn reserve(&self, id: &str, num_qubits: u32) -> EngineResult<Reservation<'_>> {
        let mut circuits = self.write();
        self.check_capacity(&circuits, id, num_qubits)?;
        let bytes = memory_bytes(num_qubits);
        circuits.pending.circuits += 1;
        circuits.pending.bytes = circuits.pending.bytes.saturating_add(bytes);
        Ok(Reservation {
            registry: self,
            bytes,
            settled: false,
        })
    }

    fn check_capacity(&self, circuits: &Circuits, id: &str, num_qubits: u32) -> EngineResult<()> {
        let others = circuits.entries.iter().filter(|(k, _)| k.as_str() != id);

        if let Some(limit) = self.config.max_circuits {
            if others.clone().count() + circuits.pending.circuits >= limit {
                return Err(EngineError::RegistryFull {
                    id: id.to_string(),
                    limit,
                });
            }
        }

        if let Some(budget) = self.config.memory_budget_bytes {
            let requested = memory_bytes(num_qubits);
            let in_use = others
                .map(|(_, e)| memory_bytes(e.num_qubits))
                .fold(circuits.pending.bytes, u64::saturating_add);
            if in_use.saturating_add(requested) > budget {
                return Err(EngineError::MemoryBudgetExceeded {
                    id: id.to_string(),
                    requested,
                    in_use,
                    budget,
                });
            }
        }

        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Circuits> {
        self.circuits.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Circuits> {
        self.circuits.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

fn lock(circuit: &Mutex<Circuit>) -> std::sync::MutexGuard<'_, Circuit> {
    circuit.lock().unwrap_or_else(PoisonError::into_inner)
}
