//! `ketra-explore` — quantum-inspired design-space exploration.
//!
//! Given a map of candidate options to quality scores, [`DesignExplorer`]
//! picks a high-quality option and reports how strongly it dominated.
//!
//! **This is a classical heuristic.** The quantum vocabulary names three
//! ordinary steps, each O(k) in the number of options:
//!
//! | Name | What actually happens |
//! |------|----------------------|
//! | superposition | softmax over range-normalised scores |
//! | interference | neighbourhood amplification over a score histogram |
//! | tunneling | occasional sampling from a flattened distribution |
//!
//! No statevector is simulated; exploring 10 000 options costs about ten times
//! as much as exploring 1 000.
//!
//! # Quick start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use ketra_explore::DesignExplorer;
//!
//! let explorer = DesignExplorer::with_seed(7);
//! let options = BTreeMap::from([
//!     ("fast".to_string(), 0.9),
//!     ("cheap".to_string(), 0.4),
//!     ("robust".to_string(), 0.7),
//! ]);
//! let result = explorer.explore(&options).unwrap();
//! assert!(options.contains_key(&result.best_option));
//! assert!((0.0..=1.0).contains(&result.confidence));
//! ```

pub mod error;
pub mod explorer;

pub use error::{ExploreError, ExploreResult};
pub use explorer::{DesignExplorer, ExplorationResult, ExplorerConfig};
