//! Backend execution types and traits
//!
//! Gantree: L3_Backend → BackendTrait
//!
//! The backend is the only external collaborator of the mitigation core: it
//! takes a circuit description and a shot count and returns a frequency table.

use qrem_core::{limits, total_counts, BitOrder, Circuit, Counts, QremResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Result of circuit execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts (label -> count)
    pub counts: Counts,

    /// Number of shots executed
    pub shots: u64,

    /// Execution metadata
    pub metadata: ExecutionMetadata,
}

/// Execution metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Backend name
    pub backend: String,

    /// Job ID (if applicable)
    pub job_id: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: Option<u64>,

    /// Whether simulation was used
    pub simulated: bool,

    /// Seed used (if any)
    pub seed: Option<u64>,

    /// Label convention of `counts`
    pub bit_order: BitOrder,

    /// Additional info
    pub extra: HashMap<String, String>,
}

impl ExecutionResult {
    /// Create new execution result
    pub fn new(counts: Counts, shots: u64, backend: &str) -> Self {
        Self {
            counts,
            shots,
            metadata: ExecutionMetadata {
                backend: backend.to_string(),
                simulated: true,
                ..Default::default()
            },
        }
    }

    /// Get total count (should equal shots)
    pub fn total_counts(&self) -> u64 {
        total_counts(&self.counts)
    }

    /// Check the frequency-table invariant: counts sum to shots
    pub fn is_consistent(&self) -> bool {
        self.total_counts() == self.shots
    }

    /// Get empirical probability of a label
    pub fn probability(&self, label: &str) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        let count = self.counts.get(label).copied().unwrap_or(0);
        count as f64 / self.shots as f64
    }

    /// Get most frequent label
    pub fn most_frequent(&self) -> Option<(&String, u64)> {
        self.counts
            .iter()
            .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then_with(|| lb.cmp(la)))
            .map(|(label, &count)| (label, count))
    }

    /// Labels sorted lexicographically with their counts
    pub fn sorted_counts(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.counts.iter().map(|(l, &c)| (l.as_str(), c)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExecutionResult(backend={}, shots={}, unique={})",
            self.metadata.backend,
            self.shots,
            self.counts.len()
        )
    }
}

/// Quantum backend trait
/// Gantree: BackendTrait // 백엔드 인터페이스
///
/// Implementations must be shareable across worker threads; calibration
/// dispatches one call per basis state, possibly concurrently.
pub trait Backend: Send + Sync {
    /// Get backend name
    fn name(&self) -> &str;

    /// Get number of qubits
    fn num_qubits(&self) -> usize;

    /// Execute a circuit
    /// Gantree: execute(circuit, shots) -> Result<ExecutionResult>
    fn execute(&self, circuit: &Circuit, shots: u64) -> QremResult<ExecutionResult>;

    /// Execute multiple circuits (batch)
    fn execute_batch(&self, circuits: &[Circuit], shots: u64) -> QremResult<Vec<ExecutionResult>> {
        circuits.iter().map(|c| self.execute(c, shots)).collect()
    }

    /// Label convention of returned counts
    fn bit_order(&self) -> BitOrder {
        BitOrder::MsbFirst
    }

    /// Check if backend is simulator
    fn is_simulator(&self) -> bool {
        true
    }

    /// Get maximum shots per execution
    fn max_shots(&self) -> u64 {
        limits::DEFAULT_MAX_SHOTS
    }
}

// ============================================================================
// Tests
// ============================================================================
