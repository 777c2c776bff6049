//! Basis-state labels and the label <-> index mapping
//!
//! Gantree: L0_Foundation → BasisIndexer
//!
//! In every convention the integer index of a basis state has bit `q` equal
//! to the state of qubit `q`. [`BitOrder`] only decides which character of
//! the label string holds which qubit:
//!
//! ```text
//! index 6 = qubits {1, 2} set, n = 3
//!   MsbFirst: "110"   (leftmost char = qubit 2)
//!   LsbFirst: "011"   (leftmost char = qubit 0)
//! ```
//!
//! [`BasisIndexer`] is the single place where labels become indices and back.

use crate::constants::limits;
use crate::error::{QremError, QremResult};
use crate::types::{Counts, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Character layout of a basis label
/// Gantree: BitOrder // 비트 순서
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BitOrder {
    /// Leftmost character is the highest qubit (plain binary of the index)
    #[default]
    MsbFirst,
    /// Leftmost character is qubit 0 (reversed binary of the index)
    LsbFirst,
}

impl BitOrder {
    /// The opposite convention
    pub fn reversed(self) -> Self {
        match self {
            BitOrder::MsbFirst => BitOrder::LsbFirst,
            BitOrder::LsbFirst => BitOrder::MsbFirst,
        }
    }

    /// Qubit held by character `position` of an `n`-character label
    #[inline]
    pub fn qubit_at(self, position: usize, num_qubits: usize) -> QubitId {
        match self {
            BitOrder::MsbFirst => num_qubits - 1 - position,
            BitOrder::LsbFirst => position,
        }
    }
}

impl fmt::Display for BitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitOrder::MsbFirst => write!(f, "msb-first"),
            BitOrder::LsbFirst => write!(f, "lsb-first"),
        }
    }
}

/// Bidirectional mapping between basis labels and matrix indices
/// Gantree: BasisIndexer // 라벨<->인덱스
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisIndexer {
    num_qubits: usize,
    bit_order: BitOrder,
}

impl BasisIndexer {
    /// Create an indexer for `num_qubits` qubits
    pub fn new(num_qubits: usize, bit_order: BitOrder) -> QremResult<Self> {
        if num_qubits == 0 || num_qubits > limits::MAX_LABEL_QUBITS {
            return Err(QremError::QubitOutOfRange {
                qubit: num_qubits,
                max: limits::MAX_LABEL_QUBITS,
            });
        }
        Ok(Self {
            num_qubits,
            bit_order,
        })
    }

    /// Number of qubits (label width)
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Label convention
    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// Number of basis states, 2^n
    pub fn dim(&self) -> usize {
        1usize << self.num_qubits
    }

    /// Format a basis index as a label
    /// Gantree: label(index) -> String // 인덱스→라벨
    pub fn label(&self, index: usize) -> QremResult<String> {
        if index >= self.dim() {
            return Err(QremError::OutOfRangeLabel {
                label: index.to_string(),
                num_qubits: self.num_qubits,
                context: format!("index exceeds {}", self.dim() - 1),
            });
        }
        let label = (0..self.num_qubits)
            .map(|pos| {
                let qubit = self.bit_order.qubit_at(pos, self.num_qubits);
                if (index >> qubit) & 1 == 1 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect();
        Ok(label)
    }

    /// Parse a label into a basis index
    /// Gantree: index(label) -> usize // 라벨→인덱스
    pub fn index(&self, label: &str) -> QremResult<usize> {
        let width = label.chars().count();
        if width != self.num_qubits {
            return Err(QremError::OutOfRangeLabel {
                label: label.to_string(),
                num_qubits: self.num_qubits,
                context: format!("width {} != {}", width, self.num_qubits),
            });
        }

        let mut index = 0usize;
        for (pos, c) in label.chars().enumerate() {
            match c {
                '0' => {}
                '1' => index |= 1 << self.bit_order.qubit_at(pos, self.num_qubits),
                other => {
                    return Err(QremError::OutOfRangeLabel {
                        label: label.to_string(),
                        num_qubits: self.num_qubits,
                        context: format!("invalid character '{}'", other),
                    })
                }
            }
        }
        Ok(index)
    }

    /// All labels in index order
    pub fn labels(&self) -> Vec<String> {
        (0..self.dim()).filter_map(|i| self.label(i).ok()).collect()
    }

    /// Dense frequency vector from a frequency table (0 for absent labels)
    /// Gantree: counts_to_vector(counts) -> Vec<f64> // 빈도 벡터
    pub fn counts_to_vector(&self, counts: &Counts) -> QremResult<Vec<f64>> {
        let mut vector = vec![0.0; self.dim()];
        for (label, &count) in counts {
            vector[self.index(label)?] += count as f64;
        }
        Ok(vector)
    }

    /// Label-keyed map from a dense vector
    pub fn vector_to_map(&self, vector: &[f64]) -> QremResult<BTreeMap<String, f64>> {
        if vector.len() != self.dim() {
            return Err(QremError::DimensionMismatch {
                expected: self.dim(),
                actual: vector.len(),
            });
        }
        vector
            .iter()
            .enumerate()
            .map(|(i, &v)| Ok((self.label(i)?, v)))
            .collect()
    }
}

/// Number of qubits on which two basis indices differ
#[inline]
pub fn hamming_distance(a: usize, b: usize) -> u32 {
    (a ^ b).count_ones()
}

// ============================================================================
// Tests
// ============================================================================
