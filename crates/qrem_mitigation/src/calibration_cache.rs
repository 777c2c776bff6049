//! Calibration matrix caching
//!
//! Gantree: L4_Mitigation → CalibrationCache
//!
//! A calibration matrix is measured once per backend and reused until its
//! time-to-live expires; a stale matrix is rebuilt instead of reused.

use crate::builder::CalibrationBuilder;
use crate::matrix::CalibrationMatrix;
use qrem_backend::Backend;
use qrem_core::QremResult;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Cached calibration entry
#[derive(Debug, Clone)]
struct CachedEntry {
    matrix: CalibrationMatrix,
    cached_at: Instant,
}

/// Calibration cache with TTL
/// Gantree: CalibrationCache // 캐싱
#[derive(Debug)]
pub struct CalibrationCache {
    /// Cache storage keyed by backend name
    /// Gantree: cache: HashMap<String,CachedEntry> // 캐시 저장소
    cache: Arc<RwLock<HashMap<String, CachedEntry>>>,

    /// Time-to-live
    ttl: Duration,
}

impl CalibrationCache {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create new cache with specified TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_ttl(Duration::from_secs(ttl_seconds))
    }

    /// Create cache with an arbitrary TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    // ========================================================================
    // Cache Operations
    // ========================================================================

    /// Get cached matrix if still valid
    /// Gantree: get(backend) -> Option<CalibrationMatrix> // 캐시 조회
    pub fn get(&self, backend: &str) -> Option<CalibrationMatrix> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(backend)?;

        if entry.cached_at.elapsed() < self.ttl {
            Some(entry.matrix.clone())
        } else {
            None
        }
    }

    /// Store matrix under its backend name
    /// Gantree: set(matrix) // 캐시 저장
    pub fn set(&self, matrix: CalibrationMatrix) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(
                matrix.backend().to_string(),
                CachedEntry {
                    matrix,
                    cached_at: Instant::now(),
                },
            );
        }
    }

    /// Invalidate cached matrix for backend
    /// Gantree: invalidate(backend) // 캐시 무효화
    pub fn invalidate(&self, backend: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(backend);
        }
    }

    /// Invalidate all cached matrices
    pub fn invalidate_all(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Check if cache entry is valid
    pub fn is_valid(&self, backend: &str) -> bool {
        self.get(backend).is_some()
    }

    /// Cached matrix for `backend`, or a freshly built one
    /// Gantree: get_or_build(backend, n, builder) -> Result<CalibrationMatrix> // 조회 또는 생성
    ///
    /// A cached matrix is reused only when it covers the same number of
    /// qubits in the label convention the builder resolves for `backend`.
    pub fn get_or_build<B: Backend + ?Sized>(
        &self,
        backend: &B,
        num_qubits: usize,
        builder: &CalibrationBuilder,
    ) -> QremResult<CalibrationMatrix> {
        if let Some(matrix) = self.get(backend.name()) {
            if matrix.num_qubits() == num_qubits
                && matrix.bit_order() == builder.resolve_bit_order(backend)
            {
                log::debug!("calibration cache hit for '{}'", backend.name());
                return Ok(matrix);
            }
        }

        let matrix = builder.build(backend, num_qubits)?;
        self.set(matrix.clone());
        Ok(matrix)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Get number of cached entries
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of cached backends
    pub fn cached_backends(&self) -> Vec<String> {
        self.cache
            .read()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Clean up expired entries
    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
        }
    }
}

impl Default for CalibrationCache {
    fn default() -> Self {
        Self::new(qrem_core::calibration::DEFAULT_CACHE_TTL_SECS)
    }
}

impl Clone for CalibrationCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
