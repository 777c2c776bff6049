//! Dense linear algebra for calibration matrices
//!
//! Gantree: L4_Mitigation → Linalg
//!
//! Matrices are row-major `Vec<Vec<f64>>`; frequency vectors are row vectors.
//! Sizes stay at most 4096 x 4096, so plain Gauss-Jordan is sufficient.

/// Failed elimination step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotFailure {
    /// Column whose best pivot fell below tolerance
    pub column: usize,
    /// Magnitude of that pivot
    pub pivot: f64,
}

/// Successful inversion
#[derive(Debug, Clone, PartialEq)]
pub struct Inversion {
    /// The inverse matrix
    pub inverse: Vec<Vec<f64>>,
    /// Column with the smallest pivot magnitude
    pub weakest_column: usize,
    /// That pivot's magnitude
    pub weakest_pivot: f64,
}

/// Keeps the incumbent on ties
fn larger_pivot(best: (usize, f64), cur: (usize, f64)) -> (usize, f64) {
    if cur.1 > best.1 {
        cur
    } else {
        best
    }
}

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting
/// Gantree: invert(a, tol) -> Result<Inversion, PivotFailure> // 역행렬
#[allow(clippy::needless_range_loop)]
pub fn invert(matrix: &[Vec<f64>], tolerance: f64) -> Result<Inversion, PivotFailure> {
    let n = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut inv = identity(n);
    let (mut weakest_column, mut weakest_pivot) = (0, f64::INFINITY);

    for col in 0..n {
        let (pivot_row, pivot) = (col..n)
            .map(|r| (r, a[r][col].abs()))
            .fold((col, -1.0), larger_pivot);

        // NaN entries never win the fold
        if pivot < tolerance {
            return Err(PivotFailure {
                column: col,
                pivot: pivot.max(0.0),
            });
        }

        if pivot < weakest_pivot {
            weakest_column = col;
            weakest_pivot = pivot;
        }

        a.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let scale = 1.0 / a[col][col];
        for j in 0..n {
            a[col][j] *= scale;
            inv[col][j] *= scale;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Ok(Inversion {
        inverse: inv,
        weakest_column,
        weakest_pivot,
    })
}

/// Identity matrix
pub fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

/// Maximum absolute column sum
pub fn norm_1(matrix: &[Vec<f64>]) -> f64 {
    let n = matrix.first().map_or(0, Vec::len);
    (0..n)
        .map(|j| matrix.iter().map(|row| row[j].abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Maximum absolute row sum
pub fn norm_inf(matrix: &[Vec<f64>]) -> f64 {
    matrix
        .iter()
        .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// 1-norm condition number `‖A‖₁·‖A⁻¹‖₁`
pub fn condition_number(matrix: &[Vec<f64>], inverse: &[Vec<f64>]) -> f64 {
    norm_1(matrix) * norm_1(inverse)
}

/// Row vector times matrix: `out[j] = Σ_i v[i]·m[i][j]`
pub fn row_times_matrix(vector: &[f64], matrix: &[Vec<f64>]) -> Vec<f64> {
    let cols = matrix.first().map_or(0, Vec::len);
    let mut out = vec![0.0; cols];
    for (v, row) in vector.iter().zip(matrix) {
        if *v == 0.0 {
            continue;
        }
        for (o, m) in out.iter_mut().zip(row) {
            *o += v * m;
        }
    }
    out
}

/// Euclidean projection onto `{x ≥ 0, Σx = total}`
/// Gantree: project_simplex(y, total) // 단체 사영
pub fn project_simplex(y: &[f64], total: f64) -> Vec<f64> {
    if total <= 0.0 || y.is_empty() {
        return vec![0.0; y.len()];
    }

    let mut sorted = y.to_vec();
    sorted.sort_unstable_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (k, u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - total) / (k + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }

    y.iter().map(|v| (v - theta).max(0.0)).collect()
}

/// Minimise `‖x·C − v‖²` over `{x ≥ 0, Σx = Σv}` by projected gradient descent
/// Gantree: constrained_least_squares(c, v, x0) // 제약 최소제곱
pub fn constrained_least_squares(
    matrix: &[Vec<f64>],
    target: &[f64],
    start: &[f64],
    max_iterations: usize,
    tolerance: f64,
) -> Vec<f64> {
    let total: f64 = target.iter().sum();
    let mut x = project_simplex(start, total);

    // Lipschitz constant of the gradient, bounded by 2‖C‖₁‖C‖∞
    let lipschitz = 2.0 * norm_1(matrix) * norm_inf(matrix);
    if lipschitz == 0.0 {
        return x;
    }
    let step = 1.0 / lipschitz;
    let threshold = tolerance * total.max(1.0);

    for iteration in 0..max_iterations {
        let predicted = row_times_matrix(&x, matrix);
        let residual: Vec<f64> = predicted.iter().zip(target).map(|(p, t)| p - t).collect();

        let next: Vec<f64> = x
            .iter()
            .zip(matrix)
            .map(|(xi, row)| {
                let grad: f64 = row.iter().zip(&residual).map(|(c, r)| c * r).sum();
                xi - 2.0 * step * grad
            })
            .collect();
        let next = project_simplex(&next, total);

        let change = next
            .iter()
            .zip(&x)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        x = next;

        if change <= threshold {
            log::trace!("least squares converged after {} iterations", iteration + 1);
            break;
        }
    }

    x
}

// ============================================================================
// Tests
// ============================================================================
