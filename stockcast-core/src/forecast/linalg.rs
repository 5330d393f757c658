//! Dense least-squares helpers for small systems.

/// Row-major square matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn add(&mut self, i: usize, j: usize, v: f64) {
        self.data[i * self.n + j] += v;
    }
}

/// Accumulates `XᵀX` and `Xᵀy` one design row at a time.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    xtx: Matrix,
    xty: Vec<f64>,
}

impl NormalEquations {
    pub fn new(n_features: usize) -> Self {
        Self {
            xtx: Matrix::zeros(n_features),
            xty: vec![0.0; n_features],
        }
    }

    pub fn push(&mut self, row: &[f64], y: f64) {
        let n = self.xty.len();
        debug_assert_eq!(row.len(), n);
        for i in 0..n {
            if row[i] == 0.0 {
                continue;
            }
            self.xty[i] += row[i] * y;
            for j in i..n {
                self.xtx.add(i, j, row[i] * row[j]);
            }
        }
    }

    /// Solve `(XᵀX + diag(penalty)) β = Xᵀy`. `None` if the system is not positive definite.
    pub fn solve_ridge(&self, penalty: &[f64]) -> Option<Vec<f64>> {
        let n = self.xty.len();
        let mut a = Matrix::zeros(n);
        for i in 0..n {
            for j in i..n {
                let v = self.xtx.get(i, j);
                a.add(i, j, v);
                if i != j {
                    a.add(j, i, v);
                }
            }
            a.add(i, i, penalty.get(i).copied().unwrap_or(0.0));
        }
        cholesky_solve(&a, &self.xty)
    }
}

/// Solve `A x = b` for symmetric positive definite `A`.
pub fn cholesky_solve(a: &Matrix, b: &[f64]) -> Option<Vec<f64>> {
    let n = a.size();
    if b.len() != n {
        return None;
    }

    // Lower-triangular L with A = L Lᵀ
    let mut l = Matrix::zeros(n);
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a.get(i, j);
            for k in 0..j {
                sum -= l.get(i, k) * l.get(j, k);
            }
            if i == j {
                if !sum.is_finite() || sum <= f64::EPSILON * a.get(i, i).abs() {
                    return None;
                }
                l.add(i, j, sum.sqrt());
            } else {
                l.add(i, j, sum / l.get(j, j));
            }
        }
    }

    // Forward: L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l.get(i, k) * z[k];
        }
        z[i] = sum / l.get(i, i);
    }

    // Backward: Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l.get(k, i) * x[k];
        }
        x[i] = sum / l.get(i, i);
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_two_by_two() {
        let mut a = Matrix::zeros(2);
        a.add(0, 0, 4.0);
        a.add(0, 1, 2.0);
        a.add(1, 0, 2.0);
        a.add(1, 1, 3.0);
        let x = cholesky_solve(&a, &[10.0, 8.0]).unwrap();
        // 4x + 2y = 10, 2x + 3y = 8 -> x = 1.75, y = 1.5
        assert!((x[0] - 1.75).abs() < 1e-12);
        assert!((x[1] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn least_squares_line() {
        let mut eq = NormalEquations::new(2);
        for t in 0..10 {
            let t = t as f64;
            eq.push(&[1.0, t], 3.0 + 2.0 * t);
        }
        let beta = eq.solve_ridge(&[0.0, 0.0]).unwrap();
        assert!((beta[0] - 3.0).abs() < 1e-9);
        assert!((beta[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn singular_without_penalty() {
        let mut eq = NormalEquations::new(2);
        eq.push(&[1.0, 1.0], 1.0);
        eq.push(&[2.0, 2.0], 2.0);
        assert!(eq.solve_ridge(&[0.0, 0.0]).is_none());
        assert!(eq.solve_ridge(&[1e-6, 1e-6]).is_some());
    }
}
