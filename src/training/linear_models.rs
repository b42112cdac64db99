//! Linear model implementations

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Adds a small ridge once if the matrix turns out not to be positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    if let Some(x) = cholesky_solve_inner(a, b) {
        return Some(x);
    }

    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
    let mut a_reg = a.clone();
    for k in 0..n {
        a_reg[[k, k]] += ridge.max(1e-12);
    }
    cholesky_solve_inner(&a_reg, b)
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Matrix inversion by Gauss-Jordan elimination with partial pivoting (fallback)
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.slice(ndarray::s![.., n..]).to_owned())
}

/// Solve least squares via normal equations: (X^T X) w = X^T y
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    if let Some(result) = cholesky_solve(&xtx, &xty) {
        return Some(result);
    }

    matrix_inverse(&xtx).map(|inv| inv.dot(&xty))
}

fn check_lengths(x: &Array2<f64>, y_len: usize) -> Result<()> {
    if x.nrows() != y_len {
        return Err(Error::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y_len),
        });
    }
    if x.nrows() == 0 {
        return Err(Error::InsufficientData);
    }
    Ok(())
}

/// Ordinary least squares linear regression with an intercept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
        }
    }

    /// Fit the model to training data.
    ///
    /// Solves on centred data and recovers the intercept from the means.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_lengths(x, y.len())?;

        let x_mean = x.mean_axis(Axis(0)).ok_or(Error::InsufficientData)?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = x - &x_mean.view().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let coefficients = solve_least_squares(&x_centered, &y_centered).ok_or_else(|| {
            Error::TrainingError("Matrix is singular, cannot solve least squares".to_string())
        })?;

        self.intercept = Some(y_mean - coefficients.dot(&x_mean));
        self.coefficients = Some(coefficients);
        Ok(self)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(Error::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(Error::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }
}

/// Multinomial logistic regression trained by full-batch gradient descent
/// on the L2-penalised cross-entropy.
///
/// Targets are class codes `0..n_classes` stored as `f64`. The penalty
/// follows the `C` convention: the objective is
/// `C * sum(loss) + 0.5 * ||W||^2`, scaled by `1 / (C * n)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted weights, one column per class
    pub coefficients: Option<Array2<f64>>,
    /// Fitted per-class intercepts
    pub intercept: Option<Array1<f64>>,
    /// Inverse regularisation strength
    pub c: f64,
    /// Maximum gradient steps
    pub max_iter: usize,
    /// Gradient-norm tolerance for early stop
    pub tol: f64,
    /// Step size
    pub learning_rate: f64,
    /// Steps actually taken by the last fit
    pub n_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c: 1.0,
            max_iter: 200,
            tol: 1e-6,
            learning_rate: 0.5,
            n_iter: 0,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Row-wise softmax, shifted by the row max for stability
    fn softmax(mut logits: Array2<f64>) -> Array2<f64> {
        for mut row in logits.rows_mut() {
            let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        logits
    }

    /// Fit the model using gradient descent
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_lengths(x, y.len())?;
        if self.c <= 0.0 {
            return Err(Error::TrainingError(format!("C must be positive, got {}", self.c)));
        }

        let codes: Vec<usize> = y
            .iter()
            .map(|&v| {
                if v >= 0.0 && v.fract() == 0.0 {
                    Ok(v as usize)
                } else {
                    Err(Error::TrainingError(format!("invalid class code {}", v)))
                }
            })
            .collect::<Result<_>>()?;

        let n_classes = codes.iter().copied().max().unwrap_or(0) + 1;
        let distinct = {
            let mut seen = vec![false; n_classes];
            codes.iter().for_each(|&c| seen[c] = true);
            seen.iter().filter(|s| **s).count()
        };
        if distinct < 2 {
            return Err(Error::TrainingError(
                "This solver needs samples of at least 2 classes in the data".to_string(),
            ));
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let mut one_hot = Array2::<f64>::zeros((n_samples, n_classes));
        for (i, &c) in codes.iter().enumerate() {
            one_hot[[i, c]] = 1.0;
        }

        let mut weights = Array2::<f64>::zeros((n_features, n_classes));
        let mut bias = Array1::<f64>::zeros(n_classes);
        let penalty = 1.0 / (self.c * n_samples as f64);
        let lr = self.learning_rate;

        self.n_iter = 0;
        for _ in 0..self.max_iter {
            let probs = Self::softmax(x.dot(&weights) + &bias);
            let errors = probs - &one_hot;

            let dw = x.t().dot(&errors) / n_samples as f64 + &weights * penalty;
            let db = errors.mean_axis(Axis(0)).ok_or(Error::InsufficientData)?;

            self.n_iter += 1;
            let grad_norm = (dw.mapv(|v| v * v).sum() + db.mapv(|v| v * v).sum()).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - dw * lr;
            bias = bias - db * lr;
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        Ok(self)
    }

    /// Class probabilities, one column per class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (weights, bias) = match (&self.coefficients, &self.intercept) {
            (Some(w), Some(b)) => (w, b),
            _ => return Err(Error::ModelNotFitted),
        };
        if x.ncols() != weights.nrows() {
            return Err(Error::ShapeError {
                expected: format!("{} features", weights.nrows()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(Self::softmax(x.dot(weights) + bias))
    }

    /// Most probable class code for each row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0usize, f64::NEG_INFINITY), |best, (i, &p)| {
                        if p > best.1 { (i, p) } else { best }
                    })
                    .0 as f64
            })
            .collect())
    }

    pub fn n_classes(&self) -> usize {
        self.intercept.as_ref().map(|b| b.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_regression_recovers_plane() {
        let x = Array2::from_shape_fn((20, 2), |(i, j)| ((i * 7 + j * 3) % 11) as f64 + j as f64 * 0.5);
        let y = x.column(0).mapv(|v| 2.0 * v) + x.column(1).mapv(|v| -3.0 * v) + 1.5;

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-6);
        assert!((coef[1] + 3.0).abs() < 1e-6);
        assert!((model.intercept.unwrap() - 1.5).abs() < 1e-6);

        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linear_regression_shape_mismatch() {
        let mut model = LinearRegression::new();
        let err = model.fit(&array![[1.0], [2.0]], &array![1.0]).unwrap_err();
        assert!(matches!(err, Error::ShapeError { .. }));
    }

    #[test]
    fn test_predict_before_fit() {
        assert!(matches!(
            LinearRegression::new().predict(&array![[1.0]]),
            Err(Error::ModelNotFitted)
        ));
        assert!(matches!(
            LogisticRegression::new().predict(&array![[1.0]]),
            Err(Error::ModelNotFitted)
        ));
    }

    #[test]
    fn test_logistic_regression_binary() {
        let x = array![[-2.0], [-1.5], [-1.0], [-0.8], [0.8], [1.0], [1.5], [2.0]];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.n_classes(), 2);
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_logistic_regression_three_classes() {
        // Three well separated blobs on a 2-d plane
        let centers = [(-3.0, 0.0), (0.0, 3.0), (3.0, 0.0)];
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (class, (cx, cy)) in centers.iter().enumerate() {
            for k in 0..10 {
                let jitter = (k as f64 - 4.5) * 0.05;
                rows.push([cx + jitter, cy - jitter]);
                labels.push(class as f64);
            }
        }
        let x = Array2::from_shape_fn((rows.len(), 2), |(i, j)| rows[i][j]);
        let y = Array1::from_vec(labels);

        let mut model = LogisticRegression::new().with_max_iter(1000);
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_logistic_regression_single_class() {
        let mut model = LogisticRegression::new();
        let err = model.fit(&array![[1.0], [2.0]], &array![1.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::TrainingError(_)));
    }
}
