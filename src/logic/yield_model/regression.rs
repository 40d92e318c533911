use crate::error::{CropwiseError, Result};
use serde::{Deserialize, Serialize};

/// L2-regularised linear regression over standardised features.
///
/// Inputs are expected centred (see `StandardScaler`), so the intercept is the
/// target mean and is not penalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl RidgeRegression {
    /// Solve `(XᵀX + λI) w = Xᵀ(y - ȳ)`.
    pub fn fit(x: &[Vec<f64>], y: &[f64], lambda: f64) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(CropwiseError::InvalidData(format!(
                "regression needs matching non-empty inputs, got {} rows and {} targets",
                x.len(),
                y.len()
            )));
        }
        let width = x[0].len();
        let intercept = y.iter().sum::<f64>() / y.len() as f64;

        let mut gram = vec![vec![0.0; width]; width];
        let mut rhs = vec![0.0; width];
        for (row, target) in x.iter().zip(y) {
            let centred = target - intercept;
            for i in 0..width {
                rhs[i] += row[i] * centred;
                for j in 0..width {
                    gram[i][j] += row[i] * row[j];
                }
            }
        }
        for (i, row) in gram.iter_mut().enumerate() {
            row[i] += lambda;
        }

        let coefficients = solve(gram, rhs)?;
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, v)| w * v)
                .sum::<f64>()
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(CropwiseError::InvalidData(
                "singular system; try a larger ridge_lambda".into(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}
