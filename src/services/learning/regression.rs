/// Ridge regression over standardized features.
///
/// Small closed-form solve: the feature count is at most five, so the normal
/// equations with an L2 penalty are solved directly with Gaussian
/// elimination rather than pulling in a linear-algebra backend.
use ndarray::{Array1, Array2, Axis};

/// Result of one ridge fit.
#[derive(Debug, Clone)]
pub struct RidgeFit {
    /// Coefficients in standardized feature space, one per input column.
    /// This is also the space the persisted weight vector lives in.
    pub coefficients: Vec<f64>,
    /// Intercept; equals the target mean once columns are standardized.
    pub intercept: f64,
    pub diagnostics: Diagnostics,
}

/// Training-set fit quality, logged after every run.
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
}

/// Fit `y ≈ Xw + b` with penalty `α‖w‖²`.
///
/// Columns are standardized to zero mean and unit variance before the solve;
/// a zero-variance column is left unscaled. With zero columns the fit
/// degrades to an intercept-only model.
pub fn ridge_fit(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> RidgeFit {
    let p = x.ncols();
    let y_mean = y.mean().unwrap_or(0.0);

    if p == 0 {
        let predicted = Array1::from_elem(y.len(), y_mean);
        return RidgeFit {
            coefficients: Vec::new(),
            intercept: y_mean,
            diagnostics: diagnostics(y, &predicted),
        };
    }

    let xs = standardize(x);

    // Normal equations: (XᵀX + αI) w = Xᵀ(y − ȳ)
    let xt = xs.t();
    let mut gram = xt.dot(&xs);
    for i in 0..p {
        gram[[i, i]] += alpha;
    }
    let centered = y.mapv(|v| v - y_mean);
    let rhs = xt.dot(&centered);
    let coefficients = solve(gram, rhs);

    let predicted = xs.dot(&Array1::from(coefficients.clone())) + y_mean;

    RidgeFit {
        coefficients,
        intercept: y_mean,
        diagnostics: diagnostics(y, &predicted),
    }
}

/// Zero mean, unit variance per column (population variance, matching the
/// usual scaler convention). A constant column keeps scale 1.
fn standardize(x: &Array2<f64>) -> Array2<f64> {
    let mut xs = x.clone();
    for mut col in xs.axis_iter_mut(Axis(1)) {
        let mean = col.mean().unwrap_or(0.0);
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len().max(1) as f64;
        let std = var.sqrt();
        let scale = if std > 0.0 { std } else { 1.0 };
        col.mapv_inplace(|v| (v - mean) / scale);
    }
    xs
}

/// Gaussian elimination with partial pivoting. The ridge term keeps the
/// system away from singularity for any α > 0.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Vec<f64> {
    let n = b.len();

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[[row, col]].abs() > a[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if pivot != col {
            for k in 0..n {
                let tmp = a[[col, k]];
                a[[col, k]] = a[[pivot, k]];
                a[[pivot, k]] = tmp;
            }
            b.swap(col, pivot);
        }

        let diag = a[[col, col]];
        if diag.abs() < f64::EPSILON {
            continue;
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / diag;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in col + 1..n {
            sum -= a[[col, k]] * x[k];
        }
        let diag = a[[col, col]];
        x[col] = if diag.abs() < f64::EPSILON {
            0.0
        } else {
            sum / diag
        };
    }
    x
}

fn diagnostics(y: &Array1<f64>, predicted: &Array1<f64>) -> Diagnostics {
    let n = y.len().max(1) as f64;
    let y_mean = y.mean().unwrap_or(0.0);

    let ss_res: f64 = y
        .iter()
        .zip(predicted.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();

    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res > 0.0 {
        0.0
    } else {
        1.0
    };
    let rmse = (ss_res / n).sqrt();
    let mae = y
        .iter()
        .zip(predicted.iter())
        .map(|(a, b)| (a - b).abs())
        .sum::<f64>()
        / n;

    Diagnostics { r2, rmse, mae }
}
