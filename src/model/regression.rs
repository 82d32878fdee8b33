// src/model/regression.rs
use nalgebra::{DMatrix, DVector};

use super::features::Features;
use crate::error::ModelError;

#[derive(Clone, Debug, PartialEq)]
struct Fit {
    columns: Vec<String>,
    coef: Vec<f64>,
    intercept: f64,
}

/// Ordinary least squares with an intercept. No regularisation.
///
/// Fitting centres each column and solves through the SVD pseudo-inverse,
/// so rank-deficient tables (collinear columns, fewer rows than columns)
/// get the minimum-norm coefficients rather than an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearRegression {
    fitted: Option<Fit>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.coef.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }

    /// Column schema the model was fitted on.
    pub fn columns(&self) -> Option<&[String]> {
        self.fitted.as_ref().map(|f| f.columns.as_slice())
    }

    /// Replace any previous fit. On error the previous fit is kept.
    pub fn fit(&mut self, x: &Features, y: &[f64]) -> Result<(), ModelError> {
        if x.n_rows() != y.len() {
            return Err(ModelError::invalid(format!(
                "{} feature rows but {} target values",
                x.n_rows(),
                y.len()
            )));
        }
        x.check_finite()?;
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::invalid(format!("target {i} is not a finite number")));
        }
        if x.distinct_rows() < 2 {
            return Err(ModelError::invalid("need at least 2 distinct rows to fit"));
        }

        let (n, p) = (x.n_rows(), x.n_cols());
        let rows = x.rows();

        let x_mean: Vec<f64> = (0..p)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n as f64;

        let xc = DMatrix::from_fn(n, p, |i, j| rows[i][j] - x_mean[j]);
        let yc = DVector::from_iterator(n, y.iter().map(|v| v - y_mean));

        let svd = xc.svd(true, true);
        let max_sv = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
        // Same cut-off numpy's lstsq uses by default.
        let eps = max_sv * n.max(p) as f64 * f64::EPSILON;
        let coef = svd.solve(&yc, eps).map_err(ModelError::invalid)?;
        let coef: Vec<f64> = coef.iter().copied().collect();

        let intercept = y_mean - x_mean.iter().zip(&coef).map(|(m, c)| m * c).sum::<f64>();

        logd!(columns = ?x.columns(), ?coef, intercept, "fitted linear model on {n} rows");

        self.fitted = Some(Fit { columns: x.columns().to_vec(), coef, intercept });
        Ok(())
    }

    /// `row · coef + intercept` for each row.
    pub fn predict(&self, x: &Features) -> Result<Vec<f64>, ModelError> {
        let fit = self.fitted.as_ref().ok_or(ModelError::NotTrained)?;
        if x.columns() != fit.columns.as_slice() {
            return Err(ModelError::invalid(format!(
                "feature schema {:?} does not match fitted schema {:?}",
                x.columns(),
                fit.columns
            )));
        }
        x.check_finite()?;

        Ok(x.rows()
            .iter()
            .map(|r| r.iter().zip(&fit.coef).map(|(v, c)| v * c).sum::<f64>() + fit.intercept)
            .collect())
    }

    /// Coefficient of determination of this model on (x, y).
    pub fn r_squared(&self, x: &Features, y: &[f64]) -> Result<f64, ModelError> {
        let pred = self.predict(x)?;
        if pred.len() != y.len() {
            return Err(ModelError::invalid(format!(
                "{} feature rows but {} target values",
                pred.len(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(ModelError::invalid("cannot score an empty table"));
        }
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let ss_res: f64 = y.iter().zip(&pred).map(|(a, b)| (a - b).powi(2)).sum();
        let ss_tot: f64 = y.iter().map(|a| (a - mean).powi(2)).sum();
        if ss_tot == 0.0 {
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }
}
