// src/model/suggester.rs
use super::features::{FeatureRow, Features, TrainingRow};
use super::regression::LinearRegression;
use crate::error::ModelError;

/// Suggests prices from demand, time and competitor price.
///
/// Each instance owns its fitted model; separate instances never share state.
#[derive(Clone, Debug, Default)]
pub struct PriceSuggester {
    model: LinearRegression,
}

impl PriceSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on feature rows and same-length actual prices.
    pub fn train(&mut self, features: &[FeatureRow], target: &[f64]) -> Result<(), ModelError> {
        self.model.fit(&Features::from(features), target)
    }

    /// Fit on rows that carry their own actual price.
    pub fn train_rows(&mut self, rows: &[TrainingRow]) -> Result<(), ModelError> {
        let (features, target): (Vec<FeatureRow>, Vec<f64>) =
            rows.iter().map(|r| (r.features, r.actual_price)).unzip();
        self.train(&features, &target)
    }

    /// One suggested price per row, unrounded.
    pub fn predict(&self, features: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        self.model.predict(&Features::from(features))
    }

    /// Train on the table, then price the same rows.
    pub fn suggest(&mut self, rows: &[TrainingRow]) -> Result<Vec<f64>, ModelError> {
        self.train_rows(rows)?;
        let features: Vec<FeatureRow> = rows.iter().map(|r| r.features).collect();
        self.predict(&features)
    }

    pub fn r_squared(&self, rows: &[TrainingRow]) -> Result<f64, ModelError> {
        let (features, target): (Vec<FeatureRow>, Vec<f64>) =
            rows.iter().map(|r| (r.features, r.actual_price)).unzip();
        self.model.r_squared(&Features::from(&features[..]), &target)
    }

    /// Underlying regression (coefficients, intercept, schema).
    pub fn model(&self) -> &LinearRegression {
        &self.model
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_trained()
    }
}
