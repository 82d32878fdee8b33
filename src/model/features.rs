// src/model/features.rs
use std::collections::HashSet;

use crate::config::consts::FEATURE_COLS;
use crate::error::ModelError;

/// The (demand, time, competitor_price) triple a price is predicted from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureRow {
    pub demand: f64,
    pub time: f64,
    pub competitor_price: f64,
}

impl FeatureRow {
    pub fn new(demand: f64, time: f64, competitor_price: f64) -> Self {
        Self { demand, time, competitor_price }
    }

    /// Values in `FEATURE_COLS` order.
    pub fn values(&self) -> [f64; 3] {
        [self.demand, self.time, self.competitor_price]
    }
}

/// A feature row with its observed price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingRow {
    pub features: FeatureRow,
    pub actual_price: f64,
}

impl TrainingRow {
    pub fn new(demand: f64, time: f64, competitor_price: f64, actual_price: f64) -> Self {
        Self {
            features: FeatureRow::new(demand, time, competitor_price),
            actual_price,
        }
    }
}

/// Row-major numeric matrix with named columns.
/// Column names and order are the schema a fitted model is pinned to.
#[derive(Clone, Debug, PartialEq)]
pub struct Features {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Features {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, ModelError> {
        if columns.is_empty() {
            return Err(ModelError::invalid("feature table has no columns"));
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(ModelError::invalid(format!("duplicate column `{c}`")));
            }
        }
        for (i, r) in rows.iter().enumerate() {
            if r.len() != columns.len() {
                return Err(ModelError::invalid(format!(
                    "row {i} has {} values, expected {}",
                    r.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] { &self.columns }
    pub fn rows(&self) -> &[Vec<f64>] { &self.rows }
    pub fn n_rows(&self) -> usize { self.rows.len() }
    pub fn n_cols(&self) -> usize { self.columns.len() }

    /// Every cell must be a finite number.
    pub fn check_finite(&self) -> Result<(), ModelError> {
        for (i, r) in self.rows.iter().enumerate() {
            for (j, v) in r.iter().enumerate() {
                if !v.is_finite() {
                    return Err(ModelError::invalid(format!(
                        "row {i}, column `{}`: {v} is not a finite number",
                        self.columns[j]
                    )));
                }
            }
        }
        Ok(())
    }

    /// Count of distinct rows (bitwise, with -0.0 folded into 0.0).
    pub fn distinct_rows(&self) -> usize {
        self.rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|v| if *v == 0.0 { 0u64 } else { v.to_bits() })
                    .collect::<Vec<_>>()
            })
            .collect::<HashSet<_>>()
            .len()
    }
}

impl From<&[FeatureRow]> for Features {
    fn from(rows: &[FeatureRow]) -> Self {
        Self {
            columns: FEATURE_COLS.iter().map(|c| s!(*c)).collect(),
            rows: rows.iter().map(|r| r.values().to_vec()).collect(),
        }
    }
}
