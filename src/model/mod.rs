// src/model/mod.rs
//! Price suggestion by ordinary least squares.
//!
//! - `features`   typed rows plus the named-column matrix the regression eats.
//! - `regression` generic multi-column OLS fit/predict with schema checks.
//! - `suggester`  the three-predictor pricing wrapper used by front ends.
//!
//! Nothing here touches files or the network; tables come in through
//! `store::DataSet::training_rows`.
mod features;
mod regression;
mod suggester;

pub use features::{FeatureRow, Features, TrainingRow};
pub use regression::LinearRegression;
pub use suggester::PriceSuggester;
