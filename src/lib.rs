// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod model;
pub mod scrape;

pub mod file;
pub mod progress;
pub mod store;

pub use error::{ConfigError, FetchError, ModelError, TableError};
pub use model::{FeatureRow, Features, LinearRegression, PriceSuggester, TrainingRow};
pub use scrape::{fetch_prices, Absence, PriceLookup, PriceMap};
pub use store::DataSet;
