// src/config/consts.rs

// Table schema
pub const DEMAND_COL: &str = "demand";
pub const TIME_COL: &str = "time";
pub const COMPETITOR_PRICE_COL: &str = "competitor_price";
pub const ACTUAL_PRICE_COL: &str = "actual_price";
pub const SUGGESTED_PRICE_COL: &str = "suggested_price";
pub const FEATURE_COLS: [&str; 3] = [DEMAND_COL, TIME_COL, COMPETITOR_PRICE_COL];

// Presentation
pub const DEFAULT_DECIMALS: u32 = 2;

// Scrape
pub const DEFAULT_PRICE_SELECTOR: &str = "span.price";
pub const USER_AGENT: &str = concat!("dynamic_pricing/", env!("CARGO_PKG_VERSION"));

// Export
pub const DEFAULT_SUGGEST_FILE: &str = "suggested_prices";
pub const DEFAULT_PRICES_FILE: &str = "competitor_prices";
pub const DEFAULT_SAMPLE_FILE: &str = "sample";

// Concurrency
pub const WORKERS: usize = 1; // sequential unless asked
pub const MAX_WORKERS: usize = 16;
