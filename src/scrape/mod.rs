// src/scrape/mod.rs
//! Competitor price scraping.
//!
//! - `extract` knows how to read a price out of one page (`PriceRule`).
//! - `fetch`   runs a URL batch through a `PageSource` and a rule, one
//!   independent lookup per URL, and collects an ordered `PriceMap`.
//!
//! A URL that fails (network, status, missing marker) only ever turns into
//! an `Absent` entry; the batch itself cannot fail.
mod extract;
mod fetch;

pub use extract::{rule_for, CssPriceRule, PriceRule, SpanClassRule};
pub use fetch::{fetch_prices, Absence, Fetcher, PriceLookup, PriceMap};
