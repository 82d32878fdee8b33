// src/scrape/extract.rs
use scraper::Selector;

use crate::config::consts::DEFAULT_PRICE_SELECTOR;
use crate::core::html;
use crate::error::ConfigError;

/// How a price is located in a fetched page.
///
/// Only site-agnostic rules exist. Competitor sites that do not mark prices
/// with a common element need their own rule; per-domain dispatch is not
/// implemented.
pub trait PriceRule: Send + Sync {
    /// Trimmed text of the price marker, or None when the page has none.
    fn extract(&self, html: &str) -> Option<String>;

    fn describe(&self) -> String;
}

/// First `<span>` carrying class `price`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanClassRule {
    tag: String,
    class: String,
}

impl SpanClassRule {
    pub fn new(tag: &str, class: &str) -> Self {
        Self { tag: s!(tag), class: s!(class) }
    }
}

impl Default for SpanClassRule {
    fn default() -> Self {
        Self::new("span", "price")
    }
}

impl PriceRule for SpanClassRule {
    fn extract(&self, doc: &str) -> Option<String> {
        html::first_text_by_class(doc, &self.tag, &self.class)
    }

    fn describe(&self) -> String {
        format!("{}.{}", self.tag, self.class)
    }
}

/// First element matching an arbitrary CSS selector.
#[derive(Clone, Debug)]
pub struct CssPriceRule {
    css: String,
    selector: Selector,
}

impl CssPriceRule {
    pub fn new(css: &str) -> Result<Self, ConfigError> {
        Ok(Self { css: s!(css), selector: html::compile_selector(css)? })
    }
}

impl PriceRule for CssPriceRule {
    fn extract(&self, doc: &str) -> Option<String> {
        html::first_text(doc, &self.selector)
    }

    fn describe(&self) -> String {
        self.css.clone()
    }
}

/// Rule for a user-supplied selector; the default selector maps to `SpanClassRule`.
pub fn rule_for(css: &str) -> Result<Box<dyn PriceRule>, ConfigError> {
    if css.trim() == DEFAULT_PRICE_SELECTOR {
        return Ok(Box::new(SpanClassRule::default()));
    }
    Ok(Box::new(CssPriceRule::new(css.trim())?))
}
