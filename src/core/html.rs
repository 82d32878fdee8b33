// src/core/html.rs
// HTML lookups on top of `scraper`. Text is returned as the concatenation
// of all descendant text nodes, trimmed at both ends.

use scraper::{ElementRef, Html, Selector};

use crate::error::ConfigError;

pub fn compile_selector(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::Selector {
        selector: s!(css),
        reason: e.to_string(),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text of the first element matching `sel`, in document order.
pub fn first_text(doc: &str, sel: &Selector) -> Option<String> {
    let html = Html::parse_document(doc);
    html.select(sel).next().map(element_text)
}

/// Text of the first `<tag>` whose class list contains `class`.
/// Tag names compare case-insensitively; class names exactly.
pub fn first_text_by_class(doc: &str, tag: &str, class: &str) -> Option<String> {
    let html = Html::parse_document(doc);
    html.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            let v = el.value();
            v.name().eq_ignore_ascii_case(tag) && v.classes().any(|c| c == class)
        })
        .map(element_text)
}
