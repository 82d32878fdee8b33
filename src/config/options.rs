// src/config/options.rs
use std::path::{Path, PathBuf};

use super::consts::*;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AppOptions {
    pub suggest: SuggestOptions,
    pub fetch: FetchOptions,
    pub export: ExportOptions,
}

/* ---------------- Suggest ---------------- */

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum InputSource {
    /// Built-in five-row demo table.
    #[default]
    Sample,
    File(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SuggestOptions {
    pub input: InputSource,
}

/* ---------------- Fetch ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    /// CSS selector for the price marker element.
    pub selector: String,
    /// 1 = strictly sequential. Capped at `MAX_WORKERS` by the fetcher.
    pub workers: usize,
    /// Parse 4xx/5xx bodies instead of treating them as failures.
    pub parse_error_pages: bool,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            selector: s!(DEFAULT_PRICE_SELECTOR),
            workers: WORKERS,
            parse_error_pages: false,
            user_agent: s!(USER_AGENT),
        }
    }
}

impl FetchOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Workers);
        }
        Ok(())
    }
}

/* ---------------- Export ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> u8 {
        match self { ExportFormat::Csv => b',', ExportFormat::Tsv => b'\t' }
    }

    /// Format of an input file by extension: `.tsv`/`.tab` are tab separated,
    /// anything else is read as CSV.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("tsv") | Some("tab") => ExportFormat::Tsv,
            _ => ExportFormat::Csv,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// None = stdout.
    out: Option<PathBuf>,
    /// Rounding applied to suggested prices on export only.
    pub decimals: Option<u32>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            out: None,
            decimals: Some(DEFAULT_DECIMALS),
        }
    }
}

impl ExportOptions {
    pub fn set_path(&mut self, text: &str) {
        let s = text.trim();
        self.out = if s.is_empty() { None } else { Some(PathBuf::from(s)) };
    }

    pub fn raw_path(&self) -> Option<&Path> {
        self.out.as_deref()
    }

    /// Final file for this export, or None for stdout.
    /// A directory (existing, or hinted by a trailing separator) gets
    /// `<default_stem>.<ext>` inside it.
    pub fn out_path(&self, default_stem: &str) -> Option<PathBuf> {
        let p = self.out.as_ref()?;
        let file_name = format!("{default_stem}.{}", self.format.ext());
        if p.is_dir() || crate::file::looks_like_dir_hint(p) {
            Some(p.join(file_name))
        } else {
            Some(p.clone())
        }
    }
}
