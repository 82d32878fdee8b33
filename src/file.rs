// src/file.rs

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::config::options::ExportOptions;
use crate::error::TableError;
use crate::scrape::PriceMap;
use crate::store::DataSet;

/// Write a table per ExportOptions: to the resolved file, or stdout when no
/// path was given. Returns the path written to, if any.
pub fn export_dataset(
    export: &ExportOptions,
    default_stem: &str,
    ds: &DataSet,
) -> Result<Option<PathBuf>, TableError> {
    let contents = ds.to_export_string(export.format.delim())?;
    write_output(export.out_path(default_stem).as_deref(), &contents)
}

/// Render a price map as `url,price,status`. Absent prices leave the price
/// cell empty; `status` tells an empty price apart from a missing one.
pub fn prices_to_dataset(prices: &PriceMap) -> DataSet {
    DataSet {
        headers: svec!["url", "price", "status"],
        rows: prices
            .iter()
            .map(|(url, res)| vec![url.clone(), s!(res.price().unwrap_or("")), res.status_label()])
            .collect(),
    }
}

/// `Some(path)` → create parent dirs and write; `None` → stdout.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<Option<PathBuf>, TableError> {
    match path {
        Some(p) => {
            if let Some(parent) = p.parent() {
                if !parent.as_os_str().is_empty() {
                    ensure_directory(parent)?;
                }
            }
            fs::write(p, contents)?;
            logf!("wrote {}", p.display());
            Ok(Some(p.to_path_buf()))
        }
        None => {
            let mut out = io::stdout().lock();
            out.write_all(contents.as_bytes())?;
            out.flush()?;
            Ok(None)
        }
    }
}

/// One URL per line; surrounding whitespace trimmed, blank lines dropped.
pub fn parse_url_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

pub fn read_url_list(path: &Path) -> io::Result<Vec<String>> {
    Ok(parse_url_lines(&fs::read_to_string(path)?))
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}
