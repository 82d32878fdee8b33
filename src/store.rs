// src/store.rs
//
// In-memory pricing table plus its CSV/TSV round trip.
// Cells stay as strings so columns the model ignores survive export untouched.
use std::{fs::File, io::{Read, Write}, path::Path};

use crate::config::consts::*;
use crate::error::TableError;
use crate::model::TrainingRow;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataSet {
    /// The demo table the app starts with when nothing is uploaded.
    pub fn sample() -> Self {
        let rows = [
            ["100", "1", "10", "11"],
            ["150", "2", "12", "13"],
            ["200", "3", "11", "12"],
            ["250", "4", "13", "14"],
            ["300", "5", "12", "13"],
        ];
        Self {
            headers: svec![DEMAND_COL, TIME_COL, COMPETITOR_PRICE_COL, ACTUAL_PRICE_COL],
            rows: rows.iter().map(|r| r.iter().map(|c| s!(*c)).collect()).collect(),
        }
    }

    /* ---------------- Reading ---------------- */

    /// Parse a headed table. Ragged rows are an error. Header names are
    /// trimmed; cells are kept verbatim and numbers trimmed when parsed.
    pub fn read_from<R: Read>(reader: R, delim: u8) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for rec in rdr.records() {
            let rec = rec?;
            rows.push(rec.iter().map(|c| c.to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn load(path: &Path, delim: u8) -> Result<Self, TableError> {
        let file = File::open(path)?;
        let ds = Self::read_from(file, delim)?;
        logf!("loaded {} rows x {} columns from {}", ds.rows.len(), ds.headers.len(), path.display());
        Ok(ds)
    }

    /* ---------------- Writing ---------------- */

    pub fn write_to<W: Write>(&self, writer: W, delim: u8) -> Result<(), TableError> {
        let mut wtr = csv::WriterBuilder::new().delimiter(delim).from_writer(writer);
        wtr.write_record(&self.headers)?;
        for r in &self.rows {
            wtr.write_record(r)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_export_string(&self, delim: u8) -> Result<String, TableError> {
        let mut buf: Vec<u8> = Vec::new();
        self.write_to(&mut buf, delim)?;
        Ok(match String::from_utf8(buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
        })
    }

    /* ---------------- Columns ---------------- */

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Indices of `names`, or every missing name at once.
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>, TableError> {
        let mut found = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for n in names {
            match self.column_index(n) {
                Some(i) => found.push(i),
                None => missing.push(s!(*n)),
            }
        }
        if !missing.is_empty() {
            return Err(TableError::MissingColumns(missing));
        }
        Ok(found)
    }

    /// Typed training rows from the four required columns.
    /// Row numbers in errors are 1-based data rows (header excluded).
    pub fn training_rows(&self) -> Result<Vec<TrainingRow>, TableError> {
        let ix = self.require_columns(&[DEMAND_COL, TIME_COL, COMPETITOR_PRICE_COL, ACTUAL_PRICE_COL])?;

        let mut out = Vec::with_capacity(self.rows.len());
        for (r, row) in self.rows.iter().enumerate() {
            let mut vals = [0.0f64; 4];
            for (slot, &c) in vals.iter_mut().zip(&ix) {
                *slot = parse_number(row.get(c).map(|s| s.as_str()).unwrap_or(""))
                    .ok_or_else(|| TableError::NotNumeric {
                        row: r + 1,
                        column: self.headers[c].clone(),
                        value: row.get(c).cloned().unwrap_or_default(),
                    })?;
            }
            out.push(TrainingRow::new(vals[0], vals[1], vals[2], vals[3]));
        }
        Ok(out)
    }

    /// Append `name` as the last column, or overwrite it in place if present.
    pub fn with_column(mut self, name: &str, values: Vec<String>) -> Result<Self, TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                column: s!(name),
                expected: self.rows.len(),
                got: values.len(),
            });
        }
        match self.column_index(name) {
            Some(i) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    if row.len() <= i { row.resize(i + 1, s!()); }
                    row[i] = v;
                }
            }
            None => {
                self.headers.push(s!(name));
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        Ok(self)
    }

    /// Attach model output as `suggested_price`, rounded for presentation.
    pub fn with_suggested_prices(self, prices: &[f64], decimals: Option<u32>) -> Result<Self, TableError> {
        let cells = prices.iter().map(|p| format_price(*p, decimals)).collect();
        self.with_column(SUGGESTED_PRICE_COL, cells)
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let f = 10f64.powi(decimals as i32);
    (value * f).round_ties_even() / f
}

pub fn format_price(value: f64, decimals: Option<u32>) -> String {
    match decimals {
        Some(d) => {
            let r = round_to(value, d);
            // avoid "-0.00"
            let r = if r == 0.0 { 0.0 } else { r };
            format!("{:.*}", d as usize, r)
        }
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_required_columns() {
        let ds = DataSet::sample();
        let rows = ds.training_rows().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], TrainingRow::new(100.0, 1.0, 10.0, 11.0));
    }

    #[test]
    fn missing_columns_all_named() {
        let ds = DataSet { headers: svec!["demand", "price"], rows: vec![] };
        match ds.training_rows() {
            Err(TableError::MissingColumns(m)) => {
                assert_eq!(m, svec!["time", "competitor_price", "actual_price"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cell_reports_row_and_column() {
        let mut ds = DataSet::sample();
        ds.rows[2][1] = s!("three");
        match ds.training_rows() {
            Err(TableError::NotNumeric { row, column, value }) => {
                assert_eq!(row, 3);
                assert_eq!(column, "time");
                assert_eq!(value, "three");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nan_and_empty_cells_are_not_numbers() {
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("1e2"), Some(100.0));
    }

    #[test]
    fn columns_found_in_any_order() {
        let csv_text = "actual_price,note,competitor_price,time,demand\n11,a,10,1,100\n";
        let ds = DataSet::read_from(csv_text.as_bytes(), b',').unwrap();
        let rows = ds.training_rows().unwrap();
        assert_eq!(rows[0], TrainingRow::new(100.0, 1.0, 10.0, 11.0));
    }

    #[test]
    fn with_column_appends_then_replaces() {
        let ds = DataSet::sample()
            .with_column("suggested_price", svec!["1", "2", "3", "4", "5"])
            .unwrap();
        assert_eq!(ds.headers.last().unwrap(), "suggested_price");
        assert_eq!(ds.rows[4][4], "5");

        let ds = ds.with_column("suggested_price", svec!["a", "b", "c", "d", "e"]).unwrap();
        assert_eq!(ds.headers.len(), 5);
        assert_eq!(ds.rows[0][4], "a");
    }

    #[test]
    fn with_column_length_checked() {
        let err = DataSet::sample().with_column("x", svec!["1"]).unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { expected: 5, got: 1, .. }));
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(12.346, Some(2)), "12.35");
        assert_eq!(format_price(11.0, Some(2)), "11.00");
        assert_eq!(format_price(-0.001, Some(2)), "0.00");
        assert_eq!(format_price(13.5, None), "13.5");
        assert_eq!(round_to(2.675, 0), 3.0);
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(format_price(0.125, Some(2)), "0.12");
        assert_eq!(format_price(0.375, Some(2)), "0.38");
    }

    #[test]
    fn padded_extra_cells_kept_verbatim() {
        let text = "demand,time,competitor_price,actual_price,note
 100 ,1,10,11,  padded  
";
        let ds = DataSet::read_from(text.as_bytes(), b',').unwrap();
        assert_eq!(ds.rows[0][4], "  padded  ");
        assert_eq!(ds.training_rows().unwrap()[0], TrainingRow::new(100.0, 1.0, 10.0, 11.0));
        assert_eq!(ds.to_export_string(b',').unwrap(), text);
    }

    #[test]
    fn header_names_are_trimmed() {
        let text = " demand , time,competitor_price ,actual_price
100,1,10,11
";
        let ds = DataSet::read_from(text.as_bytes(), b',').unwrap();
        assert_eq!(ds.headers, svec!["demand", "time", "competitor_price", "actual_price"]);
        assert!(ds.training_rows().is_ok());
    }

    #[test]
    fn quoted_fields_survive_round_trip() {
        let text = "demand,time,competitor_price,actual_price,note\n100,1,10,11,\"a, b\"\n";
        let ds = DataSet::read_from(text.as_bytes(), b',').unwrap();
        assert_eq!(ds.rows[0][4], "a, b");
        let out = ds.to_export_string(b',').unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn tsv_round_trip() {
        let ds = DataSet::sample();
        let text = ds.to_export_string(b'\t').unwrap();
        assert!(text.starts_with("demand\ttime\tcompetitor_price\tactual_price\n"));
        assert_eq!(DataSet::read_from(text.as_bytes(), b'\t').unwrap(), ds);
    }
}
