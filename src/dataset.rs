//! In-memory column table for one country's cleaned measurements.
//!
//! A [`Dataset`] is built once from CSV and never mutated afterwards. Cells are
//! classified while parsing: numbers become [`Cell::Number`], missing markers
//! (empty, `NA`, `NaN`, ...) become [`Cell::Missing`], anything else is kept as
//! [`Cell::Text`].

use crate::models::Country;
use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

/// Markers treated as missing values (compared case-insensitively).
const MISSING_MARKERS: [&str; 5] = ["na", "n/a", "nan", "null", "none"];

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() || MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) {
            return Cell::Missing;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            Ok(_) => Cell::Missing,
            Err(_) => Cell::Text(s.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Cell::Number(v) => Some(v),
            _ => None,
        }
    }

    /// Grouping label for the cell; `None` when missing.
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Number(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
            Cell::Missing => None,
        }
    }
}

/// Ordered table with named columns, stored column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    country: Country,
    headers: Vec<String>,
    columns: Vec<Vec<Cell>>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset from already-parsed columns; shorter columns are padded with missing cells.
    pub fn from_columns(country: Country, columns: Vec<(String, Vec<Cell>)>) -> Self {
        let rows = columns.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
        let (headers, mut cols): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
        for c in &mut cols {
            c.resize(rows, Cell::Missing);
        }
        Self {
            country,
            headers,
            columns: cols,
            rows,
        }
    }

    /// Parse CSV with a header row. Short rows are padded with missing cells;
    /// rows wider than the header are rejected.
    pub fn from_reader<R: Read>(country: Country, reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()
            .context("read CSV header")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
        for (i, rec) in rdr.records().enumerate() {
            let rec = rec.with_context(|| format!("read CSV record {}", i + 1))?;
            if rec.len() > headers.len() {
                bail!(
                    "CSV record {} has {} fields, header has {}",
                    i + 1,
                    rec.len(),
                    headers.len()
                );
            }
            for (j, col) in columns.iter_mut().enumerate() {
                col.push(rec.get(j).map(Cell::parse).unwrap_or(Cell::Missing));
            }
        }
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        Ok(Self {
            country,
            headers,
            columns,
            rows,
        })
    }

    pub fn from_path<P: AsRef<Path>>(country: Country, path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_reader(country, file).with_context(|| format!("parse {}", path.display()))
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(&self.columns[idx])
    }

    /// Non-missing numeric values of a column, in row order.
    pub fn numeric_values(&self, name: &str) -> Vec<f64> {
        self.column(name)
            .map(|col| col.iter().filter_map(Cell::as_number).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cells() {
        assert_eq!(Cell::parse(" 1.5 "), Cell::Number(1.5));
        assert_eq!(Cell::parse(""), Cell::Missing);
        assert_eq!(Cell::parse("NaN"), Cell::Missing);
        assert_eq!(Cell::parse("n/a"), Cell::Missing);
        assert_eq!(Cell::parse("inf"), Cell::Missing);
        assert_eq!(Cell::parse("North"), Cell::Text("North".into()));
    }

    #[test]
    fn parses_ragged_csv() {
        let csv = "Timestamp,GHI,Region\n\
                   2021-08-09 00:01,1.5,North\n\
                   2021-08-09 00:02,,South\n\
                   2021-08-09 00:03\n";
        let ds = Dataset::from_reader(Country::Benin, csv.as_bytes()).unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.headers(), ["Timestamp", "GHI", "Region"]);
        assert_eq!(ds.numeric_values("GHI"), vec![1.5]);
        assert_eq!(ds.column("Region").unwrap()[2], Cell::Missing);
        assert!(ds.numeric_values("DNI").is_empty());
    }

    #[test]
    fn rejects_rows_wider_than_header() {
        let csv = "GHI\n1\n2,3\n";
        let err = Dataset::from_reader(Country::Togo, csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("record 2 has 2 fields"));
    }
}
