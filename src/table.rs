//! Tabular blocks nested in a parameter file.
//!
//! ```text
//! # comments
//! =pmt= id  x      y      z
//! 10   1.0    0.0    1.0
//! 11  -0.5    0.866  1.0
//! ```
//!
//! The table name sits between the two `=`. The first name after it labels
//! the leading token of every row, which is not kept; the remaining names are
//! the columns. The table ends at the first blank line or at the end of the
//! stream. Cells are kept as the raw strings read and only parsed as numbers
//! on request.

use std::collections::HashMap;
use std::io::BufRead;

use tracing::debug;

use crate::error::{ParamError, Result};
use crate::line::{self, SourceLines};
use crate::store::OtherHasher;

#[derive(Debug)]
pub struct Table {
    name: String,
    row_label: Option<String>,
    column_names: Vec<String>,
    // one vector per header position, all `rows` long
    columns: Vec<Vec<String>>,
    // a repeated column name resolves to its last position
    index: HashMap<String, usize, OtherHasher>,
    rows: usize,
}

impl Table {
    /// Reads the rows following a header line. `columns` is the header text
    /// after the `=name=` token.
    pub(crate) fn read<R: BufRead>(
        name: &str,
        columns: &str,
        lines: &mut SourceLines<R>,
    ) -> Result<Table> {
        let mut names = columns.split_whitespace().map(str::to_string);
        let row_label = names.next();
        let column_names: Vec<String> = names.collect();
        let index = column_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect::<HashMap<_, _, OtherHasher>>();
        let mut table = Table {
            name: name.to_string(),
            row_label,
            columns: vec![Vec::new(); column_names.len()],
            column_names,
            index,
            rows: 0,
        };

        while let Some(raw) = lines.next() {
            if raw.starts_with('#') {
                continue;
            }
            // end of the table at the first blank line
            if raw.trim().is_empty() {
                break;
            }
            let row = line::strip_comment(&raw);
            if row.trim().is_empty() {
                continue;
            }
            table.push_row(row, lines.number())?;
        }

        debug!(table = %table.name, rows = table.rows, columns = table.column_count(), "table read");
        Ok(table)
    }

    fn push_row(&mut self, row: &str, line: usize) -> Result<()> {
        let values: Vec<&str> = row.split_whitespace().collect();
        let expected = self.column_names.len() + 1;
        if values.len() != expected {
            return Err(ParamError::format(
                format!(
                    "bad line in table {}: expected {} values ({} columns and a row label), got {} on row {}",
                    self.name,
                    expected,
                    self.column_names.len(),
                    values.len(),
                    self.rows
                ),
                Some(line),
            ));
        }
        for (column, value) in self.columns.iter_mut().zip(&values[1..]) {
            column.push(value.to_string());
        }
        self.rows += 1;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    /// Column names in header order, without the row label.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Header name of the leading per-row token, if the header had any names.
    pub fn row_label(&self) -> Option<&str> {
        self.row_label.as_deref()
    }

    pub fn column(&self, name: &str) -> Result<&[String]> {
        self.index
            .get(name)
            .map(|&i| self.columns[i].as_slice())
            .ok_or_else(|| ParamError::Lookup(format!("unknown column {name} in table {}", self.name)))
    }

    /// Every cell of a column as a number. Fails on the first cell that is
    /// not a decimal.
    pub fn column_as_num(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .iter()
            .enumerate()
            .map(|(row, cell)| self.parse_cell(name, row, cell))
            .collect()
    }

    pub fn cell(&self, name: &str, row: usize) -> Result<&str> {
        let column = self.column(name)?;
        column.get(row).map(String::as_str).ok_or_else(|| {
            ParamError::Lookup(format!(
                "no row {row} in table {} ({} rows)",
                self.name, self.rows
            ))
        })
    }

    pub fn value(&self, name: &str, row: usize) -> Result<f64> {
        let cell = self.cell(name, row)?;
        self.parse_cell(name, row, cell)
    }

    fn parse_cell(&self, name: &str, row: usize, cell: &str) -> Result<f64> {
        line::parse_decimal(cell).ok_or_else(|| {
            ParamError::format(
                format!(
                    "cell {cell:?} of column {name}, row {row} in table {} is not a number",
                    self.name
                ),
                None,
            )
        })
    }
}
