//! Text output of a [`Store`], in the form [`Store::read_stream`] reads.
//!
//! Scalar keys come first, in definition order, one per line:
//! `key number`, `key number : text` or `key : text`. Each table follows
//! as its own block, in no particular order: a blank line, the `=name=`
//! header with tab separated names, then one tab separated line per row with
//! the row index as the leading token.
//!
//! Keys loaded with a prefix (`det.gain`) are written as they are stored, but
//! a key is read back as a run of word characters only, so such a dump does
//! not load again as the same keys.

use std::io::{self, Write};

use crate::line::TEXT_SEPARATOR;
use crate::store::Store;
use crate::table::Table;

pub const SIGNIFICANT_DIGITS: usize = 15;

// used when a table header carried no names at all
const DEFAULT_ROW_LABEL: &str = "row";

pub fn write_store<W: Write>(store: &Store, w: &mut W) -> io::Result<()> {
    for key in store.keys() {
        write!(w, "{key}")?;
        if let Ok(number) = store.num_value(key) {
            write!(w, " {}", format_number(number))?;
        }
        if store.has_str_value(key) {
            if let Ok(text) = store.str_value(key) {
                write!(w, " {TEXT_SEPARATOR} {text}")?;
            }
        }
        writeln!(w)?;
    }
    for table in store.tables() {
        write_table(table, w)?;
    }
    w.flush()
}

pub fn write_table<W: Write>(table: &Table, w: &mut W) -> io::Result<()> {
    writeln!(w)?;
    write!(w, "={}=\t{}", table.name(), table.row_label().unwrap_or(DEFAULT_ROW_LABEL))?;
    for name in table.column_names() {
        write!(w, "\t{name}")?;
    }
    writeln!(w)?;

    let columns: Vec<&[String]> = table
        .column_names()
        .iter()
        .filter_map(|name| table.column(name).ok())
        .collect();
    for row in 0..table.rows() {
        write!(w, "\t{row}")?;
        for column in &columns {
            write!(w, "\t{}", column[row])?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Formats like C's `%.15g`: 15 significant digits, no trailing zeros, and
/// an exponent only for very small or very large magnitudes.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exponent.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
        trim_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
