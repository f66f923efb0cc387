//! Rectangular tables from log records with differing field sets.

use std::collections::{BTreeMap, BTreeSet};

/// One log line: field name to value.
pub type LogRecord = BTreeMap<String, String>;

/// Cell value for a field a record does not carry.
pub const MISSING: &str = "-";

/// Sorted union of the field names present on any record.
pub fn infer_columns<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    records
        .into_iter()
        .flat_map(|record| record.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// Header row plus one row per record, every row as wide as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LogTable {
    pub fn from_records(records: &[LogRecord]) -> Self {
        let headers = infer_columns(records);
        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|field| {
                        record
                            .get(field)
                            .cloned()
                            .unwrap_or_else(|| MISSING.to_string())
                    })
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a bordered grid with the header separated by `=`.
    pub fn render_grid(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = Vec::with_capacity(self.rows.len() * 2 + 3);
        out.push(border(&widths, '-'));
        out.push(row_line(&widths, &self.headers));
        out.push(border(&widths, '='));
        for row in &self.rows {
            out.push(row_line(&widths, row));
            out.push(border(&widths, '-'));
        }
        if self.rows.is_empty() {
            out.pop();
            out.push(border(&widths, '-'));
        }
        out.join("\n")
    }
}

fn border(widths: &[usize], fill: char) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.extend(std::iter::repeat(fill).take(width + 2));
        line.push('+');
    }
    line
}

fn row_line(widths: &[usize], cells: &[String]) -> String {
    let mut line = String::from("|");
    for (width, cell) in widths.iter().zip(cells) {
        let pad = width - cell.chars().count();
        line.push(' ');
        line.push_str(cell);
        line.extend(std::iter::repeat(' ').take(pad + 1));
        line.push('|');
    }
    line
}
