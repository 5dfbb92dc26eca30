//! A minimal string-keyed table.
//!
//! Just enough of a tabular collaborator for the figure builders: named
//! columns, projection with rename, concatenation, group-by-sum, numeric
//! sort and head. Group keys are compared as strings; group output is
//! ordered by key.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("row arity mismatch: expected {expected} cells, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("column mismatch on concat: expected {expected:?}, got {got:?}")]
    ColumnMismatch { expected: Vec<String>, got: Vec<String> },
    #[error("non-numeric cell in column '{column}' at row {row}")]
    NonNumeric { column: String, row: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Str(String),
    Num(f64),
    Null,
}

impl Cell {
    pub fn str(s: &str) -> Self {
        Cell::Str(s.to_string())
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Cell::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// String form used for group keys and node labels.
    pub fn label(&self) -> String {
        match self {
            Cell::Str(s) => s.clone(),
            Cell::Num(v) => format!("{}", v),
            Cell::Null => String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), FrameError> {
        if row.len() != self.columns.len() {
            return Err(FrameError::ArityMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Result<usize, FrameError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<Vec<&Cell>, FrameError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Project to the given columns, renaming each on the way out.
    pub fn select_renamed(&self, cols: &[(&str, &str)]) -> Result<Frame, FrameError> {
        let indices = cols
            .iter()
            .map(|(src, _)| self.column_index(src))
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = Frame {
            columns: cols.iter().map(|(_, dst)| dst.to_string()).collect(),
            rows: Vec::with_capacity(self.rows.len()),
        };
        for row in &self.rows {
            out.rows.push(indices.iter().map(|&i| row[i].clone()).collect());
        }
        Ok(out)
    }

    /// Append another frame's rows; column names must match exactly.
    pub fn append(&mut self, other: &Frame) -> Result<(), FrameError> {
        if self.columns != other.columns {
            return Err(FrameError::ColumnMismatch {
                expected: self.columns.clone(),
                got: other.columns.clone(),
            });
        }
        self.rows.extend(other.rows.iter().cloned());
        Ok(())
    }

    /// Keep only rows whose `col` cell equals `value` (string comparison).
    pub fn filter_str_eq(&self, col: &str, value: &str) -> Result<Frame, FrameError> {
        let idx = self.column_index(col)?;
        let rows = self
            .rows
            .iter()
            .filter(|r| r[idx].label() == value)
            .cloned()
            .collect();
        Ok(Frame {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Group by the key columns and sum the value column. Output rows are
    /// ordered by key; the value column must be fully numeric.
    pub fn group_sum(&self, keys: &[&str], value: &str) -> Result<Frame, FrameError> {
        let key_indices = keys
            .iter()
            .map(|k| self.column_index(k))
            .collect::<Result<Vec<_>, _>>()?;
        let value_idx = self.column_index(value)?;

        let mut groups: BTreeMap<Vec<String>, f64> = BTreeMap::new();
        for (row_no, row) in self.rows.iter().enumerate() {
            let v = row[value_idx].as_num().ok_or_else(|| FrameError::NonNumeric {
                column: value.to_string(),
                row: row_no,
            })?;
            let key: Vec<String> = key_indices.iter().map(|&i| row[i].label()).collect();
            *groups.entry(key).or_insert(0.0) += v;
        }

        let mut columns: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        columns.push(value.to_string());
        let rows = groups
            .into_iter()
            .map(|(key, total)| {
                let mut row: Vec<Cell> = key.into_iter().map(Cell::Str).collect();
                row.push(Cell::Num(total));
                row
            })
            .collect();
        Ok(Frame { columns, rows })
    }

    /// Sort rows descending by a numeric column; non-numeric cells sort last.
    pub fn sort_desc_by(&mut self, col: &str) -> Result<(), FrameError> {
        let idx = self.column_index(col)?;
        self.rows.sort_by(|a, b| {
            let av = a[idx].as_num().unwrap_or(f64::NEG_INFINITY);
            let bv = b[idx].as_num().unwrap_or(f64::NEG_INFINITY);
            bv.partial_cmp(&av).unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(())
    }

    pub fn head(&self, n: usize) -> Frame {
        Frame {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        let mut f = Frame::new(&["category", "daytime", "value"]);
        f.push_row(vec![Cell::str("Fashion"), Cell::str("morning"), Cell::Num(10.0)])
            .unwrap();
        f.push_row(vec![Cell::str("Fashion"), Cell::str("evening"), Cell::Num(5.0)])
            .unwrap();
        f.push_row(vec![Cell::str("Food"), Cell::str("morning"), Cell::Num(3.0)])
            .unwrap();
        f
    }

    #[test]
    fn test_push_row_arity_checked() {
        let mut f = Frame::new(&["a", "b"]);
        let err = f.push_row(vec![Cell::Num(1.0)]).unwrap_err();
        assert_eq!(err, FrameError::ArityMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn test_select_renamed() {
        let f = sample();
        let p = f
            .select_renamed(&[("category", "source"), ("daytime", "target"), ("value", "count")])
            .unwrap();
        assert_eq!(p.columns(), &["source", "target", "count"]);
        assert_eq!(p.len(), 3);
        assert_eq!(p.rows()[0][0], Cell::str("Fashion"));
    }

    #[test]
    fn test_select_unknown_column() {
        let f = sample();
        let err = f.select_renamed(&[("nope", "x")]).unwrap_err();
        assert_eq!(err, FrameError::ColumnNotFound("nope".to_string()));
    }

    #[test]
    fn test_group_sum_merges_and_sorts() {
        let mut f = sample();
        f.push_row(vec![Cell::str("Fashion"), Cell::str("morning"), Cell::Num(2.5)])
            .unwrap();
        let g = f.group_sum(&["category", "daytime"], "value").unwrap();
        assert_eq!(g.len(), 3);
        // keys sorted: (Fashion, evening), (Fashion, morning), (Food, morning)
        assert_eq!(g.rows()[0][1], Cell::str("evening"));
        assert_eq!(g.rows()[1][2], Cell::Num(12.5));
    }

    #[test]
    fn test_group_sum_rejects_non_numeric() {
        let mut f = Frame::new(&["k", "v"]);
        f.push_row(vec![Cell::str("a"), Cell::str("oops")]).unwrap();
        let err = f.group_sum(&["k"], "v").unwrap_err();
        assert!(matches!(err, FrameError::NonNumeric { row: 0, .. }));
    }

    #[test]
    fn test_concat_requires_same_columns() {
        let mut a = Frame::new(&["x"]);
        let b = Frame::new(&["y"]);
        assert!(a.append(&b).is_err());
    }

    #[test]
    fn test_sort_and_head() {
        let mut f = sample();
        f.sort_desc_by("value").unwrap();
        assert_eq!(f.rows()[0][2], Cell::Num(10.0));
        assert_eq!(f.head(2).len(), 2);
    }

    #[test]
    fn test_filter_str_eq() {
        let f = sample();
        let only = f.filter_str_eq("category", "Food").unwrap();
        assert_eq!(only.len(), 1);
    }
}
