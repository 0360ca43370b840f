use std::collections::HashSet;
use std::fmt;

use crate::error::{DataError, DataResult};

/// Cell spellings read as a missing value, in addition to the empty string.
const NA_TOKENS: &[&str] = &["NA", "N/A", "n/a", "#N/A", "NaN", "nan", "null", "NULL", "None"];

/// A single scalar value, used when building frames cell by cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Missing => Ok(()),
        }
    }
}

/// Column storage. `None` is the missing-value marker in both variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    /// Infer a column type from raw CSV cells.
    ///
    /// The column is numeric when every present cell parses as a finite
    /// number or a `true`/`false` literal (stored as 1.0/0.0); otherwise it
    /// stays text. Empty cells and common NA spellings become missing.
    pub fn infer(raw: Vec<String>) -> ColumnData {
        let cells: Vec<Option<String>> = raw
            .into_iter()
            .map(|s| {
                let t = s.trim();
                if t.is_empty() || NA_TOKENS.contains(&t) {
                    None
                } else {
                    Some(s)
                }
            })
            .collect();

        let parsed: Option<Vec<Option<f64>>> = cells
            .iter()
            .map(|c| match c {
                None => Some(None),
                Some(s) => parse_scalar(s.trim()).map(Some),
            })
            .collect();

        match parsed {
            Some(values) => ColumnData::Numeric(values),
            None => ColumnData::Text(cells),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(v) => v[row].is_none(),
            ColumnData::Text(v) => v[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    pub fn cell(&self, row: usize) -> Cell {
        match self {
            ColumnData::Numeric(v) => v[row].map_or(Cell::Missing, Cell::Number),
            ColumnData::Text(v) => v[row].clone().map_or(Cell::Missing, Cell::Text),
        }
    }

    fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(rows.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

fn parse_scalar(s: &str) -> Option<f64> {
    if s.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if s.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    /// Build a one-column value from cells, numeric when no cell is text.
    pub fn from_cells(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let all_numeric = cells.iter().all(|c| !matches!(c, Cell::Text(_)));
        let data = if all_numeric {
            ColumnData::Numeric(
                cells
                    .into_iter()
                    .map(|c| match c {
                        Cell::Number(v) => Some(v),
                        _ => None,
                    })
                    .collect(),
            )
        } else {
            ColumnData::Text(
                cells
                    .into_iter()
                    .map(|c| match c {
                        Cell::Missing => None,
                        other => Some(other.to_string()),
                    })
                    .collect(),
            )
        };
        Column { name: name.into(), data }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, ColumnData::Text(_))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> DataResult<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for c in &columns {
            if c.len() != n_rows {
                return Err(DataError::LengthMismatch {
                    name: c.name.clone(),
                    expected: n_rows,
                    got: c.len(),
                });
            }
            if !seen.insert(c.name.as_str()) {
                return Err(DataError::DuplicateColumn(c.name.clone()));
            }
        }
        Ok(Frame { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut()
    }

    /// Rename a column in place. Fails if `to` is already taken by another column.
    pub fn rename(&mut self, from: &str, to: &str) -> DataResult<()> {
        if from == to {
            return Ok(());
        }
        if self.contains(to) {
            return Err(DataError::DuplicateColumn(to.to_string()));
        }
        let col = self
            .column_mut(from)
            .ok_or_else(|| DataError::MissingColumn(from.to_string()))?;
        col.name = to.to_string();
        Ok(())
    }

    pub fn push_column(&mut self, column: Column) -> DataResult<()> {
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            let got = column.len();
            return Err(DataError::LengthMismatch {
                name: column.name,
                expected: self.n_rows,
                got,
            });
        }
        if self.contains(&column.name) {
            return Err(DataError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove and return a column.
    pub fn take_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        let column = self.columns.remove(idx);
        self.reset_if_empty();
        Some(column)
    }

    /// Drop every listed column that is present; absent names are ignored.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        self.columns
            .retain(|c| !names.iter().any(|n| n.as_ref() == c.name));
        self.reset_if_empty();
    }

    fn reset_if_empty(&mut self) {
        if self.columns.is_empty() {
            self.n_rows = 0;
        }
    }

    /// New frame holding the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Frame {
        Frame {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.take(rows),
                })
                .collect(),
            n_rows: rows.len(),
        }
    }

    /// Indices of rows without a missing value in any column.
    pub fn complete_rows(&self) -> Vec<usize> {
        (0..self.n_rows)
            .filter(|&i| self.columns.iter().all(|c| !c.data.is_missing(i)))
            .collect()
    }

    /// Indices of rows where every numeric column holds a value. Text
    /// columns may have gaps.
    pub fn numeric_complete_rows(&self) -> Vec<usize> {
        (0..self.n_rows)
            .filter(|&i| {
                self.columns
                    .iter()
                    .filter(|c| c.is_numeric())
                    .all(|c| !c.data.is_missing(i))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_infer_numeric_and_missing() {
        let col = ColumnData::infer(strings(&["1", " 2.5 ", "", "NaN"]));
        assert_eq!(col, ColumnData::Numeric(vec![Some(1.0), Some(2.5), None, None]));
    }

    #[test]
    fn test_infer_bool_as_numeric() {
        let col = ColumnData::infer(strings(&["True", "false"]));
        assert_eq!(col, ColumnData::Numeric(vec![Some(1.0), Some(0.0)]));
    }

    #[test]
    fn test_infer_text() {
        let col = ColumnData::infer(strings(&["€250 000", "12", ""]));
        assert_eq!(
            col,
            ColumnData::Text(vec![Some("€250 000".into()), Some("12".into()), None])
        );
    }

    #[test]
    fn test_frame_rejects_ragged_and_duplicates() {
        let ragged = Frame::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("b", vec![Some(1.0), Some(2.0)]),
        ]);
        assert!(matches!(ragged, Err(DataError::LengthMismatch { .. })));

        let dup = Frame::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("a", vec![Some(2.0)]),
        ]);
        assert!(matches!(dup, Err(DataError::DuplicateColumn(_))));
    }

    #[test]
    fn test_complete_rows_and_take() {
        let frame = Frame::new(vec![
            Column::numeric("a", vec![Some(1.0), None, Some(3.0)]),
            Column::text("b", vec![Some("x".into()), Some("y".into()), None]),
        ])
        .unwrap();
        assert_eq!(frame.complete_rows(), vec![0]);

        let sub = frame.take_rows(&[2, 0]);
        assert_eq!(sub.n_rows(), 2);
        assert_eq!(sub.column("a").unwrap().data.cell(0), Cell::Number(3.0));
        assert_eq!(sub.column("b").unwrap().data.cell(1), Cell::Text("x".into()));
    }

    #[test]
    fn test_rename_and_drop() {
        let mut frame = Frame::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("b", vec![Some(2.0)]),
        ])
        .unwrap();
        assert!(frame.rename("a", "b").is_err());
        frame.rename("a", "c").unwrap();
        assert_eq!(frame.column_names(), vec!["c", "b"]);

        frame.drop_columns(&["b", "zzz"]);
        assert_eq!(frame.column_names(), vec!["c"]);
        assert!(frame.take_column("c").is_some());
        assert_eq!(frame.n_cols(), 0);
        assert_eq!(frame.n_rows(), 0);
        assert!(frame.complete_rows().is_empty());
    }

    #[test]
    fn test_drop_all_columns_resets_rows() {
        let mut frame = Frame::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::text("b", vec![None, Some("x".into())]),
        ])
        .unwrap();
        frame.drop_columns(&["a", "b"]);
        assert_eq!(frame.n_rows(), 0);
        assert!(frame.complete_rows().is_empty());

        frame.push_column(Column::numeric("c", vec![Some(5.0)])).unwrap();
        assert_eq!(frame.n_rows(), 1);
    }

    #[test]
    fn test_push_column_checks_length_and_name() {
        let mut frame = Frame::new(vec![Column::numeric("a", vec![Some(1.0), Some(2.0)])]).unwrap();
        match frame.push_column(Column::numeric("b", vec![Some(1.0)])) {
            Err(DataError::LengthMismatch { name, expected, got }) => {
                assert_eq!(name, "b");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
        assert!(matches!(
            frame.push_column(Column::numeric("a", vec![None, None])),
            Err(DataError::DuplicateColumn(_))
        ));
        frame
            .push_column(Column::text("town", vec![Some("Gent".into()), None]))
            .unwrap();
        assert_eq!(frame.column_names(), vec!["a", "town"]);
    }

    #[test]
    fn test_numeric_complete_rows_ignores_text_gaps() {
        let frame = Frame::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0), None]),
            Column::text("b", vec![None, Some("x".into()), Some("y".into())]),
        ])
        .unwrap();
        assert_eq!(frame.numeric_complete_rows(), vec![0, 1]);
        assert_eq!(frame.complete_rows(), vec![1]);
    }

    #[test]
    fn test_column_from_cells() {
        let col = Column::from_cells("postal_code", vec![Cell::Number(8500.0), Cell::Missing]);
        assert!(col.is_numeric());
        let col = Column::from_cells("town", vec![Cell::Text("Kortrijk".into()), Cell::Number(1.0)]);
        assert_eq!(
            col.data,
            ColumnData::Text(vec![Some("Kortrijk".into()), Some("1".into())])
        );
    }
}
