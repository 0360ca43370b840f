use tracing::debug;

use crate::frame::{Column, ColumnData, Frame};

/// Columns parsed as numbers when present, besides the target.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "surface",
    "terrace_surface",
    "bedroom1_surface",
    "bedroom2_surface",
    "epc_score",
    "epc_total",
];

const STRIPPED_TOKENS: &[&str] = &["€", "m²", "%", "\u{202f}", "\u{a0}"];

/// Turn a scraped numeric string such as `"€250 000,00"` or `"120 m²"` into
/// a number.
///
/// Currency, unit, percent and narrow/non-breaking spaces are removed, a
/// decimal comma becomes a point, and every other character that is not an
/// ASCII digit or `.` is dropped. The result is `None` when nothing parseable
/// (and finite) remains. Signs are dropped with the other symbols.
pub fn normalize_numeric(raw: &str) -> Option<f64> {
    let mut s = raw.to_string();
    for token in STRIPPED_TOKENS {
        s = s.replace(token, "");
    }
    let digits: String = s
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalizes numeric-designated columns and trims text columns.
#[derive(Debug, Clone)]
pub struct DatasetCleaner {
    numeric_columns: Vec<String>,
}

impl DatasetCleaner {
    /// Cleaner for `target` plus the default [`NUMERIC_COLUMNS`].
    pub fn new(target: &str) -> Self {
        let mut numeric_columns = vec![target.to_string()];
        numeric_columns.extend(NUMERIC_COLUMNS.iter().map(|c| c.to_string()));
        DatasetCleaner { numeric_columns }
    }

    pub fn with_numeric_columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        DatasetCleaner {
            numeric_columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn clean(&self, frame: &Frame) -> Frame {
        let mut out = frame.clone();
        for column in out.columns_mut() {
            if self.numeric_columns.iter().any(|n| *n == column.name) {
                let before = column.data.missing_count();
                column.data = ColumnData::Numeric(to_numeric(&column.data));
                let lost = column.data.missing_count() - before;
                if lost > 0 {
                    debug!(column = %column.name, lost, "values not parseable as numbers");
                }
            } else if let ColumnData::Text(values) = &mut column.data {
                trim_text(values);
            }
        }
        out
    }
}

/// Clean `frame` with the default numeric columns for `target`.
pub fn clean(frame: &Frame, target: &str) -> Frame {
    DatasetCleaner::new(target).clean(frame)
}

fn to_numeric(data: &ColumnData) -> Vec<Option<f64>> {
    match data {
        ColumnData::Numeric(values) => values
            .iter()
            .map(|v| v.and_then(|v| normalize_numeric(&v.to_string())))
            .collect(),
        ColumnData::Text(values) => values
            .iter()
            .map(|v| v.as_deref().and_then(normalize_numeric))
            .collect(),
    }
}

fn trim_text(values: &mut [Option<String>]) {
    for cell in values.iter_mut() {
        let trimmed = match cell.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Some(t.to_string()),
            _ => None,
        };
        *cell = trimmed;
    }
}

impl Column {
    /// `true` when every present value is a finite number.
    pub fn is_clean_numeric(&self) -> bool {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().flatten().all(|x| x.is_finite()),
            ColumnData::Text(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn text(name: &str, values: &[Option<&str>]) -> Column {
        Column::text(name, values.iter().map(|v| v.map(str::to_string)).collect())
    }

    fn raw_frame() -> Frame {
        Frame::new(vec![
            text("price", &[Some("€250 000,00"), Some("€ 1.5"), Some("on request"), None]),
            text("surface", &[Some("120 m²"), Some("85\u{a0}m²"), Some("-"), Some("99")]),
            text("epc_score", &[Some("35%"), Some("1\u{202f}200"), None, Some("x")]),
            text("town", &[Some("  Brugge "), Some("Gent"), Some("   "), None]),
            Column::numeric("bedrooms", vec![Some(3.0), Some(-1.0), None, Some(2.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_normalize_numeric() {
        assert_eq!(normalize_numeric("€250 000,00"), Some(250000.0));
        assert_eq!(normalize_numeric("120 m²"), Some(120.0));
        assert_eq!(normalize_numeric("35%"), Some(35.0));
        assert_eq!(normalize_numeric("1\u{202f}200"), Some(1200.0));
        assert_eq!(normalize_numeric("on request"), None);
        assert_eq!(normalize_numeric("1.2.3"), None);
        assert_eq!(normalize_numeric(""), None);
    }

    #[test]
    fn test_clean_numeric_columns() {
        let cleaned = clean(&raw_frame(), "price");

        let price = cleaned.column("price").unwrap();
        assert_eq!(
            price.data,
            ColumnData::Numeric(vec![Some(250000.0), Some(1.5), None, None])
        );
        let surface = cleaned.column("surface").unwrap();
        assert_eq!(
            surface.data,
            ColumnData::Numeric(vec![Some(120.0), Some(85.0), None, Some(99.0)])
        );
        for name in ["price", "surface", "epc_score"] {
            assert!(cleaned.column(name).unwrap().is_clean_numeric(), "{}", name);
        }
    }

    #[test]
    fn test_clean_trims_text_and_leaves_other_numbers() {
        let cleaned = clean(&raw_frame(), "price");
        assert_eq!(
            cleaned.column("town").unwrap().data,
            ColumnData::Text(vec![Some("Brugge".into()), Some("Gent".into()), None, None])
        );
        // Not a designated column: negative value survives.
        assert_eq!(cleaned.column("bedrooms"), raw_frame().column("bedrooms"));
    }

    #[test]
    fn test_noise_column_becomes_missing() {
        let frame = Frame::new(vec![text("epc_total", &[Some("n.v.t."), Some("??")])]).unwrap();
        let cleaned = clean(&frame, "price");
        assert_eq!(
            cleaned.column("epc_total").unwrap().data,
            ColumnData::Numeric(vec![None, None])
        );
    }

    #[test]
    fn test_clean_is_idempotent() {
        let once = clean(&raw_frame(), "price");
        let twice = clean(&once, "price");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_numeric_columns() {
        let cleaner = DatasetCleaner::with_numeric_columns(["bedrooms"]);
        let cleaned = cleaner.clean(&raw_frame());
        // Signs are stripped along with other symbols.
        if let ColumnData::Numeric(v) = &cleaned.column("bedrooms").unwrap().data {
            assert_relative_eq!(v[1].unwrap(), 1.0);
        } else {
            panic!("bedrooms should stay numeric");
        }
        assert!(cleaned.column("price").unwrap().is_text());
    }
}
