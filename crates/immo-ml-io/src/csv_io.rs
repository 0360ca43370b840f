use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use immo_ml_data::{Column, ColumnData, Frame};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Read a headed CSV file into a [`Frame`], inferring each column's type.
///
/// Rows with a different field count than the header are an error. A
/// repeated header gets a `.1`, `.2`, ... suffix.
pub fn read_frame<P: AsRef<Path>>(path: P) -> IoResult<Frame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::io(path, e))?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = dedup_headers(rdr.headers()?.iter().map(|h| h.trim().to_string()));

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (j, field) in record.iter().enumerate() {
            raw[j].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column {
            name,
            data: ColumnData::infer(cells),
        })
        .collect();
    let frame = Frame::new(columns)?;
    debug!(
        path = %path.display(),
        rows = frame.n_rows(),
        cols = frame.n_cols(),
        "csv loaded"
    );
    Ok(frame)
}

fn dedup_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for name in raw {
        let mut candidate = name.clone();
        let mut k = 1;
        while taken.contains(&candidate) {
            candidate = format!("{}.{}", name, k);
            k += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Write a frame as a headed CSV file. Missing values become empty cells.
pub fn write_frame<P: AsRef<Path>>(path: P, frame: &Frame) -> IoResult<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(frame.column_names())?;

    for i in 0..frame.n_rows() {
        let row: Vec<String> = frame
            .columns()
            .iter()
            .map(|c| c.data.cell(i).to_string())
            .collect();
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(|e| IoError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_frame_infers_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");
        fs::write(
            &path,
            "Price (€),bedrooms,Town,has_garden\n\"€250 000\",3,Brugge,True\n\"€1\",,Gent,false\n",
        )
        .unwrap();

        let frame = read_frame(&path).unwrap();
        assert_eq!(frame.column_names(), vec!["Price (€)", "bedrooms", "Town", "has_garden"]);
        assert_eq!(frame.n_rows(), 2);
        assert!(frame.column("Price (€)").unwrap().is_text());
        assert_eq!(
            frame.column("bedrooms").unwrap().data,
            ColumnData::Numeric(vec![Some(3.0), None])
        );
        assert_eq!(
            frame.column("has_garden").unwrap().data,
            ColumnData::Numeric(vec![Some(1.0), Some(0.0)])
        );
    }

    #[test]
    fn test_repeated_headers_are_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.csv");
        fs::write(&path, "price,surface,price,price.1,price
1,2,3,4,5
").unwrap();

        let frame = read_frame(&path).unwrap();
        assert_eq!(
            frame.column_names(),
            vec!["price", "surface", "price.1", "price.1.1", "price.2"]
        );
        assert_eq!(
            frame.column("price.1").unwrap().data,
            ColumnData::Numeric(vec![Some(3.0)])
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "a,b\n1,2\n3\n").unwrap();
        assert!(matches!(read_frame(&path), Err(IoError::Csv(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_frame("/no/such/dir/file.csv"),
            Err(IoError::NotFound(_))
        ));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let frame = Frame::new(vec![
            Column::numeric("surface", vec![Some(120.5), None]),
            Column::text("town", vec![Some("Gent".into()), Some("Brugge".into())]),
        ])
        .unwrap();
        write_frame(&path, &frame).unwrap();
        assert_eq!(read_frame(&path).unwrap(), frame);
    }
}
