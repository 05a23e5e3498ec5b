use crate::simplify::Point;
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::io::{self, Read};

/// Attribute table: one row per feature
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub enum ColumnSelector {
    Index(usize),
    Name(String),
}

pub fn read_csv<R: Read>(source: R) -> Result<CsvData> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(anyhow!("CSV must contain at least one data row"));
    }

    Ok(CsvData { headers, rows })
}

pub fn read_csv_from_stdin() -> Result<CsvData> {
    read_csv(io::stdin())
}

pub fn parse_column_selector(input: &str) -> ColumnSelector {
    match input.parse::<usize>() {
        Ok(index) => ColumnSelector::Index(index),
        Err(_) => ColumnSelector::Name(input.to_string()),
    }
}

/// Resolve a selector to (index, header name)
fn resolve_column(data: &CsvData, selector: ColumnSelector) -> Result<(usize, String)> {
    match selector {
        ColumnSelector::Index(idx) => {
            if idx >= data.headers.len() {
                return Err(anyhow!(
                    "Column index {} out of bounds (available columns: {})",
                    idx,
                    data.headers.len()
                ));
            }
            Ok((idx, data.headers[idx].clone()))
        }
        ColumnSelector::Name(name) => {
            let idx = data
                .headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(&name))
                .ok_or_else(|| {
                    anyhow!(
                        "Column '{}' not found. Available columns: {}",
                        name,
                        data.headers.join(", ")
                    )
                })?;
            Ok((idx, data.headers[idx].clone()))
        }
    }
}

fn cell<'a>(data: &'a CsvData, row_idx: usize, column_index: usize) -> Result<&'a str> {
    let row = &data.rows[row_idx];
    row.get(column_index).map(|s| s.as_str()).ok_or_else(|| {
        anyhow!(
            "Row {} has only {} columns, expected at least {}",
            row_idx + 1,
            row.len(),
            column_index + 1
        )
    })
}

/// Every value of a column as a number; any unparseable cell is an error
pub fn extract_column(data: &CsvData, selector: ColumnSelector) -> Result<(String, Vec<f64>)> {
    let (column_index, column_name) = resolve_column(data, selector)?;

    let mut values = Vec::with_capacity(data.rows.len());
    for row_idx in 0..data.rows.len() {
        let value_str = cell(data, row_idx, column_index)?;
        let value = value_str.parse::<f64>().with_context(|| {
            format!(
                "Failed to parse value '{}' as number in column '{}' at row {}",
                value_str,
                column_name,
                row_idx + 1
            )
        })?;
        values.push(value);
    }

    Ok((column_name, values))
}

/// Numeric values of a column, skipping blank, non-numeric and
/// non-finite cells. Returns the values and how many cells were skipped.
pub fn extract_numeric_values(
    data: &CsvData,
    selector: ColumnSelector,
) -> Result<(String, Vec<f64>, usize)> {
    let (column_index, column_name) = resolve_column(data, selector)?;

    let mut values = Vec::with_capacity(data.rows.len());
    let mut skipped = 0;
    for row_idx in 0..data.rows.len() {
        match cell(data, row_idx, column_index)?.parse::<f64>() {
            Ok(v) if v.is_finite() => values.push(v),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(column = %column_name, skipped, "skipped non-numeric cells");
    }
    Ok((column_name, values, skipped))
}

pub fn extract_column_as_string(data: &CsvData, selector: ColumnSelector) -> Result<(String, Vec<String>)> {
    let (column_index, column_name) = resolve_column(data, selector)?;

    let mut values = Vec::with_capacity(data.rows.len());
    for row_idx in 0..data.rows.len() {
        values.push(cell(data, row_idx, column_index)?.to_string());
    }

    Ok((column_name, values))
}

/// Zip two numeric columns into an ordered point path
pub fn extract_points(data: &CsvData, x: ColumnSelector, y: ColumnSelector) -> Result<Vec<Point>> {
    let (_, xs) = extract_column(data, x).context("Failed to extract X coordinates")?;
    let (_, ys) = extract_column(data, y).context("Failed to extract Y coordinates")?;
    Ok(xs.into_iter().zip(ys).map(|(x, y)| Point::new(x, y)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn csv_from_string(content: &str) -> Result<CsvData> {
        read_csv(Cursor::new(content))
    }

    #[test]
    fn test_parse_column_selector_by_index() {
        match parse_column_selector("0") {
            ColumnSelector::Index(i) => assert_eq!(i, 0),
            _ => panic!("Expected Index"),
        }
        match parse_column_selector("42") {
            ColumnSelector::Index(i) => assert_eq!(i, 42),
            _ => panic!("Expected Index"),
        }
    }

    #[test]
    fn test_parse_column_selector_by_name() {
        match parse_column_selector("population") {
            ColumnSelector::Name(s) => assert_eq!(s, "population"),
            _ => panic!("Expected Name"),
        }
    }

    #[test]
    fn test_extract_column_by_name() {
        let csv = csv_from_string("name,pop,area\na,10,100\nb,20,200\nc,30,300").unwrap();
        let (name, values) = extract_column(&csv, ColumnSelector::Name("pop".to_string())).unwrap();
        assert_eq!(name, "pop");
        assert_eq!(values, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_extract_column_by_index() {
        let csv = csv_from_string("x,y,z\n1,10,100\n2,20,200").unwrap();
        let (name, values) = extract_column(&csv, ColumnSelector::Index(2)).unwrap();
        assert_eq!(name, "z");
        assert_eq!(values, vec![100.0, 200.0]);
    }

    #[test]
    fn test_extract_column_case_insensitive() {
        let csv = csv_from_string("Population,area\n20.5,60\n22.0,55").unwrap();
        let (name, values) = extract_column(&csv, ColumnSelector::Name("population".to_string())).unwrap();
        assert_eq!(name, "Population"); // Returns actual header case
        assert_eq!(values, vec![20.5, 22.0]);
    }

    #[test]
    fn test_extract_column_trims_cells() {
        let csv = csv_from_string("x, y\n1, 10\n2 ,20").unwrap();
        let (_, values) = extract_column(&csv, ColumnSelector::Name("y".to_string())).unwrap();
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_extract_column_not_found() {
        let csv = csv_from_string("x,y\n1,10").unwrap();
        let result = extract_column(&csv, ColumnSelector::Name("nonexistent".to_string()));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_extract_column_index_out_of_bounds() {
        let csv = csv_from_string("x,y\n1,10").unwrap();
        let result = extract_column(&csv, ColumnSelector::Index(99));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of bounds"));
    }

    #[test]
    fn test_extract_column_non_numeric() {
        let csv = csv_from_string("x,y\n1,10\nnot_a_number,20\n3,30").unwrap();
        let result = extract_column(&csv, ColumnSelector::Name("x".to_string()));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_extract_numeric_values_skips_bad_cells() {
        let csv = csv_from_string("name,pop\na,10\nb,\nc,n/a\nd,40\ne,NaN").unwrap();
        let (name, values, skipped) =
            extract_numeric_values(&csv, ColumnSelector::Name("pop".to_string())).unwrap();
        assert_eq!(name, "pop");
        assert_eq!(values, vec![10.0, 40.0]);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_extract_column_as_string() {
        let csv = csv_from_string("name,landuse\na,forest\nb,water").unwrap();
        let (name, values) = extract_column_as_string(&csv, ColumnSelector::Index(1)).unwrap();
        assert_eq!(name, "landuse");
        assert_eq!(values, vec!["forest", "water"]);
    }

    #[test]
    fn test_extract_points() {
        let csv = csv_from_string("lng,lat\n10.5,45.1\n10.6,45.2").unwrap();
        let points = extract_points(
            &csv,
            ColumnSelector::Name("lng".to_string()),
            ColumnSelector::Name("lat".to_string()),
        )
        .unwrap();
        assert_eq!(points, vec![Point::new(10.5, 45.1), Point::new(10.6, 45.2)]);
    }

    #[test]
    fn test_short_row_rejected_by_reader() {
        // CSV reader validates row length during parsing
        let result = csv_from_string("x,y,z\n1,10,100\n2,20");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("record"));
    }

    #[test]
    fn test_read_csv_empty_data() {
        let result = csv_from_string("x,y\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least one data row"));
    }

    #[test]
    fn test_read_csv_unicode() {
        let csv = csv_from_string("région,densité\nnord,20.5\nsud,22.0").unwrap();
        assert_eq!(csv.headers, vec!["région", "densité"]);
        assert_eq!(csv.rows.len(), 2);
    }
}
