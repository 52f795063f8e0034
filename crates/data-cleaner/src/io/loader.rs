//! Parses uploaded files into tables.

use crate::error::{CleaningError, Result};
use crate::utils::nan_to_null;
use calamine::{Data, Reader, Xlsx};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

const EMPTY_CELL: &Data = &Data::Empty;

/// Cell texts read as missing, in addition to empty fields.
pub const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing_token(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || MISSING_TOKENS.contains(&text)
}

/// File formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl TableFormat {
    /// Detect the format from a file name's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::UnsupportedFormat`] for any other extension.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("tsv") => Ok(Self::Tsv),
            Some("xlsx") => Ok(Self::Xlsx),
            _ => Err(CleaningError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Loads CSV, TSV and XLSX files into a [`DataFrame`].
pub struct TableLoader;

impl TableLoader {
    /// Load a table from disk.
    pub fn load_path(path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        // Reject by extension before touching the file.
        TableFormat::from_file_name(&file_name)?;

        let bytes = std::fs::read(path)?;
        Self::load_bytes(bytes, &file_name)
    }

    /// Load a table from uploaded bytes. `file_name` selects the format.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::UnsupportedFormat`] when the extension is
    /// unknown or the content cannot be parsed as that format.
    pub fn load_bytes(bytes: Vec<u8>, file_name: &str) -> Result<DataFrame> {
        let format = TableFormat::from_file_name(file_name)?;

        let df = match format {
            TableFormat::Csv => load_csv_with_fallbacks(bytes, b','),
            TableFormat::Tsv => load_csv_with_fallbacks(bytes, b'\t'),
            TableFormat::Xlsx => load_xlsx(bytes),
        }
        .map_err(|reason| {
            CleaningError::UnsupportedFormat(format!("{}: {}", file_name, reason))
        })?;
        let df = nan_as_missing(df)?;

        info!(
            "Loaded {} ({} rows x {} columns)",
            file_name,
            df.height(),
            df.width()
        );
        Ok(df)
    }
}

fn read_delimited(
    bytes: Vec<u8>,
    separator: u8,
    quote_char: Option<u8>,
) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(quote_char)
                .with_null_values(Some(NullValues::AllColumns(
                    MISSING_TOKENS.iter().map(|&t| PlSmallStr::from_static(t)).collect(),
                ))),
        )
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

/// Float NaN cells become null so they count as missing.
fn nan_as_missing(df: DataFrame) -> Result<DataFrame> {
    if !df.get_columns().iter().any(|c| c.dtype().is_float()) {
        return Ok(df);
    }
    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            let series = column.as_materialized_series();
            if series.dtype().is_float() {
                nan_to_null(series).map(Column::from)
            } else {
                Ok(column.clone())
            }
        })
        .collect::<PolarsResult<Vec<_>>>()?;
    Ok(DataFrame::new(columns)?)
}

/// Try standard quoting, then no quoting, then pre-cleaned content.
fn load_csv_with_fallbacks(bytes: Vec<u8>, separator: u8) -> std::result::Result<DataFrame, String> {
    match read_delimited(bytes.clone(), separator, Some(b'"')) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    match read_delimited(bytes.clone(), separator, None) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading without quotes failed: {}", e),
    }

    let cleaned = clean_csv_content(&String::from_utf8_lossy(&bytes));
    read_delimited(cleaned.into_bytes(), separator, Some(b'"')).map_err(|e| e.to_string())
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read the first worksheet. The first row holds the column names.
fn load_xlsx(bytes: Vec<u8>) -> std::result::Result<DataFrame, String> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| format!("failed to open workbook: {}", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "no worksheet found".to_string())?
        .map_err(|e| format!("failed to read worksheet: {}", e))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| "worksheet is empty".to_string())?;
    let names = column_names(header);
    let body: Vec<&[Data]> = rows.collect();

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(index).unwrap_or(EMPTY_CELL))
                .collect();
            xlsx_column(name, &cells)
        })
        .collect::<Vec<_>>();

    DataFrame::new(columns).map_err(|e| e.to_string())
}

/// Header cells as unique, non-empty column names.
fn column_names(header: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let base = match cell {
                Data::Empty => format!("column_{}", index + 1),
                other => other.to_string().trim().to_string(),
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

/// Empty cells, formula errors, NaN and missing-token strings.
fn is_missing_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::Float(v) => v.is_nan(),
        Data::String(text) => is_missing_token(text),
        _ => false,
    }
}

/// Columns whose present cells are all numbers become `Float64`; every
/// other column becomes `String`. Missing cells are null.
fn xlsx_column(name: String, cells: &[&Data]) -> Column {
    let present: Vec<&Data> = cells.iter().copied().filter(|c| !is_missing_cell(c)).collect();
    let is_numeric = !present.is_empty()
        && present
            .iter()
            .all(|c| matches!(c, Data::Int(_) | Data::Float(_)));

    if is_numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| match cell {
                _ if is_missing_cell(cell) => None,
                Data::Int(v) => Some(*v as f64),
                Data::Float(v) => Some(*v),
                _ => None,
            })
            .collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|cell| (!is_missing_cell(cell)).then(|| cell.to_string()))
            .collect();
        Column::new(name.into(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(TableFormat::from_file_name("a.CSV").unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_file_name("a.tsv").unwrap(), TableFormat::Tsv);
        assert_eq!(TableFormat::from_file_name("dir/a.xlsx").unwrap(), TableFormat::Xlsx);
        assert!(matches!(
            TableFormat::from_file_name("report.pdf"),
            Err(CleaningError::UnsupportedFormat(_))
        ));
        assert!(TableFormat::from_file_name("no_extension").is_err());
    }

    #[test]
    fn test_load_csv_bytes_with_missing_cells() {
        let csv = b"age,city\n25,NY\n,NY\n35,\n".to_vec();
        let df = TableLoader::load_bytes(csv, "people.csv").unwrap();

        assert_eq!(df.shape(), (3, 2));
        assert!(crate::utils::is_numeric_dtype(df.column("age").unwrap().dtype()));
        assert_eq!(df.column("age").unwrap().null_count(), 1);
        assert_eq!(df.column("city").unwrap().null_count(), 1);
    }

    #[test]
    fn test_missing_tokens_load_as_null() {
        let csv = b"age,city\n25,NY\nNaN,NA\nNA,n/a\n35,null\n".to_vec();
        let df = TableLoader::load_bytes(csv, "people.csv").unwrap();

        assert!(crate::utils::is_numeric_dtype(df.column("age").unwrap().dtype()));
        assert_eq!(df.column("age").unwrap().null_count(), 2);
        assert_eq!(df.column("city").unwrap().null_count(), 3);
    }

    #[test]
    fn test_nan_as_missing() {
        let df = df![
            "x" => [Some(1.0), Some(f64::NAN), None],
            "s" => [Some("NaN"), Some("a"), None],
        ]
        .unwrap();
        let df = nan_as_missing(df).unwrap();

        assert_eq!(df.column("x").unwrap().null_count(), 2);
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("s").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_tsv_bytes() {
        let tsv = b"name\tscore\nann\t1.5\nbob\t2.5\n".to_vec();
        let df = TableLoader::load_bytes(tsv, "scores.tsv").unwrap();
        assert_eq!(df.get_column_names_str(), vec!["name", "score"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let result = TableLoader::load_bytes(b"%PDF-1.4".to_vec(), "scan.pdf");
        assert!(matches!(result, Err(CleaningError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_corrupt_xlsx_is_unsupported_format() {
        let result = TableLoader::load_bytes(b"not a zip archive".to_vec(), "book.xlsx");
        assert!(matches!(result, Err(CleaningError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_clean_csv_content() {
        let content = "a,b\n\n\"\"x\"\",1\n";
        assert_eq!(clean_csv_content(content), "a,b\n\"x\",1");
    }

    #[test]
    fn test_xlsx_column_typing() {
        let cells = [Data::Int(1), Data::Empty, Data::Float(2.5)];
        let refs: Vec<&Data> = cells.iter().collect();
        let column = xlsx_column("n".to_string(), &refs);
        assert_eq!(column.dtype(), &DataType::Float64);
        assert_eq!(column.null_count(), 1);

        let cells = [
            Data::Int(1),
            Data::String("NA".into()),
            Data::Error(calamine::CellErrorType::NA),
            Data::Float(f64::NAN),
            Data::Float(2.0),
        ];
        let refs: Vec<&Data> = cells.iter().collect();
        let column = xlsx_column("m".to_string(), &refs);
        assert_eq!(column.dtype(), &DataType::Float64);
        assert_eq!(column.null_count(), 3);

        let cells = [Data::String("NY".into()), Data::Int(3), Data::Empty];
        let refs: Vec<&Data> = cells.iter().collect();
        let column = xlsx_column("c".to_string(), &refs);
        assert_eq!(column.dtype(), &DataType::String);
        assert_eq!(column.null_count(), 1);
    }

    #[test]
    fn test_column_names_are_unique() {
        let header = [
            Data::String("id".into()),
            Data::Empty,
            Data::String("id".into()),
        ];
        assert_eq!(column_names(&header), vec!["id", "column_2", "id_2"]);
    }
}
