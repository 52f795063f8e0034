use crate::error::{Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Serializes cleaned tables to CSV.
pub struct Exporter {
    output_dir: PathBuf,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(PathBuf::from("output"))
    }
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// CSV bytes with a header row, ready to hand back as a download.
    pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
        let mut df = df.clone();
        let mut buffer = Vec::new();
        CsvWriter::new(&mut buffer)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)
            .context("Failed to serialize table to CSV")?;
        Ok(buffer)
    }

    /// `<output_name>.csv` when a custom name is set, else
    /// `<stem>_cleaned_data.csv`.
    pub fn cleaned_file_name(stem: &str, output_name: Option<&str>) -> String {
        match output_name {
            Some(name) => format!("{}.csv", name),
            None => format!("{}_cleaned_data.csv", stem),
        }
    }

    /// Write the table under the output directory and return its path.
    pub fn write_csv(
        &self,
        df: &DataFrame,
        stem: &str,
        output_name: Option<&str>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self
            .output_dir
            .join(Self::cleaned_file_name(stem, output_name));
        let mut file = File::create(&path)?;
        let mut df = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)
            .context("Failed to write cleaned CSV")?;

        info!("Cleaned data saved: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_file_name() {
        assert_eq!(
            Exporter::cleaned_file_name("sales", None),
            "sales_cleaned_data.csv"
        );
        assert_eq!(
            Exporter::cleaned_file_name("sales", Some("final")),
            "final.csv"
        );
    }

    #[test]
    fn test_to_csv_bytes_includes_header() {
        let df = df! {
            "age" => &[25.0, 30.0],
            "city" => &["NY", "Paris, FR"],
        }
        .unwrap();

        let csv = String::from_utf8(Exporter::to_csv_bytes(&df).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "age,city");
        assert_eq!(lines[1], "25.0,NY");
        assert_eq!(lines[2], "30.0,\"Paris, FR\"");
    }

    #[test]
    fn test_write_csv() {
        let dir = std::env::temp_dir().join(format!("data-cleaner-export-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let df = df! { "n" => &[1i64, 2] }.unwrap();

        let path = Exporter::new(dir.clone()).write_csv(&df, "numbers", None).unwrap();

        assert_eq!(path, dir.join("numbers_cleaned_data.csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "n\n1\n2\n");
        fs::remove_dir_all(dir).ok();
    }
}
