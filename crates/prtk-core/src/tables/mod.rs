pub mod reference;
pub mod writer;

pub use reference::{BundledAirReference, CompanionFile, NoReferenceData, ReferenceDataProvider};
pub use writer::TableWriter;

use crate::domain::project::DEFAULT_HEADER_LINES;
use crate::domain::{TableError, TableResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Numeric body and descriptive header of one processed physics table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub path: PathBuf,
    pub header: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl RawTable {
    pub fn new(path: impl Into<PathBuf>, header: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            path: path.into(),
            header,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn column(&self, index: usize) -> TableResult<Vec<f64>> {
        if index >= self.column_count() {
            return Err(self.malformed(format!(
                "column {} requested but table has {} columns",
                index,
                self.column_count()
            )));
        }
        Ok(self.rows.iter().map(|row| row[index]).collect())
    }

    pub fn last_column(&self) -> TableResult<Vec<f64>> {
        match self.column_count() {
            0 => Err(self.malformed("table has no columns")),
            count => self.column(count - 1),
        }
    }

    /// Rows and columns swapped.
    pub fn transpose(&self) -> Vec<Vec<f64>> {
        let columns = self.column_count();
        (0..columns)
            .map(|column| self.rows.iter().map(|row| row[column]).collect())
            .collect()
    }

    pub fn header_tokens(&self, line: usize) -> TableResult<Vec<&str>> {
        self.header
            .get(line)
            .map(|text| text.split_whitespace().collect())
            .ok_or_else(|| {
                self.malformed(format!(
                    "header line {} requested but header has {} lines",
                    line + 1,
                    self.header.len()
                ))
            })
    }

    pub fn header_f64(&self, line: usize, token: usize) -> TableResult<f64> {
        let tokens = self.header_tokens(line)?;
        tokens
            .get(token)
            .and_then(|value| parse_number(value))
            .ok_or_else(|| {
                self.malformed(format!(
                    "header line {} has no numeric token at position {}",
                    line + 1,
                    token + 1
                ))
            })
    }

    pub fn header_usize(&self, line: usize, token: usize) -> TableResult<usize> {
        let value = self.header_f64(line, token)?;
        if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(self.malformed(format!(
                "header line {} token {} is not a point count: {}",
                line + 1,
                token + 1,
                value
            )));
        }
        Ok(value as usize)
    }

    pub fn malformed(&self, detail: impl std::fmt::Display) -> TableError {
        TableError::malformed_input_table(&self.path, detail)
    }
}

/// Source of raw physics tables.
pub trait TableSource {
    fn read(&self, path: &Path) -> TableResult<RawTable>;
}

/// Reader for the text tables written by the ENDF processing chain: a fixed
/// number of header lines followed by whitespace-separated numeric rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextTableReader {
    header_lines: usize,
}

impl TextTableReader {
    pub fn new(header_lines: usize) -> Self {
        Self { header_lines }
    }

    pub fn parse(&self, path: &Path, source: &str) -> TableResult<RawTable> {
        let mut lines = source.lines();
        let mut header = Vec::with_capacity(self.header_lines);
        for _ in 0..self.header_lines {
            match lines.next() {
                Some(line) => header.push(line.trim_end().to_string()),
                None => {
                    return Err(TableError::malformed_input_table(
                        path,
                        format!("expected {} header lines", self.header_lines),
                    ));
                }
            }
        }

        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (offset, line) in lines.enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let line_number = self.header_lines + offset + 1;
            let row = trimmed
                .split_whitespace()
                .map(|token| {
                    parse_number(token).ok_or_else(|| {
                        TableError::malformed_input_table(
                            path,
                            format!("invalid number '{}' at line {}", token, line_number),
                        )
                    })
                })
                .collect::<TableResult<Vec<f64>>>()?;

            if let Some(first) = rows.first()
                && first.len() != row.len()
            {
                return Err(TableError::malformed_input_table(
                    path,
                    format!(
                        "line {} has {} columns, expected {}",
                        line_number,
                        row.len(),
                        first.len()
                    ),
                ));
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(TableError::malformed_input_table(path, "table has no data rows"));
        }

        Ok(RawTable::new(path, header, rows))
    }
}

impl Default for TextTableReader {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_LINES)
    }
}

impl TableSource for TextTableReader {
    fn read(&self, path: &Path) -> TableResult<RawTable> {
        let bytes = fs::read(path).map_err(|source| TableError::missing_input_table(path, source))?;
        let source = String::from_utf8_lossy(&bytes);
        self.parse(path, &source)
    }
}

/// Accepts Fortran `D` exponents alongside the usual forms.
fn parse_number(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "E").parse::<f64>().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleDomain {
    Electron,
    Photon,
}

impl ParticleDomain {
    pub const fn directory(self) -> &'static str {
        match self {
            Self::Electron => "electron",
            Self::Photon => "photon",
        }
    }
}

/// Per-material directory layout under the processed-tables root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    tables_root: PathBuf,
}

impl TableLayout {
    pub fn new(tables_root: impl Into<PathBuf>) -> Self {
        Self {
            tables_root: tables_root.into(),
        }
    }

    pub fn material_dir(&self, material: &str) -> PathBuf {
        self.tables_root.join(format!("mat-{}", material))
    }

    /// `mat-<material>/<domain>/xtbl.<suffix>`
    pub fn table_path(&self, material: &str, domain: ParticleDomain, suffix: &str) -> PathBuf {
        self.material_dir(material)
            .join(domain.directory())
            .join(format!("xtbl.{}", suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::{ParticleDomain, TableLayout, TableSource, TextTableReader};
    use crate::domain::errors::{MALFORMED_INPUT_TABLE, MISSING_INPUT_TABLE};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn header(lines: usize) -> String {
        (0..lines).map(|index| format!("header {}\n", index)).collect()
    }

    #[test]
    fn reader_splits_header_and_numeric_rows() {
        let source = format!("{}1.0 2.0D0 -3.5e-1\n\n4 5 6\n", header(3));
        let table = TextTableReader::new(3)
            .parse(Path::new("xtbl.23p"), &source)
            .expect("table should parse");

        assert_eq!(table.header.len(), 3);
        assert_eq!(table.rows, vec![vec![1.0, 2.0, -0.35], vec![4.0, 5.0, 6.0]]);
        assert_eq!(table.column(1).expect("column"), vec![2.0, 5.0]);
        assert_eq!(table.last_column().expect("column"), vec![-0.35, 6.0]);
        assert_eq!(table.transpose(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![-0.35, 6.0]]);
        assert!(table.column(3).is_err());
    }

    #[test]
    fn header_numbers_are_addressed_by_line_and_token() {
        let source = "a\nb\nc\nd\ne\nf\ng\n -2.5  41  extra\n1 2\n";
        let table = TextTableReader::new(8)
            .parse(Path::new("xtbl.526"), source)
            .expect("table should parse");

        assert_eq!(table.header_f64(7, 0).expect("bound"), -2.5);
        assert_eq!(table.header_usize(7, 1).expect("count"), 41);
        assert!(table.header_usize(7, 0).is_err());
        assert!(table.header_f64(7, 2).is_err());
        assert!(table.header_f64(9, 0).is_err());

        let oversized = TextTableReader::new(8)
            .parse(Path::new("xtbl.526"), "a\nb\nc\nd\ne\nf\ng\n -2.5 1e20\n1 2\n")
            .expect("table should parse");
        let error = oversized.header_usize(7, 1).expect_err("count should overflow");
        assert_eq!(error.placeholder(), "INPUT.MALFORMED_TABLE");
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let source = format!("{}1 2 3\n4 5\n", header(2));
        let error = TextTableReader::new(2)
            .parse(Path::new("xtbl.ive"), &source)
            .expect_err("ragged table should fail");
        assert_eq!(error.placeholder(), MALFORMED_INPUT_TABLE);
    }

    #[test]
    fn missing_file_is_reported_as_missing_input_table() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = TextTableReader::default()
            .read(&temp.path().join("xtbl.555"))
            .expect_err("missing table should fail");
        assert_eq!(error.placeholder(), MISSING_INPUT_TABLE);
    }

    #[test]
    fn reader_reads_files_from_disk() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("xtbl.eb");
        fs::write(&path, format!("{}1 2\n", header(10))).expect("table should be written");
        let table = TextTableReader::default().read(&path).expect("table should load");
        assert_eq!(table.rows, vec![vec![1.0, 2.0]]);
        assert_eq!(table.path, path);
    }

    #[test]
    fn layout_uses_material_and_domain_directories() {
        let layout = TableLayout::new("/tables");
        assert_eq!(
            layout.table_path("air", ParticleDomain::Electron, "23p"),
            Path::new("/tables/mat-air/electron/xtbl.23p")
        );
        assert_eq!(
            layout.table_path("iron", ParticleDomain::Photon, "ive"),
            Path::new("/tables/mat-iron/photon/xtbl.ive")
        );
    }
}
