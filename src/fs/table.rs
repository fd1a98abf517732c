//! Minimal delimited text tables (TSV/CSV with a header row).
//!
//! Inputs may be gzip-compressed; compression is detected from the magic
//! bytes rather than the file extension. A cell may be wrapped in double
//! quotes, but a quoted cell must not contain the delimiter or escaped
//! quotes; such rows are rejected. HDF5 files are recognised and refused.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const HDF5_MAGIC: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is an HDF5 file; export it as a tab- or comma-separated table")]
    Hdf5 { path: PathBuf },

    #[error("table {path} is empty (no header row)")]
    Empty { path: PathBuf },

    #[error("table {path} has no '{column}' column (found: {found})")]
    MissingColumn {
        path: PathBuf,
        column: String,
        found: String,
    },

    #[error("table {path} line {line}: {details}")]
    Row {
        path: PathBuf,
        line: usize,
        details: String,
    },
}

/// A parsed table: header names and string cells.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Row>,
}

/// One data row with its 1-based line number in the source file.
#[derive(Debug, Clone)]
pub struct Row {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Open a file for reading, transparently decompressing gzip.
pub fn open_maybe_gzip(path: &Path) -> Result<Box<dyn BufRead>, TableError> {
    let io_err = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut magic = Vec::with_capacity(HDF5_MAGIC.len());
    File::open(path)
        .and_then(|file| file.take(HDF5_MAGIC.len() as u64).read_to_end(&mut magic))
        .map_err(io_err)?;
    if magic == HDF5_MAGIC {
        return Err(TableError::Hdf5 {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(io_err)?;
    if magic.starts_with(&GZIP_MAGIC) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

impl Table {
    /// Read a table, guessing the delimiter from the header (tab wins over comma).
    pub fn read(path: &Path) -> Result<Self, TableError> {
        Self::read_with(path, None)
    }

    pub fn read_with(path: &Path, delimiter: Option<char>) -> Result<Self, TableError> {
        let reader = open_maybe_gzip(path)?;
        let mut lines = reader.lines().enumerate();

        let (header_idx, header) = loop {
            match lines.next() {
                Some((idx, line)) => {
                    let line = line.map_err(|source| TableError::Io {
                        path: path.to_path_buf(),
                        source,
                    })?;
                    if !line.trim().is_empty() {
                        break (idx, line);
                    }
                }
                None => {
                    return Err(TableError::Empty {
                        path: path.to_path_buf(),
                    })
                }
            }
        };

        let delimiter = delimiter.unwrap_or(if header.contains('\t') { '\t' } else { ',' });
        let headers = split_row(path, header_idx + 1, &header, delimiter)?;

        let mut rows = Vec::new();
        for (idx, line) in lines {
            let line = line.map_err(|source| TableError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(Row {
                line: idx + 1,
                cells: split_row(path, idx + 1, &line, delimiter)?,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column.
    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
                found: self.headers.join(", "),
            })
    }

    /// All values of a named column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, TableError> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .map(|row| self.cell(row, idx))
            .collect()
    }

    /// Cell `idx` of `row`; a short row is an error.
    pub fn cell<'a>(&self, row: &'a Row, idx: usize) -> Result<&'a str, TableError> {
        row.cells
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| self.row_error(row, format!("missing column {}", idx + 1)))
    }

    pub fn row_error(&self, row: &Row, details: impl Into<String>) -> TableError {
        TableError::Row {
            path: self.path.clone(),
            line: row.line,
            details: details.into(),
        }
    }
}

fn split_row(
    path: &Path,
    line_no: usize,
    line: &str,
    delimiter: char,
) -> Result<Vec<String>, TableError> {
    line.trim_end_matches('\r')
        .split(delimiter)
        .map(|cell| {
            let cell = cell.trim();
            let opens = cell.starts_with('"');
            let closes = cell.len() > 1 && cell.ends_with('"');
            match (opens, closes) {
                (true, true) => Ok(cell[1..cell.len() - 1].to_string()),
                (false, _) if !cell.contains('"') => Ok(cell.to_string()),
                _ => Err(TableError::Row {
                    path: path.to_path_buf(),
                    line: line_no,
                    details: format!(
                        "unsupported quoting in cell '{cell}' (quoted cells may not contain {delimiter:?} or quotes)"
                    ),
                }),
            }
        })
        .collect()
}
