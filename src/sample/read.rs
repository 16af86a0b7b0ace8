use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use csv::ReaderBuilder;
use num_traits::Float;
use serde::de::DeserializeOwned;

use super::FdSample;

/// Failure while reading a functional sample from a CSV file.
#[derive(Debug)]
pub enum SampleError {
    /// Underlying I/O failure.
    Io(std::io::Error),
    /// CSV parsing failure.
    Csv(csv::Error),
    /// The file contains no data records.
    EmptyFile,
    /// A record has fewer than two columns (grid plus at least one curve).
    TooFewColumns,
    /// A record's width differs from the first record's.
    RaggedRow {
        /// 0-based record index of the offending row.
        row: usize,
        /// Expected number of columns.
        expected: usize,
        /// Number of columns found.
        found: usize,
    },
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::Io(e) => write!(f, "I/O error: {e}"),
            SampleError::Csv(e) => write!(f, "CSV parsing error: {e}"),
            SampleError::EmptyFile => write!(f, "CSV file contains no data records"),
            SampleError::TooFewColumns => {
                write!(f, "CSV needs a grid column plus at least one curve column")
            }
            SampleError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "CSV row {row} has {found} columns, expected {expected}"
            ),
        }
    }
}

impl StdError for SampleError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SampleError::Io(e) => Some(e),
            SampleError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SampleError {
    fn from(e: std::io::Error) -> Self {
        SampleError::Io(e)
    }
}

impl From<csv::Error> for SampleError {
    fn from(e: csv::Error) -> Self {
        SampleError::Csv(e)
    }
}

impl<F: Float + DeserializeOwned> FdSample<F> {
    /// Reads a sample from a wide CSV file with a header row.
    ///
    /// The first column holds the argument grid; every further column is one
    /// curve, giving that curve's value at each grid point.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, SampleError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let mut rows: Vec<Vec<F>> = Vec::new();
        for result in rdr.deserialize() {
            rows.push(result?);
        }

        if rows.is_empty() {
            return Err(SampleError::EmptyFile);
        }
        let width = rows[0].len();
        if width < 2 {
            return Err(SampleError::TooFewColumns);
        }
        for (row, record) in rows.iter().enumerate() {
            if record.len() != width {
                return Err(SampleError::RaggedRow {
                    row,
                    expected: width,
                    found: record.len(),
                });
            }
        }

        let n_points = rows.len();
        let n_curves = width - 1;
        let argvals: Vec<F> = rows.iter().map(|r| r[0]).collect();
        let mut values = vec![F::zero(); n_points * n_curves];
        for (i, record) in rows.iter().enumerate() {
            for j in 0..n_curves {
                values[i + j * n_points] = record[j + 1];
            }
        }

        Ok(Self::new(argvals, values, n_curves))
    }
}
