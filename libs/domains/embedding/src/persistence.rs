//! Plain-text vector files: one `word v1 v2 ... vn` line per word.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::error::{EmbeddingResult, FileError};
use crate::models::EmbeddingRecord;

/// Decimal places written per component
pub const PRECISION: usize = 6;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: no vector components after word '{word}'")]
    MissingVector { line: usize, word: String },

    #[error("line {line}: '{token}' is not a number")]
    InvalidComponent { line: usize, token: String },

    #[error("line {line}: expected {expected} components, found {actual}")]
    DimensionMismatch {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("line {line}: duplicate word '{word}'")]
    DuplicateWord { line: usize, word: String },

    #[error("file contains no vectors")]
    NoRecords,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn save_embeddings<W: Write>(records: &[EmbeddingRecord], mut writer: W) -> io::Result<()> {
    for record in records {
        write!(writer, "{}", record.word)?;
        for v in &record.vector {
            write!(writer, " {:.*}", PRECISION, v)?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

/// Parses a vector file. Blank lines are skipped; every other line must
/// agree on the dimension set by the first one.
pub fn read_embeddings<R: BufRead>(reader: R) -> Result<Vec<EmbeddingRecord>, ParseError> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut dimension: Option<usize> = None;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            continue;
        };

        let vector = parts
            .map(|token| {
                token.parse::<f32>().map_err(|_| ParseError::InvalidComponent {
                    line: line_no,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;

        if vector.is_empty() {
            return Err(ParseError::MissingVector {
                line: line_no,
                word: word.to_string(),
            });
        }
        let expected = *dimension.get_or_insert(vector.len());
        if vector.len() != expected {
            return Err(ParseError::DimensionMismatch {
                line: line_no,
                expected,
                actual: vector.len(),
            });
        }
        if !seen.insert(word.to_string()) {
            return Err(ParseError::DuplicateWord {
                line: line_no,
                word: word.to_string(),
            });
        }

        records.push(EmbeddingRecord::new(word, vector));
    }

    if records.is_empty() {
        return Err(ParseError::NoRecords);
    }
    Ok(records)
}

/// Fails with `FileNotFound` or `FileEmpty` before anything is opened.
pub(crate) fn ensure_non_empty(path: &Path) -> EmbeddingResult<u64> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FileError::not_found(path, e),
        _ => FileError::loading(path, e),
    })?;

    if metadata.is_dir() {
        return Err(FileError::loading(path, "path is a directory"));
    }
    if metadata.len() == 0 {
        return Err(FileError::empty(path, "file has no content"));
    }
    Ok(metadata.len())
}

/// Loads a vector file written by [`save_embeddings`].
///
/// Missing and empty files map to their own kinds; open and parse failures
/// are `FileLoadingError`.
pub fn load_embeddings(path: impl AsRef<Path>) -> EmbeddingResult<Vec<EmbeddingRecord>> {
    let path = path.as_ref();
    let bytes = ensure_non_empty(path)?;

    let file = File::open(path).map_err(|e| FileError::loading(path, e))?;
    let records = read_embeddings(BufReader::new(file)).map_err(|e| FileError::loading(path, e))?;

    debug!(path = %path.display(), bytes, words = records.len(), "Loaded embeddings");
    Ok(records)
}
