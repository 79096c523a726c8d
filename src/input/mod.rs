//! Timestamp file input.
//!
//! Capture runs persist raw timestamps either as a flat binary file of
//! little-endian u64 values or as a text file with one integer per row.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading a timestamp file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary files must be an exact sequence of 8-byte records.
    #[error("binary file is truncated ({0} trailing bytes)")]
    TruncatedRecord(usize),

    #[error("line {line}: invalid timestamp {value:?}")]
    InvalidTimestamp { line: usize, value: String },

    #[error("cannot infer timestamp format from {0:?}; pass --format")]
    UnknownFormat(String),
}

/// On-disk encoding of a timestamp file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Flat sequence of little-endian u64 values.
    Binary,
    /// One integer per row, optionally with trailing comma-separated fields.
    Csv,
}

impl TimestampFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        match ext.to_ascii_lowercase().as_str() {
            "bin" | "dat" => Some(Self::Binary),
            "csv" | "txt" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Parse a format name given on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bin" | "binary" => Some(Self::Binary),
            "csv" | "text" | "txt" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Read raw timestamps from a file in the given (or inferred) format.
pub fn read_timestamps(
    path: &Path,
    format: Option<TimestampFormat>,
) -> Result<Vec<u64>, InputError> {
    let format = match format.or_else(|| TimestampFormat::from_path(path)) {
        Some(f) => f,
        None => return Err(InputError::UnknownFormat(path.display().to_string())),
    };

    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.display().to_string(),
        source,
    })?;

    match format {
        TimestampFormat::Binary => parse_binary(file),
        TimestampFormat::Csv => parse_csv(BufReader::new(file)),
    }
}

/// Parse a flat stream of little-endian u64 timestamps.
pub fn parse_binary<R: Read>(mut reader: R) -> Result<Vec<u64>, InputError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;

    if raw.len() % 8 != 0 {
        return Err(InputError::TruncatedRecord(raw.len() % 8));
    }

    let mut buf = [0u8; 8];
    Ok(raw
        .chunks_exact(8)
        .map(|chunk| {
            buf.copy_from_slice(chunk);
            u64::from_le_bytes(buf)
        })
        .collect())
}

/// Parse one integer per line. Blank lines are skipped; rows may carry
/// trailing comma-separated fields, of which only the first is read.
pub fn parse_csv<R: BufRead>(reader: R) -> Result<Vec<u64>, InputError> {
    let mut timestamps = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let field = line.split(',').next().unwrap_or("").trim();
        if field.is_empty() {
            continue;
        }
        let value = field
            .parse::<u64>()
            .map_err(|_| InputError::InvalidTimestamp {
                line: i + 1,
                value: field.to_string(),
            })?;
        timestamps.push(value);
    }

    Ok(timestamps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn test_format_inference() {
        assert_eq!(
            TimestampFormat::from_path(&PathBuf::from("keystrokes.bin")),
            Some(TimestampFormat::Binary)
        );
        assert_eq!(
            TimestampFormat::from_path(&PathBuf::from("keystrokes.CSV")),
            Some(TimestampFormat::Csv)
        );
        assert_eq!(TimestampFormat::from_path(&PathBuf::from("keystrokes")), None);
    }

    #[test]
    fn test_parse_binary_little_endian() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&42u64.to_le_bytes());
        raw.extend_from_slice(&u64::MAX.to_le_bytes());

        let values = parse_binary(Cursor::new(raw)).unwrap();
        assert_eq!(values, vec![42, u64::MAX]);
    }

    #[test]
    fn test_parse_binary_rejects_trailing_bytes() {
        let raw = vec![0u8; 11];
        match parse_binary(Cursor::new(raw)) {
            Err(InputError::TruncatedRecord(3)) => {}
            other => panic!("expected TruncatedRecord(3), got {other:?}"),
        }
    }

    #[test]
    fn test_parse_csv_rows() {
        let text = "1005\n1022\n\n1049,extra\n";
        let values = parse_csv(Cursor::new(text)).unwrap();
        assert_eq!(values, vec![1005, 1022, 1049]);
    }

    #[test]
    fn test_parse_csv_rejects_garbage() {
        let text = "1005\nnot-a-number\n";
        match parse_csv(Cursor::new(text)) {
            Err(InputError::InvalidTimestamp { line: 2, .. }) => {}
            other => panic!("expected InvalidTimestamp on line 2, got {other:?}"),
        }
    }
}
