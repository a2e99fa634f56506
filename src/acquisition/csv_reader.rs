//! Robust Tabular Reader
//!
//! Field CSV exports arrive in whatever encoding and delimiter the logging
//! software happened to use. The reader decodes the bytes (BOM, UTF-8, GBK,
//! then windows-1252), sniffs the delimiter from the leading lines, and tries
//! each candidate delimiter until one yields at least two columns.
//!
//! The result is a [`RawFrame`]: header labels exactly as written plus
//! string cells, with blank and NA-style markers mapped to missing.

use encoding_rs::{Encoding, GBK, UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Candidate delimiters, in fallback order.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Lines inspected when sniffing the delimiter.
const SNIFF_LINES: usize = 10;

/// Cell spellings treated as missing.
const MISSING_MARKERS: [&str; 8] = ["NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// Reader errors. All of them make a single file unusable, nothing more.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file contains no data")]
    Empty,

    #[error("no delimiter produced at least two columns")]
    NoTabularLayout,

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

// ============================================================================
// Raw Frame
// ============================================================================

/// A decoded table of string cells with unknown column semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    /// Header labels as written in the file
    pub headers: Vec<String>,
    /// Rows padded or truncated to the header width; `None` = missing cell
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawFrame {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text at (row, column), `None` when missing.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Read and decode a delimited text file into a [`RawFrame`].
pub fn read_table(path: &Path) -> Result<RawFrame, ReadError> {
    let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, encoding) = decode(&bytes);
    debug!(file = %path.display(), encoding = encoding.name(), "Decoded table");
    parse_text(&text)
}

/// Parse already-decoded text, trying every candidate delimiter.
pub fn parse_text(text: &str) -> Result<RawFrame, ReadError> {
    if text.trim().is_empty() {
        return Err(ReadError::Empty);
    }

    let sniffed = sniff_delimiter(text);
    let order = sniffed
        .into_iter()
        .chain(DELIMITERS.into_iter().filter(|d| Some(*d) != sniffed));

    let mut last_error = None;
    for delimiter in order {
        match parse_with_delimiter(text, delimiter) {
            Ok(frame) if frame.width() >= 2 => return Ok(frame),
            Ok(_) => {}
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.map_or(ReadError::NoTabularLayout, ReadError::from))
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode raw bytes: BOM first, then strict UTF-8, strict GBK, and finally
/// windows-1252 (which accepts any byte sequence).
fn decode(bytes: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text, encoding);
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (Cow::Borrowed(text), UTF_8);
    }
    if let Some(text) = GBK.decode_without_bom_handling_and_without_replacement(bytes) {
        return (text, GBK);
    }
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    (text, WINDOWS_1252)
}

// ============================================================================
// Delimiter Sniffing
// ============================================================================

/// Pick the delimiter whose per-line count is most consistent across the
/// leading non-blank lines. Ties go to the delimiter with more occurrences.
fn sniff_delimiter(text: &str) -> Option<u8> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    let header = *lines.first()?;

    let count = |line: &str, d: u8| line.bytes().filter(|b| *b == d).count();

    DELIMITERS
        .into_iter()
        .filter(|d| count(header, *d) > 0)
        .max_by_key(|d| {
            let expected = count(header, *d);
            let consistent = lines.iter().filter(|l| count(*l, *d) == expected).count();
            (consistent, expected)
        })
}

fn parse_with_delimiter(text: &str, delimiter: u8) -> Result<RawFrame, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let row: Vec<Option<String>> = (0..width)
            .map(|i| record.get(i).and_then(clean_cell))
            .collect();
        rows.push(row);
    }

    Ok(RawFrame { headers, rows })
}

fn clean_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(raw.to_string())
    }
}
