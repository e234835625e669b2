//! Delimited-text parser with delimiter detection.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, WindlineError};
use crate::table::{Table, Value};

use super::source::SourceMetadata;

/// Candidates for auto-detection, in tie-break order.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Lines sampled by [`detect_delimiter`].
const SAMPLE_LINES: usize = 10;

/// How delimited text is read.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Fixed field separator; `None` detects it.
    pub delimiter: Option<u8>,
    /// First record holds the column names.
    pub has_header: bool,
    /// Stop after this many data rows; `None` reads everything.
    pub max_rows: Option<usize>,
    /// Quote character, honored by detection and parsing alike.
    pub quote: u8,
}

impl ParserConfig {
    /// Configuration with a fixed delimiter.
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
            ..Self::default()
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses delimited text files into tables.
///
/// Cells are kept verbatim as [`Value::Text`]; nothing is trimmed or typed.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the table and its metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| WindlineError::io(path, e))?;
        let (table, delimiter) = self.parse_detect(&contents)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };

        let metadata = SourceMetadata::describe(path, &contents, format, &table);

        debug!(file = %metadata.file, rows = metadata.row_count, format = %metadata.format, "parsed delimited file");
        Ok((table, metadata))
    }

    /// Parse in-memory text.
    pub fn parse_str(&self, text: &str) -> Result<Table> {
        self.parse_detect(text.as_bytes()).map(|(table, _)| table)
    }

    fn parse_detect(&self, bytes: &[u8]) -> Result<(Table, u8)> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes, self.config.quote)?,
        };
        Ok((self.parse_bytes(bytes, delimiter)?, delimiter))
    }

    /// Parse bytes with a known delimiter.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();

        let headers: Vec<String> = if self.config.has_header {
            match records.next() {
                Some(record) => record?.iter().map(|s| s.to_string()).collect(),
                None => return Err(WindlineError::EmptyData("No header row found".to_string())),
            }
        } else {
            Vec::new()
        };

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for result in records {
            if let Some(max) = self.config.max_rows {
                if rows.len() >= max {
                    break;
                }
            }
            let record = result?;
            rows.push(record.iter().map(Value::text).collect());
        }

        let headers = if self.config.has_header {
            headers
        } else {
            // column_N, as wide as the widest row
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            (0..width).map(|i| format!("column_{}", i + 1)).collect()
        };

        if headers.is_empty() {
            return Err(WindlineError::EmptyData("No columns found".to_string()));
        }

        let width = headers.len();
        for row in rows.iter_mut() {
            row.resize(width, Value::text(""));
        }

        Table::with_rows(headers, rows)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Guess the field separator from the first non-blank lines.
///
/// Separators between `quote` characters are not counted. A candidate seen
/// the same number of times on every sampled line beats one whose count
/// varies. Among equals the higher count wins, and tab wins a tie.
pub fn detect_delimiter(bytes: &[u8], quote: u8) -> Result<u8> {
    let sample: Vec<&[u8]> = bytes
        .split(|&b| b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .take(SAMPLE_LINES)
        .collect();

    if sample.is_empty() {
        return Err(WindlineError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best = (b',', 0);
    for &delimiter in DELIMITERS {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| count_unquoted(line, delimiter, quote))
            .collect();
        let score = delimiter_score(&counts, delimiter);
        if score > best.1 {
            best = (delimiter, score);
        }
    }

    let (delimiter, _) = best;
    debug!(delimiter = ?(delimiter as char), "detected delimiter");
    Ok(delimiter)
}

fn delimiter_score(counts: &[usize], delimiter: u8) -> usize {
    let header = counts[0];
    if header == 0 {
        return 0;
    }
    let lowest = counts.iter().copied().min().unwrap_or(0);
    let highest = counts.iter().copied().max().unwrap_or(0);

    match highest - lowest {
        0 if delimiter == b'\t' => header * 1000 + 100,
        0 => header * 1000,
        1 => header * 100,
        _ => header,
    }
}

/// Occurrences of `delimiter` outside `quote` pairs.
fn count_unquoted(line: &[u8], delimiter: u8, quote: u8) -> usize {
    line.iter()
        .scan(false, |quoted, &b| {
            if b == quote {
                *quoted = !*quoted;
            }
            Some(b == delimiter && !*quoted)
        })
        .filter(|&hit| hit)
        .count()
}
