use crate::error::{ParserError, Result};
use crate::extractor::{Extractor, RecordStream};
use crate::record::Record;
use crate::rules::ValidationRules;
use crate::schema::{ColumnMap, START_DATE_HEADER};

use csv::{ErrorKind, ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Dialect of a delimited text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedFormat {
    pub name: &'static str,
    pub delimiter: u8,
    pub quote: u8,
    pub comment: Option<u8>,
}

impl DelimitedFormat {
    pub const TSV: Self = Self {
        name: "tsv",
        delimiter: b'\t',
        quote: b'"',
        comment: Some(b'#'),
    };

    pub const CSV: Self = Self {
        name: "csv",
        delimiter: b',',
        quote: b'"',
        comment: Some(b'#'),
    };

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .comment(self.comment)
            .has_headers(true)
            .flexible(true);
        builder
    }
}

/// Extractor for any [`DelimitedFormat`] stored in a file.
#[derive(Debug, Clone)]
pub struct DelimitedExtractor {
    path: PathBuf,
    format: DelimitedFormat,
    rules: Arc<ValidationRules>,
}

impl DelimitedExtractor {
    pub fn new(path: impl Into<PathBuf>, format: DelimitedFormat, rules: Arc<ValidationRules>) -> Self {
        Self {
            path: path.into(),
            format,
            rules,
        }
    }
}

impl Extractor for DelimitedExtractor {
    fn format_name(&self) -> &'static str {
        self.format.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Box<dyn RecordStream + Send>> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ParserError::FileNotFound(self.path.clone()),
            _ => ParserError::Io(e),
        })?;
        debug!(path = %self.path.display(), format = self.format.name, "Opened input");

        let extraction = Extraction::new(file, self.format, Arc::clone(&self.rules))?;
        Ok(Box::new(extraction))
    }
}

/// One pass over a delimited source.
pub struct Extraction<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    columns: ColumnMap,
    rules: Arc<ValidationRules>,
    format: DelimitedFormat,
    row: StringRecord,
    finished: bool,
}

impl<R: Read> Extraction<R> {
    /// Reads the header row immediately; rows are read only as the extraction is iterated.
    pub fn new(input: R, format: DelimitedFormat, rules: Arc<ValidationRules>) -> Result<Self> {
        let mut reader = format.reader_builder().from_reader(input);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ParserError::MissingHeader);
        }

        let columns = ColumnMap::from_headers(&headers);
        for field in columns.missing() {
            warn!(
                column = field.header,
                field = field.name,
                "Column missing from header, rows will be faulty"
            );
        }

        Ok(Self {
            reader,
            headers,
            columns,
            rules,
            format,
            row: StringRecord::new(),
            finished: false,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn extract_row(&self) -> Record {
        let line = self.row.position().map_or(0, |p| p.line());

        let mut record = match self.columns.convert(&self.row) {
            Ok(record) => record,
            Err(e) => {
                debug!(line, error = %e, "Row failed conversion");
                return Record::faulty(e.to_string());
            }
        };

        let start_date_raw = self
            .columns
            .raw(&self.row, START_DATE_HEADER)
            .map(str::trim)
            .unwrap_or_default();
        let violations = self.rules.check(&record.complexity, start_date_raw);

        if !violations.is_empty() {
            debug!(line, violations = violations.len(), "Row violates business rules");
            record.error = format!("{}\nRaw record: {}", violations.join("\n"), self.raw_text());
        }

        record
    }

    /// The current row re-encoded in the source dialect, quoting included.
    fn raw_text(&self) -> String {
        let mut writer = WriterBuilder::new()
            .delimiter(self.format.delimiter)
            .quote(self.format.quote)
            .from_writer(Vec::new());

        let encoded = match writer.write_record(&self.row) {
            Ok(()) => writer.into_inner().ok(),
            Err(_) => None,
        };

        match encoded {
            Some(bytes) => String::from_utf8_lossy(&bytes)
                .trim_end_matches(['\r', '\n'])
                .to_string(),
            None => {
                let delimiter = char::from(self.format.delimiter).to_string();
                self.row.iter().collect::<Vec<_>>().join(&delimiter)
            }
        }
    }
}

impl<R: Read> Iterator for Extraction<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        while !self.finished {
            match self.reader.read_record(&mut self.row) {
                Ok(false) => self.finished = true,
                Ok(true) => {
                    // Whitespace-only rows count as blank lines.
                    if self.row.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }
                    return Some(self.extract_row());
                }
                Err(e) => {
                    if let ErrorKind::Io(_) = e.kind() {
                        error!(error = %e, "Input could not be read, stopping");
                        self.finished = true;
                        return Some(Record::faulty(format!("Input could not be read: {}", e)));
                    }
                    debug!(error = %e, "Row could not be read");
                    return Some(Record::faulty(e.to_string()));
                }
            }
        }
        None
    }
}

impl<R: Read> RecordStream for Extraction<R> {
    fn headers(&self) -> &[String] {
        &self.headers
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_start_matches('\u{feff}').trim().to_string()
}
