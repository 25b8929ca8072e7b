//! Turning one input source into a lazy, single-pass sequence of [`Record`]s.
//!
//! An [`Extractor`] is bound to a source and opens it on demand. Every call to
//! [`Extractor::open`] starts a fresh pass; a [`RecordStream`] itself cannot be rewound.

pub mod delimited;


pub use delimited::{DelimitedExtractor, DelimitedFormat, Extraction};

use crate::error::Result;
use crate::record::Record;

use std::path::Path;

/// Records of one opened source, produced as the caller pulls them.
///
/// Each row yields exactly one record; row-level problems are reported through
/// [`Record::error`] and never end the stream. Dropping the stream releases the source.
pub trait RecordStream: Iterator<Item = Record> {
    /// Header columns as they appear in the source, trimmed.
    fn headers(&self) -> &[String];
}

pub trait Extractor: Send + Sync {
    /// Short name of the format, e.g. `"tsv"`.
    fn format_name(&self) -> &'static str;

    fn path(&self) -> &Path;

    /// Opens the source and reads its header. Fails only when the source is missing,
    /// unreadable or has no header.
    fn open(&self) -> Result<Box<dyn RecordStream + Send>>;
}
