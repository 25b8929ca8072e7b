pub mod error;
pub mod extractor;
pub mod query;
pub mod record;
pub mod registry;
pub mod report;
pub mod rules;
pub mod schema;

pub use error::{ConversionError, ParserError, Result};
pub use extractor::{DelimitedExtractor, DelimitedFormat, Extractor, RecordStream};
pub use query::RecordQuery;
pub use record::{sort_by_start_date, Record};
pub use registry::ParserRegistry;
pub use rules::ValidationRules;

use std::path::Path;
use std::sync::Arc;

/// Opens `path` with the extractor registered for its extension and streams its records.
pub fn stream_records(
    path: impl AsRef<Path>,
    rules: Arc<ValidationRules>,
) -> Result<Box<dyn RecordStream + Send>> {
    ParserRegistry::new(rules).resolve(path).open()
}
