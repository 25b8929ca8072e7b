use crate::error::Result;
use crate::record::Record;

use csv::WriterBuilder;
use std::io::Write;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub valid: usize,
    pub faulty: usize,
}

impl ReportSummary {
    pub fn total(&self) -> usize {
        self.valid + self.faulty
    }
}

/// Writes valid records to `out` as tab-delimited rows under `headers`, in the order the
/// headers give, and the diagnostic of every faulty record to `err`.
///
/// Headers the record does not know are written as empty cells. With no headers nothing
/// goes to `out`.
pub fn dump_records<W: Write, E: Write>(
    records: &[Record],
    headers: &[String],
    out: W,
    mut err: E,
) -> Result<ReportSummary> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(out);
    let mut summary = ReportSummary::default();

    if !headers.is_empty() {
        writer.write_record(headers)?;
    }

    for record in records {
        if record.is_valid() {
            if !headers.is_empty() {
                writer.write_record(headers.iter().map(|h| record.field_text(h).unwrap_or_default()))?;
            }
            summary.valid += 1;
        } else {
            writeln!(&mut err, "{}", record.error)?;
            summary.faulty += 1;
        }
    }

    writer.flush()?;
    err.flush()?;

    Ok(summary)
}
