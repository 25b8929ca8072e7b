//! Static description of the record layout: which header feeds which field, and how the
//! raw text of that column becomes a typed value.
//!
//! Columns are located by header text, never by position, so files with reordered columns
//! parse identically.

use crate::error::ConversionError;
use crate::record::Record;
use crate::rules::TIMESTAMP_PATTERN;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Literal token standing for an absent value in nullable decimal and text columns.
pub const NULL_SENTINEL: &str = "NULL";

pub const START_DATE_HEADER: &str = "Start date";
pub const SAVINGS_AMOUNT_HEADER: &str = "Savings amount";
pub const COMPLEXITY_HEADER: &str = "Complexity";

pub type Converter = fn(&mut Record, &str) -> Result<(), ConversionError>;

pub struct FieldSpec {
    /// Field name on [`Record`].
    pub name: &'static str,
    /// Column header in the source file.
    pub header: &'static str,
    pub convert: Converter,
}

pub const FIELD_COUNT: usize = 8;

pub static FIELDS: [FieldSpec; FIELD_COUNT] = [
    FieldSpec { name: "project", header: "Project", convert: convert_project },
    FieldSpec { name: "description", header: "Description", convert: convert_description },
    FieldSpec { name: "start_date", header: START_DATE_HEADER, convert: convert_start_date },
    FieldSpec { name: "category", header: "Category", convert: convert_category },
    FieldSpec { name: "responsible", header: "Responsible", convert: convert_responsible },
    FieldSpec { name: "savings_amount", header: SAVINGS_AMOUNT_HEADER, convert: convert_savings_amount },
    FieldSpec { name: "currency", header: "Currency", convert: convert_currency },
    FieldSpec { name: "complexity", header: COMPLEXITY_HEADER, convert: convert_complexity },
];

fn convert_project(r: &mut Record, text: &str) -> Result<(), ConversionError> {
    r.project = text
        .parse::<i32>()
        .map_err(|e| ConversionError::new("Project", text, e.to_string()))?;
    Ok(())
}

fn convert_description(r: &mut Record, text: &str) -> Result<(), ConversionError> {
    r.description = nullable_text(text);
    Ok(())
}

fn convert_start_date(r: &mut Record, text: &str) -> Result<(), ConversionError> {
    r.start_date = parse_start_date(text)?;
    Ok(())
}

fn convert_category(r: &mut Record, text: &str) -> Result<(), ConversionError> {
    r.category = nullable_text(text);
    Ok(())
}

fn convert_responsible(r: &mut Record, text: &str) -> Result<(), ConversionError> {
    r.responsible = nullable_text(text);
    Ok(())
}

fn convert_savings_amount(r: &mut Record, text: &str) -> Result<(), ConversionError> {
    r.savings_amount = parse_savings_amount(text)?;
    Ok(())
}

fn convert_currency(r: &mut Record, text: &str) -> Result<(), ConversionError> {
    r.currency = nullable_text(text);
    Ok(())
}

fn convert_complexity(r: &mut Record, text: &str) -> Result<(), ConversionError> {
    r.complexity = text.to_string();
    Ok(())
}

// Layouts accepted when converting a start date. Conformance to the single required
// layout is checked separately, against the raw text.
const DATE_TIME_LAYOUTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
];
const DATE_LAYOUTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

fn nullable_text(text: &str) -> Option<String> {
    (text != NULL_SENTINEL).then(|| text.to_string())
}

fn parse_savings_amount(text: &str) -> Result<Option<Decimal>, ConversionError> {
    if text.is_empty() || text == NULL_SENTINEL {
        return Ok(None);
    }
    Decimal::from_str(text)
        .map(Some)
        .map_err(|e| ConversionError::new(SAVINGS_AMOUNT_HEADER, text, e.to_string()))
}

fn parse_start_date(text: &str) -> Result<Option<NaiveDateTime>, ConversionError> {
    if text.is_empty() {
        return Ok(None);
    }

    for layout in DATE_TIME_LAYOUTS {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(Some(date));
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(text, layout) {
            return Ok(date.and_hms_opt(0, 0, 0));
        }
    }

    Err(ConversionError::new(
        START_DATE_HEADER,
        text,
        "not recognized as a valid date and time",
    ))
}

/// True when `raw` is exactly `yyyy-MM-dd HH:mm:ss.fff`, surrounding whitespace aside.
pub fn matches_timestamp_format(raw: &str) -> bool {
    const SHAPE: &[u8; 23] = b"0000-00-00 00:00:00.000";

    let raw = raw.trim();
    if raw.len() != SHAPE.len() {
        return false;
    }
    let shaped = raw.bytes().zip(SHAPE.iter().copied()).all(|(b, s)| match s {
        b'0' => b.is_ascii_digit(),
        literal => b == literal,
    });

    shaped && NaiveDateTime::parse_from_str(raw, TIMESTAMP_PATTERN).is_ok()
}

/// Position of every schema field within one particular file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; FIELD_COUNT],
}

impl ColumnMap {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut columns = [None; FIELD_COUNT];
        for (slot, field) in columns.iter_mut().zip(FIELDS.iter()) {
            *slot = headers.iter().position(|h| h == field.header);
        }
        Self { columns }
    }

    pub fn column_of(&self, header: &str) -> Option<usize> {
        FIELDS
            .iter()
            .position(|f| f.header == header)
            .and_then(|i| self.columns[i])
    }

    pub fn missing(&self) -> impl Iterator<Item = &'static FieldSpec> + '_ {
        FIELDS
            .iter()
            .zip(self.columns.iter())
            .filter(|(_, c)| c.is_none())
            .map(|(f, _)| f)
    }

    /// Raw, untrimmed cell for a header, if both the column and the cell exist.
    pub fn raw<'r>(&self, row: &'r StringRecord, header: &str) -> Option<&'r str> {
        self.column_of(header).and_then(|c| row.get(c))
    }

    /// Builds a record from every schema field, stopping at the first field that fails.
    pub fn convert(&self, row: &StringRecord) -> Result<Record, ConversionError> {
        let mut record = Record::default();

        for (field, column) in FIELDS.iter().zip(self.columns.iter().copied()) {
            let column = column
                .ok_or_else(|| ConversionError::new(field.header, "", "column is missing from the header"))?;
            let text = row
                .get(column)
                .ok_or_else(|| ConversionError::new(field.header, "", "row has no value for this column"))?;

            (field.convert)(&mut record, text.trim())?;
        }

        Ok(record)
    }
}
