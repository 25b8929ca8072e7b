use crate::rules::TIMESTAMP_PATTERN;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// One parsed row. A non-empty `error` marks the row as faulty, in which case the
/// remaining fields are best-effort only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Record {
    #[serde(rename = "Project")]
    pub project: i32,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Start date", serialize_with = "serialize_start_date")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Responsible")]
    pub responsible: Option<String>,
    #[serde(rename = "Savings amount")]
    pub savings_amount: Option<Decimal>,
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Complexity")]
    pub complexity: String,
    #[serde(skip)]
    pub error: String,
}

impl Record {
    pub fn faulty(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_empty()
    }

    /// Display text of the field behind a file header, in the file's own notation.
    /// Returns `None` for headers the record does not carry.
    pub fn field_text(&self, header: &str) -> Option<String> {
        let text = match header {
            "Project" => self.project.to_string(),
            "Description" => self.description.clone().unwrap_or_default(),
            "Start date" => self
                .start_date
                .map(|d| d.format(TIMESTAMP_PATTERN).to_string())
                .unwrap_or_default(),
            "Category" => self.category.clone().unwrap_or_default(),
            "Responsible" => self.responsible.clone().unwrap_or_default(),
            "Savings amount" => self
                .savings_amount
                .map(|a| a.to_string())
                .unwrap_or_default(),
            "Currency" => self.currency.clone().unwrap_or_default(),
            "Complexity" => self.complexity.clone(),
            _ => return None,
        };
        Some(text)
    }
}

// `error` is left out so that differently annotated but otherwise identical rows compare equal.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.project == other.project
            && self.description == other.description
            && self.start_date == other.start_date
            && self.category == other.category
            && self.responsible == other.responsible
            && self.savings_amount == other.savings_amount
            && self.currency == other.currency
            && self.complexity == other.complexity
    }
}

impl Eq for Record {}

fn serialize_start_date<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.collect_str(&date.format(TIMESTAMP_PATTERN)),
        None => serializer.serialize_none(),
    }
}

/// Orders records by start date, oldest first. Records without a date come first and
/// ties keep their input order.
pub fn sort_by_start_date(records: &mut [Record]) {
    records.sort_by_key(|r| r.start_date);
}
