use crate::error::ParserError;
use crate::schema::matches_timestamp_format;

use std::str::FromStr;

/// Timestamp layout every `Start date` value must match, as displayed to users.
pub const TIMESTAMP_FORMAT: &str = "yyyy-MM-dd HH:mm:ss.fff";

/// The same layout in chrono notation.
pub const TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub const DEFAULT_COMPLEXITIES: [&str; 3] = ["Simple", "Moderate", "Hazardous"];

/// Business rules applied to rows after their fields converted.
///
/// Built once and shared read-only between extractors, usually behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    allowed_complexities: Vec<String>,
}

impl ValidationRules {
    /// Blank entries are dropped. If nothing is left the defaults apply.
    pub fn new<I, S>(complexities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed: Vec<String> = complexities
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if allowed.is_empty() {
            return Self::default();
        }

        Self {
            allowed_complexities: allowed,
        }
    }

    pub fn allowed_complexities(&self) -> &[String] {
        &self.allowed_complexities
    }

    pub fn timestamp_format(&self) -> &'static str {
        TIMESTAMP_FORMAT
    }

    pub fn is_allowed_complexity(&self, value: &str) -> bool {
        !value.trim().is_empty() && self.allowed_complexities.iter().any(|c| c == value)
    }

    /// Runs every business rule against a converted row and returns one line per violation.
    ///
    /// `start_date_raw` is the cell text as read, not the converted value, so a date that
    /// converted leniently can still be rejected for its layout.
    pub fn check(&self, complexity: &str, start_date_raw: &str) -> Vec<String> {
        let mut violations = Vec::new();

        if !self.is_allowed_complexity(complexity) {
            violations.push(format!(
                "Complexity value '{}' is not one of the allowed values: {}",
                complexity,
                self.allowed_display()
            ));
        }

        if !matches_timestamp_format(start_date_raw) {
            violations.push(format!(
                "Start date value '{}' does not match the required format: {}",
                start_date_raw,
                self.timestamp_format()
            ));
        }

        violations
    }

    /// The allowed set as it appears in diagnostics.
    pub fn allowed_display(&self) -> String {
        self.allowed_complexities.join(",")
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            allowed_complexities: DEFAULT_COMPLEXITIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Parses a comma-separated settings value such as `"Simple, Moderate"`.
impl FromStr for ValidationRules {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.split(',').any(|c| c.trim().contains(['\t', '\n', '\r'])) {
            return Err(ParserError::InvalidRules(format!(
                "complexity list '{}' contains control characters",
                s.escape_debug()
            )));
        }
        Ok(Self::new(s.split(',')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_complexities() {
        let rules = ValidationRules::default();
        assert_eq!(
            rules.allowed_complexities(),
            &["Simple".to_string(), "Moderate".to_string(), "Hazardous".to_string()]
        );
        assert_eq!(rules.allowed_display(), "Simple,Moderate,Hazardous");
        assert_eq!(rules.timestamp_format(), "yyyy-MM-dd HH:mm:ss.fff");
    }

    #[test]
    fn test_from_str_trims_entries() {
        let rules: ValidationRules = " Low , High ,".parse().unwrap();
        assert_eq!(rules.allowed_complexities(), &["Low".to_string(), "High".to_string()]);
        assert!(rules.is_allowed_complexity("Low"));
        assert!(!rules.is_allowed_complexity("Simple"));
    }

    #[test]
    fn test_blank_list_falls_back_to_defaults() {
        let rules: ValidationRules = " , ".parse().unwrap();
        assert_eq!(rules, ValidationRules::default());

        let rules = ValidationRules::new(Vec::<String>::new());
        assert_eq!(rules, ValidationRules::default());
    }

    #[test]
    fn test_control_characters_rejected() {
        let result = "Simple,Mod\terate".parse::<ValidationRules>();
        match result {
            Err(ParserError::InvalidRules(message)) => assert!(message.contains("Mod")),
            _ => panic!("Expected InvalidRules error"),
        }
    }

    #[test]
    fn test_check_valid_row() {
        let rules = ValidationRules::default();
        assert!(rules.check("Simple", "2009-06-01 00:00:00.000").is_empty());
    }

    #[test]
    fn test_check_bad_complexity() {
        let rules = ValidationRules::default();
        let violations = rules.check("VeryHigh", "2009-06-01 00:00:00.000");

        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("'VeryHigh'"));
        assert!(violations[0].contains("Simple,Moderate,Hazardous"));
    }

    #[test]
    fn test_check_accumulates_all_violations() {
        let rules = ValidationRules::default();
        let violations = rules.check("", "2013/01/01 00:00:00.000");

        assert_eq!(violations.len(), 2);
        assert!(violations[0].starts_with("Complexity value ''"));
        assert!(violations[1].contains("'2013/01/01 00:00:00.000'"));
        assert!(violations[1].contains("yyyy-MM-dd HH:mm:ss.fff"));
    }

    #[test]
    fn test_membership_is_exact() {
        let rules = ValidationRules::default();
        assert!(rules.is_allowed_complexity("Simple"));
        assert!(!rules.is_allowed_complexity("simple"));
        assert!(!rules.is_allowed_complexity(""));
        assert!(!rules.is_allowed_complexity("   "));
        assert!(!rules.is_allowed_complexity("VeryHigh"));
    }
}
