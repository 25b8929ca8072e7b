use crate::extractor::{DelimitedExtractor, DelimitedFormat, Extractor};
use crate::rules::ValidationRules;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub type ExtractorConstructor = fn(PathBuf, Arc<ValidationRules>) -> Box<dyn Extractor>;

/// Extension used when a file has none, or one nobody registered.
pub const DEFAULT_EXTENSION: &str = "tsv";

/// Maps a lower-cased file extension to the extractor that reads it.
///
/// Populated once at start-up. A new format plugs in through [`ParserRegistry::register`]
/// without touching the existing ones.
pub struct ParserRegistry {
    rules: Arc<ValidationRules>,
    constructors: HashMap<String, ExtractorConstructor>,
}

impl ParserRegistry {
    /// Registry with the built-in formats.
    pub fn new(rules: Arc<ValidationRules>) -> Self {
        let mut registry = Self {
            rules,
            constructors: HashMap::new(),
        };
        registry.register(DEFAULT_EXTENSION, tsv_extractor);
        registry.register("csv", csv_extractor);
        registry
    }

    /// Returns the constructor previously registered for the extension, if any.
    pub fn register(
        &mut self,
        extension: &str,
        constructor: ExtractorConstructor,
    ) -> Option<ExtractorConstructor> {
        let key = extension.trim_start_matches('.').to_lowercase();
        self.constructors.insert(key, constructor)
    }

    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Never fails: unknown or missing extensions fall back to the tab-delimited reader.
    pub fn resolve(&self, filename: impl AsRef<Path>) -> Box<dyn Extractor> {
        let path = filename.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let constructor = match self.constructors.get(&extension) {
            Some(constructor) => *constructor,
            None => {
                debug!(extension = %extension, "No extractor registered, using default");
                self.constructors
                    .get(DEFAULT_EXTENSION)
                    .copied()
                    .unwrap_or(tsv_extractor)
            }
        };

        let extractor = constructor(path.to_path_buf(), Arc::clone(&self.rules));
        debug!(path = %path.display(), format = extractor.format_name(), "Resolved extractor");
        extractor
    }
}

fn tsv_extractor(path: PathBuf, rules: Arc<ValidationRules>) -> Box<dyn Extractor> {
    Box::new(DelimitedExtractor::new(path, DelimitedFormat::TSV, rules))
}

fn csv_extractor(path: PathBuf, rules: Arc<ValidationRules>) -> Box<dyn Extractor> {
    Box::new(DelimitedExtractor::new(path, DelimitedFormat::CSV, rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::extractor::RecordStream;

    fn registry() -> ParserRegistry {
        ParserRegistry::new(Arc::new(ValidationRules::default()))
    }

    struct PipeExtractor {
        path: PathBuf,
    }

    impl Extractor for PipeExtractor {
        fn format_name(&self) -> &'static str {
            "psv"
        }

        fn path(&self) -> &Path {
            &self.path
        }

        fn open(&self) -> Result<Box<dyn RecordStream + Send>> {
            unimplemented!("not opened in these tests")
        }
    }

    fn pipe_extractor(path: PathBuf, _rules: Arc<ValidationRules>) -> Box<dyn Extractor> {
        Box::new(PipeExtractor { path })
    }

    #[test]
    fn test_resolve_by_extension() {
        let registry = registry();

        assert_eq!(registry.resolve("ExampleData.tsv").format_name(), "tsv");
        assert_eq!(registry.resolve("ExampleData.csv").format_name(), "csv");
        assert_eq!(registry.resolve("/data/EXPORT.CSV").format_name(), "csv");
    }

    #[test]
    fn test_resolve_falls_back_to_tsv() {
        let registry = registry();

        assert_eq!(registry.resolve("ExampleData.xml").format_name(), "tsv");
        assert_eq!(registry.resolve("ExampleData").format_name(), "tsv");
        assert_eq!(registry.resolve("").format_name(), "tsv");
    }

    #[test]
    fn test_resolve_binds_path() {
        let extractor = registry().resolve("input/ExampleData.tsv");
        assert_eq!(extractor.path(), Path::new("input/ExampleData.tsv"));
    }

    #[test]
    fn test_register_new_format() {
        let mut registry = registry();
        assert!(registry.register(".PSV", pipe_extractor).is_none());

        assert_eq!(registry.extensions(), vec!["csv", "psv", "tsv"]);
        assert_eq!(registry.resolve("data.psv").format_name(), "psv");
        assert_eq!(registry.resolve("data.tsv").format_name(), "tsv");
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = registry();
        assert!(registry.register("csv", pipe_extractor).is_some());
        assert_eq!(registry.resolve("data.csv").format_name(), "psv");
    }
}
