use crate::error::Result;
use crate::extractor::{Extractor, RecordStream};
use crate::record::Record;

/// Entry point for consumers: every query opens a fresh pass over the source.
///
/// Nothing is buffered here; ordering or further filtering composes over the returned
/// stream.
pub struct RecordQuery {
    extractor: Box<dyn Extractor>,
}

impl RecordQuery {
    pub fn new(extractor: Box<dyn Extractor>) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }

    pub fn all(&self) -> Result<Box<dyn RecordStream + Send>> {
        self.extractor.open()
    }

    /// Records whose project equals `project`, in source order. Faulty rows carry the
    /// default project and are only returned when asking for project 0.
    pub fn by_project(&self, project: i32) -> Result<Box<dyn RecordStream + Send>> {
        let inner = self.extractor.open()?;
        Ok(Box::new(ProjectFilter { inner, project }))
    }

    /// Header columns of the source. Costs an open and a header read.
    pub fn headers(&self) -> Result<Vec<String>> {
        Ok(self.extractor.open()?.headers().to_vec())
    }
}

struct ProjectFilter {
    inner: Box<dyn RecordStream + Send>,
    project: i32,
}

impl Iterator for ProjectFilter {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let project = self.project;
        self.inner.by_ref().find(|r| r.project == project)
    }
}

impl RecordStream for ProjectFilter {
    fn headers(&self) -> &[String] {
        self.inner.headers()
    }
}
