use std::path::{Path, PathBuf};

use tracing::debug;

use super::ImportSource;
use super::delimited::{self, RowFilter};
use crate::error::{Error, Result};
use crate::models::Application;

/// Reads applications from a local delimited file with a header row.
///
/// Recognized columns: company, position, location, source, status,
/// applied_date, last_update, notes. Others are ignored.
pub struct CsvImportSource {
    path: PathBuf,
    delimiter: char,
    filter: RowFilter,
}

impl CsvImportSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: ',',
            filter: RowFilter::RequireEither,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_row_filter(mut self, filter: RowFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl ImportSource for CsvImportSource {
    fn fetch_applications(&mut self) -> Result<Vec<Application>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let apps = delimited::parse(&content, self.delimiter, self.filter)?;
        debug!(path = %self.path.display(), rows = apps.len(), "parsed CSV file");
        Ok(apps)
    }
}
