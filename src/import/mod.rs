pub mod csv_file;
pub mod delimited;
pub mod mailbox;
pub mod remote;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::Application;
use crate::tracker::JobTracker;

pub use csv_file::CsvImportSource;
pub use delimited::RowFilter;
pub use mailbox::ImapImportSource;
pub use remote::RemoteCsvImportSource;

/// Anything that can produce template applications (id 0, possibly partial).
///
/// Sources never fill in defaults; that is the tracker's job.
pub trait ImportSource {
    fn fetch_applications(&mut self) -> Result<Vec<Application>>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
}

/// Pulls candidates from one source and adds each through the tracker.
pub struct ImportService<'a> {
    tracker: &'a JobTracker,
    source: &'a mut dyn ImportSource,
}

impl<'a> ImportService<'a> {
    pub fn new(tracker: &'a JobTracker, source: &'a mut dyn ImportSource) -> Self {
        Self { tracker, source }
    }

    /// Imports every candidate the source returns.
    ///
    /// A failing fetch is returned as an error. A failing add only counts
    /// toward `failed`; the remaining candidates are still imported.
    pub fn run_once(&mut self) -> Result<ImportSummary> {
        let candidates = self.source.fetch_applications()?;
        let mut summary = ImportSummary {
            total: candidates.len(),
            ..Default::default()
        };

        for candidate in &candidates {
            match self.tracker.add(candidate) {
                Ok(stored) if stored.id != 0 => summary.imported += 1,
                Ok(_) => {}
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        company = %candidate.company,
                        position = %candidate.position,
                        error = %e,
                        "failed to import application"
                    );
                }
            }
        }

        info!(
            total = summary.total,
            imported = summary.imported,
            failed = summary.failed,
            "import finished"
        );
        Ok(summary)
    }
}
