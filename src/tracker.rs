use crate::error::Result;
use crate::models::{Application, Statistics};
use crate::repository::ApplicationRepository;
use crate::util::{Clock, SystemClock};

pub const DEFAULT_STATUS: &str = "applied";

/// Applies default-value rules on top of a repository.
///
/// Every write path (manual add, CSV import, remote import) goes through
/// `add`, so defaults are filled in here and nowhere else.
pub struct JobTracker {
    repository: Box<dyn ApplicationRepository>,
    clock: Box<dyn Clock>,
}

impl JobTracker {
    pub fn new(repository: Box<dyn ApplicationRepository>) -> Self {
        Self::with_clock(repository, Box::new(SystemClock))
    }

    pub fn with_clock(repository: Box<dyn ApplicationRepository>, clock: Box<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Stores a copy of `template` with defaults applied and returns the stored record.
    ///
    /// Empty status becomes `"applied"`; empty `applied_date` and `last_update`
    /// each become today's date. Any incoming id is discarded.
    pub fn add(&self, template: &Application) -> Result<Application> {
        let mut app = template.clone();
        app.id = 0;

        if app.status.is_empty() {
            app.status = DEFAULT_STATUS.to_string();
        }
        if app.applied_date.is_empty() || app.last_update.is_empty() {
            let today = self.clock.today();
            if app.applied_date.is_empty() {
                app.applied_date = today.clone();
            }
            if app.last_update.is_empty() {
                app.last_update = today;
            }
        }

        self.repository.insert(&app)
    }

    pub fn list_all(&self) -> Result<Vec<Application>> {
        self.repository.find_all()
    }

    pub fn filter_by_status(&self, status: &str) -> Result<Vec<Application>> {
        self.repository.find_by_status(status)
    }

    pub fn get(&self, id: i64) -> Result<Option<Application>> {
        self.repository.find_by_id(id)
    }

    /// Sets a new status, replaces the notes with `note` and stamps `last_update`.
    ///
    /// Returns `false` without writing anything when `id` does not exist.
    pub fn update_status(&self, id: i64, new_status: &str, note: &str) -> Result<bool> {
        let Some(mut app) = self.repository.find_by_id(id)? else {
            return Ok(false);
        };

        app.status = new_status.to_string();
        app.notes = note.to_string();
        app.last_update = self.clock.today();

        self.repository.update(&app)
    }

    pub fn remove(&self, id: i64) -> Result<bool> {
        self.repository.remove(id)
    }

    pub fn compute_statistics(&self) -> Result<Statistics> {
        self.repository.compute_statistics()
    }
}
