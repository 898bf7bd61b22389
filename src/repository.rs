use crate::error::Result;
use crate::models::{Application, Statistics};

/// Storage capability for applications, independent of the backing medium.
///
/// Missing rows are not errors: `update`/`remove` report them with `false`,
/// `find_by_id` with `None`. `Err` is reserved for storage faults.
pub trait ApplicationRepository {
    /// Stores `application` under a freshly assigned id, ignoring its current id.
    fn insert(&self, application: &Application) -> Result<Application>;

    /// Overwrites the row with `application.id`. Returns whether such a row existed.
    fn update(&self, application: &Application) -> Result<bool>;

    fn remove(&self, id: i64) -> Result<bool>;

    fn find_all(&self) -> Result<Vec<Application>>;

    fn find_by_id(&self, id: i64) -> Result<Option<Application>>;

    /// Exact, case-sensitive status match.
    fn find_by_status(&self, status: &str) -> Result<Vec<Application>>;

    /// Counts applications per status; an empty status is its own group.
    fn compute_statistics(&self) -> Result<Statistics>;
}
