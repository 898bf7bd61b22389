use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tracked job application. `id == 0` marks a template that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub location: String,
    pub source: String,       // "linkedin", "email", "remote_csv", ...
    pub status: String,       // "applied", "interview", "offer", "rejected", ...
    pub applied_date: String, // YYYY-MM-DD
    pub last_update: String,  // YYYY-MM-DD
    pub notes: String,
}

impl Application {
    pub fn is_template(&self) -> bool {
        self.id == 0
    }
}

/// Application counts grouped by status. Derived on demand, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub count_by_status: BTreeMap<String, usize>,
}

impl Statistics {
    pub fn total(&self) -> usize {
        self.count_by_status.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count_by_status.is_empty()
    }
}
