//! Header-mapped parsing shared by the local and remote CSV sources.
//!
//! Quoted fields follow the usual CSV rules, so anything `export::write_csv`
//! produces reads back unchanged.

use std::collections::HashMap;

use csv::StringRecord;

use crate::error::{Error, Result};
use crate::models::Application;
use crate::util::to_lower;

/// Which identifying fields a row needs to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter {
    /// Keep rows with a company or a position.
    RequireEither,
    /// Keep rows with both a company and a position.
    RequireBoth,
}

impl RowFilter {
    pub fn accepts(self, app: &Application) -> bool {
        match self {
            RowFilter::RequireEither => !app.company.is_empty() || !app.position.is_empty(),
            RowFilter::RequireBoth => !app.company.is_empty() && !app.position.is_empty(),
        }
    }
}

/// Lowercased column name -> index. A repeated name maps to its last column.
struct ColumnMap(HashMap<String, usize>);

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Self {
        let columns = header
            .iter()
            .enumerate()
            .map(|(i, name)| (to_lower(name), i))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self(columns)
    }

    fn field(&self, record: &StringRecord, name: &str) -> String {
        self.0
            .get(name)
            .and_then(|&idx| record.get(idx))
            .unwrap_or_default()
            .to_string()
    }

    fn to_application(&self, record: &StringRecord) -> Application {
        Application {
            id: 0,
            company: self.field(record, "company"),
            position: self.field(record, "position"),
            location: self.field(record, "location"),
            source: self.field(record, "source"),
            status: self.field(record, "status"),
            applied_date: self.field(record, "applied_date"),
            last_update: self.field(record, "last_update"),
            notes: self.field(record, "notes"),
        }
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Parses a delimited document whose first non-blank record is the header.
///
/// Blank rows are skipped, missing trailing columns read as empty, and rows
/// rejected by `filter` are dropped. No header yields no rows. A leading
/// byte-order mark is ignored.
pub fn parse(content: &str, delimiter: char, filter: RowFilter) -> Result<Vec<Application>> {
    if !delimiter.is_ascii() {
        return Err(Error::InvalidDelimiter(delimiter));
    }
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut columns: Option<ColumnMap> = None;
    let mut apps = Vec::new();
    for record in reader.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        match &columns {
            None => columns = Some(ColumnMap::from_header(&record)),
            Some(map) => {
                let app = map.to_application(&record);
                if filter.accepts(&app) {
                    apps.push(app);
                }
            }
        }
    }
    Ok(apps)
}
