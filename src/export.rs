use std::io::Write;

use crate::error::Result;
use crate::models::Application;

/// Writes applications as comma-separated rows with a header.
///
/// Column names match what the CSV import recognizes, plus a leading `id`
/// that the import ignores. Fields containing commas, quotes or newlines are
/// quoted, so the file reads back unchanged.
pub fn write_csv<W: Write>(applications: &[Application], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for app in applications {
        csv_writer.serialize(app)?;
    }
    if applications.is_empty() {
        csv_writer.write_record([
            "id",
            "company",
            "position",
            "location",
            "source",
            "status",
            "applied_date",
            "last_update",
            "notes",
        ])?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
