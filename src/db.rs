use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Application, Statistics};
use crate::repository::ApplicationRepository;

const SELECT_COLUMNS: &str = "SELECT id, company, position, location, source, status,
        applied_date, last_update, notes
 FROM applications";

/// SQLite-backed repository. Owns one connection for its lifetime.
pub struct SqliteRepository {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteRepository {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::storage("open", e))?;
            }
        }
        let conn = Connection::open(path).map_err(|e| Error::storage("open", e))?;
        let repo = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        repo.ensure_schema()?;
        Ok(repo)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::storage("open", e))?;
        let repo = Self { conn, path: None };
        repo.ensure_schema()?;
        Ok(repo)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobtracker") {
            proj_dirs.data_dir().join("jobtracker.db")
        } else {
            PathBuf::from("jobtracker.db")
        }
    }

    fn ensure_schema(&self) -> Result<()> {
        debug!(path = ?self.path, "ensuring applications schema");
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS applications (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    company TEXT NOT NULL,
                    position TEXT NOT NULL,
                    location TEXT,
                    source TEXT,
                    status TEXT NOT NULL,
                    applied_date TEXT,
                    last_update TEXT,
                    notes TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status);
                "#,
            )
            .map_err(|e| Error::storage("schema", e))
    }

    fn query_applications(
        &self,
        operation: &'static str,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Application>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::storage(operation, e))?;
        let rows = stmt
            .query_map(params, Self::row_to_application)
            .map_err(|e| Error::storage(operation, e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage(operation, e))
    }

    // Nullable columns read back as empty strings.
    fn row_to_application(row: &rusqlite::Row) -> rusqlite::Result<Application> {
        let text = |idx: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
        };
        Ok(Application {
            id: row.get(0)?,
            company: text(1)?,
            position: text(2)?,
            location: text(3)?,
            source: text(4)?,
            status: text(5)?,
            applied_date: text(6)?,
            last_update: text(7)?,
            notes: text(8)?,
        })
    }
}

impl ApplicationRepository for SqliteRepository {
    fn insert(&self, application: &Application) -> Result<Application> {
        self.conn
            .execute(
                "INSERT INTO applications
                    (company, position, location, source, status, applied_date, last_update, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    application.company,
                    application.position,
                    application.location,
                    application.source,
                    application.status,
                    application.applied_date,
                    application.last_update,
                    application.notes,
                ],
            )
            .map_err(|e| Error::storage("insert", e))?;

        Ok(Application {
            id: self.conn.last_insert_rowid(),
            ..application.clone()
        })
    }

    fn update(&self, application: &Application) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE applications SET
                    company = ?1, position = ?2, location = ?3, source = ?4,
                    status = ?5, applied_date = ?6, last_update = ?7, notes = ?8
                 WHERE id = ?9",
                params![
                    application.company,
                    application.position,
                    application.location,
                    application.source,
                    application.status,
                    application.applied_date,
                    application.last_update,
                    application.notes,
                    application.id,
                ],
            )
            .map_err(|e| Error::storage("update", e))?;
        Ok(changed > 0)
    }

    fn remove(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", [id])
            .map_err(|e| Error::storage("remove", e))?;
        Ok(changed > 0)
    }

    fn find_all(&self) -> Result<Vec<Application>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id");
        self.query_applications("find_all", &sql, [])
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Application>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        self.conn
            .query_row(&sql, [id], Self::row_to_application)
            .optional()
            .map_err(|e| Error::storage("find_by_id", e))
    }

    fn find_by_status(&self, status: &str) -> Result<Vec<Application>> {
        let sql = format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY id");
        self.query_applications("find_by_status", &sql, [status])
    }

    fn compute_statistics(&self) -> Result<Statistics> {
        let operation = "compute_statistics";
        let mut stmt = self
            .conn
            .prepare(
                "SELECT COALESCE(status, ''), COUNT(*)
                 FROM applications
                 GROUP BY COALESCE(status, '')",
            )
            .map_err(|e| Error::storage(operation, e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| Error::storage(operation, e))?;

        let mut stats = Statistics::default();
        for row in rows {
            let (status, count) = row.map_err(|e| Error::storage(operation, e))?;
            stats.count_by_status.insert(status, count as usize);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(company: &str, status: &str) -> Application {
        Application {
            company: company.to_string(),
            position: "Backend Engineer".to_string(),
            location: "Remote".to_string(),
            source: "linkedin".to_string(),
            status: status.to_string(),
            applied_date: "2025-01-01".to_string(),
            last_update: "2025-01-02".to_string(),
            notes: "first round".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_assigns_fresh_ids() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut template = sample("ACME", "applied");
        template.id = 42;

        let first = repo.insert(&template).unwrap();
        let second = repo.insert(&template).unwrap();

        assert_ne!(first.id, 0);
        assert_ne!(first.id, 42);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_insert_find_by_id_round_trip_is_exact() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let app = Application {
            company: "  O'Reilly, \"Media\"  ".to_string(),
            position: "Dev; Ops".to_string(),
            location: "".to_string(),
            source: "Remote_CSV".to_string(),
            status: "Interview".to_string(),
            applied_date: "2025-01-01".to_string(),
            last_update: "2025-02-03".to_string(),
            notes: "line one\nline two".to_string(),
            ..Default::default()
        };

        let stored = repo.insert(&app).unwrap();
        let loaded = repo.find_by_id(stored.id).unwrap().unwrap();

        assert_eq!(loaded, stored);
        assert_eq!(loaded.company, "  O'Reilly, \"Media\"  ");
        assert_eq!(loaded.notes, "line one\nline two");
    }

    #[test]
    fn test_find_by_id_missing_returns_none() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        assert!(repo.find_by_id(999).unwrap().is_none());
    }

    #[test]
    fn test_update_and_remove_report_row_existence() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut stored = repo.insert(&sample("ACME", "applied")).unwrap();

        stored.status = "offer".to_string();
        assert!(repo.update(&stored).unwrap());
        assert_eq!(repo.find_by_id(stored.id).unwrap().unwrap().status, "offer");

        let ghost = Application {
            id: stored.id + 100,
            ..stored.clone()
        };
        assert!(!repo.update(&ghost).unwrap());

        assert!(repo.remove(stored.id).unwrap());
        assert!(!repo.remove(stored.id).unwrap());
        assert!(repo.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_find_by_status_is_exact_and_case_sensitive() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.insert(&sample("ACME", "applied")).unwrap();
        repo.insert(&sample("Beta", "Applied")).unwrap();
        repo.insert(&sample("Gamma", "applied")).unwrap();

        let applied = repo.find_by_status("applied").unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].company, "ACME");
        assert_eq!(applied[1].company, "Gamma");

        assert!(repo.find_by_status("rejected").unwrap().is_empty());
    }

    #[test]
    fn test_compute_statistics_groups_every_status() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.insert(&sample("A", "applied")).unwrap();
        repo.insert(&sample("B", "applied")).unwrap();
        repo.insert(&sample("C", "interview")).unwrap();
        repo.insert(&sample("D", "")).unwrap();

        let stats = repo.compute_statistics().unwrap();

        assert_eq!(stats.count_by_status.get("applied"), Some(&2));
        assert_eq!(stats.count_by_status.get("interview"), Some(&1));
        assert_eq!(stats.count_by_status.get(""), Some(&1));
        assert_eq!(stats.total(), repo.find_all().unwrap().len());
    }

    #[test]
    fn test_null_columns_read_as_empty_strings() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.conn
            .execute(
                "INSERT INTO applications (company, position, status) VALUES ('ACME', 'Dev', 'applied')",
                [],
            )
            .unwrap();

        let all = repo.find_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].location, "");
        assert_eq!(all[0].notes, "");
        assert_eq!(all[0].applied_date, "");
    }

    #[test]
    fn test_statement_failure_is_storage_error() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.conn.execute_batch("DROP TABLE applications").unwrap();

        let err = repo.insert(&sample("ACME", "applied")).unwrap_err();
        assert!(matches!(err, Error::Storage { operation: "insert", .. }));

        let err = repo.compute_statistics().unwrap_err();
        assert!(matches!(
            err,
            Error::Storage {
                operation: "compute_statistics",
                ..
            }
        ));
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tracker.db");

        let id = {
            let repo = SqliteRepository::open(&path).unwrap();
            assert_eq!(repo.path(), Some(path.as_path()));
            repo.insert(&sample("ACME", "applied")).unwrap().id
        };

        let reopened = SqliteRepository::open(&path).unwrap();
        let loaded = reopened.find_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.company, "ACME");

        // Schema creation is idempotent and ids keep increasing.
        let next = reopened.insert(&sample("Beta", "applied")).unwrap();
        assert!(next.id > id);
    }

    #[test]
    fn test_open_unwritable_path_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = SqliteRepository::open(&blocker.join("tracker.db"));
        assert!(matches!(result, Err(Error::Storage { operation: "open", .. })));
    }
}
