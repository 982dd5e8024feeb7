//! Course index stored in redb.
//!
//! One `COURSES` table maps a course id (its folder name) to a JSON-encoded
//! [`CourseRecord`]. The course folders stay the source of truth;
//! [`CourseCatalog::reindex`] rebuilds the table from them.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::course::CourseData;
use crate::error::{CoursePressError, Result};
use crate::paths;

/// Key: course id. Value: JSON-encoded `CourseRecord`.
const COURSES: TableDefinition<&str, &[u8]> = TableDefinition::new("courses");

fn db_err(e: impl std::fmt::Display) -> CoursePressError {
    CoursePressError::Catalog(e.to_string())
}

// ---------------------------------------------------------------------------
// CourseRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub lesson_count: usize,
    pub moment_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CourseCatalog
// ---------------------------------------------------------------------------

pub struct CourseCatalog {
    db: Database,
}

impl CourseCatalog {
    /// Open or create the catalog at `.coursepress/catalog.redb` under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        Self::open_at(&paths::catalog_path(root))
    }

    /// Open or create a catalog at an explicit path. Creates the `COURSES`
    /// table so that read transactions never see it missing.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(COURSES).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    pub fn upsert(&self, record: &CourseRecord) -> Result<()> {
        let value = serde_json::to_vec(record)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(COURSES).map_err(db_err)?;
            table
                .insert(record.id.as_str(), value.as_slice())
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    /// Remove the row for `id`. Returns whether a row existed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let wt = self.db.begin_write().map_err(db_err)?;
        let existed = {
            let mut table = wt.open_table(COURSES).map_err(db_err)?;
            let old = table.remove(id).map_err(db_err)?;
            old.is_some()
        };
        wt.commit().map_err(db_err)?;
        Ok(existed)
    }

    pub fn get(&self, id: &str) -> Result<Option<CourseRecord>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(COURSES).map_err(db_err)?;
        match table.get(id).map_err(db_err)? {
            Some(v) => Ok(Some(serde_json::from_slice(v.value())?)),
            None => Ok(None),
        }
    }

    /// All rows, oldest course first.
    pub fn list(&self) -> Result<Vec<CourseRecord>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(COURSES).map_err(db_err)?;
        let mut records = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            let record: CourseRecord = serde_json::from_slice(v.value())?;
            records.push(record);
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    /// Drop every row and rebuild the table from the course folders on disk.
    /// Returns the number of courses indexed.
    pub fn reindex(&self, root: &Path) -> Result<usize> {
        let courses = CourseData::list(root)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        wt.delete_table(COURSES).map_err(db_err)?;
        {
            let mut table = wt.open_table(COURSES).map_err(db_err)?;
            for course in &courses {
                let value = serde_json::to_vec(&course.summary())?;
                table
                    .insert(course.folder_name.as_str(), value.as_slice())
                    .map_err(db_err)?;
            }
        }
        wt.commit().map_err(db_err)?;
        tracing::info!(count = courses.len(), "reindexed course catalog");
        Ok(courses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::CourseDraft;
    use tempfile::TempDir;

    #[test]
    fn upsert_get_remove() {
        let dir = TempDir::new().unwrap();
        let catalog = CourseCatalog::open(dir.path()).unwrap();
        let course = CourseData::create(dir.path(), CourseDraft::new("Vial")).unwrap();

        catalog.upsert(&course.summary()).unwrap();
        let row = catalog.get("vial").unwrap().unwrap();
        assert_eq!(row.name, "Vial");
        assert_eq!(row.lesson_count, 1);

        assert!(catalog.remove("vial").unwrap());
        assert!(catalog.get("vial").unwrap().is_none());
        assert!(!catalog.remove("vial").unwrap());
    }

    #[test]
    fn upsert_replaces_row() {
        let dir = TempDir::new().unwrap();
        let catalog = CourseCatalog::open(dir.path()).unwrap();
        let course = CourseData::create(dir.path(), CourseDraft::new("Vial")).unwrap();
        let mut record = course.summary();
        catalog.upsert(&record).unwrap();
        record.name = "Vial 2.0".to_string();
        catalog.upsert(&record).unwrap();

        let rows = catalog.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Vial 2.0");
    }

    #[test]
    fn reindex_matches_disk() {
        let dir = TempDir::new().unwrap();
        let catalog = CourseCatalog::open(dir.path()).unwrap();
        CourseData::create(dir.path(), CourseDraft::new("Uno")).unwrap();
        CourseData::create(dir.path(), CourseDraft::new("Dos")).unwrap();

        // A stale row for a course that no longer exists on disk.
        let ghost = CourseRecord {
            id: "fantasma".to_string(),
            name: "Fantasma".to_string(),
            category: String::new(),
            lesson_count: 0,
            moment_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        catalog.upsert(&ghost).unwrap();

        assert_eq!(catalog.reindex(dir.path()).unwrap(), 2);
        let ids: Vec<_> = catalog.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["uno", "dos"]);
    }
}
