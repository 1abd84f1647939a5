use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use agdb::{DbAny, DbError, DbId, QueryBuilder};
use derive_more::Deref;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::{
    job::DEFAULT_AMOUNT,
    repository::{
        db::models::{CURRENT_MODEL_VERSION, ModelVersion, v1},
        entities::{Error, Result, Uid},
    },
};

pub(crate) mod models;

/// Root node every job element hangs off.
pub(crate) const JOBS: &str = "jobs";

#[derive(Debug, Clone, Deref)]
pub(crate) struct Db {
    #[deref]
    db: Arc<RwLock<DbAny>>,
    /// Backing file, if any. Memory databases are never backed up.
    path: Option<PathBuf>,
}

impl Db {
    /// Open (or create) the file database at `path`, migrating it to the current model version.
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or(Error::InvalidValue { field: "path" })?;

        Self::from_any(DbAny::new_file(path_str)?, Some(path.to_path_buf()))
    }

    fn init(&mut self) -> Result<()> {
        let alias_count = self
            .db
            .read()
            .exec(QueryBuilder::select().aliases().query())?
            .result;

        if alias_count == 0 {
            self.db
                .write()
                .transaction_mut(|t| -> std::result::Result<(), DbError> {
                    t.exec_mut(
                        // Insert aliases if they don't exist
                        QueryBuilder::insert()
                            .nodes()
                            .aliases([JOBS, "model_version", "next_uid"])
                            .query(),
                    )?;

                    // Signifies what the UID should be for a newly inserted element. It gets
                    // incremented with every new element.
                    t.exec_mut(
                        QueryBuilder::insert()
                            .values([[("next_uid", 0_u64).into()]])
                            .ids("next_uid")
                            .query(),
                    )?;

                    Ok(())
                })?;
        }

        match self.model_version()? {
            Some(mv) if mv.version() < CURRENT_MODEL_VERSION => {
                self.backup()?;
                self.migrate(mv)?;
            }
            Some(_) => {}
            None => {
                // Fresh database, stamp it with the current version
                self.db.write().transaction_mut(|t| -> Result<()> {
                    let model_version_id = t
                        .exec_mut(
                            QueryBuilder::insert()
                                .element(ModelVersion::default())
                                .query(),
                        )?
                        .elements
                        .first()
                        .ok_or(Error::Empty)?
                        .id;

                    t.exec_mut(
                        QueryBuilder::insert()
                            .edges()
                            .from("model_version")
                            .to(model_version_id)
                            .query(),
                    )?;

                    Ok(())
                })?;
            }
        }

        Ok(())
    }

    fn model_version(&self) -> Result<Option<ModelVersion>> {
        let versions: Vec<ModelVersion> = self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<ModelVersion>()
                    .search()
                    .from("model_version")
                    .where_()
                    .neighbor()
                    .query(),
            )?
            .try_into()?;

        Ok(versions.into_iter().next())
    }

    /// Perform a backup of the database next to its file
    fn backup(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let backup = path.with_extension(format!("{timestamp}.db.bak"));
        let backup_str = backup
            .to_str()
            .ok_or(Error::InvalidValue { field: "path" })?;

        self.db.write().backup(backup_str)?;
        info!("Backed up database to {}", backup.display());

        Ok(())
    }

    /// Bring every element up to [`CURRENT_MODEL_VERSION`].
    ///
    /// Version 1 jobs had no `uid` or `amount`; both are backfilled. The optional fields added in
    /// version 2 stay absent.
    fn migrate(&self, mv: ModelVersion) -> Result<()> {
        let version_id = mv.db_id.ok_or(Error::Empty)?;

        let legacy: Vec<v1::JobModel> = self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<v1::JobModel>()
                    .search()
                    .from(JOBS)
                    .where_()
                    .neighbor()
                    .and()
                    .not()
                    .keys("uid")
                    .query(),
            )?
            .try_into()?;

        let ids: Vec<DbId> = legacy.iter().filter_map(|job| job.db_id).collect();

        self.db.write().transaction_mut(|t| -> Result<()> {
            let next_uid = Uid::next(
                t.exec(
                    QueryBuilder::select()
                        .values("next_uid")
                        .ids("next_uid")
                        .query(),
                )?,
            )?;

            let mut uid = next_uid;
            for id in &ids {
                t.exec_mut(
                    QueryBuilder::insert()
                        .values([[("uid", Uid(uid)).into(), ("amount", DEFAULT_AMOUNT).into()]])
                        .ids(*id)
                        .query(),
                )?;
                uid += 1;
            }

            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("next_uid", uid).into()]])
                    .ids("next_uid")
                    .query(),
            )?;
            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("version", CURRENT_MODEL_VERSION).into()]])
                    .ids(version_id)
                    .query(),
            )?;

            Ok(())
        })?;

        debug!(
            "Migrated {} job(s) from model version {} to {CURRENT_MODEL_VERSION}",
            ids.len(),
            mv.version()
        );

        Ok(())
    }

    /// Create a memory backed database
    pub(crate) fn in_memory() -> Result<Self> {
        Self::from_any(DbAny::new_memory("tally")?, None)
    }

    fn from_any(db: DbAny, path: Option<PathBuf>) -> Result<Self> {
        let mut db = Self {
            db: Arc::new(RwLock::new(db)),
            path,
        };

        db.init()?;

        Ok(db)
    }
}

#[cfg(test)]
mod test {
    use agdb::QueryId;

    use crate::{
        job::test::date,
        repository::db::models::{JobModel, date_to_days},
    };

    use super::*;

    fn legacy_job(title: &str) -> v1::JobModel {
        v1::JobModel {
            db_id: None,
            title: title.into(),
            opened: date_to_days(date(2024, 12, 7)),
            completed: None,
            is_paid: false,
        }
    }

    #[test]
    fn test_fresh_version() {
        let db = Db::in_memory().unwrap();

        assert_eq!(
            db.model_version().unwrap().unwrap().version(),
            CURRENT_MODEL_VERSION
        );
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        {
            let db = Db::open(&path).unwrap();
            assert_eq!(Uid::new(&db).unwrap(), Uid(0));
        }

        let db = Db::open(&path).unwrap();
        assert_eq!(Uid::new(&db).unwrap(), Uid(1));
    }

    #[test]
    fn test_migrate_v1() {
        let mut raw = DbAny::new_memory("legacy").unwrap();
        raw.transaction_mut(|t| -> std::result::Result<(), DbError> {
            t.exec_mut(
                QueryBuilder::insert()
                    .nodes()
                    .aliases([JOBS, "model_version", "next_uid"])
                    .query(),
            )?;
            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("next_uid", 0_u64).into()]])
                    .ids("next_uid")
                    .query(),
            )?;
            let version = t
                .exec_mut(
                    QueryBuilder::insert()
                        .element(ModelVersion {
                            db_id: None,
                            version: 1,
                        })
                        .query(),
                )?
                .elements
                .first()
                .unwrap()
                .id;
            t.exec_mut(
                QueryBuilder::insert()
                    .edges()
                    .from("model_version")
                    .to(version)
                    .query(),
            )?;
            for title in ["Fence", "Gutters"] {
                let job = t
                    .exec_mut(QueryBuilder::insert().element(legacy_job(title)).query())?
                    .elements
                    .first()
                    .unwrap()
                    .id;
                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from(QueryId::from(JOBS))
                        .to(job)
                        .query(),
                )?;
            }
            Ok(())
        })
        .unwrap();

        let db = Db::from_any(raw, None).unwrap();

        assert_eq!(
            db.model_version().unwrap().unwrap().version(),
            CURRENT_MODEL_VERSION
        );

        let jobs: Vec<JobModel> = db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<JobModel>()
                    .search()
                    .from(JOBS)
                    .where_()
                    .neighbor()
                    .query(),
            )
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.amount == DEFAULT_AMOUNT));
        assert!(jobs.iter().all(|j| j.posted.is_none() && j.notes.is_none()));

        let mut uids: Vec<u64> = jobs.iter().map(|j| j.uid.0).collect();
        uids.sort_unstable();
        assert_eq!(uids, vec![0, 1]);
    }
}
