use std::fmt::{self, Debug, Display, Formatter};

use agdb::{DbId, DbValue, QueryBuilder};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, error};

use crate::{
    job::{JobRecord, NewJob},
    repository::{
        db::{Db, JOBS, models::JobModel},
        entities::{EntityId, Error, Result, Uid, get_field},
    },
};

/// Represents a job entity in the Tally system.
///
/// Provides methods to inspect this job's data. Always reflects the current
/// database state; use [`Job::record`] for a snapshot or [`Job::edit`] to change several
/// fields in one save.
#[derive(Debug, Clone)]
pub struct Job {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
}

impl Job {
    /// Load some existing [`Job`] from the database
    pub(crate) fn load(db_id: DbId, db: Db) -> Result<Self> {
        let id = EntityId::load(&db, db_id)?;
        Ok(Self { id, db })
    }

    /// Insert a new [`Job`] into the database.
    pub(crate) fn add(db: &Db, new: &NewJob) -> Result<Self> {
        let model = JobModel::new(Uid::new(db)?, new);
        let db_id = db.write().transaction_mut(|t| -> Result<DbId> {
            let job_id = t
                .exec_mut(QueryBuilder::insert().element(model).query())?
                .elements
                .first()
                .ok_or(Error::Empty)?
                .id;

            t.exec_mut(QueryBuilder::insert().edges().from(JOBS).to(job_id).query())?;

            Ok(job_id)
        })?;

        let job = Job::load(db_id, db.clone())?;

        debug!("Created new job: {}", new.title);

        Ok(job)
    }

    pub(crate) fn list(db: &Db) -> Result<Vec<Job>> {
        db.read()
            .exec(
                QueryBuilder::search()
                    .from(JOBS)
                    .where_()
                    .neighbor()
                    .query(),
            )?
            .elements
            .iter()
            .map(|e| Job::load(e.id, db.clone()))
            .collect()
    }

    pub(crate) fn remove(self) -> Result<()> {
        let title = self.title()?;
        let db_id = self.id.db_id(&self.db)?;
        self.db
            .write()
            .exec_mut(QueryBuilder::remove().ids(db_id).query())?;

        debug!("Removed job: {title}");

        Ok(())
    }

    /// Remove several jobs in one transaction. Every handle is checked first, so a removed or
    /// stale handle leaves all of the jobs in place.
    pub(crate) fn remove_all(db: &Db, jobs: Vec<Job>) -> Result<usize> {
        let ids = jobs
            .iter()
            .map(|job| job.id.db_id(db))
            .collect::<Result<Vec<DbId>>>()?;

        db.write().transaction_mut(|t| -> Result<()> {
            t.exec_mut(QueryBuilder::remove().ids(ids.clone()).query())?;
            Ok(())
        })?;

        debug!("Removed {} job(s)", ids.len());

        Ok(ids.len())
    }

    pub fn id(&self) -> u64 {
        self.id.uid().0
    }

    /// Read every field of this job at once.
    pub fn record(&self) -> Result<JobRecord> {
        let db_id = self.id.db_id(&self.db)?;
        let model: Vec<JobModel> = self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<JobModel>()
                    .ids(db_id)
                    .query(),
            )?
            .try_into()?;

        model.into_iter().next().ok_or(Error::Empty)?.try_into()
    }

    pub fn title(&self) -> Result<String> {
        self.get_field("title")
    }

    /// Start editing a local copy of this job. Nothing is written until [`JobEdit::save`].
    pub fn edit(&self) -> Result<JobEdit> {
        Ok(JobEdit {
            job: self.clone(),
            draft: self.record()?,
        })
    }

    fn get_field<T>(&self, field: &'static str) -> Result<T>
    where
        T: TryFrom<DbValue>,
        T::Error: Debug,
    {
        get_field(&self.db, self.id, field)
    }
}

impl Display for Job {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.title().unwrap_or_else(|_| "<invalid job title>".into())
        )
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A detached copy of a job being edited.
///
/// Setters only touch the copy. [`JobEdit::save`] writes every field back in a single
/// transaction, so a failed save leaves the stored job exactly as it was.
#[derive(Debug, Clone)]
pub struct JobEdit {
    job: Job,
    draft: JobRecord,
}

impl JobEdit {
    pub fn draft(&self) -> &JobRecord {
        &self.draft
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.draft.title = title.to_string();
        self
    }

    pub fn set_opened_date(&mut self, date: NaiveDate) -> &mut Self {
        self.draft.opened_date = date;
        self
    }

    /// Mark the job complete as of `today`, or reopen it. Completing an already completed job
    /// keeps its original completion date.
    pub fn set_completed(&mut self, completed: bool, today: NaiveDate) -> &mut Self {
        self.draft.completed_date = match (completed, self.draft.completed_date) {
            (true, Some(date)) => Some(date),
            (true, None) => Some(today),
            (false, _) => None,
        };
        self
    }

    pub fn set_paid(&mut self, paid: bool) -> &mut Self {
        self.draft.is_paid = paid;
        self
    }

    pub fn set_amount(&mut self, amount: f64) -> &mut Self {
        self.draft.amount = amount;
        self
    }

    pub fn set_posted_date(&mut self, posted: Option<NaiveDateTime>) -> &mut Self {
        self.draft.posted_date = posted;
        self
    }

    pub fn set_notes(&mut self, notes: Option<String>) -> &mut Self {
        self.draft.notes = notes.filter(|n| !n.is_empty());
        self
    }

    /// Write the draft back to the database.
    pub fn save(self) -> Result<Job> {
        let Self { job, draft } = self;

        if let Err(e) = Self::write(&job, &draft) {
            error!("Failed to save job {}: {e}", draft.id);
            return Err(e);
        }

        debug!("Saved job {}", draft.id);

        Ok(job)
    }

    fn write(job: &Job, draft: &JobRecord) -> Result<()> {
        let db_id = job.id.db_id(&job.db)?;
        let model = JobModel::from_record(db_id, draft);

        // Optional fields that became empty have to be dropped explicitly, inserting the
        // element only overwrites the keys it carries.
        let mut cleared = Vec::new();
        if draft.completed_date.is_none() {
            cleared.push("completed");
        }
        if draft.posted_date.is_none() {
            cleared.push("posted");
        }
        if draft.notes.is_none() {
            cleared.push("notes");
        }

        job.db.write().transaction_mut(|t| -> Result<()> {
            t.exec_mut(QueryBuilder::insert().element(model).query())?;
            for key in cleared {
                t.exec_mut(QueryBuilder::remove().values(key).ids(db_id).query())?;
            }
            Ok(())
        })
    }
}
