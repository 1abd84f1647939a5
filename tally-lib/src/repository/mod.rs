use std::{path::Path, sync::Arc};

use parking_lot::RwLock;

use crate::{
    Error, Result,
    fs::state_dir,
    job::{JobRecord, NewJob},
    ledger::{Ledger, OrderingPolicy},
    repository::{
        config::{Cfg, CoreConfig},
        db::Db,
    },
};

mod db;

pub mod config;
pub mod entities;

pub use entities::{Job, JobEdit};

/// Central access point for all persistent data.
///
/// The [`Repository`] owns the job database and the configuration file. It provides a single,
/// consistent interface for creating, reading, editing and removing jobs.
#[derive(Clone, Debug)]
pub struct Repository {
    db: Db,
    cfg: Cfg,
}

impl Repository {
    /// Open the repository in the default XDG locations.
    pub fn new() -> Result<Self> {
        Self::open(&state_dir()?.join("data.db"), CoreConfig::load()?)
    }

    /// Open the repository backed by the database file at `path`.
    pub fn open(path: &Path, cfg: CoreConfig) -> Result<Self> {
        Ok(Self {
            db: Db::open(path)?,
            cfg: Arc::new(RwLock::new(cfg)),
        })
    }

    /// A repository that lives only as long as this process.
    pub fn in_memory(cfg: CoreConfig) -> Result<Self> {
        Ok(Self {
            db: Db::in_memory()?,
            cfg: Arc::new(RwLock::new(cfg)),
        })
    }

    pub fn config(&self) -> Cfg {
        self.cfg.clone()
    }

    pub fn add_job(&self, new: &NewJob) -> Result<Job> {
        Ok(Job::add(&self.db, new)?)
    }

    /// Every stored job, in no particular order.
    pub fn jobs(&self) -> Result<Vec<Job>> {
        Ok(Job::list(&self.db)?)
    }

    /// Snapshots of every stored job, in no particular order.
    pub fn records(&self) -> Result<Vec<JobRecord>> {
        self.jobs()?
            .iter()
            .map(|job| Ok(job.record()?))
            .collect()
    }

    /// Every stored job paired with its snapshot, sorted by `policy`.
    pub fn ordered_jobs(&self, policy: OrderingPolicy) -> Result<Vec<(Job, JobRecord)>> {
        let mut jobs = self
            .jobs()?
            .into_iter()
            .map(|job| {
                let record = job.record()?;
                Ok((job, record))
            })
            .collect::<Result<Vec<_>>>()?;

        jobs.sort_by(|(_, a), (_, b)| policy.compare(a, b));

        Ok(jobs)
    }

    /// The job at `index` (zero based) in the canonical ordering.
    pub fn job_at(&self, index: usize) -> Result<Job> {
        self.ordered_jobs(OrderingPolicy::Canonical)?
            .into_iter()
            .nth(index)
            .map(|(job, _)| job)
            .ok_or(Error::NoSuchJob(index))
    }

    pub fn ledger(&self) -> Result<Ledger> {
        Ok(Ledger::new(self.records()?))
    }

    pub fn remove_job(&self, job: Job) -> Result<()> {
        Ok(job.remove()?)
    }

    /// Remove several jobs by their (zero based) position in the canonical ordering. Either
    /// every index is valid and all of them are removed in one transaction, or nothing is.
    pub fn remove_jobs_at(&self, indices: &[usize]) -> Result<usize> {
        let ordered = self.ordered_jobs(OrderingPolicy::Canonical)?;

        let mut doomed = Vec::with_capacity(indices.len());
        for &index in indices {
            let (job, _) = ordered.get(index).ok_or(Error::NoSuchJob(index))?;
            if !doomed.contains(job) {
                doomed.push(job.clone());
            }
        }

        Ok(Job::remove_all(&self.db, doomed)?)
    }

    #[cfg(test)]
    /// Return a mock version of a [`Repository`] with an in-memory database and default
    /// configuration.
    pub(crate) fn mock() -> Self {
        Self::in_memory(CoreConfig::mock()).unwrap()
    }
}

#[cfg(test)]
mod test {
    use crate::job::test::date;

    use super::*;

    fn seed(repo: &Repository) {
        let unpaid_old = repo
            .add_job(&NewJob::new("Unpaid old", date(2025, 1, 5)))
            .unwrap();
        repo.add_job(&NewJob::new("Open", date(2025, 2, 1)))
            .unwrap();
        let paid = repo
            .add_job(&NewJob::new("Paid", date(2025, 1, 1)))
            .unwrap();

        let mut edit = unpaid_old.edit().unwrap();
        edit.set_completed(true, date(2025, 1, 20));
        edit.save().unwrap();

        let mut edit = paid.edit().unwrap();
        edit.set_completed(true, date(2025, 1, 10)).set_paid(true);
        edit.save().unwrap();
    }

    fn titles(repo: &Repository) -> Vec<String> {
        repo.ordered_jobs(OrderingPolicy::Canonical)
            .unwrap()
            .into_iter()
            .map(|(_, r)| r.title)
            .collect()
    }

    #[test]
    fn test_ordered_jobs() {
        let repo = Repository::mock();
        seed(&repo);

        assert_eq!(titles(&repo), vec!["Open", "Unpaid old", "Paid"]);
    }

    #[test]
    fn test_job_at() {
        let repo = Repository::mock();
        seed(&repo);

        assert_eq!(repo.job_at(2).unwrap().title().unwrap(), "Paid");
        assert!(matches!(repo.job_at(3), Err(Error::NoSuchJob(3))));
    }

    #[test]
    fn test_remove_jobs_at() {
        let repo = Repository::mock();
        seed(&repo);

        assert_eq!(repo.remove_jobs_at(&[0, 2, 2]).unwrap(), 2);
        assert_eq!(titles(&repo), vec!["Unpaid old"]);
    }

    #[test]
    fn test_remove_jobs_at_out_of_range() {
        let repo = Repository::mock();
        seed(&repo);

        assert!(repo.remove_jobs_at(&[0, 9]).is_err());
        assert_eq!(repo.jobs().unwrap().len(), 3);
    }

    #[test]
    fn test_ledger() {
        let repo = Repository::mock();
        seed(&repo);

        let insights = repo.ledger().unwrap().insights();
        assert_eq!(insights.paid.count, 1);
        assert_eq!(insights.unpaid.count, 2);
    }

    #[test]
    fn test_file_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        {
            let repo = Repository::open(&path, CoreConfig::default()).unwrap();
            seed(&repo);
        }

        let repo = Repository::open(&path, CoreConfig::default()).unwrap();
        assert_eq!(titles(&repo), vec!["Open", "Unpaid old", "Paid"]);
    }
}
