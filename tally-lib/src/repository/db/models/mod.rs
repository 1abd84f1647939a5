use agdb::{DbElement, DbId};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{
    job::{JobRecord, NewJob},
    repository::entities::{Error, Result, Uid},
};

pub(crate) mod v1;

/// Schema version written by this build. Version 2 added `uid`, `amount`, `posted` and
/// `notes` to job elements.
pub(crate) const CURRENT_MODEL_VERSION: u64 = 2;

#[derive(Debug, Clone, DbElement, PartialEq)]
pub(crate) struct ModelVersion {
    pub(crate) db_id: Option<DbId>,
    pub(crate) version: u64,
}

impl ModelVersion {
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for ModelVersion {
    fn default() -> Self {
        Self {
            db_id: None,
            version: CURRENT_MODEL_VERSION,
        }
    }
}

/// A job as it is laid out in the database. Dates are stored as days since the common era
/// and the posted timestamp as Unix seconds.
#[derive(Debug, Clone, DbElement, PartialEq)]
pub(crate) struct JobModel {
    pub(crate) db_id: Option<DbId>,
    pub(crate) uid: Uid,
    pub(crate) title: String,
    pub(crate) opened: i64,
    pub(crate) completed: Option<i64>,
    pub(crate) is_paid: bool,
    pub(crate) amount: f64,
    pub(crate) posted: Option<i64>,
    pub(crate) notes: Option<String>,
}

impl JobModel {
    pub fn new(uid: Uid, job: &NewJob) -> Self {
        Self {
            db_id: None,
            uid,
            title: job.title.clone(),
            opened: date_to_days(job.opened_date),
            completed: None,
            is_paid: false,
            amount: job.amount,
            posted: None,
            notes: job.notes.clone(),
        }
    }

    /// Lay a record back out for the element at `db_id`.
    pub fn from_record(db_id: DbId, record: &JobRecord) -> Self {
        Self {
            db_id: Some(db_id),
            uid: Uid(record.id),
            title: record.title.clone(),
            opened: date_to_days(record.opened_date),
            completed: record.completed_date.map(date_to_days),
            is_paid: record.is_paid,
            amount: record.amount,
            posted: record.posted_date.map(|p| p.and_utc().timestamp()),
            notes: record.notes.clone(),
        }
    }
}

impl TryFrom<JobModel> for JobRecord {
    type Error = Error;

    fn try_from(model: JobModel) -> Result<Self> {
        Ok(Self {
            id: model.uid.0,
            title: model.title,
            opened_date: days_to_date(model.opened, "opened")?,
            completed_date: model
                .completed
                .map(|days| days_to_date(days, "completed"))
                .transpose()?,
            is_paid: model.is_paid,
            amount: model.amount,
            posted_date: model
                .posted
                .map(|secs| timestamp_to_datetime(secs, "posted"))
                .transpose()?,
            notes: model.notes,
        })
    }
}

pub(crate) fn date_to_days(date: NaiveDate) -> i64 {
    i64::from(chrono::Datelike::num_days_from_ce(&date))
}

fn days_to_date(days: i64, field: &'static str) -> Result<NaiveDate> {
    i32::try_from(days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or(Error::InvalidValue { field })
}

fn timestamp_to_datetime(secs: i64, field: &'static str) -> Result<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or(Error::InvalidValue { field })
}
