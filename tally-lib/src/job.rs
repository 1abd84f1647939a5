//! The job record and the values derived from it.

use std::fmt::{self, Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime};

/// Amount given to a job when the user doesn't supply one.
pub const DEFAULT_AMOUNT: f64 = 40.0;

/// A snapshot of a single stored job.
///
/// Records are plain values: reading one never touches the database. Use
/// [`crate::Job`] for a live handle that can be edited.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: u64,
    pub title: String,
    pub opened_date: NaiveDate,
    /// `None` until the job is marked complete.
    pub completed_date: Option<NaiveDate>,
    pub is_paid: bool,
    pub amount: f64,
    /// When the invoice for this job was actually sent.
    pub posted_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

impl JobRecord {
    pub fn is_completed(&self) -> bool {
        self.completed_date.is_some()
    }

    /// The date used to place a job in a calendar month: its completion date if it has one,
    /// otherwise the date it was opened.
    pub fn effective_date(&self) -> NaiveDate {
        self.completed_date.unwrap_or(self.opened_date)
    }

    /// The date shown for this job on an invoice.
    pub fn invoice_date(&self) -> NaiveDateTime {
        match (self.posted_date, self.completed_date) {
            (Some(posted), _) => posted,
            (None, Some(completed)) => completed.and_time(chrono::NaiveTime::MIN),
            (None, None) => self.opened_date.and_time(chrono::NaiveTime::MIN),
        }
    }

    pub fn days_to_complete(&self) -> Option<i64> {
        self.completed_date
            .map(|completed| (completed - self.opened_date).num_days())
    }

    /// Soft invariants this record breaks. They are never enforced, only reported.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        if self
            .completed_date
            .is_some_and(|completed| completed < self.opened_date)
        {
            anomalies.push(Anomaly::CompletedBeforeOpened);
        }
        if self.posted_date.is_some() && !self.is_completed() {
            anomalies.push(Anomaly::PostedWhileOpen);
        }
        if self.amount < 0.0 {
            anomalies.push(Anomaly::NegativeAmount);
        }

        anomalies
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    CompletedBeforeOpened,
    PostedWhileOpen,
    NegativeAmount,
}

impl Display for Anomaly {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Anomaly::CompletedBeforeOpened => "completed before it was opened",
            Anomaly::PostedWhileOpen => "has a posted date but is not completed",
            Anomaly::NegativeAmount => "has a negative amount",
        };
        f.write_str(msg)
    }
}

/// The user supplied fields of a job that is about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub opened_date: NaiveDate,
    pub amount: f64,
    pub notes: Option<String>,
}

impl NewJob {
    pub fn new(title: &str, opened_date: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            opened_date,
            amount: DEFAULT_AMOUNT,
            notes: None,
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }
}

/// Resolve an optional core value into something a presentation widget can show, without
/// writing the default back into the record.
pub fn coalesce<T>(value: Option<T>, default: T) -> T {
    value.unwrap_or(default)
}

/// Format an amount the way every screen and document shows money.
pub fn format_money(currency: &str, amount: f64) -> String {
    format!("{currency}{amount:.2}")
}
