//! Data core for Tally, a tracker for freelance invoicing jobs.
//!
//! The [`Repository`] persists job records, the [`ledger`] derives display
//! orderings and earnings insights from them, and [`invoice`] renders a
//! month's jobs into a printable PDF.

use thiserror::Error;

pub mod feedback;
pub mod fs;
pub mod invoice;
pub mod job;
pub mod ledger;
pub mod repository;

pub use job::{DEFAULT_AMOUNT, JobRecord, NewJob, coalesce};
pub use ledger::{DisplayMode, Ledger, OrderingPolicy, YearMonth};
pub use repository::{Job, JobEdit, Repository};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Entity(#[from] repository::entities::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize configuration: {0}")]
    Config(#[from] toml::ser::Error),
    #[error("Failed to render invoice: {0}")]
    Render(#[from] printpdf::Error),
    #[error("'{0}' is not a month label like 'Mar 2025'")]
    Month(String),
    #[error("There is no job at position {0}")]
    NoSuchJob(usize),
}
