use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand};
use colored::{ColoredString, Colorize};
use tally_lib::{
    Error, Job, JobRecord, NewJob, OrderingPolicy, Repository, Result, coalesce,
    feedback::Feedback, job::format_money,
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List jobs, open work first
    List {
        /// Order jobs by this policy instead of the configured one
        #[arg(short, long, value_enum)]
        ordering: Option<OrderingPolicy>,
    },
    /// Add a new job
    Add {
        title: String,
        /// Date the job was opened, defaults to today
        #[arg(long, value_name = "YYYY-MM-DD")]
        opened: Option<NaiveDate>,
        /// Defaults to the configured amount
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show every detail of a job
    Show { index: usize },
    /// Change several fields of a job at once
    Edit {
        index: usize,
        #[command(flatten)]
        changes: Changes,
    },
    /// Mark a job as completed today
    Complete { index: usize },
    /// Mark a completed job as open again
    Reopen { index: usize },
    /// Mark a job as paid
    Pay { index: usize },
    /// Mark a job as unpaid
    Unpay { index: usize },
    /// Remove one or more jobs
    Remove {
        #[arg(required = true)]
        indices: Vec<usize>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Changes {
    #[arg(long)]
    title: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    opened: Option<NaiveDate>,
    #[arg(long)]
    amount: Option<f64>,
    #[arg(long, conflicts_with = "clear_notes")]
    notes: Option<String>,
    #[arg(long)]
    clear_notes: bool,
    /// When the invoice was sent
    #[arg(
        long,
        value_name = "YYYY-MM-DD HH:MM",
        value_parser = parse_datetime,
        conflicts_with = "clear_posted"
    )]
    posted: Option<NaiveDateTime>,
    #[arg(long)]
    clear_posted: bool,
}

pub fn handle(repo: &Repository, feedback: &impl Feedback, cmd: &Command) -> Result<()> {
    match cmd {
        Command::List { ordering } => {
            let policy = ordering.unwrap_or(repo.config().read().ordering);
            let currency = repo.config().read().currency_symbol.clone();
            for (i, (_, record)) in repo.ordered_jobs(policy)?.iter().enumerate() {
                println!("{:>3}. {}", i + 1, summary(record, &currency));
            }
        }
        Command::Add {
            title,
            opened,
            amount,
            notes,
        } => {
            let today = Local::now().date_naive();
            let default_amount = repo.config().read().default_amount;
            let new = NewJob::new(title, coalesce(*opened, today))
                .amount(coalesce(*amount, default_amount))
                .notes(notes.clone());
            let job = repo.add_job(&new)?;
            println!("Added {}", job.title()?.bold());
        }
        Command::Show { index } => {
            let record = job_at(repo, *index)?.record()?;
            let currency = repo.config().read().currency_symbol.clone();
            details(&record, &currency);
        }
        Command::Edit { index, changes } => {
            let job = job_at(repo, *index)?;
            let mut edit = job.edit()?;
            if let Some(title) = &changes.title {
                edit.set_title(title);
            }
            if let Some(opened) = changes.opened {
                edit.set_opened_date(opened);
            }
            if let Some(amount) = changes.amount {
                edit.set_amount(amount);
            }
            if let Some(notes) = &changes.notes {
                edit.set_notes(Some(notes.clone()));
            } else if changes.clear_notes {
                edit.set_notes(None);
            }
            if let Some(posted) = changes.posted {
                edit.set_posted_date(Some(posted));
            } else if changes.clear_posted {
                edit.set_posted_date(None);
            }
            let record = edit.draft().clone();
            edit.save()?;
            warn_anomalies(&record);
        }
        Command::Complete { index } | Command::Reopen { index } => {
            let completed = matches!(cmd, Command::Complete { .. });
            let mut edit = job_at(repo, *index)?.edit()?;
            edit.set_completed(completed, Local::now().date_naive());
            let record = edit.draft().clone();
            edit.save()?;
            warn_anomalies(&record);
        }
        Command::Pay { index } | Command::Unpay { index } => {
            let paid = matches!(cmd, Command::Pay { .. });
            let mut edit = job_at(repo, *index)?.edit()?;
            edit.set_paid(paid);
            edit.save()?;
            feedback.paid_changed(paid);
        }
        Command::Remove { indices } => {
            let indices = indices
                .iter()
                .map(|&position| position.checked_sub(1).ok_or(Error::NoSuchJob(position)))
                .collect::<Result<Vec<_>>>()?;
            let removed = repo.remove_jobs_at(&indices).map_err(one_based)?;
            println!("Removed {removed} job(s)");
        }
    }

    Ok(())
}

/// Look a job up by its 1-based position in the canonical listing.
fn job_at(repo: &Repository, position: usize) -> Result<Job> {
    let index = position
        .checked_sub(1)
        .ok_or(Error::NoSuchJob(position))?;
    repo.job_at(index).map_err(one_based)
}

fn one_based(err: Error) -> Error {
    match err {
        Error::NoSuchJob(index) => Error::NoSuchJob(index + 1),
        other => other,
    }
}

fn parse_datetime(s: &str) -> std::result::Result<NaiveDateTime, String> {
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("'{s}' is not a date and time like 2025-03-21 15:04"))
}

fn paid_label(record: &JobRecord) -> ColoredString {
    if record.is_paid {
        "Paid".green()
    } else {
        "Unpaid".red()
    }
}

fn summary(record: &JobRecord, currency: &str) -> String {
    let completed = match record.completed_date {
        Some(date) => format!("Completed: {date}").normal(),
        None => "Not Completed".red(),
    };

    format!(
        "{}  Opened: {}  {}  {} {}",
        record.title.bold(),
        record.opened_date,
        completed,
        paid_label(record),
        format_money(currency, record.amount),
    )
}

fn details(record: &JobRecord, currency: &str) {
    println!("{}", record.title.bold());
    println!("  Opened:     {}", record.opened_date);
    match record.completed_date {
        Some(date) => println!("  Completed:  {date}"),
        None => println!("  Completed:  {}", "Not Completed".red()),
    }
    if let Some(days) = record.days_to_complete() {
        println!("  Days to complete: {days}");
    }
    if let Some(posted) = record.posted_date {
        println!("  Posted:     {}", posted.format("%Y-%m-%d %H:%M"));
    }
    println!("  Status:     {}", paid_label(record));
    println!("  Amount:     {}", format_money(currency, record.amount));
    println!(
        "  Notes:      {}",
        record.notes.as_deref().unwrap_or("").italic()
    );
    warn_anomalies(record);
}

fn warn_anomalies(record: &JobRecord) {
    for anomaly in record.anomalies() {
        eprintln!("{} this job {anomaly}", "warning:".yellow().bold());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 21)
            .unwrap()
            .and_hms_opt(15, 4, 0)
            .unwrap();

        assert_eq!(parse_datetime("2025-03-21 15:04").unwrap(), expected);
        assert_eq!(parse_datetime("2025-03-21T15:04:00").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_one_based() {
        assert!(matches!(one_based(Error::NoSuchJob(0)), Error::NoSuchJob(1)));
    }

    #[test]
    fn test_handle_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(
            &dir.path().join("data.db"),
            tally_lib::repository::config::CoreConfig::default(),
        )
        .unwrap();
        let feedback = tally_lib::feedback::Silent;

        let add = Command::Add {
            title: "Porch".into(),
            opened: NaiveDate::from_ymd_opt(2025, 3, 1),
            amount: None,
            notes: None,
        };
        handle(&repo, &feedback, &add).unwrap();
        handle(&repo, &feedback, &Command::Complete { index: 1 }).unwrap();
        handle(&repo, &feedback, &Command::Pay { index: 1 }).unwrap();

        let record = repo.job_at(0).unwrap().record().unwrap();
        assert!(record.is_paid);
        assert!(record.is_completed());
        assert_eq!(record.amount, tally_lib::DEFAULT_AMOUNT);

        assert!(matches!(
            handle(&repo, &feedback, &Command::Show { index: 2 }),
            Err(Error::NoSuchJob(2))
        ));
        assert!(matches!(
            handle(&repo, &feedback, &Command::Show { index: 0 }),
            Err(Error::NoSuchJob(0))
        ));

        handle(&repo, &feedback, &Command::Remove { indices: vec![1] }).unwrap();
        assert!(repo.jobs().unwrap().is_empty());
    }
}
