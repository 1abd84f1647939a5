use std::{fs, path::PathBuf};

use clap::Subcommand;
use colored::Colorize;
use tally_lib::{
    Repository, Result, YearMonth,
    feedback::{Feedback, NotificationKind},
    invoice::{InvoiceOptions, default_file_name, render_monthly_invoice},
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the invoice for the jobs completed in a month to a PDF
    Export {
        /// Month to invoice, like "Mar 2025"
        #[arg(value_parser = parse_month)]
        month: YearMonth,
        /// Where to write the PDF, defaults to a file named after the month
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn handle(repo: &Repository, feedback: &impl Feedback, cmd: &Command) -> Result<()> {
    match cmd {
        Command::Export { month, output } => {
            let jobs = repo.ledger()?.invoice_jobs(*month);
            let options = InvoiceOptions::from_config(&repo.config().read());
            let bytes = render_monthly_invoice(&month.label(), &jobs, &options)?;

            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_file_name(*month)));
            fs::write(&path, bytes)?;

            feedback.notification(NotificationKind::Success);
            println!(
                "Wrote invoice for {} ({} job(s)) to {}",
                month.label().bold(),
                jobs.len(),
                path.display()
            );
        }
    }

    Ok(())
}

fn parse_month(s: &str) -> std::result::Result<YearMonth, String> {
    YearMonth::parse_label(s).ok_or_else(|| format!("'{s}' is not a month like 'Mar 2025'"))
}
