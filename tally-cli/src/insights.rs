use colored::Colorize;
use tally_lib::{DisplayMode, Repository, Result, feedback::Feedback, ledger::Totals};

#[derive(clap::Args, Debug, Clone)]
pub struct Args {
    /// Show dollar amounts instead of job counts
    #[arg(short, long)]
    amounts: bool,
}

impl Args {
    fn mode(&self) -> DisplayMode {
        if self.amounts {
            DisplayMode::default().toggled()
        } else {
            DisplayMode::default()
        }
    }
}

pub fn handle(repo: &Repository, feedback: &impl Feedback, args: &Args) -> Result<()> {
    let mode = args.mode();
    if mode != DisplayMode::default() {
        feedback.selection();
    }

    let insights = repo.ledger()?.insights();
    let currency = repo.config().read().currency_symbol.clone();
    let value = |totals: &Totals| mode.format(totals, &currency).bold();

    println!("{}", "All Time".underline());
    println!("  {:<14}{}", "Total Paid", value(&insights.paid));
    println!("  {:<14}{}", "Total Unpaid", value(&insights.unpaid));

    println!("{}", "Monthly Data".underline());
    if insights.monthly.is_empty() {
        println!("  {}", "No paid jobs yet".dimmed());
    }
    for bucket in &insights.monthly {
        println!("  {:<14}{}", bucket.label(), value(&bucket.totals));
    }

    Ok(())
}
