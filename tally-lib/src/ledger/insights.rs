use std::{
    cmp::Reverse,
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use chrono::{Datelike, NaiveDate};
use strum::Display as StrumDisplay;

use crate::{
    Error,
    job::{JobRecord, format_money},
};

/// A calendar month, the granularity insights and invoices are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The label shown to users, e.g. `Mar 2025`.
    pub fn label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }

    /// Parse a label produced by [`YearMonth::label`]. Full month names are accepted too.
    pub fn parse_label(label: &str) -> Option<Self> {
        NaiveDate::parse_from_str(&format!("1 {}", label.trim()), "%d %b %Y")
            .ok()
            .map(Self::of)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s).ok_or_else(|| Error::Month(s.to_string()))
    }
}

/// Order raw month labels most recent first. Labels that can't be read as a month fall back to
/// descending text order, after every readable label.
///
/// Pairs mixing a readable and an unreadable label are not compared as text: that would not be
/// a total order, so unreadable labels are kept together at the end instead.
pub fn sort_month_labels(labels: &mut [String]) {
    labels.sort_by(|a, b| {
        match (YearMonth::parse_label(a), YearMonth::parse_label(b)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.cmp(a),
        }
    });
}

/// Count and sum of a set of jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub count: usize,
    pub amount: f64,
}

impl Totals {
    fn add(&mut self, job: &JobRecord) {
        self.count += 1;
        self.amount += job.amount;
    }
}

/// Paid jobs whose effective date falls in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthBucket {
    pub month: YearMonth,
    pub totals: Totals,
}

impl MonthBucket {
    pub fn label(&self) -> String {
        self.month.label()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insights {
    pub paid: Totals,
    pub unpaid: Totals,
    /// Most recent month first
    pub monthly: Vec<MonthBucket>,
}

impl Insights {
    pub fn compute(records: &[JobRecord]) -> Self {
        let mut insights = Insights::default();
        let mut months: BTreeMap<Reverse<YearMonth>, Totals> = BTreeMap::new();

        for job in records {
            if job.is_paid {
                insights.paid.add(job);
                months
                    .entry(Reverse(YearMonth::of(job.effective_date())))
                    .or_default()
                    .add(job);
            } else {
                insights.unpaid.add(job);
            }
        }

        insights.monthly = months
            .into_iter()
            .map(|(Reverse(month), totals)| MonthBucket { month, totals })
            .collect();

        insights
    }

    pub fn total(&self) -> Totals {
        Totals {
            count: self.paid.count + self.unpaid.count,
            amount: self.paid.amount + self.unpaid.amount,
        }
    }
}

/// Whether insights show how many jobs there are or how much they are worth. This is a
/// per-session toggle and is never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Counts,
    Amounts,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Counts => DisplayMode::Amounts,
            DisplayMode::Amounts => DisplayMode::Counts,
        }
    }

    pub fn format(self, totals: &Totals, currency: &str) -> String {
        match self {
            DisplayMode::Counts => totals.count.to_string(),
            DisplayMode::Amounts => format_money(currency, totals.amount),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::job::test::{date, record};

    use super::*;

    fn paid(id: u64, completed: NaiveDate, amount: f64) -> JobRecord {
        let mut job = record(id, date(2020, 1, 1));
        job.completed_date = Some(completed);
        job.is_paid = true;
        job.amount = amount;
        job
    }

    #[test]
    fn test_label() {
        let month = YearMonth::new(2025, 3).unwrap();

        assert_eq!(month.label(), "Mar 2025");
        assert_eq!(YearMonth::parse_label("Mar 2025"), Some(month));
        assert_eq!(YearMonth::parse_label("March 2025"), Some(month));
        assert_eq!("Mar 2025".parse::<YearMonth>().unwrap(), month);
        assert_eq!(YearMonth::parse_label("Smarch 2025"), None);
        assert!(YearMonth::new(2025, 13).is_none());
    }

    #[test]
    fn test_month_bucket_scenario() {
        let records = vec![
            paid(1, date(2025, 3, 3), 100.0),
            paid(2, date(2025, 3, 28), 50.25),
        ];

        let insights = Insights::compute(&records);

        assert_eq!(insights.monthly.len(), 1);
        let bucket = insights.monthly.first().unwrap();
        assert_eq!(bucket.label(), "Mar 2025");
        assert_eq!(bucket.totals.count, 2);
        assert!((bucket.totals.amount - 150.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_buckets_use_effective_date_and_paid_only() {
        let mut open_paid = record(1, date(2025, 1, 15));
        open_paid.is_paid = true;
        open_paid.amount = 10.0;

        let mut unpaid = record(2, date(2025, 1, 15));
        unpaid.completed_date = Some(date(2025, 1, 16));
        unpaid.amount = 99.0;

        let records = vec![
            open_paid,
            unpaid,
            paid(3, date(2024, 12, 31), 20.0),
            paid(4, date(2025, 2, 1), 30.0),
            paid(5, date(2025, 1, 31), 5.0),
        ];

        let insights = Insights::compute(&records);
        let months: Vec<(String, usize, f64)> = insights
            .monthly
            .iter()
            .map(|b| (b.label(), b.totals.count, b.totals.amount))
            .collect();

        assert_eq!(
            months,
            vec![
                ("Feb 2025".to_string(), 1, 30.0),
                ("Jan 2025".to_string(), 2, 15.0),
                ("Dec 2024".to_string(), 1, 20.0),
            ]
        );
    }

    #[test]
    fn test_totals_partition() {
        let mut unpaid = record(1, date(2025, 1, 1));
        unpaid.amount = 12.5;
        let records = vec![
            unpaid,
            paid(2, date(2025, 1, 2), 30.0),
            paid(3, date(2025, 2, 2), 7.25),
        ];

        let insights = Insights::compute(&records);
        let sum: f64 = records.iter().map(|r| r.amount).sum();

        assert_eq!(insights.paid.count, 2);
        assert_eq!(insights.unpaid.count, 1);
        assert_eq!(insights.unpaid.amount, 12.5);
        assert_eq!(insights.paid.amount, 37.25);
        assert_eq!(insights.total().amount, sum);
        assert_eq!(insights.total().count, records.len());
    }

    #[test]
    fn test_bucket_amounts_match_members() {
        let records: Vec<JobRecord> = (1..=24)
            .map(|i| {
                let month = u32::try_from(i % 12 + 1).unwrap();
                let amount = 1.5 * f64::from(u32::try_from(i).unwrap());
                paid(i, date(2024 + i32::from(i > 12), month, 10), amount)
            })
            .collect();

        let insights = Insights::compute(&records);

        for bucket in &insights.monthly {
            let members: Vec<&JobRecord> = records
                .iter()
                .filter(|r| bucket.month.contains(r.effective_date()))
                .collect();
            assert_eq!(bucket.totals.count, members.len());
            assert_eq!(
                bucket.totals.amount,
                members.iter().map(|r| r.amount).sum::<f64>()
            );
        }

        assert!(
            insights
                .monthly
                .iter()
                .zip(insights.monthly.iter().skip(1))
                .all(|(a, b)| a.month > b.month)
        );
    }

    #[test]
    fn test_sort_month_labels() {
        let mut labels: Vec<String> = ["Jan 2025", "garbage", "Mar 2024", "Dec 2024", "zzz"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        sort_month_labels(&mut labels);

        assert_eq!(
            labels,
            vec!["Jan 2025", "Dec 2024", "Mar 2024", "zzz", "garbage"]
        );
    }

    #[test]
    fn test_display_mode() {
        let totals = Totals {
            count: 3,
            amount: 1234.5,
        };

        assert_eq!(DisplayMode::default().format(&totals, "$"), "3");
        assert_eq!(
            DisplayMode::Counts.toggled().format(&totals, "$"),
            "$1234.50"
        );
        assert_eq!(DisplayMode::Amounts.toggled(), DisplayMode::Counts);
    }
}
