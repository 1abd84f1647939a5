//! Everything derived from the full set of jobs: display ordering, earnings insights and the
//! selection of jobs that belong on a month's invoice.

use crate::job::JobRecord;

mod insights;
mod ordering;

pub use insights::{DisplayMode, Insights, MonthBucket, Totals, YearMonth, sort_month_labels};
pub use ordering::OrderingPolicy;

/// An in-memory view over a snapshot of every stored job.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<JobRecord>,
}

impl Ledger {
    pub fn new(records: Vec<JobRecord>) -> Self {
        Self { records }
    }

    /// The records sorted by `policy`. The sort is stable, records the policy considers equal
    /// keep the order they were stored in.
    pub fn ordered(&self, policy: OrderingPolicy) -> Vec<&JobRecord> {
        let mut ordered: Vec<&JobRecord> = self.records.iter().collect();
        ordered.sort_by(|a, b| policy.compare(a, b));
        ordered
    }

    pub fn insights(&self) -> Insights {
        Insights::compute(&self.records)
    }

    /// The completed jobs whose effective date falls in `month`, in canonical order.
    pub fn invoice_jobs(&self, month: YearMonth) -> Vec<JobRecord> {
        self.ordered(OrderingPolicy::Canonical)
            .into_iter()
            .filter(|job| job.is_completed() && month.contains(job.effective_date()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::job::test::{date, record};

    use super::*;

    #[test]
    fn test_ordered_scenario() {
        let open = record(1, date(2024, 1, 1));

        let mut early = record(2, date(2024, 1, 2));
        early.completed_date = Some(date(2024, 2, 1));
        early.is_paid = true;
        early.amount = 100.0;

        let mut late = record(3, date(2024, 1, 3));
        late.completed_date = Some(date(2024, 2, 15));
        late.is_paid = true;
        late.amount = 50.0;

        let ledger = Ledger::new(vec![open, early, late]);
        let ids: Vec<u64> = ledger
            .ordered(OrderingPolicy::Canonical)
            .iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_invoice_jobs() {
        let mut march = record(1, date(2025, 2, 20));
        march.completed_date = Some(date(2025, 3, 2));

        let mut march_paid = record(2, date(2025, 3, 1));
        march_paid.completed_date = Some(date(2025, 3, 30));
        march_paid.is_paid = true;

        let open_in_march = record(3, date(2025, 3, 5));

        let mut april = record(4, date(2025, 3, 20));
        april.completed_date = Some(date(2025, 4, 1));

        let ledger = Ledger::new(vec![march_paid, open_in_march, april, march]);
        let ids: Vec<u64> = ledger
            .invoice_jobs(YearMonth::new(2025, 3).unwrap())
            .iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_empty() {
        let ledger = Ledger::default();

        assert!(ledger.ordered(OrderingPolicy::Legacy).is_empty());
        assert!(ledger.insights().monthly.is_empty());
    }
}
