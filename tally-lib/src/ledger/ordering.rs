use std::cmp::Ordering;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::job::JobRecord;

/// How a job list is ordered for display.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    ValueEnum,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderingPolicy {
    /// Open work first, then unpaid work oldest first, then paid work most recent first
    #[default]
    Canonical,
    /// Unpaid first, then open before completed, then most recent first
    Legacy,
}

impl OrderingPolicy {
    pub fn compare(self, a: &JobRecord, b: &JobRecord) -> Ordering {
        match self {
            OrderingPolicy::Canonical => canonical(a, b),
            OrderingPolicy::Legacy => legacy(a, b),
        }
    }
}

/// `false` sorts before `true`, so open jobs and unpaid jobs come first.
fn canonical(a: &JobRecord, b: &JobRecord) -> Ordering {
    if a.is_completed() != b.is_completed() {
        return a.is_completed().cmp(&b.is_completed());
    }

    if a.is_paid != b.is_paid {
        return a.is_paid.cmp(&b.is_paid);
    }

    if a.is_paid {
        // A missing date is the earliest possible one, `None < Some(_)`
        b.completed_date.cmp(&a.completed_date)
    } else {
        a.opened_date.cmp(&b.opened_date)
    }
}

fn legacy(a: &JobRecord, b: &JobRecord) -> Ordering {
    a.is_paid
        .cmp(&b.is_paid)
        .then_with(|| a.is_completed().cmp(&b.is_completed()))
        .then_with(|| b.effective_date().cmp(&a.effective_date()))
}
