use agdb::{DbElement, DbId};

/// Layout of a job element before schema version 2. Only used to find elements that need
/// their new fields backfilled.
#[derive(Debug, Clone, DbElement, PartialEq)]
pub(crate) struct JobModel {
    pub(crate) db_id: Option<DbId>,
    pub(crate) title: String,
    pub(crate) opened: i64,
    pub(crate) completed: Option<i64>,
    pub(crate) is_paid: bool,
}
