//! Live handles to stored entities.
//!
//! A handle remembers where its element lives and which UID it had when it was loaded, so a
//! handle that outlives its element fails loudly instead of reading whatever took its place.

use std::fmt::{self, Debug, Display, Formatter};

use agdb::{DbError, DbId, DbValue, QueryBuilder, QueryResult};
use thiserror::Error;

use crate::repository::db::Db;

mod job;

pub use job::{Job, JobEdit};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Internal database error {0}")]
    Internal(#[from] DbError),
    #[error("This handle refers to a job that has been replaced")]
    StaleEntity,
    #[error("This handle refers to a job that has been removed")]
    RemovedEntity,
    #[error("Stored field '{field}' holds a value that can't be read")]
    InvalidValue { field: &'static str },
    #[error("A query that must return an element returned nothing")]
    Empty,
}

/// A unique identifier for an entity. Unlike a [`DbId`], it is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Uid(pub(crate) u64);

impl Uid {
    /// Allocate a fresh UID, bumping the counter stored on the `next_uid` node.
    pub fn new(db: &Db) -> Result<Self> {
        db.write().transaction_mut(|t| -> Result<Uid> {
            let uid = Uid::next(
                t.exec(
                    QueryBuilder::select()
                        .values("next_uid")
                        .ids("next_uid")
                        .query(),
                )?,
            )?;
            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("next_uid", uid + 1).into()]])
                    .ids("next_uid")
                    .query(),
            )?;

            Ok(Uid(uid))
        })
    }

    /// Read the counter out of a `next_uid` select.
    pub(crate) fn next(result: QueryResult) -> Result<u64> {
        Ok(single_value(result)?.to_u64()?)
    }

    /// Load the UID of an existing element.
    pub fn load(db: &Db, db_id: DbId) -> Result<Self> {
        let result = db
            .read()
            .exec(QueryBuilder::select().values("uid").ids(db_id).query())
            .map_err(|e| {
                // TODO: Match on DbError kind once agdb exposes one
                let not_found = format!("Id '{}' not found", db_id.as_index());
                if e.description == not_found {
                    Error::RemovedEntity
                } else {
                    Error::Internal(e)
                }
            })?;

        Ok(Self(single_value(result)?.to_u64()?))
    }
}

impl Display for Uid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uid> for DbValue {
    fn from(uid: Uid) -> Self {
        DbValue::U64(uid.0)
    }
}

impl TryFrom<DbValue> for Uid {
    type Error = DbError;

    fn try_from(value: DbValue) -> std::result::Result<Self, Self::Error> {
        Ok(Self(value.to_u64()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EntityId {
    db_id: DbId,
    uid: Uid,
}

impl EntityId {
    /// Load an [`EntityId`] from an existing element.
    pub fn load(db: &Db, db_id: DbId) -> Result<Self> {
        Ok(Self {
            db_id,
            uid: Uid::load(db, db_id)?,
        })
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Get the underlying [`DbId`]. This will check to make sure it isn't stale before returning.
    pub fn db_id(&self, db: &Db) -> Result<DbId> {
        // If the UID changed, that means this DbId now refers to a different entity
        if Uid::load(db, self.db_id)? != self.uid {
            return Err(Error::StaleEntity);
        }

        Ok(self.db_id)
    }
}

pub(crate) fn get_field<T>(db: &Db, id: EntityId, field: &'static str) -> Result<T>
where
    T: TryFrom<DbValue>,
    T::Error: Debug,
{
    let db_id = id.db_id(db)?;
    let result = db
        .read()
        .exec(QueryBuilder::select().values(field).ids(db_id).query())?;

    T::try_from(single_value(result)?).map_err(|_| Error::InvalidValue { field })
}

fn single_value(mut result: QueryResult) -> Result<DbValue> {
    Ok(result
        .elements
        .pop()
        .and_then(|mut e| e.values.pop())
        .ok_or(Error::Empty)?
        .value)
}
