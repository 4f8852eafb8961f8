//! Typed ids used with diesel
//!
//! Wrapping the raw uuid keeps event ids from being mixed up with other
//! uuid-typed values in queries. See <https://stackoverflow.com/a/59948116>
//! for more information.

use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of an event
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
)]
#[diesel(sql_type = sql_types::Uuid)]
pub struct EventId(uuid::Uuid);

impl EventId {
    pub const fn from(inner: uuid::Uuid) -> Self {
        Self(inner)
    }

    /// Create a new random event id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn inner(&self) -> &uuid::Uuid {
        &self.0
    }

    pub fn into_inner(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql<sql_types::Uuid, Pg> for EventId {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        <uuid::Uuid as ToSql<sql_types::Uuid, Pg>>::to_sql(&self.0, out)
    }
}

impl FromSql<sql_types::Uuid, Pg> for EventId {
    fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
        <uuid::Uuid as FromSql<sql_types::Uuid, Pg>>::from_sql(value).map(Self)
    }
}
