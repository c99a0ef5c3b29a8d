//! Database enum types with Diesel serialization.
//!
//! Each enum maps a text column guarded by a CHECK constraint and implements
//! `ToSql` and `FromSql` for conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

/// Outcome of the last sync attempt of an external calendar.
///
/// Maps to `external_calendar.last_sync_status` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Never synced.
    #[default]
    Never,
    /// Last sync fetched and stored the feed.
    Ok,
    /// Last sync failed; see `sync_error`.
    Error,
}

impl ToSql<Text, Pg> for SyncStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for SyncStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"never" => Ok(Self::Never),
            b"ok" => Ok(Self::Ok),
            b"error" => Ok(Self::Error),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl SyncStatus {
    /// Returns the database string representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
