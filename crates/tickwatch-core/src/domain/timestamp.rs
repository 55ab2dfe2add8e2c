use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::ValidationError;

/// Layout DuckDB accepts for `CAST(? AS TIMESTAMP)` and produces through
/// `strftime(col, '%Y-%m-%d %H:%M:%S.%f')`.
const SQL_TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");

const CALENDAR_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// RFC3339 timestamp guaranteed to be UTC, at microsecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    /// Current time, truncated to the microsecond so it survives a storage round trip.
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        let truncated = now
            .replace_nanosecond(now.nanosecond() / 1_000 * 1_000)
            .unwrap_or(now);
        Self(truncated)
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let parsed = OffsetDateTime::parse(input, &Rfc3339).map_err(|_| {
            ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            }
        })?;

        Self::from_offset_datetime(parsed).map_err(|_| ValidationError::TimestampNotUtc {
            value: input.to_owned(),
        })
    }

    /// Parse the naive timestamp layout used by the store, interpreted as UTC.
    pub fn parse_sql(input: &str) -> Result<Self, ValidationError> {
        PrimitiveDateTime::parse(input, SQL_TIMESTAMP)
            .map(|naive| Self(naive.assume_utc()))
            .map_err(|_| ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            })
    }

    pub fn from_offset_datetime(value: OffsetDateTime) -> Result<Self, ValidationError> {
        if value.offset() != UtcOffset::UTC {
            return Err(ValidationError::TimestampNotUtc {
                value: value
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| String::from("<unformattable>")),
            });
        }

        Ok(Self(value))
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }

    pub fn format_sql(self) -> String {
        self.0
            .format(SQL_TIMESTAMP)
            .unwrap_or_else(|_| String::from("1970-01-01 00:00:00.000000"))
    }

    /// Calendar date, e.g. `2024-03-09`.
    pub fn format_date(self) -> String {
        self.0
            .format(CALENDAR_DATE)
            .unwrap_or_else(|_| String::from("-"))
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
