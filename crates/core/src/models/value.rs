use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::account::AssetClass;

/// A dated amount observation for one account.
///
/// `date` is already truncated to the calendar day when the value is
/// deserialized, so aggregation code never deals with time-of-day or offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    /// Opaque identifier assigned by the server
    pub id: String,

    /// Name of the owning account
    pub account_name: String,

    /// Signed currency amount (liabilities are usually negative)
    pub amount: f64,

    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
}

impl Value {
    pub fn new(
        id: impl Into<String>,
        account_name: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            account_name: account_name.into(),
            amount,
            date,
        }
    }
}

/// Payload shape for recording a value. Not submitted by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCreate {
    pub account_name: String,
    pub amount: f64,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
}

/// A value tagged with its account's asset class, input to the portfolio breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedValue {
    pub asset_class: AssetClass,
    pub amount: f64,
    pub date: NaiveDate,
}

impl ClassifiedValue {
    pub fn new(asset_class: AssetClass, value: &Value) -> Self {
        Self {
            asset_class,
            amount: value.amount,
            date: value.date,
        }
    }
}

/// Inclusive server-side date bounds, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl DateRange {
    pub fn new(start_date: Option<String>, end_date: Option<String>) -> Self {
        Self { start_date, end_date }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }
}

/// Query parameters accepted by `GET /values/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValueQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Truncate an ISO-8601 date or datetime string to its calendar date.
///
/// The date is taken as written: `"2024-01-31T23:30:00+02:00"` is `2024-01-31`,
/// with no conversion to another zone.
pub fn truncate_to_calendar_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(['T', 't', ' '])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| CoreError::Deserialization(format!("Invalid date '{raw}': {e}")))
}

/// Serde adapter: reads any ISO-8601 date/datetime, writes `YYYY-MM-DD`.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::truncate_to_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}
