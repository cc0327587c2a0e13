use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

/// ISO dates sort lexicographically, so range queries can compare the text.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
