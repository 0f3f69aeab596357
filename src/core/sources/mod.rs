pub mod aws_cli;
pub mod json_file;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Days, Duration, NaiveDate};
use std::fmt;

use crate::core::models::billing::RawTimeBucket;

/// Half-open day range `[start, end)` at daily granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The single day before `today`.
    pub fn yesterday(today: NaiveDate) -> anyhow::Result<Self> {
        Self::trailing(today, 1)
    }

    /// The `days` days before `today`, excluding today.
    pub fn trailing(today: NaiveDate, days: u32) -> anyhow::Result<Self> {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .with_context(|| format!("Cannot go back {} days from {}", days, today))?;
        Ok(Self { start, end: today })
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end - Duration::days(1)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Which of the two report queries a fetch serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Yesterday,
    Window,
}

impl Query {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Yesterday => "yesterday",
            Self::Window => "window",
        }
    }
}

/// Supplies daily, per-service cost buckets for a date range.
#[async_trait]
pub trait BillingSource: Send + Sync {
    async fn fetch(&self, query: Query, range: DateRange) -> anyhow::Result<Vec<RawTimeBucket>>;
}
