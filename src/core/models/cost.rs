use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One normalized cost entry: a service's spend on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub date: NaiveDate,
    pub service: String,
    /// Dollars, never negative
    pub amount: f64,
}

/// Yesterday's spend per service, in whole dollars.
///
/// Only services above the noise threshold are present.
pub type DailySummary = BTreeMap<String, u64>;

/// Normalized records for one time bucket, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecords {
    pub date: NaiveDate,
    pub records: Vec<CostRecord>,
}

/// Final artifact of a run, handed to the notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary_text: String,
    pub chart_reference: String,
}
