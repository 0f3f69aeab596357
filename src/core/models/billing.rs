use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level shape of a Cost Explorer `GetCostAndUsage` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostAndUsageResponse {
    #[serde(default)]
    pub results_by_time: Vec<RawTimeBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimePeriod {
    pub start: String,
    pub end: String,
}

/// One time bucket (a single day at DAILY granularity).
///
/// `groups` is `None` when the provider omitted the field entirely, which is
/// distinct from an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTimeBucket {
    pub time_period: TimePeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<RawGroupEntry>>,
    #[serde(default)]
    pub estimated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawGroupEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub metrics: HashMap<String, MetricValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricValue {
    pub amount: Option<String>,
    pub unit: Option<String>,
}

impl RawGroupEntry {
    /// First dimension key, if any.
    pub fn service_key(&self) -> Option<&str> {
        self.keys.as_ref()?.first().map(String::as_str)
    }

    pub fn amount(&self, metric: &str) -> Option<&str> {
        self.metrics.get(metric)?.amount.as_deref()
    }
}

impl CostAndUsageResponse {
    /// Append a follow-up page, merging groups into buckets that share a start date.
    pub fn merge_page(&mut self, page: CostAndUsageResponse) {
        for bucket in page.results_by_time {
            let existing = self
                .results_by_time
                .iter_mut()
                .find(|b| b.time_period.start == bucket.time_period.start);
            match existing {
                Some(target) => {
                    if let Some(groups) = bucket.groups {
                        target.groups.get_or_insert_with(Vec::new).extend(groups);
                    }
                }
                None => self.results_by_time.push(bucket),
            }
        }
        self.next_page_token = page.next_page_token;
    }
}
