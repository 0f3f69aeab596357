use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::error::PipelineError;
use crate::core::models::billing::RawTimeBucket;
use crate::core::models::cost::{CostRecord, DayRecords};

/// Service name the provider uses for tax line items.
pub const TAX_SERVICE: &str = "Tax";
/// Service name for groups that carry no dimension key.
pub const UNKNOWN_SERVICE: &str = "Unknown";
pub const DEFAULT_METRIC: &str = "AmortizedCost";

/// Historical service names mapped to their current spelling, so renamed
/// services land in one chart series.
static DEFAULT_ALIASES: &[(&str, &str)] = &[(
    "MongoDB Atlas (Pay as You Go)",
    "MongoDB Atlas (pay-as-you-go)",
)];

/// What to do with a cost group that has no service key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    #[default]
    AssignUnknown,
    Reject,
}

/// Turns raw provider buckets into `CostRecord`s.
#[derive(Debug, Clone)]
pub struct Normalizer {
    metric: String,
    aliases: HashMap<String, String>,
    missing_key: MissingKeyPolicy,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_METRIC)
    }
}

impl Normalizer {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            missing_key: MissingKeyPolicy::default(),
        }
    }

    /// Add aliases on top of the built-in ones.
    pub fn with_aliases(mut self, extra: &HashMap<String, String>) -> Self {
        self.aliases
            .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn with_missing_key_policy(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_key = policy;
        self
    }

    /// Current name for a service, following the alias table.
    pub fn canonical_service<'a>(&'a self, service: &'a str) -> &'a str {
        self.aliases
            .get(service)
            .map(String::as_str)
            .unwrap_or(service)
    }

    /// Normalize every bucket, keeping the per-day grouping and order.
    pub fn normalize(&self, buckets: &[RawTimeBucket]) -> Result<Vec<DayRecords>, PipelineError> {
        buckets.iter().map(|b| self.normalize_bucket(b)).collect()
    }

    pub fn normalize_bucket(&self, bucket: &RawTimeBucket) -> Result<DayRecords, PipelineError> {
        let period = bucket.time_period.start.as_str();
        let date = NaiveDate::parse_from_str(period, "%Y-%m-%d")
            .map_err(|_| PipelineError::malformed(period, "unparseable start date"))?;

        let groups = bucket
            .groups
            .as_ref()
            .ok_or_else(|| PipelineError::malformed(period, "time bucket has no groups"))?;

        let mut records = Vec::with_capacity(groups.len());
        for group in groups {
            let service = match group.service_key() {
                Some(key) => key,
                None => match self.missing_key {
                    MissingKeyPolicy::AssignUnknown => UNKNOWN_SERVICE,
                    MissingKeyPolicy::Reject => {
                        return Err(PipelineError::MissingKey {
                            period: period.to_string(),
                        })
                    }
                },
            };
            if service == TAX_SERVICE {
                continue;
            }
            let service = self.canonical_service(service);
            if service == TAX_SERVICE {
                continue;
            }

            let amount = parse_amount(group.amount(&self.metric), period)?;
            records.push(CostRecord {
                date,
                service: service.to_string(),
                amount,
            });
        }

        Ok(DayRecords { date, records })
    }
}

/// Missing or blank amounts count as zero; negative amounts (credits) are clamped.
fn parse_amount(raw: Option<&str>, period: &str) -> Result<f64, PipelineError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(0.0),
        Some(s) => s,
    };
    let value: f64 = raw
        .parse()
        .map_err(|_| PipelineError::malformed(period, format!("invalid amount '{}'", raw)))?;
    if !value.is_finite() {
        return Err(PipelineError::malformed(
            period,
            format!("invalid amount '{}'", raw),
        ));
    }
    if value < 0.0 {
        tracing::warn!(period, amount = value, "negative cost clamped to zero");
        return Ok(0.0);
    }
    Ok(value)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::billing::{MetricValue, RawGroupEntry, TimePeriod};

    pub(crate) fn group(keys: Option<&[&str]>, amount: Option<&str>) -> RawGroupEntry {
        let mut metrics = HashMap::new();
        metrics.insert(
            DEFAULT_METRIC.to_string(),
            MetricValue {
                amount: amount.map(str::to_string),
                unit: Some("USD".to_string()),
            },
        );
        RawGroupEntry {
            keys: keys.map(|k| k.iter().map(|s| s.to_string()).collect()),
            metrics,
        }
    }

    impl Normalizer {
        fn normalize_flat(&self, buckets: &[RawTimeBucket]) -> Result<Vec<CostRecord>, PipelineError> {
            Ok(self
                .normalize(buckets)?
                .into_iter()
                .flat_map(|day| day.records)
                .collect())
        }
    }

    pub(crate) fn bucket(start: &str, groups: Option<Vec<RawGroupEntry>>) -> RawTimeBucket {
        RawTimeBucket {
            time_period: TimePeriod {
                start: start.to_string(),
                end: start.to_string(),
            },
            groups,
            estimated: false,
        }
    }

    #[test]
    fn tax_group_is_dropped() {
        let buckets = vec![bucket(
            "2024-03-01",
            Some(vec![group(Some(&["Tax"]), Some("12.00"))]),
        )];
        let records = Normalizer::default().normalize_flat(&buckets).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn tax_is_dropped_among_other_services() {
        let buckets = vec![
            bucket(
                "2024-03-01",
                Some(vec![
                    group(Some(&["EC2"]), Some("1.00")),
                    group(Some(&["Tax"]), Some("0.20")),
                ]),
            ),
            bucket(
                "2024-03-02",
                Some(vec![
                    group(Some(&["Tax"]), Some("0.30")),
                    group(Some(&["S3"]), Some("2.00")),
                ]),
            ),
        ];
        let records = Normalizer::default().normalize_flat(&buckets).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.service != TAX_SERVICE));
    }

    #[test]
    fn legacy_mongodb_name_is_canonicalized() {
        let buckets = vec![bucket(
            "2024-03-01",
            Some(vec![
                group(Some(&["MongoDB Atlas (Pay as You Go)"]), Some("3.00")),
                group(Some(&["MongoDB Atlas (pay-as-you-go)"]), Some("4.00")),
            ]),
        )];
        let records = Normalizer::default().normalize_flat(&buckets).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.service == "MongoDB Atlas (pay-as-you-go)"));
    }

    #[test]
    fn extra_aliases_apply() {
        let mut extra = HashMap::new();
        extra.insert("Old Name".to_string(), "New Name".to_string());
        let normalizer = Normalizer::default().with_aliases(&extra);
        assert_eq!(normalizer.canonical_service("Old Name"), "New Name");
        assert_eq!(
            normalizer.canonical_service("MongoDB Atlas (Pay as You Go)"),
            "MongoDB Atlas (pay-as-you-go)"
        );
        assert_eq!(normalizer.canonical_service("EC2"), "EC2");
    }

    #[test]
    fn alias_onto_tax_is_dropped() {
        let mut extra = HashMap::new();
        extra.insert("VAT".to_string(), TAX_SERVICE.to_string());
        let normalizer = Normalizer::default().with_aliases(&extra);
        let buckets = vec![bucket(
            "2024-03-01",
            Some(vec![group(Some(&["VAT"]), Some("9.00"))]),
        )];
        assert!(normalizer.normalize_flat(&buckets).unwrap().is_empty());
    }

    #[test]
    fn missing_amount_is_zero() {
        let buckets = vec![bucket(
            "2024-03-01",
            Some(vec![
                group(Some(&["EC2"]), None),
                group(Some(&["S3"]), Some("")),
            ]),
        )];
        let records = Normalizer::default().normalize_flat(&buckets).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.amount == 0.0));
    }

    #[test]
    fn missing_metric_is_zero() {
        let normalizer = Normalizer::new("UnblendedCost");
        let buckets = vec![bucket(
            "2024-03-01",
            Some(vec![group(Some(&["EC2"]), Some("5.00"))]),
        )];
        let records = normalizer.normalize_flat(&buckets).unwrap();
        assert_eq!(records[0].amount, 0.0);
    }

    #[test]
    fn keyless_group_becomes_unknown() {
        let buckets = vec![bucket(
            "2024-03-01",
            Some(vec![
                group(None, Some("1.50")),
                group(Some(&[]), Some("2.50")),
            ]),
        )];
        let records = Normalizer::default().normalize_flat(&buckets).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.service == UNKNOWN_SERVICE));
    }

    #[test]
    fn keyless_group_rejected_under_strict_policy() {
        let normalizer = Normalizer::default().with_missing_key_policy(MissingKeyPolicy::Reject);
        let buckets = vec![bucket("2024-03-01", Some(vec![group(None, Some("1.50"))]))];
        let err = normalizer.normalize(&buckets).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingKey {
                period: "2024-03-01".into()
            }
        );
    }

    #[test]
    fn absent_groups_is_malformed() {
        let buckets = vec![
            bucket("2024-03-01", Some(vec![group(Some(&["EC2"]), Some("1.00"))])),
            bucket("2024-03-02", None),
        ];
        let err = Normalizer::default().normalize(&buckets).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedInput { ref period, .. } if period == "2024-03-02"
        ));
    }

    #[test]
    fn empty_groups_yield_empty_day() {
        let buckets = vec![bucket("2024-03-01", Some(vec![]))];
        let days = Normalizer::default().normalize(&buckets).unwrap();
        assert_eq!(days.len(), 1);
        assert!(days[0].records.is_empty());
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn invalid_amount_is_malformed() {
        let buckets = vec![bucket(
            "2024-03-01",
            Some(vec![group(Some(&["EC2"]), Some("twelve"))]),
        )];
        let err = Normalizer::default().normalize(&buckets).unwrap_err();
        assert!(err.to_string().contains("invalid amount"));
    }

    #[test]
    fn invalid_start_date_is_malformed() {
        let buckets = vec![bucket("yesterday", Some(vec![]))];
        assert!(Normalizer::default().normalize(&buckets).is_err());
    }

    #[test]
    fn negative_amount_is_clamped() {
        let buckets = vec![bucket(
            "2024-03-01",
            Some(vec![group(Some(&["Credits"]), Some("-4.20"))]),
        )];
        let records = Normalizer::default().normalize_flat(&buckets).unwrap();
        assert_eq!(records[0].amount, 0.0);
    }

    #[test]
    fn records_keep_provider_order_and_date() {
        let buckets = vec![bucket(
            "2024-03-05",
            Some(vec![
                group(Some(&["S3"]), Some("0.10")),
                group(Some(&["EC2"]), Some("7.25")),
            ]),
        )];
        let records = Normalizer::default().normalize_flat(&buckets).unwrap();
        let services: Vec<&str> = records.iter().map(|r| r.service.as_str()).collect();
        assert_eq!(services, vec!["S3", "EC2"]);
        assert!((records[1].amount - 7.25).abs() < 1e-10);
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }
}
