use std::collections::HashMap;

use crate::core::error::PipelineError;
use crate::core::models::cost::{CostRecord, DailySummary};

/// Services whose daily spend does not exceed this many dollars are left out
/// of the summary.
pub const NOISE_THRESHOLD: f64 = 5.0;

/// Reduce one day's records to whole-dollar totals per service.
///
/// Fails when a service total does not fit in whole dollars.
pub fn build_daily_summary(records: &[CostRecord]) -> Result<DailySummary, PipelineError> {
    let mut totals: HashMap<&str, (f64, &CostRecord)> = HashMap::new();
    for record in records {
        totals
            .entry(record.service.as_str())
            .or_insert((0.0, record))
            .0 += record.amount;
    }

    let mut summary = DailySummary::new();
    for (service, (total, first)) in totals {
        if total <= NOISE_THRESHOLD {
            continue;
        }
        let rounded = total.round();
        if !rounded.is_finite() || rounded >= u64::MAX as f64 {
            return Err(PipelineError::malformed(
                first.date.format("%Y-%m-%d").to_string(),
                format!("total for {} is out of range: {}", service, total),
            ));
        }
        summary.insert(service.to_string(), rounded as u64);
    }
    Ok(summary)
}

/// Sum of all retained services, saturating at `u64::MAX`.
pub fn summary_total(summary: &DailySummary) -> u64 {
    summary.values().fold(0u64, |acc, v| acc.saturating_add(*v))
}
