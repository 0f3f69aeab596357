use crate::core::chart;
use crate::core::cost::colors::ColorTable;
use crate::core::cost::dataset::DatasetBuilder;
use crate::core::cost::normalizer::Normalizer;
use crate::core::cost::summary::build_daily_summary;
use crate::core::error::PipelineError;
use crate::core::models::billing::RawTimeBucket;
use crate::core::models::chart::ChartSpec;
use crate::core::models::cost::DailySummary;

/// Everything the report needs before the chart is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub summary: DailySummary,
    pub chart: ChartSpec,
}

/// Run the aggregation core over already-fetched billing data.
///
/// Only the first bucket of `yesterday` is summarized.
pub fn digest(
    normalizer: &Normalizer,
    colors: &ColorTable,
    yesterday: &[RawTimeBucket],
    window: &[RawTimeBucket],
) -> Result<Digest, PipelineError> {
    let first = yesterday
        .first()
        .ok_or_else(|| PipelineError::malformed("yesterday", "no time buckets returned"))?;
    let day = normalizer.normalize_bucket(first)?;
    let summary = build_daily_summary(&day.records)?;

    let days = normalizer.normalize(window)?;
    let dataset = DatasetBuilder::new(colors).build(&days);
    tracing::debug!(
        days = dataset.axis.len(),
        services = dataset.series.len(),
        "built trailing window dataset"
    );

    Ok(Digest {
        summary,
        chart: chart::assemble(dataset),
    })
}
