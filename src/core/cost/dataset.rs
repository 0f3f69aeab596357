use std::collections::HashMap;

use crate::core::cost::colors::{fallback_token, ColorTable};
use crate::core::models::chart::{ChartSeries, WindowDataset};
use crate::core::models::cost::DayRecords;

/// Builds the per-service chart series for the trailing window.
///
/// Each call is independent: the fallback color counter starts at 1 for
/// every build.
pub struct DatasetBuilder<'a> {
    colors: &'a ColorTable,
}

/// Accumulator for one build pass.
struct SeriesAccumulator<'a> {
    colors: &'a ColorTable,
    series: Vec<ChartSeries>,
    index: HashMap<String, usize>,
    next_fallback: usize,
}

impl<'a> SeriesAccumulator<'a> {
    fn new(colors: &'a ColorTable) -> Self {
        Self {
            colors,
            series: Vec::new(),
            index: HashMap::new(),
            next_fallback: 1,
        }
    }

    fn push(&mut self, service: &str, value: String) {
        if let Some(&i) = self.index.get(service) {
            self.series[i].data.push(value);
            return;
        }
        let color = self.assign_color(service);
        self.index.insert(service.to_string(), self.series.len());
        self.series.push(ChartSeries {
            label: service.to_string(),
            data: vec![value],
            color,
        });
    }

    fn assign_color(&mut self, service: &str) -> Option<String> {
        if let Some(color) = self.colors.get(service) {
            return Some(color.to_string());
        }
        let token = fallback_token(self.next_fallback);
        self.next_fallback += 1;
        let color = self.colors.get(&token).map(str::to_string);
        if color.is_none() {
            tracing::debug!(service, token = %token, "no color for fallback slot");
        }
        color
    }
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(colors: &'a ColorTable) -> Self {
        Self { colors }
    }

    /// Day buckets in chronological order → shared axis plus one series per
    /// service, in first-seen order.
    ///
    /// Days on which a service has no record are skipped rather than zero
    /// filled, so a series with gaps is shorter than the axis.
    pub fn build(&self, days: &[DayRecords]) -> WindowDataset {
        let mut acc = SeriesAccumulator::new(self.colors);
        for day in days {
            for record in &day.records {
                acc.push(&record.service, format_cost(record.amount));
            }
        }

        WindowDataset {
            axis: days
                .iter()
                .map(|d| d.date.format("%Y-%m-%d").to_string())
                .collect(),
            series: acc.series,
        }
    }
}

/// Two-decimal dollar string as plotted on the chart.
pub fn format_cost(amount: f64) -> String {
    format!("{:.2}", amount)
}
