use colored::{control, Colorize};

use crate::core::cost::summary::summary_total;
use crate::core::formatter::{format_date_range, format_dollars};
use crate::core::models::chart::ChartSeries;
use crate::core::pipeline::Digest;
use crate::core::sources::DateRange;

/// Render a dry-run preview of the digest.
///
/// Layout:
/// ```text
///  Yesterday (Mar 30)
///   Amazon Elastic Compute Cloud - Compute   $48
///   AWS Lambda                                $12
///   Total                                     $60
///
///  Last 30 days (Mar 01 – Mar 30)
///   Amazon Elastic Compute Cloud - Compute   $1,402.17  (30 days)
///   AWS Lambda                                $301.55    (28 days)
/// ```
pub fn render_preview(
    digest: &Digest,
    yesterday: DateRange,
    window: DateRange,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();

    lines.push(
        format!(" Yesterday ({})", yesterday.start.format("%b %d"))
            .bold()
            .to_string(),
    );
    let width = digest
        .summary
        .keys()
        .map(|s| s.len())
        .max()
        .unwrap_or(0)
        .max(5);
    if digest.summary.is_empty() {
        lines.push(format!("  {}", "No service above threshold".dimmed()));
    } else {
        for (service, amount) in &digest.summary {
            lines.push(format!(
                "  {}  {}",
                format!("{:<width$}", service, width = width).cyan(),
                format_dollars(*amount)
            ));
        }
        lines.push(format!(
            "  {}  {}",
            format!("{:<width$}", "Total", width = width).bold(),
            format_dollars(summary_total(&digest.summary)).bold()
        ));
    }

    lines.push(String::new());
    lines.push(
        format!(
            " Last {} days ({})",
            window.days(),
            format_date_range(window.start, window.last_day())
        )
        .bold()
        .to_string(),
    );

    let axis_len = digest.chart.data.labels.len();
    let width = digest
        .chart
        .data
        .datasets
        .iter()
        .map(|s| s.label.len())
        .max()
        .unwrap_or(0);
    for series in &digest.chart.data.datasets {
        let days = format!("({} days)", series.data.len());
        let days = if series.data.len() < axis_len {
            days.yellow()
        } else {
            days.dimmed()
        };
        lines.push(format!(
            "  {}  ${:<10.2} {}",
            format!("{:<width$}", series.label, width = width).cyan(),
            series_total(series),
            days
        ));
    }

    lines.join("\n")
}

fn series_total(series: &ChartSeries) -> f64 {
    series
        .data
        .iter()
        .filter_map(|v| v.parse::<f64>().ok())
        .sum()
}
