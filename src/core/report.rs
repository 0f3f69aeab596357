use crate::core::error::PipelineError;
use crate::core::formatter::{format_chart_line, format_summary_line};
use crate::core::models::cost::{DailySummary, Report};

/// How to treat a day on which no service crossed the threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptySummary {
    #[default]
    Allow,
    Reject,
}

/// Pair the summary text with the rendered chart's location.
///
/// Layout:
/// ```text
/// AWS Lambda -> *$12*
/// Amazon Elastic Compute Cloud - Compute -> *$48*
///
/// Chart -> https://…/screenshot.png
/// ```
pub fn compose(
    summary: &DailySummary,
    chart_reference: &str,
    empty: EmptySummary,
) -> Result<Report, PipelineError> {
    if summary.is_empty() && empty == EmptySummary::Reject {
        return Err(PipelineError::EmptySummary);
    }

    let lines: Vec<String> = summary
        .iter()
        .map(|(service, amount)| format_summary_line(service, *amount))
        .collect();
    let summary_text = format!(
        "{}\n\n{}",
        lines.join("\n"),
        format_chart_line(chart_reference)
    );

    Ok(Report {
        summary_text,
        chart_reference: chart_reference.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://store.example/records/screenshot.png";

    #[test]
    fn one_line_per_service_then_chart() {
        let mut summary = DailySummary::new();
        summary.insert("EC2".into(), 6);
        summary.insert("RDS".into(), 14);
        let report = compose(&summary, URL, EmptySummary::Allow).unwrap();
        assert_eq!(
            report.summary_text,
            format!("EC2 -> *$6*\nRDS -> *$14*\n\nChart -> {}", URL)
        );
        assert_eq!(report.chart_reference, URL);
    }

    #[test]
    fn empty_summary_allowed_by_default() {
        let report = compose(&DailySummary::new(), URL, EmptySummary::default()).unwrap();
        assert_eq!(report.summary_text, format!("\n\nChart -> {}", URL));
    }

    #[test]
    fn empty_summary_rejected_when_requested() {
        let err = compose(&DailySummary::new(), URL, EmptySummary::Reject).unwrap_err();
        assert_eq!(err, PipelineError::EmptySummary);
    }

    #[test]
    fn non_empty_summary_passes_reject_mode() {
        let mut summary = DailySummary::new();
        summary.insert("EC2".into(), 6);
        assert!(compose(&summary, URL, EmptySummary::Reject).is_ok());
    }
}
