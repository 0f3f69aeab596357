use thiserror::Error;

/// Failures of the aggregation pipeline. Any of these aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Malformed billing data for {period}: {reason}")]
    MalformedInput { period: String, reason: String },
    #[error("Cost group for {period} has no service key")]
    MissingKey { period: String },
    #[error("No service exceeded the daily reporting threshold")]
    EmptySummary,
}

impl PipelineError {
    pub fn malformed(period: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            period: period.into(),
            reason: reason.into(),
        }
    }
}
