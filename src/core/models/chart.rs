use serde::{Deserialize, Serialize};

/// One stacked bar series: a service's daily costs across the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    /// Two-decimal strings, positionally aligned with the axis
    pub data: Vec<String>,
    #[serde(
        rename = "backgroundColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
}

/// Output of the trailing-window builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDataset {
    pub axis: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Declarative Chart.js (v2) bar chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub tooltips: TooltipOptions,
    pub scales: ScaleOptions,
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub legend: LegendOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub display_colors: bool,
    pub callbacks: TooltipCallbacks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipCallbacks {
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleOptions {
    pub x_axes: Vec<AxisOptions>,
    pub y_axes: Vec<AxisOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    pub stacked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_lines: Option<GridLines>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<Ticks>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scale_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLines {
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticks {
    pub begin_at_zero: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendOptions {
    pub position: String,
}
