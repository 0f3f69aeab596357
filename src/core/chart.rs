use anyhow::{Context, Result};

use crate::core::models::chart::{
    AxisOptions, ChartData, ChartOptions, ChartSpec, GridLines, LegendOptions, ScaleOptions,
    Ticks, TooltipCallbacks, TooltipOptions, WindowDataset,
};

/// Page the renderer screenshots. `{chart}` is replaced with the chart JSON.
const HTML_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Daily costs</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@2.9.4/dist/Chart.min.js"></script>
    <style>
        body { margin: 0; background: #ffffff; }
        #container { position: relative; width: 100vw; height: 100vh; }
    </style>
</head>
<body>
    <div id="container"><canvas id="chart"></canvas></div>
    <script>
        var ctx = document.getElementById('chart').getContext('2d');
        new Chart(ctx, {chart});
    </script>
</body>
</html>
"#;

/// Wrap the window dataset in a stacked bar chart description.
pub fn assemble(dataset: WindowDataset) -> ChartSpec {
    ChartSpec {
        chart_type: "bar".to_string(),
        data: ChartData {
            labels: dataset.axis,
            datasets: dataset.series,
        },
        options: ChartOptions {
            tooltips: TooltipOptions {
                display_colors: true,
                callbacks: TooltipCallbacks {
                    mode: "x".to_string(),
                },
            },
            scales: ScaleOptions {
                x_axes: vec![AxisOptions {
                    stacked: true,
                    grid_lines: Some(GridLines { display: false }),
                    ticks: None,
                    scale_type: None,
                }],
                y_axes: vec![AxisOptions {
                    stacked: true,
                    grid_lines: None,
                    ticks: Some(Ticks {
                        begin_at_zero: true,
                    }),
                    scale_type: Some("linear".to_string()),
                }],
            },
            responsive: true,
            maintain_aspect_ratio: false,
            legend: LegendOptions {
                position: "bottom".to_string(),
            },
        },
    }
}

/// Standalone HTML page drawing `spec`.
pub fn render_html(spec: &ChartSpec) -> Result<String> {
    let json = serde_json::to_string(spec).context("Failed to serialize chart spec")?;
    // A label containing `</script>` must not close the script block.
    let json = json.replace("</", "<\\/");
    Ok(HTML_PAGE.replace("{chart}", &json))
}
