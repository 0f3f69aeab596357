use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::cli::output::{to_json, OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::chart::render_html;
use crate::core::config::{AppConfig, StoreKind};
use crate::core::cost::colors::ColorTable;
use crate::core::cost::normalizer::Normalizer;
use crate::core::error::PipelineError;
use crate::core::models::chart::ChartSpec;
use crate::core::models::cost::{DailySummary, Report};
use crate::core::notify::{Notifier, SlackNotifier};
use crate::core::pipeline::{digest, Digest};
use crate::core::render::{ChartRenderer, HeadlessBrowser};
use crate::core::report::{compose, EmptySummary};
use crate::core::sources::aws_cli::AwsCliSource;
use crate::core::sources::json_file::JsonFileSource;
use crate::core::sources::{BillingSource, DateRange, Query};
use crate::core::store::key_value::KeyValueStore;
use crate::core::store::local::LocalStore;
use crate::core::store::ArtifactStore;

pub const CHART_PAGE_KEY: &str = "chart";
pub const SCREENSHOT_KEY: &str = "screenshot.png";
/// Chart reference used when the report is composed without rendering.
pub const DRY_RUN_REFERENCE: &str = "<not rendered>";

#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    pub dry_run: bool,
    pub input_dir: Option<PathBuf>,
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct PreviewPayload<'a> {
    yesterday: String,
    window_start: String,
    window_end: String,
    summary: &'a DailySummary,
    chart: &'a ChartSpec,
    report: &'a Report,
}

impl<'a> PreviewPayload<'a> {
    fn new(
        digest: &'a Digest,
        report: &'a Report,
        yesterday: DateRange,
        window: DateRange,
    ) -> Self {
        Self {
            yesterday: yesterday.start.format("%Y-%m-%d").to_string(),
            window_start: window.start.format("%Y-%m-%d").to_string(),
            window_end: window.last_day().format("%Y-%m-%d").to_string(),
            summary: &digest.summary,
            chart: &digest.chart,
            report,
        }
    }
}

/// Fetch both ranges concurrently and run the aggregation core.
pub async fn collect(
    config: &AppConfig,
    source: &dyn BillingSource,
    today: NaiveDate,
) -> Result<(Digest, DateRange, DateRange)> {
    let yesterday_range = DateRange::yesterday(today)?;
    let window_range = DateRange::trailing(today, config.report.window_days)
        .context("report.window_days does not fit the calendar")?;

    info!(yesterday = %yesterday_range, window = %window_range, "Getting costs...");
    let (yesterday, window) = tokio::try_join!(
        source.fetch(Query::Yesterday, yesterday_range),
        source.fetch(Query::Window, window_range),
    )?;

    let normalizer = Normalizer::new(&config.aws.metric)
        .with_aliases(&config.aliases)
        .with_missing_key_policy(config.report.missing_key_policy());
    let colors = ColorTable::with_overrides(&config.colors);

    let digest = digest(&normalizer, &colors, &yesterday, &window)?;
    Ok((digest, yesterday_range, window_range))
}

/// Render, store and announce a digest. Nothing is posted if any step fails.
pub async fn publish(
    digest: &Digest,
    channel: &str,
    empty: EmptySummary,
    renderer: &dyn ChartRenderer,
    store: &dyn ArtifactStore,
    notifier: &dyn Notifier,
) -> Result<Report> {
    if digest.summary.is_empty() && empty == EmptySummary::Reject {
        return Err(PipelineError::EmptySummary.into());
    }

    info!("Generating chart...");
    let html = render_html(&digest.chart)?;
    store
        .put(CHART_PAGE_KEY, html.as_bytes(), "text/html")
        .await
        .context("Failed to store chart page")?;
    let image = renderer.render(&html).await?;

    info!(bytes = image.len(), "Uploading chart...");
    let chart_url = store
        .put(SCREENSHOT_KEY, &image, "image/png")
        .await
        .context("Failed to store chart image")?;

    let report = compose(&digest.summary, &chart_url, empty)?;

    info!(channel, "Posting to Slack...");
    notifier.post(channel, &report.summary_text).await?;
    Ok(report)
}

fn build_store(config: &AppConfig) -> Result<Box<dyn ArtifactStore>> {
    Ok(match config.store.kind {
        StoreKind::Local => Box::new(LocalStore::new(config.output_dir())),
        StoreKind::KeyValue => Box::new(KeyValueStore::from_config(&config.store)?),
    })
}

pub async fn run(args: ReportArgs, opts: &OutputOptions) -> Result<()> {
    let mut config = AppConfig::load()?;
    config.apply_env();

    if !args.dry_run {
        let issues = config.validate();
        if !issues.is_empty() {
            anyhow::bail!(
                "Invalid config at {}:\n  {}",
                AppConfig::config_path().display(),
                issues.join("\n  ")
            );
        }
    }

    let source: Box<dyn BillingSource> = match &args.input_dir {
        Some(dir) => Box::new(JsonFileSource::new(dir)),
        None => Box::new(AwsCliSource::from_config(&config.aws)),
    };
    let today = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let (digest, yesterday, window) = collect(&config, source.as_ref(), today).await?;
    let empty = config.report.empty_summary();

    if args.dry_run {
        let report = compose(&digest.summary, DRY_RUN_REFERENCE, empty)?;
        match opts.format {
            OutputFormat::Text => {
                println!(
                    "{}",
                    renderer::render_preview(&digest, yesterday, window, opts.use_color)
                );
                println!();
                println!("{}", report.summary_text);
            }
            OutputFormat::Json => {
                let payload = PreviewPayload::new(&digest, &report, yesterday, window);
                println!("{}", to_json(&payload, opts)?);
            }
        }
        return Ok(());
    }

    let renderer = HeadlessBrowser::from_config(&config.render)?;
    let store = build_store(&config)?;
    let notifier = SlackNotifier::from_config(&config.slack)?;

    let report = publish(
        &digest,
        &config.slack.channel,
        empty,
        &renderer,
        store.as_ref(),
        &notifier,
    )
    .await?;

    match opts.format {
        OutputFormat::Text => println!("{}", report.summary_text),
        OutputFormat::Json => println!("{}", to_json(&report, opts)?),
    }
    info!("We are done!");
    Ok(())
}
