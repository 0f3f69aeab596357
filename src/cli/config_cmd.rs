use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{to_json, OutputFormat, OutputOptions};
use crate::core::config::AppConfig;

#[derive(Serialize)]
struct CheckPayload {
    path: String,
    exists: bool,
    valid: bool,
    issues: Vec<String>,
}

pub fn init(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    let path = AppConfig::default().save()?;
    println!("Generated config at {}", path.display());
    println!("  Set slack.channel, then export SLACK_BOT_TOKEN and AWS credentials.");
    Ok(())
}

pub fn check(opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    let exists = path.exists();
    let mut config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    config.apply_env();
    let issues = config.validate();

    match opts.format {
        OutputFormat::Json => {
            let payload = CheckPayload {
                path: path.display().to_string(),
                exists,
                valid: issues.is_empty(),
                issues: issues.clone(),
            };
            println!("{}", to_json(&payload, opts)?);
        }
        OutputFormat::Text => {
            if !exists {
                println!("No config file at {} (using defaults)", path.display());
            }
            if opts.verbose {
                println!(
                    "  aws: region={} metric={} | store: {:?} | window: {} days",
                    config.aws.region,
                    config.aws.metric,
                    config.store.kind,
                    config.report.window_days
                );
                println!(
                    "  credentials: aws={} slack={}",
                    config.aws.access_key_id.is_some() && config.aws.secret_access_key.is_some(),
                    config.slack.bot_token.is_some()
                );
            }
            if issues.is_empty() {
                println!("Config is valid.");
            } else {
                println!("Found {} issue(s):", issues.len());
                for issue in &issues {
                    println!("  - {}", issue);
                }
            }
        }
    }

    if !issues.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

pub fn path(_opts: &OutputOptions) -> Result<()> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}
