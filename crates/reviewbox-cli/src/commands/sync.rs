use std::path::Path;

use reviewbox_core::sync::{SweepReport, SyncEvent};

use crate::commands::common::{build_agent, load_config, open_service};
use crate::error::CliError;

pub async fn run_sync(db_path: &Path, config_path: &Path) -> Result<SweepReport, CliError> {
    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?;
    let agent = build_agent(&reviews, &config)?.ok_or(CliError::RelayNotConfigured)?;

    let report = agent.sweep_pending().await;
    println!("{}", format_sweep_report(&report));
    Ok(report)
}

pub async fn run_sync_watch(db_path: &Path, config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?;
    let agent = build_agent(&reviews, &config)?.ok_or(CliError::RelayNotConfigured)?;

    println!(
        "Relaying pending reviews every {}s. Press Ctrl-C to stop.",
        config.sweep_interval_secs
    );
    let mut handle = agent.spawn(config.sweep_interval());
    loop {
        tokio::select! {
            event = handle.next_event() => {
                let Some(event) = event else {
                    break;
                };
                if let Some(line) = format_sync_event(&event) {
                    println!("{line}");
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }
    handle.shutdown().await;
    println!("Stopped");
    Ok(())
}

pub fn format_sweep_report(report: &SweepReport) -> String {
    if report.attempted == 0 && report.skipped == 0 {
        return "Nothing to relay".to_string();
    }

    let mut line = format!(
        "Relayed {} of {} pending reviews",
        report.delivered, report.attempted
    );
    if report.failed > 0 {
        line.push_str(&format!(", {} failed", report.failed));
    }
    if report.skipped > 0 {
        line.push_str(&format!(", {} skipped", report.skipped));
    }
    line
}

pub fn format_sync_event(event: &SyncEvent) -> Option<String> {
    match event {
        SyncEvent::Delivered(id) => Some(format!("{id}  delivered")),
        SyncEvent::Failed {
            id,
            outcome,
            attempts,
        } => Some(format!("{id}  {outcome} (attempt {attempts})")),
        SyncEvent::GaveUp(id) => Some(format!("{id}  giving up until next run")),
        SyncEvent::SweepFinished(report) if report.attempted > 0 => {
            Some(format_sweep_report(report))
        }
        SyncEvent::SweepFinished(_) => None,
    }
}
