use anyhow::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use splatgen_client::{JobBackend, JobSession, SplatApiClient};
use splatgen_core::config::ClientConfig;
use splatgen_core::models::JobSnapshot;

use crate::cli::StatusArgs;
use crate::output::OutputWriter;
use crate::progress::create_spinner;

pub async fn execute(args: StatusArgs, config: &ClientConfig, output: &OutputWriter) -> Result<()> {
    let client = SplatApiClient::new(config)?;
    let snapshot = client.status(&args.job_id).await?;

    if !args.watch || snapshot.status.is_terminal() {
        return print_snapshot(&snapshot, output);
    }

    // Adopt the in-flight job and poll it to completion.
    let mut session = JobSession::new(client, Duration::from_millis(config.poll_interval_ms.value));
    session.apply_snapshot(snapshot);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let spinner = if output.is_json() {
        None
    } else {
        Some(create_spinner("Watching job..."))
    };

    let last = session
        .poll_until_terminal(&cancel, |snap| {
            if let Some(pb) = &spinner {
                pb.set_message(format!(
                    "status: {}",
                    serde_json::to_string(&snap.status).unwrap_or_default()
                ));
            }
        })
        .await?;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    print_snapshot(&last, output)
}

fn print_snapshot(snapshot: &JobSnapshot, output: &OutputWriter) -> Result<()> {
    if output.is_json() {
        output.result(snapshot)?;
        return Ok(());
    }

    output.kv("job", &snapshot.job_id);
    output.kv("status", serde_json::to_string(&snapshot.status)?.trim_matches('"'));
    if let Some(detail) = &snapshot.status_detail {
        output.kv("detail", detail);
    }
    if let Some(position) = snapshot.queue_position {
        output.kv("queue position", position);
    }
    if let Some(wait) = snapshot.estimated_wait_seconds {
        output.kv("estimated wait", format!("{}s", wait));
    }
    if let Some(progress) = snapshot.progress {
        output.kv("progress", format!("{:.0}%", progress * 100.0));
    }
    if let Some(url) = &snapshot.artifact_url {
        output.kv("artifact", url);
    }
    if let Some(ms) = snapshot.processing_time_ms {
        output.kv("processing time", format!("{:.1}s", ms as f64 / 1000.0));
    }
    if let Some(error) = &snapshot.error {
        output.error(error);
    }
    Ok(())
}
