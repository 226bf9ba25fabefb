use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use splatgen_client::{JobSession, SessionPhase, SplatApiClient};
use splatgen_core::config::ClientConfig;
use splatgen_core::formats::export::{export_to_file, ExportFormat};
use splatgen_core::formats::ply::decode;
use splatgen_core::geometry::Geometry;

use crate::cli::GenerateArgs;
use crate::output::OutputWriter;
use crate::progress::GenerateProgress;

pub async fn execute(args: GenerateArgs, config: &ClientConfig, output: &OutputWriter) -> Result<()> {
    let image_bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("failed to read image {}", args.image.display()))?;
    let filename = args
        .image
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.jpg")
        .to_string();

    let format_name = args.format.as_deref().unwrap_or(&config.export_format.value);
    let format = ExportFormat::from_name(format_name)?;
    let out_path: PathBuf = args
        .output
        .clone()
        .unwrap_or_else(|| args.image.with_extension(format.extension()));

    let client = SplatApiClient::new(config)?;
    let mut session = JobSession::new(client, Duration::from_millis(config.poll_interval_ms.value));
    let progress = GenerateProgress::new(output.is_json());

    // Ctrl-C stops polling; the remote job keeps running and can be
    // picked up later with `splatgen status --watch`.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let image_id = session.upload(&filename, image_bytes).await?.image_id.clone();
    progress.finish_upload(&image_id);

    let first = session.generate().await?.clone();
    let job_id = first.job_id.clone();
    progress.update_job(&first);

    if !session.phase().is_terminal() {
        let polled = session
            .poll_until_terminal(&cancel, |snapshot| progress.update_job(snapshot))
            .await;
        if let Err(err) = polled {
            progress.fail_job(&err.to_string());
            output.info(format!("Job {} may still be running on the service.", job_id));
            return Err(err.into());
        }
    }

    if session.phase() == SessionPhase::Error {
        let reason = session
            .last_error()
            .unwrap_or("generation failed")
            .to_string();
        progress.fail_job(&reason);
        bail!("job {} failed: {}", job_id, reason);
    }

    progress.finish_job(session.job().and_then(|j| j.processing_time_ms));

    progress.start_download();
    let artifact = session.fetch_artifact().await?;
    progress.finish_download(artifact.len());

    if args.keep_raw {
        let raw_path = out_path.with_extension("splat.ply");
        tokio::fs::write(&raw_path, &artifact)
            .await
            .with_context(|| format!("failed to write {}", raw_path.display()))?;
        output.info(format!("Raw artifact saved to {}", raw_path.display()));
    }

    let geometry = Geometry::build(decode(&artifact)?);
    export_to_file(format, &geometry, &out_path)?;

    if output.is_json() {
        output.result(serde_json::json!({
            "jobId": job_id,
            "points": geometry.len(),
            "format": format.to_string(),
            "output": out_path.display().to_string(),
        }))?;
    } else {
        output.success(format!(
            "Exported {} points to {}",
            geometry.len(),
            out_path.display()
        ));
    }

    Ok(())
}
