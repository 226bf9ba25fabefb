use anyhow::{bail, Context, Result};

use splatgen_client::SplatApiClient;
use splatgen_core::config::ClientConfig;
use splatgen_core::models::MeshConvertRequest;

use crate::cli::MeshArgs;
use crate::output::OutputWriter;
use crate::progress::{create_spinner, finish_error, finish_success};

pub async fn execute(args: MeshArgs, config: &ClientConfig, output: &OutputWriter) -> Result<()> {
    let mut request =
        MeshConvertRequest::new(args.splat_path.as_str(), args.method.into(), args.format.as_str());
    if let Some(depth) = args.depth {
        request.depth = depth;
    }
    if let Some(alpha) = args.alpha {
        request.alpha = alpha;
    }

    let client = SplatApiClient::new(config)?;

    let spinner = if output.is_json() {
        None
    } else {
        Some(create_spinner("Reconstructing mesh on the service..."))
    };

    let response = match client.convert_mesh(&request).await {
        Ok(response) => response,
        Err(err) => {
            if let Some(pb) = &spinner {
                finish_error(pb, &err.to_string());
            }
            return Err(err.into());
        }
    };

    if let Some(pb) = &spinner {
        finish_success(
            pb,
            &format!(
                "Reconstructed {} vertices / {} faces",
                response.vertex_count, response.face_count
            ),
        );
    }

    if !response.success {
        bail!("mesh conversion reported failure for {}", args.splat_path);
    }

    if let Some(out_path) = &args.output {
        let data = client.download_mesh(&response.download_url).await?;
        tokio::fs::write(out_path, &data)
            .await
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        output.success(format!("Mesh saved to {}", out_path.display()));
    }

    if output.is_json() {
        output.result(&response)?;
    } else {
        output.kv("method", &response.method);
        output.kv("format", &response.format);
        output.kv("vertices", response.vertex_count);
        output.kv("faces", response.face_count);
        output.kv("download", &response.download_url);
    }

    Ok(())
}
