use anyhow::{Context, Result};
use std::path::PathBuf;

use splatgen_core::config::ClientConfig;
use splatgen_core::formats::export::{export_to_file, ExportFormat};
use splatgen_core::formats::ply::decode;
use splatgen_core::geometry::Geometry;

use crate::cli::ConvertArgs;
use crate::output::OutputWriter;

/// Offline conversion: decode a local splat PLY and re-export it.
pub fn execute(args: ConvertArgs, config: &ClientConfig, output: &OutputWriter) -> Result<()> {
    let data = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let format_name = args.format.as_deref().unwrap_or(&config.export_format.value);
    let format = ExportFormat::from_name(format_name)?;
    let out_path: PathBuf = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension(format.extension()));

    let geometry = Geometry::build(decode(&data)?);
    export_to_file(format, &geometry, &out_path)?;

    if output.is_json() {
        output.result(serde_json::json!({
            "points": geometry.len(),
            "hasColors": geometry.has_colors(),
            "format": format.to_string(),
            "output": out_path.display().to_string(),
        }))?;
    } else {
        output.success(format!(
            "Converted {} points to {}",
            geometry.len(),
            out_path.display()
        ));
    }

    Ok(())
}
