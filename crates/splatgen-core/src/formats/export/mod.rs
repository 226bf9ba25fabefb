//! Point-cloud exporters
//!
//! Serialize a decoded [`Geometry`] into one of three interchange
//! formats. All writers target a caller-supplied sink; no network
//! round-trip is involved.

mod glb;
mod obj;
mod ply;

use std::io::Write;
use std::path::Path;

use crate::error::{Result, SplatError};
use crate::geometry::Geometry;

pub use glb::write_glb;
pub use obj::write_obj;
pub use ply::write_ply;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Ply,
    Obj,
    Glb,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ply" => Ok(ExportFormat::Ply),
            "obj" => Ok(ExportFormat::Obj),
            "glb" => Ok(ExportFormat::Glb),
            _ => Err(SplatError::UnsupportedExportFormat { name: name.to_string() }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Ply => "ply",
            ExportFormat::Obj => "obj",
            ExportFormat::Glb => "glb",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialize `geometry` in the given format.
///
/// Fails with [`SplatError::NoGeometryLoaded`] when the geometry holds
/// no points; an export with nothing behind it is a caller bug, not an
/// empty file.
pub fn write_geometry<W: Write>(format: ExportFormat, geometry: &Geometry, writer: &mut W) -> Result<()> {
    if geometry.is_empty() {
        return Err(SplatError::NoGeometryLoaded);
    }
    match format {
        ExportFormat::Ply => write_ply(geometry, writer),
        ExportFormat::Obj => write_obj(geometry, writer),
        ExportFormat::Glb => write_glb(geometry, writer),
    }
}

/// Export `geometry` to a file on disk.
pub fn export_to_file(format: ExportFormat, geometry: &Geometry, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_geometry(format, geometry, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ParsedGeometry;

    #[test]
    fn test_format_from_name() {
        assert_eq!(ExportFormat::from_name("PLY").unwrap(), ExportFormat::Ply);
        assert_eq!(ExportFormat::from_name("obj").unwrap(), ExportFormat::Obj);
        assert_eq!(ExportFormat::from_name("glb").unwrap(), ExportFormat::Glb);
        assert!(ExportFormat::from_name("stl").is_err());
    }

    #[test]
    fn test_empty_geometry_rejected() {
        let geometry = Geometry::build(ParsedGeometry { positions: vec![], colors: vec![] });
        let mut out = Vec::new();
        let err = write_geometry(ExportFormat::Obj, &geometry, &mut out).unwrap_err();
        assert!(matches!(err, SplatError::NoGeometryLoaded));
        assert!(out.is_empty());
    }
}
