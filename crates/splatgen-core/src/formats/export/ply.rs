//! ASCII PLY writer

use std::io::Write;

use crate::error::Result;
use crate::geometry::Geometry;

/// Write `geometry` as an ASCII PLY file.
///
/// Positions are written back in the source file convention (y-down,
/// z-forward), undoing the decoder's flip, so an exported file decodes
/// to the same viewer-space geometry. Colors, when present, become
/// packed uchar channels via `round(c * 255)`.
pub fn write_ply<W: Write>(geometry: &Geometry, writer: &mut W) -> Result<()> {
    let has_colors = geometry.has_colors();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", geometry.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    if has_colors {
        writeln!(writer, "property uchar red")?;
        writeln!(writer, "property uchar green")?;
        writeln!(writer, "property uchar blue")?;
    }
    writeln!(writer, "end_header")?;

    let positions = geometry.positions();
    let colors = geometry.colors();
    for i in 0..geometry.len() {
        let (x, y, z) = (positions[3 * i], flip(positions[3 * i + 1]), flip(positions[3 * i + 2]));
        if has_colors {
            let r = (colors[3 * i] * 255.0).round() as u8;
            let g = (colors[3 * i + 1] * 255.0).round() as u8;
            let b = (colors[3 * i + 2] * 255.0).round() as u8;
            writeln!(writer, "{} {} {} {} {} {}", x, y, z, r, g, b)?;
        } else {
            writeln!(writer, "{} {} {}", x, y, z)?;
        }
    }

    Ok(())
}

/// Negate without producing `-0`, which would leak into the text output.
fn flip(value: f32) -> f32 {
    if value == 0.0 {
        0.0
    } else {
        -value
    }
}
