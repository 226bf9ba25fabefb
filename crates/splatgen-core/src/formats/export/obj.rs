//! Wavefront OBJ writer

use std::io::Write;

use crate::error::Result;
use crate::geometry::Geometry;

/// Write `geometry` as a Wavefront OBJ file.
///
/// Vertex color is emitted as trailing fields on each `v` line, a
/// widely tolerated but non-standard extension. Point clouds carry no
/// index buffer, so no `f` lines are ever produced.
pub fn write_obj<W: Write>(geometry: &Geometry, writer: &mut W) -> Result<()> {
    let positions = geometry.positions();
    let colors = geometry.colors();
    let has_colors = geometry.has_colors();

    for i in 0..geometry.len() {
        let (x, y, z) = (positions[3 * i], positions[3 * i + 1], positions[3 * i + 2]);
        if has_colors {
            writeln!(
                writer,
                "v {} {} {} {} {} {}",
                x, y, z, colors[3 * i], colors[3 * i + 1], colors[3 * i + 2]
            )?;
        } else {
            writeln!(writer, "v {} {} {}", x, y, z)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ParsedGeometry;

    #[test]
    fn test_one_v_line_per_point_and_no_faces() {
        let n = 17;
        let geometry = Geometry::build(ParsedGeometry {
            positions: (0..n * 3).map(|i| i as f32).collect(),
            colors: vec![0.5; n * 3],
        });
        let mut out = Vec::new();
        write_obj(&geometry, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), n);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 0);
    }

    #[test]
    fn test_color_fields_trail_position() {
        let geometry = Geometry::build(ParsedGeometry {
            positions: vec![0.0, 0.0, 0.0],
            colors: vec![1.0, 0.0, 0.25],
        });
        let mut out = Vec::new();
        write_obj(&geometry, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "v 0 0 0 1 0 0.25");
    }

    #[test]
    fn test_colorless_v_lines_have_three_fields() {
        let geometry = Geometry::build(ParsedGeometry {
            positions: vec![1.0, 2.0, 3.0],
            colors: vec![],
        });
        let mut out = Vec::new();
        write_obj(&geometry, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim().split_whitespace().count(), 4);
    }
}
