//! Binary glTF (GLB) writer
//!
//! Builds a minimal glTF 2.0 scene containing one point-primitive mesh
//! (mode 0) with POSITION and COLOR_0 attributes, then packs it into
//! the GLB container: a 12-byte header followed by a 4-byte-aligned
//! JSON chunk and a 4-byte-aligned BIN chunk.

use std::io::Write;

use serde_json::json;

use crate::error::Result;
use crate::geometry::Geometry;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const COMPONENT_FLOAT: u32 = 5126;
const MODE_POINTS: u32 = 0;

/// Write `geometry` as a self-contained GLB file.
pub fn write_glb<W: Write>(geometry: &Geometry, writer: &mut W) -> Result<()> {
    let glb = build_glb(geometry);
    writer.write_all(&glb)?;
    Ok(())
}

/// Assemble the full GLB byte stream in memory.
pub fn build_glb(geometry: &Geometry) -> Vec<u8> {
    let has_colors = geometry.has_colors();

    // BIN chunk: positions then colors, both tightly packed f32 LE.
    let mut bin = Vec::with_capacity((geometry.positions().len() + geometry.colors().len()) * 4);
    for value in geometry.positions() {
        bin.extend_from_slice(&value.to_le_bytes());
    }
    let position_bytes = bin.len();
    for value in geometry.colors() {
        bin.extend_from_slice(&value.to_le_bytes());
    }
    pad_to_alignment(&mut bin, 0);

    let bounds = geometry.bounds();
    let mut buffer_views = vec![json!({
        "buffer": 0,
        "byteOffset": 0,
        "byteLength": position_bytes,
    })];
    let mut accessors = vec![json!({
        "bufferView": 0,
        "componentType": COMPONENT_FLOAT,
        "count": geometry.len(),
        "type": "VEC3",
        "min": bounds.min,
        "max": bounds.max,
    })];
    let mut attributes = json!({ "POSITION": 0 });

    if has_colors {
        buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": position_bytes,
            "byteLength": geometry.colors().len() * 4,
        }));
        accessors.push(json!({
            "bufferView": 1,
            "componentType": COMPONENT_FLOAT,
            "count": geometry.len(),
            "type": "VEC3",
        }));
        attributes["COLOR_0"] = json!(1);
    }

    let document = json!({
        "asset": { "version": "2.0", "generator": "splatgen" },
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": buffer_views,
        "accessors": accessors,
        "meshes": [{
            "primitives": [{
                "attributes": attributes,
                "mode": MODE_POINTS,
            }],
        }],
        "nodes": [{ "mesh": 0 }],
        "scenes": [{ "nodes": [0] }],
        "scene": 0,
    });

    let mut json_chunk = document.to_string().into_bytes();
    pad_to_alignment(&mut json_chunk, b' ');

    let total_len = 12 + 8 + json_chunk.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total_len as u32).to_le_bytes());

    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_chunk);

    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin);

    out
}

fn pad_to_alignment(buffer: &mut Vec<u8>, fill: u8) {
    while buffer.len() % 4 != 0 {
        buffer.push(fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ParsedGeometry;

    fn sample_geometry() -> Geometry {
        Geometry::build(ParsedGeometry {
            positions: vec![0.0, 0.0, 0.0, 2.0, 4.0, 6.0],
            colors: vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        })
    }

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&bytes[offset..offset + 4]);
        u32::from_le_bytes(buf)
    }

    #[test]
    fn test_container_header() {
        let glb = build_glb(&sample_geometry());
        assert_eq!(read_u32(&glb, 0), GLB_MAGIC);
        assert_eq!(read_u32(&glb, 4), GLB_VERSION);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
    }

    #[test]
    fn test_chunks_are_aligned() {
        let glb = build_glb(&sample_geometry());
        let json_len = read_u32(&glb, 12) as usize;
        assert_eq!(read_u32(&glb, 16), CHUNK_JSON);
        assert_eq!(json_len % 4, 0);

        let bin_header = 20 + json_len;
        let bin_len = read_u32(&glb, bin_header) as usize;
        assert_eq!(read_u32(&glb, bin_header + 4), CHUNK_BIN);
        assert_eq!(bin_len % 4, 0);
        assert_eq!(bin_header + 8 + bin_len, glb.len());
    }

    #[test]
    fn test_json_declares_point_primitive() {
        let glb = build_glb(&sample_geometry());
        let json_len = read_u32(&glb, 12) as usize;
        let document: serde_json::Value =
            serde_json::from_slice(&glb[20..20 + json_len]).unwrap();

        let primitive = &document["meshes"][0]["primitives"][0];
        assert_eq!(primitive["mode"], 0);
        assert_eq!(primitive["attributes"]["POSITION"], 0);
        assert_eq!(primitive["attributes"]["COLOR_0"], 1);
        assert_eq!(document["accessors"][0]["count"], 2);
        assert_eq!(document["asset"]["version"], "2.0");
    }

    #[test]
    fn test_position_accessor_bounds() {
        let geometry = sample_geometry();
        let glb = build_glb(&geometry);
        let json_len = read_u32(&glb, 12) as usize;
        let document: serde_json::Value =
            serde_json::from_slice(&glb[20..20 + json_len]).unwrap();

        let min = document["accessors"][0]["min"].as_array().unwrap();
        let max = document["accessors"][0]["max"].as_array().unwrap();
        assert_eq!(min[0].as_f64().unwrap() as f32, geometry.bounds().min[0]);
        assert_eq!(max[2].as_f64().unwrap() as f32, geometry.bounds().max[2]);
    }

    #[test]
    fn test_colorless_geometry_has_single_accessor() {
        let geometry = Geometry::build(ParsedGeometry {
            positions: vec![1.0, 2.0, 3.0],
            colors: vec![],
        });
        let glb = build_glb(&geometry);
        let json_len = read_u32(&glb, 12) as usize;
        let document: serde_json::Value =
            serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
        assert_eq!(document["accessors"].as_array().unwrap().len(), 1);
        assert!(document["meshes"][0]["primitives"][0]["attributes"]["COLOR_0"].is_null());
    }
}
