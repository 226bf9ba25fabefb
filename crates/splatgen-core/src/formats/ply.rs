//! PLY point-cloud decoder
//!
//! The generation service emits Gaussian-splat PLY files: binary
//! little-endian records whose color lives in the zeroth-order
//! spherical-harmonic coefficients (`f_dc_0..2`). Some tool-compatible
//! exports carry packed `red/green/blue` uchar channels instead, and
//! our own ASCII exports decode through the same path. Decode is
//! all-or-nothing; no partial geometry is ever returned.

use crate::error::{Result, SplatError};
use crate::formats::{PlyEncoding, PlyHeader, ScalarType};
use crate::geometry::ParsedGeometry;

/// Normalization constant for the zeroth real spherical harmonic.
pub const SH_C0: f32 = 0.282_094_791_773_878_14;

/// Color used when the file declares no color properties at all.
/// Matches what a zero SH DC coefficient decodes to, so colorless and
/// zero-colored inputs render identically.
pub const FALLBACK_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

/// Where per-point color comes from for a given file. Indices are
/// positions in the header's property declaration order.
enum ColorSource {
    /// Spherical-harmonic DC coefficients, float.
    ShCoefficients([usize; 3]),
    /// Packed 8-bit (or pre-normalized float) channels.
    PackedRgb([usize; 3]),
    /// No color declared; every point gets [`FALLBACK_COLOR`].
    None,
}

/// Resolved vertex layout: property indices the decoder actually reads.
struct VertexLayout {
    x: usize,
    y: usize,
    z: usize,
    color: ColorSource,
}

impl VertexLayout {
    fn resolve(header: &PlyHeader) -> Result<Self> {
        let mut position = [0usize; 3];
        for (slot, name) in ["x", "y", "z"].iter().enumerate() {
            let index = header.property_index(name).ok_or_else(|| {
                SplatError::MissingPositionProperty { name: name.to_string() }
            })?;
            if header.properties[index].scalar != ScalarType::Float {
                return Err(SplatError::InvalidFormat {
                    reason: format!(
                        "position property {} must be float, found {:?}",
                        name, header.properties[index].scalar
                    ),
                });
            }
            position[slot] = index;
        }

        Ok(VertexLayout {
            x: position[0],
            y: position[1],
            z: position[2],
            color: Self::resolve_color(header)?,
        })
    }

    fn resolve_color(header: &PlyHeader) -> Result<ColorSource> {
        if let Some(idx) = lookup_triplet(header, ["f_dc_0", "f_dc_1", "f_dc_2"]) {
            for &i in &idx {
                if header.properties[i].scalar != ScalarType::Float {
                    return Err(SplatError::InvalidFormat {
                        reason: format!("color property {} must be float", header.properties[i].name),
                    });
                }
            }
            return Ok(ColorSource::ShCoefficients(idx));
        }
        if let Some(idx) = lookup_triplet(header, ["red", "green", "blue"]) {
            for &i in &idx {
                let scalar = header.properties[i].scalar;
                if scalar != ScalarType::UChar && scalar != ScalarType::Float {
                    return Err(SplatError::InvalidFormat {
                        reason: format!("unsupported color type {:?} for {}", scalar, header.properties[i].name),
                    });
                }
            }
            return Ok(ColorSource::PackedRgb(idx));
        }
        Ok(ColorSource::None)
    }
}

fn lookup_triplet(header: &PlyHeader, names: [&str; 3]) -> Option<[usize; 3]> {
    let a = header.property_index(names[0])?;
    let b = header.property_index(names[1])?;
    let c = header.property_index(names[2])?;
    Some([a, b, c])
}

/// Decode a PLY point cloud from an in-memory buffer.
///
/// Positions are converted from the source camera frame (y-down,
/// z-forward) to the viewer frame (y-up, z-back): `(x, -y, -z)`.
/// Colors are clamped to [0, 1].
pub fn decode(data: &[u8]) -> Result<ParsedGeometry> {
    let header = PlyHeader::parse(data)?;
    let layout = VertexLayout::resolve(&header)?;

    match header.encoding {
        PlyEncoding::BinaryLittleEndian => decode_binary(data, &header, &layout),
        PlyEncoding::Ascii => decode_ascii(data, &header, &layout),
    }
}

fn decode_binary(data: &[u8], header: &PlyHeader, layout: &VertexLayout) -> Result<ParsedGeometry> {
    let body_len = header
        .vertex_count
        .checked_mul(header.stride)
        .ok_or_else(|| SplatError::InvalidFormat { reason: "vertex count overflow".to_string() })?;
    if data.len() < header.header_len + body_len {
        return Err(SplatError::InvalidFormat {
            reason: format!(
                "truncated body: need {} bytes after header, found {}",
                body_len,
                data.len() - header.header_len
            ),
        });
    }

    let read_f32 = |base: usize, index: usize| -> f32 {
        let start = base + header.properties[index].byte_offset;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&data[start..start + 4]);
        f32::from_le_bytes(bytes)
    };

    let mut positions = Vec::with_capacity(header.vertex_count * 3);
    let mut colors = Vec::with_capacity(header.vertex_count * 3);

    for record in 0..header.vertex_count {
        let base = header.header_len + record * header.stride;
        positions.push(read_f32(base, layout.x));
        positions.push(-read_f32(base, layout.y));
        positions.push(-read_f32(base, layout.z));

        match &layout.color {
            ColorSource::ShCoefficients(idx) => {
                for &i in idx {
                    colors.push(sh_to_channel(read_f32(base, i)));
                }
            }
            ColorSource::PackedRgb(idx) => {
                for &i in idx {
                    let prop = &header.properties[i];
                    let value = match prop.scalar {
                        ScalarType::UChar => data[base + prop.byte_offset] as f32 / 255.0,
                        _ => read_f32(base, i),
                    };
                    colors.push(value.clamp(0.0, 1.0));
                }
            }
            ColorSource::None => colors.extend_from_slice(&FALLBACK_COLOR),
        }
    }

    Ok(ParsedGeometry { positions, colors })
}

fn decode_ascii(data: &[u8], header: &PlyHeader, layout: &VertexLayout) -> Result<ParsedGeometry> {
    let body = std::str::from_utf8(&data[header.header_len..]).map_err(|_| SplatError::InvalidFormat {
        reason: "ascii body is not valid UTF-8".to_string(),
    })?;

    let mut values = body.split_ascii_whitespace();
    let mut positions = Vec::with_capacity(header.vertex_count * 3);
    let mut colors = Vec::with_capacity(header.vertex_count * 3);
    let mut record = vec![0.0f32; header.properties.len()];

    for index in 0..header.vertex_count {
        for field in record.iter_mut() {
            let token = values.next().ok_or_else(|| SplatError::InvalidFormat {
                reason: format!("truncated ascii body at record {}", index),
            })?;
            *field = token.parse::<f32>().map_err(|_| SplatError::InvalidFormat {
                reason: format!("invalid numeric field: {}", token),
            })?;
        }

        positions.push(record[layout.x]);
        positions.push(-record[layout.y]);
        positions.push(-record[layout.z]);

        match &layout.color {
            ColorSource::ShCoefficients(idx) => {
                for &i in idx {
                    colors.push(sh_to_channel(record[i]));
                }
            }
            ColorSource::PackedRgb(idx) => {
                for &i in idx {
                    let raw = record[i];
                    let value = if header.properties[i].scalar == ScalarType::UChar {
                        raw / 255.0
                    } else {
                        raw
                    };
                    colors.push(value.clamp(0.0, 1.0));
                }
            }
            ColorSource::None => colors.extend_from_slice(&FALLBACK_COLOR),
        }
    }

    Ok(ParsedGeometry { positions, colors })
}

/// Convert a zeroth-order SH coefficient to a display channel.
fn sh_to_channel(coefficient: f32) -> f32 {
    (coefficient * SH_C0 + 0.5).clamp(0.0, 1.0)
}
