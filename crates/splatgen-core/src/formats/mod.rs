//! Point-cloud format support
//!
//! One format comes in (the PLY artifacts produced by the generation
//! service) and three go out (PLY, OBJ, GLB). The PLY layout is
//! self-describing: the header declares an arbitrary property list per
//! vertex record, so the parser builds a property table with exact byte
//! offsets instead of assuming a fixed schema.

pub mod export;
pub mod ply;

use crate::error::{Result, SplatError};

/// Literal marker terminating a PLY header. The binary record stream
/// begins at the byte immediately after it.
const END_HEADER: &[u8] = b"end_header\n";

/// Scalar types a PLY property may declare, with their binary widths.
///
/// Unrecognized tokens are a hard parse error rather than a silent
/// default; the format is schema-less, so the type table is the only
/// thing standing between the reader and misaligned records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ScalarType {
    /// Map a header type token to its scalar type. Both the classic
    /// names and the sized aliases appear in the wild.
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "char" | "int8" => Ok(ScalarType::Char),
            "uchar" | "uint8" => Ok(ScalarType::UChar),
            "short" | "int16" => Ok(ScalarType::Short),
            "ushort" | "uint16" => Ok(ScalarType::UShort),
            "int" | "int32" => Ok(ScalarType::Int),
            "uint" | "uint32" => Ok(ScalarType::UInt),
            "float" | "float32" => Ok(ScalarType::Float),
            "double" | "float64" => Ok(ScalarType::Double),
            _ => Err(SplatError::UnknownPropertyType { token: token.to_string() }),
        }
    }

    pub fn byte_size(&self) -> usize {
        match self {
            ScalarType::Char | ScalarType::UChar => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }
}

/// One declared vertex property: its name, scalar type, and cumulative
/// byte offset within a record. Computed once per file, read-only after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub scalar: ScalarType,
    pub byte_offset: usize,
}

impl PropertyInfo {
    pub fn byte_size(&self) -> usize {
        self.scalar.byte_size()
    }
}

/// Body encodings the decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyEncoding {
    Ascii,
    BinaryLittleEndian,
}

/// Parsed PLY header: encoding, vertex layout, and the exact byte
/// length of the header text itself.
#[derive(Debug, Clone)]
pub struct PlyHeader {
    pub encoding: PlyEncoding,
    pub vertex_count: usize,
    pub properties: Vec<PropertyInfo>,
    /// Bytes per vertex record (binary encoding only).
    pub stride: usize,
    /// Byte length of the header including the end marker; the first
    /// record starts exactly here.
    pub header_len: usize,
}

impl PlyHeader {
    /// Parse the self-describing header at the front of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let marker_pos = find_subslice(data, END_HEADER).ok_or_else(|| SplatError::InvalidFormat {
            reason: "end_header marker not found".to_string(),
        })?;
        let header_len = marker_pos + END_HEADER.len();

        let text = std::str::from_utf8(&data[..header_len]).map_err(|_| SplatError::InvalidFormat {
            reason: "header is not valid UTF-8".to_string(),
        })?;

        let mut lines = text.lines();
        match lines.next().map(str::trim) {
            Some("ply") => {}
            _ => {
                return Err(SplatError::InvalidFormat {
                    reason: "missing ply magic line".to_string(),
                })
            }
        }

        let mut encoding = None;
        let mut vertex_count = None;
        let mut properties = Vec::new();
        let mut stride = 0usize;
        // Property declarations only count while the current element
        // block is the vertex element.
        let mut in_vertex_element = false;

        for line in lines {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("format") => {
                    encoding = Some(match tokens.next() {
                        Some("binary_little_endian") => PlyEncoding::BinaryLittleEndian,
                        Some("ascii") => PlyEncoding::Ascii,
                        other => {
                            return Err(SplatError::InvalidFormat {
                                reason: format!("unsupported format: {}", other.unwrap_or("(none)")),
                            })
                        }
                    });
                }
                Some("element") => {
                    let name = tokens.next().unwrap_or("");
                    if name == "vertex" {
                        let count = tokens
                            .next()
                            .and_then(|t| t.parse::<usize>().ok())
                            .ok_or_else(|| SplatError::InvalidFormat {
                                reason: "element vertex missing count".to_string(),
                            })?;
                        vertex_count = Some(count);
                        in_vertex_element = true;
                    } else {
                        in_vertex_element = false;
                    }
                }
                Some("property") if in_vertex_element => {
                    let type_token = tokens.next().ok_or_else(|| SplatError::InvalidFormat {
                        reason: "property missing type".to_string(),
                    })?;
                    if type_token == "list" {
                        return Err(SplatError::InvalidFormat {
                            reason: "list property in vertex element".to_string(),
                        });
                    }
                    let scalar = ScalarType::from_token(type_token)?;
                    let name = tokens.next().ok_or_else(|| SplatError::InvalidFormat {
                        reason: "property missing name".to_string(),
                    })?;
                    properties.push(PropertyInfo {
                        name: name.to_string(),
                        scalar,
                        byte_offset: stride,
                    });
                    stride += scalar.byte_size();
                }
                _ => {}
            }
        }

        let encoding = encoding.ok_or_else(|| SplatError::InvalidFormat {
            reason: "missing format declaration".to_string(),
        })?;
        let vertex_count = vertex_count.ok_or_else(|| SplatError::InvalidFormat {
            reason: "missing vertex element".to_string(),
        })?;

        Ok(PlyHeader {
            encoding,
            vertex_count,
            properties,
            stride,
            header_len,
        })
    }

    /// Look up a declared vertex property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Index of a property in declaration order (ASCII field position).
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
