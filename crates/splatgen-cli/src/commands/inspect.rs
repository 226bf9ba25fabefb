use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;

use splatgen_core::formats::ply::decode;
use splatgen_core::formats::{PlyEncoding, PlyHeader, ScalarType};
use splatgen_core::geometry::Geometry;

use crate::cli::InspectArgs;
use crate::output::OutputWriter;

#[derive(Tabled, Serialize)]
struct PropertyRow {
    #[tabled(rename = "Property")]
    name: String,
    #[tabled(rename = "Type")]
    scalar: &'static str,
    #[tabled(rename = "Offset")]
    offset: usize,
    #[tabled(rename = "Size")]
    size: usize,
}

fn scalar_name(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Char => "char",
        ScalarType::UChar => "uchar",
        ScalarType::Short => "short",
        ScalarType::UShort => "ushort",
        ScalarType::Int => "int",
        ScalarType::UInt => "uint",
        ScalarType::Float => "float",
        ScalarType::Double => "double",
    }
}

pub fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    let data = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let header = PlyHeader::parse(&data)?;

    output.section("Header");
    output.kv(
        "encoding",
        match header.encoding {
            PlyEncoding::Ascii => "ascii",
            PlyEncoding::BinaryLittleEndian => "binary_little_endian",
        },
    );
    output.kv("vertices", header.vertex_count);
    output.kv("stride", format!("{} bytes", header.stride));
    output.kv("header length", format!("{} bytes", header.header_len));

    let rows: Vec<PropertyRow> = header
        .properties
        .iter()
        .map(|p| PropertyRow {
            name: p.name.clone(),
            scalar: scalar_name(p.scalar),
            offset: p.byte_offset,
            size: p.byte_size(),
        })
        .collect();
    output.table(rows)?;

    if args.header_only {
        return Ok(());
    }

    let geometry = Geometry::build(decode(&data)?);
    let bounds = geometry.bounds();

    output.section("Geometry");
    output.kv("points", geometry.len());
    output.kv("colors", if geometry.has_colors() { "yes" } else { "fallback grey" });
    output.kv(
        "bounds min",
        format!("[{:.3}, {:.3}, {:.3}]", bounds.min[0], bounds.min[1], bounds.min[2]),
    );
    output.kv(
        "bounds max",
        format!("[{:.3}, {:.3}, {:.3}]", bounds.max[0], bounds.max[1], bounds.max[2]),
    );

    Ok(())
}
