//! Simple decoder to inspect shape files.
//!
//! Usage: `decode_file <path> [--srid]`. With `--srid` the payload is read
//! as a 4-byte little-endian SRID followed by the shape. Files ending in
//! `.wkt` are read as one WKT geometry per line and encoded instead.

use std::fs;

use geoshape::codec::Reader;
use geoshape::{
    ShapeModel, WktReadOptions, WktWriteOptions, decode_shape, decode_shape_from, encode_shape,
    parse_wkt, write_wkt,
};

fn describe(model: &ShapeModel, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{}{:?}: {} points, {} figures, {} shapes",
        indent,
        model.geometry_type(),
        model.num_points(),
        model.num_rings(),
        model.shapes().len()
    );
    if model.shapes().len() == 1 {
        return;
    }
    for n in 1..=model.num_geometries() {
        if let Some(member) = model.get_geometry_n(n) {
            describe(&member, depth + 1);
        }
    }
}

fn inspect_wkt_lines(text: &str) {
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_wkt(line, WktReadOptions::new()) {
            Ok(model) => {
                let bytes = encode_shape(&model).expect("Failed to encode");
                println!("[{}] {} bytes", line_no + 1, bytes.len());
                describe(&model, 1);
            }
            Err(e) => println!("[{}] {} ({})", line_no + 1, e, e.code().code()),
        }
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "shape.bin".to_string());
    let framed = args.any(|a| a == "--srid");

    println!("Reading: {}", path);

    if path.ends_with(".wkt") {
        let text = fs::read_to_string(&path).expect("Failed to read file");
        inspect_wkt_lines(&text);
        return;
    }

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let model = if framed {
        let mut reader = Reader::new(&data);
        let srid = reader.read_i32("srid").expect("Failed to read SRID");
        println!("SRID: {}", srid);
        decode_shape_from(&mut reader).expect("Failed to decode")
    } else {
        decode_shape(&data).expect("Failed to decode")
    };

    println!("\n=== Shape Info ===");
    println!("Type: {:?}", model.geometry_type());
    println!("Empty: {}", model.is_empty());
    println!("Has Z: {}", model.has_z());
    println!("Has M: {}", model.has_m());
    println!("Valid: {}", model.is_valid());
    println!("Geometries: {}", model.num_geometries());

    println!("\n=== Structure ===");
    describe(&model, 0);

    println!("\n=== WKT ===");
    let text = write_wkt(&model, WktWriteOptions::new().with_z().with_m());
    let preview: String = text.chars().take(400).collect();
    if text.len() > 400 {
        println!("{}...", preview);
    } else {
        println!("{}", preview);
    }
}
