//! Benchmark for shape parsing and serialization.
//!
//! Reads a JSON array of `{ "name", "wkt", "geodetic" }` features, or builds a
//! synthetic dataset when no file is given, then times the WKT and binary
//! codecs over the whole set.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use geoshape::limits::{PROP_IS_SINGLE_LINE_SEGMENT, PROP_IS_SINGLE_POINT};
use geoshape::{
    CoordinateOrder, ShapeModel, WktReadOptions, WktWriteOptions, decode_shape, encode_shape,
    parse_wkt, write_wkt,
};
use serde::Deserialize;

// =============================================================================
// JSON DATA STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct Feature {
    name: String,
    wkt: String,
    /// Text is "long lat".
    #[serde(default)]
    geodetic: bool,
}

impl Feature {
    fn order(&self) -> CoordinateOrder {
        if self.geodetic {
            CoordinateOrder::LatLong
        } else {
            CoordinateOrder::XY
        }
    }
}

// =============================================================================
// SYNTHETIC DATA
// =============================================================================

/// Deterministic pseudo-random coordinates (xorshift).
struct Coords(u64);

impl Coords {
    fn next(&mut self, scale: f64) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        let unit = (self.0 >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) * scale
    }

    fn pair(&mut self) -> String {
        format!("{} {}", self.next(180.0), self.next(90.0))
    }
}

/// Points and segments dominate, matching typical stored data.
fn synthesize(count: usize) -> Vec<Feature> {
    let mut coords = Coords(0x9E37_79B9_7F4A_7C15);
    (0..count)
        .map(|i| {
            let wkt = match i % 10 {
                0..=4 => format!("POINT ({})", coords.pair()),
                5 | 6 => format!("LINESTRING ({}, {})", coords.pair(), coords.pair()),
                7 => {
                    let points: Vec<String> = (0..16).map(|_| coords.pair()).collect();
                    format!("LINESTRING ({})", points.join(", "))
                }
                8 => {
                    let mut ring: Vec<String> = (0..7).map(|_| coords.pair()).collect();
                    ring.push(ring[0].clone());
                    format!("POLYGON (({}))", ring.join(", "))
                }
                _ => format!(
                    "GEOMETRYCOLLECTION (POINT ({} {}), MULTIPOINT (({}), EMPTY), \
                     LINESTRING ({}, {}))",
                    coords.pair(),
                    coords.next(100.0),
                    coords.pair(),
                    coords.pair(),
                    coords.pair()
                ),
            };
            Feature {
                name: format!("feature-{}", i),
                wkt,
                geodetic: i % 2 == 0,
            }
        })
        .collect()
}

fn throughput(bytes: usize, time: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / time.as_secs_f64()
}

fn main() {
    env_logger::init();

    let features = match std::env::args().nth(1) {
        Some(path) if Path::new(&path).exists() => {
            println!("Loading features from: {}", path);
            let json_data = fs::read_to_string(&path).expect("Failed to read features file");
            let parse_start = Instant::now();
            let features: Vec<Feature> =
                serde_json::from_str(&json_data).expect("Failed to parse JSON");
            println!("Loaded {} features in {:?}", features.len(), parse_start.elapsed());
            features
        }
        Some(path) => {
            log::warn!("{} not found, using synthetic data", path);
            synthesize(100_000)
        }
        None => synthesize(100_000),
    };
    let text_bytes: usize = features.iter().map(|f| f.wkt.len()).sum();
    println!("{} features, {} bytes of WKT", features.len(), text_bytes);

    // Benchmark WKT parsing
    let parse_start = Instant::now();
    let models: Vec<ShapeModel> = features
        .iter()
        .map(|f| {
            let options = WktReadOptions {
                order: f.order(),
                ..WktReadOptions::new()
            };
            parse_wkt(&f.wkt, options)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", f.name, e))
        })
        .collect();
    let parse_time = parse_start.elapsed();

    let vertex_count: usize = models.iter().map(|m| m.num_points()).sum();
    println!("\nWKT parse: {} vertices in {:?}", vertex_count, parse_time);
    println!("  Throughput: {:.2} MB/s", throughput(text_bytes, parse_time));

    // Benchmark binary encoding
    let encode_start = Instant::now();
    let encoded: Vec<Vec<u8>> = models
        .iter()
        .map(|m| encode_shape(m).expect("Failed to encode"))
        .collect();
    let encode_time = encode_start.elapsed();

    let binary_bytes: usize = encoded.iter().map(|b| b.len()).sum();
    let compact = encoded
        .iter()
        .filter(|b| b[1] & (PROP_IS_SINGLE_POINT | PROP_IS_SINGLE_LINE_SEGMENT) != 0)
        .count();
    println!("\nBinary encode: {} bytes in {:?}", binary_bytes, encode_time);
    println!("  Throughput: {:.2} MB/s", throughput(binary_bytes, encode_time));
    println!(
        "  Compact payloads: {} of {} ({:.1}%)",
        compact,
        encoded.len(),
        100.0 * compact as f64 / encoded.len().max(1) as f64
    );
    println!(
        "  Size vs WKT: {:.2}x",
        binary_bytes as f64 / text_bytes.max(1) as f64
    );

    // Benchmark binary decoding
    const DECODE_ITERS: u32 = 10;

    // Warmup
    for bytes in encoded.iter().take(1000) {
        let _ = decode_shape(bytes).expect("Failed to decode");
    }

    let decode_start = Instant::now();
    let mut decoded = Vec::new();
    for _ in 0..DECODE_ITERS {
        decoded = encoded
            .iter()
            .map(|b| decode_shape(b).expect("Failed to decode"))
            .collect();
    }
    let decode_time = decode_start.elapsed() / DECODE_ITERS;

    println!(
        "\nBinary decode: {:?} (avg of {} iterations)",
        decode_time, DECODE_ITERS
    );
    println!("  Throughput: {:.2} MB/s", throughput(binary_bytes, decode_time));
    assert_eq!(decoded, models, "Binary round-trip should be exact");

    // Benchmark WKT writing
    let write_start = Instant::now();
    let written: Vec<String> = models
        .iter()
        .zip(&features)
        .map(|(m, f)| {
            let options = WktWriteOptions {
                order: f.order(),
                ..WktWriteOptions::new().with_z().with_m()
            };
            write_wkt(m, options)
        })
        .collect();
    let write_time = write_start.elapsed();

    let written_bytes: usize = written.iter().map(|s| s.len()).sum();
    println!("\nWKT write: {} bytes in {:?}", written_bytes, write_time);
    println!("  Throughput: {:.2} MB/s", throughput(written_bytes, write_time));

    if let Some((feature, text)) = features.iter().zip(&written).next() {
        println!("\n=== Sample ===");
        println!("{}: {}", feature.name, text);
    }
}
