//! Shape encoding/decoding for the legacy binary payload.
//!
//! Wire layout:
//!
//! ```text
//! version:u8  properties:u8
//! [vertex_count:i32]                      omitted for single points/segments
//! vertex_count x (x:f64 y:f64)
//! [vertex_count x z:f64]                  if HasZ
//! [vertex_count x m:f64]                  if HasM
//! [figure_count:i32 figure_count x (attribute:u8 vertex_offset:i32)
//!  shape_count:i32  shape_count x (parent:i32 figure:i32 type:u8)]
//!                                         omitted for single points/segments
//! ```
//!
//! The SRID that usually frames this payload belongs to the caller.

use crate::codec::primitives::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{
    FORMAT_VERSION, MAX_FIGURES, MAX_SHAPES, MAX_VERTICES, MIN_FORMAT_VERSION, PROP_HAS_M,
    PROP_HAS_Z, PROP_IS_LARGER_THAN_A_HEMISPHERE, PROP_IS_SINGLE_LINE_SEGMENT,
    PROP_IS_SINGLE_POINT, PROP_IS_VALID,
};
use crate::model::{Figure, FigureAttribute, GeometryType, Shape, ShapeModel, Vertex};
use crate::validate::validate_structure;

const PROPERTIES_RESERVED_MASK: u8 = 0xC0;

const VERTEX_SIZE: usize = 16;
const FIGURE_SIZE: usize = 5;
const SHAPE_SIZE: usize = 9;

/// How the figure and shape tables are represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// One point; no counts, no tables.
    SinglePoint,
    /// A two-vertex LineString; no counts, no tables.
    SingleLineSegment,
    Full,
}

impl Layout {
    fn of(model: &ShapeModel) -> Layout {
        let single = model.figures().len() == 1 && model.shapes().len() == 1;
        match (model.geometry_type(), model.num_points()) {
            (GeometryType::Point, 1) if single => Layout::SinglePoint,
            (GeometryType::LineString, 2) if single => Layout::SingleLineSegment,
            _ => Layout::Full,
        }
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a shape payload that spans the whole input.
pub fn decode_shape(input: &[u8]) -> Result<ShapeModel, DecodeError> {
    let mut reader = Reader::new(input);
    let model = decode_shape_from(&mut reader)?;
    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes {
            count: reader.remaining_len(),
        });
    }
    Ok(model)
}

/// Decodes one shape payload, leaving the reader positioned after it.
pub fn decode_shape_from(reader: &mut Reader<'_>) -> Result<ShapeModel, DecodeError> {
    let version = reader.read_byte("version")?;
    if !(MIN_FORMAT_VERSION..=FORMAT_VERSION).contains(&version) {
        return Err(DecodeError::UnsupportedVersion { version });
    }

    let properties = reader.read_byte("properties")?;
    if properties & PROPERTIES_RESERVED_MASK != 0 {
        return Err(DecodeError::ReservedBitsSet {
            context: "properties",
        });
    }

    let layout = match (
        properties & PROP_IS_SINGLE_POINT != 0,
        properties & PROP_IS_SINGLE_LINE_SEGMENT != 0,
    ) {
        (false, false) => Layout::Full,
        (true, false) => Layout::SinglePoint,
        (false, true) => Layout::SingleLineSegment,
        (true, true) => {
            return Err(DecodeError::MalformedEncoding {
                context: "both single point and single line segment set",
            });
        }
    };

    let vertex_count = match layout {
        Layout::SinglePoint => 1,
        Layout::SingleLineSegment => 2,
        Layout::Full => reader.read_count("vertex_count", MAX_VERTICES, VERTEX_SIZE)?,
    };

    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let x = reader.read_f64("vertex.x")?;
        let y = reader.read_f64("vertex.y")?;
        vertices.push(Vertex::new(x, y));
    }

    let z_values = if properties & PROP_HAS_Z != 0 {
        Some(read_dimension(reader, vertex_count, "z")?)
    } else {
        None
    };
    let m_values = if properties & PROP_HAS_M != 0 {
        Some(read_dimension(reader, vertex_count, "m")?)
    } else {
        None
    };

    let (figures, shapes) = match layout {
        Layout::SinglePoint => single_figure(FigureAttribute::Point, GeometryType::Point),
        Layout::SingleLineSegment => single_figure(FigureAttribute::Line, GeometryType::LineString),
        Layout::Full => read_tables(reader)?,
    };

    let mut model = ShapeModel::from_parts(vertices, z_values, m_values, figures, shapes);
    model.is_valid = properties & PROP_IS_VALID != 0;
    model.larger_than_hemisphere = properties & PROP_IS_LARGER_THAN_A_HEMISPHERE != 0;
    validate_structure(&model)?;
    retag_point_figures(&mut model);

    log::debug!(
        "decoded {:?}: {} vertices, {} figures, {} shapes ({layout:?})",
        model.geometry_type(),
        model.num_points(),
        model.figures().len(),
        model.shapes().len()
    );
    Ok(model)
}

fn read_dimension(
    reader: &mut Reader<'_>,
    count: usize,
    context: &'static str,
) -> Result<Vec<f64>, DecodeError> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(reader.read_f64(context)?);
    }
    Ok(values)
}

fn single_figure(attribute: FigureAttribute, kind: GeometryType) -> (Vec<Figure>, Vec<Shape>) {
    (
        vec![Figure {
            attribute,
            vertex_offset: 0,
        }],
        vec![Shape {
            parent_offset: -1,
            figure_offset: 0,
            kind,
        }],
    )
}

fn read_tables(reader: &mut Reader<'_>) -> Result<(Vec<Figure>, Vec<Shape>), DecodeError> {
    let figure_count = reader.read_count("figure_count", MAX_FIGURES, FIGURE_SIZE)?;
    let mut figures = Vec::with_capacity(figure_count);
    for _ in 0..figure_count {
        let value = reader.read_byte("figure.attribute")?;
        let attribute = FigureAttribute::from_u8(value)
            .ok_or(DecodeError::InvalidFigureAttribute { value })?;
        let vertex_offset = reader.read_i32("figure.vertex_offset")?;
        figures.push(Figure {
            attribute,
            vertex_offset,
        });
    }

    let shape_count = reader.read_count("shape_count", MAX_SHAPES, SHAPE_SIZE)?;
    let mut shapes = Vec::with_capacity(shape_count);
    for _ in 0..shape_count {
        let parent_offset = reader.read_i32("shape.parent_offset")?;
        let figure_offset = reader.read_i32("shape.figure_offset")?;
        let value = reader.read_byte("shape.type")?;
        let kind =
            GeometryType::from_u8(value).ok_or(DecodeError::InvalidGeometryType { value })?;
        if kind.is_curve() {
            return Err(DecodeError::UnsupportedGeometryType { kind });
        }
        shapes.push(Shape {
            parent_offset,
            figure_offset,
            kind,
        });
    }

    Ok((figures, shapes))
}

/// Points and lines share the stroke code on the wire; figures owned by
/// Point and MultiPoint shapes are points again.
fn retag_point_figures(model: &mut ShapeModel) {
    for index in 0..model.shapes.len() {
        let kind = model.shapes[index].kind;
        if kind != GeometryType::Point && kind != GeometryType::MultiPoint {
            continue;
        }
        for figure in model.figure_range(index) {
            let figure = &mut model.figures[figure];
            if figure.attribute == FigureAttribute::Line {
                figure.attribute = FigureAttribute::Point;
            }
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a shape to its binary payload.
pub fn encode_shape(model: &ShapeModel) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::with_capacity(encoded_size_hint(model));
    encode_shape_into(&mut writer, model)?;
    Ok(writer.into_bytes())
}

/// Appends a shape payload to `writer`.
pub fn encode_shape_into(writer: &mut Writer, model: &ShapeModel) -> Result<(), EncodeError> {
    validate_encode_inputs(model)?;

    let layout = Layout::of(model);
    let mut properties = 0u8;
    if model.has_z() {
        properties |= PROP_HAS_Z;
    }
    if model.has_m() {
        properties |= PROP_HAS_M;
    }
    if model.is_valid() {
        properties |= PROP_IS_VALID;
    }
    if model.is_larger_than_hemisphere() {
        properties |= PROP_IS_LARGER_THAN_A_HEMISPHERE;
    }
    match layout {
        Layout::SinglePoint => properties |= PROP_IS_SINGLE_POINT,
        Layout::SingleLineSegment => properties |= PROP_IS_SINGLE_LINE_SEGMENT,
        Layout::Full => {}
    }

    writer.write_byte(FORMAT_VERSION);
    writer.write_byte(properties);

    if layout == Layout::Full {
        writer.write_i32(model.num_points() as i32);
    }
    for v in model.vertices() {
        writer.write_f64(v.x);
        writer.write_f64(v.y);
    }
    for values in [model.z_values(), model.m_values()].into_iter().flatten() {
        for &value in values {
            writer.write_f64(value);
        }
    }

    if layout == Layout::Full {
        writer.write_i32(model.figures().len() as i32);
        for figure in model.figures() {
            let attribute = figure
                .attribute
                .as_u8()
                .ok_or(EncodeError::UnsupportedFigureAttribute {
                    attribute: figure.attribute,
                })?;
            writer.write_byte(attribute);
            writer.write_i32(figure.vertex_offset);
        }

        writer.write_i32(model.shapes().len() as i32);
        for shape in model.shapes() {
            writer.write_i32(shape.parent_offset);
            writer.write_i32(shape.figure_offset);
            writer.write_byte(shape.kind.as_u8());
        }
    }

    log::debug!(
        "encoded {:?} ({layout:?}): {} bytes",
        model.geometry_type(),
        writer.len()
    );
    Ok(())
}

fn validate_encode_inputs(model: &ShapeModel) -> Result<(), EncodeError> {
    for (field, len, max) in [
        ("vertices", model.num_points(), MAX_VERTICES),
        ("figures", model.figures().len(), MAX_FIGURES),
        ("shapes", model.shapes().len(), MAX_SHAPES),
    ] {
        if len > max {
            return Err(EncodeError::LengthExceedsLimit { field, len, max });
        }
    }
    if let Some(shape) = model.shapes().iter().find(|s| s.kind.is_curve()) {
        return Err(EncodeError::UnsupportedGeometryType { kind: shape.kind });
    }
    Ok(())
}

fn encoded_size_hint(model: &ShapeModel) -> usize {
    let dims = 2 + usize::from(model.has_z()) + usize::from(model.has_m());
    2 + 4
        + model.num_points() * dims * 8
        + 4
        + model.figures().len() * FIGURE_SIZE
        + 4
        + model.shapes().len() * SHAPE_SIZE
}
