//! WKT output.
//!
//! Output uses upper-case tags, a space before each body and `", "` between
//! items: `MULTIPOINT ((1 2), EMPTY)`. Numbers use the shortest decimal form
//! that reads back to the same `f64`.

use std::fmt::{self, Write};

use crate::model::{GeometryType, ShapeModel};
use crate::wkt::{CoordinateOrder, WktWriteOptions};

/// Writes `model` as WKT text.
pub fn write_wkt(model: &ShapeModel, options: WktWriteOptions) -> String {
    Wkt::new(model, options).to_string()
}

/// Formats a shape model as WKT.
///
/// ```
/// use geoshape::{Wkt, WktReadOptions, WktWriteOptions, parse_wkt};
///
/// let model = parse_wkt("point (1 2 3)", WktReadOptions::new()).unwrap();
/// assert_eq!(Wkt::new(&model, WktWriteOptions::new()).to_string(), "POINT (1 2)");
/// assert_eq!(
///     Wkt::new(&model, WktWriteOptions::new().with_z()).to_string(),
///     "POINT (1 2 3)"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Wkt<'a> {
    model: &'a ShapeModel,
    options: WktWriteOptions,
}

impl<'a> Wkt<'a> {
    pub fn new(model: &'a ShapeModel, options: WktWriteOptions) -> Self {
        Self { model, options }
    }

    fn shape<W: Write>(&self, out: &mut W, index: usize, tagged: bool) -> fmt::Result {
        let kind = self.model.shapes()[index].kind;
        if tagged {
            out.write_str(kind.wkt_tag())?;
        }
        if kind == GeometryType::FullGlobe {
            return Ok(());
        }
        if tagged {
            out.write_char(' ')?;
        }
        if self.is_empty_shape(index) {
            return out.write_str("EMPTY");
        }

        out.write_char('(')?;
        match kind {
            GeometryType::Point | GeometryType::LineString => {
                for figure in self.model.figure_range(index) {
                    self.vertices(out, figure)?;
                }
            }
            GeometryType::Polygon => {
                for (i, figure) in self.model.figure_range(index).enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    out.write_char('(')?;
                    self.vertices(out, figure)?;
                    out.write_char(')')?;
                }
            }
            _ => {
                let members_tagged = kind == GeometryType::GeometryCollection;
                for (i, child) in self.model.children(index).enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    self.shape(out, child, members_tagged)?;
                }
            }
        }
        out.write_char(')')
    }

    /// A leaf without figures, a point holding the NaN placeholder left by a
    /// `MULTIPOINT` EMPTY member, or a container without members.
    fn is_empty_shape(&self, index: usize) -> bool {
        let kind = self.model.shapes()[index].kind;
        match kind {
            GeometryType::Point | GeometryType::LineString | GeometryType::Polygon => {
                let figures = self.model.figure_range(index);
                if figures.is_empty() {
                    return true;
                }
                kind == GeometryType::Point && {
                    let vertices = self.model.vertex_range(figures.start);
                    vertices.is_empty() || {
                        let v = self.model.vertices()[vertices.start];
                        v.x.is_nan() && v.y.is_nan()
                    }
                }
            }
            _ => self.model.children(index).next().is_none(),
        }
    }

    fn vertices<W: Write>(&self, out: &mut W, figure: usize) -> fmt::Result {
        for (i, vertex) in self.model.vertex_range(figure).enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            self.coordinate(out, vertex)?;
        }
        Ok(())
    }

    fn coordinate<W: Write>(&self, out: &mut W, vertex: usize) -> fmt::Result {
        let c = self.model.coordinate(vertex);
        let (first, second) = match self.options.order {
            CoordinateOrder::XY => (c.x, c.y),
            CoordinateOrder::LatLong => (c.y, c.x),
        };
        write!(out, "{} {}", first, second)?;
        if let Some(z) = c.z.filter(|_| self.options.emit_z) {
            write!(out, " {}", z)?;
        }
        if let Some(m) = c.m.filter(|_| self.options.emit_m) {
            write!(out, " {}", m)?;
        }
        Ok(())
    }
}

impl fmt::Display for Wkt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.model.shapes().is_empty() {
            return f.write_str("GEOMETRYCOLLECTION EMPTY");
        }
        self.shape(f, 0, true)
    }
}
