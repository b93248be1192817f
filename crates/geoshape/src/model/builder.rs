//! Validated, incremental construction of a [`ShapeModel`].
//!
//! [`ShapeBuilder`] is an explicit state machine over a stack of open
//! geometries and figures. Every call is checked against the top of the
//! stack, so a builder that returns `Ok` from [`ShapeBuilder::finish`] always
//! yields a structurally consistent model.
//!
//! # Example
//!
//! ```rust
//! use geoshape::{Coordinate, GeometryType, ShapeBuilder};
//!
//! let mut builder = ShapeBuilder::new();
//! builder.begin_geo(GeometryType::LineString).unwrap();
//! builder.begin_figure().unwrap();
//! builder.add_point(Coordinate::xy(0.0, 0.0)).unwrap();
//! builder.add_line(Coordinate::xy(3.0, 4.0)).unwrap();
//! builder.end_figure().unwrap();
//! builder.end_geo().unwrap();
//!
//! let line = builder.finish().unwrap();
//! assert_eq!(line.num_points(), 2);
//! ```

use crate::error::BuildError;
use crate::model::shape::{Coordinate, Figure, Shape, ShapeModel, Vertex};
use crate::model::{FigureAttribute, GeometryType};

/// Receiver of geometry construction calls.
///
/// This is the protocol that codecs and façades drive. A figure starts with
/// the coordinate passed to `begin_figure` and grows with `add_line`.
pub trait GeometrySink {
    fn begin_geometry(&mut self, kind: GeometryType) -> Result<(), BuildError>;

    fn begin_figure(&mut self, start: Coordinate) -> Result<(), BuildError>;

    fn add_line(&mut self, to: Coordinate) -> Result<(), BuildError>;

    /// Circular arcs are not implemented by any sink in this crate.
    fn add_circular_arc(&mut self, _mid: Coordinate, _end: Coordinate) -> Result<(), BuildError> {
        Err(BuildError::UnsupportedArc)
    }

    fn end_figure(&mut self) -> Result<(), BuildError>;

    fn end_geometry(&mut self) -> Result<(), BuildError>;
}

/// Open element on the builder stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// An open shape, by index.
    Geometry(usize),
    Figure,
}

/// Builder for [`ShapeModel`].
#[derive(Debug, Clone, Default)]
pub struct ShapeBuilder {
    vertices: Vec<Vertex>,
    z_values: Option<Vec<f64>>,
    m_values: Option<Vec<f64>>,
    figures: Vec<Figure>,
    shapes: Vec<Shape>,
    stack: Vec<Frame>,
}

impl ShapeBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Geometries
    // =========================================================================

    /// Opens a shape as a child of the currently open shape.
    pub fn begin_geo(&mut self, kind: GeometryType) -> Result<(), BuildError> {
        if kind.is_curve() {
            return Err(BuildError::UnsupportedGeometryType { kind });
        }
        match self.top() {
            None if !self.shapes.is_empty() => return Err(BuildError::RootClosed),
            None | Some(Frame::Geometry(_)) => {}
            Some(Frame::Figure) => return Err(self.invalid_call("BeginGeometry")),
        }

        let parent_offset = self.current_shape().map(|i| i as i32).unwrap_or(-1);
        let index = self.shapes.len();
        self.shapes.push(Shape {
            parent_offset,
            figure_offset: -1,
            kind,
        });
        self.stack.push(Frame::Geometry(index));
        log::trace!("begin geometry {kind:?} #{index} (parent {parent_offset})");
        Ok(())
    }

    /// Closes the current shape, closing an open figure first.
    pub fn end_geo(&mut self) -> Result<(), BuildError> {
        if self.top() == Some(Frame::Figure) {
            self.end_figure()?;
        }
        match self.top() {
            Some(Frame::Geometry(index)) => {
                self.stack.pop();
                log::trace!("end geometry #{index}");
                Ok(())
            }
            _ => Err(self.invalid_call("EndGeometry")),
        }
    }

    // =========================================================================
    // Figures
    // =========================================================================

    /// Opens a figure in the current shape.
    pub fn begin_figure(&mut self) -> Result<(), BuildError> {
        let Some(Frame::Geometry(index)) = self.top() else {
            return Err(self.invalid_call("BeginFigure"));
        };

        let shape = self.shapes[index];
        if shape.kind == GeometryType::Point && shape.figure_offset >= 0 {
            return Err(BuildError::PointHasFigure);
        }
        let attribute = match shape.kind {
            GeometryType::Point | GeometryType::MultiPoint => FigureAttribute::Point,
            GeometryType::Polygon | GeometryType::MultiPolygon if shape.figure_offset < 0 => {
                FigureAttribute::ExteriorRing
            }
            GeometryType::Polygon | GeometryType::MultiPolygon => FigureAttribute::InteriorRing,
            _ => FigureAttribute::Line,
        };

        self.figures.push(Figure {
            attribute,
            vertex_offset: self.vertices.len() as i32,
        });
        self.stack.push(Frame::Figure);
        Ok(())
    }

    /// Closes the current figure.
    ///
    /// Back-fills the figure offset of every enclosing shape that has none
    /// yet. Polygon rings are closed by overwriting their last vertex with
    /// the first.
    pub fn end_figure(&mut self) -> Result<(), BuildError> {
        if self.top() != Some(Frame::Figure) {
            return Err(self.invalid_call("EndFigure"));
        }
        self.stack.pop();

        let figure_index = self.figures.len() - 1;
        let mut shape = self.current_shape();
        while let Some(index) = shape {
            if self.shapes[index].figure_offset >= 0 {
                break;
            }
            self.shapes[index].figure_offset = figure_index as i32;
            let parent = self.shapes[index].parent_offset;
            shape = (parent >= 0).then_some(parent as usize);
        }

        if let Some(index) = self.current_shape() {
            if self.shapes[index].kind == GeometryType::Polygon {
                self.close_ring(self.figures[figure_index].vertex_offset as usize);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Vertices
    // =========================================================================

    /// Appends a vertex to the current figure.
    pub fn add_point(&mut self, coordinate: Coordinate) -> Result<(), BuildError> {
        if self.top() != Some(Frame::Figure) {
            return Err(self.invalid_call("AddPoint"));
        }
        if self.in_point() && self.current_figure_len() > 0 {
            return Err(BuildError::PointHasCoordinate);
        }
        self.push_vertex(coordinate);
        Ok(())
    }

    /// Appends a line segment end to the current figure.
    pub fn add_line(&mut self, coordinate: Coordinate) -> Result<(), BuildError> {
        if self.top() != Some(Frame::Figure) {
            return Err(self.invalid_call("AddLine"));
        }
        if self.in_point() {
            return Err(BuildError::LineInPoint);
        }
        self.push_vertex(coordinate);
        Ok(())
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Builds the final model.
    pub fn finish(self) -> Result<ShapeModel, BuildError> {
        if self.shapes.is_empty() {
            return Err(BuildError::NoGeometry);
        }
        if !self.stack.is_empty() {
            return Err(BuildError::Unclosed {
                depth: self.stack.len(),
            });
        }
        Ok(ShapeModel::from_parts(
            self.vertices,
            self.z_values,
            self.m_values,
            self.figures,
            self.shapes,
        ))
    }

    fn top(&self) -> Option<Frame> {
        self.stack.last().copied()
    }

    fn current_shape(&self) -> Option<usize> {
        self.stack.iter().rev().find_map(|frame| match frame {
            Frame::Geometry(index) => Some(*index),
            Frame::Figure => None,
        })
    }

    fn in_point(&self) -> bool {
        self.current_shape()
            .is_some_and(|i| self.shapes[i].kind == GeometryType::Point)
    }

    /// Vertices added to the open figure so far.
    fn current_figure_len(&self) -> usize {
        self.figures
            .last()
            .map_or(0, |f| self.vertices.len() - f.vertex_offset as usize)
    }

    fn invalid_call(&self, actual: &'static str) -> BuildError {
        let expected = match self.top() {
            None => "BeginGeometry",
            Some(Frame::Geometry(_)) => "BeginGeometry, BeginFigure or EndGeometry",
            Some(Frame::Figure) => "AddPoint, AddLine or EndFigure",
        };
        BuildError::InvalidCall { expected, actual }
    }

    fn push_vertex(&mut self, coordinate: Coordinate) {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new(coordinate.x, coordinate.y));
        push_dimension(&mut self.z_values, coordinate.z, index);
        push_dimension(&mut self.m_values, coordinate.m, index);
    }

    fn close_ring(&mut self, first: usize) {
        let Some(last) = self.vertices.len().checked_sub(1) else {
            return;
        };
        if last <= first {
            return;
        }
        if self.vertices[last] != self.vertices[first] {
            log::debug!(
                "closing ring: vertex {last} overwritten with vertex {first} {:?}",
                self.vertices[first]
            );
        }
        self.vertices[last] = self.vertices[first];
        for values in [&mut self.z_values, &mut self.m_values].into_iter().flatten() {
            values[last] = values[first];
        }
    }
}

/// Appends one per-vertex value, allocating the array on the first present
/// value and back-filling NaN for earlier vertices.
fn push_dimension(values: &mut Option<Vec<f64>>, value: Option<f64>, index: usize) {
    let value = value.filter(|v| !v.is_nan());
    match (values.as_mut(), value) {
        (Some(values), value) => values.push(value.unwrap_or(f64::NAN)),
        (None, Some(value)) => {
            let mut filled = vec![f64::NAN; index];
            filled.push(value);
            *values = Some(filled);
        }
        (None, None) => {}
    }
}

impl GeometrySink for ShapeBuilder {
    fn begin_geometry(&mut self, kind: GeometryType) -> Result<(), BuildError> {
        self.begin_geo(kind)
    }

    fn begin_figure(&mut self, start: Coordinate) -> Result<(), BuildError> {
        ShapeBuilder::begin_figure(self)?;
        self.add_point(start)
    }

    fn add_line(&mut self, to: Coordinate) -> Result<(), BuildError> {
        ShapeBuilder::add_line(self, to)
    }

    fn end_figure(&mut self) -> Result<(), BuildError> {
        ShapeBuilder::end_figure(self)
    }

    fn end_geometry(&mut self) -> Result<(), BuildError> {
        self.end_geo()
    }
}
