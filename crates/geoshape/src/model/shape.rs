//! The flattened, offset-addressed geometry tree.
//!
//! A [`ShapeModel`] stores a geometry as four parallel tables:
//!
//! - `vertices`: every XY pair, in document order
//! - `z_values` / `m_values`: optional per-vertex scalars, index-aligned with
//!   `vertices`; NaN marks a vertex that lacks the value
//! - `figures`: contiguous vertex runs (a ring, a line or a single point)
//! - `shapes`: tree nodes in pre-order, each linked to its parent by index
//!
//! A shape's figures run from its own figure offset to the next non-negative
//! figure offset among the following shapes. A figure's vertices run from its
//! vertex offset to the next figure's vertex offset.

use std::borrow::Cow;
use std::ops::Range;

use crate::error::BuildError;
use crate::model::builder::GeometrySink;
use crate::model::{FigureAttribute, GeometryType};

/// An XY pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A vertex together with its optional Z and M values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
}

impl Coordinate {
    /// Creates a 2D coordinate.
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }
}

/// A contiguous run of vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Figure {
    pub attribute: FigureAttribute,
    pub vertex_offset: i32,
}

/// One node of the geometry tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Index of the parent shape, or -1 for the root.
    pub parent_offset: i32,
    /// Index of the first figure, or -1 if the shape has none.
    pub figure_offset: i32,
    pub kind: GeometryType,
}

/// Compact geometry representation shared by the binary and WKT codecs.
///
/// Instances are built once by [`ShapeBuilder`](crate::ShapeBuilder) or a
/// codec and are immutable afterwards, apart from the validity flag.
#[derive(Debug, Clone)]
pub struct ShapeModel {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) z_values: Option<Vec<f64>>,
    pub(crate) m_values: Option<Vec<f64>>,
    pub(crate) figures: Vec<Figure>,
    pub(crate) shapes: Vec<Shape>,
    pub(crate) is_valid: bool,
    pub(crate) larger_than_hemisphere: bool,
}

impl ShapeModel {
    pub(crate) fn from_parts(
        vertices: Vec<Vertex>,
        z_values: Option<Vec<f64>>,
        m_values: Option<Vec<f64>>,
        figures: Vec<Figure>,
        shapes: Vec<Shape>,
    ) -> Self {
        Self {
            vertices,
            z_values,
            m_values,
            figures,
            shapes,
            is_valid: false,
            larger_than_hemisphere: false,
        }
    }

    // =========================================================================
    // Raw tables
    // =========================================================================

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn z_values(&self) -> Option<&[f64]> {
        self.z_values.as_deref()
    }

    pub fn m_values(&self) -> Option<&[f64]> {
        self.m_values.as_deref()
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Whether the geometry has been validated by its owner.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Records the outcome of an external validity check.
    pub fn set_valid(&mut self, valid: bool) {
        self.is_valid = valid;
    }

    /// Reserved hemisphere flag, carried through binary round-trips.
    pub fn is_larger_than_hemisphere(&self) -> bool {
        self.larger_than_hemisphere
    }

    // =========================================================================
    // Derived properties
    // =========================================================================

    /// Type of the root shape.
    pub fn geometry_type(&self) -> GeometryType {
        self.shapes
            .first()
            .map(|s| s.kind)
            .unwrap_or(GeometryType::Unknown)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.geometry_type() != GeometryType::FullGlobe
    }

    pub fn has_z(&self) -> bool {
        self.z_values.is_some()
    }

    pub fn has_m(&self) -> bool {
        self.m_values.is_some()
    }

    pub fn num_points(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_rings(&self) -> usize {
        self.figures.len()
    }

    pub fn num_interior_rings(&self) -> usize {
        self.figures.len().saturating_sub(1)
    }

    /// Number of top-level members.
    ///
    /// A collection counts its direct children. Any other root counts every
    /// shape below it when it has children (the multi-types), and 1 otherwise.
    pub fn num_geometries(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        if self.geometry_type().is_collection() {
            return self.shapes.iter().filter(|s| s.parent_offset == 0).count();
        }
        match self.shapes.get(1) {
            Some(first_child) if first_child.parent_offset == 0 => self.shapes.len() - 1,
            _ => 1,
        }
    }

    /// Returns the 1-based `n`-th vertex with its Z/M values.
    pub fn get_point_n(&self, n: usize) -> Option<Coordinate> {
        if n == 0 || n > self.vertices.len() {
            return None;
        }
        Some(self.coordinate(n - 1))
    }

    /// Extracts the 1-based `n`-th top-level member.
    ///
    /// A model with a single shape is its own first member and is returned
    /// without copying. Otherwise the member's subtree is copied into fresh
    /// tables whose offsets are rebased to start at zero.
    pub fn get_geometry_n(&self, n: usize) -> Option<Cow<'_, ShapeModel>> {
        if n == 0 {
            return None;
        }
        if self.shapes.len() == 1 {
            return (n == 1).then_some(Cow::Borrowed(self));
        }

        let start = self
            .shapes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, s)| s.parent_offset == 0)
            .nth(n - 1)
            .map(|(i, _)| i)?;
        let end = self.subtree_end(start);

        Some(Cow::Owned(self.extract(start..end)))
    }

    /// Copies the 0-based `n`-th figure into a standalone LineString.
    pub fn get_ring(&self, n: usize) -> Option<ShapeModel> {
        if n >= self.figures.len() {
            return None;
        }
        let range = self.vertex_range(n);
        let has_vertices = !range.is_empty();

        let mut ring = ShapeModel::from_parts(
            self.vertices[range.clone()].to_vec(),
            self.z_values.as_ref().map(|z| z[range.clone()].to_vec()),
            self.m_values.as_ref().map(|m| m[range].to_vec()),
            Vec::new(),
            vec![Shape {
                parent_offset: -1,
                figure_offset: if has_vertices { 0 } else { -1 },
                kind: GeometryType::LineString,
            }],
        );
        if has_vertices {
            ring.figures.push(Figure {
                attribute: FigureAttribute::Line,
                vertex_offset: 0,
            });
        }
        Some(ring)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Indices of the direct children of shape `index`, in order.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let end = self.subtree_end(index);
        (index + 1..end).filter(move |&j| self.shapes[j].parent_offset == index as i32)
    }

    /// Figures owned directly by shape `index`.
    pub fn figure_range(&self, index: usize) -> Range<usize> {
        let offset = self.shapes[index].figure_offset;
        if offset < 0 {
            return 0..0;
        }
        let end = self.next_figure_offset(index + 1);
        offset as usize..end
    }

    /// Vertices of figure `index`.
    pub fn vertex_range(&self, index: usize) -> Range<usize> {
        let start = self.figures[index].vertex_offset as usize;
        let end = self
            .figures
            .get(index + 1)
            .map(|f| f.vertex_offset as usize)
            .unwrap_or(self.vertices.len());
        start..end
    }

    /// Vertex `index` with its Z/M values; NaN entries read as `None`.
    pub fn coordinate(&self, index: usize) -> Coordinate {
        let v = self.vertices[index];
        Coordinate {
            x: v.x,
            y: v.y,
            z: dimension_value(self.z_values.as_deref(), index),
            m: dimension_value(self.m_values.as_deref(), index),
        }
    }

    /// Replays this model into a sink.
    pub fn populate(&self, sink: &mut dyn GeometrySink) -> Result<(), BuildError> {
        if self.shapes.is_empty() {
            return Err(BuildError::NoGeometry);
        }
        self.populate_shape(0, sink)
    }

    fn populate_shape(&self, index: usize, sink: &mut dyn GeometrySink) -> Result<(), BuildError> {
        sink.begin_geometry(self.shapes[index].kind)?;
        for figure in self.figure_range(index) {
            let mut vertices = self.vertex_range(figure);
            if let Some(first) = vertices.next() {
                sink.begin_figure(self.coordinate(first))?;
                for v in vertices {
                    sink.add_line(self.coordinate(v))?;
                }
                sink.end_figure()?;
            }
        }
        for child in self.children(index) {
            self.populate_shape(child, sink)?;
        }
        sink.end_geometry()
    }

    /// First index past the subtree rooted at `index`.
    ///
    /// Shapes are stored in pre-order, so the subtree ends at the first
    /// later shape whose parent lies before `index`.
    fn subtree_end(&self, index: usize) -> usize {
        self.shapes[index + 1..]
            .iter()
            .position(|s| s.parent_offset < index as i32)
            .map(|p| index + 1 + p)
            .unwrap_or(self.shapes.len())
    }

    /// First non-negative figure offset at or after shape `from`.
    fn next_figure_offset(&self, from: usize) -> usize {
        self.shapes
            .get(from..)
            .and_then(|rest| rest.iter().find(|s| s.figure_offset >= 0))
            .map(|s| s.figure_offset as usize)
            .unwrap_or(self.figures.len())
    }

    fn extract(&self, shapes: Range<usize>) -> ShapeModel {
        let root = shapes.start;
        let first_figure = self.shapes[shapes.clone()]
            .iter()
            .find(|s| s.figure_offset >= 0)
            .map(|s| s.figure_offset as usize);

        let (figure_range, vertex_range) = match first_figure {
            Some(start) => {
                let end = self.next_figure_offset(shapes.end);
                let v_start = self.figures[start].vertex_offset as usize;
                let v_end = self
                    .figures
                    .get(end)
                    .map(|f| f.vertex_offset as usize)
                    .unwrap_or(self.vertices.len());
                (start..end, v_start..v_end)
            }
            None => (0..0, 0..0),
        };

        let figures = self.figures[figure_range.clone()]
            .iter()
            .map(|f| Figure {
                attribute: f.attribute,
                vertex_offset: f.vertex_offset - vertex_range.start as i32,
            })
            .collect();

        let extracted = self.shapes[shapes.clone()]
            .iter()
            .enumerate()
            .map(|(i, s)| Shape {
                // Shapes are stored in pre-order, so every non-root shape of the
                // subtree has a parent at or after `root`; subtracting `root` maps
                // it to its new index. Only the root would go negative and it
                // becomes the new top level.
                parent_offset: if i == 0 {
                    -1
                } else {
                    s.parent_offset - root as i32
                },
                figure_offset: if s.figure_offset < 0 {
                    -1
                } else {
                    s.figure_offset - figure_range.start as i32
                },
                kind: s.kind,
            })
            .collect();

        let mut model = ShapeModel::from_parts(
            self.vertices[vertex_range.clone()].to_vec(),
            self.z_values.as_ref().map(|z| z[vertex_range.clone()].to_vec()),
            self.m_values.as_ref().map(|m| m[vertex_range].to_vec()),
            figures,
            extracted,
        );
        model.is_valid = self.is_valid;
        model
    }
}

fn dimension_value(values: Option<&[f64]>, index: usize) -> Option<f64> {
    values.map(|v| v[index]).filter(|v| !v.is_nan())
}

fn same_bits(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Structural equality: NaN placeholders compare equal to themselves.
impl PartialEq for ShapeModel {
    fn eq(&self, other: &Self) -> bool {
        let vertices_eq = self.vertices.len() == other.vertices.len()
            && self
                .vertices
                .iter()
                .zip(&other.vertices)
                .all(|(a, b)| a.x.to_bits() == b.x.to_bits() && a.y.to_bits() == b.y.to_bits());
        let dims_eq = |a: &Option<Vec<f64>>, b: &Option<Vec<f64>>| match (a, b) {
            (Some(a), Some(b)) => same_bits(a, b),
            (None, None) => true,
            _ => false,
        };

        vertices_eq
            && dims_eq(&self.z_values, &other.z_values)
            && dims_eq(&self.m_values, &other.m_values)
            && self.figures == other.figures
            && self.shapes == other.shapes
            && self.is_valid == other.is_valid
            && self.larger_than_hemisphere == other.larger_than_hemisphere
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_structure;
    use crate::wkt::{WktReadOptions, parse_wkt};

    fn parse(text: &str) -> ShapeModel {
        parse_wkt(text, WktReadOptions::new()).unwrap()
    }

    #[test]
    fn test_point_properties() {
        let point = parse("POINT (5 10)");
        assert_eq!(point.geometry_type(), GeometryType::Point);
        assert!(!point.is_empty());
        assert!(!point.has_z());
        assert!(!point.has_m());
        assert_eq!(point.num_points(), 1);
        assert_eq!(point.num_geometries(), 1);
        assert_eq!(point.get_point_n(1), Some(Coordinate::xy(5.0, 10.0)));
        assert_eq!(point.get_point_n(2), None);
        assert_eq!(point.get_point_n(0), None);
    }

    #[test]
    fn test_empty_has_no_geometries() {
        let empty = parse("POLYGON EMPTY");
        assert!(empty.is_empty());
        assert_eq!(empty.num_geometries(), 0);
        assert_eq!(empty.num_rings(), 0);
        assert_eq!(empty.num_interior_rings(), 0);
        assert_eq!(empty.shapes()[0].figure_offset, -1);
    }

    #[test]
    fn test_polygon_rings() {
        let polygon = parse("POLYGON ((0 0, 10 0, 10 10, 0 0), (1 1, 2 1, 2 2, 1 1))");
        assert_eq!(polygon.num_rings(), 2);
        assert_eq!(polygon.num_interior_rings(), 1);

        let hole = polygon.get_ring(1).unwrap();
        assert_eq!(hole.geometry_type(), GeometryType::LineString);
        assert_eq!(hole.num_points(), 4);
        assert_eq!(hole.figures()[0].vertex_offset, 0);
        assert_eq!(hole.get_point_n(1), Some(Coordinate::xy(1.0, 1.0)));
        assert!(polygon.get_ring(2).is_none());
    }

    #[test]
    fn test_ring_keeps_z() {
        let polygon = parse("POLYGON ((0 0 1, 10 0 2, 10 10 3, 0 0 1))");
        let ring = polygon.get_ring(0).unwrap();
        assert!(ring.has_z());
        assert_eq!(ring.z_values(), Some(&[1.0, 2.0, 3.0, 1.0][..]));
    }

    #[test]
    fn test_collection_members() {
        let collection = parse(
            "GEOMETRYCOLLECTION (POINT(10 11), LINESTRING(20 30, 20 40), POLYGON EMPTY, \
             GEOMETRYCOLLECTION(POINT(30 31), POINT(40 41)))",
        );
        assert_eq!(collection.num_geometries(), 4);

        let point = collection.get_geometry_n(1).unwrap();
        assert_eq!(point.geometry_type(), GeometryType::Point);
        assert_eq!(point.get_point_n(1), Some(Coordinate::xy(10.0, 11.0)));

        let line = collection.get_geometry_n(2).unwrap();
        assert_eq!(line.geometry_type(), GeometryType::LineString);
        assert_eq!(line.num_points(), 2);
        assert_eq!(line.figures()[0].vertex_offset, 0);
        assert_eq!(line.get_point_n(2), Some(Coordinate::xy(20.0, 40.0)));

        let empty = collection.get_geometry_n(3).unwrap();
        assert_eq!(empty.geometry_type(), GeometryType::Polygon);
        assert!(empty.is_empty());
        assert_eq!(empty.num_points(), 0);

        let nested = collection.get_geometry_n(4).unwrap();
        assert_eq!(nested.geometry_type(), GeometryType::GeometryCollection);
        assert_eq!(nested.num_geometries(), 2);
        assert_eq!(nested.shapes()[0].parent_offset, -1);
        assert_eq!(nested.shapes()[1].parent_offset, 0);
        assert_eq!(nested.shapes()[2].parent_offset, 0);

        let inner = nested.get_geometry_n(2).unwrap();
        assert_eq!(inner.get_point_n(1), Some(Coordinate::xy(40.0, 41.0)));

        assert!(collection.get_geometry_n(5).is_none());
    }

    #[test]
    fn test_extracted_nested_member_parents() {
        let model = parse(
            "GEOMETRYCOLLECTION (POINT (0 0), \
             GEOMETRYCOLLECTION (POINT (1 1), MULTIPOINT ((2 2), (3 3))))",
        );
        // 0 GC, 1 Point, 2 GC, 3 Point, 4 MultiPoint, 5 Point, 6 Point
        assert_eq!(model.shapes()[5].parent_offset, 4);

        let member = model.get_geometry_n(2).unwrap();
        let parents: Vec<i32> = member.shapes().iter().map(|s| s.parent_offset).collect();
        assert_eq!(parents, vec![-1, 0, 0, 2, 2]);
        assert_eq!(member.num_geometries(), 2);
        assert_eq!(validate_structure(&member), Ok(()));
    }

    #[test]
    fn test_extracted_member_is_rebased() {
        let multi = parse(
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), \
             ((5 5, 6 5, 6 6, 5 5), (5.2 5.1, 5.4 5.1, 5.4 5.3, 5.2 5.1)))",
        );
        assert_eq!(multi.num_geometries(), 2);

        let second = multi.get_geometry_n(2).unwrap();
        assert_eq!(second.geometry_type(), GeometryType::Polygon);
        assert_eq!(second.num_rings(), 2);
        assert_eq!(second.figures()[0].vertex_offset, 0);
        assert_eq!(second.figures()[1].vertex_offset, 4);
        assert_eq!(
            second.shapes(),
            &[Shape {
                parent_offset: -1,
                figure_offset: 0,
                kind: GeometryType::Polygon,
            }]
        );
        assert_eq!(second.get_point_n(1), Some(Coordinate::xy(5.0, 5.0)));
    }

    #[test]
    fn test_single_shape_member_is_borrowed() {
        let line = parse("LINESTRING (0 0, 1 1, 2 2)");
        assert!(matches!(line.get_geometry_n(1), Some(Cow::Borrowed(_))));
        assert!(line.get_geometry_n(2).is_none());
    }

    #[test]
    fn test_multipoint_empty_member_placeholder() {
        let multi = parse("MULTIPOINT ((1 2), EMPTY, (3 4))");
        assert_eq!(multi.num_geometries(), 3);
        assert_eq!(multi.num_points(), 3);

        let placeholder = multi.get_geometry_n(2).unwrap();
        let coordinate = placeholder.get_point_n(1).unwrap();
        assert!(coordinate.x.is_nan());
        assert!(coordinate.y.is_nan());
    }

    #[test]
    fn test_children() {
        let collection = parse("GEOMETRYCOLLECTION (MULTIPOINT ((1 1), (2 2)), POINT (3 3))");
        let top: Vec<usize> = collection.children(0).collect();
        assert_eq!(top, vec![1, 4]);
        let inner: Vec<usize> = collection.children(1).collect();
        assert_eq!(inner, vec![2, 3]);
    }

    #[test]
    fn test_structural_equality_with_nan() {
        let a = parse("LINESTRING (0 1 1, 3 2 2, 4 5 NULL)");
        let b = parse("LINESTRING (0 1 1, 3 2 2, 4 5 NULL)");
        assert_eq!(a, b);
    }
}
