//! Structural validation for shape models.
//!
//! Checks the invariants every navigation and extraction operation relies
//! on: pre-order parent links, monotonic in-range offsets and index-aligned
//! Z/M arrays. Models produced by [`ShapeBuilder`](crate::ShapeBuilder)
//! satisfy them by construction; the binary decoder runs this check on every
//! payload before handing out a model.
//!
//! Geometric validity (ring orientation, self-intersection, ...) is not
//! checked here.

use crate::error::ValidationError;
use crate::model::ShapeModel;

/// Validates the structural invariants of a shape model.
pub fn validate_structure(model: &ShapeModel) -> Result<(), ValidationError> {
    validate_shapes(model)?;
    validate_figures(model)?;
    validate_dimension("z", model.z_values(), model.num_points())?;
    validate_dimension("m", model.m_values(), model.num_points())?;
    Ok(())
}

/// Parent links must describe a pre-order traversal and figure offsets must
/// be in range and non-decreasing.
fn validate_shapes(model: &ShapeModel) -> Result<(), ValidationError> {
    let shapes = model.shapes();
    let figure_count = model.figures().len();

    let root = shapes.first().ok_or(ValidationError::MissingRoot)?;
    if root.parent_offset != -1 {
        return Err(ValidationError::InvalidRootParent {
            parent: root.parent_offset,
        });
    }

    // Ancestors of the shape being visited, root first.
    let mut open: Vec<i32> = Vec::new();
    let mut last_figure = -1;

    for (index, shape) in shapes.iter().enumerate() {
        if index > 0 {
            while open.last().is_some_and(|&top| top != shape.parent_offset) {
                open.pop();
            }
            if open.is_empty() {
                return Err(ValidationError::InvalidParent {
                    shape: index,
                    parent: shape.parent_offset,
                });
            }
        }
        open.push(index as i32);

        let offset = shape.figure_offset;
        if offset < -1 || (offset >= 0 && offset as usize >= figure_count) {
            return Err(ValidationError::FigureOffsetOutOfRange {
                shape: index,
                offset,
                figures: figure_count,
            });
        }
        if offset >= 0 {
            if offset < last_figure {
                return Err(ValidationError::FigureOffsetNotMonotonic {
                    shape: index,
                    offset,
                });
            }
            last_figure = offset;
        }
    }
    Ok(())
}

fn validate_figures(model: &ShapeModel) -> Result<(), ValidationError> {
    let vertex_count = model.num_points();
    let mut last = 0;

    for (index, figure) in model.figures().iter().enumerate() {
        let offset = figure.vertex_offset;
        if offset < 0 || offset as usize > vertex_count {
            return Err(ValidationError::VertexOffsetOutOfRange {
                figure: index,
                offset,
                vertices: vertex_count,
            });
        }
        if offset < last {
            return Err(ValidationError::VertexOffsetNotMonotonic {
                figure: index,
                offset,
            });
        }
        last = offset;
    }
    Ok(())
}

fn validate_dimension(
    dimension: &'static str,
    values: Option<&[f64]>,
    vertices: usize,
) -> Result<(), ValidationError> {
    match values {
        Some(values) if values.len() != vertices => Err(ValidationError::MisalignedDimension {
            dimension,
            len: values.len(),
            vertices,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Figure, FigureAttribute, GeometryType, Shape, Vertex};
    use crate::wkt::{WktReadOptions, parse_wkt};

    fn shape(parent_offset: i32, figure_offset: i32, kind: GeometryType) -> Shape {
        Shape {
            parent_offset,
            figure_offset,
            kind,
        }
    }

    fn line_figure(vertex_offset: i32) -> Figure {
        Figure {
            attribute: FigureAttribute::Line,
            vertex_offset,
        }
    }

    #[test]
    fn test_built_models_are_valid() {
        for text in [
            "POINT EMPTY",
            "POINT (1 2)",
            "MULTIPOINT ((1 2), EMPTY)",
            "POLYGON ((0 0, 1 0, 1 1, 0 0))",
            "GEOMETRYCOLLECTION (POINT (1 1), GEOMETRYCOLLECTION (LINESTRING (0 0, 1 1)), \
             POLYGON EMPTY)",
        ] {
            let model = parse_wkt(text, WktReadOptions::new()).unwrap();
            assert_eq!(validate_structure(&model), Ok(()), "failed for {}", text);
        }
    }

    #[test]
    fn test_missing_root() {
        let model = ShapeModel::from_parts(vec![], None, None, vec![], vec![]);
        assert_eq!(validate_structure(&model), Err(ValidationError::MissingRoot));
    }

    #[test]
    fn test_parent_must_be_open_ancestor() {
        // Shape 3 claims shape 1 as parent after shape 1's subtree ended.
        let model = ShapeModel::from_parts(
            vec![],
            None,
            None,
            vec![],
            vec![
                shape(-1, -1, GeometryType::GeometryCollection),
                shape(0, -1, GeometryType::GeometryCollection),
                shape(0, -1, GeometryType::Point),
                shape(1, -1, GeometryType::Point),
            ],
        );
        assert_eq!(
            validate_structure(&model),
            Err(ValidationError::InvalidParent { shape: 3, parent: 1 })
        );
    }

    #[test]
    fn test_forward_parent_rejected() {
        let model = ShapeModel::from_parts(
            vec![],
            None,
            None,
            vec![],
            vec![
                shape(-1, -1, GeometryType::MultiPoint),
                shape(2, -1, GeometryType::Point),
            ],
        );
        assert!(matches!(
            validate_structure(&model),
            Err(ValidationError::InvalidParent { shape: 1, .. })
        ));
    }

    #[test]
    fn test_vertex_offset_out_of_range() {
        let model = ShapeModel::from_parts(
            vec![Vertex::new(0.0, 0.0)],
            None,
            None,
            vec![line_figure(0), line_figure(5)],
            vec![shape(-1, 0, GeometryType::LineString)],
        );
        assert!(matches!(
            validate_structure(&model),
            Err(ValidationError::VertexOffsetOutOfRange { figure: 1, .. })
        ));
    }

    #[test]
    fn test_figure_offset_not_monotonic() {
        let model = ShapeModel::from_parts(
            vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)],
            None,
            None,
            vec![line_figure(0), line_figure(1)],
            vec![
                shape(-1, 0, GeometryType::MultiPoint),
                shape(0, 1, GeometryType::Point),
                shape(0, 0, GeometryType::Point),
            ],
        );
        assert!(matches!(
            validate_structure(&model),
            Err(ValidationError::FigureOffsetNotMonotonic { shape: 2, .. })
        ));
    }

    #[test]
    fn test_misaligned_z() {
        let model = ShapeModel::from_parts(
            vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)],
            Some(vec![1.0]),
            None,
            vec![line_figure(0)],
            vec![shape(-1, 0, GeometryType::LineString)],
        );
        assert_eq!(
            validate_structure(&model),
            Err(ValidationError::MisalignedDimension {
                dimension: "z",
                len: 1,
                vertices: 2,
            })
        );
    }
}
