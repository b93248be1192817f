//! Data model types for shapes.
//!
//! This module contains the in-memory geometry representation:
//! - Geometry type tags and figure attributes
//! - The flattened shape tree (vertices, figures, shapes)
//! - The builder and sink protocol used to construct it

pub mod builder;
pub mod geometry_type;
pub mod shape;

pub use builder::{GeometrySink, ShapeBuilder};
pub use geometry_type::{FigureAttribute, GeometryType};
pub use shape::{Coordinate, Figure, Shape, ShapeModel, Vertex};
