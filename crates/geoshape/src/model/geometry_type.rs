//! Geometry type tags and figure attributes.
//!
//! Both enums carry their legacy wire codes.

/// OGC geometry type of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GeometryType {
    Unknown = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    /// Reserved; construction and decoding fail.
    CircularString = 8,
    /// Reserved; construction and decoding fail.
    CompoundCurve = 9,
    /// Reserved; construction and decoding fail.
    CurvePolygon = 10,
    /// The whole globe. Never empty.
    FullGlobe = 11,
}

impl GeometryType {
    /// Creates a GeometryType from its wire representation.
    pub fn from_u8(v: u8) -> Option<GeometryType> {
        match v {
            0 => Some(GeometryType::Unknown),
            1 => Some(GeometryType::Point),
            2 => Some(GeometryType::LineString),
            3 => Some(GeometryType::Polygon),
            4 => Some(GeometryType::MultiPoint),
            5 => Some(GeometryType::MultiLineString),
            6 => Some(GeometryType::MultiPolygon),
            7 => Some(GeometryType::GeometryCollection),
            8 => Some(GeometryType::CircularString),
            9 => Some(GeometryType::CompoundCurve),
            10 => Some(GeometryType::CurvePolygon),
            11 => Some(GeometryType::FullGlobe),
            _ => None,
        }
    }

    /// Returns the wire representation.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Upper-case WKT tag.
    pub fn wkt_tag(self) -> &'static str {
        match self {
            GeometryType::Unknown => "UNKNOWN",
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
            GeometryType::CircularString => "CIRCULARSTRING",
            GeometryType::CompoundCurve => "COMPOUNDCURVE",
            GeometryType::CurvePolygon => "CURVEPOLYGON",
            GeometryType::FullGlobe => "FULLGLOBE",
        }
    }

    /// True only for GEOMETRYCOLLECTION.
    ///
    /// The multi-types count their members through the child-shape
    /// heuristic in [`ShapeModel::num_geometries`](crate::ShapeModel::num_geometries).
    pub fn is_collection(self) -> bool {
        matches!(self, GeometryType::GeometryCollection)
    }

    /// True for the curve types that this crate refuses to build.
    pub fn is_curve(self) -> bool {
        matches!(
            self,
            GeometryType::CircularString | GeometryType::CompoundCurve | GeometryType::CurvePolygon
        )
    }
}

/// Role of a figure inside its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigureAttribute {
    Point,
    Line,
    ExteriorRing,
    InteriorRing,
    /// Reserved for curves.
    Arc,
    /// Reserved for curves.
    Curve,
}

// Version 1 figure attribute codes
const WIRE_INTERIOR_RING: u8 = 0x00;
const WIRE_STROKE: u8 = 0x01;
const WIRE_EXTERIOR_RING: u8 = 0x02;

impl FigureAttribute {
    /// Decodes a version 1 attribute byte.
    ///
    /// Points and lines share the stroke code; stroke figures decode as
    /// [`FigureAttribute::Line`] and the decoder re-tags the ones owned by
    /// point shapes.
    pub fn from_u8(v: u8) -> Option<FigureAttribute> {
        match v {
            WIRE_INTERIOR_RING => Some(FigureAttribute::InteriorRing),
            WIRE_STROKE => Some(FigureAttribute::Line),
            WIRE_EXTERIOR_RING => Some(FigureAttribute::ExteriorRing),
            _ => None,
        }
    }

    /// Returns the version 1 wire code, or `None` for the curve attributes.
    pub fn as_u8(self) -> Option<u8> {
        match self {
            FigureAttribute::InteriorRing => Some(WIRE_INTERIOR_RING),
            FigureAttribute::Point | FigureAttribute::Line => Some(WIRE_STROKE),
            FigureAttribute::ExteriorRing => Some(WIRE_EXTERIOR_RING),
            FigureAttribute::Arc | FigureAttribute::Curve => None,
        }
    }
}
