//! WKT parsing.
//!
//! ```text
//! Geometry   := Tag ( "EMPTY" | "(" Body ")" ) | "FULLGLOBE"
//! Coordinate := number number [ (number | "NULL") [ (number | "NULL") ] ]
//! ```
//!
//! Keywords are case-insensitive. Tokens are separated by spaces, tabs,
//! CR/LF or the punctuation `(`, `)` and `,`.

use crate::error::WktError;
use crate::model::{Coordinate, GeometrySink, GeometryType, ShapeBuilder, ShapeModel};
use crate::wkt::{CoordinateOrder, WktReadOptions};

/// Parses WKT text into a new shape model.
pub fn parse_wkt(text: &str, options: WktReadOptions) -> Result<ShapeModel, WktError> {
    let mut builder = ShapeBuilder::new();
    read_wkt(text, options, &mut builder)?;
    let model = builder.finish()?;
    log::debug!(
        "parsed {:?}: {} vertices, {} shapes",
        model.geometry_type(),
        model.num_points(),
        model.shapes().len()
    );
    Ok(model)
}

/// Parses WKT text, replaying it into `sink`.
///
/// The sink may have received calls when this returns an error.
pub fn read_wkt(
    text: &str,
    options: WktReadOptions,
    sink: &mut dyn GeometrySink,
) -> Result<(), WktError> {
    let mut parser = Parser {
        lexer: Lexer::new(text),
        sink,
        options,
        depth: 0,
    };
    if parser.lexer.peek().is_none() {
        return Err(WktError::EmptyInput);
    }
    parser.geometry()?;
    parser.expect_end()
}

// =============================================================================
// TOKENS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    LeftParen,
    RightParen,
    Comma,
    /// Keyword or number.
    Word,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    position: usize,
}

impl Token<'_> {
    fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_delimiter(b: u8) -> bool {
    is_whitespace(b) || matches!(b, b'(' | b')' | b',')
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<Token<'a>> {
        let bytes = self.text.as_bytes();
        let mut start = self.pos;
        while start < bytes.len() && is_whitespace(bytes[start]) {
            start += 1;
        }
        if start >= bytes.len() {
            return None;
        }

        let (kind, end) = match bytes[start] {
            b'(' => (TokenKind::LeftParen, start + 1),
            b')' => (TokenKind::RightParen, start + 1),
            b',' => (TokenKind::Comma, start + 1),
            _ => {
                let mut end = start;
                while end < bytes.len() && !is_delimiter(bytes[end]) {
                    end += 1;
                }
                (TokenKind::Word, end)
            }
        };
        // Delimiters are ASCII, so both ends fall on char boundaries.
        Some(Token {
            kind,
            text: &self.text[start..end],
            position: start,
        })
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos = token.position + token.text.len();
        Some(token)
    }

    fn end_position(&self) -> usize {
        self.text.len()
    }
}

// =============================================================================
// PARSER
// =============================================================================

struct Parser<'a, 's> {
    lexer: Lexer<'a>,
    sink: &'s mut dyn GeometrySink,
    options: WktReadOptions,
    depth: usize,
}

impl<'a> Parser<'a, '_> {
    /// Parses a tagged geometry.
    fn geometry(&mut self) -> Result<(), WktError> {
        let tag = self.expect(TokenKind::Word, "geometry tag")?;
        let kind = geometry_type_for_tag(tag)?;

        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(WktError::NestingTooDeep {
                max: self.options.max_depth,
                position: tag.position,
            });
        }

        self.sink.begin_geometry(kind)?;
        if kind != GeometryType::FullGlobe && !self.eat_empty() {
            self.expect(TokenKind::LeftParen, "'('")?;
            match kind {
                GeometryType::Point => self.point_body()?,
                GeometryType::LineString => self.line_figure()?,
                GeometryType::Polygon => self.polygon_body()?,
                GeometryType::MultiPoint => self.multipoint_body()?,
                GeometryType::MultiLineString | GeometryType::MultiPolygon => {
                    self.multi_body(kind)?
                }
                _ => self.collection_body()?,
            }
            self.expect(TokenKind::RightParen, "')'")?;
        }
        self.sink.end_geometry()?;

        self.depth -= 1;
        Ok(())
    }

    fn point_body(&mut self) -> Result<(), WktError> {
        let coordinate = self.coordinate()?;
        self.sink.begin_figure(coordinate)?;
        self.sink.end_figure()?;
        Ok(())
    }

    /// Comma-separated coordinates forming one figure.
    fn line_figure(&mut self) -> Result<(), WktError> {
        let first = self.coordinate()?;
        self.sink.begin_figure(first)?;
        while self.eat(TokenKind::Comma) {
            let next = self.coordinate()?;
            self.sink.add_line(next)?;
        }
        self.sink.end_figure()?;
        Ok(())
    }

    fn polygon_body(&mut self) -> Result<(), WktError> {
        self.ring(true)?;
        while self.eat(TokenKind::Comma) {
            self.ring(false)?;
        }
        Ok(())
    }

    fn ring(&mut self, exterior: bool) -> Result<(), WktError> {
        self.expect(TokenKind::LeftParen, "'('")?;
        if !exterior && self.eat(TokenKind::RightParen) {
            log::debug!("dropping empty interior ring");
            return Ok(());
        }
        self.line_figure()?;
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(())
    }

    /// Members are `(x y)`, a bare `x y`, or `EMPTY`.
    ///
    /// An EMPTY member becomes a point holding a NaN placeholder vertex, so
    /// member indices stay aligned with the text.
    fn multipoint_body(&mut self) -> Result<(), WktError> {
        loop {
            self.sink.begin_geometry(GeometryType::Point)?;
            if self.eat_empty() {
                self.sink.begin_figure(Coordinate::xy(f64::NAN, f64::NAN))?;
                self.sink.end_figure()?;
            } else if self.eat(TokenKind::LeftParen) {
                self.point_body()?;
                self.expect(TokenKind::RightParen, "')'")?;
            } else {
                self.point_body()?;
            }
            self.sink.end_geometry()?;

            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    /// MULTILINESTRING / MULTIPOLYGON members: untagged bodies or `EMPTY`.
    fn multi_body(&mut self, kind: GeometryType) -> Result<(), WktError> {
        let member = match kind {
            GeometryType::MultiLineString => GeometryType::LineString,
            _ => GeometryType::Polygon,
        };
        loop {
            self.sink.begin_geometry(member)?;
            if !self.eat_empty() {
                self.expect(TokenKind::LeftParen, "'(' or EMPTY")?;
                match member {
                    GeometryType::LineString => self.line_figure()?,
                    _ => self.polygon_body()?,
                }
                self.expect(TokenKind::RightParen, "')'")?;
            }
            self.sink.end_geometry()?;

            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    fn collection_body(&mut self) -> Result<(), WktError> {
        loop {
            self.geometry()?;
            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    fn coordinate(&mut self) -> Result<Coordinate, WktError> {
        let first = self.number()?;
        let second = self.number()?;

        let mut z = None;
        let mut m = None;
        if self.at_word() {
            z = self.optional_number()?;
            if self.at_word() {
                m = self.optional_number()?;
            }
        }

        let (x, y) = match self.options.order {
            CoordinateOrder::XY => (first, second),
            CoordinateOrder::LatLong => (second, first),
        };
        Ok(Coordinate { x, y, z, m })
    }

    fn number(&mut self) -> Result<f64, WktError> {
        let Some(token) = self.lexer.next() else {
            return Err(WktError::UnexpectedEnd {
                expected: "number",
                position: self.lexer.end_position(),
            });
        };
        parse_number(token)
    }

    /// A number, or `NULL` for a value missing on this vertex.
    fn optional_number(&mut self) -> Result<Option<f64>, WktError> {
        match self.lexer.peek() {
            Some(token) if token.is_keyword("NULL") => {
                self.lexer.next();
                Ok(None)
            }
            _ => self.number().map(Some),
        }
    }

    fn at_word(&self) -> bool {
        self.lexer.peek().is_some_and(|t| t.kind == TokenKind::Word)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.lexer.peek().is_some_and(|t| t.kind == kind) {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    fn eat_empty(&mut self) -> bool {
        if self.lexer.peek().is_some_and(|t| t.is_keyword("EMPTY")) {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token<'a>, WktError> {
        match self.lexer.next() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(WktError::UnexpectedToken {
                expected,
                found: token.text.to_string(),
                position: token.position,
            }),
            None => Err(WktError::UnexpectedEnd {
                expected,
                position: self.lexer.end_position(),
            }),
        }
    }

    fn expect_end(&mut self) -> Result<(), WktError> {
        match self.lexer.peek() {
            None => Ok(()),
            Some(token) => Err(WktError::UnexpectedToken {
                expected: "end of input",
                found: token.text.to_string(),
                position: token.position,
            }),
        }
    }
}

fn geometry_type_for_tag(tag: Token<'_>) -> Result<GeometryType, WktError> {
    const TAGS: [(&str, GeometryType); 8] = [
        ("POINT", GeometryType::Point),
        ("LINESTRING", GeometryType::LineString),
        ("POLYGON", GeometryType::Polygon),
        ("MULTIPOINT", GeometryType::MultiPoint),
        ("MULTILINESTRING", GeometryType::MultiLineString),
        ("MULTIPOLYGON", GeometryType::MultiPolygon),
        ("GEOMETRYCOLLECTION", GeometryType::GeometryCollection),
        ("FULLGLOBE", GeometryType::FullGlobe),
    ];
    const CURVE_TAGS: [&str; 3] = ["CIRCULARSTRING", "COMPOUNDCURVE", "CURVEPOLYGON"];

    if let Some((_, kind)) = TAGS.iter().find(|(name, _)| tag.is_keyword(name)) {
        return Ok(*kind);
    }
    if CURVE_TAGS.iter().any(|name| tag.is_keyword(name)) {
        return Err(WktError::UnsupportedTag {
            tag: tag.text.to_string(),
            position: tag.position,
        });
    }
    Err(WktError::UnknownTag {
        tag: tag.text.to_string(),
        position: tag.position,
    })
}

fn parse_number(token: Token<'_>) -> Result<f64, WktError> {
    let invalid = || WktError::InvalidNumber {
        token: token.text.to_string(),
        position: token.position,
    };
    let starts_numeric = token
        .text
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'));
    if token.kind != TokenKind::Word || !starts_numeric {
        return Err(invalid());
    }
    match token.text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, ErrorCode};
    use crate::model::{FigureAttribute, Vertex};

    fn parse(text: &str) -> Result<ShapeModel, WktError> {
        parse_wkt(text, WktReadOptions::new())
    }

    #[test]
    fn test_point() {
        let point = parse("POINT (5 10)").unwrap();
        assert_eq!(point.geometry_type(), GeometryType::Point);
        assert_eq!(point.vertices(), &[Vertex::new(5.0, 10.0)]);
        assert_eq!(point.figures()[0].attribute, FigureAttribute::Point);
    }

    #[test]
    fn test_case_and_whitespace() {
        let a = parse("point(5 10)").unwrap();
        let b = parse("\t PoInT\r\n(  5\t10 ) \n").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_linestring_with_null_z() {
        let line = parse("LINESTRING (0 1 1, 3 2 2, 4 5 NULL)").unwrap();
        assert_eq!(line.num_points(), 3);
        assert!(line.has_z());
        assert!(!line.has_m());
        assert!(line.z_values().unwrap()[2].is_nan());
        assert_eq!(line.get_point_n(3).unwrap().z, None);
        assert_eq!(line.get_point_n(1).unwrap().z, Some(1.0));
    }

    #[test]
    fn test_m_after_null_z() {
        let point = parse("POINT (1 2 NULL 4)").unwrap();
        assert!(!point.has_z());
        assert!(point.has_m());
        assert_eq!(point.m_values(), Some(&[4.0][..]));
    }

    #[test]
    fn test_collection_example() {
        let collection = parse(
            "GEOMETRYCOLLECTION (POINT(10 11), LINESTRING(20 30, 20 40), POLYGON EMPTY, \
             GEOMETRYCOLLECTION(POINT(30 31), POINT(40 41)))",
        )
        .unwrap();
        assert_eq!(collection.num_geometries(), 4);

        let third = collection.get_geometry_n(3).unwrap();
        assert!(third.is_empty());
        assert_eq!(third.num_points(), 0);

        let fourth = collection.get_geometry_n(4).unwrap();
        assert_eq!(fourth.geometry_type(), GeometryType::GeometryCollection);
        assert_eq!(fourth.num_geometries(), 2);
    }

    #[test]
    fn test_polygon_with_empty_ring_rejected() {
        let result = parse(
            "POLYGON ((10 20, 15 25, 20 30, 10 20), (15 25, 20 30, 25 35, 15 25), EMPTY, \
             (5 5, 6 6, 7 7, 5 5))",
        );
        match result {
            Err(WktError::UnexpectedToken { expected, found, .. }) => {
                assert_eq!(expected, "'('");
                assert_eq!(found, "EMPTY");
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_interior_ring_dropped() {
        let polygon = parse("POLYGON ((0 0, 4 0, 4 4, 0 0), (), (1 1, 2 1, 2 2, 1 1))").unwrap();
        assert_eq!(polygon.num_rings(), 2);
        assert_eq!(polygon.num_points(), 8);
    }

    #[test]
    fn test_multipoint_members() {
        let multi = parse("MULTIPOINT ((1 2), EMPTY, 3 4)").unwrap();
        assert_eq!(multi.num_geometries(), 3);
        assert_eq!(multi.shapes().len(), 4);
        assert!(multi.vertices()[1].x.is_nan());
        assert_eq!(multi.vertices()[2], Vertex::new(3.0, 4.0));
    }

    #[test]
    fn test_multilinestring_empty_member_has_no_figures() {
        let multi = parse("MULTILINESTRING ((0 0, 1 1), EMPTY)").unwrap();
        assert_eq!(multi.num_geometries(), 2);
        assert_eq!(multi.figures().len(), 1);
        assert_eq!(multi.shapes()[2].figure_offset, -1);
    }

    #[test]
    fn test_lat_long_order() {
        let geodetic = parse_wkt("POINT(10 20)", WktReadOptions::lat_long()).unwrap();
        assert_eq!(geodetic.vertices(), &[Vertex::new(20.0, 10.0)]);

        let planar = parse("POINT(10 20)").unwrap();
        assert_eq!(planar.vertices(), &[Vertex::new(10.0, 20.0)]);
    }

    #[test]
    fn test_full_globe() {
        let globe = parse("FULLGLOBE").unwrap();
        assert_eq!(globe.geometry_type(), GeometryType::FullGlobe);
        assert!(!globe.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(WktError::EmptyInput));
        assert_eq!(parse(" \t\r\n"), Err(WktError::EmptyInput));
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            parse("POINTZ (1 2)"),
            Err(WktError::UnknownTag {
                tag: "POINTZ".to_string(),
                position: 0,
            })
        );
        // Same length as LINESTRING; must not be mistaken for it.
        assert!(matches!(
            parse("LINESTRINX (0 0, 1 1)"),
            Err(WktError::UnknownTag { .. })
        ));
    }

    #[test]
    fn test_curve_tags_unsupported() {
        let err = parse("CIRCULARSTRING (0 0, 1 1, 2 0)").unwrap_err();
        assert!(matches!(err, WktError::UnsupportedTag { .. }));
        assert_eq!(err.code(), ErrorCode::Unsupported);
    }

    #[test]
    fn test_invalid_number() {
        assert_eq!(
            parse("POINT (1 abc)"),
            Err(WktError::InvalidNumber {
                token: "abc".to_string(),
                position: 9,
            })
        );
        assert!(matches!(
            parse("POINT (1 inf)"),
            Err(WktError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse("POINT (1 -inf)"),
            Err(WktError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse("LINESTRING (1 2, )"),
            Err(WktError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_missing_punctuation() {
        assert_eq!(
            parse("POINT 1 2"),
            Err(WktError::UnexpectedToken {
                expected: "'('",
                found: "1".to_string(),
                position: 6,
            })
        );
        assert_eq!(
            parse("POINT (1 2"),
            Err(WktError::UnexpectedEnd {
                expected: "')'",
                position: 10,
            })
        );
        assert!(matches!(
            parse("POINT (1 2) POINT (3 4)"),
            Err(WktError::UnexpectedToken {
                expected: "end of input",
                ..
            })
        ));
    }

    #[test]
    fn test_too_many_point_coordinates() {
        let err = parse("POINT (1 2, 3 4)").unwrap_err();
        assert!(matches!(err, WktError::UnexpectedToken { .. }));
        assert_eq!(err.code(), ErrorCode::MalformedWkt);
    }

    #[test]
    fn test_nesting_depth_guard() {
        let depth = 10;
        let text = format!(
            "{}POINT (1 1){}",
            "GEOMETRYCOLLECTION (".repeat(depth),
            ")".repeat(depth)
        );
        assert!(parse_wkt(&text, WktReadOptions::new()).is_ok());

        let result = parse_wkt(&text, WktReadOptions::new().with_max_depth(depth));
        assert!(matches!(
            result,
            Err(WktError::NestingTooDeep { max: 10, .. })
        ));
    }

    #[test]
    fn test_deep_input_fails_without_overflow() {
        let depth = 100_000;
        let text = "GEOMETRYCOLLECTION (".repeat(depth);
        assert!(matches!(
            parse(&text),
            Err(WktError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_read_into_custom_sink() {
        #[derive(Default)]
        struct Counter {
            geometries: usize,
            vertices: usize,
        }

        impl GeometrySink for Counter {
            fn begin_geometry(&mut self, _kind: GeometryType) -> Result<(), BuildError> {
                self.geometries += 1;
                Ok(())
            }
            fn begin_figure(&mut self, _start: Coordinate) -> Result<(), BuildError> {
                self.vertices += 1;
                Ok(())
            }
            fn add_line(&mut self, _to: Coordinate) -> Result<(), BuildError> {
                self.vertices += 1;
                Ok(())
            }
            fn end_figure(&mut self) -> Result<(), BuildError> {
                Ok(())
            }
            fn end_geometry(&mut self) -> Result<(), BuildError> {
                Ok(())
            }
        }

        let mut counter = Counter::default();
        read_wkt(
            "MULTILINESTRING ((0 0, 1 1, 2 2), (3 3, 4 4))",
            WktReadOptions::new(),
            &mut counter,
        )
        .unwrap();
        assert_eq!(counter.geometries, 3);
        assert_eq!(counter.vertices, 5);
    }
}
