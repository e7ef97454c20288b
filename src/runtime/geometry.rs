//! Immutable geometry values: points, lines and polyhedra.

use std::fmt;

use thiserror::Error;

/// A coordinate, kept as written so `Point(1, 2, 3)` still prints integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Number,
    pub y: Number,
    pub z: Number,
}

impl Point {
    pub fn new(x: Number, y: Number, z: Number) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(Number::Int(0), Number::Int(0), Number::Int(0))
    }

    pub fn coordinates(&self) -> [f64; 3] {
        [self.x.as_f64(), self.y.as_f64(), self.z.as_f64()]
    }

    /// Coordinate equality: `Point(1, 0, 0)` and `Point(1.0, 0, 0)` coincide.
    pub fn coincides_with(&self, other: &Point) -> bool {
        self.coordinates() == other.coordinates()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        let [x1, y1, z1] = self.start.coordinates();
        let [x2, y2, z2] = self.end.coordinates();
        ((x2 - x1).powi(2) + (y2 - y1).powi(2) + (z2 - z1).powi(2)).sqrt()
    }

    /// How many of this line's two endpoints coincide with `point`.
    fn touches(&self, point: &Point) -> usize {
        usize::from(self.start.coincides_with(point)) + usize::from(self.end.coincides_with(point))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({}, {})", self.start, self.end)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error(
        "In order to create polyhedron, each point must be connected to at least 3 lines; {point} touches {count}"
    )]
    UnderconnectedVertex { point: Point, count: usize },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyhedron {
    lines: Vec<Line>,
}

impl Polyhedron {
    pub const MIN_LINES_PER_VERTEX: usize = 3;

    /// Builds a polyhedron, requiring every distinct endpoint to be shared by
    /// at least three line ends. An empty line set gives [`Polyhedron::empty`].
    pub fn new(lines: Vec<Line>) -> Result<Self, GeometryError> {
        let polyhedron = Self { lines };
        for point in polyhedron.points() {
            let count = polyhedron.lines.iter().map(|line| line.touches(&point)).sum();
            if count < Self::MIN_LINES_PER_VERTEX {
                return Err(GeometryError::UnderconnectedVertex { point, count });
            }
        }
        Ok(polyhedron)
    }

    /// The zero value used by `Polyhedron p;`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Distinct endpoints in order of first appearance.
    pub fn points(&self) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();
        for line in &self.lines {
            for point in [line.start, line.end] {
                if !points.iter().any(|seen| seen.coincides_with(&point)) {
                    points.push(point);
                }
            }
        }
        points
    }
}

impl fmt::Display for Polyhedron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .lines
            .iter()
            .map(Line::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Polyhedron([{lines}])")
    }
}
