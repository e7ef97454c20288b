use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::TypeName;

use super::geometry::{Line, Number, Point, Polyhedron};

/// Shared, growable list. `append` through one handle is visible through all.
pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type CollectionRef = Rc<RefCell<Vec<Rc<Polyhedron>>>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Point(Point),
    Line(Line),
    Polyhedron(Rc<Polyhedron>),
    List(ListRef),
    Collection(CollectionRef),
    None,
}

impl Value {
    pub fn list(values: Vec<Value>) -> Self {
        Self::List(Rc::new(RefCell::new(values)))
    }

    pub fn collection(items: Vec<Rc<Polyhedron>>) -> Self {
        Self::Collection(Rc::new(RefCell::new(items)))
    }

    /// Value bound by a declaration without an initializer.
    pub fn zero(type_name: TypeName) -> Self {
        match type_name {
            TypeName::Int => Self::Int(0),
            TypeName::Float => Self::Float(0.0),
            TypeName::Bool => Self::Bool(false),
            TypeName::String => Self::Str(String::new()),
            TypeName::List => Self::list(Vec::new()),
            TypeName::Point => Self::Point(Point::origin()),
            TypeName::Line => Self::Line(Line::new(Point::origin(), Point::origin())),
            TypeName::Polyhedron => Self::Polyhedron(Rc::new(Polyhedron::empty())),
            TypeName::Collection => Self::collection(Vec::new()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::Point(_) => "Point",
            Self::Line(_) => "Line",
            Self::Polyhedron(_) => "Polyhedron",
            Self::List(_) => "List",
            Self::Collection(_) => "Collection",
            Self::None => "void",
        }
    }

    /// Exact runtime type check; `int` never matches `float`.
    pub fn is_of_type(&self, type_name: TypeName) -> bool {
        self.type_name() == type_name.as_str()
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Int(value) => Some(Number::Int(*value)),
            Self::Float(value) => Some(Number::Float(*value)),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether `list` is this value or nested anywhere inside it.
    pub fn reaches(&self, list: &ListRef) -> bool {
        match self {
            Self::List(items) => {
                Rc::ptr_eq(items, list) || items.borrow().iter().any(|item| item.reaches(list))
            }
            _ => false,
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(value) => Self::Int(value),
            Number::Float(value) => Self::Float(value),
        }
    }
}

fn join<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Str(value) => f.write_str(value),
            Self::Point(point) => write!(f, "{point}"),
            Self::Line(line) => write!(f, "{line}"),
            Self::Polyhedron(polyhedron) => write!(f, "{polyhedron}"),
            Self::List(items) => write!(f, "[{}]", join(items.borrow().as_slice(), Value::to_string)),
            Self::Collection(items) => write!(
                f,
                "Collection([{}])",
                join(items.borrow().as_slice(), |item| item.to_string())
            ),
            Self::None => f.write_str("None"),
        }
    }
}
