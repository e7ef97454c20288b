//! Built-in functions, constructors and the fixed method table.

use std::rc::Rc;

use super::error::{Arity, Location, RuntimeError, RuntimeResult};
use super::geometry::{Line, Point, Polyhedron};
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Point,
    Line,
    Polyhedron,
    Collection,
    List,
}

impl BuiltinType {
    pub const ALL: [Self; 5] = [
        Self::Point,
        Self::Line,
        Self::Polyhedron,
        Self::Collection,
        Self::List,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Point(_) => Some(Self::Point),
            Value::Line(_) => Some(Self::Line),
            Value::Polyhedron(_) => Some(Self::Polyhedron),
            Value::Collection(_) => Some(Self::Collection),
            Value::List(_) => Some(Self::List),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::Line => "Line",
            Self::Polyhedron => "Polyhedron",
            Self::Collection => "Collection",
            Self::List => "List",
        }
    }

    pub fn methods(self) -> &'static [Method] {
        match self {
            Self::Point => &[Method::X, Method::Y, Method::Z],
            Self::Line => &[Method::Start, Method::End, Method::Length],
            Self::Polyhedron => &[Method::Lines, Method::Points],
            Self::Collection | Self::List => &[Method::Append, Method::Get, Method::Length],
        }
    }

    pub fn method(self, name: &str) -> Option<Method> {
        self.methods()
            .iter()
            .copied()
            .find(|method| method.name() == name)
    }

    fn arity(self) -> Option<Arity> {
        match self {
            Self::Point => Some(Arity::Exactly(3)),
            Self::Line => Some(Arity::Exactly(2)),
            Self::Polyhedron => Some(Arity::AtLeast(1)),
            Self::Collection | Self::List => None,
        }
    }

    /// Runs the constructor call `Name(args)`.
    pub fn construct(self, args: Vec<Value>) -> RuntimeResult<Value> {
        if let Some(arity) = self.arity()
            && !arity.accepts(args.len())
        {
            return Err(RuntimeError::arguments(self.name(), arity, args.len()));
        }
        match self {
            Self::List => Ok(Value::list(args)),
            Self::Collection => {
                let items = args
                    .into_iter()
                    .map(|arg| match arg {
                        Value::Polyhedron(polyhedron) => Ok(polyhedron),
                        other => Err(only_polyhedrons(&other)),
                    })
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::collection(items))
            }
            Self::Point => {
                let coordinates = args
                    .iter()
                    .map(|arg| {
                        arg.as_number().ok_or_else(|| {
                            RuntimeError::invalid_type(format!(
                                "Point arguments must be 'int' or 'float', got {}",
                                arg.type_name()
                            ))
                        })
                    })
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::Point(Point::new(
                    coordinates[0],
                    coordinates[1],
                    coordinates[2],
                )))
            }
            Self::Line => {
                let [start, end] = [&args[0], &args[1]].map(|arg| match arg {
                    Value::Point(point) => Ok(*point),
                    other => Err(RuntimeError::invalid_type(format!(
                        "Line can only be created from Points, got {}",
                        other.type_name()
                    ))),
                });
                Ok(Value::Line(Line::new(start?, end?)))
            }
            Self::Polyhedron => {
                let lines = args
                    .iter()
                    .map(|arg| match arg {
                        Value::Line(line) => Ok(*line),
                        other => Err(RuntimeError::invalid_type(format!(
                            "Polyhedron can only be created from Lines, got {}",
                            other.type_name()
                        ))),
                    })
                    .collect::<RuntimeResult<Vec<_>>>()?;
                let polyhedron = Polyhedron::new(lines)
                    .map_err(|error| RuntimeError::invalid_type(error.to_string()))?;
                Ok(Value::Polyhedron(Rc::new(polyhedron)))
            }
        }
    }
}

/// Callables that exist without a user definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    Print,
    Construct(BuiltinType),
}

impl BuiltinFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "print" {
            return Some(Self::Print);
        }
        BuiltinType::from_name(name).map(Self::Construct)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Construct(builtin) => builtin.name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    X,
    Y,
    Z,
    Start,
    End,
    Length,
    Lines,
    Points,
    Append,
    Get,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Start => "start",
            Self::End => "end",
            Self::Length => "length",
            Self::Lines => "lines",
            Self::Points => "points",
            Self::Append => "append",
            Self::Get => "get",
        }
    }

    /// Whether `name` appears in any built-in type's method table.
    pub fn is_known(name: &str) -> bool {
        BuiltinType::ALL
            .iter()
            .any(|builtin| builtin.method(name).is_some())
    }

    fn arity(self) -> usize {
        match self {
            Self::Append | Self::Get => 1,
            _ => 0,
        }
    }

    /// Looks `name` up in the receiver's method table and calls it.
    pub fn dispatch(receiver: &Value, name: &str, args: Vec<Value>) -> RuntimeResult<Value> {
        let method = BuiltinType::of(receiver)
            .and_then(|builtin| builtin.method(name))
            .ok_or_else(|| RuntimeError::InvalidMethodCall {
                method: name.to_string(),
                type_name: receiver.type_name().to_string(),
                location: Location::default(),
            })?;
        method.call(receiver, args)
    }

    pub fn call(self, receiver: &Value, mut args: Vec<Value>) -> RuntimeResult<Value> {
        if args.len() != self.arity() {
            return Err(RuntimeError::arguments(
                self.name(),
                Arity::Exactly(self.arity()),
                args.len(),
            ));
        }
        let value = match (self, receiver) {
            (Self::X, Value::Point(point)) => point.x.into(),
            (Self::Y, Value::Point(point)) => point.y.into(),
            (Self::Z, Value::Point(point)) => point.z.into(),
            (Self::Start, Value::Line(line)) => Value::Point(line.start),
            (Self::End, Value::Line(line)) => Value::Point(line.end),
            (Self::Length, Value::Line(line)) => Value::Float(line.length()),
            (Self::Length, Value::List(items)) => length(items.borrow().len())?,
            (Self::Length, Value::Collection(items)) => length(items.borrow().len())?,
            (Self::Lines, Value::Polyhedron(polyhedron)) => {
                Value::list(polyhedron.lines().iter().copied().map(Value::Line).collect())
            }
            (Self::Points, Value::Polyhedron(polyhedron)) => {
                Value::list(polyhedron.points().into_iter().map(Value::Point).collect())
            }
            (Self::Append, Value::List(items)) => {
                let item = args.pop().unwrap_or(Value::None);
                if item.reaches(items) {
                    return Err(RuntimeError::invalid_type(
                        "List cannot be appended to itself",
                    ));
                }
                items.borrow_mut().push(item);
                Value::None
            }
            (Self::Append, Value::Collection(items)) => match args.pop() {
                Some(Value::Polyhedron(polyhedron)) => {
                    items.borrow_mut().push(polyhedron);
                    Value::None
                }
                other => return Err(only_polyhedrons(&other.unwrap_or(Value::None))),
            },
            (Self::Get, Value::List(items)) => {
                let items = items.borrow();
                items[index(&args[0], items.len())?].clone()
            }
            (Self::Get, Value::Collection(items)) => {
                let items = items.borrow();
                Value::Polyhedron(Rc::clone(&items[index(&args[0], items.len())?]))
            }
            _ => {
                return Err(RuntimeError::InvalidMethodCall {
                    method: self.name().to_string(),
                    type_name: receiver.type_name().to_string(),
                    location: Location::default(),
                });
            }
        };
        Ok(value)
    }
}

fn length(len: usize) -> RuntimeResult<Value> {
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| RuntimeError::overflow("length"))
}

fn index(arg: &Value, len: usize) -> RuntimeResult<usize> {
    let Value::Int(raw) = arg else {
        return Err(RuntimeError::invalid_type(format!(
            "Index must be int, got {}",
            arg.type_name()
        )));
    };
    usize::try_from(*raw)
        .ok()
        .filter(|index| *index < len)
        .ok_or(RuntimeError::IndexOutOfBounds {
            index: *raw,
            len,
            location: Location::default(),
        })
}

fn only_polyhedrons(found: &Value) -> RuntimeError {
    RuntimeError::invalid_type(format!(
        "Collection can only contain Polyhedrons, got {}",
        found.type_name()
    ))
}
