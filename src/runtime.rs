//! Runtime model shared by the evaluator: values, geometry, built-ins and the
//! context stack.
pub mod builtins;
pub mod context;
pub mod error;
pub mod geometry;
pub mod value;

pub use builtins::{BuiltinFunction, BuiltinType, Method};
pub use context::{ContextManager, Variable};
pub use error::{Arity, Location, RuntimeError, RuntimeResult};
pub use geometry::{GeometryError, Line, Number, Point, Polyhedron};
pub use value::Value;
