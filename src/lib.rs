#[macro_use]
mod macros;

mod collections;
mod common;
mod protocol;
mod runtime;

pub use collections::{StringPool, Symbol};
pub use protocol::eval::{
    CollectionStats, EvalError, EvalErrorKind, ObjectAnnotation, ObjectKind, TypeAnnotation, Value, ValueKind,
};
pub use protocol::{InputPosition, InputSource, InputSpan, ParseError, ParseErrorKind};
pub use runtime::{error::RunError, DummyLogger, FileLogger, Logger, Runtime, RuntimeConfig, VecLogger};
