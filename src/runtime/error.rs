use crate::common::*;
use crate::protocol::eval::EvalError;
use crate::protocol::ParseError;

/// Everything that can end a run early.
#[derive(Debug, derive_more::From)]
pub enum RunError {
    Io(std::io::Error),
    Parse(ParseError),
    Eval(EvalError),
}

impl RunError {
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            RunError::Parse(error) => Some(error),
            _ => None,
        }
    }

    pub fn as_eval(&self) -> Option<&EvalError> {
        match self {
            RunError::Eval(error) => Some(error),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Io(error) => writeln!(f, "ERROR: {}", error),
            RunError::Parse(error) => write!(f, "{}", error),
            RunError::Eval(error) => write!(f, "{}", error),
        }
    }
}
