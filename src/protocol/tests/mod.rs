/**
 * protocol/tests
 *
 * Contains tests that run small programs through the complete pipeline:
 * lexing, parsing, compiling, executing and collecting. Each test file
 * focuses on one topic, the harness lives in `utils.rs`.
 */

mod utils;
mod eval_types;
mod eval_tuples;
mod eval_collection;

pub(crate) use utils::{Tester}; // the testing harness
pub(crate) use crate::protocol::eval::{EvalErrorKind, Value};
pub(crate) use crate::protocol::ParseErrorKind;
