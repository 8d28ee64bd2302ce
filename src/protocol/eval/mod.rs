/// eval
///
/// Everything after parsing: statements are lowered by the `Compiler` into a
/// flat `Program`, which the `Vm` executes against an operand stack. Values
/// are small and copied around freely. The only aliasing happens through
/// references to objects owned by the `Collector`, which is run after every
/// top-level statement using the bindings in the `SymbolTable` as roots.
///
/// There is a single global scope and no control flow, so a program is
/// always straight-line code and never outlives its statement.

mod value;
mod collector;
mod symbol_table;
mod compiler;
mod executor;
mod error;

pub use value::{Value, ValueKind, ObjectKind, TypeAnnotation, ObjectAnnotation, Reference};
pub use collector::{Collector, CollectionStats, Handle, HeapObject, TupleObject};
pub use symbol_table::SymbolTable;
pub use compiler::{Compiler, Instruction, Program};
pub use executor::{EvalContinuation, Vm, VmState};
pub(crate) use executor::EvalContext;
pub use error::{EvalError, EvalErrorKind};
