use std::io::Write;

use crate::collections::StringPool;
use crate::runtime::Logger;
use super::collector::Collector;
use super::compiler::{Instruction, Program};
use super::error::{EvalError, EvalErrorKind};
use super::symbol_table::SymbolTable;
use super::value::{Reference, TypeAnnotation, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    Idle,
    Running,
    Halted,
}

/// What the caller should do after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalContinuation {
    Stepping,
    // A rendered line the caller should write to the output sink
    Output(String),
    Halted,
}

type EvalResult = Result<EvalContinuation, EvalError>;

/// The state shared between the VM and its owner. The VM itself only owns
/// the program and the operand stack.
pub(crate) struct EvalContext<'a> {
    pub pool: &'a StringPool,
    pub symbols: &'a mut SymbolTable,
    pub heap: &'a mut Collector,
    pub logger: &'a mut dyn Logger,
}

/// Stack machine executing one program at a time.
#[derive(Debug)]
pub struct Vm {
    program: Program,
    position: usize,
    state: VmState,
    stack: Vec<Value>,
}

impl Vm {
    pub fn new() -> Self {
        Self{
            program: Program::default(),
            position: 0,
            state: VmState::Idle,
            stack: Vec::with_capacity(32),
        }
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Loads a program. The operand stack must be empty: every program is
    /// compiled to leave the stack exactly as it found it.
    pub fn prime(&mut self, program: Program) -> Result<(), EvalError> {
        if !self.stack.is_empty() {
            return Err(EvalError::internal("priming the VM while the operand stack is not empty"));
        }

        self.program = program;
        self.position = 0;
        self.state = VmState::Running;
        Ok(())
    }

    /// Abandons the current program after an error. Leaves the VM idle with
    /// an empty operand stack.
    pub fn abort(&mut self) {
        self.program = Program::default();
        self.position = 0;
        self.state = VmState::Idle;
        self.stack.clear();
    }

    /// Executes a single instruction. Stepping a VM that is not running is a
    /// no-op that reports that it halted.
    pub(crate) fn step(&mut self, ctx: &mut EvalContext) -> EvalResult {
        if self.state != VmState::Running {
            return Ok(EvalContinuation::Halted);
        }

        let (instruction, span) = match self.program.fetch(self.position) {
            Some(fetched) => fetched,
            None => {
                self.state = VmState::Halted;
                if !self.stack.is_empty() {
                    return Err(EvalError::internal("operand stack is not empty at the end of the program"));
                }
                return Ok(EvalContinuation::Halted);
            }
        };

        vmlog!(ctx.logger, "VM {:03} {:?} (stack depth {})", self.position, instruction, self.stack.len());
        self.position += 1;
        self.execute(instruction, ctx).map_err(|error| error.with_span(span))
    }

    fn execute(&mut self, instruction: Instruction, ctx: &mut EvalContext) -> EvalResult {
        match instruction {
            Instruction::Push(value) => {
                self.stack.push(value);
            },
            Instruction::PopAndDiscard => {
                self.pop()?;
            },
            Instruction::PopAndOutput => {
                let value = self.pop()?;
                let rendered = value.render(ctx.pool, ctx.heap)?;
                return Ok(EvalContinuation::Output(rendered));
            },
            Instruction::PopAndLookup => {
                let name = self.pop()?;
                let symbol = name.as_string()
                    .ok_or_else(|| EvalError::internal("looking up a variable by a name that is not a string"))?;
                match ctx.symbols.get(symbol) {
                    Some(value) => self.stack.push(value),
                    None => return Err(EvalError::new(
                        EvalErrorKind::UnboundVariable,
                        format!("tried to look up nonexistent variable '{}'", ctx.pool.resolve(symbol))
                    )),
                }
            },
            Instruction::MakeTuple(length) => {
                let length = length as usize;
                if self.stack.len() < length {
                    return Err(EvalError::internal("operand stack underflow while constructing a tuple"));
                }
                // Elements were pushed left to right, so `split_off` keeps
                // them in source order.
                let elements = self.stack.split_off(self.stack.len() - length);
                let handle = ctx.heap.alloc_tuple(elements);
                self.stack.push(Value::Reference(Reference::tuple(handle)));
            },
            Instruction::Bind(symbol) => {
                let value = self.pop()?;
                if ctx.symbols.contains(symbol) {
                    return Err(EvalError::new(
                        EvalErrorKind::DuplicateBinding,
                        format!("tried to declare variable '{}', which is already bound", ctx.pool.resolve(symbol))
                    ));
                }
                ctx.symbols.set(symbol, value);
            },
            Instruction::ValidateType => {
                let annotation = self.pop()?;
                let expected = match annotation.as_type() {
                    Some(expected) => expected,
                    None => return Err(EvalError::new(
                        EvalErrorKind::TypeMismatch,
                        format!(
                            "annotation is not a type, it is a value of type '{}'",
                            annotation.annotation()?.name(ctx.pool)
                        )
                    )),
                };

                let value = self.peek()?;
                if !value.validate_type(&expected)? {
                    return Err(mismatch_error(ctx.pool, &expected, &value)?);
                }
            },
            Instruction::UpdateBinding(symbol) => {
                let current = match ctx.symbols.get(symbol) {
                    Some(current) => current,
                    None => return Err(EvalError::new(
                        EvalErrorKind::UnboundVariable,
                        format!("tried to modify nonexistent variable '{}'", ctx.pool.resolve(symbol))
                    )),
                };

                let value = self.pop()?;
                let expected = current.annotation()?;
                if !value.validate_type(&expected)? {
                    return Err(mismatch_error(ctx.pool, &expected, &value)?);
                }
                ctx.symbols.set(symbol, value);
            },
            Instruction::TypeOf => {
                let value = self.pop()?;
                self.stack.push(Value::Type(value.annotation()?));
            },
        }

        Ok(EvalContinuation::Stepping)
    }

    fn pop(&mut self) -> Result<Value, EvalError> {
        self.stack.pop().ok_or_else(|| EvalError::internal("operand stack underflow"))
    }

    fn peek(&self) -> Result<Value, EvalError> {
        self.stack.last().copied().ok_or_else(|| EvalError::internal("operand stack underflow"))
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch_error(pool: &StringPool, expected: &TypeAnnotation, value: &Value) -> Result<EvalError, EvalError> {
    let provided = value.annotation()?;
    Ok(EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!(
            "mismatch between expected type '{}' and provided type '{}'",
            expected.name(pool), provided.name(pool)
        )
    ))
}
