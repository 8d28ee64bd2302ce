use std::convert::TryFrom;

use crate::collections::{StringPool, Symbol};
use crate::protocol::ast::*;
use crate::protocol::input_source::InputSpan;
use super::error::{EvalError, EvalErrorKind};
use super::value::Value;

/// A single VM instruction. Immediate operands are stored inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Push(Value),
    PopAndDiscard,
    PopAndOutput,
    // Pops a variable name (a `Value::String`) and pushes the bound value
    PopAndLookup,
    MakeTuple(u32),
    Bind(Symbol),
    // Pops a type and validates the value below it, which stays on the stack
    ValidateType,
    UpdateBinding(Symbol),
    TypeOf,
}

impl Instruction {
    fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push(_) => "push",
            Instruction::PopAndDiscard => "pop_and_discard",
            Instruction::PopAndOutput => "pop_and_output",
            Instruction::PopAndLookup => "pop_and_lookup",
            Instruction::MakeTuple(_) => "make_tuple",
            Instruction::Bind(_) => "bind",
            Instruction::ValidateType => "validate_type",
            Instruction::UpdateBinding(_) => "update_binding",
            Instruction::TypeOf => "typeof",
        }
    }
}

/// The straight-line code compiled from a single statement. Each instruction
/// has the span of the source that produced it, used for error reporting.
#[derive(Debug, Clone, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
    spans: Vec<InputSpan>,
}

impl Program {
    /// Hand-assembled program, every instruction is attributed to the start
    /// of the input.
    #[cfg(test)]
    pub(crate) fn from_instructions(instructions: Vec<Instruction>) -> Self {
        use crate::protocol::input_source::InputPosition;
        let start = InputPosition{ line: 1, offset: 0 };
        let spans = vec![InputSpan::from_positions(start, start); instructions.len()];
        Self{ instructions, spans }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub(crate) fn fetch(&self, position: usize) -> Option<(Instruction, InputSpan)> {
        let instruction = *self.instructions.get(position)?;
        Some((instruction, self.spans[position]))
    }

    /// Disassembly with symbols resolved through the string pool.
    pub fn disassemble(&self, pool: &StringPool) -> String {
        let mut result = String::new();
        for (position, instruction) in self.instructions.iter().enumerate() {
            let operand = match instruction {
                Instruction::Push(Value::String(symbol)) => format!(" \"{}\"", pool.resolve(*symbol)),
                Instruction::Push(Value::Integer(value)) => format!(" {}", value),
                Instruction::Push(value) => format!(" {:?}", value),
                Instruction::MakeTuple(length) => format!(" {}", length),
                Instruction::Bind(symbol) | Instruction::UpdateBinding(symbol) => {
                    format!(" {}", pool.resolve(*symbol))
                },
                _ => String::new(),
            };
            result.push_str(&format!("{:03} {}{}\n", position, instruction.mnemonic(), operand));
        }

        result
    }
}

/// Lowers statements into `Program`s. Every compiled expression leaves
/// exactly one value on the operand stack, every compiled statement leaves
/// the stack as it found it.
#[derive(Debug)]
pub struct Compiler {
    program: Program,
}

impl Compiler {
    pub fn new() -> Self {
        Self{ program: Program::default() }
    }

    pub fn compile_statement(&mut self, heap: &Heap, id: StatementId) -> Result<Program, EvalError> {
        self.program = Program::default();

        match &heap[id] {
            Statement::Let(stmt) => {
                self.compile_expression(heap, stmt.value)?;
                if let Some(annotation) = stmt.annotation {
                    self.compile_expression(heap, annotation)?;
                    self.emit(Instruction::ValidateType, heap[annotation].span());
                }
                self.emit(Instruction::Bind(stmt.symbol), stmt.symbol_span);
            },
            Statement::Assign(stmt) => {
                let target = match heap[stmt.left].as_variable() {
                    Some(variable) => variable,
                    None => return Err(EvalError::new_at_span(
                        EvalErrorKind::InvalidLValue, heap[stmt.left].span(),
                        String::from("invalid assignment target: only variables can be assigned to")
                    )),
                };

                self.compile_expression(heap, stmt.right)?;
                self.emit(Instruction::UpdateBinding(target.identifier), stmt.span);
            },
            Statement::Print(stmt) => {
                self.compile_expression(heap, stmt.expression)?;
                self.emit(Instruction::PopAndOutput, stmt.span);
            },
            Statement::Expression(stmt) => {
                self.compile_expression(heap, stmt.expression)?;
                self.emit(Instruction::PopAndDiscard, stmt.span);
            },
        }

        Ok(std::mem::take(&mut self.program))
    }

    fn compile_expression(&mut self, heap: &Heap, id: ExpressionId) -> Result<(), EvalError> {
        let expression = &heap[id];
        let span = expression.span();
        match expression {
            Expression::Literal(expr) => {
                let value = match expr.value {
                    Literal::Integer(value) => Value::Integer(value),
                    Literal::String(value) => Value::String(value),
                };
                self.emit(Instruction::Push(value), span);
            },
            Expression::Variable(expr) => {
                self.emit(Instruction::Push(Value::String(expr.identifier)), span);
                self.emit(Instruction::PopAndLookup, span);
            },
            Expression::Tuple(expr) => {
                for element in &expr.elements {
                    self.compile_expression(heap, *element)?;
                }
                let length = u32::try_from(expr.elements.len())
                    .map_err(|_| EvalError::internal("tuple has too many elements").with_span(span))?;
                self.emit(Instruction::MakeTuple(length), span);
            },
            Expression::TypeOf(expr) => {
                self.compile_expression(heap, expr.subject)?;
                self.emit(Instruction::TypeOf, span);
            },
        }

        Ok(())
    }

    fn emit(&mut self, instruction: Instruction, span: InputSpan) {
        self.program.instructions.push(instruction);
        self.program.spans.push(span);
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
