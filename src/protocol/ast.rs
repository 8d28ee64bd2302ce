use std::ops::{Index, IndexMut};

use super::arena::{Arena, Id};
use crate::collections::Symbol;
use crate::protocol::input_source::InputSpan;

/// Helper macro that defines a type alias for a AST element ID, the Index
/// traits on the `Heap` and an allocation function.
macro_rules! define_aliased_ast_id {
    (
        $name:ident, $indexed_type:ty,
        index($indexed_arena:ident),
        alloc($fn_name:ident)
    ) => {
        pub type $name = Id<$indexed_type>;

        impl Index<$name> for Heap {
            type Output = $indexed_type;
            fn index(&self, index: $name) -> &Self::Output {
                &self.$indexed_arena[index]
            }
        }

        impl IndexMut<$name> for Heap {
            fn index_mut(&mut self, index: $name) -> &mut Self::Output {
                &mut self.$indexed_arena[index]
            }
        }

        impl Heap {
            pub fn $fn_name(&mut self, f: impl FnOnce($name) -> $indexed_type) -> $name {
                self.$indexed_arena.alloc_with_id(|id| f(id))
            }
        }
    };
}

define_aliased_ast_id!(ExpressionId, Expression, index(expressions), alloc(alloc_expression));
define_aliased_ast_id!(StatementId, Statement, index(statements), alloc(alloc_statement));

/// Storage for the AST of the statement(s) currently being processed. The
/// runtime clears it after every statement, which is all the teardown the AST
/// needs: interned strings live in the `StringPool`, not here.
#[derive(Debug)]
pub struct Heap {
    expressions: Arena<Expression>,
    statements: Arena<Statement>,
}

impl Heap {
    pub fn new() -> Heap {
        Heap{
            expressions: Arena::new(),
            statements: Arena::new(),
        }
    }

    pub fn clear(&mut self) {
        self.expressions.clear();
        self.statements.clear();
    }

    pub fn num_nodes(&self) -> usize {
        self.expressions.len() + self.statements.len()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Expressions
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Expression {
    Literal(LiteralExpression),
    Variable(VariableExpression),
    Tuple(TupleExpression),
    TypeOf(TypeOfExpression),
}

impl Expression {
    pub fn span(&self) -> InputSpan {
        match self {
            Expression::Literal(expr) => expr.span,
            Expression::Variable(expr) => expr.span,
            Expression::Tuple(expr) => expr.span,
            Expression::TypeOf(expr) => expr.span,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableExpression> {
        match self {
            Expression::Variable(expr) => Some(expr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Integer(i32),
    String(Symbol),
}

#[derive(Debug, Clone)]
pub struct LiteralExpression {
    pub this: ExpressionId,
    pub span: InputSpan,
    pub value: Literal,
}

#[derive(Debug, Clone)]
pub struct VariableExpression {
    pub this: ExpressionId,
    pub span: InputSpan,
    pub identifier: Symbol,
}

#[derive(Debug, Clone)]
pub struct TupleExpression {
    pub this: ExpressionId,
    pub span: InputSpan, // from opening to closing parenthesis
    pub elements: Vec<ExpressionId>,
}

#[derive(Debug, Clone)]
pub struct TypeOfExpression {
    pub this: ExpressionId,
    pub span: InputSpan, // including the `typeof` keyword
    pub subject: ExpressionId,
}

// -----------------------------------------------------------------------------
// Statements
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Statement {
    Let(LetStatement),
    Assign(AssignStatement),
    Print(PrintStatement),
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn span(&self) -> InputSpan {
        match self {
            Statement::Let(stmt) => stmt.span,
            Statement::Assign(stmt) => stmt.span,
            Statement::Print(stmt) => stmt.span,
            Statement::Expression(stmt) => stmt.span,
        }
    }
}

/// `let symbol [: [annotation]] = value ;`
#[derive(Debug, Clone)]
pub struct LetStatement {
    pub this: StatementId,
    pub span: InputSpan,
    pub symbol: Symbol,
    pub symbol_span: InputSpan,
    pub annotation: Option<ExpressionId>,
    pub value: ExpressionId,
}

/// `left = right ;`, the parser accepts any expression on the left, the
/// compiler is the one that rejects non-variables.
#[derive(Debug, Clone)]
pub struct AssignStatement {
    pub this: StatementId,
    pub span: InputSpan,
    pub left: ExpressionId,
    pub right: ExpressionId,
}

#[derive(Debug, Clone)]
pub struct PrintStatement {
    pub this: StatementId,
    pub span: InputSpan,
    pub expression: ExpressionId,
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub this: StatementId,
    pub span: InputSpan,
    pub expression: ExpressionId,
}
