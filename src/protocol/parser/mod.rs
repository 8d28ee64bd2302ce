use crate::collections::StringPool;
use crate::protocol::ast::*;
use crate::protocol::input_source::{InputSource, InputSpan, ParseError, ParseErrorKind};
use crate::protocol::lexer::{Lexer, Token, TokenKind};

/// Everything a parsing function needs to touch, bundled to keep the
/// signatures readable.
pub(crate) struct ParseCtx<'a> {
    pub source: &'a mut InputSource,
    pub pool: &'a mut StringPool,
    pub heap: &'a mut Heap,
}

/// Recursive descent parser producing one top-level statement at a time.
/// The grammar is:
///
/// ```text
/// statement  := 'let' SYMBOL [':' [expression]] '=' expression ';'
///             | 'print' expression ';'
///             | expression '=' expression ';'
///             | expression ';'
/// expression := 'typeof' expression
///             | '(' ')'
///             | '(' expression ')'
///             | '(' expression ',' [expression {',' expression} [',']] ')'
///             | SYMBOL | INTEGER | STRING
/// ```
pub struct Parser {
    lexer: Lexer,
    peeked: Option<Token>,
}

impl Parser {
    pub fn new() -> Self {
        Self{
            lexer: Lexer::new(),
            peeked: None,
        }
    }

    /// Parses the next statement into the heap. Returns `None` once the end
    /// of the input is reached.
    pub(crate) fn parse_statement(&mut self, ctx: &mut ParseCtx) -> Result<Option<StatementId>, ParseError> {
        let first = self.peek(ctx)?;
        let statement_id = match first.kind {
            TokenKind::Eof => return Ok(None),
            TokenKind::Let => self.parse_let_statement(ctx)?,
            TokenKind::Print => {
                self.consume(ctx)?;
                let expression = self.parse_expression(ctx)?;
                let end = self.expect(ctx, TokenKind::SemiColon)?;
                let span = first.span.to(end.span);
                ctx.heap.alloc_statement(|this| Statement::Print(PrintStatement{
                    this, span, expression
                }))
            },
            _ => {
                let left = self.parse_expression(ctx)?;
                if self.maybe_consume(ctx, TokenKind::Equal)?.is_some() {
                    let right = self.parse_expression(ctx)?;
                    let end = self.expect(ctx, TokenKind::SemiColon)?;
                    let span = first.span.to(end.span);
                    ctx.heap.alloc_statement(|this| Statement::Assign(AssignStatement{
                        this, span, left, right
                    }))
                } else {
                    let end = self.expect(ctx, TokenKind::SemiColon)?;
                    let span = first.span.to(end.span);
                    ctx.heap.alloc_statement(|this| Statement::Expression(ExpressionStatement{
                        this, span, expression: left
                    }))
                }
            }
        };

        Ok(Some(statement_id))
    }

    fn parse_let_statement(&mut self, ctx: &mut ParseCtx) -> Result<StatementId, ParseError> {
        let let_token = self.expect(ctx, TokenKind::Let)?;

        let symbol_token = self.consume(ctx)?;
        let symbol = match symbol_token.kind {
            TokenKind::Ident(symbol) => symbol,
            _ => return Err(unexpected_token(ctx, &symbol_token, "a symbol to bind")),
        };

        // Annotation: the colon is optional, and may be followed directly by
        // the '=' to explicitly request inference.
        let mut annotation = None;
        if self.maybe_consume(ctx, TokenKind::Colon)?.is_some() {
            if self.peek(ctx)?.kind != TokenKind::Equal {
                annotation = Some(self.parse_expression(ctx)?);
            }
        }

        self.expect(ctx, TokenKind::Equal)?;
        let value = self.parse_expression(ctx)?;
        let end = self.expect(ctx, TokenKind::SemiColon)?;

        let span = let_token.span.to(end.span);
        Ok(ctx.heap.alloc_statement(|this| Statement::Let(LetStatement{
            this, span, symbol, symbol_span: symbol_token.span, annotation, value
        })))
    }

    fn parse_expression(&mut self, ctx: &mut ParseCtx) -> Result<ExpressionId, ParseError> {
        if let Some(keyword) = self.maybe_consume(ctx, TokenKind::TypeOf)? {
            let subject = self.parse_expression(ctx)?;
            let span = keyword.span.to(ctx.heap[subject].span());
            return Ok(ctx.heap.alloc_expression(|this| Expression::TypeOf(TypeOfExpression{
                this, span, subject
            })));
        }

        if self.peek(ctx)?.kind == TokenKind::OpenParen {
            return self.parse_parenthesized(ctx);
        }

        self.parse_atom(ctx)
    }

    /// Parses either an empty tuple, a parenthesized expression or a tuple
    /// with at least one element. A single element followed by a comma is a
    /// one-tuple.
    fn parse_parenthesized(&mut self, ctx: &mut ParseCtx) -> Result<ExpressionId, ParseError> {
        let open = self.expect(ctx, TokenKind::OpenParen)?;
        if let Some(close) = self.maybe_consume(ctx, TokenKind::CloseParen)? {
            let span = open.span.to(close.span);
            return Ok(ctx.heap.alloc_expression(|this| Expression::Tuple(TupleExpression{
                this, span, elements: Vec::new()
            })));
        }

        let first = self.parse_expression(ctx)?;
        if self.maybe_consume(ctx, TokenKind::Comma)?.is_none() {
            // Just a parenthesized expression
            self.expect_close(ctx, open)?;
            return Ok(first);
        }

        let mut elements = vec![first];
        let close = loop {
            if let Some(close) = self.maybe_consume(ctx, TokenKind::CloseParen)? {
                break close;
            }
            elements.push(self.parse_expression(ctx)?);
            if self.maybe_consume(ctx, TokenKind::Comma)?.is_none() {
                break self.expect_close(ctx, open)?;
            }
        };

        let span = open.span.to(close.span);
        Ok(ctx.heap.alloc_expression(|this| Expression::Tuple(TupleExpression{
            this, span, elements
        })))
    }

    fn parse_atom(&mut self, ctx: &mut ParseCtx) -> Result<ExpressionId, ParseError> {
        let token = self.consume(ctx)?;
        let span = token.span;
        let expression = match token.kind {
            TokenKind::Ident(identifier) => ctx.heap.alloc_expression(|this| Expression::Variable(VariableExpression{
                this, span, identifier
            })),
            TokenKind::Integer(value) => ctx.heap.alloc_expression(|this| Expression::Literal(LiteralExpression{
                this, span, value: Literal::Integer(value)
            })),
            TokenKind::String(value) => ctx.heap.alloc_expression(|this| Expression::Literal(LiteralExpression{
                this, span, value: Literal::String(value)
            })),
            _ => return Err(unexpected_token(ctx, &token, "an expression")),
        };

        Ok(expression)
    }

    // --- Token handling

    fn peek(&mut self, ctx: &mut ParseCtx) -> Result<Token, ParseError> {
        if let Some(token) = self.peeked {
            return Ok(token);
        }

        let token = self.lexer.next_token(ctx.source, ctx.pool)?;
        self.peeked = Some(token);
        Ok(token)
    }

    fn consume(&mut self, ctx: &mut ParseCtx) -> Result<Token, ParseError> {
        let token = self.peek(ctx)?;
        // Keep returning the end-of-file token once we reach it
        if token.kind != TokenKind::Eof {
            self.peeked = None;
        }
        Ok(token)
    }

    fn maybe_consume(&mut self, ctx: &mut ParseCtx, kind: TokenKind) -> Result<Option<Token>, ParseError> {
        if self.peek(ctx)?.kind == kind {
            return Ok(Some(self.consume(ctx)?));
        }
        Ok(None)
    }

    fn expect(&mut self, ctx: &mut ParseCtx, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.peek(ctx)?;
        if token.kind != kind {
            return Err(unexpected_token(ctx, &token, kind.describe()));
        }
        self.consume(ctx)
    }

    fn expect_close(&mut self, ctx: &mut ParseCtx, open: Token) -> Result<Token, ParseError> {
        self.expect(ctx, TokenKind::CloseParen).map_err(|error| {
            error.with_info_str_at_span(&*ctx.source, open.span, "parenthesis opened here")
        })
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected_token(ctx: &ParseCtx, token: &Token, expected: &str) -> ParseError {
    let message = format!("expected {}, got {}", expected, token.kind);
    let span = error_span(token.span);
    ParseError::new_error_at_span(ParseErrorKind::Syntax, &*ctx.source, span, message)
}

// The end-of-file token has an empty span, widen it so it can be underlined.
fn error_span(span: InputSpan) -> InputSpan {
    if span.begin.offset == span.end.offset {
        InputSpan::from_positions(span.begin, span.end.with_offset(1))
    } else {
        span
    }
}
