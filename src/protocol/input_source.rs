use std::fmt;
use std::fmt::Write;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPosition {
    pub line: u32,
    pub offset: u32,
}

impl InputPosition {
    pub(crate) fn with_offset(&self, offset: u32) -> Self {
        InputPosition { line: self.line, offset: self.offset + offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpan {
    pub begin: InputPosition,
    pub end: InputPosition,
}

impl InputSpan {
    #[inline]
    pub fn from_positions(begin: InputPosition, end: InputPosition) -> Self {
        Self { begin, end }
    }

    /// Span covering both `self` and `other`, assuming `self` comes first.
    #[inline]
    pub fn to(self, other: InputSpan) -> Self {
        Self { begin: self.begin, end: other.end }
    }
}

/// Wrapper around a source file with an optional filename. The source is
/// scanned exactly once by the tokenizer.
pub struct InputSource {
    pub(crate) filename: String,
    pub(crate) input: Vec<u8>,
    // Iteration
    line: u32,
    offset: usize,
    // Offset of the first character of each line, indexed by line number
    // (so index 0 is unused). Built upfront: error reporting needs it and
    // files are small.
    line_starts: Vec<u32>,
}

impl InputSource {
    pub fn new(filename: String, input: Vec<u8>) -> Self {
        let mut line_starts = Vec::with_capacity(64);
        line_starts.push(0); // line 0: never used
        line_starts.push(0); // first line: first character
        for (char_idx, c) in input.iter().enumerate() {
            if *c == b'\n' {
                line_starts.push(char_idx as u32 + 1);
            }
        }

        Self{
            filename,
            input,
            line: 1,
            offset: 0,
            line_starts,
        }
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let input = std::fs::read(path)?;
        Ok(Self::new(path.to_string_lossy().to_string(), input))
    }

    #[cfg(test)]
    pub fn new_test(input: &str) -> Self {
        let bytes = Vec::from(input.as_bytes());
        return Self::new(String::from("test"), bytes)
    }

    #[inline]
    pub fn pos(&self) -> InputPosition {
        InputPosition { line: self.line, offset: self.offset as u32 }
    }

    pub fn next(&self) -> Option<u8> {
        if self.offset < self.input.len() {
            Some(self.input[self.offset])
        } else {
            None
        }
    }

    pub fn lookahead(&self, offset: usize) -> Option<u8> {
        let offset_pos = self.offset + offset;
        if offset_pos < self.input.len() {
            Some(self.input[offset_pos])
        } else {
            None
        }
    }

    #[inline]
    pub fn section_at_pos(&self, start: InputPosition, end: InputPosition) -> &[u8] {
        &self.input[start.offset as usize..end.offset as usize]
    }

    // Consumes the next character, keeping track of the line number for
    // error reporting.
    pub fn consume(&mut self) {
        match self.next() {
            Some(b'\n') => {
                self.line += 1;
                self.offset += 1;
            },
            Some(_) => {
                self.offset += 1;
            }
            None => {}
        }

        debug_assert!(self.offset < u32::max_value() as usize);
    }

    /// Retrieves offset at which line starts (right after newline)
    fn lookup_line_start_offset(&self, line_number: u32) -> u32 {
        self.line_starts[line_number as usize]
    }

    /// Retrieves offset at which line ends (at the newline character or the
    /// preceding carriage feed for \r\n-encoded newlines)
    fn lookup_line_end_offset(&self, line_number: u32) -> u32 {
        let mut offset = match self.line_starts.get(line_number as usize + 1) {
            Some(next_line_start) => next_line_start - 1, // at the '\n'
            None => self.input.len() as u32,
        };

        if offset > 0 && self.input.get(offset as usize - 1) == Some(&b'\r') {
            offset -= 1;
        }
        offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Info,
    Error
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    SingleLine,
    MultiLine,
}

/// A single annotated message about a piece of source code. Shared between
/// parse errors and evaluation errors.
#[derive(Debug, Clone)]
pub struct ErrorStatement {
    pub(crate) statement_kind: StatementKind,
    pub(crate) context_kind: ContextKind,
    pub(crate) start_line: u32,
    pub(crate) start_column: u32,
    pub(crate) end_line: u32,
    pub(crate) end_column: u32,
    pub(crate) filename: String,
    pub(crate) context: String,
    pub(crate) message: String,
}

impl ErrorStatement {
    pub(crate) fn from_source_at_pos(statement_kind: StatementKind, source: &InputSource, position: InputPosition, message: String) -> Self {
        // Seek line start and end
        let line_start = source.lookup_line_start_offset(position.line);
        let line_end = source.lookup_line_end_offset(position.line);
        let context = Self::create_context(source, line_start as usize, line_end as usize);
        debug_assert!(position.offset >= line_start);
        let column = position.offset - line_start + 1;

        Self{
            statement_kind,
            context_kind: ContextKind::SingleLine,
            start_line: position.line,
            start_column: column,
            end_line: position.line,
            end_column: column + 1,
            filename: source.filename.clone(),
            context,
            message,
        }
    }

    pub(crate) fn from_source_at_span(statement_kind: StatementKind, source: &InputSource, span: InputSpan, message: String) -> Self {
        debug_assert!(span.end.line >= span.begin.line);
        debug_assert!(span.end.offset >= span.begin.offset);

        let first_line_start = source.lookup_line_start_offset(span.begin.line);
        let last_line_start = source.lookup_line_start_offset(span.end.line);
        let last_line_end = source.lookup_line_end_offset(span.end.line);
        let context = Self::create_context(source, first_line_start as usize, last_line_end as usize);
        debug_assert!(span.begin.offset >= first_line_start);
        let start_column = span.begin.offset - first_line_start + 1;
        let mut end_column = span.end.offset - last_line_start + 1;
        if end_column <= start_column && span.begin.line == span.end.line {
            end_column = start_column + 1;
        }

        let context_kind = if span.begin.line == span.end.line {
            ContextKind::SingleLine
        } else {
            ContextKind::MultiLine
        };

        Self{
            statement_kind,
            context_kind,
            start_line: span.begin.line,
            start_column,
            end_line: span.end.line,
            end_column,
            filename: source.filename.clone(),
            context,
            message,
        }
    }

    /// Produces context from source
    fn create_context(source: &InputSource, start: usize, end: usize) -> String {
        let end = end.max(start).min(source.input.len());
        let context_raw = &source.input[start.min(end)..end];
        String::from_utf8_lossy(context_raw).to_string()
    }
}

impl fmt::Display for ErrorStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Write kind of statement and message
        match self.statement_kind {
            StatementKind::Info => f.write_str(" INFO: ")?,
            StatementKind::Error => f.write_str("ERROR: ")?,
        }
        f.write_str(&self.message)?;
        f.write_char('\n')?;

        // Write originating file/line/column
        f.write_str(" +- ")?;
        if !self.filename.is_empty() {
            write!(f, "in {} ", self.filename)?;
        }

        match self.context_kind {
            ContextKind::SingleLine => writeln!(f, "at {}:{}", self.start_line, self.start_column),
            ContextKind::MultiLine => writeln!(
                f, "from {}:{} to {}:{}",
                self.start_line, self.start_column, self.end_line, self.end_column
            )
        }?;

        // Tabs become 4 spaces, both in the context and in the annotation
        fn transform_context(source: &str, target: &mut String) {
            for char in source.chars() {
                if char == '\t' {
                    target.push_str("    ");
                } else {
                    target.push(char);
                }
            }
        }

        fn extend_annotation(first_col: u32, last_col: u32, source: &str, target: &mut String, extend_char: char) {
            debug_assert!(first_col > 0 && last_col >= first_col);
            let mut chars = source.chars().skip(first_col as usize - 1);
            for _ in first_col..last_col {
                if chars.next() == Some('\t') {
                    for _ in 0..4 { target.push(extend_char); }
                } else {
                    target.push(extend_char);
                }
            }
        }

        writeln!(f, " | ")?;

        let mut context = String::with_capacity(128);
        let mut annotation = String::with_capacity(128);

        match self.context_kind {
            ContextKind::SingleLine => {
                // Single line of context with the offending span underlined
                transform_context(&self.context, &mut context);
                writeln!(f, " | {}", &context)?;

                annotation.push_str(" | ");
                extend_annotation(1, self.start_column, &self.context, &mut annotation, ' ');
                extend_annotation(self.start_column, self.end_column, &self.context, &mut annotation, '~');
                annotation.push('\n');

                f.write_str(&annotation)?;
            },
            ContextKind::MultiLine => {
                let mut lines = self.context.lines();
                let first_line = lines.next().unwrap_or("");
                transform_context(first_line, &mut context);
                writeln!(f, " |- {}", &context)?;

                let mut last_line = first_line;
                for cur_line in lines {
                    context.clear();
                    transform_context(cur_line, &mut context);
                    writeln!(f, " |  {}", &context)?;
                    last_line = cur_line;
                }

                annotation.push_str(" \\__");
                extend_annotation(1, self.end_column, last_line, &mut annotation, '_');
                annotation.push_str("/\n");
                f.write_str(&annotation)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ParseErrorKind {
    #[display(fmt = "lexical error")]
    Lexical,
    #[display(fmt = "syntax error")]
    Syntax,
}

/// Error produced by the tokenizer or the parser. Always carries at least one
/// statement pointing into the source.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub(crate) kind: ParseErrorKind,
    pub(crate) statements: Vec<ErrorStatement>
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{}", self.kind);
        }

        self.statements[0].fmt(f)?;
        for statement in self.statements.iter().skip(1) {
            writeln!(f)?;
            statement.fmt(f)?;
        }

        Ok(())
    }
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Message of the first (main) statement of the error.
    pub fn message(&self) -> &str {
        self.statements.first().map(|s| s.message.as_str()).unwrap_or("")
    }

    pub fn new_error_str_at_pos(kind: ParseErrorKind, source: &InputSource, position: InputPosition, message: &str) -> Self {
        Self{ kind, statements: vec!(ErrorStatement::from_source_at_pos(
            StatementKind::Error, source, position, message.to_string()
        )) }
    }

    pub fn new_error_at_span(kind: ParseErrorKind, source: &InputSource, span: InputSpan, message: String) -> Self {
        Self{ kind, statements: vec!(ErrorStatement::from_source_at_span(
            StatementKind::Error, source, span, message
        )) }
    }

    pub fn with_info_str_at_span(mut self, source: &InputSource, span: InputSpan, msg: &str) -> Self {
        self.statements.push(ErrorStatement::from_source_at_span(StatementKind::Info, source, span, msg.to_string()));
        self
    }
}
