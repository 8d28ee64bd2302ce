use crate::protocol::{
    eval::{EvalErrorKind, Value},
    input_source::*,
};
use crate::runtime::{error::RunError, DummyLogger, Runtime, RuntimeConfig};

//------------------------------------------------------------------------------
// Interface for running sources
//------------------------------------------------------------------------------

pub(crate) struct Tester {
    test_name: String,
    source: String,
    config: RuntimeConfig,
}

impl Tester {
    /// Constructs a new tester. By default the collection diagnostics are not
    /// written to the output, such that only printed values show up.
    pub(crate) fn new<T: ToString, S: ToString>(test_name: T, source: S) -> Self {
        Self{
            test_name: test_name.to_string(),
            source: source.to_string(),
            config: RuntimeConfig{ report_collections: false },
        }
    }

    /// Utility for quick tests that expect the source to run to completion.
    pub(crate) fn new_single_source_expect_ok<T: ToString, S: ToString>(test_name: T, source: S) -> RunOkTester {
        Self::new(test_name, source).run().expect_ok()
    }

    /// Utility for quick tests that expect the source to fail.
    pub(crate) fn new_single_source_expect_err<T: ToString, S: ToString>(test_name: T, source: S) -> RunErrTester {
        Self::new(test_name, source).run().expect_err()
    }

    pub(crate) fn with_collection_reports(mut self) -> Self {
        self.config.report_collections = true;
        self
    }

    pub(crate) fn run(self) -> RunTesterResult {
        let mut runtime = Runtime::new(Box::new(DummyLogger), Vec::new(), self.config);
        let mut source = InputSource::new(String::from("test"), self.source.into_bytes());
        let result = runtime.run_source(&mut source);
        let ctx = RunCtx{ test_name: self.test_name, runtime };

        match result {
            Ok(()) => RunTesterResult::Ok(RunOkTester{ ctx }),
            Err(error) => RunTesterResult::Err(RunErrTester{ ctx, error }),
        }
    }
}

pub(crate) enum RunTesterResult {
    Ok(RunOkTester),
    Err(RunErrTester),
}

impl RunTesterResult {
    pub(crate) fn expect_ok(self) -> RunOkTester {
        match self {
            RunTesterResult::Ok(v) => v,
            RunTesterResult::Err(err) => {
                println!("DEBUG: Full error:\n{}", &err.error);
                panic!(
                    "[{}] Expected run to succeed, but it failed with {}",
                    err.ctx.test_name, err.assert_postfix()
                );
            }
        }
    }

    pub(crate) fn expect_err(self) -> RunErrTester {
        match self {
            RunTesterResult::Ok(ok) => {
                panic!(
                    "[{}] Expected run to fail, but it succeeded with output {:?}",
                    ok.ctx.test_name, ok.ctx.output_lines()
                );
            },
            RunTesterResult::Err(err) => err,
        }
    }
}

// Shared by the testers for successful and failed runs: a failed run has
// still executed all statements before the failing one.
struct RunCtx {
    test_name: String,
    runtime: Runtime<Vec<u8>>,
}

impl RunCtx {
    fn output_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(self.runtime.output())
            .lines()
            .map(|line| line.to_string())
            .collect()
    }

    fn assert_output(&self, expected: &[&str]) {
        let output = self.output_lines();
        assert_eq!(
            expected, output.as_slice(),
            "[{}] Expected output {:?}, but got {:?}",
            self.test_name, expected, &output
        );
    }

    fn assert_bound(&self, name: &str, expected: &str) {
        let value = match self.runtime.lookup(name) {
            Some(value) => value,
            None => panic!("[{}] Expected '{}' to be bound, but it is not", self.test_name, name),
        };
        let rendered = self.runtime.render(&value)
            .unwrap_or_else(|e| panic!("[{}] Failed to render '{}': {}", self.test_name, name, e));
        assert_eq!(
            expected, rendered,
            "[{}] Expected '{}' to be bound to '{}', but it is bound to '{}'",
            self.test_name, name, expected, rendered
        );
    }

    fn assert_bound_value(&self, name: &str, expected: Value) {
        let value = self.runtime.lookup(name);
        assert_eq!(
            Some(expected), value,
            "[{}] Expected '{}' to be bound to {:?}, but found {:?}",
            self.test_name, name, expected, value
        );
    }

    fn assert_unbound(&self, name: &str) {
        let value = self.runtime.lookup(name);
        assert!(
            value.is_none(),
            "[{}] Expected '{}' to be unbound, but it is bound to {:?}",
            self.test_name, name, value
        );
    }

    fn assert_registry_size(&self, expected: usize) {
        let size = self.runtime.collector().len();
        assert_eq!(
            expected, size,
            "[{}] Expected {} registered allocations, but found {}",
            self.test_name, expected, size
        );
    }
}

//------------------------------------------------------------------------------
// Interface for successful runs
//------------------------------------------------------------------------------

pub(crate) struct RunOkTester {
    ctx: RunCtx,
}

impl RunOkTester {
    /// Asserts all lines written to the output, in order.
    pub(crate) fn assert_output(self, expected: &[&str]) -> Self {
        self.ctx.assert_output(expected);
        self
    }

    /// Asserts the rendered value bound to a variable.
    pub(crate) fn assert_bound(self, name: &str, expected: &str) -> Self {
        self.ctx.assert_bound(name, expected);
        self
    }

    pub(crate) fn assert_bound_value(self, name: &str, expected: Value) -> Self {
        self.ctx.assert_bound_value(name, expected);
        self
    }

    pub(crate) fn assert_same_value(self, first: &str, second: &str) -> Self {
        let first_value = self.ctx.runtime.lookup(first);
        let second_value = self.ctx.runtime.lookup(second);
        assert!(
            first_value.is_some() && first_value == second_value,
            "[{}] Expected '{}' and '{}' to be bound to the same value, but found {:?} and {:?}",
            self.ctx.test_name, first, second, first_value, second_value
        );
        self
    }

    pub(crate) fn assert_registry_size(self, expected: usize) -> Self {
        self.ctx.assert_registry_size(expected);
        self
    }
}

//------------------------------------------------------------------------------
// Interface for failed runs
//------------------------------------------------------------------------------

pub(crate) struct RunErrTester {
    ctx: RunCtx,
    error: RunError,
}

impl RunErrTester {
    pub(crate) fn assert_eval_kind(self, expected: EvalErrorKind) -> Self {
        let kind = self.error.as_eval().map(|e| e.kind());
        assert_eq!(
            Some(expected), kind,
            "[{}] Expected an evaluation error of kind '{}', but got {}",
            self.ctx.test_name, expected, self.assert_postfix()
        );
        self
    }

    pub(crate) fn assert_parse_kind(self, expected: ParseErrorKind) -> Self {
        let kind = self.error.as_parse().map(|e| e.kind());
        assert_eq!(
            Some(expected), kind,
            "[{}] Expected a parse error of kind '{}', but got {}",
            self.ctx.test_name, expected, self.assert_postfix()
        );
        self
    }

    pub(crate) fn assert_msg_has(self, msg: &str) -> Self {
        let message = self.message();
        assert!(
            message.contains(msg),
            "[{}] Expected error message to contain '{}' for {}",
            self.ctx.test_name, msg, self.assert_postfix()
        );
        self
    }

    /// Seeks the pattern in the source line shown with the error, then checks
    /// that the error points at the start of it.
    pub(crate) fn assert_occurs_at(self, pattern: &str) -> Self {
        let statement = match self.statements().first() {
            Some(statement) => statement,
            None => panic!("[{}] Expected error to point into the source for {}", self.ctx.test_name, self.assert_postfix()),
        };
        let pos = statement.context.find(pattern);
        assert!(
            pos.is_some(),
            "[{}] incorrect occurs_at: '{}' could not be found in the context for {}",
            self.ctx.test_name, pattern, self.assert_postfix()
        );
        let pos = pos.unwrap() as u32;
        assert_eq!(
            pos + 1, statement.start_column,
            "[{}] Expected error to occur at column {}, but found it at {} for {}",
            self.ctx.test_name, pos + 1, statement.start_column, self.assert_postfix()
        );
        self
    }

    /// Checks for an additional informational statement, at the given line,
    /// containing the message.
    pub(crate) fn assert_info_at(self, line: u32, msg: &str) -> Self {
        let found = self.statements().iter().skip(1).any(|statement| {
            statement.statement_kind == StatementKind::Info
                && statement.start_line == line
                && statement.message.contains(msg)
        });
        assert!(
            found,
            "[{}] Expected an info statement at line {} containing '{}' for {}",
            self.ctx.test_name, line, msg, self.assert_postfix()
        );
        self
    }

    pub(crate) fn assert_output(self, expected: &[&str]) -> Self {
        self.ctx.assert_output(expected);
        self
    }

    pub(crate) fn assert_bound(self, name: &str, expected: &str) -> Self {
        self.ctx.assert_bound(name, expected);
        self
    }

    pub(crate) fn assert_bound_value(self, name: &str, expected: Value) -> Self {
        self.ctx.assert_bound_value(name, expected);
        self
    }

    pub(crate) fn assert_unbound(self, name: &str) -> Self {
        self.ctx.assert_unbound(name);
        self
    }

    fn message(&self) -> String {
        match &self.error {
            RunError::Io(error) => error.to_string(),
            RunError::Parse(error) => error.message().to_string(),
            RunError::Eval(error) => error.message().to_string(),
        }
    }

    fn statements(&self) -> &[ErrorStatement] {
        match &self.error {
            RunError::Io(_) => &[],
            RunError::Parse(error) => &error.statements,
            RunError::Eval(error) => &error.statements,
        }
    }

    fn assert_postfix(&self) -> String {
        let kind = match &self.error {
            RunError::Io(_) => String::from("io"),
            RunError::Parse(error) => error.kind().to_string(),
            RunError::Eval(error) => error.kind().to_string(),
        };
        format!("error: [kind: {}, message: '{}']", kind, self.message())
    }
}
