pub mod error;
mod logging;


use crate::common::*;
use crate::protocol::ast::{Heap, StatementId};
use crate::protocol::eval::{
    Collector, CollectionStats, Compiler, EvalContext, EvalContinuation, EvalError, SymbolTable, Value, Vm,
};
use crate::protocol::parser::{ParseCtx, Parser};
use crate::protocol::InputSource;
use error::RunError;

pub trait Logger: Debug {
    fn line_writer(&mut self) -> Option<&mut dyn std::io::Write>;
}
#[derive(Debug)]
pub struct DummyLogger;
#[derive(Debug)]
pub struct VecLogger(Vec<u8>);
#[derive(Debug)]
pub struct FileLogger(std::fs::File);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    // Write the "Collected ..." line to the output after every statement
    pub report_collections: bool,
}

/// Owns everything needed to run a program: the interner, the global
/// bindings, the collected heap and the VM. Source is processed one
/// top-level statement at a time: parse, compile, execute, collect.
#[derive(Debug)]
pub struct Runtime<W: Write> {
    config: RuntimeConfig,
    logger: Box<dyn Logger>,
    output: W,
    pool: StringPool,
    symbols: SymbolTable,
    heap: Collector,
    compiler: Compiler,
    vm: Vm,
    // AST of the statement being executed, cleared before parsing the next
    ast: Heap,
    num_statements: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self{ report_collections: true }
    }
}

impl Runtime<std::io::Stdout> {
    /// Runtime writing to stdout without any logging.
    pub fn new_simple() -> Self {
        Self::new(Box::new(DummyLogger), std::io::stdout(), RuntimeConfig::default())
    }
}

impl<W: Write> Runtime<W> {
    pub fn new(mut logger: Box<dyn Logger>, output: W, config: RuntimeConfig) -> Self {
        log!(logger, "Created runtime with {:?}", &config);
        let mut pool = StringPool::new();
        let symbols = SymbolTable::with_builtins(&mut pool);
        Self{
            config,
            logger,
            output,
            pool,
            symbols,
            heap: Collector::new(),
            compiler: Compiler::new(),
            vm: Vm::new(),
            ast: Heap::new(),
            num_statements: 0,
        }
    }

    pub fn run_file(&mut self, path: &Path) -> Result<(), RunError> {
        let mut source = InputSource::from_file(path)?;
        self.run_source(&mut source)
    }

    /// Runs every statement in the source. The first error aborts the run,
    /// statements before it have already been executed.
    pub fn run_source(&mut self, source: &mut InputSource) -> Result<(), RunError> {
        log!(self.logger, "Running source '{}'", &source.filename);
        let mut parser = Parser::new();
        loop {
            self.ast.clear();
            let statement_id = {
                let mut ctx = ParseCtx{ source: &mut *source, pool: &mut self.pool, heap: &mut self.ast };
                match parser.parse_statement(&mut ctx)? {
                    Some(statement_id) => statement_id,
                    None => break,
                }
            };

            self.num_statements += 1;
            log!(self.logger, "Parsed statement {} into {} AST nodes", self.num_statements, self.ast.num_nodes());
            if let Err(error) = self.execute_statement(statement_id) {
                log!(self.logger, "Statement {} failed", self.num_statements);
                // Drop whatever the failed program left on the operand stack,
                // so the runtime can be used for another source.
                self.vm.abort();
                return Err(match error {
                    RunError::Eval(error) => RunError::Eval(error.with_source(source)),
                    error => error,
                });
            }
        }

        self.ast.clear();
        self.output.flush()?;
        log!(self.logger, "Finished source after {} statements", self.num_statements);
        Ok(())
    }

    fn execute_statement(&mut self, statement_id: StatementId) -> Result<(), RunError> {
        let span = self.ast[statement_id].span();
        let attach_span = |error: EvalError| error.with_span(span);

        let program = self.compiler.compile_statement(&self.ast, statement_id).map_err(attach_span)?;
        log!(self.logger, "Compiled statement {} into {} instructions", self.num_statements, program.len());
        vmlog!(self.logger, "Program:\n{}", program.disassemble(&self.pool));
        self.vm.prime(program).map_err(attach_span)?;

        let mut ctx = EvalContext{
            pool: &self.pool,
            symbols: &mut self.symbols,
            heap: &mut self.heap,
            logger: &mut *self.logger,
        };
        loop {
            match self.vm.step(&mut ctx).map_err(attach_span)? {
                EvalContinuation::Stepping => {},
                EvalContinuation::Output(line) => writeln!(self.output, "{}", line)?,
                EvalContinuation::Halted => break,
            }
        }
        log!(self.logger, "VM halted, {} bindings", self.symbols.len());

        let stats = self.collect_garbage().map_err(attach_span)?;
        if self.config.report_collections {
            writeln!(self.output, "Collected {}; from {} to {}", stats.freed(), stats.before, stats.after)?;
        }

        Ok(())
    }

    /// Runs a full collection cycle rooted at the global bindings.
    pub fn collect_garbage(&mut self) -> Result<CollectionStats, EvalError> {
        let stats = self.heap.collect(&self.symbols)?;
        log!(
            self.logger,
            "Collected {} allocations, registry went from {} to {}",
            stats.freed(), stats.before, stats.after
        );
        Ok(stats)
    }

    /// Tears down the collected heap regardless of reachability. Bindings to
    /// heap objects are dangling afterwards, so this is the last thing to do
    /// with a runtime.
    pub fn destroy_everything(&mut self) -> usize {
        let num_destroyed = self.heap.destroy_everything();
        log!(self.logger, "Destroyed {} remaining allocations", num_destroyed);
        num_destroyed
    }

    /// Current value bound to the variable with the given name.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let symbol = self.pool.get(name)?;
        self.symbols.get(symbol)
    }

    pub fn render(&self, value: &Value) -> Result<String, EvalError> {
        value.render(&self.pool, &self.heap)
    }

    pub fn collector(&self) -> &Collector {
        &self.heap
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn pool(&self) -> &StringPool {
        &self.pool
    }

    pub fn num_statements(&self) -> usize {
        self.num_statements
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn get_logger(&self) -> &dyn Logger {
        &*self.logger
    }
}
