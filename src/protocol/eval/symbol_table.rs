use crate::collections::{StringPool, Symbol};
use super::value::{ObjectAnnotation, TypeAnnotation, Value};

/// The single global scope: a mapping from variable name to its current
/// value. Stored as two parallel vectors; lookups are linear, which is fine
/// for the number of bindings a script produces.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    values: Vec<Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self{
            symbols: Vec::with_capacity(32),
            values: Vec::with_capacity(32),
        }
    }

    /// Creates a table with the builtin type names already bound, such that
    /// they can be used in annotations.
    pub fn with_builtins(pool: &mut StringPool) -> Self {
        let mut table = Self::new();
        table.set(pool.intern("int"), Value::Type(TypeAnnotation::Integer));
        table.set(pool.intern("string"), Value::Type(TypeAnnotation::String));
        table.set(pool.intern("type"), Value::Type(TypeAnnotation::Type));
        table.set(pool.intern("tuple"), Value::Type(TypeAnnotation::Reference(ObjectAnnotation::Tuple)));
        table
    }

    /// Returns the index of the binding for the symbol, if any.
    pub fn find(&self, symbol: Symbol) -> Option<usize> {
        self.symbols.iter().position(|s| *s == symbol)
    }

    pub fn get(&self, symbol: Symbol) -> Option<Value> {
        self.find(symbol).map(|index| self.values[index])
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.find(symbol).is_some()
    }

    /// Binds or rebinds the symbol. Whether a (re)binding is allowed is
    /// decided by the VM, not here.
    pub fn set(&mut self, symbol: Symbol, value: Value) {
        match self.find(symbol) {
            Some(index) => self.values[index] = value,
            None => {
                self.symbols.push(symbol);
                self.values.push(value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Value)> + '_ {
        self.symbols.iter().copied().zip(self.values.iter())
    }
}
