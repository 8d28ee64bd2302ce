use std::collections::HashMap;
use std::fmt;

/// Handle to a string interned in a `StringPool`. Two symbols produced by the
/// same pool are equal if and only if their text is equal, so comparing them
/// never looks at the text itself.
///
/// There is deliberately no public constructor: the only way to obtain a
/// `Symbol` is to intern something.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sym#{}", self.0)
    }
}

/// StringPool is an ever-growing pool of strings. Interned strings are never
/// removed, a `Symbol` stays valid for as long as the pool lives.
#[derive(Default)]
pub struct StringPool {
    strings: Vec<Box<str>>,
    lookup: HashMap<Box<str>, Symbol>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string, returning the symbol of an earlier string with the
    /// same contents if there is one.
    pub fn intern(&mut self, data: &str) -> Symbol {
        if let Some(symbol) = self.lookup.get(data) {
            return *symbol;
        }

        assert!(self.strings.len() < u32::max_value() as usize, "string pool is full");
        let symbol = Symbol(self.strings.len() as u32);
        self.strings.push(Box::from(data));
        self.lookup.insert(Box::from(data), symbol);
        symbol
    }

    /// Interns raw bytes coming from the source file. Invalid UTF-8 is
    /// replaced rather than rejected, the tokenizer only passes on ASCII.
    pub(crate) fn intern_bytes(&mut self, data: &[u8]) -> Symbol {
        match std::str::from_utf8(data) {
            Ok(text) => self.intern(text),
            Err(_) => self.intern(&String::from_utf8_lossy(data)),
        }
    }

    /// Returns the symbol of `data` if it was interned before, without
    /// interning it.
    pub fn get(&self, data: &str) -> Option<Symbol> {
        self.lookup.get(data).copied()
    }

    pub fn resolve(&self, symbol: Symbol) -> &str {
        &self.strings[symbol.index()]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl fmt::Debug for StringPool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StringPool").field("num_strings", &self.strings.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_contents_share_symbol() {
        let mut pool = StringPool::new();
        let first = pool.intern("foo");
        let owned = String::from("fo") + "o";
        let second = pool.intern(&owned);
        assert_eq!(first, second);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.resolve(first), "foo");
    }

    #[test]
    fn test_different_contents_differ() {
        let mut pool = StringPool::new();
        let a = pool.intern("a");
        let b = pool.intern("b");
        let empty = pool.intern("");
        assert_ne!(a, b);
        assert_ne!(a, empty);
        assert_eq!(pool.resolve(empty), "");
        assert_eq!(pool.get("b"), Some(b));
        assert_eq!(pool.get("c"), None);
    }

    #[test]
    fn test_lots_of_small_allocations() {
        const NUM_STRINGS: usize = 1024;

        let mut pool = StringPool::new();
        let mut all_refs = Vec::with_capacity(NUM_STRINGS);
        for idx in 0..NUM_STRINGS {
            all_refs.push(pool.intern(&format!("string_{}", idx)));
        }

        // Interning again doesn't grow the pool, and all strings are intact
        for (idx, symbol) in all_refs.iter().enumerate() {
            let text = format!("string_{}", idx);
            assert_eq!(pool.intern(&text), *symbol);
            assert_eq!(pool.resolve(*symbol), text);
        }
        assert_eq!(pool.len(), NUM_STRINGS);
    }
}
