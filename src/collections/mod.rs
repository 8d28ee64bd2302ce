mod string_pool;

pub use string_pool::{StringPool, Symbol};
