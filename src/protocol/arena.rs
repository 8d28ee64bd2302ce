use core::hash::Hash;
use core::marker::PhantomData;

/// Typed index into an `Arena<T>`. Only meaningful for the arena that
/// produced it.
#[derive(Debug)]
pub struct Id<T> {
    index: u32,
    _phantom: PhantomData<T>,
}
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Id<T> {}
impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index.eq(&other.index)
    }
}
impl<T> Eq for Id<T> {}
impl<T> Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, h: &mut H) {
        self.index.hash(h);
    }
}
impl<T> Id<T> {
    pub(crate) fn index(&self) -> u32 {
        self.index
    }
}

/// Append-only storage for AST nodes. Nodes are dropped all at once with
/// `clear`, which invalidates every `Id` handed out before.
#[derive(Debug)]
pub struct Arena<T> {
    store: Vec<T>,
}
impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { store: vec![] }
    }
    pub fn alloc_with_id(&mut self, f: impl FnOnce(Id<T>) -> T) -> Id<T> {
        use std::convert::TryFrom;
        let id = Id {
            index: u32::try_from(self.store.len()).expect("Out of capacity!"),
            _phantom: Default::default(),
        };
        self.store.push(f(id));
        id
    }
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        (0..).map(|index| Id { index, _phantom: Default::default() }).zip(self.store.iter())
    }
    pub fn len(&self) -> usize {
        self.store.len()
    }
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
    pub fn clear(&mut self) {
        self.store.clear();
    }
}
impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T> core::ops::Index<Id<T>> for Arena<T> {
    type Output = T;
    fn index(&self, id: Id<T>) -> &Self::Output {
        self.store.index(id.index as usize)
    }
}
impl<T> core::ops::IndexMut<Id<T>> for Arena<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut Self::Output {
        self.store.index_mut(id.index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_index() {
        let mut arena = Arena::new();
        let first = arena.alloc_with_id(|id| (id.index(), "first"));
        let second = arena.alloc_with_id(|id| (id.index(), "second"));
        assert_ne!(first, second);
        assert_eq!(arena[first], (0, "first"));
        assert_eq!(arena[second], (1, "second"));

        arena[second].1 = "changed";
        let collected: Vec<_> = arena.iter().map(|(_, v)| v.1).collect();
        assert_eq!(collected, vec!["first", "changed"]);
    }

    #[test]
    fn test_clear_restarts_ids() {
        let mut arena = Arena::new();
        arena.alloc_with_id(|_| 1u8);
        arena.alloc_with_id(|_| 2u8);
        assert_eq!(arena.len(), 2);
        arena.clear();
        assert!(arena.is_empty());
        let id = arena.alloc_with_id(|_| 3u8);
        assert_eq!(id.index(), 0);
    }
}
