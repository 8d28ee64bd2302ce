use std::fmt;

use super::error::EvalError;
use super::symbol_table::SymbolTable;
use super::value::{ObjectKind, Value};

/// Handle to an object owned by the collector. Slots are reused after an
/// object is swept, the generation distinguishes the old and new occupant so
/// a stale handle is detected instead of silently aliasing.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}.{}", self.index, self.generation)
    }
}

/// Objects living on the collected heap. A tuple consists of two separate
/// allocations: the tuple header and the buffer holding its elements.
#[derive(Debug, Clone)]
pub enum HeapObject {
    Tuple(TupleObject),
    Buffer(Vec<Value>),
}

#[derive(Debug, Clone, Copy)]
pub struct TupleObject {
    pub length: usize,
    pub elements: Handle, // points to a `HeapObject::Buffer`
}

#[derive(Debug)]
struct Allocation {
    marked: bool,
    object: HeapObject,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    allocation: Option<Allocation>,
}

/// Result of a single collection cycle, in number of registered allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
    pub before: usize,
    pub after: usize,
}

impl CollectionStats {
    pub fn freed(&self) -> usize {
        self.before - self.after
    }
}

/// Mark-and-sweep collector. Keeps a registry of every live allocation; an
/// allocation is reclaimed by the first sweep during which it is unmarked.
#[derive(Debug)]
pub struct Collector {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    registry: Vec<Handle>,
}

impl Collector {
    pub fn new() -> Self {
        Self{
            slots: Vec::with_capacity(64),
            free_slots: Vec::new(),
            registry: Vec::with_capacity(64),
        }
    }

    /// Number of registered (i.e. not yet swept) allocations.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Registers a new object. Objects start out unmarked.
    pub fn alloc(&mut self, object: HeapObject) -> Handle {
        let allocation = Some(Allocation{ marked: false, object });
        let handle = match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                debug_assert!(slot.allocation.is_none());
                slot.allocation = allocation;
                Handle{ index, generation: slot.generation }
            },
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot{ generation: 0, allocation });
                Handle{ index, generation: 0 }
            }
        };

        self.registry.push(handle);
        handle
    }

    /// Allocates the element buffer and the tuple header pointing to it,
    /// returns the handle to the header.
    pub fn alloc_tuple(&mut self, elements: Vec<Value>) -> Handle {
        let length = elements.len();
        let buffer = self.alloc(HeapObject::Buffer(elements));
        self.alloc(HeapObject::Tuple(TupleObject{ length, elements: buffer }))
    }

    pub fn get(&self, handle: Handle) -> Result<&HeapObject, EvalError> {
        self.allocation(handle).map(|allocation| &allocation.object)
    }

    pub fn tuple_elements(&self, handle: Handle) -> Result<&[Value], EvalError> {
        let tuple = match self.get(handle)? {
            HeapObject::Tuple(tuple) => *tuple,
            HeapObject::Buffer(_) => return Err(EvalError::internal("tuple reference points to a buffer")),
        };

        match self.get(tuple.elements)? {
            HeapObject::Buffer(elements) => {
                debug_assert_eq!(elements.len(), tuple.length);
                Ok(elements)
            },
            HeapObject::Tuple(_) => Err(EvalError::internal("tuple elements point to another tuple")),
        }
    }

    pub fn is_marked(&self, handle: Handle) -> Result<bool, EvalError> {
        self.allocation(handle).map(|allocation| allocation.marked)
    }

    pub fn unmark_all(&mut self) {
        for handle in &self.registry {
            if let Some(allocation) = &mut self.slots[handle.index as usize].allocation {
                allocation.marked = false;
            }
        }
    }

    /// Marks a single allocation. Returns whether it was unmarked before,
    /// i.e. whether the caller should trace through it.
    pub fn mark(&mut self, handle: Handle) -> Result<bool, EvalError> {
        let allocation = self.allocation_mut(handle)?;
        let newly_marked = !allocation.marked;
        allocation.marked = true;
        Ok(newly_marked)
    }

    /// Marks everything reachable from the value. Tuples are traced using an
    /// explicit worklist so deeply nested tuples cannot overflow the stack.
    pub fn mark_value(&mut self, value: &Value) -> Result<(), EvalError> {
        let mut worklist = vec![*value];
        while let Some(value) = worklist.pop() {
            let reference = match value {
                Value::Reference(reference) => reference,
                _ => continue,
            };

            match reference.kind {
                ObjectKind::Tuple => {
                    if !self.mark(reference.handle)? {
                        continue;
                    }

                    let elements = match self.get(reference.handle)? {
                        HeapObject::Tuple(tuple) => tuple.elements,
                        HeapObject::Buffer(_) => return Err(EvalError::internal("tuple reference points to a buffer")),
                    };
                    self.mark(elements)?;
                    if let HeapObject::Buffer(values) = self.get(elements)? {
                        worklist.extend(values.iter().copied());
                    }
                },
                ObjectKind::Instance => {
                    return Err(EvalError::internal("cannot mark a class instance: instances are not implemented"));
                }
            }
        }

        Ok(())
    }

    /// Destroys every unmarked allocation and rebuilds the registry from the
    /// survivors. Marks are left as they are.
    pub fn collect_unmarked(&mut self) -> CollectionStats {
        let before = self.registry.len();
        let slots = &mut self.slots;
        let free_slots = &mut self.free_slots;
        self.registry.retain(|handle| {
            let slot = &mut slots[handle.index as usize];
            let marked = slot.allocation.as_ref().map(|a| a.marked).unwrap_or(false);
            if !marked {
                slot.allocation = None;
                slot.generation = slot.generation.wrapping_add(1);
                free_slots.push(handle.index);
            }
            marked
        });

        CollectionStats{ before, after: self.registry.len() }
    }

    /// Performs a full collection cycle using the values bound in the symbol
    /// table as the roots.
    pub fn collect(&mut self, roots: &SymbolTable) -> Result<CollectionStats, EvalError> {
        self.unmark_all();
        for (_, value) in roots.iter() {
            self.mark_value(value)?;
        }

        Ok(self.collect_unmarked())
    }

    /// Destroys all allocations regardless of reachability, used at shutdown.
    /// Returns the number of destroyed allocations.
    pub fn destroy_everything(&mut self) -> usize {
        self.unmark_all();
        self.collect_unmarked().freed()
    }

    fn allocation(&self, handle: Handle) -> Result<&Allocation, EvalError> {
        self.slots.get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.allocation.as_ref())
            .ok_or_else(|| EvalError::internal("dangling reference into the collected heap"))
    }

    fn allocation_mut(&mut self, handle: Handle) -> Result<&mut Allocation, EvalError> {
        self.slots.get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.allocation.as_mut())
            .ok_or_else(|| EvalError::internal("dangling reference into the collected heap"))
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
