use std::fmt;
use std::fmt::Write;

use super::collector::{Collector, Handle};
use super::error::EvalError;
use crate::collections::{StringPool, Symbol};

/// The primitive classification of a value. Only `Reference` values are
/// further classified, by their `ObjectKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValueKind {
    #[display(fmt = "int")]
    Integer,
    #[display(fmt = "string")]
    String,
    #[display(fmt = "type")]
    Type,
    #[display(fmt = "reference")]
    Reference,
}

/// The kind of heap object a reference points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ObjectKind {
    #[display(fmt = "tuple")]
    Tuple,
    // Reserved for class instances. Nothing constructs these yet, the type
    // checking functions report an internal error when they encounter one.
    #[display(fmt = "instance")]
    Instance,
}

/// Structural type descriptor. Works as a cascade: only references carry an
/// object annotation, and only instance annotations carry a class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeAnnotation {
    Integer,
    String,
    Type,
    Reference(ObjectAnnotation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectAnnotation {
    Tuple,
    Instance(Symbol), // class name
}

impl TypeAnnotation {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            TypeAnnotation::Integer => ValueKind::Integer,
            TypeAnnotation::String => ValueKind::String,
            TypeAnnotation::Type => ValueKind::Type,
            TypeAnnotation::Reference(_) => ValueKind::Reference,
        }
    }

    /// Writes the type name as a user would write it in an annotation.
    pub(crate) fn write_name(&self, pool: &StringPool, target: &mut String) {
        match self {
            TypeAnnotation::Integer => target.push_str("int"),
            TypeAnnotation::String => target.push_str("string"),
            TypeAnnotation::Type => target.push_str("type"),
            TypeAnnotation::Reference(ObjectAnnotation::Tuple) => target.push_str("tuple"),
            TypeAnnotation::Reference(ObjectAnnotation::Instance(class_name)) => {
                target.push_str(pool.resolve(*class_name))
            },
        }
    }

    pub(crate) fn name(&self, pool: &StringPool) -> String {
        let mut name = String::new();
        self.write_name(pool, &mut name);
        name
    }
}

/// A reference to an object owned by the `Collector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    pub kind: ObjectKind,
    pub handle: Handle,
}

impl Reference {
    pub(crate) fn tuple(handle: Handle) -> Self {
        Reference{ kind: ObjectKind::Tuple, handle }
    }

    fn annotation(&self) -> Result<ObjectAnnotation, EvalError> {
        match self.kind {
            ObjectKind::Tuple => Ok(ObjectAnnotation::Tuple),
            ObjectKind::Instance => Err(EvalError::internal(
                "cannot annotate a class instance: instances are not implemented"
            )),
        }
    }

    fn validate_type(&self, expected: &ObjectAnnotation) -> Result<bool, EvalError> {
        match (self.kind, expected) {
            (ObjectKind::Tuple, ObjectAnnotation::Tuple) => Ok(true),
            (ObjectKind::Tuple, ObjectAnnotation::Instance(_)) => Ok(false),
            (ObjectKind::Instance, ObjectAnnotation::Tuple) => Ok(false),
            (ObjectKind::Instance, ObjectAnnotation::Instance(_)) => Err(EvalError::internal(
                "cannot compare class instances: instances are not implemented"
            )),
        }
    }
}

/// Represents a pass-by-value value. Values are copied around freely, the
/// only aliasing happens through `Reference`s into the collector's heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Integer(i32),
    // Always interned: a `Symbol` can only be obtained from the string pool
    String(Symbol),
    Type(TypeAnnotation),
    Reference(Reference),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::String(_) => ValueKind::String,
            Value::Type(_) => ValueKind::Type,
            Value::Reference(_) => ValueKind::Reference,
        }
    }

    /// Returns the structural type of the value, this is what `typeof`
    /// produces.
    pub fn annotation(&self) -> Result<TypeAnnotation, EvalError> {
        let annotation = match self {
            Value::Integer(_) => TypeAnnotation::Integer,
            Value::String(_) => TypeAnnotation::String,
            Value::Type(_) => TypeAnnotation::Type,
            Value::Reference(reference) => TypeAnnotation::Reference(reference.annotation()?),
        };

        Ok(annotation)
    }

    /// Checks whether the value conforms to the expected type. Primitive
    /// values must match the value kind exactly, references must match the
    /// expected object kind.
    pub fn validate_type(&self, expected: &TypeAnnotation) -> Result<bool, EvalError> {
        match self {
            Value::Reference(reference) => match expected {
                TypeAnnotation::Reference(object) => reference.validate_type(object),
                _ => Ok(false),
            },
            _ => Ok(self.kind() == expected.value_kind()),
        }
    }

    pub(crate) fn as_string(&self) -> Option<Symbol> {
        match self {
            Value::String(symbol) => Some(*symbol),
            _ => None,
        }
    }

    pub(crate) fn as_type(&self) -> Option<TypeAnnotation> {
        match self {
            Value::Type(annotation) => Some(*annotation),
            _ => None,
        }
    }

    /// Renders the value the way `print` shows it.
    pub fn render(&self, pool: &StringPool, heap: &Collector) -> Result<String, EvalError> {
        let mut target = String::with_capacity(16);
        self.write_rendered(pool, heap, &mut target)?;
        Ok(target)
    }

    // Tuples are rendered using an explicit stack of pending values and
    // punctuation, so arbitrarily deep nesting cannot overflow the stack.
    fn write_rendered(&self, pool: &StringPool, heap: &Collector, target: &mut String) -> Result<(), EvalError> {
        let mut pending = vec![Pending::Value(*self)];
        while let Some(item) = pending.pop() {
            let value = match item {
                Pending::Text(text) => {
                    target.push_str(text);
                    continue;
                },
                Pending::Value(value) => value,
            };

            match value {
                Value::Integer(v) => {
                    let _ = write!(target, "{}", v);
                },
                Value::String(v) => target.push_str(pool.resolve(v)),
                Value::Type(annotation) => {
                    target.push_str("<type ");
                    annotation.write_name(pool, target);
                    target.push('>');
                },
                Value::Reference(reference) => match reference.kind {
                    ObjectKind::Tuple => {
                        let elements = heap.tuple_elements(reference.handle)?;
                        target.push('(');
                        pending.push(Pending::Text(")"));
                        for (idx, element) in elements.iter().enumerate().rev() {
                            pending.push(Pending::Value(*element));
                            if idx != 0 {
                                pending.push(Pending::Text(", "));
                            }
                        }
                    },
                    ObjectKind::Instance => {
                        let _ = write!(target, "<{} at {:?}>", reference.kind, reference.handle);
                    },
                },
            }
        }

        Ok(())
    }
}

enum Pending {
    Value(Value),
    Text(&'static str),
}

impl fmt::Display for TypeAnnotation {
    /// Formats without access to the string pool, so class names show up
    /// as their symbol. Use `name` to get the user-facing name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAnnotation::Reference(ObjectAnnotation::Instance(class_name)) => {
                write!(f, "instance {:?}", class_name)
            },
            TypeAnnotation::Reference(ObjectAnnotation::Tuple) => f.write_str("tuple"),
            _ => write!(f, "{}", self.value_kind()),
        }
    }
}
