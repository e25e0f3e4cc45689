//! Runtime values for the interpreter

use super::env::EnvRef;
use super::error::InterpResult;
use crate::ast::{BlockStatement, Identifier};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Native function signature
pub type BuiltinFn = fn(&[Object]) -> InterpResult<Object>;

/// Runtime value.
///
/// Aggregates are reference counted, so cloning an `Object` is cheap and two
/// clones of one array or hash are the same object for `==`.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
    Null,
    Array(Rc<Vec<Object>>),
    Hash(Rc<HashMap<HashKey, HashPair>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    /// Wraps the value of a `return` while it unwinds to the enclosing call
    ReturnValue(Box<Object>),
    Error(String),
}

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

/// Category tag used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Boolean,
    Null,
    ReturnValue,
    Error,
    Function,
    String,
    Builtin,
    Array,
    Hash,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Null => "NULL",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
            ObjectType::Function => "FUNCTION",
            ObjectType::String => "STRING",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
        };
        f.write_str(tag)
    }
}

/// User-defined closure
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    /// Environment the literal was evaluated in
    pub env: EnvRef,
}

// The captured environment usually contains the function itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Native function
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// Key of a hash entry. Equal hashable values produce equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub object_type: ObjectType,
    pub value: u64,
}

/// Hash entry; the original key is kept for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

impl Object {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Object::String(s.into())
    }

    pub fn array(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(elements))
    }

    pub fn from_bool(b: bool) -> Self {
        if b { TRUE } else { FALSE }
    }

    pub fn type_tag(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Null => ObjectType::Null,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
        }
    }

    /// Only `false` and `null` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Key for hash lookup, or `None` when the value is not hashable
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(n) => *n as u64,
            Object::Boolean(b) => u64::from(*b),
            Object::String(s) => fnv1a(s.as_bytes()),
            _ => return None,
        };
        Some(HashKey {
            object_type: self.type_tag(),
            value,
        })
    }

    /// Identity comparison used by `==` and `!=` outside the integer and
    /// string cases: scalars by value, aggregates and closures by reference.
    /// Strings are never identical here.
    pub fn is_identical(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => Rc::ptr_eq(a, b),
            (Object::Hash(a), Object::Hash(b)) => Rc::ptr_eq(a, b),
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }

    /// Strip a `ReturnValue` wrapper
    pub fn unwrap_return(self) -> Object {
        match self {
            Object::ReturnValue(inner) => *inner,
            other => other,
        }
    }
}

/// Structural equality, convenient for tests. The language's own `==` goes
/// through [`Object::is_identical`].
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{n}"),
            Object::Boolean(b) => write!(f, "{b}"),
            Object::String(s) => f.write_str(s),
            Object::Null => f.write_str("null"),
            Object::Array(elements) => {
                f.write_str("[")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str("]")
            }
            Object::Hash(pairs) => {
                f.write_str("{")?;
                for (i, pair) in pairs.values().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                f.write_str("}")
            }
            Object::Function(func) => {
                f.write_str("fn(")?;
                for (i, param) in func.parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") {}", func.body)
            }
            Object::Builtin(_) => f.write_str("builtin function"),
            Object::ReturnValue(inner) => write!(f, "{inner}"),
            Object::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!FALSE.is_truthy());
        assert!(!NULL.is_truthy());
        assert!(TRUE.is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::string("").is_truthy());
        assert!(Object::array(vec![]).is_truthy());
    }

    #[test]
    fn test_string_hash_keys() {
        let hello1 = Object::string("Hello World");
        let hello2 = Object::string("Hello World");
        let diff = Object::string("My name is johnny");
        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_ne!(hello1.hash_key(), diff.hash_key());
    }

    #[test]
    fn test_hash_keys_are_typed() {
        let one = Object::Integer(1).hash_key();
        let yes = TRUE.hash_key();
        assert_eq!(one.map(|k| k.value), yes.map(|k| k.value));
        assert_ne!(one, yes);
    }

    #[test]
    fn test_unhashable() {
        assert_eq!(Object::array(vec![]).hash_key(), None);
        assert_eq!(NULL.hash_key(), None);
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_identity() {
        let arr = Object::array(vec![Object::Integer(1)]);
        let same = arr.clone();
        let other = Object::array(vec![Object::Integer(1)]);
        assert!(arr.is_identical(&same));
        assert!(!arr.is_identical(&other));
        assert_eq!(arr, other);
        assert!(NULL.is_identical(&NULL));
        assert!(!Object::Integer(1).is_identical(&TRUE));
        // strings never reach identity comparison through `==`
        let s = Object::string("a");
        assert!(!s.is_identical(&s.clone()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Object::Integer(-3).to_string(), "-3");
        assert_eq!(NULL.to_string(), "null");
        assert_eq!(Object::string("hi").to_string(), "hi");
        assert_eq!(
            Object::array(vec![Object::Integer(1), Object::string("a")]).to_string(),
            "[1, a]"
        );
        assert_eq!(Object::Error("boom".to_string()).to_string(), "ERROR: boom");
        assert_eq!(
            Object::ReturnValue(Box::new(TRUE)).to_string(),
            "true"
        );
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(Object::Integer(1).type_tag().to_string(), "INTEGER");
        assert_eq!(NULL.type_tag().to_string(), "NULL");
        assert_eq!(
            Object::ReturnValue(Box::new(NULL)).type_tag().to_string(),
            "RETURN_VALUE"
        );
    }
}
