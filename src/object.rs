//! Runtime value model: the tagged union every evaluation step produces.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::ast::Block;
use crate::builtins::Builtin;
use crate::environment::Environment;

/// The kind half of a [`HashKey`] — matches the runtime type of the value
/// the key was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKeyKind {
    Integer,
    Str,
    Boolean,
}

/// A 64-bit summary of a hashable value, used as the key type of
/// [`Value::Hash`]. Two values that compare equal always hash to the same
/// `HashKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: HashKeyKind,
    pub hash: u64,
}

/// FNV-1a 64-bit hash, matching the original interpreter's string hashing.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// A runtime value that can be used as a hash map key: `Integer`, `String`,
/// and `Boolean`. Modeled as a capability so a non-hashable key (an array,
/// hash, function, ...) is a type-level impossibility at the call site.
pub trait Hashable {
    fn hash_key(&self) -> Option<HashKey>;
}

/// A function value's closed-over environment plus its signature.
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Block,
    pub env: Rc<RefCell<Environment>>,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters && self.body == other.body && Rc::ptr_eq(&self.env, &other.env)
    }
}

/// A key/value pair as stored in [`Value::Hash`]; the original key value is
/// retained alongside the hash so `Inspect()` can render it back out.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

/// A tagged runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Str(String),
    Boolean(bool),
    Null,
    Array(Rc<RefCell<Vec<Value>>>),
    Hash(Rc<RefCell<HashMap<HashKey, HashPair>>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    /// Internal sentinel wrapping a value returned with `return`. Unwrapped
    /// at the enclosing function-call boundary; never observable by user
    /// code or stored in an [`Environment`].
    ReturnValue(Box<Value>),
    Error(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (Null, Null) => true,
            (Array(a), Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Hash(a), Hash(b)) => Rc::ptr_eq(a, b),
            (Function(a), Function(b)) => Rc::ptr_eq(a, b),
            (Builtin(a), Builtin(b)) => a.name == b.name,
            (ReturnValue(a), ReturnValue(b)) => a == b,
            (Error(a), Error(b)) => a == b,
            _ => false,
        }
    }
}

impl Hashable for Value {
    fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(v) => Some(HashKey {
                kind: HashKeyKind::Integer,
                hash: *v as u64,
            }),
            Value::Boolean(v) => Some(HashKey {
                kind: HashKeyKind::Boolean,
                hash: *v as u64,
            }),
            Value::Str(v) => Some(HashKey {
                kind: HashKeyKind::Str,
                hash: fnv1a_64(v.as_bytes()),
            }),
            _ => None,
        }
    }
}

impl Value {
    /// The type name used in error messages (`"INTEGER"`, `"ARRAY"`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Str(_) => "STRING",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    /// The user-facing rendering used by `print`/`println` and the REPL.
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => format_float(*v),
            Value::Str(v) => v.clone(),
            Value::Boolean(v) => v.to_string(),
            Value::Null => "null".to_string(),
            Value::Array(elements) => {
                let rendered: Vec<String> =
                    elements.borrow().iter().map(|e| e.inspect()).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Hash(pairs) => {
                let rendered: Vec<String> = pairs
                    .borrow()
                    .values()
                    .map(|pair| format!("{}:{}", pair.key.inspect(), pair.value.inspect()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Value::Function(func) => {
                let mut out = String::new();
                let _ = write!(out, "fn({}){}", func.parameters.join(", "), func.body);
                out
            }
            Value::Builtin(b) => format!("builtin function: {}", b.name),
            Value::ReturnValue(inner) => inner.inspect(),
            Value::Error(msg) => format!("ERROR: {msg}"),
        }
    }
}

/// Shortest round-trip decimal rendering for a float, matching
/// `strconv.FormatFloat(f, 'f', -1, 64)` from the original interpreter.
fn format_float(value: f64) -> String {
    if value == value.trunc() && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_booleans_hash_by_value() {
        assert_eq!(
            Value::Integer(42).hash_key(),
            Some(HashKey {
                kind: HashKeyKind::Integer,
                hash: 42
            })
        );
        assert_eq!(
            Value::Boolean(true).hash_key(),
            Some(HashKey {
                kind: HashKeyKind::Boolean,
                hash: 1
            })
        );
    }

    #[test]
    fn equal_strings_hash_equal() {
        let a = Value::Str("hello".into()).hash_key();
        let b = Value::Str("hello".into()).hash_key();
        assert_eq!(a, b);
    }

    #[test]
    fn containers_are_not_hashable() {
        let arr = Value::Array(Rc::new(RefCell::new(vec![])));
        assert_eq!(arr.hash_key(), None);
    }

    #[test]
    fn inspect_forms_match_spec() {
        assert_eq!(Value::Integer(5).inspect(), "5");
        assert_eq!(Value::Float(2.5).inspect(), "2.5");
        assert_eq!(Value::Float(2.0).inspect(), "2.0");
        assert_eq!(Value::Boolean(true).inspect(), "true");
        assert_eq!(Value::Null.inspect(), "null");
        assert_eq!(Value::Error("bad".into()).inspect(), "ERROR: bad");
    }
}
