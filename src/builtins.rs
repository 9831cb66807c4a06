//! The fixed registry of host-implemented functions AlphaLang programs can
//! call without any `func` declaration.
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::rc::Rc;

use once_cell::sync::Lazy;
use rand::Rng;

use crate::object::{HashPair, Hashable, Value};

/// I/O the host provides to builtins: where `print`/`println` write, and
/// where `input` reads a line from. Injected rather than hardcoded to
/// `stdio` so tests can capture output without spawning a subprocess.
pub struct Io<'a> {
    pub out: &'a mut dyn Write,
    pub input: &'a mut dyn BufRead,
}

pub type BuiltinFn = fn(&[Value], &mut Io) -> Value;

/// A named host function, callable like any other [`Value`].
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

fn error(format: std::fmt::Arguments<'_>) -> Value {
    Value::Error(format.to_string())
}

macro_rules! err {
    ($($arg:tt)*) => { error(format_args!($($arg)*)) };
}

fn builtin_len(args: &[Value], _io: &mut Io) -> Value {
    if args.len() != 1 {
        return err!("wrong number of arguments to `len`. got={}, want=1", args.len());
    }
    match &args[0] {
        Value::Str(s) => Value::Integer(s.len() as i64),
        Value::Array(elements) => Value::Integer(elements.borrow().len() as i64),
        other => err!("argument to `len` not supported, got {}", other.type_name()),
    }
}

fn builtin_append(args: &[Value], _io: &mut Io) -> Value {
    match args.len() {
        2 => match &args[0] {
            Value::Array(elements) => {
                elements.borrow_mut().push(args[1].clone());
                Value::Null
            }
            other => err!(
                "argument to `append` not supported, got {}, {}",
                other.type_name(),
                args[1].type_name()
            ),
        },
        3 => match &args[0] {
            Value::Hash(pairs) => {
                let Some(key) = args[1].hash_key() else {
                    return err!("unusable as hash key: {}", args[1].type_name());
                };
                pairs.borrow_mut().insert(
                    key,
                    HashPair {
                        key: args[1].clone(),
                        value: args[2].clone(),
                    },
                );
                Value::Null
            }
            other => err!("argument to `append` not supported, got {}", other.type_name()),
        },
        n => err!("wrong number of arguments to `append`. got={n}, want=2 or 3"),
    }
}

fn builtin_pop(args: &[Value], _io: &mut Io) -> Value {
    if args.len() != 1 {
        return err!("wrong number of arguments to `pop`. got={}, want=1", args.len());
    }
    match &args[0] {
        Value::Array(elements) => match elements.borrow_mut().pop() {
            Some(value) => value,
            None => err!("`pop` called on an empty array"),
        },
        other => err!("argument to `pop` not supported, got {}", other.type_name()),
    }
}

fn builtin_print(args: &[Value], io: &mut Io) -> Value {
    for arg in args {
        let _ = write!(io.out, "{}", arg.inspect());
    }
    Value::Null
}

fn builtin_println(args: &[Value], io: &mut Io) -> Value {
    for arg in args {
        let _ = writeln!(io.out, "{}", arg.inspect());
    }
    Value::Null
}

fn builtin_input(args: &[Value], io: &mut Io) -> Value {
    if args.len() > 1 {
        return err!("wrong number of arguments to `input`. got={}, want=0 or 1", args.len());
    }
    if let Some(prompt) = args.first() {
        let Value::Str(prompt) = prompt else {
            return err!("argument to `input` not supported, got {}", prompt.type_name());
        };
        let _ = write!(io.out, "{prompt}");
        let _ = io.out.flush();
    }

    let mut line = String::new();
    if io.input.read_line(&mut line).is_err() {
        return err!("failed to read from input");
    }
    let trimmed = line.trim_end_matches(['\n', '\r']);

    if let Ok(i) = trimmed.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(f) = trimmed.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::Str(trimmed.to_string())
    }
}

fn builtin_int(args: &[Value], _io: &mut Io) -> Value {
    if args.len() != 1 {
        return err!("wrong number of arguments to `int`. got={}, want=1", args.len());
    }
    match &args[0] {
        Value::Integer(i) => Value::Integer(*i),
        Value::Boolean(b) => Value::Integer(if *b { 1 } else { 0 }),
        Value::Str(s) => match s.trim().parse::<i64>() {
            Ok(i) => Value::Integer(i),
            Err(_) => err!("cannot convert string {s:?} to int"),
        },
        other => err!("argument to `int` not supported, got {}", other.type_name()),
    }
}

fn builtin_rand(args: &[Value], _io: &mut Io) -> Value {
    let mut rng = rand::thread_rng();
    match args {
        [Value::Integer(n)] => {
            if *n <= 0 {
                return err!("argument to `rand` must be positive, got {n}");
            }
            Value::Integer(rng.gen_range(0..*n))
        }
        [Value::Integer(lo), Value::Integer(hi)] => {
            if lo >= hi {
                return err!("`rand` range must be non-empty, got [{lo}, {hi})");
            }
            Value::Integer(rng.gen_range(*lo..*hi))
        }
        _ => err!("argument to `rand` not supported, want (int) or (int, int)"),
    }
}

static REGISTRY: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let entries: [(&'static str, BuiltinFn); 8] = [
        ("len", builtin_len),
        ("append", builtin_append),
        ("pop", builtin_pop),
        ("print", builtin_print),
        ("println", builtin_println),
        ("input", builtin_input),
        ("int", builtin_int),
        ("rand", builtin_rand),
    ];
    entries
        .into_iter()
        .map(|(name, func)| (name, Builtin { name, func }))
        .collect()
});

/// Look up a builtin by name, the way the evaluator falls back to the
/// builtin registry after an environment lookup misses.
pub fn lookup(name: &str) -> Option<Builtin> {
    REGISTRY.get(name).copied()
}

#[allow(dead_code)]
fn new_array(values: Vec<Value>) -> Value {
    Value::Array(Rc::new(RefCell::new(values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn io<'a>(out: &'a mut Vec<u8>, input: &'a mut Cursor<&'static [u8]>) -> Io<'a> {
        Io { out, input }
    }

    #[test]
    fn len_over_strings_and_arrays() {
        let mut out = Vec::new();
        let mut input = Cursor::new(&b""[..]);
        let mut io = io(&mut out, &mut input);
        assert_eq!(
            builtin_len(&[Value::Str("abc".into())], &mut io),
            Value::Integer(3)
        );
        assert_eq!(
            builtin_len(&[new_array(vec![Value::Integer(1), Value::Integer(2)])], &mut io),
            Value::Integer(2)
        );
    }

    #[test]
    fn append_mutates_shared_array() {
        let mut out = Vec::new();
        let mut input = Cursor::new(&b""[..]);
        let mut io = io(&mut out, &mut input);
        let shared = new_array(vec![Value::Integer(1)]);
        let alias = shared.clone();
        builtin_append(&[shared, Value::Integer(2)], &mut io);
        let Value::Array(elements) = alias else {
            unreachable!()
        };
        assert_eq!(elements.borrow().len(), 2);
    }

    #[test]
    fn pop_removes_last_element() {
        let mut out = Vec::new();
        let mut input = Cursor::new(&b""[..]);
        let mut io = io(&mut out, &mut input);
        let arr = new_array(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(builtin_pop(&[arr], &mut io), Value::Integer(2));
    }

    #[test]
    fn int_converts_bool_and_string() {
        let mut out = Vec::new();
        let mut input = Cursor::new(&b""[..]);
        let mut io = io(&mut out, &mut input);
        assert_eq!(builtin_int(&[Value::Boolean(true)], &mut io), Value::Integer(1));
        assert_eq!(
            builtin_int(&[Value::Str("42".into())], &mut io),
            Value::Integer(42)
        );
    }

    #[test]
    fn unknown_builtin_is_not_registered() {
        assert!(lookup("frobnicate").is_none());
        assert!(lookup("len").is_some());
    }
}
