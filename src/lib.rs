//! AlphaLang: a small tree-walking interpreter.
//!
//! The pipeline is `source text -> tokens -> AST -> values`: [`lexer`]
//! produces tokens, [`parser`] builds an [`ast::Program`], and
//! [`evaluator`] walks it against an [`environment::Environment`].
pub mod ast;
pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod token;

use std::rc::Rc;

use builtins::Io;
use environment::Environment;
use object::Value;

/// Parse and evaluate `source` against a fresh environment, writing any
/// `print`/`println`/`input` traffic through `io`.
///
/// Returns the program's parse errors (if any) alongside the final value;
/// a non-empty error list means evaluation was skipped entirely, matching
/// the CLI's "print parse errors before evaluation proceeds" contract.
pub fn eval_source(source: &str, io: &mut Io) -> (Value, Vec<String>) {
    let env = Environment::new();
    eval_source_in(source, &env, io)
}

/// Like [`eval_source`], but evaluates against a caller-supplied
/// environment so a REPL can carry bindings across lines.
pub fn eval_source_in(
    source: &str,
    env: &Rc<std::cell::RefCell<Environment>>,
    io: &mut Io,
) -> (Value, Vec<String>) {
    let lexer = lexer::Lexer::new(source);
    let mut parser = parser::Parser::new(lexer);
    let (program, errors) = parser.parse_program();
    if !errors.is_empty() {
        return (Value::Null, errors);
    }
    let value = evaluator::eval_program(&program, env, io);
    (value, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn eval_source_runs_end_to_end() {
        let mut out = Vec::new();
        let mut input = Cursor::new(&b""[..]);
        let mut io = Io {
            out: &mut out,
            input: &mut input,
        };
        let (value, errors) = eval_source("println(2 + 3 * 4);", &mut io);
        assert!(errors.is_empty());
        assert_eq!(value, Value::Null);
        assert_eq!(String::from_utf8(out).unwrap(), "14\n");
    }

    #[test]
    fn parse_errors_prevent_evaluation() {
        let mut out = Vec::new();
        let mut input = Cursor::new(&b""[..]);
        let mut io = Io {
            out: &mut out,
            input: &mut input,
        };
        let (_value, errors) = eval_source("var x = ;", &mut io);
        assert!(!errors.is_empty());
        assert!(out.is_empty());
    }
}
