//! Recursive dispatch over the AST, threading an [`Environment`] through
//! every call and extending it on function invocation.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Block, Conditional, Expr, Program, Stmt};
use crate::builtins::{self, Io};
use crate::environment::Environment;
use crate::object::{Function, HashPair, Hashable, Value};
use crate::token::TokenKind;

/// Evaluate a full program against `env`. Per the corrected semantics
/// (spec's source short-circuits on *any* non-null value, which would halt
/// on an ordinary expression statement) this only stops early on a
/// [`Value::ReturnValue`] or [`Value::Error`].
pub fn eval_program(program: &Program, env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    let mut result = Value::Null;
    for stmt in &program.statements {
        result = eval_stmt(stmt, env, io);
        match result {
            Value::ReturnValue(_) | Value::Error(_) => return result,
            _ => {}
        }
    }
    result
}

fn eval_block(block: &Block, env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    let mut result = Value::Null;
    for stmt in &block.statements {
        result = eval_stmt(stmt, env, io);
        match result {
            Value::ReturnValue(_) | Value::Error(_) => return result,
            _ => {}
        }
    }
    result
}

fn eval_stmt(stmt: &Stmt, env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    match stmt {
        Stmt::Var { name, value } => {
            let value = eval_expr(value, env, io);
            if value.is_error() {
                return value;
            }
            env.borrow_mut().set(name.clone(), value);
            Value::Null
        }
        Stmt::Reassign { name, value } => {
            let value = eval_expr(value, env, io);
            if value.is_error() {
                return value;
            }
            if !env.borrow_mut().assign(name, value) {
                return Value::Error(format!("identifier not found: {name}"));
            }
            Value::Null
        }
        Stmt::Return { value } => {
            let inner = match value {
                Some(expr) => eval_expr(expr, env, io),
                None => Value::Null,
            };
            if inner.is_error() {
                return inner;
            }
            Value::ReturnValue(Box::new(inner))
        }
        Stmt::If {
            primary,
            elifs,
            alternative,
        } => eval_if(primary, elifs, alternative.as_ref(), env, io),
        Stmt::For {
            initializer,
            condition,
            increment,
            body,
        } => eval_for(initializer, condition, increment, body, env, io),
        Stmt::While { condition, body } => eval_while(condition, body, env, io),
        Stmt::Expression(expr) => eval_expr(expr, env, io),
    }
}

fn eval_if(
    primary: &Conditional,
    elifs: &[Conditional],
    alternative: Option<&Block>,
    env: &Rc<RefCell<Environment>>,
    io: &mut Io,
) -> Value {
    let condition = eval_expr(&primary.condition, env, io);
    if condition.is_error() {
        return condition;
    }
    if condition.is_truthy() {
        return eval_block(&primary.consequence, env, io);
    }
    for elif in elifs {
        let condition = eval_expr(&elif.condition, env, io);
        if condition.is_error() {
            return condition;
        }
        if condition.is_truthy() {
            return eval_block(&elif.consequence, env, io);
        }
    }
    match alternative {
        Some(block) => eval_block(block, env, io),
        None => Value::Null,
    }
}

fn eval_for(
    initializer: &Stmt,
    condition: &Expr,
    increment: &Stmt,
    body: &Block,
    env: &Rc<RefCell<Environment>>,
    io: &mut Io,
) -> Value {
    let loop_env = Environment::enclosed(env.clone());
    let init_result = eval_stmt(initializer, &loop_env, io);
    if init_result.is_error() {
        return init_result;
    }
    loop {
        let condition_value = eval_expr(condition, &loop_env, io);
        match condition_value {
            Value::Error(_) => return condition_value,
            Value::Boolean(false) => break,
            Value::Boolean(true) => {}
            other => return Value::Error(format!("for condition is not a boolean: {}", other.type_name())),
        }
        let body_result = eval_block(body, &loop_env, io);
        if matches!(body_result, Value::ReturnValue(_) | Value::Error(_)) {
            return body_result;
        }
        let increment_result = eval_stmt(increment, &loop_env, io);
        if increment_result.is_error() {
            return increment_result;
        }
    }
    Value::Null
}

fn eval_while(condition: &Expr, body: &Block, env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    loop {
        let condition_value = eval_expr(condition, env, io);
        match condition_value {
            Value::Error(_) => return condition_value,
            Value::Boolean(false) => break,
            Value::Boolean(true) => {}
            other => {
                return Value::Error(format!(
                    "while condition is not a boolean: {}",
                    other.type_name()
                ))
            }
        }
        let body_result = eval_block(body, env, io);
        if matches!(body_result, Value::ReturnValue(_) | Value::Error(_)) {
            return body_result;
        }
    }
    Value::Null
}

fn eval_expr(expr: &Expr, env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    match expr {
        Expr::Integer(v) => Value::Integer(*v),
        Expr::Float(v) => Value::Float(*v),
        Expr::Str(v) => Value::Str(v.clone()),
        Expr::Boolean(v) => Value::Boolean(*v),
        Expr::Identifier(name) => eval_identifier(name, env),
        Expr::Array(elements) => eval_array(elements, env, io),
        Expr::Hash(pairs) => eval_hash(pairs, env, io),
        Expr::Index { collection, index } => eval_index(collection, index, env, io),
        Expr::Infix {
            left,
            operator,
            right,
        } => eval_infix(left, operator.kind, right, env, io),
        Expr::Prefix { operator, operand } => eval_prefix(operator.kind, operand, env, io),
        Expr::Call { callee, arguments } => eval_call(callee, arguments, env, io),
        Expr::Function {
            name,
            parameters,
            body,
        } => eval_function_literal(name, parameters, body, env),
    }
}

fn eval_identifier(name: &str, env: &Rc<RefCell<Environment>>) -> Value {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(name) {
        return Value::Builtin(builtin);
    }
    Value::Error(format!("identifier not found: {name}"))
}

fn eval_array(elements: &[Expr], env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        let value = eval_expr(element, env, io);
        if value.is_error() {
            return value;
        }
        values.push(value);
    }
    Value::Array(Rc::new(RefCell::new(values)))
}

fn eval_hash(pairs: &[(Expr, Expr)], env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    let mut map = HashMap::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expr(key_expr, env, io);
        if key.is_error() {
            return key;
        }
        let value = eval_expr(value_expr, env, io);
        if value.is_error() {
            return value;
        }
        let Some(hash_key) = key.hash_key() else {
            return Value::Error(format!("unusable as hash key: {}", key.type_name()));
        };
        map.insert(hash_key, HashPair { key, value });
    }
    Value::Hash(Rc::new(RefCell::new(map)))
}

fn eval_index(collection: &Expr, index: &Expr, env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    let collection_value = eval_expr(collection, env, io);
    if collection_value.is_error() {
        return collection_value;
    }
    let index_value = eval_expr(index, env, io);
    if index_value.is_error() {
        return index_value;
    }
    match (&collection_value, &index_value) {
        (Value::Array(elements), Value::Integer(i)) => {
            let elements = elements.borrow();
            if *i < 0 || *i as usize >= elements.len() {
                Value::Null
            } else {
                elements[*i as usize].clone()
            }
        }
        (Value::Array(_), other) => {
            Value::Error(format!("array index must be an integer, got {}", other.type_name()))
        }
        (Value::Hash(pairs), key) => match key.hash_key() {
            Some(hash_key) => pairs
                .borrow()
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Value::Null),
            None => Value::Error(format!("unusable as hash key: {}", key.type_name())),
        },
        (other, _) => Value::Error(format!("index operator not supported: {}", other.type_name())),
    }
}

fn eval_prefix(operator: TokenKind, operand: &Expr, env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    let value = eval_expr(operand, env, io);
    if value.is_error() {
        return value;
    }
    match (operator, value) {
        (TokenKind::Minus, Value::Integer(v)) => Value::Integer(-v),
        (TokenKind::Minus, Value::Float(v)) => Value::Float(-v),
        (TokenKind::Bang, Value::Boolean(v)) => Value::Boolean(!v),
        (op, other) => Value::Error(format!("unknown operator: {op:?}{}", other.type_name())),
    }
}

fn eval_infix(
    left: &Expr,
    operator: TokenKind,
    right: &Expr,
    env: &Rc<RefCell<Environment>>,
    io: &mut Io,
) -> Value {
    if matches!(operator, TokenKind::PlusAssign | TokenKind::MinusAssign) {
        return eval_compound_assign(left, operator, right, env, io);
    }

    let left_value = eval_expr(left, env, io);
    if left_value.is_error() {
        return left_value;
    }
    let right_value = eval_expr(right, env, io);
    if right_value.is_error() {
        return right_value;
    }

    match (&left_value, &right_value) {
        (Value::Integer(_), Value::Integer(_)) | (Value::Float(_), Value::Float(_)) => {
            eval_numeric_infix(operator, &left_value, &right_value)
        }
        (Value::Str(a), Value::Str(b)) => eval_string_infix(operator, a, b),
        (a, b) => Value::Error(format!(
            "type mismatch: {} {operator:?} {}",
            a.type_name(),
            b.type_name()
        )),
    }
}

fn eval_compound_assign(
    left: &Expr,
    operator: TokenKind,
    right: &Expr,
    env: &Rc<RefCell<Environment>>,
    io: &mut Io,
) -> Value {
    let Expr::Identifier(name) = left else {
        return Value::Error("left-hand side of compound assignment must be an identifier".into());
    };
    let current = eval_identifier(name, env);
    if current.is_error() {
        return current;
    }
    let Value::Integer(current) = current else {
        return Value::Error(format!(
            "compound assignment target must be an integer, got {}",
            current.type_name()
        ));
    };
    let delta = eval_expr(right, env, io);
    if delta.is_error() {
        return delta;
    }
    let Value::Integer(delta) = delta else {
        return Value::Error(format!(
            "compound assignment operand must be an integer, got {}",
            delta.type_name()
        ));
    };
    let updated = match operator {
        TokenKind::PlusAssign => current + delta,
        TokenKind::MinusAssign => current - delta,
        _ => unreachable!("eval_infix only routes += -= here"),
    };
    if !env.borrow_mut().assign(name, Value::Integer(updated)) {
        return Value::Error(format!("identifier not found: {name}"));
    }
    Value::Null
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Integer(v) => *v as f64,
        Value::Float(v) => *v,
        _ => unreachable!("as_f64 only called on numeric values"),
    }
}

fn both_integers(left: &Value, right: &Value) -> bool {
    matches!((left, right), (Value::Integer(_), Value::Integer(_)))
}

fn eval_numeric_infix(operator: TokenKind, left: &Value, right: &Value) -> Value {
    if operator == TokenKind::Modulus {
        return match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => {
                if *b == 0 {
                    Value::Error("modulus by zero".into())
                } else {
                    Value::Integer(a % b)
                }
            }
            _ => Value::Error("`%` is only defined for integers".into()),
        };
    }

    let (a, b) = (as_f64(left), as_f64(right));
    let integral = both_integers(left, right);

    match operator {
        TokenKind::Plus => numeric_result(a + b, integral),
        TokenKind::Minus => numeric_result(a - b, integral),
        TokenKind::Asterisk => numeric_result(a * b, integral),
        TokenKind::Slash => {
            if b == 0.0 {
                Value::Error("division by zero".into())
            } else if integral {
                Value::Integer((a / b).trunc() as i64)
            } else {
                Value::Float(a / b)
            }
        }
        TokenKind::Lt => Value::Boolean(a < b),
        TokenKind::Gt => Value::Boolean(a > b),
        TokenKind::Lte => Value::Boolean(a <= b),
        TokenKind::Gte => Value::Boolean(a >= b),
        TokenKind::Equal => Value::Boolean(a == b),
        TokenKind::NotEqual => Value::Boolean(a != b),
        other => Value::Error(format!("unknown operator: {other:?}")),
    }
}

fn numeric_result(value: f64, integral: bool) -> Value {
    if integral {
        Value::Integer(value.trunc() as i64)
    } else {
        Value::Float(value)
    }
}

fn eval_string_infix(operator: TokenKind, left: &str, right: &str) -> Value {
    match operator {
        TokenKind::Plus => Value::Str(format!("{left}{right}")),
        TokenKind::Equal => Value::Boolean(left == right),
        TokenKind::NotEqual => Value::Boolean(left != right),
        other => Value::Error(format!("unknown operator: STRING {other:?} STRING")),
    }
}

fn eval_call(callee: &Expr, arguments: &[Expr], env: &Rc<RefCell<Environment>>, io: &mut Io) -> Value {
    let callee_value = eval_expr(callee, env, io);
    if callee_value.is_error() {
        return callee_value;
    }

    let mut args = Vec::with_capacity(arguments.len());
    for arg in arguments {
        let value = eval_expr(arg, env, io);
        if value.is_error() {
            return value;
        }
        args.push(value);
    }

    match callee_value {
        Value::Function(func) => apply_function(&func, &args, io),
        Value::Builtin(builtin) => (builtin.func)(&args, io),
        other => Value::Error(format!("not callable: {}", other.type_name())),
    }
}

fn apply_function(func: &Function, args: &[Value], io: &mut Io) -> Value {
    let call_env = Environment::enclosed(func.env.clone());
    for (param, arg) in func.parameters.iter().zip(args.iter()) {
        call_env.borrow_mut().set(param.clone(), arg.clone());
    }
    let result = eval_block(&func.body, &call_env, io);
    match result {
        Value::ReturnValue(inner) => *inner,
        other => other,
    }
}

fn eval_function_literal(
    name: &str,
    parameters: &[String],
    body: &Block,
    env: &Rc<RefCell<Environment>>,
) -> Value {
    let func = Value::Function(Rc::new(Function {
        parameters: parameters.to_vec(),
        body: body.clone(),
        env: env.clone(),
    }));
    env.borrow_mut().set(name.to_string(), func.clone());
    func
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use std::io::Cursor;

    fn run(src: &str) -> (Value, String) {
        let lexer = Lexer::new(src);
        let mut parser = Parser::new(lexer);
        let (program, errors) = parser.parse_program();
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        let env = Environment::new();
        let mut out = Vec::new();
        let mut input = Cursor::new(&b""[..]);
        let mut io = Io {
            out: &mut out,
            input: &mut input,
        };
        let value = eval_program(&program, &env, &mut io);
        (value, String::from_utf8(out).unwrap())
    }

    #[test]
    fn arithmetic_precedence() {
        let (value, _) = run("2 + 3 * 4;");
        assert_eq!(value, Value::Integer(14));
    }

    #[test]
    fn left_to_right_same_precedence() {
        let (value, _) = run("1 - 2 - 3;");
        assert_eq!(value, Value::Integer(-4));
    }

    #[test]
    fn return_short_circuits_function_body() {
        let (value, _) = run("func f() { return 1 return 2 } f();");
        assert_eq!(value, Value::Integer(1));
    }

    #[test]
    fn top_level_expression_does_not_halt_program() {
        let (value, out) = run("1 + 1; println(\"after\");");
        assert_eq!(out, "after\n");
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn closures_capture_and_mutate_outer_variable() {
        let (value, _) = run(
            "func mk() { var x = 0 func inc() { x += 1 return x } return inc } \
             var counter = mk() counter() counter() counter();",
        );
        assert_eq!(value, Value::Integer(3));
    }

    #[test]
    fn independent_closures_do_not_share_state() {
        let (value, _) = run(
            "func mk() { var x = 0 func inc() { x += 1 return x } return inc } \
             var a = mk() var b = mk() a() a() b();",
        );
        assert_eq!(value, Value::Integer(1));
    }

    #[test]
    fn unbound_identifier_is_an_error() {
        let (value, _) = run("missing;");
        assert!(matches!(value, Value::Error(_)));
    }

    #[test]
    fn reassignment_updates_outer_binding_in_place() {
        let (value, _) = run("var x = 1 func f() { x = 2 } f() x;");
        assert_eq!(value, Value::Integer(2));
    }

    #[test]
    fn array_sharing_is_observable_through_append() {
        let (value, _) = run("var a = [1] var b = a append(b, 2) len(a);");
        assert_eq!(value, Value::Integer(2));
    }

    #[test]
    fn hash_indexing_by_equal_keys_is_stable() {
        let (value, _) = run("var h = {1: \"x\", 2: \"y\"} h[1];");
        assert_eq!(value, Value::Str("x".into()));
    }

    #[test]
    fn out_of_range_array_index_is_null_not_error() {
        let (value, _) = run("var a = [1, 2] a[9];");
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn for_loop_prints_zero_through_two() {
        let (_value, out) = run("for var i = 0; i < 3; i += 1 { println(i) }");
        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn non_hashable_key_is_an_error() {
        let (value, _) = run("{[1]: 2};");
        assert!(matches!(value, Value::Error(_)));
    }

    #[test]
    fn calling_a_non_callable_is_an_error() {
        let (value, _) = run("var x = 5 x();");
        assert!(matches!(value, Value::Error(_)));
    }
}
