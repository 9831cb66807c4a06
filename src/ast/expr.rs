use crate::ast::Block;
use crate::token::Token;

/// An expression node. Operator tokens inside `Infix`/`Prefix` retain their
/// full [`Token`] (not just the literal spelling) so evaluation can dispatch
/// on kind without re-parsing punctuation strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Float(f64),
    Str(String),
    Boolean(bool),
    Identifier(String),
    Array(Vec<Expr>),
    Hash(Vec<(Expr, Expr)>),
    Index {
        collection: Box<Expr>,
        index: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Prefix {
        operator: Token,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Function {
        name: String,
        parameters: Vec<String>,
        body: Block,
    },
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Integer(v) => write!(f, "{v}"),
            Expr::Float(v) => write!(f, "{v}"),
            Expr::Str(v) => write!(f, "{v:?}"),
            Expr::Boolean(v) => write!(f, "{v}"),
            Expr::Identifier(name) => write!(f, "{name}"),
            Expr::Array(elements) => {
                let rendered: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Expr::Hash(pairs) => {
                let rendered: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{k}:{v}")).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Expr::Index { collection, index } => write!(f, "({collection}[{index}])"),
            Expr::Infix {
                left,
                operator,
                right,
            } => write!(f, "({left} {} {right})", operator.literal),
            Expr::Prefix { operator, operand } => write!(f, "({}{operand})", operator.literal),
            Expr::Call { callee, arguments } => {
                let rendered: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{callee}({})", rendered.join(", "))
            }
            Expr::Function {
                name, parameters, ..
            } => write!(f, "func {name}({})", parameters.join(", ")),
        }
    }
}
