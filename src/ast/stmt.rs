use crate::ast::Expr;

/// An ordered sequence of statements delimited by `{ }`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ ")?;
        for stmt in &self.statements {
            write!(f, "{stmt} ")?;
        }
        write!(f, "}}")
    }
}

/// A single `condition { consequence }` arm, shared by the primary `if` and
/// every `elif`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Expr,
    pub consequence: Block,
}

/// A top-level or block-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Var {
        name: String,
        value: Expr,
    },
    Reassign {
        name: String,
        value: Expr,
    },
    Return {
        value: Option<Expr>,
    },
    If {
        primary: Conditional,
        elifs: Vec<Conditional>,
        alternative: Option<Block>,
    },
    For {
        initializer: Box<Stmt>,
        condition: Expr,
        increment: Box<Stmt>,
        body: Block,
    },
    While {
        condition: Expr,
        body: Block,
    },
    Expression(Expr),
}

impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Var { name, value } => write!(f, "var {name} = {value};"),
            Stmt::Reassign { name, value } => write!(f, "{name} = {value};"),
            Stmt::Return { value: Some(v) } => write!(f, "return {v};"),
            Stmt::Return { value: None } => write!(f, "return;"),
            Stmt::If {
                primary,
                elifs,
                alternative,
            } => {
                write!(f, "if {} {}", primary.condition, primary.consequence)?;
                for elif in elifs {
                    write!(f, " elif {} {}", elif.condition, elif.consequence)?;
                }
                if let Some(alt) = alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            }
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => write!(f, "for {initializer} {condition}; {increment} {body}"),
            Stmt::While { condition, body } => write!(f, "while {condition} {body}"),
            Stmt::Expression(expr) => write!(f, "{expr};"),
        }
    }
}
