//! Abstract syntax tree produced by the parser and walked by the evaluator.
mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

/// A parsed AlphaLang program: an ordered sequence of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}
