//! Recursive-descent / Pratt expression parser driven by the lexer with
//! one-token lookahead (`cur`, `next`).
use crate::ast::{Block, Conditional, Expr, Program, Stmt};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Binding power, loosest to tightest. Wider than the source's four-level
/// table per the recommended fix: comparisons sit below arithmetic and
/// compound assignment binds loosest of all.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Assign,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    use TokenKind::*;
    match kind {
        Equal | NotEqual => Precedence::Equals,
        Lt | Gt | Lte | Gte => Precedence::LessGreater,
        Plus | Minus => Precedence::Sum,
        Asterisk | Slash | Modulus => Precedence::Product,
        PlusAssign | MinusAssign => Precedence::Assign,
        LParen | LBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

fn is_infix_operator(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Plus | Minus
            | Asterisk
            | Slash
            | Modulus
            | Equal
            | NotEqual
            | Lt
            | Gt
            | Lte
            | Gte
            | PlusAssign
            | MinusAssign
    )
}

/// Parses a token stream into a [`Program`], collecting diagnostics rather
/// than aborting on the first malformed statement.
pub struct Parser {
    lexer: Lexer,
    cur: Token,
    next: Token,
    errors: Vec<String>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let cur = lexer.next_token();
        let next = lexer.next_token();
        Self {
            lexer,
            cur,
            next,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn advance(&mut self) {
        self.cur = std::mem::replace(&mut self.next, self.lexer.next_token());
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn next_is(&self, kind: TokenKind) -> bool {
        self.next.kind == kind
    }

    /// Advance past `next` if it has `kind`; otherwise record a diagnostic
    /// and leave the cursor untouched.
    fn expect_next(&mut self, kind: TokenKind) -> bool {
        if self.next_is(kind) {
            self.advance();
            true
        } else {
            self.errors.push(format!(
                "expected next token to be {kind:?}, got {:?} ({}) instead",
                self.next.kind, self.next.literal
            ));
            false
        }
    }

    fn cur_precedence(&self) -> Precedence {
        precedence_of(self.cur.kind)
    }

    fn next_precedence(&self) -> Precedence {
        precedence_of(self.next.kind)
    }

    pub fn parse_program(&mut self) -> (Program, Vec<String>) {
        let mut statements = Vec::new();
        while !self.cur_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }
        (Program { statements }, self.errors.clone())
    }

    /// Parse one statement, consuming an optional trailing `;`.
    fn parse_statement(&mut self) -> Option<Stmt> {
        let stmt = self.parse_statement_inner()?;
        if self.next_is(TokenKind::Semicolon) {
            self.advance();
        }
        Some(stmt)
    }

    /// Parse one statement, leaving the cursor on its last consumed token
    /// without touching a trailing `;` — used where a caller (the `for`
    /// loop header) needs exact control over the separator.
    fn parse_statement_inner(&mut self) -> Option<Stmt> {
        match self.cur.kind {
            TokenKind::Var => self.parse_var_statement_inner(),
            TokenKind::Return => self.parse_return_statement_inner(),
            TokenKind::If => self.parse_if_statement_inner(),
            TokenKind::For => self.parse_for_statement_inner(),
            TokenKind::While => self.parse_while_statement_inner(),
            _ => self.parse_expression_statement_inner(),
        }
    }

    fn parse_var_statement_inner(&mut self) -> Option<Stmt> {
        if !self.expect_next(TokenKind::Ident) {
            return None;
        }
        let name = self.cur.literal.clone();
        if !self.expect_next(TokenKind::Assign) {
            return None;
        }
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Var { name, value })
    }

    fn parse_return_statement_inner(&mut self) -> Option<Stmt> {
        if self.next_is(TokenKind::Semicolon) || self.next_is(TokenKind::RBrace) {
            return Some(Stmt::Return { value: None });
        }
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Return { value: Some(value) })
    }

    fn parse_conditional(&mut self) -> Option<Conditional> {
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_next(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block();
        Some(Conditional {
            condition,
            consequence,
        })
    }

    fn parse_if_statement_inner(&mut self) -> Option<Stmt> {
        let primary = self.parse_conditional()?;
        let mut elifs = Vec::new();
        while self.next_is(TokenKind::Elif) {
            self.advance();
            elifs.push(self.parse_conditional()?);
        }
        let alternative = if self.next_is(TokenKind::Else) {
            self.advance();
            if !self.expect_next(TokenKind::LBrace) {
                return None;
            }
            Some(self.parse_block())
        } else {
            None
        };
        Some(Stmt::If {
            primary,
            elifs,
            alternative,
        })
    }

    fn parse_for_statement_inner(&mut self) -> Option<Stmt> {
        self.advance();
        if !self.cur_is(TokenKind::Var) {
            self.errors.push(format!(
                "for loop initializer must be a var statement, got {:?}",
                self.cur.kind
            ));
            return None;
        }
        let initializer = self.parse_var_statement_inner()?;
        if !self.expect_next(TokenKind::Semicolon) {
            return None;
        }
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_next(TokenKind::Semicolon) {
            return None;
        }
        self.advance();
        let increment = self.parse_statement_inner()?;
        if !self.expect_next(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Stmt::For {
            initializer: Box::new(initializer),
            condition,
            increment: Box::new(increment),
            body,
        })
    }

    fn parse_while_statement_inner(&mut self) -> Option<Stmt> {
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_next(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Stmt::While { condition, body })
    }

    fn parse_expression_statement_inner(&mut self) -> Option<Stmt> {
        if self.cur_is(TokenKind::Ident) && self.next_is(TokenKind::Assign) {
            let name = self.cur.literal.clone();
            self.advance();
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            return Some(Stmt::Reassign { name, value });
        }
        let expr = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Expression(expr))
    }

    fn parse_block(&mut self) -> Block {
        let mut statements = Vec::new();
        self.advance();
        while !self.cur_is(TokenKind::RBrace) && !self.cur_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }
        Block { statements }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.next_is(TokenKind::Semicolon) && precedence < self.next_precedence() {
            match self.next.kind {
                TokenKind::LParen => {
                    self.advance();
                    left = self.parse_call(left)?;
                }
                TokenKind::LBracket => {
                    self.advance();
                    left = self.parse_index(left)?;
                }
                kind if is_infix_operator(kind) => {
                    self.advance();
                    left = self.parse_infix(left)?;
                }
                _ => break,
            }
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.cur.kind {
            TokenKind::Integer => match self.cur.literal.parse::<i64>() {
                Ok(v) => Some(Expr::Integer(v)),
                Err(_) => {
                    self.errors
                        .push(format!("could not parse {:?} as integer", self.cur.literal));
                    None
                }
            },
            TokenKind::Float => match self.cur.literal.parse::<f64>() {
                Ok(v) => Some(Expr::Float(v)),
                Err(_) => {
                    self.errors
                        .push(format!("could not parse {:?} as float", self.cur.literal));
                    None
                }
            },
            TokenKind::String => Some(Expr::Str(unescape::unescape(&self.cur.literal).unwrap_or_else(|| self.cur.literal.clone()))),
            TokenKind::True => Some(Expr::Boolean(true)),
            TokenKind::False => Some(Expr::Boolean(false)),
            TokenKind::Ident => Some(Expr::Identifier(self.cur.literal.clone())),
            TokenKind::Bang | TokenKind::Minus => {
                let operator = self.cur.clone();
                self.advance();
                let operand = self.parse_expression(Precedence::Prefix)?;
                Some(Expr::Prefix {
                    operator,
                    operand: Box::new(operand),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression(Precedence::Lowest)?;
                if !self.expect_next(TokenKind::RParen) {
                    return None;
                }
                Some(expr)
            }
            TokenKind::LBracket => {
                let elements = self.parse_expression_list(TokenKind::RBracket)?;
                Some(Expr::Array(elements))
            }
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::Function => self.parse_function_literal(),
            other => {
                self.errors
                    .push(format!("no prefix parse function for {other:?} found"));
                None
            }
        }
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        let mut list = Vec::new();
        if self.next_is(end) {
            self.advance();
            return Some(list);
        }
        self.advance();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.next_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        if !self.expect_next(end) {
            return None;
        }
        Some(list)
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let mut pairs = Vec::new();
        while !self.next_is(TokenKind::RBrace) {
            self.advance();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_next(TokenKind::Colon) {
                return None;
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.next_is(TokenKind::RBrace) && !self.expect_next(TokenKind::Comma) {
                return None;
            }
        }
        if !self.expect_next(TokenKind::RBrace) {
            return None;
        }
        Some(Expr::Hash(pairs))
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        if !self.expect_next(TokenKind::Ident) {
            return None;
        }
        let name = self.cur.literal.clone();
        if !self.expect_next(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_next(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Expr::Function {
            name,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();
        if self.next_is(TokenKind::RParen) {
            self.advance();
            return Some(params);
        }
        self.advance();
        params.push(self.cur.literal.clone());
        while self.next_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            params.push(self.cur.literal.clone());
        }
        if !self.expect_next(TokenKind::RParen) {
            return None;
        }
        Some(params)
    }

    fn parse_call(&mut self, callee: Expr) -> Option<Expr> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expr::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_index(&mut self, collection: Expr) -> Option<Expr> {
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_next(TokenKind::RBracket) {
            return None;
        }
        Some(Expr::Index {
            collection: Box::new(collection),
            index: Box::new(index),
        })
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        let operator = self.cur.clone();
        let precedence = self.cur_precedence();
        self.advance();
        let right = self.parse_expression(precedence)?;
        Some(Expr::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn parse(src: &str) -> (Program, Vec<String>) {
        let lexer = Lexer::new(src);
        let mut parser = Parser::new(lexer);
        parser.parse_program()
    }

    #[test]
    fn parses_var_statement() {
        let (program, errors) = parse("var x = 5;");
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 1);
        assert_eq!(
            program.statements[0],
            Stmt::Var {
                name: "x".into(),
                value: Expr::Integer(5)
            }
        );
    }

    #[test]
    fn precedence_nests_multiplication_tighter_than_addition() {
        let (program, errors) = parse("a + b * c;");
        assert!(errors.is_empty());
        assert_eq!(program.statements[0].to_string(), "(a + (b * c));");
    }

    #[test]
    fn left_associates_same_precedence_operators() {
        let (program, errors) = parse("1 - 2 - 3;");
        assert!(errors.is_empty());
        assert_eq!(program.statements[0].to_string(), "((1 - 2) - 3);");
    }

    #[test]
    fn parses_if_elif_else_cascade() {
        let (program, errors) = parse("if a { 1 } elif b { 2 } else { 3 }");
        assert!(errors.is_empty());
        match &program.statements[0] {
            Stmt::If {
                elifs, alternative, ..
            } => {
                assert_eq!(elifs.len(), 1);
                assert!(alternative.is_some());
            }
            other => panic!("expected if statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_for_loop_header() {
        let (program, errors) = parse("for var i = 0; i < 3; i += 1 { println(i) }");
        assert!(errors.is_empty(), "{errors:?}");
        assert!(matches!(program.statements[0], Stmt::For { .. }));
    }

    #[test]
    fn parses_function_literal_and_call() {
        let (program, errors) = parse("func add(a, b) { return a + b } add(1, 2);");
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn reassignment_uses_single_equals_not_double() {
        let (program, errors) = parse("x = 5;");
        assert!(errors.is_empty());
        assert_eq!(
            program.statements[0],
            Stmt::Reassign {
                name: "x".into(),
                value: Expr::Integer(5)
            }
        );
    }

    #[test]
    fn parses_array_and_hash_literals() {
        let (program, errors) = parse(r#"[1, 2, 3]; {"a": 1, "b": 2};"#);
        assert!(errors.is_empty());
        assert!(matches!(program.statements[0], Stmt::Expression(Expr::Array(_))));
        assert!(matches!(program.statements[1], Stmt::Expression(Expr::Hash(_))));
    }

    #[test]
    fn missing_closing_paren_is_a_parse_error() {
        let (_program, errors) = parse("(1 + 2;");
        assert!(!errors.is_empty());
    }

    #[test]
    fn lexer_illegal_token_kind_constant_is_reachable() {
        assert_eq!(precedence_of(TokenKind::Illegal), Precedence::Lowest);
    }
}
