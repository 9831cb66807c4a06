//! Token kinds and the token produced by the lexer.
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The kind of a [`Token`]. Punctuation and operators carry no payload of
/// their own; their spelling lives in [`Token::literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    Ident,
    Integer,
    Float,
    String,

    Assign,
    Equal,
    NotEqual,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Modulus,
    Lt,
    Gt,
    Lte,
    Gte,
    PlusAssign,
    MinusAssign,

    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Function,
    Var,
    True,
    False,
    If,
    Elif,
    Else,
    Return,
    For,
    While,
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("func", TokenKind::Function);
    m.insert("var", TokenKind::Var);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("if", TokenKind::If);
    m.insert("elif", TokenKind::Elif);
    m.insert("else", TokenKind::Else);
    m.insert("return", TokenKind::Return);
    m.insert("for", TokenKind::For);
    m.insert("while", TokenKind::While);
    m
});

/// Look up a scanned identifier run in the keyword table, falling back to
/// `Ident` when it names no keyword.
pub fn lookup_ident(word: &str) -> TokenKind {
    KEYWORDS.get(word).copied().unwrap_or(TokenKind::Ident)
}

/// A single lexical token: its kind plus the source spelling that produced
/// it (the literal spelling for numbers/identifiers/strings, the canonical
/// punctuation form otherwise).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self.kind, self.literal)
    }
}
