//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize
//! to dialect-specific strings.

use super::dialect::SqlDialect;

/// SQL Token - every element the join compiler emits.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    On,
    Join,
    Inner,
    Left,
    Right,
    Outer,
    OrderBy,
    Asc,
    Desc,
    In,
    IsNull,
    IsNotNull,
    Count,

    // === Punctuation ===
    Comma,
    Dot,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Simple identifier (table, column, alias)
    Ident(String),
    /// Integer literal
    LitInt(i64),
    /// String literal
    LitString(String),
    /// Bound parameter, 1-based in emission order
    Param(usize),
    /// Dialect keyword for FULL OUTER JOIN
    FullOuterJoin,

    // === Function Names ===
    FunctionName(String),

    // === Escape Hatch ===
    /// Raw SQL passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// **Never pass user input to this variant.** Raw SQL is not sanitized.
    /// The join compiler only uses it for computed sort expressions supplied
    /// by application code.
    Raw(String),
}

impl Token {
    /// Serialize this token to a string for the given dialect.
    pub fn serialize(&self, dialect: &dyn SqlDialect) -> String {
        let mut out = String::new();
        self.write_to(dialect, &mut out);
        out
    }

    /// Append this token's text for `dialect` to `out`.
    pub fn write_to(&self, dialect: &dyn SqlDialect, out: &mut String) {
        match self {
            // Keywords
            Token::Select => out.push_str("SELECT"),
            Token::From => out.push_str("FROM"),
            Token::Where => out.push_str("WHERE"),
            Token::And => out.push_str("AND"),
            Token::Or => out.push_str("OR"),
            Token::Not => out.push_str("NOT"),
            Token::As => out.push_str("AS"),
            Token::On => out.push_str("ON"),
            Token::Join => out.push_str("JOIN"),
            Token::Inner => out.push_str("INNER"),
            Token::Left => out.push_str("LEFT"),
            Token::Right => out.push_str("RIGHT"),
            Token::Outer => out.push_str("OUTER"),
            Token::OrderBy => out.push_str("ORDER BY"),
            Token::Asc => out.push_str("ASC"),
            Token::Desc => out.push_str("DESC"),
            Token::In => out.push_str("IN"),
            Token::IsNull => out.push_str("IS NULL"),
            Token::IsNotNull => out.push_str("IS NOT NULL"),
            Token::Count => out.push_str("COUNT"),

            // Punctuation
            Token::Comma => out.push(','),
            Token::Dot => out.push('.'),
            Token::Star => out.push('*'),
            Token::LParen => out.push('('),
            Token::RParen => out.push(')'),

            // Operators
            Token::Eq => out.push('='),
            Token::Ne => out.push_str("<>"),
            Token::Lt => out.push('<'),
            Token::Gt => out.push('>'),
            Token::Lte => out.push_str("<="),
            Token::Gte => out.push_str(">="),

            Token::Space => out.push(' '),

            // Dynamic - dialect-specific formatting
            Token::Ident(name) => out.push_str(&dialect.quote_identifier(name)),
            Token::LitInt(n) => out.push_str(&n.to_string()),
            Token::LitString(s) => out.push_str(&dialect.quote_string(s)),
            Token::Param(n) => out.push_str(&dialect.placeholder(*n)),
            // The compiler checks support before emitting this token.
            Token::FullOuterJoin => {
                out.push_str(dialect.full_outer_join_keyword().unwrap_or("FULL OUTER JOIN"))
            }

            Token::FunctionName(name) => out.push_str(&name.to_uppercase()),

            Token::Raw(s) => out.push_str(s),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Drop all tokens, keeping the allocation.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self, dialect: &dyn SqlDialect) -> String {
        let mut out = String::new();
        self.write_to(dialect, &mut out);
        out
    }

    /// Serialize all tokens into an existing buffer.
    pub fn write_to(&self, dialect: &dyn SqlDialect, out: &mut String) {
        for token in &self.tokens {
            token.write_to(dialect, out);
        }
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }

    /// Push `qualifier.column` with both parts quoted.
    pub fn qualified(&mut self, qualifier: &str, column: &str) -> &mut Self {
        self.push(Token::Ident(qualifier.into()))
            .push(Token::Dot)
            .push(Token::Ident(column.into()))
    }
}
