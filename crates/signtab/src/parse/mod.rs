use std::fmt;

pub mod dimacs;
pub mod prop;
pub mod prove;

pub type ParseResult<T> = Result<T, ParseErr>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseErr {
    Expected(String, String),
    EmptyFormula,
    UnknownToken(char, usize),
    MixedConnectives(usize),
    ImplChain(usize),
    InvalidSign(String),
    InvalidHeader(String),
    InvalidLiteral(String),
    VariableOutOfRange(i64, usize),
    MissingClauses(usize, usize),
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErr::Expected(expected, got) => write!(f, "Expected {} but got {}", expected, got),
            ParseErr::EmptyFormula => write!(f, "Empty formula"),
            ParseErr::UnknownToken(c, pos) => {
                write!(f, "Unexpected character '{}' at position {}", c, pos)
            }
            ParseErr::MixedConnectives(pos) => write!(
                f,
                "Different connectives in one group at position {}; add parentheses",
                pos
            ),
            ParseErr::ImplChain(pos) => write!(
                f,
                "Implication chain at position {} needs explicit parentheses",
                pos
            ),
            ParseErr::InvalidSign(line) => {
                write!(f, "Signed formula must start with T or F, got '{}'", line)
            }
            ParseErr::InvalidHeader(line) => write!(f, "Invalid DIMACS header '{}'", line),
            ParseErr::InvalidLiteral(tok) => write!(f, "Invalid DIMACS literal '{}'", tok),
            ParseErr::VariableOutOfRange(lit, vars) => write!(
                f,
                "Literal {} refers to a variable above the declared {}",
                lit, vars
            ),
            ParseErr::MissingClauses(found, declared) => write!(
                f,
                "Found {} clauses but the header declares {}",
                found, declared
            ),
        }
    }
}

impl std::error::Error for ParseErr {}

#[derive(Debug, PartialEq, Eq)]
pub struct Token<'t> {
    pub kind: TokenKind,
    pub spelling: &'t str,
    pub src_pos: usize,
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spelling)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    And,
    Or,
    Not,
    Impl,
    LParen,
    RParen,
    Ident,
}

impl TokenKind {
    pub fn is_connective(self) -> bool {
        matches!(self, TokenKind::And | TokenKind::Or | TokenKind::Impl)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::And => "&",
            TokenKind::Or => "|",
            TokenKind::Not => "!",
            TokenKind::Impl => "->",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Ident => "atom",
        };

        write!(f, "{}", s)
    }
}

/// Splits a formula into tokens. Atom names start with an alphanumeric
/// character and continue with alphanumerics, `_` or `,`.
pub struct Tokenizer<'f> {
    formula: &'f str,
    pos: usize,
}

impl<'f> Tokenizer<'f> {
    pub fn new(formula: &'f str) -> Self {
        Self { formula, pos: 0 }
    }

    fn advance(&mut self, size: usize) {
        self.pos += size;
        self.formula = &self.formula[size..];
    }

    fn next_token(&mut self) -> Option<ParseResult<Token<'f>>> {
        let trimmed = self.formula.trim_start();
        self.advance(self.formula.len() - trimmed.len());

        let c = self.formula.chars().next()?;
        let (kind, size) = match c {
            '&' => (TokenKind::And, 1),
            '|' => (TokenKind::Or, 1),
            '!' => (TokenKind::Not, 1),
            '(' => (TokenKind::LParen, 1),
            ')' => (TokenKind::RParen, 1),
            '-' if self.formula.starts_with("->") => (TokenKind::Impl, 2),
            c if c.is_ascii_alphanumeric() => {
                let size = self
                    .formula
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == ','))
                    .unwrap_or(self.formula.len());
                (TokenKind::Ident, size)
            }
            c => {
                let err = ParseErr::UnknownToken(c, self.pos);
                self.formula = "";
                return Some(Err(err));
            }
        };

        let t = Token {
            kind,
            spelling: &self.formula[..size],
            src_pos: self.pos,
        };
        self.advance(size);
        Some(Ok(t))
    }
}

impl<'f> Iterator for Tokenizer<'f> {
    type Item = ParseResult<Token<'f>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
