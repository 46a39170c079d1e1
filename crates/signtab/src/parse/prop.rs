use std::{iter::Peekable, rc::Rc};

use super::{ParseErr, ParseResult, Token, TokenKind, Tokenizer};
use crate::logic::Formula;
use crate::symbol::Symbol;

/// Parses a fully parenthesized propositional formula such as
/// `((a|b|c)->(!d))`.
pub fn parse_formula(formula: &str) -> ParseResult<Rc<Formula>> {
    PropParser::parse(formula)
}

struct PropParser<'f> {
    tokens: Peekable<Tokenizer<'f>>,
}

impl<'f> PropParser<'f> {
    fn parse(formula: &'f str) -> ParseResult<Rc<Formula>> {
        if formula.trim().is_empty() {
            return Err(ParseErr::EmptyFormula);
        }

        let mut parser = Self {
            tokens: Tokenizer::new(formula).peekable(),
        };
        let f = parser.parse_unit()?;

        match parser.tokens.next() {
            None => Ok(f),
            Some(Err(e)) => Err(e),
            Some(Ok(t)) => Err(ParseErr::Expected(
                "end of input".to_string(),
                format!("{} at position {}", t, t.src_pos),
            )),
        }
    }

    // unit := '!' unit | '(' group ')' | atom
    fn parse_unit(&mut self) -> ParseResult<Rc<Formula>> {
        let (kind, spelling) = {
            let t = self.cur_token()?;
            (t.kind, t.spelling)
        };
        match kind {
            TokenKind::Not => {
                self.bump()?;
                Ok(Formula::not(self.parse_unit()?))
            }
            TokenKind::LParen => self.parse_group(),
            TokenKind::Ident => {
                let name = Symbol::intern(spelling);
                self.bump()?;
                Ok(Rc::new(Formula::Atom(name)))
            }
            _ => Err(ParseErr::Expected("formula".to_string(), self.got_msg())),
        }
    }

    // group := unit (op unit)*, all ops the same
    fn parse_group(&mut self) -> ParseResult<Rc<Formula>> {
        let open = self.cur_token()?.src_pos;
        self.eat(TokenKind::LParen)?;

        let mut operands = vec![self.parse_unit()?];
        let mut op: Option<TokenKind> = None;

        while let Some(Ok(t)) = self.tokens.peek() {
            if !t.kind.is_connective() {
                break;
            }
            let (kind, pos) = (t.kind, t.src_pos);
            match op {
                Some(o) if o != kind => return Err(ParseErr::MixedConnectives(pos)),
                _ => op = Some(kind),
            }
            self.bump()?;
            operands.push(self.parse_unit()?);
        }

        self.eat(TokenKind::RParen)?;

        Ok(match op {
            None => operands.remove(0),
            Some(TokenKind::Impl) if operands.len() > 2 => return Err(ParseErr::ImplChain(open)),
            Some(TokenKind::Impl) => {
                let r = operands.remove(1);
                Formula::implies(operands.remove(0), r)
            }
            Some(TokenKind::And) => Formula::and_of(operands),
            Some(_) => Formula::or_of(operands),
        })
    }

    fn next_is(&mut self, expected: TokenKind) -> bool {
        matches!(self.tokens.peek(), Some(Ok(t)) if t.kind == expected)
    }

    fn bump(&mut self) -> ParseResult<()> {
        match self.tokens.next() {
            Some(Ok(_)) => Ok(()),
            Some(Err(e)) => Err(e),
            None => Err(ParseErr::Expected(
                "token".to_string(),
                "end of input".to_string(),
            )),
        }
    }

    fn eat(&mut self, expected: TokenKind) -> ParseResult<()> {
        if self.next_is(expected) {
            self.bump()
        } else {
            match self.tokens.peek() {
                Some(Err(e)) => Err(e.clone()),
                _ => Err(ParseErr::Expected(expected.to_string(), self.got_msg())),
            }
        }
    }

    fn got_msg(&mut self) -> String {
        match self.tokens.peek() {
            Some(Ok(t)) => format!("{} at position {}", t, t.src_pos),
            _ => "end of input".to_string(),
        }
    }

    fn cur_token(&mut self) -> ParseResult<&Token<'f>> {
        match self.tokens.peek() {
            Some(Ok(t)) => Ok(t),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ParseErr::Expected(
                "token".to_string(),
                "end of input".to_string(),
            )),
        }
    }
}
