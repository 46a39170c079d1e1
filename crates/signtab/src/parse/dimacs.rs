//! DIMACS CNF reader.
//!
//! Variable `k` becomes the atom `xk`. Every clause turns into one `T`
//! formula: the left-nested disjunction of its literals.

use std::rc::Rc;

use log::debug;

use super::{ParseErr, ParseResult};
use crate::logic::{signed::SignedFormula, Formula};

#[derive(Debug, Clone, Copy)]
struct Header {
    vars: usize,
    clauses: usize,
}

fn parse_header(line: &str) -> ParseResult<Header> {
    let invalid = || ParseErr::InvalidHeader(line.to_string());
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["p", "cnf", vars, clauses] => Ok(Header {
            vars: vars.parse().map_err(|_| invalid())?,
            clauses: clauses.parse().map_err(|_| invalid())?,
        }),
        _ => Err(invalid()),
    }
}

fn literal(lit: i64) -> Rc<Formula> {
    let atom = Formula::atom(&format!("x{}", lit.unsigned_abs()));
    if lit < 0 {
        Formula::not(atom)
    } else {
        atom
    }
}

fn parse_clause(line: &str, header: Header) -> ParseResult<Rc<Formula>> {
    let mut clause: Option<Rc<Formula>> = None;

    for tok in line.split_whitespace() {
        let lit: i64 = tok
            .parse()
            .map_err(|_| ParseErr::InvalidLiteral(tok.to_string()))?;
        if lit == 0 {
            return clause.ok_or_else(|| ParseErr::InvalidLiteral(tok.to_string()));
        }
        if lit.unsigned_abs() > header.vars as u64 {
            return Err(ParseErr::VariableOutOfRange(lit, header.vars));
        }
        clause = Some(match clause {
            None => literal(lit),
            Some(left) => Formula::or(left, literal(lit)),
        });
    }

    Err(ParseErr::Expected(
        "0 at end of clause".to_string(),
        format!("end of line '{}'", line),
    ))
}

/// Reads a CNF problem. Clause lines after the declared number of clauses
/// are ignored.
pub fn parse_dimacs(text: &str) -> ParseResult<Vec<SignedFormula>> {
    let mut header: Option<Header> = None;
    let mut items = vec![];

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if line.starts_with('p') {
            if header.is_some() {
                return Err(ParseErr::InvalidHeader(line.to_string()));
            }
            header = Some(parse_header(line)?);
            continue;
        }

        let h = header.ok_or_else(|| {
            ParseErr::Expected("problem line".to_string(), format!("'{}'", line))
        })?;
        if items.len() == h.clauses {
            break;
        }
        items.push(SignedFormula::t(parse_clause(line, h)?));
    }

    let h = header.ok_or_else(|| {
        ParseErr::Expected("problem line".to_string(), "end of input".to_string())
    })?;
    if items.len() < h.clauses {
        return Err(ParseErr::MissingClauses(items.len(), h.clauses));
    }
    debug!("read {} clauses over {} variables", items.len(), h.vars);
    Ok(items)
}
