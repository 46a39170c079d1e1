use super::{prop::parse_formula, ParseErr, ParseResult};
use crate::logic::signed::SignedFormula;

/// Reads a list of signed formulae. Each entry is a sign character `T` or
/// `F` followed by a formula without whitespace, e.g. `T(a|b) Fa`. The sign
/// may be separated from its formula by whitespace.
pub fn parse_prove(text: &str) -> ParseResult<Vec<SignedFormula>> {
    let mut items = vec![];
    let mut rest = text.trim_start();

    while let Some(c) = rest.chars().next() {
        let sign = match c {
            'T' => true,
            'F' => false,
            _ => {
                let entry = rest.split_whitespace().next().unwrap_or(rest);
                return Err(ParseErr::InvalidSign(entry.to_string()));
            }
        };
        rest = rest[c.len_utf8()..].trim_start();

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end == 0 {
            return Err(ParseErr::Expected(
                format!("formula after {}", c),
                "end of input".to_string(),
            ));
        }
        let formula = parse_formula(&rest[..end])?;
        items.push(SignedFormula::new(sign, formula));
        rest = rest[end..].trim_start();
    }

    Ok(items)
}
