use std::{collections::BTreeSet, fmt, rc::Rc};

use super::{Formula, Polarity, Valuation};
use crate::calculi::tableaux::strategy::AtomDistances;
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaType {
    Alpha,
    Beta,
    Literal,
}

/// A formula with a truth sign. `true` stands for T, `false` for F.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedFormula {
    sign: bool,
    formula: Rc<Formula>,
    ty: FormulaType,
}

impl SignedFormula {
    pub fn new(sign: bool, formula: Rc<Formula>) -> Self {
        let ty = classify(sign, &formula);
        Self { sign, formula, ty }
    }

    pub fn t(formula: Rc<Formula>) -> Self {
        Self::new(true, formula)
    }

    pub fn f(formula: Rc<Formula>) -> Self {
        Self::new(false, formula)
    }

    pub fn sign(&self) -> bool {
        self.sign
    }

    pub fn formula(&self) -> &Rc<Formula> {
        &self.formula
    }

    pub fn ty(&self) -> FormulaType {
        self.ty
    }

    pub fn is_literal(&self) -> bool {
        self.ty == FormulaType::Literal
    }

    /// The atom of a literal.
    pub fn atom(&self) -> Option<Symbol> {
        match self.formula.as_ref() {
            Formula::Atom(a) => Some(*a),
            _ => None,
        }
    }

    /// Whether the valuation makes the signed formula hold.
    pub fn value(&self, valuation: &Valuation) -> Option<bool> {
        self.formula.value(valuation).map(|v| v == self.sign)
    }

    pub fn polarity(&self, atom: Symbol) -> Polarity {
        let p = self.formula.polarity(atom);
        if self.sign {
            p
        } else {
            p.flip()
        }
    }

    pub fn atoms_out_of(&self, set: &BTreeSet<Symbol>) -> usize {
        self.formula.atoms_out_of(set)
    }

    pub fn distance_from(&self, valuation: &Valuation, distances: &AtomDistances) -> u32 {
        self.formula.distance_from(valuation, distances)
    }

    /// String key identifying the signed formula structurally.
    pub fn fingerprint(&self) -> String {
        self.to_string()
    }
}

fn classify(sign: bool, formula: &Formula) -> FormulaType {
    match (formula, sign) {
        (Formula::Atom(_), _) => FormulaType::Literal,
        (Formula::Not(_), _) => FormulaType::Alpha,
        (Formula::And(..) | Formula::AndN(_), true) => FormulaType::Alpha,
        (Formula::And(..) | Formula::AndN(_), false) => FormulaType::Beta,
        (Formula::Or(..) | Formula::OrN(_) | Formula::Impl(..), true) => FormulaType::Beta,
        (Formula::Or(..) | Formula::OrN(_) | Formula::Impl(..), false) => FormulaType::Alpha,
    }
}

impl fmt::Display for SignedFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.sign { "T" } else { "F" };
        write!(f, "{} {}", sign, self.formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::prop::parse_formula;
    use crate::session;

    fn sf(sign: bool, f: &str) -> SignedFormula {
        SignedFormula::new(sign, parse_formula(f).unwrap())
    }

    #[test]
    fn classification() {
        session(|| {
            let table = [
                (true, "(!a)", FormulaType::Alpha),
                (false, "(!a)", FormulaType::Alpha),
                (true, "(a&b)", FormulaType::Alpha),
                (false, "(a&b)", FormulaType::Beta),
                (true, "(a&b&c)", FormulaType::Alpha),
                (false, "(a&b&c)", FormulaType::Beta),
                (true, "(a|b)", FormulaType::Beta),
                (false, "(a|b)", FormulaType::Alpha),
                (true, "(a|b|c)", FormulaType::Beta),
                (false, "(a|b|c)", FormulaType::Alpha),
                (true, "(a->b)", FormulaType::Beta),
                (false, "(a->b)", FormulaType::Alpha),
                (true, "a", FormulaType::Literal),
                (false, "a", FormulaType::Literal),
            ];
            for (sign, f, ty) in table {
                assert_eq!(ty, sf(sign, f).ty(), "{} {}", sign, f);
            }
        })
    }

    #[test]
    fn display() {
        session(|| {
            assert_eq!("T (a|b)", sf(true, "(a|b)").to_string());
            assert_eq!("F a", sf(false, "a").to_string());
        })
    }

    #[test]
    fn sign_flips_value_and_polarity() {
        session(|| {
            let a = Symbol::intern("a");
            let v: Valuation = [(a, false)].into_iter().collect();
            assert_eq!(Some(true), sf(false, "(a&b)").value(&v));
            assert_eq!(Some(false), sf(true, "(a&b)").value(&v));
            assert_eq!(None, sf(true, "(a|b)").value(&v));
            assert_eq!(Polarity::Negative, sf(false, "(a|b)").polarity(a));
            assert_eq!(Polarity::Positive, sf(false, "(a->b)").polarity(a));
        })
    }
}
