//! Rewrite rules over signed formulas.
//!
//! A rule takes a primary signed formula and, for KE eliminations, a
//! secondary one. It returns the produced signed formulas or `None` if the
//! pattern does not match. Alpha rules return the formulas to append to the
//! branch, beta rules one head per new branch.

use std::{fmt, rc::Rc};

use crate::logic::{signed::SignedFormula, Formula};

pub type RuleFn = fn(&SignedFormula, Option<&SignedFormula>) -> Option<Vec<SignedFormula>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleName {
    FalseOr,
    FalseOrN,
    TrueAnd,
    TrueAndN,
    FalseImpl,
    FalseNot,
    NegTrue,
    TrueOr,
    TrueOrN,
    FalseAnd,
    FalseAndN,
    TrueImpl,
    TrueOrLeft,
    TrueOrRight,
    TrueOrNElim,
    FalseAndLeft,
    FalseAndRight,
    FalseAndNElim,
    TrueImplLeft,
    TrueImplRight,
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleName::FalseOr => "F|",
            RuleName::FalseOrN => "F|n",
            RuleName::TrueAnd => "T&",
            RuleName::TrueAndN => "T&n",
            RuleName::FalseImpl => "F->",
            RuleName::FalseNot => "F!",
            RuleName::NegTrue => "T!",
            RuleName::TrueOr => "T|",
            RuleName::TrueOrN => "T|n",
            RuleName::FalseAnd => "F&",
            RuleName::FalseAndN => "F&n",
            RuleName::TrueImpl => "T->",
            RuleName::TrueOrLeft => "T|,F1",
            RuleName::TrueOrRight => "T|,F2",
            RuleName::TrueOrNElim => "T|n,Fi",
            RuleName::FalseAndLeft => "F&,T1",
            RuleName::FalseAndRight => "F&,T2",
            RuleName::FalseAndNElim => "F&n,Ti",
            RuleName::TrueImplLeft => "T->,T1",
            RuleName::TrueImplRight => "T->,F2",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: RuleName,
    apply: RuleFn,
}

impl Rule {
    pub fn apply(
        &self,
        primary: &SignedFormula,
        secondary: Option<&SignedFormula>,
    ) -> Option<Vec<SignedFormula>> {
        (self.apply)(primary, secondary)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({})", self.name)
    }
}

const fn rule(name: RuleName, apply: RuleFn) -> Rule {
    Rule { name, apply }
}

pub const ALPHA_RULES: &[Rule] = &[
    rule(RuleName::FalseOr, false_or),
    rule(RuleName::FalseOrN, false_or_n),
    rule(RuleName::TrueAnd, true_and),
    rule(RuleName::TrueAndN, true_and_n),
    rule(RuleName::FalseImpl, false_impl),
    rule(RuleName::FalseNot, false_not),
    rule(RuleName::NegTrue, true_not),
];

pub const BETA_RULES: &[Rule] = &[
    rule(RuleName::TrueOr, true_or),
    rule(RuleName::TrueOrN, true_or_n),
    rule(RuleName::FalseAnd, false_and),
    rule(RuleName::FalseAndN, false_and_n),
    rule(RuleName::TrueImpl, true_impl),
];

pub const KE_ELIMINATION_RULES: &[Rule] = &[
    rule(RuleName::TrueOrLeft, true_or_left),
    rule(RuleName::TrueOrRight, true_or_right),
    rule(RuleName::TrueOrNElim, true_or_n_elim),
    rule(RuleName::FalseAndLeft, false_and_left),
    rule(RuleName::FalseAndRight, false_and_right),
    rule(RuleName::FalseAndNElim, false_and_n_elim),
    rule(RuleName::TrueImplLeft, true_impl_left),
    rule(RuleName::TrueImplRight, true_impl_right),
];

/// First rule of `table` that fires on the given formulas.
pub fn fire(
    table: &[Rule],
    primary: &SignedFormula,
    secondary: Option<&SignedFormula>,
) -> Option<(RuleName, Vec<SignedFormula>)> {
    table
        .iter()
        .find_map(|r| r.apply(primary, secondary).map(|out| (r.name, out)))
}

/// Expands an alpha formula.
///
/// # Panics
/// If `sf` is not an alpha formula.
pub fn apply_alpha(sf: &SignedFormula) -> (RuleName, Vec<SignedFormula>) {
    fire(ALPHA_RULES, sf, None).unwrap_or_else(|| panic!("no alpha rule applies to {}", sf))
}

/// Branch heads of a beta formula.
///
/// # Panics
/// If `sf` is not a beta formula.
pub fn apply_beta(sf: &SignedFormula) -> (RuleName, Vec<SignedFormula>) {
    fire(BETA_RULES, sf, None).unwrap_or_else(|| panic!("no beta rule applies to {}", sf))
}

/// KE elimination of `beta` using `secondary`.
pub fn eliminate(
    beta: &SignedFormula,
    secondary: &SignedFormula,
) -> Option<(RuleName, Vec<SignedFormula>)> {
    fire(KE_ELIMINATION_RULES, beta, Some(secondary))
}

fn signed_all(sign: bool, children: &[Rc<Formula>]) -> Vec<SignedFormula> {
    children
        .iter()
        .map(|c| SignedFormula::new(sign, c.clone()))
        .collect()
}

fn false_or(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::Or(l, r)) => Some(vec![
            SignedFormula::f(l.clone()),
            SignedFormula::f(r.clone()),
        ]),
        _ => None,
    }
}

fn false_or_n(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::OrN(cs)) => Some(signed_all(false, cs)),
        _ => None,
    }
}

fn true_and(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::And(l, r)) => Some(vec![
            SignedFormula::t(l.clone()),
            SignedFormula::t(r.clone()),
        ]),
        _ => None,
    }
}

fn true_and_n(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::AndN(cs)) => Some(signed_all(true, cs)),
        _ => None,
    }
}

fn false_impl(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::Impl(l, r)) => Some(vec![
            SignedFormula::t(l.clone()),
            SignedFormula::f(r.clone()),
        ]),
        _ => None,
    }
}

fn false_not(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::Not(c)) => Some(vec![SignedFormula::t(c.clone())]),
        _ => None,
    }
}

fn true_not(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::Not(c)) => Some(vec![SignedFormula::f(c.clone())]),
        _ => None,
    }
}

fn true_or(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::Or(l, r)) => Some(vec![
            SignedFormula::t(l.clone()),
            SignedFormula::t(r.clone()),
        ]),
        _ => None,
    }
}

fn true_or_n(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::OrN(cs)) => Some(signed_all(true, cs)),
        _ => None,
    }
}

fn false_and(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::And(l, r)) => Some(vec![
            SignedFormula::f(l.clone()),
            SignedFormula::f(r.clone()),
        ]),
        _ => None,
    }
}

fn false_and_n(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::AndN(cs)) => Some(signed_all(false, cs)),
        _ => None,
    }
}

fn true_impl(sf: &SignedFormula, _: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::Impl(l, r)) => Some(vec![
            SignedFormula::f(l.clone()),
            SignedFormula::t(r.clone()),
        ]),
        _ => None,
    }
}

// Eliminations. The secondary must carry `sign` and be structurally equal
// to `operand`.
fn is_secondary(secondary: Option<&SignedFormula>, sign: bool, operand: &Formula) -> bool {
    matches!(secondary, Some(s) if s.sign() == sign && s.formula().as_ref() == operand)
}

// Drops the first operand equal to the secondary and rebuilds with the
// fitting arity.
fn without_operand(
    children: &[Rc<Formula>],
    secondary: Option<&SignedFormula>,
    sign: bool,
) -> Option<Vec<Rc<Formula>>> {
    let s = secondary.filter(|s| s.sign() == sign)?;
    let i = children.iter().position(|c| c == s.formula())?;
    let mut rest = children.to_vec();
    rest.remove(i);
    Some(rest)
}

fn true_or_left(sf: &SignedFormula, s: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::Or(l, r)) if is_secondary(s, false, l) => Some(vec![SignedFormula::t(r.clone())]),
        _ => None,
    }
}

fn true_or_right(sf: &SignedFormula, s: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::Or(l, r)) if is_secondary(s, false, r) => Some(vec![SignedFormula::t(l.clone())]),
        _ => None,
    }
}

fn true_or_n_elim(sf: &SignedFormula, s: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::OrN(cs)) => {
            let rest = without_operand(cs, s, false)?;
            Some(vec![SignedFormula::t(Formula::or_of(rest))])
        }
        _ => None,
    }
}

fn false_and_left(sf: &SignedFormula, s: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::And(l, r)) if is_secondary(s, true, l) => Some(vec![SignedFormula::f(r.clone())]),
        _ => None,
    }
}

fn false_and_right(sf: &SignedFormula, s: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::And(l, r)) if is_secondary(s, true, r) => Some(vec![SignedFormula::f(l.clone())]),
        _ => None,
    }
}

fn false_and_n_elim(sf: &SignedFormula, s: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (false, Formula::AndN(cs)) => {
            let rest = without_operand(cs, s, true)?;
            Some(vec![SignedFormula::f(Formula::and_of(rest))])
        }
        _ => None,
    }
}

fn true_impl_left(sf: &SignedFormula, s: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::Impl(l, r)) if is_secondary(s, true, l) => Some(vec![SignedFormula::t(r.clone())]),
        _ => None,
    }
}

fn true_impl_right(sf: &SignedFormula, s: Option<&SignedFormula>) -> Option<Vec<SignedFormula>> {
    match (sf.sign(), sf.formula().as_ref()) {
        (true, Formula::Impl(l, r)) if is_secondary(s, false, r) => Some(vec![SignedFormula::f(l.clone())]),
        _ => None,
    }
}
