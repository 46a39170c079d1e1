pub mod signed;

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    rc::Rc,
};

use crate::calculi::tableaux::strategy::{AtomDistances, FAR};
use crate::symbol::Symbol;

/// Partial truth assignment to atoms.
pub type Valuation = HashMap<Symbol, bool>;

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Formula {
    Atom(Symbol),
    Not(Rc<Formula>),
    And(Rc<Formula>, Rc<Formula>),
    Or(Rc<Formula>, Rc<Formula>),
    Impl(Rc<Formula>, Rc<Formula>),
    AndN(Vec<Rc<Formula>>),
    OrN(Vec<Rc<Formula>>),
}

/// Signed occurrence of an atom inside a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Absent,
    Negative,
    Positive,
    Mixed,
}

impl Polarity {
    pub fn flip(self) -> Self {
        match self {
            Polarity::Negative => Polarity::Positive,
            Polarity::Positive => Polarity::Negative,
            p => p,
        }
    }

    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Polarity::Absent, p) | (p, Polarity::Absent) => p,
            (p, q) if p == q => p,
            _ => Polarity::Mixed,
        }
    }
}

impl Formula {
    pub fn atom(name: &str) -> Rc<Self> {
        Rc::new(Formula::Atom(Symbol::intern(name)))
    }

    pub fn not(child: Rc<Formula>) -> Rc<Self> {
        Rc::new(Formula::Not(child))
    }

    pub fn and(left: Rc<Formula>, right: Rc<Formula>) -> Rc<Self> {
        Rc::new(Formula::And(left, right))
    }

    pub fn or(left: Rc<Formula>, right: Rc<Formula>) -> Rc<Self> {
        Rc::new(Formula::Or(left, right))
    }

    pub fn implies(left: Rc<Formula>, right: Rc<Formula>) -> Rc<Self> {
        Rc::new(Formula::Impl(left, right))
    }

    pub fn and_n(children: Vec<Rc<Formula>>) -> Rc<Self> {
        assert!(children.len() >= 3, "n-ary conjunction needs 3 or more operands");
        Rc::new(Formula::AndN(children))
    }

    pub fn or_n(children: Vec<Rc<Formula>>) -> Rc<Self> {
        assert!(children.len() >= 3, "n-ary disjunction needs 3 or more operands");
        Rc::new(Formula::OrN(children))
    }

    /// Conjunction of `children` with the arity picked from their count.
    pub fn and_of(mut children: Vec<Rc<Formula>>) -> Rc<Self> {
        match children.len() {
            0 => panic!("empty conjunction"),
            1 => children.remove(0),
            2 => {
                let right = children.remove(1);
                Formula::and(children.remove(0), right)
            }
            _ => Formula::and_n(children),
        }
    }

    /// Disjunction of `children` with the arity picked from their count.
    pub fn or_of(mut children: Vec<Rc<Formula>>) -> Rc<Self> {
        match children.len() {
            0 => panic!("empty disjunction"),
            1 => children.remove(0),
            2 => {
                let right = children.remove(1);
                Formula::or(children.remove(0), right)
            }
            _ => Formula::or_n(children),
        }
    }

    /// Direct subformulas, left to right.
    pub fn operands(&self) -> Vec<&Rc<Formula>> {
        match self {
            Formula::Atom(_) => vec![],
            Formula::Not(c) => vec![c],
            Formula::And(l, r) | Formula::Or(l, r) | Formula::Impl(l, r) => vec![l, r],
            Formula::AndN(cs) | Formula::OrN(cs) => cs.iter().collect(),
        }
    }

    /// Leftmost operand of a binary or n-ary connective.
    pub fn left_operand(&self) -> Option<&Rc<Formula>> {
        match self {
            Formula::And(l, _) | Formula::Or(l, _) | Formula::Impl(l, _) => Some(l),
            Formula::AndN(cs) | Formula::OrN(cs) => cs.first(),
            Formula::Atom(_) | Formula::Not(_) => None,
        }
    }

    /// Number of nodes in the formula tree. Atoms are only counted if
    /// `count_atoms` is set.
    pub fn size(&self, count_atoms: bool) -> usize {
        match self {
            Formula::Atom(_) => usize::from(count_atoms),
            f => 1 + f.operands().iter().map(|c| c.size(count_atoms)).sum::<usize>(),
        }
    }

    /// Three-valued evaluation. `None` means the valuation does not decide
    /// the formula.
    pub fn value(&self, valuation: &Valuation) -> Option<bool> {
        match self {
            Formula::Atom(a) => valuation.get(a).copied(),
            Formula::Not(c) => c.value(valuation).map(|v| !v),
            Formula::And(l, r) => match (l.value(valuation), r.value(valuation)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Formula::Or(l, r) => match (l.value(valuation), r.value(valuation)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            Formula::Impl(l, r) => match (l.value(valuation), r.value(valuation)) {
                (Some(false), _) | (_, Some(true)) => Some(true),
                (Some(true), Some(false)) => Some(false),
                _ => None,
            },
            Formula::AndN(cs) => Self::fold_value(cs, valuation, false),
            Formula::OrN(cs) => Self::fold_value(cs, valuation, true),
        }
    }

    // `dominant` decides the whole formula as soon as one child takes it.
    fn fold_value(children: &[Rc<Formula>], valuation: &Valuation, dominant: bool) -> Option<bool> {
        let mut decided = 0;
        for c in children {
            match c.value(valuation) {
                Some(v) if v == dominant => return Some(dominant),
                Some(_) => decided += 1,
                None => {}
            }
        }
        (decided == children.len()).then_some(!dominant)
    }

    pub fn polarity(&self, atom: Symbol) -> Polarity {
        match self {
            Formula::Atom(a) if *a == atom => Polarity::Positive,
            Formula::Atom(_) => Polarity::Absent,
            Formula::Not(c) => c.polarity(atom).flip(),
            Formula::Impl(l, r) => l.polarity(atom).flip().combine(r.polarity(atom)),
            f => f
                .operands()
                .iter()
                .fold(Polarity::Absent, |p, c| p.combine(c.polarity(atom))),
        }
    }

    /// Number of atom occurrences assigned by `valuation`.
    pub fn atoms_in(&self, valuation: &Valuation) -> usize {
        self.count_atoms(&|a| valuation.contains_key(&a))
    }

    /// Number of atom occurrences not assigned by `valuation`.
    pub fn atoms_out(&self, valuation: &Valuation) -> usize {
        self.count_atoms(&|a| !valuation.contains_key(&a))
    }

    /// Number of atom occurrences outside of `set`.
    pub fn atoms_out_of(&self, set: &BTreeSet<Symbol>) -> usize {
        self.count_atoms(&|a| !set.contains(&a))
    }

    fn count_atoms(&self, pred: &impl Fn(Symbol) -> bool) -> usize {
        match self {
            Formula::Atom(a) => usize::from(pred(*a)),
            f => f.operands().iter().map(|c| c.count_atoms(pred)).sum(),
        }
    }

    pub fn atoms(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Formula::Atom(a) => {
                out.insert(*a);
            }
            f => f.operands().iter().for_each(|c| c.atoms(out)),
        }
    }

    /// Smallest known distance between an atom of this formula and an atom
    /// assigned by `valuation`.
    pub fn distance_from(&self, valuation: &Valuation, distances: &AtomDistances) -> u32 {
        match self {
            Formula::Atom(a) => valuation
                .keys()
                .filter_map(|v| distances.get(*a, *v))
                .min()
                .unwrap_or(FAR),
            f => f
                .operands()
                .iter()
                .map(|c| c.distance_from(valuation, distances))
                .min()
                .unwrap_or(FAR),
        }
    }
}

fn fmt_joined(f: &mut fmt::Formatter<'_>, children: &[Rc<Formula>], op: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, c) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", op)?;
        }
        write!(f, "{}", c)?;
    }
    write!(f, ")")
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Atom(a) => write!(f, "{}", a),
            Formula::Not(c) => write!(f, "(!{})", c),
            Formula::And(l, r) => write!(f, "({}&{})", l, r),
            Formula::Or(l, r) => write!(f, "({}|{})", l, r),
            Formula::Impl(l, r) => write!(f, "({}->{})", l, r),
            Formula::AndN(cs) => fmt_joined(f, cs, "&"),
            Formula::OrN(cs) => fmt_joined(f, cs, "|"),
        }
    }
}
