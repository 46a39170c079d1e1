use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
    rc::Rc,
};

use log::trace;

use super::rules;
use crate::logic::{
    signed::{FormulaType, SignedFormula},
    Formula, Valuation,
};
use crate::symbol::Symbol;

/// Distance reported when two atoms are not related at all.
pub const FAR: u32 = u32::MAX;

/// Weight of an edge into a depth-2 connective of the distance formula.
/// Such edges cross from one input formula into another.
pub const CROSSING_WEIGHT: u32 = 1_000_000;

const F_SEEN: u8 = 1;
const T_SEEN: u8 = 2;

/// Bucketed view of the formulas on a branch.
#[derive(Debug, Clone, Default)]
pub struct Branch {
    pub alphas: Vec<Rc<SignedFormula>>,
    pub betas: Vec<Rc<SignedFormula>>,
    pub lits: Vec<Rc<SignedFormula>>,
    signs: HashMap<Symbol, u8>,
    next: usize,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this branch state for a freshly created child node. The resume
    /// index starts over since the child has its own item list.
    pub fn fork(&self) -> Self {
        Self {
            alphas: self.alphas.clone(),
            betas: self.betas.clone(),
            lits: self.lits.clone(),
            signs: self.signs.clone(),
            next: 0,
        }
    }

    /// Routes every not yet seen item of `items` into its bucket. Returns
    /// whether the branch contains a complementary pair of literals.
    pub fn classify(&mut self, items: &[Rc<SignedFormula>]) -> bool {
        let mut closed = false;
        for item in &items[self.next.min(items.len())..] {
            trace!("classify {} as {:?}", item, item.ty());
            match item.ty() {
                FormulaType::Alpha => self.alphas.push(item.clone()),
                FormulaType::Beta => self.betas.push(item.clone()),
                FormulaType::Literal => {
                    if let Some(atom) = item.atom() {
                        let seen = self.signs.entry(atom).or_insert(0);
                        *seen |= if item.sign() { T_SEEN } else { F_SEEN };
                        closed |= *seen == T_SEEN | F_SEEN;
                    }
                    self.lits.push(item.clone());
                }
            }
        }
        self.next = items.len();
        closed
    }

    /// Partial assignment induced by the literals on the branch.
    pub fn valuation(&self) -> Valuation {
        self.lits
            .iter()
            .filter_map(|l| l.atom().map(|a| (a, l.sign())))
            .collect()
    }
}

/// Pairwise distances between the atoms of a problem, measured in the
/// formula tree `(T items conjoined) -> (F items disjoined)`.
#[derive(Debug, Clone, Default)]
pub struct AtomDistances {
    dist: HashMap<(Symbol, Symbol), u32>,
    max: u32,
}

impl AtomDistances {
    pub fn compute(items: &[Rc<SignedFormula>]) -> Self {
        let (trues, falses): (Vec<_>, Vec<_>) = items.iter().partition(|sf| sf.sign());
        let lhs = (!trues.is_empty())
            .then(|| Formula::and_of(trues.iter().map(|sf| sf.formula().clone()).collect()));
        let rhs = (!falses.is_empty())
            .then(|| Formula::or_of(falses.iter().map(|sf| sf.formula().clone()).collect()));
        let root = match (lhs, rhs) {
            (Some(l), Some(r)) => Formula::implies(l, r),
            (Some(f), None) | (None, Some(f)) => f,
            (None, None) => return Self::default(),
        };

        let n = root.size(false);
        let max = 2 * n as u32;
        let mut m = vec![vec![max; n]; n];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = 0;
        }

        let mut occurrences = BTreeMap::new();
        let mut next = 0;
        index_connectives(&root, None, 0, &mut next, &mut m, &mut occurrences);

        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let via = m[i][k] + m[k][j];
                    if via < m[i][j] {
                        m[i][j] = via;
                    }
                }
            }
        }

        let m = &m;
        let atoms: Vec<Symbol> = occurrences.keys().copied().collect();
        let mut d = vec![vec![max; atoms.len()]; atoms.len()];
        for (i, a) in atoms.iter().enumerate() {
            d[i][i] = 0;
            for (j, b) in atoms.iter().enumerate().skip(i + 1) {
                let best = occurrences[a]
                    .iter()
                    .flat_map(|&p| occurrences[b].iter().map(move |&q| m[p][q]))
                    .min()
                    .unwrap_or(max);
                d[i][j] = best;
                d[j][i] = best;
            }
        }

        // Occurrence minima may violate the triangle inequality.
        for k in 0..atoms.len() {
            for i in 0..atoms.len() {
                for j in 0..atoms.len() {
                    let via = d[i][k] + d[k][j];
                    if via < d[i][j] {
                        d[i][j] = via;
                    }
                }
            }
        }

        let mut dist = HashMap::new();
        for (i, a) in atoms.iter().enumerate() {
            for (j, b) in atoms.iter().enumerate() {
                dist.insert((*a, *b), d[i][j]);
            }
        }

        Self { dist, max }
    }

    pub fn get(&self, a: Symbol, b: Symbol) -> Option<u32> {
        self.dist.get(&(a, b)).copied()
    }

    /// Distance assigned to unconnected connectives.
    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn atoms(&self) -> BTreeSet<Symbol> {
        self.dist.keys().map(|(a, _)| *a).collect()
    }
}

// Connectives are numbered depth first. Atoms are located at their parent
// connective.
fn index_connectives(
    f: &Formula,
    parent: Option<usize>,
    depth: usize,
    next: &mut usize,
    m: &mut [Vec<u32>],
    occurrences: &mut BTreeMap<Symbol, BTreeSet<usize>>,
) {
    if let Formula::Atom(a) = f {
        if let Some(p) = parent {
            occurrences.entry(*a).or_default().insert(p);
        }
        return;
    }

    let this = *next;
    *next += 1;
    if let Some(p) = parent {
        let w = if depth == 2 { CROSSING_WEIGHT } else { 1 };
        m[p][this] = w;
        m[this][p] = w;
    }
    for c in f.operands() {
        index_connectives(c, Some(this), depth + 1, next, m, occurrences);
    }
}

/// First (beta, literal) pair, in beta-major order, for which a KE
/// elimination rule fires.
pub fn find_elimination(
    betas: &[Rc<SignedFormula>],
    lits: &[Rc<SignedFormula>],
) -> Option<(usize, usize)> {
    betas.iter().enumerate().find_map(|(b, beta)| {
        lits.iter()
            .position(|lit| rules::eliminate(beta, lit).is_some())
            .map(|l| (b, l))
    })
}

/// Next expansion step on a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Alpha(usize),
    Beta(usize),
    Eliminate { beta: usize, lit: usize },
    Pb(usize),
}

/// Everything a strategy may look at when picking the next step.
pub struct BranchView<'a> {
    pub branch: &'a Branch,
    pub distances: &'a AtomDistances,
    /// Per beta: not yet split on by an ancestor-or-self.
    pub open: &'a [bool],
    pub relevance: Option<&'a BTreeSet<Symbol>>,
}

impl<'a> BranchView<'a> {
    pub fn new(branch: &'a Branch, distances: &'a AtomDistances) -> Self {
        Self {
            branch,
            distances,
            open: &[],
            relevance: None,
        }
    }

    pub fn first_open(&self) -> Option<usize> {
        self.open.iter().position(|&o| o)
    }
}

pub trait Strategy {
    fn choose_alpha(&self, _view: &BranchView<'_>) -> usize {
        0
    }

    fn choose_beta(&self, _view: &BranchView<'_>) -> usize {
        0
    }

    /// Picks the beta to split on. `first_open` is the leftmost beta not yet
    /// split on this branch.
    fn choose_pb(&self, _view: &BranchView<'_>, first_open: usize) -> usize {
        first_open
    }

    fn next_rule(&self, view: &BranchView<'_>) -> Option<Step>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    TopDown,
    BottomUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PbHeuristic {
    #[default]
    Leftmost,
    Valuation,
    Polarity,
    Relevance,
    RelevanceNegLast,
}

impl fmt::Display for PbHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PbHeuristic::Leftmost => "leftmost",
            PbHeuristic::Valuation => "valuation",
            PbHeuristic::Polarity => "polarity",
            PbHeuristic::Relevance => "relevance",
            PbHeuristic::RelevanceNegLast => "relevance, negation last",
        };
        write!(f, "{}", s)
    }
}
