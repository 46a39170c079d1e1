//! KE with a relevance set `S` of atoms per node.
//!
//! `S` grows only when a `T (!X)` formula is expanded: the atoms of `X`
//! become relevant. A node starts with the relevance set of its parent and
//! hands its own set back to the parent once it is closed or abandoned.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{
    ke::{candidates, has_opposite_polarity, KeStrategy, KeTableau},
    strategy::{find_elimination, BranchView, PbHeuristic, Step, Strategy},
    tree::{NodeId, Tree},
};
use crate::calculus::Prover;
use crate::logic::{signed::SignedFormula, Formula};
use crate::symbol::Symbol;

static EMPTY: BTreeSet<Symbol> = BTreeSet::new();

#[derive(Debug, Clone, Default)]
pub struct Relevance {
    sets: Vec<BTreeSet<Symbol>>,
    // per node: item index -> S right after that item was produced
    snapshots: HashMap<NodeId, BTreeMap<usize, BTreeSet<Symbol>>>,
}

impl Relevance {
    pub(crate) fn inherit(&mut self, tree: &Tree, id: NodeId) {
        if self.sets.len() <= id {
            self.sets.resize_with(id + 1, BTreeSet::new);
        }
        if let Some(p) = tree.node(id).parent() {
            let inherited = self.sets[p].clone();
            self.sets[id].extend(inherited);
        }
    }

    pub(crate) fn fold_into_parent(&mut self, tree: &Tree, id: NodeId) {
        if let Some(p) = tree.node(id).parent() {
            let own = self.sets[id].clone();
            self.sets[p].extend(own);
        }
    }

    pub(crate) fn record(&mut self, id: NodeId, item: usize, formula: &Formula) {
        formula.atoms(&mut self.sets[id]);
        self.snapshots
            .entry(id)
            .or_default()
            .insert(item, self.sets[id].clone());
    }

    pub fn set(&self, id: NodeId) -> &BTreeSet<Symbol> {
        self.sets.get(id).unwrap_or(&EMPTY)
    }

    pub fn snapshot(&self, id: NodeId, item: usize) -> Option<&BTreeSet<Symbol>> {
        self.snapshots.get(&id)?.get(&item)
    }
}

fn relevance_of<'a>(view: &BranchView<'a>) -> &'a BTreeSet<Symbol> {
    view.relevance
        .expect("relevance heuristics run on a tableau with a relevance set")
}

/// PB choice ranked by atoms outside `S`, then by distance to the branch
/// valuation. Betas with an atom of opposite polarity are preferred.
pub(crate) fn most_relevant(view: &BranchView<'_>, first: usize) -> usize {
    let s = relevance_of(view);
    let valuation = view.branch.valuation();
    let rank = |k: &usize| {
        let beta = &view.branch.betas[*k];
        (
            beta.atoms_out_of(s),
            beta.distance_from(&valuation, view.distances),
        )
    };

    let polar = candidates(view, &valuation, first, has_opposite_polarity);
    let pool = if polar.is_empty() {
        candidates(view, &valuation, first, |_, _| true)
    } else {
        polar
    };
    pool.into_iter().min_by_key(rank).unwrap_or(first)
}

// Anything but T (!X), where T (!a) counts once a is relevant.
fn is_simple_alpha(alpha: &SignedFormula, s: &BTreeSet<Symbol>) -> bool {
    match (alpha.sign(), alpha.formula().as_ref()) {
        (true, Formula::Not(x)) => matches!(x.as_ref(), Formula::Atom(a) if s.contains(a)),
        _ => true,
    }
}

/// Step order that postpones negation elimination until no PB candidate is
/// left.
pub(crate) fn next_rule_negation_last(
    strategy: &KeStrategy,
    view: &BranchView<'_>,
) -> Option<Step> {
    let s = relevance_of(view);
    let branch = view.branch;

    if let Some(i) = branch.alphas.iter().position(|a| is_simple_alpha(a, s)) {
        return Some(Step::Alpha(i));
    }
    if let Some((beta, lit)) = find_elimination(&branch.betas, &branch.lits) {
        return Some(Step::Eliminate { beta, lit });
    }
    if let Some(first) = view.first_open() {
        return Some(Step::Pb(strategy.choose_pb(view, first)));
    }

    let valuation = branch.valuation();
    branch
        .alphas
        .iter()
        .enumerate()
        .min_by_key(|(_, a)| (a.atoms_out_of(s), a.distance_from(&valuation, view.distances)))
        .map(|(i, _)| Step::Alpha(i))
}

pub struct KeS3Tableau {
    inner: KeTableau,
}

impl KeS3Tableau {
    /// # Panics
    /// If `heuristic` does not rank by relevance.
    pub fn new(items: Vec<SignedFormula>, heuristic: PbHeuristic) -> Self {
        assert!(
            matches!(
                heuristic,
                PbHeuristic::Relevance | PbHeuristic::RelevanceNegLast
            ),
            "KE-S3 needs a relevance heuristic, got {}",
            heuristic
        );
        Self {
            inner: KeTableau::with_relevance(items, heuristic),
        }
    }

    fn relevance(&self) -> &Relevance {
        self.inner
            .relevance()
            .expect("KE-S3 tableau always tracks relevance")
    }

    /// Relevance set of a single node.
    pub fn node_relevance(&self, id: NodeId) -> &BTreeSet<Symbol> {
        self.relevance().set(id)
    }

    pub fn pb_splits(&self) -> usize {
        self.inner.pb_splits()
    }
}

fn fmt_set(s: &BTreeSet<Symbol>) -> String {
    let mut names: Vec<&str> = s.iter().map(|a| a.as_str()).collect();
    names.sort_unstable();
    let mut out = String::from("   S = { ");
    for n in names {
        out.push_str(n);
        out.push(' ');
    }
    out.push('}');
    out
}

impl Prover for KeS3Tableau {
    fn close(&mut self) -> bool {
        self.inner.close()
    }

    fn tree(&self) -> &Tree {
        self.inner.tree()
    }

    fn render(&self, level: usize) -> String {
        let rel = self.relevance();
        self.tree()
            .render_with(level, &|id, i| rel.snapshot(id, i).map(fmt_set))
    }

    fn relevance_set(&self) -> Option<BTreeSet<Symbol>> {
        Some(self.relevance().set(0).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families;
    use crate::parse::prop::parse_formula;
    use crate::session;

    fn sfs(fs: &[&str]) -> Vec<SignedFormula> {
        fs.iter()
            .map(|s| {
                let (sign, f) = s.split_at(1);
                SignedFormula::new(sign == "T", parse_formula(f).unwrap())
            })
            .collect()
    }

    fn names(s: &BTreeSet<Symbol>) -> Vec<String> {
        let mut v: Vec<_> = s.iter().map(|a| a.to_string()).collect();
        v.sort();
        v
    }

    const HEURISTICS: [PbHeuristic; 2] = [PbHeuristic::Relevance, PbHeuristic::RelevanceNegLast];

    #[test]
    fn negation_fills_relevance_set() {
        session(|| {
            let mut t = KeS3Tableau::new(sfs(&["T(a|b)", "T!a", "T!b"]), PbHeuristic::Relevance);
            assert!(t.close());
            assert_eq!(vec!["a", "b"], names(&t.relevance_set().unwrap()));
            assert_eq!(
                "0 T (a|b)\n1 T (!a)\n2 T (!b)\n3 F a   S = { a }\n4 F b   S = { a b }\n5 T b\n",
                t.render(0)
            );
        })
    }

    #[test]
    fn negation_last_splits_first() {
        session(|| {
            let mut t =
                KeS3Tableau::new(sfs(&["T(a|b)", "T!a", "T!b"]), PbHeuristic::RelevanceNegLast);
            assert!(t.close());
            assert_eq!(3, t.count_nodes());
            assert_eq!(1, t.pb_splits());
            assert_eq!(vec!["a", "b"], names(&t.relevance_set().unwrap()));
            // the second branch ends up with a as well
            let second = t.tree().root().children()[1];
            assert_eq!(vec!["a", "b"], names(t.node_relevance(second)));
        })
    }

    #[test]
    fn no_negation_no_relevance() {
        session(|| {
            for h in HEURISTICS {
                let mut t = KeS3Tableau::new(sfs(&["T(a|b)", "Fa", "Fb"]), h);
                assert!(t.close());
                assert!(t.relevance_set().unwrap().is_empty());
                assert!(!t.render(0).contains("S ="));
            }
        })
    }

    #[test]
    fn children_start_from_parent_set() {
        session(|| {
            // T !a is expanded at the root before the split; the children
            // derive no negation of their own
            let mut t = KeS3Tableau::new(
                sfs(&["T!a", "T(b|c)", "T(b->c)", "T(c->b)", "F(b&c)"]),
                PbHeuristic::Relevance,
            );
            assert!(t.close());
            assert!(t.pb_splits() >= 1);
            let tree = t.tree();
            assert_eq!(2, tree.root().children().len());
            for id in 1..tree.count_nodes() {
                assert_eq!(vec!["a"], names(t.node_relevance(id)), "node {}", id);
            }
        })
    }

    #[test]
    fn parent_covers_children() {
        session(|| {
            for h in HEURISTICS {
                let mut t = KeS3Tableau::new(families::php(2, true), h);
                assert!(t.close());
                let tree = t.tree();
                for id in 1..tree.count_nodes() {
                    let p = tree.node(id).parent().unwrap();
                    assert!(t.node_relevance(p).is_superset(t.node_relevance(id)));
                }
                assert!(!t.relevance_set().unwrap().is_empty());
            }
        })
    }

    #[test]
    fn simple_alpha() {
        session(|| {
            let s: BTreeSet<Symbol> = [Symbol::intern("a")].into_iter().collect();
            let alpha = |f: &str| sfs(&[f]).remove(0);
            assert!(is_simple_alpha(&alpha("T!a"), &s));
            assert!(!is_simple_alpha(&alpha("T!b"), &s));
            assert!(!is_simple_alpha(&alpha("T!(a&a)"), &s));
            assert!(is_simple_alpha(&alpha("F!b"), &s));
            assert!(is_simple_alpha(&alpha("T(a&b)"), &s));
        })
    }

    #[test]
    #[should_panic]
    fn rejects_plain_heuristic() {
        session(|| {
            KeS3Tableau::new(sfs(&["Ta"]), PbHeuristic::Leftmost);
        })
    }

    #[test]
    fn families_close() {
        session(|| {
            for h in HEURISTICS {
                for negated in [false, true] {
                    let mut t = KeS3Tableau::new(families::gamma(3, negated), h);
                    assert!(t.close(), "gamma {} {}", h, negated);
                    let mut t = KeS3Tableau::new(families::php(2, negated), h);
                    assert!(t.close(), "php {} {}", h, negated);
                }
            }
        })
    }
}
