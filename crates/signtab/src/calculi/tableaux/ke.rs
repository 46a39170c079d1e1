use std::{collections::HashMap, rc::Rc};

use log::debug;

use super::{
    kes3::{self, Relevance},
    rules::{self, RuleName},
    strategy::{find_elimination, AtomDistances, Branch, BranchView, PbHeuristic, Step, Strategy},
    tree::{NodeId, Tree},
};
use crate::calculus::Prover;
use crate::logic::{signed::SignedFormula, Polarity, Valuation};

/// Alpha expansion first, then beta elimination, then a PB split chosen by
/// `heuristic`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeStrategy {
    heuristic: PbHeuristic,
}

impl KeStrategy {
    pub fn new(heuristic: PbHeuristic) -> Self {
        Self { heuristic }
    }

    pub fn heuristic(&self) -> PbHeuristic {
        self.heuristic
    }
}

impl Strategy for KeStrategy {
    fn choose_pb(&self, view: &BranchView<'_>, first_open: usize) -> usize {
        match self.heuristic {
            PbHeuristic::Leftmost => first_open,
            PbHeuristic::Valuation => nearest(view, first_open, |_, _| true)
                .map_or(first_open, |(k, _)| k),
            // a polar candidate only wins when it is connected to the valuation
            PbHeuristic::Polarity => match nearest(view, first_open, has_opposite_polarity) {
                Some((k, d)) if d < view.distances.max() => k,
                _ => nearest(view, first_open, |_, _| true).map_or(first_open, |(k, _)| k),
            },
            PbHeuristic::Relevance | PbHeuristic::RelevanceNegLast => {
                kes3::most_relevant(view, first_open)
            }
        }
    }

    fn next_rule(&self, view: &BranchView<'_>) -> Option<Step> {
        if self.heuristic == PbHeuristic::RelevanceNegLast {
            return kes3::next_rule_negation_last(self, view);
        }

        let branch = view.branch;
        if !branch.alphas.is_empty() {
            Some(Step::Alpha(self.choose_alpha(view)))
        } else if let Some((beta, lit)) = find_elimination(&branch.betas, &branch.lits) {
            Some(Step::Eliminate { beta, lit })
        } else {
            view.first_open()
                .map(|first| Step::Pb(self.choose_pb(view, first)))
        }
    }
}

/// Open betas from `first` on that the branch valuation does not already
/// satisfy and that pass `qualifies`.
pub(crate) fn candidates(
    view: &BranchView<'_>,
    valuation: &Valuation,
    first: usize,
    qualifies: impl Fn(&SignedFormula, &Valuation) -> bool,
) -> Vec<usize> {
    let betas = &view.branch.betas;
    (first..betas.len())
        .filter(|&k| {
            view.open.get(k).copied().unwrap_or(false)
                && betas[k].value(valuation) != Some(true)
                && qualifies(&betas[k], valuation)
        })
        .collect()
}

// Leftmost candidate with minimal distance to the branch valuation, and
// that distance.
fn nearest(
    view: &BranchView<'_>,
    first: usize,
    qualifies: impl Fn(&SignedFormula, &Valuation) -> bool,
) -> Option<(usize, u32)> {
    let valuation = view.branch.valuation();
    candidates(view, &valuation, first, qualifies)
        .into_iter()
        .map(|k| (k, view.branch.betas[k].distance_from(&valuation, view.distances)))
        .min_by_key(|&(_, d)| d)
}

/// Whether some assigned atom occurs in `sf` with the polarity opposite to
/// its assignment. A mixed occurrence always has an opposite one.
pub(crate) fn has_opposite_polarity(sf: &SignedFormula, valuation: &Valuation) -> bool {
    valuation.iter().any(|(&atom, &value)| {
        matches!(
            (sf.polarity(atom), value),
            (Polarity::Mixed, _) | (Polarity::Negative, true) | (Polarity::Positive, false)
        )
    })
}

pub struct KeTableau {
    tree: Tree,
    strategy: KeStrategy,
    distances: Option<AtomDistances>,
    applied_pb: HashMap<String, NodeId>,
    relevance: Option<Relevance>,
    outcome: Option<bool>,
}

impl KeTableau {
    pub fn new(items: Vec<SignedFormula>, heuristic: PbHeuristic) -> Self {
        Self {
            tree: Tree::add_root(items),
            strategy: KeStrategy::new(heuristic),
            distances: None,
            applied_pb: HashMap::new(),
            relevance: None,
            outcome: None,
        }
    }

    pub(crate) fn with_relevance(items: Vec<SignedFormula>, heuristic: PbHeuristic) -> Self {
        Self {
            relevance: Some(Relevance::default()),
            ..Self::new(items, heuristic)
        }
    }

    pub(crate) fn relevance(&self) -> Option<&Relevance> {
        self.relevance.as_ref()
    }

    /// Number of PB splits performed so far.
    pub fn pb_splits(&self) -> usize {
        (0..self.tree.count_nodes())
            .filter(|&id| !self.tree.node(id).is_leaf())
            .count()
    }

    fn close_node(&mut self, id: NodeId, mut branch: Branch) -> bool {
        if let Some(rel) = &mut self.relevance {
            rel.inherit(&self.tree, id);
        }

        let closed = self.expand(id, &mut branch);
        if closed {
            debug!("branch {} closed", self.tree.node(id).label());
            self.tree.mark_closed(id);
        }

        if let Some(rel) = &mut self.relevance {
            rel.fold_into_parent(&self.tree, id);
        }
        closed
    }

    fn expand(&mut self, id: NodeId, branch: &mut Branch) -> bool {
        if self.tree.node(id).is_closed() {
            return true;
        }
        if branch.classify(self.tree.node(id).items()) {
            return true;
        }

        loop {
            let open = self.open_betas(id, &branch.betas);
            let step = {
                let distances = self
                    .distances
                    .as_ref()
                    .expect("atom distances are computed before the search");
                let view = BranchView {
                    branch: &*branch,
                    distances,
                    open: &open,
                    relevance: self.relevance.as_ref().map(|r| r.set(id)),
                };
                self.strategy.next_rule(&view)
            };

            match step {
                Some(Step::Alpha(i)) => {
                    let alpha = branch.alphas.remove(i);
                    let (rule, out) = rules::apply_alpha(&alpha);
                    debug!("{}: {} on {}", self.tree.node(id).label(), rule, alpha);
                    self.tree.extend_items(id, out);
                    if rule == RuleName::NegTrue {
                        if let Some(rel) = &mut self.relevance {
                            let produced = self.tree.node(id).items().len() - 1;
                            rel.record(id, produced, alpha.formula());
                        }
                    }
                }
                Some(Step::Eliminate { beta, lit }) => {
                    let b = branch.betas.remove(beta);
                    let (rule, out) = rules::eliminate(&b, &branch.lits[lit])
                        .unwrap_or_else(|| panic!("{} does not eliminate {}", branch.lits[lit], b));
                    debug!(
                        "{}: {} on {} with {}",
                        self.tree.node(id).label(),
                        rule,
                        b,
                        branch.lits[lit]
                    );
                    self.tree.extend_items(id, out);
                }
                Some(Step::Pb(i)) => return self.split(id, branch, i),
                Some(step) => unreachable!("KE tableau cannot apply {:?}", step),
                None => return false,
            }

            if branch.classify(self.tree.node(id).items()) {
                return true;
            }
        }
    }

    // Betas already split on by `id` or one of its ancestors are closed for PB.
    fn open_betas(&self, id: NodeId, betas: &[Rc<SignedFormula>]) -> Vec<bool> {
        betas
            .iter()
            .map(|b| match self.applied_pb.get(&b.fingerprint()) {
                Some(&at) => !self.tree.is_ancestor_or_self(at, id),
                None => true,
            })
            .collect()
    }

    fn split(&mut self, id: NodeId, branch: &Branch, i: usize) -> bool {
        let beta = &branch.betas[i];
        let x = beta
            .formula()
            .left_operand()
            .unwrap_or_else(|| panic!("cannot split on {}", beta))
            .clone();
        self.applied_pb.insert(beta.fingerprint(), id);
        debug!("{}: PB on {} for {}", self.tree.node(id).label(), x, beta);

        let (first, first_branch) = self.add_child(id, SignedFormula::t(x.clone()), branch);
        if !self.close_node(first, first_branch) {
            return false;
        }
        let (second, second_branch) = self.add_child(id, SignedFormula::f(x), branch);
        self.close_node(second, second_branch)
    }

    // Builds a PB child and eliminates every inherited beta the new head
    // allows.
    fn add_child(&mut self, parent: NodeId, head: SignedFormula, branch: &Branch) -> (NodeId, Branch) {
        let head = Rc::new(head);
        let mut child_branch = branch.fork();
        let mut items = vec![head.clone()];

        child_branch.betas.retain(|beta| match rules::eliminate(beta, &head) {
            Some((_, out)) => {
                items.extend(out.into_iter().map(Rc::new));
                false
            }
            None => true,
        });

        (self.tree.add_child(parent, items), child_branch)
    }
}

impl Prover for KeTableau {
    fn close(&mut self) -> bool {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        if self.distances.is_none() {
            self.distances = Some(AtomDistances::compute(self.tree.root().items()));
        }
        let outcome = self.close_node(0, Branch::new());
        self.outcome = Some(outcome);
        outcome
    }

    fn tree(&self) -> &Tree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families;
    use crate::parse::prop::parse_formula;
    use crate::session;
    use crate::symbol::Symbol;

    fn sfs(fs: &[&str]) -> Vec<SignedFormula> {
        fs.iter()
            .map(|s| {
                let (sign, f) = s.split_at(1);
                SignedFormula::new(sign == "T", parse_formula(f).unwrap())
            })
            .collect()
    }

    const HEURISTICS: [PbHeuristic; 3] = [
        PbHeuristic::Leftmost,
        PbHeuristic::Valuation,
        PbHeuristic::Polarity,
    ];

    #[test]
    fn immediate_contradiction() {
        session(|| {
            let mut t = KeTableau::new(sfs(&["Ta", "Fa"]), PbHeuristic::Leftmost);
            assert!(t.close());
            assert_eq!(1, t.count_nodes());
            assert_eq!(2, t.count_formulae());
        })
    }

    #[test]
    fn elimination_without_split() {
        session(|| {
            for h in HEURISTICS {
                let mut t = KeTableau::new(sfs(&["T(a|b)", "Fa", "Fb"]), h);
                assert!(t.close());
                assert_eq!(0, t.pb_splits());
                assert_eq!(1, t.count_nodes());
                assert_eq!("0 T (a|b)\n1 F a\n2 F b\n3 T b\n", t.render(0));
            }
        })
    }

    #[test]
    fn pb_split_children() {
        session(|| {
            let mut t = KeTableau::new(
                sfs(&["T(a|b)", "T(a|(!b))", "T((!a)|b)", "T((!a)|(!b))"]),
                PbHeuristic::Leftmost,
            );
            assert!(t.close());
            let root = t.tree().root();
            assert_eq!(2, root.children().len());
            let first = t.tree().node(root.children()[0]);
            let second = t.tree().node(root.children()[1]);
            assert_eq!("1-1", first.label());
            assert_eq!("T a", first.items()[0].to_string());
            assert_eq!("F a", second.items()[0].to_string());
            // F a eliminates both T(a|.) on creation
            assert_eq!("T b", second.items()[1].to_string());
            assert_eq!("T (!b)", second.items()[2].to_string());
        })
    }

    #[test]
    fn open_first_child_stops_search() {
        session(|| {
            let mut t = KeTableau::new(sfs(&["T(a|b)"]), PbHeuristic::Leftmost);
            assert!(!t.close());
            assert_eq!(2, t.count_nodes());
        })
    }

    #[test]
    fn open_second_child_is_open() {
        session(|| {
            // T a reaches T (c&d) against F c, F a leaves T b open
            let mut t = KeTableau::new(
                sfs(&["T(a|b)", "T(a->(c&d))", "Fc"]),
                PbHeuristic::Leftmost,
            );
            assert!(!t.close());
            let root = t.tree().root();
            assert_eq!(2, root.children().len());
            assert!(t.tree().node(root.children()[0]).is_closed());
            assert!(!t.tree().node(root.children()[1]).is_closed());
            assert!(!t.is_closed());
        })
    }

    #[test]
    fn split_once_per_branch() {
        session(|| {
            let mut t = KeTableau::new(sfs(&["T(a|b)", "T(c|d)"]), PbHeuristic::Leftmost);
            assert!(!t.close());
            // 1, 1-1 (T a), 1-1-1 (T c); afterwards both betas are used up
            assert_eq!(3, t.count_nodes());
            assert_eq!(2, t.pb_splits());
        })
    }

    #[test]
    fn polarity_prefers_opposite_occurrence() {
        session(|| {
            let a = Symbol::intern("a");
            let v: Valuation = [(a, true)].into_iter().collect();
            assert!(has_opposite_polarity(&sfs(&["T((!a)|b)"])[0], &v));
            assert!(has_opposite_polarity(&sfs(&["T(a->b)"])[0], &v));
            assert!(!has_opposite_polarity(&sfs(&["T(a|b)"])[0], &v));
            assert!(has_opposite_polarity(&sfs(&["F(a|b)"])[0], &v));
        })
    }

    #[test]
    fn polarity_counts_mixed_occurrence() {
        session(|| {
            let a = Symbol::intern("a");
            let beta = sfs(&["T((!a)|(a&b))"]).remove(0);
            assert_eq!(Polarity::Mixed, beta.polarity(a));
            for value in [true, false] {
                let v: Valuation = [(a, value)].into_iter().collect();
                assert!(has_opposite_polarity(&beta, &v), "a = {}", value);
            }
        })
    }

    #[test]
    fn polarity_needs_connected_candidate() {
        session(|| {
            let items: Vec<Rc<SignedFormula>> = sfs(&["T(c|d)", "T((!a)|b)", "Ta"])
                .into_iter()
                .map(Rc::new)
                .collect();
            let mut branch = Branch::new();
            assert!(!branch.classify(&items));
            let strategy = KeStrategy::new(PbHeuristic::Polarity);
            let open = [true, true];

            // without distances nothing is connected and the leftmost
            // candidate wins
            let unknown = AtomDistances::default();
            let view = BranchView {
                branch: &branch,
                distances: &unknown,
                open: &open,
                relevance: None,
            };
            assert_eq!(0, strategy.choose_pb(&view, 0));

            let distances = AtomDistances::compute(&items);
            let view = BranchView {
                distances: &distances,
                ..view
            };
            assert_eq!(1, strategy.choose_pb(&view, 0));
        })
    }

    #[test]
    fn families_close() {
        session(|| {
            for h in HEURISTICS {
                for negated in [false, true] {
                    let mut t = KeTableau::new(families::gamma(3, negated), h);
                    assert!(t.close(), "gamma {} {}", h, negated);
                    let mut t = KeTableau::new(families::php(2, negated), h);
                    assert!(t.close(), "php {} {}", h, negated);
                }
            }
        })
    }
}
