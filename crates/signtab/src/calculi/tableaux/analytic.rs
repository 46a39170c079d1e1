use std::rc::Rc;

use log::debug;

use super::{
    rules,
    strategy::{AtomDistances, Branch, BranchView, Order, Step, Strategy},
    tree::{NodeId, Tree},
};
use crate::calculus::Prover;
use crate::logic::signed::SignedFormula;

/// Alpha rules before beta rules. The order decides whether the first or
/// the last pending formula of a bucket is expanded.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticStrategy {
    order: Order,
}

impl AnalyticStrategy {
    pub fn new(order: Order) -> Self {
        Self { order }
    }

    fn pick(&self, len: usize) -> usize {
        match self.order {
            Order::TopDown => 0,
            Order::BottomUp => len - 1,
        }
    }
}

impl Strategy for AnalyticStrategy {
    fn choose_alpha(&self, view: &BranchView<'_>) -> usize {
        self.pick(view.branch.alphas.len())
    }

    fn choose_beta(&self, view: &BranchView<'_>) -> usize {
        self.pick(view.branch.betas.len())
    }

    fn next_rule(&self, view: &BranchView<'_>) -> Option<Step> {
        if !view.branch.alphas.is_empty() {
            Some(Step::Alpha(self.choose_alpha(view)))
        } else if !view.branch.betas.is_empty() {
            Some(Step::Beta(self.choose_beta(view)))
        } else {
            None
        }
    }
}

pub struct AnalyticTableau {
    tree: Tree,
    strategy: AnalyticStrategy,
    // the strategy never ranks by distance
    distances: AtomDistances,
    outcome: Option<bool>,
}

impl AnalyticTableau {
    pub fn new(items: Vec<SignedFormula>, order: Order) -> Self {
        Self {
            tree: Tree::add_root(items),
            strategy: AnalyticStrategy::new(order),
            distances: AtomDistances::default(),
            outcome: None,
        }
    }

    fn close_node(&mut self, id: NodeId, mut branch: Branch) -> bool {
        let closed = self.expand(id, &mut branch);
        if closed {
            debug!("branch {} closed", self.tree.node(id).label());
            self.tree.mark_closed(id);
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
            let step = self
                .strategy
                .next_rule(&BranchView::new(branch, &self.distances));

            match step {
                Some(Step::Alpha(i)) => {
                    let alpha = branch.alphas.remove(i);
                    let (rule, out) = rules::apply_alpha(&alpha);
                    debug!("{}: {} on {}", self.tree.node(id).label(), rule, alpha);
                    self.tree.extend_items(id, out);
                    if branch.classify(self.tree.node(id).items()) {
                        return true;
                    }
                }
                Some(Step::Beta(i)) => {
                    let beta = branch.betas.remove(i);
                    let (rule, heads) = rules::apply_beta(&beta);
                    debug!("{}: {} on {}", self.tree.node(id).label(), rule, beta);
                    // Children are built one at a time; an open child leaves
                    // the remaining ones unexplored.
                    for head in heads {
                        let child = self.tree.add_child(id, vec![Rc::new(head)]);
                        if !self.close_node(child, branch.fork()) {
                            return false;
                        }
                    }
                    return true;
                }
                Some(step) => unreachable!("analytic tableau cannot apply {:?}", step),
                None => return false,
            }
        }
    }
}

impl Prover for AnalyticTableau {
    fn close(&mut self) -> bool {
        if let Some(outcome) = self.outcome {
            return outcome;
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

    fn sfs(fs: &[&str]) -> Vec<SignedFormula> {
        fs.iter()
            .map(|s| {
                let (sign, f) = s.split_at(1);
                SignedFormula::new(sign == "T", parse_formula(f).unwrap())
            })
            .collect()
    }

    #[test]
    fn immediate_contradiction() {
        session(|| {
            let mut t = AnalyticTableau::new(sfs(&["Ta", "Fa"]), Order::TopDown);
            assert!(t.close());
            assert_eq!(1, t.count_nodes());
            assert_eq!(2, t.count_formulae());
        })
    }

    #[test]
    fn open_disjunction() {
        session(|| {
            let mut t = AnalyticTableau::new(sfs(&["T(a|b)"]), Order::TopDown);
            assert!(!t.close());
            assert!(!t.is_closed());
            // the second branch is never built
            assert_eq!(2, t.count_nodes());
        })
    }

    #[test]
    fn disjunction_branches() {
        session(|| {
            for order in [Order::TopDown, Order::BottomUp] {
                let mut t = AnalyticTableau::new(sfs(&["T(a|b)", "Fa", "Fb"]), order);
                assert!(t.close());
                assert_eq!(3, t.count_nodes());
                assert_eq!(5, t.count_formulae());
                let root = t.tree().root();
                assert_eq!(2, root.children().len());
                assert!(root
                    .children()
                    .iter()
                    .all(|&c| t.tree().node(c).is_closed()));
            }
        })
    }

    #[test]
    fn alpha_results_are_appended() {
        session(|| {
            let mut t = AnalyticTableau::new(sfs(&["F(a->(b->a))"]), Order::TopDown);
            assert!(t.close());
            assert_eq!(
                "0 F (a->(b->a))\n1 T a\n2 F (b->a)\n3 T b\n4 F a\n",
                t.render(0)
            );
        })
    }

    #[test]
    fn bottom_up_picks_last() {
        session(|| {
            let items = sfs(&["T(a&b)", "T(c&d)"]);
            let mut t = AnalyticTableau::new(items, Order::BottomUp);
            assert!(!t.close());
            assert_eq!(
                "0 T (a&b)\n1 T (c&d)\n2 T c\n3 T d\n4 T a\n5 T b\n",
                t.render(0)
            );
        })
    }

    #[test]
    fn close_is_idempotent() {
        session(|| {
            let mut t = AnalyticTableau::new(families::gamma(1, false), Order::TopDown);
            assert!(t.close());
            let nodes = t.count_nodes();
            assert!(t.close());
            assert_eq!(nodes, t.count_nodes());
        })
    }

    #[test]
    fn families_close() {
        session(|| {
            for order in [Order::TopDown, Order::BottomUp] {
                for negated in [false, true] {
                    let mut t = AnalyticTableau::new(families::gamma(2, negated), order);
                    assert!(t.close());
                    let mut t = AnalyticTableau::new(families::php(2, negated), order);
                    assert!(t.close());
                }
            }
        })
    }
}
