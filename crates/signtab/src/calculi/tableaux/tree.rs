use std::{fmt::Write, rc::Rc};

use crate::logic::signed::SignedFormula;

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    label: String,
    items: Vec<Rc<SignedFormula>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    is_closed: bool,
}

impl Node {
    fn new(label: String, items: Vec<Rc<SignedFormula>>, parent: Option<NodeId>) -> Self {
        Self {
            label,
            items,
            parent,
            children: vec![],
            is_closed: false,
        }
    }

    /// Path label such as `1-2-1`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn items(&self) -> &[Rc<SignedFormula>] {
        &self.items
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }
}

/// Arena of tableau nodes. The root is always node 0.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn add_root(items: Vec<SignedFormula>) -> Self {
        let items = items.into_iter().map(Rc::new).collect();
        Self {
            nodes: vec![Node::new("1".to_string(), items, None)],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Appends a child labelled `<parent>-<k>` holding `items`.
    pub fn add_child(&mut self, parent: NodeId, items: Vec<Rc<SignedFormula>>) -> NodeId {
        let id = self.nodes.len();
        let p = &mut self.nodes[parent];
        p.children.push(id);
        let label = format!("{}-{}", p.label, p.children.len());
        self.nodes.push(Node::new(label, items, Some(parent)));
        id
    }

    pub fn extend_items(&mut self, id: NodeId, items: impl IntoIterator<Item = SignedFormula>) {
        self.nodes[id].items.extend(items.into_iter().map(Rc::new));
    }

    pub fn mark_closed(&mut self, id: NodeId) {
        self.nodes[id].is_closed = true;
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes[n].parent;
        }
        false
    }

    /// Number of nodes below and including the root.
    pub fn count_nodes(&self) -> usize {
        self.count_nodes_from(0)
    }

    fn count_nodes_from(&self, id: NodeId) -> usize {
        1 + self.nodes[id]
            .children
            .iter()
            .map(|&c| self.count_nodes_from(c))
            .sum::<usize>()
    }

    pub fn count_formulae(&self) -> usize {
        self.count_formulae_from(0)
    }

    fn count_formulae_from(&self, id: NodeId) -> usize {
        self.nodes[id].items.len()
            + self.nodes[id]
                .children
                .iter()
                .map(|&c| self.count_formulae_from(c))
                .sum::<usize>()
    }

    pub fn render(&self, level: usize) -> String {
        self.render_with(level, &|_, _| None)
    }

    /// Renders the tree with one line per item. `annotate` may append a
    /// suffix to the line of item `i` of node `id`.
    pub fn render_with(
        &self,
        level: usize,
        annotate: &dyn Fn(NodeId, usize) -> Option<String>,
    ) -> String {
        let mut s = String::new();
        self.render_node(0, level, annotate, &mut s);
        s
    }

    fn render_node(
        &self,
        id: NodeId,
        level: usize,
        annotate: &dyn Fn(NodeId, usize) -> Option<String>,
        s: &mut String,
    ) {
        let indent = " ".repeat(level);
        for (i, item) in self.nodes[id].items.iter().enumerate() {
            let _ = write!(s, "{}{} {}", indent, i, item);
            if let Some(suffix) = annotate(id, i) {
                s.push_str(&suffix);
            }
            s.push('\n');
        }
        for &c in &self.nodes[id].children {
            self.render_node(c, level + 2, annotate, s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Formula;
    use crate::session;

    fn lit(sign: bool, a: &str) -> SignedFormula {
        SignedFormula::new(sign, Formula::atom(a))
    }

    #[test]
    fn labels_and_ancestry() {
        session(|| {
            let mut t = Tree::add_root(vec![lit(true, "a")]);
            let c1 = t.add_child(0, vec![Rc::new(lit(true, "b"))]);
            let c2 = t.add_child(0, vec![Rc::new(lit(false, "b"))]);
            let c11 = t.add_child(c1, vec![Rc::new(lit(true, "c"))]);

            assert_eq!("1-1", t.node(c1).label());
            assert_eq!("1-2", t.node(c2).label());
            assert_eq!("1-1-1", t.node(c11).label());
            assert!(t.is_ancestor_or_self(0, c11));
            assert!(t.is_ancestor_or_self(c1, c11));
            assert!(t.is_ancestor_or_self(c11, c11));
            assert!(!t.is_ancestor_or_self(c2, c11));
            assert!(!t.is_ancestor_or_self(c11, c1));
        })
    }

    #[test]
    fn counts() {
        session(|| {
            let mut t = Tree::add_root(vec![lit(true, "a"), lit(false, "b")]);
            let c = t.add_child(0, vec![Rc::new(lit(true, "b"))]);
            t.add_child(0, vec![Rc::new(lit(false, "c"))]);
            t.extend_items(c, vec![lit(true, "d")]);
            assert_eq!(3, t.count_nodes());
            assert_eq!(5, t.count_formulae());
        })
    }

    #[test]
    fn render() {
        session(|| {
            let mut t = Tree::add_root(vec![lit(true, "a"), lit(false, "b")]);
            let c = t.add_child(0, vec![Rc::new(lit(true, "b"))]);
            t.add_child(c, vec![Rc::new(lit(false, "a"))]);
            assert_eq!("0 T a\n1 F b\n  0 T b\n    0 F a\n", t.render(0));
            assert_eq!(
                " 0 T a\n 1 F b <\n   0 T b\n     0 F a\n",
                t.render_with(1, &|id, i| (id == 0 && i == 1).then(|| " <".to_string()))
            );
        })
    }
}
