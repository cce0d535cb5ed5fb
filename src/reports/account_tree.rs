//! Hierarchical account aggregation
//!
//! An `AccountTree` sums amounts over colon-delimited account paths rooted at
//! one segment. Adding `A:B:C` adds the amount to `A`, `A:B` and `A:B:C`.
//! Children keep the order they were first seen in.
//!
//! Nodes live in an arena and refer to their parent by index, so walking
//! up to rebuild a full name needs no shared ownership.
//!
//! ```text
//! A ($8.00)
//! ├── B ($5.00)
//! │   └── C (-$10.00)
//! └── D ($3.00)
//! ```

use indexmap::IndexMap;

use crate::error::{LedgerError, LedgerResult};
use crate::models::account::SEGMENT_SEPARATOR;
use crate::models::Money;

/// Index of a node in its tree
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
struct Node {
    segment: String,
    amount: Money,
    parent: Option<NodeId>,
    children: IndexMap<String, NodeId>,
}

/// Sums of amounts over an account hierarchy
#[derive(Debug, Clone)]
pub struct AccountTree {
    nodes: Vec<Node>,
}

/// Borrowed view of one node
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a AccountTree,
    id: NodeId,
}

/// One line of a rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    /// Full account name of the node
    pub fullname: String,
    /// Box-drawing prefix followed by the node's segment
    pub label: String,
    /// Columns produced by the caller
    pub columns: Vec<String>,
}

impl AccountTree {
    /// Create an empty tree rooted at `root`
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                segment: root.into(),
                amount: Money::zero(),
                parent: None,
                children: IndexMap::new(),
            }],
        }
    }

    /// The root node
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: ROOT,
        }
    }

    /// Add `amount` to every node along `name`, creating missing nodes
    pub fn add(&mut self, name: &str, amount: Money) -> LedgerResult<()> {
        let mut segments = name.split(SEGMENT_SEPARATOR);
        let first = segments.next().unwrap_or_default();
        if first != self.nodes[ROOT].segment {
            return Err(LedgerError::SegmentMismatch {
                name: name.to_string(),
                segment: self.nodes[ROOT].segment.clone(),
            });
        }

        let mut current = ROOT;
        self.nodes[current].amount += amount;

        for segment in segments {
            current = match self.nodes[current].children.get(segment) {
                Some(&child) => child,
                None => self.push_child(current, segment),
            };
            self.nodes[current].amount += amount;
        }

        Ok(())
    }

    fn push_child(&mut self, parent: NodeId, segment: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            segment: segment.to_string(),
            amount: Money::zero(),
            parent: Some(parent),
            children: IndexMap::new(),
        });
        self.nodes[parent].children.insert(segment.to_string(), id);
        id
    }

    /// The node at exactly `name`, if it exists
    pub fn get(&self, name: &str) -> Option<NodeRef<'_>> {
        let mut segments = name.split(SEGMENT_SEPARATOR);
        if segments.next()? != self.nodes[ROOT].segment {
            return None;
        }

        let mut current = ROOT;
        for segment in segments {
            current = *self.nodes[current].children.get(segment)?;
        }
        Some(NodeRef {
            tree: self,
            id: current,
        })
    }

    /// Pre-order rows with box-drawing prefixes
    ///
    /// `columns` turns each node into its report columns.
    pub fn rows<F>(&self, mut columns: F) -> Vec<TreeRow>
    where
        F: FnMut(NodeRef<'_>) -> Vec<String>,
    {
        let mut rows = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];

        while let Some(id) = stack.pop() {
            let node = NodeRef { tree: self, id };
            rows.push(TreeRow {
                fullname: node.fullname(),
                label: format!("{}{}", node.prefix(), node.segment()),
                columns: columns(node),
            });
            stack.extend(self.nodes[id].children.values().rev());
        }

        rows
    }

    /// Render as plain lines of the form `label (col1, col2)`
    pub fn format_plain<F>(&self, columns: F) -> Vec<String>
    where
        F: FnMut(NodeRef<'_>) -> Vec<String>,
    {
        self.rows(columns)
            .into_iter()
            .map(|row| {
                if row.columns.is_empty() {
                    row.label
                } else {
                    format!("{} ({})", row.label, row.columns.join(", "))
                }
            })
            .collect()
    }
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a Node {
        &self.tree.nodes[self.id]
    }

    /// Arena index of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// This node's own segment
    pub fn segment(&self) -> &'a str {
        &self.node().segment
    }

    /// Sum of everything added at or below this node
    pub fn amount(&self) -> Money {
        self.node().amount
    }

    /// Enclosing node; `None` at the root
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    /// Children in first-seen order
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.node()
            .children
            .values()
            .map(move |&id| NodeRef { tree, id })
    }

    /// Number of ancestors
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Whether this is the last child of its parent; the root counts as last
    pub fn is_last_child(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.node().children.values().next_back() == Some(&self.id),
            None => true,
        }
    }

    /// Full colon-delimited name, rebuilt by walking up the parents
    pub fn fullname(&self) -> String {
        let mut segments: Vec<&str> = self.ancestors().map(|n| n.segment()).collect();
        segments.reverse();
        segments.push(self.segment());
        segments.join(&SEGMENT_SEPARATOR.to_string())
    }

    fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Box-drawing prefix for this node's line
    fn prefix(&self) -> String {
        if self.parent().is_none() {
            return String::new();
        }

        // Ancestors below the root, outermost first
        let mut lineage: Vec<NodeRef<'a>> = self
            .ancestors()
            .filter(|n| n.parent().is_some())
            .collect();
        lineage.reverse();

        let mut prefix = String::new();
        for ancestor in lineage {
            prefix.push_str(if ancestor.is_last_child() { "    " } else { "│   " });
        }
        prefix.push_str(if self.is_last_child() { "└── " } else { "├── " });
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    fn example() -> AccountTree {
        let mut tree = AccountTree::new("A");
        tree.add("A:B", money(1500)).unwrap();
        tree.add("A:B:C", money(-1000)).unwrap();
        tree.add("A:D", money(300)).unwrap();
        tree
    }

    #[test]
    fn test_amounts_propagate_upwards() {
        let tree = example();
        assert_eq!(tree.get("A").unwrap().amount(), money(800));
        assert_eq!(tree.get("A:B").unwrap().amount(), money(500));
        assert_eq!(tree.get("A:B:C").unwrap().amount(), money(-1000));
        assert_eq!(tree.get("A:D").unwrap().amount(), money(300));
    }

    #[test]
    fn test_get_does_not_create() {
        let tree = example();
        assert!(tree.get("A:X").is_none());
        assert!(tree.get("B").is_none());
        assert!(tree.get("A:B:C:D").is_none());
        assert_eq!(tree.root().children().count(), 2);
    }

    #[test]
    fn test_segment_mismatch() {
        let mut tree = AccountTree::new("Expenses");
        let err = tree.add("Income:Salary", money(1)).unwrap_err();
        assert!(matches!(err, LedgerError::SegmentMismatch { .. }));
        assert!(tree.root().amount().is_zero());
    }

    #[test]
    fn test_fullname_walks_parents() {
        let tree = example();
        let c = tree.get("A:B:C").unwrap();
        assert_eq!(c.fullname(), "A:B:C");
        assert_eq!(c.depth(), 2);
        assert_eq!(c.parent().unwrap().segment(), "B");
        assert_eq!(tree.root().fullname(), "A");
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = AccountTree::new("Expenses");
        tree.add("Expenses:Zoo", money(1)).unwrap();
        tree.add("Expenses:Apple", money(1)).unwrap();
        tree.add("Expenses:Zoo", money(1)).unwrap();

        let names: Vec<_> = tree.root().children().map(|n| n.segment()).collect();
        assert_eq!(names, vec!["Zoo", "Apple"]);
    }

    #[test]
    fn test_format_plain() {
        let lines = example().format_plain(|node| vec![node.amount().to_string()]);
        assert_eq!(
            lines,
            vec![
                "A ($8.00)",
                "├── B ($5.00)",
                "│   └── C (-$10.00)",
                "└── D ($3.00)",
            ]
        );
    }

    #[test]
    fn test_prefix_under_last_child() {
        let mut tree = AccountTree::new("A");
        tree.add("A:B", money(1)).unwrap();
        tree.add("A:D:E", money(1)).unwrap();
        tree.add("A:D:F:G", money(1)).unwrap();

        let labels: Vec<_> = tree.rows(|_| Vec::new()).into_iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                "A",
                "├── B",
                "└── D",
                "    ├── E",
                "    └── F",
                "        └── G",
            ]
        );
    }
}
