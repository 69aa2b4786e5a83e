//! Generic child iteration over IR trees.
//!
//! Traversal passes see every node through [`NodeRef`] and walk it with
//! [`Children`], so a visitor (dumper, validator, optimizer) never writes
//! per-kind traversal code. Nodes store their children however suits them —
//! not at all, one fixed child, two fixed children, an ordered collection,
//! or named heterogeneous slots — and each storage shape maps onto one
//! [`Children`] constructor behind the same iterator contract.

use std::slice;

use crate::ast::{
    AndExpr, BoolLiteral, FieldRef, IndexRef, Limit, Node, NotExpr, NumericCompareExpr,
    NumericLiteral, OrExpr, QueryExpr, SearchStmt, SelectExpr, SortBy, StringLiteral,
    TagContainExpr,
};

/// A borrowed handle to any node in a tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// Field reference leaf.
    FieldRef(&'a FieldRef),
    /// Index reference leaf.
    IndexRef(&'a IndexRef),
    /// String constant leaf.
    StringLiteral(&'a StringLiteral),
    /// Numeric constant leaf.
    NumericLiteral(&'a NumericLiteral),
    /// Boolean constant leaf.
    BoolLiteral(&'a BoolLiteral),
    /// Tag-membership predicate.
    TagContainExpr(&'a TagContainExpr),
    /// Numeric comparison predicate.
    NumericCompareExpr(&'a NumericCompareExpr),
    /// Negation node.
    NotExpr(&'a NotExpr),
    /// Conjunction node.
    AndExpr(&'a AndExpr),
    /// Disjunction node.
    OrExpr(&'a OrExpr),
    /// Projection list.
    SelectExpr(&'a SelectExpr),
    /// Pagination window.
    Limit(&'a Limit),
    /// Sort spec.
    SortBy(&'a SortBy),
    /// Top-level statement.
    SearchStmt(&'a SearchStmt),
}

impl<'a> NodeRef<'a> {
    /// Borrows the node through the shared contract.
    pub fn as_node(self) -> &'a dyn Node {
        match self {
            Self::FieldRef(v) => v,
            Self::IndexRef(v) => v,
            Self::StringLiteral(v) => v,
            Self::NumericLiteral(v) => v,
            Self::BoolLiteral(v) => v,
            Self::TagContainExpr(v) => v,
            Self::NumericCompareExpr(v) => v,
            Self::NotExpr(v) => v,
            Self::AndExpr(v) => v,
            Self::OrExpr(v) => v,
            Self::SelectExpr(v) => v,
            Self::Limit(v) => v,
            Self::SortBy(v) => v,
            Self::SearchStmt(v) => v,
        }
    }

    /// See [`Node::name`].
    pub fn name(self) -> &'static str {
        self.as_node().name()
    }

    /// See [`Node::dump`].
    pub fn dump(self) -> String {
        self.as_node().dump()
    }

    /// See [`Node::content`].
    pub fn content(self) -> String {
        self.as_node().content()
    }

    /// See [`Node::children`].
    pub fn children(self) -> Children<'a> {
        self.as_node().children()
    }
}

impl<'a> From<&'a QueryExpr> for NodeRef<'a> {
    fn from(expr: &'a QueryExpr) -> Self {
        match expr {
            QueryExpr::TagContain(v) => Self::TagContainExpr(v),
            QueryExpr::NumericCompare(v) => Self::NumericCompareExpr(v),
            QueryExpr::Bool(v) => Self::BoolLiteral(v),
            QueryExpr::Not(v) => Self::NotExpr(v),
            QueryExpr::And(v) => Self::AndExpr(v),
            QueryExpr::Or(v) => Self::OrExpr(v),
        }
    }
}

/// Accessor for one named child slot of a statement.
pub type SlotAccessor = for<'a> fn(&'a SearchStmt) -> Option<NodeRef<'a>>;

/// Lazy, finite iterator over a node's direct children.
///
/// The sequence is restartable: asking the node for [`Node::children`] again
/// yields a fresh iterator over the same children in the same order.
#[derive(Debug, Clone)]
pub struct Children<'a>(Shape<'a>);

/// One variant per child-storage strategy.
#[derive(Debug, Clone)]
enum Shape<'a> {
    /// Leaf node.
    Empty,
    /// Exactly one child.
    Single(Option<NodeRef<'a>>),
    /// Two fixed children of distinct kinds.
    Pair(Option<NodeRef<'a>>, Option<NodeRef<'a>>),
    /// An ordered collection of boolean subtrees.
    Exprs(slice::Iter<'a, QueryExpr>),
    /// An ordered collection of field references.
    Fields(slice::Iter<'a, FieldRef>),
    /// Named slots resolved through an accessor list against one parent.
    Slots {
        /// The statement whose slots are being walked.
        parent: &'a SearchStmt,
        /// Remaining accessors, applied in declaration order.
        accessors: slice::Iter<'static, SlotAccessor>,
    },
}

impl<'a> Children<'a> {
    /// No children.
    pub fn none() -> Self {
        Self(Shape::Empty)
    }

    /// Exactly one child.
    pub fn single(node: NodeRef<'a>) -> Self {
        Self(Shape::Single(Some(node)))
    }

    /// Two fixed children, yielded in argument order.
    pub fn pair(first: NodeRef<'a>, second: NodeRef<'a>) -> Self {
        Self(Shape::Pair(Some(first), Some(second)))
    }

    /// All elements of an ordered expression collection.
    pub fn from_exprs(exprs: &'a [QueryExpr]) -> Self {
        Self(Shape::Exprs(exprs.iter()))
    }

    /// All elements of an ordered field-reference collection.
    pub fn from_fields(fields: &'a [FieldRef]) -> Self {
        Self(Shape::Fields(fields.iter()))
    }

    /// The named slots of `parent`, visited through `accessors` in order.
    ///
    /// Accessors returning `None` (absent optional slots) are skipped, so
    /// the sequence stays finite and gap-free.
    pub fn slots(parent: &'a SearchStmt, accessors: &'static [SlotAccessor]) -> Self {
        Self(Shape::Slots {
            parent,
            accessors: accessors.iter(),
        })
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            Shape::Empty => None,
            Shape::Single(node) => node.take(),
            Shape::Pair(first, second) => first.take().or_else(|| second.take()),
            Shape::Exprs(iter) => iter.next().map(NodeRef::from),
            Shape::Fields(iter) => iter.next().map(NodeRef::FieldRef),
            Shape::Slots { parent, accessors } => {
                for accessor in accessors.by_ref() {
                    if let Some(node) = accessor(*parent) {
                        return Some(node);
                    }
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{StringLiteral, TagContainExpr};

    fn tag_expr() -> TagContainExpr {
        TagContainExpr::new(FieldRef::new("a"), StringLiteral::new("x"))
    }

    #[test]
    fn leaves_have_no_children() {
        assert_eq!(FieldRef::new("a").children().count(), 0);
        assert_eq!(Limit::default().children().count(), 0);
    }

    #[test]
    fn pair_yields_in_order() {
        let expr = tag_expr();
        let names: Vec<&str> = expr.children().map(|child| child.name()).collect();
        assert_eq!(names, ["FieldRef", "StringLiteral"]);
    }

    #[test]
    fn iteration_is_restartable() {
        let expr = tag_expr();
        let first: Vec<&str> = expr.children().map(|child| child.name()).collect();
        let second: Vec<&str> = expr.children().map(|child| child.name()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn collection_preserves_source_order() {
        let or = QueryExpr::or(vec![
            QueryExpr::TagContain(TagContainExpr::new(
                FieldRef::new("a"),
                StringLiteral::new("x"),
            )),
            QueryExpr::TagContain(TagContainExpr::new(
                FieldRef::new("b"),
                StringLiteral::new("y"),
            )),
        ]);
        let dumps: Vec<String> = or.children().map(|child| child.dump()).collect();
        assert_eq!(dumps, ["a hastag \"x\"", "b hastag \"y\""]);
    }

    #[test]
    fn node_ref_delegates_to_node_contract() {
        let expr = tag_expr();
        let node = NodeRef::TagContainExpr(&expr);
        assert_eq!(node.name(), "TagContainExpr");
        assert_eq!(node.dump(), "a hastag \"x\"");
        assert_eq!(node.content(), "");
        assert_eq!(node.children().count(), 2);
    }
}
