//! Query intermediate representation.
//!
//! A parsed query is a tree of the node types below. Ownership is strictly
//! hierarchical: every node owns its children outright, so rewrite passes
//! replace whole subtrees instead of mutating shared state, and a tree is
//! dropped as one unit when its owner lets go of the root.
//!
//! Boolean nodes are gathered into the [`QueryExpr`] sum type; rewrite
//! passes match on it directly, or narrow a node they have not yet proven
//! with the fallible [`TryFrom`] conversions.

use std::fmt;

use crate::{
    error::CastMismatch,
    iter::{Children, NodeRef, SlotAccessor},
    op::{CompareOp, SortOrder},
};

/// The polymorphic surface every IR node implements.
///
/// External passes (validators, optimizers, dumpers) render and traverse
/// trees exclusively through this contract plus [`NodeRef`]; they never need
/// a node's concrete type except via a checked conversion.
pub trait Node {
    /// A stable, distinct tag per concrete node type.
    fn name(&self) -> &'static str;

    /// The canonical textual rendering of this subtree.
    fn dump(&self) -> String;

    /// The leaf-level payload, or an empty string for interior nodes.
    fn content(&self) -> String {
        String::new()
    }

    /// Enumerates the direct children in declaration order.
    fn children(&self) -> Children<'_>;
}

/// Joins each element's canonical form with `", "`.
fn join_dumps<T: Node>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.dump())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escapes a string for the canonical quoted rendering.
///
/// Quotes, backslashes, and the common whitespace escapes mirror the input
/// escape set; any other ASCII control byte renders as `\x..` hex.
fn escape(val: &str) -> String {
    let mut out = String::with_capacity(val.len());
    for ch in val.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// A named field on an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Field name, stored without the `@` sigil.
    pub name: String,
}

impl FieldRef {
    /// Creates a reference to the named field.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Node for FieldRef {
    fn name(&self) -> &'static str {
        "FieldRef"
    }

    fn dump(&self) -> String {
        self.name.clone()
    }

    fn content(&self) -> String {
        self.dump()
    }

    fn children(&self) -> Children<'_> {
        Children::none()
    }
}

/// The index a statement runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRef {
    /// Index name, treated as an opaque string.
    pub name: String,
}

impl IndexRef {
    /// Creates a reference to the named index.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Node for IndexRef {
    fn name(&self) -> &'static str {
        "IndexRef"
    }

    fn dump(&self) -> String {
        self.name.clone()
    }

    fn content(&self) -> String {
        self.dump()
    }

    fn children(&self) -> Children<'_> {
        Children::none()
    }
}

/// A string constant; renders quoted, with escapes applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// The unescaped value.
    pub val: String,
}

impl StringLiteral {
    /// Creates a string constant from its unescaped value.
    pub fn new(val: impl Into<String>) -> Self {
        Self { val: val.into() }
    }
}

impl Node for StringLiteral {
    fn name(&self) -> &'static str {
        "StringLiteral"
    }

    fn dump(&self) -> String {
        format!("\"{}\"", escape(&self.val))
    }

    fn content(&self) -> String {
        self.dump()
    }

    fn children(&self) -> Children<'_> {
        Children::none()
    }
}

/// A numeric constant.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericLiteral {
    /// The value; integral values render without a fraction.
    pub val: f64,
}

impl NumericLiteral {
    /// Creates a numeric constant.
    pub fn new(val: f64) -> Self {
        Self { val }
    }
}

impl Node for NumericLiteral {
    fn name(&self) -> &'static str {
        "NumericLiteral"
    }

    fn dump(&self) -> String {
        format!("{}", self.val)
    }

    fn content(&self) -> String {
        self.dump()
    }

    fn children(&self) -> Children<'_> {
        Children::none()
    }
}

/// A boolean constant; the wildcard query `*` parses to `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolLiteral {
    /// The truth value.
    pub val: bool,
}

impl BoolLiteral {
    /// Creates a boolean constant.
    pub fn new(val: bool) -> Self {
        Self { val }
    }
}

impl Node for BoolLiteral {
    fn name(&self) -> &'static str {
        "BoolLiteral"
    }

    fn dump(&self) -> String {
        if self.val { "true" } else { "false" }.to_string()
    }

    fn content(&self) -> String {
        self.dump()
    }

    fn children(&self) -> Children<'_> {
        Children::none()
    }
}

/// A "field's tag set contains this tag" predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagContainExpr {
    /// The tag field under test.
    pub field: FieldRef,
    /// The tag that must be present.
    pub tag: StringLiteral,
}

impl TagContainExpr {
    /// Creates a tag-membership predicate.
    pub fn new(field: FieldRef, tag: StringLiteral) -> Self {
        Self { field, tag }
    }
}

impl Node for TagContainExpr {
    fn name(&self) -> &'static str {
        "TagContainExpr"
    }

    fn dump(&self) -> String {
        format!("{} hastag {}", self.field.dump(), self.tag.dump())
    }

    fn children(&self) -> Children<'_> {
        Children::pair(
            NodeRef::FieldRef(&self.field),
            NodeRef::StringLiteral(&self.tag),
        )
    }
}

/// A "field OP constant" numeric predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericCompareExpr {
    /// The relational operator.
    pub op: CompareOp,
    /// The numeric field under test.
    pub field: FieldRef,
    /// The constant it is compared against.
    pub num: NumericLiteral,
}

impl NumericCompareExpr {
    /// Creates a numeric comparison predicate.
    pub fn new(op: CompareOp, field: FieldRef, num: NumericLiteral) -> Self {
        Self { op, field, num }
    }
}

impl Node for NumericCompareExpr {
    fn name(&self) -> &'static str {
        "NumericCompareExpr"
    }

    fn dump(&self) -> String {
        format!("{} {} {}", self.field.dump(), self.op.symbol(), self.num.dump())
    }

    fn content(&self) -> String {
        self.op.symbol().to_string()
    }

    fn children(&self) -> Children<'_> {
        Children::pair(
            NodeRef::FieldRef(&self.field),
            NodeRef::NumericLiteral(&self.num),
        )
    }
}

/// Logical negation of exactly one subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct NotExpr {
    /// The negated subtree.
    pub inner: Box<QueryExpr>,
}

impl NotExpr {
    /// Wraps an expression in a negation.
    pub fn new(inner: QueryExpr) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Node for NotExpr {
    fn name(&self) -> &'static str {
        "NotExpr"
    }

    fn dump(&self) -> String {
        format!("not {}", self.inner.dump())
    }

    fn children(&self) -> Children<'_> {
        Children::single(NodeRef::from(&*self.inner))
    }
}

/// N-ary conjunction; the child list is never empty and its order is the
/// order the children appeared in source.
#[derive(Debug, Clone, PartialEq)]
pub struct AndExpr {
    /// The conjoined subtrees.
    pub inners: Vec<QueryExpr>,
}

impl Node for AndExpr {
    fn name(&self) -> &'static str {
        "AndExpr"
    }

    fn dump(&self) -> String {
        format!("(and {})", join_dumps(&self.inners))
    }

    fn children(&self) -> Children<'_> {
        Children::from_exprs(&self.inners)
    }
}

/// N-ary disjunction; same shape rules as [`AndExpr`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrExpr {
    /// The disjoined subtrees.
    pub inners: Vec<QueryExpr>,
}

impl Node for OrExpr {
    fn name(&self) -> &'static str {
        "OrExpr"
    }

    fn dump(&self) -> String {
        format!("(or {})", join_dumps(&self.inners))
    }

    fn children(&self) -> Children<'_> {
        Children::from_exprs(&self.inners)
    }
}

/// Any boolean query node; the sum type rewrite passes match on.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// Tag-set membership test.
    TagContain(TagContainExpr),
    /// Numeric comparison against a constant.
    NumericCompare(NumericCompareExpr),
    /// Constant truth value.
    Bool(BoolLiteral),
    /// Negation of one subtree.
    Not(NotExpr),
    /// N-ary conjunction.
    And(AndExpr),
    /// N-ary disjunction.
    Or(OrExpr),
}

impl QueryExpr {
    /// Folds a run of AND-connected expressions into one node.
    ///
    /// A single expression is returned unwrapped rather than wrapped in a
    /// singleton conjunction; `exprs` must not be empty. Nested same-kind
    /// nodes are left in place so the tree keeps exactly the structure the
    /// parser built.
    pub fn and(exprs: Vec<Self>) -> Self {
        match exprs.len() {
            1 => exprs.into_iter().next().unwrap(),
            _ => Self::And(AndExpr { inners: exprs }),
        }
    }

    /// Folds a run of OR-connected expressions into one node.
    ///
    /// Same unwrap-if-singleton rule as [`QueryExpr::and`].
    pub fn or(exprs: Vec<Self>) -> Self {
        match exprs.len() {
            1 => exprs.into_iter().next().unwrap(),
            _ => Self::Or(OrExpr { inners: exprs }),
        }
    }

    /// Borrows the active variant through the shared node contract.
    fn as_node(&self) -> &dyn Node {
        match self {
            Self::TagContain(v) => v,
            Self::NumericCompare(v) => v,
            Self::Bool(v) => v,
            Self::Not(v) => v,
            Self::And(v) => v,
            Self::Or(v) => v,
        }
    }
}

impl Node for QueryExpr {
    fn name(&self) -> &'static str {
        self.as_node().name()
    }

    fn dump(&self) -> String {
        self.as_node().dump()
    }

    fn content(&self) -> String {
        self.as_node().content()
    }

    fn children(&self) -> Children<'_> {
        self.as_node().children()
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

impl From<TagContainExpr> for QueryExpr {
    fn from(expr: TagContainExpr) -> Self {
        Self::TagContain(expr)
    }
}

impl From<NumericCompareExpr> for QueryExpr {
    fn from(expr: NumericCompareExpr) -> Self {
        Self::NumericCompare(expr)
    }
}

impl From<BoolLiteral> for QueryExpr {
    fn from(expr: BoolLiteral) -> Self {
        Self::Bool(expr)
    }
}

impl From<NotExpr> for QueryExpr {
    fn from(expr: NotExpr) -> Self {
        Self::Not(expr)
    }
}

impl From<AndExpr> for QueryExpr {
    fn from(expr: AndExpr) -> Self {
        Self::And(expr)
    }
}

impl From<OrExpr> for QueryExpr {
    fn from(expr: OrExpr) -> Self {
        Self::Or(expr)
    }
}

impl TryFrom<QueryExpr> for TagContainExpr {
    type Error = CastMismatch;

    fn try_from(expr: QueryExpr) -> Result<Self, CastMismatch> {
        match expr {
            QueryExpr::TagContain(v) => Ok(v),
            other => Err(CastMismatch(other)),
        }
    }
}

impl TryFrom<QueryExpr> for NumericCompareExpr {
    type Error = CastMismatch;

    fn try_from(expr: QueryExpr) -> Result<Self, CastMismatch> {
        match expr {
            QueryExpr::NumericCompare(v) => Ok(v),
            other => Err(CastMismatch(other)),
        }
    }
}

impl TryFrom<QueryExpr> for BoolLiteral {
    type Error = CastMismatch;

    fn try_from(expr: QueryExpr) -> Result<Self, CastMismatch> {
        match expr {
            QueryExpr::Bool(v) => Ok(v),
            other => Err(CastMismatch(other)),
        }
    }
}

impl TryFrom<QueryExpr> for NotExpr {
    type Error = CastMismatch;

    fn try_from(expr: QueryExpr) -> Result<Self, CastMismatch> {
        match expr {
            QueryExpr::Not(v) => Ok(v),
            other => Err(CastMismatch(other)),
        }
    }
}

impl TryFrom<QueryExpr> for AndExpr {
    type Error = CastMismatch;

    fn try_from(expr: QueryExpr) -> Result<Self, CastMismatch> {
        match expr {
            QueryExpr::And(v) => Ok(v),
            other => Err(CastMismatch(other)),
        }
    }
}

impl TryFrom<QueryExpr> for OrExpr {
    type Error = CastMismatch;

    fn try_from(expr: QueryExpr) -> Result<Self, CastMismatch> {
        match expr {
            QueryExpr::Or(v) => Ok(v),
            other => Err(CastMismatch(other)),
        }
    }
}

/// Projection list; an empty field list means "all fields".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectExpr {
    /// The projected fields, in source order.
    pub fields: Vec<FieldRef>,
}

impl Node for SelectExpr {
    fn name(&self) -> &'static str {
        "SelectExpr"
    }

    fn dump(&self) -> String {
        if self.fields.is_empty() {
            return "select *".to_string();
        }
        format!("select {}", join_dumps(&self.fields))
    }

    fn children(&self) -> Children<'_> {
        Children::from_fields(&self.fields)
    }
}

/// Pagination window over the result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limit {
    /// Results to skip.
    pub offset: usize,
    /// Results to return after the offset.
    pub count: usize,
}

impl Limit {
    /// Creates a pagination window.
    pub fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self {
            offset: 0,
            count: usize::MAX,
        }
    }
}

impl Node for Limit {
    fn name(&self) -> &'static str {
        "Limit"
    }

    fn dump(&self) -> String {
        format!("limit {}, {}", self.offset, self.count)
    }

    fn content(&self) -> String {
        format!("{}, {}", self.offset, self.count)
    }

    fn children(&self) -> Children<'_> {
        Children::none()
    }
}

/// Result ordering on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    /// Sort direction.
    pub order: SortOrder,
    /// The field to order by.
    pub field: FieldRef,
}

impl SortBy {
    /// Creates a sort spec.
    pub fn new(order: SortOrder, field: FieldRef) -> Self {
        Self { order, field }
    }
}

impl Node for SortBy {
    fn name(&self) -> &'static str {
        "SortBy"
    }

    fn dump(&self) -> String {
        format!("sortby {}, {}", self.field.dump(), self.order.as_str())
    }

    fn content(&self) -> String {
        self.order.as_str().to_string()
    }

    fn children(&self) -> Children<'_> {
        Children::single(NodeRef::FieldRef(&self.field))
    }
}

/// A complete search statement.
///
/// The projection and index are always present; the boolean query, the
/// pagination window, and the sort spec are optional. Children iterate in
/// declaration order, while the canonical rendering places the sort spec
/// before the limit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStmt {
    /// The projection.
    pub select: SelectExpr,
    /// The target index.
    pub index: IndexRef,
    /// The boolean filter, if any.
    pub query: Option<QueryExpr>,
    /// The pagination window, if any.
    pub limit: Option<Limit>,
    /// The sort spec, if any.
    pub sort_by: Option<SortBy>,
}

impl SearchStmt {
    /// Slot accessors in declaration order; absent optional slots yield
    /// `None` and are skipped during iteration.
    pub const CHILD_MAP: &'static [SlotAccessor] = &[
        Self::select_slot,
        Self::index_slot,
        Self::query_slot,
        Self::limit_slot,
        Self::sort_by_slot,
    ];

    /// Accessor for the projection slot.
    fn select_slot(&self) -> Option<NodeRef<'_>> {
        Some(NodeRef::SelectExpr(&self.select))
    }

    /// Accessor for the index slot.
    fn index_slot(&self) -> Option<NodeRef<'_>> {
        Some(NodeRef::IndexRef(&self.index))
    }

    /// Accessor for the optional query slot.
    fn query_slot(&self) -> Option<NodeRef<'_>> {
        self.query.as_ref().map(NodeRef::from)
    }

    /// Accessor for the optional limit slot.
    fn limit_slot(&self) -> Option<NodeRef<'_>> {
        self.limit.as_ref().map(NodeRef::Limit)
    }

    /// Accessor for the optional sort slot.
    fn sort_by_slot(&self) -> Option<NodeRef<'_>> {
        self.sort_by.as_ref().map(NodeRef::SortBy)
    }
}

impl Node for SearchStmt {
    fn name(&self) -> &'static str {
        "SearchStmt"
    }

    fn dump(&self) -> String {
        let mut opt = String::new();
        if let Some(query) = &self.query {
            opt.push_str(&format!(" where {}", query.dump()));
        }
        if let Some(sort_by) = &self.sort_by {
            opt.push_str(&format!(" {}", sort_by.dump()));
        }
        if let Some(limit) = &self.limit {
            opt.push_str(&format!(" {}", limit.dump()));
        }
        format!("{} from {}{}", self.select.dump(), self.index.dump(), opt)
    }

    fn children(&self) -> Children<'_> {
        Children::slots(self, Self::CHILD_MAP)
    }
}

impl fmt::Display for SearchStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}
