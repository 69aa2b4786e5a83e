//! Query IR and parsers for siq secondary-index search.
//!
//! A search query arrives as text, is parsed into a typed tree, and every
//! downstream stage (validation, planning, execution) works on that tree
//! instead of the text. Two dialects feed the same IR:
//!
//! - the expression dialect carried by a search command:
//!   `@price:[10 (25] @color:{red|blue} | -@sold:{yes}`
//! - the statement dialect describing a whole search:
//!   `select name from items where price >= 10 order by price desc limit 0, 10`
//!
//! Both entry points fail with the single [`SyntaxError`] on any malformed
//! input. Every node renders a canonical textual form through
//! [`Node::dump`], which doubles as the round-trip representation the tests
//! pin down, and exposes its children through one generic iteration
//! protocol ([`Children`]) that tree-walking passes share.
//!
//! # Example
//!
//! ```
//! use siq_ir::{Node, parse_query};
//!
//! let expr = parse_query("@a:[1 2]").unwrap();
//! assert_eq!(expr.dump(), "(and a >= 1, a <= 2)");
//! ```

#![warn(missing_docs)]

mod ast;
mod dot;
mod error;
mod iter;
mod lexer;
mod op;
mod parser;
mod sql;

pub use ast::{
    AndExpr, BoolLiteral, FieldRef, IndexRef, Limit, Node, NotExpr, NumericCompareExpr,
    NumericLiteral, OrExpr, QueryExpr, SearchStmt, SelectExpr, SortBy, StringLiteral,
    TagContainExpr,
};
pub use dot::dump_dot;
pub use error::{CastMismatch, SyntaxError};
pub use iter::{Children, NodeRef, SlotAccessor};
pub use lexer::{Token, tokenize};
pub use op::{CompareOp, SortOrder};
pub use parser::parse_query;
pub use sql::parse_sql;
