//! Error types for query parsing and tree rewriting.

use thiserror::Error;

use crate::ast::QueryExpr;

/// The single parse failure shared by both dialects.
///
/// Every lexical or structural violation collapses into this one value; the
/// rendered message is the entire user-visible contract, with no hint of
/// where in the input the violation sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid syntax")]
pub struct SyntaxError;

/// A checked conversion found a different variant than requested.
///
/// The rejected node rides along so the caller keeps ownership of the
/// subtree and can keep working with it after the failed narrowing.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("query node is not the requested variant")]
pub struct CastMismatch(pub QueryExpr);

impl CastMismatch {
    /// Recovers the rejected node.
    pub fn into_inner(self) -> QueryExpr {
        self.0
    }
}
