//! Parser for the query-expression dialect.
//!
//! Parses the `@field:…` syntax submitted alongside a search command into a
//! [`QueryExpr`] tree, building IR nodes directly during the descent.
//!
//! # Grammar
//!
//! ```text
//! query  → or
//! or     → and ("|" and)*
//! and    → unary+            (adjacency is implicit conjunction)
//! unary  → "-" unary | atom
//! atom   → "*" | "(" or ")" | "@" field ":" (range | tags)
//! range  → "[" bound bound "]"
//! bound  → "(" number | number | "inf" | "+inf" | "-inf"
//! tags   → "{" tag ("|" tag)* "}"
//! tag    → identifier | string
//! ```
//!
//! # Precedence (highest to lowest)
//!
//! 1. Grouping: `(...)`
//! 2. Negation: `-`
//! 3. AND (implicit, between adjacent atoms)
//! 4. OR (`|`)
//!
//! A run of same-level operators folds into one N-ary node; a lone operand
//! stays unwrapped. Anything left over after a complete expression is a
//! syntax error, as is any malformed bracket or tag-list body.

use crate::{
    ast::{
        BoolLiteral, FieldRef, NotExpr, NumericCompareExpr, NumericLiteral, QueryExpr,
        StringLiteral, TagContainExpr,
    },
    error::SyntaxError,
    lexer::{Cursor, Token, tokenize},
    op::CompareOp,
};

/// One side of a numeric range after bound classification.
enum Bound {
    /// Finite bound; the comparison keeps the boundary value.
    Inclusive(f64),
    /// Finite bound marked `(`; the boundary value is excluded.
    Exclusive(f64),
    /// No constraint on this side.
    Open,
}

/// Which side of a range a bound sits on.
#[derive(Clone, Copy)]
enum BoundSide {
    /// The first bound.
    Lower,
    /// The second bound.
    Upper,
}

/// Builds a field-versus-constant comparison.
fn compare(field: &str, op: CompareOp, val: f64) -> QueryExpr {
    QueryExpr::NumericCompare(NumericCompareExpr::new(
        op,
        FieldRef::new(field),
        NumericLiteral::new(val),
    ))
}

/// Recursive descent parser over the token stream.
struct Parser {
    /// Token cursor.
    cur: Cursor,
}

impl Parser {
    /// Creates a parser over a token stream.
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            cur: Cursor::new(tokens),
        }
    }

    /// Parses the whole stream as one expression.
    fn parse(mut self) -> Result<QueryExpr, SyntaxError> {
        let expr = self.parse_or()?;

        // no silent truncation of trailing input
        if !self.cur.at_end() {
            return Err(SyntaxError);
        }

        Ok(expr)
    }

    /// or → and ("|" and)*
    fn parse_or(&mut self) -> Result<QueryExpr, SyntaxError> {
        let mut exprs = vec![self.parse_and()?];
        while self.cur.eat(&Token::Pipe) {
            exprs.push(self.parse_and()?);
        }
        Ok(QueryExpr::or(exprs))
    }

    /// and → unary+
    fn parse_and(&mut self) -> Result<QueryExpr, SyntaxError> {
        let mut exprs = vec![self.parse_unary()?];
        while self.at_atom_start() {
            exprs.push(self.parse_unary()?);
        }
        Ok(QueryExpr::and(exprs))
    }

    /// True when the current token can begin a unary expression.
    fn at_atom_start(&self) -> bool {
        matches!(
            self.cur.peek(),
            Some(Token::Minus | Token::Star | Token::LParen | Token::At)
        )
    }

    /// unary → "-" unary | atom
    fn parse_unary(&mut self) -> Result<QueryExpr, SyntaxError> {
        if self.cur.eat(&Token::Minus) {
            let inner = self.parse_unary()?;
            return Ok(QueryExpr::Not(NotExpr::new(inner)));
        }

        self.parse_atom()
    }

    /// atom → "*" | "(" or ")" | "@" field ":" (range | tags)
    fn parse_atom(&mut self) -> Result<QueryExpr, SyntaxError> {
        match self.cur.peek() {
            Some(Token::Star) => {
                self.cur.advance();
                Ok(QueryExpr::Bool(BoolLiteral::new(true)))
            }
            Some(Token::LParen) => {
                self.cur.advance();
                let inner = self.parse_or()?;
                self.cur.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::At) => {
                self.cur.advance();
                self.parse_field_query()
            }
            _ => Err(SyntaxError),
        }
    }

    /// field ":" (range | tags), after the leading `@`.
    fn parse_field_query(&mut self) -> Result<QueryExpr, SyntaxError> {
        let field = self.cur.expect_ident()?;
        self.cur.expect(&Token::Colon)?;

        match self.cur.peek() {
            Some(Token::LBracket) => {
                self.cur.advance();
                self.parse_range(&field)
            }
            Some(Token::LBrace) => {
                self.cur.advance();
                self.parse_tag_list(&field)
            }
            _ => Err(SyntaxError),
        }
    }

    /// Numeric range body: exactly two bounds, then `]`.
    ///
    /// Each finite bound becomes one comparison; an open side contributes
    /// nothing. One comparison stays bare, two combine into a conjunction,
    /// and a fully open range collapses to `true`.
    fn parse_range(&mut self, field: &str) -> Result<QueryExpr, SyntaxError> {
        let lower = self.parse_bound(BoundSide::Lower)?;
        let upper = self.parse_bound(BoundSide::Upper)?;
        self.cur.expect(&Token::RBracket)?;

        let mut exprs = Vec::new();
        match lower {
            Bound::Inclusive(val) => exprs.push(compare(field, CompareOp::Ge, val)),
            Bound::Exclusive(val) => exprs.push(compare(field, CompareOp::Gt, val)),
            Bound::Open => {}
        }
        match upper {
            Bound::Inclusive(val) => exprs.push(compare(field, CompareOp::Le, val)),
            Bound::Exclusive(val) => exprs.push(compare(field, CompareOp::Lt, val)),
            Bound::Open => {}
        }

        if exprs.is_empty() {
            return Ok(QueryExpr::Bool(BoolLiteral::new(true)));
        }
        Ok(QueryExpr::and(exprs))
    }

    /// One range bound: an exclusive `(`-prefixed number, a signed number,
    /// or an infinity. An infinity pointing away from its own side is
    /// rejected, and exclusive markers only combine with finite numbers.
    fn parse_bound(&mut self, side: BoundSide) -> Result<Bound, SyntaxError> {
        if self.cur.eat(&Token::LParen) {
            return Ok(Bound::Exclusive(self.cur.signed_number()?));
        }

        let sign = self.cur.eat_sign();
        if self.eat_inf() {
            match (side, sign) {
                (BoundSide::Lower, 1) | (BoundSide::Upper, -1) => Err(SyntaxError),
                _ => Ok(Bound::Open),
            }
        } else {
            self.cur.number(sign).map(Bound::Inclusive)
        }
    }

    /// Consumes a bare `inf` if present.
    fn eat_inf(&mut self) -> bool {
        if matches!(self.cur.peek(), Some(Token::Ident(word)) if word == "inf") {
            self.cur.advance();
            true
        } else {
            false
        }
    }

    /// Tag list body: one or more `|`-separated tags, then `}`.
    ///
    /// Each tag expands to its own membership test against a fresh copy of
    /// the field reference; several tags fold into an OR in source order.
    fn parse_tag_list(&mut self, field: &str) -> Result<QueryExpr, SyntaxError> {
        let mut exprs = vec![self.parse_tag(field)?];
        while self.cur.eat(&Token::Pipe) {
            exprs.push(self.parse_tag(field)?);
        }
        self.cur.expect(&Token::RBrace)?;
        Ok(QueryExpr::or(exprs))
    }

    /// A single tag: a bare identifier or a quoted string.
    fn parse_tag(&mut self, field: &str) -> Result<QueryExpr, SyntaxError> {
        let tag = match self.cur.next_cloned() {
            Some(Token::Ident(word)) => word,
            Some(Token::Str(text)) => text,
            _ => return Err(SyntaxError),
        };

        Ok(QueryExpr::TagContain(TagContainExpr::new(
            FieldRef::new(field),
            StringLiteral::new(tag),
        )))
    }
}

/// Parses query text in the `@field:…` expression dialect.
///
/// Success yields the IR root; any lexical or structural violation,
/// including empty input and trailing garbage, yields [`SyntaxError`] with
/// no further detail and no partial tree.
pub fn parse_query(input: &str) -> Result<QueryExpr, SyntaxError> {
    Parser::new(tokenize(input)?).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    /// Parses and renders, so expectations read as input/output pairs.
    fn ir(input: &str) -> String {
        parse_query(input).unwrap().dump()
    }

    fn fails(input: &str) {
        assert_eq!(parse_query(input), Err(SyntaxError), "input: {input:?}");
    }

    #[test]
    fn malformed_inputs() {
        fails("");
        fails("a");
        fails("@a");
        fails("a:");
        fails("@a:");
        fails("@a:[]");
        fails("@a:[1 2");
        fails("@a:[(inf 1]");
        fails("@a:[((1 2]");
        fails("@a:[1]");
        fails("@a:[1 2 3]");
        fails("@a:[+inf 2]");
        fails("@a:[1 -inf]");
        fails("@a:{}");
        fails("@a:{x");
        fails("@a:{|}");
        fails("@a:{x|}");
        fails("@a:{|y}");
        fails("@a:{x|y|}");
        fails("@a:{x}|");
        fails("@a:{x} -");
        fails("@a:{x}|@a:{x}|");
        fails("(@a:{x}");
        fails("@a:{x})");
    }

    #[test]
    fn numeric_ranges() {
        assert_eq!(ir("@a:[1 2]"), "(and a >= 1, a <= 2)");
        assert_eq!(ir("@a : [1 2]"), "(and a >= 1, a <= 2)");
        assert_eq!(ir("@a:[(1 2]"), "(and a > 1, a <= 2)");
        assert_eq!(ir("@a:[1 (2]"), "(and a >= 1, a < 2)");
        assert_eq!(ir("@a:[(1 (2]"), "(and a > 1, a < 2)");
        assert_eq!(ir("@a:[-1.5 2.5]"), "(and a >= -1.5, a <= 2.5)");
    }

    #[test]
    fn unbounded_ranges_collapse() {
        assert_eq!(ir("@a:[inf 2]"), "a <= 2");
        assert_eq!(ir("@a:[-inf 2]"), "a <= 2");
        assert_eq!(ir("@a:[1 inf]"), "a >= 1");
        assert_eq!(ir("@a:[1 +inf]"), "a >= 1");
        assert_eq!(ir("@a:[(1 +inf]"), "a > 1");
        assert_eq!(ir("@a:[-inf +inf]"), "true");
        assert_eq!(ir("@a:[inf inf]"), "true");
    }

    #[test]
    fn tag_lists() {
        assert_eq!(ir("@a:{x}"), "a hastag \"x\"");
        assert_eq!(ir("@a:{x|y}"), "(or a hastag \"x\", a hastag \"y\")");
        assert_eq!(
            ir("@a:{x|y|z}"),
            "(or a hastag \"x\", a hastag \"y\", a hastag \"z\")"
        );
        assert_eq!(ir("@a:{\"x\"|y}"), "(or a hastag \"x\", a hastag \"y\")");
        assert_eq!(ir("@a:{\"x\" | \"y\"}"), "(or a hastag \"x\", a hastag \"y\")");
        assert_eq!(ir("@a:{\"x y\"}"), "a hastag \"x y\"");
    }

    #[test]
    fn implicit_and() {
        assert_eq!(ir("@a:{x} @b:[1 inf]"), "(and a hastag \"x\", b >= 1)");
        assert_eq!(
            ir("@a:{x} @b:[1 inf] @c:{y}"),
            "(and a hastag \"x\", b >= 1, c hastag \"y\")"
        );
        // adjacency needs no whitespace
        assert_eq!(ir("@a:{x}@b:{y}"), "(and a hastag \"x\", b hastag \"y\")");
    }

    #[test]
    fn explicit_or() {
        assert_eq!(ir("@a:{x} | @b:[1 inf]"), "(or a hastag \"x\", b >= 1)");
        assert_eq!(
            ir("@a:{x}|@b:[1 inf] | @c:{y}"),
            "(or a hastag \"x\", b >= 1, c hastag \"y\")"
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            ir("@a:[1 inf] @b:[inf 2]| @c:[(3 inf]"),
            "(or (and a >= 1, b <= 2), c > 3)"
        );
        assert_eq!(
            ir("@a:[1 inf] | @b:[inf 2] @c:[(3 inf]"),
            "(or a >= 1, (and b <= 2, c > 3))"
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            ir("(@a:[1 inf] @b:[inf 2])| @c:[(3 inf]"),
            "(or (and a >= 1, b <= 2), c > 3)"
        );
        assert_eq!(
            ir("@a:[1 inf] | (@b:[inf 2] @c:[(3 inf])"),
            "(or a >= 1, (and b <= 2, c > 3))"
        );
        assert_eq!(
            ir("@a:[1 inf] (@b:[inf 2]| @c:[(3 inf])"),
            "(and a >= 1, (or b <= 2, c > 3))"
        );
        assert_eq!(
            ir("(@a:[1 inf] | @b:[inf 2]) @c:[(3 inf]"),
            "(and (or a >= 1, b <= 2), c > 3)"
        );
    }

    #[test]
    fn parenthesized_same_kind_chains_stay_nested() {
        assert_eq!(
            ir("(@a:{x}|@b:{y})|@c:{z}"),
            "(or (or a hastag \"x\", b hastag \"y\"), c hastag \"z\")"
        );
    }

    #[test]
    fn negation() {
        assert_eq!(ir("-@a:{x}"), "not a hastag \"x\"");
        assert_eq!(ir("-@a:[(1 +inf]"), "not a > 1");
        assert_eq!(ir("--@a:{x}"), "not not a hastag \"x\"");
        assert_eq!(
            ir("-@a:[1 inf] @b:[inf 2]| -@c:[(3 inf]"),
            "(or (and not a >= 1, b <= 2), not c > 3)"
        );
        assert_eq!(
            ir("@a:[1 inf] -(@b:[inf 2]| @c:[(3 inf])"),
            "(and a >= 1, not (or b <= 2, c > 3))"
        );
    }

    #[test]
    fn wildcard() {
        assert_eq!(ir("*"), "true");
        assert_eq!(ir("* *"), "(and true, true)");
        assert_eq!(ir("*|*"), "(or true, true)");
    }

    #[test]
    fn no_partial_tree_on_failure() {
        // the prefix alone is valid; the trailing garbage must poison it
        assert!(parse_query("@a:{x}").is_ok());
        fails("@a:{x} ]");
    }
}
