//! Parser for the statement dialect.
//!
//! Parses a whole search statement into a [`SearchStmt`], clause by clause.
//!
//! # Grammar
//!
//! ```text
//! stmt    → "select" ("*" | ident ("," ident)*)
//!           "from" ident
//!           ["where" or] ["order" "by" ident ["asc" | "desc"]]
//!           ["limit" uint ["," uint]]
//! or      → and ("or" and)*
//! and     → unary ("and" unary)*
//! unary   → "not" unary | primary
//! primary → "true" | "false" | "(" or ")"
//!         | ident cmp number | number cmp ident | ident "hastag" string
//! ```
//!
//! Keywords match case-insensitively. A comparison written constant-first is
//! stored field-first with the operator flipped, so `2 <= e` and `e >= 2`
//! build the same node. `limit N` reads as offset 0, count N; `limit N, M`
//! as offset N, count M.

use crate::{
    ast::{
        BoolLiteral, FieldRef, IndexRef, Limit, NotExpr, NumericCompareExpr, NumericLiteral,
        QueryExpr, SearchStmt, SelectExpr, SortBy, StringLiteral, TagContainExpr,
    },
    error::SyntaxError,
    lexer::{Cursor, Token, tokenize},
    op::{CompareOp, SortOrder},
};

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

    /// Parses the whole stream as one statement.
    fn parse(mut self) -> Result<SearchStmt, SyntaxError> {
        self.cur.expect_keyword("select")?;
        let select = self.parse_select()?;

        self.cur.expect_keyword("from")?;
        let index = IndexRef::new(self.cur.expect_ident()?);

        let query = if self.cur.eat_keyword("where") {
            Some(self.parse_or()?)
        } else {
            None
        };

        let sort_by = if self.cur.eat_keyword("order") {
            self.cur.expect_keyword("by")?;
            Some(self.parse_sort_by()?)
        } else {
            None
        };

        let limit = if self.cur.eat_keyword("limit") {
            Some(self.parse_limit()?)
        } else {
            None
        };

        if !self.cur.at_end() {
            return Err(SyntaxError);
        }

        Ok(SearchStmt {
            select,
            index,
            query,
            limit,
            sort_by,
        })
    }

    /// `*` or a comma-separated field list.
    fn parse_select(&mut self) -> Result<SelectExpr, SyntaxError> {
        if self.cur.eat(&Token::Star) {
            return Ok(SelectExpr { fields: Vec::new() });
        }

        let mut fields = vec![FieldRef::new(self.cur.expect_ident()?)];
        while self.cur.eat(&Token::Comma) {
            fields.push(FieldRef::new(self.cur.expect_ident()?));
        }
        Ok(SelectExpr { fields })
    }

    /// Sort field with an optional direction, defaulting to ascending.
    fn parse_sort_by(&mut self) -> Result<SortBy, SyntaxError> {
        let field = FieldRef::new(self.cur.expect_ident()?);

        let order = if self.cur.eat_keyword("desc") {
            SortOrder::Desc
        } else {
            // the keyword is optional either way
            self.cur.eat_keyword("asc");
            SortOrder::Asc
        };

        Ok(SortBy::new(order, field))
    }

    /// `limit count` or `limit offset, count`.
    fn parse_limit(&mut self) -> Result<Limit, SyntaxError> {
        let first = self.cur.unsigned_number()?;
        if self.cur.eat(&Token::Comma) {
            let count = self.cur.unsigned_number()?;
            Ok(Limit::new(first, count))
        } else {
            Ok(Limit::new(0, first))
        }
    }

    /// or → and ("or" and)*
    fn parse_or(&mut self) -> Result<QueryExpr, SyntaxError> {
        let mut exprs = vec![self.parse_and()?];
        while self.cur.eat_keyword("or") {
            exprs.push(self.parse_and()?);
        }
        Ok(QueryExpr::or(exprs))
    }

    /// and → unary ("and" unary)*
    fn parse_and(&mut self) -> Result<QueryExpr, SyntaxError> {
        let mut exprs = vec![self.parse_unary()?];
        while self.cur.eat_keyword("and") {
            exprs.push(self.parse_unary()?);
        }
        Ok(QueryExpr::and(exprs))
    }

    /// unary → "not" unary | primary
    fn parse_unary(&mut self) -> Result<QueryExpr, SyntaxError> {
        if self.cur.eat_keyword("not") {
            let inner = self.parse_unary()?;
            return Ok(QueryExpr::Not(NotExpr::new(inner)));
        }

        self.parse_primary()
    }

    /// primary → literal | group | comparison | tag test
    fn parse_primary(&mut self) -> Result<QueryExpr, SyntaxError> {
        if self.cur.eat_keyword("true") {
            return Ok(QueryExpr::Bool(BoolLiteral::new(true)));
        }
        if self.cur.eat_keyword("false") {
            return Ok(QueryExpr::Bool(BoolLiteral::new(false)));
        }

        match self.cur.peek() {
            Some(Token::LParen) => {
                self.cur.advance();
                let inner = self.parse_or()?;
                self.cur.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Num(_) | Token::Minus | Token::Plus) => self.parse_flipped_compare(),
            Some(Token::Ident(_)) => self.parse_field_predicate(),
            _ => Err(SyntaxError),
        }
    }

    /// `field cmp number` or `field hastag "string"`.
    fn parse_field_predicate(&mut self) -> Result<QueryExpr, SyntaxError> {
        let field = FieldRef::new(self.cur.expect_ident()?);

        if self.cur.eat_keyword("hastag") {
            let tag = match self.cur.next_cloned() {
                Some(Token::Str(text)) => text,
                _ => return Err(SyntaxError),
            };
            return Ok(QueryExpr::TagContain(TagContainExpr::new(
                field,
                StringLiteral::new(tag),
            )));
        }

        let op = self.parse_compare_op()?;
        let val = self.cur.signed_number()?;
        Ok(QueryExpr::NumericCompare(NumericCompareExpr::new(
            op,
            field,
            NumericLiteral::new(val),
        )))
    }

    /// `number cmp field`, stored field-first with the operator flipped.
    fn parse_flipped_compare(&mut self) -> Result<QueryExpr, SyntaxError> {
        let val = self.cur.signed_number()?;
        let op = self.parse_compare_op()?;
        let field = FieldRef::new(self.cur.expect_ident()?);

        Ok(QueryExpr::NumericCompare(NumericCompareExpr::new(
            op.flip(),
            field,
            NumericLiteral::new(val),
        )))
    }

    /// One comparison symbol token.
    fn parse_compare_op(&mut self) -> Result<CompareOp, SyntaxError> {
        match self.cur.next_cloned() {
            Some(Token::Compare(op)) => Ok(op),
            _ => Err(SyntaxError),
        }
    }
}

/// Parses a whole search statement.
///
/// Success yields a [`SearchStmt`]; any violation, including clauses out of
/// order or trailing input, yields [`SyntaxError`] with no partial tree.
pub fn parse_sql(input: &str) -> Result<SearchStmt, SyntaxError> {
    Parser::new(tokenize(input)?).parse()
}
