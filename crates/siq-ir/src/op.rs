//! Comparison operator algebra and sort order.
//!
//! The operator set is closed: every mapping below is a `match` with no
//! wildcard arm, so adding a variant without updating all three tables is a
//! compile error rather than a silent hole.

/// The six relational operators a numeric predicate can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Every operator, in symbol-table order.
    pub const ALL: [Self; 6] = [Self::Eq, Self::Ne, Self::Lt, Self::Le, Self::Gt, Self::Ge];

    /// The textual symbol used in query text and canonical renderings.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Looks up an operator from its textual symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// The logical complement: `not (x < v)` is `x >= v`.
    ///
    /// An involution; negating twice returns the original operator.
    pub const fn negative(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
        }
    }

    /// The operand swap: `v < x` is `x > v`.
    ///
    /// Also an involution; equality and inequality are their own flips.
    pub const fn flip(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
        }
    }
}

/// Result ordering for a `sortby` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending (the default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// The keyword used in canonical renderings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_distinct_and_total() {
        let symbols: Vec<&str> = CompareOp::ALL.iter().map(|op| op.symbol()).collect();
        assert_eq!(symbols, ["=", "!=", "<", "<=", ">", ">="]);

        for (i, a) in symbols.iter().enumerate() {
            for b in &symbols[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn symbol_round_trip() {
        for op in CompareOp::ALL {
            assert_eq!(CompareOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(CompareOp::from_symbol("=="), None);
        assert_eq!(CompareOp::from_symbol(""), None);
    }

    #[test]
    fn negative_is_involution() {
        for op in CompareOp::ALL {
            assert_eq!(op.negative().negative(), op);
            assert_ne!(op.negative(), op);
        }
    }

    #[test]
    fn negative_pairs() {
        assert_eq!(CompareOp::Eq.negative(), CompareOp::Ne);
        assert_eq!(CompareOp::Lt.negative(), CompareOp::Ge);
        assert_eq!(CompareOp::Le.negative(), CompareOp::Gt);
    }

    #[test]
    fn flip_is_involution() {
        for op in CompareOp::ALL {
            assert_eq!(op.flip().flip(), op);
        }
    }

    #[test]
    fn flip_pairs() {
        assert_eq!(CompareOp::Eq.flip(), CompareOp::Eq);
        assert_eq!(CompareOp::Ne.flip(), CompareOp::Ne);
        assert_eq!(CompareOp::Lt.flip(), CompareOp::Gt);
        assert_eq!(CompareOp::Le.flip(), CompareOp::Ge);
    }

    #[test]
    fn sort_order_defaults_ascending() {
        assert_eq!(SortOrder::default(), SortOrder::Asc);
        assert_eq!(SortOrder::Asc.as_str(), "asc");
        assert_eq!(SortOrder::Desc.as_str(), "desc");
    }
}
