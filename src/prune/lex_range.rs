//! Lexicographic composite ranges.
//!
//! The walk keeps two flags: `at_minimum` once a column sits exactly on its lower
//! bound and `at_maximum` once one sits exactly on its upper bound. A column that is
//! strictly inside its range (or inside on the side not yet pinned) decides `True`.

use std::cmp::Ordering;

use super::context::PartitionContext;
use crate::expr::{ColumnRange, RangeOrdering, TriState};

pub(super) fn eval_lex_range(ranges: &[ColumnRange], ctx: &PartitionContext<'_>) -> TriState {
    let mut at_minimum = false;
    let mut at_maximum = false;
    for range in ranges {
        let Some(value) = ctx.value(range.name()) else {
            return TriState::Unknown;
        };
        if range.ordering() == RangeOrdering::Wildcard {
            continue;
        }
        let Some((left, right)) = range.compare(value) else {
            return TriState::Unknown;
        };
        if (left == Ordering::Less || at_maximum) && (right == Ordering::Less || at_minimum) {
            return TriState::True;
        }
        if left == Ordering::Equal {
            at_minimum = true;
            continue;
        }
        if right == Ordering::Equal {
            at_maximum = true;
            continue;
        }
        return TriState::False;
    }
    TriState::from(!at_maximum)
}

#[cfg(test)]
mod tests {
    use datafusion_common::ScalarValue;

    use super::*;
    use crate::partition::PartitionValue;

    fn ranges() -> Vec<ColumnRange> {
        vec![
            ColumnRange::natural("c1", "b", "d").unwrap(),
            ColumnRange::wildcard("c2"),
            ColumnRange::natural("c3", "c", "d").unwrap(),
        ]
    }

    fn eval(path: &[(&str, &str)]) -> TriState {
        let columns: Vec<_> = path
            .iter()
            .map(|(k, v)| PartitionValue::new(*k, ScalarValue::from(*v)))
            .collect();
        eval_lex_range(&ranges(), &PartitionContext::new(&columns))
    }

    #[test]
    fn full_assignments() {
        assert_eq!(eval(&[("c1", "b"), ("c2", "a"), ("c3", "a")]), TriState::False);
        assert_eq!(eval(&[("c1", "a"), ("c2", "a"), ("c3", "c")]), TriState::False);
        assert_eq!(eval(&[("c1", "c"), ("c2", "x"), ("c3", "d")]), TriState::True);
        assert_eq!(eval(&[("c1", "b"), ("c2", "4"), ("c3", "c")]), TriState::True);
        assert_eq!(eval(&[("c1", "d"), ("c2", "z"), ("c3", "c")]), TriState::True);
        assert_eq!(eval(&[("c1", "d"), ("c2", "w"), ("c3", "d")]), TriState::False);
        assert_eq!(eval(&[("c1", "e"), ("c2", "w"), ("c3", "c")]), TriState::False);
    }

    #[test]
    fn partial_assignments() {
        assert_eq!(eval(&[]), TriState::Unknown);
        assert_eq!(eval(&[("c1", "c")]), TriState::True);
        assert_eq!(eval(&[("c1", "a")]), TriState::False);
        assert_eq!(eval(&[("c1", "b"), ("c2", "q")]), TriState::Unknown);
    }

    #[test]
    fn numeric_ordering() {
        let ranges = vec![ColumnRange::numeric("c1", 3, 27).unwrap()];
        let check = |raw: &str| {
            let columns = [PartitionValue::new("c1", ScalarValue::from(raw))];
            eval_lex_range(&ranges, &PartitionContext::new(&columns))
        };
        assert_eq!(check("1"), TriState::False);
        assert_eq!(check("3"), TriState::True);
        assert_eq!(check("9"), TriState::True);
        assert_eq!(check("21"), TriState::True);
        assert_eq!(check("27"), TriState::False);
        assert_eq!(check("101"), TriState::False);
        assert_eq!(check("x"), TriState::Unknown);
    }

    #[test]
    fn numeric_bounds_beyond_float_precision() {
        let start = 9_007_199_254_740_993i64;
        let ranges = vec![ColumnRange::numeric("id", start, start + 2).unwrap()];
        let check = |id: i64| {
            let columns = [PartitionValue::new("id", ScalarValue::Int64(Some(id)))];
            eval_lex_range(&ranges, &PartitionContext::new(&columns))
        };
        assert_eq!(check(start - 1), TriState::False);
        assert_eq!(check(start), TriState::True);
        assert_eq!(check(start + 2), TriState::False);
    }
}
