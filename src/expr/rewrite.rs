use std::cmp::Ordering;

use datafusion_common::ScalarValue;

use super::{CmpOp, Expr};
use crate::ord;

/// Flatten nested `And`/`Or`, fold boolean constants and collapse single-child groups.
pub fn simplify(expr: Expr) -> Expr {
    match expr {
        Expr::And(parts) => {
            let mut flat = Vec::with_capacity(parts.len());
            for part in parts.into_iter().map(simplify) {
                match part {
                    Expr::True => {}
                    Expr::False => return Expr::False,
                    Expr::And(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            collapse(flat, Expr::True, Expr::And)
        }
        Expr::Or(parts) => {
            let mut flat = Vec::with_capacity(parts.len());
            for part in parts.into_iter().map(simplify) {
                match part {
                    Expr::False => {}
                    Expr::True => return Expr::True,
                    Expr::Or(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            collapse(flat, Expr::False, Expr::Or)
        }
        Expr::Not(inner) => match simplify(*inner) {
            Expr::True => Expr::False,
            Expr::False => Expr::True,
            Expr::Not(double) => *double,
            other => Expr::Not(Box::new(other)),
        },
        other => other,
    }
}

fn collapse(mut parts: Vec<Expr>, empty: Expr, group: fn(Vec<Expr>) -> Expr) -> Expr {
    match parts.len() {
        0 => empty,
        1 => parts.pop().unwrap_or(empty),
        _ => group(parts),
    }
}

/// The finite set of values `column` can take for `expr` to hold, if the predicate
/// implies one.
///
/// Set constraints are only read in positive polarity: a negated `=` does not
/// bound the column.
pub fn candidate_values(expr: &Expr, column: &str) -> Option<Vec<ScalarValue>> {
    candidate_values_inner(expr, column, true)
}

fn candidate_values_inner(expr: &Expr, column: &str, positive: bool) -> Option<Vec<ScalarValue>> {
    match expr {
        Expr::Not(inner) => candidate_values_inner(inner, column, !positive),
        _ if !positive => None,
        Expr::Cmp {
            column: c,
            op: CmpOp::Eq,
            value,
        } if c == column => Some(vec![value.clone()]),
        Expr::InList { column: c, values } if c == column => Some(dedup(values.iter().cloned())),
        Expr::False => Some(Vec::new()),
        Expr::And(parts) => {
            let mut result: Option<Vec<ScalarValue>> = None;
            for part in parts {
                let Some(values) = candidate_values_inner(part, column, positive) else {
                    continue;
                };
                result = Some(match result {
                    None => values,
                    Some(existing) => existing
                        .into_iter()
                        .filter(|v| values.iter().any(|other| same_value(v, other)))
                        .collect(),
                });
            }
            result
        }
        Expr::Or(parts) => {
            let mut union = Vec::new();
            for part in parts {
                union.extend(candidate_values_inner(part, column, positive)?);
            }
            Some(dedup(union))
        }
        _ => None,
    }
}

fn dedup(values: impl IntoIterator<Item = ScalarValue>) -> Vec<ScalarValue> {
    let mut out: Vec<ScalarValue> = Vec::new();
    for value in values {
        if !out.iter().any(|seen| same_value(seen, &value)) {
            out.push(value);
        }
    }
    out
}

/// Equality across literal types, so `"1"` and `1` are the same candidate.
fn same_value(left: &ScalarValue, right: &ScalarValue) -> bool {
    left == right || ord::compare(left, right) == Some(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> ScalarValue {
        ScalarValue::from(v)
    }

    #[test]
    fn simplify_flattens_and_folds() {
        let expr = Expr::and(vec![
            Expr::True,
            Expr::and(vec![Expr::eq("a", "1"), Expr::eq("b", "2")]),
        ]);
        assert_eq!(
            simplify(expr),
            Expr::and(vec![Expr::eq("a", "1"), Expr::eq("b", "2")])
        );

        let expr = Expr::or(vec![Expr::False, Expr::eq("a", "1")]);
        assert_eq!(simplify(expr), Expr::eq("a", "1"));

        let expr = Expr::and(vec![Expr::eq("a", "1"), Expr::not(Expr::True)]);
        assert_eq!(simplify(expr), Expr::False);

        let expr = Expr::not(Expr::not(Expr::eq("a", "1")));
        assert_eq!(simplify(expr), Expr::eq("a", "1"));

        assert_eq!(simplify(Expr::and(vec![])), Expr::True);
    }

    #[test]
    fn candidates_from_equality_and_lists() {
        assert_eq!(
            candidate_values(&Expr::eq("c", "1"), "c"),
            Some(vec![s("1")])
        );
        assert_eq!(candidate_values(&Expr::eq("c", "1"), "d"), None);
        assert_eq!(
            candidate_values(&Expr::in_list("c", ["a", "b", "a"]), "c"),
            Some(vec![s("a"), s("b")])
        );
    }

    #[test]
    fn candidates_intersect_through_and() {
        let expr = Expr::and(vec![
            Expr::in_list("c", ["a", "b", "c"]),
            Expr::eq("d", "x"),
            Expr::in_list("c", ["b", "c", "z"]),
        ]);
        assert_eq!(candidate_values(&expr, "c"), Some(vec![s("b"), s("c")]));
    }

    #[test]
    fn candidates_intersect_across_literal_types() {
        let expr = Expr::and(vec![
            Expr::eq("c", "1"),
            Expr::in_list("c", [ScalarValue::Int64(Some(1)), ScalarValue::Int64(Some(2))]),
        ]);
        assert_eq!(candidate_values(&expr, "c"), Some(vec![s("1")]));

        let either = Expr::or(vec![Expr::eq("c", "2"), Expr::eq("c", 2i64)]);
        assert_eq!(candidate_values(&either, "c"), Some(vec![s("2")]));
    }

    #[test]
    fn candidates_through_or_need_every_branch() {
        let both = Expr::or(vec![Expr::eq("c", "1"), Expr::eq("c", "7")]);
        assert_eq!(candidate_values(&both, "c"), Some(vec![s("1"), s("7")]));

        let partial = Expr::or(vec![Expr::eq("c", "1"), Expr::eq("d", "7")]);
        assert_eq!(candidate_values(&partial, "c"), None);
    }

    #[test]
    fn candidates_respect_negation_polarity() {
        let negated = Expr::not(Expr::eq("c", "1"));
        assert_eq!(candidate_values(&negated, "c"), None);

        let double = Expr::not(Expr::not(Expr::eq("c", "1")));
        assert_eq!(candidate_values(&double, "c"), Some(vec![s("1")]));
    }
}
