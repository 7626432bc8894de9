//! Property tests for the fragment algebra.

use graft_sql::{Fragment, FromTree, JoinOp, Literal};
use proptest::prelude::*;

/// A lowercase identifier suitable for table/column names.
fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// A fragment over a single relation with 1-4 columns and an optional
/// predicate.
fn relation_fragment() -> impl Strategy<Value = Fragment> {
    (
        ident(),
        prop::collection::vec(ident(), 1..4),
        prop::option::of(ident()),
    )
        .prop_map(|(table, cols, pred)| {
            let quoted = format!("\"{}\"", table);
            let frag = Fragment::from_relation(
                quoted.clone(),
                quoted.clone(),
                cols.iter().map(|c| format!("{}.\"{}\"", quoted, c)),
            );
            match pred {
                Some(p) => frag.restrict(&format!("{}.\"{}\" IS NOT NULL", quoted, p)),
                None => frag,
            }
        })
}

proptest! {
    #[test]
    fn render_is_deterministic(frag in relation_fragment()) {
        prop_assert_eq!(frag.render(), frag.clone().render());
    }

    #[test]
    fn empty_is_left_identity(frag in relation_fragment()) {
        let joined = Fragment::join(Fragment::empty(), JoinOp::Join, frag.clone(), "");
        prop_assert_eq!(joined.render(), frag.render());
    }

    #[test]
    fn empty_is_right_identity(frag in relation_fragment()) {
        // Auxiliary clauses are documented as taken from the right
        // input; the generated fragments never set them, so rendering
        // must be preserved exactly.
        let joined = Fragment::join(frag.clone(), JoinOp::Join, Fragment::empty(), "");
        prop_assert_eq!(joined.render(), frag.render());
    }

    #[test]
    fn no_stray_where_without_predicate(table in ident(), cols in prop::collection::vec(ident(), 1..4)) {
        let quoted = format!("\"{}\"", table);
        let frag = Fragment::from_relation(
            quoted.clone(),
            quoted,
            cols.iter().map(|c| format!("\"{}\"", c)),
        );
        prop_assert!(!frag.render().contains("WHERE"));
        prop_assert!(!frag.render().contains("ORDER BY"));
        prop_assert!(!frag.render().contains("LIMIT"));
    }

    #[test]
    fn restrict_preserves_order(a in ident(), b in ident()) {
        let frag = Fragment::raw_expr("1")
            .restrict(&format!("\"{}\" = 1", a))
            .restrict(&format!("\"{}\" = 2", b));
        let sql = frag.render();
        let first = sql.find(&format!("\"{}\" = 1", a)).unwrap();
        let second = sql.find(&format!("\"{}\" = 2", b)).unwrap();
        prop_assert!(first < second);
    }

    #[test]
    fn filled_literals_round_trip_ints(n in any::<i64>()) {
        let frag = Fragment::raw_expr("1")
            .restrict_values("x = ?", &[Literal::Int(n)])
            .unwrap();
        let contains = frag.render().contains(&format!("x = {}", n));
        prop_assert!(contains);
    }

    #[test]
    fn nest_columns_are_left_then_right(
        a in relation_fragment(),
        b in relation_fragment(),
        c in relation_fragment(),
    ) {
        // Distinct canonical names are a precondition of nest.
        prop_assume!(a.from.canonical() != b.from.canonical());
        prop_assume!(b.from.canonical() != c.from.canonical());
        prop_assume!(a.from.canonical() != c.from.canonical());

        let ab = Fragment::join(a.clone(), JoinOp::Join, b.clone(), "ON TRUE");
        let bc = Fragment::join(b.clone(), JoinOp::Join, c.clone(), "ON TRUE");
        let expected: Vec<String> = a
            .columns
            .iter()
            .chain(bc.columns.iter())
            .cloned()
            .collect();
        let nested = Fragment::nest(ab, bc).unwrap();
        prop_assert_eq!(nested.columns, expected);
    }

    #[test]
    fn duplicate_canonical_is_ambiguous(frag in relation_fragment(), other in relation_fragment()) {
        prop_assume!(frag.from.canonical() != other.from.canonical());
        let doubled = FromTree::join(
            frag.from.clone(),
            JoinOp::Join,
            frag.from.clone(),
            "",
        );
        let err = doubled.graft(frag.from.canonical(), &other.from).unwrap_err();
        let is_ambiguous = matches!(err, graft_sql::Error::RelationAmbiguous { count: 2, .. });
        prop_assert!(is_ambiguous);
    }
}
