//! FROM clause trees.
//!
//! A [`FromTree`] describes the relations and joins of a `FROM` clause
//! as a binary tree: leaves hold verbatim relation text (a table
//! reference, an alias, a parenthesized subquery), interior nodes hold
//! a join of two subtrees.
//!
//! Every node carries a *canonical name*, a structural fingerprint that
//! identifies the relation shape it represents. Canonical names exist
//! so that [`FromTree::graft`] can locate the slot shared by two join
//! trees and splice them together; they are never used as data values.

use crate::{Error, Result};

/// A FROM clause as a tree of relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromTree {
    /// A single relation: verbatim SQL plus its canonical name.
    ///
    /// A leaf with empty SQL is the "no relation" tree, the identity
    /// element for join composition.
    Leaf { sql: String, canonical: String },

    /// A binary join of two subtrees.
    Join {
        left: Box<FromTree>,
        op: JoinOp,
        right: Box<FromTree>,
        /// The `ON ...` / `USING (...)` text, keyword included. Empty
        /// for a bare CROSS JOIN.
        on: String,
        /// Always `"<left-canonical> CROSS JOIN <right-canonical>"`,
        /// maintained by construction.
        canonical: String,
    },
}

/// Join operator keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOp {
    Join,
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinOp::Join => "JOIN",
            JoinOp::Inner => "INNER JOIN",
            JoinOp::Left => "LEFT JOIN",
            JoinOp::Right => "RIGHT JOIN",
            JoinOp::Full => "FULL JOIN",
            JoinOp::Cross => "CROSS JOIN",
        }
    }
}

impl Default for FromTree {
    fn default() -> Self {
        FromTree::none()
    }
}

impl FromTree {
    /// The empty tree: no relation at all.
    pub fn none() -> Self {
        FromTree::Leaf {
            sql: String::new(),
            canonical: String::new(),
        }
    }

    /// A single relation leaf.
    pub fn leaf(sql: impl Into<String>, canonical: impl Into<String>) -> Self {
        FromTree::Leaf {
            sql: sql.into(),
            canonical: canonical.into(),
        }
    }

    /// Join two trees. The canonical name of the result is derived from
    /// the operands regardless of the actual join operator.
    pub fn join(left: FromTree, op: JoinOp, right: FromTree, on: impl Into<String>) -> Self {
        let canonical = format!("{} CROSS JOIN {}", left.canonical(), right.canonical());
        FromTree::Join {
            left: Box::new(left),
            op,
            right: Box::new(right),
            on: on.into(),
            canonical,
        }
    }

    /// True for the empty tree.
    pub fn is_none(&self) -> bool {
        matches!(self, FromTree::Leaf { sql, .. } if sql.is_empty())
    }

    /// The canonical name of this node.
    pub fn canonical(&self) -> &str {
        match self {
            FromTree::Leaf { canonical, .. } => canonical,
            FromTree::Join { canonical, .. } => canonical,
        }
    }

    /// The canonical name of the left operand: a join's left subtree,
    /// or the node itself for a leaf. This is the name [`graft`] targets
    /// when nesting an A-B pair with a B-C pair.
    ///
    /// [`graft`]: FromTree::graft
    pub fn graft_point(&self) -> &str {
        match self {
            FromTree::Leaf { canonical, .. } => canonical,
            FromTree::Join { left, .. } => left.canonical(),
        }
    }

    /// Render the tree without the leading `FROM` keyword.
    pub fn render_inner(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            FromTree::Leaf { sql, .. } => out.push_str(sql),
            FromTree::Join {
                left,
                op,
                right,
                on,
                ..
            } => {
                out.push('(');
                left.render_into(out);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                right.render_into(out);
                if !on.is_empty() {
                    out.push(' ');
                    out.push_str(on);
                }
                out.push(')');
            }
        }
    }

    /// Render the full clause, `" FROM ..."` with a leading space, or
    /// the empty string for the empty tree. Expression-only fragments
    /// (`SELECT now()`) get no FROM clause at all.
    pub fn render_from(&self) -> String {
        if self.is_none() {
            String::new()
        } else {
            format!(" FROM {}", self.render_inner())
        }
    }

    /// Count the nodes whose canonical name equals `target`, across the
    /// whole tree. Join nodes count too: a subtree can be a graft
    /// target just like a leaf.
    fn match_count(&self, target: &str) -> usize {
        let own = (self.canonical() == target) as usize;
        match self {
            FromTree::Leaf { .. } => own,
            FromTree::Join { left, right, .. } => {
                own + left.match_count(target) + right.match_count(target)
            }
        }
    }

    /// Structural search-and-replace: find the unique node whose
    /// canonical name equals `target` and substitute `replacement` in
    /// its place.
    ///
    /// The whole tree is scanned before deciding: zero matches is
    /// [`Error::RelationNotFound`], more than one is
    /// [`Error::RelationAmbiguous`]. Canonical names identify relation
    /// *types*, so two occurrences of the same relation in one tree is
    /// a composition error the caller must resolve with distinct
    /// aliases, not something to silently pick through.
    pub fn graft(&self, target: &str, replacement: &FromTree) -> Result<FromTree> {
        match self.match_count(target) {
            0 => Err(Error::RelationNotFound(target.to_string())),
            1 => Ok(self.replace(target, replacement)),
            count => Err(Error::RelationAmbiguous {
                name: target.to_string(),
                count,
            }),
        }
    }

    /// Substitute `replacement` at the first node matching `target`.
    /// Only called once uniqueness has been established.
    fn replace(&self, target: &str, replacement: &FromTree) -> FromTree {
        if self.canonical() == target {
            return replacement.clone();
        }
        match self {
            FromTree::Leaf { .. } => self.clone(),
            FromTree::Join {
                left, op, right, on, ..
            } => FromTree::join(
                left.replace(target, replacement),
                *op,
                right.replace(target, replacement),
                on.clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> FromTree {
        FromTree::leaf("\"users\"", "\"users\"")
    }

    fn orders() -> FromTree {
        FromTree::leaf("\"orders\"", "\"orders\"")
    }

    fn line_items() -> FromTree {
        FromTree::leaf("\"line_items\"", "\"line_items\"")
    }

    #[test]
    fn test_empty_tree() {
        assert!(FromTree::none().is_none());
        assert!(!users().is_none());
        assert_eq!(FromTree::none().render_from(), "");
    }

    #[test]
    fn test_render_leaf() {
        assert_eq!(users().render_from(), " FROM \"users\"");
    }

    #[test]
    fn test_render_join() {
        let tree = FromTree::join(
            users(),
            JoinOp::Join,
            orders(),
            "ON users.id = orders.user_id",
        );
        assert_eq!(
            tree.render_from(),
            " FROM (\"users\" JOIN \"orders\" ON users.id = orders.user_id)"
        );
    }

    #[test]
    fn test_render_join_without_on() {
        let tree = FromTree::join(users(), JoinOp::Cross, orders(), "");
        assert_eq!(
            tree.render_inner(),
            "(\"users\" CROSS JOIN \"orders\")"
        );
    }

    #[test]
    fn test_join_canonical_name() {
        let tree = FromTree::join(users(), JoinOp::Left, orders(), "ON TRUE");
        assert_eq!(tree.canonical(), "\"users\" CROSS JOIN \"orders\"");
    }

    #[test]
    fn test_graft_replaces_unique_leaf() {
        let left = FromTree::join(
            users(),
            JoinOp::Join,
            orders(),
            "ON users.id = orders.user_id",
        );
        let right = FromTree::join(
            orders(),
            JoinOp::Join,
            line_items(),
            "ON orders.id = line_items.order_id",
        );
        let merged = left.graft("\"orders\"", &right).unwrap();
        assert_eq!(
            merged.render_inner(),
            "(\"users\" JOIN (\"orders\" JOIN \"line_items\" ON orders.id = line_items.order_id) ON users.id = orders.user_id)"
        );
        // Canonical name of the rebuilt parent reflects the new child.
        assert_eq!(
            merged.canonical(),
            "\"users\" CROSS JOIN \"orders\" CROSS JOIN \"line_items\""
        );
    }

    #[test]
    fn test_graft_not_found() {
        let tree = FromTree::join(users(), JoinOp::Join, orders(), "");
        let err = tree.graft("\"products\"", &line_items()).unwrap_err();
        assert_eq!(err, Error::RelationNotFound("\"products\"".into()));
    }

    #[test]
    fn test_graft_ambiguous() {
        // Same relation type on both sides of a join: a self-join built
        // without distinct aliases.
        let tree = FromTree::join(users(), JoinOp::Join, users(), "");
        let err = tree.graft("\"users\"", &orders()).unwrap_err();
        assert_eq!(
            err,
            Error::RelationAmbiguous {
                name: "\"users\"".into(),
                count: 2,
            }
        );
    }

    #[test]
    fn test_graft_counts_across_whole_tree() {
        // One match on the left, one deep on the right: the search must
        // not stop at the first.
        let deep = FromTree::join(orders(), JoinOp::Join, users(), "");
        let tree = FromTree::join(users(), JoinOp::Join, deep, "");
        let err = tree.graft("\"users\"", &line_items()).unwrap_err();
        assert!(matches!(err, Error::RelationAmbiguous { count: 2, .. }));
    }

    #[test]
    fn test_graft_can_target_join_node() {
        let pair = FromTree::join(users(), JoinOp::Join, orders(), "");
        let tree = FromTree::join(pair.clone(), JoinOp::Left, line_items(), "ON TRUE");
        let merged = tree
            .graft("\"users\" CROSS JOIN \"orders\"", &orders())
            .unwrap();
        assert_eq!(
            merged.render_inner(),
            "(\"orders\" LEFT JOIN \"line_items\" ON TRUE)"
        );
    }

    #[test]
    fn test_graft_point() {
        assert_eq!(orders().graft_point(), "\"orders\"");
        let pair = FromTree::join(orders(), JoinOp::Join, line_items(), "");
        assert_eq!(pair.graft_point(), "\"orders\"");
    }
}
