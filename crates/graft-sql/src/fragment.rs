//! Decomposed SELECT statements and their combinators.
//!
//! A [`Fragment`] holds the clauses of one `SELECT` statement as
//! independently combinable pieces: the selected-column list, the
//! [`FromTree`], the accumulated `WHERE` predicate, and the auxiliary
//! clauses. Combinators build new fragments out of one or two existing
//! ones; none mutate their inputs, and a fragment is either fully valid
//! or the combinator fails before returning one.
//!
//! Two-fragment combinators are asymmetric on purpose: they are meant to
//! be used left-associatively, accumulating filter state on the left
//! while auxiliary clauses (`ORDER BY`, `LIMIT`, `OFFSET`, `GROUP BY`,
//! `HAVING`, `WITH`) are set once at the end. [`join`], [`nest`] and
//! [`chain`] take those clauses from their *right* input only and
//! discard the left input's values, so set them after combining, not
//! before.
//!
//! [`join`]: Fragment::join
//! [`nest`]: Fragment::nest
//! [`chain`]: Fragment::chain

use crate::from_tree::{FromTree, JoinOp};
use crate::params::fill_placeholders;
use crate::{Literal, Result};

/// The SELECT keyword variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectKeyword {
    #[default]
    Select,
    Distinct,
}

impl SelectKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectKeyword::Select => "SELECT",
            SelectKeyword::Distinct => "SELECT DISTINCT",
        }
    }
}

/// A decomposed SELECT statement.
///
/// Empty clause text means the clause is absent; the renderer emits a
/// keyword only alongside non-empty text, so a fragment never renders a
/// dangling `WHERE` or `ORDER BY`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    /// SELECT or SELECT DISTINCT.
    pub keyword: SelectKeyword,
    /// Selected-column expressions, already quoted/qualified.
    pub columns: Vec<String>,
    /// The FROM clause tree.
    pub from: FromTree,
    /// Accumulated WHERE predicate. Empty means no WHERE clause.
    pub predicate: String,
    /// WITH clause body (`name AS (...)`).
    pub with: String,
    /// GROUP BY expression list.
    pub group_by: String,
    /// HAVING predicate.
    pub having: String,
    /// ORDER BY expression list.
    pub order_by: String,
    /// LIMIT count.
    pub limit: String,
    /// OFFSET count.
    pub offset: String,
    /// How many leading entries of `columns` came from the left operand
    /// of the most recent `join`. This is what lets `nest` and `chain`
    /// recover the left pair's own columns at runtime without tracking
    /// relation types in the type system.
    left_arity: usize,
}

impl Fragment {
    /// The identity fragment: `SELECT` with every other field empty.
    /// Joining it onto either side of another fragment leaves that
    /// fragment's rendering unchanged (modulo the documented
    /// right-side-only auxiliary clauses).
    pub fn empty() -> Self {
        Fragment::default()
    }

    /// An expression-only fragment with no FROM clause, e.g.
    /// `Fragment::raw_expr("now()")` renders as `SELECT now()`.
    pub fn raw_expr(expr: impl Into<String>) -> Self {
        Fragment {
            columns: vec![expr.into()],
            ..Fragment::default()
        }
    }

    /// A fragment selecting the given columns from a single relation.
    pub fn from_relation(
        sql: impl Into<String>,
        canonical: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Fragment {
            columns: columns.into_iter().map(Into::into).collect(),
            from: FromTree::leaf(sql, canonical),
            ..Fragment::default()
        }
    }

    /// Number of leading columns belonging to the left operand of the
    /// most recent join; 0 for fragments that are not join pairs.
    pub fn left_arity(&self) -> usize {
        self.left_arity
    }

    // ------------------------------------------------------------------
    // Single-fragment combinators
    // ------------------------------------------------------------------

    /// Add a predicate, AND-chained with whatever is already there. The
    /// new predicate is wrapped in parentheses so it composes safely.
    /// No-op for empty text.
    pub fn restrict(self, predicate: &str) -> Self {
        if predicate.is_empty() {
            return self;
        }
        self.fold_predicate(&format!("({})", predicate))
    }

    /// Parameterized [`restrict`]: render `values` directly into the
    /// `?` placeholders of `template` before adding it. The value count
    /// must match the placeholder count.
    ///
    /// [`restrict`]: Fragment::restrict
    pub fn restrict_values(self, template: &str, values: &[Literal]) -> Result<Self> {
        let filled = fill_placeholders(template, values)?;
        Ok(self.restrict(&filled))
    }

    /// Append an already-normalized predicate without extra wrapping.
    /// Used when folding one fragment's accumulated WHERE into another.
    fn fold_predicate(mut self, predicate: &str) -> Self {
        if predicate.is_empty() {
            return self;
        }
        if self.predicate.is_empty() {
            self.predicate = predicate.to_string();
        } else {
            self.predicate = format!("{} AND {}", self.predicate, predicate);
        }
        self
    }

    /// Replace the selected-column list, leaving FROM, WHERE and every
    /// other clause untouched.
    ///
    /// There is no check that the relations those columns come from are
    /// actually present in the FROM tree: a verbatim leaf can name
    /// relations the algebra cannot see, so a violation surfaces as a
    /// query-time error from the server rather than here.
    pub fn project(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self.left_arity = 0;
        self
    }

    /// Stronger form of [`project`]: wrap the entire fragment (with its
    /// column list replaced) as a parenthesized subquery aliased to
    /// `alias`, and return a fresh fragment selecting those columns
    /// from the subquery alone.
    ///
    /// Every clause of the input survives inside the subquery, so
    /// nothing can be discarded by later joins. The trade-off is that
    /// columns of other relations from the original FROM tree are no
    /// longer reachable.
    ///
    /// `alias` should be a quoted identifier; `columns` unqualified
    /// quoted column names.
    ///
    /// [`project`]: Fragment::project
    pub fn project_subquery(self, alias: &str, columns: &[String]) -> Self {
        let inner = self.project(columns.to_vec()).render();
        Fragment {
            columns: columns
                .iter()
                .map(|col| format!("{}.{}", alias, col))
                .collect(),
            from: FromTree::leaf(format!("({}) {}", inner, alias), alias),
            ..Fragment::default()
        }
    }

    // ------------------------------------------------------------------
    // Two-fragment combinators
    // ------------------------------------------------------------------

    /// Join two fragments: `left <op> right <on>`.
    ///
    /// Columns are left's followed by right's. If either side has an
    /// empty FROM tree the other side's tree is used as-is (identity
    /// absorption); otherwise a new join node is built. Left's
    /// accumulated predicate is folded in, so both sides' predicates
    /// end up AND-ed. The select keyword and all auxiliary clauses come
    /// from the right input; left's are discarded.
    pub fn join(left: Fragment, op: JoinOp, right: Fragment, on: impl Into<String>) -> Fragment {
        let (from, left_arity) = if left.from.is_none() {
            (right.from, right.left_arity)
        } else if right.from.is_none() {
            (left.from, left.left_arity)
        } else {
            (
                FromTree::join(left.from, op, right.from, on),
                left.columns.len(),
            )
        };
        let mut columns = left.columns;
        columns.extend(right.columns);
        Fragment {
            keyword: right.keyword,
            columns,
            from,
            predicate: right.predicate,
            with: right.with,
            group_by: right.group_by,
            having: right.having,
            order_by: right.order_by,
            limit: right.limit,
            offset: right.offset,
            left_arity,
        }
        .fold_predicate(&left.predicate)
    }

    /// Merge an A-B pair with a B-C pair into a three-way A-B-C join.
    ///
    /// The shared relation is located by canonical name: the right
    /// tree's graft point (its left operand, i.e. B) is searched for in
    /// the left tree, and the entire right tree is substituted there.
    /// Fails if B appears zero times or more than once in the left
    /// tree.
    ///
    /// Columns are A's (the left pair's own columns) followed by the
    /// right pair's full column list; B's columns from the left pair
    /// are dropped since the right pair re-selects B. Predicates from
    /// both sides are AND-ed; auxiliary clauses come from the right.
    pub fn nest(left: Fragment, right: Fragment) -> Result<Fragment> {
        let target = right.from.graft_point().to_string();
        let from = left.from.graft(&target, &right.from)?;
        let mut columns: Vec<String> = left.columns[..left.left_arity].to_vec();
        columns.extend(right.columns);
        Ok(Fragment {
            keyword: right.keyword,
            columns,
            from,
            predicate: right.predicate,
            with: right.with,
            group_by: right.group_by,
            having: right.having,
            order_by: right.order_by,
            limit: right.limit,
            offset: right.offset,
            left_arity: left.left_arity,
        }
        .fold_predicate(&left.predicate))
    }

    /// [`nest`], then drop the shared relation's columns entirely: the
    /// result selects A's columns followed by C's. Use when B is purely
    /// a linking relation.
    ///
    /// [`nest`]: Fragment::nest
    pub fn chain(left: Fragment, right: Fragment) -> Result<Fragment> {
        let a = left.left_arity;
        let b = right.left_arity;
        let mut nested = Fragment::nest(left, right)?;
        nested.columns.drain(a..a + b);
        nested.left_arity = a;
        Ok(nested)
    }

    // ------------------------------------------------------------------
    // Clause setters
    // ------------------------------------------------------------------

    /// Switch to `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.keyword = SelectKeyword::Distinct;
        self
    }

    /// Append a raw selected-column expression.
    pub fn append_column(mut self, expr: impl Into<String>) -> Self {
        self.columns.push(expr.into());
        self
    }

    /// Set the WITH clause body (`name AS (...)`).
    pub fn with(mut self, body: impl Into<String>) -> Self {
        self.with = body.into();
        self
    }

    /// Set the GROUP BY expression list.
    pub fn group_by(mut self, exprs: impl Into<String>) -> Self {
        self.group_by = exprs.into();
        self
    }

    /// Set the HAVING predicate.
    pub fn having(mut self, predicate: impl Into<String>) -> Self {
        self.having = predicate.into();
        self
    }

    /// Set the ORDER BY expression list. Applies to the entire result
    /// of the fragment, so set it after combining: joins take it from
    /// the right input only.
    pub fn order_by(mut self, exprs: impl Into<String>) -> Self {
        self.order_by = exprs.into();
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = n.to_string();
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = n.to_string();
        self
    }

    // ------------------------------------------------------------------
    // Renderer
    // ------------------------------------------------------------------

    /// Flatten the fragment into a single query string: non-empty
    /// clauses in SQL order, one space between clauses, absent clauses
    /// contributing nothing. Rendering is pure; the same fragment
    /// always renders to byte-identical text.
    pub fn render(&self) -> String {
        let mut sql = String::new();
        if !self.with.is_empty() {
            sql.push_str("WITH ");
            sql.push_str(&self.with);
            sql.push(' ');
        }
        sql.push_str(self.keyword.as_str());
        if !self.columns.is_empty() {
            sql.push(' ');
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(&self.from.render_from());
        if !self.predicate.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicate);
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by);
        }
        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&self.having);
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by);
        }
        if !self.limit.is_empty() {
            sql.push_str(" LIMIT ");
            sql.push_str(&self.limit);
        }
        if !self.offset.is_empty() {
            sql.push_str(" OFFSET ");
            sql.push_str(&self.offset);
        }
        sql
    }
}
