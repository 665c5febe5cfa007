//! Translates [`ConstraintTree`] nodes into [`ReifExpr`]s (spec §4.2
//! "Reification"), with algebraic short-circuiting so a provably-false
//! `And` child or provably-true `Or` child never grows the model (spec §9).

use cp_sat::builder::LinearExpr;

use crate::constraint::ConstraintTree;
use crate::model::context::{ModelContext, ReifExpr};

fn clamp(value: i64, lo: i64, hi: i64) -> i64 {
    value.max(lo).min(hi)
}

pub fn reify(ctx: &mut ModelContext, tree: &ConstraintTree, semester_index: i64) -> ReifExpr {
    match tree {
        ConstraintTree::When { offset, child } => {
            let target = clamp(semester_index + offset, -1, ctx.last);
            reify(ctx, child, target)
        }
        ConstraintTree::Not { child } => not(reify(ctx, child, semester_index)),
        ConstraintTree::And { children } => {
            let parts: Vec<ReifExpr> = children.iter().map(|c| reify(ctx, c, semester_index)).collect();
            and(ctx, parts)
        }
        ConstraintTree::Or { children } => {
            let parts: Vec<ReifExpr> = children.iter().map(|c| reify(ctx, c, semester_index)).collect();
            or(ctx, parts)
        }
        ConstraintTree::Course { course_id } => ctx.merged_x(course_id, semester_index),
        ConstraintTree::Group { group_id, count } => {
            let members = ctx.catalog.group(group_id);
            at_least_k(ctx, &members, semester_index, *count)
        }
        ConstraintTree::Range {
            school,
            department,
            min_num,
            max_num,
            count,
        } => {
            let members = ctx.catalog.courses_in_range(school, department, *min_num, *max_num);
            let members: std::collections::HashSet<_> = members.into_iter().collect();
            at_least_k(ctx, &members, semester_index, *count)
        }
        ConstraintTree::Attribute { key, .. } => {
            log::debug!("attribute predicate '{key}' is reserved and not backed by input data; treating as satisfied");
            ReifExpr::Const(true)
        }
    }
}

pub fn not(expr: ReifExpr) -> ReifExpr {
    match expr {
        ReifExpr::Const(b) => ReifExpr::Const(!b),
        ReifExpr::Lin(e) => ReifExpr::Lin(LinearExpr::from(1) - e),
    }
}

pub fn and(ctx: &mut ModelContext, parts: Vec<ReifExpr>) -> ReifExpr {
    if parts.iter().any(ReifExpr::is_const_false) {
        return ReifExpr::Const(false);
    }
    let lins: Vec<LinearExpr> = parts
        .into_iter()
        .filter(|p| !p.is_const_true())
        .map(|p| p.to_linear())
        .collect();
    if lins.is_empty() {
        return ReifExpr::Const(true);
    }
    if lins.len() == 1 {
        return ReifExpr::Lin(lins.into_iter().next().unwrap());
    }
    let n = lins.len() as i64;
    let v = ctx.model.new_bool_var();
    let mut sum = LinearExpr::from(0);
    for lin in &lins {
        ctx.model.add_le(LinearExpr::from(v.clone()), lin.clone());
        sum = sum + lin.clone();
    }
    ctx.model.add_ge(LinearExpr::from(v.clone()), sum - LinearExpr::from(n - 1));
    ReifExpr::Lin(LinearExpr::from(v))
}

pub fn or(ctx: &mut ModelContext, parts: Vec<ReifExpr>) -> ReifExpr {
    if parts.iter().any(ReifExpr::is_const_true) {
        return ReifExpr::Const(true);
    }
    let lins: Vec<LinearExpr> = parts
        .into_iter()
        .filter(|p| !p.is_const_false())
        .map(|p| p.to_linear())
        .collect();
    if lins.is_empty() {
        return ReifExpr::Const(false);
    }
    if lins.len() == 1 {
        return ReifExpr::Lin(lins.into_iter().next().unwrap());
    }
    let v = ctx.model.new_bool_var();
    let mut sum = LinearExpr::from(0);
    for lin in &lins {
        ctx.model.add_ge(LinearExpr::from(v.clone()), lin.clone());
        sum = sum + lin.clone();
    }
    ctx.model.add_le(LinearExpr::from(v.clone()), sum);
    ReifExpr::Lin(LinearExpr::from(v))
}

/// `v <=> (sum_{c in members} merged_x[c,s] >= k)`, sandwiched with a
/// big-M of `|members|`, generalized from an exact-count check to an
/// arbitrary threshold (spec §4.2 "Group"/"Range").
pub fn at_least_k(
    ctx: &mut ModelContext,
    members: &std::collections::HashSet<String>,
    semester_index: i64,
    k: u32,
) -> ReifExpr {
    let n = members.len() as i64;
    if k == 0 {
        return ReifExpr::Const(true);
    }
    if n == 0 {
        return ReifExpr::Const(false);
    }
    let sum: LinearExpr = members
        .iter()
        .map(|c| ctx.merged_x(c, semester_index).to_linear())
        .fold(LinearExpr::from(0), |acc, e| acc + e);
    let v = ctx.model.new_bool_var();
    let m_v: LinearExpr = vec![(n, v.clone())].into_iter().collect();
    // sum <= (k-1) + n*v
    ctx.model.add_le(sum.clone(), LinearExpr::from(k as i64 - 1) + m_v.clone());
    // sum >= k - n*(1-v) = (k-n) + n*v
    ctx.model.add_ge(sum, LinearExpr::from(k as i64 - n) + m_v);
    ReifExpr::Lin(LinearExpr::from(v))
}

/// Same as [`at_least_k`] but taking an already-built sum expression and
/// term count directly, for callers (hub targets, `require_group_counts`)
/// that sum over `x` rather than `merged_x`, or over a union of groups.
pub fn at_least_k_over_sum(ctx: &mut ModelContext, sum: LinearExpr, n_terms: i64, k: i64) -> ReifExpr {
    if k <= 0 {
        return ReifExpr::Const(true);
    }
    if n_terms == 0 {
        return ReifExpr::Const(false);
    }
    let v = ctx.model.new_bool_var();
    let m_v: LinearExpr = vec![(n_terms, v.clone())].into_iter().collect();
    ctx.model.add_le(sum.clone(), LinearExpr::from(k - 1) + m_v.clone());
    ctx.model.add_ge(sum, LinearExpr::from(k - n_terms) + m_v);
    ReifExpr::Lin(LinearExpr::from(v))
}
