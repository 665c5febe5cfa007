//! Accumulates weighted objective terms in named tiers, scales float weights
//! to integer coefficients, and produces either a single big-M composite
//! objective or drives a staged lexicographic re-solve (spec §4.4).

use std::collections::HashMap;

use cp_sat::builder::{BoolVar, LinearExpr};
use log::debug;

use crate::error::{Result, SolverError};

/// Converts a fractional weight into an integer coefficient, centralized so
/// no float ever reaches the solver model (spec §9 "Float weights ->
/// integer coefficients").
#[derive(Debug, Clone, Copy)]
pub struct Scale(pub i64);

impl Scale {
    pub fn apply(self, weight: f64) -> Result<i64> {
        let scaled = weight * self.0 as f64;
        if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 / 2.0 {
            return Err(SolverError::invalid(format!(
                "objective weight overflows after scaling: {weight} * {}",
                self.0
            )));
        }
        Ok(scaled.round() as i64)
    }
}

/// Default tier priority order when a request supplies none. `bookmarks`
/// outranks `comfort`, matching the source's explicit-tier default (spec §9).
pub const DEFAULT_TIER_ORDER: &[&str] = &["bookmarks", "degree_progress", "comfort", "custom"];

#[derive(Default)]
pub struct ObjectiveManager {
    scale: i64,
    terms: HashMap<String, Vec<(BoolVar, i64)>>,
    tier_order: Vec<String>,
}

impl ObjectiveManager {
    pub fn new(scale: i64, tier_order: Option<Vec<String>>) -> ObjectiveManager {
        ObjectiveManager {
            scale,
            terms: HashMap::new(),
            tier_order: tier_order.unwrap_or_else(|| DEFAULT_TIER_ORDER.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn scale(&self) -> i64 {
        self.scale
    }

    /// Record a weighted term in `tier`. Zero coefficients (after rounding)
    /// are dropped so they never inflate a tier's upper bound.
    pub fn add_term(&mut self, tier: &str, var: BoolVar, weight: f64) -> Result<()> {
        let coeff = Scale(self.scale).apply(weight)?;
        if coeff == 0 {
            return Ok(());
        }
        self.terms.entry(tier.to_string()).or_default().push((var, coeff));
        self.ensure_tier_known(tier);
        Ok(())
    }

    fn ensure_tier_known(&mut self, tier: &str) {
        if !self.tier_order.iter().any(|t| t == tier) {
            debug!("objective tier '{tier}' has terms but is not in the priority order; appending it last");
            self.tier_order.push(tier.to_string());
        }
    }

    pub fn set_tier_order(&mut self, tiers: Vec<String>) {
        if !tiers.is_empty() {
            self.tier_order = tiers;
        }
    }

    pub fn tier_order(&self) -> &[String] {
        &self.tier_order
    }

    pub fn tier_terms(&self, tier: &str) -> &[(BoolVar, i64)] {
        self.terms.get(tier).map(Vec::as_slice).unwrap_or(&[])
    }

    fn tier_expr(&self, tier: &str) -> LinearExpr {
        self.tier_terms(tier).iter().map(|(v, c)| (*c, v.clone())).collect()
    }

    fn tier_upper_bound(&self, tier: &str) -> i64 {
        self.tier_terms(tier).iter().map(|(_, c)| c.abs()).sum()
    }

    /// Known, present tiers only, highest priority first.
    fn active_tiers(&self) -> Vec<&str> {
        self.tier_order
            .iter()
            .filter(|t| !self.tier_terms(t).is_empty())
            .map(String::as_str)
            .collect()
    }

    pub fn has_terms(&self) -> bool {
        self.terms.values().any(|v| !v.is_empty())
    }

    /// Single-pass big-M composition: `W[t] = 1 + sum of UB[t']` over strictly
    /// lower-priority tiers `t'`, so maximizing the weighted sum respects the
    /// tier order regardless of how the individual terms net out (spec
    /// §4.4 mode 1).
    pub fn big_m_objective(&self) -> LinearExpr {
        let tiers = self.active_tiers();
        let mut running_ub = 0i64;
        let mut weighted_terms: Vec<(i64, BoolVar)> = Vec::new();
        for tier in tiers.iter().rev() {
            let tier_weight = 1 + running_ub;
            for (var, coeff) in self.tier_terms(tier) {
                weighted_terms.push((coeff * tier_weight, var.clone()));
            }
            running_ub += self.tier_upper_bound(tier);
        }
        weighted_terms.into_iter().collect()
    }

    /// Tiers in priority order together with their weighted expression, for
    /// the staged-resolve driver (spec §4.4 mode 2).
    pub fn staged_plan(&self) -> Vec<(String, LinearExpr)> {
        self.active_tiers()
            .into_iter()
            .map(|t| (t.to_string(), self.tier_expr(t)))
            .collect()
    }

    /// Evaluate every tier (not just the active ones, so callers always see
    /// a complete score map) against a solved model.
    pub fn tier_values(&self, eval: impl Fn(&BoolVar) -> bool) -> HashMap<String, i64> {
        self.terms
            .iter()
            .map(|(tier, terms)| {
                let total: i64 = terms.iter().filter(|(v, _)| eval(v)).map(|(_, c)| c).sum();
                (tier.clone(), total)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_rounds_to_nearest_integer() {
        let scale = Scale(1000);
        assert_eq!(scale.apply(1.0).unwrap(), 1000);
        assert_eq!(scale.apply(-0.5).unwrap(), -500);
        assert_eq!(scale.apply(0.0004).unwrap(), 0);
    }

    #[test]
    fn doubling_scale_doubles_coefficients() {
        assert_eq!(Scale(2000).apply(1.0).unwrap(), 2 * Scale(1000).apply(1.0).unwrap());
    }
}
