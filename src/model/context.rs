//! The shared state every constraint handler mutates: the CP-SAT builder
//! itself, the decision-variable registries, and the objective accumulator
//! (spec §4.3 "Model Builder is the only component that touches the
//! solver's model object").

use std::collections::{HashMap, HashSet};

use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};
use log::trace;

use crate::catalog::CatalogIndex;
use crate::contract::CourseId;
use crate::objective::ObjectiveManager;

/// A 0/1-valued expression produced by [`reify`]: either a compile-time
/// constant (from algebraic short-circuiting, spec §9) or a genuine linear
/// expression bounded in `[0, 1]` by construction.
#[derive(Clone)]
pub enum ReifExpr {
    Const(bool),
    Lin(LinearExpr),
}

impl ReifExpr {
    pub fn to_linear(&self) -> LinearExpr {
        match self {
            ReifExpr::Const(b) => LinearExpr::from(*b as i64),
            ReifExpr::Lin(e) => e.clone(),
        }
    }

    pub fn is_const_false(&self) -> bool {
        matches!(self, ReifExpr::Const(false))
    }

    pub fn is_const_true(&self) -> bool {
        matches!(self, ReifExpr::Const(true))
    }
}

pub struct ModelContext<'a> {
    pub model: CpModelBuilder,
    pub catalog: &'a CatalogIndex,
    pub completed: &'a HashSet<CourseId>,
    /// Index of the last future semester (`semesters.len() - 1`).
    pub last: i64,
    /// `x[c, s]` for non-completed courses, `s` in `0..=last`.
    x: HashMap<(CourseId, i64), BoolVar>,
    /// `z[r]` for nearest-semester sections of non-completed courses.
    z: HashMap<String, BoolVar>,
    merged_memo: HashMap<(CourseId, i64), ReifExpr>,
    /// Per-semester `(min, max)` load bounds, mutated by load handlers and
    /// emitted once after all constraints have been applied.
    pub semester_bounds: Vec<(i64, i64)>,
    pub objective: ObjectiveManager,
}

impl<'a> ModelContext<'a> {
    pub fn new(
        catalog: &'a CatalogIndex,
        completed: &'a HashSet<CourseId>,
        default_k: u32,
        scale: i64,
        tier_order: Option<Vec<String>>,
    ) -> ModelContext<'a> {
        let last = catalog.semesters.len() as i64 - 1;
        ModelContext {
            model: CpModelBuilder::default(),
            catalog,
            completed,
            last,
            x: HashMap::new(),
            z: HashMap::new(),
            merged_memo: HashMap::new(),
            semester_bounds: vec![(0, default_k as i64); (last + 1) as usize],
            objective: ObjectiveManager::new(scale, tier_order),
        }
    }

    pub fn is_completed(&self, course_id: &str) -> bool {
        self.completed.contains(course_id)
    }

    /// Idempotently allocates `x[c,s]` for a non-completed, known course.
    /// Callers must only call this for `s` in `0..=last`.
    pub fn x_var(&mut self, course_id: &str, s: i64) -> Option<BoolVar> {
        if self.is_completed(course_id) || !self.catalog.has_course(course_id) {
            return None;
        }
        if let Some(v) = self.x.get(&(course_id.to_string(), s)) {
            return Some(v.clone());
        }
        let v = self.model.new_bool_var();
        self.x.insert((course_id.to_string(), s), v.clone());
        Some(v)
    }

    pub fn x_var_if_exists(&self, course_id: &str, s: i64) -> Option<BoolVar> {
        self.x.get(&(course_id.to_string(), s)).cloned()
    }

    pub fn all_x_for_semester(&self, s: i64) -> Vec<BoolVar> {
        self.x
            .iter()
            .filter(|((_, sem), _)| *sem == s)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn z_var(&mut self, rid: &str) -> BoolVar {
        if let Some(v) = self.z.get(rid) {
            return v.clone();
        }
        let v = self.model.new_bool_var();
        self.z.insert(rid.to_string(), v.clone());
        v
    }

    pub fn z_var_if_exists(&self, rid: &str) -> Option<BoolVar> {
        self.z.get(rid).cloned()
    }

    pub fn all_z(&self) -> &HashMap<String, BoolVar> {
        &self.z
    }

    pub fn all_x(&self) -> &HashMap<(CourseId, i64), BoolVar> {
        &self.x
    }

    /// `x[c,s]` as a 0/1 linear expression, `Const(false)` for completed or
    /// unknown courses, valid for `s` in `0..=last`.
    pub fn x_expr(&mut self, course_id: &str, s: i64) -> ReifExpr {
        match self.x_var(course_id, s) {
            Some(v) => ReifExpr::Lin(LinearExpr::from(v)),
            None => ReifExpr::Const(false),
        }
    }

    /// `merged_x[c,s]`: true iff course `c` has been taken by the end of
    /// semester `s` (spec §3 "Merged-by-semester variable"), memoized by
    /// `(course, semester)` (spec §9 "Merged-by-semester variables").
    pub fn merged_x(&mut self, course_id: &str, s: i64) -> ReifExpr {
        if !self.catalog.has_course(course_id) {
            return ReifExpr::Const(false);
        }
        if s == -1 {
            return ReifExpr::Const(self.is_completed(course_id));
        }
        if let Some(cached) = self.merged_memo.get(&(course_id.to_string(), s)) {
            return cached.clone();
        }
        let prev = self.merged_x(course_id, s - 1);
        let result = if prev.is_const_true() {
            ReifExpr::Const(true)
        } else {
            let cur = self.x_expr(course_id, s);
            match (&prev, &cur) {
                (ReifExpr::Const(false), ReifExpr::Const(false)) => ReifExpr::Const(false),
                _ => {
                    let w = self.model.new_bool_var();
                    let prev_lin = prev.to_linear();
                    let cur_lin = cur.to_linear();
                    self.model.add_ge(LinearExpr::from(w.clone()), prev_lin.clone());
                    self.model.add_ge(LinearExpr::from(w.clone()), cur_lin.clone());
                    self.model.add_le(LinearExpr::from(w.clone()), prev_lin + cur_lin);
                    ReifExpr::Lin(LinearExpr::from(w))
                }
            }
        };
        trace!("merged_x({course_id}, {s}) computed");
        self.merged_memo.insert((course_id.to_string(), s), result.clone());
        result
    }
}
