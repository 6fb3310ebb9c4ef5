//! Equality constraints and the deferred solver.
//!
//! The driver in [`crate::infer`] unifies at every application; the one
//! here records the same equations as [`Constraint`]s and discharges them
//! through [`solve`] afterwards. Both express the same typing rules and
//! agree on every program; the difference is only when unification runs.

use std::fmt;

use crate::env::TypeEnv;
use crate::error::TypeError;
use crate::expr::{ExprForm, Expression};
use crate::infer::close_over;
use crate::scheme::Scheme;
use crate::subst::Subst;
use crate::ty::{Ty, TyVarSet};
use crate::unify::InferCtx;

/// An equality constraint: the two sides must unify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub left: Ty,
    pub right: Ty,
}

impl Constraint {
    pub fn new(left: Ty, right: Ty) -> Self {
        Constraint { left, right }
    }

    /// Apply a substitution to both sides.
    pub fn apply(&self, subst: &Subst) -> Constraint {
        Constraint { left: subst.apply(&self.left), right: subst.apply(&self.right) }
    }

    /// The free variables of both sides.
    pub fn free_ty_vars(&self) -> TyVarSet {
        self.left.free_ty_vars().union(&self.right.free_ty_vars())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.left, self.right)
    }
}

/// An ordered list of constraints.
#[derive(Clone, Debug, Default)]
pub struct Constraints(Vec<Constraint>);

impl Constraints {
    pub fn new() -> Self {
        Constraints(Vec::new())
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.0.push(constraint);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.0.iter()
    }

    /// Apply a substitution to every constraint.
    pub fn apply(&self, subst: &Subst) -> Constraints {
        Constraints(self.0.iter().map(|c| c.apply(subst)).collect())
    }

    /// The union of every constraint's free variables.
    pub fn free_ty_vars(&self) -> TyVarSet {
        let mut out = TyVarSet::new();
        for constraint in &self.0 {
            out = out.union(&constraint.free_ty_vars());
        }
        out
    }
}

impl FromIterator<Constraint> for Constraints {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Constraints(iter.into_iter().collect())
    }
}

impl IntoIterator for Constraints {
    type Item = Constraint;
    type IntoIter = std::vec::IntoIter<Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Solve a constraint list incrementally.
///
/// The head constraint unifies to a step substitution, the step rewrites
/// the remaining list, and every step composes into the accumulator, so
/// later constraints see earlier bindings and the final substitution is
/// transitively consistent. An empty list yields the identity
/// substitution; the first failure aborts the whole solve.
pub fn solve(ctx: &mut InferCtx, constraints: &Constraints) -> Result<Subst, TypeError> {
    let mut pending = constraints.0.clone();
    let mut acc = Subst::new();
    while !pending.is_empty() {
        let head = pending.remove(0);
        let step = ctx.unify_delta(head.left, head.right)?;
        for constraint in &mut pending {
            *constraint = constraint.apply(&step);
        }
        acc = acc.compose(&step);
    }
    Ok(acc)
}

/// Infer by collecting constraints and solving afterwards.
///
/// Walks the expression recording one constraint per application and per
/// recursive binding, solves at generalization points and once at the
/// end, applies the accumulated substitution to the inferred type, and
/// closes over. Agrees with [`crate::infer::infer`] on every program.
pub fn solve_infer(env: &TypeEnv, expr: &dyn Expression) -> Result<Scheme, TypeError> {
    let mut ctx = InferCtx::new();
    if let Some(max) = env.max_var() {
        ctx.register_var(max);
    }
    let mut pending = Constraints::new();
    let mut acc = Subst::new();
    let ty = collect(&mut ctx, env, expr, &mut pending, &mut acc)?;

    let step = solve(&mut ctx, &pending)?;
    let acc = acc.compose(&step);
    let ty = acc.apply(&ty);
    Ok(close_over(&mut ctx, ty))
}

/// The collecting twin of the eager driver's rule dispatch.
///
/// Apply and letrec record constraints instead of unifying on the spot.
/// Generalization has to see every binding made so far, so at each let
/// boundary the pending list drains through [`solve`] (composing into
/// `acc`) before the scheme is built.
fn collect(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    expr: &dyn Expression,
    pending: &mut Constraints,
    acc: &mut Subst,
) -> Result<Ty, TypeError> {
    match expr.form() {
        ExprForm::Literal { name, ty } => match ty {
            Some(ty) => Ok(ty),
            None => env.type_of(ctx, name),
        },
        ExprForm::Var { name } => env.type_of(ctx, name),
        ExprForm::Lambda { param, body } => {
            let tv = ctx.fresh_key();
            let mut scope = env.clone();
            scope.insert(param, Scheme::mono(Ty::Var(tv)));
            scope.add_concrete_var(tv);
            let body_ty = collect(ctx, &scope, body, pending, acc)?;
            Ok(Ty::arrow(Ty::Var(tv), body_ty))
        }
        ExprForm::Apply { func, arg } => {
            let fn_ty = collect(ctx, env, func, pending, acc)?;
            let arg_ty = collect(ctx, env, arg, pending, acc)?;
            let ret = ctx.fresh_var();
            pending.push(Constraint::new(Ty::arrow(arg_ty, ret.clone()), fn_ty));
            Ok(ret)
        }
        ExprForm::Let { name, def, body } => {
            let def_ty = collect(ctx, env, def, pending, acc)?;
            let step = solve(ctx, &std::mem::take(pending))?;
            *acc = acc.compose(&step);

            let scheme = ctx.generalize(env, def_ty);
            let mut scope = env.clone();
            scope.insert(name, scheme);
            collect(ctx, &scope, body, pending, acc)
        }
        ExprForm::LetRec { name, def, body } => {
            let tv = ctx.fresh_key();
            let mut scope = env.clone();
            scope.insert(name, Scheme::mono(Ty::Var(tv)));
            scope.add_concrete_var(tv);
            let def_ty = collect(ctx, &scope, def, pending, acc)?;
            pending.push(Constraint::new(Ty::Var(tv), def_ty));

            let step = solve(ctx, &std::mem::take(pending))?;
            *acc = acc.compose(&step);

            let resolved = ctx.resolve(Ty::Var(tv));
            let scheme = ctx.generalize(env, resolved);
            let mut scope = env.clone();
            scope.insert(name, scheme);
            collect(ctx, &scope, body, pending, acc)
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
