//! The eager inference driver.
//!
//! Walks an expression tree and applies one typing rule per node, unifying
//! as it goes. The rules, with Γ the environment:
//!
//! ```text
//!  x : σ ∈ Γ    τ = inst(σ)            Γ, x : τ ⊢ e : τ'   τ fresh
//! ─────────────────────── [Var]       ───────────────────────────── [Abs]
//!       Γ ⊢ x : τ                         Γ ⊢ λx. e : τ → τ'
//!
//!  Γ ⊢ f : τf    Γ ⊢ e : τe            Γ ⊢ e0 : τ    σ = gen(Γ, τ)
//!  unify(τe → ρ, τf)   ρ fresh         Γ, x : σ ⊢ e1 : τ'
//! ─────────────────────── [App]       ───────────────────────────── [Let]
//!       Γ ⊢ f e : ρ                    Γ ⊢ let x = e0 in e1 : τ'
//! ```
//!
//! `letrec` is `let` with a twist: the definition is checked under a fresh
//! monomorphic placeholder for the binding itself, the placeholder unifies
//! with the definition's type, and only the unified result generalizes.
//! Recursive calls inside the definition therefore stay monomorphic while
//! the body still sees a polymorphic scheme.

use crate::env::TypeEnv;
use crate::error::TypeError;
use crate::expr::{ExprForm, Expression};
use crate::scheme::Scheme;
use crate::ty::Ty;
use crate::unify::InferCtx;

/// Infer the principal type scheme of an expression.
///
/// Creates a context seeded past the environment's variable ids, walks
/// the expression, and closes the result over: the inferred type is
/// generalized against the empty environment and its quantifiers
/// renumbered canonically.
pub fn infer(env: &TypeEnv, expr: &dyn Expression) -> Result<Scheme, TypeError> {
    let mut ctx = InferCtx::new();
    infer_with(&mut ctx, env, expr)
}

/// Infer with a caller-owned context.
///
/// Lets a caller mint environment variables through the same context or
/// inspect bindings after the run.
pub fn infer_with(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    expr: &dyn Expression,
) -> Result<Scheme, TypeError> {
    if let Some(max) = env.max_var() {
        ctx.register_var(max);
    }
    let ty = infer_expr(ctx, env, expr)?;
    Ok(close_over(ctx, ty))
}

/// One rule application per expression role.
fn infer_expr(ctx: &mut InferCtx, env: &TypeEnv, expr: &dyn Expression) -> Result<Ty, TypeError> {
    match expr.form() {
        // a literal that reports its own type short-circuits the
        // environment; otherwise its name resolves like a variable
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
            let body_ty = infer_expr(ctx, &scope, body)?;
            Ok(Ty::arrow(Ty::Var(tv), body_ty))
        }
        ExprForm::Apply { func, arg } => {
            let fn_ty = infer_expr(ctx, env, func)?;
            let arg_ty = infer_expr(ctx, env, arg)?;
            let ret = ctx.fresh_var();
            ctx.unify(Ty::arrow(arg_ty, ret.clone()), fn_ty)?;
            Ok(ctx.resolve(ret))
        }
        ExprForm::Let { name, def, body } => {
            // the definition must not see its own binding
            let def_ty = infer_expr(ctx, env, def)?;
            let scheme = ctx.generalize(env, def_ty);
            let mut scope = env.clone();
            scope.insert(name, scheme);
            infer_expr(ctx, &scope, body)
        }
        ExprForm::LetRec { name, def, body } => {
            let tv = ctx.fresh_key();
            let mut scope = env.clone();
            scope.insert(name, Scheme::mono(Ty::Var(tv)));
            scope.add_concrete_var(tv);
            let def_ty = infer_expr(ctx, &scope, def)?;
            ctx.unify(Ty::Var(tv), def_ty)?;

            // generalize against the outer scope, where the placeholder's
            // pin no longer applies
            let resolved = ctx.resolve(Ty::Var(tv));
            let scheme = ctx.generalize(env, resolved);
            let mut scope = env.clone();
            scope.insert(name, scheme);
            infer_expr(ctx, &scope, body)
        }
    }
}

/// Close a type over: generalize against the empty environment, then
/// renumber quantifiers canonically.
pub(crate) fn close_over(ctx: &mut InferCtx, ty: Ty) -> Scheme {
    ctx.generalize(&TypeEnv::new(), ty).normalize()
}
