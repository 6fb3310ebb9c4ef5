//! A Hindley-Milner type inference engine.
//!
//! Given an expression tree built from six syntactic roles -- literal,
//! variable, lambda, application, let, recursive let -- the engine
//! computes the most general type scheme consistent with a typing
//! environment, or reports why none exists. Expression trees stay on the
//! caller's side of the [`Expression`] trait; the engine only ever sees
//! the role projection.
//!
//! Two drivers cover the classic algorithm shapes: [`infer`] unifies
//! eagerly while it walks, [`solve_infer`] collects equality constraints
//! and discharges them through [`solve`]. Both rest on the same engine
//! core -- a union-find unification table with an occurs check, explicit
//! substitutions with composition, and scheme generalization and
//! instantiation.
//!
//! # Architecture
//!
//! - [`ty`]: Core type representation (variables, constants, operators)
//! - [`subst`]: Substitutions with application and composition
//! - [`unify`]: The unification engine and inference context
//! - [`scheme`]: Polymorphic type schemes and canonical renumbering
//! - [`env`]: The typing environment (bindings plus concrete variables)
//! - [`expr`]: The trait boundary expression trees implement
//! - [`infer`]: The eager inference driver
//! - [`solve`]: Equality constraints, the solver, the deferred driver
//! - [`error`]: The type error taxonomy

pub mod env;
pub mod error;
pub mod expr;
pub mod infer;
pub mod scheme;
pub mod solve;
pub mod subst;
pub mod ty;
pub mod unify;

pub use env::TypeEnv;
pub use error::TypeError;
pub use expr::{ExprForm, Expression};
pub use infer::{infer, infer_with};
pub use scheme::Scheme;
pub use solve::{solve, solve_infer, Constraint, Constraints};
pub use subst::Subst;
pub use ty::{Ty, TyCon, TyOp, TyVar, TyVarSet, FN_OP, TUPLE_OP};
pub use unify::{unify, InferCtx};
