//! Typed errors for unification and inference.
//!
//! Every data-dependent failure surfaces as a [`TypeError`] carrying the
//! offending types or identifier. Panics are reserved for violated caller
//! contracts, like building a function type from fewer than two types.

use std::fmt;

use crate::ty::{Ty, TyVar};

/// A type error produced during unification or inference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeError {
    /// An identifier was referenced but never bound in the environment.
    UnboundVariable { name: String },
    /// A type variable the context never minted appeared in unification.
    /// Foreign ids carry no table entry and cannot be bound.
    UnknownTypeVar { var: TyVar },
    /// Two types that must be equal are not.
    Mismatch { expected: Ty, found: Ty },
    /// Two operators with the same name but different sub-type counts.
    ArityMismatch { op: String, expected: usize, found: usize },
    /// No unification rule covers this combination of terms.
    NotUnifiable { left: Ty, right: Ty },
    /// A variable occurs inside the type it would be bound to, so binding
    /// it would build an infinite type.
    InfiniteType { var: TyVar, ty: Ty },
    /// One variable ended up carrying two unequal bindings. This means
    /// shared inference state was corrupted; it cannot arise through the
    /// public inference entry points.
    InstanceConflict { var: TyVar, left: Ty, right: Ty },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnboundVariable { name } => {
                write!(f, "unbound variable `{}`", name)
            }
            TypeError::UnknownTypeVar { var } => {
                write!(f, "unknown type variable `{}`", var)
            }
            TypeError::Mismatch { expected, found } => {
                write!(f, "type mismatch: expected `{}`, found `{}`", expected, found)
            }
            TypeError::ArityMismatch { op, expected, found } => {
                write!(
                    f,
                    "arity mismatch on `{}`: expected {} sub-types, found {}",
                    op, expected, found
                )
            }
            TypeError::NotUnifiable { left, right } => {
                write!(f, "`{}` and `{}` cannot be unified", left, right)
            }
            TypeError::InfiniteType { var, ty } => {
                write!(f, "infinite type: `{}` occurs in `{}`", var, ty)
            }
            TypeError::InstanceConflict { var, left, right } => {
                write!(
                    f,
                    "type variable `{}` carries conflicting bindings `{}` and `{}`",
                    var, left, right
                )
            }
        }
    }
}

impl std::error::Error for TypeError {}

// ── Tests ──────────────────────────────────────────────────────────────
