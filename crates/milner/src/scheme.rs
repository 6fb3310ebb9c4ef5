//! Polymorphic type schemes.
//!
//! A scheme universally quantifies a set of type variables over a body
//! type; the identity function's scheme is `∀a. a → a`. Generalization
//! produces schemes, instantiation consumes them, and
//! [`normalize`](Scheme::normalize) renumbers quantifiers canonically so
//! equivalent schemes print and compare identically.

use std::fmt;

use crate::subst::Subst;
use crate::ty::{Ty, TyVar, TyVarSet};

/// A type scheme: quantified variables plus a body type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    /// The quantified (generic) variables.
    pub vars: Vec<TyVar>,
    /// The body type. May mention both quantified and free variables.
    pub ty: Ty,
}

impl Scheme {
    /// A monomorphic scheme -- no quantified variables.
    pub fn mono(ty: Ty) -> Self {
        Scheme { vars: Vec::new(), ty }
    }

    /// A scheme quantifying `vars` over `ty`.
    pub fn poly(vars: Vec<TyVar>, ty: Ty) -> Self {
        Scheme { vars, ty }
    }

    /// Whether the scheme quantifies anything.
    pub fn is_mono(&self) -> bool {
        self.vars.is_empty()
    }

    /// The scheme's free variables: free in the body and not quantified.
    pub fn free_ty_vars(&self) -> TyVarSet {
        let quantified: TyVarSet = self.vars.iter().copied().collect();
        self.ty.free_ty_vars().difference(&quantified)
    }

    /// Apply a substitution to the body, masking out mappings for the
    /// quantified variables. A substitution never reaches under a
    /// quantifier.
    pub fn apply(&self, subst: &Subst) -> Scheme {
        if subst.is_empty() || self.vars.is_empty() {
            return Scheme { vars: self.vars.clone(), ty: subst.apply(&self.ty) };
        }
        let mut masked = subst.clone();
        for v in &self.vars {
            masked.remove(*v);
        }
        Scheme { vars: self.vars.clone(), ty: masked.apply(&self.ty) }
    }

    /// Renumber the quantified variables canonically.
    ///
    /// Quantifiers are renamed to 0, 1, 2, ... in order of first
    /// occurrence in the body; quantified variables that never occur are
    /// dropped. Free variables keep their ids and the renaming skips any
    /// id that would collide with one of them. The rename is applied
    /// simultaneously, so a body like `∀b a. b → a` comes out as
    /// `∀a b. a → b` with no capture.
    pub fn normalize(&self) -> Scheme {
        let quantified: TyVarSet = self.vars.iter().copied().collect();
        let free = self.ty.free_ty_vars().difference(&quantified);

        let mut order = Vec::new();
        occurrences(&self.ty, &mut order);

        let mut rename = Subst::with_capacity(self.vars.len());
        let mut vars = Vec::with_capacity(self.vars.len());
        let mut next = 0u32;
        for v in order {
            if !quantified.contains(v) || rename.get(v).is_some() {
                continue;
            }
            while free.contains(TyVar(next)) {
                next += 1;
            }
            rename.insert(v, Ty::Var(TyVar(next)));
            vars.push(TyVar(next));
            next += 1;
        }

        Scheme { vars, ty: rename.apply(&self.ty) }
    }
}

/// Collect every variable occurrence of `ty` in depth-first order.
fn occurrences(ty: &Ty, out: &mut Vec<TyVar>) {
    match ty {
        Ty::Var(v) => out.push(*v),
        Ty::Con(_) => {}
        Ty::Op(op) => {
            for arg in &op.args {
                occurrences(arg, out);
            }
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            return write!(f, "{}", self.ty);
        }
        write!(f, "∀")?;
        for (i, v) in self.vars.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ". {}", self.ty)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
