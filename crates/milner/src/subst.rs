//! Substitutions: finite mappings from type variables to types.
//!
//! Unification produces substitutions and inference threads them through
//! constraint lists and result types. Two representations back one
//! interface: a linear association list for the common few-entry case and
//! a hash map once a substitution outgrows the spill threshold.

use rustc_hash::FxHashMap;

use crate::ty::{Ty, TyVar};

/// Entry count past which the association list spills into a hash map.
const SPILL_AT: usize = 8;

/// A finite mapping from type variables to types.
///
/// [`apply`](Subst::apply) rewrites a type through the mapping in one
/// pass; [`compose`](Subst::compose) merges two substitutions so a single
/// application of the result equals applying the operands in sequence.
#[derive(Clone, Debug, Default)]
pub struct Subst {
    repr: Repr,
}

#[derive(Clone, Debug)]
enum Repr {
    List(Vec<(TyVar, Ty)>),
    Map(FxHashMap<TyVar, Ty>),
}

impl Default for Repr {
    fn default() -> Self {
        Repr::List(Vec::new())
    }
}

impl Subst {
    /// The empty substitution.
    pub fn new() -> Self {
        Subst::default()
    }

    /// An empty substitution with room for `n` entries, picking the
    /// representation up front.
    pub fn with_capacity(n: usize) -> Self {
        let repr = if n > SPILL_AT {
            Repr::Map(FxHashMap::with_capacity_and_hasher(n, Default::default()))
        } else {
            Repr::List(Vec::with_capacity(n))
        };
        Subst { repr }
    }

    /// A substitution holding a single mapping.
    pub fn singleton(v: TyVar, ty: Ty) -> Self {
        Subst { repr: Repr::List(vec![(v, ty)]) }
    }

    /// Look up the image of a variable.
    pub fn get(&self, v: TyVar) -> Option<&Ty> {
        match &self.repr {
            Repr::List(entries) => entries.iter().find(|(k, _)| *k == v).map(|(_, ty)| ty),
            Repr::Map(map) => map.get(&v),
        }
    }

    /// Add a mapping, overwriting any existing image for `v`.
    pub fn insert(&mut self, v: TyVar, ty: Ty) {
        match &mut self.repr {
            Repr::List(entries) => {
                if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == v) {
                    entry.1 = ty;
                    return;
                }
                entries.push((v, ty));
                if entries.len() > SPILL_AT {
                    self.spill();
                }
            }
            Repr::Map(map) => {
                map.insert(v, ty);
            }
        }
    }

    /// Remove a mapping, returning the image it held.
    pub fn remove(&mut self, v: TyVar) -> Option<Ty> {
        match &mut self.repr {
            Repr::List(entries) => {
                let pos = entries.iter().position(|(k, _)| *k == v)?;
                Some(entries.remove(pos).1)
            }
            Repr::Map(map) => map.remove(&v),
        }
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::List(entries) => entries.len(),
            Repr::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the mappings. Order is unspecified.
    pub fn iter(&self) -> Iter<'_> {
        match &self.repr {
            Repr::List(entries) => Iter(IterRepr::List(entries.iter())),
            Repr::Map(map) => Iter(IterRepr::Map(map.iter())),
        }
    }

    fn spill(&mut self) {
        if let Repr::List(entries) = &mut self.repr {
            let map = entries.drain(..).collect();
            self.repr = Repr::Map(map);
        }
    }

    /// Apply this substitution to a type.
    ///
    /// A mapped variable is replaced by its image, an unmapped variable
    /// and a constant pass through unchanged, and an operator is rebuilt
    /// with every sub-type rewritten. The pass is single-shot: images are
    /// not themselves rewritten. Chained replacement is what
    /// [`compose`](Subst::compose) is for.
    pub fn apply(&self, ty: &Ty) -> Ty {
        if self.is_empty() {
            return ty.clone();
        }
        self.apply_inner(ty)
    }

    fn apply_inner(&self, ty: &Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.get(*v) {
                Some(image) => image.clone(),
                None => ty.clone(),
            },
            Ty::Con(_) => ty.clone(),
            Ty::Op(op) => {
                let args = op.args.iter().map(|arg| self.apply_inner(arg)).collect();
                Ty::Op(op.with_args(args))
            }
        }
    }

    /// Compose two substitutions.
    ///
    /// `a.compose(&b)` behaves under one `apply` exactly like applying `a`
    /// first and `b` second: `a`'s images are rewritten through `b`, then
    /// `b` contributes mappings for the keys `a` does not bind. Where both
    /// bind the same key, `a`'s (rewritten) image survives. Composing with
    /// the empty substitution returns the other operand unchanged.
    pub fn compose(&self, newer: &Subst) -> Subst {
        if self.is_empty() {
            return newer.clone();
        }
        if newer.is_empty() {
            return self.clone();
        }
        let mut out = Subst::with_capacity(self.len() + newer.len());
        for (v, ty) in self.iter() {
            out.insert(v, newer.apply(ty));
        }
        for (v, ty) in newer.iter() {
            if out.get(v).is_none() {
                out.insert(v, ty.clone());
            }
        }
        out
    }
}

/// Iterator over a substitution's mappings.
pub struct Iter<'a>(IterRepr<'a>);

enum IterRepr<'a> {
    List(std::slice::Iter<'a, (TyVar, Ty)>),
    Map(std::collections::hash_map::Iter<'a, TyVar, Ty>),
}

impl<'a> Iterator for Iter<'a> {
    type Item = (TyVar, &'a Ty);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            IterRepr::List(inner) => inner.next().map(|(v, ty)| (*v, ty)),
            IterRepr::Map(inner) => inner.next().map(|(v, ty)| (*v, ty)),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
