//! The typing environment.
//!
//! Maps identifiers to type schemes and tracks which variables are
//! concrete, meaning pinned by an enclosing binder and not eligible for
//! generalization. Scoping is clone-and-extend: entering a lambda or let
//! body clones the environment, the inner walk mutates the clone, and the
//! clone drops on the way back out, so a parent scope never observes
//! inner bindings.

use rustc_hash::FxHashMap;

use crate::error::TypeError;
use crate::scheme::Scheme;
use crate::ty::{Ty, TyVar, TyVarSet};
use crate::unify::InferCtx;

/// A typing environment: identifier bindings plus the concrete set.
#[derive(Clone, Debug, Default)]
pub struct TypeEnv {
    bindings: FxHashMap<String, Scheme>,
    concrete: TyVarSet,
}

impl TypeEnv {
    /// An empty environment.
    pub fn new() -> Self {
        TypeEnv::default()
    }

    /// An environment pre-populated from `(identifier, scheme)` pairs.
    pub fn from_bindings<I, S>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (S, Scheme)>,
        S: Into<String>,
    {
        TypeEnv {
            bindings: bindings.into_iter().map(|(id, s)| (id.into(), s)).collect(),
            concrete: TyVarSet::new(),
        }
    }

    /// Builder-style: seed the concrete-variable set.
    pub fn with_concrete_vars<I: IntoIterator<Item = TyVar>>(mut self, vars: I) -> Self {
        for v in vars {
            self.concrete.insert(v);
        }
        self
    }

    /// Bind an identifier to a scheme, replacing any existing binding.
    pub fn insert(&mut self, id: impl Into<String>, scheme: Scheme) {
        self.bindings.insert(id.into(), scheme);
    }

    /// Remove an identifier's binding.
    pub fn remove(&mut self, id: &str) -> Option<Scheme> {
        self.bindings.remove(id)
    }

    /// Look up an identifier's scheme without instantiating it.
    pub fn lookup(&self, id: &str) -> Option<&Scheme> {
        self.bindings.get(id)
    }

    /// The type of an identifier: its scheme instantiated through `ctx`
    /// with fresh variables.
    ///
    /// Each call produces an independent instance, which is what makes a
    /// polymorphic binding usable at several types in one body.
    pub fn type_of(&self, ctx: &mut InferCtx, id: &str) -> Result<Ty, TypeError> {
        match self.bindings.get(id) {
            Some(scheme) => Ok(ctx.instantiate(scheme)),
            None => Err(TypeError::UnboundVariable { name: id.to_string() }),
        }
    }

    /// Pin a variable: it will not generalize while this environment or a
    /// clone of it is in scope.
    pub fn add_concrete_var(&mut self, v: TyVar) {
        self.concrete.insert(v);
    }

    /// The set of concrete (pinned) variables.
    pub fn concrete_vars(&self) -> &TyVarSet {
        &self.concrete
    }

    /// Iterate over the bindings.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Scheme)> {
        self.bindings.iter().map(|(id, scheme)| (id.as_str(), scheme))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The environment's free variables, read syntactically: the union of
    /// every scheme's free variables plus the concrete set.
    /// [`InferCtx::env_free_vars`] is the table-aware version that
    /// generalization uses.
    pub fn free_ty_vars(&self) -> TyVarSet {
        let mut out = TyVarSet::new();
        for scheme in self.bindings.values() {
            out = out.union(&scheme.free_ty_vars());
        }
        out.union(&self.concrete)
    }

    /// The largest variable id mentioned anywhere in the environment,
    /// quantifiers and concrete set included. Fresh contexts register
    /// past this so hand-built scheme variables become known ids.
    pub fn max_var(&self) -> Option<TyVar> {
        let mut max: Option<TyVar> = None;
        let mut bump = |v: TyVar| {
            if max.map_or(true, |m| v > m) {
                max = Some(v);
            }
        };
        for scheme in self.bindings.values() {
            for v in scheme.ty.free_ty_vars().iter() {
                bump(v);
            }
            for v in &scheme.vars {
                bump(*v);
            }
        }
        for v in self.concrete.iter() {
            bump(v);
        }
        max
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
