//! Unification engine and inference context.
//!
//! [`InferCtx`] owns every piece of mutable inference state: the `ena`
//! union-find table mapping type variables to their equivalence classes
//! and bindings, a trail recording each binding so one call's effect can
//! be read back as an explicit [`Subst`], and the per-variable type-class
//! constraint sets. Unification resolves both sides through the table and
//! then compares structurally, with an occurs check guarding every
//! variable binding.

use ena::unify::InPlaceUnificationTable;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::env::TypeEnv;
use crate::error::TypeError;
use crate::scheme::Scheme;
use crate::subst::Subst;
use crate::ty::{Ty, TyOp, TyVar, TyVarSet};

/// The inference context.
///
/// All inference for one expression flows through one context: it mints
/// fresh variables, unifies types, resolves terms through accumulated
/// bindings, and generalizes or instantiates schemes. A context is cheap
/// to create and each top-level inference call owns its own, so
/// independent inference runs never share mutable state.
pub struct InferCtx {
    /// The union-find unification table.
    table: InPlaceUnificationTable<TyVar>,
    /// Every binding made by `unify`, in order. `unify_delta` reads a
    /// suffix of this to report one call's effect as a substitution.
    trail: Vec<(TyVar, Ty)>,
    /// Type-class constraint sets, keyed by root variable. Unifying two
    /// variables unions their sets; instantiation copies a quantified
    /// variable's set onto its fresh replacement.
    class_constraints: FxHashMap<TyVar, FxHashSet<String>>,
}

impl InferCtx {
    /// Create an empty context.
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
            trail: Vec::new(),
            class_constraints: FxHashMap::default(),
        }
    }

    // ── Variable creation ──────────────────────────────────────────────

    /// Mint a fresh, unbound type variable key.
    pub fn fresh_key(&mut self) -> TyVar {
        self.table.new_key(None)
    }

    /// Mint a fresh type variable as a type term.
    pub fn fresh_var(&mut self) -> Ty {
        Ty::Var(self.fresh_key())
    }

    /// Whether `v` is a key of this context's table.
    pub fn contains_var(&self, v: TyVar) -> bool {
        (v.0 as usize) < self.table.len()
    }

    /// Bring `v` (and every id below it) into this context's key space.
    ///
    /// Environments are often seeded with hand-built schemes whose
    /// variables were never minted through [`fresh_var`](Self::fresh_var);
    /// registering the largest such id up front makes them ordinary
    /// unbound variables here instead of foreign ids.
    ///
    /// Allocation is proportional to the id: every key up to and
    /// including `v` is created, so hand-built ids are expected to be
    /// dense from zero, the way [`TypeEnv::max_var`] reports them.
    pub fn register_var(&mut self, v: TyVar) {
        while self.table.len() <= v.0 as usize {
            self.table.new_key(None);
        }
    }

    /// Number of variables this context has minted.
    pub fn num_vars(&self) -> usize {
        self.table.len()
    }

    // ── Resolution ─────────────────────────────────────────────────────

    /// Resolve a type through the table.
    ///
    /// A bound variable is replaced by its recursively resolved binding.
    /// An unbound variable normalizes to its root key, so two variables
    /// that were unified resolve to the same representative; without that
    /// normalization generalization would quantify one equivalence class
    /// twice. Constants pass through and operators resolve sub-type by
    /// sub-type.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => {
                if !self.contains_var(v) {
                    return Ty::Var(v);
                }
                match self.table.probe_value(v) {
                    Some(inner) => self.resolve(inner),
                    None => Ty::Var(self.table.find(v)),
                }
            }
            Ty::Con(_) => ty,
            Ty::Op(TyOp { name, args }) => {
                let args = args.into_iter().map(|arg| self.resolve(arg)).collect();
                Ty::Op(TyOp { name, args })
            }
        }
    }

    /// The root key of a variable's equivalence class. Foreign ids are
    /// their own root.
    pub fn root_of(&mut self, v: TyVar) -> TyVar {
        if self.contains_var(v) {
            self.table.find(v)
        } else {
            v
        }
    }

    // ── Occurs check ───────────────────────────────────────────────────

    /// Whether `var` occurs anywhere inside `ty`, following bindings and
    /// equivalence classes.
    ///
    /// Binding a variable to a type containing itself would build an
    /// infinite type like `a ~ a → Float`; [`unify`](Self::unify) runs
    /// this check before every variable binding.
    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if !self.contains_var(*v) || !self.contains_var(var) {
                    return *v == var;
                }
                if self.table.unioned(*v, var) {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Con(_) => false,
            Ty::Op(op) => op.args.iter().any(|arg| self.occurs_in(var, arg)),
        }
    }

    // ── Unification ────────────────────────────────────────────────────

    /// Unify two types, making them equal in this context.
    ///
    /// Both sides resolve through the table first, then compare
    /// structurally:
    ///
    /// - variable vs variable: union the equivalence classes (and merge
    ///   their constraint sets); the same variable on both sides is a
    ///   no-op
    /// - variable vs non-variable: occurs check, then bind
    /// - constant vs constant: the names must match
    /// - operator vs operator: names and arities must match, then
    ///   sub-types unify pairwise left to right, later pairs seeing the
    ///   bindings made by earlier ones
    /// - constant vs operator: not unifiable
    pub fn unify(&mut self, a: Ty, b: Ty) -> Result<(), TypeError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) => {
                self.check_known(v1)?;
                self.check_known(v2)?;
                if v1 == v2 {
                    // already the same class, nothing to record
                    return Ok(());
                }
                self.unify_var_var(v1, v2)
            }
            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                self.check_known(v)?;
                self.bind_var(v, ty)
            }
            (Ty::Con(c1), Ty::Con(c2)) => {
                if c1 == c2 {
                    Ok(())
                } else {
                    Err(TypeError::Mismatch { expected: Ty::Con(c1), found: Ty::Con(c2) })
                }
            }
            (Ty::Op(o1), Ty::Op(o2)) => {
                if o1.name != o2.name {
                    return Err(TypeError::Mismatch { expected: Ty::Op(o1), found: Ty::Op(o2) });
                }
                if o1.args.len() != o2.args.len() {
                    return Err(TypeError::ArityMismatch {
                        op: o1.name,
                        expected: o1.args.len(),
                        found: o2.args.len(),
                    });
                }
                for (x, y) in o1.args.into_iter().zip(o2.args) {
                    self.unify(x, y)?;
                }
                Ok(())
            }
            (a, b) => Err(TypeError::NotUnifiable { left: a, right: b }),
        }
    }

    /// Unify two types and report the bindings this call introduced as an
    /// explicit substitution.
    ///
    /// The trail entries the call produced compose in order, so one
    /// application of the returned substitution equals replaying the
    /// bindings sequentially. The constraint solver is built on this.
    pub fn unify_delta(&mut self, a: Ty, b: Ty) -> Result<Subst, TypeError> {
        let mark = self.trail.len();
        self.unify(a, b)?;
        let mut delta = Subst::new();
        for (v, ty) in &self.trail[mark..] {
            delta = delta.compose(&Subst::singleton(*v, ty.clone()));
        }
        Ok(delta)
    }

    fn check_known(&self, v: TyVar) -> Result<(), TypeError> {
        if self.contains_var(v) {
            Ok(())
        } else {
            Err(TypeError::UnknownTypeVar { var: v })
        }
    }

    fn unify_var_var(&mut self, v1: TyVar, v2: TyVar) -> Result<(), TypeError> {
        let r1 = self.table.find(v1);
        let r2 = self.table.find(v2);

        // whichever root survives the union inherits both constraint sets
        let mut merged = self.class_constraints.remove(&r1).unwrap_or_default();
        if let Some(other) = self.class_constraints.remove(&r2) {
            merged.extend(other);
        }

        match self.table.unify_var_var(r1, r2) {
            Ok(()) => {
                let root = self.table.find(r1);
                if !merged.is_empty() {
                    self.class_constraints.insert(root, merged);
                }
                let absorbed = if root == r1 { r2 } else { r1 };
                self.trail.push((absorbed, Ty::Var(root)));
                Ok(())
            }
            Err((left, right)) => Err(TypeError::InstanceConflict { var: r1, left, right }),
        }
    }

    fn bind_var(&mut self, v: TyVar, ty: Ty) -> Result<(), TypeError> {
        if self.occurs_in(v, &ty) {
            return Err(TypeError::InfiniteType { var: v, ty });
        }
        let root = self.table.find(v);
        match self.table.unify_var_value(root, Some(ty.clone())) {
            Ok(()) => {
                self.trail.push((root, ty));
                Ok(())
            }
            Err((left, right)) => Err(TypeError::InstanceConflict { var: root, left, right }),
        }
    }

    // ── Generalization and instantiation ───────────────────────────────

    /// Generalize a type into a scheme relative to an environment.
    ///
    /// The type resolves through the table, then its free variables minus
    /// the environment's pinned set become the quantifiers. A variable
    /// free in the environment belongs to an enclosing scope and stays
    /// monomorphic; so does anything in the environment's concrete set.
    pub fn generalize(&mut self, env: &TypeEnv, ty: Ty) -> Scheme {
        let resolved = self.resolve(ty);
        let pinned = self.env_free_vars(env);
        let quantified = resolved.free_ty_vars().difference(&pinned);
        Scheme { vars: quantified.into_vec(), ty: resolved }
    }

    /// The environment's free variables plus its concrete set, normalized
    /// through the table.
    ///
    /// Normalization matters: a scheme in the environment may mention a
    /// variable that has since been bound or unioned, and the pinned set
    /// must speak in terms of current roots to line up with a resolved
    /// candidate type.
    pub fn env_free_vars(&mut self, env: &TypeEnv) -> TyVarSet {
        let mut pinned = TyVarSet::new();
        for (_, scheme) in env.bindings() {
            let body = self.resolve(scheme.ty.clone());
            let mut free = body.free_ty_vars();
            for q in &scheme.vars {
                free.remove(self.root_of(*q));
            }
            pinned = pinned.union(&free);
        }
        for v in env.concrete_vars().iter() {
            pinned.insert(self.root_of(v));
        }
        pinned
    }

    /// Instantiate a scheme: replace each quantified variable with a
    /// fresh one, consistently across the body.
    ///
    /// Two instantiations of the same scheme share nothing, which is what
    /// lets a polymorphic binding take different types at different use
    /// sites. Fresh variables inherit the type-class constraint sets of
    /// the quantified variables they replace.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }

        let mut rename = Subst::with_capacity(scheme.vars.len());
        for v in &scheme.vars {
            let old_root = self.root_of(*v);
            let fresh = self.fresh_key();
            if let Some(classes) = self.class_constraints.get(&old_root).cloned() {
                self.class_constraints.insert(fresh, classes);
            }
            rename.insert(old_root, Ty::Var(fresh));
        }
        let body = self.resolve(scheme.ty.clone());
        rename.apply(&body)
    }

    // ── Type-class constraints ─────────────────────────────────────────

    /// Attach a type-class constraint to a variable's equivalence class.
    pub fn constrain_var(&mut self, v: TyVar, class: impl Into<String>) {
        let root = self.root_of(v);
        self.class_constraints.entry(root).or_default().insert(class.into());
    }

    /// The type-class constraints on a variable's class, if any.
    pub fn var_constraints(&mut self, v: TyVar) -> Option<&FxHashSet<String>> {
        let root = self.root_of(v);
        self.class_constraints.get(&root)
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Unify two types in a throwaway context, returning both sides resolved
/// through the bindings the unification made.
///
/// Variables appearing in either operand are registered first, so types
/// built by hand (or minted by some other context) are treated as
/// ordinary unbound variables here.
pub fn unify(a: &Ty, b: &Ty) -> Result<(Ty, Ty), TypeError> {
    let mut ctx = InferCtx::new();
    if let Some(max) = a.free_ty_vars().union(&b.free_ty_vars()).max() {
        ctx.register_var(max);
    }
    ctx.unify(a.clone(), b.clone())?;
    Ok((ctx.resolve(a.clone()), ctx.resolve(b.clone())))
}

// ── Tests ──────────────────────────────────────────────────────────────
