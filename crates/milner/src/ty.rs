//! Type representation for Hindley-Milner inference.
//!
//! Defines the core [`Ty`] term together with its three building blocks:
//! type variables ([`TyVar`]), type constants ([`TyCon`]), and type
//! operators ([`TyOp`]). [`TyVarSet`] is the sorted variable set that
//! free-variable computation and generalization work over.

use std::fmt;

/// Name of the function type operator. Function types are binary,
/// `domain → codomain`, and curried chains associate to the right.
pub const FN_OP: &str = "→";

/// Name of the tuple type operator.
pub const TUPLE_OP: &str = "()";

/// A type variable, identified by a `u32` key into the unification table.
///
/// Fresh variables are minted by the inference context; the `ena` crate
/// handles the union-find mechanics behind them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TyVar(pub u32);

impl fmt::Display for TyVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the first 26 ids print as letters, the rest fall back to t{id}
        if self.0 < 26 {
            write!(f, "{}", char::from(b'a' + self.0 as u8))
        } else {
            write!(f, "t{}", self.0)
        }
    }
}

/// A type constant -- an atomic, named type with no internal structure,
/// like `Float` or `Bool`. Two constants are equal exactly when their
/// names are.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyCon {
    pub name: String,
}

impl TyCon {
    pub fn new(name: impl Into<String>) -> Self {
        TyCon { name: name.into() }
    }
}

impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A type operator -- a named constructor applied to sub-types.
///
/// Function types are the binary case under [`FN_OP`] and tuples live
/// under [`TUPLE_OP`]; beyond those two the engine attaches no meaning to
/// names. Callers can introduce their own constructors (`List`, `Map`,
/// ...) and unification will compare names and recurse into `args`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyOp {
    pub name: String,
    pub args: Vec<Ty>,
}

impl TyOp {
    pub fn new(name: impl Into<String>, args: Vec<Ty>) -> Self {
        TyOp { name: name.into(), args }
    }

    /// The immediate sub-types of this operator.
    pub fn types(&self) -> &[Ty] {
        &self.args
    }

    /// Rebuild this operator with a replacement sub-type list.
    ///
    /// # Panics
    ///
    /// Panics if the replacement list changes the arity.
    pub fn with_args(&self, args: Vec<Ty>) -> TyOp {
        assert_eq!(
            self.args.len(),
            args.len(),
            "operator `{}` rebuilt with wrong arity",
            self.name
        );
        TyOp { name: self.name.clone(), args }
    }
}

/// A type term.
///
/// Every type is exactly one of the three variants; there is no unknown or
/// partially-built case:
///
/// - `Var`: an inference variable, resolved through the unification table
/// - `Con`: a concrete atomic type
/// - `Op`: a constructor applied to sub-types (functions, tuples, `List<T>`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// A type variable.
    Var(TyVar),
    /// A type constant.
    Con(TyCon),
    /// A type operator applied to sub-types.
    Op(TyOp),
}

impl Ty {
    /// The `Float` constant.
    pub fn float() -> Ty {
        Ty::Con(TyCon::new("Float"))
    }

    /// The `Bool` constant.
    pub fn bool() -> Ty {
        Ty::Con(TyCon::new("Bool"))
    }

    /// An atomic type with the given name.
    pub fn con(name: impl Into<String>) -> Ty {
        Ty::Con(TyCon::new(name))
    }

    /// A binary function type `domain → codomain`.
    pub fn arrow(domain: Ty, codomain: Ty) -> Ty {
        Ty::Op(TyOp::new(FN_OP, vec![domain, codomain]))
    }

    /// A curried function type built from a flat list.
    ///
    /// `Ty::fun(vec![a, b, c])` is `a → (b → c)`, the same type as
    /// `Ty::arrow(a, Ty::arrow(b, c))`.
    ///
    /// # Panics
    ///
    /// Panics when given fewer than two types. A function needs at least a
    /// domain and a codomain; anything shorter is a caller bug, not a
    /// recoverable condition.
    pub fn fun(types: Vec<Ty>) -> Ty {
        assert!(
            types.len() >= 2,
            "a function type needs at least two types, got {}",
            types.len()
        );
        let mut rev = types.into_iter().rev();
        let last = rev.next().expect("length checked above");
        rev.fold(last, |codomain, domain| Ty::arrow(domain, codomain))
    }

    /// A tuple type `(t1, t2, ...)`.
    pub fn tuple(elems: Vec<Ty>) -> Ty {
        Ty::Op(TyOp::new(TUPLE_OP, elems))
    }

    /// A named operator applied to sub-types, e.g.
    /// `Ty::op("List", vec![Ty::float()])` for `List<Float>`.
    pub fn op(name: impl Into<String>, args: Vec<Ty>) -> Ty {
        Ty::Op(TyOp::new(name, args))
    }

    /// Whether the outermost layer is a function type.
    pub fn is_fun(&self) -> bool {
        matches!(self, Ty::Op(op) if op.name == FN_OP)
    }

    /// The domain of a function type.
    pub fn fn_arg(&self) -> Option<&Ty> {
        match self {
            Ty::Op(op) if op.name == FN_OP => op.args.first(),
            _ => None,
        }
    }

    /// The codomain of a function type.
    pub fn fn_ret(&self) -> Option<&Ty> {
        match self {
            Ty::Op(op) if op.name == FN_OP => op.args.get(1),
            _ => None,
        }
    }

    /// The final codomain of a curried chain: for `a → b → c` this is `c`.
    pub fn final_ret(&self) -> Option<&Ty> {
        let mut ret = self.fn_ret()?;
        while let Some(next) = ret.fn_ret() {
            ret = next;
        }
        Some(ret)
    }

    /// Collect the free type variables of this term.
    ///
    /// A variable contributes itself, a constant contributes nothing, and
    /// an operator contributes the union over its sub-types.
    pub fn free_ty_vars(&self) -> TyVarSet {
        let mut set = TyVarSet::new();
        self.collect_free_vars(&mut set);
        set
    }

    fn collect_free_vars(&self, out: &mut TyVarSet) {
        match self {
            Ty::Var(v) => {
                out.insert(*v);
            }
            Ty::Con(_) => {}
            Ty::Op(op) => {
                for arg in &op.args {
                    arg.collect_free_vars(out);
                }
            }
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "{}", v),
            Ty::Con(c) => write!(f, "{}", c),
            Ty::Op(op) if op.name == FN_OP && op.args.len() == 2 => {
                // right-associative: only a function in domain position
                // needs parentheses
                if op.args[0].is_fun() {
                    write!(f, "({}) → {}", op.args[0], op.args[1])
                } else {
                    write!(f, "{} → {}", op.args[0], op.args[1])
                }
            }
            Ty::Op(op) if op.name == TUPLE_OP => {
                write!(f, "(")?;
                for (i, elem) in op.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, ")")
            }
            Ty::Op(op) => {
                write!(f, "{}", op.name)?;
                if !op.args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in op.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

/// A sorted, deduplicated set of type variables.
///
/// Backed by a sorted `Vec`: the sets involved in inference are tiny, and
/// the sorted representation keeps union, intersection, and difference as
/// plain merges with deterministic iteration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TyVarSet(Vec<TyVar>);

impl TyVarSet {
    pub fn new() -> Self {
        TyVarSet(Vec::new())
    }

    /// Insert a variable. Returns `false` if it was already present.
    pub fn insert(&mut self, v: TyVar) -> bool {
        match self.0.binary_search(&v) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, v);
                true
            }
        }
    }

    /// Remove a variable. Returns `true` if it was present.
    pub fn remove(&mut self, v: TyVar) -> bool {
        match self.0.binary_search(&v) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, v: TyVar) -> bool {
        self.0.binary_search(&v).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = TyVar> + '_ {
        self.0.iter().copied()
    }

    /// Set union.
    pub fn union(&self, other: &TyVarSet) -> TyVarSet {
        let mut out = self.clone();
        for v in other.iter() {
            out.insert(v);
        }
        out
    }

    /// Set intersection.
    pub fn intersect(&self, other: &TyVarSet) -> TyVarSet {
        TyVarSet(self.iter().filter(|v| other.contains(*v)).collect())
    }

    /// Set difference: everything in `self` that is not in `other`.
    pub fn difference(&self, other: &TyVarSet) -> TyVarSet {
        TyVarSet(self.iter().filter(|v| !other.contains(*v)).collect())
    }

    /// The largest id in the set.
    pub fn max(&self) -> Option<TyVar> {
        self.0.last().copied()
    }

    /// Consume the set into its sorted backing vector.
    pub fn into_vec(self) -> Vec<TyVar> {
        self.0
    }
}

impl FromIterator<TyVar> for TyVarSet {
    fn from_iter<I: IntoIterator<Item = TyVar>>(iter: I) -> Self {
        let mut set = TyVarSet::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

// ── Tests ──────────────────────────────────────────────────────────────
