//! The expression-side boundary of the engine.
//!
//! The engine never sees a concrete syntax tree. Callers implement
//! [`Expression`] for their node type and project each node into one of
//! the six [`ExprForm`] roles; the drivers dispatch on the projection
//! alone, so an embedding is free to define as many concrete node kinds
//! as it likes.

use crate::ty::Ty;

/// A typeable expression node.
pub trait Expression {
    /// Which syntactic role this node plays, with its parts borrowed out
    /// of the node.
    fn form(&self) -> ExprForm<'_>;
}

/// The six syntactic roles the inference drivers understand.
pub enum ExprForm<'a> {
    /// A literal. A `Some` type means the node reports its own type;
    /// `None` sends `name` through the environment like a variable.
    Literal { name: &'a str, ty: Option<Ty> },
    /// A variable reference.
    Var { name: &'a str },
    /// A lambda abstraction `λparam. body`.
    Lambda { param: &'a str, body: &'a dyn Expression },
    /// A function application `func arg`.
    Apply { func: &'a dyn Expression, arg: &'a dyn Expression },
    /// A non-recursive binding `let name = def in body`.
    Let { name: &'a str, def: &'a dyn Expression, body: &'a dyn Expression },
    /// A recursive binding `letrec name = def in body`.
    LetRec { name: &'a str, def: &'a dyn Expression, body: &'a dyn Expression },
}

impl<T: Expression + ?Sized> Expression for &T {
    fn form(&self) -> ExprForm<'_> {
        (**self).form()
    }
}

impl<T: Expression + ?Sized> Expression for Box<T> {
    fn form(&self) -> ExprForm<'_> {
        (**self).form()
    }
}
