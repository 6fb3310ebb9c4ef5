//! End-to-end inference over a small expression tree.
//!
//! Covers literal typing, environment lookup, lambda and application
//! rules, let-polymorphism, recursive bindings, the classic factorial
//! acceptance case, failure modes (unbound identifiers, infinite types,
//! argument mismatches), and parallel inference over a shared
//! environment.

use milner::{infer, unify, Expression, ExprForm, Scheme, Ty, TypeEnv, TypeError, TyVar};

// ── Test AST ───────────────────────────────────────────────────────────

/// A minimal expression tree implementing the engine's boundary.
enum Expr {
    Lit(&'static str, Option<Ty>),
    Var(&'static str),
    Lambda(&'static str, Box<Expr>),
    Apply(Box<Expr>, Box<Expr>),
    Let(&'static str, Box<Expr>, Box<Expr>),
    LetRec(&'static str, Box<Expr>, Box<Expr>),
}

impl Expression for Expr {
    fn form(&self) -> ExprForm<'_> {
        match self {
            Expr::Lit(name, ty) => ExprForm::Literal { name, ty: ty.clone() },
            Expr::Var(name) => ExprForm::Var { name },
            Expr::Lambda(param, body) => ExprForm::Lambda { param, body: &**body },
            Expr::Apply(func, arg) => ExprForm::Apply { func: &**func, arg: &**arg },
            Expr::Let(name, def, body) => ExprForm::Let { name, def: &**def, body: &**body },
            Expr::LetRec(name, def, body) => ExprForm::LetRec { name, def: &**def, body: &**body },
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

/// A literal that self-reports `Float`.
fn float_lit(name: &'static str) -> Expr {
    Expr::Lit(name, Some(Ty::float()))
}

/// A literal that self-reports `Bool`.
fn bool_lit(name: &'static str) -> Expr {
    Expr::Lit(name, Some(Ty::bool()))
}

/// A literal with no intrinsic type, resolved through the environment.
fn lit(name: &'static str) -> Expr {
    Expr::Lit(name, None)
}

fn var(name: &'static str) -> Expr {
    Expr::Var(name)
}

fn lam(param: &'static str, body: Expr) -> Expr {
    Expr::Lambda(param, Box::new(body))
}

fn app(func: Expr, arg: Expr) -> Expr {
    Expr::Apply(Box::new(func), Box::new(arg))
}

fn let_(name: &'static str, def: Expr, body: Expr) -> Expr {
    Expr::Let(name, Box::new(def), Box::new(body))
}

fn letrec(name: &'static str, def: Expr, body: Expr) -> Expr {
    Expr::LetRec(name, Box::new(def), Box::new(body))
}

/// The arithmetic and boolean predefs the factorial case needs.
fn prelude() -> TypeEnv {
    let a = TyVar(0);
    TypeEnv::from_bindings([
        ("if", Scheme::poly(vec![a], Ty::fun(vec![Ty::bool(), Ty::Var(a), Ty::Var(a), Ty::Var(a)]))),
        ("isZero", Scheme::mono(Ty::arrow(Ty::float(), Ty::bool()))),
        ("mul", Scheme::mono(Ty::fun(vec![Ty::float(), Ty::float(), Ty::float()]))),
        ("--", Scheme::mono(Ty::arrow(Ty::float(), Ty::float()))),
    ])
}

/// `letrec fac = λn. if (isZero n) 1 (mul n (fac (-- n))) in fac 5`,
/// spelled with curried applications.
fn factorial() -> Expr {
    letrec(
        "fac",
        lam(
            "n",
            app(
                app(
                    app(lit("if"), app(lit("isZero"), var("n"))),
                    float_lit("1"),
                ),
                app(app(lit("mul"), var("n")), app(var("fac"), app(lit("--"), var("n")))),
            ),
        ),
        app(var("fac"), float_lit("5")),
    )
}

/// Run inference and render the resulting scheme.
fn infer_display(env: &TypeEnv, expr: &Expr) -> String {
    match infer(env, expr) {
        Ok(scheme) => format!("{}", scheme),
        Err(err) => panic!("expected successful inference, got: {}", err),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

/// Test 1: a literal that self-reports `Float` infers to `Float` against
/// an empty environment.
#[test]
fn self_typed_literal() {
    assert_eq!(infer_display(&TypeEnv::new(), &float_lit("1")), "Float");
}

/// Test 2: a literal with no intrinsic type resolves through the
/// environment like a variable.
#[test]
fn untyped_literal_resolves_through_env() {
    let env = TypeEnv::from_bindings([("pi", Scheme::mono(Ty::float()))]);
    assert_eq!(infer_display(&env, &lit("pi")), "Float");
}

/// Test 3: partially applying `+ : ∀a. a → a → a` to a `Float` literal
/// pins `a` and leaves one argument open.
#[test]
fn partial_application_pins_the_instance() {
    let a = TyVar(0);
    let env = TypeEnv::from_bindings([(
        "+",
        Scheme::poly(vec![a], Ty::fun(vec![Ty::Var(a), Ty::Var(a), Ty::Var(a)])),
    )]);
    let expr = app(lit("+"), float_lit("1"));
    assert_eq!(infer_display(&env, &expr), "Float → Float");
}

/// Test 4: wrapping a polymorphic increment in a lambda keeps the
/// identity shape polymorphic.
#[test]
fn lambda_over_polymorphic_function() {
    let a = TyVar(0);
    let env = TypeEnv::from_bindings([(
        "+1",
        Scheme::poly(vec![a], Ty::arrow(Ty::Var(a), Ty::Var(a))),
    )]);
    let expr = lam("x", app(lit("+1"), var("x")));
    assert_eq!(infer_display(&env, &expr), "∀a. a → a");
}

/// Test 5: the same lambda over a monomorphic increment stays
/// monomorphic.
#[test]
fn lambda_over_monomorphic_function() {
    let env = TypeEnv::from_bindings([("+1", Scheme::mono(Ty::arrow(Ty::float(), Ty::float())))]);
    let expr = lam("x", app(lit("+1"), var("x")));
    assert_eq!(infer_display(&env, &expr), "Float → Float");
}

/// Test 6: the factorial acceptance case types to `Float`.
#[test]
fn factorial_infers_to_float() {
    insta::assert_snapshot!(infer_display(&prelude(), &factorial()), @"Float");
}

/// Test 7: the bare identity lambda generalizes to `∀a. a → a`.
#[test]
fn identity_lambda_generalizes() {
    assert_eq!(infer_display(&TypeEnv::new(), &lam("x", var("x"))), "∀a. a → a");
}

/// Test 8: a let-bound identity is usable at two different types in the
/// same body.
#[test]
fn let_bound_identity_is_polymorphic() {
    let (a, b) = (TyVar(0), TyVar(1));
    let env = TypeEnv::from_bindings([(
        "pair",
        Scheme::poly(
            vec![a, b],
            Ty::fun(vec![Ty::Var(a), Ty::Var(b), Ty::tuple(vec![Ty::Var(a), Ty::Var(b)])]),
        ),
    )]);
    let expr = let_(
        "id",
        lam("x", var("x")),
        app(
            app(lit("pair"), app(var("id"), float_lit("1"))),
            app(var("id"), bool_lit("true")),
        ),
    );
    assert_eq!(infer_display(&env, &expr), "(Float, Bool)");
}

/// Test 9: a letrec binding is generalized before its body runs, so the
/// body can use it at two types.
#[test]
fn letrec_binding_is_polymorphic_in_body() {
    let (a, b) = (TyVar(0), TyVar(1));
    let env = TypeEnv::from_bindings([(
        "pair",
        Scheme::poly(
            vec![a, b],
            Ty::fun(vec![Ty::Var(a), Ty::Var(b), Ty::tuple(vec![Ty::Var(a), Ty::Var(b)])]),
        ),
    )]);
    let expr = letrec(
        "id",
        lam("x", var("x")),
        app(
            app(lit("pair"), app(var("id"), float_lit("1"))),
            app(var("id"), bool_lit("true")),
        ),
    );
    assert_eq!(infer_display(&env, &expr), "(Float, Bool)");
}

/// Test 10: a lambda parameter stays monomorphic inside its own body,
/// even through an inner let.
#[test]
fn lambda_param_cannot_be_used_at_two_types() {
    // λf. pair (f 1) (f true) needs f at Float and Bool at once
    let (a, b) = (TyVar(0), TyVar(1));
    let env = TypeEnv::from_bindings([(
        "pair",
        Scheme::poly(
            vec![a, b],
            Ty::fun(vec![Ty::Var(a), Ty::Var(b), Ty::tuple(vec![Ty::Var(a), Ty::Var(b)])]),
        ),
    )]);
    let expr = lam(
        "f",
        app(
            app(lit("pair"), app(var("f"), float_lit("1"))),
            app(var("f"), bool_lit("true")),
        ),
    );
    let err = infer(&env, &expr).unwrap_err();
    assert!(matches!(err, TypeError::Mismatch { .. }), "got: {}", err);

    // rebinding the parameter through a let does not launder the pin
    let expr = lam("x", let_("y", var("x"), var("y")));
    assert_eq!(infer_display(&env, &expr), "∀a. a → a");
}

/// Test 11: inner bindings shadow outer ones and a let definition never
/// sees its own binding.
#[test]
fn let_scoping_and_shadowing() {
    let expr = let_("x", float_lit("1"), let_("x", bool_lit("true"), var("x")));
    assert_eq!(infer_display(&TypeEnv::new(), &expr), "Bool");

    let expr = let_("x", var("x"), float_lit("1"));
    let err = infer(&TypeEnv::new(), &expr).unwrap_err();
    match err {
        TypeError::UnboundVariable { name } => assert_eq!(name, "x"),
        other => panic!("expected unbound variable, got: {}", other),
    }
}

/// Test 12: referencing an identifier absent from the environment fails
/// with a descriptive error rather than a panic.
#[test]
fn unbound_variable_reports_its_name() {
    let err = infer(&TypeEnv::new(), &var("undefined_name")).unwrap_err();
    match err {
        TypeError::UnboundVariable { name } => assert_eq!(name, "undefined_name"),
        other => panic!("expected unbound variable, got: {}", other),
    }
}

/// Test 13: self-application trips the occurs check.
#[test]
fn self_application_is_an_infinite_type() {
    let expr = lam("x", app(var("x"), var("x")));
    let err = infer(&TypeEnv::new(), &expr).unwrap_err();
    assert!(matches!(err, TypeError::InfiniteType { .. }), "got: {}", err);
}

/// Test 14: applying a non-function is rejected.
#[test]
fn applying_a_constant_fails() {
    let expr = app(float_lit("1"), float_lit("2"));
    let err = infer(&TypeEnv::new(), &expr).unwrap_err();
    assert!(matches!(err, TypeError::NotUnifiable { .. }), "got: {}", err);
}

/// Test 15: standalone unification of two distinct constants reports a
/// mismatch.
#[test]
fn distinct_constants_do_not_unify() {
    let err = unify(&Ty::float(), &Ty::bool()).unwrap_err();
    match err {
        TypeError::Mismatch { expected, found } => {
            assert_eq!(expected, Ty::float());
            assert_eq!(found, Ty::bool());
        }
        other => panic!("expected mismatch, got: {}", other),
    }
}

/// Test 16: monomorphic recursion types; the recursive call uses the
/// placeholder, not a generalized scheme.
#[test]
fn letrec_recursion_is_monomorphic_in_def() {
    // letrec loop = λn. loop (isZero n) in loop: the recursive call
    // forces n : Bool and the result open
    let env = prelude();
    let expr = letrec(
        "loop",
        lam("n", app(var("loop"), app(lit("isZero"), var("n")))),
        var("loop"),
    );
    // isZero needs Float but the recursive call feeds Bool back in
    let err = infer(&env, &expr).unwrap_err();
    assert!(matches!(err, TypeError::Mismatch { .. }), "got: {}", err);
}

/// Test 17: independent top-level inference runs over one shared
/// environment agree with the sequential result.
#[test]
fn parallel_inference_is_consistent() {
    let env = prelude();
    let sequential = infer_display(&env, &factorial());

    std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for _ in 0..4 {
            let env = &env;
            handles.push(scope.spawn(move || {
                let fac = format!("{}", infer(env, &factorial()).expect("factorial types"));
                let id = format!("{}", infer(env, &lam("x", var("x"))).expect("identity types"));
                (fac, id)
            }));
        }
        for handle in handles {
            let (fac, id) = handle.join().expect("inference thread");
            assert_eq!(fac, sequential);
            assert_eq!(id, "∀a. a → a");
        }
    });
}
