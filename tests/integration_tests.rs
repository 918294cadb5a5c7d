//! End-to-end compilation tests.
//!
//! Every test builds a syntax tree with [`AstBuilder`], compiles it through
//! the [`Compiler`] facade and inspects the resulting IR.

use std::sync::Arc;

use edgeql::compiler::ir::{Expr, Value};
use edgeql::compiler::{CompilationContext, stmt};
use edgeql::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn test_schema() -> Schema {
    let mut builder = SchemaBuilder::with_std();
    builder
        .object_type("test::Issue")
        .property("number", "std::str", PointerFlags::REQUIRED)
        .property("body", "std::str", PointerFlags::empty())
        .link("owner", "test::User", PointerFlags::REQUIRED)
        .link("time_spent_log", "test::LogEntry", PointerFlags::MULTI)
        .register()
        .unwrap();
    builder
        .object_type("test::User")
        .property("name", "std::str", PointerFlags::REQUIRED)
        .property("age", "std::int", PointerFlags::empty())
        .property("active", "std::bool", PointerFlags::REQUIRED)
        .link("friends", "test::User", PointerFlags::MULTI)
        .register()
        .unwrap();
    builder
        .object_type("test::LogEntry")
        .property("spent_time", "std::int", PointerFlags::REQUIRED)
        .register()
        .unwrap();
    builder.build().unwrap()
}

fn compiler() -> Compiler {
    Compiler::new(Arc::new(test_schema()))
}

fn compilation_error(err: Error) -> CompilationError {
    match err {
        Error::Compilation(err) => err,
        Error::Schema(err) => panic!("unexpected schema error: {err}"),
    }
}

fn set_type(query: &CompiledQuery, id: SetId) -> TypeId {
    query.set(id).expect("set exists").stype
}

// ============================================================================
// Clauses
// ============================================================================

#[test]
fn filter_on_boolean_property() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let stmt = b
        .select(b.path("test::User", &[]))
        .filter(b.partial_path(&["active"]))
        .statement();

    let query = compiler().compile(&stmt).unwrap();
    let filter = query.stmt.filter.expect("filter compiled");
    assert_eq!(set_type(&query, filter), std_types::BOOL);
    assert_eq!(query.cardinality(), Cardinality::Many);
}

#[test]
fn filter_on_integer_literal_fails() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let literal = b.int(1);
    let stmt = b.select(b.path("test::User", &[])).filter(literal).statement();

    let err = compilation_error(compiler().compile(&stmt).unwrap_err());
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.span(), literal.span());
    assert!(err.to_string().contains("expected boolean"), "{err}");
}

#[test]
fn order_by_keeps_key_order_and_modifiers() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let stmt = b
        .select(b.path("test::User", &[]))
        .order_by(&[
            b.sort(b.partial_path(&["name"]), SortDirection::Asc, None),
            b.sort(
                b.partial_path(&["age"]),
                SortDirection::Desc,
                Some(NonesOrder::Last),
            ),
        ])
        .statement();

    let query = compiler().compile(&stmt).unwrap();
    let keys = &query.stmt.order_by;
    assert_eq!(keys.len(), 2);
    assert_eq!(set_type(&query, keys[0].expr), std_types::STR);
    assert_eq!(keys[0].direction, SortDirection::Asc);
    assert_eq!(keys[0].nones_order, None);
    assert_eq!(set_type(&query, keys[1].expr), std_types::INT);
    assert_eq!(keys[1].direction, SortDirection::Desc);
    assert_eq!(keys[1].nones_order, Some(NonesOrder::Last));
}

#[test]
fn order_by_multi_link_is_rejected() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let stmt = b
        .select(b.path("test::User", &[]))
        .order_by(&[b.sort(b.partial_path(&["friends", "name"]), SortDirection::Asc, None)])
        .statement();

    let err = compilation_error(compiler().compile(&stmt).unwrap_err());
    assert_eq!(err.kind(), ErrorKind::CardinalityViolation);
    assert!(err.to_string().contains("ORDER BY clause"), "{err}");
}

#[test]
fn limit_is_an_integer_set() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let stmt = b.select(b.path("test::User", &[])).limit(b.int(10)).statement();

    let query = compiler().compile(&stmt).unwrap();
    let limit = query.stmt.limit.expect("limit compiled");
    assert_eq!(set_type(&query, limit), std_types::INT);
    assert_eq!(query.stmt.offset, None);
    assert_eq!(query.cardinality(), Cardinality::Many);

    let stmt = b.select(b.path("test::User", &[])).statement();
    let query = compiler().compile(&stmt).unwrap();
    assert_eq!(query.stmt.limit, None);
}

#[test]
fn offset_is_an_integer_set() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let operand = b.path("test::User", &["age"]);
    let stmt = b.select(b.path("test::User", &[])).offset(operand).statement();

    let query = compiler().compile(&stmt).unwrap();
    let offset = query.set(query.stmt.offset.expect("offset compiled")).unwrap();
    assert_eq!(offset.stype, std_types::INT);
    assert_eq!(offset.span, operand.span());
    assert_eq!(query.stmt.limit, None);
    assert_eq!(query.cardinality(), Cardinality::Many);

    let literal = b.string("10");
    let stmt = b.select(b.path("test::User", &[])).offset(literal).statement();
    let err = compilation_error(compiler().compile(&stmt).unwrap_err());
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.span(), literal.span());
    assert!(err.to_string().contains("in OFFSET clause"), "{err}");
}

#[test]
fn limit_one_is_at_most_one() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let stmt = b
        .select(b.path("test::User", &[]))
        .offset(b.int(5))
        .limit(b.int(1))
        .statement();

    let query = compiler().compile(&stmt).unwrap();
    assert_eq!(query.cardinality(), Cardinality::AtMostOne);
}

#[test]
fn implicit_limit_applies_only_without_limit() {
    let schema = Arc::new(test_schema());
    let compiler = Compiler::with_options(schema, CompileOptions::new().with_implicit_limit(100));

    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let query = compiler
        .compile(&b.select(b.path("test::User", &[])).statement())
        .unwrap();
    let limit = query.set(query.stmt.limit.expect("implicit limit")).unwrap();
    assert!(matches!(limit.expr, SetExpr::Expr(Expr::Constant(Value::Int(100)))));

    let query = compiler
        .compile(&b.select(b.path("test::User", &[])).limit(b.int(3)).statement())
        .unwrap();
    let limit = query.set(query.stmt.limit.unwrap()).unwrap();
    assert!(matches!(limit.expr, SetExpr::Expr(Expr::Constant(Value::Int(3)))));
}

// ============================================================================
// Paths and shapes
// ============================================================================

#[test]
fn repeated_paths_in_a_computable_share_one_set() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let twice = b.binary(
        b.path("test::Issue", &["number"]),
        BinaryOp::Concat,
        b.path("test::Issue", &["number"]),
    );
    let stmt = b
        .select(b.path("test::Issue", &[]))
        .shape(&[b.pointer("number"), b.computable("twice", twice)])
        .statement();

    let query = compiler().compile(&stmt).unwrap();
    let element = &query.stmt.shape[1];
    assert_eq!(element.name, "twice");
    let SetExpr::Expr(Expr::BinOp { left, right, .. }) = &query.set(element.set).unwrap().expr
    else {
        panic!("expected a concatenation");
    };
    assert_eq!(left, right);

    // The path prefix is the statement result.
    let SetExpr::Step { source, .. } = &query.set(*left).unwrap().expr else {
        panic!("expected a path step");
    };
    assert_eq!(*source, query.stmt.result);
}

#[test]
fn aggregate_computable_is_a_singleton() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let total = b.call(
        "sum",
        &[b.path("test::Issue", &["time_spent_log", "spent_time"])],
    );
    let stmt = b
        .select(b.path("test::Issue", &[]))
        .shape(&[
            b.pointer("number"),
            b.pointer_with_shape("owner", &[b.pointer("name")]),
            b.computable("total_time_spent", total),
        ])
        .statement();

    let query = compiler().compile(&stmt).unwrap();
    let total = query.set(query.stmt.shape[2].set).unwrap();
    assert_eq!(total.stype, std_types::INT);
    assert_eq!(total.cardinality, Cardinality::One);

    let owner = &query.stmt.shape[1];
    assert!(!owner.computable);
    assert_eq!(set_type(&query, owner.set), TypeId::from_name("test::User"));
    assert_eq!(owner.elements[0].name, "name");
}

#[test]
fn filter_on_correlated_path_is_singleton() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let stmt = b
        .select(b.path("test::Issue", &[]))
        .filter(b.binary(b.path("test::Issue", &["number"]), BinaryOp::Eq, b.string("1")))
        .statement();

    let query = compiler().compile(&stmt).unwrap();
    let filter = query.set(query.stmt.filter.unwrap()).unwrap();
    assert_eq!(filter.stype, std_types::BOOL);
    assert_eq!(filter.cardinality, Cardinality::One);
}

// ============================================================================
// Name resolution
// ============================================================================

#[test]
fn module_alias_and_default_module() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let compiler = compiler();

    let aliased = b
        .select(b.path("t::Issue", &[]))
        .with_alias("t", "test")
        .statement();
    let query = compiler.compile(&aliased).unwrap();
    assert_eq!(
        query.result().unwrap().stype,
        TypeId::from_name("test::Issue")
    );

    let defaulted = b.select(b.path("Issue", &[])).with_module("test").statement();
    let query = compiler.compile(&defaulted).unwrap();
    assert_eq!(
        query.result().unwrap().stype,
        TypeId::from_name("test::Issue")
    );

    let with_options = Compiler::with_options(
        compiler.schema().clone(),
        CompileOptions::new().with_default_module("test"),
    );
    assert!(with_options.compile(&b.select(b.path("User", &[])).statement()).is_ok());
}

#[test]
fn unknown_names_fail_with_name_resolution() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let compiler = compiler();

    let err = compilation_error(
        compiler
            .compile(&b.select(b.path("test::Missing", &[])).statement())
            .unwrap_err(),
    );
    assert_eq!(err.kind(), ErrorKind::NameResolution);
    assert!(err.to_string().contains("'test::Missing'"), "{err}");

    let err = compilation_error(
        compiler
            .compile(&b.select(b.path("test::Issue", &["nope"])).statement())
            .unwrap_err(),
    );
    assert_eq!(err.kind(), ErrorKind::NameResolution);
}

#[test]
fn unknown_option_module_is_rejected() {
    let compiler = Compiler::with_options(
        Arc::new(test_schema()),
        CompileOptions::new().with_default_module("missing"),
    );
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let err = compilation_error(
        compiler
            .compile(&b.select(b.int(1)).statement())
            .unwrap_err(),
    );
    assert_eq!(err.kind(), ErrorKind::NameResolution);
}

// ============================================================================
// Context discipline
// ============================================================================

#[test]
fn failed_compilation_leaves_no_frames() {
    let schema = test_schema();
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());

    let select = b
        .select(b.path("test::User", &[]))
        .filter(b.partial_path(&["name"]))
        .build();
    assert!(stmt::compile_select(select, &mut ctx).is_err());
    assert_eq!(ctx.depth(), 0);
    assert_eq!(ctx.frame().scope, ctx.scopes().root());

    let select = b.select(b.path("test::User", &[])).build();
    assert!(stmt::compile_select(select, &mut ctx).is_ok());
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn schema_is_shared_across_threads() {
    let compiler = compiler();
    std::thread::scope(|s| {
        for _ in 0..4 {
            let compiler = compiler.clone();
            s.spawn(move || {
                let arena = Bump::new();
                let b = AstBuilder::new(&arena);
                let stmt = b
                    .select(b.path("test::User", &[]))
                    .filter(b.partial_path(&["active"]))
                    .limit(b.int(1))
                    .statement();
                let query = compiler.compile(&stmt).unwrap();
                assert_eq!(query.cardinality(), Cardinality::AtMostOne);
            });
        }
    });
}
