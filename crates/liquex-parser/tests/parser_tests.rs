//! Parser tests.
//!
//! Covers: property paths, indexing, method calls, ranges, membership,
//! filter chains, operator precedence and associativity, grouping, node
//! spans, compile errors (lex errors surfacing through the parser,
//! delimiters, trailing input, statement keywords, nesting limit), and
//! determinism.

use liquex_lexer::Lexer;
use liquex_parser::{parse, Parser, MAX_NESTING_DEPTH};
use liquex_types::ast::*;
use liquex_types::{CompileError, ErrorCategory, ErrorCode};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source, panicking on a compile error.
fn parse_ok(source: &str) -> Expr {
    match parse(source) {
        Ok(expr) => expr,
        Err(e) => panic!("unexpected compile error for {source:?}: {e}"),
    }
}

/// Parse source and render the tree in its parenthesised form.
fn show(source: &str) -> String {
    parse_ok(source).to_string()
}

/// Parse source, panicking if it compiles.
fn parse_err(source: &str) -> CompileError {
    match parse(source) {
        Ok(expr) => panic!("expected compile error for {source:?}, got {expr}"),
        Err(e) => e,
    }
}

fn nested_parens(depth: usize) -> String {
    format!("{}a{}", "(".repeat(depth), ")".repeat(depth))
}

// ─────────────────────────────────────────────────────────────────────
// Primaries
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_literals() {
    assert_eq!(parse_ok("42").kind, ExprKind::Literal(Literal::Int(42)));
    assert_eq!(parse_ok("-7").kind, ExprKind::Literal(Literal::Int(-7)));
    assert_eq!(parse_ok("2.5").kind, ExprKind::Literal(Literal::Float(2.5)));
    assert_eq!(parse_ok("true").kind, ExprKind::Literal(Literal::Bool(true)));
    assert_eq!(parse_ok("false").kind, ExprKind::Literal(Literal::Bool(false)));
    assert_eq!(parse_ok("nil").kind, ExprKind::Literal(Literal::Nil));
    assert_eq!(
        parse_ok(r#""a\tb""#).kind,
        ExprKind::Literal(Literal::String(r"a\tb".into()))
    );
}

#[test]
fn test_identifier() {
    assert_eq!(parse_ok("product").kind, ExprKind::Identifier("product".into()));
}

#[test]
fn test_grouping_produces_no_node() {
    let grouped = parse_ok("((a))");
    assert_eq!(grouped.kind, ExprKind::Identifier("a".into()));
    assert_eq!(grouped.node_count(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Postfix: property, index, method call
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_property_chain_is_left_nested() {
    let expr = parse_ok("a.b.c");
    let ExprKind::Property { object, name } = &expr.kind else {
        panic!("expected property, got {expr}");
    };
    assert_eq!(name.name, "c");
    let ExprKind::Property { object: inner, name } = &object.kind else {
        panic!("expected nested property");
    };
    assert_eq!(name.name, "b");
    assert_eq!(inner.kind, ExprKind::Identifier("a".into()));
}

#[test]
fn test_spaced_dot_is_property() {
    assert_eq!(show("a . b"), "a.b");
    assert_eq!(show("list . first"), "list.first");
    assert_eq!(show("obj . in"), "obj.in");
}

#[test]
fn test_property_on_number_via_dot() {
    assert_eq!(show("1.size"), "1.size");
}

#[test]
fn test_index() {
    assert_eq!(show("a[0]"), "a[0]");
    assert_eq!(show("a[b.c]"), "a[b.c]");
    assert_eq!(show("struct.ArrayOne[1]"), "struct.ArrayOne[1]");
    assert_eq!(show("'abc'[1]"), "\"abc\"[1]");
    assert_eq!(show("a[0][1].b"), "a[0][1].b");
}

#[test]
fn test_index_takes_full_expression() {
    assert_eq!(show("a[i or j]"), "a[(i or j)]");
}

#[test]
fn test_method_calls() {
    assert_eq!(show("m.M1()"), "m.M1()");
    assert_eq!(
        show(r#"struct.FunctionThree("chris", 57)"#),
        r#"struct.FunctionThree("chris", 57)"#
    );
    assert_eq!(show("a . f(1)"), "a.f(1)");
    assert_eq!(show("a.f(x).g(y).h"), "a.f(x).g(y).h");
}

#[test]
fn test_method_arguments_are_full_expressions() {
    assert_eq!(show("a.f(x == 1, y | upcase)"), "a.f((x == 1), (y | upcase))");
}

#[test]
fn test_method_call_node() {
    let expr = parse_ok("m.M2(1, 2)");
    let ExprKind::MethodCall { object, method, args } = &expr.kind else {
        panic!("expected method call, got {expr}");
    };
    assert_eq!(object.kind, ExprKind::Identifier("m".into()));
    assert_eq!(method.name, "M2");
    assert_eq!(args.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────
// Ranges & membership
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_range() {
    assert_eq!(show("(1..5)"), "(1..5)");
    assert_eq!(show("1..limit"), "(1..limit)");
    assert_eq!(show("(a.b..c[0])"), "(a.b..c[0])");
}

#[test]
fn test_range_binds_looser_than_filter() {
    assert_eq!(show("1..n | plus: 1"), "(1..(n | plus: 1))");
}

#[test]
fn test_contains_and_in() {
    assert_eq!(show("tags contains 'sale'"), "(tags contains \"sale\")");
    assert_eq!(show("x in list"), "(x in list)");
    assert_eq!(show("3 in (1..5)"), "(3 in (1..5))");
}

#[test]
fn test_membership_binds_tighter_than_comparison() {
    assert_eq!(show("a contains b == true"), "((a contains b) == true)");
}

// ─────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_filter_without_arguments() {
    assert_eq!(show("title | upcase"), "(title | upcase)");
}

#[test]
fn test_filter_chain_is_left_nested() {
    assert_eq!(show("x | f | g"), "((x | f) | g)");
}

#[test]
fn test_filter_arguments() {
    assert_eq!(
        show("x | append: 'a', b.c"),
        "(x | append: \"a\", b.c)"
    );
    assert_eq!(show("x | f: y | g"), "((x | f: y) | g)");
    assert_eq!(show("x | f: (a or b)"), "(x | f: (a or b))");
}

#[test]
fn test_filter_node() {
    let expr = parse_ok("price | times: 2");
    let ExprKind::Filter { input, name, args } = &expr.kind else {
        panic!("expected filter, got {expr}");
    };
    assert_eq!(input.kind, ExprKind::Identifier("price".into()));
    assert_eq!(name.name, "times");
    assert_eq!(args, &vec![Expr::new(ExprKind::Literal(Literal::Int(2)), args[0].span)]);
}

#[test]
fn test_filter_binds_tighter_than_comparison() {
    assert_eq!(show("a | size > 2"), "((a | size) > 2)");
}

// ─────────────────────────────────────────────────────────────────────
// Precedence & associativity
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_and_or_share_one_level() {
    assert_eq!(show("a or b and c"), "((a or b) and c)");
    assert_eq!(show("a and b or c"), "((a and b) or c)");
}

#[test]
fn test_grouping_overrides_precedence() {
    assert_eq!(show("a or (b and c)"), "(a or (b and c))");
}

#[test]
fn test_comparison_binds_tighter_than_logical() {
    assert_eq!(show("a == b or c != d"), "((a == b) or (c != d))");
}

#[test]
fn test_comparison_operators() {
    assert_eq!(show("a == b"), "(a == b)");
    assert_eq!(show("a != b"), "(a != b)");
    assert_eq!(show("a <> b"), "(a != b)");
    assert_eq!(show("a < b"), "(a < b)");
    assert_eq!(show("a > b"), "(a > b)");
    assert_eq!(show("a <= b"), "(a <= b)");
    assert_eq!(show("a >= b"), "(a >= b)");
}

#[test]
fn test_comparisons_are_left_associative() {
    assert_eq!(show("a < b < c"), "((a < b) < c)");
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_root_span_covers_expression() {
    let expr = parse_ok("  a.b.c  ");
    assert_eq!(expr.span.offset, 2);
    assert_eq!(expr.span.len, 5);
    assert_eq!(expr.span.col, 3);
}

#[test]
fn test_property_name_span_excludes_dot() {
    let expr = parse_ok("a.bc");
    let ExprKind::Property { name, .. } = &expr.kind else {
        panic!("expected property");
    };
    assert_eq!(name.span.offset, 2);
    assert_eq!(name.span.len, 2);
    assert_eq!(name.span.col, 3);
}

#[test]
fn test_method_call_span_includes_parens() {
    let expr = parse_ok("m.f(1)");
    assert_eq!(expr.span.len, 6);
}

#[test]
fn test_filter_span_includes_last_argument() {
    let expr = parse_ok("x | append: 'abc'");
    assert_eq!(expr.span.end(), 17);
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_source() {
    let err = parse_err("");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(err.expected.contains(&"identifier".to_string()));
}

#[test]
fn test_trailing_input() {
    let err = parse_err("a b");
    assert_eq!(err.code, ErrorCode::TRAILING_INPUT);
    assert_eq!(err.span.col, 3);
    assert_eq!(
        err.to_string(),
        "1:3: E152 [parse] unexpected 'b' after expression (expected end of input)"
    );
}

#[test]
fn test_unclosed_paren() {
    let err = parse_err("(a or b");
    assert_eq!(err.code, ErrorCode::UNMATCHED_DELIMITER);
    assert_eq!(err.expected, vec![")".to_string()]);
}

#[test]
fn test_unclosed_bracket() {
    assert_eq!(parse_err("a[0").code, ErrorCode::UNMATCHED_DELIMITER);
}

#[test]
fn test_stray_closing_delimiter() {
    assert_eq!(parse_err("a)").code, ErrorCode::UNMATCHED_DELIMITER);
    assert_eq!(parse_err("a]").code, ErrorCode::UNMATCHED_DELIMITER);
}

#[test]
fn test_wrong_closing_delimiter() {
    let err = parse_err("(a]");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(err.expected, vec![")".to_string()]);
}

#[test]
fn test_trailing_comma_rejected() {
    assert_eq!(parse_err("a.f(1,)").code, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn test_missing_filter_name() {
    let err = parse_err("x |");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(err.expected, vec!["filter name".to_string()]);
}

#[test]
fn test_dangling_dot() {
    let err = parse_err("a.");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(err.expected, vec!["property name".to_string()]);
}

#[test]
fn test_range_does_not_chain() {
    assert_eq!(parse_err("1..2..3").code, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn test_statement_keywords_rejected() {
    for source in ["cycle", "loop", "a == when", "x | f: assign"] {
        let err = parse_err(source);
        assert_eq!(err.code, ErrorCode::STATEMENT_KEYWORD, "{source}");
        assert_eq!(err.category, ErrorCategory::Parse);
    }
}

#[test]
fn test_lex_errors_surface_unchanged() {
    let err = parse_err("name == 'abc");
    assert_eq!(err.code, ErrorCode::UNTERMINATED_STRING);
    assert!(err.is_lex_error());
    assert_eq!(err.span.offset, 8);

    assert_eq!(
        parse_err("a == 99999999999999999999").code,
        ErrorCode::NUMERIC_OVERFLOW
    );
    assert_eq!(parse_err("12abc").code, ErrorCode::MALFORMED_NUMBER);
    assert_eq!(parse_err("a \u{1} b").code, ErrorCode::UNEXPECTED_CHARACTER);
}

#[test]
fn test_lex_error_has_no_expected_set() {
    let err = parse_err(r#"a | "abc"#);
    assert_eq!(err.code, ErrorCode::UNTERMINATED_STRING);
    assert!(err.expected.is_empty());
    assert_eq!(err.message, "unterminated string literal");

    for source in ["(a 'open", "a . 'open", "a.f(1, 2abc", "a | f: 'x' 'open", "'open"] {
        let err = parse_err(source);
        assert!(err.is_lex_error(), "{source}");
        assert!(err.expected.is_empty(), "{source}: {:?}", err.expected);
    }
}

#[test]
fn test_lex_error_after_complete_expression() {
    // The trailing-input check reports the lex error, not the position.
    assert_eq!(parse_err("a 'open").code, ErrorCode::UNTERMINATED_STRING);
}

#[test]
fn test_error_carries_source_line() {
    let err = parse_err("a ==\n  )");
    assert_eq!(err.span.line, 2);
    assert_eq!(err.span.col, 3);
    assert_eq!(err.source_line, "  )");
}

#[test]
fn test_nesting_limit() {
    let depth = MAX_NESTING_DEPTH as usize;
    assert_eq!(parse_ok(&nested_parens(depth - 1)).kind, ExprKind::Identifier("a".into()));
    assert_eq!(parse_err(&nested_parens(depth)).code, ErrorCode::NESTING_TOO_DEEP);
    assert_eq!(parse_err(&nested_parens(500)).code, ErrorCode::NESTING_TOO_DEEP);
}

#[test]
fn test_nesting_limit_through_index() {
    let source = format!("{}0{}", "a[".repeat(100), "]".repeat(100));
    assert_eq!(parse_err(&source).code, ErrorCode::NESTING_TOO_DEEP);
}

#[test]
fn test_nesting_limit_counts_property_links() {
    let depth = MAX_NESTING_DEPTH as usize;
    let expr = parse_ok(&format!("a{}", ".b".repeat(depth - 1)));
    assert_eq!(expr.node_count(), depth);

    let err = parse_err(&format!("a{}", ".b".repeat(depth)));
    assert_eq!(err.code, ErrorCode::NESTING_TOO_DEEP);
    // Reported at the first link past the limit.
    assert_eq!(err.span.offset, 1 + 2 * (depth as u32 - 1));
}

#[test]
fn test_nesting_limit_counts_filter_links() {
    let depth = MAX_NESTING_DEPTH as usize;
    parse_ok(&format!("'x'{}", " | upcase".repeat(depth - 1)));
    assert_eq!(
        parse_err(&format!("'x'{}", " | upcase".repeat(depth))).code,
        ErrorCode::NESTING_TOO_DEEP
    );
}

#[test]
fn test_long_chains_are_rejected() {
    let sources = [
        format!("a{}", ".b".repeat(10_000)),
        format!("a{}", "[0]".repeat(10_000)),
        format!("a{}", ".f()".repeat(10_000)),
        format!("'x'{}", " | upcase".repeat(10_000)),
        format!("'x'{}", " | append: y.z".repeat(10_000)),
        format!("a{}", " or b".repeat(10_000)),
        format!("1{}", " == 1".repeat(10_000)),
        format!("a{}", " contains b".repeat(10_000)),
    ];
    for source in &sources {
        let err = parse_err(source);
        assert_eq!(err.code, ErrorCode::NESTING_TOO_DEEP, "{}", &source[..20]);
    }
}

#[test]
fn test_nesting_shared_between_chains_and_groups() {
    // Links inside a group add to the levels the group already holds.
    let half = MAX_NESTING_DEPTH as usize / 2;
    let source = format!("{}a{}{}", "(".repeat(half), ".b".repeat(half), ")".repeat(half));
    assert_eq!(parse_err(&source).code, ErrorCode::NESTING_TOO_DEEP);
    let source = format!("{}a{}{}", "(".repeat(half), ".b".repeat(half - 1), ")".repeat(half));
    parse_ok(&source);

    // A group's levels are released once it closes.
    let source = format!("{}a{}{}", "(".repeat(half), ")".repeat(half), ".b".repeat(half));
    parse_ok(&source);
}

// ─────────────────────────────────────────────────────────────────────
// Entry points
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parser_from_lexer() {
    let expr = Parser::from_lexer(Lexer::new("a | f")).parse().unwrap();
    assert_eq!(expr.to_string(), "(a | f)");
}

#[test]
fn test_parser_from_exhausted_lexer() {
    let mut lexer = Lexer::new("a");
    while lexer.next().is_some() {}
    assert_eq!(
        Parser::from_lexer(lexer).parse().unwrap_err().code,
        ErrorCode::UNEXPECTED_TOKEN
    );
}

// ─────────────────────────────────────────────────────────────────────
// 100-iteration determinism test
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parser_determinism_100_iterations() {
    let source = r#"product.variants[0].price >= 10.5 and tags contains "sale" or (1..limit) | join: ", ""#;
    let first = parse_ok(source);
    for i in 0..100 {
        let again = parse_ok(source);
        assert_eq!(first, again, "Determinism failure at iteration {i}");
    }
}
