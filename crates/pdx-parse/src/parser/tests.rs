use super::*;
use pdx_testhelpers::init_tracing;

fn full(source: &str) -> TopLevel {
    init_tracing();
    Parser::new(source, Profile::Full)
        .parse()
        .unwrap_or_else(|e| panic!("{}", e.render("test.txt", source)))
}

fn simple(source: &str) -> TopLevel {
    init_tracing();
    Parser::new(source, Profile::Simple).parse().unwrap()
}

fn error_kind(source: &str) -> ParseErrorKind {
    init_tracing();
    Parser::new(source, Profile::Full).parse().unwrap_err().kind
}

fn texts(comments: &[Comment]) -> Vec<&str> {
    comments.iter().map(Comment::text).collect()
}

#[test]
fn test_empty_file() {
    let top = full("");
    assert!(top.is_empty());
    assert!(top.post_comments.is_empty());
}

#[test]
fn test_pairs_and_scalar_types() {
    let top = full("name = \"Charles\"\nage = 32\nwealth = -1.50\nborn = 1066.9.14\nflag = yes\n");
    assert_eq!(top.len(), 5);
    assert_eq!(top.get("name").and_then(Value::as_str), Some("Charles"));
    assert_eq!(top.get("age").and_then(Value::as_i64), Some(32));
    assert_eq!(top.get("wealth").and_then(Value::as_f64), Some(-1.5));
    assert_eq!(top.get("born").and_then(Value::as_date), Some(Date::new(1066, 9, 14)));
    assert_eq!(top.get("flag").and_then(Value::as_str), Some("yes"));

    let Some(Value::Scalar(Scalar {
        value: ScalarValue::Number(n),
        ..
    })) = top.get("wealth")
    else {
        panic!("wealth is not a number");
    };
    assert_eq!(n.text(), "-1.50");
}

#[test]
fn test_quoted_strings_remember_quotes() {
    let top = full("a = \"x\"\nb = x\n");
    let quoted = |key: &str| match top.get(key) {
        Some(Value::Scalar(Scalar {
            value: ScalarValue::String(t),
            ..
        })) => t.force_quote,
        other => panic!("unexpected {other:?}"),
    };
    assert!(quoted("a"));
    assert!(!quoted("b"));
}

#[test]
fn test_multiline_quoted_string() {
    let top = full("desc = \"line one\nline two\"\n");
    assert_eq!(top.get("desc").and_then(Value::as_str), Some("line one\nline two"));
}

#[test]
fn test_operators() {
    let top = full("a >= 5\nb < 3\nc == d\n");
    let ops: Vec<_> = top.pairs().map(|p| p.op.value).collect();
    assert_eq!(
        ops,
        vec![Operator::GreaterEqual, Operator::Less, Operator::Equal]
    );
}

#[test]
fn test_nested_objects_and_bare_values() {
    let top = full("root = {\n\tlist = { 1 2 3 }\n\tinner = { x = y }\n\t{ nested = 1 }\n}\n");
    let root = top.get("root").and_then(Value::as_object).unwrap();
    assert_eq!(root.len(), 3);
    let list = root.get("list").and_then(Value::as_object).unwrap();
    let values: Vec<_> = list.iter().filter_map(|i| i.value().as_i64()).collect();
    assert_eq!(values, vec![1, 2, 3]);
    assert!(!list.has_pairs());
    assert!(matches!(&root.items()[2], Item::Value(Value::Object(_))));
}

#[test]
fn test_last_wins_lookup_keeps_all_items() {
    let top = full("a=1 a=2");
    assert_eq!(top.len(), 2);
    assert_eq!(top.get("a").and_then(Value::as_i64), Some(2));
}

#[test]
fn test_comment_attachment() {
    let source = "\
# header
# second

a = 1 # trailing
b = {
\t# inside
\tc = d
\t# closing
} # after brace
# end of file
";
    let top = full(source);
    let a = top.pair("a").unwrap();
    assert_eq!(texts(a.pre_comments()), vec!["header", "second"]);
    assert_eq!(a.post_comment().map(Comment::text), Some("trailing"));

    let b = top.pair("b").unwrap();
    assert!(b.pre_comments().is_empty());
    let obj = b.value.as_object().unwrap();
    assert_eq!(texts(obj.pair("c").unwrap().pre_comments()), vec!["inside"]);
    assert_eq!(texts(&obj.close.pre_comments), vec!["closing"]);
    assert_eq!(
        obj.close.post_comment.as_ref().map(Comment::text),
        Some("after brace")
    );
    assert_eq!(texts(&top.post_comments), vec!["end of file"]);
}

#[test]
fn test_comment_after_open_brace() {
    let top = full("a = { # note\n\tb = c\n}\n");
    let obj = top.get("a").and_then(Value::as_object).unwrap();
    assert_eq!(obj.open.post_comment.as_ref().map(Comment::text), Some("note"));
    assert!(!obj.pair("b").unwrap().has_comments());
}

#[test]
fn test_operator_on_next_line() {
    let top = full("a\n= b\n");
    assert_eq!(top.get("a").and_then(Value::as_str), Some("b"));
}

#[test]
fn test_comment_only_file() {
    let top = full("# just a comment\n#\n");
    assert!(top.is_empty());
    assert_eq!(texts(&top.post_comments), vec!["just a comment", ""]);
}

#[test]
fn test_simple_profile_drops_comments() {
    let top = simple("# c\na = { b = 1 } # d\nc = 2.5.1\n");
    assert!(!top.has_comments());
    assert_eq!(top.get("c").and_then(Value::as_date), Some(Date::new(2, 5, 1)));
    assert_eq!(
        top.get("a")
            .and_then(Value::as_object)
            .and_then(|o| o.get("b"))
            .and_then(Value::as_i64),
        Some(1)
    );
}

#[test]
fn test_number_followed_by_letters() {
    // `1.5x` lexes as the number `1` and the name `.5x`
    let top = full("a = { 1.5x }");
    let obj = top.get("a").and_then(Value::as_object).unwrap();
    assert_eq!(obj.items()[0].value().as_i64(), Some(1));
    assert_eq!(obj.items()[1].value().as_str(), Some(".5x"));
}

#[test]
fn test_unclosed_object() {
    assert_eq!(error_kind("a = {\n\tb = c\n"), ParseErrorKind::UnclosedObject);

    let top = Parser::new("a = {\n\tb = c\n# dangling\n", Profile::Full)
        .strict(false)
        .parse()
        .unwrap();
    let obj = top.get("a").and_then(Value::as_object).unwrap();
    assert_eq!(obj.get("b").and_then(Value::as_str), Some("c"));
    assert_eq!(texts(&obj.close.pre_comments), vec!["dangling"]);
}

#[test]
fn test_errors() {
    assert_eq!(error_kind("a b"), ParseErrorKind::ExpectedOperator);
    assert_eq!(error_kind("a"), ParseErrorKind::UnexpectedEof);
    assert_eq!(error_kind("a ="), ParseErrorKind::UnexpectedEof);
    assert_eq!(error_kind("= b"), ParseErrorKind::ExpectedKey);
    assert_eq!(error_kind("a = { = }"), ParseErrorKind::ExpectedKey);
    assert_eq!(error_kind("a = b }"), ParseErrorKind::ExpectedKey);
    assert_eq!(error_kind("a = \"open"), ParseErrorKind::InvalidInput);
}

#[test]
fn test_error_span_points_at_token() {
    let source = "a = 1\nb c";
    let err = Parser::new(source, Profile::Full).parse().unwrap_err();
    assert_eq!(err.span.slice(source), "c");
    assert_eq!(err.span.line_col(source), (2, 3));
}

#[test]
fn test_crlf_input() {
    let top = full("a = 1\r\n# c\r\nb = 2\r\n");
    assert_eq!(top.len(), 2);
    assert_eq!(texts(top.pair("b").unwrap().pre_comments()), vec!["c"]);
}
