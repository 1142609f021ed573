use super::*;
use pdx_parse::Parser;
use pdx_tokenizer::Profile;
use pdx_tree::{
    Comment, Commented, Date, Item, Object, Operator, Pair, Scalar, ScalarValue, Text, TopLevel,
    Value,
};
use proptest::prelude::*;

/// A bare string that cannot be mistaken for a number or date
fn ident() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z_][a-z0-9_]{0,8}").unwrap()
}

fn comment() -> impl Strategy<Value = Comment> {
    prop::string::string_regex("[a-z]{1,6}( [a-z]{1,6}){0,2}")
        .unwrap()
        .prop_map(|s| Comment::new(&s))
}

fn comments() -> impl Strategy<Value = Vec<Comment>> {
    prop::collection::vec(comment(), 0..2)
}

fn scalar_value() -> impl Strategy<Value = ScalarValue> {
    prop_oneof![
        ident().prop_map(|s| ScalarValue::from(Text::new(s))),
        prop::string::string_regex("[a-zA-Z ]{0,12}")
            .unwrap()
            .prop_map(|s| ScalarValue::from(Text::quoted(s))),
        any::<i32>().prop_map(|i| ScalarValue::from(i64::from(i))),
        (0..2000i32, 1..13i32, 1..29i32).prop_map(|(y, m, d)| ScalarValue::from(Date::new(y, m, d))),
    ]
}

fn key() -> impl Strategy<Value = Scalar> {
    (comments(), scalar_value()).prop_map(|(pre, value)| Commented {
        value,
        pre_comments: pre,
        post_comment: None,
    })
}

fn operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Assign),
        Just(Operator::Equal),
        Just(Operator::Less),
        Just(Operator::LessEqual),
        Just(Operator::Greater),
        Just(Operator::GreaterEqual),
    ]
}

fn pair(value: impl Strategy<Value = Value>) -> impl Strategy<Value = Pair> {
    (key(), operator(), value).prop_map(|(key, op, value)| Pair {
        key,
        op: Commented::new(op),
        value,
    })
}

fn value() -> impl Strategy<Value = Value> {
    let leaf = (comments(), scalar_value(), prop::option::of(comment())).prop_map(
        |(pre, value, post)| {
            Value::Scalar(Commented {
                value,
                pre_comments: pre,
                post_comment: post,
            })
        },
    );
    leaf.prop_recursive(3, 32, 4, |inner| {
        let item = prop_oneof![
            pair(inner.clone()).prop_map(Item::Pair),
            inner.prop_map(Item::Value),
        ];
        (
            comments(),
            prop::collection::vec(item, 0..4),
            comments(),
            prop::option::of(comment()),
        )
            .prop_map(|(open_pre, items, close_pre, close_post)| {
                let mut object = Object::new(items);
                object.open.pre_comments = open_pre;
                object.close.pre_comments = close_pre;
                object.close.post_comment = close_post;
                Value::Object(object)
            })
    })
}

fn toplevel() -> impl Strategy<Value = TopLevel> {
    (prop::collection::vec(pair(value()), 0..5), comments()).prop_map(|(pairs, post)| {
        let mut top = TopLevel::new(pairs);
        top.post_comments = post;
        top
    })
}

fn options() -> impl Strategy<Value = FormatOptions> {
    prop_oneof![
        Just(FormatOptions::default()),
        Just(FormatOptions::default().spaces(4).wrap_column(40)),
        Just(FormatOptions::default().newlines_to_depth(1).no_fold_to_depth(0)),
    ]
}

proptest! {
    /// Printing and re-parsing gives back the same tree
    #[test]
    fn print_preserves_tree(tree in toplevel(), options in options()) {
        let printed = format_tree(&tree, &options);
        let reparsed = Parser::new(&printed, Profile::Full).parse();
        prop_assert!(reparsed.is_ok(), "printed output does not parse:\n{}", printed);
        let reparsed = reparsed.unwrap();
        prop_assert_eq!(&reparsed, &tree, "tree changed; printed:\n{}", printed);
    }

    /// Printed output is a fixed point of parse-then-print
    #[test]
    fn print_is_idempotent(tree in toplevel(), options in options()) {
        let once = format_tree(&tree, &options);
        let twice = format_source(&once, &options);
        prop_assert!(twice.is_ok(), "printed output does not parse:\n{}", once);
        prop_assert_eq!(twice.unwrap(), once);
    }

    /// Output never carries trailing blanks
    #[test]
    fn no_trailing_whitespace(tree in toplevel(), options in options()) {
        let printed = format_tree(&tree, &options);
        for line in printed.lines() {
            prop_assert_eq!(line.trim_end(), line);
        }
    }
}
