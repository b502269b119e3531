// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use super::*;

fn parse(input: &str) -> Expr {
    TemplateExprParser::new().parse(input).unwrap()
}

fn string(value: &str) -> Expr {
    Expr::String(ExprString {
        value: Rc::new(value.to_string()),
    })
}

fn var(name: &str) -> Expr {
    Expr::Var(ExprIdent { name: name.to_string() })
}

#[test]
fn string_simple() {
    assert_eq!(parse(r#" "hello" "#), string("hello"));
}

#[test]
fn string_single_quoted() {
    assert_eq!(parse(r#"'say "hi"'"#), string("say \"hi\""));
    assert_eq!(parse(r"'it\'s'"), string("it's"));
}

#[test]
fn string_escapes() {
    assert_eq!(parse(r#""a\"b\nA""#), string("a\"b\nA"));
}

#[test]
fn numbers() {
    assert_eq!(parse("42"), Expr::Integer(ExprInteger { value: 42 }));
    assert_eq!(parse("-7"), Expr::Integer(ExprInteger { value: -7 }));
    assert_eq!(
        parse("1.5e3"),
        Expr::Real(ExprReal {
            value: Rc::new("1.5e3".to_string())
        })
    );
}

#[test]
fn keywords() {
    assert_eq!(parse("true"), Expr::True);
    assert_eq!(parse("false"), Expr::False);
    assert_eq!(parse("null"), Expr::Null);
    assert_eq!(parse("true_value"), var("true_value"));
}

#[test]
fn call_with_args() {
    assert_eq!(
        parse(r#"getattr("Instance", "PublicIp")"#),
        Expr::Call(ExprCall {
            name: "getattr".to_string(),
            args: vec![string("Instance"), string("PublicIp")],
        })
    );
}

#[test]
fn call_without_args() {
    assert_eq!(
        parse("now()"),
        Expr::Call(ExprCall {
            name: "now".to_string(),
            args: vec![],
        })
    );
}

#[test]
fn object_and_array_literals() {
    assert_eq!(
        parse(r#"raw({"Fn::Base64": [port, "x",]})"#),
        Expr::Call(ExprCall {
            name: "raw".to_string(),
            args: vec![Expr::Object(ExprObject {
                entries: vec![(
                    "Fn::Base64".to_string(),
                    Expr::Array(ExprArray {
                        values: vec![var("port"), string("x")],
                    }),
                )],
            })],
        })
    );
}

#[test]
fn field_and_index_access() {
    assert_eq!(
        parse(r#"hosts[0].name"#),
        Expr::Index(ExprIndex {
            object: Box::new(Expr::Index(ExprIndex {
                object: Box::new(var("hosts")),
                index: Box::new(Expr::Integer(ExprInteger { value: 0 })),
            })),
            index: Box::new(string("name")),
        })
    );
}

#[test]
fn trailing_garbage_is_rejected() {
    let err = TemplateExprParser::new().parse("ref(\"a\") ref").unwrap_err();
    assert!(matches!(err, TransformError::TemplateSyntax { .. }));
}

#[test]
fn unknown_character_is_rejected() {
    let err = TemplateExprParser::new().parse("a + b").unwrap_err();
    assert!(matches!(err, TransformError::TemplateSyntax { .. }));
}

fn statement(input: &str) -> Statement {
    TemplateExprParser::new().parse_statement(input).unwrap()
}

#[test]
fn comparison() {
    assert_eq!(
        parse(r#"env != "prod""#),
        Expr::Ne(ExprOpBinary {
            left: Box::new(var("env")),
            right: Box::new(string("prod")),
        })
    );
    assert_eq!(parse("nil"), Expr::Null);
}

#[test]
fn block_statements() {
    assert_eq!(statement(" if ready "), Statement::If(var("ready")));
    assert_eq!(
        statement("elsif a == b"),
        Statement::Elsif(Expr::Eq(ExprOpBinary {
            left: Box::new(var("a")),
            right: Box::new(var("b")),
        }))
    );
    assert_eq!(statement(" else "), Statement::Else);
    assert_eq!(statement("end"), Statement::End);
}

#[test]
fn for_statements() {
    assert_eq!(
        statement("for key, value in tags"),
        Statement::For(StatementFor {
            bindings: vec!["key".to_string(), "value".to_string()],
            iterable: var("tags"),
        })
    );
    assert_eq!(
        statement("subnets.each do |subnet|"),
        Statement::For(StatementFor {
            bindings: vec!["subnet".to_string()],
            iterable: var("subnets"),
        })
    );
}

#[test]
fn each_needs_a_receiver() {
    let err = TemplateExprParser::new().parse_statement("subnets do |subnet|").unwrap_err();
    assert!(matches!(err, TransformError::TemplateSyntax { .. }));

    let err = TemplateExprParser::new().parse_statement("else if").unwrap_err();
    assert!(matches!(err, TransformError::TemplateSyntax { .. }));
}
