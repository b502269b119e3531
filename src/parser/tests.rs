// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::rc::Rc;

use super::*;
use crate::ast::{Expr, ExprCall, ExprIdent, ExprString};

fn parse(input: &str) -> Result<Template> {
    Parser::new().parse(input)
}

fn text(value: &str) -> TemplateSegment {
    TemplateSegment::Text(value.to_string())
}

fn ref_call(name: &str) -> TemplateSegment {
    TemplateSegment::Expr(Expr::Call(ExprCall {
        name: "ref".to_string(),
        args: vec![Expr::String(ExprString {
            value: Rc::new(name.to_string()),
        })],
    }))
}

#[test]
fn plain_text() {
    let template = parse("#!/bin/bash\necho hi\n").unwrap();
    assert_eq!(template.segments, vec![text("#!/bin/bash\necho hi\n")]);
}

#[test]
fn empty_text() {
    assert_eq!(parse("").unwrap().segments, vec![]);
}

#[test]
fn expression_between_text() {
    let template = parse(r#"cfn-init -s <%= ref("AWS::StackId") %> -r Launch"#).unwrap();
    assert_eq!(
        template.segments,
        vec![text("cfn-init -s "), ref_call("AWS::StackId"), text(" -r Launch")]
    );
}

#[test]
fn adjacent_expressions() {
    let template = parse(r#"<%= ref("A") %><%= ref("B") %>"#).unwrap();
    assert_eq!(template.segments, vec![ref_call("A"), ref_call("B")]);
}

#[test]
fn close_marker_inside_string_literal() {
    let template = parse(r#"<%= ref("50%>") %>!"#).unwrap();
    assert_eq!(template.segments, vec![ref_call("50%>"), text("!")]);
}

#[test]
fn comments_are_dropped() {
    let template = parse("a<%# note %>b").unwrap();
    assert_eq!(template.segments, vec![text("ab")]);
}

#[test]
fn escaped_open_marker() {
    let template = parse("<%%= not a tag %>").unwrap();
    assert_eq!(template.segments, vec![text("<%= not a tag %>")]);
}

#[test]
fn unterminated_tag() {
    let err = parse("line one\n<%= ref(\"A\")").unwrap_err();
    assert_eq!(err.to_string(), "template syntax error: line 2: unterminated tag");
}

fn var(name: &str) -> Expr {
    Expr::Var(ExprIdent { name: name.to_string() })
}

#[test]
fn if_else_block() {
    let template = parse("a<% if ready %>yes<% else %>no<% end %>b").unwrap();
    assert_eq!(
        template.segments,
        vec![
            text("a"),
            TemplateSegment::If(SegmentIf {
                branches: vec![IfBranch {
                    condition: var("ready"),
                    body: vec![text("yes")],
                }],
                otherwise: vec![text("no")],
            }),
            text("b"),
        ]
    );
}

#[test]
fn elsif_branches() {
    let template = parse("<% if a %>1<% elsif b %>2<% elsif c %>3<% end %>").unwrap();
    let TemplateSegment::If(if_segment) = &template.segments[0] else {
        panic!("expected an if block: {:?}", template.segments);
    };
    let conditions: Vec<&Expr> = if_segment.branches.iter().map(|branch| &branch.condition).collect();
    assert_eq!(conditions, vec![&var("a"), &var("b"), &var("c")]);
    assert!(if_segment.otherwise.is_empty());
}

#[test]
fn nested_for_block() {
    let template = parse(r#"<% for zone in zones %><% if zone %><%= ref("A") %><% end %>
<% end %>"#).unwrap();
    assert_eq!(
        template.segments,
        vec![TemplateSegment::For(SegmentFor {
            bindings: vec!["zone".to_string()],
            iterable: var("zones"),
            body: vec![
                TemplateSegment::If(SegmentIf {
                    branches: vec![IfBranch {
                        condition: var("zone"),
                        body: vec![ref_call("A")],
                    }],
                    otherwise: vec![],
                }),
                text("\n"),
            ],
        })]
    );
}

#[test]
fn unclosed_block() {
    let err = parse("line one\n<% if x %>").unwrap_err();
    assert_eq!(err.to_string(), "template syntax error: line 2: 'if' without 'end'");
}

#[test]
fn stray_terminators() {
    let err = parse("<% end %>").unwrap_err();
    assert_eq!(err.to_string(), "template syntax error: line 1: unexpected 'end'");

    let err = parse("<% for x in xs %>\n<% else %>\n<% end %>").unwrap_err();
    assert_eq!(err.to_string(), "template syntax error: line 2: unexpected 'else'");
}

#[test]
fn bad_statement_reports_line() {
    let err = parse("\n\n<% while x %>").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("template syntax error: line 3: "), "{message}");
}
