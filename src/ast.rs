// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::rc::Rc;

/// A parsed template body: literal text interleaved with `<%= ... %>` tags and
/// `<% ... %>` blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TemplateSegment {
    Text(String),
    Expr(Expr),
    If(SegmentIf),
    For(SegmentFor),
}

/// `if` with any number of `elsif` branches. The first truthy branch renders,
/// otherwise the `else` body does.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentIf {
    pub branches: Vec<IfBranch>,
    pub otherwise: Vec<TemplateSegment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Vec<TemplateSegment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentFor {
    pub bindings: Vec<String>,
    pub iterable: Expr,
    pub body: Vec<TemplateSegment>,
}

/// Body of a `<% ... %>` tag.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    If(Expr),
    Elsif(Expr),
    Else,
    End,
    For(StatementFor),
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatementFor {
    pub bindings: Vec<String>,
    pub iterable: Expr,
}

impl Statement {
    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::If(_) => "if",
            Statement::Elsif(_) => "elsif",
            Statement::Else => "else",
            Statement::End => "end",
            Statement::For(_) => "for",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    String(ExprString),
    Integer(ExprInteger),
    Real(ExprReal),
    True,
    False,
    Null,
    Var(ExprIdent),
    Index(ExprIndex),
    Array(ExprArray),
    Object(ExprObject),
    Call(ExprCall),
    Eq(ExprOpBinary),
    Ne(ExprOpBinary),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprString {
    pub value: Rc<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprInteger {
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprReal {
    pub value: Rc<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprIdent {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprIndex {
    pub object: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprArray {
    pub values: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprObject {
    pub entries: Vec<(String, Expr)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprCall {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprOpBinary {
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}
