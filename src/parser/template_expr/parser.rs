// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

#[cfg(test)]
mod tests;

use std::{ops::Range, rc::Rc};

use chumsky::{prelude::*, Stream};

use crate::{
    ast::{
        Expr, ExprArray, ExprCall, ExprIdent, ExprIndex, ExprInteger, ExprObject, ExprOpBinary, ExprReal, ExprString,
        Statement, StatementFor,
    },
    error::{Result, TransformError},
};

use super::lexer::{gen_lexer, Token};

pub struct TemplateExprParser {
    lexer: Box<dyn Parser<char, Vec<(Token, Range<usize>)>, Error = Simple<char>>>,
    parser: Box<dyn Parser<Token, Expr, Error = Simple<Token>>>,
    statement_parser: Box<dyn Parser<Token, Statement, Error = Simple<Token>>>,
}

impl TemplateExprParser {
    pub fn new() -> TemplateExprParser {
        let lexer = gen_lexer();
        let parser = gen_template_expression_parser();
        let statement_parser = gen_statement_parser();
        TemplateExprParser {
            lexer: Box::new(lexer),
            parser: Box::new(parser),
            statement_parser: Box::new(statement_parser),
        }
    }

    /// Parses the body of a single `<%= ... %>` tag.
    pub fn parse(&self, expr_str: &str) -> Result<Expr> {
        let tokens = self.lexer.parse(expr_str).map_err(|errs| syntax_error(expr_str, &errs))?;

        let expr_str_len = expr_str.chars().count();
        let eoi = expr_str_len..expr_str_len + 1;

        self.parser
            .parse(Stream::from_iter(eoi, tokens.into_iter()))
            .map_err(|errs| syntax_error(expr_str, &errs))
    }

    /// Parses the body of a `<% ... %>` control tag.
    pub fn parse_statement(&self, stmt_str: &str) -> Result<Statement> {
        let tokens = self.lexer.parse(stmt_str).map_err(|errs| syntax_error(stmt_str, &errs))?;

        let stmt_str_len = stmt_str.chars().count();
        let eoi = stmt_str_len..stmt_str_len + 1;

        self.statement_parser
            .parse(Stream::from_iter(eoi, tokens.into_iter()))
            .map_err(|errs| syntax_error(stmt_str, &errs))
    }
}

impl Default for TemplateExprParser {
    fn default() -> Self {
        Self::new()
    }
}

fn syntax_error<T>(expr_str: &str, errs: &[Simple<T>]) -> TransformError
where
    T: std::hash::Hash + Eq + std::fmt::Display,
{
    let details: Vec<String> = errs.iter().map(|err| err.to_string()).collect();
    TransformError::TemplateSyntax {
        message: format!("in expression {:?}: {}", expr_str.trim(), details.join("; ")),
    }
}

fn gen_template_expression_parser() -> impl Parser<Token, Expr, Error = Simple<Token>> {
    gen_expression().then_ignore(end())
}

fn gen_expression() -> impl Parser<Token, Expr, Error = Simple<Token>> + Clone {
    recursive(|expr| {
        let value = select! {
            Token::String(value) => Expr::String(ExprString { value: Rc::new(value) }),
            Token::Integer(value) => Expr::Integer(ExprInteger { value }),
            Token::Real(value) => Expr::Real(ExprReal { value: Rc::new(value) }),
            Token::Ident(ident) if ident == "true" => Expr::True,
            Token::Ident(ident) if ident == "false" => Expr::False,
            Token::Ident(ident) if ident == "null" || ident == "nil" => Expr::Null,
        }
        .labelled("value");

        let ident = select! { Token::Ident(name) => name }.labelled("identifier");

        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let call = ident
            .clone()
            .then(args)
            .map(|(name, args)| Expr::Call(ExprCall { name, args }));

        let var = ident.clone().map(|name| Expr::Var(ExprIdent { name }));

        let array = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(|values| Expr::Array(ExprArray { values }));

        let object_key = select! {
            Token::String(key) => key,
            Token::Ident(key) => key,
        }
        .labelled("object key");

        let object = object_key
            .then_ignore(just(Token::Colon))
            .then(expr.clone())
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(|entries| Expr::Object(ExprObject { entries }));

        let atom = value.or(call).or(var).or(array).or(object);

        let subquery_ident = just(Token::Dot)
            .ignore_then(ident)
            .map(|index| Expr::String(ExprString { value: Rc::new(index) }));

        let subquery_index = expr.delimited_by(just(Token::LBracket), just(Token::RBracket));

        let postfix = atom
            .then(subquery_ident.or(subquery_index).repeated())
            .foldl(|object, index| {
                Expr::Index(ExprIndex {
                    object: Box::new(object),
                    index: Box::new(index),
                })
            });

        let compare_op = just(Token::Eq).or(just(Token::Ne));

        postfix
            .clone()
            .then(compare_op.then(postfix).repeated())
            .foldl(|left, (token, right)| {
                let op = ExprOpBinary {
                    left: Box::new(left),
                    right: Box::new(right),
                };
                match token {
                    Token::Eq => Expr::Eq(op),
                    _ => Expr::Ne(op),
                }
            })
    })
}

fn keyword(name: &str) -> impl Parser<Token, Token, Error = Simple<Token>> + Clone {
    just(Token::Ident(name.to_string()))
}

// `if x`, `elsif x`, `else`, `end`, `for a, b in x` and `x.each do |a, b|`.
fn gen_statement_parser() -> impl Parser<Token, Statement, Error = Simple<Token>> {
    let expr = gen_expression();

    let bindings = select! { Token::Ident(name) => name }
        .labelled("binding")
        .separated_by(just(Token::Comma))
        .at_least(1);

    let if_stmt = keyword("if").ignore_then(expr.clone()).map(Statement::If);
    let elsif_stmt = keyword("elsif").ignore_then(expr.clone()).map(Statement::Elsif);
    let else_stmt = keyword("else").to(Statement::Else);
    let end_stmt = keyword("end").to(Statement::End);

    let for_stmt = keyword("for")
        .ignore_then(bindings.clone())
        .then_ignore(keyword("in"))
        .then(expr.clone())
        .map(|(bindings, iterable)| Statement::For(StatementFor { bindings, iterable }));

    // The postfix grammar reads `.each` as a field access, so it is unwrapped here.
    let each_stmt = expr
        .then_ignore(keyword("do"))
        .then(bindings.delimited_by(just(Token::Pipe), just(Token::Pipe)))
        .try_map(|(receiver, bindings), span| match receiver {
            Expr::Index(ExprIndex { object, index })
                if matches!(index.as_ref(), Expr::String(name) if name.value.as_str() == "each") =>
            {
                Ok(Statement::For(StatementFor {
                    bindings,
                    iterable: *object,
                }))
            }
            _ => Err(Simple::custom(span, "expected '<value>.each do |name|'")),
        });

    if_stmt
        .or(elsif_stmt)
        .or(else_stmt)
        .or(end_stmt)
        .or(for_stmt)
        .or(each_stmt)
        .then_ignore(end())
}
