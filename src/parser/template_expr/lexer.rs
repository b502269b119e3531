// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::ops::Range;

use chumsky::{
    error::Simple,
    primitive::{choice, end, filter, just, one_of},
    text::{self, TextParser},
    Parser,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    String(String),
    Ident(String),
    Integer(i64),
    Real(String),
    Dot,
    Comma,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Pipe,
    Eq,
    Ne,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::String(value) => write!(f, "{:?}", value),
            Token::Ident(name) => f.write_str(name),
            Token::Integer(i) => write!(f, "{}", i),
            Token::Real(string) => f.write_str(string),
            Token::Dot => f.write_str("."),
            Token::Comma => f.write_str(","),
            Token::Colon => f.write_str(":"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::Pipe => f.write_str("|"),
            Token::Eq => f.write_str("=="),
            Token::Ne => f.write_str("!="),
        }
    }
}

pub fn gen_lexer() -> impl Parser<char, Vec<(Token, Range<usize>)>, Error = Simple<char>> {
    let frac = just('.').chain(text::digits(10));

    let exp = just('e')
        .or(just('E'))
        .chain(just('+').or(just('-')).or_not())
        .chain::<char, _, _>(text::digits(10));

    let number = just('-')
        .or_not()
        .chain::<char, _, _>(text::int(10))
        .chain::<char, _, _>(frac.or_not().flatten())
        .chain::<char, _, _>(exp.or_not().flatten())
        .collect::<String>()
        .map(|string| match string.parse::<i64>() {
            Ok(i) => Token::Integer(i),
            Err(_) => Token::Real(string),
        })
        .labelled("number");

    let string = quoted('"').or(quoted('\'')).map(Token::String).labelled("string");

    let ident = text::ident().map(Token::Ident);

    let op = just("==").to(Token::Eq).or(just("!=").to(Token::Ne));

    let ctrl = one_of(".,:()[]{}|").map(|c| match c {
        '.' => Token::Dot,
        ',' => Token::Comma,
        ':' => Token::Colon,
        '(' => Token::LParen,
        ')' => Token::RParen,
        '[' => Token::LBracket,
        ']' => Token::RBracket,
        '{' => Token::LBrace,
        '}' => Token::RBrace,
        '|' => Token::Pipe,
        _ => unreachable!(),
    });

    let token = string.or(number).or(ident).or(op).or(ctrl);

    token
        .map_with_span(|tok, span| (tok, span))
        .padded()
        .repeated()
        .then_ignore(end())
}

// A string in either quote style. Both styles accept the same escapes.
fn quoted(quote: char) -> impl Parser<char, String, Error = Simple<char>> + Clone {
    let unicode = filter(|c: &char| c.is_ascii_hexdigit())
        .repeated()
        .exactly(4)
        .collect::<String>()
        .validate(|digits, span, emit| {
            match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                Some(c) => c,
                None => {
                    emit(Simple::custom(span, "invalid unicode escape"));
                    char::REPLACEMENT_CHARACTER
                }
            }
        });

    let escape = just('\\').ignore_then(choice((
        one_of("\\/\"'"),
        just('b').to('\x08'),
        just('f').to('\x0C'),
        just('n').to('\n'),
        just('r').to('\r'),
        just('t').to('\t'),
        just('u').ignore_then(unicode),
    )));

    just(quote)
        .ignore_then(filter(move |c: &char| *c != '\\' && *c != quote).or(escape).repeated())
        .then_ignore(just(quote))
        .collect::<String>()
}
