// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod template_expr;

#[cfg(test)]
mod tests;

use std::vec::IntoIter;

use crate::{
    ast::{Expr, IfBranch, SegmentFor, SegmentIf, Statement, Template, TemplateSegment},
    error::{Result, TransformError},
};

use template_expr::TemplateExprParser;

const TAG_OPEN: &str = "<%";
const TAG_CLOSE: &str = "%>";

/// Splits template text into literal text, `<%= expr %>` tags and
/// `<% if %>`/`<% for %>` blocks.
///
/// `<%# ... %>` is a comment and `<%%` is an escaped `<%`.
pub struct Parser {
    expr_parser: TemplateExprParser,
}

// A flat tag or run of text, before blocks are matched up.
enum Piece {
    Segment(TemplateSegment),
    Statement { statement: Statement, line: usize },
}

impl Parser {
    pub fn new() -> Parser {
        let expr_parser = TemplateExprParser::new();
        Parser { expr_parser }
    }

    pub fn parse(&self, input: &str) -> Result<Template> {
        let pieces = self.scan(input)?;
        let mut pieces = pieces.into_iter();
        let (segments, terminator) = parse_block(&mut pieces)?;
        match terminator {
            None => Ok(Template { segments }),
            Some((statement, line)) => Err(unexpected(&statement, line)),
        }
    }

    fn scan(&self, input: &str) -> Result<Vec<Piece>> {
        let mut curr_index = 0;
        let mut pieces = Vec::new();
        loop {
            // Find next tag.
            let Some(tag_index) = input[curr_index..].find(TAG_OPEN).map(|index| index + curr_index) else {
                break;
            };

            // Add non-template string characters.
            if tag_index > curr_index {
                pieces.push(text_piece(&input[curr_index..tag_index]));
            }

            let body_index = tag_index + TAG_OPEN.len();
            let rest = &input[body_index..];
            if rest.starts_with('%') {
                pieces.push(text_piece(TAG_OPEN));
                curr_index = body_index + 1;
            } else if rest.starts_with('#') {
                let Some(end) = rest.find(TAG_CLOSE) else {
                    return Err(unterminated(input, tag_index));
                };
                curr_index = body_index + end + TAG_CLOSE.len();
            } else if let Some(expr_str) = rest.strip_prefix('=') {
                let Some(end) = find_tag_close(expr_str) else {
                    return Err(unterminated(input, tag_index));
                };
                let expr = self.expr_parser.parse(&expr_str[..end])?;
                pieces.push(Piece::Segment(TemplateSegment::Expr(expr)));
                curr_index = body_index + 1 + end + TAG_CLOSE.len();
            } else {
                let Some(end) = find_tag_close(rest) else {
                    return Err(unterminated(input, tag_index));
                };
                let line = line_of(input, tag_index);
                let statement = self.expr_parser.parse_statement(&rest[..end]).map_err(|err| match err {
                    TransformError::TemplateSyntax { message } => TransformError::TemplateSyntax {
                        message: format!("line {}: {}", line, message),
                    },
                    other => other,
                })?;
                pieces.push(Piece::Statement { statement, line });
                curr_index = body_index + end + TAG_CLOSE.len();
            }
        }

        // Add non-template string characters.
        if input.len() > curr_index {
            pieces.push(text_piece(&input[curr_index..]));
        }

        Ok(pieces)
    }
}

// Collects segments up to the next `elsif`, `else` or `end`, which is returned
// with its line. Nested blocks are consumed whole.
fn parse_block(pieces: &mut IntoIter<Piece>) -> Result<(Vec<TemplateSegment>, Option<(Statement, usize)>)> {
    let mut segments = Vec::new();
    while let Some(piece) = pieces.next() {
        match piece {
            Piece::Segment(TemplateSegment::Text(text)) => push_text(&mut segments, &text),
            Piece::Segment(segment) => segments.push(segment),
            Piece::Statement { statement, line } => match statement {
                Statement::If(condition) => segments.push(parse_if(condition, line, pieces)?),
                Statement::For(for_stmt) => {
                    let (body, terminator) = parse_block(pieces)?;
                    expect_end(terminator, "for", line)?;
                    segments.push(TemplateSegment::For(SegmentFor {
                        bindings: for_stmt.bindings,
                        iterable: for_stmt.iterable,
                        body,
                    }));
                }
                other => return Ok((segments, Some((other, line)))),
            },
        }
    }
    Ok((segments, None))
}

fn parse_if(mut condition: Expr, line: usize, pieces: &mut IntoIter<Piece>) -> Result<TemplateSegment> {
    let mut branches = Vec::new();
    loop {
        let (body, terminator) = parse_block(pieces)?;
        branches.push(IfBranch { condition, body });
        match terminator {
            Some((Statement::Elsif(next), _)) => condition = next,
            Some((Statement::Else, _)) => {
                let (otherwise, terminator) = parse_block(pieces)?;
                expect_end(terminator, "if", line)?;
                return Ok(TemplateSegment::If(SegmentIf { branches, otherwise }));
            }
            terminator => {
                expect_end(terminator, "if", line)?;
                return Ok(TemplateSegment::If(SegmentIf {
                    branches,
                    otherwise: Vec::new(),
                }));
            }
        }
    }
}

fn expect_end(terminator: Option<(Statement, usize)>, keyword: &str, line: usize) -> Result<()> {
    match terminator {
        Some((Statement::End, _)) => Ok(()),
        Some((statement, line)) => Err(unexpected(&statement, line)),
        None => Err(TransformError::TemplateSyntax {
            message: format!("line {}: '{}' without 'end'", line, keyword),
        }),
    }
}

fn unexpected(statement: &Statement, line: usize) -> TransformError {
    TransformError::TemplateSyntax {
        message: format!("line {}: unexpected '{}'", line, statement.keyword()),
    }
}

fn text_piece(text: &str) -> Piece {
    Piece::Segment(TemplateSegment::Text(text.to_string()))
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn push_text(segments: &mut Vec<TemplateSegment>, text: &str) {
    if let Some(TemplateSegment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(TemplateSegment::Text(text.to_string()));
    }
}

// A `%>` inside a string literal does not close the tag.
fn find_tag_close(expr_str: &str) -> Option<usize> {
    let mut quote = None;
    let mut escaped = false;
    for (index, c) in expr_str.char_indices() {
        if let Some(open) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == open => quote = None,
                _ => {}
            }
        } else if c == '"' || c == '\'' {
            quote = Some(c);
        } else if expr_str[index..].starts_with(TAG_CLOSE) {
            return Some(index);
        }
    }
    None
}

fn unterminated(input: &str, tag_index: usize) -> TransformError {
    TransformError::TemplateSyntax {
        message: format!("line {}: unterminated tag", line_of(input, tag_index)),
    }
}

fn line_of(input: &str, index: usize) -> usize {
    input[..index].matches('\n').count() + 1
}
