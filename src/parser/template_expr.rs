// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod lexer;
mod parser;

pub use parser::TemplateExprParser;
