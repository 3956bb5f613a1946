// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::parser::grammar::ParseLoc;
use crate::tokenizer::TokError;
use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParserError<'a> {
    #[error("tokenizer error: {0}")]
    TokenizerError(TokError, &'a str),
    #[error("parser error: {0}")]
    ParserError(peg::error::ParseError<ParseLoc>, &'a str),
}

impl ParserError<'_> {
    /// Byte range in the source where the error was detected.
    pub fn location(&self) -> ParseLoc {
        match self {
            ParserError::TokenizerError(err, _) => ParseLoc {
                start: err.offset(),
                end: err.offset(),
            },
            ParserError::ParserError(err, _) => err.location,
        }
    }
}
