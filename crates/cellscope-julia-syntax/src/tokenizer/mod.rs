// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

mod lexer;

pub use lexer::{tokenize, TokError, TokState, TokType, Token};

#[cfg(test)]
mod tests;
