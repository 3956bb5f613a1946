// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::tokenizer::{tokenize, TokError, TokState, TokType};

fn tokenize_all(text: &str) -> Result<Vec<(TokType, &str)>, TokError> {
    Ok(tokenize(text)?
        .into_iter()
        .map(|tok| (tok.kind, tok.text))
        .collect())
}

#[test]
fn test_identifier() {
    assert_eq!(
        tokenize_all("push! x_1 α′ ∇f"),
        Ok(vec![
            (TokType::Identifier, "push!"),
            (TokType::Identifier, "x_1"),
            (TokType::Identifier, "α′"),
            (TokType::Identifier, "∇f"),
        ])
    );

    assert_eq!(
        tokenize_all("a!=b"),
        Ok(vec![
            (TokType::Identifier, "a"),
            (TokType::Op, "!="),
            (TokType::Identifier, "b"),
        ])
    );
}

#[test]
fn test_contextual_keywords() {
    assert_eq!(
        tokenize_all("abstract type A end"),
        Ok(vec![
            (TokType::Keyword, "abstract"),
            (TokType::Keyword, "type"),
            (TokType::Identifier, "A"),
            (TokType::Keyword, "end"),
        ])
    );

    assert_eq!(
        tokenize_all("type = 1"),
        Ok(vec![
            (TokType::Identifier, "type"),
            (TokType::Op, "="),
            (TokType::Integer, "1"),
        ])
    );

    assert_eq!(
        tokenize_all("mutable struct P end"),
        Ok(vec![
            (TokType::Keyword, "mutable"),
            (TokType::Keyword, "struct"),
            (TokType::Identifier, "P"),
            (TokType::Keyword, "end"),
        ])
    );
}

#[test]
fn test_numbers() {
    assert_eq!(
        tokenize_all("0x1F 1_000 1.5 1e-3 .5 2x"),
        Ok(vec![
            (TokType::Integer, "0x1F"),
            (TokType::Integer, "1_000"),
            (TokType::Float, "1.5"),
            (TokType::Float, "1e-3"),
            (TokType::Float, ".5"),
            (TokType::Integer, "2"),
            (TokType::Identifier, "x"),
        ])
    );
}

#[test]
fn test_operators() {
    assert_eq!(
        tokenize_all("a >>>= 1; b ⊻= c .+ d"),
        Ok(vec![
            (TokType::Identifier, "a"),
            (TokType::Op, ">>>="),
            (TokType::Integer, "1"),
            (TokType::Punct, ";"),
            (TokType::Identifier, "b"),
            (TokType::Op, "⊻="),
            (TokType::Identifier, "c"),
            (TokType::Op, ".+"),
            (TokType::Identifier, "d"),
        ])
    );

    assert_eq!(
        tokenize_all("x .= y->y"),
        Ok(vec![
            (TokType::Identifier, "x"),
            (TokType::Op, ".="),
            (TokType::Identifier, "y"),
            (TokType::Op, "->"),
            (TokType::Identifier, "y"),
        ])
    );
}

#[test]
fn test_adjoint_and_char() {
    assert_eq!(
        tokenize_all("x' * 'a'"),
        Ok(vec![
            (TokType::Identifier, "x"),
            (TokType::Op, "'"),
            (TokType::Op, "*"),
            (TokType::Char, "'a'"),
        ])
    );

    assert_eq!(
        tokenize_all(r"'\n'"),
        Ok(vec![(TokType::Char, r"'\n'")])
    );
}

#[test]
fn test_string_interpolation() {
    assert_eq!(
        tokenize_all(r#""a $x b $(f(y))""#),
        Ok(vec![
            (TokType::StringStart, "\""),
            (TokType::StringChunk, "a "),
            (TokType::Op, "$"),
            (TokType::Identifier, "x"),
            (TokType::StringChunk, " b "),
            (TokType::Op, "$"),
            (TokType::Punct, "("),
            (TokType::Identifier, "f"),
            (TokType::Punct, "("),
            (TokType::Identifier, "y"),
            (TokType::Punct, ")"),
            (TokType::Punct, ")"),
            (TokType::StringEnd, "\""),
        ])
    );

    assert_eq!(
        tokenize_all(r#""cost: 5$""#),
        Ok(vec![
            (TokType::StringStart, "\""),
            (TokType::StringChunk, "cost: 5"),
            (TokType::StringChunk, "$"),
            (TokType::StringEnd, "\""),
        ])
    );
}

#[test]
fn test_prefixed_string_is_opaque() {
    assert_eq!(
        tokenize_all(r#"r"a$b"i"#),
        Ok(vec![
            (TokType::StringStart, "r\""),
            (TokType::StringChunk, "a$b"),
            (TokType::StringEnd, "\"i"),
        ])
    );
}

#[test]
fn test_newlines() {
    assert_eq!(
        tokenize_all("a\n\n  b"),
        Ok(vec![
            (TokType::Identifier, "a"),
            (TokType::Newline, "\n"),
            (TokType::Identifier, "b"),
        ])
    );

    // no separators inside brackets or after a binary operator
    assert_eq!(
        tokenize_all("f(a,\n b) +\n c"),
        Ok(vec![
            (TokType::Identifier, "f"),
            (TokType::Punct, "("),
            (TokType::Identifier, "a"),
            (TokType::Punct, ","),
            (TokType::Identifier, "b"),
            (TokType::Punct, ")"),
            (TokType::Op, "+"),
            (TokType::Identifier, "c"),
        ])
    );

    assert_eq!(
        tokenize_all("begin\n x\nend"),
        Ok(vec![
            (TokType::Keyword, "begin"),
            (TokType::Newline, "\n"),
            (TokType::Identifier, "x"),
            (TokType::Newline, "\n"),
            (TokType::Keyword, "end"),
        ])
    );
}

#[test]
fn test_generator_for_does_not_open_block() {
    assert_eq!(
        tokenize_all("[x for x in xs]\ny"),
        Ok(vec![
            (TokType::Punct, "["),
            (TokType::Identifier, "x"),
            (TokType::Keyword, "for"),
            (TokType::Identifier, "x"),
            (TokType::Keyword, "in"),
            (TokType::Identifier, "xs"),
            (TokType::Punct, "]"),
            (TokType::Newline, "\n"),
            (TokType::Identifier, "y"),
        ])
    );
}

#[test]
fn test_index_keywords() {
    assert_eq!(
        tokenize_all("if a[end] end"),
        Ok(vec![
            (TokType::Keyword, "if"),
            (TokType::Identifier, "a"),
            (TokType::Punct, "["),
            (TokType::IndexKeyword, "end"),
            (TokType::Punct, "]"),
            (TokType::Keyword, "end"),
        ])
    );

    assert_eq!(
        tokenize_all("x[f(begin)]"),
        Ok(vec![
            (TokType::Identifier, "x"),
            (TokType::Punct, "["),
            (TokType::Identifier, "f"),
            (TokType::Punct, "("),
            (TokType::IndexKeyword, "begin"),
            (TokType::Punct, ")"),
            (TokType::Punct, "]"),
        ])
    );
}

#[test]
fn test_comments() {
    assert_eq!(
        tokenize_all("a # c\nb #= x #= y =# z =# c"),
        Ok(vec![
            (TokType::Identifier, "a"),
            (TokType::Newline, "\n"),
            (TokType::Identifier, "b"),
            (TokType::Identifier, "c"),
        ])
    );
}

#[test]
fn test_ternary_colon() {
    assert_eq!(
        tokenize_all("a ? b : c"),
        Ok(vec![
            (TokType::Identifier, "a"),
            (TokType::Op, "?"),
            (TokType::Identifier, "b"),
            (TokType::TernaryColon, ":"),
            (TokType::Identifier, "c"),
        ])
    );

    assert_eq!(
        tokenize_all("a : b"),
        Ok(vec![
            (TokType::Identifier, "a"),
            (TokType::Op, ":"),
            (TokType::Identifier, "b"),
        ])
    );

    assert_eq!(
        tokenize_all("c ? :x : :y"),
        Ok(vec![
            (TokType::Identifier, "c"),
            (TokType::Op, "?"),
            (TokType::Op, ":"),
            (TokType::Identifier, "x"),
            (TokType::TernaryColon, ":"),
            (TokType::Op, ":"),
            (TokType::Identifier, "y"),
        ])
    );
}

#[test]
fn test_macro_names() {
    assert_eq!(
        tokenize_all("@show x; @. y = z"),
        Ok(vec![
            (TokType::MacroName, "@show"),
            (TokType::Identifier, "x"),
            (TokType::Punct, ";"),
            (TokType::MacroName, "@."),
            (TokType::Identifier, "y"),
            (TokType::Op, "="),
            (TokType::Identifier, "z"),
        ])
    );
}

#[test]
fn test_space_before() {
    let tokens = tokenize("f(x) f (x)").unwrap();
    assert!(!tokens[1].space_before);
    assert!(tokens[4].space_before);
    assert!(tokens[5].space_before);
    assert_eq!(tokens[5].span.start, 7);
}

#[test]
fn test_errors() {
    assert_eq!(
        tokenize_all("\"abc"),
        Err(TokError::UnterminatedString(0))
    );
    assert_eq!(tokenize_all("x = 'a"), Err(TokError::UnterminatedChar(4)));
    assert_eq!(
        tokenize_all("#= never closed"),
        Err(TokError::UnterminatedComment(0))
    );
    assert_eq!(TokError::UnterminatedChar(4).offset(), 4);
}

fn recover_all(text: &str) -> Vec<(TokType, &str)> {
    TokState::new(text)
        .tokenize_recovering()
        .into_iter()
        .map(|tok| (tok.kind, tok.text))
        .collect()
}

#[test]
fn test_recovering_keeps_tokens_before_the_error() {
    assert_eq!(
        recover_all("x = 1\ny = \"ab $(c"),
        vec![
            (TokType::Identifier, "x"),
            (TokType::Op, "="),
            (TokType::Integer, "1"),
            (TokType::Newline, "\n"),
            (TokType::Identifier, "y"),
            (TokType::Op, "="),
            (TokType::Error, "\"ab $(c"),
        ]
    );
    assert_eq!(
        recover_all("a #= open"),
        vec![(TokType::Identifier, "a"), (TokType::Error, "#= open")]
    );
    assert_eq!(recover_all("'"), vec![(TokType::Error, "'")]);
    assert_eq!(recover_all("f(x)"), tokenize_all("f(x)").unwrap());
}

#[test]
fn test_markdown_string_interpolates() {
    assert_eq!(
        tokenize_all("md\"n = $n\""),
        Ok(vec![
            (TokType::StringStart, "md\""),
            (TokType::StringChunk, "n = "),
            (TokType::Op, "$"),
            (TokType::Identifier, "n"),
            (TokType::StringEnd, "\""),
        ])
    );
}
