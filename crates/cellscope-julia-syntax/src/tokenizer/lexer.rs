// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Hand-written Julia tokenizer.
//!
//! The tokenizer is a single forward pass over the source with a stack of
//! open frames (brackets, keyword blocks, strings and string
//! interpolations). The frame stack decides three things the grammar cannot
//! see on its own:
//!
//! - whether a line break is a statement separator (only at top level or
//!   directly inside a keyword block),
//! - whether `end`/`begin` close a block or index into an array,
//! - whether a spaced `:` closes a pending `? :` ternary.
//!
//! Comments and whitespace are dropped; every token records whether
//! whitespace preceded it, which the grammar uses to tell `f(x)` from
//! `f (x)` and `2x` from `2 x`.

use cellscope_core::types::Span;
use thiserror::Error;

// ============================================================================
// Tokens
// ============================================================================

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokType {
    Identifier,
    Keyword,
    /// `end` or `begin` used inside an indexing bracket.
    IndexKeyword,
    Integer,
    Float,
    Char,
    /// Opening delimiter of a string or command literal (with any prefix).
    StringStart,
    /// Literal text inside a string.
    StringChunk,
    /// Closing delimiter of a string or command literal.
    StringEnd,
    /// `@name`.
    MacroName,
    Op,
    /// The `:` that closes a `cond ? a : b` expression.
    TernaryColon,
    /// Brackets, `,` and `;`.
    Punct,
    /// A statement-separating line break.
    Newline,
    Unknown,
    /// Unterminated string, character or block comment. Runs to the end of
    /// the input and is always the last token.
    Error,
}

/// One token of Julia source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokType,
    pub text: &'a str,
    pub span: Span,
    /// True if whitespace, a comment or a line break precedes the token.
    pub space_before: bool,
}

impl Token<'_> {
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokType::Op && self.text == op
    }

    pub fn is_kw(&self, kw: &str) -> bool {
        self.kind == TokType::Keyword && self.text == kw
    }

    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokType::Punct && self.text == p
    }

    /// True if this token can end an operand, so that a following `'` is an
    /// adjoint and a following `for`/`if` belongs to a generator.
    fn ends_value(&self) -> bool {
        match self.kind {
            TokType::Identifier
            | TokType::IndexKeyword
            | TokType::Integer
            | TokType::Float
            | TokType::Char
            | TokType::StringEnd => true,
            TokType::Punct => matches!(self.text, ")" | "]" | "}"),
            TokType::Op => matches!(self.text, "'" | "..."),
            TokType::Keyword => matches!(self.text, "end" | "true" | "false"),
            _ => false,
        }
    }

    /// True if a line break after this token continues the statement.
    fn continues_line(&self) -> bool {
        match self.kind {
            TokType::Op => !matches!(self.text, "'" | "..."),
            TokType::TernaryColon => true,
            TokType::Punct => self.text == ",",
            _ => false,
        }
    }
}

/// Tokenizer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unterminated character literal starting at byte {0}")]
    UnterminatedChar(usize),
    #[error("unterminated block comment starting at byte {0}")]
    UnterminatedComment(usize),
}

impl TokError {
    /// Byte offset where the offending construct starts.
    pub fn offset(&self) -> usize {
        match *self {
            TokError::UnterminatedString(o)
            | TokError::UnterminatedChar(o)
            | TokError::UnterminatedComment(o) => o,
        }
    }
}

// ============================================================================
// Lexical tables
// ============================================================================

/// String macro prefixes whose literals interpolate `$name` and `$(expr)`.
const INTERPOLATING_PREFIXES: &[&str] = &["md"];

const KEYWORDS: &[&str] = &[
    "baremodule",
    "begin",
    "break",
    "catch",
    "const",
    "continue",
    "do",
    "else",
    "elseif",
    "end",
    "export",
    "false",
    "finally",
    "for",
    "function",
    "global",
    "if",
    "import",
    "in",
    "isa",
    "let",
    "local",
    "macro",
    "module",
    "quote",
    "return",
    "struct",
    "true",
    "try",
    "using",
    "where",
    "while",
];

/// Keywords that always open a block closed by `end`.
const BLOCK_KEYWORDS: &[&str] = &[
    "baremodule",
    "do",
    "function",
    "let",
    "macro",
    "module",
    "quote",
    "struct",
    "try",
    "while",
];

const OPERATORS: &[&str] = &[
    ">>>=", ">>>", ">>=", "<<=", "===", "!==", "...", "//=", "-->", "==", "!=", "<=", ">=", "<<",
    ">>", "&&", "||", "->", "=>", "::", "<:", ">:", "|>", "<|", "+=", "-=", "*=", "/=", "\\=",
    "^=", "%=", "|=", "&=", "//", "..", "÷=", "⊻=", "+", "-", "*", "/", "\\", "^", "%", "=", "<",
    ">", "!", "~", "&", "|", ":", "?", "$", ".", "÷", "⊻", "∈", "∉", "∋", "≤", "≥", "≠", "≡", "≢",
    "≈", "∘", "⊆", "⊂", "⊇", "⊃", "∪", "∩", "×", "⋅", "√", "∛", "¬", "±", "∓", "⊗", "⊕", "→",
    "←", "↔", "∧", "∨",
];

/// Operators that never take a broadcasting dot.
const UNDOTTABLE: &[&str] = &[":", "::", "$", "?", "->", "<:", ">:", "."];

fn is_operator_char(c: char) -> bool {
    !c.is_ascii() && OPERATORS.iter().any(|op| op.starts_with(c))
}

fn is_identifier_start(c: char) -> bool {
    c == '_'
        || c.is_alphabetic()
        || (!c.is_ascii() && !c.is_whitespace() && !c.is_control() && !is_operator_char(c))
}

fn is_identifier_char(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// Byte length of the longest operator at the start of `rest`.
fn operator_len(rest: &str) -> Option<usize> {
    OPERATORS
        .iter()
        .filter(|op| rest.starts_with(**op))
        .map(|op| op.len())
        .max()
}

/// Byte length of a broadcasting operator (`.+`, `.=`, `.>>=`) at the start
/// of `rest`.
fn dotted_operator_len(rest: &str) -> Option<usize> {
    let inner = rest.strip_prefix('.')?;
    if inner.starts_with('.') {
        return None;
    }
    let len = operator_len(inner)?;
    if UNDOTTABLE.contains(&&inner[..len]) {
        return None;
    }
    Some(1 + len)
}

/// End of the identifier starting at `start`.
fn scan_identifier(text: &str, start: usize) -> usize {
    let mut end = start;
    for (i, c) in text[start..].char_indices() {
        let at = start + i;
        if c == '!' {
            // `x!=y` is a comparison, `push!` is a name
            if text[at + 1..].starts_with('=') {
                break;
            }
            end = at + 1;
        } else if is_identifier_char(c) {
            end = at + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

// ============================================================================
// Frames
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrDelim {
    Quote,
    TripleQuote,
    Backtick,
    TripleBacktick,
}

impl StrDelim {
    fn text(self) -> &'static str {
        match self {
            StrDelim::Quote => "\"",
            StrDelim::TripleQuote => "\"\"\"",
            StrDelim::Backtick => "`",
            StrDelim::TripleBacktick => "```",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Paren,
    Square,
    Curly,
    Block,
    /// `$(` inside a string.
    Interp,
    Str { delim: StrDelim, start: usize },
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    /// Number of `?` still waiting for their `:` at this nesting level.
    pending_ternary: u32,
}

// ============================================================================
// TokState
// ============================================================================

/// Tokenizer state for one source text.
pub struct TokState<'t> {
    text: &'t str,
    pos: usize,
    tokens: Vec<Token<'t>>,
    frames: Vec<Frame>,
    root_ternary: u32,
    saw_space: bool,
    /// Set after `abstract`/`primitive`: the next `type` is a keyword.
    type_keyword_next: bool,
}

impl<'t> TokState<'t> {
    pub fn new(text: &'t str) -> Self {
        TokState {
            text,
            pos: 0,
            tokens: Vec::new(),
            frames: Vec::new(),
            root_ternary: 0,
            saw_space: true,
            type_keyword_next: false,
        }
    }

    /// Run the tokenizer to completion.
    pub fn tokenize(mut self) -> Result<Vec<Token<'t>>, TokError> {
        self.run()?;
        Ok(self.tokens)
    }

    /// Run the tokenizer to completion, turning a failure into a trailing
    /// [`TokType::Error`] token that covers the rest of the input.
    pub fn tokenize_recovering(mut self) -> Vec<Token<'t>> {
        if let Err(err) = self.run() {
            let start = err.offset();
            self.tokens.retain(|t| t.span.start < start);
            self.saw_space = self.text[..start].ends_with(char::is_whitespace);
            self.push_token(TokType::Error, start, self.text.len());
        }
        self.tokens
    }

    fn run(&mut self) -> Result<(), TokError> {
        loop {
            if let Some((delim, start)) = self.string_frame() {
                self.lex_string_part(delim, start)?;
            } else if self.pos < self.text.len() {
                self.lex_code()?;
            } else {
                break;
            }
        }
        // An interpolation left open at end of input leaves its string open
        if let Some(start) = self.frames.iter().find_map(|f| match f.kind {
            FrameKind::Str { start, .. } => Some(start),
            _ => None,
        }) {
            return Err(TokError::UnterminatedString(start));
        }
        Ok(())
    }

    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push_token(&mut self, kind: TokType, start: usize, end: usize) {
        let space_before = std::mem::take(&mut self.saw_space);
        self.tokens.push(Token {
            kind,
            text: &self.text[start..end],
            span: Span::new(start, end),
            space_before,
        });
        self.pos = end;
    }

    fn open(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            pending_ternary: 0,
        });
    }

    fn string_frame(&self) -> Option<(StrDelim, usize)> {
        match self.frames.last()?.kind {
            FrameKind::Str { delim, start } => Some((delim, start)),
            _ => None,
        }
    }

    fn last_ends_value(&self) -> bool {
        self.tokens.last().is_some_and(|t| t.ends_value())
    }

    fn pending_ternary(&mut self) -> &mut u32 {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.pending_ternary,
            None => &mut self.root_ternary,
        }
    }

    // ------------------------------------------------------------------------
    // Code
    // ------------------------------------------------------------------------

    fn lex_code(&mut self) -> Result<(), TokError> {
        let Some(c) = self.peek() else {
            return Ok(());
        };
        let start = self.pos;
        match c {
            '\n' => self.newline(start),
            c if c.is_whitespace() => {
                self.pos += c.len_utf8();
                self.saw_space = true;
            }
            '#' => self.skip_comment(start)?,
            ',' | ';' => self.push_token(TokType::Punct, start, start + 1),
            '(' => {
                self.push_token(TokType::Punct, start, start + 1);
                self.open(FrameKind::Paren);
            }
            '[' => {
                self.push_token(TokType::Punct, start, start + 1);
                self.open(FrameKind::Square);
            }
            '{' => {
                self.push_token(TokType::Punct, start, start + 1);
                self.open(FrameKind::Curly);
            }
            ')' | ']' | '}' => {
                self.push_token(TokType::Punct, start, start + 1);
                self.close(c);
            }
            '"' => {
                if self.rest().starts_with("\"\"\"") {
                    self.open_string(StrDelim::TripleQuote, start, start);
                } else {
                    self.open_string(StrDelim::Quote, start, start);
                }
            }
            '`' => {
                if self.rest().starts_with("```") {
                    self.open_string(StrDelim::TripleBacktick, start, start);
                } else {
                    self.open_string(StrDelim::Backtick, start, start);
                }
            }
            '\'' => self.quote_or_adjoint(start)?,
            '@' => self.macro_name(start),
            c if c.is_ascii_digit() => self.number(start),
            '.' if self.starts_fraction() => self.number(start),
            c if is_identifier_start(c) => self.identifier(start)?,
            _ => self.operator(start, c),
        }
        Ok(())
    }

    fn newline(&mut self, start: usize) {
        let significant = matches!(
            self.frames.last().map(|f| f.kind),
            None | Some(FrameKind::Block)
        );
        let emit = significant
            && self
                .tokens
                .last()
                .is_some_and(|t| t.kind != TokType::Newline && !t.continues_line());
        if significant {
            *self.pending_ternary() = 0;
        }
        if emit {
            self.push_token(TokType::Newline, start, start + 1);
        } else {
            self.pos = start + 1;
        }
        self.saw_space = true;
    }

    fn skip_comment(&mut self, start: usize) -> Result<(), TokError> {
        let rest = self.rest();
        if rest.starts_with("#=") {
            let bytes = rest.as_bytes();
            let mut depth = 0usize;
            let mut i = 0;
            loop {
                if i >= bytes.len() {
                    return Err(TokError::UnterminatedComment(start));
                }
                if bytes[i..].starts_with(b"#=") {
                    depth += 1;
                    i += 2;
                } else if bytes[i..].starts_with(b"=#") {
                    depth -= 1;
                    i += 2;
                    if depth == 0 {
                        break;
                    }
                } else {
                    i += 1;
                }
            }
            self.pos = start + i;
        } else {
            self.pos = match memchr::memchr(b'\n', rest.as_bytes()) {
                Some(i) => start + i,
                None => self.text.len(),
            };
        }
        self.saw_space = true;
        Ok(())
    }

    fn close(&mut self, c: char) {
        let want = match c {
            ')' => FrameKind::Paren,
            ']' => FrameKind::Square,
            _ => FrameKind::Curly,
        };
        for idx in (0..self.frames.len()).rev() {
            let kind = self.frames[idx].kind;
            if kind == want || (c == ')' && kind == FrameKind::Interp) {
                self.frames.truncate(idx);
                return;
            }
            if matches!(kind, FrameKind::Interp | FrameKind::Str { .. }) {
                return;
            }
        }
    }

    /// `prefix_end` is past any `md` prefix.
    fn open_string(&mut self, delim: StrDelim, start: usize, prefix_end: usize) {
        self.push_token(TokType::StringStart, start, prefix_end + delim.text().len());
        self.open(FrameKind::Str { delim, start });
    }

    fn quote_or_adjoint(&mut self, start: usize) -> Result<(), TokError> {
        if !self.saw_space && self.last_ends_value() {
            self.push_token(TokType::Op, start, start + 1);
            return Ok(());
        }
        let body = &self.text[start + 1..];
        let mut chars = body.chars();
        let mut len = match chars.next() {
            None | Some('\n') => return Err(TokError::UnterminatedChar(start)),
            Some('\\') => match chars.next() {
                None | Some('\n') => return Err(TokError::UnterminatedChar(start)),
                Some(c) => 1 + c.len_utf8(),
            },
            Some(c) => c.len_utf8(),
        };
        // Escapes such as '∀' run on to the closing quote
        loop {
            match body[len..].chars().next() {
                Some('\'') => break,
                None | Some('\n') => return Err(TokError::UnterminatedChar(start)),
                Some(c) => len += c.len_utf8(),
            }
        }
        self.push_token(TokType::Char, start, start + len + 2);
        Ok(())
    }

    fn macro_name(&mut self, start: usize) {
        let after = &self.text[start + 1..];
        match after.chars().next() {
            Some(c) if is_identifier_start(c) => {
                let end = scan_identifier(self.text, start + 1);
                self.push_token(TokType::MacroName, start, end);
            }
            Some('.') => self.push_token(TokType::MacroName, start, start + 2),
            _ => self.push_token(TokType::Op, start, start + 1),
        }
    }

    fn starts_fraction(&self) -> bool {
        let next_is_digit = self.rest()[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        next_is_digit && (self.saw_space || !self.last_ends_value())
    }

    fn number(&mut self, start: usize) {
        let bytes = self.text.as_bytes();
        let at = |i: usize| bytes.get(i).copied().unwrap_or(0);
        let digits = |mut i: usize| {
            while at(i).is_ascii_digit() || at(i) == b'_' {
                i += 1;
            }
            i
        };

        if at(start) == b'0' && matches!(at(start + 1), b'x' | b'b' | b'o') && at(start + 2).is_ascii_hexdigit() {
            let mut i = start + 2;
            while at(i).is_ascii_hexdigit() || at(i) == b'_' {
                i += 1;
            }
            self.push_token(TokType::Integer, start, i);
            return;
        }

        let mut kind = TokType::Integer;
        let mut i = digits(start);
        if at(i) == b'.' && at(i + 1).is_ascii_digit() {
            kind = TokType::Float;
            i = digits(i + 1);
        }
        if matches!(at(i), b'e' | b'E' | b'f') {
            let sign = usize::from(matches!(at(i + 1), b'+' | b'-'));
            if at(i + 1 + sign).is_ascii_digit() {
                kind = TokType::Float;
                i = digits(i + 1 + sign);
            }
        }
        self.push_token(kind, start, i);
    }

    fn identifier(&mut self, start: usize) -> Result<(), TokError> {
        let end = scan_identifier(self.text, start);
        let word = &self.text[start..end];

        if self.text[end..].starts_with('"') {
            if INTERPOLATING_PREFIXES.contains(&word) {
                let delim = if self.text[end..].starts_with("\"\"\"") {
                    StrDelim::TripleQuote
                } else {
                    StrDelim::Quote
                };
                self.open_string(delim, start, end);
                return Ok(());
            }
            return self.prefixed_string(start, end);
        }

        if std::mem::take(&mut self.type_keyword_next) && word == "type" {
            self.push_token(TokType::Keyword, start, end);
            return Ok(());
        }

        match word {
            "abstract" | "primitive" if self.followed_by_word(end, "type") => {
                self.push_token(TokType::Keyword, start, end);
                self.type_keyword_next = true;
                self.open(FrameKind::Block);
            }
            "mutable" if self.followed_by_word(end, "struct") => {
                self.push_token(TokType::Keyword, start, end);
            }
            "for" | "if" => {
                let opens = matches!(
                    self.frames.last().map(|f| f.kind),
                    None | Some(FrameKind::Block)
                ) || !self.last_ends_value();
                self.push_token(TokType::Keyword, start, end);
                if opens {
                    self.open(FrameKind::Block);
                }
            }
            "begin" => {
                if self.in_index() {
                    self.push_token(TokType::IndexKeyword, start, end);
                } else {
                    self.push_token(TokType::Keyword, start, end);
                    self.open(FrameKind::Block);
                }
            }
            "end" => self.end_keyword(start, end),
            w if BLOCK_KEYWORDS.contains(&w) => {
                self.push_token(TokType::Keyword, start, end);
                self.open(FrameKind::Block);
            }
            w if KEYWORDS.contains(&w) => self.push_token(TokType::Keyword, start, end),
            _ => self.push_token(TokType::Identifier, start, end),
        }
        Ok(())
    }

    fn followed_by_word(&self, end: usize, word: &str) -> bool {
        let rest = &self.text[end..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        trimmed.len() < rest.len()
            && trimmed.starts_with(word)
            && !trimmed[word.len()..]
                .chars()
                .next()
                .is_some_and(is_identifier_char)
    }

    fn in_index(&self) -> bool {
        for frame in self.frames.iter().rev() {
            match frame.kind {
                FrameKind::Square => return true,
                FrameKind::Paren | FrameKind::Curly => continue,
                _ => return false,
            }
        }
        false
    }

    fn end_keyword(&mut self, start: usize, end: usize) {
        let mut block = None;
        for idx in (0..self.frames.len()).rev() {
            match self.frames[idx].kind {
                FrameKind::Square => {
                    self.push_token(TokType::IndexKeyword, start, end);
                    return;
                }
                FrameKind::Block => {
                    block = Some(idx);
                    break;
                }
                FrameKind::Interp | FrameKind::Str { .. } => break,
                FrameKind::Paren | FrameKind::Curly => {}
            }
        }
        self.push_token(TokType::Keyword, start, end);
        if let Some(idx) = block {
            self.frames.truncate(idx);
        }
    }

    fn operator(&mut self, start: usize, c: char) {
        let rest = self.rest();
        let Some(len) = dotted_operator_len(rest).or_else(|| operator_len(rest)) else {
            self.push_token(TokType::Unknown, start, start + c.len_utf8());
            return;
        };
        let op = &rest[..len];
        let mut kind = TokType::Op;
        if op == "?" && self.saw_space {
            *self.pending_ternary() += 1;
        } else if op == ":" && self.saw_space && rest[1..].starts_with([' ', '\t', '\n']) {
            let pending = self.pending_ternary();
            if *pending > 0 {
                *pending -= 1;
                kind = TokType::TernaryColon;
            }
        }
        self.push_token(kind, start, start + len);
    }

    // ------------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------------

    fn lex_string_part(&mut self, delim: StrDelim, string_start: usize) -> Result<(), TokError> {
        let rest = self.rest();
        if rest.is_empty() {
            return Err(TokError::UnterminatedString(string_start));
        }
        let close = delim.text();
        let at = self.pos;
        if rest.starts_with(close) {
            self.push_token(TokType::StringEnd, at, at + close.len());
            self.frames.pop();
            return Ok(());
        }
        let mut i = 0;
        if rest.starts_with('$') {
            match rest[1..].chars().next() {
                Some('(') => {
                    self.push_token(TokType::Op, at, at + 1);
                    self.push_token(TokType::Punct, at + 1, at + 2);
                    self.open(FrameKind::Interp);
                    return Ok(());
                }
                Some(c) if is_identifier_start(c) => {
                    self.push_token(TokType::Op, at, at + 1);
                    let end = scan_identifier(self.text, at + 1);
                    self.push_token(TokType::Identifier, at + 1, end);
                    return Ok(());
                }
                // a lone `$` is literal text
                _ => i = 1,
            }
        }

        let bytes = rest.as_bytes();
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    i += 1;
                    i += rest[i..].chars().next().map_or(0, char::len_utf8);
                }
                b'$' => break,
                _ if bytes[i..].starts_with(close.as_bytes()) => break,
                _ => i += 1,
            }
        }
        self.push_token(TokType::StringChunk, at, at + i.min(bytes.len()));
        Ok(())
    }

    /// `r"..."`, `raw"..."`, `html"..."`: no interpolation, one chunk.
    fn prefixed_string(&mut self, start: usize, prefix_end: usize) -> Result<(), TokError> {
        let delim = if self.text[prefix_end..].starts_with("\"\"\"") {
            StrDelim::TripleQuote
        } else {
            StrDelim::Quote
        };
        let close = delim.text();
        let body_start = prefix_end + close.len();
        let bytes = self.text.as_bytes();
        let mut i = body_start;
        loop {
            if i >= bytes.len() {
                return Err(TokError::UnterminatedString(start));
            }
            if bytes[i] == b'\\' {
                i += 2;
            } else if bytes[i..].starts_with(close.as_bytes()) {
                break;
            } else {
                i += 1;
            }
        }
        let mut end = i + close.len();
        // flags such as r"..."i
        while bytes.get(end).is_some_and(|b| b.is_ascii_alphabetic()) {
            end += 1;
        }
        self.push_token(TokType::StringStart, start, body_start);
        if i > body_start {
            self.push_token(TokType::StringChunk, body_start, i);
        }
        self.push_token(TokType::StringEnd, i, end);
        Ok(())
    }
}

/// Tokenize Julia source text.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>, TokError> {
    TokState::new(text).tokenize()
}
