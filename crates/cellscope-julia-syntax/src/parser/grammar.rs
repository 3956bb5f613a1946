// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! PEG grammar for Julia over the token vector.
//!
//! The grammar works on [`Token`]s rather than characters: line breaks that
//! separate statements, index keywords and ternary colons have already been
//! resolved by the tokenizer. Every rule returns an owned [`Node`].
//!
//! Precedence, loosest first: assignment, `->`, `where`, `=>`, `? :`, `||`,
//! `&&`, comparisons, pipes, ranges, additive, multiplicative, shifts, unary,
//! `^`, `::`, postfix.

use std::fmt;

use cellscope_core::types::Span;
use peg::{Parse, ParseElem, RuleResult};

use crate::tokenizer::{TokType, Token};
use crate::tree::{Node, SyntaxKind};

// ============================================================================
// Token input
// ============================================================================

/// The token vector the grammar runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokVec<'a>(Vec<Token<'a>>);

impl<'a> From<Vec<Token<'a>>> for TokVec<'a> {
    fn from(vec: Vec<Token<'a>>) -> Self {
        TokVec(vec)
    }
}

/// Byte range of the token where a parse error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLoc {
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for ParseLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Parse for TokVec<'_> {
    type PositionRepr = ParseLoc;

    fn start(&self) -> usize {
        0
    }

    fn is_eof(&self, pos: usize) -> bool {
        pos >= self.0.len()
    }

    fn position_repr(&self, pos: usize) -> Self::PositionRepr {
        match self.0.get(pos).or_else(|| self.0.last()) {
            Some(tok) if pos < self.0.len() => ParseLoc {
                start: tok.span.start,
                end: tok.span.end,
            },
            Some(tok) => ParseLoc {
                start: tok.span.end,
                end: tok.span.end,
            },
            None => ParseLoc { start: 0, end: 0 },
        }
    }
}

impl<'input, 'a: 'input> ParseElem<'input> for TokVec<'a> {
    type Element = &'input Token<'a>;

    fn parse_elem(&'input self, pos: usize) -> RuleResult<Self::Element> {
        match self.0.get(pos) {
            Some(tok) => RuleResult::Matched(pos + 1, tok),
            None => RuleResult::Failed,
        }
    }
}

// ============================================================================
// Operator tables
// ============================================================================

const PLUS_OPS: &[&str] = &["+", "-", "|", "⊻", "∪", "±", "∓", "⊕"];
const TIMES_OPS: &[&str] = &["*", "/", "÷", "%", "&", "\\", "∘", "∩", "×", "⋅", "⊗", "//"];
const SHIFT_OPS: &[&str] = &["<<", ">>", ">>>"];
const UNARY_OPS: &[&str] = &["-", "+", "!", "~", "¬", "√", "∛", "<:", ">:"];
const COMPARISON_OPS: &[&str] = &[
    "==", "!=", "===", "!==", "<", ">", "<=", ">=", "≤", "≥", "≠", "≡", "≢", "≈", "<:", ">:", "∈",
    "∉", "∋", "⊆", "⊂", "⊇", "⊃",
];

/// True for `op` or its broadcasting form `.op`.
fn is_op_in(tok: &Token<'_>, set: &[&str]) -> bool {
    tok.kind == TokType::Op
        && (set.contains(&tok.text)
            || tok
                .text
                .strip_prefix('.')
                .is_some_and(|inner| set.contains(&inner)))
}

fn is_comparison(tok: &Token<'_>) -> bool {
    is_op_in(tok, COMPARISON_OPS) || tok.is_kw("in") || tok.is_kw("isa")
}

fn is_assignment_op(tok: &Token<'_>) -> bool {
    tok.kind == TokType::Op
        && (tok.text == "="
            || (tok.text.ends_with('=')
                && !is_op_in(tok, &["==", "===", "!=", "!==", "<=", ">="])))
}

// ============================================================================
// Node builders
// ============================================================================

fn leaf(kind: SyntaxKind, tok: &Token<'_>) -> Node {
    Node::leaf(kind, tok.span)
}

fn between(first: &Token<'_>, last: &Token<'_>) -> Span {
    Span::new(first.span.start, last.span.end)
}

fn from_to(start: usize, last: &Node) -> Span {
    Span::new(start, last.span.end.max(start))
}

/// Give an empty block a position instead of the default empty span.
fn seal_block(mut block: Node, at: usize) -> Node {
    if block.children.is_empty() {
        block.span = Span::empty(at);
    }
    block
}

fn error_node(tokens: &[&Token<'_>]) -> Node {
    let start = tokens.first().map_or(0, |t| t.span.start);
    let end = tokens.last().map_or(start, |t| t.span.end);
    Node::leaf(SyntaxKind::Error, Span::new(start, end))
}

fn fold_binary(first: Node, rest: Vec<(&Token<'_>, Node)>) -> Node {
    rest.into_iter().fold(first, |lhs, (op, rhs)| {
        Node::wrap(
            SyntaxKind::BinaryExpression,
            vec![lhs, leaf(SyntaxKind::Operator, op), rhs],
        )
    })
}

fn assignment(lhs: Node, op: &Token<'_>, rhs: Node) -> Node {
    let kind = if op.text == "=" {
        SyntaxKind::Assignment
    } else {
        SyntaxKind::CompoundAssignment
    };
    Node::wrap(kind, vec![lhs, leaf(SyntaxKind::Operator, op), rhs])
}

fn maybe_assignment(lhs: Node, rhs: Option<(&Token<'_>, Node)>) -> Node {
    match rhs {
        Some((op, rhs)) => assignment(lhs, op, rhs),
        None => lhs,
    }
}

fn list_node(kind: SyntaxKind, open: &Token<'_>, close: &Token<'_>, items: Vec<Node>) -> Node {
    Node::new(kind, between(open, close), items)
}

#[derive(Debug, Clone)]
enum Postfix {
    Call { args: Node, do_clause: Option<Node> },
    Broadcast(Node),
    Index { args: Vec<Node>, end: usize },
    Field(Node),
    Curly { args: Vec<Node>, end: usize },
    Adjoint(usize),
    Splat(usize),
}

fn apply_postfix(base: Node, ops: Vec<Postfix>) -> Node {
    ops.into_iter().fold(base, |acc, op| {
        let start = acc.span.start;
        match op {
            Postfix::Call { args, do_clause } => {
                let mut children = vec![acc, args];
                children.extend(do_clause);
                Node::wrap(SyntaxKind::CallExpression, children)
            }
            Postfix::Broadcast(args) => Node::wrap(SyntaxKind::BroadcastCall, vec![acc, args]),
            Postfix::Index { args, end } => {
                let mut children = vec![acc];
                children.extend(args);
                Node::new(SyntaxKind::IndexExpression, Span::new(start, end), children)
            }
            Postfix::Field(name) => Node::wrap(SyntaxKind::FieldExpression, vec![acc, name]),
            Postfix::Curly { args, end } => {
                let mut children = vec![acc];
                children.extend(args);
                Node::new(SyntaxKind::CurlyExpression, Span::new(start, end), children)
            }
            Postfix::Adjoint(end) => {
                Node::new(SyntaxKind::AdjointExpression, Span::new(start, end), vec![acc])
            }
            Postfix::Splat(end) => {
                Node::new(SyntaxKind::SplatExpression, Span::new(start, end), vec![acc])
            }
        }
    })
}

fn call_arguments(
    open: &Token<'_>,
    close: &Token<'_>,
    mut positional: Vec<Node>,
    keywords: Option<(&Token<'_>, Vec<Node>)>,
) -> Node {
    if let Some((semi, kws)) = keywords {
        let span = match kws.last() {
            Some(last) => from_to(semi.span.start, last),
            None => semi.span,
        };
        positional.push(Node::new(SyntaxKind::KeywordArguments, span, kws));
    }
    list_node(SyntaxKind::ArgumentList, open, close, positional)
}

fn prepend(first: Node, rest: Vec<Node>) -> Vec<Node> {
    let mut items = Vec::with_capacity(rest.len() + 1);
    items.push(first);
    items.extend(rest);
    items
}

// ============================================================================
// Grammar
// ============================================================================

peg::parser! {
    pub grammar julia<'a>() for TokVec<'a> {

        // --------------------------------------------------------------------
        // Tokens
        // --------------------------------------------------------------------

        rule tok(kind: TokType, expected: &'static str) -> &'input Token<'a>
            = [t] {? if t.kind == kind { Ok(t) } else { Err(expected) } }

        rule op(s: &'static str) -> &'input Token<'a>
            = [t] {? if t.is_op(s) { Ok(t) } else { Err(s) } }

        rule kw(s: &'static str) -> &'input Token<'a>
            = [t] {? if t.is_kw(s) { Ok(t) } else { Err(s) } }

        rule p(s: &'static str) -> &'input Token<'a>
            = [t] {? if t.is_punct(s) { Ok(t) } else { Err(s) } }

        /// Bracket with no whitespace before it (`f(x)`, `a[i]`, `T{S}`).
        rule tight_p(s: &'static str) -> &'input Token<'a>
            = [t] {? if t.is_punct(s) && !t.space_before { Ok(t) } else { Err(s) } }

        rule newline()
            = [t] {? if t.kind == TokType::Newline { Ok(()) } else { Err("newline") } }

        rule sep()
            = newline()
            / p(";") { }

        rule eof() = ![_]

        rule block_end()
            = kw("end") { }
            / kw("else") { }
            / kw("elseif") { }
            / kw("catch") { }
            / kw("finally") { }

        rule name() -> Node
            = t:tok(TokType::Identifier, "identifier") { leaf(SyntaxKind::Identifier, t) }

        // --------------------------------------------------------------------
        // Files and blocks
        // --------------------------------------------------------------------

        pub rule file() -> Node
            = sep()* items:(top_item() ** (sep()+)) sep()* tail:lex_error()? eof() {
                let mut items = items;
                items.extend(tail);
                Node::wrap(SyntaxKind::SourceFile, items)
            }

        rule top_item() -> Node
            = s:statement() &(sep() / lex_error() / eof()) { s }
            / ts:(!sep() !lex_error() t:[_] { t })+ { error_node(&ts) }

        /// Unterminated literal or comment reaching the end of the input.
        rule lex_error() -> Node
            = t:tok(TokType::Error, "end of input") { leaf(SyntaxKind::Error, t) }

        rule block() -> Node
            = sep()* items:(block_item() ** (sep()+)) sep()* {
                Node::wrap(SyntaxKind::Block, items)
            }

        rule block_item() -> Node
            = s:statement() &(sep() / block_end()) { s }
            / ts:(!sep() !block_end() t:[_] { t })+ { error_node(&ts) }

        // --------------------------------------------------------------------
        // Statements
        // --------------------------------------------------------------------

        #[cache]
        pub rule statement() -> Node
            = keyword_statement()
            / statement_expr()

        rule keyword_statement() -> Node
            = struct_def()
            / abstract_def()
            / primitive_def()
            / module_def()
            / macro_def()
            / import_stmt()
            / export_stmt()
            / const_stmt()
            / global_stmt()
            / local_stmt()
            / return_stmt()
            / t:kw("break") { leaf(SyntaxKind::BreakStatement, t) }
            / t:kw("continue") { leaf(SyntaxKind::ContinueStatement, t) }

        /// Assignment with comma lists on both sides, right associative.
        rule statement_expr() -> Node
            = l:comma_list() r:(o:assign_op() r:statement_expr() { (o, r) })? {
                maybe_assignment(l, r)
            }

        rule comma_list() -> Node
            = first:arrow() rest:(p(",") e:arrow() { e })* trailing:p(",")? {
                if rest.is_empty() && trailing.is_none() {
                    first
                } else {
                    let mut node = Node::wrap(SyntaxKind::TupleExpression, prepend(first, rest));
                    if let Some(t) = trailing {
                        node.span.end = t.span.end;
                    }
                    node
                }
            }

        rule assign_op() -> &'input Token<'a>
            = [t] {? if is_assignment_op(t) { Ok(t) } else { Err("assignment") } }

        rule struct_def() -> Node
            = m:kw("mutable")? s:kw("struct") h:type_head() b:block() e:kw("end") {
                let start = m.unwrap_or(s);
                let b = seal_block(b, h.span.end);
                Node::new(SyntaxKind::StructDefinition, between(start, e), vec![h, b])
            }

        rule abstract_def() -> Node
            = a:kw("abstract") kw("type") h:type_head() e:kw("end") {
                Node::new(SyntaxKind::AbstractDefinition, between(a, e), vec![h])
            }

        rule primitive_def() -> Node
            = p:kw("primitive") kw("type") h:type_head() bits:arrow() e:kw("end") {
                Node::new(SyntaxKind::PrimitiveDefinition, between(p, e), vec![h, bits])
            }

        rule type_head() -> Node
            = h:comparison() { Node::wrap(SyntaxKind::TypeHead, vec![h]) }

        rule module_def() -> Node
            = m:(kw("module") / kw("baremodule")) n:name() b:block() e:kw("end") {
                let b = seal_block(b, n.span.end);
                Node::new(SyntaxKind::ModuleDefinition, between(m, e), vec![n, b])
            }

        rule macro_def() -> Node
            = m:kw("macro") sig:signature() b:block() e:kw("end") {
                let b = seal_block(b, sig.span.end);
                Node::new(SyntaxKind::MacroDefinition, between(m, e), vec![sig, b])
            }

        rule import_stmt() -> Node
            = t:(kw("import") / kw("using")) items:import_list() {
                let kind = if t.text == "using" {
                    SyntaxKind::UsingStatement
                } else {
                    SyntaxKind::ImportStatement
                };
                let span = match items.last() {
                    Some(last) => from_to(t.span.start, last),
                    None => t.span,
                };
                Node::new(kind, span, items)
            }

        rule import_list() -> Vec<Node>
            = path:import_path() op(":") sel:(import_item() ++ p(",")) {
                vec![Node::wrap(SyntaxKind::SelectedImport, prepend(path, sel))]
            }
            / import_item() ++ p(",")

        rule import_item() -> Node
            = path:import_path() alias:(as_kw() n:import_name() { n })? {
                match alias {
                    Some(n) => Node::wrap(SyntaxKind::ImportAlias, vec![path, n]),
                    None => path,
                }
            }

        rule import_path() -> Node
            = dots:import_dot()* first:import_name() rest:(op(".") n:import_name() { n })* {
                let names = prepend(first, rest);
                let start = dots.first().map_or(names[0].span.start, |d| d.span.start);
                let end = names.last().map_or(start, |n| n.span.end);
                Node::new(SyntaxKind::ImportPath, Span::new(start, end), names)
            }

        rule import_dot() -> &'input Token<'a>
            = op(".") / op("..") / op("...")

        rule import_name() -> Node
            = name()
            / t:tok(TokType::MacroName, "macro name") { leaf(SyntaxKind::MacroIdentifier, t) }
            / [t] {? if t.kind == TokType::Op { Ok(leaf(SyntaxKind::Operator, t)) } else { Err("name") } }

        rule as_kw()
            = [t] {? if t.kind == TokType::Identifier && t.text == "as" { Ok(()) } else { Err("as") } }

        rule export_stmt() -> Node
            = t:kw("export") names:(import_name() ++ p(",")) {
                let span = match names.last() {
                    Some(last) => from_to(t.span.start, last),
                    None => t.span,
                };
                Node::new(SyntaxKind::ExportStatement, span, names)
            }

        rule const_stmt() -> Node
            = t:kw("const") s:statement_expr() {
                Node::new(SyntaxKind::ConstStatement, from_to(t.span.start, &s), vec![s])
            }

        rule global_stmt() -> Node
            = t:kw("global") s:statement_expr() {
                Node::new(SyntaxKind::GlobalStatement, from_to(t.span.start, &s), vec![s])
            }

        rule local_stmt() -> Node
            = t:kw("local") s:statement_expr() {
                Node::new(SyntaxKind::LocalStatement, from_to(t.span.start, &s), vec![s])
            }

        rule return_stmt() -> Node
            = t:kw("return") v:statement_expr()? {
                match v {
                    Some(v) => Node::new(SyntaxKind::ReturnStatement, from_to(t.span.start, &v), vec![v]),
                    None => leaf(SyntaxKind::ReturnStatement, t),
                }
            }

        // --------------------------------------------------------------------
        // Expressions
        // --------------------------------------------------------------------

        /// A single (comma-free) expression, optionally assigned.
        #[cache]
        rule expr() -> Node
            = l:arrow() r:(o:assign_op() r:expr() { (o, r) })? { maybe_assignment(l, r) }

        rule arrow() -> Node
            = l:where_expr() r:(op("->") b:expr() { b })? {
                match r {
                    Some(body) => Node::wrap(SyntaxKind::ArrowFunction, vec![l, body]),
                    None => l,
                }
            }

        rule where_expr() -> Node
            = l:pair() ws:(kw("where") w:pair() { w })* {
                if ws.is_empty() {
                    l
                } else {
                    Node::wrap(SyntaxKind::WhereExpression, prepend(l, ws))
                }
            }

        rule pair() -> Node
            = l:ternary() r:(o:op("=>") r:pair() { (o, r) })? {
                match r {
                    Some(r) => fold_binary(l, vec![r]),
                    None => l,
                }
            }

        rule ternary() -> Node
            = c:or_expr() r:(op("?") a:ternary() tok(TokType::TernaryColon, ":") b:ternary() { (a, b) })? {
                match r {
                    Some((a, b)) => Node::wrap(SyntaxKind::TernaryExpression, vec![c, a, b]),
                    None => c,
                }
            }

        rule or_expr() -> Node
            = l:and_expr() rs:(o:op("||") r:and_expr() { (o, r) })* { fold_binary(l, rs) }

        rule and_expr() -> Node
            = l:comparison() rs:(o:op("&&") r:comparison() { (o, r) })* { fold_binary(l, rs) }

        rule comparison() -> Node
            = l:pipe() rs:(o:comparison_op() r:pipe() { (o, r) })* { fold_binary(l, rs) }

        rule comparison_op() -> &'input Token<'a>
            = [t] {? if is_comparison(t) { Ok(t) } else { Err("comparison") } }

        rule pipe() -> Node
            = l:range() rs:(o:(op("|>") / op("<|")) r:range() { (o, r) })* { fold_binary(l, rs) }

        rule range() -> Node
            = first:plus() rest:((op(":") / op("..")) e:plus() { e })* {
                if rest.is_empty() {
                    first
                } else {
                    Node::wrap(SyntaxKind::RangeExpression, prepend(first, rest))
                }
            }

        rule plus() -> Node
            = l:times() rs:(o:binary_op(PLUS_OPS) r:times() { (o, r) })* { fold_binary(l, rs) }

        rule times() -> Node
            = l:shift() rs:(o:binary_op(TIMES_OPS) r:shift() { (o, r) })* { fold_binary(l, rs) }

        rule shift() -> Node
            = l:unary() rs:(o:binary_op(SHIFT_OPS) r:unary() { (o, r) })* { fold_binary(l, rs) }

        rule binary_op(set: &'static [&'static str]) -> &'input Token<'a>
            = [t] {? if is_op_in(t, set) { Ok(t) } else { Err("operator") } }

        rule unary() -> Node
            = o:binary_op(UNARY_OPS) e:unary() {
                Node::wrap(SyntaxKind::UnaryExpression, vec![leaf(SyntaxKind::Operator, o), e])
            }
            / t:op("::") e:unary() {
                Node::new(SyntaxKind::TypeClause, from_to(t.span.start, &e), vec![e])
            }
            / power()

        rule power() -> Node
            = b:typed() r:(o:(op("^") / op(".^")) e:unary() { (o, e) })? {
                match r {
                    Some(r) => fold_binary(b, vec![r]),
                    None => b,
                }
            }

        #[cache]
        rule typed() -> Node
            = e:postfix() ts:(op("::") t:postfix() { t })* {
                ts.into_iter().fold(e, |acc, t| Node::wrap(SyntaxKind::TypedExpression, vec![acc, t]))
            }

        #[cache]
        rule postfix() -> Node
            = a:atom() ops:postfix_op()* { apply_postfix(a, ops) }

        rule postfix_op() -> Postfix
            = l:tight_p("(") args:call_args() r:p(")") d:do_clause()? {
                Postfix::Call { args: call_arguments(l, r, args.0, args.1), do_clause: d }
            }
            / op(".") l:tight_p("(") args:call_args() r:p(")") {
                Postfix::Broadcast(call_arguments(l, r, args.0, args.1))
            }
            / op(".") n:field_name() { Postfix::Field(n) }
            / tight_p("[") args:index_args() r:p("]") { Postfix::Index { args, end: r.span.end } }
            / tight_p("{") args:(arrow() ** p(",")) p(",")? r:p("}") {
                Postfix::Curly { args, end: r.span.end }
            }
            / t:op("'") { Postfix::Adjoint(t.span.end) }
            / t:op("...") { Postfix::Splat(t.span.end) }

        rule field_name() -> Node
            = name()
            / interpolation()
            / symbol()

        /// Positional arguments plus the keyword section after `;`.
        rule call_args() -> (Vec<Node>, Option<(&'input Token<'a>, Vec<Node>)>)
            = g:generator() { (vec![g], None) }
            / pos:(call_item() ** p(",")) p(",")? kws:(s:p(";") ks:(call_item() ** p(",")) p(",")? { (s, ks) })? {
                (pos, kws)
            }

        rule call_item() -> Node
            = k:typed() op("=") v:arrow() { Node::wrap(SyntaxKind::KeywordArgument, vec![k, v]) }
            / arrow()

        rule index_args() -> Vec<Node>
            = c:comprehension() { vec![c] }
            / items:(arrow() ** p(",")) p(",")? { items }

        rule do_clause() -> Node
            = d:kw("do") params:(arrow() ** p(",")) b:block() e:kw("end") {
                let params = if params.is_empty() {
                    Node::new(SyntaxKind::ParameterList, Span::empty(d.span.end), params)
                } else {
                    Node::wrap(SyntaxKind::ParameterList, params)
                };
                let b = seal_block(b, params.span.end);
                Node::new(SyntaxKind::DoClause, between(d, e), vec![params, b])
            }

        // --------------------------------------------------------------------
        // Comprehensions
        // --------------------------------------------------------------------

        rule comprehension() -> Node
            = body:arrow() cs:comprehension_clauses() {
                Node::wrap(SyntaxKind::Comprehension, prepend(body, cs))
            }

        rule generator() -> Node
            = body:arrow() cs:comprehension_clauses() {
                Node::wrap(SyntaxKind::Generator, prepend(body, cs))
            }

        rule comprehension_clauses() -> Vec<Node>
            = first:for_clause() rest:(for_clause() / if_clause())* { prepend(first, rest) }

        rule for_clause() -> Node
            = t:kw("for") bs:(for_binding() ++ p(",")) {
                let span = match bs.last() {
                    Some(last) => from_to(t.span.start, last),
                    None => t.span,
                };
                Node::new(SyntaxKind::ForClause, span, bs)
            }

        rule if_clause() -> Node
            = t:kw("if") c:arrow() {
                Node::new(SyntaxKind::IfClause, from_to(t.span.start, &c), vec![c])
            }

        rule for_binding() -> Node
            = target:typed() (kw("in") / op("=") / op("∈")) iter:ternary() {
                Node::wrap(SyntaxKind::ForBinding, vec![target, iter])
            }

        // --------------------------------------------------------------------
        // Atoms
        // --------------------------------------------------------------------

        #[cache]
        rule atom() -> Node
            = macro_call()
            / name()
            / number()
            / string()
            / t:tok(TokType::Char, "character") { leaf(SyntaxKind::CharLiteral, t) }
            / t:(kw("true") / kw("false")) { leaf(SyntaxKind::BooleanLiteral, t) }
            / t:tok(TokType::IndexKeyword, "end") { leaf(SyntaxKind::IndexKeyword, t) }
            / quote_expr()
            / symbol()
            / interpolation()
            / paren()
            / bracket()
            / braces()
            / block_construct()
            / operator_value()

        rule number() -> Node
            = n:number_literal() j:juxtaposed()? {
                match j {
                    Some(rhs) => Node::wrap(SyntaxKind::Juxtaposition, vec![n, rhs]),
                    None => n,
                }
            }

        rule number_literal() -> Node
            = t:tok(TokType::Integer, "integer") { leaf(SyntaxKind::IntegerLiteral, t) }
            / t:tok(TokType::Float, "float") { leaf(SyntaxKind::FloatLiteral, t) }

        /// `x` in `2x`, `(x + 1)` in `2(x + 1)`.
        rule juxtaposed() -> Node
            = [t] {? if t.kind == TokType::Identifier && !t.space_before { Ok(leaf(SyntaxKind::Identifier, t)) } else { Err("identifier") } }
            / &tight_p("(") e:paren() { e }

        rule string() -> Node
            = s:tok(TokType::StringStart, "string") parts:string_part()* e:tok(TokType::StringEnd, "end of string") {
                Node::new(SyntaxKind::StringLiteral, between(s, e), parts.into_iter().flatten().collect())
            }

        rule string_part() -> Option<Node>
            = tok(TokType::StringChunk, "string") { None }
            / i:interpolation() { Some(i) }

        rule interpolation() -> Node
            = d:op("$") e:(name() / paren()) {
                Node::new(SyntaxKind::Interpolation, from_to(d.span.start, &e), vec![e])
            }

        rule quote_expr() -> Node
            = c:op(":") &tight_p("(") e:paren() {
                Node::new(SyntaxKind::QuoteExpression, from_to(c.span.start, &e), vec![e])
            }

        rule symbol() -> Node
            = c:op(":") t:[t] {?
                if !t.space_before && matches!(t.kind, TokType::Identifier | TokType::Keyword | TokType::Op) {
                    Ok(Node::leaf(SyntaxKind::Symbol, between(c, t)))
                } else {
                    Err("symbol")
                }
            }
            / c:op(":") { leaf(SyntaxKind::Colon, c) }

        /// An operator used as a value: `map(+, xs)`, `==(a, b)`.
        rule operator_value() -> Node
            = o:([t] {? if t.kind == TokType::Op && !is_assignment_op(t) && t.text != "..." { Ok(leaf(SyntaxKind::Operator, t)) } else { Err("operator") } })
              &(p(",") / p(")") / p("]") / tight_p("(")) { o }

        #[cache]
        rule paren() -> Node
            = l:p("(") r:p(")") { list_node(SyntaxKind::TupleExpression, l, r, Vec::new()) }
            / l:p("(") s:p(";") ks:(call_item() ** p(",")) p(",")? r:p(")") {
                let span = match ks.last() {
                    Some(last) => from_to(s.span.start, last),
                    None => s.span,
                };
                let kws = Node::new(SyntaxKind::KeywordArguments, span, ks);
                list_node(SyntaxKind::TupleExpression, l, r, vec![kws])
            }
            / l:p("(") g:generator() r:p(")") {
                Node::new(SyntaxKind::Generator, between(l, r), g.children)
            }
            / l:p("(") first:call_item() p(",") rest:(call_item() ** p(",")) p(",")? r:p(")") {
                list_node(SyntaxKind::TupleExpression, l, r, prepend(first, rest))
            }
            / l:p("(") s:statement() r:p(")") {
                list_node(SyntaxKind::ParenthesizedExpression, l, r, vec![s])
            }
            / l:p("(") ss:(statement() ++ p(";")) p(";")? r:p(")") {
                let block = Node::wrap(SyntaxKind::Block, ss);
                list_node(SyntaxKind::ParenthesizedExpression, l, r, vec![block])
            }

        #[cache]
        rule bracket() -> Node
            = l:p("[") r:p("]") { list_node(SyntaxKind::VectorExpression, l, r, Vec::new()) }
            / l:p("[") c:comprehension() r:p("]") {
                Node::new(SyntaxKind::Comprehension, between(l, r), c.children)
            }
            / l:p("[") items:(arrow() ++ p(",")) p(",")? r:p("]") {
                list_node(SyntaxKind::VectorExpression, l, r, items)
            }
            / l:p("[") rows:(matrix_row() ++ p(";")) p(";")? r:p("]") {
                list_node(SyntaxKind::MatrixExpression, l, r, rows)
            }

        rule matrix_row() -> Node
            = es:arrow()+ { Node::wrap(SyntaxKind::MatrixRow, es) }

        rule braces() -> Node
            = l:p("{") items:(arrow() ** p(",")) p(",")? r:p("}") {
                list_node(SyntaxKind::BracesExpression, l, r, items)
            }

        rule macro_call() -> Node
            = m:macro_callee() l:tight_p("(") args:call_args() r:p(")") {
                Node::wrap(SyntaxKind::MacroCall, vec![m, call_arguments(l, r, args.0, args.1)])
            }
            / m:macro_callee() args:macro_argument()* {
                Node::wrap(SyntaxKind::MacroCall, prepend(m, args))
            }

        /// `@m`, or a qualified `Base.@kwdef` as nested field expressions.
        rule macro_callee() -> Node
            = base:name() path:(op(".") n:name() { n })* op(".") m:macro_name() {
                let module = path.into_iter().fold(base, |acc, n| {
                    Node::wrap(SyntaxKind::FieldExpression, vec![acc, n])
                });
                Node::wrap(SyntaxKind::FieldExpression, vec![module, m])
            }
            / macro_name()

        rule macro_name() -> Node
            = t:tok(TokType::MacroName, "macro name") { leaf(SyntaxKind::MacroIdentifier, t) }

        rule macro_argument() -> Node
            = keyword_statement()
            / statement_expr()

        // --------------------------------------------------------------------
        // Block constructs
        // --------------------------------------------------------------------

        rule block_construct() -> Node
            = function_def()
            / begin_block()
            / let_block()
            / for_block()
            / while_block()
            / if_block()
            / try_block()
            / quote_block()

        rule function_def() -> Node
            = f:kw("function") sig:signature() b:block() e:kw("end") {
                let b = seal_block(b, sig.span.end);
                Node::new(SyntaxKind::FunctionDefinition, between(f, e), vec![sig, b])
            }

        rule signature() -> Node
            = s:where_expr() { Node::wrap(SyntaxKind::Signature, vec![s]) }

        rule begin_block() -> Node
            = t:kw("begin") b:block() e:kw("end") {
                let b = seal_block(b, t.span.end);
                Node::new(SyntaxKind::BeginBlock, between(t, e), vec![b])
            }

        rule quote_block() -> Node
            = t:kw("quote") b:block() e:kw("end") {
                let b = seal_block(b, t.span.end);
                Node::new(SyntaxKind::QuoteStatement, between(t, e), vec![b])
            }

        rule let_block() -> Node
            = t:kw("let") bindings:(expr() ** p(",")) b:block() e:kw("end") {
                let bindings = if bindings.is_empty() {
                    Node::new(SyntaxKind::LetBindings, Span::empty(t.span.end), bindings)
                } else {
                    Node::wrap(SyntaxKind::LetBindings, bindings)
                };
                let b = seal_block(b, bindings.span.end);
                Node::new(SyntaxKind::LetStatement, between(t, e), vec![bindings, b])
            }

        rule for_block() -> Node
            = t:kw("for") bs:(for_binding() ++ p(",")) b:block() e:kw("end") {
                let at = bs.last().map_or(t.span.end, |last| last.span.end);
                let mut children = bs;
                children.push(seal_block(b, at));
                Node::new(SyntaxKind::ForStatement, between(t, e), children)
            }

        rule while_block() -> Node
            = t:kw("while") c:arrow() b:block() e:kw("end") {
                let b = seal_block(b, c.span.end);
                Node::new(SyntaxKind::WhileStatement, between(t, e), vec![c, b])
            }

        rule if_block() -> Node
            = t:kw("if") c:arrow() b:block() elseifs:elseif_clause()* otherwise:else_clause()? e:kw("end") {
                let b = seal_block(b, c.span.end);
                let mut children = vec![c, b];
                children.extend(elseifs);
                children.extend(otherwise);
                Node::new(SyntaxKind::IfStatement, between(t, e), children)
            }

        rule elseif_clause() -> Node
            = t:kw("elseif") c:arrow() b:block() {
                let b = seal_block(b, c.span.end);
                Node::new(SyntaxKind::ElseifClause, from_to(t.span.start, &b), vec![c, b])
            }

        rule else_clause() -> Node
            = t:kw("else") b:block() {
                let b = seal_block(b, t.span.end);
                Node::new(SyntaxKind::ElseClause, from_to(t.span.start, &b), vec![b])
            }

        rule try_block() -> Node
            = t:kw("try") b:block() c:catch_clause()? otherwise:else_clause()? f:finally_clause()? e:kw("end") {
                let mut children = vec![seal_block(b, t.span.end)];
                children.extend(c);
                children.extend(otherwise);
                children.extend(f);
                Node::new(SyntaxKind::TryStatement, between(t, e), children)
            }

        rule catch_clause() -> Node
            = t:kw("catch") v:name()? b:block() {
                let at = v.as_ref().map_or(t.span.end, |v| v.span.end);
                let mut children: Vec<Node> = v.into_iter().collect();
                let b = seal_block(b, at);
                let span = from_to(t.span.start, &b);
                children.push(b);
                Node::new(SyntaxKind::CatchClause, span, children)
            }

        rule finally_clause() -> Node
            = t:kw("finally") b:block() {
                let b = seal_block(b, t.span.end);
                Node::new(SyntaxKind::FinallyClause, from_to(t.span.start, &b), vec![b])
            }
    }
}
