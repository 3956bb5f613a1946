// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parse tree shape tests.
//!
//! Trees are rendered as s-expressions: leaves print their source text and
//! interior nodes print `(Kind child ...)`.

use cellscope_julia_syntax::{parse, SyntaxKind, SyntaxNode};

fn render(node: SyntaxNode<'_>, src: &str) -> String {
    if node.kind().is_leaf() {
        return node.text(src).unwrap_or("").to_string();
    }
    let mut out = format!("({}", node.kind());
    for child in node.children() {
        out.push(' ');
        out.push_str(&render(child, src));
    }
    out.push(')');
    out
}

fn sexp(src: &str) -> String {
    let tree = parse(src).unwrap_or_else(|e| panic!("{:?} doesn't parse: {}", src, e));
    render(tree.root(), src)
}

fn check(src: &str, expected: &str) {
    assert_eq!(sexp(src), expected, "source: {:?}", src);
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_assignment() {
    check("x = y + 1", "(SourceFile (Assignment x = (BinaryExpression y + 1)))");
    check(
        "x = a = a + 1",
        "(SourceFile (Assignment x = (Assignment a = (BinaryExpression a + 1))))",
    );
    check("a += 1", "(SourceFile (CompoundAssignment a += 1))");
}

#[test]
fn test_destructuring_assignment() {
    check(
        "a, b = 1, 2",
        "(SourceFile (Assignment (TupleExpression a b) = (TupleExpression 1 2)))",
    );
}

#[test]
fn test_short_function_definition() {
    check(
        "f(x) = x",
        "(SourceFile (Assignment (CallExpression f (ArgumentList x)) = x))",
    );
}

#[test]
fn test_precedence() {
    check(
        "a + b * c ^ d",
        "(SourceFile (BinaryExpression a + (BinaryExpression b * (BinaryExpression c ^ d))))",
    );
    check(
        "a || b && c == d",
        "(SourceFile (BinaryExpression a || (BinaryExpression b && (BinaryExpression c == d))))",
    );
    check("-x^2", "(SourceFile (UnaryExpression - (BinaryExpression x ^ 2)))");
    check("x isa Foo", "(SourceFile (BinaryExpression x isa Foo))");
}

#[test]
fn test_ranges() {
    check("a:b", "(SourceFile (RangeExpression a b))");
    check("a : b", "(SourceFile (RangeExpression a b))");
    check("1:2:n", "(SourceFile (RangeExpression 1 2 n))");
    check("a[1:end]", "(SourceFile (IndexExpression a (RangeExpression 1 end)))");
}

#[test]
fn test_ternary() {
    check("a ? b : c", "(SourceFile (TernaryExpression a b c))");
    check("c ? :x : :y", "(SourceFile (TernaryExpression c :x :y))");
}

#[test]
fn test_symbols_and_quotes() {
    check(":a", "(SourceFile :a)");
    check(
        ":(x + $y)",
        "(SourceFile (QuoteExpression (ParenthesizedExpression (BinaryExpression x + (Interpolation y)))))",
    );
    check("a[:, 1]", "(SourceFile (IndexExpression a : 1))");
}

#[test]
fn test_calls_and_keywords() {
    check(
        "f(a, b=c; d=e)",
        "(SourceFile (CallExpression f (ArgumentList a (KeywordArgument b c) (KeywordArguments (KeywordArgument d e)))))",
    );
    check("f()", "(SourceFile (CallExpression f (ArgumentList)))");
    check("f.(x)", "(SourceFile (BroadcastCall f (ArgumentList x)))");
    check("+(a...)", "(SourceFile (UnaryExpression + (ParenthesizedExpression (SplatExpression a))))");
    check("map(+, xs)", "(SourceFile (CallExpression map (ArgumentList + xs)))");
}

#[test]
fn test_space_before_paren_is_not_a_call() {
    check("[f (x)]", "(SourceFile (MatrixExpression (MatrixRow f (ParenthesizedExpression x))))");
}

#[test]
fn test_postfix_chains() {
    check("a.b.c", "(SourceFile (FieldExpression (FieldExpression a b) c))");
    check("x'", "(SourceFile (AdjointExpression x))");
    check("Foo[]", "(SourceFile (IndexExpression Foo))");
    check(
        "A{T} = Union{T,Int}",
        "(SourceFile (Assignment (CurlyExpression A T) = (CurlyExpression Union T Int)))",
    );
}

#[test]
fn test_type_annotations() {
    check("x::Foo = 3", "(SourceFile (Assignment (TypedExpression x Foo) = 3))");
    check(
        "(x[])::Int = 1",
        "(SourceFile (Assignment (TypedExpression (ParenthesizedExpression (IndexExpression x)) Int) = 1))",
    );
}

#[test]
fn test_juxtaposition() {
    check("2x", "(SourceFile (Juxtaposition 2 x))");
}

#[test]
fn test_arrow_function() {
    check("x -> x + 1", "(SourceFile (ArrowFunction x (BinaryExpression x + 1)))");
}

#[test]
fn test_strings() {
    check(
        "\"a $x b\"",
        "(SourceFile (StringLiteral (Interpolation x)))",
    );
    check("r\"a$b\"", "(SourceFile (StringLiteral))");
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_vectors_and_matrices() {
    check("[a..., b]", "(SourceFile (VectorExpression (SplatExpression a) b))");
    check(
        "[1 2; 3 4]",
        "(SourceFile (MatrixExpression (MatrixRow 1 2) (MatrixRow 3 4)))",
    );
    check(
        "[a[1:3,4]; b[5]]",
        "(SourceFile (MatrixExpression (MatrixRow (IndexExpression a (RangeExpression 1 3) 4)) (MatrixRow (IndexExpression b 5))))",
    );
}

#[test]
fn test_comprehension_and_generator() {
    check(
        "[x^2 for x in arr]",
        "(SourceFile (Comprehension (BinaryExpression x ^ 2) (ForClause (ForBinding x arr))))",
    );
    check(
        "sum(x for x in xs if x > 0)",
        "(SourceFile (CallExpression sum (ArgumentList (Generator x (ForClause (ForBinding x xs)) (IfClause (BinaryExpression x > 0))))))",
    );
}

#[test]
fn test_named_tuple() {
    check(
        "(a = 1, b = 2)",
        "(SourceFile (TupleExpression (KeywordArgument a 1) (KeywordArgument b 2)))",
    );
    check("(a,)", "(SourceFile (TupleExpression a))");
}

// ============================================================================
// Block constructs
// ============================================================================

#[test]
fn test_function_definition() {
    check(
        "function f(x, y)\n  x + y\nend",
        "(SourceFile (FunctionDefinition (Signature (CallExpression f (ArgumentList x y))) (Block (BinaryExpression x + y))))",
    );
    check(
        "function foo(; kwargzzzz=1)\n  kwargzzzz\nend",
        "(SourceFile (FunctionDefinition (Signature (CallExpression foo (ArgumentList (KeywordArguments (KeywordArgument kwargzzzz 1))))) (Block kwargzzzz)))",
    );
}

#[test]
fn test_let() {
    check(
        "let a = 1, b = 2\n  a + b\nend",
        "(SourceFile (LetStatement (LetBindings (Assignment a = 1) (Assignment b = 2)) (Block (BinaryExpression a + b))))",
    );
    check("let\nend", "(SourceFile (LetStatement (LetBindings) (Block)))");
}

#[test]
fn test_for_and_while() {
    check(
        "for i in collection\n  println(i)\nend",
        "(SourceFile (ForStatement (ForBinding i collection) (Block (CallExpression println (ArgumentList i)))))",
    );
    check(
        "while false; x; end",
        "(SourceFile (WhileStatement false (Block x)))",
    );
}

#[test]
fn test_if() {
    check(
        "if a\n b\nelseif c\n d\nelse\n e\nend",
        "(SourceFile (IfStatement a (Block b) (ElseifClause c (Block d)) (ElseClause (Block e))))",
    );
}

#[test]
fn test_try() {
    check(
        "try\n f()\ncatch e\n g(e)\nfinally\n h()\nend",
        "(SourceFile (TryStatement (Block (CallExpression f (ArgumentList))) (CatchClause e (Block (CallExpression g (ArgumentList e)))) (FinallyClause (Block (CallExpression h (ArgumentList))))))",
    );
}

#[test]
fn test_do_block() {
    check(
        "map(xs) do x\n  x + 1\nend",
        "(SourceFile (CallExpression map (ArgumentList xs) (DoClause (ParameterList x) (Block (BinaryExpression x + 1)))))",
    );
}

#[test]
fn test_macro_calls() {
    check("@show x + 1", "(SourceFile (MacroCall @show (BinaryExpression x + 1)))");
    check("@m(x)", "(SourceFile (MacroCall @m (ArgumentList x)))");
}

// ============================================================================
// Definitions and imports
// ============================================================================

#[test]
fn test_type_definitions() {
    check(
        "struct a{T} <: b; c; end",
        "(SourceFile (StructDefinition (TypeHead (BinaryExpression (CurlyExpression a T) <: b)) (Block c)))",
    );
    check("abstract type a end", "(SourceFile (AbstractDefinition (TypeHead a)))");
    check(
        "primitive type Int24 <: Integer 24 end",
        "(SourceFile (PrimitiveDefinition (TypeHead (BinaryExpression Int24 <: Integer)) 24))",
    );
}

#[test]
fn test_module() {
    check(
        "module a; f(x) = x; z = r end",
        "(SourceFile (ModuleDefinition a (Block (Assignment (CallExpression f (ArgumentList x)) = x) (Assignment z = r))))",
    );
}

#[test]
fn test_imports() {
    check("import Pluto", "(SourceFile (ImportStatement (ImportPath Pluto)))");
    check(
        "import Pluto: wow, Dates.x as y",
        "(SourceFile (ImportStatement (SelectedImport (ImportPath Pluto) (ImportPath wow) (ImportAlias (ImportPath Dates x) y))))",
    );
    check(
        "using ..Pluto: wow",
        "(SourceFile (UsingStatement (SelectedImport (ImportPath Pluto) (ImportPath wow))))",
    );
}

#[test]
fn test_scope_keywords() {
    check("const a = b", "(SourceFile (ConstStatement (Assignment a = b)))");
    check("global x, y", "(SourceFile (GlobalStatement (TupleExpression x y)))");
    check("local x = 1", "(SourceFile (LocalStatement (Assignment x = 1)))");
}

// ============================================================================
// Recovery and positions
// ============================================================================

#[test]
fn test_error_recovery() {
    let src = "x = )\ny = 2";
    let tree = parse(src).expect("parse error");
    assert!(tree.has_errors());
    assert_eq!(render(tree.root(), src), "(SourceFile (Error) (Assignment y = 2))");
    let error = tree.root().child(0).unwrap();
    assert_eq!(error.text(src), Some("x = )"));
}

#[test]
fn test_error_inside_block_keeps_block() {
    let src = "function f(x)\n  x +* y\n  x\nend";
    let tree = parse(src).expect("parse error");
    assert!(tree.has_errors());
    let function = tree.root().child(0).unwrap();
    assert_eq!(function.kind(), SyntaxKind::FunctionDefinition);
    let block = function.child(1).unwrap();
    assert_eq!(block.kind(), SyntaxKind::Block);
    assert_eq!(block.child_count(), 2);
    assert_eq!(block.child(0).unwrap().kind(), SyntaxKind::Error);
}

#[test]
fn test_spans_match_source() {
    let src = "let a = 1\n  f(a)\nend";
    let tree = parse(src).expect("parse error");
    let call = tree
        .cursor()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::CallExpression)
        .unwrap();
    assert_eq!(call.text(src), Some("f(a)"));
    let stmt = tree.root().child(0).unwrap();
    assert_eq!(stmt.text(src), Some(src));
}

#[test]
fn test_dump() {
    let src = "x = 1";
    let tree = parse(src).expect("parse error");
    assert_eq!(
        tree.dump(src),
        "SourceFile[0,5]: \"x = 1\"\n  Assignment[0,5]: \"x = 1\"\n    Identifier[0,1]: \"x\"\n    Operator[2,3]: \"=\"\n    IntegerLiteral[4,5]: \"1\"\n"
    );
}

#[test]
fn test_cell_sources_parse_cleanly() {
    for src in [
        "x = +(a...)",
        "let x = 1; f(x; kwargzzzz=2); end",
        "x = let a = 1; a += b end",
        "a[b,c,:] = d",
        "f()[] = 1",
        "x[f()] = 1",
        "(x[])::Int, y = 1, 2",
        "a::Foo, b::String = 1, 2",
        "a ⊻= 1",
        "a >>>= 1",
        "let\n struct a; b; c; end\n end",
        "abstract type a{T} <: b{T} end",
        "struct a{T,S}; c::T; d::Foo; end",
        "mutable struct P\n  x::Int\nend",
        "import .Pluto: wow",
        "import Pluto.ExpressionExplorer.wow, Plutowie",
        "try\n using Pluto.wow, Dates\n catch\n end",
        "function f(x::T) where {T <: Real}\n  x\nend",
        "Base.show(io::IO, x::Foo) = print(io, x.a)",
        "x .= y .+ 1",
        "@. y = sin(x)",
        "quote\n  $x + 1\nend",
        "macro m(ex)\n  esc(ex)\nend",
        "for (i, x) in enumerate(xs), j = 1:3\n  i\nend",
        "d = Dict(:a => 1, :b => 2)",
        "x -> begin\n  x\nend",
        "A = [1 2\n3 4]",
    ] {
        let tree = parse(src).unwrap_or_else(|e| panic!("{:?} doesn't parse: {}", src, e));
        assert!(!tree.has_errors(), "{:?} has errors:\n{}", src, tree.dump(src));
    }
}
