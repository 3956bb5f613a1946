// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node kinds of the Julia syntax tree.

use std::fmt;

/// Every kind of node the parser produces.
///
/// Leaves carry no children; their text is recovered from the source through
/// the node's byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------
    SourceFile,
    Block,
    /// A statement the parser could not make sense of.
    Error,

    // ------------------------------------------------------------------------
    // Leaves
    // ------------------------------------------------------------------------
    Identifier,
    Operator,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,
    BooleanLiteral,
    /// `:name`
    Symbol,
    /// A lone `:` (as in `a[:, 1]`).
    Colon,
    /// `end`/`begin` inside an index.
    IndexKeyword,
    /// `@name`
    MacroIdentifier,

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------
    Assignment,
    CompoundAssignment,
    BinaryExpression,
    UnaryExpression,
    TernaryExpression,
    RangeExpression,
    /// `x::T`
    TypedExpression,
    /// `::T` without a value.
    TypeClause,
    ParenthesizedExpression,
    TupleExpression,
    CallExpression,
    /// `f.(x)`
    BroadcastCall,
    ArgumentList,
    /// Arguments after `;` in a call or tuple.
    KeywordArguments,
    /// `name = value` inside an argument list.
    KeywordArgument,
    IndexExpression,
    FieldExpression,
    CurlyExpression,
    SplatExpression,
    AdjointExpression,
    ArrowFunction,
    DoClause,
    ParameterList,
    VectorExpression,
    MatrixExpression,
    MatrixRow,
    Comprehension,
    Generator,
    ForClause,
    IfClause,
    ForBinding,
    /// `2x`
    Juxtaposition,
    /// `$x` or `$(expr)`
    Interpolation,
    /// `:(expr)`
    QuoteExpression,
    MacroCall,
    WhereExpression,
    BracesExpression,

    // ------------------------------------------------------------------------
    // Statements and clauses
    // ------------------------------------------------------------------------
    FunctionDefinition,
    Signature,
    MacroDefinition,
    LetStatement,
    LetBindings,
    ForStatement,
    WhileStatement,
    IfStatement,
    ElseifClause,
    ElseClause,
    TryStatement,
    CatchClause,
    FinallyClause,
    BeginBlock,
    QuoteStatement,
    StructDefinition,
    TypeHead,
    AbstractDefinition,
    PrimitiveDefinition,
    ModuleDefinition,
    ImportStatement,
    UsingStatement,
    ImportPath,
    /// `A: b, c`
    SelectedImport,
    /// `path as name`
    ImportAlias,
    ConstStatement,
    GlobalStatement,
    LocalStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    ExportStatement,
}

impl SyntaxKind {
    /// Returns the kind's name as written in tree dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxKind::SourceFile => "SourceFile",
            SyntaxKind::Block => "Block",
            SyntaxKind::Error => "Error",
            SyntaxKind::Identifier => "Identifier",
            SyntaxKind::Operator => "Operator",
            SyntaxKind::IntegerLiteral => "IntegerLiteral",
            SyntaxKind::FloatLiteral => "FloatLiteral",
            SyntaxKind::StringLiteral => "StringLiteral",
            SyntaxKind::CharLiteral => "CharLiteral",
            SyntaxKind::BooleanLiteral => "BooleanLiteral",
            SyntaxKind::Symbol => "Symbol",
            SyntaxKind::Colon => "Colon",
            SyntaxKind::IndexKeyword => "IndexKeyword",
            SyntaxKind::MacroIdentifier => "MacroIdentifier",
            SyntaxKind::Assignment => "Assignment",
            SyntaxKind::CompoundAssignment => "CompoundAssignment",
            SyntaxKind::BinaryExpression => "BinaryExpression",
            SyntaxKind::UnaryExpression => "UnaryExpression",
            SyntaxKind::TernaryExpression => "TernaryExpression",
            SyntaxKind::RangeExpression => "RangeExpression",
            SyntaxKind::TypedExpression => "TypedExpression",
            SyntaxKind::TypeClause => "TypeClause",
            SyntaxKind::ParenthesizedExpression => "ParenthesizedExpression",
            SyntaxKind::TupleExpression => "TupleExpression",
            SyntaxKind::CallExpression => "CallExpression",
            SyntaxKind::BroadcastCall => "BroadcastCall",
            SyntaxKind::ArgumentList => "ArgumentList",
            SyntaxKind::KeywordArguments => "KeywordArguments",
            SyntaxKind::KeywordArgument => "KeywordArgument",
            SyntaxKind::IndexExpression => "IndexExpression",
            SyntaxKind::FieldExpression => "FieldExpression",
            SyntaxKind::CurlyExpression => "CurlyExpression",
            SyntaxKind::SplatExpression => "SplatExpression",
            SyntaxKind::AdjointExpression => "AdjointExpression",
            SyntaxKind::ArrowFunction => "ArrowFunction",
            SyntaxKind::DoClause => "DoClause",
            SyntaxKind::ParameterList => "ParameterList",
            SyntaxKind::VectorExpression => "VectorExpression",
            SyntaxKind::MatrixExpression => "MatrixExpression",
            SyntaxKind::MatrixRow => "MatrixRow",
            SyntaxKind::Comprehension => "Comprehension",
            SyntaxKind::Generator => "Generator",
            SyntaxKind::ForClause => "ForClause",
            SyntaxKind::IfClause => "IfClause",
            SyntaxKind::ForBinding => "ForBinding",
            SyntaxKind::Juxtaposition => "Juxtaposition",
            SyntaxKind::Interpolation => "Interpolation",
            SyntaxKind::QuoteExpression => "QuoteExpression",
            SyntaxKind::MacroCall => "MacroCall",
            SyntaxKind::WhereExpression => "WhereExpression",
            SyntaxKind::BracesExpression => "BracesExpression",
            SyntaxKind::FunctionDefinition => "FunctionDefinition",
            SyntaxKind::Signature => "Signature",
            SyntaxKind::MacroDefinition => "MacroDefinition",
            SyntaxKind::LetStatement => "LetStatement",
            SyntaxKind::LetBindings => "LetBindings",
            SyntaxKind::ForStatement => "ForStatement",
            SyntaxKind::WhileStatement => "WhileStatement",
            SyntaxKind::IfStatement => "IfStatement",
            SyntaxKind::ElseifClause => "ElseifClause",
            SyntaxKind::ElseClause => "ElseClause",
            SyntaxKind::TryStatement => "TryStatement",
            SyntaxKind::CatchClause => "CatchClause",
            SyntaxKind::FinallyClause => "FinallyClause",
            SyntaxKind::BeginBlock => "BeginBlock",
            SyntaxKind::QuoteStatement => "QuoteStatement",
            SyntaxKind::StructDefinition => "StructDefinition",
            SyntaxKind::TypeHead => "TypeHead",
            SyntaxKind::AbstractDefinition => "AbstractDefinition",
            SyntaxKind::PrimitiveDefinition => "PrimitiveDefinition",
            SyntaxKind::ModuleDefinition => "ModuleDefinition",
            SyntaxKind::ImportStatement => "ImportStatement",
            SyntaxKind::UsingStatement => "UsingStatement",
            SyntaxKind::ImportPath => "ImportPath",
            SyntaxKind::SelectedImport => "SelectedImport",
            SyntaxKind::ImportAlias => "ImportAlias",
            SyntaxKind::ConstStatement => "ConstStatement",
            SyntaxKind::GlobalStatement => "GlobalStatement",
            SyntaxKind::LocalStatement => "LocalStatement",
            SyntaxKind::ReturnStatement => "ReturnStatement",
            SyntaxKind::BreakStatement => "BreakStatement",
            SyntaxKind::ContinueStatement => "ContinueStatement",
            SyntaxKind::ExportStatement => "ExportStatement",
        }
    }

    /// True for kinds that never have children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::Operator
                | SyntaxKind::IntegerLiteral
                | SyntaxKind::FloatLiteral
                | SyntaxKind::CharLiteral
                | SyntaxKind::BooleanLiteral
                | SyntaxKind::Symbol
                | SyntaxKind::Colon
                | SyntaxKind::IndexKeyword
                | SyntaxKind::MacroIdentifier
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
