//! Variable usage and scope explorer.
//!
//! Walks a Julia syntax tree and sorts every identifier occurrence into
//! definitions (globally visible bindings), usages (reads) and locals
//! (bindings confined to a nested scope).
//!
//! Classification is purely syntactic. Whether a usage refers to a
//! definition in another cell is left to the caller.

use cellscope_core::analysis::{AnalysisResult, DefinitionKind};
use cellscope_core::document::Document;
use cellscope_core::types::Span;
use cellscope_julia_syntax::{SyntaxKind, SyntaxNode, TreeCursor};
use thiserror::Error;
use tracing::{debug, trace};

use crate::scope::{Resolution, ScopeKind, ScopeStack};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort an exploration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExploreError {
    /// The document is shorter than the tree being explored.
    #[error("document has {document_len} bytes but the syntax tree reaches byte {tree_end}")]
    DocumentMismatch { tree_end: usize, document_len: usize },

    /// A node range does not fall on character boundaries of the document.
    #[error("node range {span} is not valid in the document")]
    InvalidRange { span: Span },
}

/// Result type for explorer operations.
pub type ExploreResult<T> = Result<T, ExploreError>;

/// The wildcard name is never recorded.
const WILDCARD: &str = "_";

// ============================================================================
// Entry Point
// ============================================================================

/// Classify the identifiers in the subtree under `cursor`.
///
/// `enclosing` seeds the scope stack when the subtree sits inside an outer
/// construct; with any frame active, top-level assignments become locals.
/// With `quoted` set, only interpolations (`$x`, `$(expr)`) are analyzed.
///
/// # Errors
///
/// Returns [`ExploreError::DocumentMismatch`] if `document` does not cover
/// the subtree's byte range.
///
/// # Example
///
/// ```
/// use cellscope_julia::explore_variable_usage;
/// use cellscope_julia_syntax::parse;
///
/// let code = "x = y + 1";
/// let tree = parse(code).unwrap();
/// let result = explore_variable_usage(&tree.cursor(), code, None, false).unwrap();
/// assert!(result.defines("x"));
/// assert!(result.uses("y"));
/// ```
pub fn explore_variable_usage<D: Document + ?Sized>(
    cursor: &TreeCursor<'_>,
    document: &D,
    enclosing: Option<&ScopeStack>,
    quoted: bool,
) -> ExploreResult<AnalysisResult> {
    let root = cursor.node();
    let span = root.span();
    if span.end > document.len() {
        return Err(ExploreError::DocumentMismatch {
            tree_end: span.end,
            document_len: document.len(),
        });
    }

    debug!("exploring {} at {} (quoted: {})", root.kind(), span, quoted);

    let mut explorer = Explorer {
        doc: document,
        scopes: enclosing.cloned().unwrap_or_default(),
        result: AnalysisResult::new(),
    };
    if quoted {
        explorer.explore_quoted(root)?;
    } else {
        explorer.explore(root)?;
    }

    let result = explorer.result;
    debug!(
        "explored {}: {} definitions, {} usages, {} locals",
        root.kind(),
        result.definitions.len(),
        result.usages.len(),
        result.locals.len()
    );
    Ok(result)
}

// ============================================================================
// Signatures
// ============================================================================

/// The pieces of a function or macro signature.
#[derive(Default)]
struct SignatureParts<'t> {
    /// Name being defined, if any.
    name: Option<SyntaxNode<'t>>,
    /// Callable object of `(f::Foo)(x) = ...`.
    functor: Option<SyntaxNode<'t>>,
    params: Option<SyntaxNode<'t>>,
    /// `where` clauses and curly parameters on the name.
    type_vars: Vec<SyntaxNode<'t>>,
    return_types: Vec<SyntaxNode<'t>>,
}

fn split_signature(signature: SyntaxNode<'_>) -> SignatureParts<'_> {
    let mut parts = SignatureParts::default();
    let mut core = signature;
    loop {
        match core.kind() {
            SyntaxKind::WhereExpression => parts.type_vars.extend(core.children().skip(1)),
            SyntaxKind::TypedExpression => parts.return_types.extend(core.children().skip(1)),
            _ => break,
        }
        match core.child(0) {
            Some(inner) => core = inner,
            None => break,
        }
    }

    match core.kind() {
        SyntaxKind::CallExpression => {
            parts.params = core.child(1);
            let mut callee = core.child(0);
            if let Some(curly) = callee.filter(|c| c.kind() == SyntaxKind::CurlyExpression) {
                parts.type_vars.extend(curly.children().skip(1));
                callee = curly.child(0);
            }
            match callee {
                Some(c) if c.kind() == SyntaxKind::ParenthesizedExpression => parts.functor = Some(c),
                _ => parts.name = callee,
            }
        }
        SyntaxKind::Identifier => parts.name = Some(core),
        _ => parts.params = Some(core),
    }
    parts
}

/// True for the left-hand side of a short function definition.
fn is_function_signature(node: SyntaxNode<'_>) -> bool {
    match node.kind() {
        SyntaxKind::CallExpression => node.child(0).is_some_and(|callee| {
            matches!(
                callee.kind(),
                SyntaxKind::Identifier
                    | SyntaxKind::FieldExpression
                    | SyntaxKind::CurlyExpression
                    | SyntaxKind::Operator
                    | SyntaxKind::ParenthesizedExpression
            )
        }),
        SyntaxKind::WhereExpression | SyntaxKind::TypedExpression => {
            node.child(0).is_some_and(is_function_signature)
        }
        _ => false,
    }
}

/// The declared name inside a type head: `A`, `A{T}`, `A <: B`, `A{T} <: B{T}`.
fn type_name(node: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    match node.kind() {
        SyntaxKind::Identifier => Some(node),
        SyntaxKind::CurlyExpression | SyntaxKind::BinaryExpression => {
            node.child(0).and_then(type_name)
        }
        _ => None,
    }
}

fn last_child(node: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    node.child_count().checked_sub(1).and_then(|i| node.child(i))
}

// ============================================================================
// Explorer
// ============================================================================

struct Explorer<'d, D: ?Sized> {
    doc: &'d D,
    scopes: ScopeStack,
    result: AnalysisResult,
}

impl<'d, D: Document + ?Sized> Explorer<'d, D> {
    fn text(&self, node: SyntaxNode<'_>) -> ExploreResult<&'d str> {
        node.text(self.doc)
            .ok_or(ExploreError::InvalidRange { span: node.span() })
    }

    fn with_scope(
        &mut self,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self) -> ExploreResult<()>,
    ) -> ExploreResult<()> {
        trace!("push {:?} scope (depth {})", kind, self.scopes.depth());
        self.scopes.push(kind);
        let result = f(self);
        self.scopes.pop();
        trace!("pop {:?} scope", kind);
        result
    }

    // ------------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------------

    fn use_name(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let name = self.text(node)?;
        if name != WILDCARD {
            self.result.push_usage(name, node.span());
        }
        Ok(())
    }

    /// Assignment-style binding.
    ///
    /// A name already bound in an active frame is absorbed by that frame. A
    /// name declared `global`, or assigned with no frame active, becomes a
    /// definition. Anything else is a new local of the innermost frame.
    fn assign(&mut self, name: &str, span: Span, kind: DefinitionKind) {
        if name == WILDCARD {
            return;
        }
        match self.scopes.resolve(name) {
            Resolution::Local => {}
            Resolution::Global => self.result.define(name, kind, span),
            Resolution::Free => {
                if self.scopes.bind(name) {
                    self.result.push_local(name, span);
                } else {
                    self.result.define(name, kind, span);
                }
            }
        }
    }

    fn assign_node(&mut self, node: SyntaxNode<'_>, kind: DefinitionKind) -> ExploreResult<()> {
        let name = self.text(node)?;
        self.assign(name, node.span(), kind);
        Ok(())
    }

    /// Explicit binder: always a local of the innermost frame.
    fn bind_local(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let name = self.text(node)?;
        if name != WILDCARD {
            self.scopes.bind(name);
            self.result.push_local(name, node.span());
        }
        Ok(())
    }

    /// Global definition regardless of the active frames.
    fn define(&mut self, node: SyntaxNode<'_>, kind: DefinitionKind) -> ExploreResult<()> {
        let name = self.text(node)?;
        if name != WILDCARD {
            self.result.define(name, kind, node.span());
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    fn explore(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        match node.kind() {
            SyntaxKind::Error => {
                trace!("skipping error node at {}", node.span());
                Ok(())
            }
            SyntaxKind::Identifier | SyntaxKind::MacroIdentifier => self.use_name(node),
            SyntaxKind::Operator
            | SyntaxKind::IntegerLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::CharLiteral
            | SyntaxKind::BooleanLiteral
            | SyntaxKind::Symbol
            | SyntaxKind::Colon
            | SyntaxKind::IndexKeyword
            | SyntaxKind::BreakStatement
            | SyntaxKind::ContinueStatement
            | SyntaxKind::ExportStatement => Ok(()),

            SyntaxKind::QuoteExpression | SyntaxKind::QuoteStatement => {
                for child in node.children() {
                    self.explore_quoted(child)?;
                }
                Ok(())
            }

            SyntaxKind::Assignment => self.explore_assignment(node, DefinitionKind::Variable),
            SyntaxKind::CompoundAssignment => self.explore_compound_assignment(node),
            SyntaxKind::KeywordArgument => self.explore_keyword_argument(node),
            SyntaxKind::FieldExpression => self.explore_field(node),

            SyntaxKind::FunctionDefinition | SyntaxKind::MacroDefinition => {
                self.explore_definition(node)
            }
            SyntaxKind::ArrowFunction => self.explore_arrow(node),
            SyntaxKind::DoClause => self.explore_do(node),
            SyntaxKind::WhereExpression => self.explore_where(node),

            SyntaxKind::LetStatement => self.explore_let(node),
            SyntaxKind::ForStatement => self.explore_for(node),
            SyntaxKind::Comprehension | SyntaxKind::Generator => self.explore_comprehension(node),
            SyntaxKind::WhileStatement => self.explore_while(node),
            SyntaxKind::TryStatement => self.explore_try(node),

            SyntaxKind::StructDefinition => self.define_type(node, DefinitionKind::Struct),
            SyntaxKind::AbstractDefinition => self.define_type(node, DefinitionKind::AbstractType),
            SyntaxKind::PrimitiveDefinition => {
                self.define_type(node, DefinitionKind::PrimitiveType)
            }
            SyntaxKind::ModuleDefinition => match node.child_of_kind(SyntaxKind::Identifier) {
                Some(name) => self.define(name, DefinitionKind::Module),
                None => Ok(()),
            },
            SyntaxKind::ImportStatement | SyntaxKind::UsingStatement => self.explore_import(node),

            SyntaxKind::ConstStatement => self.explore_const(node),
            SyntaxKind::GlobalStatement => self.explore_global(node),
            SyntaxKind::LocalStatement => self.explore_local(node),

            _ => self.explore_children(node),
        }
    }

    fn explore_children(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        self.explore_from(node, 0)
    }

    fn explore_from(&mut self, node: SyntaxNode<'_>, start: usize) -> ExploreResult<()> {
        for child in node.children().skip(start) {
            self.explore(child)?;
        }
        Ok(())
    }

    /// Inside a quotation: nothing is recorded except under interpolations.
    fn explore_quoted(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        if node.kind() == SyntaxKind::Interpolation {
            return self.explore_children(node);
        }
        for child in node.children() {
            self.explore_quoted(child)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Assignments
    // ------------------------------------------------------------------------

    fn explore_assignment(&mut self, node: SyntaxNode<'_>, kind: DefinitionKind) -> ExploreResult<()> {
        let (Some(lhs), Some(rhs)) = (node.child(0), node.child(2)) else {
            return self.explore_children(node);
        };
        if is_function_signature(lhs) {
            return self.explore_callable(lhs, Some(rhs), ScopeKind::Function);
        }
        self.explore(rhs)?;
        self.bind_target(lhs, kind)
    }

    /// Left-hand side of `=`.
    fn bind_target(&mut self, node: SyntaxNode<'_>, kind: DefinitionKind) -> ExploreResult<()> {
        match node.kind() {
            SyntaxKind::Identifier => self.assign_node(node, kind),
            SyntaxKind::TypedExpression => {
                if let Some(target) = node.child(0) {
                    self.bind_target(target, kind)?;
                }
                self.explore_from(node, 1)
            }
            // `(; a, b) = nt` binds the properties it names
            SyntaxKind::TupleExpression
            | SyntaxKind::ParenthesizedExpression
            | SyntaxKind::KeywordArguments => {
                for child in node.children() {
                    self.bind_target(child, kind)?;
                }
                Ok(())
            }
            // `b...` in `a, b... = xs`; `A` in `A{T} = ...`
            SyntaxKind::SplatExpression | SyntaxKind::CurlyExpression => match node.child(0) {
                Some(target) => self.bind_target(target, kind),
                None => Ok(()),
            },
            // index and field targets mutate, they do not bind
            _ => self.explore(node),
        }
    }

    fn explore_compound_assignment(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let (Some(lhs), Some(op), Some(rhs)) = (node.child(0), node.child(1), node.child(2)) else {
            return self.explore_children(node);
        };
        self.explore(rhs)?;
        self.explore(lhs)?;
        let broadcast = self.text(op)?.starts_with('.');
        if lhs.kind() == SyntaxKind::Identifier && !broadcast {
            self.assign_node(lhs, DefinitionKind::Variable)?;
        }
        Ok(())
    }

    /// `name = value` in a call or named tuple: the name is a label.
    fn explore_keyword_argument(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        if let Some(key) = node.child(0) {
            if key.kind() != SyntaxKind::Identifier {
                self.explore(key)?;
            }
        }
        self.explore_from(node, 1)
    }

    fn explore_field(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        if let Some(base) = node.child(0) {
            self.explore(base)?;
        }
        match node.child(1) {
            Some(field) if field.kind() == SyntaxKind::Interpolation => self.explore(field),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    fn explore_definition(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let scope = if node.kind() == SyntaxKind::MacroDefinition {
            ScopeKind::Macro
        } else {
            ScopeKind::Function
        };
        let body = node.child_of_kind(SyntaxKind::Block);
        match node
            .child_of_kind(SyntaxKind::Signature)
            .and_then(|s| s.child(0))
        {
            Some(signature) => self.explore_callable(signature, body, scope),
            None => self.with_scope(scope, |this| match body {
                Some(body) => this.explore(body),
                None => Ok(()),
            }),
        }
    }

    /// Function or macro: the name binds in the enclosing scope, parameters
    /// and type variables in a new frame covering the body.
    fn explore_callable(
        &mut self,
        signature: SyntaxNode<'_>,
        body: Option<SyntaxNode<'_>>,
        scope: ScopeKind,
    ) -> ExploreResult<()> {
        let parts = split_signature(signature);
        if let Some(name) = parts.name {
            self.bind_callable_name(name, scope)?;
        }
        self.with_scope(scope, |this| {
            for clause in &parts.type_vars {
                this.bind_type_vars(*clause)?;
            }
            if let Some(functor) = parts.functor {
                this.bind_parameter(functor)?;
            }
            if let Some(params) = parts.params {
                this.bind_parameter(params)?;
            }
            for ty in &parts.return_types {
                this.explore(*ty)?;
            }
            match body {
                Some(body) => this.explore(body),
                None => Ok(()),
            }
        })
    }

    fn bind_callable_name(&mut self, name: SyntaxNode<'_>, scope: ScopeKind) -> ExploreResult<()> {
        match name.kind() {
            SyntaxKind::Identifier | SyntaxKind::Operator => {
                let text = self.text(name)?;
                if scope == ScopeKind::Macro {
                    self.assign(&format!("@{}", text), name.span(), DefinitionKind::Macro);
                } else {
                    self.assign(text, name.span(), DefinitionKind::Function);
                }
                Ok(())
            }
            // `Base.show(io, x) = ...` extends an existing function
            SyntaxKind::FieldExpression => self.explore(name),
            _ => Ok(()),
        }
    }

    fn bind_parameter(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        match node.kind() {
            SyntaxKind::Identifier => self.bind_local(node),
            SyntaxKind::TypedExpression => {
                if let Some(target) = node.child(0) {
                    self.bind_parameter(target)?;
                }
                self.explore_from(node, 1)
            }
            // defaults are evaluated before their parameter is bound
            SyntaxKind::KeywordArgument => {
                self.explore_from(node, 1)?;
                match node.child(0) {
                    Some(target) => self.bind_parameter(target),
                    None => Ok(()),
                }
            }
            SyntaxKind::Assignment => {
                self.explore_from(node, 2)?;
                match node.child(0) {
                    Some(target) => self.bind_parameter(target),
                    None => Ok(()),
                }
            }
            SyntaxKind::ArgumentList
            | SyntaxKind::KeywordArguments
            | SyntaxKind::ParameterList
            | SyntaxKind::TupleExpression
            | SyntaxKind::ParenthesizedExpression => {
                for child in node.children() {
                    self.bind_parameter(child)?;
                }
                Ok(())
            }
            SyntaxKind::SplatExpression => match node.child(0) {
                Some(target) => self.bind_parameter(target),
                None => Ok(()),
            },
            _ => self.explore(node),
        }
    }

    /// `T`, `T <: Real`, `{T, S <: AbstractVector{T}}`.
    fn bind_type_vars(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        match node.kind() {
            SyntaxKind::Identifier => self.bind_local(node),
            SyntaxKind::BracesExpression => {
                for child in node.children() {
                    self.bind_type_vars(child)?;
                }
                Ok(())
            }
            SyntaxKind::BinaryExpression => {
                if let Some(var) = node.child(0) {
                    self.bind_type_vars(var)?;
                }
                self.explore_from(node, 2)
            }
            _ => self.explore(node),
        }
    }

    fn explore_arrow(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let params = node.child(0);
        let body = node.child(1);
        self.with_scope(ScopeKind::Function, |this| {
            if let Some(params) = params {
                this.bind_parameter(params)?;
            }
            match body {
                Some(body) => this.explore(body),
                None => Ok(()),
            }
        })
    }

    fn explore_do(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let params = node.child_of_kind(SyntaxKind::ParameterList);
        let body = node.child_of_kind(SyntaxKind::Block);
        self.with_scope(ScopeKind::Function, |this| {
            if let Some(params) = params {
                this.bind_parameter(params)?;
            }
            match body {
                Some(body) => this.explore(body),
                None => Ok(()),
            }
        })
    }

    fn explore_where(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        self.with_scope(ScopeKind::Where, |this| {
            for clause in node.children().skip(1) {
                this.bind_type_vars(clause)?;
            }
            match node.child(0) {
                Some(inner) => this.explore(inner),
                None => Ok(()),
            }
        })
    }

    // ------------------------------------------------------------------------
    // Scoped blocks
    // ------------------------------------------------------------------------

    fn explore_let(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let bindings = node.child_of_kind(SyntaxKind::LetBindings);
        let body = node.child_of_kind(SyntaxKind::Block);
        self.with_scope(ScopeKind::Let, |this| {
            if let Some(bindings) = bindings {
                for binding in bindings.children() {
                    this.bind_parameter(binding)?;
                }
            }
            match body {
                Some(body) => this.explore(body),
                None => Ok(()),
            }
        })
    }

    fn explore_for(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let bindings: Vec<_> = node
            .children()
            .filter(|c| c.kind() == SyntaxKind::ForBinding)
            .collect();
        let body = node.child_of_kind(SyntaxKind::Block);

        // the first iterable is evaluated before the loop scope exists
        let first_iter = bindings.first().and_then(|b| b.child(1));
        if let Some(iter) = first_iter {
            self.explore(iter)?;
        }

        self.with_scope(ScopeKind::For, |this| {
            for binding in &bindings {
                this.bind_for_binding(*binding, first_iter)?;
            }
            match body {
                Some(body) => this.explore(body),
                None => Ok(()),
            }
        })
    }

    fn bind_for_binding(
        &mut self,
        binding: SyntaxNode<'_>,
        first_iter: Option<SyntaxNode<'_>>,
    ) -> ExploreResult<()> {
        if let Some(iter) = binding.child(1) {
            if Some(iter) != first_iter {
                self.explore(iter)?;
            }
        }
        match binding.child(0) {
            Some(target) => self.bind_parameter(target),
            None => Ok(()),
        }
    }

    fn explore_comprehension(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        let body = node.child(0);
        let clauses: Vec<_> = node.children().skip(1).collect();
        let first_iter = clauses
            .first()
            .filter(|c| c.kind() == SyntaxKind::ForClause)
            .and_then(|c| c.child(0))
            .and_then(|b| b.child(1));
        if let Some(iter) = first_iter {
            self.explore(iter)?;
        }

        self.with_scope(ScopeKind::Comprehension, |this| {
            for clause in &clauses {
                if clause.kind() == SyntaxKind::ForClause {
                    for binding in clause.children() {
                        this.bind_for_binding(binding, first_iter)?;
                    }
                } else {
                    this.explore(*clause)?;
                }
            }
            match body {
                Some(body) => this.explore(body),
                None => Ok(()),
            }
        })
    }

    fn explore_while(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        if let Some(condition) = node.child(0) {
            self.explore(condition)?;
        }
        let body = node.child_of_kind(SyntaxKind::Block);
        self.with_scope(ScopeKind::While, |this| match body {
            Some(body) => this.explore(body),
            None => Ok(()),
        })
    }

    fn explore_try(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        for child in node.children() {
            match child.kind() {
                SyntaxKind::CatchClause => self.with_scope(ScopeKind::Catch, |this| {
                    for part in child.children() {
                        if part.kind() == SyntaxKind::Identifier {
                            this.bind_local(part)?;
                        } else {
                            this.explore(part)?;
                        }
                    }
                    Ok(())
                })?,
                _ => self.with_scope(ScopeKind::Try, |this| this.explore(child))?,
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Global declarations
    // ------------------------------------------------------------------------

    fn define_type(&mut self, node: SyntaxNode<'_>, kind: DefinitionKind) -> ExploreResult<()> {
        let name = node
            .child_of_kind(SyntaxKind::TypeHead)
            .and_then(|head| head.child(0))
            .and_then(type_name);
        match name {
            Some(name) => self.define(name, kind),
            None => Ok(()),
        }
    }

    fn explore_import(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        for child in node.children() {
            if child.kind() == SyntaxKind::SelectedImport {
                for item in child.children().skip(1) {
                    self.define_import(item)?;
                }
            } else {
                self.define_import(child)?;
            }
        }
        Ok(())
    }

    /// `A.B.c` defines `c`; `A.b as c` defines `c`.
    fn define_import(&mut self, item: SyntaxNode<'_>) -> ExploreResult<()> {
        let name = match item.kind() {
            SyntaxKind::ImportPath => last_child(item),
            SyntaxKind::ImportAlias => item.child(1),
            _ => None,
        };
        match name {
            Some(name) => self.define(name, DefinitionKind::Import),
            None => Ok(()),
        }
    }

    fn explore_const(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        for child in node.children() {
            if child.kind() == SyntaxKind::Assignment {
                self.explore_assignment(child, DefinitionKind::Constant)?;
            } else {
                self.explore(child)?;
            }
        }
        Ok(())
    }

    fn explore_global(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        for child in node.children() {
            self.declare_globals(child)?;
            if matches!(
                child.kind(),
                SyntaxKind::Assignment | SyntaxKind::CompoundAssignment
            ) {
                self.explore(child)?;
            }
        }
        Ok(())
    }

    fn declare_globals(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        match node.kind() {
            SyntaxKind::Identifier => {
                let name = self.text(node)?;
                self.scopes.declare_global(name);
                Ok(())
            }
            SyntaxKind::TupleExpression | SyntaxKind::ParenthesizedExpression => {
                for child in node.children() {
                    self.declare_globals(child)?;
                }
                Ok(())
            }
            SyntaxKind::TypedExpression
            | SyntaxKind::SplatExpression
            | SyntaxKind::Assignment
            | SyntaxKind::CompoundAssignment => match node.child(0) {
                Some(target) => self.declare_globals(target),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// `local x`, `local x, y`, `local x = e`: explicit locals.
    fn explore_local(&mut self, node: SyntaxNode<'_>) -> ExploreResult<()> {
        for child in node.children() {
            self.bind_parameter(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellscope_julia_syntax::parse;

    fn explore(code: &str) -> AnalysisResult {
        let tree = parse(code).unwrap();
        explore_variable_usage(&tree.cursor(), code, None, false).unwrap()
    }

    #[test]
    fn document_must_cover_tree() {
        let tree = parse("x = 1").unwrap();
        let err = explore_variable_usage(&tree.cursor(), "x", None, false).unwrap_err();
        assert_eq!(
            err,
            ExploreError::DocumentMismatch {
                tree_end: 5,
                document_len: 1
            }
        );
    }

    #[test]
    fn occurrences_keep_positions() {
        let result = explore("x = x + x");
        assert_eq!(result.definitions["x"].span(), Span::new(0, 1));
        let spans: Vec<_> = result.usages.iter().map(|o| o.span()).collect();
        assert_eq!(spans, vec![Span::new(4, 5), Span::new(8, 9)]);
    }

    #[test]
    fn signature_parts() {
        let code = "f(x::T)::T where T";
        let tree = parse(code).unwrap();
        let sig = tree.root().child(0).unwrap();
        let parts = split_signature(sig);
        assert_eq!(parts.name.unwrap().text(code), Some("f"));
        assert_eq!(parts.params.unwrap().kind(), SyntaxKind::ArgumentList);
        assert_eq!(parts.type_vars.len(), 1);
        assert_eq!(parts.return_types.len(), 1);
    }

    #[test]
    fn short_function_detection() {
        for (code, expected) in [
            ("f(x)", true),
            ("Base.show(io)", true),
            ("f(x)::Int", true),
            ("f(x)[1]", false),
            ("x", false),
        ] {
            let tree = parse(code).unwrap();
            let lhs = tree.root().child(0).unwrap();
            assert_eq!(is_function_signature(lhs), expected, "{}", code);
        }
    }

    #[test]
    fn subtree_exploration() {
        let code = "a = 1\nb = a";
        let tree = parse(code).unwrap();
        let second = tree.root().child(1).unwrap();
        let result = explore_variable_usage(&second.walk(), code, None, false).unwrap();
        assert!(result.defines("b"));
        assert!(!result.defines("a"));
        assert!(result.uses("a"));
    }
}
