//! The analysis result record produced by the scope explorer.
//!
//! An [`AnalysisResult`] holds three collections:
//!
//! - **locals**: bindings confined to a nested lexical scope
//! - **usages**: every read occurrence, local or global
//! - **definitions**: bindings visible outside the code unit, keyed by name
//!
//! Downstream consumers treat `definitions` keys as the symbols a unit
//! exports and `usages` names as the symbols it may depend on. `locals` are
//! kept for tooling only.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{Occurrence, Span};

// ============================================================================
// Definition Types
// ============================================================================

/// What kind of construct produced a global definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// Plain assignment (`x = 1`, `a, b = f()`, `x += 1`).
    Variable,
    /// `const x = 1`.
    Constant,
    /// Long or short form function definition.
    Function,
    /// `macro m(...) ... end`.
    Macro,
    /// `struct` or `mutable struct`.
    Struct,
    /// `abstract type`.
    AbstractType,
    /// `primitive type`.
    PrimitiveType,
    /// `module` or `baremodule`.
    Module,
    /// A name brought in by `import` or `using`.
    Import,
}

impl DefinitionKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Variable => "variable",
            DefinitionKind::Constant => "constant",
            DefinitionKind::Function => "function",
            DefinitionKind::Macro => "macro",
            DefinitionKind::Struct => "struct",
            DefinitionKind::AbstractType => "abstract_type",
            DefinitionKind::PrimitiveType => "primitive_type",
            DefinitionKind::Module => "module",
            DefinitionKind::Import => "import",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata for one global definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// The construct that produced the binding.
    pub kind: DefinitionKind,
    /// Byte offset of the defining identifier.
    pub from: usize,
    /// Byte offset one past the defining identifier.
    pub to: usize,
}

impl Definition {
    /// Create a definition of `kind` at `span`.
    pub fn new(kind: DefinitionKind, span: Span) -> Self {
        Definition {
            kind,
            from: span.start,
            to: span.end,
        }
    }

    /// The byte range of the defining identifier.
    pub fn span(&self) -> Span {
        Span::new(self.from, self.to)
    }
}

// ============================================================================
// AnalysisResult
// ============================================================================

/// Classification of every identifier occurrence in one code unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Bindings introduced inside nested lexical scopes.
    pub locals: Vec<Occurrence>,
    /// Every read occurrence.
    pub usages: Vec<Occurrence>,
    /// Global bindings keyed by name, in first-definition order.
    pub definitions: IndexMap<String, Definition>,
}

impl AnalysisResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a local binding.
    pub fn push_local(&mut self, name: impl Into<String>, span: Span) {
        self.locals.push(Occurrence::new(name, span));
    }

    /// Record a read.
    pub fn push_usage(&mut self, name: impl Into<String>, span: Span) {
        self.usages.push(Occurrence::new(name, span));
    }

    /// Record a global definition.
    ///
    /// A later definition of the same name overwrites the earlier metadata
    /// but keeps the name's original position in the map.
    pub fn define(&mut self, name: impl Into<String>, kind: DefinitionKind, span: Span) {
        self.definitions
            .insert(name.into(), Definition::new(kind, span));
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty() && self.usages.is_empty() && self.definitions.is_empty()
    }

    /// Distinct names of all local bindings.
    pub fn local_names(&self) -> BTreeSet<&str> {
        self.locals.iter().map(|o| o.name.as_str()).collect()
    }

    /// Distinct names of all usages.
    pub fn usage_names(&self) -> BTreeSet<&str> {
        self.usages.iter().map(|o| o.name.as_str()).collect()
    }

    /// Names of all global definitions.
    pub fn definition_names(&self) -> BTreeSet<&str> {
        self.definitions.keys().map(|k| k.as_str()).collect()
    }

    /// True if `name` is read anywhere in the unit.
    pub fn uses(&self, name: &str) -> bool {
        self.usages.iter().any(|o| o.name == name)
    }

    /// True if `name` is defined globally by the unit.
    pub fn defines(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }
}
