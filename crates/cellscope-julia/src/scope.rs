//! Lexical scope tracking for the explorer.
//!
//! A [`ScopeStack`] holds one frame per active construct that introduces a
//! scope (function bodies, `let`, loops, comprehensions, `try`/`catch`).
//! Lookups walk from the innermost frame outwards, so the closest frame wins.

use std::collections::HashSet;

// ============================================================================
// Types
// ============================================================================

/// The construct a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Function,
    Macro,
    Let,
    For,
    While,
    Comprehension,
    Try,
    Catch,
    /// Type variables of a free-standing `where` expression.
    Where,
}

/// How a name resolves against the active frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Bound in an active frame.
    Local,
    /// Declared `global` in the closest frame that mentions it.
    Global,
    /// Not mentioned by any active frame.
    Free,
}

#[derive(Debug, Clone)]
struct ScopeFrame {
    kind: ScopeKind,
    bound: HashSet<String>,
    globals: HashSet<String>,
}

impl ScopeFrame {
    fn new(kind: ScopeKind) -> Self {
        ScopeFrame {
            kind,
            bound: HashSet::new(),
            globals: HashSet::new(),
        }
    }
}

// ============================================================================
// ScopeStack
// ============================================================================

/// Stack of active lexical scopes.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new scope.
    pub fn push(&mut self, kind: ScopeKind) {
        self.frames.push(ScopeFrame::new(kind));
    }

    /// Leave the innermost scope, forgetting its names.
    pub fn pop(&mut self) -> Option<ScopeKind> {
        self.frames.pop().map(|frame| frame.kind)
    }

    /// Number of active frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost frame. Returns `false` at top level.
    pub fn bind(&mut self, name: &str) -> bool {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.globals.remove(name);
                frame.bound.insert(name.to_string());
                true
            }
            None => false,
        }
    }

    /// Declare `name` global in the innermost frame. Returns `false` at top
    /// level, where every binding is global anyway.
    pub fn declare_global(&mut self, name: &str) -> bool {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.bound.remove(name);
                frame.globals.insert(name.to_string());
                true
            }
            None => false,
        }
    }

    /// Resolve `name`, innermost frame first.
    pub fn resolve(&self, name: &str) -> Resolution {
        for frame in self.frames.iter().rev() {
            if frame.bound.contains(name) {
                return Resolution::Local;
            }
            if frame.globals.contains(name) {
                return Resolution::Global;
            }
        }
        Resolution::Free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_frame_wins() {
        let mut scopes = ScopeStack::new();
        scopes.push(ScopeKind::Function);
        scopes.declare_global("x");
        scopes.push(ScopeKind::Let);
        scopes.bind("x");
        assert_eq!(scopes.resolve("x"), Resolution::Local);
        scopes.pop();
        assert_eq!(scopes.resolve("x"), Resolution::Global);
    }

    #[test]
    fn popped_names_are_forgotten() {
        let mut scopes = ScopeStack::new();
        scopes.push(ScopeKind::For);
        assert!(scopes.bind("i"));
        assert_eq!(scopes.resolve("i"), Resolution::Local);
        assert_eq!(scopes.pop(), Some(ScopeKind::For));
        assert_eq!(scopes.depth(), 0);
        assert_eq!(scopes.resolve("i"), Resolution::Free);
    }

    #[test]
    fn top_level_has_no_frame() {
        let mut scopes = ScopeStack::new();
        assert!(!scopes.bind("x"));
        assert!(!scopes.declare_global("x"));
        assert_eq!(scopes.depth(), 0);
        assert_eq!(scopes.pop(), None);
    }

    #[test]
    fn rebinding_overrides_global_declaration() {
        let mut scopes = ScopeStack::new();
        scopes.push(ScopeKind::Function);
        scopes.declare_global("x");
        scopes.bind("x");
        assert_eq!(scopes.resolve("x"), Resolution::Local);
    }
}
