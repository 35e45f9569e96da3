//! Visitation stack plus self/mutual recursion detection.
use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexSet;

/// Something worth telling the user about that does not stop generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    CircularReference { from: String, to: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CircularReference { from, to } => write!(
                f,
                "Spotted a circular reference between `{from}` and `{to}`. This may cause infinite loops at runtime."
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recursion {
    /// The type refers back to itself.
    SelfReference,
    /// Two or more named types refer to each other.
    Circular,
}

#[derive(Debug, Default)]
pub struct RecursionTracker {
    stack: Vec<String>,
    lazy: HashMap<String, Recursion>,
    reported: HashSet<(String, String)>,
    diagnostics: IndexSet<Diagnostic>,
}

impl RecursionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, name: &str) {
        self.stack.push(name.to_string());
    }

    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Innermost type being declared.
    pub fn current(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    /// Force `name` into lazy emission regardless of what the traversal finds.
    pub fn force_lazy(&mut self, name: &str) {
        self.lazy.entry(name.to_string()).or_insert(Recursion::Circular);
    }

    pub fn lazy_kind(&self, name: &str) -> Option<Recursion> {
        self.lazy.get(name).copied()
    }

    /// Called when traversal reaches `name` while it is still on the stack.
    /// Marks the affected declarations lazy and reports circular pairs once.
    pub fn reenter(&mut self, name: &str) -> Option<Recursion> {
        let start = self.stack.iter().rposition(|n| n == name)?;
        let current = self.stack.last()?.clone();

        if current == name {
            self.lazy.entry(current).or_insert(Recursion::SelfReference);
            return Some(Recursion::SelfReference);
        }

        for member in &self.stack[start..] {
            self.lazy.insert(member.clone(), Recursion::Circular);
        }
        self.report(&current, name);
        self.report(name, &current);
        Some(Recursion::Circular)
    }

    fn report(&mut self, from: &str, to: &str) {
        if !self.reported.insert((from.to_string(), to.to_string())) {
            return;
        }
        let diagnostic = Diagnostic::CircularReference { from: from.to_string(), to: to.to_string() };
        tracing::warn!(from, to, "{diagnostic}");
        self.diagnostics.insert(diagnostic);
    }

    /// Forget the stack but keep lazy marks and reports.
    pub fn rewind(&mut self) {
        self.stack.clear();
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_iter().collect()
    }
}

// ------------------------------- Tests ------------------------------------ //
