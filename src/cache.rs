use std::collections::HashSet;

/// Names of the types that have been (or are being) fully emitted in one run.
#[derive(Debug, Default, Clone)]
pub struct DeclarationCache {
    declared: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Already emitted: write a reference.
    Reuse,
    /// First sighting: the name is now marked and the caller must emit it.
    Declare,
}

impl DeclarationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` on first sight, so a type that reaches itself while still
    /// being emitted already sees itself as declared.
    pub fn declare_or_reuse(&mut self, name: &str) -> Decision {
        if self.declared.contains(name) {
            Decision::Reuse
        } else {
            self.declared.insert(name.to_string());
            Decision::Declare
        }
    }

    /// Number of distinct names declared so far.
    pub(crate) fn len(&self) -> usize {
        self.declared.len()
    }
}
