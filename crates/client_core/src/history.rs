//! In-memory address bar with a back/forward stack.
//!
//! Every write that changes the fragment yields a [`FragmentChange`] tagged
//! with who caused it. Writing the fragment it already holds yields nothing,
//! matching how browsers skip `hashchange` for a no-op assignment.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationOrigin {
    /// Written by the router to reflect a view it already applied.
    Internal,
    /// Typed by the user, or produced by back/forward.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentChange {
    pub fragment: String,
    pub origin: NavigationOrigin,
}

#[derive(Debug, Clone)]
pub struct AddressBar {
    entries: Vec<String>,
    index: usize,
}

impl Default for AddressBar {
    fn default() -> Self {
        Self::new("")
    }
}

impl AddressBar {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![normalize_fragment(initial)],
            index: 0,
        }
    }

    pub fn fragment(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Adds a new history entry, discarding anything ahead of the cursor.
    pub fn push(&mut self, fragment: &str, origin: NavigationOrigin) -> Option<FragmentChange> {
        let fragment = normalize_fragment(fragment);
        if fragment == self.fragment() {
            return None;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(fragment.clone());
        self.index += 1;
        Some(FragmentChange { fragment, origin })
    }

    /// Overwrites the current entry without growing the history.
    pub fn replace(&mut self, fragment: &str, origin: NavigationOrigin) -> Option<FragmentChange> {
        let fragment = normalize_fragment(fragment);
        if fragment == self.fragment() {
            return None;
        }
        self.entries[self.index] = fragment.clone();
        Some(FragmentChange { fragment, origin })
    }

    pub fn back(&mut self) -> Option<FragmentChange> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        Some(self.external_change())
    }

    pub fn forward(&mut self) -> Option<FragmentChange> {
        if !self.can_go_forward() {
            return None;
        }
        self.index += 1;
        Some(self.external_change())
    }

    fn external_change(&self) -> FragmentChange {
        FragmentChange {
            fragment: self.fragment().to_string(),
            origin: NavigationOrigin::External,
        }
    }
}

/// Brings `home`, `/home` and `#/home` to the `#/home` form; blank stays blank.
pub fn normalize_fragment(raw: &str) -> String {
    let trimmed = raw.trim();
    let path = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return String::new();
    }
    format!("#/{path}")
}

#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
