//! Keyed row selection for DataTable.
//!
//! Selection identity is the value of the caller's `key_field`, not a display
//! index, so a selected row stays selected across refetches and page moves.
//! Two rows with equal keys are indistinguishable here; key uniqueness is the
//! caller's contract.

use std::collections::BTreeSet;

/// Externally-owned set of selected row keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    keys: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn toggle(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.keys.remove(&key) {
            self.keys.insert(key);
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Selected keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// True when every key of the current page is selected (and the page is
    /// non-empty) - the header checkbox state.
    pub fn is_all_selected<'a>(&self, page_keys: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for key in page_keys {
            any = true;
            if !self.keys.contains(key) {
                return false;
            }
        }
        any
    }

    /// Header checkbox toggle: when the whole page is selected, clear the
    /// selection; otherwise the selection becomes exactly the current page's
    /// rows. Never reaches beyond the page.
    pub fn toggle_select_all(&mut self, page_keys: &[String]) {
        if self.is_all_selected(page_keys.iter().map(String::as_str)) {
            self.keys.clear();
        } else {
            self.keys = page_keys.iter().cloned().collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Vec<String> {
        vec!["VH-001".into(), "VH-002".into(), "VH-003".into()]
    }

    #[test]
    fn test_toggle() {
        let mut sel = Selection::new();
        sel.toggle("VH-001");
        assert!(sel.contains("VH-001"));
        assert_eq!(sel.len(), 1);

        sel.toggle("VH-001");
        assert!(!sel.contains("VH-001"));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let mut sel = Selection::new();
        sel.toggle("VH-001");
        sel.toggle("VH-002");
        // A second row with the same key is the same logical row.
        assert_eq!(sel.len(), 2);
        sel.toggle("VH-001");
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn test_select_all_targets_page_only() {
        let mut sel = Selection::new();
        sel.toggle("VH-999"); // selected on another page

        sel.toggle_select_all(&page());
        assert_eq!(sel.len(), 3, "selection replaced by exactly the page");
        assert!(!sel.contains("VH-999"));
        assert!(sel.is_all_selected(page().iter().map(String::as_str)));
    }

    #[test]
    fn test_select_all_toggles_off() {
        let mut sel = Selection::new();
        sel.toggle_select_all(&page());
        sel.toggle_select_all(&page());
        assert!(sel.is_empty());
    }

    #[test]
    fn test_all_selected_requires_nonempty_page() {
        let sel = Selection::new();
        assert!(!sel.is_all_selected(std::iter::empty()));
    }
}
