//! Row identity and selection state

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{KeyPath, Record};

/// Stable identity of a row
///
/// Either the configured key field's value, or the row's position in the
/// original data source. Positions are taken before filtering and sorting, so
/// a row keeps its key while the displayed order changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    Field(String),
    Index(usize),
}

impl RowKey {
    /// Key for the record at `index` of the data source
    pub fn of(record: &Record, index: usize, key_field: Option<&KeyPath>) -> Self {
        key_field
            .map(|path| path.text(record))
            .filter(|text| !text.is_empty())
            .map(RowKey::Field)
            .unwrap_or(RowKey::Index(index))
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Field(value) => f.write_str(value),
            RowKey::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Selection behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Radio-like: selecting a row replaces the previous selection
    Single,
    /// Checkbox-like: selections accumulate
    #[default]
    Multiple,
}

/// Header checkbox state for the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCheck {
    None,
    Partial,
    All,
}

/// Selected row keys
///
/// Keys persist across page changes; the selection holds keys, not records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    mode: SelectionMode,
    keys: BTreeSet<RowKey>,
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            keys: BTreeSet::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn keys(&self) -> &BTreeSet<RowKey> {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.keys.contains(key)
    }

    /// Select or deselect one row
    pub fn select(&mut self, key: RowKey, selected: bool) {
        match (self.mode, selected) {
            (SelectionMode::Single, true) => {
                self.keys.clear();
                self.keys.insert(key);
            }
            (SelectionMode::Multiple, true) => {
                self.keys.insert(key);
            }
            (_, false) => {
                self.keys.remove(&key);
            }
        }
    }

    /// Flip one row; returns whether it is now selected
    pub fn toggle(&mut self, key: RowKey) -> bool {
        let selected = !self.is_selected(&key);
        self.select(key, selected);
        selected
    }

    /// Select or deselect every key of the current page
    ///
    /// Only meaningful in multiple mode; single mode ignores it.
    pub fn select_page<'a, I>(&mut self, page_keys: I, selected: bool)
    where
        I: IntoIterator<Item = &'a RowKey>,
    {
        if self.mode == SelectionMode::Single {
            return;
        }
        for key in page_keys {
            if selected {
                self.keys.insert(key.clone());
            } else {
                self.keys.remove(key);
            }
        }
    }

    /// Header checkbox state for the given page
    pub fn page_check<'a, I>(&self, page_keys: I) -> PageCheck
    where
        I: IntoIterator<Item = &'a RowKey>,
    {
        let (mut total, mut selected) = (0usize, 0usize);
        for key in page_keys {
            total += 1;
            if self.keys.contains(key) {
                selected += 1;
            }
        }
        match selected {
            0 => PageCheck::None,
            n if n == total => PageCheck::All,
            _ => PageCheck::Partial,
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(range: std::ops::Range<usize>) -> Vec<RowKey> {
        range.map(RowKey::Index).collect()
    }

    #[test]
    fn test_row_key_prefers_field() {
        let record = json!({"id": 7}).as_object().cloned().unwrap();
        let path = KeyPath::parse("id");
        assert_eq!(RowKey::of(&record, 3, Some(&path)), RowKey::Field("7".into()));
        assert_eq!(RowKey::of(&record, 3, None), RowKey::Index(3));

        let missing = KeyPath::parse("uuid");
        assert_eq!(RowKey::of(&record, 3, Some(&missing)), RowKey::Index(3));
    }

    #[test]
    fn test_single_mode_replaces() {
        let mut sel = Selection::new(SelectionMode::Single);
        sel.select(RowKey::Index(1), true);
        sel.select(RowKey::Index(2), true);
        assert_eq!(sel.keys().iter().collect::<Vec<_>>(), vec![&RowKey::Index(2)]);
    }

    #[test]
    fn test_select_page_adds_exactly_page_keys() {
        let mut sel = Selection::new(SelectionMode::Multiple);
        sel.select(RowKey::Index(9), true);
        let page = keys(0..3);
        sel.select_page(&page, true);
        assert_eq!(sel.len(), 4);
        for key in &page {
            assert!(sel.is_selected(key));
        }
        assert_eq!(sel.page_check(&page), PageCheck::All);

        sel.toggle(RowKey::Index(1));
        assert_eq!(sel.len(), 3);
        assert!(!sel.is_selected(&RowKey::Index(1)));
        assert!(sel.is_selected(&RowKey::Index(0)));
        assert!(sel.is_selected(&RowKey::Index(9)));
        assert_eq!(sel.page_check(&page), PageCheck::Partial);
    }

    #[test]
    fn test_deselect_page_keeps_other_pages() {
        let mut sel = Selection::new(SelectionMode::Multiple);
        sel.select_page(&keys(0..4), true);
        sel.select_page(&keys(2..4), false);
        assert_eq!(sel.keys().iter().cloned().collect::<Vec<_>>(), keys(0..2));
    }

    #[test]
    fn test_single_mode_ignores_select_page() {
        let mut sel = Selection::new(SelectionMode::Single);
        sel.select_page(&keys(0..3), true);
        assert!(sel.is_empty());
        assert_eq!(sel.page_check(&keys(0..3)), PageCheck::None);
    }
}
