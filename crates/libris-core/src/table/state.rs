//! Table configuration and local UI state

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::column::{Column, Pin};
use super::selection::{RowKey, Selection, SelectionMode};
use crate::record::KeyPath;

/// Default page size
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default page size choices
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

// ============================================================================
// Configuration
// ============================================================================

/// Pagination configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub show_size_changer: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            show_size_changer: true,
        }
    }
}

impl PaginationConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Static table options
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Field providing row identity; falls back to the original index
    pub row_key: Option<KeyPath>,
    /// `None` disables pagination (all rows on one page)
    pub pagination: Option<PaginationConfig>,
    /// `None` disables the selection column
    pub selection: Option<SelectionMode>,
    pub searchable: bool,
    pub column_visibility: bool,
    pub fullscreen: bool,
    pub expandable: bool,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_key(mut self, path: impl Into<KeyPath>) -> Self {
        self.row_key = Some(path.into());
        self
    }

    pub fn paginated(mut self, config: PaginationConfig) -> Self {
        self.pagination = Some(config);
        self
    }

    pub fn selectable(mut self, mode: SelectionMode) -> Self {
        self.selection = Some(mode);
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn with_column_visibility(mut self) -> Self {
        self.column_visibility = true;
        self
    }

    pub fn with_fullscreen(mut self) -> Self {
        self.fullscreen = true;
        self
    }

    pub fn expandable(mut self) -> Self {
        self.expandable = true;
        self
    }
}

// ============================================================================
// Sort
// ============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Query-string form used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Active sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

// ============================================================================
// Table State
// ============================================================================

/// Local UI state of one table instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub search: String,
    /// Active filter values per column key
    pub filters: BTreeMap<String, BTreeSet<String>>,
    pub sort: Option<SortState>,
    pub hidden: HashSet<String>,
    pub pins: HashMap<String, Pin>,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
    pub selection: Selection,
    pub expanded: BTreeSet<RowKey>,
    pub fullscreen: bool,
}

impl TableState {
    /// Initial state for the given columns and options
    pub fn new(columns: &[Column], options: &TableOptions) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            hidden: columns
                .iter()
                .filter(|c| c.hidden)
                .map(|c| c.key.clone())
                .collect(),
            pins: columns
                .iter()
                .filter_map(|c| c.pin.map(|p| (c.key.clone(), p)))
                .collect(),
            page: 1,
            page_size: options
                .pagination
                .as_ref()
                .map(|p| p.page_size.max(1))
                .unwrap_or(usize::MAX),
            selection: Selection::new(options.selection.unwrap_or_default()),
            expanded: BTreeSet::new(),
            fullscreen: false,
        }
    }

    /// Update the search query; returns to the first page
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.page = 1;
    }

    /// Replace a column's active filter values; empty clears the filter
    pub fn set_filter<I, S>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.filters.remove(column);
        } else {
            self.filters.insert(column.to_string(), values);
        }
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
    }

    /// Header click: ascending → descending → unsorted
    ///
    /// Clicking a different column starts over at ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some(SortState {
                column: current,
                direction: SortDirection::Ascending,
            }) if current == column => Some(SortState {
                column: current,
                direction: SortDirection::Descending,
            }),
            Some(SortState {
                column: current,
                direction: SortDirection::Descending,
            }) if current == column => None,
            _ => Some(SortState {
                column: column.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
    }

    pub fn sort_direction(&self, column: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|s| s.column == column)
            .map(|s| s.direction)
    }

    pub fn is_visible(&self, column: &str) -> bool {
        !self.hidden.contains(column)
    }

    /// Show or hide a column
    pub fn toggle_column(&mut self, column: &str) {
        if !self.hidden.remove(column) {
            self.hidden.insert(column.to_string());
        }
    }

    /// Pin a column to a side, or unpin it
    pub fn set_pin(&mut self, column: &str, pin: Option<Pin>) {
        match pin {
            Some(side) => {
                self.pins.insert(column.to_string(), side);
            }
            None => {
                self.pins.remove(column);
            }
        }
    }

    pub fn pin_of(&self, column: &str) -> Option<Pin> {
        self.pins.get(column).copied()
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Change page size; returns to the first page
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn toggle_expanded(&mut self, key: RowKey) {
        if !self.expanded.remove(&key) {
            self.expanded.insert(key);
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").sortable(),
            Column::new("isbn", "ISBN").hidden(),
            Column::new("actions", "").pin(Pin::Right),
        ]
    }

    #[test]
    fn test_initial_state_from_columns() {
        let state = TableState::new(&columns(), &TableOptions::new());
        assert!(!state.is_visible("isbn"));
        assert!(state.is_visible("name"));
        assert_eq!(state.pin_of("actions"), Some(Pin::Right));
        assert_eq!(state.page, 1);
        assert_eq!(state.page_size, usize::MAX);
    }

    #[test]
    fn test_sort_cycle() {
        let mut state = TableState::new(&columns(), &TableOptions::new());
        state.toggle_sort("name");
        assert_eq!(state.sort_direction("name"), Some(SortDirection::Ascending));
        state.toggle_sort("name");
        assert_eq!(state.sort_direction("name"), Some(SortDirection::Descending));
        state.toggle_sort("name");
        assert_eq!(state.sort, None);
    }

    #[test]
    fn test_sort_other_column_restarts_ascending() {
        let mut state = TableState::new(&columns(), &TableOptions::new());
        state.toggle_sort("name");
        state.toggle_sort("name");
        state.toggle_sort("isbn");
        assert_eq!(state.sort_direction("isbn"), Some(SortDirection::Ascending));
        assert_eq!(state.sort_direction("name"), None);
    }

    #[test]
    fn test_search_and_filter_reset_page() {
        let options = TableOptions::new().paginated(PaginationConfig::default());
        let mut state = TableState::new(&columns(), &options);
        state.set_page(4);
        state.set_search("an");
        assert_eq!(state.page, 1);

        state.set_page(3);
        state.set_filter("name", ["Anvar"]);
        assert_eq!(state.page, 1);
        assert_eq!(state.filters.len(), 1);

        state.set_filter("name", Vec::<String>::new());
        assert!(state.filters.is_empty());
    }

    #[test]
    fn test_toggle_column_and_pin() {
        let mut state = TableState::new(&columns(), &TableOptions::new());
        state.toggle_column("isbn");
        assert!(state.is_visible("isbn"));
        state.toggle_column("name");
        assert!(!state.is_visible("name"));

        state.set_pin("name", Some(Pin::Left));
        assert_eq!(state.pin_of("name"), Some(Pin::Left));
        state.set_pin("name", None);
        assert_eq!(state.pin_of("name"), None);
    }
}
