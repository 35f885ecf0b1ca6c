//! Derivation pipeline: visible columns → search → filters → sort → page
//!
//! [`derive`] is a pure function of the columns, the data source and the
//! table state. It works on indices into the data source, so the records are
//! never cloned or mutated, and ties in sorting keep their original order.

use super::column::{Column, Pin};
use super::selection::RowKey;
use super::state::{SortDirection, TableOptions, TableState};
use crate::record::Record;

/// Skeleton rows rendered while loading
pub const SKELETON_ROWS: usize = 10;

/// One row of the current page
#[derive(Debug, Clone)]
pub struct RowRef<'a> {
    /// Position in the original data source
    pub index: usize,
    pub key: RowKey,
    pub record: &'a Record,
}

/// What the table body renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyPlan {
    Skeleton { rows: usize, cells: usize },
    Empty { colspan: usize },
    Rows,
}

/// Result of running the pipeline
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    /// Visible columns in render order (left pins, unpinned, right pins)
    pub columns: Vec<&'a Column>,
    /// Data-source indices of all rows after search, filters and sort
    pub matched: Vec<usize>,
    pub rows: Vec<RowRef<'a>>,
    pub total: usize,
    /// 1-based page actually shown after clamping
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub selection_column: bool,
    pub expand_column: bool,
}

impl<'a> TableView<'a> {
    /// Number of cells in a full-width row
    pub fn column_span(&self) -> usize {
        self.columns.len() + usize::from(self.selection_column) + usize::from(self.expand_column)
    }

    /// Body rendering decision
    pub fn body(&self, loading: bool) -> BodyPlan {
        if loading {
            BodyPlan::Skeleton {
                rows: SKELETON_ROWS,
                cells: self.column_span(),
            }
        } else if self.rows.is_empty() {
            BodyPlan::Empty {
                colspan: self.column_span(),
            }
        } else {
            BodyPlan::Rows
        }
    }

    /// Keys of the current page, in display order
    pub fn page_keys(&self) -> Vec<RowKey> {
        self.rows.iter().map(|r| r.key.clone()).collect()
    }

    /// 1-based inclusive range of rows shown, `None` when empty
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.rows.is_empty() {
            return None;
        }
        let start = (self.page - 1).saturating_mul(self.page_size) + 1;
        Some((start, start + self.rows.len() - 1))
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

/// Number of pages for `total` rows
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Run the full pipeline
pub fn derive<'a>(
    columns: &'a [Column],
    rows: &'a [Record],
    state: &TableState,
    options: &TableOptions,
) -> TableView<'a> {
    let visible = visible_columns(columns, state);

    let query = state.search.to_lowercase();
    let search_active = options.searchable && !query.is_empty();

    let filters: Vec<(&Column, _)> = visible
        .iter()
        .filter_map(|c| {
            state
                .filters
                .get(&c.key)
                .filter(|values| !values.is_empty())
                .map(|values| (*c, values))
        })
        .collect();

    let mut matched: Vec<usize> = (0..rows.len())
        .filter(|&i| {
            let record = &rows[i];
            let found = !search_active
                || visible
                    .iter()
                    .filter(|c| c.searchable)
                    .any(|c| c.text(record).to_lowercase().contains(&query));
            found
                && filters
                    .iter()
                    .all(|(column, values)| values.contains(&column.text(record)))
        })
        .collect();

    if let Some(sort) = &state.sort {
        let column = visible
            .iter()
            .find(|c| c.key == sort.column && c.sorter.is_some());
        if let Some(column) = column {
            matched.sort_by(|&a, &b| {
                let ord = column
                    .compare(&rows[a], &rows[b])
                    .unwrap_or(std::cmp::Ordering::Equal);
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
    }

    let total = matched.len();
    let page_size = state.page_size.max(1);
    let pages = page_count(total, page_size);
    let page = state.page.clamp(1, pages.max(1));

    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    let page_rows = matched[start..end]
        .iter()
        .map(|&index| RowRef {
            index,
            key: RowKey::of(&rows[index], index, options.row_key.as_ref()),
            record: &rows[index],
        })
        .collect();

    TableView {
        columns: visible,
        matched,
        rows: page_rows,
        total,
        page,
        page_size,
        page_count: pages,
        selection_column: options.selection.is_some(),
        expand_column: options.expandable,
    }
}

/// Visible columns in render order
pub fn visible_columns<'a>(columns: &'a [Column], state: &TableState) -> Vec<&'a Column> {
    let visible = columns.iter().filter(|c| state.is_visible(&c.key));
    let pinned = |side: Option<Pin>| {
        visible
            .clone()
            .filter(move |c| state.pin_of(&c.key) == side)
    };
    pinned(Some(Pin::Left))
        .chain(pinned(None))
        .chain(pinned(Some(Pin::Right)))
        .collect()
}

/// Records behind the selected keys, looked up over the whole data source
pub fn selected_records<'a>(
    rows: &'a [Record],
    state: &TableState,
    options: &TableOptions,
) -> Vec<&'a Record> {
    rows.iter()
        .enumerate()
        .filter(|(i, r)| {
            state
                .selection
                .is_selected(&RowKey::of(r, *i, options.row_key.as_ref()))
        })
        .map(|(_, r)| r)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::selection::SelectionMode;
    use crate::table::state::PaginationConfig;
    use serde_json::{json, Value};

    fn records(values: Value) -> Vec<Record> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn people() -> Vec<Record> {
        records(json!([
            {"id": 1, "name": "Anvar"},
            {"id": 2, "name": "Bekzod"},
            {"id": 3, "name": "Anora"}
        ]))
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("name", "Name").sortable(),
        ]
    }

    fn names(view: &TableView<'_>) -> Vec<String> {
        view.rows
            .iter()
            .map(|r| r.record["name"].as_str().unwrap().to_string())
            .collect()
    }

    fn searchable() -> TableOptions {
        TableOptions::new().searchable().row_key("id")
    }

    #[test]
    fn test_search_keeps_matching_rows_in_order() {
        let (cols, data, options) = (columns(), people(), searchable());
        let mut state = TableState::new(&cols, &options);
        state.set_search("An");
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(names(&view), vec!["Anvar", "Anora"]);
        assert_eq!(view.matched, vec![0, 2]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_any_visible_column() {
        let (cols, data, options) = (columns(), people(), searchable());
        let mut state = TableState::new(&cols, &options);
        state.set_search("BEK");
        assert_eq!(names(&derive(&cols, &data, &state, &options)), vec!["Bekzod"]);

        state.set_search("3");
        assert_eq!(names(&derive(&cols, &data, &state, &options)), vec!["Anora"]);

        state.toggle_column("id");
        assert!(derive(&cols, &data, &state, &options).rows.is_empty());
    }

    #[test]
    fn test_search_keeps_surrounding_spaces() {
        let (cols, data, options) = (columns(), people(), searchable());
        let mut state = TableState::new(&cols, &options);
        state.set_search("An ");
        assert!(derive(&cols, &data, &state, &options).rows.is_empty());
    }

    #[test]
    fn test_search_ignored_when_not_searchable() {
        let (cols, data) = (columns(), people());
        let options = TableOptions::new();
        let mut state = TableState::new(&cols, &options);
        state.set_search("zzz");
        assert_eq!(derive(&cols, &data, &state, &options).total, 3);
    }

    #[test]
    fn test_filters_are_conjunctive_across_columns() {
        let data = records(json!([
            {"title": "A", "status": "PENDING", "branch": "north"},
            {"title": "B", "status": "APPROVED", "branch": "north"},
            {"title": "C", "status": "PENDING", "branch": "south"},
            {"title": "D", "status": "RETURNED", "branch": "north"}
        ]));
        let cols = vec![
            Column::new("title", "Title"),
            Column::new("status", "Status").filter_distinct(),
            Column::new("branch", "Branch").filter_distinct(),
        ];
        let options = TableOptions::new();
        let mut state = TableState::new(&cols, &options);
        state.set_filter("status", ["PENDING", "RETURNED"]);
        let titles = |state: &TableState| -> Vec<String> {
            derive(&cols, &data, state, &options)
                .rows
                .iter()
                .map(|r| r.record["title"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(titles(&state), vec!["A", "C", "D"]);

        state.set_filter("branch", ["north"]);
        assert_eq!(titles(&state), vec!["A", "D"]);
    }

    #[test]
    fn test_sort_cycle_scenario() {
        let (cols, data, options) = (columns(), people(), searchable());
        let mut state = TableState::new(&cols, &options);

        state.toggle_sort("name");
        assert_eq!(
            names(&derive(&cols, &data, &state, &options)),
            vec!["Anora", "Anvar", "Bekzod"]
        );

        state.toggle_sort("name");
        assert_eq!(
            names(&derive(&cols, &data, &state, &options)),
            vec!["Bekzod", "Anvar", "Anora"]
        );

        state.toggle_sort("name");
        assert_eq!(
            names(&derive(&cols, &data, &state, &options)),
            vec!["Anvar", "Bekzod", "Anora"]
        );
    }

    #[test]
    fn test_numeric_sort_and_custom_comparator() {
        let data = records(json!([{"n": 10}, {"n": 9}, {"n": 100}]));
        let cols = vec![
            Column::new("n", "N").sortable(),
            Column::new("len", "Len").sort_by(|a, b| {
                let la = a["n"].to_string().len();
                let lb = b["n"].to_string().len();
                lb.cmp(&la)
            }),
        ];
        let options = TableOptions::new();
        let mut state = TableState::new(&cols, &options);
        state.toggle_sort("n");
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(view.matched, vec![1, 0, 2]);

        state.toggle_sort("len");
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(view.matched, vec![2, 0, 1]);
    }

    #[test]
    fn test_sort_ignored_for_column_without_sorter() {
        let data = people();
        let cols = vec![Column::new("name", "Name")];
        let options = TableOptions::new();
        let mut state = TableState::new(&cols, &options);
        state.toggle_sort("name");
        assert_eq!(derive(&cols, &data, &state, &options).matched, vec![0, 1, 2]);
    }

    #[test]
    fn test_pagination_scenario() {
        let data = records(json!([
            {"name": "r1"}, {"name": "r2"}, {"name": "r3"}, {"name": "r4"}, {"name": "r5"}
        ]));
        let cols = vec![Column::new("name", "Name")];
        let options = TableOptions::new().paginated(PaginationConfig::default().with_page_size(2));
        let mut state = TableState::new(&cols, &options);

        let view = derive(&cols, &data, &state, &options);
        assert_eq!(view.page_count, 3);
        assert_eq!(names(&view), vec!["r1", "r2"]);
        assert_eq!(view.range(), Some((1, 2)));

        state.set_page(3);
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(names(&view), vec!["r5"]);
        assert_eq!(view.range(), Some((5, 5)));
        assert!(!view.has_next());
        assert!(view.has_previous());
    }

    #[test]
    fn test_pages_concatenate_to_matched_rows() {
        let data: Vec<Record> = (0..23)
            .map(|i| json!({"id": i, "name": format!("n{}", 23 - i)}))
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        let cols = columns();
        let options = searchable().paginated(PaginationConfig::default().with_page_size(5));
        let mut state = TableState::new(&cols, &options);
        state.toggle_sort("name");
        state.set_search("n1");

        let full = derive(&cols, &data, &state, &options);
        let mut concatenated = Vec::new();
        for page in 1..=full.page_count {
            state.set_page(page);
            let view = derive(&cols, &data, &state, &options);
            assert!(view.rows.len() <= 5);
            concatenated.extend(view.rows.iter().map(|r| r.index));
        }
        assert_eq!(concatenated, full.matched);
    }

    #[test]
    fn test_page_is_clamped() {
        let (cols, data) = (columns(), people());
        let options = TableOptions::new().paginated(PaginationConfig::default().with_page_size(2));
        let mut state = TableState::new(&cols, &options);
        state.set_page(9);
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(view.page, 2);
        assert_eq!(view.rows.len(), 1);
    }

    #[test]
    fn test_loading_renders_skeleton_rows() {
        let (cols, data) = (columns(), people());
        let options = TableOptions::new()
            .selectable(SelectionMode::Multiple)
            .expandable();
        let state = TableState::new(&cols, &options);
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(view.body(true), BodyPlan::Skeleton { rows: 10, cells: 4 });

        let options = TableOptions::new();
        let mut state = TableState::new(&cols, &options);
        state.toggle_column("id");
        let empty: Vec<Record> = Vec::new();
        let view = derive(&cols, &empty, &state, &options);
        assert_eq!(view.body(true), BodyPlan::Skeleton { rows: 10, cells: 1 });
    }

    #[test]
    fn test_empty_renders_single_spanning_row() {
        let cols = columns();
        let options = TableOptions::new().selectable(SelectionMode::Single);
        let state = TableState::new(&cols, &options);
        let empty: Vec<Record> = Vec::new();
        let view = derive(&cols, &empty, &state, &options);
        assert_eq!(view.body(false), BodyPlan::Empty { colspan: 3 });
        assert_eq!(view.page_count, 0);
        assert_eq!(view.page, 1);
        assert_eq!(view.range(), None);

        let data = people();
        assert_eq!(derive(&cols, &data, &state, &options).body(false), BodyPlan::Rows);
    }

    #[test]
    fn test_missing_paths_render_empty() {
        let data = records(json!([{"title": "X"}]));
        let cols = vec![Column::new("publisher", "Publisher").path("publisher.name")];
        let options = TableOptions::new();
        let state = TableState::new(&cols, &options);
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(view.columns[0].display(view.rows[0].record), "");
    }

    #[test]
    fn test_pinned_columns_render_order() {
        let cols = vec![
            Column::new("a", "A"),
            Column::new("b", "B").pin(Pin::Right),
            Column::new("c", "C"),
            Column::new("d", "D").pin(Pin::Left),
        ];
        let options = TableOptions::new();
        let state = TableState::new(&cols, &options);
        let order: Vec<_> = visible_columns(&cols, &state)
            .iter()
            .map(|c| c.key.as_str())
            .collect();
        assert_eq!(order, vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn test_index_keys_stable_under_filtering() {
        let (cols, data) = (columns(), people());
        let options = TableOptions::new()
            .searchable()
            .selectable(SelectionMode::Multiple);
        let mut state = TableState::new(&cols, &options);
        state.set_search("Bek");
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(view.page_keys(), vec![RowKey::Index(1)]);

        state.selection.select(RowKey::Index(1), true);
        state.set_search("");
        let selected = selected_records(&data, &state, &options);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["name"], json!("Bekzod"));
    }

    #[test]
    fn test_selection_persists_across_pages() {
        let data = people();
        let cols = columns();
        let options = searchable()
            .paginated(PaginationConfig::default().with_page_size(2))
            .selectable(SelectionMode::Multiple);
        let mut state = TableState::new(&cols, &options);

        let keys = derive(&cols, &data, &state, &options).page_keys();
        state.selection.select_page(&keys, true);
        state.set_page(2);
        let view = derive(&cols, &data, &state, &options);
        assert_eq!(view.page_keys(), vec![RowKey::Field("3".into())]);
        assert_eq!(state.selection.len(), 2);
        assert!(state.selection.is_selected(&RowKey::Field("1".into())));
    }
}
