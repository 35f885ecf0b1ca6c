//! Generic data table
//!
//! Renders an arbitrary array of [`Record`](crate::record::Record)s as a
//! searchable, filterable, sortable, paginated grid. This module holds the
//! target-independent part: column descriptors, local UI state, selection and
//! the derivation pipeline. The console's `DataTable` component draws the
//! resulting [`TableView`].
//!
//! ```text
//! columns ─┐
//! records ─┼─► visible ─► search ─► filters ─► sort ─► page ─► TableView
//! state ───┘
//! ```

pub mod column;
pub mod export;
pub mod pipeline;
pub mod selection;
pub mod state;

pub use column::{
    natural_order, Accessor, CellFormat, Column, ColumnFilter, Comparator, FilterOption, Pin,
    Sorter,
};
pub use export::to_csv;
pub use pipeline::{
    derive, page_count, selected_records, visible_columns, BodyPlan, RowRef, TableView,
    SKELETON_ROWS,
};
pub use selection::{PageCheck, RowKey, Selection, SelectionMode};
pub use state::{
    PaginationConfig, SortDirection, SortState, TableOptions, TableState, DEFAULT_PAGE_SIZE,
    DEFAULT_PAGE_SIZE_OPTIONS,
};
