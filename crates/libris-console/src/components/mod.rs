//! Console UI components
//!
//! Modular Leptos components shared by the pages.
//!
//! ## Architecture
//!
//! The component hierarchy follows a layered design:
//!
//! 1. **Primitives** (`primitives.rs`, `modal.rs`, `toast.rs`) - Low-level building blocks
//!    - Loading indicators: `LoadingSpinner`, `Skeleton`, `SkeletonRow`
//!    - States: `ErrorState`, `EmptyState`
//!    - Data display: `StatCard`, `TableCard`, `InfoRow`, `Badge`, `Avatar`
//!    - Overlays: `Modal`, `ConfirmDialog`, `ToastHost`
//!
//! 2. **Icons** (`icons.rs`) - Inline SVG icons
//!
//! 3. **Generic widgets** - Driven entirely by descriptors
//!    - `DataTable` renders a column list with search, filters, sorting,
//!      pagination, selection, expansion, pinning and CSV export
//!    - `AutoForm` renders a form schema with masking, validation, steps,
//!      undo/redo and draft persistence
//!    - `BarChart` for dashboard series
//!
//! 4. **Layout** (`header.rs`, `sidebar.rs`) - Structural components
//!
//! ## Accessibility
//!
//! All components include ARIA attributes for screen reader support.

pub mod auto_form;
pub mod chart;
pub mod data_table;
pub mod header;
pub mod icons;
pub mod modal;
pub mod primitives;
pub mod sidebar;
pub mod toast;

// Re-export layout components
pub use header::Header;
pub use sidebar::Sidebar;

pub use auto_form::{AutoForm, Submission};
pub use chart::{BarChart, BarGroup};
pub use data_table::{CellRenderer, CellRenderers, DataTable};
pub use modal::{ConfirmDialog, Modal};
pub use toast::ToastHost;

// Re-export primitives for convenient access
pub use primitives::{
    Avatar, Badge, BadgeVariant, EmptyState, ErrorState, InfoRow, LoadingSpinner, SearchInput,
    Skeleton, SkeletonRow, StatCard, TableCard,
};
