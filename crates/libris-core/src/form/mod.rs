//! Generic form builder
//!
//! A form is a list of [`Field`] descriptors. Each field kind is a variant of
//! [`FieldKind`], so every renderer and validator handles the full set through
//! exhaustive matching. Editing flows through a small per-field pipeline:
//!
//! ```text
//! RawInput ─► mask ─► coerce ─► validate ─► commit (FormState)
//! ```
//!
//! On top of that [`FormState`] provides dependency visibility, multi-step
//! navigation, undo/redo, autosave scheduling and draft persistence.

pub mod condition;
pub mod field;
pub mod history;
pub mod input;
pub mod layout;
pub mod mask;
pub mod state;
pub mod validate;
pub mod value;

pub use condition::{Condition, Dependency};
pub use field::{CustomValidator, Field, FieldKind, SelectOption};
pub use history::History;
pub use input::{coerce_stage, mask_stage, process, validate_stage, Processed, RawInput};
pub use layout::{Breakpoint, Layout, Span};
pub use mask::Mask;
pub use state::{storage_key, Draft, FormErrors, FormSchema, FormState, HISTORY_LIMIT};
pub use validate::{validate_field, FieldError};
pub use value::{values_to_json, FieldValue, FileRef, FormValues};
