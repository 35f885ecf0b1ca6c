//! Per-field input pipeline: raw → mask → coerce → validate
//!
//! Each stage is a pure function. [`FormState::input`](super::FormState::input)
//! composes them and commits the result.

use super::field::{Field, FieldKind};
use super::validate::{validate_field, FieldError};
use super::value::{FieldValue, FileRef, FormValues};

/// What an input control reports on change
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Text(String),
    Checked(bool),
    Selected(Vec<String>),
    Files(Vec<FileRef>),
}

impl RawInput {
    pub fn text(s: impl Into<String>) -> Self {
        RawInput::Text(s.into())
    }
}

/// Result of running a raw input through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub value: FieldValue,
    pub error: Option<FieldError>,
}

/// Stage 1: apply the field's mask to textual input
pub fn mask_stage(field: &Field, raw: RawInput) -> RawInput {
    match (&field.mask, raw) {
        (Some(mask), RawInput::Text(text)) => RawInput::Text(mask.apply(&text)),
        (_, raw) => raw,
    }
}

/// Stage 2: coerce raw input into the value type of the field kind
///
/// Unparseable numbers stay as text so that validation can report them.
pub fn coerce_stage(kind: &FieldKind, raw: RawInput) -> FieldValue {
    match (kind, raw) {
        (FieldKind::Checkbox | FieldKind::Switch, RawInput::Checked(b)) => FieldValue::Bool(b),
        (FieldKind::Checkbox | FieldKind::Switch, RawInput::Text(s)) => FieldValue::Bool(s == "true"),
        (FieldKind::Number { .. } | FieldKind::Range { .. }, RawInput::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                FieldValue::Empty
            } else {
                trimmed
                    .parse::<f64>()
                    .map(FieldValue::Number)
                    .unwrap_or(FieldValue::Text(s))
            }
        }
        (FieldKind::Select { multiple: true, .. }, RawInput::Selected(items)) => {
            FieldValue::List(items)
        }
        (FieldKind::Select { multiple: true, .. }, RawInput::Text(s)) => {
            FieldValue::List(if s.is_empty() { Vec::new() } else { vec![s] })
        }
        (FieldKind::Select { .. }, RawInput::Selected(items)) => items
            .into_iter()
            .next()
            .map(FieldValue::Text)
            .unwrap_or_default(),
        (FieldKind::File { .. }, RawInput::Files(files)) if files.is_empty() => FieldValue::Empty,
        (FieldKind::File { .. }, RawInput::Files(files)) => FieldValue::Files(files),
        (_, RawInput::Text(s)) if s.is_empty() => FieldValue::Empty,
        (_, RawInput::Text(s)) => FieldValue::Text(s),
        (_, RawInput::Checked(b)) => FieldValue::Bool(b),
        (_, RawInput::Selected(items)) => FieldValue::List(items),
        (_, RawInput::Files(files)) => FieldValue::Files(files),
    }
}

/// Stage 3: validate against the rest of the form
pub fn validate_stage(field: &Field, value: &FieldValue, values: &FormValues) -> Option<FieldError> {
    validate_field(field, value, values).err()
}

/// Run all stages for one field
pub fn process(field: &Field, raw: RawInput, values: &FormValues) -> Processed {
    let value = coerce_stage(&field.kind, mask_stage(field, raw));
    let error = validate_stage(field, &value, values);
    Processed { value, error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field::SelectOption;

    #[test]
    fn test_masked_text_pipeline() {
        let field = Field::new("phone", "Phone", FieldKind::Tel).mask("(99) 999-99-99");
        let out = process(&field, RawInput::text("901234567"), &FormValues::new());
        assert_eq!(out.value, FieldValue::text("(90) 123-45-67"));
        assert_eq!(out.error, None);

        let out = process(&field, RawInput::text("9012"), &FormValues::new());
        assert_eq!(out.value, FieldValue::text("(90) 12"));
        assert_eq!(out.error, Some(FieldError::IncompleteInput));
    }

    #[test]
    fn test_number_coercion() {
        let kind = FieldKind::number();
        assert_eq!(coerce_stage(&kind, RawInput::text(" 42 ")), FieldValue::Number(42.0));
        assert_eq!(coerce_stage(&kind, RawInput::text("")), FieldValue::Empty);
        assert_eq!(coerce_stage(&kind, RawInput::text("4x")), FieldValue::text("4x"));
    }

    #[test]
    fn test_select_coercion() {
        let single = FieldKind::select(vec![SelectOption::new("A", "a")]);
        assert_eq!(
            coerce_stage(&single, RawInput::Selected(vec!["a".into()])),
            FieldValue::text("a")
        );
        let multi = FieldKind::Select {
            options: vec![],
            multiple: true,
        };
        assert_eq!(
            coerce_stage(&multi, RawInput::text("a")),
            FieldValue::List(vec!["a".into()])
        );
    }

    #[test]
    fn test_file_and_toggle_coercion() {
        let file = FieldKind::file("image/*");
        assert_eq!(coerce_stage(&file, RawInput::Files(vec![])), FieldValue::Empty);
        assert_eq!(
            coerce_stage(&FieldKind::Switch, RawInput::Checked(true)),
            FieldValue::Bool(true)
        );
    }
}
