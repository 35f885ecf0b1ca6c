//! Form state machine
//!
//! [`FormState`] owns the bound values of one form instance and drives
//! editing, multi-step navigation, undo/redo, autosave and submission. It is
//! independent of any UI framework; the console binds it to signals.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::field::Field;
use super::history::History;
use super::input::{process, RawInput};
use super::validate::{validate_field, FieldError};
use super::value::{FieldValue, FormValues};
use crate::record::Record;

/// Snapshots kept for undo
pub const HISTORY_LIMIT: usize = 50;

/// Storage key for persisted drafts of a form
pub fn storage_key(form_id: &str) -> String {
    format!("form-state-{}", form_id)
}

/// Static description of a form
#[derive(Debug, Clone)]
pub struct FormSchema {
    /// Identifier used for persisted drafts
    pub id: String,
    pub fields: Vec<Field>,
    /// Step titles; a form without titles has a single step
    pub steps: Vec<String>,
    pub persist: bool,
    pub autosave: Option<Duration>,
}

impl FormSchema {
    pub fn new(id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            fields,
            steps: Vec::new(),
            persist: false,
            autosave: None,
        }
    }

    pub fn steps<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = titles.into_iter().map(Into::into).collect();
        self
    }

    /// Persist drafts to client storage on change
    pub fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }

    pub fn autosave_every(mut self, interval: Duration) -> Self {
        self.autosave = Some(interval);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn step_count(&self) -> usize {
        let from_fields = self.fields.iter().map(|f| f.step + 1).max().unwrap_or(1);
        from_fields.max(self.steps.len()).max(1)
    }
}

/// Persisted draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub values: FormValues,
    pub step: usize,
}

/// Errors keyed by field name
pub type FormErrors = BTreeMap<String, FieldError>;

/// Live state of one form instance
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Arc<FormSchema>,
    values: FormValues,
    initial: FormValues,
    errors: FormErrors,
    touched: BTreeSet<String>,
    dirty: bool,
    history: History<FormValues>,
    step: usize,
    last_saved: Option<DateTime<Utc>>,
}

impl FormState {
    /// Fresh form with default values
    pub fn new(schema: Arc<FormSchema>) -> Self {
        let initial: FormValues = schema
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.initial_value()))
            .collect();
        Self {
            schema,
            values: initial.clone(),
            initial,
            errors: FormErrors::new(),
            touched: BTreeSet::new(),
            dirty: false,
            history: History::new(HISTORY_LIMIT),
            step: 0,
            last_saved: None,
        }
    }

    /// Form for editing an existing record; fields bind by name
    pub fn from_record(schema: Arc<FormSchema>, record: &Record) -> Self {
        let mut state = Self::new(schema);
        for field in &state.schema.fields {
            if let Some(value) = record.get(&field.name) {
                state
                    .initial
                    .insert(field.name.clone(), FieldValue::from_json(value));
            }
        }
        state.values = state.initial.clone();
        state
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&FieldError> {
        self.errors.get(name)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.schema
            .field(name)
            .is_some_and(|f| f.is_visible(&self.values))
    }

    /// Fields currently shown, in declaration order
    pub fn visible_fields(&self) -> impl Iterator<Item = &Field> {
        self.schema
            .fields
            .iter()
            .filter(move |f| f.is_visible(&self.values))
    }

    /// Visible fields of the current step
    pub fn step_fields(&self) -> impl Iterator<Item = &Field> {
        let step = self.step;
        self.visible_fields().filter(move |f| f.step == step)
    }

    /// Visible fields of the current step grouped by section title
    pub fn grouped_step_fields(&self) -> Vec<(Option<String>, Vec<&Field>)> {
        let mut groups: Vec<(Option<String>, Vec<&Field>)> = Vec::new();
        for field in self.step_fields() {
            match groups.iter_mut().find(|(g, _)| *g == field.group) {
                Some((_, fields)) => fields.push(field),
                None => groups.push((field.group.clone(), vec![field])),
            }
        }
        groups
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    /// Run raw input through mask → coerce → validate and commit it
    ///
    /// The value is committed even when invalid, so the control shows what was
    /// typed; the error is kept for display.
    pub fn input(&mut self, name: &str, raw: RawInput) -> Option<&FieldError> {
        let field = self.schema.field(name)?.clone();
        if field.disabled {
            return None;
        }
        let processed = process(&field, raw, &self.values);
        if self.values.get(name) == Some(&processed.value) {
            return self.errors.get(name);
        }

        self.history.record(self.values.clone());
        self.values.insert(name.to_string(), processed.value);
        self.touched.insert(name.to_string());
        self.dirty = true;
        match processed.error {
            Some(err) => {
                self.errors.insert(name.to_string(), err);
            }
            None => {
                self.errors.remove(name);
            }
        }
        self.prune_hidden_errors();
        self.errors.get(name)
    }

    /// Mark a field as visited and validate it
    pub fn blur(&mut self, name: &str) {
        self.touched.insert(name.to_string());
        self.revalidate(name);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.values.clone()) {
            Some(previous) => {
                self.values = previous;
                self.after_history_jump();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.values.clone()) {
            Some(next) => {
                self.values = next;
                self.after_history_jump();
                true
            }
            None => false,
        }
    }

    fn after_history_jump(&mut self) {
        self.dirty = self.values != self.initial;
        let touched: Vec<String> = self.touched.iter().cloned().collect();
        for name in touched {
            self.revalidate(&name);
        }
    }

    /// Back to initial values; clears errors and history
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
        self.history.clear();
        self.dirty = false;
        self.step = 0;
    }

    fn revalidate(&mut self, name: &str) {
        let Some(field) = self.schema.field(name) else {
            return;
        };
        let value = self.values.get(name).cloned().unwrap_or_default();
        let result = if field.is_visible(&self.values) {
            validate_field(field, &value, &self.values)
        } else {
            Ok(())
        };
        match result {
            Ok(()) => {
                self.errors.remove(name);
            }
            Err(err) => {
                self.errors.insert(name.to_string(), err);
            }
        }
    }

    fn prune_hidden_errors(&mut self) {
        let values = &self.values;
        let schema = &self.schema;
        self.errors
            .retain(|name, _| schema.field(name).is_some_and(|f| f.is_visible(values)));
    }

    /// Validate the given fields; returns true when all pass
    fn validate_fields<I>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = String>,
    {
        let mut ok = true;
        for name in names {
            self.touched.insert(name.clone());
            self.revalidate(&name);
            ok &= !self.errors.contains_key(&name);
        }
        ok
    }

    // ------------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------------

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.schema.step_count()
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 >= self.step_count()
    }

    /// Advance if the current step's visible fields are valid
    pub fn next_step(&mut self) -> bool {
        let names: Vec<String> = self.step_fields().map(|f| f.name.clone()).collect();
        if !self.validate_fields(names) || self.is_last_step() {
            return false;
        }
        self.step += 1;
        true
    }

    pub fn prev_step(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Validate every visible field and return the visible values
    ///
    /// Hidden fields are neither validated nor submitted.
    pub fn submit(&mut self) -> Result<FormValues, FormErrors> {
        let names: Vec<String> = self.visible_fields().map(|f| f.name.clone()).collect();
        if !self.validate_fields(names.clone()) {
            debug!(form = %self.schema.id, errors = self.errors.len(), "Form submission blocked");
            return Err(self.errors.clone());
        }
        Ok(names
            .into_iter()
            .filter_map(|n| self.values.get(&n).cloned().map(|v| (n, v)))
            .collect())
    }

    /// Submission succeeded: current values become the new baseline
    pub fn mark_submitted(&mut self) {
        self.initial = self.values.clone();
        self.dirty = false;
        self.history.clear();
    }

    // ------------------------------------------------------------------------
    // Autosave and drafts
    // ------------------------------------------------------------------------

    /// Whether an autosave should run now
    pub fn autosave_due(&self, now: DateTime<Utc>) -> bool {
        let Some(interval) = self.schema.autosave else {
            return false;
        };
        self.dirty
            && self
                .last_saved
                .map_or(true, |saved| now.signed_duration_since(saved) >= interval)
    }

    pub fn mark_saved(&mut self, now: DateTime<Utc>) {
        self.last_saved = Some(now);
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn storage_key(&self) -> String {
        storage_key(&self.schema.id)
    }

    pub fn draft(&self) -> Draft {
        Draft {
            values: self.values.clone(),
            step: self.step,
        }
    }

    /// Restore a persisted draft; unknown fields are ignored
    pub fn restore(&mut self, draft: Draft) {
        for (name, value) in draft.values {
            if self.schema.field(&name).is_some() {
                self.values.insert(name, value);
            }
        }
        self.step = draft.step.min(self.step_count() - 1);
        self.dirty = self.values != self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::condition::Condition;
    use crate::form::field::{FieldKind, SelectOption};
    use serde_json::json;

    fn schema() -> Arc<FormSchema> {
        Arc::new(
            FormSchema::new(
                "student",
                vec![
                    Field::new("full_name", "Full name", FieldKind::Text).required(),
                    Field::new("phone", "Phone", FieldKind::Tel)
                        .mask("(99) 999-99-99")
                        .required(),
                    Field::new(
                        "kind",
                        "Kind",
                        FieldKind::select(vec![
                            SelectOption::new("Student", "student"),
                            SelectOption::new("Lecturer", "lecturer"),
                        ]),
                    )
                    .step(1),
                    Field::new("group", "Group", FieldKind::Text)
                        .required()
                        .visible_when("kind", Condition::Equals(FieldValue::text("student")))
                        .step(1),
                ],
            )
            .steps(["Personal", "Study"])
            .autosave_every(Duration::seconds(30)),
        )
    }

    #[test]
    fn test_input_commits_masked_value() {
        let mut form = FormState::new(schema());
        assert!(form.input("phone", RawInput::text("901234567")).is_none());
        assert_eq!(form.value("phone"), Some(&FieldValue::text("(90) 123-45-67")));
        assert!(form.is_dirty());
        assert!(form.is_touched("phone"));
    }

    #[test]
    fn test_invalid_input_is_kept_with_error() {
        let mut form = FormState::new(schema());
        let err = form.input("phone", RawInput::text("90")).cloned();
        assert_eq!(err, Some(FieldError::IncompleteInput));
        assert_eq!(form.value("phone"), Some(&FieldValue::text("(90")));
    }

    #[test]
    fn test_submit_blocks_on_errors() {
        let mut form = FormState::new(schema());
        let errors = form.submit().unwrap_err();
        assert!(errors.contains_key("full_name"));
        assert!(errors.contains_key("phone"));
        assert!(!errors.contains_key("group"));
    }

    #[test]
    fn test_hidden_fields_skip_validation_and_submission() {
        let mut form = FormState::new(schema());
        form.input("full_name", RawInput::text("Aziza Karimova"));
        form.input("phone", RawInput::text("901234567"));
        form.input("kind", RawInput::Selected(vec!["lecturer".into()]));
        assert!(!form.is_visible("group"));

        let values = form.submit().unwrap();
        assert!(!values.contains_key("group"));
        assert_eq!(values["kind"], FieldValue::text("lecturer"));

        form.input("kind", RawInput::Selected(vec!["student".into()]));
        assert!(form.is_visible("group"));
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["group"]);
    }

    #[test]
    fn test_steps_validate_current_step_only() {
        let mut form = FormState::new(schema());
        assert_eq!(form.step_count(), 2);
        assert!(!form.next_step());
        assert_eq!(form.step(), 0);

        form.input("full_name", RawInput::text("Aziza"));
        form.input("phone", RawInput::text("901234567"));
        assert!(form.next_step());
        assert_eq!(form.step(), 1);
        assert!(form.is_last_step());
        assert!(!form.next_step());
        assert!(form.prev_step());
        assert!(!form.prev_step());
    }

    #[test]
    fn test_undo_redo_restores_values() {
        let mut form = FormState::new(schema());
        form.input("full_name", RawInput::text("A"));
        form.input("full_name", RawInput::text("Ab"));
        assert!(form.undo());
        assert_eq!(form.value("full_name"), Some(&FieldValue::text("A")));
        assert!(form.undo());
        assert_eq!(form.value("full_name"), Some(&FieldValue::Empty));
        assert!(!form.is_dirty());
        assert_eq!(
            form.error("full_name"),
            Some(&FieldError::Required("Full name".into()))
        );
        assert!(form.redo());
        assert_eq!(form.value("full_name"), Some(&FieldValue::text("A")));
        assert!(form.error("full_name").is_none());
    }

    #[test]
    fn test_autosave_due() {
        let mut form = FormState::new(schema());
        let t0 = Utc::now();
        assert!(!form.autosave_due(t0));

        form.input("full_name", RawInput::text("A"));
        assert!(form.autosave_due(t0));
        form.mark_saved(t0);
        assert!(!form.autosave_due(t0 + Duration::seconds(10)));
        assert!(form.autosave_due(t0 + Duration::seconds(30)));
    }

    #[test]
    fn test_from_record_and_reset() {
        let record = json!({"full_name": "Bekzod", "kind": {"id": "student"}, "extra": 1})
            .as_object()
            .cloned()
            .unwrap();
        let mut form = FormState::from_record(schema(), &record);
        assert_eq!(form.value("full_name"), Some(&FieldValue::text("Bekzod")));
        assert_eq!(form.value("kind"), Some(&FieldValue::text("student")));
        assert!(!form.is_dirty());

        form.input("full_name", RawInput::text("Other"));
        form.reset();
        assert_eq!(form.value("full_name"), Some(&FieldValue::text("Bekzod")));
        assert!(!form.can_undo());
    }

    #[test]
    fn test_draft_roundtrip() {
        let mut form = FormState::new(schema());
        form.input("full_name", RawInput::text("Draft"));
        let json = serde_json::to_string(&form.draft()).unwrap();
        assert_eq!(form.storage_key(), "form-state-student");

        let mut restored = FormState::new(schema());
        restored.restore(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.value("full_name"), Some(&FieldValue::text("Draft")));
        assert!(restored.is_dirty());
    }

    #[test]
    fn test_grouped_fields() {
        let schema = Arc::new(FormSchema::new(
            "book",
            vec![
                Field::new("title", "Title", FieldKind::Text).group("Main"),
                Field::new("isbn", "ISBN", FieldKind::Text).group("Main"),
                Field::new("cover", "Cover", FieldKind::file("image/*")).group("Media"),
            ],
        ));
        let form = FormState::new(schema);
        let groups = form.grouped_step_fields();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.as_deref(), Some("Main"));
        assert_eq!(groups[0].1.len(), 2);
    }
}
