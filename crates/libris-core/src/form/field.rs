//! Field descriptors

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::condition::{Condition, Dependency};
use super::layout::{Breakpoint, Layout};
use super::mask::Mask;
use super::value::{FieldValue, FormValues};

/// Custom validation hook; returns an error message when the value is rejected
pub type CustomValidator = Arc<dyn Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync>;

/// One choice of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Supported input controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Password,
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        step: Option<f64>,
    },
    Date,
    Color,
    Select {
        options: Vec<SelectOption>,
        #[serde(default)]
        multiple: bool,
    },
    Checkbox,
    Switch,
    Range {
        min: f64,
        max: f64,
        step: f64,
    },
    Textarea {
        rows: u32,
    },
    File {
        #[serde(default)]
        accept: Option<String>,
        #[serde(default)]
        multiple: bool,
    },
}

impl FieldKind {
    pub fn number() -> Self {
        FieldKind::Number {
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn select(options: Vec<SelectOption>) -> Self {
        FieldKind::Select {
            options,
            multiple: false,
        }
    }

    pub fn textarea() -> Self {
        FieldKind::Textarea { rows: 4 }
    }

    pub fn file(accept: impl Into<String>) -> Self {
        FieldKind::File {
            accept: Some(accept.into()),
            multiple: false,
        }
    }

    /// HTML `type` attribute for `<input>`-based kinds
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Tel => "tel",
            FieldKind::Password => "password",
            FieldKind::Number { .. } => "number",
            FieldKind::Date => "date",
            FieldKind::Color => "color",
            FieldKind::Checkbox | FieldKind::Switch => "checkbox",
            FieldKind::Range { .. } => "range",
            FieldKind::File { .. } => "file",
            FieldKind::Select { .. } | FieldKind::Textarea { .. } => "text",
        }
    }

    /// Value a fresh form starts with
    pub fn initial_value(&self) -> FieldValue {
        match self {
            FieldKind::Checkbox | FieldKind::Switch => FieldValue::Bool(false),
            FieldKind::Range { min, .. } => FieldValue::Number(*min),
            FieldKind::Select { multiple: true, .. } => FieldValue::List(Vec::new()),
            _ => FieldValue::Empty,
        }
    }

    /// Kinds whose raw input is free text (and therefore maskable)
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldKind::Text
                | FieldKind::Email
                | FieldKind::Tel
                | FieldKind::Password
                | FieldKind::Textarea { .. }
        )
    }
}

/// Field descriptor
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub default: Option<FieldValue>,
    pub mask: Option<Mask>,
    pub depends_on: Option<Dependency>,
    pub validator: Option<CustomValidator>,
    pub layout: Layout,
    /// Zero-based step in a multi-step form
    pub step: usize,
    /// Titled section the field is grouped under
    pub group: Option<String>,
    pub disabled: bool,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

impl Field {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
            description: None,
            default: None,
            mask: None,
            depends_on: None,
            validator: None,
            layout: Layout::default(),
            step: 0,
            group: None,
            disabled: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn mask(mut self, pattern: impl Into<String>) -> Self {
        self.mask = Some(Mask::new(pattern));
        self
    }

    /// Show this field only while `field` satisfies `condition`
    pub fn visible_when(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.depends_on = Some(Dependency {
            field: field.into(),
            condition,
        });
        self
    }

    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Column span at a breakpoint (1–12)
    pub fn cols(mut self, breakpoint: Breakpoint, span: u8) -> Self {
        self.layout = self.layout.cols(breakpoint, span);
        self
    }

    /// Row span at a breakpoint (1–6)
    pub fn rows(mut self, breakpoint: Breakpoint, span: u8) -> Self {
        self.layout = self.layout.rows(breakpoint, span);
        self
    }

    pub fn step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn group(mut self, title: impl Into<String>) -> Self {
        self.group = Some(title.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Starting value for a fresh form
    pub fn initial_value(&self) -> FieldValue {
        self.default
            .clone()
            .unwrap_or_else(|| self.kind.initial_value())
    }

    /// Whether the field is shown for the given values
    pub fn is_visible(&self, values: &FormValues) -> bool {
        self.depends_on
            .as_ref()
            .map_or(true, |dep| dep.is_met(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_serde_tagged_by_type() {
        let kind: FieldKind = serde_json::from_value(json!({
            "type": "select",
            "options": [{"label": "Uzbek", "value": "uz"}]
        }))
        .unwrap();
        assert_eq!(
            kind,
            FieldKind::select(vec![SelectOption::new("Uzbek", "uz")])
        );

        let kind: FieldKind = serde_json::from_value(json!({"type": "number", "min": 0})).unwrap();
        assert_eq!(
            kind,
            FieldKind::Number {
                min: Some(0.0),
                max: None,
                step: None
            }
        );
    }

    #[test]
    fn test_initial_values() {
        assert_eq!(
            Field::new("agree", "Agree", FieldKind::Checkbox).initial_value(),
            FieldValue::Bool(false)
        );
        assert_eq!(
            Field::new("rate", "Rate", FieldKind::Range { min: 1.0, max: 5.0, step: 1.0 })
                .initial_value(),
            FieldValue::Number(1.0)
        );
        assert_eq!(
            Field::new("title", "Title", FieldKind::Text)
                .default_value(FieldValue::text("Untitled"))
                .initial_value(),
            FieldValue::text("Untitled")
        );
    }

    #[test]
    fn test_input_types() {
        assert_eq!(FieldKind::Switch.input_type(), "checkbox");
        assert_eq!(FieldKind::file("application/pdf").input_type(), "file");
        assert!(FieldKind::Tel.is_textual());
        assert!(!FieldKind::Date.is_textual());
    }
}
