//! Column descriptors
//!
//! A [`Column`] says how one field of a [`Record`] is projected, ordered,
//! filtered and presented. Columns are static per screen and never mutate the
//! records they read.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{display_text, KeyPath, Record};

/// Projection function for computed columns
pub type ProjectFn = Arc<dyn Fn(&Record) -> Option<Value> + Send + Sync>;

/// Explicit row comparator
pub type Comparator = Arc<dyn Fn(&Record, &Record) -> Ordering + Send + Sync>;

// ============================================================================
// Accessor
// ============================================================================

/// How a column obtains its value from a record
#[derive(Clone)]
pub enum Accessor {
    /// Read a (possibly nested) field
    Path(KeyPath),
    /// Compute a value from the whole record
    Computed(ProjectFn),
}

impl Accessor {
    /// Project the column value; absent fields yield `None`
    pub fn project<'a>(&self, record: &'a Record) -> Option<Cow<'a, Value>> {
        match self {
            Accessor::Path(path) => path.resolve(record).map(Cow::Borrowed),
            Accessor::Computed(f) => f(record).map(Cow::Owned),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// Sort capability of a column
#[derive(Clone)]
pub enum Sorter {
    /// Natural ordering of the projected values
    Natural,
    /// Caller-supplied comparator over whole records
    Custom(Comparator),
}

impl fmt::Debug for Sorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sorter::Natural => f.write_str("Natural"),
            Sorter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Natural ordering of projected values
///
/// Absent values sort first, then numbers (numerically), then everything else
/// by display text. This is a total order, so mixed columns sort
/// deterministically even though the result for them is not meaningful.
pub fn natural_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(_) => 2,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        _ => match rank(a).cmp(&rank(b)) {
            Ordering::Equal if rank(a) == 2 => {
                let x = a.map(display_text).unwrap_or_default();
                let y = b.map(display_text).unwrap_or_default();
                x.cmp(&y)
            }
            other => other,
        },
    }
}

// ============================================================================
// Presentation
// ============================================================================

/// Pin side for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pin {
    Left,
    Right,
}

/// How a cell value is presented
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellFormat {
    #[default]
    Text,
    /// Right-aligned monospace number
    Number,
    /// ISO date or date-time rendered as `YYYY-MM-DD`
    Date,
    /// Boolean rendered with the given labels
    Boolean { yes: String, no: String },
    /// Short status text rendered as a badge
    Badge,
    /// Uploaded image path rendered as a thumbnail
    Image,
    /// Uploaded file path rendered as a download link
    Link,
    /// Array rendered as a list of tags
    Tags,
}

impl CellFormat {
    /// Plain-text rendering, used for export and as the fallback display
    pub fn text(&self, value: Option<&Value>) -> String {
        let Some(value) = value else {
            return String::new();
        };
        match self {
            CellFormat::Date => {
                let s = display_text(value);
                s.get(..10).map(str::to_string).unwrap_or(s)
            }
            CellFormat::Boolean { yes, no } => match value {
                Value::Bool(true) => yes.clone(),
                Value::Bool(false) => no.clone(),
                other => display_text(other),
            },
            CellFormat::Text
            | CellFormat::Number
            | CellFormat::Badge
            | CellFormat::Image
            | CellFormat::Link
            | CellFormat::Tags => display_text(value),
        }
    }
}

/// One option in a column's filter dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub text: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// Filter capability of a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Fixed option list
    Options(Vec<FilterOption>),
    /// Options are the distinct projected values of the data source
    Distinct,
}

// ============================================================================
// Column
// ============================================================================

/// Column descriptor
#[derive(Debug, Clone)]
pub struct Column {
    /// Stable identifier, unique within a table
    pub key: String,
    /// Header text
    pub title: String,
    pub accessor: Accessor,
    pub sorter: Option<Sorter>,
    pub filter: Option<ColumnFilter>,
    pub format: CellFormat,
    /// CSS width, e.g. `"120px"`
    pub width: Option<String>,
    /// Hidden until the user enables it
    pub hidden: bool,
    pub pin: Option<Pin>,
    /// Participates in free-text search
    pub searchable: bool,
}

impl Column {
    /// Column reading the field named by `key`
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            accessor: Accessor::Path(KeyPath::parse(&key)),
            key,
            title: title.into(),
            sorter: None,
            filter: None,
            format: CellFormat::Text,
            width: None,
            hidden: false,
            pin: None,
            searchable: true,
        }
    }

    /// Read a different (nested) path than the column key
    pub fn path(mut self, path: impl Into<KeyPath>) -> Self {
        self.accessor = Accessor::Path(path.into());
        self
    }

    /// Compute the value from the whole record
    pub fn computed<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> Option<Value> + Send + Sync + 'static,
    {
        self.accessor = Accessor::Computed(Arc::new(f));
        self
    }

    /// Sort by natural ordering of the projected value
    pub fn sortable(mut self) -> Self {
        self.sorter = Some(Sorter::Natural);
        self
    }

    /// Sort with an explicit comparator
    pub fn sort_by<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &Record) -> Ordering + Send + Sync + 'static,
    {
        self.sorter = Some(Sorter::Custom(Arc::new(f)));
        self
    }

    pub fn filter_options(mut self, options: Vec<FilterOption>) -> Self {
        self.filter = Some(ColumnFilter::Options(options));
        self
    }

    pub fn filter_distinct(mut self) -> Self {
        self.filter = Some(ColumnFilter::Distinct);
        self
    }

    pub fn format(mut self, format: CellFormat) -> Self {
        self.format = format;
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn pin(mut self, pin: Pin) -> Self {
        self.pin = Some(pin);
        self
    }

    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    /// Projected value for a record
    pub fn project<'a>(&self, record: &'a Record) -> Option<Cow<'a, Value>> {
        self.accessor.project(record)
    }

    /// Projected value as plain text (empty when absent)
    pub fn text(&self, record: &Record) -> String {
        self.project(record)
            .map(|v| display_text(&v))
            .unwrap_or_default()
    }

    /// Display text honoring the cell format
    pub fn display(&self, record: &Record) -> String {
        let value = self.project(record);
        self.format.text(value.as_deref())
    }

    /// Compare two records under this column's sorter, if it has one
    pub fn compare(&self, a: &Record, b: &Record) -> Option<Ordering> {
        match self.sorter.as_ref()? {
            Sorter::Natural => {
                let x = self.project(a);
                let y = self.project(b);
                Some(natural_order(x.as_deref(), y.as_deref()))
            }
            Sorter::Custom(cmp) => Some(cmp(a, b)),
        }
    }

    /// Filter options for this column against a data source
    pub fn filter_choices(&self, rows: &[Record]) -> Vec<FilterOption> {
        match &self.filter {
            None => Vec::new(),
            Some(ColumnFilter::Options(options)) => options.clone(),
            Some(ColumnFilter::Distinct) => {
                let mut values: Vec<String> = rows
                    .iter()
                    .map(|r| self.text(r))
                    .filter(|s| !s.is_empty())
                    .collect();
                values.sort();
                values.dedup();
                values
                    .into_iter()
                    .map(|v| FilterOption::new(v.clone(), v))
                    .collect()
            }
        }
    }
}
