//! Responsive field layout
//!
//! Fields sit on a 12-column grid. Each breakpoint may set a column span
//! (1–12) and a row span (1–6); unset breakpoints inherit from the next smaller
//! one, and a field with no spans at all takes the full width.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const GRID_COLUMNS: u8 = 12;
pub const MAX_ROW_SPAN: u8 = 6;

/// Breakpoints, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    /// Class prefix; `xs` is the unprefixed base
    fn prefix(self) -> &'static str {
        match self {
            Breakpoint::Xs => "",
            Breakpoint::Sm => "sm:",
            Breakpoint::Md => "md:",
            Breakpoint::Lg => "lg:",
            Breakpoint::Xl => "xl:",
        }
    }
}

/// Resolved spans at one breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub cols: u8,
    pub rows: u8,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            cols: GRID_COLUMNS,
            rows: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct PartialSpan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cols: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rows: Option<u8>,
}

/// Per-breakpoint span settings of a field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    spans: BTreeMap<Breakpoint, PartialSpan>,
}

impl Layout {
    pub fn cols(mut self, breakpoint: Breakpoint, span: u8) -> Self {
        self.spans.entry(breakpoint).or_default().cols = Some(span.clamp(1, GRID_COLUMNS));
        self
    }

    pub fn rows(mut self, breakpoint: Breakpoint, span: u8) -> Self {
        self.spans.entry(breakpoint).or_default().rows = Some(span.clamp(1, MAX_ROW_SPAN));
        self
    }

    /// Effective span at a breakpoint after inheritance
    pub fn resolve(&self, breakpoint: Breakpoint) -> Span {
        let mut span = Span::default();
        for (_, partial) in self.spans.range(..=breakpoint) {
            if let Some(cols) = partial.cols {
                span.cols = cols;
            }
            if let Some(rows) = partial.rows {
                span.rows = rows;
            }
        }
        span
    }

    /// Grid utility classes, e.g. `"col-span-12 row-span-1 md:col-span-6"`
    ///
    /// A breakpoint only emits classes when its resolved span differs from the
    /// one it inherits.
    pub fn classes(&self) -> String {
        let mut classes = Vec::new();
        let mut previous: Option<Span> = None;
        for bp in Breakpoint::ALL {
            let span = self.resolve(bp);
            if previous.map_or(true, |p| p.cols != span.cols) {
                classes.push(format!("{}col-span-{}", bp.prefix(), span.cols));
            }
            if previous.map_or(true, |p| p.rows != span.rows) {
                classes.push(format!("{}row-span-{}", bp.prefix(), span.rows));
            }
            previous = Some(span);
        }
        classes.join(" ")
    }

    /// Inline CSS grid placement for one breakpoint
    pub fn style(&self, breakpoint: Breakpoint) -> String {
        let span = self.resolve(breakpoint);
        format!(
            "grid-column: span {c} / span {c}; grid-row: span {r} / span {r};",
            c = span.cols,
            r = span.rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full_width() {
        let layout = Layout::default();
        assert_eq!(layout.resolve(Breakpoint::Xl), Span { cols: 12, rows: 1 });
        assert_eq!(layout.classes(), "col-span-12 row-span-1");
    }

    #[test]
    fn test_inheritance_and_classes() {
        let layout = Layout::default()
            .cols(Breakpoint::Md, 6)
            .cols(Breakpoint::Xl, 4)
            .rows(Breakpoint::Lg, 2);
        assert_eq!(layout.resolve(Breakpoint::Sm).cols, 12);
        assert_eq!(layout.resolve(Breakpoint::Lg), Span { cols: 6, rows: 2 });
        assert_eq!(layout.resolve(Breakpoint::Xl), Span { cols: 4, rows: 2 });
        assert_eq!(
            layout.classes(),
            "col-span-12 row-span-1 md:col-span-6 lg:row-span-2 xl:col-span-4"
        );
    }

    #[test]
    fn test_spans_are_clamped() {
        let layout = Layout::default()
            .cols(Breakpoint::Xs, 20)
            .rows(Breakpoint::Xs, 0);
        assert_eq!(layout.resolve(Breakpoint::Xs), Span { cols: 12, rows: 1 });
        let layout = Layout::default().rows(Breakpoint::Xs, 9);
        assert_eq!(layout.resolve(Breakpoint::Xs).rows, 6);
    }

    #[test]
    fn test_style() {
        let layout = Layout::default().cols(Breakpoint::Xs, 3);
        assert_eq!(
            layout.style(Breakpoint::Md),
            "grid-column: span 3 / span 3; grid-row: span 1 / span 1;"
        );
    }
}
