//! CSV export of the derived rows

use super::pipeline::TableView;
use crate::record::Record;

/// Render all matched rows (not just the current page) over the visible columns
pub fn to_csv(view: &TableView<'_>, rows: &[Record]) -> String {
    let mut out = String::new();
    push_line(&mut out, view.columns.iter().map(|c| c.title.clone()));
    for &index in &view.matched {
        let record = &rows[index];
        push_line(&mut out, view.columns.iter().map(|c| c.display(record)));
    }
    out
}

fn push_line<I: Iterator<Item = String>>(out: &mut String, cells: I) {
    let line = cells.map(|c| escape(&c)).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{derive, Column, PaginationConfig, TableOptions, TableState};
    use serde_json::json;

    #[test]
    fn test_csv_covers_all_pages_and_escapes() {
        let rows: Vec<Record> = vec![
            json!({"title": "War, and Peace", "year": 1869}),
            json!({"title": "The \"Idiot\"", "year": 1869}),
            json!({"title": "Dead Souls"}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        let cols = vec![Column::new("title", "Title"), Column::new("year", "Year")];
        let options = TableOptions::new().paginated(PaginationConfig::default().with_page_size(1));
        let state = TableState::new(&cols, &options);
        let view = derive(&cols, &rows, &state, &options);

        let csv = to_csv(&view, &rows);
        assert_eq!(
            csv,
            "Title,Year\r\n\"War, and Peace\",1869\r\n\"The \"\"Idiot\"\"\",1869\r\nDead Souls,\r\n"
        );
    }
}
