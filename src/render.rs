// src/render.rs

use serde_json::Value;
use tracing::debug;

use crate::record::{cell_text, columns_from};

/// Default id of the header-row container.
pub const HEADER_ID: &str = "table-header";
/// Default id of the table-body container.
pub const BODY_ID: &str = "table-body";

/// A single `<th>` or `<td>` with its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A `<tr>` of body cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}

/// The two containers a table is rendered into. Implementations only ever
/// receive appends; existing children are theirs to keep.
pub trait TableTarget {
    fn append_header_cell(&mut self, cell: Cell);
    fn append_row(&mut self, row: Row);
}

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Header and body were appended.
    Rendered { columns: usize, rows: usize },
    /// Nothing to render; the target was not touched.
    Empty,
    /// The fetch failed and was logged; the target was not touched.
    Failed,
}

/// Render a parsed response body into `target`.
///
/// Anything but a non-empty JSON array leaves the target untouched.
pub fn render_body(body: &Value, target: &mut impl TableTarget) -> Outcome {
    match body.as_array() {
        Some(records) => render_records(records, target),
        None => {
            debug!("response is not an array; nothing to render");
            Outcome::Empty
        }
    }
}

/// Append one header cell per column of the first record, then one row per
/// record with one cell per column.
pub fn render_records(records: &[Value], target: &mut impl TableTarget) -> Outcome {
    let Some(first) = records.first() else {
        debug!("no records; nothing to render");
        return Outcome::Empty;
    };

    let columns = columns_from(first);
    for column in &columns {
        target.append_header_cell(Cell::new(column.label.clone()));
    }

    for record in records {
        let mut row = Row::default();
        for column in &columns {
            row.push(Cell::new(cell_text(record, column)));
        }
        target.append_row(row);
    }

    debug!(columns = columns.len(), rows = records.len(), "rendered table");
    Outcome::Rendered {
        columns: columns.len(),
        rows: records.len(),
    }
}

/// In-memory header row and body, rendered as a standalone `<table>`.
#[derive(Debug, Clone)]
pub struct HtmlTable {
    header_id: String,
    body_id: String,
    header: Vec<Cell>,
    rows: Vec<Row>,
}

impl Default for HtmlTable {
    fn default() -> Self {
        Self::new(HEADER_ID, BODY_ID)
    }
}

impl HtmlTable {
    pub fn new(header_id: impl Into<String>, body_id: impl Into<String>) -> Self {
        Self {
            header_id: header_id.into(),
            body_id: body_id.into(),
            header: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Containers that already hold children; appends land after them.
    pub fn with_children(
        header_id: impl Into<String>,
        body_id: impl Into<String>,
        header: Vec<Cell>,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            header,
            rows,
            ..Self::new(header_id, body_id)
        }
    }

    pub fn header(&self) -> &[Cell] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header_texts(&self) -> Vec<&str> {
        self.header.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn to_html(&self) -> String {
        let mut s = String::new();
        s.push_str("<table>\n  <thead>\n");
        s.push_str(&format!("    <tr id=\"{}\">", escape(&self.header_id)));
        s.push_str(&header_cells_html(&self.header));
        s.push_str("</tr>\n  </thead>\n");
        s.push_str(&format!("  <tbody id=\"{}\">", escape(&self.body_id)));
        if !self.rows.is_empty() {
            s.push('\n');
            for row in &self.rows {
                s.push_str("    ");
                s.push_str(&row_html(row));
                s.push('\n');
            }
            s.push_str("  ");
        }
        s.push_str("</tbody>\n</table>\n");
        s
    }
}

impl TableTarget for HtmlTable {
    fn append_header_cell(&mut self, cell: Cell) {
        self.header.push(cell);
    }

    fn append_row(&mut self, row: Row) {
        self.rows.push(row);
    }
}

pub(crate) fn header_cells_html(cells: &[Cell]) -> String {
    cells
        .iter()
        .map(|c| format!("<th>{}</th>", escape(&c.text)))
        .collect()
}

pub(crate) fn row_html(row: &Row) -> String {
    let cells: String = row
        .cells
        .iter()
        .map(|c| format!("<td>{}</td>", escape(&c.text)))
        .collect();
    format!("<tr>{}</tr>", cells)
}

/// Escape text for element content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
