//! Table model structures.

use super::{LineSpacing, Paragraph};
use serde::{Deserialize, Serialize};

/// Attributes of one cell edge (`w:top`, `w:start`, ...).
///
/// Every attribute is optional; only the ones that are set are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderSpec {
    /// Border style (`single`, `double`, `dashed`, `nil`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,

    /// Width in eighths of a point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sz: Option<u32>,

    /// Color (hex, e.g., "000000", or "auto")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Spacing from text in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<u32>,

    /// Shadow flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<bool>,
}

impl BorderSpec {
    /// A single-line border of the given width (eighths of a point) and color.
    pub fn single(sz: u32, color: impl Into<String>) -> Self {
        Self {
            val: Some("single".to_string()),
            sz: Some(sz),
            color: Some(color.into()),
            space: Some(0),
            shadow: None,
        }
    }

    /// Check if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.val.is_none()
            && self.sz.is_none()
            && self.color.is_none()
            && self.space.is_none()
            && self.shadow.is_none()
    }

    /// Overwrite the attributes that `other` sets, keep the rest.
    pub fn merge(&mut self, other: &BorderSpec) {
        if other.val.is_some() {
            self.val = other.val.clone();
        }
        if other.sz.is_some() {
            self.sz = other.sz;
        }
        if other.color.is_some() {
            self.color = other.color.clone();
        }
        if other.space.is_some() {
            self.space = other.space;
        }
        if other.shadow.is_some() {
            self.shadow = other.shadow;
        }
    }

    /// `(name, value)` attribute pairs in `w:` form, in a fixed order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = Vec::new();
        if let Some(ref val) = self.val {
            attrs.push(("w:val", val.clone()));
        }
        if let Some(sz) = self.sz {
            attrs.push(("w:sz", sz.to_string()));
        }
        if let Some(space) = self.space {
            attrs.push(("w:space", space.to_string()));
        }
        if let Some(ref color) = self.color {
            attrs.push(("w:color", color.clone()));
        }
        if let Some(shadow) = self.shadow {
            attrs.push(("w:shadow", if shadow { "1" } else { "0" }.to_string()));
        }
        attrs
    }
}

/// Per-edge borders of a table cell (`w:tcBorders`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBorders {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<BorderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<BorderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_h: Option<BorderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_v: Option<BorderSpec>,
}

impl CellBorders {
    /// The same border on the four outer edges.
    pub fn all(spec: BorderSpec) -> Self {
        Self {
            top: Some(spec.clone()),
            start: Some(spec.clone()),
            bottom: Some(spec.clone()),
            end: Some(spec),
            ..Default::default()
        }
    }

    /// Edges paired with their element names, in schema order.
    pub fn edges(&self) -> [(&'static str, Option<&BorderSpec>); 6] {
        [
            ("w:top", self.top.as_ref()),
            ("w:start", self.start.as_ref()),
            ("w:bottom", self.bottom.as_ref()),
            ("w:end", self.end.as_ref()),
            ("w:insideH", self.inside_h.as_ref()),
            ("w:insideV", self.inside_v.as_ref()),
        ]
    }

    /// Mutable slot for an edge element name (`w:left`/`w:right` alias start/end).
    pub fn edge_mut(&mut self, name: &[u8]) -> Option<&mut Option<BorderSpec>> {
        match name {
            b"w:top" => Some(&mut self.top),
            b"w:start" | b"w:left" => Some(&mut self.start),
            b"w:bottom" => Some(&mut self.bottom),
            b"w:end" | b"w:right" => Some(&mut self.end),
            b"w:insideH" => Some(&mut self.inside_h),
            b"w:insideV" => Some(&mut self.inside_v),
            _ => None,
        }
    }

    /// Check if no edge carries any attribute.
    pub fn is_empty(&self) -> bool {
        self.edges()
            .iter()
            .all(|(_, spec)| spec.map_or(true, BorderSpec::is_empty))
    }
}

/// Apply border edges to a cell.
///
/// Edges missing from `borders` are left untouched, as are edges given
/// without any attribute. For the other edges, only the attributes set
/// replace the cell's current values.
pub fn set_cell_border(cell: &mut Cell, borders: &CellBorders) {
    if borders.is_empty() {
        return;
    }
    let current = cell.borders.get_or_insert_with(CellBorders::default);
    let slots = [
        (&mut current.top, borders.top.as_ref()),
        (&mut current.start, borders.start.as_ref()),
        (&mut current.bottom, borders.bottom.as_ref()),
        (&mut current.end, borders.end.as_ref()),
        (&mut current.inside_h, borders.inside_h.as_ref()),
        (&mut current.inside_v, borders.inside_v.as_ref()),
    ];
    for (slot, edge) in slots {
        if let Some(edge) = edge.filter(|e| !e.is_empty()) {
            slot.get_or_insert_with(BorderSpec::default).merge(edge);
        }
    }
}

/// A cell in a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell content (paragraphs); a cell always holds at least one
    pub content: Vec<Paragraph>,

    /// Cell width in twips (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Explicit edge borders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borders: Option<CellBorders>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    /// Create a new cell holding one empty paragraph.
    pub fn new() -> Self {
        Self {
            content: vec![Paragraph::new()],
            width: None,
            borders: None,
        }
    }

    /// Create a cell with text content.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Paragraph::with_text(text)],
            ..Self::new()
        }
    }

    /// First paragraph of the cell.
    pub fn first_paragraph_mut(&mut self) -> &mut Paragraph {
        if self.content.is_empty() {
            self.content.push(Paragraph::new());
        }
        &mut self.content[0]
    }

    /// Replace the cell content with a single plain-text paragraph.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = vec![Paragraph::with_text(text)];
    }

    /// Get the plain text content.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if this cell is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.content.iter().all(|p| p.is_empty())
    }
}

/// A row in a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Cells in this row
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Row {
    /// Create a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell to this row.
    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Get the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in this table
    #[serde(default)]
    pub rows: Vec<Row>,

    /// Column widths in twips (`w:tblGrid`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_widths: Vec<u32>,

    /// Table style ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
}

impl Table {
    /// Create a `rows` × `cols` grid of empty cells sharing `block_width`
    /// twips evenly.
    pub fn grid(rows: usize, cols: usize, block_width: u32) -> Self {
        let col_width = if cols == 0 { 0 } else { block_width / cols as u32 };
        let rows = (0..rows)
            .map(|_| Row {
                cells: (0..cols)
                    .map(|_| Cell {
                        width: Some(col_width),
                        ..Cell::new()
                    })
                    .collect(),
            })
            .collect();
        Self {
            rows,
            column_widths: vec![col_width; cols],
            style_id: None,
        }
    }

    /// Set the table style ID.
    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }

    /// Add a row to this table.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get a cell by position.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (from the first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if every row has the same number of cells.
    pub fn is_rectangular(&self) -> bool {
        let cols = self.column_count();
        self.rows.iter().all(|r| r.len() == cols)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the paragraphs of every cell.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .flat_map(|c| c.content.iter())
    }

    /// Force a line-spacing rule on every cell paragraph.
    pub fn set_line_spacing(&mut self, spacing: LineSpacing) {
        for para in self
            .rows
            .iter_mut()
            .flat_map(|r| r.cells.iter_mut())
            .flat_map(|c| c.content.iter_mut())
        {
            para.line_spacing = Some(spacing);
        }
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for row in &self.rows {
            let cells: Vec<String> = row.cells.iter().map(|c| c.plain_text()).collect();
            text.push_str(&cells.join("\t"));
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_creation() {
        let cell = Cell::with_text("Hello");
        assert_eq!(cell.plain_text(), "Hello");
        assert!(!cell.is_empty());
        assert!(Cell::new().is_empty());
        assert_eq!(Cell::new().content.len(), 1);
    }

    #[test]
    fn test_grid_shape() {
        let table = Table::grid(2, 3, 10540);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert!(table.is_rectangular());
        assert_eq!(table.column_widths, vec![3513, 3513, 3513]);
    }

    #[test]
    fn test_cell_mut_out_of_range() {
        let mut table = Table::grid(1, 2, 1000);
        assert!(table.cell_mut(0, 1).is_some());
        assert!(table.cell_mut(0, 2).is_none());
        assert!(table.cell_mut(1, 0).is_none());
    }

    #[test]
    fn test_set_line_spacing_reaches_cells() {
        let mut table = Table::grid(1, 2, 1000);
        table.set_line_spacing(LineSpacing::OnePointFive);
        assert!(table
            .paragraphs()
            .all(|p| p.line_spacing == Some(LineSpacing::OnePointFive)));
    }

    #[test]
    fn test_set_cell_border_creates_edges() {
        let mut cell = Cell::new();
        let borders = CellBorders {
            top: Some(BorderSpec::single(12, "FF0000")),
            ..Default::default()
        };
        set_cell_border(&mut cell, &borders);

        let applied = cell.borders.unwrap();
        assert_eq!(applied.top, Some(BorderSpec::single(12, "FF0000")));
        assert!(applied.bottom.is_none());
    }

    #[test]
    fn test_set_cell_border_skips_empty_edges() {
        let mut cell = Cell::new();
        let blank_top = CellBorders {
            top: Some(BorderSpec::default()),
            ..Default::default()
        };
        set_cell_border(&mut cell, &blank_top);
        assert!(cell.borders.is_none());

        let mixed = CellBorders {
            top: Some(BorderSpec::default()),
            bottom: Some(BorderSpec::single(4, "000000")),
            ..Default::default()
        };
        set_cell_border(&mut cell, &mixed);
        let applied = cell.borders.unwrap();
        assert!(applied.top.is_none());
        assert_eq!(applied.bottom, Some(BorderSpec::single(4, "000000")));
    }

    #[test]
    fn test_set_cell_border_merges_attributes() {
        let mut cell = Cell::new();
        set_cell_border(&mut cell, &CellBorders::all(BorderSpec::single(4, "000000")));

        let recolor = CellBorders {
            bottom: Some(BorderSpec {
                color: Some("00FF00".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        set_cell_border(&mut cell, &recolor);

        let applied = cell.borders.unwrap();
        let bottom = applied.bottom.unwrap();
        assert_eq!(bottom.color.as_deref(), Some("00FF00"));
        assert_eq!(bottom.sz, Some(4));
        assert_eq!(bottom.val.as_deref(), Some("single"));
        assert_eq!(applied.top.unwrap().color.as_deref(), Some("000000"));
    }

    #[test]
    fn test_border_attributes_order() {
        let spec = BorderSpec {
            shadow: Some(true),
            ..BorderSpec::single(8, "auto")
        };
        let names: Vec<&str> = spec.attributes().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["w:val", "w:sz", "w:space", "w:color", "w:shadow"]);
    }

    #[test]
    fn test_table_plain_text() {
        let mut table = Table::grid(1, 2, 1000);
        table.cell_mut(0, 0).unwrap().set_text("A1");
        table.cell_mut(0, 1).unwrap().set_text("B1");
        assert_eq!(table.plain_text(), "A1\tB1\n");
    }
}
