//! Document model structures.

use super::{Length, LineSpacing, Paragraph, Table};
use crate::placeholder::find_placeholders;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document metadata written to docProps/core.xml and docProps/app.xml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author/creator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Keywords/tags
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keywords: Vec<String>,

    /// Application that created the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

/// Page margins of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl PageMargins {
    /// The same margin on all four sides.
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }

    /// Check if all four sides round to the same twips value as `margin`.
    pub fn is_uniform(&self, margin: Length) -> bool {
        let twips = margin.twips();
        [self.top, self.bottom, self.left, self.right]
            .iter()
            .all(|m| m.twips() == twips)
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::uniform(Length::inches(1.0))
    }
}

/// Page size and margins of a section (`w:sectPr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page width
    pub width: Length,
    /// Page height
    pub height: Length,
    /// Page margins
    pub margins: PageMargins,
    /// Header distance from the top edge
    pub header: Length,
    /// Footer distance from the bottom edge
    pub footer: Length,
}

impl PageLayout {
    /// US Letter portrait with one-inch margins.
    pub fn letter() -> Self {
        Self {
            width: Length::inches(8.5),
            height: Length::inches(11.0),
            margins: PageMargins::default(),
            header: Length::from_twips(720),
            footer: Length::from_twips(720),
        }
    }

    /// A4 portrait with one-inch margins.
    pub fn a4() -> Self {
        Self {
            width: Length::cm(21.0),
            height: Length::cm(29.7),
            ..Self::letter()
        }
    }

    /// Width available to body content, in twips.
    ///
    /// Computed from the rounded twip values that end up in `w:pgSz` and
    /// `w:pgMar`, so table grids fill the text block exactly.
    pub fn block_width(&self) -> u32 {
        (self.width.twips() - self.margins.left.twips() - self.margins.right.twips()).max(0) as u32
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::letter()
    }
}

/// A content block within a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

/// A document section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section index (0-based)
    pub index: usize,

    /// Page layout
    #[serde(default)]
    pub layout: PageLayout,

    /// Content blocks
    #[serde(default)]
    pub content: Vec<Block>,
}

impl Section {
    /// Create a new section with the given index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Add a content block to this section.
    pub fn add_block(&mut self, block: Block) {
        self.content.push(block);
    }

    /// Add a paragraph to this section.
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.add_block(Block::Paragraph(para));
    }

    /// Add an empty paragraph to this section.
    pub fn add_blank(&mut self) {
        self.add_paragraph(Paragraph::new());
    }

    /// Add a table to this section.
    pub fn add_table(&mut self, table: Table) {
        self.add_block(Block::Table(table));
    }

    /// Top-level paragraphs (outside tables).
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.content.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Check if this section is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get the number of content blocks.
    pub fn len(&self) -> usize {
        self.content.len()
    }
}

/// A word-processing document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Document sections
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section to the document.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Get the total number of content blocks across all sections.
    pub fn total_blocks(&self) -> usize {
        self.sections.iter().map(|s| s.len()).sum()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() || self.sections.iter().all(|s| s.is_empty())
    }

    /// Every paragraph, including those inside table cells, in document order.
    pub fn all_paragraphs(&self) -> Vec<&Paragraph> {
        let mut paragraphs = Vec::new();
        for block in self.sections.iter().flat_map(|s| s.content.iter()) {
            match block {
                Block::Paragraph(p) => paragraphs.push(p),
                Block::Table(t) => paragraphs.extend(t.paragraphs()),
            }
        }
        paragraphs
    }

    /// Tables across all sections, in document order.
    pub fn tables(&self) -> Vec<&Table> {
        self.sections.iter().flat_map(|s| s.tables()).collect()
    }

    /// Force a line-spacing rule on every paragraph, table cells included.
    pub fn set_line_spacing(&mut self, spacing: LineSpacing) {
        for block in self.sections.iter_mut().flat_map(|s| s.content.iter_mut()) {
            match block {
                Block::Paragraph(p) => p.line_spacing = Some(spacing),
                Block::Table(t) => t.set_line_spacing(spacing),
            }
        }
    }

    /// Count the placeholder tokens in the document text, keyed by token.
    pub fn placeholder_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for para in self.all_paragraphs() {
            for placeholder in find_placeholders(&para.plain_text()) {
                *counts.entry(placeholder.token).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Extract all text content as a single string.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for section in &self.sections {
            for block in &section.content {
                match block {
                    Block::Paragraph(para) => {
                        text.push_str(&para.plain_text());
                        text.push('\n');
                    }
                    Block::Table(table) => {
                        text.push_str(&table.plain_text());
                        text.push('\n');
                    }
                }
            }
            text.push('\n');
        }
        text.trim().to_string()
    }

    /// Convert to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to a single-line JSON string.
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, TextRun, TextStyle};

    #[test]
    fn test_document_creation() {
        let mut doc = Document::new();
        assert!(doc.is_empty());

        let mut section = Section::new(0);
        section.add_paragraph(Paragraph::with_text("Hello, World!"));
        doc.add_section(section);

        assert!(!doc.is_empty());
        assert_eq!(doc.total_blocks(), 1);
    }

    #[test]
    fn test_plain_text_extraction() {
        let mut doc = Document::new();
        let mut section = Section::new(0);

        section.add_paragraph(Paragraph {
            runs: vec![
                TextRun::plain("Hello, "),
                TextRun::styled("World", TextStyle::bold()),
                TextRun::plain("!"),
            ],
            ..Default::default()
        });

        doc.add_section(section);
        assert_eq!(doc.plain_text(), "Hello, World!");
    }

    #[test]
    fn test_to_json() {
        let mut doc = Document::new();
        doc.metadata.title = Some("Template Examen".to_string());
        let mut section = Section::new(0);
        section.add_paragraph(Paragraph::with_text("{Exercices}"));
        section.add_table(crate::model::Table::grid(1, 2, 1000));
        doc.add_section(section);

        let json = doc.to_json().unwrap();
        assert!(json.contains("\"title\": \"Template Examen\""));
        assert!(json.contains("\"text\": \"{Exercices}\""));
        assert!(json.contains("\"type\": \"Table\""));

        let compact = doc.to_json_compact().unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"type\":\"Paragraph\""));

        let back: Document = serde_json::from_str(&compact).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_block_width() {
        let mut layout = PageLayout::letter();
        layout.margins = PageMargins::uniform(Length::cm(1.5));
        assert_eq!(layout.block_width(), 12240 - 2 * 850);
    }

    #[test]
    fn test_a4_block_width() {
        let mut layout = PageLayout::a4();
        assert_eq!((layout.width.twips(), layout.height.twips()), (11906, 16838));
        assert_eq!(layout.block_width(), 11906 - 2 * 1440);

        layout.margins = PageMargins::uniform(Length::cm(1.5));
        assert_eq!(layout.block_width(), 11906 - 2 * 850);
    }

    #[test]
    fn test_margins_uniform() {
        let margins = PageMargins::uniform(Length::from_twips(850));
        assert!(margins.is_uniform(Length::cm(1.5)));
        assert!(!PageMargins::default().is_uniform(Length::cm(1.5)));
    }

    #[test]
    fn test_all_paragraphs_include_cells() {
        let mut table = Table::grid(1, 2, 2000);
        table.rows[0].cells[1] = Cell::with_text("{Classe}");

        let mut section = Section::new(0);
        section.add_table(table);
        section.add_paragraph(Paragraph::with_text("{Date}"));

        let mut doc = Document::new();
        doc.add_section(section);

        assert_eq!(doc.all_paragraphs().len(), 3);
        doc.set_line_spacing(LineSpacing::Double);
        assert!(doc
            .all_paragraphs()
            .iter()
            .all(|p| p.line_spacing == Some(LineSpacing::Double)));

        let counts = doc.placeholder_counts();
        assert_eq!(counts.get("{Classe}"), Some(&1));
        assert_eq!(counts.get("{Date}"), Some(&1));
    }

    #[test]
    fn test_metadata_serialization() {
        let meta = Metadata {
            title: Some("Template Examen".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("Template Examen"));
        // Empty fields should not be serialized
        assert!(!json.contains("subject"));
    }
}
