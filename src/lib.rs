//! # examdoc
//!
//! Exam template generation as Office Open XML (DOCX) documents.
//!
//! The crate builds a fixed exam sheet (1.5 cm margins, 1.5 line spacing, a
//! header table of placeholder fields, a grading table and an exercise
//! placeholder) and writes it as a `.docx` package. Placeholder tokens such as
//! `{Matiere}` or `{Exercices}` are left verbatim for an external templating
//! tool.
//!
//! ## Quick Start
//!
//! ```no_run
//! use examdoc::{create_exam_template, TemplateOptions};
//!
//! // Write the template to its default location
//! let path = create_exam_template(&TemplateOptions::default())?;
//! println!("{}", path.display());
//!
//! // Or somewhere else
//! let options = TemplateOptions::new().with_output("Template_Examen.docx");
//! create_exam_template(&options)?;
//! # Ok::<(), examdoc::Error>(())
//! ```
//!
//! ## Inspecting a template
//!
//! ```no_run
//! use examdoc::read_file;
//!
//! let doc = read_file("Template_Examen.docx")?;
//! for (token, count) in doc.placeholder_counts() {
//!     println!("{token}: {count}");
//! }
//! # Ok::<(), examdoc::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: `DocxWriter::save_async` through Tokio

pub mod container;
pub mod docx;
pub mod error;
pub mod model;
pub mod placeholder;
pub mod template;
mod xml;

// Re-exports
pub use container::{OoxmlContainer, PackageWriter, Relationship, Relationships};
pub use docx::{DocxParser, DocxWriter};
pub use error::{Error, Result};
pub use model::{
    set_cell_border, Block, BorderSpec, Cell, CellBorders, Document, Length, LineSpacing,
    Metadata, PageLayout, PageMargins, Paragraph, Row, Section, Table, TextAlignment, TextRun,
    TextStyle,
};
pub use placeholder::{find_placeholders, Placeholder};
pub use template::{
    apply_line_spacing, build_exam_template, create_exam_template, save_template,
    TemplateOptions, DEFAULT_OUTPUT_PATH, PLACEHOLDERS,
};

use std::path::Path;

/// Read a DOCX file back into a Document model.
///
/// # Example
///
/// ```no_run
/// use examdoc::read_file;
///
/// let doc = read_file("Template_Examen.docx")?;
/// println!("Sections: {}", doc.sections.len());
/// # Ok::<(), examdoc::Error>(())
/// ```
pub fn read_file(path: impl AsRef<Path>) -> Result<Document> {
    let mut parser = DocxParser::open(path)?;
    parser.parse()
}

/// Read DOCX bytes back into a Document model.
pub fn read_bytes(data: &[u8]) -> Result<Document> {
    let mut parser = DocxParser::from_bytes(data.to_vec())?;
    parser.parse()
}

/// Build the exam template in memory as DOCX bytes.
pub fn exam_template_bytes(options: &TemplateOptions) -> Result<Vec<u8>> {
    let doc = build_exam_template(options);
    DocxWriter::new(&doc).to_bytes()
}
