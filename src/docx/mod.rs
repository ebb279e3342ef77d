//! DOCX (Word) package writing and read-back.
//!
//! [`DocxWriter`] serializes the document model into an Office Open XML
//! package. [`DocxParser`] reads the same subset of WordprocessingML back,
//! which is what the generated templates are checked against.

mod parser;
pub mod styles;
mod writer;

pub use parser::DocxParser;
pub use styles::{StyleMap, TABLE_GRID};
pub use writer::DocxWriter;

/// WordprocessingML main namespace.
pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
