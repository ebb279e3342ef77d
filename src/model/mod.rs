//! Document object model for generated word-processing documents.
//!
//! Builders assemble these structures; the DOCX writer serializes them, and
//! the read-back parser reconstructs them from a written package.

mod document;
mod length;
mod paragraph;
mod table;

pub use document::*;
pub use length::*;
pub use paragraph::*;
pub use table::*;
