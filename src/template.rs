//! The exam template.
//!
//! [`build_exam_template`] lays out the fixed exam sheet: a 2×3 header table
//! of subject, class, duration, instructor and semester fields, the date and
//! student-name lines, a 1×2 grading table, and the `EXERCICES` heading
//! followed by the `{Exercices}` paragraph that receives the exercise content.
//! Tokens in braces are left for an external templating tool to fill in.

use crate::docx::{DocxWriter, TABLE_GRID};
use crate::error::Result;
use crate::model::{
    Document, Length, LineSpacing, Metadata, PageLayout, PageMargins, Paragraph, Section, Table,
    TextAlignment, TextRun, TextStyle,
};
use std::path::{Path, PathBuf};

/// Where the template is written unless told otherwise.
pub const DEFAULT_OUTPUT_PATH: &str = "/home/user/webapp/public/Template_Examen_Ministere_New.docx";

/// Placeholder tokens carried by the template, in document order.
pub const PLACEHOLDERS: [&str; 7] = [
    "{Matiere}",
    "{Classe}",
    "{Duree}",
    "{Enseignant}",
    "{Semestre}",
    "{Date}",
    "{Exercices}",
];

const STUDENT_NAME: &str = "Nom et prénom : ............................................................";
const GRADE: &str = "Note : .......... / 30";
const OBSERVATIONS: &str = "Observations : .......................................................";
const EXERCISES_HEADING: &str = "EXERCICES";

/// Settings for the generated template.
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Output file path
    pub output: PathBuf,

    /// Margin applied to all four sides
    pub margin: Length,

    /// Line-spacing rule forced on every paragraph
    pub line_spacing: LineSpacing,

    /// Page size (margins are taken from `margin`)
    pub page: PageLayout,

    /// Document title written to the core properties
    pub title: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            margin: Length::cm(1.5),
            line_spacing: LineSpacing::OnePointFive,
            page: PageLayout::letter(),
            title: "Template Examen".to_string(),
        }
    }
}

impl TemplateOptions {
    /// Create options with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output path.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Set the margin used on all four sides.
    pub fn with_margin(mut self, margin: Length) -> Self {
        self.margin = margin;
        self
    }

    /// Set the line-spacing rule.
    pub fn with_line_spacing(mut self, spacing: LineSpacing) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page: PageLayout) -> Self {
        self.page = page;
        self
    }

    fn layout(&self) -> PageLayout {
        PageLayout {
            margins: PageMargins::uniform(self.margin),
            ..self.page
        }
    }
}

fn centered(run: TextRun) -> Paragraph {
    Paragraph::with_run(run).aligned(TextAlignment::Center)
}

fn header_table(block_width: u32) -> Table {
    let mut table = Table::grid(2, 3, block_width).with_style(TABLE_GRID);
    let cells = [
        TextRun::styled("Examen", TextStyle::bold()),
        TextRun::styled("{Matiere}", TextStyle::bold().with_size_pt(14.0)),
        TextRun::styled("Classe : {Classe}", TextStyle::new().with_size_pt(11.0)),
        TextRun::plain("Durée: {Duree}"),
        TextRun::plain("Enseignant: {Enseignant}"),
        TextRun::plain("Semestre: {Semestre}"),
    ];
    for (i, run) in cells.into_iter().enumerate() {
        if let Some(cell) = table.cell_mut(i / 3, i % 3) {
            *cell.first_paragraph_mut() = centered(run);
        }
    }
    table
}

fn grading_table(block_width: u32) -> Table {
    let mut table = Table::grid(1, 2, block_width).with_style(TABLE_GRID);
    for (col, text) in [GRADE, OBSERVATIONS].into_iter().enumerate() {
        if let Some(cell) = table.cell_mut(0, col) {
            cell.set_text(text);
        }
    }
    table
}

/// Build the exam template document.
pub fn build_exam_template(options: &TemplateOptions) -> Document {
    let mut section = Section::new(0);
    section.layout = options.layout();
    let block_width = section.layout.block_width();

    section.add_table(header_table(block_width));

    section.add_blank();
    section.add_paragraph(Paragraph::with_text("Date : {Date}").aligned(TextAlignment::Right));

    section.add_blank();
    section.add_paragraph(Paragraph::with_text(STUDENT_NAME).spaced(options.line_spacing));

    section.add_blank();
    section.add_table(grading_table(block_width));

    section.add_blank();
    section.add_blank();
    section.add_paragraph(
        centered(TextRun::styled(
            EXERCISES_HEADING,
            TextStyle::bold().with_size_pt(12.0),
        ))
        .spaced(options.line_spacing),
    );

    section.add_blank();
    section.add_paragraph(Paragraph::with_text("{Exercices}").spaced(options.line_spacing));

    let mut doc = Document::new();
    doc.metadata = Metadata {
        title: Some(options.title.clone()),
        application: Some(format!("examdoc {}", env!("CARGO_PKG_VERSION"))),
        ..Default::default()
    };
    doc.add_section(section);

    apply_line_spacing(&mut doc, options.line_spacing);
    doc
}

/// Force `spacing` on every paragraph of the document, table cells included.
pub fn apply_line_spacing(doc: &mut Document, spacing: LineSpacing) {
    doc.set_line_spacing(spacing);
}

/// Build the template and write it to `options.output`.
///
/// The parent directory must already exist. Returns the path written.
///
/// # Example
///
/// ```no_run
/// use examdoc::{create_exam_template, TemplateOptions};
///
/// let path = create_exam_template(&TemplateOptions::new().with_output("exam.docx"))?;
/// println!("{}", path.display());
/// # Ok::<(), examdoc::Error>(())
/// ```
pub fn create_exam_template(options: &TemplateOptions) -> Result<PathBuf> {
    let doc = build_exam_template(options);
    tracing::debug!(
        blocks = doc.total_blocks(),
        paragraphs = doc.all_paragraphs().len(),
        "built exam template"
    );
    save_template(&doc, &options.output)?;
    Ok(options.output.clone())
}

/// Write a built template to `path`.
pub fn save_template(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    DocxWriter::new(doc).save(path)
}
