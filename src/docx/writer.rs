//! DOCX package writer.

use crate::container::PackageWriter;
use crate::error::Result;
use crate::model::{
    Block, Cell, Document, Length, Metadata, Paragraph, Section, Table, TextAlignment, TextRun,
};
use crate::xml::XmlWriter;
use std::path::Path;

use super::styles::StyleMap;
use super::W_NS;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_EXTENDED_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

/// Serializes a [`Document`] into a DOCX package.
///
/// # Example
///
/// ```no_run
/// use examdoc::docx::DocxWriter;
/// use examdoc::{Document, Paragraph, Section};
///
/// let mut section = Section::new(0);
/// section.add_paragraph(Paragraph::with_text("Bonjour"));
/// let mut doc = Document::new();
/// doc.add_section(section);
///
/// DocxWriter::new(&doc).save("bonjour.docx")?;
/// # Ok::<(), examdoc::Error>(())
/// ```
pub struct DocxWriter<'a> {
    document: &'a Document,
    styles: StyleMap,
}

impl<'a> DocxWriter<'a> {
    /// Create a writer using the built-in style sheet.
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            styles: StyleMap::builtin(),
        }
    }

    /// Build the package in memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut package = PackageWriter::new();
        package.add_part("[Content_Types].xml", content_types_xml()?);
        package.add_part("_rels/.rels", package_rels_xml()?);
        package.add_part("docProps/core.xml", core_xml(&self.document.metadata)?);
        package.add_part("docProps/app.xml", app_xml(&self.document.metadata)?);
        package.add_part("word/document.xml", self.document_xml()?);
        package.add_part("word/_rels/document.xml.rels", document_rels_xml()?);
        package.add_part("word/styles.xml", self.styles.to_xml()?);
        package.add_part("word/settings.xml", settings_xml()?);
        package.finish()
    }

    /// Write the package to `path`. The parent directory must exist.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved document");
        Ok(())
    }

    /// Write the package to `path` through Tokio's file system API.
    #[cfg(feature = "async")]
    pub async fn save_async(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        tokio::fs::write(path, &bytes).await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved document");
        Ok(())
    }

    /// Serialize the main `word/document.xml` part.
    pub fn document_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::new()?;
        xml.start("w:document", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)])?;
        xml.start("w:body", &[])?;

        let last = self.document.sections.len().saturating_sub(1);
        for (i, section) in self.document.sections.iter().enumerate() {
            for block in &section.content {
                match block {
                    Block::Paragraph(para) => write_paragraph(&mut xml, para)?,
                    Block::Table(table) => write_table(&mut xml, table)?,
                }
            }
            if i < last {
                // A non-final section ends in a paragraph carrying its sectPr
                xml.start("w:p", &[])?;
                xml.start("w:pPr", &[])?;
                write_section_properties(&mut xml, section)?;
                xml.end("w:pPr")?;
                xml.end("w:p")?;
            } else {
                write_section_properties(&mut xml, section)?;
            }
        }

        xml.end("w:body")?;
        xml.end("w:document")?;
        Ok(xml.into_bytes())
    }
}

fn write_paragraph(xml: &mut XmlWriter, para: &Paragraph) -> Result<()> {
    xml.start("w:p", &[])?;

    let has_props = para.style_id.is_some()
        || para.line_spacing.is_some()
        || para.alignment != TextAlignment::Left;
    if has_props {
        xml.start("w:pPr", &[])?;
        if let Some(ref style_id) = para.style_id {
            xml.empty("w:pStyle", &[("w:val", style_id.as_str())])?;
        }
        if let Some(spacing) = para.line_spacing {
            let (line, rule) = spacing.to_ooxml();
            xml.empty(
                "w:spacing",
                &[("w:line", line.to_string().as_str()), ("w:lineRule", rule)],
            )?;
        }
        if para.alignment != TextAlignment::Left {
            xml.empty("w:jc", &[("w:val", para.alignment.as_ooxml())])?;
        }
        xml.end("w:pPr")?;
    }

    for run in &para.runs {
        write_run(xml, run)?;
    }

    xml.end("w:p")
}

fn write_run(xml: &mut XmlWriter, run: &TextRun) -> Result<()> {
    xml.start("w:r", &[])?;

    if run.style.has_formatting() {
        xml.start("w:rPr", &[])?;
        if run.style.bold {
            xml.empty("w:b", &[])?;
        }
        if run.style.italic {
            xml.empty("w:i", &[])?;
        }
        if let Some(size) = run.style.size {
            let size = size.to_string();
            xml.empty("w:sz", &[("w:val", size.as_str())])?;
            xml.empty("w:szCs", &[("w:val", size.as_str())])?;
        }
        xml.end("w:rPr")?;
    }

    let preserve = run.text.starts_with(char::is_whitespace) || run.text.ends_with(char::is_whitespace);
    let attrs: &[(&str, &str)] = if preserve {
        &[("xml:space", "preserve")]
    } else {
        &[]
    };
    xml.text_element("w:t", attrs, &run.text)?;

    xml.end("w:r")
}

fn write_table(xml: &mut XmlWriter, table: &Table) -> Result<()> {
    xml.start("w:tbl", &[])?;

    xml.start("w:tblPr", &[])?;
    if let Some(ref style_id) = table.style_id {
        xml.empty("w:tblStyle", &[("w:val", style_id.as_str())])?;
    }
    xml.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
    xml.empty(
        "w:tblLook",
        &[
            ("w:val", "04A0"),
            ("w:firstRow", "1"),
            ("w:lastRow", "0"),
            ("w:firstColumn", "1"),
            ("w:lastColumn", "0"),
            ("w:noHBand", "0"),
            ("w:noVBand", "1"),
        ],
    )?;
    xml.end("w:tblPr")?;

    xml.start("w:tblGrid", &[])?;
    for width in &table.column_widths {
        xml.empty("w:gridCol", &[("w:w", width.to_string().as_str())])?;
    }
    xml.end("w:tblGrid")?;

    for row in &table.rows {
        xml.start("w:tr", &[])?;
        for cell in &row.cells {
            write_cell(xml, cell)?;
        }
        xml.end("w:tr")?;
    }

    xml.end("w:tbl")
}

fn write_cell(xml: &mut XmlWriter, cell: &Cell) -> Result<()> {
    xml.start("w:tc", &[])?;

    let borders = cell.borders.as_ref().filter(|b| !b.is_empty());
    if cell.width.is_some() || borders.is_some() {
        xml.start("w:tcPr", &[])?;
        if let Some(width) = cell.width {
            xml.empty("w:tcW", &[("w:w", width.to_string().as_str()), ("w:type", "dxa")])?;
        }
        if let Some(borders) = borders {
            xml.start("w:tcBorders", &[])?;
            for (name, spec) in borders.edges() {
                // CT_Border requires w:val; an attribute-less edge is dropped
                if let Some(spec) = spec.filter(|s| !s.is_empty()) {
                    let attrs = spec.attributes();
                    let attrs: Vec<(&str, &str)> =
                        attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
                    xml.empty(name, &attrs)?;
                }
            }
            xml.end("w:tcBorders")?;
        }
        xml.end("w:tcPr")?;
    }

    // A cell must end with a paragraph
    if cell.content.is_empty() {
        write_paragraph(xml, &Paragraph::new())?;
    }
    for para in &cell.content {
        write_paragraph(xml, para)?;
    }

    xml.end("w:tc")
}

fn write_section_properties(xml: &mut XmlWriter, section: &Section) -> Result<()> {
    let layout = &section.layout;
    let twips = |l: Length| l.twips().to_string();

    xml.start("w:sectPr", &[])?;
    xml.empty(
        "w:pgSz",
        &[
            ("w:w", twips(layout.width).as_str()),
            ("w:h", twips(layout.height).as_str()),
        ],
    )?;
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", twips(layout.margins.top).as_str()),
            ("w:right", twips(layout.margins.right).as_str()),
            ("w:bottom", twips(layout.margins.bottom).as_str()),
            ("w:left", twips(layout.margins.left).as_str()),
            ("w:header", twips(layout.header).as_str()),
            ("w:footer", twips(layout.footer).as_str()),
            ("w:gutter", "0"),
        ],
    )?;
    xml.empty("w:cols", &[("w:space", "720")])?;
    xml.empty("w:docGrid", &[("w:linePitch", "360")])?;
    xml.end("w:sectPr")
}

fn content_types_xml() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start("Types", &[("xmlns", CT_NS)])?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    for (part, content_type) in [
        (
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        ),
        (
            "/word/styles.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
        ),
        (
            "/word/settings.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml",
        ),
        (
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml",
        ),
        (
            "/docProps/app.xml",
            "application/vnd.openxmlformats-officedocument.extended-properties+xml",
        ),
    ] {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    xml.end("Types")?;
    Ok(xml.into_bytes())
}

fn relationships_xml(rels: &[(&str, &str, &str)]) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start("Relationships", &[("xmlns", REL_NS)])?;
    for (id, rel_type, target) in rels {
        xml.empty(
            "Relationship",
            &[("Id", *id), ("Type", *rel_type), ("Target", *target)],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.into_bytes())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    relationships_xml(&[
        ("rId1", REL_OFFICE_DOCUMENT, "word/document.xml"),
        ("rId2", REL_CORE_PROPS, "docProps/core.xml"),
        ("rId3", REL_EXTENDED_PROPS, "docProps/app.xml"),
    ])
}

fn document_rels_xml() -> Result<Vec<u8>> {
    relationships_xml(&[
        ("rId1", REL_STYLES, "styles.xml"),
        ("rId2", REL_SETTINGS, "settings.xml"),
    ])
}

fn settings_xml() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start("w:settings", &[("xmlns:w", W_NS)])?;
    xml.empty("w:defaultTabStop", &[("w:val", "720")])?;
    xml.empty("w:characterSpacingControl", &[("w:val", "doNotCompress")])?;
    xml.empty("w:compat", &[])?;
    xml.end("w:settings")?;
    Ok(xml.into_bytes())
}

// No creation/modification dates: the same document always yields the same bytes.
fn core_xml(meta: &Metadata) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    if let Some(ref title) = meta.title {
        xml.text_element("dc:title", &[], title)?;
    }
    if let Some(ref subject) = meta.subject {
        xml.text_element("dc:subject", &[], subject)?;
    }
    if let Some(ref author) = meta.author {
        xml.text_element("dc:creator", &[], author)?;
    }
    if !meta.keywords.is_empty() {
        xml.text_element("cp:keywords", &[], &meta.keywords.join(", "))?;
    }
    xml.end("cp:coreProperties")?;
    Ok(xml.into_bytes())
}

fn app_xml(meta: &Metadata) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    let application = meta.application.as_deref().unwrap_or("examdoc");
    xml.text_element("Application", &[], application)?;
    xml.end("Properties")?;
    Ok(xml.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BorderSpec, CellBorders, LineSpacing, PageMargins, TextStyle};

    fn document_xml_of(doc: &Document) -> String {
        String::from_utf8(DocxWriter::new(doc).document_xml().unwrap()).unwrap()
    }

    fn single_section(blocks: Vec<Block>) -> Document {
        let mut section = Section::new(0);
        section.content = blocks;
        let mut doc = Document::new();
        doc.add_section(section);
        doc
    }

    #[test]
    fn test_paragraph_properties() {
        let para = Paragraph::with_run(TextRun::styled(
            "EXERCICES",
            TextStyle::bold().with_size_pt(12.0),
        ))
        .aligned(TextAlignment::Center)
        .spaced(LineSpacing::OnePointFive);

        let xml = document_xml_of(&single_section(vec![Block::Paragraph(para)]));
        assert!(xml.contains(
            r#"<w:pPr><w:spacing w:line="360" w:lineRule="auto"/><w:jc w:val="center"/></w:pPr>"#
        ));
        assert!(xml.contains(
            r#"<w:rPr><w:b/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr><w:t>EXERCICES</w:t>"#
        ));
    }

    #[test]
    fn test_plain_paragraph_has_no_properties() {
        let xml = document_xml_of(&single_section(vec![Block::Paragraph(Paragraph::new())]));
        assert!(xml.contains("<w:body><w:p></w:p><w:sectPr>"));
    }

    #[test]
    fn test_whitespace_preserved() {
        let para = Paragraph::with_text("Classe : ");
        let xml = document_xml_of(&single_section(vec![Block::Paragraph(para)]));
        assert!(xml.contains(r#"<w:t xml:space="preserve">Classe : </w:t>"#));
    }

    #[test]
    fn test_section_margins_in_twips() {
        let mut doc = single_section(vec![]);
        doc.sections[0].layout.margins = PageMargins::uniform(Length::cm(1.5));
        let xml = document_xml_of(&doc);
        assert!(xml.contains(
            r#"<w:pgMar w:top="850" w:right="850" w:bottom="850" w:left="850" w:header="720" w:footer="720" w:gutter="0"/>"#
        ));
        assert!(xml.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
    }

    #[test]
    fn test_table_grid_and_borders() {
        let mut table = Table::grid(1, 2, 4000).with_style("TableGrid");
        if let Some(cell) = table.cell_mut(0, 0) {
            crate::model::set_cell_border(
                cell,
                &CellBorders {
                    bottom: Some(BorderSpec::single(12, "FF0000")),
                    ..Default::default()
                },
            );
        }

        let xml = document_xml_of(&single_section(vec![Block::Table(table)]));
        assert!(xml.contains(r#"<w:tblStyle w:val="TableGrid"/>"#));
        assert!(xml.contains(r#"<w:tblGrid><w:gridCol w:w="2000"/><w:gridCol w:w="2000"/></w:tblGrid>"#));
        assert!(xml.contains(
            r#"<w:tcBorders><w:bottom w:val="single" w:sz="12" w:space="0" w:color="FF0000"/></w:tcBorders>"#
        ));
        assert_eq!(xml.matches("<w:tc>").count(), 2);
    }

    #[test]
    fn test_blank_border_edge_not_written() {
        let mut table = Table::grid(1, 1, 1000);
        if let Some(cell) = table.cell_mut(0, 0) {
            crate::model::set_cell_border(
                cell,
                &CellBorders {
                    top: Some(BorderSpec::default()),
                    ..Default::default()
                },
            );
            // Set directly, bypassing set_cell_border
            let borders = cell.borders.get_or_insert_with(CellBorders::default);
            borders.end = Some(BorderSpec::default());
        }

        let xml = document_xml_of(&single_section(vec![Block::Table(table)]));
        assert!(!xml.contains("<w:top/>"));
        assert!(!xml.contains("<w:end/>"));
        assert!(!xml.contains("<w:tcBorders>"));
        assert!(xml.contains(r#"<w:tcPr><w:tcW w:w="1000" w:type="dxa"/></w:tcPr>"#));
    }

    #[test]
    fn test_multiple_sections_carry_break_paragraph() {
        let mut doc = Document::new();
        doc.add_section(Section::new(0));
        doc.add_section(Section::new(1));
        let xml = document_xml_of(&doc);
        assert_eq!(xml.matches("<w:sectPr>").count(), 2);
        assert!(xml.contains("<w:p><w:pPr><w:sectPr>"));
    }

    #[test]
    fn test_package_parts() {
        let doc = single_section(vec![Block::Paragraph(Paragraph::with_text("x"))]);
        let bytes = DocxWriter::new(&doc).to_bytes().unwrap();
        let container = crate::container::OoxmlContainer::from_bytes(bytes).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/settings.xml",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(container.exists(part), "missing {part}");
        }
        let rels = container.read_relationships("word/document.xml").unwrap();
        assert_eq!(rels.get("rId1").unwrap().target, "styles.xml");
    }
}
