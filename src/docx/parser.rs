//! Read-back of generated DOCX packages.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::model::{
    BorderSpec, Cell, CellBorders, Document, Length, LineSpacing, PageLayout, Paragraph, Row,
    Section, Table, TextAlignment, TextRun,
};
use quick_xml::events::{BytesStart, Event};

use super::styles::StyleMap;

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Parser for the WordprocessingML subset that [`DocxWriter`](super::DocxWriter)
/// emits: section layout, paragraphs with alignment, line spacing and run
/// formatting, and tables with their grid, style and cell borders.
pub struct DocxParser {
    container: OoxmlContainer,
    styles: StyleMap,
}

impl DocxParser {
    /// Open a DOCX file for parsing.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Create a parser from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let styles = match container.read_xml("word/styles.xml") {
            Ok(xml) => StyleMap::parse(&xml)?,
            Err(Error::MissingComponent(_)) => StyleMap::default(),
            Err(e) => return Err(e),
        };
        Ok(Self { container, styles })
    }

    /// Parse the package into a Document model.
    pub fn parse(&mut self) -> Result<Document> {
        let mut doc = Document::new();
        doc.metadata = self.container.parse_core_metadata()?;

        let xml = self.container.read_xml(&self.main_part()?)?;
        for section in parse_document_xml(&xml)? {
            doc.add_section(section);
        }

        Ok(doc)
    }

    /// Styles read from `word/styles.xml`.
    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    /// Path of the main document part, from the package relationships.
    fn main_part(&self) -> Result<String> {
        let rels = self.container.read_relationships("")?;
        Ok(rels
            .get_by_type(REL_OFFICE_DOCUMENT)
            .first()
            .map(|rel| rel.target.trim_start_matches('/').to_string())
            .unwrap_or_else(|| "word/document.xml".to_string()))
    }
}

/// Table being assembled, with the row and cell currently open in it.
#[derive(Default)]
struct OpenTable {
    table: Table,
    row: Option<Row>,
    cell: Option<Cell>,
}

#[derive(Default)]
struct ParseState {
    sections: Vec<Section>,
    section: Section,
    tables: Vec<OpenTable>,
    paragraph: Option<Paragraph>,
    run: Option<TextRun>,
    layout: PageLayout,
    /// Layout of a sectPr found inside the open paragraph's pPr
    section_break: Option<PageLayout>,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
    in_sect_pr: bool,
    in_tbl_pr: bool,
    in_tc_pr: bool,
    in_tc_borders: bool,
}

fn parse_document_xml(xml: &str) -> Result<Vec<Section>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    // Don't trim text - preserve whitespace from xml:space="preserve" elements
    reader.config_mut().trim_text(false);

    let mut state = ParseState::default();
    let mut saw_body = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"w:body" {
                    saw_body = true;
                }
                state.properties(e);
                state.open(e);
            }
            Ok(Event::Empty(ref e)) => {
                state.properties(e);
                match e.name().as_ref() {
                    name @ (b"w:p" | b"w:sectPr") => {
                        state.open(e);
                        state.close(name);
                    }
                    b"w:tab" => state.push_text("\t"),
                    b"w:br" | b"w:cr" => state.push_text("\n"),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if state.in_text {
                    let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    state.push_text(&text);
                }
            }
            Ok(Event::End(ref e)) => state.close(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !saw_body {
        return Err(Error::InvalidData("document part has no w:body".to_string()));
    }

    let ParseState {
        mut sections,
        section,
        ..
    } = state;
    sections.push(section);
    Ok(sections)
}

impl ParseState {
    /// Start of a container element.
    fn open(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"w:sectPr" => {
                self.in_sect_pr = true;
                self.layout = PageLayout::default();
            }
            b"w:tbl" => self.tables.push(OpenTable::default()),
            b"w:tblPr" => self.in_tbl_pr = true,
            b"w:tr" => {
                if let Some(open) = self.tables.last_mut() {
                    open.row = Some(Row::new());
                }
            }
            b"w:tc" => {
                if let Some(open) = self.tables.last_mut() {
                    open.cell = Some(Cell {
                        content: Vec::new(),
                        ..Cell::new()
                    });
                }
            }
            b"w:tcPr" => self.in_tc_pr = true,
            b"w:tcBorders" => self.in_tc_borders = true,
            b"w:p" => {
                self.paragraph = Some(Paragraph::new());
                self.section_break = None;
            }
            b"w:pPr" => self.in_ppr = true,
            b"w:r" => self.run = Some(TextRun::default()),
            b"w:rPr" => self.in_rpr = true,
            b"w:t" => self.in_text = true,
            _ => {}
        }
    }

    /// Attribute-bearing property elements.
    fn properties(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        match name.as_ref() {
            b"w:pgSz" if self.in_sect_pr => {
                if let Some(w) = twips_attr(e, b"w:w") {
                    self.layout.width = w;
                }
                if let Some(h) = twips_attr(e, b"w:h") {
                    self.layout.height = h;
                }
            }
            b"w:pgMar" if self.in_sect_pr => {
                let layout = &mut self.layout;
                for (key, slot) in [
                    (&b"w:top"[..], &mut layout.margins.top),
                    (&b"w:bottom"[..], &mut layout.margins.bottom),
                    (&b"w:left"[..], &mut layout.margins.left),
                    (&b"w:right"[..], &mut layout.margins.right),
                    (&b"w:header"[..], &mut layout.header),
                    (&b"w:footer"[..], &mut layout.footer),
                ] {
                    if let Some(value) = twips_attr(e, key) {
                        *slot = value;
                    }
                }
            }
            b"w:pStyle" if self.in_ppr => {
                if let Some(para) = self.paragraph.as_mut() {
                    para.style_id = attr(e, b"w:val");
                }
            }
            b"w:jc" if self.in_ppr && !self.in_rpr => {
                if let (Some(para), Some(val)) = (self.paragraph.as_mut(), attr(e, b"w:val")) {
                    para.alignment = TextAlignment::from_ooxml(&val);
                }
            }
            b"w:spacing" if self.in_ppr && !self.in_rpr => {
                let line = attr(e, b"w:line").and_then(|v| v.parse::<i64>().ok());
                if let (Some(para), Some(line)) = (self.paragraph.as_mut(), line) {
                    let rule = attr(e, b"w:lineRule");
                    para.line_spacing = Some(LineSpacing::from_ooxml(line, rule.as_deref()));
                }
            }
            b"w:b" if self.in_rpr => {
                if let Some(run) = self.run.as_mut() {
                    run.style.bold = bool_attr(e, b"w:val");
                }
            }
            b"w:i" if self.in_rpr => {
                if let Some(run) = self.run.as_mut() {
                    run.style.italic = bool_attr(e, b"w:val");
                }
            }
            b"w:sz" if self.in_rpr => {
                if let Some(run) = self.run.as_mut() {
                    run.style.size = attr(e, b"w:val").and_then(|v| v.parse().ok());
                }
            }
            b"w:tblStyle" if self.in_tbl_pr => {
                if let Some(open) = self.tables.last_mut() {
                    open.table.style_id = attr(e, b"w:val");
                }
            }
            b"w:gridCol" => {
                let width = attr(e, b"w:w").and_then(|v| v.parse().ok());
                if let (Some(open), Some(width)) = (self.tables.last_mut(), width) {
                    open.table.column_widths.push(width);
                }
            }
            b"w:tcW" if self.in_tc_pr && !self.in_tc_borders => {
                let width = attr(e, b"w:w").and_then(|v| v.parse().ok());
                if let Some(cell) = self.open_cell() {
                    cell.width = width;
                }
            }
            edge if self.in_tc_borders => {
                let spec = border_spec(e);
                if let Some(cell) = self.open_cell() {
                    let borders = cell.borders.get_or_insert_with(CellBorders::default);
                    if let Some(slot) = borders.edge_mut(edge) {
                        *slot = Some(spec);
                    }
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"w:sectPr" => {
                self.in_sect_pr = false;
                if self.paragraph.is_some() {
                    self.section_break = Some(self.layout);
                } else {
                    self.section.layout = self.layout;
                }
            }
            b"w:pPr" => self.in_ppr = false,
            b"w:rPr" => self.in_rpr = false,
            b"w:t" => self.in_text = false,
            b"w:r" => {
                if let (Some(run), Some(para)) = (self.run.take(), self.paragraph.as_mut()) {
                    para.add_run(run);
                }
            }
            b"w:p" => self.finish_paragraph(),
            b"w:tblPr" => self.in_tbl_pr = false,
            b"w:tcPr" => self.in_tc_pr = false,
            b"w:tcBorders" => self.in_tc_borders = false,
            b"w:tc" => {
                if let Some(open) = self.tables.last_mut() {
                    if let (Some(cell), Some(row)) = (open.cell.take(), open.row.as_mut()) {
                        row.add_cell(cell);
                    }
                }
            }
            b"w:tr" => {
                if let Some(open) = self.tables.last_mut() {
                    if let Some(row) = open.row.take() {
                        open.table.add_row(row);
                    }
                }
            }
            b"w:tbl" => {
                if let Some(open) = self.tables.pop() {
                    match self.open_cell() {
                        // The model has no nested tables; keep their text in the outer cell
                        Some(cell) => cell.content.extend(open.table.paragraphs().cloned()),
                        None => self.section.add_table(open.table),
                    }
                }
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(para) = self.paragraph.take() else {
            return;
        };

        if let Some(layout) = self.section_break.take() {
            if !para.is_empty() {
                self.section.add_paragraph(para);
            }
            self.section.layout = layout;
            let index = self.section.index + 1;
            let finished = std::mem::replace(&mut self.section, Section::new(index));
            self.sections.push(finished);
            return;
        }

        match self.open_cell() {
            Some(cell) => cell.content.push(para),
            None => self.section.add_paragraph(para),
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn open_cell(&mut self) -> Option<&mut Cell> {
        self.tables.last_mut().and_then(|open| open.cell.as_mut())
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Toggle properties are on unless `w:val` says otherwise.
fn bool_attr(e: &BytesStart<'_>, key: &[u8]) -> bool {
    attr(e, key)
        .map(|v| v != "0" && v != "false" && v != "off")
        .unwrap_or(true)
}

fn twips_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<Length> {
    attr(e, key)?.parse::<i64>().ok().map(Length::from_twips)
}

fn border_spec(e: &BytesStart<'_>) -> BorderSpec {
    BorderSpec {
        val: attr(e, b"w:val"),
        sz: attr(e, b"w:sz").and_then(|v| v.parse().ok()),
        color: attr(e, b"w:color"),
        space: attr(e, b"w:space").and_then(|v| v.parse().ok()),
        shadow: attr(e, b"w:shadow").map(|v| v == "1" || v == "true" || v == "on"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::DocxWriter;
    use crate::model::{set_cell_border, PageMargins, TextStyle};

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_parse_section_layout() {
        let xml = wrap(
            r#"<w:p/><w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="850" w:right="850" w:bottom="850" w:left="850" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#,
        );
        let sections = parse_document_xml(&xml).unwrap();
        assert_eq!(sections.len(), 1);
        let layout = sections[0].layout;
        assert_eq!(layout.width.twips(), 11906);
        assert!(layout.margins.is_uniform(Length::cm(1.5)));
        assert_eq!(layout.header.twips(), 708);
        assert_eq!(sections[0].len(), 1);
    }

    #[test]
    fn test_parse_paragraph_formatting() {
        let xml = wrap(
            r#"<w:p><w:pPr><w:spacing w:line="360" w:lineRule="auto"/><w:jc w:val="right"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="28"/></w:rPr><w:t xml:space="preserve">Date : </w:t></w:r><w:r><w:t>{Date}</w:t></w:r></w:p>"#,
        );
        let sections = parse_document_xml(&xml).unwrap();
        let para = sections[0].paragraphs().next().unwrap();
        assert_eq!(para.alignment, TextAlignment::Right);
        assert_eq!(para.line_spacing, Some(LineSpacing::OnePointFive));
        assert_eq!(para.plain_text(), "Date : {Date}");
        assert_eq!(para.runs[0].style, TextStyle::bold().with_size_pt(14.0));
        assert_eq!(para.runs[1].style, TextStyle::default());
    }

    #[test]
    fn test_explicit_false_toggle() {
        let xml = wrap(r#"<w:p><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>x</w:t></w:r></w:p>"#);
        let sections = parse_document_xml(&xml).unwrap();
        let para = sections[0].paragraphs().next().unwrap();
        assert!(!para.runs[0].style.bold);
    }

    #[test]
    fn test_section_break_paragraph() {
        let xml = wrap(
            r#"<w:p><w:r><w:t>one</w:t></w:r></w:p><w:p><w:pPr><w:sectPr><w:pgMar w:top="100" w:right="100" w:bottom="100" w:left="100"/></w:sectPr></w:pPr></w:p><w:p><w:r><w:t>two</w:t></w:r></w:p><w:sectPr/>"#,
        );
        let sections = parse_document_xml(&xml).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].len(), 1);
        assert_eq!(sections[0].layout.margins.top.twips(), 100);
        assert_eq!(sections[1].index, 1);
        assert_eq!(sections[1].paragraphs().next().unwrap().plain_text(), "two");
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let xml = wrap(r#"<w:p><w:r><w:t>{Date} &bogus;</w:t></w:r></w:p>"#);
        let err = parse_document_xml(&xml).unwrap_err();
        assert!(matches!(err, Error::XmlParse(_)));
    }

    #[test]
    fn test_invalid_styles_part_is_an_error() {
        let mut package = crate::container::PackageWriter::new();
        package.add_part("word/styles.xml", vec![0xC3, 0x28]);
        let bytes = package.finish().unwrap();
        assert!(matches!(
            DocxParser::from_bytes(bytes),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_missing_body() {
        let err = parse_document_xml("<w:document/>").unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_round_trip_through_writer() {
        let mut table = Table::grid(1, 2, 4000).with_style("TableGrid");
        if let Some(cell) = table.cell_mut(0, 1) {
            cell.set_text("Observations");
            set_cell_border(cell, &CellBorders::all(BorderSpec::single(8, "000000")));
        }

        let mut section = Section::new(0);
        section.layout.margins = PageMargins::uniform(Length::cm(1.5));
        section.add_table(table.clone());
        section.add_paragraph(Paragraph::with_text("{Exercices}").spaced(LineSpacing::OnePointFive));

        let mut doc = Document::new();
        doc.add_section(section);

        let bytes = DocxWriter::new(&doc).to_bytes().unwrap();
        let mut parser = DocxParser::from_bytes(bytes).unwrap();
        let parsed = parser.parse().unwrap();

        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(parsed.sections[0].content, doc.sections[0].content);
        assert!(parsed.sections[0].layout.margins.is_uniform(Length::cm(1.5)));
        assert_eq!(parser.styles().display_name("TableGrid"), "Table Grid");
    }

    #[test]
    fn test_missing_document_part() {
        let mut package = crate::container::PackageWriter::new();
        package.add_part("word/styles.xml", "");
        let bytes = package.finish().unwrap();
        let mut parser = DocxParser::from_bytes(bytes).unwrap();
        assert!(matches!(parser.parse(), Err(Error::MissingComponent(_))));
    }
}
