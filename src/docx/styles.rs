//! The `word/styles.xml` part: built-in style sheet and read-back.

use crate::error::{Error, Result};
use crate::model::BorderSpec;
use crate::xml::XmlWriter;

use super::W_NS;

/// Style ID of the bordered "Table Grid" table style.
pub const TABLE_GRID: &str = "TableGrid";

/// Style ID of the default paragraph style.
pub const NORMAL: &str = "Normal";

/// Style type (paragraph, character, table, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
}

impl StyleType {
    fn as_ooxml(&self) -> &'static str {
        match self {
            StyleType::Paragraph => "paragraph",
            StyleType::Character => "character",
            StyleType::Table => "table",
        }
    }

    fn from_ooxml(val: &str) -> Option<Self> {
        match val {
            "paragraph" => Some(StyleType::Paragraph),
            "character" => Some(StyleType::Character),
            "table" => Some(StyleType::Table),
            _ => None,
        }
    }
}

/// A style definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    /// Style ID (e.g., "TableGrid")
    pub id: String,
    /// Style name (e.g., "Table Grid")
    pub name: String,
    /// Style type
    pub style_type: Option<StyleType>,
    /// Based on another style
    pub based_on: Option<String>,
    /// Default style for its type
    pub is_default: bool,
    /// Sort priority in the Word UI
    pub ui_priority: Option<u32>,
    /// Border applied to all table edges (table styles only)
    pub table_border: Option<BorderSpec>,
}

/// Collection of styles, in document order.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    pub styles: Vec<Style>,
}

impl StyleMap {
    /// The styles every generated document carries.
    pub fn builtin() -> Self {
        let styles = vec![
            Style {
                id: NORMAL.to_string(),
                name: "Normal".to_string(),
                style_type: Some(StyleType::Paragraph),
                is_default: true,
                ..Default::default()
            },
            Style {
                id: "DefaultParagraphFont".to_string(),
                name: "Default Paragraph Font".to_string(),
                style_type: Some(StyleType::Character),
                is_default: true,
                ui_priority: Some(1),
                ..Default::default()
            },
            Style {
                id: "TableNormal".to_string(),
                name: "Normal Table".to_string(),
                style_type: Some(StyleType::Table),
                is_default: true,
                ui_priority: Some(99),
                ..Default::default()
            },
            Style {
                id: TABLE_GRID.to_string(),
                name: "Table Grid".to_string(),
                style_type: Some(StyleType::Table),
                based_on: Some("TableNormal".to_string()),
                ui_priority: Some(59),
                table_border: Some(BorderSpec::single(4, "auto")),
                ..Default::default()
            },
        ];
        Self { styles }
    }

    /// Get a style by ID.
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Check if a style ID is defined.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Display name of a style, falling back to its ID.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        match self.get(id) {
            Some(style) if !style.name.is_empty() => &style.name,
            _ => id,
        }
    }

    /// Serialize to a `word/styles.xml` part.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::new()?;
        xml.start("w:styles", &[("xmlns:w", W_NS)])?;

        xml.start("w:docDefaults", &[])?;
        xml.start("w:rPrDefault", &[])?;
        xml.start("w:rPr", &[])?;
        xml.empty(
            "w:rFonts",
            &[
                ("w:ascii", "Calibri"),
                ("w:eastAsia", "Calibri"),
                ("w:hAnsi", "Calibri"),
                ("w:cs", "Times New Roman"),
            ],
        )?;
        xml.empty("w:sz", &[("w:val", "22")])?;
        xml.empty("w:szCs", &[("w:val", "22")])?;
        xml.empty("w:lang", &[("w:val", "fr-FR"), ("w:eastAsia", "en-US"), ("w:bidi", "ar-SA")])?;
        xml.end("w:rPr")?;
        xml.end("w:rPrDefault")?;
        xml.start("w:pPrDefault", &[])?;
        xml.start("w:pPr", &[])?;
        xml.empty("w:spacing", &[("w:after", "0"), ("w:line", "240"), ("w:lineRule", "auto")])?;
        xml.end("w:pPr")?;
        xml.end("w:pPrDefault")?;
        xml.end("w:docDefaults")?;

        for style in &self.styles {
            write_style(&mut xml, style)?;
        }

        xml.end("w:styles")?;
        Ok(xml.into_bytes())
    }

    /// Parse styles from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        if xml.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut map = StyleMap::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current_style: Option<Style> = None;
        let mut in_borders = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                    b"w:style" => {
                        let mut style = Style::default();
                        for attr in e.attributes().flatten() {
                            let val = String::from_utf8_lossy(&attr.value);
                            match attr.key.as_ref() {
                                b"w:styleId" => style.id = val.to_string(),
                                b"w:type" => style.style_type = StyleType::from_ooxml(&val),
                                b"w:default" => style.is_default = val == "1",
                                _ => {}
                            }
                        }
                        current_style = Some(style);
                    }
                    b"w:tblBorders" => in_borders = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(e)) => {
                    if let Some(ref mut style) = current_style {
                        let val = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"w:val")
                            .map(|a| String::from_utf8_lossy(&a.value).to_string());
                        match e.name().as_ref() {
                            b"w:name" => style.name = val.unwrap_or_default(),
                            b"w:basedOn" => style.based_on = val,
                            b"w:uiPriority" => {
                                style.ui_priority = val.and_then(|v| v.parse().ok())
                            }
                            b"w:top" if in_borders && style.table_border.is_none() => {
                                let mut spec = BorderSpec::default();
                                for attr in e.attributes().flatten() {
                                    let v = String::from_utf8_lossy(&attr.value);
                                    match attr.key.as_ref() {
                                        b"w:val" => spec.val = Some(v.to_string()),
                                        b"w:sz" => spec.sz = v.parse().ok(),
                                        b"w:space" => spec.space = v.parse().ok(),
                                        b"w:color" => spec.color = Some(v.to_string()),
                                        _ => {}
                                    }
                                }
                                style.table_border = Some(spec);
                            }
                            _ => {}
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                    b"w:style" => {
                        if let Some(style) = current_style.take() {
                            map.styles.push(style);
                        }
                    }
                    b"w:tblBorders" => in_borders = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(map)
    }
}

fn write_style(xml: &mut XmlWriter, style: &Style) -> Result<()> {
    let style_type = style.style_type.map(|t| t.as_ooxml()).unwrap_or("paragraph");
    let mut attrs = vec![("w:type", style_type)];
    if style.is_default {
        attrs.push(("w:default", "1"));
    }
    attrs.push(("w:styleId", style.id.as_str()));
    xml.start("w:style", &attrs)?;

    xml.empty("w:name", &[("w:val", style.name.as_str())])?;
    if let Some(ref based_on) = style.based_on {
        xml.empty("w:basedOn", &[("w:val", based_on.as_str())])?;
    }
    if let Some(priority) = style.ui_priority {
        xml.empty("w:uiPriority", &[("w:val", priority.to_string().as_str())])?;
    }
    if style.style_type == Some(StyleType::Paragraph) && style.is_default {
        xml.empty("w:qFormat", &[])?;
    } else if style.is_default {
        xml.empty("w:semiHidden", &[])?;
        xml.empty("w:unhideWhenUsed", &[])?;
    }

    if style.style_type == Some(StyleType::Table) {
        xml.start("w:tblPr", &[])?;
        xml.empty("w:tblInd", &[("w:w", "0"), ("w:type", "dxa")])?;
        if let Some(ref border) = style.table_border {
            let attrs = border.attributes();
            let attrs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
            xml.start("w:tblBorders", &[])?;
            for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
                xml.empty(edge, &attrs)?;
            }
            xml.end("w:tblBorders")?;
        }
        xml.start("w:tblCellMar", &[])?;
        xml.empty("w:top", &[("w:w", "0"), ("w:type", "dxa")])?;
        xml.empty("w:left", &[("w:w", "108"), ("w:type", "dxa")])?;
        xml.empty("w:bottom", &[("w:w", "0"), ("w:type", "dxa")])?;
        xml.empty("w:right", &[("w:w", "108"), ("w:type", "dxa")])?;
        xml.end("w:tblCellMar")?;
        xml.end("w:tblPr")?;
    }

    xml.end("w:style")
}
