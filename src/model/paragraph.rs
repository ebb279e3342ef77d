//! Paragraph and text run models.

use super::Length;
use serde::{Deserialize, Serialize};

/// Text alignment within a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlignment {
    /// The `w:jc` value for this alignment.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            TextAlignment::Left => "left",
            TextAlignment::Center => "center",
            TextAlignment::Right => "right",
            TextAlignment::Justify => "both",
        }
    }

    /// Map a `w:jc` value back to an alignment.
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "center" => TextAlignment::Center,
            "right" | "end" => TextAlignment::Right,
            "both" | "distribute" => TextAlignment::Justify,
            _ => TextAlignment::Left,
        }
    }
}

/// Line-spacing rule of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSpacing {
    Single,
    OnePointFive,
    Double,
    /// Multiple of single spacing (e.g. 1.15)
    Multiple(f32),
    /// Exact line height
    Exactly(Length),
    /// Minimum line height
    AtLeast(Length),
}

/// `w:line` value of single spacing when `w:lineRule="auto"`.
const SINGLE_LINE: i64 = 240;

impl LineSpacing {
    /// The `(w:line, w:lineRule)` pair for this rule.
    pub fn to_ooxml(&self) -> (i64, &'static str) {
        match self {
            LineSpacing::Single => (SINGLE_LINE, "auto"),
            LineSpacing::OnePointFive => (SINGLE_LINE * 3 / 2, "auto"),
            LineSpacing::Double => (SINGLE_LINE * 2, "auto"),
            LineSpacing::Multiple(factor) => {
                ((f64::from(*factor) * SINGLE_LINE as f64).round() as i64, "auto")
            }
            LineSpacing::Exactly(height) => (height.twips(), "exact"),
            LineSpacing::AtLeast(height) => (height.twips(), "atLeast"),
        }
    }

    /// Recover a rule from `w:line` and an optional `w:lineRule`.
    pub fn from_ooxml(line: i64, rule: Option<&str>) -> Self {
        match rule.unwrap_or("auto") {
            "exact" => LineSpacing::Exactly(Length::from_twips(line)),
            "atLeast" => LineSpacing::AtLeast(Length::from_twips(line)),
            _ => match line {
                240 => LineSpacing::Single,
                360 => LineSpacing::OnePointFive,
                480 => LineSpacing::Double,
                other => LineSpacing::Multiple(other as f32 / SINGLE_LINE as f32),
            },
        }
    }
}

/// Text style properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    /// Italic text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,

    /// Font size in half-points (e.g., 24 = 12pt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl TextStyle {
    /// Create a new default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bold style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Set the font size in points.
    pub fn with_size_pt(mut self, pt: f64) -> Self {
        self.size = Some(Length::pt(pt).half_points() as u32);
        self
    }

    /// Check if style has any formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.size.is_some()
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    #[serde(default, skip_serializing_if = "is_default_style")]
    pub style: TextStyle,
}

fn is_default_style(style: &TextStyle) -> bool {
    *style == TextStyle::default()
}

impl TextRun {
    /// Create a plain text run with no styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a styled text run.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A paragraph of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in this paragraph
    #[serde(default)]
    pub runs: Vec<TextRun>,

    /// Text alignment
    #[serde(default, skip_serializing_if = "is_default_alignment")]
    pub alignment: TextAlignment,

    /// Line-spacing rule (None = inherited from style)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<LineSpacing>,

    /// Style ID reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
}

fn is_default_alignment(a: &TextAlignment) -> bool {
    *a == TextAlignment::Left
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
            ..Default::default()
        }
    }

    /// Create a paragraph holding a single styled run.
    pub fn with_run(run: TextRun) -> Self {
        Self {
            runs: vec![run],
            ..Default::default()
        }
    }

    /// Set the alignment.
    pub fn aligned(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the line-spacing rule.
    pub fn spaced(mut self, spacing: LineSpacing) -> Self {
        self.line_spacing = Some(spacing);
        self
    }

    /// Add a text run to this paragraph.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Get the plain text content.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if this paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() || self.runs.iter().all(|r| r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_ooxml() {
        assert_eq!(TextAlignment::Justify.as_ooxml(), "both");
        assert_eq!(TextAlignment::from_ooxml("both"), TextAlignment::Justify);
        assert_eq!(TextAlignment::from_ooxml("center"), TextAlignment::Center);
        assert_eq!(TextAlignment::from_ooxml("bogus"), TextAlignment::Left);
    }

    #[test]
    fn test_line_spacing_ooxml() {
        assert_eq!(LineSpacing::OnePointFive.to_ooxml(), (360, "auto"));
        assert_eq!(LineSpacing::Single.to_ooxml(), (240, "auto"));
        assert_eq!(LineSpacing::Multiple(1.15).to_ooxml(), (276, "auto"));
        assert_eq!(
            LineSpacing::Exactly(Length::pt(18.0)).to_ooxml(),
            (360, "exact")
        );

        assert_eq!(
            LineSpacing::from_ooxml(360, Some("auto")),
            LineSpacing::OnePointFive
        );
        assert_eq!(LineSpacing::from_ooxml(360, None), LineSpacing::OnePointFive);
        assert_eq!(
            LineSpacing::from_ooxml(360, Some("exact")),
            LineSpacing::Exactly(Length::from_twips(360))
        );
    }

    #[test]
    fn test_text_style() {
        let style = TextStyle::bold().with_size_pt(14.0);
        assert!(style.bold);
        assert_eq!(style.size, Some(28));
        assert!(style.has_formatting());
        assert!(!TextStyle::default().has_formatting());
    }

    #[test]
    fn test_paragraph() {
        let para = Paragraph::with_text("Date : {Date}").aligned(TextAlignment::Right);
        assert_eq!(para.plain_text(), "Date : {Date}");
        assert_eq!(para.alignment, TextAlignment::Right);
        assert!(!para.is_empty());
        assert!(Paragraph::new().is_empty());
    }

    #[test]
    fn test_paragraph_serialization() {
        let para = Paragraph::with_text("Test");
        let json = serde_json::to_string(&para).unwrap();
        // Default values should not be serialized
        assert!(!json.contains("alignment"));
        assert!(!json.contains("line_spacing"));
    }
}
