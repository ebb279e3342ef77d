//! Placeholder token scanning.
//!
//! Templates carry brace-delimited tokens such as `{Matiere}` that an
//! external templating tool substitutes later. Nothing here substitutes them;
//! this module only locates them so a generated document can be checked.

/// A placeholder token found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The token including braces, e.g. `{Date}`
    pub token: String,
    /// Byte offset of the opening brace
    pub offset: usize,
}

impl Placeholder {
    /// The token name without braces.
    pub fn name(&self) -> &str {
        &self.token[1..self.token.len() - 1]
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Find every `{Name}` token in `text`, in order of appearance.
///
/// A name is a non-empty run of ASCII letters, digits or underscores.
/// Anything else between the braces (spaces, nested braces, an empty pair)
/// is not a placeholder.
pub fn find_placeholders(text: &str) -> Vec<Placeholder> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i + 1;
        while end < bytes.len() && is_name_byte(bytes[end]) {
            end += 1;
        }

        if end < bytes.len() && bytes[end] == b'}' && end > start + 1 {
            found.push(Placeholder {
                token: text[start..=end].to_string(),
                offset: start,
            });
            i = end + 1;
        } else {
            i = start + 1;
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token() {
        let found = find_placeholders("Date : {Date}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token, "{Date}");
        assert_eq!(found[0].name(), "Date");
        assert_eq!(found[0].offset, 7);
    }

    #[test]
    fn test_multiple_tokens() {
        let tokens: Vec<String> = find_placeholders("{A}-{B_2} and {C}")
            .into_iter()
            .map(|p| p.token)
            .collect();
        assert_eq!(tokens, vec!["{A}", "{B_2}", "{C}"]);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(find_placeholders("{}").is_empty());
        assert!(find_placeholders("{two words}").is_empty());
        assert!(find_placeholders("{unterminated").is_empty());
        assert!(find_placeholders("EXERCICES").is_empty());
    }

    #[test]
    fn test_nested_brace_restarts_scan() {
        let found = find_placeholders("{{Inner}}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token, "{Inner}");
        assert_eq!(found[0].offset, 1);
    }

    #[test]
    fn test_non_ascii_text_around_tokens() {
        let found = find_placeholders("Durée: {Duree}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token, "{Duree}");
    }
}
