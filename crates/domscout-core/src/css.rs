//! CSS selector serialization helpers.

/// Escape `ident` for use after `#` or `.` in a selector.
///
/// Follows the CSSOM `CSS.escape()` serialization, so the output matches what
/// the page itself would produce.
pub fn escape_ident(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len());

    for (i, &c) in chars.iter().enumerate() {
        let code = c as u32;
        if code == 0 {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1f).contains(&code)
            || code == 0x7f
            || (i == 0 && c.is_ascii_digit())
            || (i == 1 && c.is_ascii_digit() && chars[0] == '-')
        {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }

    out
}

/// Escape `value` for use inside a double-quoted attribute selector.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '"' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            '\r' => out.push_str("\\d "),
            '\0' => out.push('\u{FFFD}'),
            _ => out.push(c),
        }
    }
    out
}

/// `[name="value"]`.
pub fn attribute_equals(name: &str, value: &str) -> String {
    format!("[{}=\"{}\"]", name, escape_string(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ident_unchanged() {
        assert_eq!(escape_ident("submit-btn"), "submit-btn");
        assert_eq!(escape_ident("_private"), "_private");
    }

    #[test]
    fn test_leading_digit_escaped() {
        assert_eq!(escape_ident("1abc"), "\\31 abc");
        assert_eq!(escape_ident("-1x"), "-\\31 x");
    }

    #[test]
    fn test_lone_hyphen() {
        assert_eq!(escape_ident("-"), "\\-");
        assert_eq!(escape_ident("--x"), "--x");
    }

    #[test]
    fn test_punctuation_escaped() {
        assert_eq!(escape_ident("user:name"), "user\\:name");
        assert_eq!(escape_ident("a.b"), "a\\.b");
        assert_eq!(escape_ident("with space"), "with\\ space");
    }

    #[test]
    fn test_non_ascii_kept() {
        assert_eq!(escape_ident("café"), "café");
    }

    #[test]
    fn test_control_chars() {
        assert_eq!(escape_ident("a\u{1}b"), "a\\1 b");
        assert_eq!(escape_ident("a\0b"), "a\u{FFFD}b");
    }

    #[test]
    fn test_attribute_equals_escapes_quotes() {
        assert_eq!(attribute_equals("name", "email"), "[name=\"email\"]");
        assert_eq!(
            attribute_equals("data-testid", "say \"hi\""),
            "[data-testid=\"say \\\"hi\\\"\"]"
        );
        assert_eq!(attribute_equals("title", "a\\b"), "[title=\"a\\\\b\"]");
    }
}
