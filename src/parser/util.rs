/// Resolves backslash escapes in the raw text between a string literal's quotes.
///
/// Unknown escapes keep the escaped character, so `'\q'` reads as `q`.
pub fn unescape_string(raw: &str) -> Result<String, String> {
    let mut s = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            s.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => s.push('\n'),
            Some('t') => s.push('\t'),
            Some('r') => s.push('\r'),
            Some('0') => s.push('\0'),
            Some('b') => s.push('\u{0008}'),
            Some('f') => s.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| format!("invalid unicode escape \\u{}", hex))?;
                let decoded = char::from_u32(code)
                    .ok_or_else(|| format!("invalid unicode escape \\u{}", hex))?;
                s.push(decoded);
            }
            Some(other) => s.push(other),
            None => return Err("dangling escape at end of string".to_string()),
        }
    }
    Ok(s)
}

/// Byte offset of the first bracket that opens deeper than `limit` levels.
///
/// Brackets inside string literals and comments are skipped.
pub fn excess_nesting(script: &str, limit: usize) -> Option<usize> {
    let bytes = script.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return Some(i);
                }
            }
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{excess_nesting, unescape_string};

    #[test]
    fn test_unescape_common_sequences() {
        assert_eq!(unescape_string(r"a\nb\tc").unwrap(), "a\nb\tc");
        assert_eq!(unescape_string(r"it\'s").unwrap(), "it's");
        assert_eq!(unescape_string(r"été").unwrap(), "été");
    }

    #[test]
    fn test_unescape_rejects_bad_unicode() {
        assert!(unescape_string(r"\uZZZZ").is_err());
    }

    #[test]
    fn test_excess_nesting_offset() {
        assert_eq!(excess_nesting("f([{}])", 3), None);
        assert_eq!(excess_nesting("f([{}])", 2), Some(3));
        assert_eq!(excess_nesting("[[1], [[2]]]", 2), Some(7));
    }

    #[test]
    fn test_excess_nesting_skips_strings_and_comments() {
        assert_eq!(excess_nesting("'(((' + \"[[\\\"[\"", 1), None);
        assert_eq!(excess_nesting("// (((\n/* [[[ */ (1)", 1), None);
        assert_eq!(excess_nesting("'\\'' + ((1))", 1), Some(8));
    }
}
