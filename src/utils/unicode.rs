//! Unicode-safe helpers for working with UTF-8 strings.

use unicode_width::UnicodeWidthChar;

/// Convert a character index (0-based) to a byte index in the given string.
/// If `n` exceeds the number of characters, returns `s.len()`.
pub fn char_to_byte_index(s: &str, n: usize) -> usize {
    match s.char_indices().nth(n) {
        Some((i, _)) => i,
        None => s.len(),
    }
}

/// Hard-wrap `line` into rows no wider than `width` terminal columns.
///
/// Always yields at least one row, so an empty line still occupies space.
pub fn wrap_columns(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![line.to_string()];
    }
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut used = 0;
    for c in line.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        row.push(c);
        used += w;
    }
    rows.push(row);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("aé b", 2), 3);
        assert_eq!(char_to_byte_index("ab", 9), 2);
    }

    #[test]
    fn test_wrap_columns() {
        assert_eq!(wrap_columns("abcdef", 4), ["abcd", "ef"]);
        assert_eq!(wrap_columns("", 4), [""]);
        assert_eq!(wrap_columns("abcd", 4), ["abcd"]);
        // wide characters take two columns
        assert_eq!(wrap_columns("日本語", 4), ["日本", "語"]);
    }
}
