pub mod markdown;

use ratatui::text::Line;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// One visual row of hard-wrapped text. `start..end` are char indices into
/// the source, `end` excludes the newline that closed the row, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedRow {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Breaks `text` into rows no wider than `max_width` display columns,
/// splitting at explicit newlines and at any character. Always returns at
/// least one row.
pub fn wrap_chars(text: &str, max_width: usize) -> Vec<WrappedRow> {
    let max_width = max_width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut width = 0;
    let mut start = 0;
    let mut idx = 0;

    for ch in text.chars() {
        if ch == '\n' {
            rows.push(WrappedRow {
                text: std::mem::take(&mut current),
                start,
                end: idx,
            });
            width = 0;
            start = idx + 1;
        } else {
            let w = ch.width().unwrap_or(0);
            if width + w > max_width && width > 0 {
                rows.push(WrappedRow {
                    text: std::mem::take(&mut current),
                    start,
                    end: idx,
                });
                width = 0;
                start = idx;
            }
            current.push(ch);
            width += w;
        }
        idx += 1;
    }

    rows.push(WrappedRow {
        text: current,
        start,
        end: idx,
    });
    rows
}

/// Row and display column of a char-indexed cursor inside text wrapped by
/// [`wrap_chars`]. A cursor past the end lands after the last character.
pub fn calculate_wrapped_cursor_position(
    text: &str,
    cursor_index: usize,
    max_width: usize,
) -> (usize, usize) {
    let rows = wrap_chars(text, max_width);
    let last = rows.len() - 1;

    for (row_idx, row) in rows.iter().enumerate() {
        // A cursor sitting exactly on a soft wrap belongs to the next row.
        let soft_wrapped = row_idx < last && rows[row_idx + 1].start == row.end;
        let within = cursor_index >= row.start
            && (cursor_index < row.end || (cursor_index == row.end && !soft_wrapped));
        if within || (row_idx == last && cursor_index >= row.start) {
            let offset = cursor_index.min(row.end) - row.start;
            let col: usize = row
                .text
                .chars()
                .take(offset)
                .map(|c| c.width().unwrap_or(0))
                .sum();
            return (row_idx, col);
        }
    }
    (0, 0)
}

/// Rows `lines` occupy when wrapped into `width` columns.
pub fn estimate_text_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| {
            let w: usize = line.spans.iter().map(|s| s.content.width()).sum();
            w.div_ceil(width).max(1)
        })
        .sum()
}

pub fn calculate_max_scroll(content_height: usize, viewport_height: u16) -> u16 {
    let max = content_height.saturating_sub(usize::from(viewport_height));
    u16::try_from(max).unwrap_or(u16::MAX)
}

/// Byte offset of the `char_index`-th character, or `s.len()` past the end.
pub fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_chars_newlines() {
        let rows = wrap_chars("Line 1\nLine 2\nLine 3", 20);
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Line 1", "Line 2", "Line 3"]);
        assert_eq!(rows[1].start, 7);
    }

    #[test]
    fn test_wrap_chars_trailing_newline_opens_row() {
        let rows = wrap_chars("abc\n", 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].text, "");
        assert_eq!(rows[1].start, 4);
    }

    #[test]
    fn test_wrap_chars_wide_characters() {
        // CJK glyphs take two columns each.
        let rows = wrap_chars("漢字漢字", 5);
        assert_eq!(rows[0].text, "漢字");
        assert_eq!(rows[1].text, "漢字");
    }

    #[test]
    fn test_cursor_empty_text() {
        assert_eq!(calculate_wrapped_cursor_position("", 0, 10), (0, 0));
    }

    #[test]
    fn test_cursor_single_line() {
        assert_eq!(calculate_wrapped_cursor_position("Hello", 3, 10), (0, 3));
        assert_eq!(calculate_wrapped_cursor_position("Hello", 5, 10), (0, 5));
    }

    #[test]
    fn test_cursor_on_soft_wrap_moves_down() {
        let text = "0123456789A";
        assert_eq!(calculate_wrapped_cursor_position(text, 9, 10), (0, 9));
        assert_eq!(calculate_wrapped_cursor_position(text, 10, 10), (1, 0));
        assert_eq!(calculate_wrapped_cursor_position(text, 11, 10), (1, 1));
    }

    #[test]
    fn test_cursor_at_exact_width_end() {
        assert_eq!(calculate_wrapped_cursor_position("0123456789", 10, 10), (0, 10));
    }

    #[test]
    fn test_cursor_after_newline() {
        assert_eq!(calculate_wrapped_cursor_position("Line 1\nLine 2", 8, 20), (1, 1));
        assert_eq!(calculate_wrapped_cursor_position("abc\n", 4, 10), (1, 0));
        assert_eq!(calculate_wrapped_cursor_position("abc\n", 3, 10), (0, 3));
    }

    #[test]
    fn test_cursor_counts_vietnamese_as_single_columns() {
        let text = "Việt Nam";
        assert_eq!(calculate_wrapped_cursor_position(text, 4, 20), (0, 4));
    }

    #[test]
    fn test_cursor_beyond_text() {
        assert_eq!(calculate_wrapped_cursor_position("Hi", 10, 10), (0, 2));
    }

    #[test]
    fn test_estimate_height_and_scroll() {
        let lines = vec![Line::from("a".repeat(25)), Line::from(""), Line::from("short")];
        assert_eq!(estimate_text_height(&lines, 10), 5);
        assert_eq!(calculate_max_scroll(5, 3), 2);
        assert_eq!(calculate_max_scroll(2, 3), 0);
    }

    #[test]
    fn test_byte_index() {
        assert_eq!(byte_index("ấb", 1), "ấ".len());
        assert_eq!(byte_index("ab", 5), 2);
    }
}
