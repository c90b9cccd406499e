//! Fixed-width hex + ASCII dump for the diagnostic panel.
//!
//! ```text
//!        |  0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F  | ASCII TEXT
//! -------+--------------------------------------------------+-----------------
//! 0x00__ | 52 49 46 46 24 00 00 00 57 41 56 45 66 6D 74 20  | RIFF$...WAVEfmt
//! ```
//!
//! The row label is the row index in hex followed by `__` standing in for the
//! low nibble of the byte offset. Rows past the end of the buffer are padded
//! with blanks, so the dump is total: any buffer and any row count format.

use std::fmt::Write;

pub const BYTES_PER_ROW: usize = 16;

/// Rows needed to show the whole 128-byte header window.
pub const DEFAULT_ROWS: usize = 8;

const HEADER: &str = "       |  0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F  | ASCII TEXT";
const SEPARATOR: &str =
    "-------+--------------------------------------------------+-----------------";

fn is_printable(b: u8) -> bool {
    (0x20..=0x7e).contains(&b)
}

/// Format one 16-byte row. `bytes` may be shorter than a full row (or empty).
fn format_row(out: &mut String, row: usize, bytes: &[u8]) {
    let _ = write!(out, "0x{:02X}__ | ", row);
    for i in 0..BYTES_PER_ROW {
        match bytes.get(i) {
            Some(b) => {
                let _ = write!(out, "{:02X} ", b);
            }
            None => out.push_str("   "),
        }
    }
    out.push_str(" | ");
    for i in 0..BYTES_PER_ROW {
        out.push(match bytes.get(i) {
            Some(&b) if is_printable(b) => b as char,
            Some(_) => '.',
            None => ' ',
        });
    }
}

/// Dump `rows` rows of `buf` as lines: header, separator, then one line per row.
pub fn dump_lines(buf: &[u8], rows: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(rows + 2);
    lines.push(HEADER.to_string());
    lines.push(SEPARATOR.to_string());
    for row in 0..rows {
        let start = row.saturating_mul(BYTES_PER_ROW).min(buf.len());
        let end = start.saturating_add(BYTES_PER_ROW).min(buf.len());
        let mut line = String::with_capacity(HEADER.len() + 8);
        format_row(&mut line, row, &buf[start..end]);
        lines.push(line);
    }
    lines
}

/// Dump `rows` rows of `buf` as newline-terminated text.
pub fn dump(buf: &[u8], rows: usize) -> String {
    let mut text = String::new();
    for line in dump_lines(buf, rows) {
        text.push_str(&line);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_row_non_printable() {
        let buf: Vec<u8> = (0x00..=0x0F).collect();
        let lines = dump_lines(&buf, 1);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[2],
            "0x00__ | 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F  | ................"
        );
    }

    #[test]
    fn test_columns_line_up_with_header() {
        let lines = dump_lines(b"RIFF$\x00\x00\x00WAVEfmt ", 1);
        assert_eq!(lines[2].len(), 76);
        assert_eq!(lines[0].find('|'), lines[2].find('|'));
        assert_eq!(lines[0].rfind('|'), lines[2].rfind('|'));
        assert_eq!(lines[1].find('+'), lines[2].find('|'));
        assert!(lines[2].ends_with("RIFF$...WAVEfmt "));
    }

    #[test]
    fn test_ascii_bounds() {
        let lines = dump_lines(&[0x1f, 0x20, 0x7e, 0x7f, b'A'], 1);
        assert!(lines[2].ends_with("| . ~.A           "));
    }

    #[test]
    fn test_rows_past_end_are_blank() {
        let lines = dump_lines(&[0xAB; 20], 3);
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("0x01__ | AB AB AB AB    "));
        assert_eq!(lines[4].trim_end(), "0x02__ |                                                  |");
    }

    #[test]
    fn test_dump_text_is_newline_terminated() {
        let text = dump(&[], 2);
        assert_eq!(text.lines().count(), 4);
        assert!(text.ends_with('\n'));
    }

    proptest! {
        #[test]
        fn prop_dump_is_total(buf in prop::collection::vec(any::<u8>(), 0..300), rows in 0usize..24) {
            let lines = dump_lines(&buf, rows);
            prop_assert_eq!(lines.len(), rows + 2);
            for line in &lines[2..] {
                prop_assert_eq!(line.chars().count(), 76);
            }
        }
    }
}
