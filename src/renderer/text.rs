//! Output of literal template text

use std::io::{self, Write};

/// Write a text run, applying line continuations
///
/// A backslash right before a line terminator (`\n` or `\r\n`) removes
/// itself and the terminator. A doubled backslash there is written as a
/// single backslash followed by the terminator. Every other backslash is
/// copied unchanged.
pub fn write_text(text: &str, out: &mut dyn Write) -> io::Result<()> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut start = 0;
    let mut i = 0;

    while i < len {
        if bytes[i] == b'\\' {
            let doubled = i + 1 < len && bytes[i + 1] == b'\\';
            let mut k = if doubled { i + 2 } else { i + 1 };
            if k < len && bytes[k] == b'\r' {
                k += 1;
            }
            if k < len && bytes[k] == b'\n' {
                out.write_all(&bytes[start..i])?;
                if doubled {
                    // keep the second backslash and the terminator
                    start = i + 1;
                    i += 2;
                } else {
                    start = k + 1;
                    i = k + 1;
                }
                continue;
            }
        }
        i += 1;
    }
    out.write_all(&bytes[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(input: &str) -> String {
        let mut out = Vec::new();
        write_text(input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_plain_text_is_copied() {
        assert_eq!(text("a\nb\r\nc"), "a\nb\r\nc");
        assert_eq!(text(""), "");
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(text("one \\\ntwo"), "one two");
        assert_eq!(text("one \\\r\ntwo"), "one two");
    }

    #[test]
    fn test_escaped_backslash_before_newline() {
        assert_eq!(text("a\\\\\nb"), "a\\\nb");
        assert_eq!(text("a\\\\\r\nb"), "a\\\r\nb");
    }

    #[test]
    fn test_other_backslashes_unchanged() {
        assert_eq!(text("C:\\dir\\file"), "C:\\dir\\file");
        assert_eq!(text("end\\"), "end\\");
        assert_eq!(text("a\\\\b"), "a\\\\b");
        assert_eq!(text("a\\\rb"), "a\\\rb");
    }

    #[test]
    fn test_each_terminator_is_independent() {
        assert_eq!(text("a\\\nb\\\\\nc\\\nd"), "ab\\\ncd");
    }
}
