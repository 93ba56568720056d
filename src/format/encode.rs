//! Reference formatters: markup entities and percent-encoding

use std::io::{self, Write};

/// Write `value` with markup characters replaced by entities
///
/// `&`, `<`, `>`, `"`, `'`, CR and LF are replaced; every other byte is
/// copied unchanged.
pub fn encode_entity(value: &str, out: &mut dyn Write) -> io::Result<()> {
    let bytes = value.as_bytes();
    let mut start = 0;
    for (i, byte) in bytes.iter().enumerate() {
        let entity: &[u8] = match byte {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            b'\'' => b"&#39;",
            b'\n' => b"&#10;",
            b'\r' => b"&#13;",
            _ => continue,
        };
        out.write_all(&bytes[start..i])?;
        out.write_all(entity)?;
        start = i + 1;
    }
    out.write_all(&bytes[start..])
}

/// Write `value` percent-encoded for use in a URL query
///
/// ASCII letters, digits, `.`, `-` and `_` pass through, a space becomes `+`
/// and every other byte becomes `%XX` with uppercase hex digits.
pub fn encode_url(value: &str, out: &mut dyn Write) -> io::Result<()> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let bytes = value.as_bytes();
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_') {
            continue;
        }
        out.write_all(&bytes[start..i])?;
        if byte == b' ' {
            out.write_all(b"+")?;
        } else {
            out.write_all(&[b'%', HEX[(byte >> 4) as usize], HEX[(byte & 0xf) as usize]])?;
        }
        start = i + 1;
    }
    out.write_all(&bytes[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(value: &str) -> String {
        let mut out = Vec::new();
        encode_entity(value, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn url(value: &str) -> String {
        let mut out = Vec::new();
        encode_url(value, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_entity_markup_characters() {
        assert_eq!(entity(r#"&<>"'"#), "&amp;&lt;&gt;&quot;&#39;");
        assert_eq!(entity("a\r\nb"), "a&#13;&#10;b");
    }

    #[test]
    fn test_entity_passthrough() {
        assert_eq!(entity("plain text"), "plain text");
        assert_eq!(entity("caf\u{e9}"), "caf\u{e9}");
        assert_eq!(entity(""), "");
    }

    #[test]
    fn test_url_unreserved_passthrough() {
        assert_eq!(url("abc-XYZ_0.9"), "abc-XYZ_0.9");
    }

    #[test]
    fn test_url_space_and_reserved() {
        assert_eq!(url("a b&c=d/e"), "a+b%26c%3Dd%2Fe");
        assert_eq!(url("100%"), "100%25");
    }

    #[test]
    fn test_url_multibyte_encodes_every_byte() {
        assert_eq!(url("\u{e9}"), "%C3%A9");
    }
}
