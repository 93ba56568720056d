//! Lexer for the inside of a tag using logos
//!
//! The scanner finds where a tag starts and which keyword it carries; this
//! lexer takes over right after the keyword and splits the attribute list
//! into tokens. Whitespace is a token of its own because a tag keyword must
//! be separated from its first attribute.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    #[token("=")]
    Assign,

    // Comparison operators; validated by the parser
    #[regex(r"[!<>=][!<>=]+|[!<>]", |lex| lex.slice().to_string())]
    Operator(String),

    #[token("/")]
    Slash,

    // Names and unquoted values; the scanner cuts a word short where a
    // closing marker such as `--}}` starts inside it
    #[regex(r"[A-Za-z0-9_.\-]+", |lex| lex.slice().to_string())]
    Word(String),

    // Quoted values may not span lines
    #[regex(r#""[^"\n]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    #[regex(r"'[^'\n]*'", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    Quoted(String),
}

impl Token {
    /// Human-readable form used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Whitespace => "whitespace".to_string(),
            Token::Assign => "'='".to_string(),
            Token::Operator(op) => format!("operator '{}'", op),
            Token::Slash => "'/'".to_string(),
            Token::Word(w) => format!("'{}'", w),
            Token::Quoted(q) => format!("string \"{}\"", q),
        }
    }
}

/// Lex input string into tokens with spans, dropping unlexable characters
#[cfg(test)]
pub(crate) fn lex(input: &str) -> impl Iterator<Item = (Token, crate::error::Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_named_attributes() {
        assert_eq!(
            tokens(r#" name="user" default='guest'"#),
            vec![
                Token::Whitespace,
                Token::Word("name".to_string()),
                Token::Assign,
                Token::Quoted("user".to_string()),
                Token::Whitespace,
                Token::Word("default".to_string()),
                Token::Assign,
                Token::Quoted("guest".to_string()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        let ops: Vec<_> = tokens("== != < > <= >=")
            .into_iter()
            .filter(|t| *t != Token::Whitespace)
            .collect();
        assert_eq!(
            ops,
            ["==", "!=", "<", ">", "<=", ">="]
                .iter()
                .map(|op| Token::Operator(op.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_single_equals_is_assignment() {
        assert_eq!(
            tokens("level=2"),
            vec![
                Token::Word("level".to_string()),
                Token::Assign,
                Token::Word("2".to_string()),
            ]
        );
    }

    #[test]
    fn test_unquoted_values() {
        assert_eq!(
            tokens("header.tmpl 1.5 a-b ../x"),
            vec![
                Token::Word("header.tmpl".to_string()),
                Token::Whitespace,
                Token::Word("1.5".to_string()),
                Token::Whitespace,
                Token::Word("a-b".to_string()),
                Token::Whitespace,
                Token::Word("..".to_string()),
                Token::Slash,
                Token::Word("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_dashes_in_unquoted_values() {
        assert_eq!(
            tokens("-1 a--b x--"),
            vec![
                Token::Word("-1".to_string()),
                Token::Whitespace,
                Token::Word("a--b".to_string()),
                Token::Whitespace,
                Token::Word("x--".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_value_keeps_delimiters() {
        assert_eq!(
            tokens(r#""a }} b""#),
            vec![Token::Quoted("a }} b".to_string())]
        );
    }

    #[test]
    fn test_slash() {
        assert_eq!(
            tokens("x /"),
            vec![Token::Word("x".to_string()), Token::Whitespace, Token::Slash]
        );
    }
}
