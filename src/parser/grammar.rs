//! Attribute list grammar using chumsky
//!
//! ```text
//! attrs   := attr*
//! attr    := WORD '=' value      named attribute
//!          | OPERATOR value      inline comparison
//!          | value               bare name or value
//! value   := WORD | QUOTED
//! ```

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::Span;
use crate::parser::ast::Attr;
use crate::parser::lexer::Token;

/// Parse whitespace-free attribute tokens into attributes
///
/// `end` is the offset where the tag's closing delimiter starts; it is used
/// as the span of the end of input.
pub fn parse_attributes(tokens: Vec<(Token, Span)>, end: usize) -> Result<Vec<Attr>, String> {
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((end..end).into(), |(t, s): (_, _)| (t, s));

    attribute_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.first()
                .map(describe_error)
                .unwrap_or_else(|| "malformed attributes".to_string())
        })
}

fn describe_error(err: &Rich<'_, Token>) -> String {
    match err.found() {
        Some(tok) => format!("unexpected {}", tok.describe()),
        None => "attribute value missing before end of tag".to_string(),
    }
}

fn attribute_parser<'a, I>() -> impl Parser<'a, I, Vec<Attr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let value = select! {
        Token::Word(s) => s,
        Token::Quoted(s) => s,
    };

    let named = select! { Token::Word(key) => key }
        .then_ignore(just(Token::Assign))
        .then(value.clone())
        .map(|(key, value): (String, String)| Attr::Named {
            key: key.to_ascii_lowercase(),
            value,
        });

    let compare = select! { Token::Operator(op) => op }
        .then(value.clone())
        .map(|(op, value)| Attr::Compare { op, value });

    let bare = value.map(Attr::Bare);

    // named must be tried before bare, both start with a word
    choice((named, compare, bare))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;

    fn parse(input: &str) -> Result<Vec<Attr>, String> {
        let tokens = lex(input)
            .filter(|(t, _)| *t != Token::Whitespace)
            .collect();
        parse_attributes(tokens, input.len())
    }

    fn named(key: &str, value: &str) -> Attr {
        Attr::Named {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_named_in_any_order() {
        let attrs = parse(r#"default="guest" NAME=user fmt='entity'"#).unwrap();
        assert_eq!(
            attrs,
            vec![
                named("default", "guest"),
                named("name", "user"),
                named("fmt", "entity"),
            ]
        );
    }

    #[test]
    fn test_bare_and_compare() {
        let attrs = parse(r#"count >= "10""#).unwrap();
        assert_eq!(
            attrs,
            vec![
                Attr::Bare("count".to_string()),
                Attr::Compare {
                    op: ">=".to_string(),
                    value: "10".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_variable_called_name_with_operator() {
        let attrs = parse("name == x").unwrap();
        assert_eq!(
            attrs,
            vec![
                Attr::Bare("name".to_string()),
                Attr::Compare {
                    op: "==".to_string(),
                    value: "x".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse("").unwrap(), vec![]);
    }

    #[test]
    fn test_operator_without_value() {
        assert!(parse("x ==").is_err());
        assert!(parse("x == /").is_err());
    }

    #[test]
    fn test_dangling_assign() {
        assert!(parse("name=").is_err());
        assert!(parse("= x").is_err());
    }
}
