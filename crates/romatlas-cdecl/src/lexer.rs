//! Lexer for preprocessed C declarations.
//!
//! Tokens keep their source text: numbers and literals are never
//! interpreted here, only carried through for expression rendering.

use thiserror::Error;

/// Errors from declaration reading.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unexpected token at line {line}: expected {expected}, got {got}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        got: String,
    },

    #[error("unexpected end of input")]
    UnexpectedEof,
}

impl ParseError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Result type for declaration reading.
pub type ParseResult<T> = Result<T, ParseError>;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    /// Integer or floating literal, raw text including any suffix.
    Number(String),
    /// Character or string literal, raw text including quotes.
    Literal(String),
    /// Punctuation or operator.
    Punct(&'static str),
}

impl Token {
    /// Source text of the token, for rendering and diagnostics.
    pub fn text(&self) -> &str {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Literal(s) => s,
            Token::Punct(p) => p,
        }
    }
}

/// A token with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

const PUNCT2: &[&str] = &[
    "<<", ">>", "->", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=", "|=", "&=",
    "^=", "++", "--",
];
const PUNCT1: &str = ";,*{}[]()=:+-/<>|&~%^!?.";

/// Tokenize a whole translation unit.
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;
    let mut line = 1;
    while pos < bytes.len() {
        let ch = bytes[pos] as char;
        if ch == '\n' {
            line += 1;
            pos += 1;
            continue;
        }
        if ch.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if ch == '#' {
            // Leftover preprocessor line markers; skip to end of line.
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }
        if ch == '/' && pos + 1 < bytes.len() {
            match bytes[pos + 1] {
                b'/' => {
                    while pos < bytes.len() && bytes[pos] != b'\n' {
                        pos += 1;
                    }
                    continue;
                }
                b'*' => {
                    pos += 2;
                    loop {
                        if pos + 1 >= bytes.len() {
                            return Err(ParseError::syntax(line, "unterminated block comment"));
                        }
                        if bytes[pos] == b'\n' {
                            line += 1;
                        }
                        if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
                            pos += 2;
                            break;
                        }
                        pos += 1;
                    }
                    continue;
                }
                _ => {}
            }
        }
        if ch == '\'' || ch == '"' {
            let start = pos;
            let quote = bytes[pos];
            pos += 1;
            while pos < bytes.len() && bytes[pos] != quote {
                if bytes[pos] == b'\n' {
                    return Err(ParseError::syntax(line, "unterminated literal"));
                }
                if bytes[pos] == b'\\' {
                    pos += 1;
                }
                pos += 1;
            }
            if pos >= bytes.len() {
                return Err(ParseError::syntax(line, "unterminated literal"));
            }
            pos += 1;
            tokens.push(Spanned {
                token: Token::Literal(input[start..pos].to_string()),
                line,
            });
            continue;
        }
        if ch.is_ascii_digit() {
            let start = pos;
            while pos < bytes.len()
                && ((bytes[pos] as char).is_ascii_alphanumeric() || bytes[pos] == b'.')
            {
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Number(input[start..pos].to_string()),
                line,
            });
            continue;
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = pos;
            while pos < bytes.len()
                && ((bytes[pos] as char).is_ascii_alphanumeric() || bytes[pos] == b'_')
            {
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Ident(input[start..pos].to_string()),
                line,
            });
            continue;
        }
        if input[pos..].starts_with("...") {
            tokens.push(Spanned {
                token: Token::Punct("..."),
                line,
            });
            pos += 3;
            continue;
        }
        if let Some(&punct) = PUNCT2.iter().find(|p| input[pos..].starts_with(**p)) {
            tokens.push(Spanned {
                token: Token::Punct(punct),
                line,
            });
            pos += punct.len();
            continue;
        }
        if let Some(idx) = PUNCT1.find(ch) {
            // Index back into the static string so the token borrows 'static.
            tokens.push(Spanned {
                token: Token::Punct(&PUNCT1[idx..idx + ch.len_utf8()]),
                line,
            });
            pos += 1;
            continue;
        }
        return Err(ParseError::syntax(line, format!("unexpected character `{ch}`")));
    }
    Ok(tokens)
}

/// Render a captured expression token run with canonical spacing.
///
/// Tokens are space-separated except inside brackets and before commas,
/// which is close enough to the declared source to re-parse and evaluate.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let text = token.text();
        let no_space_before = matches!(text, ")" | "]" | ",");
        if !out.is_empty() && !no_space_before && !out.ends_with('(') && !out.ends_with('[') {
            out.push(' ');
        }
        out.push_str(text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|s| s.token.text().to_string())
            .collect()
    }

    #[test]
    fn test_tokenize_declaration() {
        assert_eq!(
            texts("u8 gActionId[0x10];"),
            vec!["u8", "gActionId", "[", "0x10", "]", ";"]
        );
    }

    #[test]
    fn test_tokenize_operators_and_comments() {
        assert_eq!(
            texts("A + 1 /* total */ << 2 // end\n- B"),
            vec!["A", "+", "1", "<<", "2", "-", "B"]
        );
    }

    #[test]
    fn test_tokenize_literals() {
        assert_eq!(texts("'x' \"ab\\\"c\""), vec!["'x'", "\"ab\\\"c\""]);
    }

    #[test]
    fn test_line_markers_skipped() {
        assert_eq!(texts("# 1 \"unit.c\"\nint x;"), vec!["int", "x", ";"]);
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("int\nx;\n").unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_literal() {
        assert!(tokenize("char c = 'x").is_err());
        assert!(tokenize("/* never closed").is_err());
    }

    #[test]
    fn test_render_tokens() {
        let tokens = tokenize("MAX_UNITS + 1").unwrap();
        let tokens: Vec<Token> = tokens.into_iter().map(|s| s.token).collect();
        assert_eq!(render_tokens(&tokens), "MAX_UNITS + 1");

        let tokens = tokenize("(A + B) * 2").unwrap();
        let tokens: Vec<Token> = tokens.into_iter().map(|s| s.token).collect();
        assert_eq!(render_tokens(&tokens), "(A + B) * 2");
    }
}
