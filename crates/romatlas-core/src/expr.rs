//! Count-expression evaluator.
//!
//! Array counts come out of declarations as expression text like
//! `MAX_UNITS + 1`. The grammar is closed: decimal and `0x` integer
//! literals, identifiers, unary minus, `+ - * /`, and parentheses.
//! Identifiers resolve through the constants table; the resolved string is
//! itself an expression and is evaluated recursively, with a depth limit
//! guarding reference cycles. Expressions are never handed to anything
//! resembling a host-language eval.

use crate::constants::ConstantTable;
use crate::error::{MapError, MapResult};

/// Reference chains longer than this indicate a constant cycle.
const MAX_DEPTH: usize = 32;

/// Evaluate a count expression against the constants table.
pub fn evaluate(expr: &str, constants: &ConstantTable) -> MapResult<i64> {
    eval_at_depth(expr, constants, 0)
}

fn eval_at_depth(expr: &str, constants: &ConstantTable, depth: usize) -> MapResult<i64> {
    if depth > MAX_DEPTH {
        return Err(MapError::expr(expr, "constant reference cycle"));
    }
    let tokens = tokenize(expr)?;
    let mut parser = ExprParser {
        expr,
        tokens,
        pos: 0,
        constants,
        depth,
    };
    let value = parser.parse_sum()?;
    match parser.peek() {
        ExprToken::End => Ok(value),
        other => Err(MapError::expr(
            expr,
            format!("unexpected {} after expression", other.describe()),
        )),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ExprToken {
    Int(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
    End,
}

impl ExprToken {
    fn describe(&self) -> String {
        match self {
            ExprToken::Int(n) => format!("integer {n}"),
            ExprToken::Ident(name) => format!("identifier `{name}`"),
            ExprToken::Plus => "`+`".to_string(),
            ExprToken::Minus => "`-`".to_string(),
            ExprToken::Star => "`*`".to_string(),
            ExprToken::Slash => "`/`".to_string(),
            ExprToken::Open => "`(`".to_string(),
            ExprToken::Close => "`)`".to_string(),
            ExprToken::End => "end of expression".to_string(),
        }
    }
}

fn tokenize(expr: &str) -> MapResult<Vec<ExprToken>> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();
    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(ExprToken::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(ExprToken::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(ExprToken::Star);
            }
            '/' => {
                chars.next();
                tokens.push(ExprToken::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(ExprToken::Open);
            }
            ')' => {
                chars.next();
                tokens.push(ExprToken::Close);
            }
            _ if ch.is_ascii_digit() => {
                let start = pos;
                let mut end = pos;
                while let Some(&(p, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() {
                        end = p + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(parse_int_token(expr, &expr[start..end])?);
            }
            _ if ch.is_ascii_alphabetic() || ch == '_' => {
                let start = pos;
                let mut end = pos;
                while let Some(&(p, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        end = p + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(ExprToken::Ident(expr[start..end].to_string()));
            }
            other => {
                return Err(MapError::expr(expr, format!("unexpected character `{other}`")));
            }
        }
    }
    tokens.push(ExprToken::End);
    Ok(tokens)
}

fn parse_int_token(expr: &str, text: &str) -> MapResult<ExprToken> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => text.parse::<i64>(),
    };
    parsed
        .map(ExprToken::Int)
        .map_err(|_| MapError::expr(expr, format!("bad integer literal `{text}`")))
}

struct ExprParser<'a> {
    expr: &'a str,
    tokens: Vec<ExprToken>,
    pos: usize,
    constants: &'a ConstantTable,
    depth: usize,
}

impl ExprParser<'_> {
    fn peek(&self) -> &ExprToken {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> ExprToken {
        let token = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn parse_sum(&mut self) -> MapResult<i64> {
        let mut value = self.parse_product()?;
        loop {
            match self.peek() {
                ExprToken::Plus => {
                    self.advance();
                    value = value.wrapping_add(self.parse_product()?);
                }
                ExprToken::Minus => {
                    self.advance();
                    value = value.wrapping_sub(self.parse_product()?);
                }
                _ => return Ok(value),
            }
        }
    }

    fn parse_product(&mut self) -> MapResult<i64> {
        let mut value = self.parse_unary()?;
        loop {
            match self.peek() {
                ExprToken::Star => {
                    self.advance();
                    value = value.wrapping_mul(self.parse_unary()?);
                }
                ExprToken::Slash => {
                    self.advance();
                    let divisor = self.parse_unary()?;
                    if divisor == 0 {
                        return Err(MapError::expr(self.expr, "division by zero"));
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn parse_unary(&mut self) -> MapResult<i64> {
        if matches!(self.peek(), ExprToken::Minus) {
            self.advance();
            return Ok(self.parse_unary()?.wrapping_neg());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> MapResult<i64> {
        match self.advance() {
            ExprToken::Int(n) => Ok(n),
            ExprToken::Ident(name) => match self.constants.get(&name) {
                Some(value) => eval_at_depth(value, self.constants, self.depth + 1),
                None => Err(MapError::expr(
                    self.expr,
                    format!("unknown constant `{name}`"),
                )),
            },
            ExprToken::Open => {
                let value = self.parse_sum()?;
                match self.advance() {
                    ExprToken::Close => Ok(value),
                    other => Err(MapError::expr(
                        self.expr,
                        format!("expected `)`, got {}", other.describe()),
                    )),
                }
            }
            other => Err(MapError::expr(
                self.expr,
                format!("expected a value, got {}", other.describe()),
            )),
        }
    }
}
