//! Arithmetic formulas for calculated columns.
//!
//! Syntax: `{revenue} - {cost} * (1 + {tax})`
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/' | '%') factor)*
//! factor     := '(' expression ')' | '-' factor | number-literal
//! ```
//!
//! Column references are replaced by the row's numeric value before parsing.
//! Division and modulo by zero yield `0`.

use crate::coerce::format_number;
use crate::row::Row;
use thiserror::Error;

/// Parenthesis/unary nesting limit.
const MAX_DEPTH: usize = 256;

/// Formula evaluation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Input ended where an operand was expected
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    /// Character that cannot start an operand or operator
    #[error("unexpected '{ch}' at position {pos}")]
    UnexpectedChar {
        /// Offending character
        ch: char,
        /// Byte offset
        pos: usize,
    },
    /// Malformed number literal
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    /// Opening parenthesis never closed
    #[error("unmatched parenthesis at position {0}")]
    UnmatchedParen(usize),
    /// Nesting deeper than the evaluator accepts
    #[error("formula nested too deeply")]
    TooDeep,
}

/// A calculated-column formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    source: String,
}

impl Formula {
    /// Wrap a formula string.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The formula text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Referenced column names, first occurrence order, without duplicates.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        let mut rest = self.source.as_str();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else { break };
            let name = &after[..close];
            if !refs.contains(&name) {
                refs.push(name);
            }
            rest = &after[close + 1..];
        }
        refs
    }

    /// Replace every `{column}` with the row's numeric value. Missing and
    /// non-numeric cells become `0`. An unclosed `{` is left as written.
    #[must_use]
    pub fn substitute(&self, row: &Row) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else { break };
            out.push_str(&rest[..open]);
            let n = row.get(&after[..close]).map_or(0.0, |v| v.to_number_or_zero());
            out.push_str(&format_number(n));
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Evaluate against one row.
    pub fn evaluate_row(&self, row: &Row) -> Result<f64, FormulaError> {
        evaluate(&self.substitute(row))
    }
}

/// Evaluate a pure numeric expression.
pub fn evaluate(expr: &str) -> Result<f64, FormulaError> {
    let mut parser = Parser {
        input: expr.as_bytes(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    parser.skip_ws();
    match parser.peek() {
        None => Ok(value),
        Some(b) => Err(parser.unexpected(b)),
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, b: u8) -> FormulaError {
        // Non-ASCII bytes are reported by the char they start.
        let ch = std::str::from_utf8(&self.input[self.pos..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::from(b));
        FormulaError::UnexpectedChar { ch, pos: self.pos }
    }

    fn expression(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.factor()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some(op @ (b'*' | b'/' | b'%')) => op,
                _ => return Ok(value),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            value = match op {
                b'*' => value * rhs,
                _ if rhs == 0.0 => 0.0,
                b'/' => value / rhs,
                _ => value % rhs,
            };
        }
    }

    fn factor(&mut self) -> Result<f64, FormulaError> {
        self.skip_ws();
        match self.peek() {
            None => Err(FormulaError::UnexpectedEnd),
            Some(b'(') => {
                let open = self.pos;
                self.pos += 1;
                let value = self.nested(Self::expression)?;
                self.skip_ws();
                if self.peek() == Some(b')') {
                    self.pos += 1;
                    Ok(value)
                } else {
                    Err(FormulaError::UnmatchedParen(open))
                }
            }
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.nested(Self::factor)?)
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.number(),
            Some(b) => Err(self.unexpected(b)),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<f64, FormulaError>,
    ) -> Result<f64, FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn number(&mut self) -> Result<f64, FormulaError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit() || b == b'.') {
            self.pos += 1;
        }
        let literal = String::from_utf8_lossy(&self.input[start..self.pos]);
        literal
            .parse()
            .map_err(|_| FormulaError::InvalidNumber(literal.into_owned()))
    }
}
