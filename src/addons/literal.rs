//! addons::literal
//!
//! Reader for the literal data structures addon descriptors are written in.
//!
//! Descriptors are a single mapping literal in Python syntax. Only literals
//! are accepted, nothing is evaluated:
//!
//! - mappings `{k: v}`, lists `[a, b]`, tuples `(a, b)` (read as lists)
//! - strings with `'`/`"`/triple quotes, `r`/`u`/`b` prefixes, escapes, and
//!   adjacent-literal concatenation
//! - integers and floats, optionally negative
//! - `True`/`False`/`None` and their JSON spellings
//! - `#` comments and trailing commas
//!
//! Values come back as [`serde_json::Value`] so the descriptor schema can be
//! deserialized with serde.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A syntax error in a literal, with a 1-based position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct LiteralError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse a complete literal. Trailing content other than whitespace and
/// comments is an error.
///
/// # Example
///
/// ```
/// use addon_steward::addons::literal::parse_literal;
///
/// let value = parse_literal("{'name': 'Date Range', 'installable': True}").unwrap();
/// assert_eq!(value["name"], "Date Range");
/// assert_eq!(value["installable"], true);
/// ```
pub fn parse_literal(source: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
    };
    parser.skip_trivia();
    let value = parser.value()?;
    parser.skip_trivia();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected content after literal"));
    }
    Ok(value)
}

/// `0x1F`, `-0o17`, `0b101`.
fn radix_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let radix = match digits.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let value = i64::from_str_radix(digits.get(2..)?, radix).ok()?;
    Some(if negative { -value } else { value })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        let consumed = &self.chars[..self.pos.min(self.chars.len())];
        let line = consumed.iter().filter(|&&c| c == '\n').count() + 1;
        let column = consumed.iter().rev().take_while(|&&c| c != '\n').count() + 1;
        LiteralError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Skip whitespace, comments and explicit line continuations.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => self.pos += 1,
                '#' => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.pos += 1;
                    }
                }
                '\\' if self.peek_at(1) == Some('\n') => self.pos += 2,
                '\\' if self.peek_at(1) == Some('\r') && self.peek_at(2) == Some('\n') => self.pos += 3,
                _ => break,
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        self.skip_trivia();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => {
                self.pos -= 1;
                Err(self.error(format!("expected '{}', found '{}'", expected, c)))
            }
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.mapping(),
            Some('[') => {
                self.pos += 1;
                self.sequence(']').map(Value::Array)
            }
            Some('(') => self.parenthesized(),
            Some('\'') | Some('"') => self.strings(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => {
                if self.at_string_prefix() {
                    self.strings()
                } else {
                    self.keyword()
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    /// `{k: v}` is a mapping; `{a, b}` is a set, read as a list.
    fn mapping(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        self.skip_trivia();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Value::Object(Map::new()));
        }

        let first = self.value()?;
        self.skip_trivia();
        if self.peek() != Some(':') {
            let mut items = vec![first];
            match self.bump() {
                Some(',') => items.extend(self.sequence('}')?),
                Some('}') => {}
                _ => {
                    self.pos = self.pos.saturating_sub(1);
                    return Err(self.error("expected ',', ':' or '}'"));
                }
            }
            return Ok(Value::Array(items));
        }

        let mut map = Map::new();
        let mut key = first;
        loop {
            let name = self.mapping_key(key)?;
            self.expect(':')?;
            let value = self.value()?;
            map.insert(name, value);

            self.skip_trivia();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(Value::Object(map)),
                _ => {
                    self.pos = self.pos.saturating_sub(1);
                    return Err(self.error("expected ',' or '}' in mapping"));
                }
            }
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }
            key = self.value()?;
        }
    }

    /// Scalar keys are stored under their Python spelling.
    fn mapping_key(&self, key: Value) -> Result<String, LiteralError> {
        match key {
            Value::String(key) => Ok(key),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(true) => Ok("True".to_string()),
            Value::Bool(false) => Ok("False".to_string()),
            Value::Null => Ok("None".to_string()),
            other => Err(self.error(format!("unsupported mapping key {}", other))),
        }
    }

    /// Items up to `close`; the opening bracket is already consumed.
    fn sequence(&mut self, close: char) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value()?);

            self.skip_trivia();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(items),
                _ => {
                    self.pos = self.pos.saturating_sub(1);
                    return Err(self.error(format!("expected ',' or '{}'", close)));
                }
            }
        }
    }

    /// `(x)` is `x`; `()`, `(x,)` and `(x, y)` are tuples.
    fn parenthesized(&mut self) -> Result<Value, LiteralError> {
        self.expect('(')?;
        self.skip_trivia();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value()?;
        self.skip_trivia();
        match self.bump() {
            Some(')') => Ok(first),
            Some(',') => {
                let mut items = vec![first];
                items.extend(self.sequence(')')?);
                Ok(Value::Array(items))
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected ',' or ')'"))
            }
        }
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            _ => {
                self.pos = start;
                Err(self.error(format!("'{}' is not a literal", word)))
            }
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '.' || c == '_'
            || ((c == '-' || c == '+') && matches!(self.chars[self.pos - 1], 'e' | 'E')))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|&&c| c != '_')
            .collect();

        if let Some(int) = radix_integer(&text) {
            return Ok(Value::Number(int.into()));
        }
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        if let Ok(int) = text.parse::<u64>() {
            return Ok(Value::Number(int.into()));
        }
        if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Ok(Value::Number(number));
        }
        self.pos = start;
        Err(self.error(format!("invalid number '{}'", text)))
    }

    /// Is the identifier at point a string prefix like `u'..'` or `rb"..."`?
    fn at_string_prefix(&self) -> bool {
        let mut offset = 0;
        while let Some(c) = self.peek_at(offset) {
            match c {
                'r' | 'R' | 'u' | 'U' | 'b' | 'B' if offset < 2 => offset += 1,
                '\'' | '"' => return offset > 0,
                _ => return false,
            }
        }
        false
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Value, LiteralError> {
        let mut text = self.string()?;
        loop {
            let checkpoint = self.pos;
            self.skip_trivia();
            match self.peek() {
                Some('\'') | Some('"') => text.push_str(&self.string()?),
                Some(_) if self.at_string_prefix() => text.push_str(&self.string()?),
                _ => {
                    self.pos = checkpoint;
                    return Ok(Value::String(text));
                }
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let mut raw = false;
        while let Some(c) = self.peek() {
            match c {
                'r' | 'R' => raw = true,
                'u' | 'U' | 'b' | 'B' => {}
                _ => break,
            }
            self.pos += 1;
        }

        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.error("unterminated string"))?;
            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.pos += 2;
                    return Ok(out);
                }
                out.push(c);
                continue;
            }
            match c {
                '\n' if !triple => return Err(self.error("newline in single-quoted string")),
                '\\' if raw => {
                    out.push('\\');
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                '\\' => self.escape(&mut out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape"))?;
        match c {
            '\n' => {}
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '\\' | '\'' | '"' => out.push(c),
            'x' => out.push(self.hex_escape(2)?),
            'u' => out.push(self.hex_escape(4)?),
            'U' => out.push(self.hex_escape(8)?),
            other => {
                // Unknown escapes are kept verbatim
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid escape sequence '{}'", hex)))?;
        self.pos = end;
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typical_descriptor() {
        let source = r#"
# Copyright 2018 ACSONE SA/NV
# License AGPL-3.0 or later
{
    "name": "Date Range",
    "summary": "Manage all kind of date range",
    "version": "16.0.1.2.0",
    "license": "LGPL-3",
    "author": "ACSONE SA/NV, "
              "Odoo Community Association (OCA)",
    "depends": ["web"],
    "data": [
        "security/ir.model.access.csv",  # access
        "views/date_range_view.xml",
    ],
    "maintainers": ["sbidoul", "lmignon"],
    "installable": True,
    "sequence": 10,
}
"#;
        let value = parse_literal(source).unwrap();
        assert_eq!(value["version"], "16.0.1.2.0");
        assert_eq!(
            value["author"],
            "ACSONE SA/NV, Odoo Community Association (OCA)"
        );
        assert_eq!(value["maintainers"], json!(["sbidoul", "lmignon"]));
        assert_eq!(value["installable"], json!(true));
        assert_eq!(value["sequence"], json!(10));
        assert_eq!(value["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn json_is_accepted() {
        let value =
            parse_literal(r#"{"name": "addon1", "maintainers": ["themaintainer"], "x": null}"#)
                .unwrap();
        assert_eq!(value["maintainers"], json!(["themaintainer"]));
        assert_eq!(value["x"], Value::Null);
    }

    #[test]
    fn triple_quoted_and_prefixed_strings() {
        let value = parse_literal(
            "{u'description': '''Line one\n'quoted'\nLine three''', r'raw': r'a\\b'}",
        )
        .unwrap();
        assert_eq!(value["description"], "Line one\n'quoted'\nLine three");
        assert_eq!(value["raw"], "a\\b");
    }

    #[test]
    fn escapes() {
        let value = parse_literal(r#"{'a': 'tab\there', 'b': "it\'s", 'c': '\x41é'}"#).unwrap();
        assert_eq!(value["a"], "tab\there");
        assert_eq!(value["b"], "it's");
        assert_eq!(value["c"], "Aé");
    }

    #[test]
    fn tuples_and_parentheses() {
        let value = parse_literal("{'a': (1, 2), 'b': ('x',), 'c': ('grouped'), 'd': ()}").unwrap();
        assert_eq!(value["a"], json!([1, 2]));
        assert_eq!(value["b"], json!(["x"]));
        assert_eq!(value["c"], "grouped");
        assert_eq!(value["d"], json!([]));
    }

    #[test]
    fn numbers() {
        let value = parse_literal("[1, -2, 3.5, 1_000, 2e3]").unwrap();
        assert_eq!(value, json!([1, -2, 3.5, 1000, 2000.0]));
    }

    #[test]
    fn radix_integers() {
        let value = parse_literal("[0x1F, 0o17, 0b101, -0x10, 18446744073709551615]").unwrap();
        assert_eq!(value, json!([31, 15, 5, -16, 18446744073709551615u64]));
    }

    #[test]
    fn sets_read_as_lists() {
        let value = parse_literal("{'maintainers': {'alice', 'bob'}, 'one': {'x'}}").unwrap();
        assert_eq!(value["maintainers"], json!(["alice", "bob"]));
        assert_eq!(value["one"], json!(["x"]));
        assert_eq!(parse_literal("{}").unwrap(), json!({}));
    }

    #[test]
    fn scalar_keys_use_python_spelling() {
        let value = parse_literal("{1: 'a', True: 'b', None: 'c', 'k': 'd',}").unwrap();
        assert_eq!(value, json!({"1": "a", "True": "b", "None": "c", "k": "d"}));
    }

    #[test]
    fn crlf_line_continuation() {
        let value = parse_literal("{'a': \\\r\n 1}").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn rejects_expressions() {
        assert!(parse_literal("{'a': open('x')}").is_err());
        assert!(parse_literal("{'a': 1 + 2}").is_err());
        assert!(parse_literal("__import__('os')").is_err());
    }

    #[test]
    fn rejects_malformed_content() {
        assert!(parse_literal("").is_err());
        assert!(parse_literal("{'a': 1").is_err());
        assert!(parse_literal("{'a' 1}").is_err());
        assert!(parse_literal("{'a': 'unterminated}").is_err());
        assert!(parse_literal("{(1, 2): 'tuple key'}").is_err());
        assert!(parse_literal("{'a': 1} trailing").is_err());
    }

    #[test]
    fn error_position_is_reported() {
        let err = parse_literal("{\n  'a': 1,\n  'b' 2\n}").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.to_string().starts_with("line 3"));
    }
}
