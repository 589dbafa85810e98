//! Loader for the site configuration module.
//!
//! Accepts a sequence of `export const <name> = <literal>;` statements with
//! literal values only: strings, numbers, booleans, `null`, `undefined`,
//! arrays and objects. Comments, trailing commas, single-quoted strings and
//! backtick strings without interpolation are tolerated so hand-edited
//! modules still load. Anything executable is a parse error.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::{is_identifier_continue, is_identifier_start, Document};

/// Errors produced while loading a module.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected {found} at line {line}, column {column}: expected {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
        line: usize,
        column: usize,
    },

    #[error("Invalid number literal '{literal}' at line {line}, column {column}")]
    InvalidNumber {
        literal: String,
        line: usize,
        column: usize,
    },

    #[error("Invalid escape sequence at line {line}, column {column}")]
    InvalidEscape { line: usize, column: usize },

    #[error("Unterminated string starting at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("Template interpolation is not supported (line {line}, column {column})")]
    TemplateInterpolation { line: usize, column: usize },

    #[error("Section '{name}' is exported more than once")]
    DuplicateExport { name: String },
}

/// Parse module source text into a document.
pub fn parse_module(source: &str) -> Result<Document, ParseError> {
    let mut parser = Parser::new(source);
    let mut document = Document::new();

    loop {
        parser.skip_trivia()?;
        if parser.at_end() {
            return Ok(document);
        }

        parser.expect_keyword("export", "'export'")?;
        parser.skip_trivia()?;
        let declaration = parser.identifier("'const'")?;
        if !matches!(declaration.as_str(), "const" | "let" | "var") {
            return Err(parser.unexpected_word(&declaration, "'const', 'let' or 'var'"));
        }

        parser.skip_trivia()?;
        let name = parser.identifier("an export name")?;
        parser.skip_trivia()?;
        parser.expect_char('=', "'='")?;
        let value = parser.value()?;
        parser.skip_trivia()?;
        parser.eat(';');

        if document.contains_key(&name) {
            return Err(ParseError::DuplicateExport { name });
        }
        document.insert(name, value);
    }
}

/// Parse a single literal value (the right-hand side of an export).
pub fn parse_value(source: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(source);
    let value = parser.value()?;
    parser.skip_trivia()?;
    if !parser.at_end() {
        return Err(parser.unexpected("end of input"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

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

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// 1-based line and column of `pos`.
    fn location(&self, pos: usize) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for &c in &self.chars[..pos.min(self.chars.len())] {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let found = match self.peek() {
            Some(c) => format!("'{}'", c),
            None => "end of input".to_string(),
        };
        let (line, column) = self.location(self.pos);
        ParseError::Unexpected {
            found,
            expected,
            line,
            column,
        }
    }

    /// Error for a word that was already consumed.
    fn unexpected_word(&self, word: &str, expected: &'static str) -> ParseError {
        let start = self.pos.saturating_sub(word.chars().count());
        let (line, column) = self.location(start);
        ParseError::Unexpected {
            found: format!("'{}'", word),
            expected,
            line,
            column,
        }
    }

    /// Skip whitespace, line comments and block comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() || c == '\u{feff}' => {
                    self.pos += 1;
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => {
                                let (line, column) = self.location(start);
                                return Err(ParseError::Unexpected {
                                    found: "end of input".to_string(),
                                    expected: "'*/' closing the comment",
                                    line,
                                    column,
                                });
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect_char(&mut self, expected: char, label: &'static str) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(label))
        }
    }

    fn expect_keyword(&mut self, keyword: &str, label: &'static str) -> Result<(), ParseError> {
        if !self.peek().is_some_and(is_identifier_start) {
            return Err(self.unexpected(label));
        }
        let word = self.identifier(label)?;
        if word == keyword {
            Ok(())
        } else {
            Err(self.unexpected_word(&word, label))
        }
    }

    fn identifier(&mut self, label: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Some(c) if is_identifier_start(c) => {}
            _ => return Err(self.unexpected(label)),
        }
        let start = self.pos;
        while self.peek().is_some_and(is_identifier_continue) {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some(quote @ ('"' | '\'' | '`')) => self.string(quote).map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if is_identifier_start(c) => {
                let word = self.identifier("a value")?;
                match word.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" | "undefined" => Ok(Value::Null),
                    _ => Err(self.unexpected_word(&word, "a literal value")),
                }
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    fn array(&mut self) -> Result<Value, ParseError> {
        self.expect_char('[', "'['")?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            self.expect_char(']', "',' or ']'")?;
            return Ok(Value::Array(items));
        }
    }

    fn object(&mut self) -> Result<Value, ParseError> {
        self.expect_char('{', "'{'")?;
        let mut fields = Map::new();
        loop {
            self.skip_trivia()?;
            if self.eat('}') {
                return Ok(Value::Object(fields));
            }
            let key = self.key()?;
            self.skip_trivia()?;
            self.expect_char(':', "':'")?;
            let value = self.value()?;
            // Later duplicates win, as in an object literal.
            fields.insert(key, value);
            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            self.expect_char('}', "',' or '}'")?;
            return Ok(Value::Object(fields));
        }
    }

    fn key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.string(quote),
            Some('[') => {
                self.pos += 1;
                self.skip_trivia()?;
                let key = match self.peek() {
                    Some(quote @ ('"' | '\'' | '`')) => self.string(quote)?,
                    _ => return Err(self.unexpected("a string key")),
                };
                self.skip_trivia()?;
                self.expect_char(']', "']'")?;
                Ok(key)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '.') {
                    self.pos += 1;
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
            _ => self.identifier("a property name"),
        }
    }

    fn number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' | 'e' | 'E' => is_float = true,
                '+' | '-' if matches!(self.chars.get(self.pos - 1), Some('e' | 'E')) => {}
                _ => break,
            }
            self.pos += 1;
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        let (line, column) = self.location(start);
        let invalid = || ParseError::InvalidNumber {
            literal: literal.clone(),
            line,
            column,
        };

        let digits: String = literal
            .trim_start_matches('+')
            .chars()
            .filter(|&c| c != '_')
            .collect();
        if digits.is_empty() || digits == "-" {
            return Err(invalid());
        }

        let number = if is_float {
            let parsed: f64 = digits.parse().map_err(|_| invalid())?;
            Number::from_f64(parsed).ok_or_else(invalid)?
        } else if let Ok(n) = digits.parse::<i64>() {
            Number::from(n)
        } else if let Ok(n) = digits.parse::<u64>() {
            Number::from(n)
        } else {
            let parsed: f64 = digits.parse().map_err(|_| invalid())?;
            Number::from_f64(parsed).ok_or_else(invalid)?
        };
        Ok(Value::Number(number))
    }

    fn string(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                let (line, column) = self.location(start);
                return Err(ParseError::UnterminatedString { line, column });
            };
            match c {
                c if c == quote => return Ok(out),
                '\\' => self.escape(&mut out)?,
                '$' if quote == '`' && self.peek() == Some('{') => {
                    let (line, column) = self.location(self.pos - 1);
                    return Err(ParseError::TemplateInterpolation { line, column });
                }
                '\n' if quote != '`' => {
                    let (line, column) = self.location(start);
                    return Err(ParseError::UnterminatedString { line, column });
                }
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let escape_pos = self.pos - 1;
        let invalid = |parser: &Self| {
            let (line, column) = parser.location(escape_pos);
            ParseError::InvalidEscape { line, column }
        };

        let Some(c) = self.bump() else {
            return Err(invalid(self));
        };
        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000c}'),
            'v' => out.push('\u{000b}'),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            // Line continuation.
            '\n' => {}
            '\r' => {
                self.eat('\n');
            }
            'x' => {
                let code = self.hex_digits(2).ok_or_else(|| invalid(self))?;
                out.push(char::from_u32(code).ok_or_else(|| invalid(self))?);
            }
            'u' => {
                let code = self.unicode_escape().ok_or_else(|| invalid(self))?;
                out.push(code);
            }
            c if c.is_ascii_digit() => return Err(invalid(self)),
            c => out.push(c),
        }
        Ok(())
    }

    fn hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut code = 0;
        for _ in 0..count {
            let digit = self.bump()?.to_digit(16)?;
            code = code * 16 + digit;
        }
        Some(code)
    }

    /// Body of a `\u` escape, either `XXXX` (with surrogate pairs) or `{X...}`.
    fn unicode_escape(&mut self) -> Option<char> {
        if self.eat('{') {
            let mut code: u32 = 0;
            let mut digits = 0;
            while let Some(c) = self.bump() {
                if c == '}' {
                    return if digits > 0 { char::from_u32(code) } else { None };
                }
                code = code.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
                digits += 1;
            }
            return None;
        }

        let high = self.hex_digits(4)?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high);
        }
        if self.peek() != Some('\\') || self.peek_at(1) != Some('u') {
            return None;
        }
        self.pos += 2;
        let low = self.hex_digits(4)?;
        if !(0xDC00..0xE000).contains(&low) {
            return None;
        }
        char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_exports_in_order() {
        let source = r#"
// Site configuration
export const property = {
  address: "1 Main St",
  beds: 2,
};

export const tags = ["x", "y"];
export let visible = true
"#;
        let document = parse_module(source).unwrap();
        let keys: Vec<&str> = document.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["property", "tags", "visible"]);
        assert_eq!(document["property"], json!({"address": "1 Main St", "beds": 2}));
        assert_eq!(document["tags"], json!(["x", "y"]));
        assert_eq!(document["visible"], json!(true));
    }

    #[test]
    fn test_computed_string_keys() {
        let value = parse_value(r#"{ ["__proto__"]: { admin: true }, [ 'a b' ]: 1 }"#).unwrap();
        assert_eq!(value, json!({"__proto__": {"admin": true}, "a b": 1}));

        assert!(parse_value("{ [name]: 1 }").is_err());
        assert!(parse_value(r#"{ ["a": 1 }"#).is_err());
    }

    #[test]
    fn test_empty_source_is_empty_document() {
        assert!(parse_module("").unwrap().is_empty());
        assert!(parse_module("// nothing yet\n/* still nothing */\n").unwrap().is_empty());
    }

    #[test]
    fn test_hand_written_literals() {
        let value = parse_value(
            r#"{
  'single': 'it\'s',
  "quoted-key": `multi
line`,
  plain: undefined, // trailing comment
  nested: { list: [1, -2.5, 1e3, +4,], empty: {} },
  hex: "\x41B\u{1F600}",
  10: "numeric key",
}"#,
        )
        .unwrap();

        assert_eq!(value["single"], json!("it's"));
        assert_eq!(value["quoted-key"], json!("multi\nline"));
        assert_eq!(value["plain"], json!(null));
        assert_eq!(value["nested"]["list"], json!([1, -2.5, 1000.0, 4]));
        assert_eq!(value["nested"]["empty"], json!({}));
        assert_eq!(value["hex"], json!("AB\u{1F600}"));
        assert_eq!(value["10"], json!("numeric key"));
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let value = parse_value(r#""\uD83D\uDE00""#).unwrap();
        assert_eq!(value, json!("\u{1F600}"));
    }

    #[test]
    fn test_rejects_code() {
        let err = parse_module("export const x = computeIt();").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { ref found, .. } if found == "'computeIt'"));
    }

    #[test]
    fn test_rejects_import_statement() {
        let err = parse_module("import x from './x';").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Unexpected { line: 1, column: 1, .. }
        ));
    }

    #[test]
    fn test_rejects_template_interpolation() {
        let err = parse_value("`Hello ${name}`").unwrap_err();
        assert!(matches!(err, ParseError::TemplateInterpolation { .. }));
    }

    #[test]
    fn test_rejects_unterminated_string() {
        let err = parse_value("\"open").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedString { line: 1, column: 1 });
    }

    #[test]
    fn test_rejects_duplicate_export() {
        let err = parse_module("export const a = 1;\nexport const a = 2;").unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateExport {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_error_location_points_at_problem() {
        let err = parse_module("export const a = {\n  b: 1\n  c: 2\n};").unwrap_err();
        match err {
            ParseError::Unexpected { line, column, .. } => {
                assert_eq!((line, column), (3, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_bad_number() {
        let err = parse_value("1.2.3").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }
}
