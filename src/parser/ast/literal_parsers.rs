use chrono::NaiveDate;
use ordered_float::NotNan;

use crate::parser::{ast::Literal, ParseError, PathParser};

pub struct StringParser;

impl StringParser {
    pub fn is_string_delimiter(parser: &PathParser) -> bool {
        parser.current() == '\''
    }

    pub fn parse(parser: &mut PathParser) -> Result<Literal, ParseError> {
        let pivot = parser.position;

        if !StringParser::is_string_delimiter(parser) {
            return ParseError::new("Invalid string value", pivot, parser).err();
        }
        parser.next();

        let mut text = String::new();
        while !parser.eof() && !StringParser::is_string_delimiter(parser) {
            if parser.current() == '\\' {
                parser.next();
                match parser.current() {
                    '\'' | '\\' => text.push(parser.current()),
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    _ => return ParseError::new("Invalid escape sequence", pivot, parser).err(),
                }
            } else {
                text.push(parser.current());
            }
            parser.next();
        }
        if parser.eof() {
            return ParseError::new("Unterminated string", pivot, parser).err();
        }
        parser.next();

        Ok(Literal::String(text))
    }
}

pub struct NumberParser;

impl NumberParser {
    pub fn is_number(parser: &PathParser) -> bool {
        let current = parser.current();
        current.is_ascii_digit() || (current == '-' && parser.peek(1).is_ascii_digit())
    }

    pub fn parse(parser: &mut PathParser) -> Result<Literal, ParseError> {
        let pivot = parser.position;

        if !NumberParser::is_number(parser) {
            return ParseError::new("Invalid number value", pivot, parser).err();
        }
        if parser.current() == '-' {
            parser.next();
        }
        while parser.current().is_ascii_digit() {
            parser.next();
        }

        // a dot not followed by a digit is a path step, not a fraction
        let mut is_decimal = false;
        if parser.current() == '.' && parser.peek(1).is_ascii_digit() {
            is_decimal = true;
            parser.next();
            while parser.current().is_ascii_digit() {
                parser.next();
            }
        }

        if parser.current().is_alphabetic() || parser.current() == '_' {
            return ParseError::new("Invalid number value", pivot, parser).err();
        }

        let number = parser.text_from_pivot(pivot);
        if is_decimal {
            let value = number
                .parse::<f64>()
                .ok()
                .and_then(|v| NotNan::new(v).ok())
                .ok_or_else(|| ParseError::new("Invalid decimal", pivot, parser))?;
            Ok(Literal::Decimal(value))
        } else {
            let value = number
                .parse::<i64>()
                .map_err(|_| ParseError::new("Invalid integer", pivot, parser))?;
            Ok(Literal::Integer(value))
        }
    }
}

pub struct DateParser;

impl DateParser {
    pub fn is_date(parser: &PathParser) -> bool {
        parser.current() == '@'
    }

    /// `@YYYY-MM-DD`
    pub fn parse(parser: &mut PathParser) -> Result<Literal, ParseError> {
        let pivot = parser.position;

        if !DateParser::is_date(parser) {
            return ParseError::new("Invalid date value", pivot, parser).err();
        }
        parser.next();

        let start = parser.position;
        while parser.current().is_ascii_digit() || parser.current() == '-' {
            parser.next();
        }
        let text = parser.text_from_pivot(start);

        NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Literal::Date)
            .map_err(|_| ParseError::new("Invalid date value", pivot, parser))
    }
}
