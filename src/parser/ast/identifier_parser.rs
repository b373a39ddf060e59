use crate::parser::{ParseError, PathParser};

pub struct IdentifierParser;

impl IdentifierParser {
    pub fn is_identifier_start(parser: &PathParser) -> bool {
        let current = parser.current();
        current.is_alphabetic() || current == '_' || current == '`'
    }

    /// A plain identifier, or any text between backticks.
    pub fn parse(parser: &mut PathParser) -> Result<String, ParseError> {
        let pivot = parser.position;

        if parser.current() == '`' {
            parser.next();
            let start = parser.position;
            while !parser.eof() && parser.current() != '`' {
                parser.next();
            }
            if parser.eof() {
                return ParseError::new("Unterminated quoted identifier", pivot, parser).err();
            }
            let name = parser.text_from_pivot(start);
            parser.next();
            if name.is_empty() {
                return ParseError::new("Empty quoted identifier", pivot, parser).err();
            }
            return Ok(name);
        }

        if !IdentifierParser::is_identifier_start(parser) {
            return ParseError::new("Expected identifier", pivot, parser).err();
        }
        while parser.current().is_alphanumeric() || parser.current() == '_' {
            parser.next();
        }

        Ok(parser.text_from_pivot(pivot))
    }
}
