use crate::parser::{
    ast::{DateParser, IdentifierParser, Literal, NumberParser, PathExpr, StringParser},
    ParseError, PathParser,
};

/// Recursive descent over the supported path grammar:
///
/// ```text
/// expression := term ('.' invocation)*
/// term       := literal | '$this' | '(' expression ')' | invocation
/// invocation := identifier ('(' (expression (',' expression)*)? ')')?
/// ```
pub struct PathExprParser;

impl PathExprParser {
    pub fn parse(text: &str) -> Result<PathExpr, ParseError> {
        let mut parser = PathParser::new(text);
        parser.next_non_whitespace();
        if parser.eof() {
            return ParseError::new("Empty expression", 0, &parser).err();
        }

        let expr = Self::parse_expression(&mut parser)?;

        parser.next_non_whitespace();
        if !parser.eof() {
            return ParseError::new("Unexpected character", parser.position, &parser).err();
        }
        Ok(expr)
    }

    fn parse_expression(parser: &mut PathParser) -> Result<PathExpr, ParseError> {
        let mut expr = Self::parse_term(parser)?;

        loop {
            parser.next_non_whitespace();
            if parser.current() != '.' {
                break;
            }
            parser.next();
            parser.next_non_whitespace();
            expr = Self::parse_invocation(parser, Some(expr))?;
        }

        Ok(expr)
    }

    fn parse_term(parser: &mut PathParser) -> Result<PathExpr, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        if StringParser::is_string_delimiter(parser) {
            return Ok(PathExpr::Literal(StringParser::parse(parser)?));
        }
        if NumberParser::is_number(parser) {
            return Ok(PathExpr::Literal(NumberParser::parse(parser)?));
        }
        if DateParser::is_date(parser) {
            return Ok(PathExpr::Literal(DateParser::parse(parser)?));
        }

        if parser.current() == '$' {
            parser.next();
            let name = IdentifierParser::parse(parser)?;
            if name != "this" {
                return ParseError::new("Unsupported environment variable", pivot, parser).err();
            }
            return Ok(PathExpr::This);
        }

        if parser.current() == '(' {
            parser.next();
            let inner = Self::parse_expression(parser)?;
            parser.next_non_whitespace();
            if parser.current() != ')' {
                return ParseError::new("Expected ')'", pivot, parser).err();
            }
            parser.next();
            return Ok(inner);
        }

        if parser.current() != '`' {
            let word_start = parser.position;
            let name = IdentifierParser::parse(parser)?;
            let is_call = {
                let mut lookahead = parser.position;
                while parser.text_v.get(lookahead).is_some_and(|c| c.is_whitespace()) {
                    lookahead += 1;
                }
                parser.text_v.get(lookahead) == Some(&'(')
            };
            match name.as_str() {
                "true" if !is_call => return Ok(PathExpr::Literal(Literal::Boolean(true))),
                "false" if !is_call => return Ok(PathExpr::Literal(Literal::Boolean(false))),
                _ => {}
            }
            parser.position = word_start;
        }

        Self::parse_invocation(parser, None)
    }

    fn parse_invocation(parser: &mut PathParser, target: Option<PathExpr>) -> Result<PathExpr, ParseError> {
        let name = IdentifierParser::parse(parser)?;

        let after_name = parser.position;
        parser.next_non_whitespace();
        if parser.current() != '(' {
            parser.position = after_name;
            return Ok(PathExpr::member(target, &name));
        }

        let pivot = parser.position;
        parser.next();
        parser.next_non_whitespace();

        let mut args = vec![];
        if parser.current() == ')' {
            parser.next();
            return Ok(PathExpr::function(target, &name, args));
        }

        loop {
            args.push(Self::parse_expression(parser)?);
            parser.next_non_whitespace();
            match parser.current() {
                ',' => parser.next(),
                ')' => {
                    parser.next();
                    break;
                }
                _ => return ParseError::new("Expected ',' or ')' in argument list", pivot, parser).err(),
            }
        }

        Ok(PathExpr::function(target, &name, args))
    }
}
