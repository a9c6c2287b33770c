//! Arithmetic evaluation of a fully substituted formula body.
//!
//! Once every cell reference has been replaced by a number, the remaining text
//! must consist of numbers, `+ - * /` and parentheses. Evaluation runs in two
//! stages: textual validation (character set, `/0`, doubled operators, paren
//! balance) and then a recursive-descent parse that computes the value.
//!
//! GRAMMAR:
//!   expression     --> additive
//!   additive       --> multiplicative (("+" | "-") multiplicative)*
//!   multiplicative --> unary (("*" | "/") unary)*
//!   unary          --> ("-" | "+") unary | primary
//!   primary        --> NUMBER | "(" expression ")"

use regex::Regex;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;

use super::error::{FormulaError, Result};

/// Results are rounded to this many decimal places.
pub const DECIMAL_PLACES: i32 = 6;

/// Deepest parenthesis nesting the parser will follow.
const MAX_NESTING: usize = 256;

/// Validate and evaluate a numeric-only expression such as `"(10+5)*2-8/4"`.
///
/// Whitespace is ignored. The result is finite and rounded to
/// [`DECIMAL_PLACES`] decimal places, half away from zero.
pub fn evaluate_arithmetic(expression: &str) -> Result<f64> {
    let clean: String = expression.chars().filter(|c| !c.is_whitespace()).collect();

    if clean.is_empty() {
        return Err(FormulaError::EmptyFormula);
    }
    validate(&clean)?;

    let mut parser = Parser::new(&clean);
    let value = parser.parse()?;

    if !value.is_finite() {
        return Err(FormulaError::NotFinite);
    }
    Ok(round_to_places(value, DECIMAL_PLACES))
}

fn validate(clean: &str) -> Result<()> {
    let patterns = patterns();

    if !patterns.allowed.is_match(clean) {
        return Err(FormulaError::InvalidCharacters);
    }
    if patterns.zero_divisor.is_match(clean) {
        return Err(FormulaError::DivisionByZero);
    }
    if patterns.operator_run.is_match(clean) {
        return Err(FormulaError::InvalidOperatorSequence);
    }

    let open = clean.matches('(').count();
    let close = clean.matches(')').count();
    if open != close {
        return Err(FormulaError::UnmatchedParentheses);
    }

    Ok(())
}

struct Patterns {
    allowed: Regex,
    zero_divisor: Regex,
    operator_run: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        allowed: Regex::new(r"^[0-9+\-*/().]+$").expect("character set regex must compile"),
        // A literal zero divisor: "/0" not continuing into "/05" or "/0.5".
        zero_divisor: Regex::new(r"/0(?:[^0-9.]|$)").expect("zero divisor regex must compile"),
        operator_run: Regex::new(r"[+\-*/]{2,}").expect("operator run regex must compile"),
    })
}

/// Round half away from zero. Values whose scaled form is beyond 2^53 carry no
/// digits past `places` and come back unchanged.
pub fn round_to_places(value: f64, places: i32) -> f64 {
    const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INT_LIMIT {
        return value;
    }
    let rounded = scaled.round() / factor;
    // Avoid displaying "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Asterisk,
    Slash,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Asterisk => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Eof => write!(f, "end of expression"),
        }
    }
}

struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        match self.input.next() {
            Some('+') => Ok(Token::Plus),
            Some('-') => Ok(Token::Minus),
            Some('*') => Ok(Token::Asterisk),
            Some('/') => Ok(Token::Slash),
            Some('(') => Ok(Token::LParen),
            Some(')') => Ok(Token::RParen),
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),
            Some(ch) => Err(FormulaError::UnexpectedToken(format!("'{}'", ch))),
            None => Ok(Token::Eof),
        }
    }

    fn read_number(&mut self, first: char) -> Result<Token> {
        let mut literal = String::from(first);
        while let Some(&ch) = self.input.peek() {
            if !(ch.is_ascii_digit() || ch == '.') {
                break;
            }
            literal.push(ch);
            self.input.next();
        }
        literal
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| FormulaError::UnexpectedToken(format!("'{}'", literal)))
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            current_token: Token::Eof,
            depth: 0,
        }
    }

    fn parse(&mut self) -> Result<f64> {
        self.advance()?;
        let value = self.parse_additive()?;

        if self.current_token != Token::Eof {
            return Err(FormulaError::UnexpectedToken(self.current_token.to_string()));
        }
        Ok(value)
    }

    fn advance(&mut self) -> Result<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn parse_additive(&mut self) -> Result<f64> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let subtract = match self.current_token {
                Token::Plus => false,
                Token::Minus => true,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = if subtract { left - right } else { left + right };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<f64> {
        let mut left = self.parse_unary()?;

        loop {
            let divide = match self.current_token {
                Token::Asterisk => false,
                Token::Slash => true,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;
            left = if divide {
                // Catches zero divisors the textual check cannot see, e.g. 5/(1-1).
                if right == 0.0 {
                    return Err(FormulaError::DivisionByZero);
                }
                left / right
            } else {
                left * right
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<f64> {
        match self.current_token {
            Token::Minus => {
                self.advance()?;
                Ok(-self.parse_unary()?)
            }
            Token::Plus => {
                self.advance()?;
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<f64> {
        match self.current_token.clone() {
            Token::Number(n) => {
                self.advance()?;
                Ok(n)
            }
            Token::LParen => {
                if self.depth >= MAX_NESTING {
                    return Err(FormulaError::InvalidExpression);
                }
                self.depth += 1;
                self.advance()?;
                let value = self.parse_additive()?;
                if self.current_token != Token::RParen {
                    return Err(FormulaError::UnexpectedToken(self.current_token.to_string()));
                }
                self.depth -= 1;
                self.advance()?;
                Ok(value)
            }
            Token::Eof => Err(FormulaError::InvalidExpression),
            token => Err(FormulaError::UnexpectedToken(token.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate_arithmetic("2+3*4"), Ok(14.0));
        assert_eq!(evaluate_arithmetic("(2+3)*4"), Ok(20.0));
        assert_eq!(evaluate_arithmetic("(10+5)*2-8/4"), Ok(28.0));
        assert_eq!(evaluate_arithmetic("10-4-3"), Ok(3.0));
        assert_eq!(evaluate_arithmetic("64/4/2"), Ok(8.0));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(evaluate_arithmetic("-5+10"), Ok(5.0));
        assert_eq!(evaluate_arithmetic("2*(-3)"), Ok(-6.0));
        assert_eq!(evaluate_arithmetic("-(2+3)"), Ok(-5.0));
    }

    #[test]
    fn test_rejects_operator_after_operator() {
        assert_eq!(evaluate_arithmetic("3*-2"), Err(FormulaError::InvalidOperatorSequence));
        assert_eq!(evaluate_arithmetic("5++3"), Err(FormulaError::InvalidOperatorSequence));
    }

    #[test]
    fn test_zero_divisors() {
        assert_eq!(evaluate_arithmetic("5/0"), Err(FormulaError::DivisionByZero));
        assert_eq!(evaluate_arithmetic("5/0+1"), Err(FormulaError::DivisionByZero));
        assert_eq!(evaluate_arithmetic("5/(1-1)"), Err(FormulaError::DivisionByZero));
        assert_eq!(evaluate_arithmetic("5/0.0"), Err(FormulaError::DivisionByZero));
        assert_eq!(evaluate_arithmetic("5/0.5"), Ok(10.0));
        assert_eq!(evaluate_arithmetic("5/05"), Ok(1.0));
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(evaluate_arithmetic("5+"), Err(FormulaError::InvalidExpression));
        assert!(matches!(
            evaluate_arithmetic("()"),
            Err(FormulaError::UnexpectedToken(_))
        ));
        assert!(matches!(
            evaluate_arithmetic("(5)(3)"),
            Err(FormulaError::UnexpectedToken(_))
        ));
        assert!(matches!(
            evaluate_arithmetic("1.2.3"),
            Err(FormulaError::UnexpectedToken(_))
        ));
        assert_eq!(evaluate_arithmetic(")5("), Err(FormulaError::UnexpectedToken("')'".into())));
    }

    #[test]
    fn test_validation_failures() {
        assert_eq!(evaluate_arithmetic("5+a"), Err(FormulaError::InvalidCharacters));
        assert_eq!(evaluate_arithmetic("(5+3"), Err(FormulaError::UnmatchedParentheses));
        assert_eq!(evaluate_arithmetic("5+3)"), Err(FormulaError::UnmatchedParentheses));
        assert_eq!(evaluate_arithmetic("   "), Err(FormulaError::EmptyFormula));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(evaluate_arithmetic("0.1+0.2"), Ok(0.3));
        assert_eq!(evaluate_arithmetic("1/3"), Ok(0.333333));
        assert_eq!(evaluate_arithmetic("3.14*2"), Ok(6.28));
        assert_eq!(round_to_places(-0.0000001, 6), 0.0);
        assert_eq!(round_to_places(2.5, 0), 3.0);
        assert_eq!(round_to_places(-2.5, 0), -3.0);
    }

    #[test]
    fn test_large_values_stay_finite() {
        let value = evaluate_arithmetic("999999*999999").unwrap();
        assert_eq!(value, 999998000001.0);
        let big = "9".repeat(200);
        assert_eq!(
            evaluate_arithmetic(&format!("{big}*{big}")),
            Err(FormulaError::NotFinite)
        );
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let expr = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(evaluate_arithmetic(&expr), Err(FormulaError::InvalidExpression));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(evaluate_arithmetic(" 5 + 3 * 2 "), Ok(11.0));
    }
}
