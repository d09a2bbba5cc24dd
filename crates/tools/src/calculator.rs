//! `calculate`: arithmetic over `+ - * / ( )` and decimal numbers.
//!
//! A small recursive-descent evaluator. Nothing the model sends is ever
//! executed as code; anything outside the grammar is a [`CalcError`].
//!
//! ```text
//! expr    = term (('+' | '-') term)*
//! term    = factor (('*' | '/') factor)*
//! factor  = ('-' | '+') factor | primary
//! primary = NUMBER | '(' expr ')'
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use inkloop_core::error::ToolError;

/// Nesting bound for parentheses and unary signs.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expected ')'")]
    UnclosedParen,

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression nested deeper than {MAX_DEPTH} levels")]
    TooDeep,

    #[error("result is not a finite number")]
    NotFinite,
}

/// Action handler: evaluate and format, or describe the failure.
pub fn calculate(expression: &str) -> Result<String, ToolError> {
    evaluate(expression)
        .map(format_number)
        .map_err(|e| ToolError::ExecutionFailed {
            action: "calculate".into(),
            reason: e.to_string(),
        })
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens = Lexer::new(expression).collect::<Result<Vec<_>, _>>()?;
    let mut parser = Parser { tokens: &tokens, pos: 0, depth: 0 };
    let value = parser.expr()?;

    if let Some(tok) = parser.tokens.get(parser.pos) {
        return Err(CalcError::UnexpectedToken(tok.describe()));
    }
    if !value.is_finite() {
        return Err(CalcError::NotFinite);
    }
    Ok(value)
}

/// Integers print without a fractional part; everything else as `f64` does.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    Open,
    Close,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(n) => format!("number {n}"),
            Token::Op(c) => format!("operator '{c}'"),
            Token::Open => "'('".into(),
            Token::Close => "')'".into(),
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn number(&mut self, start: usize) -> Result<Token, CalcError> {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        let text = &self.src[start..end];
        text.parse()
            .map(Token::Num)
            .map_err(|_| CalcError::InvalidNumber(text.to_string()))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let &(offset, ch) = self.chars.peek()?;
        let token = match ch {
            '+' | '-' | '*' | '/' => Token::Op(ch),
            '(' => Token::Open,
            ')' => Token::Close,
            c if c.is_ascii_digit() || c == '.' => return Some(self.number(offset)),
            _ => return Some(Err(CalcError::UnexpectedChar { ch, offset })),
        };
        self.chars.next();
        Some(Ok(token))
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).copied();
        self.pos += usize::from(tok.is_some());
        tok
    }

    /// Consume the next token if it is one of `ops`.
    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(c)) if ops.contains(c) => {
                self.pos += 1;
                Some(*c)
            }
            _ => None,
        }
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.factor()?;
        while let Some(op) = self.eat_op(&['*', '/']) {
            let rhs = self.factor()?;
            if op == '*' {
                acc *= rhs;
            } else if rhs == 0.0 {
                return Err(CalcError::DivisionByZero);
            } else {
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        if let Some(sign) = self.eat_op(&['-', '+']) {
            self.descend()?;
            let value = self.factor()?;
            self.depth -= 1;
            return Ok(if sign == '-' { -value } else { value });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.bump() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Open) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.bump() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(CalcError::UnclosedParen),
                }
            }
            Some(tok) => Err(CalcError::UnexpectedToken(tok.describe())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("((1 + 2) * (3 + 4))").unwrap(), 21.0);
    }

    #[test]
    fn left_associative_subtraction_and_division() {
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("100 / 10 / 5").unwrap(), 2.0);
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-5 + 3").unwrap(), -2.0);
        assert_eq!(evaluate("--2").unwrap(), 2.0);
        assert_eq!(evaluate("3 * -(1 + 1)").unwrap(), -6.0);
        assert_eq!(evaluate("+4").unwrap(), 4.0);
    }

    #[test]
    fn decimals() {
        assert_eq!(evaluate("37 * 1.5").unwrap(), 55.5);
        assert_eq!(evaluate(".5 + .25").unwrap(), 0.75);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("1 / (2 - 2)"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn code_is_not_evaluated() {
        assert!(matches!(
            evaluate("__import__('os').system('ls')"),
            Err(CalcError::UnexpectedChar { ch: '_', offset: 0 })
        ));
        assert!(evaluate("2 ** 8").is_err());
    }

    #[test]
    fn malformed_input() {
        assert_eq!(evaluate(""), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("2 +"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(CalcError::UnclosedParen));
        assert!(matches!(evaluate("1 2"), Err(CalcError::UnexpectedToken(_))));
        assert!(matches!(evaluate("1.2.3"), Err(CalcError::InvalidNumber(_))));
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&deep), Err(CalcError::TooDeep));
        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&ok).unwrap(), 1.0);
    }

    #[test]
    fn handler_formats_results() {
        assert_eq!(calculate("10 / 2").unwrap(), "5");
        assert!(calculate("4 * 7 / 3").unwrap().starts_with("9.333"));
    }

    #[test]
    fn handler_reports_errors() {
        let err = calculate("1 / 0").unwrap_err();
        assert_eq!(err.to_string(), "calculate failed: division by zero");
    }
}
