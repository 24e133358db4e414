//! Tokenizer and recursive-descent parser for the expression grammar.
//!
//! ```text
//! expression := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary | <implicit> primary)*
//! unary      := ("-" | "+") unary | power
//! power      := primary (("**" | "^") unary)?
//! primary    := number | constant | variable | function "(" expression ")"
//!             | "(" expression ")"
//! ```
//!
//! Identifiers are restricted to a closed set of variables, constants and
//! whitelisted functions; nothing else is ever resolved.

use crate::error::{EngineError, Result};
use crate::expr::{Constant, Expr, Func};
use crate::number::Number;
use crate::simplify::simplify;

/// Deepest nesting of parentheses, calls, signs and exponents accepted.
pub const MAX_DEPTH: usize = 100;

/// Variable names accepted in input text.
pub const VARIABLES: &[&str] = &["x", "y", "z", "t", "a", "b", "c", "n", "r"];

/// Parse and simplify an expression.
pub fn parse(input: &str) -> Result<Expr> {
    let raw = parse_raw(input)?;
    let simplified = simplify(&raw);
    if divides_by_zero(&simplified) {
        return Err(EngineError::DivisionByZero);
    }
    Ok(simplified)
}

/// Parse without simplifying.
pub fn parse_raw(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EngineError::parse("empty expression", 0));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.chars().count(),
        depth: 0,
    };
    let expr = parser.parse_expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(EngineError::parse(
            format!("unexpected {}", token.kind.describe()),
            token.pos,
        )),
    }
}

fn divides_by_zero(expr: &Expr) -> bool {
    match expr {
        Expr::Pow(base, exp) => {
            (base.is_zero() && exp.as_number().is_some_and(|n| n.is_negative()))
                || divides_by_zero(base)
                || divides_by_zero(exp)
        }
        Expr::Add(items) | Expr::Mul(items) => items.iter().any(divides_by_zero),
        Expr::Func(_, arg) => divides_by_zero(arg),
        Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(Number),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Identifier(name) => format!("identifier '{name}'"),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Caret => "'**'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let (number, next) = read_number(&chars, i)?;
            tokens.push(Token {
                kind: TokenKind::Number(number),
                pos: start,
            });
            i = next;
        } else if c.is_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Identifier(chars[start..i].iter().collect()),
                pos: start,
            });
        } else {
            let kind = match c {
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' if chars.get(i + 1) == Some(&'*') => {
                    i += 1;
                    TokenKind::Caret
                }
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '^' => TokenKind::Caret,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                other => {
                    return Err(EngineError::parse(
                        format!("unexpected character '{other}'"),
                        start,
                    ));
                }
            };
            tokens.push(Token { kind, pos: start });
            i += 1;
        }
    }
    Ok(tokens)
}

/// Read an integer, decimal or scientific literal starting at `start`.
fn read_number(chars: &[char], start: usize) -> Result<(Number, usize)> {
    let mut i = start;
    let mut mantissa = String::new();
    let mut seen_dot = false;
    while i < chars.len() && (chars[i].is_ascii_digit() || (chars[i] == '.' && !seen_dot)) {
        seen_dot |= chars[i] == '.';
        mantissa.push(chars[i]);
        i += 1;
    }
    if mantissa == "." {
        return Err(EngineError::parse("expected digits after '.'", start));
    }

    let mut exponent: i64 = 0;
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        let mut digits = String::new();
        if j < chars.len() && (chars[j] == '-' || chars[j] == '+') {
            digits.push(chars[j]);
            j += 1;
        }
        let digits_start = digits.len();
        while j < chars.len() && chars[j].is_ascii_digit() {
            digits.push(chars[j]);
            j += 1;
        }
        // `2e` and `2E` stay implicit products with Euler's number
        if digits.len() > digits_start {
            exponent = digits
                .parse()
                .map_err(|_| EngineError::parse("exponent out of range", i))?;
            i = j;
        }
    }

    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa.as_str(), ""));
    let exact = decimal_to_rational(whole, frac, exponent);
    let number = match exact {
        Some(n) => n,
        None => {
            let text = format!("{mantissa}e{exponent}");
            let value: f64 = text
                .parse()
                .map_err(|_| EngineError::parse(format!("invalid number '{mantissa}'"), start))?;
            Number::Float(value)
        }
    };
    Ok((number, i))
}

fn decimal_to_rational(whole: &str, frac: &str, exponent: i64) -> Option<Number> {
    let digits = format!("{whole}{frac}");
    let digits = if digits.is_empty() { "0" } else { digits.as_str() };
    let numer: i64 = digits.parse().ok()?;
    let scale = i64::try_from(frac.len()).ok()? - exponent;
    let ten_pow = |p: i64| -> Option<i64> { 10i64.checked_pow(u32::try_from(p).ok()?) };
    if scale >= 0 {
        Some(Number::ratio(numer, ten_pow(scale)?))
    } else {
        Some(Number::int(numer.checked_mul(ten_pow(-scale)?)?))
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    /// Runs `f` one nesting level deeper.
    fn nested<T>(&mut self, pos: usize, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(EngineError::parse(
                format!("expression is nested more than {MAX_DEPTH} levels deep"),
                pos,
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_rparen(&mut self) -> Result<()> {
        match self.consume() {
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => Ok(()),
            Some(token) => Err(EngineError::parse(
                format!("expected ')' but found {}", token.kind.describe()),
                token.pos,
            )),
            None => Err(EngineError::parse("expected ')'", self.end)),
        }
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        let mut terms = vec![self.parse_term()?];
        loop {
            match self.peek_kind() {
                Some(TokenKind::Plus) => {
                    self.consume();
                    terms.push(self.parse_term()?);
                }
                Some(TokenKind::Minus) => {
                    self.consume();
                    terms.push(Expr::neg(self.parse_term()?));
                }
                _ => break,
            }
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Add(terms)
        })
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut factors = vec![self.parse_unary()?];
        loop {
            match self.peek_kind() {
                Some(TokenKind::Star) => {
                    self.consume();
                    factors.push(self.parse_unary()?);
                }
                Some(TokenKind::Slash) => {
                    self.consume();
                    let divisor = self.parse_unary()?;
                    factors.push(Expr::pow(divisor, Expr::int(-1)));
                }
                Some(TokenKind::Number(_) | TokenKind::Identifier(_) | TokenKind::LParen) => {
                    factors.push(self.parse_power()?);
                }
                _ => break,
            }
        }
        Ok(if factors.len() == 1 {
            factors.remove(0)
        } else {
            Expr::Mul(factors)
        })
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let Some(Token {
            kind: kind @ (TokenKind::Minus | TokenKind::Plus),
            pos,
        }) = self.peek().cloned()
        else {
            return self.parse_power();
        };
        self.consume();
        let operand = self.nested(pos, Self::parse_unary)?;
        Ok(match kind {
            TokenKind::Minus => Expr::neg(operand),
            _ => operand,
        })
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_primary()?;
        if let Some(Token {
            kind: TokenKind::Caret,
            pos,
        }) = self.peek().cloned()
        {
            self.consume();
            let exp = self.nested(pos, Self::parse_unary)?;
            return Ok(Expr::pow(base, exp));
        }
        Ok(base)
    }

    /// The rest of `( expression )` after the opening parenthesis.
    fn parenthesized(&mut self) -> Result<Expr> {
        let inner = self.parse_expression()?;
        self.expect_rparen()?;
        Ok(inner)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(token) = self.consume() else {
            return Err(EngineError::parse("unexpected end of expression", self.end));
        };
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Num(n)),
            TokenKind::Identifier(name) => {
                if let Some(TokenKind::LParen) = self.peek_kind() {
                    self.consume();
                    let arg = self.nested(token.pos, Self::parenthesized)?;
                    return resolve_call(&name, arg);
                }
                resolve_identifier(&name)
            }
            TokenKind::LParen => self.nested(token.pos, Self::parenthesized),
            other => Err(EngineError::parse(
                format!("unexpected {}", other.describe()),
                token.pos,
            )),
        }
    }
}

fn resolve_identifier(name: &str) -> Result<Expr> {
    match name {
        "pi" => Ok(Expr::Const(Constant::Pi)),
        "E" | "e" => Ok(Expr::Const(Constant::E)),
        _ if VARIABLES.contains(&name) => Ok(Expr::sym(name)),
        _ if name == "sqrt" || Func::from_name(name).is_some() => Err(EngineError::parse(
            format!("function '{name}' needs an argument in parentheses"),
            0,
        )),
        _ => Err(EngineError::UnknownSymbol(name.to_string())),
    }
}

fn resolve_call(name: &str, arg: Expr) -> Result<Expr> {
    if name == "sqrt" {
        return Ok(Expr::sqrt(arg));
    }
    match Func::from_name(name) {
        Some(func) => Ok(Expr::func(func, arg)),
        None if VARIABLES.contains(&name) || name == "pi" || name == "E" || name == "e" => {
            // `x(x + 1)` is an implicit product
            let head = resolve_identifier(name)?;
            Ok(Expr::mul(head, arg))
        }
        None => Err(EngineError::UnknownFunction(name.to_string())),
    }
}
